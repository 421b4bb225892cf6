//! Host-facing wrapper around one container and one controller.
//!
//! # Responsibility
//! - Accept host parameters (entry, deep props, loading/error displays).
//! - Map controller state to the container output the host renders.
//!
//! # Invariants
//! - The entry is consumed by the first `attach`.
//! - No view is produced once teardown was requested.

use crate::config::{LoaderConfig, DEFAULT_EMPTY_TEXT, DEFAULT_LOADING_TEXT};
use crate::container::{ContainerBinding, ContainerToken};
use crate::contract::handle::{ChildError, Payload, Renderable};
use crate::entry::descriptor::EntryDescriptor;
use crate::entry::resolver::{ModuleResolver, ResolveError};
use crate::host::view::{ContainerView, ViewKind};
use crate::lifecycle::controller::{LifecycleController, RenderOutcome};
use crate::lifecycle::state::ChildInstanceState;
use futures::future::{self, FutureExt, LocalBoxFuture};
use serde_json::Value;
use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// Builds the error view from the error message.
pub type ErrorDisplay = Rc<dyn Fn(&str) -> Renderable>;

/// Parameters the host passes for one child.
///
/// A malformed entry is kept as its resolution error and surfaces as the
/// error view once the converter attaches.
#[derive(Clone)]
pub struct ConverterProps {
    pub entry: Result<EntryDescriptor, ResolveError>,
    pub deep_props: Payload,
    pub loading_display: Option<Renderable>,
    pub error_display: Option<ErrorDisplay>,
}

impl ConverterProps {
    pub fn new(entry: impl Into<EntryDescriptor>) -> Self {
        Self::with_entry(Ok(entry.into()))
    }

    /// Props for an entry taken from configuration data.
    pub fn from_value(entry: &Value) -> Self {
        Self::with_entry(EntryDescriptor::from_value(entry))
    }

    fn with_entry(entry: Result<EntryDescriptor, ResolveError>) -> Self {
        Self {
            entry,
            deep_props: Payload::new(),
            loading_display: None,
            error_display: None,
        }
    }

    pub fn with_deep_props(mut self, deep_props: Payload) -> Self {
        self.deep_props = deep_props;
        self
    }

    pub fn with_loading_display(mut self, display: impl Into<Renderable>) -> Self {
        self.loading_display = Some(display.into());
        self
    }

    pub fn with_error_display<F>(mut self, display: F) -> Self
    where
        F: Fn(&str) -> Renderable + 'static,
    {
        self.error_display = Some(Rc::new(display));
        self
    }
}

impl Debug for ConverterProps {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterProps")
            .field("entry", &self.entry)
            .field("deep_props", &self.deep_props)
            .field("loading_display", &self.loading_display)
            .field("error_display", &self.error_display.is_some())
            .finish()
    }
}

/// Literal texts used when the host supplies no display of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackTexts {
    pub loading: Renderable,
    pub empty: Renderable,
}

impl FallbackTexts {
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self {
            loading: Renderable::text(config.loading_text.as_str()),
            empty: Renderable::text(config.empty_text.as_str()),
        }
    }
}

impl Default for FallbackTexts {
    fn default() -> Self {
        Self {
            loading: Renderable::text(DEFAULT_LOADING_TEXT),
            empty: Renderable::text(DEFAULT_EMPTY_TEXT),
        }
    }
}

/// One child application embedded in the host UI.
pub struct SpaConverter {
    binding: ContainerBinding,
    controller: LifecycleController,
    entry: RefCell<Option<Result<EntryDescriptor, ResolveError>>>,
    loading_display: Option<Renderable>,
    error_display: Option<ErrorDisplay>,
    fallbacks: FallbackTexts,
}

impl SpaConverter {
    /// Converter with a fresh container binding.
    pub fn new(props: ConverterProps, resolver: ModuleResolver) -> Self {
        Self::with_binding(props, ContainerBinding::new(), resolver)
    }

    /// Converter targeting an existing binding, e.g. on remount.
    pub fn with_binding(
        props: ConverterProps,
        binding: ContainerBinding,
        resolver: ModuleResolver,
    ) -> Self {
        let ConverterProps {
            entry,
            deep_props,
            loading_display,
            error_display,
        } = props;
        Self {
            controller: LifecycleController::new(binding.clone(), resolver, deep_props),
            binding,
            entry: RefCell::new(Some(entry)),
            loading_display,
            error_display,
            fallbacks: FallbackTexts::default(),
        }
    }

    pub fn with_fallbacks(mut self, fallbacks: FallbackTexts) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    pub fn token(&self) -> ContainerToken {
        self.binding.token()
    }

    pub fn binding(&self) -> &ContainerBinding {
        &self.binding
    }

    pub fn controller(&self) -> &LifecycleController {
        &self.controller
    }

    pub fn state(&self) -> ChildInstanceState {
        self.controller.state()
    }

    /// Starts loading the child; drive the future on the UI executor.
    pub fn attach(&self) -> LocalBoxFuture<'static, ()> {
        match self.entry.borrow_mut().take() {
            Some(entry) => self.controller.attach_entry(entry),
            None => future::ready(()).boxed_local(),
        }
    }

    pub fn detach(&self) -> Result<(), ChildError> {
        self.controller.detach()
    }

    /// Current container output, or `None` after teardown.
    pub fn view(&self) -> Option<ContainerView> {
        let (kind, content) = match self.controller.render() {
            RenderOutcome::Detached => return None,
            RenderOutcome::Pending => (
                ViewKind::Loading,
                self.loading_display
                    .clone()
                    .unwrap_or_else(|| self.fallbacks.loading.clone()),
            ),
            RenderOutcome::Failed(payload) => (
                ViewKind::Error,
                match self.error_display.as_ref() {
                    Some(display) => display(payload.message()),
                    None => Renderable::text(payload.message()),
                },
            ),
            RenderOutcome::Rendered(output) => (ViewKind::Child, output.unwrap_or_default()),
            RenderOutcome::NoRenderCapability => (ViewKind::Empty, self.fallbacks.empty.clone()),
        };
        Some(ContainerView {
            token: self.binding.token(),
            kind,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConverterProps, FallbackTexts, SpaConverter};
    use crate::config::LoaderConfig;
    use crate::contract::handle::{LifecycleHandle, Renderable};
    use crate::contract::module::LoadedModule;
    use crate::entry::loader::StaticModuleLoader;
    use crate::entry::resolver::ModuleResolver;
    use crate::host::view::ViewKind;
    use futures::executor::block_on;
    use std::rc::Rc;

    fn resolver() -> ModuleResolver {
        let mut loader = StaticModuleLoader::new();
        loader
            .register("pkg/mount-only", || {
                LoadedModule::from_factory(|_| {
                    LifecycleHandle::builder()
                        .mount(|_| Ok(()))
                        .unmount(|| Ok(()))
                        .build()
                })
            })
            .expect("register");
        ModuleResolver::new(Rc::new(loader))
    }

    #[test]
    fn loading_view_uses_host_display_then_fallback() {
        let custom = SpaConverter::new(
            ConverterProps::new("pkg/mount-only").with_loading_display("spinner"),
            resolver(),
        );
        let view = custom.view().expect("view");
        assert_eq!(view.kind, ViewKind::Loading);
        assert_eq!(view.text(), "spinner");

        let plain = SpaConverter::new(ConverterProps::new("pkg/mount-only"), resolver());
        assert_eq!(
            plain.view().expect("view").text(),
            "[Sub Spa] Converter is preparing."
        );
    }

    #[test]
    fn mount_only_child_shows_empty_fallback_from_config() {
        let config = LoaderConfig {
            empty_text: "nothing to see".to_string(),
            ..LoaderConfig::with_template("/{SPA_NAME}/main.js")
        };
        let converter = SpaConverter::new(ConverterProps::new("pkg/mount-only"), resolver())
            .with_fallbacks(FallbackTexts::from_config(&config));
        block_on(converter.attach());

        let view = converter.view().expect("view");
        assert_eq!(view.kind, ViewKind::Empty);
        assert_eq!(view.text(), "nothing to see");
        assert_eq!(view.token, converter.token());
    }

    #[test]
    fn error_view_applies_error_display() {
        let converter = SpaConverter::new(
            ConverterProps::new("pkg/unknown")
                .with_error_display(|msg| Renderable::text(format!("oops: {msg}"))),
            resolver(),
        );
        block_on(converter.attach());

        let view = converter.view().expect("view");
        assert_eq!(view.kind, ViewKind::Error);
        assert!(view.text().starts_with("oops: "));
        assert!(view.text().contains("pkg/unknown"));
    }

    #[test]
    fn config_entry_accepts_string_addresses() {
        let converter = SpaConverter::new(
            ConverterProps::from_value(&serde_json::json!("pkg/mount-only")),
            resolver(),
        );
        block_on(converter.attach());
        assert!(converter.state().is_ready());
    }

    #[test]
    fn entry_is_consumed_by_first_attach() {
        let converter = SpaConverter::new(ConverterProps::new("pkg/mount-only"), resolver());
        block_on(converter.attach());
        block_on(converter.attach());
        assert!(converter.state().is_ready());
        converter.detach().expect("detach");
        assert!(converter.view().is_none());
    }
}
