//! Child-authoring helpers.
//!
//! Used by code that *writes* a child application, not by the loader's
//! runtime path.

use crate::container::ContainerRef;
use crate::contract::handle::LifecycleHandle;
use crate::contract::module::{LoadedModule, ModuleExport, ModuleFactory, DEFAULT_EXPORT};
use serde_json::Value;
use std::rc::Rc;

/// Wraps a handle constructor into the module's default factory.
///
/// `inject` runs once per constructed handle for side effects such as
/// registering dependencies. It only sees a shared borrow, so it cannot swap
/// or reconfigure the handle the constructor produced.
pub fn define_spa_app<C, I>(constructor: C, inject: Option<I>) -> ModuleFactory
where
    C: Fn(&ContainerRef) -> LifecycleHandle + 'static,
    I: Fn(&LifecycleHandle) + 'static,
{
    Rc::new(move |container: &ContainerRef| {
        let handle = constructor(container);
        if let Some(inject) = inject.as_ref() {
            inject(&handle);
        }
        handle
    })
}

/// Same as [`define_spa_app`] without an inspection callback.
pub fn define_plain_spa_app<C>(constructor: C) -> ModuleFactory
where
    C: Fn(&ContainerRef) -> LifecycleHandle + 'static,
{
    define_spa_app(constructor, None::<fn(&LifecycleHandle)>)
}

/// Assembles a [`LoadedModule`] the way a bundled child would export it.
#[derive(Debug, Default)]
pub struct SpaModuleBuilder {
    module: LoadedModule,
}

impl SpaModuleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_factory(mut self, factory: ModuleFactory) -> Self {
        self.module
            .insert_export(DEFAULT_EXPORT, ModuleExport::Factory(factory));
        self
    }

    /// Adds a non-factory export, e.g. version metadata.
    pub fn value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.module.insert_export(name, ModuleExport::Value(value));
        self
    }

    pub fn build(self) -> LoadedModule {
        self.module
    }
}

#[cfg(test)]
mod tests {
    use super::{define_plain_spa_app, define_spa_app, SpaModuleBuilder};
    use crate::container::ContainerBinding;
    use crate::contract::handle::{LifecycleHandle, Renderable};
    use crate::contract::module::ModuleExport;
    use crate::contract::validator::validate;
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn inject_sees_constructed_handle_once() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let factory = define_spa_app(
            |_| {
                LifecycleHandle::builder()
                    .mount(|_| Ok(()))
                    .unmount(|| Ok(()))
                    .build()
            },
            Some(move |handle: &LifecycleHandle| sink.borrow_mut().push(handle.capabilities())),
        );

        let binding = ContainerBinding::new();
        let node = binding.node().expect("node");
        let handle = factory(&node);

        assert_eq!(seen.borrow().len(), 1);
        assert!(seen.borrow()[0].mount);
        assert!(handle.has_unmount());
    }

    #[test]
    fn constructor_receives_the_target_container() {
        let factory = define_plain_spa_app(|container| {
            let node = Rc::clone(container);
            LifecycleHandle::builder()
                .mount(move |_| {
                    node.set_content("mounted");
                    Ok(())
                })
                .unmount(|| Ok(()))
                .build()
        });

        let binding = ContainerBinding::new();
        let node = binding.node().expect("node");
        let handle = factory(&node);
        handle
            .call_mount(&Default::default())
            .expect("mount slot")
            .expect("mount ok");
        assert_eq!(node.content(), Some(Renderable::text("mounted")));
    }

    #[test]
    fn builder_output_passes_validation() {
        let constructed = Rc::new(Cell::new(0));
        let counter = Rc::clone(&constructed);
        let module = SpaModuleBuilder::new()
            .default_factory(define_plain_spa_app(move |_| {
                counter.set(counter.get() + 1);
                LifecycleHandle::builder().render(|_| Ok(None)).build()
            }))
            .value("version", json!("1.0.0"))
            .build();

        assert!(matches!(module.export("version"), Some(ModuleExport::Value(_))));
        let binding = ContainerBinding::new();
        validate(module, binding.node().as_ref()).expect("valid module");
        assert_eq!(constructed.get(), 1);
    }
}
