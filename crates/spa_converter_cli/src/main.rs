//! CLI demo host.
//!
//! # Responsibility
//! - Embed two bundled demo children through `SpaConverter` end to end.
//! - Print each container view so wiring can be checked without a UI.
//!
//! Usage: `spa_converter_cli [loader-config.json]`

use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use log::{error, info};
use serde_json::json;
use spa_converter_core::{
    define_spa_app, ConverterProps, FallbackTexts, LifecycleHandle, LoaderConfig, ModuleResolver,
    Renderable, SpaConverter, SpaModuleBuilder, StaticModuleLoader,
};
use std::path::Path;
use std::process::ExitCode;
use std::rc::Rc;

const DEFAULT_TEMPLATE: &str = "/children/{SPA_NAME}/main.js";
const MOUNTING_CHILD: &str = "vite-react-ts";
const RENDERING_CHILD: &str = "vite-vue-ts";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_exit module=cli status=error message={message}");
            eprintln!("spa_converter_cli: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = match std::env::args().nth(1) {
        Some(path) => LoaderConfig::from_path(Path::new(&path)).map_err(|err| err.to_string())?,
        None => LoaderConfig::with_template(DEFAULT_TEMPLATE),
    };
    if config.init_logging().map_err(|err| err.to_string())? {
        info!("event=cli_start module=cli status=ok");
    }
    println!("spa_converter_core version={}", spa_converter_core::core_version());

    let resolver = demo_resolver(&config)?;
    let fallbacks = FallbackTexts::from_config(&config);
    let deep_props = json!({"user": "demo", "theme": "dark"})
        .as_object()
        .cloned()
        .unwrap_or_default();

    let mut converters = Vec::new();
    for name in [MOUNTING_CHILD, RENDERING_CHILD] {
        let entry = config.entry_for(name).map_err(|err| err.to_string())?;
        let props = ConverterProps::new(entry)
            .with_deep_props(deep_props.clone())
            .with_error_display(|msg| Renderable::text(format!("[Sub Spa] failed: {msg}")));
        let converter =
            SpaConverter::new(props, resolver.clone()).with_fallbacks(fallbacks.clone());
        converters.push((name, converter));
    }

    print_views("before attach", &converters);

    let mut pool = LocalPool::new();
    for (name, converter) in &converters {
        info!(
            "event=cli_attach module=cli status=ok child={name} token={} attempt={}",
            converter.token(),
            converter.controller().attempt_id()
        );
        pool.spawner()
            .spawn_local(converter.attach())
            .map_err(|err| format!("failed to schedule attach: {err}"))?;
    }
    pool.run();

    print_views("after attach", &converters);

    for (name, converter) in &converters {
        if let Err(err) = converter.detach() {
            eprintln!("{name}: {err}");
        }
        let container = converter
            .binding()
            .node()
            .and_then(|node| node.content())
            .map(Renderable::into_string)
            .unwrap_or_default();
        println!("{name} detached container=\"{container}\"");
    }
    Ok(())
}

fn print_views(label: &str, converters: &[(&str, SpaConverter)]) {
    for (name, converter) in converters {
        match converter.view() {
            Some(view) => println!(
                "[{label}] {name} {} kind={:?} state={} content=\"{}\"",
                view.token,
                view.kind,
                converter.state().as_str(),
                view.text()
            ),
            None => println!("[{label}] {name} detached"),
        }
    }
}

fn demo_resolver(config: &LoaderConfig) -> Result<ModuleResolver, String> {
    let mut loader = StaticModuleLoader::new();
    register_mounting_child(&mut loader, &literal_address(config, MOUNTING_CHILD)?)
        .map_err(|err| err.to_string())?;
    register_rendering_child(&mut loader, &literal_address(config, RENDERING_CHILD)?)
        .map_err(|err| err.to_string())?;
    Ok(ModuleResolver::new(Rc::new(loader)))
}

fn literal_address(config: &LoaderConfig, name: &str) -> Result<String, String> {
    let entry = config.entry_for(name).map_err(|err| err.to_string())?;
    entry
        .as_literal()
        .map(str::to_string)
        .ok_or_else(|| format!("entry for `{name}` is not a literal address"))
}

fn register_mounting_child(
    loader: &mut StaticModuleLoader,
    address: &str,
) -> Result<(), spa_converter_core::ModuleRegistryError> {
    loader.register(address, || {
        SpaModuleBuilder::new()
            .default_factory(define_spa_app(
                |container| {
                    let target = Rc::clone(container);
                    let cleanup = Rc::clone(container);
                    LifecycleHandle::builder()
                        .mount(move |payload| {
                            let user = payload
                                .get("user")
                                .and_then(|value| value.as_str())
                                .unwrap_or("guest");
                            let html = format!("<div id=\"react-root\">hello {user}</div>");
                            target.set_content(html);
                            Ok(())
                        })
                        .unmount(move || {
                            cleanup.clear();
                            Ok(())
                        })
                        .build()
                },
                Some(|handle: &LifecycleHandle| {
                    info!(
                        "event=child_inject module=cli status=ok mount={} unmount={}",
                        handle.has_mount(),
                        handle.has_unmount()
                    );
                }),
            ))
            .value("version", json!("0.1.0"))
            .build()
    })
}

fn register_rendering_child(
    loader: &mut StaticModuleLoader,
    address: &str,
) -> Result<(), spa_converter_core::ModuleRegistryError> {
    loader.register(address, || {
        SpaModuleBuilder::new()
            .default_factory(define_spa_app(
                |_| {
                    LifecycleHandle::builder()
                        .render(|payload| {
                            let theme = payload
                                .get("theme")
                                .and_then(|value| value.as_str())
                                .unwrap_or("light");
                            let html = format!("<main class=\"{theme}\">vue child</main>");
                            Ok(Some(Renderable::text(html)))
                        })
                        .build()
                },
                None::<fn(&LifecycleHandle)>,
            ))
            .build()
    })
}
