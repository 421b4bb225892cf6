mod common;

use common::{count, entries, journal, register_mounting_child, Journal};
use futures::executor::block_on;
use futures::FutureExt;
use spa_converter_core::{
    ContainerBinding, ConverterProps, LoadedModule, ModuleLoader, ModuleResolver, SpaConverter,
    StaticModuleLoader, ViewKind,
};
use std::cell::Cell;
use std::rc::Rc;

fn counting_loader(address: &str, log: &Journal, loads: &Rc<Cell<usize>>) -> ModuleResolver {
    let mut inner = StaticModuleLoader::new();
    register_mounting_child(&mut inner, address, log);
    let inner = Rc::new(inner);

    // Wraps the registered child so every load is counted.
    let mut loader = StaticModuleLoader::new();
    let loads = Rc::clone(loads);
    let source = address.to_string();
    loader
        .register(address, move || {
            loads.set(loads.get() + 1);
            load_now(&inner, &source)
        })
        .expect("register counting wrapper");
    ModuleResolver::new(Rc::new(loader))
}

fn load_now(loader: &Rc<StaticModuleLoader>, address: &str) -> LoadedModule {
    loader
        .load(address)
        .now_or_never()
        .expect("static loads are ready immediately")
        .expect("inner module")
}

#[test]
fn remount_on_same_binding_unmounts_previous_child_first() {
    let log = journal();
    let loads = Rc::new(Cell::new(0));
    let resolver = counting_loader("pkg/b", &log, &loads);
    let binding = ContainerBinding::new();

    let first = SpaConverter::with_binding(
        ConverterProps::new("pkg/b"),
        binding.clone(),
        resolver.clone(),
    );
    block_on(first.attach());
    assert_eq!(entries(&log), vec!["mount"]);

    let second =
        SpaConverter::with_binding(ConverterProps::new("pkg/b"), binding.clone(), resolver);
    block_on(second.attach());

    assert_eq!(entries(&log), vec!["mount", "unmount", "mount"]);
    assert!(first.view().is_none());
    assert_eq!(second.view().expect("view").kind, ViewKind::Empty);
    assert_eq!(first.token(), second.token());

    drop(first);
    assert_eq!(count(&log, "unmount"), 1);

    second.detach().expect("detach second");
    assert_eq!(entries(&log), vec!["mount", "unmount", "mount", "unmount"]);
}

#[test]
fn every_mount_reloads_the_module() {
    let log = journal();
    let loads = Rc::new(Cell::new(0));
    let resolver = counting_loader("pkg/b", &log, &loads);

    for _ in 0..3 {
        let converter = SpaConverter::new(ConverterProps::new("pkg/b"), resolver.clone());
        block_on(converter.attach());
        converter.detach().expect("detach");
    }

    assert_eq!(loads.get(), 3);
    assert_eq!(count(&log, "mount"), 3);
    assert_eq!(count(&log, "unmount"), 3);
}

#[test]
fn released_binding_rejects_later_children() {
    let log = journal();
    let loads = Rc::new(Cell::new(0));
    let resolver = counting_loader("pkg/b", &log, &loads);
    let binding = ContainerBinding::new();

    let first = SpaConverter::with_binding(
        ConverterProps::new("pkg/b"),
        binding.clone(),
        resolver.clone(),
    );
    block_on(first.attach());
    binding.release();
    assert!(binding.is_released());
    assert_eq!(entries(&log), vec!["mount", "unmount"]);

    let second = SpaConverter::with_binding(ConverterProps::new("pkg/b"), binding, resolver);
    block_on(second.attach());

    let view = second.view().expect("view");
    assert_eq!(view.kind, ViewKind::Error);
    assert!(view.text().contains("missing mount target"));
    assert_eq!(count(&log, "mount"), 1);
}
