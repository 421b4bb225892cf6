#![allow(dead_code)]

use futures::channel::oneshot;
use spa_converter_core::{
    define_plain_spa_app, EntryDescriptor, LifecycleHandle, ModuleResolver, Renderable,
    SpaModuleBuilder, StaticModuleLoader,
};
use std::cell::RefCell;
use std::rc::Rc;

pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::default()
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.borrow().clone()
}

pub fn count(journal: &Journal, event: &str) -> usize {
    journal.borrow().iter().filter(|entry| *entry == event).count()
}

/// Child with `mount` + `unmount` that writes into its container.
pub fn register_mounting_child(loader: &mut StaticModuleLoader, address: &str, journal: &Journal) {
    let journal = Rc::clone(journal);
    loader
        .register(address, move || {
            let journal = Rc::clone(&journal);
            SpaModuleBuilder::new()
                .default_factory(define_plain_spa_app(move |container| {
                    let on_mount = Rc::clone(&journal);
                    let on_unmount = Rc::clone(&journal);
                    let mount_node = Rc::clone(container);
                    let unmount_node = Rc::clone(container);
                    LifecycleHandle::builder()
                        .mount(move |_| {
                            on_mount.borrow_mut().push("mount".to_string());
                            mount_node.set_content("child app");
                            Ok(())
                        })
                        .unmount(move || {
                            on_unmount.borrow_mut().push("unmount".to_string());
                            unmount_node.clear();
                            Ok(())
                        })
                        .build()
                }))
                .build()
        })
        .expect("register mounting child");
}

/// Child exposing only `render`, returning `output`.
pub fn register_render_child(
    loader: &mut StaticModuleLoader,
    address: &str,
    journal: &Journal,
    output: &'static str,
) {
    let journal = Rc::clone(journal);
    loader
        .register(address, move || {
            let journal = Rc::clone(&journal);
            SpaModuleBuilder::new()
                .default_factory(define_plain_spa_app(move |_| {
                    let on_render = Rc::clone(&journal);
                    LifecycleHandle::builder()
                        .render(move |_| {
                            on_render.borrow_mut().push("render".to_string());
                            Ok(Some(Renderable::text(output)))
                        })
                        .build()
                }))
                .build()
        })
        .expect("register render child");
}

pub fn resolver(loader: StaticModuleLoader) -> ModuleResolver {
    ModuleResolver::new(Rc::new(loader))
}

/// Producer entry that stays pending until the returned sender fires.
pub fn gated_entry() -> (EntryDescriptor, oneshot::Sender<String>) {
    let (sender, receiver) = oneshot::channel::<String>();
    let receiver = Rc::new(RefCell::new(Some(receiver)));
    let entry = EntryDescriptor::producer(move || {
        let receiver = receiver.borrow_mut().take();
        async move {
            match receiver {
                Some(receiver) => receiver
                    .await
                    .map_err(|_| "entry gate dropped".to_string()),
                None => Err("entry producer invoked twice".to_string()),
            }
        }
    });
    (entry, sender)
}
