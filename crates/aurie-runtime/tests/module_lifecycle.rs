use aurie_api::testing::{CallbackRecorder, MockInterface};
use aurie_api::{same_interface, InterfaceHandle, ModuleEvent, ModuleOperation};
use aurie_runtime::{ModuleManager, ObjectManager};
use std::sync::Arc;

#[test]
fn dispatch_reaches_every_callback_once_in_load_order() {
    let objects = ObjectManager::new();
    let a = objects.register_module("a");
    let silent = objects.register_module("silent");
    let c = objects.register_module("c");

    let recorder = CallbackRecorder::new();
    objects
        .set_module_callback(c, recorder.callback("c"))
        .expect("register c");
    objects
        .set_module_callback(a, recorder.callback("a"))
        .expect("register a");

    let invoked = objects
        .dispatch(silent, ModuleOperation::Initialize, true)
        .expect("dispatch");

    assert_eq!(invoked, 2);
    assert_eq!(recorder.listeners(), vec!["a".to_string(), "c".to_string()]);

    for (_, event) in recorder.events() {
        assert_eq!(event.module, silent);
        assert_eq!(event.module_name, "silent");
        assert_eq!(event.operation, ModuleOperation::Initialize);
        assert!(event.is_future_call);
    }
}

#[test]
fn dispatch_relays_the_future_call_flag() {
    let objects = ObjectManager::new();
    let module = objects.register_module("net");

    let recorder = CallbackRecorder::new();
    objects
        .set_module_callback(module, recorder.callback("net"))
        .expect("register");

    objects
        .dispatch(module, ModuleOperation::Unload, true)
        .expect("before");
    objects
        .dispatch(module, ModuleOperation::Unload, false)
        .expect("after");

    let flags: Vec<bool> = recorder
        .events()
        .into_iter()
        .map(|(_, event)| event.is_future_call)
        .collect();
    assert_eq!(flags, vec![true, false]);
}

#[test]
fn run_operation_brackets_entry_point_with_notifications() {
    let manager = ModuleManager::new();
    let observer = manager.load("observer", None);
    let recorder = CallbackRecorder::new();
    manager
        .objects()
        .set_module_callback(observer, recorder.callback("observer"))
        .expect("register");

    let module = manager.load("net", None);
    manager
        .initialize(module, |_, _| Ok(()), |_, _| Ok(()))
        .expect("initialize");

    let seen: Vec<(ModuleOperation, bool)> = recorder
        .events()
        .into_iter()
        .map(|(_, event)| (event.operation, event.is_future_call))
        .collect();
    assert_eq!(
        seen,
        vec![
            (ModuleOperation::Preinitialize, true),
            (ModuleOperation::Preinitialize, false),
            (ModuleOperation::Initialize, true),
            (ModuleOperation::Initialize, false),
        ]
    );
}

#[test]
fn unload_purges_every_interface_of_the_module() {
    let manager = ModuleManager::new();
    let module = manager.load("net", None);

    let first = MockInterface::new();
    let second = MockInterface::new();
    manager
        .run_operation(module, ModuleOperation::Initialize, |objects, me| {
            objects.publish(me, "Net", Arc::new(first.clone()))?;
            objects.publish(me, "Dns", Arc::new(second.clone()))
        })
        .expect("initialize");
    assert_eq!(manager.stats().interfaces, 2);

    manager.unload(module, |_, _| Ok(())).expect("unload");

    assert!(!manager.objects().exists("Net"));
    assert!(!manager.objects().exists("Dns"));
    assert_eq!(first.destroy_call_count(), 1);
    assert_eq!(second.destroy_call_count(), 1);
    assert_eq!(manager.stats().interfaces, 0);
}

#[test]
fn module_unload_notifies_before_and_after_purge() {
    let manager = ModuleManager::new();
    let watcher = manager.load("watcher", None);
    let module = manager.load("net", None);
    manager
        .objects()
        .publish(module, "Net", Arc::new(MockInterface::new()))
        .expect("publish");

    let objects = manager.objects().clone();
    let observed = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = Arc::clone(&observed);
    manager
        .objects()
        .set_module_callback(
            watcher,
            Arc::new(move |event: &ModuleEvent| {
                if event.operation == ModuleOperation::Unload {
                    sink.lock().push((event.is_future_call, objects.exists("Net")));
                }
            }),
        )
        .expect("register");

    manager.unload(module, |_, _| Ok(())).expect("unload");

    assert_eq!(*observed.lock(), vec![(true, true), (false, false)]);
}

#[test]
fn consumer_loses_interface_when_publisher_unloads() {
    let manager = ModuleManager::new();
    let a = manager.load("a", None);
    let b = manager.load("b", None);

    let created: InterfaceHandle = Arc::new(MockInterface::new());
    let published = Arc::clone(&created);
    manager
        .initialize(a, |_, _| Ok(()), move |objects, me| {
            objects.publish(me, "Net", published)
        })
        .expect("a initializes");
    manager
        .initialize(b, |_, _| Ok(()), |_, _| Ok(()))
        .expect("b initializes");

    let seen_by_b = manager.objects().get("Net").expect("b finds Net");
    assert!(same_interface(&seen_by_b, &created));

    manager.unload(a, |_, _| Ok(())).expect("a unloads");

    let err = manager
        .objects()
        .get("Net")
        .expect_err("Net is gone with its publisher");
    assert!(err.is_not_found());
    assert_eq!(manager.count(), 1);
}
