use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use hookline_core::{Payload, Variant};
use hookline_plugin::{
    Candidate, CandidateOutcome, FnPlugin, HookDescription, HookHandler, Instance, PluginObject,
    Registry, StaticSource,
};

type Log = Arc<Mutex<Vec<String>>>;

fn recorder(name: &str, log: &Log) -> Instance {
    let log = Arc::clone(log);
    let tag = name.to_string();
    FnPlugin::instance(name, move |_, io: Payload| {
        log.lock().unwrap().push(tag.clone());
        io
    })
}

/// An object that never satisfies the handler contract.
struct NotAPlugin;

impl PluginObject for NotAPlugin {
    fn name(&self) -> &str {
        "not-a-plugin"
    }

    fn hook_handler(self: Arc<Self>) -> Option<Arc<dyn HookHandler>> {
        None
    }
}

#[test]
fn test_hook_registration_is_unique() {
    let registry = Registry::default();

    assert!(registry.register_hook(HookDescription::new("MainMenu", "first")));
    assert!(!registry.register_hook(HookDescription::new("MainMenu", "second")));

    let description = registry.get_hook_description("MainMenu").unwrap();
    assert_eq!(description.description, "first");
    assert_eq!(
        registry.list_hooks().iter().filter(|h| h.name == "MainMenu").count(),
        1
    );
}

#[test]
fn test_subscribers_run_by_priority_then_subscription_order() {
    let registry = Registry::default();
    registry.register_hook(HookDescription::new("H", "ordered hook"));
    let log = Log::default();

    registry.subscribe("H", 5, &recorder("H1", &log));
    registry.subscribe("H", 10, &recorder("H2", &log));
    registry.subscribe("H", 5, &recorder("H3", &log));

    registry.invoke_hook("H", Payload::new());
    assert_eq!(*log.lock().unwrap(), ["H2", "H1", "H3"]);

    // Dispatch does not consume subscriptions.
    log.lock().unwrap().clear();
    registry.invoke_hook("H", Payload::new());
    assert_eq!(*log.lock().unwrap(), ["H2", "H1", "H3"]);
}

#[test]
fn test_unknown_hook_returns_payload_unchanged() {
    let registry = Registry::default();
    let out = registry.invoke_hook("Nope", vec![Variant::integer(42)]);
    assert_eq!(out, vec![Variant::integer(42)]);
}

#[test]
fn test_hook_without_subscribers_returns_payload() {
    let registry = Registry::default();
    registry.register_hook(HookDescription::new("Quiet", "nobody listens"));
    let out = registry.invoke_hook("Quiet", vec![Variant::string("x")]);
    assert_eq!(out, vec![Variant::string("x")]);
}

#[test]
fn test_rescan_is_idempotent_and_init_runs_once() {
    let registry = Registry::default();
    let inits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&inits);
    let plugin = FnPlugin::instance("counter", move |cx, io: Payload| {
        if cx.is_init() {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        io
    });

    registry.add_source(StaticSource::new("builtin").with_instance("counter", plugin));

    assert_eq!(registry.scan_for_plugins().len(), 1);
    assert!(registry.scan_for_plugins().is_empty());
    assert!(registry.scan_for_plugins().is_empty());

    assert_eq!(registry.plugin_count(), 1);
    assert_eq!(inits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_factory_not_called_for_loaded_identifier() {
    let registry = Registry::default();
    let built = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&built);

    registry.add_source(StaticSource::new("builtin").with_plugin("lazy", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(FnPlugin::instance("lazy", |_, io| io))
    }));

    registry.scan_for_plugins();
    registry.scan_for_plugins();
    assert_eq!(built.load(Ordering::SeqCst), 1);
}

#[test]
fn test_object_without_handler_is_rejected() {
    let registry = Registry::default();
    let instance: Instance = Arc::new(NotAPlugin);

    assert!(!registry.subscribe("Init", 0, &instance));
    assert_eq!(
        registry.consider_candidate(Candidate::from_instance("bad", instance)),
        CandidateOutcome::Rejected
    );
    assert!(!registry.is_loaded("bad"));
    assert!(registry.list_loaded_plugins().is_empty());
}

#[test]
fn test_failed_instantiation_is_not_loaded() {
    let registry = Registry::default();
    let candidate = Candidate::new("broken", || {
        Err(hookline_plugin::PluginError::LoadError {
            name: "broken".into(),
            message: "syntax error".into(),
        })
    });

    assert_eq!(registry.consider_candidate(candidate), CandidateOutcome::Failed);
    assert_eq!(registry.plugin_count(), 0);
}

#[test]
fn test_plugin_subscribes_during_init() {
    let registry = Registry::default();
    registry.register_hook(HookDescription::new("Greeting", "build a greeting"));

    let greeter = FnPlugin::instance("greeter", |cx, mut io: Payload| {
        if cx.is_init() {
            cx.subscribe_self("Greeting", 0);
        } else if let Some(first) = io.first_mut() {
            let greeting = format!("{}, world", first.as_str());
            first.set_string(greeting);
        }
        io
    });
    registry.add_source(StaticSource::new("builtin").with_instance("greeter", greeter));
    registry.scan_for_plugins();

    let out = registry.invoke_hook("Greeting", vec![Variant::string("hello")]);
    assert_eq!(out, vec![Variant::string("hello, world")]);
}

#[test]
fn test_handler_can_reenter_the_registry() {
    let registry = Registry::default();
    registry.register_hook(HookDescription::new("Count", "counts down slot 0"));

    let countdown = FnPlugin::instance("countdown", |cx, mut io: Payload| {
        let n = io[0].as_integer();
        if n > 0 {
            io[0].set_integer(n - 1);
            io = cx.registry().invoke_hook(cx.hook_name(), io);
        }
        io
    });
    registry.subscribe("Count", 0, &countdown);

    let out = registry.invoke_hook("Count", vec![Variant::integer(3)]);
    assert_eq!(out, vec![Variant::integer(0)]);
}

#[test]
fn test_subscription_during_dispatch_applies_next_time() {
    let registry = Registry::default();
    registry.register_hook(HookDescription::new("Grow", "adds subscribers"));
    let log = Log::default();

    let late = recorder("late", &log);
    let spawner_log = Arc::clone(&log);
    let spawner = FnPlugin::instance("spawner", move |cx, io: Payload| {
        spawner_log.lock().unwrap().push("spawner".into());
        cx.registry().subscribe("Grow", -1, &late);
        io
    });
    registry.subscribe("Grow", 0, &spawner);

    registry.invoke_hook("Grow", Payload::new());
    assert_eq!(*log.lock().unwrap(), ["spawner"]);

    log.lock().unwrap().clear();
    registry.invoke_hook("Grow", Payload::new());
    assert_eq!(*log.lock().unwrap(), ["spawner", "late"]);
}

#[test]
fn test_broadcast_hook_reaches_every_plugin_in_load_order() {
    let registry = Registry::default();
    registry.register_hook(HookDescription::new("Tick", "every plugin").always_invoke());
    let log = Log::default();

    registry.add_source(
        StaticSource::new("builtin")
            .with_instance("b", recorder("b", &log))
            .with_instance("a", recorder("a", &log)),
    );
    registry.scan_for_plugins();
    log.lock().unwrap().clear();

    registry.invoke_hook("Tick", Payload::new());
    assert_eq!(*log.lock().unwrap(), ["b", "a"]);

    let names: Vec<String> = registry
        .list_loaded_plugins()
        .iter()
        .map(|p| p.name().to_string())
        .collect();
    assert_eq!(names, ["b", "a"]);
}

#[test]
fn test_payload_threads_through_handlers() {
    let registry = Registry::default();
    registry.register_hook(HookDescription::new("Pipeline", "appends"));

    let appender = |tag: &'static str| {
        FnPlugin::instance(tag, move |_, mut io: Payload| {
            io.push(Variant::string(tag));
            io
        })
    };
    registry.subscribe("Pipeline", 2, &appender("first"));
    registry.subscribe("Pipeline", 1, &appender("second"));

    let out = registry.invoke_hook("Pipeline", Payload::new());
    assert_eq!(out, vec![Variant::string("first"), Variant::string("second")]);
}
