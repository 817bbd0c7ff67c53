use std::cell::RefCell;
use std::rc::Rc;

use dotwave_element_core::{
    AttributeValue, ElementConfig, ElementError, ElementHost, InitOutcome, LifecycleController,
    UpdateOutcome, WidgetState,
};
use dotwave_test_fixtures::{
    assert_options_eq, deliver_changes, element_for, scenario, EngineCall, FakeElement,
    RecordingFactory,
};

fn controller(factory: RecordingFactory) -> LifecycleController<RecordingFactory> {
    LifecycleController::new(ElementConfig::default(), factory)
}

fn attached(name: &str) -> FakeElement {
    let mut el = FakeElement::new(name);
    el.connected = true;
    el
}

/// attach + deferred tick
fn mount(ctl: &mut LifecycleController<RecordingFactory>, el: &mut FakeElement) -> InitOutcome {
    let ticket = ctl.on_attach().expect("attach schedules init");
    ctl.complete_init(ticket, el)
}

#[test]
fn attach_constructs_once_with_container_and_markup_options() {
    let factory = RecordingFactory::new();
    let log = factory.log.clone();
    let mut ctl = controller(factory);
    let mut el = element_for("markup-basic").unwrap();

    let ticket = ctl.on_attach().unwrap();
    // Nothing happens until the deferred tick runs.
    assert!(log.is_empty());
    assert_eq!(ctl.state(), WidgetState::Uninitialized);

    assert_eq!(ctl.complete_init(ticket, &mut el), InitOutcome::Constructed);
    assert_eq!(ctl.state(), WidgetState::Initialized);

    let constructs = log.constructs();
    assert_eq!(constructs.len(), 1);
    let (container, options) = &constructs[0];
    assert_eq!(container, "markup-basic");
    assert_options_eq(options, &scenario("markup-basic").unwrap().expected);
    assert_eq!(options.get("numDots"), Some(&AttributeValue::Number(50.0)));
    assert_eq!(options.get("dotColor"), Some(&AttributeValue::Text("red".into())));
    // Absent attributes are left to the engine's defaults.
    assert!(!options.contains_key("maxSpeed"));
}

#[test]
fn update_after_reactive_removed_and_max_speed_changed() {
    let factory = RecordingFactory::new();
    let log = factory.log.clone();
    let mut ctl = controller(factory);
    let mut el = attached("el");
    el.insert_attribute("reactive", "");
    el.insert_attribute("max-speed", "3");
    assert_eq!(mount(&mut ctl, &mut el), InitOutcome::Constructed);

    // Removal while initialized is a change too; consume it first.
    el.remove_attribute("reactive").unwrap();
    assert_eq!(deliver_changes(&mut el, &mut ctl), vec![UpdateOutcome::Applied]);
    let before = log.updates().len();

    el.set_attribute("max-speed", "7").unwrap();
    assert_eq!(deliver_changes(&mut el, &mut ctl), vec![UpdateOutcome::Applied]);

    let updates = log.updates();
    assert_eq!(updates.len(), before + 1);
    let last = updates.last().unwrap();
    assert_eq!(last.get("maxSpeed"), Some(&AttributeValue::Number(7.0)));
    assert!(!last.contains_key("reactive"));
    assert!(!last.contains_key("container"));
}

#[test]
fn identical_values_do_not_reach_the_engine() {
    let factory = RecordingFactory::new();
    let log = factory.log.clone();
    let mut ctl = controller(factory);
    let mut el = attached("el");
    el.insert_attribute("num-dots", "10");
    mount(&mut ctl, &mut el);

    el.set_attribute("num-dots", "10").unwrap();
    assert_eq!(deliver_changes(&mut el, &mut ctl), vec![UpdateOutcome::Unchanged]);
    assert!(log.updates().is_empty());
}

#[test]
fn unrecognized_attribute_changes_are_ignored() {
    let factory = RecordingFactory::new();
    let log = factory.log.clone();
    let mut ctl = controller(factory);
    let mut el = attached("el");
    mount(&mut ctl, &mut el);

    el.set_attribute("class", "hero").unwrap();
    assert_eq!(deliver_changes(&mut el, &mut ctl), vec![UpdateOutcome::Unrecognized]);
    assert!(log.updates().is_empty());
}

#[test]
fn changes_before_init_are_dropped_and_init_reads_current_values() {
    let factory = RecordingFactory::new();
    let log = factory.log.clone();
    let mut ctl = controller(factory);
    let mut el = attached("el");
    el.insert_attribute("max-speed", "3");

    let ticket = ctl.on_attach().unwrap();
    el.set_attribute("max-speed", "5").unwrap();
    assert_eq!(deliver_changes(&mut el, &mut ctl), vec![UpdateOutcome::NotInitialized]);
    el.set_attribute("max-speed", "9").unwrap();

    assert_eq!(ctl.complete_init(ticket, &mut el), InitOutcome::Constructed);
    let (_, options) = &log.constructs()[0];
    assert_eq!(options.get("maxSpeed"), Some(&AttributeValue::Number(9.0)));

    // The next update reflects the value at call time, not a replay.
    el.take_changes();
    el.set_attribute("max-speed", "11").unwrap();
    deliver_changes(&mut el, &mut ctl);
    assert_eq!(log.updates().len(), 1);
    assert_eq!(
        log.updates()[0].get("maxSpeed"),
        Some(&AttributeValue::Number(11.0))
    );
}

#[test]
fn initialize_twice_is_a_no_op() {
    let factory = RecordingFactory::new();
    let log = factory.log.clone();
    let mut ctl = controller(factory);
    let mut el = attached("el");

    assert_eq!(ctl.initialize(&mut el), InitOutcome::Constructed);
    assert_eq!(ctl.initialize(&mut el), InitOutcome::AlreadyInitialized);
    assert_eq!(ctl.on_attach(), None);
    assert_eq!(log.constructs().len(), 1);
}

#[test]
fn detach_destroys_exactly_once() {
    let factory = RecordingFactory::new();
    let log = factory.log.clone();
    let mut ctl = controller(factory);
    let mut el = attached("el");
    mount(&mut ctl, &mut el);

    el.connected = false;
    assert!(ctl.on_detach());
    assert_eq!(ctl.state(), WidgetState::Destroyed);
    assert!(ctl.engine_handle().is_none());
    assert_eq!(log.destroys(), 1);

    assert!(!ctl.destroy());
    assert!(!ctl.on_detach());
    assert_eq!(log.destroys(), 1);
    assert_eq!(ctl.state(), WidgetState::Destroyed);
}

#[test]
fn destroy_twice_matches_destroy_once() {
    let factory = RecordingFactory::new();
    let log = factory.log.clone();
    let mut ctl = controller(factory);
    let mut el = attached("el");
    mount(&mut ctl, &mut el);

    assert!(ctl.destroy());
    assert!(!ctl.destroy());
    assert_eq!(ctl.state(), WidgetState::Destroyed);
    assert!(ctl.engine_handle().is_none());
    assert_eq!(log.destroys(), 1);

    // Destroyed widgets ignore updates and control calls.
    el.set_attribute("num-dots", "3").unwrap();
    assert_eq!(deliver_changes(&mut el, &mut ctl), vec![UpdateOutcome::NotInitialized]);
    assert!(!ctl.pause());
    assert!(!ctl.resume());
    assert_eq!(ctl.initialize(&mut el), InitOutcome::Destroyed);
    assert_eq!(log.len(), 2);
}

#[test]
fn reattach_after_destroy_builds_a_fresh_handle() {
    let factory = RecordingFactory::new();
    let log = factory.log.clone();
    let mut ctl = controller(factory);
    let mut el = attached("el");
    mount(&mut ctl, &mut el);
    let first = ctl.engine_handle().unwrap().id;

    el.connected = false;
    ctl.on_detach();
    el.connected = true;
    assert_eq!(mount(&mut ctl, &mut el), InitOutcome::Constructed);

    let second = ctl.engine_handle().unwrap().id;
    assert_ne!(first, second);
    assert_eq!(log.constructs().len(), 2);
    assert_eq!(log.destroys(), 1);
}

#[test]
fn pause_and_resume_forward_only_with_a_handle() {
    let factory = RecordingFactory::new();
    let log = factory.log.clone();
    let mut ctl = controller(factory);
    let mut el = attached("el");

    assert!(!ctl.pause());
    assert!(!ctl.resume());
    assert!(!ctl.destroy());
    assert!(log.is_empty());

    mount(&mut ctl, &mut el);
    assert!(ctl.pause());
    assert!(ctl.resume());
    let calls = log.calls();
    assert_eq!(calls[1], EngineCall::Pause { handle: 0 });
    assert_eq!(calls[2], EngineCall::Resume { handle: 0 });
    assert_eq!(ctl.state(), WidgetState::Initialized);
}

#[test]
fn missing_engine_leaves_widget_uninitialized_and_untouched() {
    let reports = Rc::new(RefCell::new(Vec::new()));
    let sink = {
        let reports = reports.clone();
        move |err: &ElementError| reports.borrow_mut().push(err.clone())
    };
    let mut ctl = controller(RecordingFactory::unavailable()).with_sink(sink);
    let mut el = attached("el");

    let outcome = mount(&mut ctl, &mut el);
    let expected = ElementError::MissingEngine {
        name: "DotWave".into(),
    };
    assert_eq!(outcome, InitOutcome::Failed(expected.clone()));
    assert_eq!(ctl.state(), WidgetState::Uninitialized);
    assert_eq!(ctl.last_error(), Some(&expected));
    assert_eq!(reports.borrow().as_slice(), &[expected]);
    // Checked before styling.
    assert_eq!(el.inline("display"), None);

    // A later attach may retry.
    assert!(ctl.on_attach().is_some());
}

#[test]
fn construction_failure_keeps_no_handle() {
    let reports = Rc::new(RefCell::new(0usize));
    let sink = {
        let reports = reports.clone();
        move |_: &ElementError| *reports.borrow_mut() += 1
    };
    let mut ctl = controller(RecordingFactory::failing("bad canvas")).with_sink(sink);
    let mut el = attached("el");

    let outcome = mount(&mut ctl, &mut el);
    assert!(matches!(
        outcome,
        InitOutcome::Failed(ElementError::ConstructionFailure(ref r)) if r == "bad canvas"
    ));
    assert_eq!(ctl.state(), WidgetState::Uninitialized);
    assert!(ctl.engine_handle().is_none());
    assert_eq!(*reports.borrow(), 1);
    assert!(!ctl.destroy());
}

#[test]
fn disabled_diagnostics_still_record_the_error() {
    let reports = Rc::new(RefCell::new(0usize));
    let sink = {
        let reports = reports.clone();
        move |_: &ElementError| *reports.borrow_mut() += 1
    };
    let mut config = ElementConfig::default();
    config.diagnostics.enabled = false;
    let mut ctl =
        LifecycleController::new(config, RecordingFactory::unavailable()).with_sink(sink);
    let mut el = attached("el");

    mount(&mut ctl, &mut el);
    assert_eq!(*reports.borrow(), 0);
    assert!(ctl.last_error().is_some());
}

#[test]
fn failing_engine_calls_are_contained() {
    let factory = RecordingFactory::new().with_failing_method("destroy");
    let log = factory.log.clone();
    let mut ctl = controller(factory);
    let mut el = attached("el");
    mount(&mut ctl, &mut el);

    assert!(ctl.destroy());
    assert_eq!(ctl.state(), WidgetState::Destroyed);
    assert!(ctl.engine_handle().is_none());
    assert!(matches!(
        ctl.last_error(),
        Some(ElementError::EngineCall { method: "destroy", .. })
    ));
    assert_eq!(log.destroys(), 1);
}

#[test]
fn failing_update_reports_and_stays_initialized() {
    let factory = RecordingFactory::new().with_failing_method("updateOptions");
    let mut ctl = controller(factory);
    let mut el = attached("el");
    mount(&mut ctl, &mut el);

    el.set_attribute("friction", "0.5").unwrap();
    let outcomes = deliver_changes(&mut el, &mut ctl);
    assert!(matches!(outcomes[0], UpdateOutcome::Failed(_)));
    assert_eq!(ctl.state(), WidgetState::Initialized);
}

#[test]
fn detach_before_tick_skips_initialization() {
    let factory = RecordingFactory::new();
    let log = factory.log.clone();
    let mut ctl = controller(factory);
    let mut el = attached("el");

    let ticket = ctl.on_attach().unwrap();
    el.connected = false;
    assert!(!ctl.on_detach());
    assert!(!ctl.has_pending_init());

    assert_eq!(ctl.complete_init(ticket, &mut el), InitOutcome::Stale);
    assert!(log.is_empty());
    assert_eq!(ctl.state(), WidgetState::Uninitialized);
}

#[test]
fn disconnected_host_at_tick_is_skipped() {
    let factory = RecordingFactory::new();
    let log = factory.log.clone();
    let mut ctl = controller(factory);
    let mut el = FakeElement::new("el");

    let ticket = ctl.on_attach().unwrap();
    assert_eq!(ctl.complete_init(ticket, &mut el), InitOutcome::Detached);
    assert!(log.is_empty());
}

#[test]
fn unguarded_init_proceeds_on_a_detached_element() {
    let factory = RecordingFactory::new();
    let log = factory.log.clone();
    let config = ElementConfig {
        guard_detached_init: false,
        ..ElementConfig::default()
    };
    let mut ctl = LifecycleController::new(config, factory);
    let mut el = attached("el");

    let ticket = ctl.on_attach().unwrap();
    el.connected = false;
    ctl.on_detach();
    assert_eq!(ctl.complete_init(ticket, &mut el), InitOutcome::Constructed);
    assert_eq!(log.constructs().len(), 1);
}

#[test]
fn only_the_latest_ticket_initializes() {
    let factory = RecordingFactory::new();
    let log = factory.log.clone();
    let mut ctl = controller(factory);
    let mut el = attached("el");

    let first = ctl.on_attach().unwrap();
    let second = ctl.on_attach().unwrap();
    assert_eq!(ctl.complete_init(first, &mut el), InitOutcome::Stale);
    assert_eq!(ctl.complete_init(second, &mut el), InitOutcome::Constructed);
    assert_eq!(ctl.complete_init(second, &mut el), InitOutcome::Stale);
    assert_eq!(log.constructs().len(), 1);
}
