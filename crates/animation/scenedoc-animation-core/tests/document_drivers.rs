use scenedoc_animation_core::{config::Config, Document, ErrorCode, ErrorSink};
use scenedoc_api_core::json::parse_document_json;

fn load_cube() -> Document {
    let json = scenedoc_test_fixtures::documents::json("cube").expect("cube fixture");
    let root = parse_document_json(&json).expect("parse cube");
    let mut sink = ErrorSink::default();
    Document::load(&root, Config::default(), &mut sink).expect("cube loads")
}

#[test]
fn drivers_stay_unlinked_until_a_value_is_registered() {
    let mut doc = load_cube();
    let squash = doc.curves_of_animation("cube-squash")[0];
    assert!(!doc.find_curve(squash).unwrap().has_driver());

    let mut sink = ErrorSink::lenient();
    assert!(!doc.check_drivers(&mut sink));
    assert!(sink.contains(ErrorCode::AnimCurveDriverMissing));

    // nothing registered: the curve runs on time
    assert_eq!(doc.link_drivers(), 0);
    assert_eq!(doc.evaluate_curve(squash, 0.25), Some(1.5));
}

#[test]
fn linked_driver_replaces_time_as_input() {
    let mut doc = load_cube();
    let squash = doc.curves_of_animation("cube-squash")[0];
    let slider = doc.register_animated("ctrl/slider", vec![0.0, 0.5]);
    assert_eq!(doc.link_drivers(), 1);

    let driver = doc.find_curve(squash).unwrap().driver().expect("linked");
    assert_eq!(driver.handle, slider);
    assert_eq!(driver.component, 1);

    let mut sink = ErrorSink::default();
    assert!(doc.check_drivers(&mut sink));
    assert!(sink.reports().is_empty());

    // time is ignored while the driver resolves
    assert_eq!(doc.evaluate_curve(squash, 0.0), Some(2.0));
    assert_eq!(doc.evaluate_curve(squash, 100.0), Some(2.0));

    doc.animated_mut(slider).unwrap().values[1] = 1.0;
    assert_eq!(doc.evaluate_curve(squash, 0.0), Some(3.0));

    // undriven curves still take time
    let x = doc.curves_of_animation("cube-move")[0];
    assert!(doc.evaluate_curve(x, 1.0).is_some_and(|v| (v - 1.0).abs() < 1e-5));
}

#[test]
fn too_few_components_do_not_link() {
    let mut doc = load_cube();
    doc.register_animated("ctrl/slider", vec![0.5]);
    assert_eq!(doc.link_drivers(), 0);
    let mut sink = ErrorSink::lenient();
    assert!(!doc.check_drivers(&mut sink));
}

#[test]
fn released_driver_falls_back_to_time() {
    let mut doc = load_cube();
    let squash = doc.curves_of_animation("cube-squash")[0];
    let slider = doc.register_animated("ctrl/slider", vec![0.0, 0.5]);
    doc.link_drivers();

    let released = doc.unregister_animated(slider).expect("registered");
    assert_eq!(released.pointer, "ctrl/slider");
    assert!(doc.resolve_animated(slider).is_none());
    assert!(doc.find_animated("ctrl/slider").is_none());
    assert_eq!(doc.evaluate_curve(squash, 0.25), Some(1.5));

    // the slot is reused under a new generation; the old handle stays dead
    let other = doc.register_animated("ctrl/dial", vec![9.0, 9.0]);
    assert_eq!(other.index, slider.index);
    assert_ne!(other.generation, slider.generation);
    assert!(doc.resolve_animated(slider).is_none());
    assert_eq!(doc.evaluate_curve(squash, 0.25), Some(1.5));
}

#[test]
fn registered_values_become_merge_defaults_on_write() {
    let mut doc = load_cube();
    doc.register_animated("cube/translate", vec![0.0, 0.0, 0.0]);
    let _ = doc.write();
    // defaults are consumed by the write
    let translate = &doc.find_animation("cube-move").unwrap().channels[0];
    assert!(translate.default_values().is_empty());
}
