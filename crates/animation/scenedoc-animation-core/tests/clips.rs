use scenedoc_animation_core::{
    baking::{bake_clip, bake_clips, export_baked_json},
    config::Config,
    ids::CurveId,
    Clip, Document, ErrorCode, ErrorSink, Severity,
};
use scenedoc_api_core::json::parse_document_json;

fn load_cube() -> (Document, ErrorSink) {
    let json = scenedoc_test_fixtures::documents::json("cube").expect("cube fixture");
    let root = parse_document_json(&json).expect("parse cube");
    let mut sink = ErrorSink::default();
    let doc = Document::load(&root, Config::default(), &mut sink).expect("cube loads");
    (doc, sink)
}

fn clip<'d>(doc: &'d Document, id: &str) -> &'d Clip {
    doc.clips
        .iter()
        .find(|c| c.element_id == id)
        .unwrap_or_else(|| panic!("clip {id}"))
}

#[test]
fn clips_resolve_instances_recursively() {
    let (doc, sink) = load_cube();
    assert_eq!(doc.clips.len(), 3);

    let walk = clip(&doc, "walk");
    assert_eq!(walk.name, "Walk");
    assert_eq!((walk.start, walk.end), (0.0, 2.0));
    assert_eq!(walk.curve_ids(), doc.curves_of_animation("cube-move").as_slice());
    assert!(sink.contains(ErrorCode::ClipAnimationMissing));

    // cube-spin instantiates its nested cube-squash too
    let spin = clip(&doc, "spin");
    assert_eq!(spin.curve_ids().len(), 2);
    let squash = doc.curves_of_animation("cube-squash");
    assert!(spin.contains(squash[0]));
    assert_eq!(doc.owner_of(squash[0]).map(|a| a.id.as_str()), Some("cube-squash"));

    let idle = clip(&doc, "idle");
    assert!(idle.curve_ids().is_empty());
    assert!(sink.contains(ErrorCode::ClipWindowEmpty));
    assert!(sink.contains(ErrorCode::ClipEmpty));
    assert!(!sink.has_errors());
    assert_eq!(sink.count(Severity::Warning), 3);
}

#[test]
fn clip_ids_are_unique() {
    let (mut doc, _) = load_cube();
    let added = doc.add_clip("extra").id();
    let mut ids: Vec<_> = doc.clips.iter().map(Clip::id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);
    assert_eq!(doc.clip(added).map(|c| c.element_id.as_str()), Some("extra"));
}

#[test]
fn curves_shared_between_clips() {
    let (mut doc, _) = load_cube();
    let x = doc.curves_of_animation("cube-move")[0];
    let extra = doc.add_clip("extra");
    assert!(extra.add_curve(x));
    assert!(!extra.add_curve(x));
    let holders: Vec<&str> = doc.clips_containing(x).map(|c| c.element_id.as_str()).collect();
    assert_eq!(holders, vec!["walk", "extra"]);
}

#[test]
fn removed_animation_leaves_dangling_ids() {
    let (mut doc, _) = load_cube();
    let removed = doc.remove_animation("cube-move").expect("top-level animation");
    assert_eq!(removed.channels.len(), 1);
    assert!(doc.remove_animation("cube-squash").is_none(), "nested ids are not top-level");

    let walk = clip(&doc, "walk");
    assert_eq!(walk.curve_ids().len(), 3);
    assert!(walk.curves(&doc).is_empty());
    assert_eq!(doc.evaluate_curve(walk.curve_ids()[0], 0.5), None);

    let mut walk = walk.clone();
    assert_eq!(walk.prune(&doc), 3);
    assert!(walk.curve_ids().is_empty());

    let mut spin = clip(&doc, "spin").clone();
    spin.add_curve(CurveId(9999));
    assert_eq!(spin.curves(&doc).len(), 2);
    assert_eq!(spin.prune(&doc), 1);
}

#[test]
fn clip_write_names_owning_animations() {
    let (mut doc, _) = load_cube();
    let root = doc.write();
    let library = root
        .child("library_animation_clips")
        .expect("clip library");
    let urls = |id: &str| -> Vec<String> {
        library
            .find_by_id(id)
            .map(|n| {
                n.children_named("instance_animation")
                    .filter_map(|i| i.attribute("url"))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    };
    // the missing instance is not written back
    assert_eq!(urls("walk"), vec!["#cube-move"]);
    assert_eq!(urls("spin"), vec!["#cube-spin", "#cube-squash"]);
    assert!(urls("idle").is_empty());

    let walk = library.find_by_id("walk").expect("walk");
    assert_eq!(walk.attribute("name"), Some("Walk"));
    assert_eq!(walk.attribute("start"), Some("0"));
    assert_eq!(walk.attribute("end"), Some("2"));
}

#[test]
fn baking_a_clip_samples_its_window() {
    let (doc, _) = load_cube();
    let walk = clip(&doc, "walk");
    let baked = bake_clip(&doc, walk, 2.0);
    assert_eq!(baked.clip, "walk");
    assert_eq!(baked.curves.len(), 3);
    for curve in &baked.curves {
        assert_eq!(curve.values.len(), 5);
    }
    // keys sit at 0, 1, 2
    let x = &baked.curves[0].values;
    assert!((x[0] - 0.0).abs() < 1e-4);
    assert!((x[2] - 1.0).abs() < 1e-4);
    assert!((x[4] - 0.0).abs() < 1e-4);
    assert!((baked.curves[1].values[2] - 2.0).abs() < 1e-4);
    assert!((baked.curves[2].values[2] - 3.0).abs() < 1e-4);

    let idle = bake_clip(&doc, clip(&doc, "idle"), 30.0);
    assert!(idle.curves.is_empty());
    assert_eq!((idle.start_time, idle.end_time), (1.0, 1.0));

    let json = export_baked_json(&baked);
    assert_eq!(json["clip"], "walk");
    assert_eq!(json["curves"].as_array().map(Vec::len), Some(3));
}

#[test]
fn document_rate_drives_bulk_baking() {
    let json = scenedoc_test_fixtures::documents::json("cube").expect("cube fixture");
    let root = parse_document_json(&json).expect("parse cube");
    let config: Config = scenedoc_test_fixtures::configs::load("linear-1d").expect("config");
    let mut sink = ErrorSink::default();
    let doc = Document::load(&root, config, &mut sink).expect("cube loads");

    let baked = bake_clips(&doc);
    let names: Vec<&str> = baked.iter().map(|b| b.clip.as_str()).collect();
    assert_eq!(names, vec!["walk", "spin", "idle"]);
    assert!(baked.iter().all(|b| b.frame_rate == 24.0));
    // 2 seconds at 24 Hz, both ends included
    assert_eq!(baked[0].curves[0].values.len(), 49);
}

#[test]
fn unbounded_clip_window_bakes_without_samples() {
    let (mut doc, _) = load_cube();
    let x = doc.curves_of_animation("cube-move")[0];
    for (id, end) in [("far", 1e30), ("forever", f32::INFINITY)] {
        let clip = doc.add_clip(id);
        clip.start = 0.0;
        clip.end = end;
        clip.add_curve(x);
    }

    let baked = bake_clips(&doc);
    assert_eq!(baked.len(), 5);
    for clip in &baked[3..] {
        assert_eq!(clip.curves.len(), 1);
        assert!(clip.curves[0].values.is_empty(), "{}", clip.clip);
    }
    // ordinary clips are unaffected
    assert_eq!(baked[0].curves[0].values.len(), 61);
}
