//! End-to-end behavior of an annotation session.

use capmark_core::persistence::AnnotationRecord;
use capmark_core::tools::hit_test_annotation;
use capmark_core::{
    Annotation, AnnotationEngine, AnnotationKind, AnnotationShape, ArrowGeometry, ArrowProperties,
    ArrowheadStyle, CoordinateTransform, EngineConfig, MemoryStore, RectGeometry,
    RectangleProperties, SerializableColor, ToolKind,
};
use futures::executor::block_on;
use kurbo::{Point, Rect, Size};

const IMAGE: Size = Size::new(1000.0, 800.0);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn drag(engine: &mut AnnotationEngine, from: Point, to: Point) -> Option<capmark_core::AnnotationId> {
    engine.draw_start(from);
    engine.draw_update(to);
    engine.draw_end(to)
}

#[test]
fn transform_round_trips() {
    let canvases = [Size::new(640.0, 480.0), Size::new(1920.0, 1080.0), Size::new(37.0, 999.0)];
    let images = [Size::new(1000.0, 800.0), Size::new(3.0, 7.0), Size::new(5120.0, 2880.0)];
    for canvas in canvases {
        for image in images {
            let t = CoordinateTransform::new(canvas, image);
            for p in [Point::new(0.0, 0.0), Point::new(0.3, 1234.5), Point::new(image.width, image.height)] {
                let back = t.to_image(t.to_canvas(p));
                assert!((back.x - p.x).abs() < 1e-6, "{canvas:?} {image:?} {p:?}");
                assert!((back.y - p.y).abs() < 1e-6, "{canvas:?} {image:?} {p:?}");
            }
        }
    }
}

#[test]
fn adds_then_undos_restore_empty_list() {
    init_logging();
    let mut engine = AnnotationEngine::new(IMAGE);
    for i in 0..5 {
        let y = 50.0 + i as f64 * 20.0;
        drag(&mut engine, Point::new(10.0, y), Point::new(200.0, y)).unwrap();
    }
    let full: Vec<Annotation> = engine.annotations().to_vec();

    for _ in 0..5 {
        assert!(engine.undo());
    }
    assert!(engine.annotations().is_empty());

    assert!(!engine.undo());
    for _ in 0..5 {
        assert!(engine.redo());
    }
    assert_eq!(engine.annotations(), full.as_slice());
}

#[test]
fn undo_then_redo_restores_pre_undo_list() {
    let mut engine = AnnotationEngine::new(IMAGE);
    drag(&mut engine, Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    drag(&mut engine, Point::new(0.0, 50.0), Point::new(100.0, 50.0));
    let before = engine.annotations().to_vec();
    assert!(engine.undo());
    assert!(engine.redo());
    assert_eq!(engine.annotations(), before.as_slice());
}

#[test]
fn mutation_after_undo_invalidates_redo() {
    let mut engine = AnnotationEngine::new(IMAGE);
    let first = drag(&mut engine, Point::new(0.0, 0.0), Point::new(100.0, 0.0)).unwrap();
    drag(&mut engine, Point::new(0.0, 50.0), Point::new(100.0, 50.0));
    assert!(engine.undo());
    assert!(engine.can_redo());

    assert!(engine.remove_annotation(first));
    assert!(!engine.can_redo());
    assert!(!engine.redo());
}

#[test]
fn history_is_capped_at_one_hundred() {
    let mut engine = AnnotationEngine::new(IMAGE);
    for i in 0..150 {
        let y = (i % 40) as f64 * 10.0;
        drag(&mut engine, Point::new(0.0, y), Point::new(50.0, y)).unwrap();
    }
    assert_eq!(engine.history().undo_len(), 100);
    assert_eq!(engine.annotations().len(), 150);

    let mut undone = 0;
    while engine.undo() {
        undone += 1;
    }
    assert_eq!(undone, 100);
    assert_eq!(engine.annotations().len(), 50);
}

#[test]
fn configured_history_cap() {
    let config = EngineConfig::from_json(r#"{"max_undo_history": 3}"#).unwrap();
    let mut engine = AnnotationEngine::with_config(IMAGE, config);
    for i in 0..5 {
        let y = i as f64 * 10.0;
        drag(&mut engine, Point::new(0.0, y), Point::new(50.0, y));
    }
    assert_eq!(engine.history().undo_len(), 3);
}

#[test]
fn short_arrow_is_discarded() {
    let mut engine = AnnotationEngine::new(IMAGE);
    engine.select_tool(ToolKind::Arrow);
    assert!(drag(&mut engine, Point::new(0.0, 0.0), Point::new(3.0, 0.0)).is_none());
    assert!(engine.annotations().is_empty());
    assert!(!engine.can_undo());

    assert!(drag(&mut engine, Point::new(0.0, 0.0), Point::new(10.0, 0.0)).is_some());
    assert_eq!(engine.annotations().len(), 1);
    assert_eq!(engine.annotations()[0].kind(), AnnotationKind::Arrow);
}

#[test]
fn rectangle_geometry_normalizes() {
    let bounds = RectGeometry::from_points(Point::new(50.0, 50.0), Point::new(10.0, 10.0)).bounds();
    assert_eq!(bounds, Rect::new(10.0, 10.0, 50.0, 50.0));
    assert!((bounds.width() - 40.0).abs() < f64::EPSILON);
    assert!((bounds.height() - 40.0).abs() < f64::EPSILON);
}

#[test]
fn arrow_record_round_trip() {
    let arrow = Annotation::arrow(
        ArrowProperties {
            color: SerializableColor::from_hex("#FF0000").unwrap(),
            thickness: 3.0,
            arrowhead_style: ArrowheadStyle::Rounded,
        },
        ArrowGeometry::new(Point::new(100.0, 100.0), Point::new(300.0, 200.0)),
    );
    let record = AnnotationRecord::encode(&arrow, IMAGE);
    assert!((record.normalized_x - 0.1).abs() < 1e-9);
    assert!((record.normalized_y - 0.125).abs() < 1e-9);
    assert!((record.normalized_width - 0.2).abs() < 1e-9);
    assert!((record.normalized_height - 0.125).abs() < 1e-9);

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["colorHex"], "#FF0000");
    assert!(json.get("propertiesBlob").is_some());

    let decoded = AnnotationRecord::decode_value(&json, IMAGE).unwrap();
    let bounds = decoded.bounds();
    assert!((bounds.x0 - 100.0).abs() < 1e-9);
    assert!((bounds.y0 - 100.0).abs() < 1e-9);
    assert!((bounds.width() - 200.0).abs() < 1e-9);
    assert!((bounds.height() - 100.0).abs() < 1e-9);
    let AnnotationShape::Arrow { properties, .. } = decoded.shape() else {
        panic!("expected arrow");
    };
    assert_eq!(properties.arrowhead_style, ArrowheadStyle::Rounded);
}

#[test]
fn rectangle_hit_test() {
    let geometry = RectGeometry::new(Point::new(0.0, 0.0), 100.0, 100.0);
    let outline = Annotation::rectangle(
        RectangleProperties {
            thickness: 2.0,
            fill_color: None,
            ..RectangleProperties::default()
        },
        geometry,
    );
    assert!(hit_test_annotation(Point::new(0.0, 50.0), &outline));
    assert!(!hit_test_annotation(Point::new(50.0, 50.0), &outline));

    let filled = Annotation::rectangle(
        RectangleProperties {
            thickness: 2.0,
            fill_color: Some(SerializableColor::blue()),
            ..RectangleProperties::default()
        },
        geometry,
    );
    assert!(hit_test_annotation(Point::new(50.0, 50.0), &filled));
}

#[test]
fn session_survives_store_round_trip() {
    init_logging();
    let store = MemoryStore::new();
    let mut engine = AnnotationEngine::new(IMAGE);
    engine.set_canvas_size(Size::new(500.0, 400.0));

    engine.select_tool(ToolKind::Blur);
    drag(&mut engine, Point::new(10.0, 10.0), Point::new(60.0, 60.0)).unwrap();
    engine.select_tool(ToolKind::Text);
    engine.tap(Point::new(100.0, 100.0));
    engine.insert_text("Check this");
    engine.commit_text().unwrap();

    block_on(engine.save_to(&store, "shot-42")).unwrap();

    // Reloaded at twice the resolution: positions scale with the image
    let mut restored = AnnotationEngine::new(Size::new(2000.0, 1600.0));
    assert_eq!(block_on(restored.load_from(&store, "shot-42")).unwrap(), 2);
    let blur = &restored.annotations()[0];
    assert_eq!(blur.kind(), AnnotationKind::Blur);
    assert!((blur.bounds().x0 - 40.0).abs() < 1e-9);
    assert!((blur.bounds().width() - 200.0).abs() < 1e-9);
    assert!(!restored.can_undo());
}

#[test]
fn live_state_changes_reach_next_event() {
    let mut engine = AnnotationEngine::new(IMAGE);
    engine.select_tool(ToolKind::Rectangle);
    engine.draw_start(Point::new(0.0, 0.0));
    engine.draw_update(Point::new(40.0, 40.0));
    engine.set_thickness(9.0);
    let id = engine.draw_end(Point::new(80.0, 80.0)).unwrap();
    let annotation = engine.history().get(id).unwrap();
    assert!((annotation.thickness() - 9.0).abs() < f64::EPSILON);
}
