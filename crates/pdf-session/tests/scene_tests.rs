use image::{Rgba, RgbaImage};
use pdf_session::scene::*;
use pdf_session::*;

fn red_box(x: f32, y: f32) -> SceneObject {
    SceneObject::Rect {
        bounds: Bounds::new(x, y, 20.0, 20.0),
        stroke: None,
        fill: Some(Color::RED),
        stroke_width: 2.0,
    }
}

#[test]
fn test_restore_capture_is_idempotent() {
    let mut canvas = RasterCanvas::new(100, 100);
    canvas.add_object(red_box(10.0, 10.0));
    canvas.add_object(SceneObject::Text {
        origin: Point::new(5.0, 50.0),
        content: "Hi".to_string(),
        color: Color::BLUE,
        font_size: 16.0,
        font_family: "Arial".to_string(),
    });

    let before = canvas.to_raster().unwrap();
    let snapshot = capture(&canvas).unwrap();
    restore(&mut canvas, &snapshot).unwrap();

    assert_eq!(canvas.object_count(), 2);
    assert_eq!(canvas.to_raster().unwrap(), before);
    assert_eq!(capture(&canvas).unwrap(), snapshot);
}

#[test]
fn test_restore_replaces_instead_of_merging() {
    let mut canvas = RasterCanvas::new(100, 100);
    canvas.add_object(red_box(0.0, 0.0));
    let one = capture(&canvas).unwrap();

    canvas.add_object(red_box(50.0, 50.0));
    canvas.add_object(red_box(70.0, 10.0));
    assert_eq!(canvas.object_count(), 3);

    restore(&mut canvas, &one).unwrap();
    assert_eq!(canvas.object_count(), 1);
    assert!(canvas.active_selection().is_empty());
}

#[test]
fn test_restore_keeps_background() {
    let mut canvas = RasterCanvas::new(4, 4);
    canvas.set_background(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255])));
    let empty = capture(&canvas).unwrap();
    canvas.add_object(red_box(0.0, 0.0));

    restore(&mut canvas, &empty).unwrap();
    let raster = canvas.to_raster().unwrap();
    assert_eq!(raster.get_pixel(1, 1), &Rgba([0, 0, 255, 255]));
}

#[test]
fn test_snapshot_rejects_unknown_version() {
    let payload = r#"{"format":"scene","version":99,"scene":{"width":1,"height":1,"objects":[]}}"#;
    let mut canvas = RasterCanvas::new(10, 10);
    let result = restore(&mut canvas, &Snapshot::from_payload(payload));
    assert!(matches!(result, Err(SessionError::Config(_))));

    let garbage = Snapshot::from_payload("not json");
    assert!(matches!(garbage.decode(), Err(SessionError::Scene(_))));
}

#[test]
fn test_overlay_scales_to_larger_surface() {
    // Authored on a 100x100 surface, replayed onto 200x200
    let mut display = RasterCanvas::new(100, 100);
    display.add_object(red_box(40.0, 40.0));
    let snapshot = capture(&display).unwrap();

    let mut export = RasterCanvas::new(200, 200);
    restore(&mut export, &snapshot).unwrap();
    let raster = export.to_raster().unwrap();

    assert_eq!(raster.dimensions(), (200, 200));
    let red = Rgba([220, 38, 38, 255]);
    assert_eq!(raster.get_pixel(100, 100), &red);
    assert_eq!(raster.get_pixel(85, 85), &red);
    assert_eq!(raster.get_pixel(70, 70), &Rgba([255, 255, 255, 255]));
}

#[test]
fn test_highlighter_multiplies() {
    let mut canvas = RasterCanvas::new(40, 20);
    canvas.add_object(SceneObject::Ink {
        points: vec![Point::new(0.0, 10.0), Point::new(40.0, 10.0)],
        color: Color::YELLOW,
        width: 10.0,
        blend: BlendMode::Multiply,
    });
    let raster = canvas.to_raster().unwrap();
    let pixel = raster.get_pixel(20, 10);
    // White multiplied by yellow is yellow
    assert_eq!(pixel.0[0], 250);
    assert_eq!(pixel.0[2], 21);
}

#[test]
fn test_selection_ignores_unknown_objects() {
    let mut canvas = RasterCanvas::new(50, 50);
    let id = canvas.add_object(red_box(0.0, 0.0));
    canvas.set_active_selection(vec![id, ObjectRef::new()]);
    assert_eq!(canvas.active_selection(), vec![id]);

    assert!(canvas.remove_object(id).is_some());
    assert!(canvas.active_selection().is_empty());
    assert!(canvas.remove_object(id).is_none());
}

#[test]
fn test_scene_object_json_shape() {
    let json = r##"{"type":"stamp","origin":{"x":1.0,"y":2.0},"label":"OK","color":{"r":0,"g":0,"b":0,"a":255}}"##;
    let object: SceneObject = serde_json::from_str(json).unwrap();
    assert_eq!(object.type_name(), "stamp");

    let rect: SceneObject = serde_json::from_str(
        r#"{"type":"rect","bounds":{"x":0,"y":0,"width":5,"height":5}}"#,
    )
    .unwrap();
    match rect {
        SceneObject::Rect {
            stroke,
            fill,
            stroke_width,
            ..
        } => {
            assert!(stroke.is_none() && fill.is_none());
            assert_eq!(stroke_width, 2.0);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_color_hex() {
    assert_eq!(Color::from_hex("#ff0000").unwrap(), Color::rgb(255, 0, 0));
    assert_eq!(Color::from_hex("00ff0080").unwrap().a, 0x80);
    assert_eq!(Color::rgb(1, 2, 3).to_hex(), "#010203");
    assert!(Color::from_hex("#12").is_err());
    assert!(Color::from_hex("#zzzzzz").is_err());
}

#[test]
fn test_stamp_bounds_grow_with_label() {
    let short = stamp_bounds(Point::new(0.0, 0.0), "OK");
    let long = stamp_bounds(Point::new(0.0, 0.0), "APPROVED");
    assert!(long.width > short.width);
    assert_eq!(long.height, short.height);
}

fn text_raster(content: &str) -> RgbaImage {
    let mut canvas = RasterCanvas::new(200, 60);
    canvas.add_object(SceneObject::Text {
        origin: Point::new(10.0, 10.0),
        content: content.to_string(),
        color: Color::BLACK,
        font_size: 24.0,
        font_family: "Arial".to_string(),
    });
    canvas.to_raster().unwrap()
}

#[test]
fn test_text_outside_ascii_is_drawn() {
    let accented = text_raster("Größe é");
    let placeholder = text_raster("Gr??e ?");
    assert!(accented.pixels().any(|p| p.0[0] < 128));
    assert_ne!(accented, placeholder);
}

#[test]
fn test_shape_strokes_and_fills() {
    let mut canvas = RasterCanvas::new(100, 100);
    canvas.add_object(SceneObject::Rect {
        bounds: Bounds::new(10.0, 10.0, 40.0, 40.0),
        stroke: Some(Color::BLUE),
        fill: None,
        stroke_width: 4.0,
    });
    canvas.add_object(SceneObject::Ellipse {
        bounds: Bounds::new(60.0, 60.0, 30.0, 30.0),
        stroke: None,
        fill: Some(Color::RED),
        stroke_width: 2.0,
    });
    let raster = canvas.to_raster().unwrap();

    // Rect outline leaves its interior untouched
    assert_ne!(raster.get_pixel(10, 30), &Rgba([255, 255, 255, 255]));
    assert_eq!(raster.get_pixel(30, 30), &Rgba([255, 255, 255, 255]));

    let centre = raster.get_pixel(75, 75);
    assert_eq!((centre.0[0], centre.0[1], centre.0[2]), (220, 38, 38));
    assert_eq!(raster.get_pixel(61, 61), &Rgba([255, 255, 255, 255]));
}
