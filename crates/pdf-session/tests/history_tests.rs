use pdf_session::scene::*;
use pdf_session::*;

fn dot(x: f32) -> SceneObject {
    SceneObject::Ink {
        points: vec![Point::new(x, 10.0), Point::new(x + 5.0, 10.0)],
        color: Color::BLACK,
        width: 2.0,
        blend: BlendMode::Normal,
    }
}

fn scene_of(canvas: &RasterCanvas) -> Scene {
    capture(canvas).unwrap().decode().unwrap()
}

#[test]
fn test_undo_n_times_returns_to_start_and_redo_replays() {
    let mut canvas = RasterCanvas::new(200, 100);
    let mut undo = UndoController::new(10);
    undo.reset(&canvas).unwrap();
    let start = scene_of(&canvas);

    for i in 0..5 {
        canvas.add_object(dot(i as f32 * 10.0));
        undo.record_mutation(&canvas).unwrap();
    }
    let end = scene_of(&canvas);
    assert_eq!(undo.history().undo_len(), 5);

    for _ in 0..5 {
        assert_eq!(undo.undo(&mut canvas).unwrap(), Outcome::Applied);
    }
    assert_eq!(scene_of(&canvas), start);
    assert_eq!(undo.undo(&mut canvas).unwrap(), Outcome::Boundary);

    for _ in 0..5 {
        assert_eq!(undo.redo(&mut canvas).unwrap(), Outcome::Applied);
    }
    assert_eq!(scene_of(&canvas), end);
    assert_eq!(undo.redo(&mut canvas).unwrap(), Outcome::Boundary);
}

#[test]
fn test_undo_on_empty_history_keeps_redo() {
    let mut canvas = RasterCanvas::new(200, 100);
    let mut undo = UndoController::new(10);
    undo.reset(&canvas).unwrap();

    canvas.add_object(dot(0.0));
    undo.record_mutation(&canvas).unwrap();
    assert_eq!(undo.undo(&mut canvas).unwrap(), Outcome::Applied);
    assert_eq!(undo.history().redo_len(), 1);

    assert_eq!(undo.undo(&mut canvas).unwrap(), Outcome::Boundary);
    assert_eq!(undo.history().redo_len(), 1);
    assert_eq!(canvas.object_count(), 0);
}

#[test]
fn test_mutation_after_undo_clears_redo() {
    let mut canvas = RasterCanvas::new(200, 100);
    let mut undo = UndoController::new(10);
    undo.reset(&canvas).unwrap();

    for i in 0..3 {
        canvas.add_object(dot(i as f32));
        undo.record_mutation(&canvas).unwrap();
    }
    let _ = undo.undo(&mut canvas).unwrap();
    let _ = undo.undo(&mut canvas).unwrap();
    assert!(undo.history().can_redo());

    canvas.add_object(dot(50.0));
    undo.record_mutation(&canvas).unwrap();
    assert!(!undo.history().can_redo());
    assert_eq!(undo.redo(&mut canvas).unwrap(), Outcome::Boundary);
    assert_eq!(canvas.object_count(), 2);
}

#[test]
fn test_capacity_evicts_oldest() {
    let mut canvas = RasterCanvas::new(200, 100);
    let mut undo = UndoController::new(3);
    undo.reset(&canvas).unwrap();

    for i in 0..5 {
        canvas.add_object(dot(i as f32));
        undo.record_mutation(&canvas).unwrap();
    }
    assert_eq!(undo.history().undo_len(), 3);

    while undo.undo(&mut canvas).unwrap() == Outcome::Applied {}
    // Two oldest states were evicted
    assert_eq!(canvas.object_count(), 2);
}

#[test]
fn test_reset_forgets_history() {
    let mut canvas = RasterCanvas::new(200, 100);
    let mut undo = UndoController::new(10);
    undo.reset(&canvas).unwrap();

    canvas.add_object(dot(0.0));
    undo.record_mutation(&canvas).unwrap();
    undo.reset(&canvas).unwrap();

    assert!(!undo.history().can_undo());
    assert_eq!(undo.undo(&mut canvas).unwrap(), Outcome::Boundary);
    assert_eq!(canvas.object_count(), 1);
}

#[test]
fn test_history_stack_bounds() {
    let mut history = History::new(2);
    let snap = |s: &str| Snapshot::from_payload(s);

    history.push(snap("a"));
    history.push(snap("b"));
    history.push(snap("c"));
    assert_eq!(history.undo_len(), 2);

    assert_eq!(history.undo(snap("d")), Some(snap("c")));
    assert_eq!(history.redo_len(), 1);
    assert_eq!(history.redo(snap("c")), Some(snap("d")));
    assert_eq!(history.undo_len(), 2);

    history.clear();
    assert!(!history.can_undo());
    assert!(history.undo(snap("x")).is_none());
    assert_eq!(history.redo_len(), 0);
}
