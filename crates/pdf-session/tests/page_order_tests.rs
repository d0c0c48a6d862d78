use pdf_session::*;

#[test]
fn test_initialize_is_identity() {
    let order = PageOrder::new(4);
    assert_eq!(order.order(), &[0, 1, 2, 3]);
    assert_eq!(order.selection_len(), 0);
    assert!(!order.all_selected());
}

#[test]
fn test_move_swaps_neighbours() {
    let mut order = PageOrder::new(4);
    assert_eq!(order.move_page(1, Direction::Forward), Outcome::Applied);
    assert_eq!(order.order(), &[0, 2, 1, 3]);
    assert_eq!(order.move_page(1, Direction::Backward), Outcome::Applied);
    assert_eq!(order.order(), &[2, 0, 1, 3]);

    let mut sorted = order.order().to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![0, 1, 2, 3]);
}

#[test]
fn test_move_at_endpoints_is_noop() {
    let mut order = PageOrder::new(3);
    assert_eq!(order.move_page(0, Direction::Backward), Outcome::Boundary);
    assert_eq!(order.move_page(2, Direction::Forward), Outcome::Boundary);
    assert_eq!(order.move_page(5, Direction::Forward), Outcome::Boundary);
    assert_eq!(order.order(), &[0, 1, 2]);
}

#[test]
fn test_move_then_delete_scenario() {
    let mut order = PageOrder::new(4);
    assert_eq!(order.move_page(0, Direction::Forward), Outcome::Applied);
    assert_eq!(order.order(), &[1, 0, 2, 3]);
    assert_eq!(order.delete_at(0), Outcome::Applied);
    assert_eq!(order.order(), &[0, 2, 3]);
}

#[test]
fn test_delete_shortens_by_one_until_exhausted() {
    let mut order = PageOrder::new(3);
    assert_eq!(order.delete_at(1), Outcome::Applied);
    assert_eq!(order.len(), 2);
    assert_eq!(order.delete_at(9), Outcome::Boundary);
    assert_eq!(order.len(), 2);
    assert_eq!(order.delete_at(0), Outcome::Applied);
    assert_eq!(order.delete_at(0), Outcome::Exhausted);
    assert!(order.is_empty());
}

#[test]
fn test_selection_is_sorted_regardless_of_click_order() {
    let mut order = PageOrder::new(4);
    assert_eq!(order.toggle_select(2), Some(true));
    assert_eq!(order.toggle_select(0), Some(true));
    assert_eq!(order.selected(), vec![0, 2]);

    assert_eq!(order.toggle_select(2), Some(false));
    assert_eq!(order.selected(), vec![0]);
    assert_eq!(order.toggle_select(10), None);
}

#[test]
fn test_selection_follows_original_index() {
    let mut order = PageOrder::new(3);
    let _ = order.toggle_select(0);
    let _ = order.move_page(0, Direction::Forward);
    assert!(!order.is_selected(0));
    assert!(order.is_selected(1));
    assert_eq!(order.selected(), vec![0]);

    // Deleting a selected page drops it from the selection
    let _ = order.delete_at(1);
    assert!(order.selected().is_empty());
}

#[test]
fn test_select_all_reports_state() {
    let mut order = PageOrder::new(3);
    assert!(order.select_all());
    assert!(order.all_selected());
    assert!(!order.toggle_all());
    assert_eq!(order.selection_len(), 0);
    assert!(order.toggle_all());
    assert!(!order.deselect_all());
}

#[test]
fn test_file_queue_appends_batches() {
    let mut queue = FileQueue::new();
    assert_eq!(
        queue.enqueue(vec![
            QueuedFile::from_bytes("a.pdf", vec![1u8]),
            QueuedFile::from_bytes("b.pdf", vec![2u8]),
        ]),
        2
    );
    assert_eq!(queue.enqueue(vec![QueuedFile::from_bytes("a.pdf", vec![1u8])]), 1);
    assert_eq!(queue.names(), vec!["a.pdf", "b.pdf", "a.pdf"]);

    // Same file queued twice gets distinct handles
    assert_ne!(queue.files()[0].id, queue.files()[2].id);
}

#[test]
fn test_file_queue_move_and_remove() {
    let mut queue = FileQueue::new();
    queue.enqueue(["a.pdf", "b.pdf", "c.pdf"].map(|n| QueuedFile::from_bytes(n, vec![0u8])));

    assert_eq!(queue.move_file(0, Direction::Backward), Outcome::Boundary);
    assert_eq!(queue.move_file(2, Direction::Backward), Outcome::Applied);
    assert_eq!(queue.names(), vec!["a.pdf", "c.pdf", "b.pdf"]);

    assert_eq!(queue.remove_at(0), Outcome::Applied);
    assert_eq!(queue.remove_at(5), Outcome::Boundary);
    assert_eq!(queue.remove_at(0), Outcome::Applied);
    assert_eq!(queue.remove_at(0), Outcome::Exhausted);
    assert!(queue.is_empty());
}

#[test]
fn test_direction_from_offset() {
    assert_eq!(Direction::try_from(-1).unwrap(), Direction::Backward);
    assert_eq!(Direction::try_from(1).unwrap(), Direction::Forward);
    assert!(Direction::try_from(2).is_err());
}
