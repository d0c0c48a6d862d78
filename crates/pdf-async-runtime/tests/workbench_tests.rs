use lopdf::{Dictionary, Document, Object, Stream};
use pdf_async_runtime::*;
use pdf_session::PageBoxRenderer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

fn create_test_pdf(num_pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..num_pages)
        .map(|i| {
            let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));
            let page_id = doc.add_object(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(100 + i as i64),
                        Object::Integer(150),
                    ]),
                ),
                ("Contents", Object::Reference(content_id)),
            ]));
            Object::Reference(page_id)
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(num_pages as i64)),
        ])),
    );
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    writer
}

fn write_pdf(dir: &Path, name: &str, num_pages: usize) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, create_test_pdf(num_pages)).unwrap();
    path
}

fn workbench() -> Workbench {
    Workbench::new(Arc::new(PageBoxRenderer), SessionOptions::default())
}

fn notice_kind(updates: &[SessionUpdate]) -> Option<NoticeKind> {
    updates.iter().find_map(|update| match update {
        SessionUpdate::Notice { kind, .. } => Some(*kind),
        _ => None,
    })
}

fn stroke() -> Vec<Point> {
    vec![Point::new(10.0, 10.0), Point::new(40.0, 30.0)]
}

#[tokio::test]
async fn test_clean_session_leaves_without_prompt() {
    let mut bench = workbench();
    let updates = bench.handle(SessionCommand::Open(Screen::Editor)).await;
    assert!(matches!(
        updates[..],
        [SessionUpdate::ScreenChanged {
            screen: Screen::Editor
        }]
    ));

    let updates = bench.handle(SessionCommand::GoHome).await;
    assert!(matches!(
        updates[..],
        [SessionUpdate::ScreenChanged {
            screen: Screen::Home
        }]
    ));
}

#[tokio::test]
async fn test_dirty_editor_asks_before_going_home() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "doc.pdf", 2);
    let mut bench = workbench();

    bench.handle(SessionCommand::Open(Screen::Editor)).await;
    bench.handle(SessionCommand::EditorLoad { path }).await;
    bench
        .handle(SessionCommand::EditorSetTool { tool: Tool::Pen })
        .await;
    let updates = bench
        .handle(SessionCommand::EditorStroke { points: stroke() })
        .await;
    assert!(updates.iter().any(|u| matches!(
        u,
        SessionUpdate::EditorState {
            dirty: true,
            can_undo: true,
            ..
        }
    )));

    let updates = bench.handle(SessionCommand::GoHome).await;
    assert!(matches!(updates[..], [SessionUpdate::UnsavedChanges]));
    assert_eq!(bench.screen(), Screen::Editor);

    let updates = bench.handle(SessionCommand::ConfirmDiscard).await;
    assert!(matches!(
        updates[..],
        [SessionUpdate::ScreenChanged {
            screen: Screen::Home
        }]
    ));
    assert!(!bench.editor().is_dirty());
    assert!(bench.editor().document().is_none());
}

#[tokio::test]
async fn test_editor_page_boundary_is_a_notice() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "doc.pdf", 2);
    let mut bench = workbench();
    bench.handle(SessionCommand::EditorLoad { path }).await;

    let updates = bench
        .handle(SessionCommand::EditorChangePage { offset: -1 })
        .await;
    assert_eq!(notice_kind(&updates), Some(NoticeKind::BoundaryNoOp));

    let updates = bench
        .handle(SessionCommand::EditorChangePage { offset: 1 })
        .await;
    assert!(updates.iter().any(|u| matches!(
        u,
        SessionUpdate::EditorState {
            page: 2,
            page_count: 2,
            ..
        }
    )));
    assert!(
        updates
            .iter()
            .any(|u| matches!(u, SessionUpdate::EditorRaster { page: 2, .. }))
    );
}

#[tokio::test]
async fn test_undo_with_empty_history_is_a_notice() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "doc.pdf", 1);
    let mut bench = workbench();
    bench.handle(SessionCommand::EditorLoad { path }).await;

    let updates = bench.handle(SessionCommand::EditorUndo).await;
    assert_eq!(notice_kind(&updates), Some(NoticeKind::BoundaryNoOp));
}

#[tokio::test]
async fn test_unreadable_file_is_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.pdf");
    std::fs::write(&path, b"not a pdf").unwrap();
    let mut bench = workbench();

    let updates = bench.handle(SessionCommand::OrganizeLoad { path }).await;
    assert_eq!(notice_kind(&updates), Some(NoticeKind::LoadFailure));

    let missing = dir.path().join("missing.pdf");
    let updates = bench
        .handle(SessionCommand::SplitLoad { path: missing })
        .await;
    assert_eq!(notice_kind(&updates), Some(NoticeKind::LoadFailure));
}

#[tokio::test]
async fn test_organize_move_delete_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "doc.pdf", 3);
    let mut bench = workbench();
    bench.handle(SessionCommand::Open(Screen::Organize)).await;
    bench.handle(SessionCommand::OrganizeLoad { path }).await;

    let updates = bench
        .handle(SessionCommand::OrganizeMove {
            position: 0,
            direction: Direction::Backward,
        })
        .await;
    assert_eq!(notice_kind(&updates), Some(NoticeKind::BoundaryNoOp));

    let updates = bench
        .handle(SessionCommand::OrganizeMove {
            position: 0,
            direction: Direction::Forward,
        })
        .await;
    match &updates[..] {
        [SessionUpdate::OrganizeOrder { order, dirty }] => {
            assert_eq!(order, &vec![1, 0, 2]);
            assert!(dirty);
        }
        other => panic!("unexpected updates: {other:?}"),
    }

    bench
        .handle(SessionCommand::OrganizeDelete { position: 2 })
        .await;
    let updates = bench
        .handle(SessionCommand::OrganizeExport {
            name: "reordered".to_string(),
            output_dir: dir.path().to_path_buf(),
        })
        .await;
    let exported = updates
        .iter()
        .find_map(|u| match u {
            SessionUpdate::Exported { path } => Some(path.clone()),
            _ => None,
        })
        .expect("exported");
    assert_eq!(exported, dir.path().join("reordered.pdf"));

    let doc = Document::load(&exported).unwrap();
    assert_eq!(doc.get_pages().len(), 2);
    assert!(!bench.organize().is_dirty());
}

#[tokio::test]
async fn test_organize_delete_last_page_reports_exhausted() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "doc.pdf", 1);
    let mut bench = workbench();
    bench.handle(SessionCommand::OrganizeLoad { path }).await;

    let updates = bench
        .handle(SessionCommand::OrganizeDelete { position: 0 })
        .await;
    assert!(
        updates
            .iter()
            .any(|u| matches!(u, SessionUpdate::OrganizeExhausted))
    );
}

#[tokio::test]
async fn test_split_empty_selection_is_a_notice() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "doc.pdf", 3);
    let mut bench = workbench();
    bench.handle(SessionCommand::SplitLoad { path }).await;

    let updates = bench
        .handle(SessionCommand::SplitExport {
            name: "out".to_string(),
            output_dir: dir.path().to_path_buf(),
        })
        .await;
    assert_eq!(notice_kind(&updates), Some(NoticeKind::EmptySelection));
    assert!(!dir.path().join("out.pdf").exists());

    let updates = bench.handle(SessionCommand::SplitToggleAll).await;
    match &updates[..] {
        [
            SessionUpdate::SplitSelection {
                page_count,
                selected,
                all_selected,
            },
        ] => {
            assert_eq!(*page_count, 3);
            assert_eq!(selected, &vec![0, 1, 2]);
            assert!(all_selected);
        }
        other => panic!("unexpected updates: {other:?}"),
    }

    let updates = bench
        .handle(SessionCommand::SplitToggle { position: 7 })
        .await;
    assert_eq!(notice_kind(&updates), Some(NoticeKind::BoundaryNoOp));
}

#[tokio::test]
async fn test_thumbnail_update_carries_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "doc.pdf", 2);
    let mut bench = workbench();
    bench.handle(SessionCommand::SplitLoad { path }).await;

    let updates = bench
        .handle(SessionCommand::SplitRenderThumbnail { position: 1 })
        .await;
    match &updates[..] {
        [
            SessionUpdate::PageImage {
                screen: Screen::Split,
                position: 1,
                width,
                height,
                rgba_data,
            },
        ] => assert_eq!(rgba_data.len(), (*width * *height * 4) as usize),
        other => panic!("unexpected updates: {other:?}"),
    }
}

#[tokio::test]
async fn test_worker_merges_queue_with_progress() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_pdf(dir.path(), "a.pdf", 2);
    let second = write_pdf(dir.path(), "b.pdf", 1);

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(worker_task(
        command_rx,
        update_tx,
        SessionOptions::default(),
        Arc::new(PageBoxRenderer),
    ));

    command_tx
        .send(SessionCommand::Open(Screen::Merge))
        .unwrap();
    command_tx
        .send(SessionCommand::MergeEnqueue {
            paths: vec![first, second],
        })
        .unwrap();
    command_tx
        .send(SessionCommand::MergeExport {
            name: String::new(),
            output_dir: dir.path().to_path_buf(),
        })
        .unwrap();
    drop(command_tx);
    worker.await.unwrap();

    let mut updates = Vec::new();
    while let Ok(update) = update_rx.try_recv() {
        updates.push(update);
    }

    assert!(updates.iter().any(|u| matches!(
        u,
        SessionUpdate::MergeQueue { names } if names == &vec!["a.pdf".to_string(), "b.pdf".to_string()]
    )));
    let progress_at = updates
        .iter()
        .position(|u| matches!(u, SessionUpdate::Progress { .. }))
        .expect("progress reported");
    let exported_at = updates
        .iter()
        .position(|u| matches!(u, SessionUpdate::Exported { .. }))
        .expect("exported");
    assert!(progress_at < exported_at);

    if let SessionUpdate::Exported { path } = &updates[exported_at] {
        let doc = Document::load(path).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }
}

#[tokio::test]
async fn test_worker_merges_zoom_bursts() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "doc.pdf", 1);

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();

    command_tx.send(SessionCommand::EditorLoad { path }).unwrap();
    command_tx
        .send(SessionCommand::EditorZoom { delta: 0.25 })
        .unwrap();
    command_tx
        .send(SessionCommand::EditorZoom { delta: 0.25 })
        .unwrap();
    command_tx.send(SessionCommand::EditorUndo).unwrap();
    drop(command_tx);

    worker_task(
        command_rx,
        update_tx,
        SessionOptions::default(),
        Arc::new(PageBoxRenderer),
    )
    .await;

    let mut zooms = Vec::new();
    let mut saw_undo_notice = false;
    while let Ok(update) = update_rx.try_recv() {
        match update {
            SessionUpdate::EditorState { zoom, .. } => zooms.push(zoom),
            SessionUpdate::Notice {
                kind: NoticeKind::BoundaryNoOp,
                ..
            } => saw_undo_notice = true,
            _ => {}
        }
    }
    // One state from the load and one from the merged zoom
    assert_eq!(zooms.len(), 2);
    assert!((zooms[1] - zooms[0] - 0.5).abs() < 1e-4);
    assert!(saw_undo_notice);
}

#[tokio::test]
async fn test_worker_zoom_burst_clamps_each_step() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "doc.pdf", 1);

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();

    command_tx.send(SessionCommand::EditorLoad { path }).unwrap();
    command_tx
        .send(SessionCommand::EditorZoom { delta: 5.0 })
        .unwrap();
    command_tx
        .send(SessionCommand::EditorZoom { delta: -1.0 })
        .unwrap();
    drop(command_tx);

    worker_task(
        command_rx,
        update_tx,
        SessionOptions::default(),
        Arc::new(PageBoxRenderer),
    )
    .await;

    let mut zooms = Vec::new();
    while let Ok(update) = update_rx.try_recv() {
        if let SessionUpdate::EditorState { zoom, .. } = update {
            zooms.push(zoom);
        }
    }

    // Same result as applying the steps one by one: min(1 + 5, 3) - 1
    let mut sequential = workbench();
    sequential.zoom_steps(&[5.0]);
    let expected = match sequential.zoom_steps(&[-1.0])[..] {
        [SessionUpdate::EditorState { zoom, .. }] => zoom,
        _ => panic!("expected a single editor state"),
    };
    assert_eq!(zooms.len(), 2);
    assert!((zooms[1] - expected).abs() < 1e-4);
    assert!((zooms[1] - 2.0).abs() < 1e-4);
}

#[tokio::test]
async fn test_style_change_is_one_undo_step() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "doc.pdf", 1);
    let mut bench = workbench();
    bench.handle(SessionCommand::EditorLoad { path }).await;
    bench
        .handle(SessionCommand::EditorSetTool { tool: Tool::Text })
        .await;
    bench
        .handle(SessionCommand::EditorPlaceText {
            origin: Point::new(10.0, 10.0),
        })
        .await;
    let steps = bench.editor().undo_controller().history().undo_len();

    bench
        .handle(SessionCommand::EditorSetStyle {
            color: Some(Color::RED),
            size: Some(30),
            font_family: Some("Courier".to_string()),
        })
        .await;
    assert_eq!(
        bench.editor().undo_controller().history().undo_len(),
        steps + 1
    );
    assert_eq!(bench.editor().tools().size, 30);
}
