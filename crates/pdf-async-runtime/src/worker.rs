use crate::{SessionCommand, SessionUpdate, Workbench};
use pdf_session::{ExportProgress, ExportStage, PageRenderer, SessionOptions};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Async worker task that owns the session state, runs commands in order
/// and sends updates back.
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<SessionCommand>,
    update_tx: mpsc::UnboundedSender<SessionUpdate>,
    options: SessionOptions,
    renderer: Arc<dyn PageRenderer>,
) {
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
    let mut workbench = Workbench::new(renderer, options).with_progress(progress_tx);

    while let Some(cmd) = command_rx.recv().await {
        let SessionCommand::EditorZoom { delta } = cmd else {
            if !process_command(cmd, &mut workbench, &mut progress_rx, &update_tx).await {
                log::debug!("Update channel closed, stopping worker");
                return;
            }
            continue;
        };

        // A burst of zoom steps is applied step by step but reported once
        let mut deltas = vec![delta];
        let mut next = None;
        while let Ok(next_cmd) = command_rx.try_recv() {
            match next_cmd {
                SessionCommand::EditorZoom { delta } => {
                    log::debug!("Merging queued zoom step");
                    deltas.push(delta);
                }
                other => {
                    next = Some(other);
                    break;
                }
            }
        }
        let delivered = workbench
            .zoom_steps(&deltas)
            .into_iter()
            .all(|update| update_tx.send(update).is_ok());
        let delivered = match next {
            Some(cmd) if delivered => {
                process_command(cmd, &mut workbench, &mut progress_rx, &update_tx).await
            }
            _ => delivered,
        };
        if !delivered {
            log::debug!("Update channel closed, stopping worker");
            return;
        }
    }
}

/// Returns false once nobody is listening for updates
async fn process_command(
    cmd: SessionCommand,
    workbench: &mut Workbench,
    progress_rx: &mut mpsc::UnboundedReceiver<ExportProgress>,
    update_tx: &mpsc::UnboundedSender<SessionUpdate>,
) -> bool {
    let handle = workbench.handle(cmd);
    tokio::pin!(handle);

    // Forward export progress while the command runs
    let updates = loop {
        tokio::select! {
            updates = &mut handle => break updates,
            Some(progress) = progress_rx.recv() => {
                if let Some(update) = progress_update(progress) {
                    let _ = update_tx.send(update);
                }
            }
        }
    };
    while let Ok(progress) = progress_rx.try_recv() {
        if let Some(update) = progress_update(progress) {
            let _ = update_tx.send(update);
        }
    }

    updates
        .into_iter()
        .all(|update| update_tx.send(update).is_ok())
}

fn progress_update(progress: ExportProgress) -> Option<SessionUpdate> {
    let (operation, current, total) = match progress.stage {
        ExportStage::Loading { current, total } => ("Loading", current, total),
        ExportStage::Rendering { current, total } => ("Rendering", current, total),
        ExportStage::Assembling => ("Assembling", 1, 1),
        ExportStage::Idle | ExportStage::Done | ExportStage::Failed => return None,
    };
    Some(SessionUpdate::Progress {
        operation: format!("{operation} {}", progress.file_name),
        current,
        total,
    })
}
