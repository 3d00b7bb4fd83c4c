//! Terminal-free front-end: every tick and status change goes to the log.

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    app::App,
    error::Result,
    push::PushState,
    status::{StatusField, StatusUpdate},
    util::format_rate,
    window::WindowSnapshot,
};

pub async fn run(
    mut app: App,
    mut snapshots: watch::Receiver<WindowSnapshot>,
    mut push_state: watch::Receiver<PushState>,
    mut status: mpsc::Receiver<StatusUpdate>,
    cancel: CancellationToken,
) -> Result<()> {
    let (mut snapshots_open, mut push_open, mut status_open) = (true, true, true);

    while snapshots_open || push_open || status_open {
        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = snapshots.changed(), if snapshots_open => match changed {
                Ok(()) => {
                    let snapshot = snapshots.borrow_and_update().clone();
                    let advanced = snapshot.tick > app.snapshot.tick;
                    app.on_snapshot(snapshot);
                    if advanced {
                        info!(
                            tick = app.snapshot.tick,
                            value = app.snapshot.latest(),
                            rate = %format_rate(app.current_rate()),
                            scale = app.snapshot.scale,
                            len = app.snapshot.samples.len(),
                            total = app.total_events,
                            "sample"
                        );
                    }
                }
                Err(_) => snapshots_open = false,
            },
            changed = push_state.changed(), if push_open => match changed {
                Ok(()) => {
                    app.on_push_state(*push_state.borrow_and_update());
                    info!(state = app.push_state.label(), "push link");
                }
                Err(_) => push_open = false,
            },
            update = status.recv(), if status_open => match update {
                Some(update) => {
                    let seq = update.seq;
                    if app.on_status(update) {
                        for field in StatusField::ALL {
                            info!(seq, field = field.label(), value = app.status.get(field), "status");
                        }
                    }
                }
                None => status_open = false,
            },
        }
    }
    Ok(())
}
