//! The update poller: owns the cursor, feeds the hand-off queue.

use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{domain::Update, ports::UpdateSource};

/// How long to back off after a transient fetch failure before retrying
/// with the same cursor.
const FETCH_RETRY_DELAY: Duration = Duration::from_secs(1);

pub struct Poller {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Poller {
    /// Spawn the background fetch loop. The sender is owned by the loop, so
    /// the queue closes when the poller stops.
    pub fn start(
        source: Arc<dyn UpdateSource>,
        queue: UnboundedSender<Update>,
        poll_timeout: Duration,
    ) -> Self {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(poll_loop(source, queue, poll_timeout, cancel.clone()));
        Self {
            cancel,
            task: Some(task),
        }
    }

    /// Request cancellation and wait for the loop to exit. No update is
    /// fetched-but-unqueued after this returns.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "poller task panicked");
            }
        }
        info!("poller stopped");
    }
}

async fn poll_loop(
    source: Arc<dyn UpdateSource>,
    queue: UnboundedSender<Update>,
    poll_timeout: Duration,
    cancel: CancellationToken,
) {
    let mut cursor: i64 = 0;

    loop {
        // The in-flight fetch is abandoned on cancellation; its batch is
        // never enqueued.
        let batch = tokio::select! {
            _ = cancel.cancelled() => break,
            res = source.fetch(cursor, poll_timeout) => match res {
                Ok(batch) => batch,
                Err(e) => {
                    warn!(cursor, error = %e, "update fetch failed, retrying");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(FETCH_RETRY_DELAY) => {}
                    }
                    continue;
                }
            },
        };

        for update in batch {
            // Advance the cursor before enqueueing: a crash between the two
            // can redeliver this update, a crash after cannot. Handlers are
            // idempotent to the first case.
            cursor = update.id.0 + 1;

            let group_message = update
                .message
                .as_ref()
                .map_or(false, |m| m.chat_kind.is_group());
            if !group_message {
                debug!(update_id = update.id.0, "dropping non-group update");
                continue;
            }

            if queue.send(update).is_err() {
                // All consumers are gone; nothing left to do.
                return;
            }
        }
    }
}
