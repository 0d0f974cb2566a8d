//! The worker pool: n concurrent consumers draining the hand-off queue.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{domain::Update, router::Router};

pub struct WorkerPool {
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Launch `n` consumer loops sharing one receiver.
    ///
    /// Per-chat ordering is not a property of the shared queue; it comes from
    /// the per-chat lock the router takes before touching a session.
    pub fn start(router: Router, queue: UnboundedReceiver<Update>, n: usize) -> Self {
        let queue = Arc::new(Mutex::new(queue));
        let workers = (0..n.max(1))
            .map(|worker_id| {
                let router = router.clone();
                let queue = queue.clone();
                tokio::spawn(consumer_loop(worker_id, router, queue))
            })
            .collect();
        Self { workers }
    }

    /// Wait for the queue to drain and every consumer to exit.
    ///
    /// The producer must be stopped first: consumers run until the channel
    /// is closed *and* empty, so already-queued updates are processed, not
    /// discarded.
    pub async fn stop(self) {
        for worker in self.workers {
            if let Err(e) = worker.await {
                warn!(error = %e, "worker task panicked");
            }
        }
        info!("worker pool drained and stopped");
    }
}

async fn consumer_loop(worker_id: usize, router: Router, queue: Arc<Mutex<UnboundedReceiver<Update>>>) {
    loop {
        // Hold the receiver lock only while dequeueing, never while handling.
        let update = { queue.lock().await.recv().await };
        let Some(update) = update else {
            debug!(worker_id, "queue closed, consumer exiting");
            break;
        };

        debug!(worker_id, update_id = update.id.0, "processing update");
        router.handle_update(&update).await;
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use tokio::sync::mpsc;

    use crate::{
        config::Config,
        domain::{ChatId, Session},
        game::GameService,
        ports::GameStore,
        router::Router,
        store::MemoryStore,
        testutil::{group_update, RecordingMessenger},
    };

    use super::*;

    #[tokio::test]
    async fn stop_drains_already_queued_updates() {
        let cfg = Arc::new(Config::for_tests());
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let messenger = Arc::new(RecordingMessenger::new());
        let game = GameService::new(cfg, store.clone(), messenger.clone());
        let router = Router::new(game);

        let (tx, rx) = mpsc::unbounded_channel();

        // Open registration first; the queued burst of joins below may be
        // picked up by any of the three workers in any interleaving.
        router
            .handle_update(&group_update(1, -1, 1, "alice", "/start"))
            .await;
        for i in 0..5i64 {
            tx.send(group_update(2 + i, -1, 100 + i, &format!("player{i}"), "/join"))
                .unwrap();
        }
        drop(tx); // producer gone; consumers must still drain everything

        let pool = WorkerPool::start(router, rx, 3);
        tokio::time::timeout(Duration::from_secs(2), pool.stop())
            .await
            .expect("pool.stop() did not drain");

        match store.session(ChatId(-1)).await.unwrap() {
            Session::Registration(reg) => assert_eq!(reg.roster.len(), 5),
            other => panic!("expected registration session, got {other:?}"),
        }
        // One registration banner + five join confirmations.
        assert_eq!(messenger.texts().len(), 6);
    }
}
