//! Wiring: queue + poller + worker pool + game service as one unit.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::{
    config::Config,
    game::GameService,
    poller::Poller,
    ports::{GameStore, Messenger, UpdateSource},
    router::Router,
    worker::WorkerPool,
};

/// The running bot. Created with [`Bot::start`], torn down with
/// [`Bot::stop`].
pub struct Bot {
    poller: Poller,
    pool: WorkerPool,
    game: GameService,
}

impl Bot {
    pub fn start(
        cfg: Arc<Config>,
        source: Arc<dyn UpdateSource>,
        messenger: Arc<dyn Messenger>,
        store: Arc<dyn GameStore>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let game = GameService::new(cfg.clone(), store, messenger);
        let router = Router::new(game.clone());

        let poller = Poller::start(source, tx, cfg.poll_timeout);
        let pool = WorkerPool::start(router, rx, cfg.workers);
        info!(workers = cfg.workers, "bot started");

        Self { poller, pool, game }
    }

    pub fn game(&self) -> &GameService {
        &self.game
    }

    /// Graceful shutdown: stop the producer, drain the queue, then cancel
    /// in-flight games.
    pub async fn stop(self) {
        self.poller.stop().await;
        self.pool.stop().await;
        self.game.shutdown().await;
        info!("bot stopped");
    }
}
