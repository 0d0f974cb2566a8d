//! The per-chat game state machine.
//!
//! `GameService` owns the session transitions (`Idle -> Registration ->
//! RoundGame -> Idle`), one supervised round-sequencing task per active game,
//! and the advisory per-chat locks that serialize every session
//! read-modify-write. Command handlers assume the caller (the router) holds
//! the chat lock; the round task takes it itself around its own mutations.

mod rounds;

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, Notify, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use rand::Rng;
use tracing::{info, warn};

use crate::{
    config::Config,
    domain::{ChatId, Message, Player, Registration, RoundGame, RoundPhase, Session},
    messages,
    ports::{GameStore, Messenger},
    Result,
};

/// Advisory per-chat async locks.
///
/// A chat's session is the only shared mutable resource; holding its lock is
/// the serialization point required for all session reads-then-writes.
#[derive(Default)]
pub struct ChatLocks {
    inner: Mutex<HashMap<ChatId, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    pub async fn lock_chat(&self, chat: ChatId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(chat)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

/// Runtime handle of one active game's round-sequencing task.
struct GameHandle {
    cancel: CancellationToken,
    round_done: Arc<Notify>,
    task: JoinHandle<()>,
}

struct GameInner {
    cfg: Arc<Config>,
    store: Arc<dyn GameStore>,
    messenger: Arc<dyn Messenger>,
    chat_locks: ChatLocks,
    games: Mutex<HashMap<ChatId, GameHandle>>,
}

#[derive(Clone)]
pub struct GameService {
    inner: Arc<GameInner>,
}

impl GameService {
    pub fn new(cfg: Arc<Config>, store: Arc<dyn GameStore>, messenger: Arc<dyn Messenger>) -> Self {
        Self {
            inner: Arc::new(GameInner {
                cfg,
                store,
                messenger,
                chat_locks: ChatLocks::default(),
                games: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn messenger(&self) -> &Arc<dyn Messenger> {
        &self.inner.messenger
    }

    pub(crate) fn store(&self) -> &Arc<dyn GameStore> {
        &self.inner.store
    }

    pub(crate) fn cfg(&self) -> &Config {
        &self.inner.cfg
    }

    /// Serialization point for everything touching this chat's session.
    pub async fn lock_chat(&self, chat: ChatId) -> OwnedMutexGuard<()> {
        self.inner.chat_locks.lock_chat(chat).await
    }

    /// True while a round-sequencing task is alive for the chat.
    pub async fn has_active_game(&self, chat: ChatId) -> bool {
        self.inner.games.lock().await.contains_key(&chat)
    }

    /// Cancel all in-flight games and wait for their tasks. Pending round
    /// timers resolve immediately instead of running to completion.
    pub async fn shutdown(&self) {
        let handles: Vec<GameHandle> = {
            let mut games = self.inner.games.lock().await;
            games.drain().map(|(_, h)| h).collect()
        };
        if handles.is_empty() {
            return;
        }

        info!(games = handles.len(), "cancelling in-flight games");
        for h in &handles {
            h.cancel.cancel();
        }
        for h in handles {
            if let Err(e) = h.task.await {
                warn!(error = %e, "game task panicked during shutdown");
            }
        }
    }

    // --- command handlers (caller holds the chat lock) ---

    pub async fn start_registration(&self, msg: &Message) -> Result<()> {
        let chat = msg.chat;
        let session = self.inner.store.session(chat).await?;
        if !session.is_idle() || self.has_active_game(chat).await {
            return self.send(chat, messages::GAME_IN_PROGRESS_TEXT).await;
        }

        let registration = Registration {
            open: true,
            roster: Vec::new(),
            capacity: self.inner.cfg.max_players,
        };
        self.inner
            .store
            .put_session(chat, Session::Registration(registration))
            .await?;

        info!(chat = chat.0, "registration opened");
        self.send(chat, &messages::registration_start(self.inner.cfg.max_players))
            .await
    }

    pub async fn join(&self, msg: &Message) -> Result<()> {
        let chat = msg.chat;
        let session = self.inner.store.session(chat).await?;

        let Session::Registration(mut reg) = session else {
            return self.send(chat, messages::REGISTRATION_CLOSED_TEXT).await;
        };
        if !reg.open {
            return self.send(chat, messages::REGISTRATION_CLOSED_TEXT).await;
        }
        if reg.contains(&msg.sender_handle) {
            // Also covers redelivery of an already-processed /join update.
            return self.send(chat, messages::ALREADY_REGISTERED_TEXT).await;
        }
        if reg.roster.len() >= reg.capacity {
            return self.send(chat, messages::MAX_PLAYERS_REACHED_TEXT).await;
        }

        reg.roster.push(Player {
            user_id: msg.sender,
            handle: msg.sender_handle.clone(),
        });
        let joined = reg.roster.len();
        let capacity = reg.capacity;
        self.inner
            .store
            .put_session(chat, Session::Registration(reg))
            .await?;

        self.send(
            chat,
            &messages::player_registered(&msg.sender_handle, joined, capacity),
        )
        .await
    }

    pub async fn finish_registration(&self, msg: &Message) -> Result<()> {
        let chat = msg.chat;
        let session = self.inner.store.session(chat).await?;

        let Session::Registration(reg) = session else {
            return self
                .send(chat, messages::REGISTRATION_ALREADY_CLOSED_TEXT)
                .await;
        };
        if !reg.open {
            return self
                .send(chat, messages::REGISTRATION_ALREADY_CLOSED_TEXT)
                .await;
        }
        if reg.roster.is_empty() {
            return self.send(chat, messages::NO_PLAYERS_TEXT).await;
        }

        // The captain is picked uniformly at random, exactly once per game.
        let captain_idx = rand::rng().random_range(0..reg.roster.len());
        let captain = reg.roster[captain_idx].handle.clone();

        let lines: Vec<String> = reg
            .roster
            .iter()
            .map(|p| messages::roster_line(&p.handle, p.handle == captain))
            .collect();
        let total = reg.roster.len();

        let game = RoundGame {
            captain,
            roster: reg.roster,
            round: 0,
            rounds_total: self.inner.cfg.rounds_total,
            question: None,
            respondent: None,
            phase: RoundPhase::Resolved,
            team_points: 0,
            rounds_played: 0,
        };
        self.inner
            .store
            .put_session(chat, Session::Round(game))
            .await?;

        info!(chat = chat.0, players = total, "registration closed, game starting");
        self.send(chat, &messages::registration_finished(&lines, total))
            .await?;

        self.spawn_game(chat).await;
        Ok(())
    }

    pub async fn choose(&self, msg: &Message, handle: &str) -> Result<()> {
        let chat = msg.chat;
        let session = self.inner.store.session(chat).await?;

        let Session::Round(mut game) = session else {
            return self.send(chat, messages::NO_ACTIVE_GAME_TEXT).await;
        };
        if msg.sender_handle != game.captain {
            return self.send(chat, messages::ONLY_CAPTAIN_TEXT).await;
        }
        match game.phase {
            RoundPhase::Discussion | RoundPhase::Resolved => {
                return self.send(chat, messages::TOO_EARLY_TO_CHOOSE_TEXT).await;
            }
            RoundPhase::AwaitingAnswer => {
                return self
                    .send(chat, messages::RESPONDENT_ALREADY_CHOSEN_TEXT)
                    .await;
            }
            RoundPhase::AwaitingChoice => {}
        }
        if !game.roster_contains(handle) {
            return self.send(chat, messages::PLAYER_NOT_FOUND_TEXT).await;
        }

        game.respondent = Some(handle.to_string());
        game.phase = RoundPhase::AwaitingAnswer;
        self.inner
            .store
            .put_session(chat, Session::Round(game))
            .await?;

        self.send(chat, &messages::answer_prompt(handle)).await
    }

    pub async fn answer(&self, msg: &Message, text: &str) -> Result<()> {
        let chat = msg.chat;
        let session = self.inner.store.session(chat).await?;

        let Session::Round(mut game) = session else {
            return self.send(chat, messages::NO_ACTIVE_GAME_TEXT).await;
        };
        if game.phase != RoundPhase::AwaitingAnswer {
            return self.send(chat, messages::TOO_EARLY_TO_ANSWER_TEXT).await;
        }
        if game.respondent.as_deref() != Some(msg.sender_handle.as_str()) {
            return self.send(chat, messages::NOT_YOUR_TURN_TEXT).await;
        }

        let Some(question) = game.question.clone() else {
            return Err(crate::Error::NotFound(format!(
                "current question for chat {}",
                chat.0
            )));
        };

        let correct = answers_match(text, &question.answer);
        game.rounds_played += 1;
        if correct {
            game.team_points += 1;
        }
        game.respondent = None;
        game.phase = RoundPhase::Resolved;
        let (team, bot) = (game.team_points, game.bot_points());
        self.inner
            .store
            .put_session(chat, Session::Round(game))
            .await?;

        if correct {
            self.send(chat, messages::CORRECT_ANSWER_TEXT).await?;
        } else {
            self.send(chat, &messages::wrong_answer(&question.answer))
                .await?;
        }
        self.send(chat, &messages::score(team, bot)).await?;

        // Wake the round task; Notify keeps the permit even if the task has
        // not reached its wait yet.
        if let Some(handle) = self.inner.games.lock().await.get(&chat) {
            handle.round_done.notify_one();
        } else {
            warn!(chat = chat.0, "answer adjudicated but no round task is registered");
        }
        Ok(())
    }

    pub async fn help(&self, msg: &Message) -> Result<()> {
        self.send(msg.chat, messages::HELP_TEXT).await
    }

    pub async fn stat(&self, msg: &Message) -> Result<()> {
        let chat = msg.chat;
        if !self.inner.store.session(chat).await?.is_idle() {
            return self.send(chat, messages::GAME_RUNNING_STAT_TEXT).await;
        }
        match self.inner.store.last_score(chat).await? {
            Some(score) => {
                self.send(chat, &messages::statistics(score.team_points))
                    .await
            }
            None => self.send(chat, messages::NO_FINISHED_GAMES_TEXT).await,
        }
    }

    // --- internals ---

    async fn spawn_game(&self, chat: ChatId) {
        let cancel = CancellationToken::new();
        let round_done = Arc::new(Notify::new());
        let service = self.clone();
        let task = tokio::spawn(service.run_game(chat, cancel.clone(), round_done.clone()));

        let mut games = self.inner.games.lock().await;
        games.insert(
            chat,
            GameHandle {
                cancel,
                round_done,
                task,
            },
        );
    }

    pub(crate) async fn forget_game(&self, chat: ChatId) {
        self.inner.games.lock().await.remove(&chat);
    }

    pub(crate) async fn send(&self, chat: ChatId, text: &str) -> Result<()> {
        if let Err(e) = self.inner.messenger.send(chat, text).await {
            warn!(chat = chat.0, error = %e, "send failed");
        }
        Ok(())
    }
}

/// Answer adjudication: case-insensitive, whitespace-trimmed exact match.
pub fn answers_match(given: &str, expected: &str) -> bool {
    given.trim().to_lowercase() == expected.trim().to_lowercase()
}
