//! Hexagonal ports for the external collaborators.
//!
//! The messaging backend (Telegram is the first implementation) and the
//! persistence layer live behind these traits; the core never talks to a
//! wire protocol or a database directly.

use std::time::Duration;

use async_trait::async_trait;

use crate::{
    domain::{ChatId, GameScore, Question, QuestionId, Session, Update},
    Result,
};

/// Source of inbound updates, consumed by the poller.
///
/// `fetch` is a blocking long poll: it may return an empty batch on timeout
/// and must be cancel-safe (the poller races it against shutdown).
#[async_trait]
pub trait UpdateSource: Send + Sync {
    async fn fetch(&self, cursor: i64, timeout: Duration) -> Result<Vec<Update>>;
}

/// Outbound message send. Fire-and-forget from the state machine's
/// perspective; retry/backoff is the adapter's business.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, chat: ChatId, text: &str) -> Result<()>;
}

/// Chat-scoped game persistence.
///
/// Every operation is atomic at the row level. Multi-step read-modify-write
/// flows are serialized by the core's per-chat lock, so implementations do
/// not need cross-call transactions.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Current session for a chat; `Session::Idle` when none is stored.
    async fn session(&self, chat: ChatId) -> Result<Session>;

    async fn put_session(&self, chat: ChatId, session: Session) -> Result<()>;

    async fn add_question(&self, text: &str, answer: &str) -> Result<Question>;

    /// Uniform draw from the bank minus this chat's asked-log. `None` when
    /// the pool is exhausted.
    async fn random_unasked_question(&self, chat: ChatId) -> Result<Option<Question>>;

    async fn mark_asked(&self, chat: ChatId, question: QuestionId) -> Result<()>;

    async fn record_score(&self, chat: ChatId, score: GameScore) -> Result<()>;

    async fn last_score(&self, chat: ChatId) -> Result<Option<GameScore>>;

    /// Drop the chat's session and asked-log. Recorded scores survive.
    async fn clear_chat(&self, chat: ChatId) -> Result<()>;
}
