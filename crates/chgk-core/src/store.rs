//! In-memory reference implementation of the [`GameStore`] port.
//!
//! Good enough for a single-process deployment and for tests; a database
//! adapter can replace it behind the same trait without touching the core.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::Mutex;

use crate::{
    domain::{ChatId, GameScore, Question, QuestionId, Session},
    ports::GameStore,
    Result,
};

#[derive(Default)]
struct StoreState {
    sessions: HashMap<ChatId, Session>,
    bank: Vec<Question>,
    next_question_id: i64,
    asked: HashMap<ChatId, HashSet<QuestionId>>,
    scores: HashMap<ChatId, GameScore>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with a small starter bank so the bot is playable
    /// out of the box.
    pub async fn with_default_bank() -> Self {
        let store = Self::new();
        let seed = [
            ("Which planet is closest to the Sun?", "mercury"),
            ("Which chemical element has the symbol Au?", "gold"),
            ("What is the capital of France?", "paris"),
            ("How many minutes are there in two hours?", "120"),
            ("Which ocean is the largest on Earth?", "pacific"),
        ];
        {
            let mut st = store.state.lock().await;
            for (text, answer) in seed {
                push_question(&mut st, text, answer);
            }
        }
        store
    }
}

fn push_question(st: &mut StoreState, text: &str, answer: &str) -> Question {
    st.next_question_id += 1;
    let question = Question {
        id: QuestionId(st.next_question_id),
        text: text.to_string(),
        answer: answer.to_string(),
    };
    st.bank.push(question.clone());
    question
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn session(&self, chat: ChatId) -> Result<Session> {
        let st = self.state.lock().await;
        Ok(st.sessions.get(&chat).cloned().unwrap_or_default())
    }

    async fn put_session(&self, chat: ChatId, session: Session) -> Result<()> {
        let mut st = self.state.lock().await;
        if session.is_idle() {
            st.sessions.remove(&chat);
        } else {
            st.sessions.insert(chat, session);
        }
        Ok(())
    }

    async fn add_question(&self, text: &str, answer: &str) -> Result<Question> {
        let mut st = self.state.lock().await;
        Ok(push_question(&mut st, text, answer))
    }

    async fn random_unasked_question(&self, chat: ChatId) -> Result<Option<Question>> {
        let st = self.state.lock().await;
        let asked = st.asked.get(&chat);
        let pool: Vec<&Question> = st
            .bank
            .iter()
            .filter(|q| asked.map_or(true, |seen| !seen.contains(&q.id)))
            .collect();
        if pool.is_empty() {
            return Ok(None);
        }
        let pick = rand::rng().random_range(0..pool.len());
        Ok(Some(pool[pick].clone()))
    }

    async fn mark_asked(&self, chat: ChatId, question: QuestionId) -> Result<()> {
        let mut st = self.state.lock().await;
        st.asked.entry(chat).or_default().insert(question);
        Ok(())
    }

    async fn record_score(&self, chat: ChatId, score: GameScore) -> Result<()> {
        let mut st = self.state.lock().await;
        st.scores.insert(chat, score);
        Ok(())
    }

    async fn last_score(&self, chat: ChatId) -> Result<Option<GameScore>> {
        let st = self.state.lock().await;
        Ok(st.scores.get(&chat).cloned())
    }

    async fn clear_chat(&self, chat: ChatId) -> Result<()> {
        let mut st = self.state.lock().await;
        st.sessions.remove(&chat);
        st.asked.remove(&chat);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAT: ChatId = ChatId(-100);
    const OTHER: ChatId = ChatId(-200);

    #[tokio::test]
    async fn draw_pool_is_bank_minus_asked_log() {
        let store = MemoryStore::new();
        let a = store.add_question("q1", "a1").await.unwrap();
        let b = store.add_question("q2", "a2").await.unwrap();

        store.mark_asked(CHAT, a.id).await.unwrap();
        let drawn = store.random_unasked_question(CHAT).await.unwrap().unwrap();
        assert_eq!(drawn.id, b.id);

        store.mark_asked(CHAT, b.id).await.unwrap();
        assert!(store.random_unasked_question(CHAT).await.unwrap().is_none());

        // The asked-log is per chat: another chat still sees the full bank.
        assert!(store
            .random_unasked_question(OTHER)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn clear_chat_keeps_scores() {
        let store = MemoryStore::new();
        let q = store.add_question("q", "a").await.unwrap();
        store.mark_asked(CHAT, q.id).await.unwrap();
        store
            .record_score(
                CHAT,
                GameScore {
                    team_points: 2,
                    bot_points: 1,
                    rounds_played: 3,
                    played_at: chrono::Utc::now(),
                },
            )
            .await
            .unwrap();

        store.clear_chat(CHAT).await.unwrap();

        assert!(store.session(CHAT).await.unwrap().is_idle());
        // Asked-log is gone, so the question is drawable again.
        assert!(store.random_unasked_question(CHAT).await.unwrap().is_some());
        assert_eq!(store.last_score(CHAT).await.unwrap().unwrap().team_points, 2);
    }

    #[tokio::test]
    async fn idle_sessions_are_not_stored() {
        let store = MemoryStore::new();
        store.put_session(CHAT, Session::Idle).await.unwrap();
        assert!(store.session(CHAT).await.unwrap().is_idle());
    }
}
