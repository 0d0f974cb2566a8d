//! Round sequencing: the supervised per-game task.
//!
//! One task per active game drives the round loop: draw a question, run the
//! discussion window with a warning near its end, prompt the captain, then
//! suspend until `/choose` + `/answer` resolve the round. The task's timers
//! and waits all race against the game's cancellation token so shutdown
//! never has to wait a discussion window out.

use std::{sync::Arc, time::Duration};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    domain::{ChatId, GameScore, Question, RoundPhase, Session},
    messages, Error, Result,
};

use super::GameService;

enum GameEnd {
    Finished,
    Cancelled,
}

impl GameService {
    pub(super) async fn run_game(
        self,
        chat: ChatId,
        cancel: CancellationToken,
        round_done: Arc<Notify>,
    ) {
        match self.game_loop(chat, &cancel, &round_done).await {
            Ok(GameEnd::Finished) => {}
            Ok(GameEnd::Cancelled) => {
                info!(chat = chat.0, "game cancelled before completion");
                if let Err(e) = self.store().clear_chat(chat).await {
                    warn!(chat = chat.0, error = %e, "failed to clear cancelled game");
                }
            }
            Err(e) => {
                warn!(chat = chat.0, error = %e, "game aborted");
                let _ = self.send(chat, messages::SOMETHING_WENT_WRONG_TEXT).await;
                let _ = self.store().clear_chat(chat).await;
            }
        }
        self.forget_game(chat).await;
    }

    async fn game_loop(
        &self,
        chat: ChatId,
        cancel: &CancellationToken,
        round_done: &Notify,
    ) -> Result<GameEnd> {
        let rounds_total = self.cfg().rounds_total;
        let discussion = self.cfg().discussion_time;
        let warning_lead = self.cfg().warning_lead;

        let captain = {
            let _guard = self.lock_chat(chat).await;
            match self.store().session(chat).await? {
                Session::Round(game) => game.captain,
                _ => return Err(missing_game(chat)),
            }
        };

        self.send(chat, &messages::rules(&captain, rounds_total))
            .await?;
        if !self.pause(self.cfg().rules_pause, cancel).await {
            return Ok(GameEnd::Cancelled);
        }
        self.send(chat, messages::GAME_BEGINS_TEXT).await?;

        for round in 1..=rounds_total {
            let Some(question) = self.store().random_unasked_question(chat).await? else {
                self.send(chat, messages::QUESTIONS_EMPTY_TEXT).await?;
                break;
            };
            self.store().mark_asked(chat, question.id).await?;
            self.open_round(chat, round, question.clone()).await?;

            self.send(
                chat,
                &messages::round_announcement(round, &question.text, discussion.as_secs()),
            )
            .await?;

            if !self
                .pause(discussion.saturating_sub(warning_lead), cancel)
                .await
            {
                return Ok(GameEnd::Cancelled);
            }
            self.send(chat, messages::DISCUSSION_WARNING_TEXT).await?;
            if !self.pause(warning_lead, cancel).await {
                return Ok(GameEnd::Cancelled);
            }

            self.close_discussion(chat).await?;
            self.send(chat, &messages::choose_prompt(&captain)).await?;

            // The round resolves only on an explicit completion signal from
            // the answer handler; a silent captain stalls it until shutdown.
            tokio::select! {
                _ = cancel.cancelled() => return Ok(GameEnd::Cancelled),
                _ = round_done.notified() => {}
            }
        }

        self.finish_game(chat).await?;
        Ok(GameEnd::Finished)
    }

    /// Enter the discussion window for a new round.
    async fn open_round(&self, chat: ChatId, round: u32, question: Question) -> Result<()> {
        let _guard = self.lock_chat(chat).await;
        let Session::Round(mut game) = self.store().session(chat).await? else {
            return Err(missing_game(chat));
        };
        game.round = round;
        game.question = Some(question);
        game.respondent = None;
        game.phase = RoundPhase::Discussion;
        self.store().put_session(chat, Session::Round(game)).await
    }

    /// Discussion over: the captain may now `/choose`.
    async fn close_discussion(&self, chat: ChatId) -> Result<()> {
        let _guard = self.lock_chat(chat).await;
        let Session::Round(mut game) = self.store().session(chat).await? else {
            return Err(missing_game(chat));
        };
        game.phase = RoundPhase::AwaitingChoice;
        self.store().put_session(chat, Session::Round(game)).await
    }

    /// Announce the final result, persist the score, return the chat to Idle.
    async fn finish_game(&self, chat: ChatId) -> Result<()> {
        let _guard = self.lock_chat(chat).await;
        let Session::Round(game) = self.store().session(chat).await? else {
            return Err(missing_game(chat));
        };

        let (team, bot) = (game.team_points, game.bot_points());
        info!(
            chat = chat.0,
            team, bot,
            rounds = game.rounds_played,
            "game finished"
        );
        self.send(chat, &messages::final_result(team, bot)).await?;

        self.store()
            .record_score(
                chat,
                GameScore {
                    team_points: team,
                    bot_points: bot,
                    rounds_played: game.rounds_played,
                    played_at: chrono::Utc::now(),
                },
            )
            .await?;
        self.store().clear_chat(chat).await
    }

    /// Cancellable sleep; false means the game was cancelled mid-wait.
    async fn pause(&self, duration: Duration, cancel: &CancellationToken) -> bool {
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}

fn missing_game(chat: ChatId) -> Error {
    Error::NotFound(format!("game session for chat {}", chat.0))
}
