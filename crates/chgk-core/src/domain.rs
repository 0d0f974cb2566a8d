//! Domain types shared across the core.

/// Messenger user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Messenger chat id (numeric; group chats are typically negative).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Monotonic id of one inbound update from the messaging source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UpdateId(pub i64);

/// Question bank row id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QuestionId(pub i64);

/// Kind of chat an update originated in. Only group-style chats are played.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
    Unknown,
}

impl ChatKind {
    pub fn is_group(self) -> bool {
        matches!(self, ChatKind::Group | ChatKind::Supergroup)
    }
}

/// One inbound event from the messaging source.
///
/// The cursor advances over every update, including those the adapter could
/// not turn into a text message (media, service events), so `message` is
/// optional while `id` is not.
#[derive(Clone, Debug)]
pub struct Update {
    pub id: UpdateId,
    pub message: Option<Message>,
}

/// A plain text message inside an update.
#[derive(Clone, Debug)]
pub struct Message {
    pub chat: ChatId,
    pub chat_kind: ChatKind,
    pub sender: UserId,
    pub sender_handle: String,
    pub text: String,
}

/// A quiz question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub answer: String,
}

/// A registered roster member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub user_id: UserId,
    pub handle: String,
}

/// Phase of the current round, driving which commands are accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundPhase {
    /// Question announced, discussion timer running. `/choose` is too early.
    Discussion,
    /// Discussion over, captain prompted, no respondent yet.
    AwaitingChoice,
    /// Respondent chosen; only they may `/answer`.
    AwaitingAnswer,
    /// Answer adjudicated; the round task is moving to the next round.
    Resolved,
}

/// Player registration in progress.
#[derive(Clone, Debug)]
pub struct Registration {
    pub open: bool,
    pub roster: Vec<Player>,
    pub capacity: usize,
}

impl Registration {
    pub fn contains(&self, handle: &str) -> bool {
        self.roster.iter().any(|p| p.handle == handle)
    }
}

/// A running game: roster frozen, captain fixed, rounds in flight.
#[derive(Clone, Debug)]
pub struct RoundGame {
    pub captain: String,
    pub roster: Vec<Player>,
    /// 1-based; 0 until the first round is announced.
    pub round: u32,
    pub rounds_total: u32,
    pub question: Option<Question>,
    pub respondent: Option<String>,
    pub phase: RoundPhase,
    pub team_points: u32,
    pub rounds_played: u32,
}

impl RoundGame {
    /// The bot's score is derived, never stored.
    pub fn bot_points(&self) -> u32 {
        self.rounds_played - self.team_points
    }

    pub fn roster_contains(&self, handle: &str) -> bool {
        self.roster.iter().any(|p| p.handle == handle)
    }
}

/// Per-chat session state. Exactly one shape holds per chat at any instant.
#[derive(Clone, Debug, Default)]
pub enum Session {
    #[default]
    Idle,
    Registration(Registration),
    Round(RoundGame),
}

impl Session {
    pub fn is_idle(&self) -> bool {
        matches!(self, Session::Idle)
    }
}

/// Final result of a completed game, kept for `/stat`.
#[derive(Clone, Debug)]
pub struct GameScore {
    pub team_points: u32,
    pub bot_points: u32,
    pub rounds_played: u32,
    pub played_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_points_is_derived_from_rounds_played() {
        let game = RoundGame {
            captain: "alice".to_string(),
            roster: vec![],
            round: 3,
            rounds_total: 3,
            question: None,
            respondent: None,
            phase: RoundPhase::Resolved,
            team_points: 1,
            rounds_played: 3,
        };
        assert_eq!(game.bot_points(), 2);
        assert_eq!(game.team_points + game.bot_points(), game.rounds_played);
    }

    #[test]
    fn only_group_kinds_are_playable() {
        assert!(ChatKind::Group.is_group());
        assert!(ChatKind::Supergroup.is_group());
        assert!(!ChatKind::Private.is_group());
        assert!(!ChatKind::Channel.is_group());
        assert!(!ChatKind::Unknown.is_group());
    }
}
