//! Command parsing and dispatch.
//!
//! The router turns the leading token of a message into a [`Command`] and
//! hands it to the game service. Unrecognized text is dropped silently; a
//! syntactically valid command in the wrong session state is the game
//! service's business and comes back to the chat as a message, never an
//! error.

use tracing::{debug, warn};

use crate::{
    domain::{Message, Update},
    game::GameService,
    messages,
    Error, Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Join,
    FinishReg,
    Choose { handle: String },
    Answer { text: String },
    Help,
    Stat,
}

/// Parse `/cmd@botname arg1 ...` into a lowercase command token and the rest.
fn parse_token(text: &str) -> (String, String) {
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub fn parse_command(text: &str) -> Option<Command> {
    if !text.trim_start().starts_with('/') {
        return None;
    }

    let (cmd, rest) = parse_token(text);
    match cmd.as_str() {
        "start" => Some(Command::Start),
        "join" => Some(Command::Join),
        "finish_reg" => Some(Command::FinishReg),
        "help" => Some(Command::Help),
        "stat" => Some(Command::Stat),
        "choose" => Some(Command::Choose {
            handle: rest.trim_start_matches('@').to_string(),
        }),
        "answer" => Some(Command::Answer { text: rest }),
        _ => None,
    }
}

#[derive(Clone)]
pub struct Router {
    game: GameService,
}

impl Router {
    pub fn new(game: GameService) -> Self {
        Self { game }
    }

    /// Entry point for one dequeued update. All failures are converted to a
    /// chat-visible message or a log line here; nothing escapes to the
    /// worker loop.
    pub async fn handle_update(&self, update: &Update) {
        let Some(message) = &update.message else {
            return;
        };
        let Some(command) = parse_command(&message.text) else {
            return;
        };

        debug!(update_id = update.id.0, chat = message.chat.0, ?command, "dispatching");

        // Per-chat serialization: no two updates for the same chat are
        // handled simultaneously, whichever workers they landed on.
        let _guard = self.game.lock_chat(message.chat).await;

        if let Err(e) = self.dispatch(&command, message).await {
            match e {
                Error::NotFound(what) => {
                    warn!(chat = message.chat.0, %what, "missing data while handling command");
                }
                e => {
                    warn!(chat = message.chat.0, error = %e, "command failed");
                    let _ = self
                        .game
                        .messenger()
                        .send(message.chat, messages::SOMETHING_WENT_WRONG_TEXT)
                        .await;
                }
            }
        }
    }

    async fn dispatch(&self, command: &Command, message: &Message) -> Result<()> {
        match command {
            Command::Start => self.game.start_registration(message).await,
            Command::Join => self.game.join(message).await,
            Command::FinishReg => self.game.finish_registration(message).await,
            Command::Choose { handle } => self.game.choose(message, handle).await,
            Command::Answer { text } => self.game.answer(message, text).await,
            Command::Help => self.game.help(message).await,
            Command::Stat => self.game.stat(message).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_commands() {
        assert_eq!(parse_command("/start"), Some(Command::Start));
        assert_eq!(parse_command("/join"), Some(Command::Join));
        assert_eq!(parse_command("/finish_reg"), Some(Command::FinishReg));
        assert_eq!(parse_command("/help"), Some(Command::Help));
        assert_eq!(parse_command("/stat"), Some(Command::Stat));
    }

    #[test]
    fn parses_commands_with_bot_suffix_and_case() {
        assert_eq!(parse_command("/START@QuizBot"), Some(Command::Start));
        assert_eq!(
            parse_command("/choose@QuizBot @bob"),
            Some(Command::Choose {
                handle: "bob".to_string()
            })
        );
    }

    #[test]
    fn parses_prefix_commands_with_arguments() {
        assert_eq!(
            parse_command("/choose @alice"),
            Some(Command::Choose {
                handle: "alice".to_string()
            })
        );
        assert_eq!(
            parse_command("/answer the answer is 42"),
            Some(Command::Answer {
                text: "the answer is 42".to_string()
            })
        );
    }

    #[test]
    fn ignores_non_commands() {
        assert_eq!(parse_command("hello there"), None);
        assert_eq!(parse_command("/unknown"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("start"), None);
    }
}
