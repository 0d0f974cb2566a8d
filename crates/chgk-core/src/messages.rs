//! User-facing message text.
//!
//! Everything the bot says in chat lives here so handlers stay free of
//! string literals.

pub const HELP_TEXT: &str = "\
📜 Available commands:\n\n\
🎮 Starting a game:\n\
/start - open registration\n\
/join - join the team\n\
/finish_reg - close registration and begin\n\n\
/stat - last game's score\n\n\
🎯 During a game:\n\
/choose @username - pick who answers (captain only)\n\
/answer text - submit the team's answer";

pub const GAME_IN_PROGRESS_TEXT: &str =
    "❌ A game is already being registered or played in this chat";

pub const GAME_BEGINS_TEXT: &str = "🎲 The game begins! Get ready for the first question...";

pub const REGISTRATION_CLOSED_TEXT: &str = "❌ Registration is closed right now";
pub const REGISTRATION_ALREADY_CLOSED_TEXT: &str = "❌ Registration is already closed";
pub const MAX_PLAYERS_REACHED_TEXT: &str = "❌ The team is full";
pub const ALREADY_REGISTERED_TEXT: &str = "❌ You are already registered";
pub const NO_PLAYERS_TEXT: &str = "❌ Nobody has joined yet - send /join first";

pub const QUESTIONS_EMPTY_TEXT: &str = "❌ No questions left! Finishing the game early.";
pub const DISCUSSION_WARNING_TEXT: &str = "⚠️ 10 seconds of discussion left!";
pub const ONLY_CAPTAIN_TEXT: &str = "❌ Only the captain may choose who answers!";
pub const PLAYER_NOT_FOUND_TEXT: &str = "❌ That player is not on the team!";
pub const NOT_YOUR_TURN_TEXT: &str = "❌ It is not your turn to answer!";
pub const NO_ACTIVE_GAME_TEXT: &str = "❌ No game is running in this chat";
pub const RESPONDENT_ALREADY_CHOSEN_TEXT: &str =
    "❌ A respondent is already chosen for this round";
pub const TOO_EARLY_TO_CHOOSE_TEXT: &str =
    "❌ Please wait for the discussion time to end before choosing a player.";
pub const TOO_EARLY_TO_ANSWER_TEXT: &str =
    "❌ Please wait until the captain chooses who answers.";
pub const CORRECT_ANSWER_TEXT: &str = "✅ Correct! The team scores a point.";

pub const NO_FINISHED_GAMES_TEXT: &str = "ℹ️ No finished games in this chat yet";
pub const GAME_RUNNING_STAT_TEXT: &str = "❌ Finish the current game first, then ask for /stat";

pub const SOMETHING_WENT_WRONG_TEXT: &str = "⚠️ Something went wrong, please try again";

pub fn registration_start(max_players: usize) -> String {
    format!(
        "🎮 Registration for a game of \"What? Where? When?\" is open\n\n\
         📝 Send /join to get on the team\n\
         ℹ️ Up to {max_players} players\n\
         ❌ Send /finish_reg to close registration and start"
    )
}

pub fn player_registered(handle: &str, current: usize, max: usize) -> String {
    format!("✅ @{handle} is registered!\n👥 Players: {current}/{max}")
}

pub fn registration_finished(lines: &[String], total: usize) -> String {
    format!(
        "✅ Registration is closed!\n\nThe team:\n{}\n\nPlayers total: {total}",
        lines.join("\n")
    )
}

pub fn roster_line(handle: &str, is_captain: bool) -> String {
    if is_captain {
        format!("👑 Captain: @{handle}")
    } else {
        format!("👤 Player: @{handle}")
    }
}

pub fn rules(captain: &str, rounds: u32) -> String {
    format!(
        "🎮 Rules of \"What? Where? When?\":\n\n\
         1️⃣ The game is played over {rounds} rounds\n\
         2️⃣ Each round the team gets one question\n\
         3️⃣ The team discusses it for a limited time\n\
         4️⃣ After the discussion the captain picks who answers with /choose @username\n\
         5️⃣ A correct answer earns the team 1 point\n\
         6️⃣ A wrong answer gives the point to the bot\n\n\
         👑 Team captain: @{captain}\n\
         🎯 Rounds: {rounds}"
    )
}

pub fn round_announcement(round: u32, question: &str, discussion_secs: u64) -> String {
    format!(
        "🎯 Round {round}\n💭 Question: {question}\n\n⏳ Discussion time: {discussion_secs} seconds"
    )
}

pub fn choose_prompt(captain: &str) -> String {
    format!("👑 @{captain}, pick who answers with /choose @username")
}

pub fn answer_prompt(player: &str) -> String {
    format!("🎯 @{player}, your answer? Reply with /answer your_answer")
}

pub fn wrong_answer(correct: &str) -> String {
    format!("❌ Wrong! The correct answer was: {correct}")
}

pub fn score(team: u32, bot: u32) -> String {
    format!("📊 Score: Team {team} - {bot} Bot")
}

pub fn final_result(team: u32, bot: u32) -> String {
    use std::cmp::Ordering;
    match team.cmp(&bot) {
        Ordering::Greater => {
            format!("🏆 Congratulations! The team wins!\nFinal score: {team} - {bot}")
        }
        Ordering::Less => format!("😔 The team lost this one.\nFinal score: {team} - {bot}"),
        Ordering::Equal => format!("🤝 A draw! Great game!\nFinal score: {team} - {bot}"),
    }
}

pub fn statistics(team_points: u32) -> String {
    format!("😄 Last time the team scored {team_points} points. Can you beat that?")
}
