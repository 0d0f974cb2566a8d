use std::{env, fs, path::Path, time::Duration};

use crate::{errors::Error, Result};

/// Typed configuration for the bot, loaded from the environment (with an
/// optional `.env` file that never overrides already-set variables).
#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,

    /// Number of concurrent update consumers.
    pub workers: usize,

    /// Long-poll timeout passed to the update source.
    pub poll_timeout: Duration,

    // Game shape
    pub rounds_total: u32,
    pub max_players: usize,
    pub discussion_time: Duration,
    /// How long before the end of discussion the warning is sent.
    pub warning_lead: Duration,
    /// Pause between the rules announcement and the first question.
    pub rules_pause: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let bot_token = env_str("CHGK_BOT_TOKEN").unwrap_or_default();
        if bot_token.trim().is_empty() {
            return Err(Error::Config(
                "CHGK_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let cfg = Self {
            bot_token,
            workers: env_usize("CHGK_WORKERS").unwrap_or(2).max(1),
            poll_timeout: Duration::from_secs(env_u64("CHGK_POLL_TIMEOUT_SECS").unwrap_or(60)),
            rounds_total: env_u32("CHGK_ROUNDS").unwrap_or(3).max(1),
            max_players: env_usize("CHGK_MAX_PLAYERS").unwrap_or(12).max(1),
            discussion_time: Duration::from_secs(env_u64("CHGK_DISCUSSION_SECS").unwrap_or(60)),
            warning_lead: Duration::from_secs(env_u64("CHGK_WARNING_SECS").unwrap_or(10)),
            rules_pause: Duration::from_secs(env_u64("CHGK_RULES_PAUSE_SECS").unwrap_or(5)),
        };

        if cfg.warning_lead >= cfg.discussion_time {
            return Err(Error::Config(format!(
                "CHGK_WARNING_SECS ({:?}) must be shorter than CHGK_DISCUSSION_SECS ({:?})",
                cfg.warning_lead, cfg.discussion_time
            )));
        }

        Ok(cfg)
    }

    /// A config suitable for tests: no token checks, short timers.
    pub fn for_tests() -> Self {
        Self {
            bot_token: String::new(),
            workers: 2,
            poll_timeout: Duration::from_millis(50),
            rounds_total: 3,
            max_players: 12,
            discussion_time: Duration::from_millis(40),
            warning_lead: Duration::from_millis(20),
            rules_pause: Duration::from_millis(0),
        }
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_u32(key: &str) -> Option<u32> {
    env_str(key).and_then(|s| s.trim().parse::<u32>().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key).and_then(|s| s.trim().parse::<usize>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_has_sane_timers() {
        let cfg = Config::for_tests();
        assert!(cfg.warning_lead < cfg.discussion_time);
        assert!(cfg.workers >= 1);
    }
}
