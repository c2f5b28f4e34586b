//! Configuration module for the gatekeeper bot.
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::verification::{DEFAULT_CHALLENGE_TIMEOUT, DEFAULT_UNMUTE_GRACE};

/// Bot running mode
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BotMode {
    #[default]
    Polling,
    Webhook,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub bot_token: String,
    pub bot_mode: BotMode,
    pub webhook_url: Option<String>,
    pub webhook_port: u16,
    pub webhook_secret: Option<String>,

    /// Group chats the bot serves (comma-separated `ALLOWED_CHATS`).
    /// Unset or blank means every chat; a malformed entry is an error.
    pub allowed_chats: Vec<i64>,

    // Verification
    pub challenge_timeout: Duration,
    pub unmute_grace: Duration,

    // MongoDB
    pub mongodb_uri: String,
    pub mongodb_database: String,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bot_mode = match var("BOT_MODE").unwrap_or_default().to_lowercase().as_str() {
            "webhook" => BotMode::Webhook,
            _ => BotMode::Polling,
        };

        let webhook_url = var("WEBHOOK_URL");

        // Validate webhook URL is set if mode is webhook
        if bot_mode == BotMode::Webhook && webhook_url.is_none() {
            return Err(ConfigError::Missing("WEBHOOK_URL"));
        }

        let webhook_port = match var("WEBHOOK_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "WEBHOOK_PORT",
                value: raw,
            })?,
            None => 8443,
        };

        let allowed_chats = match var("ALLOWED_CHATS") {
            Some(raw) => chat_ids(&raw).ok_or(ConfigError::Invalid {
                name: "ALLOWED_CHATS",
                value: raw,
            })?,
            None => Vec::new(),
        };

        Ok(Self {
            bot_token: var("BOT_TOKEN").ok_or(ConfigError::Missing("BOT_TOKEN"))?,
            bot_mode,
            webhook_url,
            webhook_port,
            webhook_secret: var("WEBHOOK_SECRET"),
            allowed_chats,
            challenge_timeout: seconds(&var, "CHALLENGE_TIMEOUT_SECS", DEFAULT_CHALLENGE_TIMEOUT)?,
            unmute_grace: seconds(&var, "UNMUTE_GRACE_SECS", DEFAULT_UNMUTE_GRACE)?,
            mongodb_uri: var("MONGODB_URI").ok_or(ConfigError::Missing("MONGODB_URI"))?,
            mongodb_database: var("MONGODB_DATABASE").unwrap_or_else(|| "gatekeeper".to_string()),
        })
    }
}

/// Parse a comma-separated list of chat ids. Blank entries are skipped; any
/// other entry that is not an id rejects the whole list.
fn chat_ids(raw: &str) -> Option<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>().ok())
        .collect()
}

fn seconds<F>(var: &F, name: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::Invalid { name, value: raw }),
        },
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [("BOT_TOKEN", "123:abc"), ("MONGODB_URI", "mongodb://localhost")];

    #[test]
    fn defaults_match_the_challenge_window() {
        let config = load(&REQUIRED).unwrap();
        assert_eq!(config.bot_mode, BotMode::Polling);
        assert_eq!(config.challenge_timeout, Duration::from_secs(3600));
        assert_eq!(config.unmute_grace, Duration::from_secs(900));
        assert_eq!(config.mongodb_database, "gatekeeper");
        assert!(config.allowed_chats.is_empty());
    }

    #[test]
    fn missing_token_is_reported() {
        let err = load(&[("MONGODB_URI", "mongodb://localhost")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("BOT_TOKEN"));
    }

    #[test]
    fn webhook_mode_requires_url() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("BOT_MODE", "Webhook"));
        assert_eq!(load(&vars).unwrap_err(), ConfigError::Missing("WEBHOOK_URL"));

        vars.push(("WEBHOOK_URL", "https://example.org/hook"));
        vars.push(("WEBHOOK_PORT", "8080"));
        let config = load(&vars).unwrap();
        assert_eq!(config.bot_mode, BotMode::Webhook);
        assert_eq!(config.webhook_port, 8080);
    }

    #[test]
    fn parses_allowed_chats_skipping_blanks() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("ALLOWED_CHATS", "-1001, -42,,"));
        assert_eq!(load(&vars).unwrap().allowed_chats, vec![-1001, -42]);
    }

    #[test]
    fn malformed_allowed_chat_rejects_the_list() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("ALLOWED_CHATS", "-100123O"));
        assert_eq!(
            load(&vars).unwrap_err(),
            ConfigError::Invalid {
                name: "ALLOWED_CHATS",
                value: "-100123O".to_string(),
            }
        );

        vars.pop();
        vars.push(("ALLOWED_CHATS", "-1001,oops"));
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::Invalid { name: "ALLOWED_CHATS", .. }
        ));
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("CHALLENGE_TIMEOUT_SECS", "0"));
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::Invalid { name: "CHALLENGE_TIMEOUT_SECS", .. }
        ));
    }
}
