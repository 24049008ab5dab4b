use std::env;

use anyhow::{Context, Result};

pub const DEFAULT_LISTEN_ADDR: &str = "localhost:8080";
pub const DEFAULT_VAPID_SUBJECT: &str = "mailto:noreply@readwillbe.app";
pub const DEFAULT_MAX_SUBSCRIPTIONS: usize = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub vapid_public_key: Option<String>,
    pub vapid_private_key: Option<String>,
    pub vapid_subject: String,
    pub max_subscriptions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            vapid_public_key: None,
            vapid_private_key: None,
            vapid_subject: DEFAULT_VAPID_SUBJECT.to_string(),
            max_subscriptions: DEFAULT_MAX_SUBSCRIPTIONS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let max_subscriptions = match non_empty_var("PUSH_MAX_SUBSCRIPTIONS") {
            Some(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("PUSH_MAX_SUBSCRIPTIONS is not a number: {raw}"))?,
            None => defaults.max_subscriptions,
        };
        Ok(Self {
            listen_addr: non_empty_var("PUSH_LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            vapid_public_key: non_empty_var("VAPID_PUBLIC_KEY"),
            vapid_private_key: non_empty_var("VAPID_PRIVATE_KEY"),
            vapid_subject: non_empty_var("VAPID_SUBJECT").unwrap_or(defaults.vapid_subject),
            max_subscriptions,
        })
    }

    /// Private key for signing, only when both halves of the pair are set.
    pub fn vapid_signing_key(&self) -> Option<&str> {
        match (&self.vapid_public_key, &self.vapid_private_key) {
            (Some(_), Some(private)) => Some(private.as_str()),
            _ => None,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Load `.env` if present, then read the environment.
pub fn init_config() -> Result<Config> {
    dotenvy::dotenv().ok();
    Config::from_env()
}
