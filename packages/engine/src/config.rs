//! Engine configuration.

use std::str::FromStr;

use serde::Deserialize;
use tracing::warn;

/// Deck session tuning.
///
/// Values come from the embedding application, either directly or via
/// `from_env`. Invalid environment values fall back to the defaults with a
/// warning rather than failing startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Cards dealt per swiping session.
    pub cards_per_session: usize,
    /// Hours between session starts. Zero disables the cooldown.
    pub cooldown_hours: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cards_per_session: 10,
            cooldown_hours: 24,
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cards_per_session: parse_env("TANDEM_CARDS_PER_SESSION", defaults.cards_per_session),
            cooldown_hours: parse_env("TANDEM_COOLDOWN_HOURS", defaults.cooldown_hours),
        }
    }
}

fn parse_env<T: FromStr + Copy>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(var = name, value = %raw, "invalid value, using default");
                default
            }
        },
        Err(_) => default,
    }
}
