//! # Fallback Slide Text
//!
//! Static messages shown when a slide cannot be built from live data. The board
//! always gets *something* on every tick, so each data-backed slide has a
//! human-readable stand-in here instead of an error path.
//!
//! ## No-Countdown Policy
//!
//! Once the ready-by time has passed, the bus slide has nothing meaningful to count
//! down to. Deployments disagree about what to show then, so it is a configurable
//! [`NoCountdownPolicy`]:
//! - **Placeholder**: a fixed, reassuring countdown-shaped string
//! - **NoBus**: an explicit "No bus today"
//!
//! Either way the text is static and never implies a negative duration.

use std::str::FromStr;

pub const WEATHER_ERROR: &str = "Error fetching weather data";
pub const LUNCH_ERROR: &str = "Error fetching lunch data";
pub const LUNCH_MISSING: &str = "No lunch data available for today";

/// Text shown by [`NoCountdownPolicy::Placeholder`].
pub const BUS_PLACEHOLDER: &str = "Bus arrives in 1m 32s";
/// Text shown by [`NoCountdownPolicy::NoBus`].
pub const BUS_NONE: &str = "No bus today";

/// What the bus slide says when the countdown has reached zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoCountdownPolicy {
    #[default]
    Placeholder,
    NoBus,
}

impl NoCountdownPolicy {
    pub fn message(self) -> &'static str {
        match self {
            NoCountdownPolicy::Placeholder => BUS_PLACEHOLDER,
            NoCountdownPolicy::NoBus => BUS_NONE,
        }
    }
}

impl FromStr for NoCountdownPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "placeholder" => Ok(NoCountdownPolicy::Placeholder),
            "no-bus" | "no_bus" | "nobus" => Ok(NoCountdownPolicy::NoBus),
            other => Err(format!(
                "unknown no-countdown policy {other:?}, expected placeholder or no-bus"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_messages_are_static_and_non_negative() {
        for policy in [NoCountdownPolicy::Placeholder, NoCountdownPolicy::NoBus] {
            let message = policy.message();
            assert!(!message.is_empty());
            assert!(!message.contains('-'), "{message} looks negative");
        }
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "no-bus".parse::<NoCountdownPolicy>(),
            Ok(NoCountdownPolicy::NoBus)
        );
        assert_eq!(
            " Placeholder ".parse::<NoCountdownPolicy>(),
            Ok(NoCountdownPolicy::Placeholder)
        );
        assert!("sometimes".parse::<NoCountdownPolicy>().is_err());
    }
}
