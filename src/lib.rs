//! Pairing Bot - daily mock-interview pairing service
//!
//! The core is a matching engine that searches every ordering of today's
//! participants for the one with the most compatible adjacent pairs, then
//! slices it into pairs and an odd leftover. Everything around it (profile
//! store, Zulip notifications, cron trigger) is a thin adapter.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{is_compatible, partition, EngineError, MatchResult, Matcher};
pub use models::{Level, Pair, Pairing, Participant, Profile, UserConfig};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let a = Participant::new("a", "a@example.com", Level::Hard, [Level::Hard]);
        let b = Participant::new("b", "b@example.com", Level::Hard, [Level::Hard]);
        assert!(is_compatible(&a, &b));
    }
}
