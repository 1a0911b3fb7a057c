//! Errors surfaced by game operations.
//!
//! Every variant is recoverable: the operation is rejected, state is left as
//! it was, and the message is shown to the player.

use thiserror::Error;

use crate::store::StoreError;

/// Rejection reasons for engine and session operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    /// Not enough energy for one tap.
    #[error("not enough energy: need {required}, have {available}")]
    InsufficientEnergy {
        /// Energy a tap costs (the current tap value).
        required: u64,
        /// Energy currently available.
        available: u64,
    },

    /// Not enough spendable coins.
    #[error("not enough coins: need {required}, have {available}")]
    InsufficientCoins {
        /// Coins the operation needs.
        required: u64,
        /// Spendable balance.
        available: u64,
    },

    #[error("no free boosts left today")]
    NoFreeBoostsLeft,

    #[error("today's reward has already been claimed")]
    AlreadyClaimedToday,

    #[error("reward for level {0} has already been claimed")]
    AlreadyClaimed(u32),

    #[error("reach level {required} to claim this reward (current level {current})")]
    LevelTooLow {
        /// Level the tier requires.
        required: u32,
        /// Player's level.
        current: u32,
    },

    #[error("no reward is configured for level {0}")]
    UnknownLevelTier(u32),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("not signed in")]
    NotAuthenticated,

    #[error("username {0:?} is already taken")]
    UsernameTaken(String),

    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    #[error("storage unavailable: {0}")]
    PersistenceUnavailable(#[from] StoreError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        let e = GameError::InsufficientEnergy {
            required: 10,
            available: 3,
        };
        assert_eq!(e.to_string(), "not enough energy: need 10, have 3");
        assert_eq!(
            GameError::AlreadyClaimed(5).to_string(),
            "reward for level 5 has already been claimed"
        );
    }

    #[test]
    fn store_errors_become_persistence_unavailable() {
        let e: GameError = StoreError::Unavailable("offline".into()).into();
        assert!(matches!(e, GameError::PersistenceUnavailable(_)));
        assert!(e.to_string().contains("offline"));
    }
}
