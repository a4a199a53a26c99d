//! Errors surfaced at the simulation's API boundary
//!
//! Invariant edges inside a tick (double death, pool growth, out-of-bounds
//! positions) are handled in place and never show up here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// An upgrade choice arrived while no level-up was pending
    #[error("no level-up is pending")]
    NotLevelingUp,

    /// The chosen upgrade was not among the offered choices
    #[error("upgrade `{0}` was not offered")]
    NotOffered(String),

    #[error("unknown upgrade `{0}`")]
    UnknownUpgrade(String),

    /// Applying the upgrade would exceed its max level
    #[error("upgrade `{name}` is already at max level {max_level}")]
    UpgradeMaxed { name: String, max_level: u32 },

    #[error("malformed tuning JSON: {0}")]
    Config(#[from] serde_json::Error),

    /// Tuning parsed but holds values the simulation cannot run with
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
}
