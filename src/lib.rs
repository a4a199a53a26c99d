//! Arena Rush - A top-down arena combat simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (pools, enemy behaviors, player stats, upgrades)
//! - `tuning`: Data-driven game balance
//! - `highscores`: Score comparison handed to the persistence layer
//! - `error`: Errors surfaced at the API boundary

pub mod error;
pub mod highscores;
pub mod sim;
pub mod tuning;

pub use error::SimError;
pub use highscores::HighScores;
pub use tuning::Tuning;

use glam::Vec2;

/// Fixed simulation constants (not data-driven)
pub mod consts {
    /// Simulation ticks per second
    pub const TICK_RATE: u32 = 60;

    /// Duration of the enemy fade-and-shrink death animation
    pub const DEATH_ANIMATION_SECS: f32 = 0.5;

    /// Enemy homing bullets steer toward the player for this long after spawn
    pub const HOMING_DURATION_SECS: f32 = 1.0;
    /// Maximum homing turn per tick (degrees)
    pub const HOMING_MAX_TURN_DEG: f32 = 3.0;

    /// Basic bullet bonus ramps to its cap over this many units traveled
    pub const BASIC_SCALING_MAX_DISTANCE: f32 = 800.0;
    /// Special bullets keep the full bonus up to this distance...
    pub const SPECIAL_SCALING_FULL_DISTANCE: f32 = 50.0;
    /// ...and lose all of it at this distance
    pub const SPECIAL_SCALING_ZERO_DISTANCE: f32 = 500.0;
    /// +200% at full bonus
    pub const DISTANCE_SCALING_MAX_BONUS: f32 = 2.0;

    /// Damage reduction can never exceed this fraction
    pub const MAX_DAMAGE_REDUCTION: f32 = 0.97;

    /// Projectiles are culled once this far outside the arena
    pub const PROJECTILE_CULL_MARGIN: f32 = 50.0;
}

/// Normalize an angle in degrees to [-180, 180)
#[inline]
pub fn normalize_degrees(mut angle: f32) -> f32 {
    while angle >= 180.0 {
        angle -= 360.0;
    }
    while angle < -180.0 {
        angle += 360.0;
    }
    angle
}

/// Bearing from `from` to `to` in degrees (screen space, +y down)
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x).to_degrees()
}

/// Unit vector for an angle in degrees
#[inline]
pub fn direction(angle_deg: f32) -> Vec2 {
    let rad = angle_deg.to_radians();
    Vec2::new(rad.cos(), rad.sin())
}

/// Convert seconds to whole ticks at the fixed tick rate
#[inline]
pub fn secs_to_ticks(secs: f32) -> u32 {
    (secs * consts::TICK_RATE as f32).round().max(0.0) as u32
}

/// Convert ticks to seconds at the fixed tick rate
#[inline]
pub fn ticks_to_secs(ticks: u64) -> f32 {
    ticks as f32 / consts::TICK_RATE as f32
}

/// Clamp a point into an axis-aligned box
#[inline]
pub fn clamp_to_bounds(pos: Vec2, min: Vec2, max: Vec2) -> Vec2 {
    pos.clamp(min, max)
}
