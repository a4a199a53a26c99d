//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (pool slot order)
//! - No rendering or platform dependencies

pub mod arena;
pub mod behavior;
pub mod collision;
pub mod enemy;
pub mod events;
pub mod pickup;
pub mod player;
pub mod projectile;
pub mod selection;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod upgrade;

/// The one RNG type used across the simulation
pub type SimRng = rand_pcg::Pcg32;

pub use arena::Arena;
pub use enemy::{Behavior, Enemy, EnemyKind};
pub use events::Feedback;
pub use pickup::{Pickup, PickupKind, Pickups};
pub use player::{Player, Weapon};
pub use projectile::{Alignment, Projectile, ProjectileHandle, ProjectileKind, ProjectilePool};
pub use selection::{Grant, get_random_upgrades, grant_upgrade};
pub use snapshot::Snapshot;
pub use spawner::{EnemyHandle, EnemyPool, WaveDirector};
pub use state::{GamePhase, SessionReport, SimulationState};
pub use tick::{TickInput, autopilot, tick};
pub use upgrade::{Category, Rarity, Upgrade};
