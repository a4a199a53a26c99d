//! Data-driven game balance
//!
//! Every number a designer may want to tweak lives here. Defaults are the
//! shipped balance; a JSON document only needs the fields it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Complete balance table for a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub arena: ArenaTuning,
    pub player: PlayerTuning,
    pub basic: BasicEnemyTuning,
    pub tank: TankTuning,
    pub sniper: SniperTuning,
    pub charger: ChargerTuning,
    pub waves: WaveTuning,
    pub upgrades: UpgradeTuning,
    pub pickups: PickupTuning,
}

impl Tuning {
    /// Parse a (possibly partial) JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SimError> {
        let invalid = |msg: &str| Err(SimError::InvalidTuning(msg.to_string()));

        if !(self.arena.width > 0.0 && self.arena.height > 0.0) {
            return invalid("arena width and height must be positive");
        }
        if !(self.player.xp_initial_threshold > 0.0) {
            return invalid("player.xp_initial_threshold must be positive");
        }
        if !(self.player.xp_growth > 1.0) {
            return invalid("player.xp_growth must be greater than 1");
        }
        if !(self.tank.spread_deg >= 0.0) {
            return invalid("tank.spread_deg must not be negative");
        }
        if !(self.sniper.spread_deg >= 0.0) {
            return invalid("sniper.spread_deg must not be negative");
        }
        if self.tank.pellet_speed_min > self.tank.pellet_speed_max {
            return invalid("tank.pellet_speed_min exceeds tank.pellet_speed_max");
        }
        Ok(())
    }

    /// Load a tuning document from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }
}

/// Playfield dimensions
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    pub width: f32,
    pub height: f32,
    /// Height of the HUD bar reserved at the bottom of the screen
    pub hud_height: f32,
    /// Entities stay this far inside the walls
    pub margin: f32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            hud_height: 60.0,
            margin: 10.0,
        }
    }
}

/// One of the player's two weapons
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeaponTuning {
    pub cooldown_secs: f32,
    pub speed: f32,
    pub damage: f32,
    pub pierce: u32,
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub size: f32,
    pub max_health: f32,
    /// Pixels per tick
    pub move_speed: f32,
    pub basic: WeaponTuning,
    pub special: WeaponTuning,
    /// Perpendicular gap between fanned basic bullets
    pub fan_spacing: f32,
    pub xp_initial_threshold: f32,
    pub xp_growth: f32,
    /// Seconds without taking damage before the untouched bonus applies
    pub untouched_threshold_secs: f32,
    /// Cooldowns never drop below these
    pub min_basic_cooldown_secs: f32,
    pub min_special_cooldown_secs: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            size: 40.0,
            max_health: 100.0,
            move_speed: 5.0,
            basic: WeaponTuning {
                cooldown_secs: 0.25,
                speed: 12.0,
                damage: 10.0,
                pierce: 1,
                radius: 5.0,
            },
            special: WeaponTuning {
                cooldown_secs: 1.5,
                speed: 9.0,
                damage: 40.0,
                pierce: 3,
                radius: 12.0,
            },
            fan_spacing: 12.0,
            xp_initial_threshold: 10.0,
            xp_growth: 1.2,
            untouched_threshold_secs: 3.0,
            min_basic_cooldown_secs: 0.05,
            min_special_cooldown_secs: 0.3,
        }
    }
}

/// Stats every enemy kind has
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnemyStats {
    pub base_health: f32,
    /// Pixels per tick
    pub speed: f32,
    pub size: f32,
    pub score: u32,
    pub xp: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicEnemyTuning {
    pub stats: EnemyStats,
    pub homing_interval_secs: f32,
    pub radial_interval_secs: f32,
    pub homing_speed: f32,
    pub homing_damage: f32,
    pub radial_speed: f32,
    pub radial_damage: f32,
}

impl Default for BasicEnemyTuning {
    fn default() -> Self {
        Self {
            stats: EnemyStats {
                base_health: 23.0,
                speed: 2.0,
                size: 30.0,
                score: 10,
                xp: 5.0,
            },
            homing_interval_secs: 2.0,
            radial_interval_secs: 5.0,
            homing_speed: 5.0,
            homing_damage: 8.0,
            radial_speed: 4.0,
            radial_damage: 6.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TankTuning {
    pub stats: EnemyStats,
    pub shotgun_interval_secs: f32,
    pub pellets: u32,
    /// Pellets spread +/- this many degrees around the bearing
    pub spread_deg: f32,
    pub pellet_speed_min: f32,
    pub pellet_speed_max: f32,
    pub pellet_damage: f32,
}

impl Default for TankTuning {
    fn default() -> Self {
        Self {
            stats: EnemyStats {
                base_health: 60.0,
                speed: 1.0,
                size: 50.0,
                score: 25,
                xp: 12.0,
            },
            shotgun_interval_secs: 3.0,
            pellets: 5,
            spread_deg: 20.0,
            pellet_speed_min: 4.0,
            pellet_speed_max: 7.0,
            pellet_damage: 6.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SniperTuning {
    pub stats: EnemyStats,
    /// Retreat when the player is closer than this
    pub keep_distance: f32,
    /// Approach when the player is farther than this
    pub approach_distance: f32,
    pub strafe_secs: f32,
    /// Weight of the pull back toward keep distance while strafing
    pub strafe_bias: f32,
    pub volley_interval_secs: f32,
    pub volley_shots: u32,
    pub shot_delay_secs: f32,
    pub spread_deg: f32,
    pub shot_speed: f32,
    pub shot_damage: f32,
}

impl Default for SniperTuning {
    fn default() -> Self {
        Self {
            stats: EnemyStats {
                base_health: 18.0,
                speed: 2.5,
                size: 28.0,
                score: 20,
                xp: 10.0,
            },
            keep_distance: 300.0,
            approach_distance: 500.0,
            strafe_secs: 1.5,
            strafe_bias: 0.3,
            volley_interval_secs: 4.0,
            volley_shots: 3,
            shot_delay_secs: 0.2,
            spread_deg: 3.0,
            shot_speed: 14.0,
            shot_damage: 12.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargerTuning {
    pub stats: EnemyStats,
    /// Max velocity change per tick while steering
    pub acceleration: f32,
    /// Start a charge when the player is within this distance
    pub charge_distance: f32,
    pub charge_speed: f32,
    pub charge_distance_max: f32,
    /// A charge ends once the remaining distance drops below this
    pub charge_stop_distance: f32,
    pub charge_cooldown_secs: f32,
    /// Velocity is multiplied by this when a charge ends
    pub charge_end_damping: f32,
    /// Contact damage = player max health * fraction + flat
    pub contact_health_fraction: f32,
    pub contact_flat_damage: f32,
}

impl Default for ChargerTuning {
    fn default() -> Self {
        Self {
            stats: EnemyStats {
                base_health: 30.0,
                speed: 3.0,
                size: 32.0,
                score: 15,
                xp: 8.0,
            },
            acceleration: 0.25,
            charge_distance: 300.0,
            charge_speed: 15.0,
            charge_distance_max: 700.0,
            charge_stop_distance: 300.0,
            charge_cooldown_secs: 1.0,
            charge_end_damping: 0.2,
            contact_health_fraction: 0.15,
            contact_flat_damage: 10.0,
        }
    }
}

/// Relative spawn weight per enemy kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpawnWeights {
    pub basic: u32,
    pub tank: u32,
    pub sniper: u32,
    pub charger: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    /// Enemy stats grow by this factor every `enemy_stat_doubling_time` seconds
    pub enemy_stat_base: f32,
    pub enemy_stat_doubling_time: f32,
    pub spawn_interval_initial_secs: f32,
    pub spawn_interval_min_secs: f32,
    /// Spawn interval halves every this many seconds
    pub spawn_interval_halving_time: f32,
    /// Inactive enemies created at session start
    pub pool_size: usize,
    /// Enemies appear this far outside the visible edge
    pub spawn_margin: f32,
    pub weights: SpawnWeights,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            enemy_stat_base: 2.0,
            enemy_stat_doubling_time: 120.0,
            spawn_interval_initial_secs: 2.0,
            spawn_interval_min_secs: 0.35,
            spawn_interval_halving_time: 180.0,
            pool_size: 20,
            spawn_margin: 40.0,
            weights: SpawnWeights {
                basic: 50,
                tank: 15,
                sniper: 20,
                charger: 15,
            },
        }
    }
}

/// Base probability mass per rarity tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RarityWeights {
    pub common: u32,
    pub rare: u32,
    pub epic: u32,
    pub mythic: u32,
    pub legendary: u32,
    pub exclusive: u32,
}

/// Desired share of applied upgrade levels per balance category
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CategoryTargets {
    pub damage: f32,
    pub survival: f32,
    pub cooldown: f32,
    pub utility: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeTuning {
    pub rarity_weights: RarityWeights,
    pub targets: CategoryTargets,
    pub correction_min: f32,
    pub correction_max: f32,
    /// Weight multiplier for the weapon path the player invested in more
    pub path_bias: f32,
    /// Pity chance after a successful bonus roll
    pub pity_base_chance: f32,
    pub choices_per_level: usize,
}

impl Default for UpgradeTuning {
    fn default() -> Self {
        Self {
            rarity_weights: RarityWeights {
                common: 100,
                rare: 50,
                epic: 20,
                mythic: 8,
                legendary: 3,
                exclusive: 1,
            },
            targets: CategoryTargets {
                damage: 0.40,
                survival: 0.35,
                cooldown: 0.15,
                utility: 0.10,
            },
            correction_min: 0.5,
            correction_max: 2.0,
            path_bias: 1.3,
            pity_base_chance: 0.03,
            choices_per_level: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupTuning {
    pub heart_drop_chance: f32,
    /// Fraction of max health restored on pickup
    pub heart_heal_percent: f32,
    /// Damage multiplier per stacked heart buff
    pub heart_buff_multiplier: f32,
    pub heart_buff_secs: f32,
    pub lifetime_secs: f32,
    pub size: f32,
}

impl Default for PickupTuning {
    fn default() -> Self {
        Self {
            heart_drop_chance: 0.08,
            heart_heal_percent: 0.10,
            heart_buff_multiplier: 1.10,
            heart_buff_secs: 5.0,
            lifetime_secs: 10.0,
            size: 20.0,
        }
    }
}
