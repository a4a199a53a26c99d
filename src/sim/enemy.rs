//! Enemy entity and lifecycle
//!
//! Lifecycle is `Active -> Dying -> Removed`. Health may dip below zero on
//! the lethal hit; rewards are paid exactly once, guarded by `dying`. The
//! death animation runs for a fixed tick count before the pool reclaims the
//! slot.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::SimRng;
use super::behavior::{self, EnemyContext};
use super::events::{COLOR_DAMAGE, COLOR_EXPERIENCE, Feedback};
use super::player::Player;
use crate::consts::DEATH_ANIMATION_SECS;
use crate::secs_to_ticks;
use crate::tuning::{EnemyStats, Tuning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Pursuer firing homing bullets and radial bursts
    Basic,
    /// Slow pursuer with a shotgun
    Tank,
    /// Keeps its distance and fires volleys
    Sniper,
    /// Steers in, charges, and explodes on contact
    Charger,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Basic,
        EnemyKind::Tank,
        EnemyKind::Sniper,
        EnemyKind::Charger,
    ];

    pub fn index(&self) -> usize {
        match self {
            EnemyKind::Basic => 0,
            EnemyKind::Tank => 1,
            EnemyKind::Sniper => 2,
            EnemyKind::Charger => 3,
        }
    }

    pub fn stats<'a>(&self, tuning: &'a Tuning) -> &'a EnemyStats {
        match self {
            EnemyKind::Basic => &tuning.basic.stats,
            EnemyKind::Tank => &tuning.tank.stats,
            EnemyKind::Sniper => &tuning.sniper.stats,
            EnemyKind::Charger => &tuning.charger.stats,
        }
    }
}

/// Steering state of a charger
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ChargerState {
    pub velocity: Vec2,
    pub charging: bool,
    /// Unit direction captured when the charge started
    pub charge_dir: Vec2,
    pub charge_traveled: f32,
    /// Ticks of post-charge recovery left (no movement)
    pub cooldown: u32,
}

/// Per-variant behavior state. All counters are ticks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Behavior {
    Basic {
        homing_cooldown: u32,
        radial_cooldown: u32,
    },
    Tank {
        shotgun_cooldown: u32,
    },
    Sniper {
        volley_cooldown: u32,
        shots_remaining: u32,
        shot_delay: u32,
        /// Degrees
        strafe_angle: f32,
        strafe_ticks: u32,
    },
    Charger(ChargerState),
}

impl Behavior {
    /// Fresh state with randomized initial delays so volleys don't line up
    pub fn new(kind: EnemyKind, tuning: &Tuning, rng: &mut SimRng) -> Self {
        let mut delay = |secs: f32| rng.random_range(0..=secs_to_ticks(secs));
        match kind {
            EnemyKind::Basic => Behavior::Basic {
                homing_cooldown: delay(tuning.basic.homing_interval_secs),
                radial_cooldown: delay(tuning.basic.radial_interval_secs),
            },
            EnemyKind::Tank => Behavior::Tank {
                shotgun_cooldown: delay(tuning.tank.shotgun_interval_secs),
            },
            EnemyKind::Sniper => Behavior::Sniper {
                volley_cooldown: delay(tuning.sniper.volley_interval_secs),
                shots_remaining: 0,
                shot_delay: 0,
                strafe_angle: 0.0,
                strafe_ticks: 0,
            },
            EnemyKind::Charger => Behavior::Charger(ChargerState::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    /// Unique per spawn; recycled slots get a new id
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: f32,
    /// Pixels per tick
    pub speed: f32,
    /// Difficulty multiplier snapshotted at spawn
    pub scaling: f32,
    pub health: f32,
    pub max_health: f32,
    pub score_reward: u64,
    pub xp_reward: f32,
    pub active: bool,
    pub dying: bool,
    pub death_animation_start_tick: u64,
    pub behavior: Behavior,
}

impl Enemy {
    pub fn new(
        id: u32,
        kind: EnemyKind,
        pos: Vec2,
        scaling: f32,
        tuning: &Tuning,
        rng: &mut SimRng,
    ) -> Self {
        let stats = kind.stats(tuning);
        let mut enemy = Self {
            id,
            kind,
            pos,
            size: stats.size,
            speed: stats.speed,
            scaling,
            health: 0.0,
            max_health: 0.0,
            score_reward: 0,
            xp_reward: 0.0,
            active: true,
            dying: false,
            death_animation_start_tick: 0,
            behavior: Behavior::new(kind, tuning, rng),
        };
        enemy.reset(id, pos, scaling, tuning, rng);
        enemy
    }

    /// Reinitialize a pooled enemy in place (kind is kept)
    pub fn reset(&mut self, id: u32, pos: Vec2, scaling: f32, tuning: &Tuning, rng: &mut SimRng) {
        let stats = self.kind.stats(tuning);
        self.id = id;
        self.pos = pos;
        self.size = stats.size;
        self.speed = stats.speed;
        self.scaling = scaling;
        self.max_health = (stats.base_health * scaling).floor();
        self.health = self.max_health;
        self.score_reward = (stats.score as f32 * scaling).floor() as u64;
        self.xp_reward = (stats.xp * scaling).floor();
        self.active = true;
        self.dying = false;
        self.death_animation_start_tick = 0;
        self.behavior = Behavior::new(self.kind, tuning, rng);
    }

    /// Subtract health and pay out rewards on the first lethal hit.
    ///
    /// Returns true only for the hit that started the death animation.
    pub fn apply_damage(
        &mut self,
        amount: f32,
        tick: u64,
        player: &mut Player,
        feedback: &mut Feedback,
    ) -> bool {
        self.health -= amount;
        feedback.floating_number(amount, self.pos, COLOR_DAMAGE);

        if self.health > 0.0 || self.dying {
            return false;
        }
        self.dying = true;
        self.death_animation_start_tick = tick;
        player.score += self.score_reward;
        player.gain_experience(self.xp_reward);
        feedback.floating_number(self.xp_reward, self.pos, COLOR_EXPERIENCE);
        log::debug!("{:?} #{} killed (+{} score)", self.kind, self.id, self.score_reward);
        true
    }

    pub fn death_animation_ticks() -> u64 {
        secs_to_ticks(DEATH_ANIMATION_SECS) as u64
    }

    /// Fraction of the death animation elapsed, 0 while alive
    pub fn dying_progress(&self, tick: u64) -> f32 {
        if !self.dying {
            return 0.0;
        }
        let elapsed = tick.saturating_sub(self.death_animation_start_tick) as f32;
        (elapsed / Self::death_animation_ticks() as f32).min(1.0)
    }

    /// Render scale/alpha: shrinks from 1 to 0 while dying
    pub fn visual_scale(&self, tick: u64) -> f32 {
        1.0 - self.dying_progress(tick)
    }

    /// True once the death animation has fully played
    pub fn death_finished(&self, tick: u64) -> bool {
        self.dying
            && tick.saturating_sub(self.death_animation_start_tick) > Self::death_animation_ticks()
    }

    /// One tick of behavior: move, then shoot. Dying enemies only animate.
    pub fn update(&mut self, ctx: &mut EnemyContext) {
        if !self.active || self.dying {
            return;
        }
        behavior::move_enemy(self, ctx);
        if self.dying {
            return;
        }
        behavior::shoot(self, ctx);
    }
}
