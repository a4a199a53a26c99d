//! Player combat and stat model
//!
//! All timers are tick-based: the session loop stamps `current_tick` before
//! any player operation, and cooldowns/buffs compare against it.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arena::Arena;
use super::projectile::{ProjectileKind, ProjectilePool, ProjectileSpawn};
use super::upgrade::{Effect, Stat, Upgrade};
use crate::consts::{MAX_DAMAGE_REDUCTION, TICK_RATE};
use crate::error::SimError;
use crate::tuning::{Tuning, WeaponTuning};
use crate::{angle_between, direction, secs_to_ticks};

/// Buff name granted by heart pickups
pub const HEART_BUFF: &str = "heart";

/// The player's two weapons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weapon {
    Basic,
    Special,
}

/// Time-boxed buff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Buff {
    pub name: String,
    pub expires_at_tick: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Aim angle in degrees
    pub angle: f32,
    pub size: f32,
    pub health: f32,
    pub max_health: f32,
    pub alive: bool,
    pub score: u64,

    /// Base movement in pixels per tick
    pub move_speed: f32,
    pub move_speed_multiplier: f32,

    pub basic: WeaponTuning,
    pub special: WeaponTuning,
    pub fan_spacing: f32,
    /// Seconds between shots
    pub basic_cooldown: f32,
    pub special_cooldown: f32,
    min_basic_cooldown: f32,
    min_special_cooldown: f32,

    // === Damage ===
    pub damage_multiplier: f32,
    pub basic_damage_multiplier: f32,
    pub special_damage_multiplier: f32,
    pub rage_bonus: f32,
    pub frenzy_bonus: f32,
    pub fear_bonus: f32,
    /// Per-stack multiplier of the heart buff
    pub heart_buff_multiplier: f32,
    /// Applies while no damage has been taken for `untouched_threshold_ticks`
    pub untouched_multiplier: f32,
    pub untouched_threshold_ticks: u64,
    /// Fraction of raw damage taken banked for the next special
    pub vengeance_percent: f32,
    pub vengeance_bonus: f32,

    // === Projectiles ===
    pub basic_speed_multiplier: f32,
    pub special_speed_multiplier: f32,
    pub basic_pierce_multiplier: f32,
    pub special_pierce_multiplier: f32,
    pub basic_can_repierce: bool,
    pub special_can_repierce: bool,
    pub basic_distance_scaling: bool,
    pub special_distance_scaling: bool,
    pub extra_projectiles: u32,

    // === Survival ===
    /// Fraction of max health regenerated per second
    pub regen_percent: f32,
    /// Fraction of damage dealt returned as health
    pub lifesteal: f32,
    pub damage_reduction: f32,

    // === Progression ===
    pub level: u32,
    pub experience: f32,
    pub experience_to_next_level: f32,
    pub xp_growth: f32,
    pub xp_multiplier: f32,
    /// Fraction of the next threshold gained per second
    pub passive_xp_percent: f32,
    /// Level-ups waiting for an upgrade choice
    pub pending_level_ups: u32,
    pub upgrades: BTreeSet<String>,
    pub upgrade_levels: BTreeMap<String, u32>,
    pub random_upgrade_chance: f32,

    pub buffs: Vec<Buff>,
    pub last_damage_tick: u64,
    pub current_tick: u64,
    pub last_basic_tick: Option<u64>,
    pub last_special_tick: Option<u64>,
}

impl Player {
    pub fn new(tuning: &Tuning, arena: &Arena) -> Self {
        let p = &tuning.player;
        Self {
            pos: arena.center(),
            angle: -90.0,
            size: p.size,
            health: p.max_health,
            max_health: p.max_health,
            alive: true,
            score: 0,

            move_speed: p.move_speed,
            move_speed_multiplier: 1.0,

            basic: p.basic,
            special: p.special,
            fan_spacing: p.fan_spacing,
            basic_cooldown: p.basic.cooldown_secs,
            special_cooldown: p.special.cooldown_secs,
            min_basic_cooldown: p.min_basic_cooldown_secs,
            min_special_cooldown: p.min_special_cooldown_secs,

            damage_multiplier: 1.0,
            basic_damage_multiplier: 1.0,
            special_damage_multiplier: 1.0,
            rage_bonus: 0.0,
            frenzy_bonus: 0.0,
            fear_bonus: 0.0,
            heart_buff_multiplier: tuning.pickups.heart_buff_multiplier,
            untouched_multiplier: 1.0,
            untouched_threshold_ticks: secs_to_ticks(p.untouched_threshold_secs) as u64,
            vengeance_percent: 0.0,
            vengeance_bonus: 0.0,

            basic_speed_multiplier: 1.0,
            special_speed_multiplier: 1.0,
            basic_pierce_multiplier: 1.0,
            special_pierce_multiplier: 1.0,
            basic_can_repierce: false,
            special_can_repierce: false,
            basic_distance_scaling: false,
            special_distance_scaling: false,
            extra_projectiles: 0,

            regen_percent: 0.0,
            lifesteal: 0.0,
            damage_reduction: 0.0,

            level: 1,
            experience: 0.0,
            experience_to_next_level: p.xp_initial_threshold,
            xp_growth: p.xp_growth,
            xp_multiplier: 1.0,
            passive_xp_percent: 0.0,
            pending_level_ups: 0,
            upgrades: BTreeSet::new(),
            upgrade_levels: BTreeMap::new(),
            random_upgrade_chance: 0.0,

            buffs: Vec::new(),
            last_damage_tick: 0,
            current_tick: 0,
            last_basic_tick: None,
            last_special_tick: None,
        }
    }

    /// Reinitialize every field for a new run
    pub fn reset(&mut self, tuning: &Tuning, arena: &Arena) {
        *self = Self::new(tuning, arena);
    }

    pub fn is_dead(&self) -> bool {
        !self.alive
    }

    pub fn is_leveling_up(&self) -> bool {
        self.pending_level_ups > 0
    }

    /// Move along the held input axes, staying inside the arena
    pub fn move_by(&mut self, axes: Vec2, arena: &Arena) {
        if self.is_dead() {
            return;
        }
        let dir = axes.clamp_length_max(1.0);
        self.pos += dir * self.move_speed * self.move_speed_multiplier;
        self.pos = arena.clamp(self.pos, self.size / 2.0);
    }

    fn cooldown_secs(&self, weapon: Weapon) -> f32 {
        match weapon {
            Weapon::Basic => self.basic_cooldown,
            Weapon::Special => self.special_cooldown,
        }
    }

    fn last_shot(&self, weapon: Weapon) -> Option<u64> {
        match weapon {
            Weapon::Basic => self.last_basic_tick,
            Weapon::Special => self.last_special_tick,
        }
    }

    /// True once the weapon's cooldown has elapsed
    pub fn ready(&self, weapon: Weapon) -> bool {
        match self.last_shot(weapon) {
            None => true,
            Some(last) => {
                let elapsed = self.current_tick.saturating_sub(last) as f32;
                elapsed >= self.cooldown_secs(weapon) * TICK_RATE as f32
            }
        }
    }

    /// Cooldown progress in [0, 1] (1 = ready)
    pub fn cooldown_progress(&self, weapon: Weapon) -> f32 {
        match self.last_shot(weapon) {
            None => 1.0,
            Some(last) => {
                let total = self.cooldown_secs(weapon) * TICK_RATE as f32;
                if total <= 0.0 {
                    return 1.0;
                }
                let elapsed = self.current_tick.saturating_sub(last) as f32;
                (elapsed / total).min(1.0)
            }
        }
    }

    pub fn ticks_since_damage(&self) -> u64 {
        self.current_tick.saturating_sub(self.last_damage_tick)
    }

    pub fn buff_stacks(&self, name: &str) -> u32 {
        self.buffs
            .iter()
            .filter(|b| b.name == name && b.expires_at_tick > self.current_tick)
            .count() as u32
    }

    pub fn add_buff(&mut self, name: &str, duration_ticks: u64) {
        self.buffs.push(Buff {
            name: name.to_string(),
            expires_at_tick: self.current_tick + duration_ticks,
        });
    }

    /// Effective projectile pierce for a weapon (always at least 1)
    pub fn pierce(&self, weapon: Weapon) -> u32 {
        let (base, mult) = match weapon {
            Weapon::Basic => (self.basic.pierce, self.basic_pierce_multiplier),
            Weapon::Special => (self.special.pierce, self.special_pierce_multiplier),
        };
        ((base as f32 * mult).round() as u32).max(1)
    }

    /// Damage multiplier at the instant of firing. Never cache this: every
    /// factor depends on live state.
    pub fn effective_damage_multiplier(
        &self,
        weapon: Weapon,
        active_enemies: usize,
        active_projectiles: usize,
    ) -> f32 {
        let weapon_mult = match weapon {
            Weapon::Basic => self.basic_damage_multiplier,
            Weapon::Special => self.special_damage_multiplier,
        };
        let missing_health = if self.max_health > 0.0 {
            (1.0 - self.health / self.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let heart = self
            .heart_buff_multiplier
            .powi(self.buff_stacks(HEART_BUFF) as i32);
        let untouched = if self.ticks_since_damage() > self.untouched_threshold_ticks {
            self.untouched_multiplier
        } else {
            1.0
        };

        self.damage_multiplier
            * weapon_mult
            * (1.0 + self.rage_bonus * active_enemies as f32)
            * (1.0 + self.frenzy_bonus * active_projectiles as f32)
            * (1.0 + self.fear_bonus * missing_health)
            * heart
            * untouched
    }

    /// Fire the basic weapon toward `aim`. Returns the number of projectiles fired.
    pub fn shoot_regular(
        &mut self,
        aim: Vec2,
        projectiles: &mut ProjectilePool,
        active_enemies: usize,
    ) -> usize {
        if self.is_dead() || !self.ready(Weapon::Basic) {
            return 0;
        }
        let angle = angle_between(self.pos, aim);
        self.angle = angle;
        self.last_basic_tick = Some(self.current_tick);

        let mult =
            self.effective_damage_multiplier(Weapon::Basic, active_enemies, projectiles.active_count());
        let count = 1 + self.extra_projectiles as usize;
        let perpendicular = direction(angle + 90.0);
        let center = (count - 1) as f32 / 2.0;
        for i in 0..count {
            let offset = (i as f32 - center) * self.fan_spacing;
            projectiles.acquire(ProjectileSpawn {
                kind: ProjectileKind::PlayerBasic,
                pos: self.pos + perpendicular * offset,
                angle,
                speed: self.basic.speed * self.basic_speed_multiplier,
                damage: self.basic.damage * mult,
                pierce: self.pierce(Weapon::Basic),
                can_repierce: self.basic_can_repierce,
                distance_scaling: self.basic_distance_scaling,
                radius: self.basic.radius,
                tick: self.current_tick,
            });
        }
        count
    }

    /// Fire the special weapon toward `aim`, consuming any banked vengeance.
    pub fn shoot_special(
        &mut self,
        aim: Vec2,
        projectiles: &mut ProjectilePool,
        active_enemies: usize,
    ) -> usize {
        if self.is_dead() || !self.ready(Weapon::Special) {
            return 0;
        }
        let angle = angle_between(self.pos, aim);
        self.angle = angle;
        self.last_special_tick = Some(self.current_tick);

        let mult = self.effective_damage_multiplier(
            Weapon::Special,
            active_enemies,
            projectiles.active_count(),
        );
        let damage = self.special.damage * mult + self.vengeance_bonus;
        self.vengeance_bonus = 0.0;

        projectiles.acquire(ProjectileSpawn {
            kind: ProjectileKind::PlayerSpecial,
            pos: self.pos,
            angle,
            speed: self.special.speed * self.special_speed_multiplier,
            damage,
            pierce: self.pierce(Weapon::Special),
            can_repierce: self.special_can_repierce,
            distance_scaling: self.special_distance_scaling,
            radius: self.special.radius,
            tick: self.current_tick,
        });
        1
    }

    /// Apply incoming damage through damage reduction. Returns the damage
    /// actually removed from health.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if self.is_dead() || amount <= 0.0 {
            return 0.0;
        }
        self.last_damage_tick = self.current_tick;

        let reduction = self.damage_reduction.clamp(0.0, MAX_DAMAGE_REDUCTION);
        let dealt = amount * (1.0 - reduction);
        self.health = (self.health - dealt).max(0.0);
        self.vengeance_bonus += amount * self.vengeance_percent;

        if self.health <= 0.0 {
            self.health = 0.0;
            self.alive = false;
            log::info!("Player died at level {} (score {})", self.level, self.score);
        }
        dealt
    }

    /// Restore health, clamped to max. Returns the amount restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if self.is_dead() || amount <= 0.0 {
            return 0.0;
        }
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        self.health - before
    }

    /// Add experience (after the XP multiplier). Returns level-ups gained.
    pub fn gain_experience(&mut self, amount: f32) -> u32 {
        if self.is_dead() || amount <= 0.0 {
            return 0;
        }
        self.experience += amount * self.xp_multiplier;

        let mut gained = 0;
        while self.experience_to_next_level > 0.0
            && self.experience >= self.experience_to_next_level
        {
            self.experience -= self.experience_to_next_level;
            self.experience_to_next_level *= self.xp_growth;
            self.level += 1;
            self.pending_level_ups += 1;
            gained += 1;
            log::info!("Level up! Now level {}", self.level);
        }
        gained
    }

    /// Per-tick housekeeping: buff expiry plus once-per-second regen and passive XP
    pub fn update_timers(&mut self, tick: u64) {
        self.current_tick = tick;
        self.buffs.retain(|b| b.expires_at_tick > tick);

        if self.is_dead() || tick == 0 || tick % TICK_RATE as u64 != 0 {
            return;
        }
        if self.regen_percent > 0.0 {
            self.heal(self.max_health * self.regen_percent);
        }
        if self.passive_xp_percent > 0.0 {
            let amount = self.experience_to_next_level * self.passive_xp_percent;
            self.gain_experience(amount);
        }
    }

    pub fn upgrade_level(&self, name: &str) -> u32 {
        self.upgrade_levels.get(name).copied().unwrap_or(0)
    }

    /// Apply one level of an upgrade. Exceeding `max_level` is a contract
    /// violation the selection engine filters out; it is still refused here.
    pub fn apply_upgrade(&mut self, upgrade: &Upgrade) -> Result<u32, SimError> {
        let level = self.upgrade_level(upgrade.name);
        if level >= upgrade.max_level {
            return Err(SimError::UpgradeMaxed {
                name: upgrade.name.to_string(),
                max_level: upgrade.max_level,
            });
        }
        for effect in upgrade.effects {
            self.apply_effect(effect);
        }
        self.upgrades.insert(upgrade.name.to_string());
        let new_level = level + 1;
        self.upgrade_levels.insert(upgrade.name.to_string(), new_level);
        log::debug!("Applied {} (level {})", upgrade.name, new_level);
        Ok(new_level)
    }

    fn stat_mut(&mut self, stat: Stat) -> Option<&mut f32> {
        let field = match stat {
            Stat::DamageMultiplier => &mut self.damage_multiplier,
            Stat::BasicDamage => &mut self.basic_damage_multiplier,
            Stat::SpecialDamage => &mut self.special_damage_multiplier,
            Stat::BasicProjectileSpeed => &mut self.basic_speed_multiplier,
            Stat::SpecialProjectileSpeed => &mut self.special_speed_multiplier,
            Stat::BasicPierce => &mut self.basic_pierce_multiplier,
            Stat::SpecialPierce => &mut self.special_pierce_multiplier,
            Stat::BasicCooldown => &mut self.basic_cooldown,
            Stat::SpecialCooldown => &mut self.special_cooldown,
            Stat::MoveSpeed => &mut self.move_speed_multiplier,
            Stat::RegenPercent => &mut self.regen_percent,
            Stat::Lifesteal => &mut self.lifesteal,
            Stat::XpMultiplier => &mut self.xp_multiplier,
            Stat::PassiveXp => &mut self.passive_xp_percent,
            Stat::DamageReduction => &mut self.damage_reduction,
            Stat::RageBonus => &mut self.rage_bonus,
            Stat::FrenzyBonus => &mut self.frenzy_bonus,
            Stat::FearBonus => &mut self.fear_bonus,
            Stat::HeartBuffMultiplier => &mut self.heart_buff_multiplier,
            Stat::UntouchedMultiplier => &mut self.untouched_multiplier,
            Stat::VengeancePercent => &mut self.vengeance_percent,
            Stat::RandomUpgradeChance => &mut self.random_upgrade_chance,
            Stat::MaxHealth
            | Stat::HealPercent
            | Stat::ExtraProjectiles
            | Stat::SpecialRepierce
            | Stat::BasicDistanceScaling
            | Stat::SpecialDistanceScaling => return None,
        };
        Some(field)
    }

    fn apply_effect(&mut self, effect: &Effect) {
        let Effect { stat, op, amount } = *effect;
        match stat {
            Stat::MaxHealth => {
                let before = self.max_health;
                self.max_health = op.apply(self.max_health, amount).max(1.0);
                // Growth also fills the new headroom
                let delta = self.max_health - before;
                if delta > 0.0 {
                    self.health += delta;
                }
                self.health = self.health.clamp(0.0, self.max_health);
            }
            Stat::HealPercent => {
                let fraction = op.apply(0.0, amount);
                self.heal(self.max_health * fraction);
            }
            Stat::ExtraProjectiles => {
                let value = op.apply(self.extra_projectiles as f32, amount);
                self.extra_projectiles = value.round().max(0.0) as u32;
            }
            Stat::SpecialRepierce => {
                self.special_can_repierce =
                    op.apply(bool_stat(self.special_can_repierce), amount) != 0.0;
            }
            Stat::BasicDistanceScaling => {
                self.basic_distance_scaling =
                    op.apply(bool_stat(self.basic_distance_scaling), amount) != 0.0;
            }
            Stat::SpecialDistanceScaling => {
                self.special_distance_scaling =
                    op.apply(bool_stat(self.special_distance_scaling), amount) != 0.0;
            }
            _ => {
                if let Some(field) = self.stat_mut(stat) {
                    *field = op.apply(*field, amount);
                }
                self.basic_cooldown = self.basic_cooldown.max(self.min_basic_cooldown);
                self.special_cooldown = self.special_cooldown.max(self.min_special_cooldown);
                self.random_upgrade_chance = self.random_upgrade_chance.clamp(0.0, 1.0);
            }
        }
    }
}

fn bool_stat(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::upgrade::find;

    fn player() -> Player {
        Player::new(&Tuning::default(), &Arena::default())
    }

    #[test]
    fn test_cooldown_gates_basic_fire() {
        let mut p = player();
        let mut pool = ProjectilePool::new();
        let aim = p.pos + Vec2::new(100.0, 0.0);

        assert_eq!(p.shoot_regular(aim, &mut pool, 0), 1);
        assert_eq!(p.shoot_regular(aim, &mut pool, 0), 0);

        // 0.25 s at 60 Hz = 15 ticks
        p.current_tick = 14;
        assert_eq!(p.shoot_regular(aim, &mut pool, 0), 0);
        p.current_tick = 15;
        assert_eq!(p.shoot_regular(aim, &mut pool, 0), 1);
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn test_dead_player_cannot_fire() {
        let mut p = player();
        let mut pool = ProjectilePool::new();
        p.take_damage(1000.0);
        assert!(p.is_dead());
        assert_eq!(p.shoot_regular(Vec2::ZERO, &mut pool, 0), 0);
        assert_eq!(p.shoot_special(Vec2::ZERO, &mut pool, 0), 0);
    }

    #[test]
    fn test_extra_projectiles_fan_perpendicular() {
        let mut p = player();
        p.extra_projectiles = 2;
        let mut pool = ProjectilePool::new();
        let aim = p.pos + Vec2::new(100.0, 0.0);
        assert_eq!(p.shoot_regular(aim, &mut pool, 0), 3);

        let ys: Vec<f32> = pool.active().map(|proj| proj.pos.y - p.pos.y).collect();
        assert_eq!(ys.len(), 3);
        assert!((ys[0] + 12.0).abs() < 1e-3);
        assert!(ys[1].abs() < 1e-3);
        assert!((ys[2] - 12.0).abs() < 1e-3);
    }

    #[test]
    fn test_take_damage_clamps_and_kills() {
        let mut p = player();
        assert_eq!(p.take_damage(30.0), 30.0);
        assert_eq!(p.health, 70.0);
        p.take_damage(500.0);
        assert_eq!(p.health, 0.0);
        assert!(p.is_dead());
        // Further damage is ignored
        assert_eq!(p.take_damage(10.0), 0.0);
    }

    #[test]
    fn test_damage_reduction_is_capped() {
        let mut p = player();
        p.damage_reduction = 5.0;
        let dealt = p.take_damage(100.0);
        assert!((dealt - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_vengeance_applies_to_next_special_only() {
        let mut p = player();
        p.vengeance_percent = 0.5;
        p.take_damage(20.0);
        assert_eq!(p.vengeance_bonus, 10.0);

        // Stay below untouched/fear effects: only the flat bonus differs
        let mult = p.effective_damage_multiplier(Weapon::Special, 0, 0);
        let mut pool = ProjectilePool::new();
        p.shoot_special(p.pos + Vec2::X, &mut pool, 0);
        let first = pool.active().next().unwrap().damage;
        assert!((first - (40.0 * mult + 10.0)).abs() < 1e-3);
        assert_eq!(p.vengeance_bonus, 0.0);
    }

    #[test]
    fn test_effective_multiplier_factors() {
        let mut p = player();
        p.rage_bonus = 0.01;
        p.frenzy_bonus = 0.005;
        p.fear_bonus = 0.5;
        p.health = 50.0;
        p.current_tick = 1;
        p.add_buff(HEART_BUFF, 100);
        p.add_buff(HEART_BUFF, 100);

        let m = p.effective_damage_multiplier(Weapon::Basic, 10, 20);
        // rage 1.1, frenzy 1.1, fear 1.25, two heart stacks 1.1^2
        let expected = 1.1 * 1.1 * 1.25 * 1.1_f32.powi(2);
        assert!((m - expected).abs() < 1e-4, "{m} vs {expected}");
    }

    #[test]
    fn test_untouched_bonus_requires_quiet_period() {
        let mut p = player();
        p.untouched_multiplier = 1.5;
        p.current_tick = 100;
        p.take_damage(1.0);
        p.current_tick = 100 + p.untouched_threshold_ticks;
        assert_eq!(p.effective_damage_multiplier(Weapon::Basic, 0, 0), 1.0);
        p.current_tick += 1;
        assert_eq!(p.effective_damage_multiplier(Weapon::Basic, 0, 0), 1.5);
    }

    #[test]
    fn test_gain_experience_levels_up() {
        let mut p = player();
        assert_eq!(p.gain_experience(12.0), 1);
        assert_eq!(p.level, 2);
        assert!((p.experience - 2.0).abs() < 1e-4);
        assert!((p.experience_to_next_level - 12.0).abs() < 1e-4);
        assert!(p.is_leveling_up());
    }

    #[test]
    fn test_zero_threshold_does_not_level_forever() {
        let mut p = player();
        p.experience_to_next_level = 0.0;
        assert_eq!(p.gain_experience(1.0), 0);
        assert_eq!(p.level, 1);
    }

    #[test]
    fn test_regen_is_tick_gated() {
        let mut p = player();
        p.regen_percent = 0.01;
        p.health = 50.0;
        p.update_timers(59);
        assert_eq!(p.health, 50.0);
        p.update_timers(60);
        assert_eq!(p.health, 51.0);
    }

    #[test]
    fn test_buffs_expire() {
        let mut p = player();
        p.add_buff(HEART_BUFF, 10);
        assert_eq!(p.buff_stacks(HEART_BUFF), 1);
        p.update_timers(10);
        assert_eq!(p.buff_stacks(HEART_BUFF), 0);
        assert!(p.buffs.is_empty());
    }

    #[test]
    fn test_apply_upgrade_respects_max_level() {
        let mut p = player();
        let sharpshooter = find("Sharpshooter").unwrap();
        assert_eq!(p.apply_upgrade(sharpshooter).unwrap(), 1);
        assert!(p.basic_distance_scaling);
        assert!(matches!(
            p.apply_upgrade(sharpshooter),
            Err(SimError::UpgradeMaxed { max_level: 1, .. })
        ));
        assert_eq!(p.upgrade_level("Sharpshooter"), 1);
        assert!(p.upgrades.contains("Sharpshooter"));
    }

    #[test]
    fn test_upgrade_effects() {
        let mut p = player();
        p.apply_upgrade(find("Vitality").unwrap()).unwrap();
        assert_eq!(p.max_health, 120.0);
        assert_eq!(p.health, 120.0);

        p.apply_upgrade(find("Glass Cannon").unwrap()).unwrap();
        assert!((p.max_health - 84.0).abs() < 1e-3);
        assert!(p.health <= p.max_health);
        assert!((p.damage_multiplier - 1.5).abs() < 1e-6);

        p.apply_upgrade(find("Drill Core").unwrap()).unwrap();
        assert_eq!(p.pierce(Weapon::Special), 4);

        p.apply_upgrade(find("Roll the Dice").unwrap()).unwrap();
        assert!((p.random_upgrade_chance - 0.03).abs() < 1e-6);
    }

    #[test]
    fn test_cooldown_upgrades_respect_floor() {
        let mut p = player();
        p.basic_cooldown = 0.051;
        p.apply_upgrade(find("Quick Trigger").unwrap()).unwrap();
        assert_eq!(p.basic_cooldown, 0.05);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let tuning = Tuning::default();
        let arena = Arena::default();
        let mut p = Player::new(&tuning, &arena);
        p.apply_upgrade(find("Power Surge").unwrap()).unwrap();
        p.take_damage(40.0);
        p.reset(&tuning, &arena);
        assert_eq!(p.health, p.max_health);
        assert!(p.upgrade_levels.is_empty());
        assert_eq!(p.damage_multiplier, 1.0);
    }
}
