//! Projectile pool
//!
//! Projectiles live in a dense slot array with a free list of inactive
//! indices. Acquire pops the free list (or grows the array), so a slot's
//! handle is stable for as long as the projectile stays active. Inactive
//! slots keep stale data until `reset` reinitializes them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arena::Arena;
use super::collision::{resolve_enemy_projectile, resolve_player_projectile};
use super::spawner::EnemyPool;
use super::events::Feedback;
use super::player::Player;
use crate::consts::*;
use crate::{angle_between, direction, normalize_degrees, secs_to_ticks};

/// Which side a projectile damages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    PlayerBasic,
    PlayerSpecial,
    EnemyHoming,
    EnemyAoe,
    EnemyShotgunPellet,
    SniperShot,
}

impl ProjectileKind {
    pub fn alignment(&self) -> Alignment {
        match self {
            ProjectileKind::PlayerBasic | ProjectileKind::PlayerSpecial => Alignment::Player,
            ProjectileKind::EnemyHoming
            | ProjectileKind::EnemyAoe
            | ProjectileKind::EnemyShotgunPellet
            | ProjectileKind::SniperShot => Alignment::Enemy,
        }
    }
}

/// Stable index of a pool slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectileHandle(pub usize);

/// Constructor arguments for `ProjectilePool::acquire`
#[derive(Debug, Clone, Copy)]
pub struct ProjectileSpawn {
    pub kind: ProjectileKind,
    pub pos: Vec2,
    /// Degrees
    pub angle: f32,
    /// Pixels per tick
    pub speed: f32,
    pub damage: f32,
    pub pierce: u32,
    pub can_repierce: bool,
    /// Scale damage by distance from the spawn point
    pub distance_scaling: bool,
    pub radius: f32,
    /// Tick the projectile was fired on
    pub tick: u64,
}

impl ProjectileSpawn {
    /// Single-use enemy projectile
    pub fn enemy(kind: ProjectileKind, pos: Vec2, angle: f32, speed: f32, damage: f32, tick: u64) -> Self {
        let radius = match kind {
            ProjectileKind::EnemyAoe => 6.0,
            ProjectileKind::EnemyShotgunPellet => 4.0,
            ProjectileKind::SniperShot => 4.0,
            _ => 5.0,
        };
        Self {
            kind,
            pos,
            angle,
            speed,
            damage,
            pierce: 1,
            can_repierce: false,
            distance_scaling: false,
            radius,
            tick,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub alignment: Alignment,
    pub pos: Vec2,
    /// Degrees
    pub angle: f32,
    pub speed: f32,
    /// Base damage before distance scaling
    pub damage: f32,
    /// Remaining hits allowed
    pub pierce: u32,
    pub can_repierce: bool,
    pub radius: f32,
    pub active: bool,
    /// Ids of enemies already struck
    pub hit_targets: Vec<u32>,
    /// Spawn point, present only for distance-scaled projectiles
    pub origin: Option<Vec2>,
    pub spawn_tick: u64,
}

impl Projectile {
    pub fn new(spawn: &ProjectileSpawn) -> Self {
        let mut projectile = Self {
            kind: spawn.kind,
            alignment: spawn.kind.alignment(),
            pos: spawn.pos,
            angle: spawn.angle,
            speed: spawn.speed,
            damage: spawn.damage,
            pierce: spawn.pierce,
            can_repierce: spawn.can_repierce,
            radius: spawn.radius,
            active: true,
            hit_targets: Vec::new(),
            origin: None,
            spawn_tick: spawn.tick,
        };
        projectile.reset(spawn);
        projectile
    }

    /// Reinitialize in place; `hit_targets` keeps its allocation
    pub fn reset(&mut self, spawn: &ProjectileSpawn) {
        self.kind = spawn.kind;
        self.alignment = spawn.kind.alignment();
        self.pos = spawn.pos;
        self.angle = spawn.angle;
        self.speed = spawn.speed;
        self.damage = spawn.damage;
        self.pierce = spawn.pierce.max(1);
        self.can_repierce = spawn.can_repierce;
        self.radius = spawn.radius;
        self.active = true;
        self.hit_targets.clear();
        self.origin = spawn.distance_scaling.then_some(spawn.pos);
        self.spawn_tick = spawn.tick;
    }

    /// Euclidean displacement from the spawn point (0 if unscaled)
    pub fn distance_traveled(&self) -> f32 {
        self.origin.map(|o| o.distance(self.pos)).unwrap_or(0.0)
    }

    /// Damage this projectile deals right now
    pub fn current_damage(&self) -> f32 {
        if self.origin.is_none() {
            return self.damage;
        }
        self.damage * distance_damage_multiplier(self.kind, self.distance_traveled())
    }

    /// Steer (homing only) and move one tick
    pub fn advance(&mut self, player_pos: Vec2, tick: u64) {
        if self.kind == ProjectileKind::EnemyHoming {
            let homing_ticks = secs_to_ticks(HOMING_DURATION_SECS) as u64;
            if tick.saturating_sub(self.spawn_tick) < homing_ticks {
                let desired = angle_between(self.pos, player_pos);
                let turn = normalize_degrees(desired - self.angle)
                    .clamp(-HOMING_MAX_TURN_DEG, HOMING_MAX_TURN_DEG);
                self.angle = normalize_degrees(self.angle + turn);
            }
        }
        self.pos += direction(self.angle) * self.speed;
    }
}

/// Damage multiplier for a distance-scaled projectile.
///
/// Basic: +0% at the muzzle ramping linearly to +200% at 800 units.
/// Special: +200% up to 50 units decaying linearly to +0% at 500 units.
pub fn distance_damage_multiplier(kind: ProjectileKind, distance: f32) -> f32 {
    let bonus = match kind {
        ProjectileKind::PlayerBasic => {
            DISTANCE_SCALING_MAX_BONUS * (distance / BASIC_SCALING_MAX_DISTANCE).clamp(0.0, 1.0)
        }
        ProjectileKind::PlayerSpecial => {
            let span = SPECIAL_SCALING_ZERO_DISTANCE - SPECIAL_SCALING_FULL_DISTANCE;
            let t = ((SPECIAL_SCALING_ZERO_DISTANCE - distance) / span).clamp(0.0, 1.0);
            DISTANCE_SCALING_MAX_BONUS * t
        }
        _ => 0.0,
    };
    1.0 + bonus
}

/// Object pool of projectiles
#[derive(Debug, Clone, Default)]
pub struct ProjectilePool {
    slots: Vec<Projectile>,
    free: Vec<usize>,
    active_count: usize,
}

impl ProjectilePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an inactive slot or grow the pool. Never fails.
    pub fn acquire(&mut self, spawn: ProjectileSpawn) -> ProjectileHandle {
        self.active_count += 1;
        if let Some(index) = self.free.pop() {
            self.slots[index].reset(&spawn);
            ProjectileHandle(index)
        } else {
            self.slots.push(Projectile::new(&spawn));
            ProjectileHandle(self.slots.len() - 1)
        }
    }

    /// Deactivate a projectile and return its slot to the free list
    pub fn release(&mut self, handle: ProjectileHandle) {
        if let Some(projectile) = self.slots.get_mut(handle.0) {
            if projectile.active {
                projectile.active = false;
                self.active_count -= 1;
                self.free.push(handle.0);
            }
        }
    }

    pub fn get(&self, handle: ProjectileHandle) -> Option<&Projectile> {
        self.slots.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: ProjectileHandle) -> Option<&mut Projectile> {
        self.slots.get_mut(handle.0)
    }

    /// Active projectiles in slot order
    pub fn active(&self) -> impl Iterator<Item = &Projectile> {
        self.slots.iter().filter(|p| p.active)
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Total slots ever allocated
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Advance every active projectile one tick, cull out-of-bounds ones and
    /// resolve collisions against enemies or the player.
    pub fn update_all(
        &mut self,
        enemies: &mut EnemyPool,
        player: &mut Player,
        arena: &Arena,
        tick: u64,
        feedback: &mut Feedback,
    ) {
        for index in 0..self.slots.len() {
            let projectile = &mut self.slots[index];
            if !projectile.active {
                continue;
            }
            projectile.advance(player.pos, tick);

            let spent = if !arena.contains(projectile.pos, PROJECTILE_CULL_MARGIN) {
                true
            } else {
                match projectile.alignment {
                    Alignment::Player => resolve_player_projectile(
                        projectile,
                        enemies.iter_active_mut(),
                        player,
                        tick,
                        feedback,
                    ),
                    Alignment::Enemy => resolve_enemy_projectile(projectile, player, feedback),
                }
            };
            if spent {
                self.release(ProjectileHandle(index));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::EnemyKind;
    use crate::sim::spawner::EnemyPool;
    use crate::tuning::Tuning;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn basic_shot(pos: Vec2, angle: f32) -> ProjectileSpawn {
        ProjectileSpawn {
            kind: ProjectileKind::PlayerBasic,
            pos,
            angle,
            speed: 10.0,
            damage: 10.0,
            pierce: 1,
            can_repierce: false,
            distance_scaling: false,
            radius: 5.0,
            tick: 0,
        }
    }

    fn scaled(kind: ProjectileKind, distance: f32) -> f32 {
        let mut spawn = basic_shot(Vec2::ZERO, 0.0);
        spawn.kind = kind;
        spawn.distance_scaling = true;
        let mut p = Projectile::new(&spawn);
        p.pos = Vec2::new(distance, 0.0);
        p.current_damage()
    }

    #[test]
    fn test_basic_distance_scaling() {
        assert!((scaled(ProjectileKind::PlayerBasic, 0.0) - 10.0).abs() < 1e-4);
        assert!((scaled(ProjectileKind::PlayerBasic, 400.0) - 20.0).abs() < 1e-4);
        assert!((scaled(ProjectileKind::PlayerBasic, 800.0) - 30.0).abs() < 1e-4);
        assert!((scaled(ProjectileKind::PlayerBasic, 5000.0) - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_special_distance_scaling() {
        assert!((scaled(ProjectileKind::PlayerSpecial, 0.0) - 30.0).abs() < 1e-4);
        assert!((scaled(ProjectileKind::PlayerSpecial, 50.0) - 30.0).abs() < 1e-4);
        assert!((scaled(ProjectileKind::PlayerSpecial, 275.0) - 20.0).abs() < 1e-4);
        assert!((scaled(ProjectileKind::PlayerSpecial, 500.0) - 10.0).abs() < 1e-4);
        assert!((scaled(ProjectileKind::PlayerSpecial, 900.0) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_unscaled_projectile_ignores_distance() {
        let mut p = Projectile::new(&basic_shot(Vec2::ZERO, 0.0));
        p.pos = Vec2::new(700.0, 0.0);
        assert_eq!(p.origin, None);
        assert_eq!(p.current_damage(), 10.0);
    }

    #[test]
    fn test_acquire_reuses_released_slots() {
        let mut pool = ProjectilePool::new();
        let a = pool.acquire(basic_shot(Vec2::ZERO, 0.0));
        let b = pool.acquire(basic_shot(Vec2::ZERO, 0.0));
        assert_eq!(pool.capacity(), 2);
        pool.release(a);
        assert_eq!(pool.active_count(), 1);
        // Double release is a no-op
        pool.release(a);
        assert_eq!(pool.active_count(), 1);

        let c = pool.acquire(basic_shot(Vec2::new(5.0, 5.0), 90.0));
        assert_eq!(c, a);
        assert_eq!(pool.capacity(), 2);
        let reused = pool.get(c).unwrap();
        assert!(reused.active);
        assert_eq!(reused.angle, 90.0);
        assert!(reused.hit_targets.is_empty());
        assert_ne!(b, c);
    }

    #[test]
    fn test_out_of_bounds_deactivates() {
        let tuning = Tuning::default();
        let arena = Arena::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut enemies = EnemyPool::new(&tuning, &mut rng, 0);
        let mut player = Player::new(&tuning, &arena);
        let mut feedback = Feedback::default();
        let mut pool = ProjectilePool::new();

        pool.acquire(basic_shot(Vec2::new(arena.width - 1.0, 100.0), 0.0));
        for tick in 1..=6 {
            pool.update_all(&mut enemies, &mut player, &arena, tick, &mut feedback);
        }
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_homing_turn_is_clamped() {
        let spawn = ProjectileSpawn::enemy(
            ProjectileKind::EnemyHoming,
            Vec2::ZERO,
            0.0,
            5.0,
            8.0,
            0,
        );
        let mut p = Projectile::new(&spawn);
        // Target straight below: desired bearing 90 degrees
        p.advance(Vec2::new(0.0, 1000.0), 1);
        assert!((p.angle - HOMING_MAX_TURN_DEG).abs() < 1e-4);
        p.advance(Vec2::new(0.0, 1000.0), 2);
        assert!((p.angle - 2.0 * HOMING_MAX_TURN_DEG).abs() < 1e-3);

        // After the homing window the bearing is frozen
        let frozen = p.angle;
        p.advance(Vec2::new(0.0, 1000.0), secs_to_ticks(HOMING_DURATION_SECS) as u64 + 1);
        assert_eq!(p.angle, frozen);
    }

    #[test]
    fn test_enemy_projectile_hits_player_once() {
        let tuning = Tuning::default();
        let arena = Arena::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut enemies = EnemyPool::new(&tuning, &mut rng, 0);
        let mut player = Player::new(&tuning, &arena);
        let mut feedback = Feedback::default();
        let mut pool = ProjectilePool::new();

        let start = player.pos - Vec2::new(30.0, 0.0);
        pool.acquire(ProjectileSpawn::enemy(
            ProjectileKind::SniperShot,
            start,
            0.0,
            10.0,
            12.0,
            0,
        ));
        pool.update_all(&mut enemies, &mut player, &arena, 1, &mut feedback);
        assert_eq!(player.health, 88.0);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_pierce_counts_distinct_targets() {
        let tuning = Tuning::default();
        let arena = Arena::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut enemies = EnemyPool::new(&tuning, &mut rng, 0);
        let mut player = Player::new(&tuning, &arena);
        player.pos = Vec2::new(100.0, 600.0);
        let mut feedback = Feedback::default();

        // Two tanks in a row, one on top of the bullet's path
        let first = enemies.spawn_at(EnemyKind::Tank, Vec2::new(400.0, 200.0), 1.0, &tuning, &mut rng);
        enemies.spawn_at(EnemyKind::Tank, Vec2::new(460.0, 200.0), 1.0, &tuning, &mut rng);

        let mut pool = ProjectilePool::new();
        let mut spawn = basic_shot(Vec2::new(395.0, 200.0), 0.0);
        spawn.speed = 1.0;
        spawn.pierce = 2;
        let handle = pool.acquire(spawn);

        // Overlaps the first tank for many ticks but only hits it once
        for tick in 1..=5 {
            pool.update_all(&mut enemies, &mut player, &arena, tick, &mut feedback);
        }
        let p = pool.get(handle).unwrap();
        assert!(p.active);
        assert_eq!(p.pierce, 1);
        assert_eq!(p.hit_targets, vec![enemies.get(first).unwrap().id]);
        assert_eq!(enemies.get(first).unwrap().health, 50.0);
    }

    #[test]
    fn test_repierce_hits_same_target_again() {
        let tuning = Tuning::default();
        let arena = Arena::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut enemies = EnemyPool::new(&tuning, &mut rng, 0);
        let mut player = Player::new(&tuning, &arena);
        player.pos = Vec2::new(100.0, 600.0);
        let mut feedback = Feedback::default();

        let tank = enemies.spawn_at(EnemyKind::Tank, Vec2::new(400.0, 200.0), 1.0, &tuning, &mut rng);
        let mut pool = ProjectilePool::new();
        let mut spawn = basic_shot(Vec2::new(395.0, 200.0), 0.0);
        spawn.speed = 1.0;
        spawn.pierce = 3;
        spawn.can_repierce = true;
        let handle = pool.acquire(spawn);

        for tick in 1..=3 {
            pool.update_all(&mut enemies, &mut player, &arena, tick, &mut feedback);
        }
        assert!(!pool.get(handle).unwrap().active);
        assert_eq!(enemies.get(tank).unwrap().health, 30.0);
    }

    proptest! {
        #[test]
        fn prop_distance_multiplier_bounded(distance in 0.0f32..5000.0) {
            for kind in [ProjectileKind::PlayerBasic, ProjectileKind::PlayerSpecial] {
                let m = distance_damage_multiplier(kind, distance);
                prop_assert!((1.0..=3.0).contains(&m));
            }
        }

        #[test]
        fn prop_pierce_strictly_decreases(
            xs in proptest::collection::vec(300.0f32..1100.0, 1..6),
            pierce in 1u32..5,
        ) {
            let tuning = Tuning::default();
            let arena = Arena::default();
            let mut rng = Pcg32::seed_from_u64(7);
            let mut enemies = EnemyPool::new(&tuning, &mut rng, 0);
            let mut player = Player::new(&tuning, &arena);
            player.pos = Vec2::new(100.0, 600.0);
            let mut feedback = Feedback::default();
            for &x in &xs {
                enemies.spawn_at(EnemyKind::Tank, Vec2::new(x, 200.0), 1.0, &tuning, &mut rng);
            }

            let mut pool = ProjectilePool::new();
            let mut spawn = basic_shot(Vec2::new(250.0, 200.0), 0.0);
            spawn.speed = 3.0;
            spawn.pierce = pierce;
            let handle = pool.acquire(spawn);

            let mut last_pierce = pierce;
            let mut last_hits = 0;
            for tick in 1..=600 {
                pool.update_all(&mut enemies, &mut player, &arena, tick, &mut feedback);
                let p = pool.get(handle).unwrap();
                prop_assert!(p.pierce <= last_pierce);
                // One pierce per new target, none for targets already struck
                let new_hits = p.hit_targets.len() - last_hits;
                prop_assert_eq!((last_pierce - p.pierce) as usize, new_hits);
                let in_bounds = arena.contains(p.pos, PROJECTILE_CULL_MARGIN);
                prop_assert_eq!(p.active, p.pierce > 0 && in_bounds);
                last_pierce = p.pierce;
                last_hits = p.hit_targets.len();
                if !p.active {
                    break;
                }
            }

            let p = pool.get(handle).unwrap();
            prop_assert!(!p.active);
            let mut ids = p.hit_targets.clone();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), p.hit_targets.len());
            prop_assert!(p.hit_targets.len() <= xs.len());
        }

        #[test]
        fn prop_basic_scaling_is_monotonic(a in 0.0f32..2000.0, b in 0.0f32..2000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let k = ProjectileKind::PlayerBasic;
            prop_assert!(distance_damage_multiplier(k, lo) <= distance_damage_multiplier(k, hi));
        }
    }
}
