//! Enemy pool and wave pacing
//!
//! The pool is created with a batch of inactive enemies of weighted-random
//! kinds. Spawning draws a kind by weight and reuses an inactive slot of
//! that kind when one exists, otherwise any inactive slot (each equally
//! likely), otherwise grows.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::SimRng;
use super::behavior::EnemyContext;
use super::enemy::{Enemy, EnemyKind};
use crate::{secs_to_ticks, ticks_to_secs};
use crate::tuning::{SpawnWeights, Tuning, WaveTuning};

/// Stable index of a pool slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyHandle(pub usize);

/// Draw a kind proportionally to the configured weights
pub fn weighted_kind(weights: &SpawnWeights, rng: &mut SimRng) -> EnemyKind {
    let table = [
        (EnemyKind::Basic, weights.basic),
        (EnemyKind::Tank, weights.tank),
        (EnemyKind::Sniper, weights.sniper),
        (EnemyKind::Charger, weights.charger),
    ];
    let total: u32 = table.iter().map(|(_, w)| w).sum();
    if total == 0 {
        return EnemyKind::Basic;
    }
    let mut roll = rng.random_range(0..total);
    for (kind, weight) in table {
        if roll < weight {
            return kind;
        }
        roll -= weight;
    }
    EnemyKind::Basic
}

/// Random point just outside one of the four visible edges
pub fn edge_spawn_point(width: f32, height: f32, margin: f32, rng: &mut SimRng) -> Vec2 {
    match rng.random_range(0..4) {
        0 => Vec2::new(rng.random_range(0.0..width), -margin),
        1 => Vec2::new(width + margin, rng.random_range(0.0..height)),
        2 => Vec2::new(rng.random_range(0.0..width), height + margin),
        _ => Vec2::new(-margin, rng.random_range(0.0..height)),
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnemyPool {
    slots: Vec<Enemy>,
    /// Inactive slot indices per kind
    free: [Vec<usize>; 4],
    next_id: u32,
    active_count: usize,
}

impl EnemyPool {
    /// Create a pool holding `prepopulate` inactive enemies
    pub fn new(tuning: &Tuning, rng: &mut SimRng, prepopulate: usize) -> Self {
        let mut pool = Self {
            next_id: 1,
            ..Self::default()
        };
        for _ in 0..prepopulate {
            let kind = weighted_kind(&tuning.waves.weights, rng);
            let id = pool.allocate_id();
            let mut enemy = Enemy::new(id, kind, Vec2::ZERO, 1.0, tuning, rng);
            enemy.active = false;
            pool.free[kind.index()].push(pool.slots.len());
            pool.slots.push(enemy);
        }
        pool
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Spawn a weighted-random enemy off-screen
    pub fn spawn(&mut self, scaling: f32, tuning: &Tuning, rng: &mut SimRng) -> EnemyHandle {
        let kind = weighted_kind(&tuning.waves.weights, rng);
        let pos = edge_spawn_point(
            tuning.arena.width,
            tuning.arena.height,
            tuning.waves.spawn_margin,
            rng,
        );
        self.spawn_as(kind, pos, scaling, tuning, rng, true)
    }

    /// Spawn exactly `kind` at `pos`
    pub fn spawn_at(
        &mut self,
        kind: EnemyKind,
        pos: Vec2,
        scaling: f32,
        tuning: &Tuning,
        rng: &mut SimRng,
    ) -> EnemyHandle {
        self.spawn_as(kind, pos, scaling, tuning, rng, false)
    }

    fn spawn_as(
        &mut self,
        kind: EnemyKind,
        pos: Vec2,
        scaling: f32,
        tuning: &Tuning,
        rng: &mut SimRng,
        any_kind: bool,
    ) -> EnemyHandle {
        let id = self.allocate_id();
        self.active_count += 1;

        let reused = self.free[kind.index()].pop().or_else(|| {
            if !any_kind {
                return None;
            }
            self.take_any_free(rng)
        });

        match reused {
            Some(index) => {
                self.slots[index].reset(id, pos, scaling, tuning, rng);
                log::debug!(
                    "Recycled {:?} #{} (scaling {:.2})",
                    self.slots[index].kind,
                    id,
                    scaling
                );
                EnemyHandle(index)
            }
            None => {
                self.slots
                    .push(Enemy::new(id, kind, pos, scaling, tuning, rng));
                log::debug!("Spawned {:?} #{} (scaling {:.2})", kind, id, scaling);
                EnemyHandle(self.slots.len() - 1)
            }
        }
    }

    /// Pop a uniformly random inactive slot of any kind
    fn take_any_free(&mut self, rng: &mut SimRng) -> Option<usize> {
        let total = self.inactive_count();
        if total == 0 {
            return None;
        }
        let mut pick = rng.random_range(0..total);
        for list in self.free.iter_mut() {
            if pick < list.len() {
                return Some(list.swap_remove(pick));
            }
            pick -= list.len();
        }
        None
    }

    /// Advance every active enemy, then remove those whose death animation
    /// finished. Returns the positions of removed enemies.
    pub fn update(&mut self, ctx: &mut EnemyContext) -> Vec<Vec2> {
        for enemy in self.slots.iter_mut().filter(|e| e.active) {
            enemy.update(ctx);
        }

        let mut removed = Vec::new();
        for (index, enemy) in self.slots.iter_mut().enumerate() {
            if enemy.active && enemy.death_finished(ctx.tick) {
                enemy.active = false;
                self.active_count -= 1;
                self.free[enemy.kind.index()].push(index);
                removed.push(enemy.pos);
            }
        }
        removed
    }

    pub fn get(&self, handle: EnemyHandle) -> Option<&Enemy> {
        self.slots.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: EnemyHandle) -> Option<&mut Enemy> {
        self.slots.get_mut(handle.0)
    }

    /// Active enemies (dying included) in slot order
    pub fn active(&self) -> impl Iterator<Item = &Enemy> {
        self.slots.iter().filter(|e| e.active)
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = &mut Enemy> {
        self.slots.iter_mut().filter(|e| e.active)
    }

    /// Active enemies, dying ones included
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Active enemies that are not dying
    pub fn alive_count(&self) -> usize {
        self.active().filter(|e| !e.dying).count()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn inactive_count(&self) -> usize {
        self.free.iter().map(Vec::len).sum()
    }
}

/// Time-driven difficulty and spawn cadence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveDirector {
    /// Tick the next spawn is due on
    pub next_spawn_tick: u64,
    pub spawned: u64,
}

impl WaveDirector {
    pub fn new() -> Self {
        Self::default()
    }

    /// `base ^ (elapsed / doubling_time)`
    pub fn enemy_scaling(waves: &WaveTuning, elapsed_secs: f32) -> f32 {
        if waves.enemy_stat_doubling_time <= 0.0 {
            return 1.0;
        }
        waves
            .enemy_stat_base
            .powf(elapsed_secs / waves.enemy_stat_doubling_time)
    }

    /// Seconds between spawns, halving over time down to a floor
    pub fn spawn_interval(waves: &WaveTuning, elapsed_secs: f32) -> f32 {
        let decayed = if waves.spawn_interval_halving_time > 0.0 {
            waves.spawn_interval_initial_secs
                / 2f32.powf(elapsed_secs / waves.spawn_interval_halving_time)
        } else {
            waves.spawn_interval_initial_secs
        };
        decayed.max(waves.spawn_interval_min_secs)
    }

    /// Spawn one enemy when due. Returns the handle spawned, if any.
    pub fn update(
        &mut self,
        elapsed_ticks: u64,
        enemies: &mut EnemyPool,
        tuning: &Tuning,
        rng: &mut SimRng,
    ) -> Option<EnemyHandle> {
        if elapsed_ticks < self.next_spawn_tick {
            return None;
        }
        let elapsed = ticks_to_secs(elapsed_ticks);
        let scaling = Self::enemy_scaling(&tuning.waves, elapsed);
        let handle = enemies.spawn(scaling, tuning, rng);

        let interval = Self::spawn_interval(&tuning.waves, elapsed);
        self.next_spawn_tick = elapsed_ticks + secs_to_ticks(interval).max(1) as u64;
        self.spawned += 1;
        Some(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::arena::Arena;
    use crate::sim::events::Feedback;
    use crate::sim::player::Player;
    use crate::sim::projectile::ProjectilePool;
    use rand::SeedableRng;

    #[test]
    fn test_prepopulated_pool_is_inactive() {
        let tuning = Tuning::default();
        let mut rng = SimRng::seed_from_u64(1);
        let pool = EnemyPool::new(&tuning, &mut rng, 20);
        assert_eq!(pool.capacity(), 20);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.inactive_count(), 20);
        assert_eq!(pool.active().count(), 0);
    }

    #[test]
    fn test_spawn_reuses_before_growing() {
        let tuning = Tuning::default();
        let mut rng = SimRng::seed_from_u64(2);
        let mut pool = EnemyPool::new(&tuning, &mut rng, 3);
        for _ in 0..3 {
            pool.spawn(1.0, &tuning, &mut rng);
        }
        assert_eq!(pool.capacity(), 3);
        assert_eq!(pool.active_count(), 3);
        pool.spawn(1.0, &tuning, &mut rng);
        assert_eq!(pool.capacity(), 4);
    }

    #[test]
    fn test_ids_are_unique_across_reuse() {
        let tuning = Tuning::default();
        let mut rng = SimRng::seed_from_u64(3);
        let mut pool = EnemyPool::new(&tuning, &mut rng, 1);
        let before: Vec<u32> = pool.slots.iter().map(|e| e.id).collect();
        let h = pool.spawn(1.0, &tuning, &mut rng);
        assert!(!before.contains(&pool.get(h).unwrap().id));
    }

    /// Deactivate every enemy and return it to its kind's free list
    fn retire_all(pool: &mut EnemyPool) {
        for (index, enemy) in pool.slots.iter_mut().enumerate() {
            if enemy.active {
                enemy.active = false;
                pool.active_count -= 1;
                pool.free[enemy.kind.index()].push(index);
            }
        }
    }

    #[test]
    fn test_fallback_reuse_is_uniform_per_slot() {
        let mut tuning = Tuning::default();
        tuning.waves.weights = SpawnWeights {
            basic: 1,
            tank: 0,
            sniper: 0,
            charger: 0,
        };
        let mut rng = SimRng::seed_from_u64(8);
        let mut template = EnemyPool::new(&tuning, &mut rng, 0);
        template.spawn_at(EnemyKind::Tank, Vec2::ZERO, 1.0, &tuning, &mut rng);
        for _ in 0..9 {
            template.spawn_at(EnemyKind::Sniper, Vec2::ZERO, 1.0, &tuning, &mut rng);
        }
        retire_all(&mut template);
        assert_eq!(template.inactive_count(), 10);

        let trials = 2000;
        let mut snipers = 0;
        for _ in 0..trials {
            let mut pool = template.clone();
            let h = pool.spawn(1.0, &tuning, &mut rng);
            assert_eq!(pool.capacity(), 10);
            if pool.get(h).unwrap().kind == EnemyKind::Sniper {
                snipers += 1;
            }
        }
        // Nine of the ten free slots hold snipers
        let share = snipers as f32 / trials as f32;
        assert!((share - 0.9).abs() < 0.04, "sniper share {share}");
    }

    #[test]
    fn test_spawn_point_is_off_screen() {
        let mut rng = SimRng::seed_from_u64(4);
        for _ in 0..200 {
            let p = edge_spawn_point(1280.0, 720.0, 40.0, &mut rng);
            let outside = p.x < 0.0 || p.x > 1280.0 || p.y < 0.0 || p.y > 720.0;
            assert!(outside, "{p:?} is on screen");
        }
    }

    #[test]
    fn test_weighted_kind_respects_zero_weights() {
        let mut rng = SimRng::seed_from_u64(5);
        let weights = SpawnWeights {
            basic: 0,
            tank: 0,
            sniper: 1,
            charger: 0,
        };
        for _ in 0..50 {
            assert_eq!(weighted_kind(&weights, &mut rng), EnemyKind::Sniper);
        }
    }

    #[test]
    fn test_scaling_after_one_doubling_period() {
        let waves = WaveTuning::default();
        let s = WaveDirector::enemy_scaling(&waves, waves.enemy_stat_doubling_time);
        assert!((s - waves.enemy_stat_base).abs() < 1e-6);
        assert_eq!(WaveDirector::enemy_scaling(&waves, 0.0), 1.0);
    }

    #[test]
    fn test_spawn_interval_has_floor() {
        let waves = WaveTuning::default();
        assert!((WaveDirector::spawn_interval(&waves, 0.0) - 2.0).abs() < 1e-6);
        assert!((WaveDirector::spawn_interval(&waves, 180.0) - 1.0).abs() < 1e-5);
        assert_eq!(WaveDirector::spawn_interval(&waves, 10_000.0), 0.35);
    }

    #[test]
    fn test_dead_enemy_leaves_after_animation() {
        let tuning = Tuning::default();
        let arena = Arena::default();
        let mut rng = SimRng::seed_from_u64(6);
        let mut pool = EnemyPool::new(&tuning, &mut rng, 0);
        let mut player = Player::new(&tuning, &arena);
        let mut projectiles = ProjectilePool::new();
        let mut feedback = Feedback::default();

        let h = pool.spawn_at(EnemyKind::Tank, Vec2::new(100.0, 100.0), 1.0, &tuning, &mut rng);
        if let Some(e) = pool.get_mut(h) {
            e.apply_damage(999.0, 0, &mut player, &mut feedback);
        }

        let mut removed_at = None;
        for tick in 1..=40 {
            let mut ctx = EnemyContext {
                tick,
                arena: &arena,
                tuning: &tuning,
                player: &mut player,
                projectiles: &mut projectiles,
                rng: &mut rng,
                feedback: &mut feedback,
            };
            if !pool.update(&mut ctx).is_empty() {
                removed_at = Some(tick);
                break;
            }
        }
        assert_eq!(removed_at, Some(Enemy::death_animation_ticks() + 1));
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.inactive_count(), 1);
    }
}
