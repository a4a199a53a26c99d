//! Fixed timestep simulation tick
//!
//! Core game loop that advances the session deterministically.

use glam::Vec2;

use super::behavior::EnemyContext;
use super::state::{GamePhase, SimulationState};
use crate::{angle_between, direction};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held movement axes, each in -1..=1
    pub move_axis: Vec2,
    /// Aim point in arena coordinates (keeps the last heading if None)
    pub aim: Option<Vec2>,
    pub fire_basic: bool,
    pub fire_special: bool,
    /// Pause toggle
    pub pause: bool,
    /// Upgrade picked on the level-up screen
    pub choose_upgrade: Option<String>,
    /// Start a new run with the same seed
    pub restart: bool,
}

/// Advance the session by one fixed timestep
pub fn tick(state: &mut SimulationState, input: &TickInput) {
    state.tick += 1;

    if input.restart {
        state.restart();
        log::info!("Run restarted (seed {})", state.seed);
        return;
    }

    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            _ => {}
        }
    }

    match state.phase {
        GamePhase::Paused | GamePhase::GameOver => return,
        GamePhase::LevelUp => {
            if let Some(name) = &input.choose_upgrade {
                if let Err(e) = state.choose_upgrade(name) {
                    log::warn!("Upgrade choice rejected: {}", e);
                }
            }
            return;
        }
        GamePhase::Playing => {}
    }

    state.elapsed_ticks += 1;
    let now = state.elapsed_ticks;
    state.player.current_tick = now;

    // Movement and aim
    state.player.move_by(input.move_axis, &state.arena);
    let aim = input
        .aim
        .unwrap_or_else(|| state.player.pos + direction(state.player.angle));
    if input.aim.is_some() {
        state.player.angle = angle_between(state.player.pos, aim);
    }

    // Firing
    let alive = state.enemies.alive_count();
    if input.fire_basic {
        state.player.shoot_regular(aim, &mut state.projectiles, alive);
    }
    if input.fire_special {
        state.player.shoot_special(aim, &mut state.projectiles, alive);
    }

    // Buffs, regen, passive XP
    state.player.update_timers(now);

    // Wave pacing
    state
        .wave
        .update(now, &mut state.enemies, &state.tuning, &mut state.rng);

    // Enemy behaviors, then removal of finished death animations
    let removed = {
        let mut ctx = EnemyContext {
            tick: now,
            arena: &state.arena,
            tuning: &state.tuning,
            player: &mut state.player,
            projectiles: &mut state.projectiles,
            rng: &mut state.rng,
            feedback: &mut state.feedback,
        };
        state.enemies.update(&mut ctx)
    };
    for pos in removed {
        state
            .pickups
            .roll_drop(pos, &state.tuning.pickups, &mut state.rng);
    }

    // Projectile flight and collision
    state.projectiles.update_all(
        &mut state.enemies,
        &mut state.player,
        &state.arena,
        now,
        &mut state.feedback,
    );

    state
        .pickups
        .update(&mut state.player, &state.tuning.pickups, &mut state.feedback);
    state.feedback.decay();

    if state.player.is_dead() {
        state.phase = GamePhase::GameOver;
        state.feedback.notify("Game over");
        log::info!(
            "Game over after {:.1}s: score {}, level {}",
            state.elapsed_secs(),
            state.player.score,
            state.player.level
        );
    } else if state.player.is_leveling_up() {
        state.offer_upgrades();
    }
}

/// Scripted input for demos and headless runs: aim at the nearest enemy,
/// strafe around it, fire everything and take the first offered upgrade.
pub fn autopilot(state: &SimulationState) -> TickInput {
    if state.phase == GamePhase::LevelUp {
        return TickInput {
            choose_upgrade: state.offered.first().map(|u| u.name.to_string()),
            ..Default::default()
        };
    }

    let player = state.player.pos;
    let nearest = state
        .enemies
        .active()
        .filter(|e| !e.dying)
        .min_by(|a, b| {
            a.pos
                .distance_squared(player)
                .partial_cmp(&b.pos.distance_squared(player))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let Some(target) = nearest else {
        // Drift back to the middle while the arena is empty
        let home = state.arena.center() - player;
        return TickInput {
            move_axis: if home.length() > 20.0 {
                home.normalize_or_zero()
            } else {
                Vec2::ZERO
            },
            ..Default::default()
        };
    };

    let offset = target.pos - player;
    let toward = offset.normalize_or_zero();
    // Flip strafe direction every few seconds so the path doesn't loop
    let side = if (state.elapsed_ticks / 180) % 2 == 0 {
        1.0
    } else {
        -1.0
    };
    let strafe = Vec2::new(-toward.y, toward.x) * side;
    let retreat = if offset.length() < 200.0 { -toward } else { Vec2::ZERO };

    // Grab a nearby heart if there is one
    let pickup = state
        .pickups
        .items
        .iter()
        .map(|p| p.pos - player)
        .find(|d| d.length() < 250.0)
        .map(|d| d.normalize_or_zero())
        .unwrap_or(Vec2::ZERO);

    TickInput {
        move_axis: (strafe + retreat + pickup).clamp_length_max(1.0),
        aim: Some(target.pos),
        fire_basic: true,
        fire_special: true,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::EnemyKind;
    use crate::tuning::Tuning;

    fn default_state(seed: u64) -> SimulationState {
        SimulationState::new(seed, Tuning::default())
    }

    #[test]
    fn test_tick_advances_clock() {
        let mut state = default_state(12345);
        let input = TickInput::default();
        for _ in 0..10 {
            tick(&mut state, &input);
        }
        assert_eq!(state.tick, 10);
        assert_eq!(state.elapsed_ticks, 10);
        assert_eq!(state.player.current_tick, 10);
    }

    #[test]
    fn test_tick_pause() {
        let mut state = default_state(12345);
        tick(&mut state, &TickInput::default());

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause);
        assert_eq!(state.phase, GamePhase::Paused);
        let frozen = state.elapsed_ticks;

        for _ in 0..5 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.elapsed_ticks, frozen);

        tick(&mut state, &pause);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.elapsed_ticks, frozen + 1);
    }

    #[test]
    fn test_first_spawn_on_first_tick() {
        let mut state = default_state(5);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.enemies.active_count(), 1);
        assert_eq!(state.wave.spawned, 1);
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut state = default_state(1);
        let aim = state.player.pos + Vec2::new(100.0, 0.0);
        let input = TickInput {
            aim: Some(aim),
            fire_basic: true,
            ..Default::default()
        };

        let mut fired = Vec::new();
        for _ in 0..60 {
            tick(&mut state, &input);
            if state.player.last_basic_tick == Some(state.elapsed_ticks) {
                fired.push(state.elapsed_ticks);
            }
        }
        // 0.25 s cooldown is 15 ticks
        assert_eq!(fired, vec![1, 16, 31, 46]);
        assert_eq!(state.player.angle, 0.0);
    }

    #[test]
    fn test_level_up_blocks_until_chosen() {
        let mut state = default_state(8);
        state.player.gain_experience(10.0);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::LevelUp);
        assert_eq!(state.offered.len(), 3);

        let frozen = state.elapsed_ticks;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.elapsed_ticks, frozen);

        // A bad choice is logged and ignored
        tick(
            &mut state,
            &TickInput {
                choose_upgrade: Some("Nonexistent".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(state.phase, GamePhase::LevelUp);

        let choice = state.offered[0].name.to_string();
        tick(
            &mut state,
            &TickInput {
                choose_upgrade: Some(choice.clone()),
                ..Default::default()
            },
        );
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.upgrade_level(&choice), 1);
    }

    #[test]
    fn test_death_ends_run() {
        let mut state = default_state(4);
        state.player.take_damage(1000.0);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);

        let frozen = state.elapsed_ticks;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.elapsed_ticks, frozen);
    }

    #[test]
    fn test_restart_resets_run() {
        let mut state = default_state(4);
        state.player.take_damage(1000.0);
        tick(&mut state, &TickInput::default());
        tick(
            &mut state,
            &TickInput {
                restart: true,
                ..Default::default()
            },
        );
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!state.player.is_dead());
        assert_eq!(state.elapsed_ticks, 0);
        assert_eq!(state.projectiles.active_count(), 0);
    }

    #[test]
    fn test_autopilot_aims_at_nearest() {
        let mut state = default_state(6);
        let tuning = state.tuning.clone();
        let near = state.player.pos + Vec2::new(300.0, 0.0);
        state
            .enemies
            .spawn_at(EnemyKind::Basic, near, 1.0, &tuning, &mut state.rng);
        state.enemies.spawn_at(
            EnemyKind::Tank,
            state.player.pos - Vec2::new(500.0, 0.0),
            1.0,
            &tuning,
            &mut state.rng,
        );
        let input = autopilot(&state);
        assert_eq!(input.aim, Some(near));
        assert!(input.fire_basic && input.fire_special);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = default_state(99999);
        let mut state2 = default_state(99999);

        for _ in 0..1200 {
            let input1 = autopilot(&state1);
            let input2 = autopilot(&state2);
            tick(&mut state1, &input1);
            tick(&mut state2, &input2);
        }

        assert_eq!(state1.player.pos, state2.player.pos);
        assert_eq!(state1.player.health, state2.player.health);
        assert_eq!(state1.player.score, state2.player.score);
        assert_eq!(state1.phase, state2.phase);
        let pos1: Vec<Vec2> = state1.enemies.active().map(|e| e.pos).collect();
        let pos2: Vec<Vec2> = state2.enemies.active().map(|e| e.pos).collect();
        assert_eq!(pos1, pos2);
        assert_eq!(
            state1.projectiles.active_count(),
            state2.projectiles.active_count()
        );
    }
}
