//! Per-variant enemy movement and firing
//!
//! Every counter here is a tick countdown. A counter at zero means "act
//! this tick", after which it reloads from the interval in `Tuning`.

use glam::Vec2;
use rand::Rng;

use super::SimRng;
use super::arena::Arena;
use super::enemy::{Behavior, ChargerState, Enemy, EnemyKind};
use super::events::{COLOR_PLAYER_DAMAGE, Feedback};
use super::player::Player;
use super::projectile::{ProjectileKind, ProjectilePool, ProjectileSpawn};
use crate::tuning::{ChargerTuning, SniperTuning, Tuning};
use crate::{angle_between, direction, secs_to_ticks};

/// Number of bullets in a basic enemy's radial burst
pub const RADIAL_BURST_COUNT: u32 = 8;

/// Everything an enemy may touch during its update
pub struct EnemyContext<'a> {
    pub tick: u64,
    pub arena: &'a Arena,
    pub tuning: &'a Tuning,
    pub player: &'a mut Player,
    pub projectiles: &'a mut ProjectilePool,
    pub rng: &'a mut SimRng,
    pub feedback: &'a mut Feedback,
}

/// Count a cooldown down. Returns true (and reloads) when it fires.
fn countdown(counter: &mut u32, reload: u32) -> bool {
    if *counter == 0 {
        *counter = reload;
        true
    } else {
        *counter -= 1;
        false
    }
}

pub fn move_enemy(enemy: &mut Enemy, ctx: &mut EnemyContext) {
    let half = enemy.size / 2.0;
    match &mut enemy.behavior {
        Behavior::Basic { .. } | Behavior::Tank { .. } => {
            enemy.pos = pursue(enemy.pos, ctx.player.pos, enemy.speed, half, ctx.arena);
        }
        Behavior::Sniper {
            strafe_angle,
            strafe_ticks,
            ..
        } => {
            let dir = sniper_direction(
                enemy.pos,
                ctx.player.pos,
                &ctx.tuning.sniper,
                strafe_angle,
                strafe_ticks,
                ctx.rng,
            );
            enemy.pos = slide_move(enemy.pos, dir, enemy.speed, half, ctx.arena);
        }
        Behavior::Charger(state) => {
            enemy.pos = steer_charger(
                state,
                enemy.pos,
                ctx.player.pos,
                enemy.speed,
                half,
                &ctx.tuning.charger,
                ctx.arena,
            );
        }
    }

    if enemy.kind == EnemyKind::Charger {
        charger_contact(enemy, ctx);
    }
}

pub fn shoot(enemy: &mut Enemy, ctx: &mut EnemyContext) {
    let pos = enemy.pos;
    let bearing = angle_between(pos, ctx.player.pos);
    let tick = ctx.tick;
    let projectiles = &mut *ctx.projectiles;

    match &mut enemy.behavior {
        Behavior::Basic {
            homing_cooldown,
            radial_cooldown,
        } => {
            let t = &ctx.tuning.basic;
            if countdown(homing_cooldown, secs_to_ticks(t.homing_interval_secs)) {
                projectiles.acquire(ProjectileSpawn::enemy(
                    ProjectileKind::EnemyHoming,
                    pos,
                    bearing,
                    t.homing_speed,
                    t.homing_damage,
                    tick,
                ));
            }
            if countdown(radial_cooldown, secs_to_ticks(t.radial_interval_secs)) {
                let step = 360.0 / RADIAL_BURST_COUNT as f32;
                for i in 0..RADIAL_BURST_COUNT {
                    projectiles.acquire(ProjectileSpawn::enemy(
                        ProjectileKind::EnemyAoe,
                        pos,
                        i as f32 * step,
                        t.radial_speed,
                        t.radial_damage,
                        tick,
                    ));
                }
            }
        }
        Behavior::Tank { shotgun_cooldown } => {
            let t = &ctx.tuning.tank;
            if countdown(shotgun_cooldown, secs_to_ticks(t.shotgun_interval_secs)) {
                for _ in 0..t.pellets {
                    let spread = ctx.rng.random_range(-t.spread_deg.abs()..=t.spread_deg.abs());
                    let speed = ctx
                        .rng
                        .random_range(t.pellet_speed_min..=t.pellet_speed_max.max(t.pellet_speed_min));
                    projectiles.acquire(ProjectileSpawn::enemy(
                        ProjectileKind::EnemyShotgunPellet,
                        pos,
                        bearing + spread,
                        speed,
                        t.pellet_damage,
                        tick,
                    ));
                }
            }
        }
        Behavior::Sniper {
            volley_cooldown,
            shots_remaining,
            shot_delay,
            ..
        } => {
            let t = &ctx.tuning.sniper;
            if *shots_remaining == 0 {
                if *volley_cooldown > 0 {
                    *volley_cooldown -= 1;
                    return;
                }
                *volley_cooldown = secs_to_ticks(t.volley_interval_secs);
                *shots_remaining = t.volley_shots;
                *shot_delay = 0;
            }
            if *shot_delay > 0 {
                *shot_delay -= 1;
                return;
            }
            let spread = ctx.rng.random_range(-t.spread_deg.abs()..=t.spread_deg.abs());
            projectiles.acquire(ProjectileSpawn::enemy(
                ProjectileKind::SniperShot,
                pos,
                bearing + spread,
                t.shot_speed,
                t.shot_damage,
                tick,
            ));
            *shots_remaining = shots_remaining.saturating_sub(1);
            *shot_delay = secs_to_ticks(t.shot_delay_secs);
        }
        // Chargers deal damage by contact only
        Behavior::Charger(_) => {}
    }
}

/// Straight-line pursuit, halting once within one step of the target
fn pursue(pos: Vec2, target: Vec2, speed: f32, half: f32, arena: &Arena) -> Vec2 {
    let offset = target - pos;
    if offset.length() <= speed {
        return pos;
    }
    arena.clamp(pos + offset.normalize_or_zero() * speed, half)
}

fn sniper_direction(
    pos: Vec2,
    target: Vec2,
    t: &SniperTuning,
    strafe_angle: &mut f32,
    strafe_ticks: &mut u32,
    rng: &mut SimRng,
) -> Vec2 {
    let offset = target - pos;
    let distance = offset.length();
    let toward = offset.normalize_or_zero();

    if distance < t.keep_distance {
        return -toward;
    }
    if distance > t.approach_distance {
        return toward;
    }
    if *strafe_ticks == 0 {
        *strafe_angle = rng.random_range(0.0..360.0);
        *strafe_ticks = secs_to_ticks(t.strafe_secs);
    } else {
        *strafe_ticks -= 1;
    }
    // Inside the band we are at or beyond keep distance, so the bias pulls inward
    (direction(*strafe_angle) + toward * t.strafe_bias).normalize_or_zero()
}

/// Move along `dir`, sliding along a wall that blocks one axis and
/// retreating diagonally toward the arena center when cornered.
fn slide_move(pos: Vec2, dir: Vec2, speed: f32, half: f32, arena: &Arena) -> Vec2 {
    if dir == Vec2::ZERO {
        return pos;
    }
    let wanted = pos + dir * speed;
    let clamped = arena.clamp(wanted, half);
    let blocked_x = dir.x != 0.0 && (clamped.x - pos.x).abs() < f32::EPSILON;
    let blocked_y = dir.y != 0.0 && (clamped.y - pos.y).abs() < f32::EPSILON;

    let redirected = match (blocked_x, blocked_y) {
        (false, false) => return clamped,
        (true, false) => Vec2::new(0.0, axis_sign(dir.y, arena.center().y - pos.y)),
        (false, true) => Vec2::new(axis_sign(dir.x, arena.center().x - pos.x), 0.0),
        (true, true) => {
            let to_center = arena.center() - pos;
            Vec2::new(to_center.x.signum(), to_center.y.signum()).normalize_or_zero()
        }
    };
    arena.clamp(pos + redirected * speed, half)
}

/// Sign of `component`, falling back to the sign of `fallback` when it is zero
fn axis_sign(component: f32, fallback: f32) -> f32 {
    if component != 0.0 {
        component.signum()
    } else {
        fallback.signum()
    }
}

fn steer_charger(
    state: &mut ChargerState,
    pos: Vec2,
    target: Vec2,
    max_speed: f32,
    half: f32,
    t: &ChargerTuning,
    arena: &Arena,
) -> Vec2 {
    if state.cooldown > 0 {
        state.cooldown -= 1;
        return pos;
    }

    let offset = target - pos;
    if !state.charging && offset.length() <= t.charge_distance {
        state.charging = true;
        state.charge_dir = offset.normalize_or_zero();
        state.charge_traveled = 0.0;
        log::trace!("Charger starting charge");
    }

    if state.charging {
        state.velocity = state.charge_dir * t.charge_speed;
        let next = arena.clamp(pos + state.velocity, half);
        let moved = next.distance(pos);
        state.charge_traveled += moved;
        // A charge pinned against a wall ends early
        let pinned = moved < f32::EPSILON;
        if pinned || t.charge_distance_max - state.charge_traveled < t.charge_stop_distance {
            state.charging = false;
            state.velocity *= t.charge_end_damping;
            state.cooldown = secs_to_ticks(t.charge_cooldown_secs);
        }
        return next;
    }

    let desired = offset.normalize_or_zero() * max_speed;
    let steer = (desired - state.velocity).clamp_length_max(t.acceleration);
    state.velocity = (state.velocity + steer).clamp_length_max(max_speed);
    arena.clamp(pos + state.velocity, half)
}

/// Explode on the player: heavy damage to them, lethal damage to self
fn charger_contact(enemy: &mut Enemy, ctx: &mut EnemyContext) {
    let reach = (enemy.size + ctx.player.size) / 2.0;
    if ctx.player.is_dead() || enemy.pos.distance(ctx.player.pos) >= reach {
        return;
    }
    let t = &ctx.tuning.charger;
    let amount = ctx.player.max_health * t.contact_health_fraction + t.contact_flat_damage;
    let dealt = ctx.player.take_damage(amount);
    ctx.feedback
        .floating_number(dealt, ctx.player.pos, COLOR_PLAYER_DAMAGE);

    let own_health = enemy.health;
    enemy.apply_damage(own_health, ctx.tick, ctx.player, ctx.feedback);
    if let Behavior::Charger(state) = &mut enemy.behavior {
        state.velocity = Vec2::ZERO;
        state.charging = false;
    }
}
