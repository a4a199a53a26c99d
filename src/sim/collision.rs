//! Collision detection and hit resolution
//!
//! Everything in the arena collides as an axis-aligned box: projectiles by
//! radius, enemies and the player by size.

use glam::Vec2;

use super::enemy::Enemy;
use super::events::{COLOR_HEAL, COLOR_PLAYER_DAMAGE, Feedback};
use super::player::Player;
use super::projectile::Projectile;

/// Overlap test between two boxes given by center and half-extent
#[inline]
pub fn aabb_overlap(a: Vec2, a_half: f32, b: Vec2, b_half: f32) -> bool {
    let reach = a_half + b_half;
    (a.x - b.x).abs() < reach && (a.y - b.y).abs() < reach
}

#[inline]
pub fn projectile_hits_enemy(projectile: &Projectile, enemy: &Enemy) -> bool {
    aabb_overlap(projectile.pos, projectile.radius, enemy.pos, enemy.size / 2.0)
}

#[inline]
pub fn projectile_hits_player(projectile: &Projectile, player: &Player) -> bool {
    aabb_overlap(projectile.pos, projectile.radius, player.pos, player.size / 2.0)
}

/// Resolve a player-aligned projectile against every live enemy.
///
/// Returns true when the projectile has exhausted its pierce.
pub fn resolve_player_projectile<'a>(
    projectile: &mut Projectile,
    enemies: impl Iterator<Item = &'a mut Enemy>,
    player: &mut Player,
    tick: u64,
    feedback: &mut Feedback,
) -> bool {
    for enemy in enemies {
        if enemy.dying || !projectile_hits_enemy(projectile, enemy) {
            continue;
        }
        let already_hit = projectile.hit_targets.contains(&enemy.id);
        if already_hit && !projectile.can_repierce {
            continue;
        }

        projectile.pierce = projectile.pierce.saturating_sub(1);
        let damage = projectile.current_damage();
        enemy.apply_damage(damage, tick, player, feedback);

        if player.lifesteal > 0.0 {
            let healed = player.heal(damage * player.lifesteal);
            if healed > 0.0 {
                feedback.floating_number(healed, player.pos, COLOR_HEAL);
            }
        }
        if !already_hit {
            projectile.hit_targets.push(enemy.id);
        }
        if projectile.pierce == 0 {
            return true;
        }
    }
    false
}

/// Resolve an enemy-aligned projectile against the player.
///
/// Returns true on a hit; enemy projectiles are single use.
pub fn resolve_enemy_projectile(
    projectile: &Projectile,
    player: &mut Player,
    feedback: &mut Feedback,
) -> bool {
    if player.is_dead() || !projectile_hits_player(projectile, player) {
        return false;
    }
    let dealt = player.take_damage(projectile.damage);
    feedback.floating_number(dealt, player.pos, COLOR_PLAYER_DAMAGE);
    true
}
