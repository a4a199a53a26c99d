//! Read-only view of a tick for renderers and HUDs

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::EnemyKind;
use super::events::{FloatingText, Notification};
use super::pickup::PickupKind;
use super::player::Weapon;
use super::projectile::ProjectileKind;
use super::state::{GamePhase, SimulationState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub angle: f32,
    pub health: f32,
    pub max_health: f32,
    /// 0..1, 1 when ready
    pub basic_cooldown: f32,
    pub special_cooldown: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: f32,
    pub health: f32,
    pub max_health: f32,
    pub dying_progress: f32,
    pub visual_scale: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub kind: ProjectileKind,
    pub pos: Vec2,
    pub angle: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupView {
    pub kind: PickupKind,
    pub pos: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub pickups: Vec<PickupView>,
    pub floating: Vec<FloatingText>,
    pub notifications: Vec<Notification>,
    pub level: u32,
    /// Fraction of the way to the next level
    pub xp_progress: f32,
    pub score: u64,
    pub elapsed_secs: f32,
    pub offered: Vec<String>,
}

impl Snapshot {
    pub fn capture(state: &SimulationState) -> Self {
        let now = state.elapsed_ticks;
        let player = &state.player;
        let xp_progress = if player.experience_to_next_level > 0.0 {
            (player.experience / player.experience_to_next_level).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            phase: state.phase,
            player: PlayerView {
                pos: player.pos,
                angle: player.angle,
                health: player.health,
                max_health: player.max_health,
                basic_cooldown: player.cooldown_progress(Weapon::Basic),
                special_cooldown: player.cooldown_progress(Weapon::Special),
            },
            enemies: state
                .enemies
                .active()
                .map(|e| EnemyView {
                    id: e.id,
                    kind: e.kind,
                    pos: e.pos,
                    size: e.size,
                    health: e.health,
                    max_health: e.max_health,
                    dying_progress: e.dying_progress(now),
                    visual_scale: e.visual_scale(now),
                })
                .collect(),
            projectiles: state
                .projectiles
                .active()
                .map(|p| ProjectileView {
                    kind: p.kind,
                    pos: p.pos,
                    angle: p.angle,
                    radius: p.radius,
                })
                .collect(),
            pickups: state
                .pickups
                .items
                .iter()
                .map(|p| PickupView {
                    kind: p.kind,
                    pos: p.pos,
                })
                .collect(),
            floating: state.feedback.floating.clone(),
            notifications: state.feedback.notifications.iter().cloned().collect(),
            level: player.level,
            xp_progress,
            score: player.score,
            elapsed_secs: state.elapsed_secs(),
            offered: state.offered.iter().map(|u| u.name.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    #[test]
    fn test_capture_fresh_state() {
        let state = SimulationState::new(9, Tuning::default());
        let snap = Snapshot::capture(&state);
        assert_eq!(snap.phase, GamePhase::Playing);
        assert!(snap.enemies.is_empty());
        assert_eq!(snap.player.basic_cooldown, 1.0);
        assert_eq!(snap.player.health, snap.player.max_health);
        assert_eq!(snap.xp_progress, 0.0);
    }

    #[test]
    fn test_capture_serializes() {
        let mut state = SimulationState::new(9, Tuning::default());
        let tuning = state.tuning.clone();
        state
            .enemies
            .spawn_at(EnemyKind::Sniper, Vec2::new(50.0, 50.0), 1.0, &tuning, &mut state.rng);
        let snap = Snapshot::capture(&state);
        assert_eq!(snap.enemies.len(), 1);
        assert_eq!(snap.enemies[0].visual_scale, 1.0);
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("Sniper"));
    }
}
