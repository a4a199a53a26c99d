//! Arena bounds and boundary helpers

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::clamp_to_bounds;
use crate::tuning::ArenaTuning;

/// The rectangular playfield. Origin top-left, +y down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    pub hud_height: f32,
    pub margin: f32,
}

impl Arena {
    pub fn new(tuning: &ArenaTuning) -> Self {
        Self {
            width: tuning.width,
            height: tuning.height,
            hud_height: tuning.hud_height,
            margin: tuning.margin,
        }
    }

    /// Smallest legal center for an entity of the given half-extent
    pub fn play_min(&self, half_size: f32) -> Vec2 {
        Vec2::splat(self.margin + half_size)
    }

    /// Largest legal center for an entity of the given half-extent (HUD excluded)
    pub fn play_max(&self, half_size: f32) -> Vec2 {
        Vec2::new(
            self.width - self.margin - half_size,
            self.height - self.hud_height - self.margin - half_size,
        )
    }

    /// Clamp an entity center into the playable area
    pub fn clamp(&self, pos: Vec2, half_size: f32) -> Vec2 {
        let min = self.play_min(half_size);
        // Entities larger than the arena pin to its min corner
        let max = self.play_max(half_size).max(min);
        clamp_to_bounds(pos, min, max)
    }

    /// True if the point lies inside the visible screen grown by `margin`
    pub fn contains(&self, pos: Vec2, margin: f32) -> bool {
        pos.x >= -margin
            && pos.x <= self.width + margin
            && pos.y >= -margin
            && pos.y <= self.height + margin
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, (self.height - self.hud_height) / 2.0)
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(&ArenaTuning::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_reserves_hud() {
        let arena = Arena::default();
        let p = arena.clamp(Vec2::new(2000.0, 2000.0), 15.0);
        assert_eq!(p.x, 1280.0 - 10.0 - 15.0);
        assert_eq!(p.y, 720.0 - 60.0 - 10.0 - 15.0);
    }

    #[test]
    fn test_contains_margin() {
        let arena = Arena::default();
        assert!(arena.contains(Vec2::new(-20.0, 100.0), 50.0));
        assert!(!arena.contains(Vec2::new(-60.0, 100.0), 50.0));
    }
}
