//! Heart pickups dropped by fallen enemies

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::SimRng;
use super::collision::aabb_overlap;
use super::events::{COLOR_HEAL, Feedback};
use super::player::{HEART_BUFF, Player};
use crate::secs_to_ticks;
use crate::tuning::PickupTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    /// Heals and grants a stacking damage buff
    Heart,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    pub pos: Vec2,
    pub ttl_ticks: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pickups {
    /// Sorted by id
    pub items: Vec<Pickup>,
    next_id: u32,
}

impl Pickups {
    /// Roll for a drop at a removed enemy's position
    pub fn roll_drop(&mut self, pos: Vec2, tuning: &PickupTuning, rng: &mut SimRng) -> bool {
        if rng.random::<f32>() >= tuning.heart_drop_chance {
            return false;
        }
        self.next_id += 1;
        self.items.push(Pickup {
            id: self.next_id,
            kind: PickupKind::Heart,
            pos,
            ttl_ticks: secs_to_ticks(tuning.lifetime_secs),
        });
        true
    }

    /// Age pickups and apply any the player touches
    pub fn update(&mut self, player: &mut Player, tuning: &PickupTuning, feedback: &mut Feedback) {
        let reach = tuning.size / 2.0;
        self.items.retain_mut(|pickup| {
            if !player.is_dead() && aabb_overlap(pickup.pos, reach, player.pos, player.size / 2.0) {
                match pickup.kind {
                    PickupKind::Heart => {
                        let healed = player.heal(player.max_health * tuning.heart_heal_percent);
                        if healed > 0.0 {
                            feedback.floating_number(healed, player.pos, COLOR_HEAL);
                        }
                        player.add_buff(HEART_BUFF, secs_to_ticks(tuning.heart_buff_secs) as u64);
                        log::debug!("Heart collected ({} stacks)", player.buff_stacks(HEART_BUFF));
                    }
                }
                return false;
            }
            pickup.ttl_ticks = pickup.ttl_ticks.saturating_sub(1);
            pickup.ttl_ticks > 0
        });
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
