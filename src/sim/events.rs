//! Presentation feedback produced by the simulation
//!
//! Floating numbers and notifications are not gameplay-affecting; the
//! renderer reads them from the snapshot each tick.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::secs_to_ticks;

/// Damage dealt to an enemy
pub const COLOR_DAMAGE: u32 = 0xFFFFFF;
/// Damage taken by the player
pub const COLOR_PLAYER_DAMAGE: u32 = 0xFF4040;
pub const COLOR_EXPERIENCE: u32 = 0x40C0FF;
pub const COLOR_HEAL: u32 = 0x40FF60;

/// Floating numbers stay on screen for this long
pub const FLOATING_TEXT_SECS: f32 = 0.75;
/// Notifications stay on screen for this long
pub const NOTIFICATION_SECS: f32 = 3.0;
/// Oldest notifications are dropped past this count
pub const MAX_NOTIFICATIONS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingText {
    pub value: f32,
    pub pos: Vec2,
    /// RGB color
    pub color: u32,
    pub remaining_ticks: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub remaining_ticks: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feedback {
    pub floating: Vec<FloatingText>,
    pub notifications: VecDeque<Notification>,
}

impl Feedback {
    pub fn floating_number(&mut self, value: f32, pos: Vec2, color: u32) {
        self.floating.push(FloatingText {
            value,
            pos,
            color,
            remaining_ticks: secs_to_ticks(FLOATING_TEXT_SECS),
        });
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.notifications.push_back(Notification {
            message: message.into(),
            remaining_ticks: secs_to_ticks(NOTIFICATION_SECS),
        });
        while self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
    }

    /// Age everything by one tick and drop expired entries
    pub fn decay(&mut self) {
        for text in &mut self.floating {
            text.remaining_ticks = text.remaining_ticks.saturating_sub(1);
            // Drift upward
            text.pos.y -= 0.5;
        }
        self.floating.retain(|t| t.remaining_ticks > 0);

        for note in &mut self.notifications {
            note.remaining_ticks = note.remaining_ticks.saturating_sub(1);
        }
        self.notifications.retain(|n| n.remaining_ticks > 0);
    }
}
