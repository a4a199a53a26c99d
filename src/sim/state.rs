//! Session state and phase transitions
//!
//! Everything a run needs lives in `SimulationState`. The same seed and
//! tuning always rebuild the same starting state.

use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::SimRng;
use super::arena::Arena;
use super::events::Feedback;
use super::pickup::Pickups;
use super::player::Player;
use super::projectile::ProjectilePool;
use super::selection::{Grant, get_random_upgrades, grant_upgrade};
use super::spawner::{EnemyPool, WaveDirector};
use super::upgrade::{Upgrade, find};
use crate::error::SimError;
use crate::highscores::HighScores;
use crate::ticks_to_secs;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Waiting for the player to pick one of `offered`
    LevelUp,
    /// Game is paused
    Paused,
    /// Player died
    GameOver,
}

/// End-of-run summary handed to the high score boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub score: u64,
    pub elapsed_secs: f32,
    pub level: u32,
    /// Rank this run would take on the board, if it qualifies
    pub high_score_rank: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub rng: SimRng,
    pub phase: GamePhase,
    /// Calls to `tick`, paused or not
    pub tick: u64,
    /// Simulated ticks; drives every entity timer
    pub elapsed_ticks: u64,
    pub arena: Arena,
    pub player: Player,
    pub enemies: EnemyPool,
    pub projectiles: ProjectilePool,
    pub pickups: Pickups,
    pub feedback: Feedback,
    pub wave: WaveDirector,
    /// Level-up choices currently on offer
    pub offered: Vec<&'static Upgrade>,
}

impl SimulationState {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut rng = SimRng::seed_from_u64(seed);
        let arena = Arena::new(&tuning.arena);
        let player = Player::new(&tuning, &arena);
        let enemies = EnemyPool::new(&tuning, &mut rng, tuning.waves.pool_size);
        log::info!("Run started with seed {}", seed);

        Self {
            seed,
            tuning,
            rng,
            phase: GamePhase::Playing,
            tick: 0,
            elapsed_ticks: 0,
            arena,
            player,
            enemies,
            projectiles: ProjectilePool::new(),
            pickups: Pickups::default(),
            feedback: Feedback::default(),
            wave: WaveDirector::new(),
            offered: Vec::new(),
        }
    }

    /// Rebuild from the same seed and tuning, dropping every entity
    pub fn restart(&mut self) {
        let tuning = std::mem::take(&mut self.tuning);
        *self = Self::new(self.seed, tuning);
    }

    pub fn elapsed_secs(&self) -> f32 {
        ticks_to_secs(self.elapsed_ticks)
    }

    /// Draw a fresh set of choices for the next pending level-up.
    ///
    /// With nothing left to offer the pending level-ups are discarded.
    pub fn offer_upgrades(&mut self) {
        self.offered = get_random_upgrades(
            self.tuning.upgrades.choices_per_level,
            &self.player,
            &self.tuning.upgrades,
            &mut self.rng,
        );
        if self.offered.is_empty() {
            log::info!("Every upgrade is maxed; skipping level-up");
            self.player.pending_level_ups = 0;
            self.phase = GamePhase::Playing;
        } else {
            self.phase = GamePhase::LevelUp;
        }
    }

    /// Resolve the current level-up with one of the offered upgrades
    pub fn choose_upgrade(&mut self, name: &str) -> Result<Grant, SimError> {
        if self.phase != GamePhase::LevelUp {
            return Err(SimError::NotLevelingUp);
        }
        let upgrade = find(name).ok_or_else(|| SimError::UnknownUpgrade(name.to_string()))?;
        if !self.offered.iter().any(|u| u.name == upgrade.name) {
            return Err(SimError::NotOffered(name.to_string()));
        }

        let grant = grant_upgrade(
            &mut self.player,
            upgrade,
            &self.tuning.upgrades,
            &mut self.rng,
        )?;
        self.feedback
            .notify(format!("{} (level {})", upgrade.name, grant.level));
        if let Some(bonus) = grant.bonus {
            self.feedback.notify(format!("Bonus upgrade: {}", bonus.name));
        }

        self.player.pending_level_ups = self.player.pending_level_ups.saturating_sub(1);
        self.offered.clear();
        if self.player.is_leveling_up() {
            self.offer_upgrades();
        } else {
            self.phase = GamePhase::Playing;
        }
        Ok(grant)
    }

    pub fn session_report(&self, board: &HighScores) -> SessionReport {
        SessionReport {
            score: self.player.score,
            elapsed_secs: self.elapsed_secs(),
            level: self.player.level,
            high_score_rank: board.potential_rank(self.player.score),
        }
    }
}
