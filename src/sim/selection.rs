//! Level-up choice selection
//!
//! Final weight per candidate is
//! `rarity weight * category correction * weapon path bias`. Choices are
//! drawn without replacement. A separate pity roll may grant a bonus
//! upgrade after each application.

use rand::Rng;

use super::SimRng;
use super::player::Player;
use super::upgrade::{Category, Upgrade, catalog, find};
use crate::error::SimError;
use crate::tuning::{CategoryTargets, UpgradeTuning};

/// Applied upgrade levels per tag
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BuildProfile {
    /// Damage, Survival, Cooldown, Utility
    pub balance: [u32; 4],
    pub basic: u32,
    pub special: u32,
}

impl BuildProfile {
    pub fn of(player: &Player) -> Self {
        let mut profile = Self::default();
        for (name, &level) in &player.upgrade_levels {
            let Some(upgrade) = find(name) else {
                continue;
            };
            if let Some(category) = upgrade.balance_category() {
                if let Some(slot) = Category::BALANCE.iter().position(|c| *c == category) {
                    profile.balance[slot] += level;
                }
            }
            if upgrade.has(Category::Basic) {
                profile.basic += level;
            }
            if upgrade.has(Category::Special) {
                profile.special += level;
            }
        }
        profile
    }

    pub fn total(&self) -> u32 {
        self.balance.iter().sum()
    }
}

fn target_share(targets: &CategoryTargets, category: Category) -> f32 {
    match category {
        Category::Damage => targets.damage,
        Category::Survival => targets.survival,
        Category::Cooldown => targets.cooldown,
        Category::Utility => targets.utility,
        Category::Basic | Category::Special => 0.0,
    }
}

/// Multiplier pulling a balance category toward its target share
pub fn category_correction(profile: &BuildProfile, category: Category, tuning: &UpgradeTuning) -> f32 {
    let total = profile.total();
    let Some(slot) = Category::BALANCE.iter().position(|c| *c == category) else {
        return 1.0;
    };
    if total == 0 {
        return 1.0;
    }
    let share = profile.balance[slot] as f32 / total as f32;
    if share <= 0.0 {
        return tuning.correction_max;
    }
    (target_share(&tuning.targets, category) / share).clamp(tuning.correction_min, tuning.correction_max)
}

/// Bias toward the weapon path the player has invested in more
pub fn path_bias(profile: &BuildProfile, upgrade: &Upgrade, tuning: &UpgradeTuning) -> f32 {
    let favored = match profile.basic.cmp(&profile.special) {
        std::cmp::Ordering::Greater => Category::Basic,
        std::cmp::Ordering::Less => Category::Special,
        std::cmp::Ordering::Equal => return 1.0,
    };
    if upgrade.has(favored) {
        tuning.path_bias
    } else {
        1.0
    }
}

/// Final draw weight of one candidate
pub fn candidate_weight(profile: &BuildProfile, upgrade: &Upgrade, tuning: &UpgradeTuning) -> f32 {
    let base = upgrade.rarity.weight(&tuning.rarity_weights) as f32;
    let correction = upgrade
        .balance_category()
        .map(|c| category_correction(profile, c, tuning))
        .unwrap_or(1.0);
    base * correction * path_bias(profile, upgrade, tuning)
}

/// Draw up to `count` distinct upgrades the player can still take
pub fn get_random_upgrades(
    count: usize,
    player: &Player,
    tuning: &UpgradeTuning,
    rng: &mut SimRng,
) -> Vec<&'static Upgrade> {
    let profile = BuildProfile::of(player);
    let mut pool: Vec<(&'static Upgrade, f32)> = catalog()
        .iter()
        .filter(|u| player.upgrade_level(u.name) < u.max_level)
        .map(|u| (u, candidate_weight(&profile, u, tuning)))
        .collect();

    let mut chosen = Vec::with_capacity(count.min(pool.len()));
    while chosen.len() < count && !pool.is_empty() {
        let index = weighted_index(&pool, rng);
        let (upgrade, _) = pool.remove(index);
        chosen.push(upgrade);
    }
    chosen
}

fn weighted_index(pool: &[(&'static Upgrade, f32)], rng: &mut SimRng) -> usize {
    let total: f32 = pool.iter().map(|(_, w)| w.max(0.0)).sum();
    if total <= 0.0 {
        return rng.random_range(0..pool.len());
    }
    let mut roll = rng.random::<f32>() * total;
    for (index, (_, weight)) in pool.iter().enumerate() {
        let weight = weight.max(0.0);
        if roll < weight {
            return index;
        }
        roll -= weight;
    }
    pool.len() - 1
}

/// Outcome of granting one upgrade
#[derive(Debug, Clone, Copy)]
pub struct Grant {
    /// Level of the chosen upgrade after application
    pub level: u32,
    /// Extra upgrade won on the pity roll
    pub bonus: Option<&'static Upgrade>,
}

/// Apply `upgrade`, then run the pity roll.
///
/// The roll only happens if the chance was already positive before this
/// application. Success applies one more weighted draw without rolling
/// again and resets the chance; failure doubles it up to 1.
pub fn grant_upgrade(
    player: &mut Player,
    upgrade: &Upgrade,
    tuning: &UpgradeTuning,
    rng: &mut SimRng,
) -> Result<Grant, SimError> {
    let chance = player.random_upgrade_chance;
    let level = player.apply_upgrade(upgrade)?;

    let mut bonus = None;
    if chance > 0.0 {
        if rng.random::<f32>() < chance {
            bonus = get_random_upgrades(1, player, tuning, rng).into_iter().next();
            if let Some(extra) = bonus {
                player.apply_upgrade(extra)?;
                log::info!("Bonus upgrade: {}", extra.name);
            }
            player.random_upgrade_chance = tuning.pity_base_chance;
        } else {
            player.random_upgrade_chance = (chance * 2.0).min(1.0);
        }
    }
    Ok(Grant { level, bonus })
}
