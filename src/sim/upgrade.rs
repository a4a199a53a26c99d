//! Upgrade catalog
//!
//! Upgrades are immutable descriptors. Each carries a small list of
//! `Effect`s (stat, operation, magnitude) that `Player::apply_upgrade`
//! interprets; nothing here captures state.

use serde::{Deserialize, Serialize};

use crate::tuning::RarityWeights;

/// Rarity tier, drives the base weight in selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Mythic,
    Legendary,
    Exclusive,
}

impl Rarity {
    pub fn weight(&self, weights: &RarityWeights) -> u32 {
        match self {
            Rarity::Common => weights.common,
            Rarity::Rare => weights.rare,
            Rarity::Epic => weights.epic,
            Rarity::Mythic => weights.mythic,
            Rarity::Legendary => weights.legendary,
            Rarity::Exclusive => weights.exclusive,
        }
    }
}

/// Category tags. The first four are balance categories; `Basic` and
/// `Special` mark the weapon path an upgrade invests in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Damage,
    Survival,
    Cooldown,
    Utility,
    Basic,
    Special,
}

impl Category {
    pub const BALANCE: [Category; 4] = [
        Category::Damage,
        Category::Survival,
        Category::Cooldown,
        Category::Utility,
    ];

    pub fn is_balance(&self) -> bool {
        !matches!(self, Category::Basic | Category::Special)
    }
}

/// Player stat an effect targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stat {
    MaxHealth,
    /// Instant heal as a fraction of max health
    HealPercent,
    DamageMultiplier,
    BasicDamage,
    SpecialDamage,
    BasicProjectileSpeed,
    SpecialProjectileSpeed,
    BasicPierce,
    SpecialPierce,
    BasicCooldown,
    SpecialCooldown,
    ExtraProjectiles,
    MoveSpeed,
    RegenPercent,
    Lifesteal,
    XpMultiplier,
    PassiveXp,
    DamageReduction,
    RageBonus,
    FrenzyBonus,
    FearBonus,
    HeartBuffMultiplier,
    UntouchedMultiplier,
    VengeancePercent,
    SpecialRepierce,
    BasicDistanceScaling,
    SpecialDistanceScaling,
    RandomUpgradeChance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    Add,
    Mul,
    Set,
    /// Raise to at least the magnitude
    AtLeast,
}

impl Op {
    pub fn apply(&self, current: f32, amount: f32) -> f32 {
        match self {
            Op::Add => current + amount,
            Op::Mul => current * amount,
            Op::Set => amount,
            Op::AtLeast => current.max(amount),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub stat: Stat,
    pub op: Op,
    pub amount: f32,
}

const fn fx(stat: Stat, op: Op, amount: f32) -> Effect {
    Effect { stat, op, amount }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Upgrade {
    /// Unique key
    pub name: &'static str,
    pub description: &'static str,
    pub rarity: Rarity,
    pub categories: &'static [Category],
    pub effects: &'static [Effect],
    pub max_level: u32,
}

impl Upgrade {
    pub fn has(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    /// First balance category tag, used for build-balance bookkeeping
    pub fn balance_category(&self) -> Option<Category> {
        self.categories.iter().copied().find(Category::is_balance)
    }
}

use Category::*;
use Op::*;

static UPGRADES: &[Upgrade] = &[
    Upgrade {
        name: "Sharpened Rounds",
        description: "+15% basic attack damage",
        rarity: Rarity::Common,
        categories: &[Damage, Basic],
        effects: &[fx(Stat::BasicDamage, Mul, 1.15)],
        max_level: 10,
    },
    Upgrade {
        name: "Heavy Charge",
        description: "+15% special attack damage",
        rarity: Rarity::Common,
        categories: &[Damage, Special],
        effects: &[fx(Stat::SpecialDamage, Mul, 1.15)],
        max_level: 10,
    },
    Upgrade {
        name: "Power Surge",
        description: "+10% damage on all attacks",
        rarity: Rarity::Rare,
        categories: &[Damage],
        effects: &[fx(Stat::DamageMultiplier, Mul, 1.10)],
        max_level: 10,
    },
    Upgrade {
        name: "Quick Trigger",
        description: "-8% basic attack cooldown",
        rarity: Rarity::Common,
        categories: &[Cooldown, Basic],
        effects: &[fx(Stat::BasicCooldown, Mul, 0.92)],
        max_level: 8,
    },
    Upgrade {
        name: "Capacitor",
        description: "-10% special attack cooldown",
        rarity: Rarity::Common,
        categories: &[Cooldown, Special],
        effects: &[fx(Stat::SpecialCooldown, Mul, 0.90)],
        max_level: 8,
    },
    Upgrade {
        name: "Velocity Rounds",
        description: "+10% basic projectile speed",
        rarity: Rarity::Common,
        categories: &[Utility, Basic],
        effects: &[fx(Stat::BasicProjectileSpeed, Mul, 1.10)],
        max_level: 5,
    },
    Upgrade {
        name: "Accelerated Core",
        description: "+10% special projectile speed",
        rarity: Rarity::Common,
        categories: &[Utility, Special],
        effects: &[fx(Stat::SpecialProjectileSpeed, Mul, 1.10)],
        max_level: 5,
    },
    Upgrade {
        name: "Piercing Rounds",
        description: "Basic attacks pierce one more enemy",
        rarity: Rarity::Rare,
        categories: &[Damage, Basic],
        effects: &[fx(Stat::BasicPierce, Add, 1.0)],
        max_level: 5,
    },
    Upgrade {
        name: "Drill Core",
        description: "Special attacks pierce one more enemy",
        rarity: Rarity::Rare,
        categories: &[Damage, Special],
        effects: &[fx(Stat::SpecialPierce, Add, 1.0 / 3.0)],
        max_level: 5,
    },
    Upgrade {
        name: "Split Shot",
        description: "Basic attacks fire one more parallel projectile",
        rarity: Rarity::Epic,
        categories: &[Damage, Basic],
        effects: &[fx(Stat::ExtraProjectiles, Add, 1.0)],
        max_level: 4,
    },
    Upgrade {
        name: "Vitality",
        description: "+20 max health",
        rarity: Rarity::Common,
        categories: &[Survival],
        effects: &[fx(Stat::MaxHealth, Add, 20.0)],
        max_level: 10,
    },
    Upgrade {
        name: "Second Wind",
        description: "Instantly restore 50% of max health",
        rarity: Rarity::Rare,
        categories: &[Survival],
        effects: &[fx(Stat::HealPercent, Add, 0.5)],
        max_level: 3,
    },
    Upgrade {
        name: "Regeneration",
        description: "Regenerate 0.5% of max health per second",
        rarity: Rarity::Rare,
        categories: &[Survival],
        effects: &[fx(Stat::RegenPercent, Add, 0.005)],
        max_level: 5,
    },
    Upgrade {
        name: "Vampiric Rounds",
        description: "Heal for 3% of damage dealt",
        rarity: Rarity::Epic,
        categories: &[Survival, Damage],
        effects: &[fx(Stat::Lifesteal, Add, 0.03)],
        max_level: 5,
    },
    Upgrade {
        name: "Plating",
        description: "Take 5% less damage",
        rarity: Rarity::Rare,
        categories: &[Survival],
        effects: &[fx(Stat::DamageReduction, Add, 0.05)],
        max_level: 8,
    },
    Upgrade {
        name: "Fleet Foot",
        description: "+8% movement speed",
        rarity: Rarity::Common,
        categories: &[Utility],
        effects: &[fx(Stat::MoveSpeed, Mul, 1.08)],
        max_level: 5,
    },
    Upgrade {
        name: "Scholar",
        description: "+15% experience gained",
        rarity: Rarity::Common,
        categories: &[Utility],
        effects: &[fx(Stat::XpMultiplier, Mul, 1.15)],
        max_level: 5,
    },
    Upgrade {
        name: "Osmosis",
        description: "Passively gain 1% of the next level's experience per second",
        rarity: Rarity::Rare,
        categories: &[Utility],
        effects: &[fx(Stat::PassiveXp, Add, 0.01)],
        max_level: 3,
    },
    Upgrade {
        name: "Rage",
        description: "+1% damage per enemy on screen",
        rarity: Rarity::Epic,
        categories: &[Damage],
        effects: &[fx(Stat::RageBonus, Add, 0.01)],
        max_level: 5,
    },
    Upgrade {
        name: "Frenzy",
        description: "+0.5% damage per projectile in flight",
        rarity: Rarity::Epic,
        categories: &[Damage],
        effects: &[fx(Stat::FrenzyBonus, Add, 0.005)],
        max_level: 5,
    },
    Upgrade {
        name: "Fear",
        description: "Up to +50% damage as health runs low",
        rarity: Rarity::Epic,
        categories: &[Damage, Survival],
        effects: &[fx(Stat::FearBonus, Add, 0.5)],
        max_level: 3,
    },
    Upgrade {
        name: "Lovestruck",
        description: "Heart buffs grant +5% more damage per stack",
        rarity: Rarity::Rare,
        categories: &[Damage],
        effects: &[fx(Stat::HeartBuffMultiplier, Add, 0.05)],
        max_level: 5,
    },
    Upgrade {
        name: "Untouchable",
        description: "+50% damage while you have not been hit recently",
        rarity: Rarity::Mythic,
        categories: &[Damage],
        effects: &[fx(Stat::UntouchedMultiplier, Add, 0.5)],
        max_level: 3,
    },
    Upgrade {
        name: "Vengeful Special",
        description: "Your next special deals 50% of the damage you took as bonus damage",
        rarity: Rarity::Mythic,
        categories: &[Damage, Special],
        effects: &[fx(Stat::VengeancePercent, Add, 0.5)],
        max_level: 3,
    },
    Upgrade {
        name: "Glass Cannon",
        description: "+50% damage, -30% max health",
        rarity: Rarity::Mythic,
        categories: &[Damage],
        effects: &[
            fx(Stat::DamageMultiplier, Mul, 1.5),
            fx(Stat::MaxHealth, Mul, 0.7),
        ],
        max_level: 1,
    },
    Upgrade {
        name: "Sharpshooter",
        description: "Basic bullets deal up to +200% damage the farther they travel",
        rarity: Rarity::Legendary,
        categories: &[Damage, Basic],
        effects: &[fx(Stat::BasicDistanceScaling, Set, 1.0)],
        max_level: 1,
    },
    Upgrade {
        name: "Close Quarters",
        description: "Special bullets deal up to +200% damage at close range",
        rarity: Rarity::Legendary,
        categories: &[Damage, Special],
        effects: &[fx(Stat::SpecialDistanceScaling, Set, 1.0)],
        max_level: 1,
    },
    Upgrade {
        name: "Ricochet Core",
        description: "Special bullets can strike the same enemy repeatedly",
        rarity: Rarity::Legendary,
        categories: &[Damage, Special],
        effects: &[fx(Stat::SpecialRepierce, Set, 1.0)],
        max_level: 1,
    },
    Upgrade {
        name: "Roll the Dice",
        description: "Every upgrade has a chance to grant a bonus upgrade",
        rarity: Rarity::Exclusive,
        categories: &[Utility],
        effects: &[fx(Stat::RandomUpgradeChance, AtLeast, 0.03)],
        max_level: 1,
    },
];

/// The static upgrade catalog
pub fn catalog() -> &'static [Upgrade] {
    UPGRADES
}

/// Look up an upgrade by its unique name
pub fn find(name: &str) -> Option<&'static Upgrade> {
    UPGRADES.iter().find(|u| u.name == name)
}
