#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Static lookup of per-kind parasite attributes and targeting preferences.
//!
//! The table is built once by the process bootstrap and shared by reference
//! with every consumer. Nothing in it is mutated after construction.

use std::time::Duration;

use serde::Serialize;
use spawn_balance_core::{KindMap, OpponentClass, ParasiteKind};

/// Priority reported for opponents a parasite never targets.
///
/// Sorting ascending by priority places these behind every valid target.
pub const UNLISTED_TARGET_PRIORITY: usize = usize::MAX;

/// Intrinsic combat attributes of a parasite kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ParasiteStats {
    /// Hit points the parasite spawns with.
    pub health: f32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Damage dealt per attack.
    pub attack_damage: f32,
    /// Resources awarded to the player for destroying the parasite.
    pub reward: u32,
    /// Uniform visual scale applied by presentation layers.
    pub scale: f32,
}

/// Which opponents a parasite may engage, and in what order.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetingBehavior {
    /// Classes considered first, in priority order.
    pub primary_targets: Vec<OpponentClass>,
    /// Classes considered once no primary target is available, in priority order.
    pub secondary_targets: Vec<OpponentClass>,
    /// Minimum time between switching from one target to another.
    pub target_switch_cooldown: Duration,
    /// Furthest distance at which a new target may be acquired.
    pub max_target_distance: f32,
    /// Distance beyond which an acquired target is abandoned.
    pub pursuit_distance: f32,
}

impl TargetingBehavior {
    /// Iterates over primary then secondary targets in priority order.
    pub fn targets(&self) -> impl Iterator<Item = OpponentClass> + '_ {
        self.primary_targets
            .iter()
            .chain(self.secondary_targets.iter())
            .copied()
    }
}

/// Complete static description of a parasite kind.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryProfile {
    /// Combat attributes.
    pub stats: ParasiteStats,
    /// Targeting preferences.
    pub targeting: TargetingBehavior,
}

/// Read-only profile lookup keyed by [`ParasiteKind`].
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileTable {
    profiles: KindMap<CategoryProfile>,
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ProfileTable {
    /// Creates a table from explicit per-kind profiles.
    #[must_use]
    pub fn new(energy: CategoryProfile, combat: CategoryProfile) -> Self {
        Self {
            profiles: KindMap::new(energy, combat),
        }
    }

    /// Standard tuning shipped with the game.
    ///
    /// Energy parasites are fragile support units that harass workers and
    /// scouts and leave protectors alone. Combat parasites are sturdier and
    /// go after protectors before anything softer.
    #[must_use]
    pub fn standard() -> Self {
        let energy = CategoryProfile {
            stats: ParasiteStats {
                health: 40.0,
                speed: 3.2,
                attack_damage: 4.0,
                reward: 10,
                scale: 0.8,
            },
            targeting: TargetingBehavior {
                primary_targets: vec![OpponentClass::Worker],
                secondary_targets: vec![OpponentClass::Scout],
                target_switch_cooldown: Duration::from_millis(2_000),
                max_target_distance: 12.0,
                pursuit_distance: 6.0,
            },
        };
        let combat = CategoryProfile {
            stats: ParasiteStats {
                health: 90.0,
                speed: 2.4,
                attack_damage: 12.0,
                reward: 25,
                scale: 1.2,
            },
            targeting: TargetingBehavior {
                primary_targets: vec![OpponentClass::Protector],
                secondary_targets: vec![OpponentClass::Worker, OpponentClass::Scout],
                target_switch_cooldown: Duration::from_millis(1_500),
                max_target_distance: 18.0,
                pursuit_distance: 10.0,
            },
        };
        Self::new(energy, combat)
    }

    /// Full profile for `kind`.
    #[must_use]
    pub fn profile(&self, kind: ParasiteKind) -> &CategoryProfile {
        &self.profiles[kind]
    }

    /// Combat attributes for `kind`.
    #[must_use]
    pub fn stats(&self, kind: ParasiteKind) -> ParasiteStats {
        self.profiles[kind].stats
    }

    /// Targeting preferences for `kind`.
    #[must_use]
    pub fn targeting_behavior(&self, kind: ParasiteKind) -> &TargetingBehavior {
        &self.profiles[kind].targeting
    }

    /// Reports whether `kind` may engage opponents of class `opponent`.
    #[must_use]
    pub fn is_valid_target(&self, kind: ParasiteKind, opponent: OpponentClass) -> bool {
        self.targeting_behavior(kind)
            .targets()
            .any(|candidate| candidate == opponent)
    }

    /// Position of `opponent` in the combined primary-then-secondary list.
    ///
    /// Lower values are engaged first. Returns [`UNLISTED_TARGET_PRIORITY`]
    /// when `kind` never targets `opponent`.
    #[must_use]
    pub fn target_priority(&self, kind: ParasiteKind, opponent: OpponentClass) -> usize {
        self.targeting_behavior(kind)
            .targets()
            .position(|candidate| candidate == opponent)
            .unwrap_or(UNLISTED_TARGET_PRIORITY)
    }

    /// Reports whether `kind` lists [`OpponentClass::PRIVILEGED`] among its primary targets.
    #[must_use]
    pub fn targets_primary_class_first(&self, kind: ParasiteKind) -> bool {
        self.targeting_behavior(kind)
            .primary_targets
            .contains(&OpponentClass::PRIVILEGED)
    }

    /// Every class `kind` may engage, in priority order.
    #[must_use]
    pub fn all_valid_targets(&self, kind: ParasiteKind) -> Vec<OpponentClass> {
        self.targeting_behavior(kind).targets().collect()
    }
}
