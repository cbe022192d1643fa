use std::time::Duration;

use spawn_balance_core::{OpponentClass, ParasiteKind};
use spawn_balance_system_profiles::{
    CategoryProfile, ParasiteStats, ProfileTable, TargetingBehavior, UNLISTED_TARGET_PRIORITY,
};

#[test]
fn combat_parasites_include_protectors_and_energy_parasites_do_not() {
    let table = ProfileTable::standard();

    let combat = table.all_valid_targets(ParasiteKind::Combat);
    assert!(combat.contains(&OpponentClass::PRIVILEGED));
    assert_eq!(combat.first(), Some(&OpponentClass::Protector));

    let energy = table.all_valid_targets(ParasiteKind::Energy);
    assert!(!energy.contains(&OpponentClass::PRIVILEGED));
    assert_eq!(energy, vec![OpponentClass::Worker, OpponentClass::Scout]);
}

#[test]
fn unlisted_opponents_sort_behind_every_valid_target() {
    let table = ProfileTable::standard();

    assert_eq!(
        table.target_priority(ParasiteKind::Energy, OpponentClass::Protector),
        UNLISTED_TARGET_PRIORITY
    );
    assert_eq!(
        table.target_priority(ParasiteKind::Energy, OpponentClass::Worker),
        0
    );
    assert_eq!(
        table.target_priority(ParasiteKind::Energy, OpponentClass::Scout),
        1
    );
}

#[test]
fn priority_spans_primary_then_secondary_lists() {
    let table = ProfileTable::standard();

    let priorities: Vec<_> = [
        OpponentClass::Protector,
        OpponentClass::Worker,
        OpponentClass::Scout,
    ]
    .into_iter()
    .map(|opponent| table.target_priority(ParasiteKind::Combat, opponent))
    .collect();

    assert_eq!(priorities, vec![0, 1, 2]);
}

#[test]
fn validity_matches_target_lists() {
    let table = ProfileTable::standard();

    assert!(table.is_valid_target(ParasiteKind::Combat, OpponentClass::Protector));
    assert!(table.is_valid_target(ParasiteKind::Combat, OpponentClass::Scout));
    assert!(table.is_valid_target(ParasiteKind::Energy, OpponentClass::Worker));
    assert!(!table.is_valid_target(ParasiteKind::Energy, OpponentClass::Protector));
}

#[test]
fn only_aggressive_kinds_prioritise_the_privileged_class() {
    let table = ProfileTable::standard();

    assert!(table.targets_primary_class_first(ParasiteKind::Combat));
    assert!(!table.targets_primary_class_first(ParasiteKind::Energy));
}

#[test]
fn secondary_privileged_class_is_not_prioritised() {
    let cautious = CategoryProfile {
        stats: ParasiteStats {
            health: 10.0,
            speed: 1.0,
            attack_damage: 1.0,
            reward: 1,
            scale: 1.0,
        },
        targeting: TargetingBehavior {
            primary_targets: vec![OpponentClass::Worker],
            secondary_targets: vec![OpponentClass::Protector],
            target_switch_cooldown: Duration::from_secs(1),
            max_target_distance: 5.0,
            pursuit_distance: 5.0,
        },
    };
    let table = ProfileTable::new(cautious.clone(), cautious);

    assert!(table.is_valid_target(ParasiteKind::Energy, OpponentClass::Protector));
    assert!(!table.targets_primary_class_first(ParasiteKind::Energy));
    assert_eq!(
        table.target_priority(ParasiteKind::Energy, OpponentClass::Protector),
        1
    );
}

#[test]
fn combat_parasites_outclass_energy_parasites() {
    let table = ProfileTable::default();
    let energy = table.stats(ParasiteKind::Energy);
    let combat = table.stats(ParasiteKind::Combat);

    assert!(combat.health > energy.health);
    assert!(combat.attack_damage > energy.attack_damage);
    assert!(combat.reward > energy.reward);
    assert!(
        table
            .targeting_behavior(ParasiteKind::Combat)
            .pursuit_distance
            <= table.profile(ParasiteKind::Combat).targeting.max_target_distance
    );
}
