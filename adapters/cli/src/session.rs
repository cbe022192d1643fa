use std::{collections::BTreeMap, fmt, time::Duration};

use log::{Level, Log};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use spawn_balance_core::{KindMap, ManualClock, ParasiteKind};
use spawn_balance_system_distribution::{ConfigError, DistributionController, DistributionStats};
use spawn_balance_system_profiles::{ParasiteStats, ProfileTable};

use crate::{config::Settings, logging::emit};

/// Outcome of a simulated spawn session.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct SessionReport {
    /// Window snapshot after the final spawn.
    pub(crate) stats: DistributionStats,
    /// Live ratio of the final window.
    pub(crate) current_ratio: KindMap<f64>,
    /// Whether the final window is within tolerance.
    pub(crate) accurate: bool,
    /// Spawns per second over the trailing rate window.
    pub(crate) spawn_rate: f64,
    /// Length of the trailing rate window.
    pub(crate) rate_window_ms: u64,
    /// Spawns per kind across the whole session, including evicted records.
    pub(crate) spawned: KindMap<usize>,
    /// Records per deposit still held in the final window.
    pub(crate) window_by_deposit: BTreeMap<String, usize>,
    /// Number of times the mix drifted out of tolerance.
    pub(crate) drift_events: usize,
    /// Attributes of each kind as spawned.
    pub(crate) profiles: KindMap<ParasiteStats>,
}

/// Drives the controller through `settings.session.spawns` decisions on a simulated clock.
pub(crate) fn run(
    settings: &Settings,
    table: &ProfileTable,
    sink: &dyn Log,
) -> Result<SessionReport, ConfigError> {
    let session = &settings.session;
    let clock = ManualClock::default();
    let mut controller = DistributionController::new(
        settings.distribution.clone(),
        clock.clone(),
        ChaCha8Rng::seed_from_u64(session.seed),
    )?;

    emit(
        sink,
        Level::Info,
        format_args!(
            "simulating {} spawns across {} deposits (seed {:#x})",
            session.spawns,
            session.deposits.len(),
            session.seed
        ),
    );

    let interval = Duration::from_millis(session.interval_ms);
    let mut spawned = KindMap::new(0, 0);
    let mut drift_events = 0;
    let mut accurate = controller.is_distribution_accurate();

    for (step, deposit) in session
        .deposits
        .iter()
        .cycle()
        .take(session.spawns)
        .enumerate()
    {
        let kind = controller.next_kind();
        let stats = table.stats(kind);
        let stance = if table.targets_primary_class_first(kind) {
            "aggressive"
        } else {
            "support"
        };
        let preferred = table.all_valid_targets(kind).first().copied();
        emit(
            sink,
            Level::Debug,
            format_args!(
                "spawn #{step}: {kind} parasite at {deposit} ({stance}, hp {}, reward {}, prefers {preferred:?})",
                stats.health, stats.reward
            ),
        );

        controller.record_spawn(kind, deposit.as_str());
        spawned[kind] += 1;

        let now_accurate = controller.is_distribution_accurate();
        if accurate && !now_accurate {
            drift_events += 1;
            let ratio = controller.current_ratio();
            emit(
                sink,
                Level::Warn,
                format_args!(
                    "mix drifted after spawn #{step}: energy {:.2}, combat {:.2}",
                    ratio.energy, ratio.combat
                ),
            );
        } else if !accurate && now_accurate {
            emit(
                sink,
                Level::Info,
                format_args!("mix back within tolerance after spawn #{step}"),
            );
        }
        accurate = now_accurate;

        clock.advance(interval);
    }

    let rate_window = Duration::from_millis(session.rate_window_ms);
    let window_by_deposit = session
        .deposits
        .iter()
        .map(|deposit| {
            let count = controller.spawn_records_for_deposit(deposit).count();
            (deposit.clone(), count)
        })
        .collect();

    let report = SessionReport {
        stats: controller.distribution_stats(),
        current_ratio: controller.current_ratio(),
        accurate,
        spawn_rate: controller.spawn_rate(rate_window),
        rate_window_ms: session.rate_window_ms,
        spawned,
        window_by_deposit,
        drift_events,
        profiles: KindMap::from_fn(|kind| table.stats(kind)),
    };

    emit(
        sink,
        Level::Info,
        format_args!(
            "session complete: {} energy, {} combat spawned",
            report.spawned.energy, report.spawned.combat
        ),
    );

    Ok(report)
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "spawned: {} energy / {} combat",
            self.spawned.energy, self.spawned.combat
        )?;
        writeln!(f, "window: {} records", self.stats.total_spawns)?;
        for kind in ParasiteKind::ALL {
            writeln!(
                f,
                "  {kind:<6} count {:>3}  ratio {:.2}  target {:.2}",
                self.stats.counts[kind], self.current_ratio[kind], self.stats.target_ratios[kind]
            )?;
        }
        for (deposit, count) in &self.window_by_deposit {
            writeln!(f, "  {deposit}: {count}")?;
        }
        writeln!(
            f,
            "accurate: {}  drift events: {}",
            if self.accurate { "yes" } else { "no" },
            self.drift_events
        )?;
        write!(
            f,
            "spawn rate: {:.2}/s over {} ms",
            self.spawn_rate, self.rate_window_ms
        )
    }
}
