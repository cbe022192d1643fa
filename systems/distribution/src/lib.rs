#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rolling-window controller that steers the parasite spawn mix toward a target ratio.
//!
//! The controller keeps the most recent spawn records in a bounded FIFO window
//! and answers three questions from it: what the live mix is, whether that mix
//! is within tolerance, and which kind should spawn next. Selection is random
//! while the window is too sparse to mean anything, deterministic once a kind
//! falls to its force-correction threshold, and otherwise a random draw biased
//! toward whichever kind trails its target.
//!
//! The controller is synchronous, performs no I/O, and expects to be driven
//! from a single logical sequence. Randomness and time are injected so that
//! callers control both.

mod config;

use std::{collections::VecDeque, time::Duration};

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use spawn_balance_core::{Clock, KindMap, MonotonicClock, ParasiteKind, SourceId, SpawnRecord};

pub use config::{ConfigError, DistributionTarget};

/// Smallest selection weight any kind receives in the biased draw.
const WEIGHT_FLOOR: f64 = 0.01;
/// Slack applied when comparing floating-point deviations and deficits.
const COMPARISON_EPSILON: f64 = 1e-9;

/// Snapshot of the window contents alongside the configured targets.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DistributionStats {
    /// Number of records currently held in the window.
    pub total_spawns: usize,
    /// Number of records per kind currently held in the window.
    pub counts: KindMap<usize>,
    /// Configured target ratio per kind.
    pub target_ratios: KindMap<f64>,
}

/// Stateful spawn mix controller.
#[derive(Debug)]
pub struct DistributionController<C = MonotonicClock, R = ChaCha8Rng> {
    target: DistributionTarget,
    window: VecDeque<SpawnRecord>,
    clock: C,
    rng: R,
}

impl DistributionController {
    /// Creates a controller on the process clock with a seeded ChaCha source.
    pub fn with_seed(target: DistributionTarget, seed: u64) -> Result<Self, ConfigError> {
        Self::new(target, MonotonicClock::new(), ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<C: Clock, R: RngCore> DistributionController<C, R> {
    /// Creates a controller after validating `target`.
    pub fn new(target: DistributionTarget, clock: C, rng: R) -> Result<Self, ConfigError> {
        target.validate()?;
        let window = VecDeque::with_capacity(target.window_capacity + 1);
        Ok(Self {
            target,
            window,
            clock,
            rng,
        })
    }

    /// Configuration the controller enforces.
    #[must_use]
    pub fn target(&self) -> &DistributionTarget {
        &self.target
    }

    /// Maximum number of records the window retains.
    #[must_use]
    pub fn window_capacity(&self) -> usize {
        self.target.window_capacity
    }

    /// Number of records currently in the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Reports whether the window holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Iterates over the window from oldest to newest.
    pub fn records(&self) -> impl Iterator<Item = &SpawnRecord> + '_ {
        self.window.iter()
    }

    /// Appends a spawn of `kind` from `source`, evicting the oldest record when full.
    pub fn record_spawn(&mut self, kind: ParasiteKind, source: impl Into<SourceId>) {
        let source = source.into();
        debug_assert!(!source.as_str().is_empty(), "spawn source must be named");

        let timestamp = self.clock.now();
        self.window.push_back(SpawnRecord::new(kind, source, timestamp));
        while self.window.len() > self.target.window_capacity {
            let _ = self.window.pop_front();
        }
    }

    /// Live share of each kind in the window. Zero for every kind when empty.
    #[must_use]
    pub fn current_ratio(&self) -> KindMap<f64> {
        let total = self.window.len();
        self.counts().map(|_, count| ratio(count, total))
    }

    /// Window totals alongside the configured target ratios.
    #[must_use]
    pub fn distribution_stats(&self) -> DistributionStats {
        DistributionStats {
            total_spawns: self.window.len(),
            counts: self.counts(),
            target_ratios: self.target.target_ratios,
        }
    }

    /// Reports whether every kind's live ratio is within tolerance of its target.
    ///
    /// Always true while the window holds fewer records than the minimum
    /// sample size.
    #[must_use]
    pub fn is_distribution_accurate(&self) -> bool {
        if self.window.len() < self.target.minimum_sample_size {
            return true;
        }

        let current = self.current_ratio();
        ParasiteKind::ALL.into_iter().all(|kind| {
            let deviation = (current[kind] - self.target.target_ratios[kind]).abs();
            deviation <= self.target.accuracy_tolerance + COMPARISON_EPSILON
        })
    }

    /// Expected minus observed count for each kind. Positive values trail the target.
    #[must_use]
    pub fn deficits(&self) -> KindMap<f64> {
        let total = self.window.len() as f64;
        let counts = self.counts();
        KindMap::from_fn(|kind| self.target.target_ratios[kind] * total - counts[kind] as f64)
    }

    /// Chooses the kind that should spawn next.
    ///
    /// Does not record anything; callers report the spawn once it happens.
    pub fn next_kind(&mut self) -> ParasiteKind {
        if let Some(kind) = self.sole_targeted_kind() {
            return kind;
        }

        if self.window.len() < self.target.minimum_sample_size_for_deterministic_selection {
            let index = self.rng.gen_range(0..ParasiteKind::ALL.len());
            return ParasiteKind::ALL[index];
        }

        if let Some(kind) = self.forced_correction() {
            return kind;
        }

        self.biased_draw()
    }

    /// Records in the window that spawned from `source`, oldest first.
    pub fn spawn_records_for_deposit<'a>(
        &'a self,
        source: &'a str,
    ) -> impl Iterator<Item = &'a SpawnRecord> + 'a {
        self.window
            .iter()
            .filter(move |record| record.source().as_str() == source)
    }

    /// Records in the window no older than `span`, oldest first.
    ///
    /// Independent of capacity eviction: a retained record is skipped once it
    /// is stale by the clock.
    pub fn recent_spawn_records(
        &self,
        span: Duration,
    ) -> impl Iterator<Item = &SpawnRecord> + '_ {
        let cutoff = self.clock.now().saturating_sub(span);
        self.window
            .iter()
            .filter(move |record| record.timestamp() >= cutoff)
    }

    /// Spawns per second over the trailing `span`. Zero when nothing qualifies.
    #[must_use]
    pub fn spawn_rate(&self, span: Duration) -> f64 {
        // Timestamps are whole milliseconds, so the divisor is too.
        let millis = u64::try_from(span.as_millis()).unwrap_or(u64::MAX);
        if millis == 0 {
            return 0.0;
        }

        let recent = self.recent_spawn_records(span).count();
        if recent == 0 {
            return 0.0;
        }
        recent as f64 * 1_000.0 / millis as f64
    }

    /// Empties the window.
    pub fn reset(&mut self) {
        self.window.clear();
    }

    fn counts(&self) -> KindMap<usize> {
        let mut counts = KindMap::default();
        for record in &self.window {
            counts[record.kind()] += 1;
        }
        counts
    }

    /// The only kind with a non-zero target, when the other kind must never spawn.
    fn sole_targeted_kind(&self) -> Option<ParasiteKind> {
        let mut targeted = ParasiteKind::ALL
            .into_iter()
            .filter(|&kind| self.target.target_ratios[kind] > 0.0);
        match (targeted.next(), targeted.next()) {
            (Some(kind), None) => Some(kind),
            _ => None,
        }
    }

    fn forced_correction(&self) -> Option<ParasiteKind> {
        let counts = self.counts();
        let deficits = self.deficits();

        ParasiteKind::ALL
            .into_iter()
            .filter(|&kind| {
                self.target.target_ratios[kind] > 0.0
                    && counts[kind] <= self.target.force_correction_threshold(kind)
            })
            .fold(None, |best: Option<ParasiteKind>, kind| match best {
                Some(leader) if deficits[leader] + COMPARISON_EPSILON >= deficits[kind] => {
                    Some(leader)
                }
                _ => Some(kind),
            })
    }

    fn biased_draw(&mut self) -> ParasiteKind {
        let current = self.current_ratio();
        let weights = KindMap::from_fn(|kind| {
            (self.target.target_ratios[kind] - current[kind]).max(WEIGHT_FLOOR)
        });
        let energy_share = weights.energy / (weights.energy + weights.combat);

        if self.rng.gen_bool(energy_share) {
            ParasiteKind::Energy
        } else {
            ParasiteKind::Combat
        }
    }
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}
