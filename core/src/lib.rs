#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the spawn balance engine.
//!
//! This crate defines the vocabulary that connects the spawning collaborator,
//! the distribution controller, and the parasite profile table. The
//! collaborator asks the controller which [`ParasiteKind`] to spawn next,
//! materialises it from the profile table, and then reports the spawn back as
//! a [`SpawnRecord`] tagged with the [`SourceId`] of the deposit it came from.
//! Time is observed exclusively through the [`Clock`] capability so that
//! systems never read ambient wall-clock state.

use std::{
    cell::Cell,
    fmt,
    ops::{Index, IndexMut},
    rc::Rc,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};

/// The two categories of parasite that deposits can emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParasiteKind {
    /// Support-oriented parasite that drains workers and scouts.
    Energy,
    /// Aggressive parasite that seeks out hardened protectors first.
    Combat,
}

impl ParasiteKind {
    /// Every kind in canonical target-ratio order.
    pub const ALL: [ParasiteKind; 2] = [ParasiteKind::Energy, ParasiteKind::Combat];

    /// Stable lowercase label used in logs and reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Energy => "energy",
            Self::Combat => "combat",
        }
    }
}

impl fmt::Display for ParasiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Classes of player unit that a parasite may act against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpponentClass {
    /// Soft resource-gathering unit.
    Worker,
    /// Lightly armoured reconnaissance unit.
    Scout,
    /// Hardened defender guarding the deposits.
    Protector,
}

impl OpponentClass {
    /// Class that aggressive parasites prioritise over soft targets.
    pub const PRIVILEGED: OpponentClass = OpponentClass::Protector;
}

/// One value per [`ParasiteKind`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KindMap<T> {
    /// Value associated with [`ParasiteKind::Energy`].
    pub energy: T,
    /// Value associated with [`ParasiteKind::Combat`].
    pub combat: T,
}

impl<T> KindMap<T> {
    /// Creates a map from explicit per-kind values.
    #[must_use]
    pub const fn new(energy: T, combat: T) -> Self {
        Self { energy, combat }
    }

    /// Builds a map by evaluating `f` for every kind in canonical order.
    pub fn from_fn(mut f: impl FnMut(ParasiteKind) -> T) -> Self {
        let energy = f(ParasiteKind::Energy);
        let combat = f(ParasiteKind::Combat);
        Self { energy, combat }
    }

    /// Borrows the value stored for `kind`.
    #[must_use]
    pub const fn get(&self, kind: ParasiteKind) -> &T {
        match kind {
            ParasiteKind::Energy => &self.energy,
            ParasiteKind::Combat => &self.combat,
        }
    }

    /// Mutably borrows the value stored for `kind`.
    pub fn get_mut(&mut self, kind: ParasiteKind) -> &mut T {
        match kind {
            ParasiteKind::Energy => &mut self.energy,
            ParasiteKind::Combat => &mut self.combat,
        }
    }

    /// Iterates over `(kind, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (ParasiteKind, &T)> {
        ParasiteKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.get(kind)))
    }

    /// Applies `f` to every value, preserving the kind association.
    pub fn map<U>(self, mut f: impl FnMut(ParasiteKind, T) -> U) -> KindMap<U> {
        KindMap {
            energy: f(ParasiteKind::Energy, self.energy),
            combat: f(ParasiteKind::Combat, self.combat),
        }
    }
}

impl<T> Index<ParasiteKind> for KindMap<T> {
    type Output = T;

    fn index(&self, kind: ParasiteKind) -> &Self::Output {
        self.get(kind)
    }
}

impl<T> IndexMut<ParasiteKind> for KindMap<T> {
    fn index_mut(&mut self, kind: ParasiteKind) -> &mut Self::Output {
        self.get_mut(kind)
    }
}

/// Opaque identifier of the location a parasite spawned from, such as a resource deposit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    /// Wraps the provided identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the textual form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SourceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Monotonic instant measured in whole milliseconds since the clock's origin.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Origin of every clock.
    pub const ZERO: Timestamp = Timestamp(0);

    /// Creates a timestamp from a millisecond count.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Milliseconds elapsed since the clock's origin.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Moves the timestamp back by `span`, clamping at the origin.
    #[must_use]
    pub fn saturating_sub(self, span: Duration) -> Self {
        Self(self.0.saturating_sub(duration_millis(span)))
    }

    /// Moves the timestamp forward by `span`, clamping at the representable maximum.
    #[must_use]
    pub fn saturating_add(self, span: Duration) -> Self {
        Self(self.0.saturating_add(duration_millis(span)))
    }
}

fn duration_millis(span: Duration) -> u64 {
    u64::try_from(span.as_millis()).unwrap_or(u64::MAX)
}

/// A single observed spawn. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnRecord {
    kind: ParasiteKind,
    source: SourceId,
    timestamp: Timestamp,
}

impl SpawnRecord {
    /// Captures a spawn of `kind` from `source` at `timestamp`.
    #[must_use]
    pub const fn new(kind: ParasiteKind, source: SourceId, timestamp: Timestamp) -> Self {
        Self {
            kind,
            source,
            timestamp,
        }
    }

    /// Kind of parasite that spawned.
    #[must_use]
    pub const fn kind(&self) -> ParasiteKind {
        self.kind
    }

    /// Location the parasite spawned from.
    #[must_use]
    pub const fn source(&self) -> &SourceId {
        &self.source
    }

    /// Moment the spawn was recorded.
    #[must_use]
    pub const fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

/// Capability that reports the current monotonic time.
pub trait Clock {
    /// Returns the current instant.
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Clock backed by [`std::time::Instant`], measured from its construction.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Starts a clock whose origin is the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        Timestamp(duration_millis(self.origin.elapsed()))
    }
}

/// Manually advanced clock.
///
/// Clones share the same underlying instant, so a test or simulation can keep
/// one handle while the controller owns another. The handle is not `Send`; the
/// controller is driven from a single logical sequence.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<Timestamp>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    #[must_use]
    pub fn starting_at(start: Timestamp) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Moves every handle of this clock forward by `span`.
    pub fn advance(&self, span: Duration) {
        self.now.set(self.now.get().saturating_add(span));
    }

    /// Jumps every handle of this clock to `instant`.
    pub fn set(&self, instant: Timestamp) {
        self.now.set(instant);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_map_indexes_by_kind() {
        let mut counts = KindMap::new(3_usize, 1_usize);
        counts[ParasiteKind::Combat] += 2;

        assert_eq!(counts[ParasiteKind::Energy], 3);
        assert_eq!(counts[ParasiteKind::Combat], 3);
        let kinds: Vec<_> = counts.iter().map(|(kind, _)| kind).collect();
        assert_eq!(kinds, ParasiteKind::ALL);
    }

    #[test]
    fn manual_clock_handles_share_time() {
        let clock = ManualClock::default();
        let handle = clock.clone();

        clock.advance(Duration::from_millis(1_500));
        assert_eq!(handle.now(), Timestamp::from_millis(1_500));

        handle.set(Timestamp::from_millis(40));
        assert_eq!(clock.now().as_millis(), 40);
    }

    #[test]
    fn timestamp_subtraction_clamps_at_origin() {
        let early = Timestamp::from_millis(250);
        assert_eq!(early.saturating_sub(Duration::from_secs(5)), Timestamp::ZERO);
        assert_eq!(
            early.saturating_sub(Duration::from_millis(50)),
            Timestamp::from_millis(200)
        );
    }

    #[test]
    fn kinds_serialise_as_snake_case_labels() {
        let encoded = serde_json::to_string(&KindMap::new(0.75_f64, 0.25_f64))
            .expect("kind map serialises");
        assert_eq!(encoded, r#"{"energy":0.75,"combat":0.25}"#);

        let kind: ParasiteKind = serde_json::from_str("\"combat\"").expect("kind parses");
        assert_eq!(kind, ParasiteKind::Combat);
    }
}
