use serde::{Deserialize, Serialize};
use spawn_balance_core::{KindMap, ParasiteKind};
use thiserror::Error;

const RATIO_SUM_TOLERANCE: f64 = 1e-6;
const DERIVED_THRESHOLD_FACTOR: f64 = 0.5;

/// Desired spawn mix and the knobs that govern how strictly it is enforced.
///
/// Deserialising fills every omitted field with its default, so a partial
/// configuration document only overrides what it names. Call
/// [`DistributionTarget::validate`] (or construct a controller, which does so)
/// before trusting deserialised values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DistributionTarget {
    /// Desired long-run share of spawns per kind. Must sum to 1.0.
    pub target_ratios: KindMap<f64>,
    /// Largest deviation between live and target ratio still judged accurate.
    pub accuracy_tolerance: f64,
    /// Number of spawn records retained in the rolling window.
    pub window_capacity: usize,
    /// Records required before the mix is judged at all.
    pub minimum_sample_size: usize,
    /// Records required before selection stops being uniformly random.
    pub minimum_sample_size_for_deterministic_selection: usize,
    /// Per-kind counts at or below which that kind is force-selected.
    ///
    /// `None` derives each threshold as half the kind's expected count in a
    /// full window, rounded half away from zero.
    pub force_correction_thresholds: Option<KindMap<usize>>,
}

impl Default for DistributionTarget {
    fn default() -> Self {
        Self {
            target_ratios: KindMap::new(0.75, 0.25),
            accuracy_tolerance: 0.10,
            window_capacity: 20,
            minimum_sample_size: 10,
            minimum_sample_size_for_deterministic_selection: 4,
            force_correction_thresholds: None,
        }
    }
}

impl DistributionTarget {
    /// Creates a target with the provided ratios and default tuning.
    pub fn with_ratios(energy: f64, combat: f64) -> Result<Self, ConfigError> {
        let target = Self {
            target_ratios: KindMap::new(energy, combat),
            ..Self::default()
        };
        target.validate()?;
        Ok(target)
    }

    /// Overrides the window capacity.
    #[must_use]
    pub fn with_window_capacity(mut self, capacity: usize) -> Self {
        self.window_capacity = capacity;
        self
    }

    /// Overrides the accuracy tolerance.
    #[must_use]
    pub fn with_accuracy_tolerance(mut self, tolerance: f64) -> Self {
        self.accuracy_tolerance = tolerance;
        self
    }

    /// Overrides both minimum sample sizes.
    #[must_use]
    pub fn with_sample_sizes(mut self, judgement: usize, deterministic_selection: usize) -> Self {
        self.minimum_sample_size = judgement;
        self.minimum_sample_size_for_deterministic_selection = deterministic_selection;
        self
    }

    /// Pins the force-correction thresholds instead of deriving them.
    #[must_use]
    pub fn with_force_correction_thresholds(mut self, thresholds: KindMap<usize>) -> Self {
        self.force_correction_thresholds = Some(thresholds);
        self
    }

    /// Effective force-correction threshold for `kind`.
    #[must_use]
    pub fn force_correction_threshold(&self, kind: ParasiteKind) -> usize {
        match &self.force_correction_thresholds {
            Some(thresholds) => thresholds[kind],
            None => {
                let expected = self.window_capacity as f64 * self.target_ratios[kind];
                (expected * DERIVED_THRESHOLD_FACTOR).round() as usize
            }
        }
    }

    /// Rejects configurations the controller cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (kind, &ratio) in self.target_ratios.iter() {
            if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
                return Err(ConfigError::RatioOutOfRange { kind, ratio });
            }
        }

        let sum = self.target_ratios.energy + self.target_ratios.combat;
        if (sum - 1.0).abs() > RATIO_SUM_TOLERANCE {
            return Err(ConfigError::RatiosDoNotSumToOne { sum });
        }

        if self.window_capacity == 0 {
            return Err(ConfigError::EmptyWindow);
        }

        if !self.accuracy_tolerance.is_finite() || self.accuracy_tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance {
                tolerance: self.accuracy_tolerance,
            });
        }

        Ok(())
    }
}

/// Reasons a [`DistributionTarget`] is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A target ratio lies outside `[0, 1]` or is not a number.
    #[error("target ratio {ratio} for {kind} parasites must lie within [0, 1]")]
    RatioOutOfRange {
        /// Kind whose ratio is invalid.
        kind: ParasiteKind,
        /// Offending value.
        ratio: f64,
    },
    /// The target ratios do not add up to one.
    #[error("target ratios must sum to 1.0 but sum to {sum}")]
    RatiosDoNotSumToOne {
        /// Actual sum of the configured ratios.
        sum: f64,
    },
    /// The rolling window cannot hold a single record.
    #[error("window capacity must be at least 1")]
    EmptyWindow,
    /// The accuracy tolerance is negative or not a number.
    #[error("accuracy tolerance {tolerance} must be a non-negative number")]
    InvalidTolerance {
        /// Offending value.
        tolerance: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_thresholds_halve_the_expected_full_window_count() {
        let target = DistributionTarget::default();

        assert_eq!(target.force_correction_threshold(ParasiteKind::Energy), 8);
        assert_eq!(target.force_correction_threshold(ParasiteKind::Combat), 3);
    }

    #[test]
    fn explicit_thresholds_win_over_derivation() {
        let target =
            DistributionTarget::default().with_force_correction_thresholds(KindMap::new(5, 1));

        assert_eq!(target.force_correction_threshold(ParasiteKind::Energy), 5);
        assert_eq!(target.force_correction_threshold(ParasiteKind::Combat), 1);
    }

    #[test]
    fn rejects_ratios_that_do_not_sum_to_one() {
        let error = DistributionTarget::with_ratios(0.6, 0.6).expect_err("sum is 1.2");
        assert!(matches!(error, ConfigError::RatiosDoNotSumToOne { .. }));
    }

    #[test]
    fn rejects_out_of_range_ratio() {
        let error = DistributionTarget::with_ratios(1.5, -0.5).expect_err("ratio above one");
        assert_eq!(
            error,
            ConfigError::RatioOutOfRange {
                kind: ParasiteKind::Energy,
                ratio: 1.5,
            }
        );
    }

    #[test]
    fn rejects_empty_window_and_negative_tolerance() {
        let empty = DistributionTarget::default().with_window_capacity(0);
        assert_eq!(empty.validate(), Err(ConfigError::EmptyWindow));

        let loose = DistributionTarget::default().with_accuracy_tolerance(-0.1);
        assert!(matches!(
            loose.validate(),
            Err(ConfigError::InvalidTolerance { .. })
        ));
    }

    #[test]
    fn partial_documents_keep_remaining_defaults() {
        let target: DistributionTarget = toml::from_str(
            r#"
                window_capacity = 40

                [target_ratios]
                energy = 0.6
                combat = 0.4
            "#,
        )
        .expect("partial target parses");

        assert_eq!(target.window_capacity, 40);
        assert_eq!(target.target_ratios, KindMap::new(0.6, 0.4));
        assert_eq!(target.minimum_sample_size, 10);
        assert_eq!(target.force_correction_threshold(ParasiteKind::Combat), 8);
        assert_eq!(target.validate(), Ok(()));
    }
}
