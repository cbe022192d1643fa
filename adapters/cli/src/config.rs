use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use spawn_balance_system_distribution::DistributionTarget;

/// Complete settings for one simulated session.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    /// Spawn mix the controller enforces.
    pub(crate) distribution: DistributionTarget,
    /// Shape of the simulated spawn loop.
    pub(crate) session: SessionSettings,
}

/// Parameters of the simulated spawn loop.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SessionSettings {
    /// Number of spawn decisions to simulate.
    pub(crate) spawns: usize,
    /// Seed for the controller's random source.
    pub(crate) seed: u64,
    /// Simulated time between consecutive spawns.
    pub(crate) interval_ms: u64,
    /// Trailing span used when reporting the spawn rate.
    pub(crate) rate_window_ms: u64,
    /// Deposits that take turns emitting parasites.
    pub(crate) deposits: Vec<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            spawns: 60,
            seed: 0x5eed_cafe,
            interval_ms: 750,
            rate_window_ms: 10_000,
            deposits: vec![
                "deposit-north".to_owned(),
                "deposit-east".to_owned(),
                "deposit-south".to_owned(),
            ],
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid settings in {}", path.display()))
    }

    /// Parses settings from TOML text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse settings toml contents")
    }

    /// Rejects settings the session cannot run with.
    pub(crate) fn validate(&self) -> Result<()> {
        self.distribution
            .validate()
            .context("invalid [distribution] table")?;

        if self.session.deposits.is_empty() {
            bail!("at least one deposit is required");
        }
        if let Some(position) = self.session.deposits.iter().position(String::is_empty) {
            bail!("deposit #{position} has an empty identifier");
        }

        Ok(())
    }
}
