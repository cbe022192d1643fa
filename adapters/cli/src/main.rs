#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a simulated parasite spawn session.

mod config;
mod logging;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use spawn_balance_system_profiles::ProfileTable;

use crate::{config::Settings, logging::ConsoleSink};

/// Simulates parasite spawns steered toward the configured energy/combat mix.
#[derive(Debug, Parser)]
#[command(name = "spawn-balance", version)]
struct Cli {
    /// TOML file with optional `[distribution]` and `[session]` tables.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Number of spawn decisions to simulate.
    #[arg(long)]
    spawns: Option<usize>,
    /// Seed for the controller's random source.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated milliseconds between spawns.
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,
    /// Deposit identifier; repeat to cycle through several deposits.
    #[arg(long = "deposit", value_name = "ID")]
    deposits: Vec<String>,
    /// Most verbose level written to stderr.
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
    /// Print the final report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(spawns) = self.spawns {
            settings.session.spawns = spawns;
        }
        if let Some(seed) = self.seed {
            settings.session.seed = seed;
        }
        if let Some(interval_ms) = self.interval_ms {
            settings.session.interval_ms = interval_ms;
        }
        if !self.deposits.is_empty() {
            settings.session.deposits = self.deposits.clone();
        }
    }
}

/// Entry point for the spawn balance command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let sink = ConsoleSink::new(cli.log_level);

    let mut settings = Settings::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut settings);
    settings.validate()?;

    let table = ProfileTable::standard();
    let report = session::run(&settings, &table, &sink).context("failed to start session")?;

    if cli.json {
        let encoded =
            serde_json::to_string_pretty(&report).context("failed to encode session report")?;
        println!("{encoded}");
    } else {
        println!("{report}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_settings() {
        let cli = Cli::parse_from([
            "spawn-balance",
            "--spawns",
            "5",
            "--seed",
            "42",
            "--deposit",
            "crater",
            "--deposit",
            "ridge",
            "--log-level",
            "debug",
        ]);
        let mut settings = Settings::default();
        cli.apply_overrides(&mut settings);

        assert_eq!(settings.session.spawns, 5);
        assert_eq!(settings.session.seed, 42);
        assert_eq!(settings.session.interval_ms, 750);
        assert_eq!(settings.session.deposits, vec!["crater", "ridge"]);
        assert_eq!(cli.log_level, LevelFilter::Debug);
        assert!(!cli.json);
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;

        Cli::command().debug_assert();
    }
}
