// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of GridHarvest.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Command line interface.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Danish bidding zone aggregate, the default collection domain.
pub const DEFAULT_DOMAIN: &str = "10Y1001A1001A796";

#[derive(Debug, Parser)]
#[command(
    name = "gridharvest",
    version,
    about = "Collects generation and cross-border flow data from the ENTSO-E transparency platform"
)]
pub struct Cli {
    /// Path to the configuration file (default: gridharvest.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Collect quarter-hour output of named generation units
    Psr(PsrArgs),

    /// Collect the per-production-type generation matrix
    Production(ProductionArgs),

    /// Collect physical cross-border flows, both directions
    Flow(FlowArgs),
}

#[derive(Debug, Args)]
pub struct PsrArgs {
    /// Unit names exactly as the transparency platform publishes them
    #[arg(required = true, value_name = "UNIT")]
    pub units: Vec<String>,

    /// EIC code of the in-domain
    #[arg(long, default_value = DEFAULT_DOMAIN)]
    pub domain: String,

    /// First market day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub start: NaiveDate,

    /// Last market day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub end: NaiveDate,
}

#[derive(Debug, Args)]
pub struct ProductionArgs {
    /// EIC code of the in-domain
    #[arg(long, default_value = DEFAULT_DOMAIN)]
    pub domain: String,

    /// Production-type codes to collect; all known types when omitted
    #[arg(long = "type", value_name = "CODE")]
    pub types: Vec<String>,

    /// First market day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub start: NaiveDate,

    /// Last market day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub end: NaiveDate,
}

#[derive(Debug, Args)]
pub struct FlowArgs {
    /// EIC code of the home domain (imports flow into it)
    #[arg(long, default_value = DEFAULT_DOMAIN)]
    pub domain: String,

    /// EIC code of the neighbouring domain
    #[arg(long, value_name = "EIC")]
    pub neighbor: String,

    /// First market day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub start: NaiveDate,

    /// Last market day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub end: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_psr_subcommand_parses() {
        let cli = Cli::try_parse_from([
            "gridharvest",
            "psr",
            "Anholt",
            "Horns Rev C",
            "--start",
            "2025-01-01",
            "--end",
            "2025-01-31",
        ])
        .unwrap();
        let Command::Psr(args) = cli.command else {
            panic!("expected psr subcommand");
        };
        assert_eq!(args.units, vec!["Anholt", "Horns Rev C"]);
        assert_eq!(args.domain, DEFAULT_DOMAIN);
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn test_psr_requires_at_least_one_unit() {
        let result = Cli::try_parse_from([
            "gridharvest",
            "psr",
            "--start",
            "2025-01-01",
            "--end",
            "2025-01-31",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_production_type_flags_accumulate() {
        let cli = Cli::try_parse_from([
            "gridharvest",
            "production",
            "--type",
            "B16",
            "--type",
            "B18",
            "--start",
            "2025-06-01",
            "--end",
            "2025-06-30",
        ])
        .unwrap();
        let Command::Production(args) = cli.command else {
            panic!("expected production subcommand");
        };
        assert_eq!(args.types, vec!["B16", "B18"]);
    }

    #[test]
    fn test_flow_subcommand_parses() {
        let cli = Cli::try_parse_from([
            "gridharvest",
            "--config",
            "custom.toml",
            "flow",
            "--domain",
            "10YDK-1--------W",
            "--neighbor",
            "10Y1001A1001A82H",
            "--start",
            "2025-01-01",
            "--end",
            "2025-01-02",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        let Command::Flow(args) = cli.command else {
            panic!("expected flow subcommand");
        };
        assert_eq!(args.neighbor, "10Y1001A1001A82H");
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let result = Cli::try_parse_from([
            "gridharvest",
            "flow",
            "--neighbor",
            "10Y1001A1001A82H",
            "--start",
            "01/01/2025",
            "--end",
            "2025-01-02",
        ]);
        assert!(result.is_err());
    }
}
