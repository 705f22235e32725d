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

mod cli;
mod config;

use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Command, FlowArgs, ProductionArgs, PsrArgs};
use config::AppConfig;
use gridharvest_core::{
    ArrayStore, DayQuery, Fetcher, RangeCollector, ResourceKey, SkipLog,
};
use gridharvest_types::{all_production_type_codes, production_type_name};

/// Pause between consecutive unit collections of one batch.
const UNIT_PAUSE: Duration = Duration::from_secs(5);

fn main() -> Result<()> {
    // Initialize tracing with env filter support
    // Respects RUST_LOG environment variable
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    info!("🚀 Starting GridHarvest - ENTSO-E data collector");
    info!("📋 Configuration Summary:");
    info!("   API endpoint: {}", config.api.base_url);
    info!("   Market day boundary: {} UTC", config.api.period_boundary_hhmm);
    info!(
        "   Rate limit: {}/min (buffer {}), {} retries",
        config.limits.max_requests_per_minute,
        config.limits.rate_limit_buffer,
        config.limits.max_retries
    );
    info!("   Data directory: {}", config.output.data_dir.display());
    info!("   Skip log: {}", config.output.skip_log.display());

    match cli.command {
        Command::Psr(args) => run_psr(&config, &args),
        Command::Production(args) => run_production(&config, &args),
        Command::Flow(args) => run_flow(&config, &args),
    }
}

fn build_collector(config: &AppConfig) -> Result<RangeCollector> {
    let fetcher = Fetcher::new(config.fetcher_config())?;
    let skip_log = SkipLog::new(&config.output.skip_log);
    Ok(RangeCollector::new(fetcher, skip_log))
}

/// Collect each named unit over the range, reusing any complete earlier run
/// found in the store.
fn run_psr(config: &AppConfig, args: &PsrArgs) -> Result<()> {
    let store = ArrayStore::new(&config.output.data_dir);
    let mut collector = build_collector(config)?;
    let query = DayQuery::generation_per_unit(args.domain.as_str())
        .with_boundary(config.api.period_boundary_hhmm.as_str());

    for (i, unit) in args.units.iter().enumerate() {
        if i > 0 {
            std::thread::sleep(UNIT_PAUSE);
        }
        info!("🔎 collecting {} from {} to {}", unit, args.start, args.end);
        if store.load_series(unit, args.start, args.end)?.is_some() {
            info!("⏩ {} already collected for this span, skipping", unit);
            continue;
        }
        let key = ResourceKey::PsrName(unit.clone());
        match collector.collect_resource_range(&query, &key, args.start, args.end) {
            Some(rows) => {
                store.save_series(unit, args.start, args.end, &rows)?;
            }
            None => warn!("⚠️ no data at all for {} in the requested range", unit),
        }
    }
    Ok(())
}

/// Collect the per-type generation matrix plus its column legend.
fn run_production(config: &AppConfig, args: &ProductionArgs) -> Result<()> {
    let codes = if args.types.is_empty() {
        all_production_type_codes()
    } else {
        for code in &args.types {
            if production_type_name(code).is_none() {
                warn!("⚠️ unknown production type code {}, column will stay zero", code);
            }
        }
        args.types.clone()
    };

    let store = ArrayStore::new(&config.output.data_dir);
    let mut collector = build_collector(config)?;
    let query = DayQuery::generation_per_type(args.domain.as_str())
        .with_boundary(config.api.period_boundary_hhmm.as_str());

    info!(
        "🔎 collecting production matrix for {} ({} types) from {} to {}",
        args.domain,
        codes.len(),
        args.start,
        args.end
    );
    let matrix = collector.collect_production_range(&query, &codes, args.start, args.end);

    let stem = format!("production_by_type_{}_{}_to_{}", args.domain, args.start, args.end);
    store.save_matrix(&stem, &codes, &matrix)?;
    store.write_explanation(&codes)?;
    Ok(())
}

/// Collect both flow directions between the home domain and a neighbour,
/// stacked as an import/export column pair.
fn run_flow(config: &AppConfig, args: &FlowArgs) -> Result<()> {
    let store = ArrayStore::new(&config.output.data_dir);
    let mut collector = build_collector(config)?;
    let boundary = config.api.period_boundary_hhmm.as_str();
    let import_query = DayQuery::physical_flow(args.neighbor.as_str(), args.domain.as_str())
        .with_boundary(boundary);
    let export_query = DayQuery::physical_flow(args.domain.as_str(), args.neighbor.as_str())
        .with_boundary(boundary);

    info!(
        "🔎 collecting flows {} <-> {} from {} to {}",
        args.domain, args.neighbor, args.start, args.end
    );
    let imports = collector.collect_flow_range(&import_query, args.start, args.end);
    let exports = collector.collect_flow_range(&export_query, args.start, args.end);

    let rows: Vec<Vec<f64>> = imports
        .iter()
        .zip(&exports)
        .map(|(i, e)| vec![*i, *e])
        .collect();
    let headers = vec!["import_mw".to_owned(), "export_mw".to_owned()];
    let stem = format!(
        "flows_{}_{}_{}_to_{}",
        args.neighbor, args.domain, args.start, args.end
    );
    store.save_matrix(&stem, &headers, &rows)?;
    Ok(())
}
