//! Command-line front end for the dashboard core.
//!
//! # Responsibility
//! - Resolve a dataset with the configured fallback chain and report it.
//! - Emit coordinate sets as JSON for an external renderer.

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use unicorn_core::source::static_file::StaticFileSource;
use unicorn_core::source::store::persist_dataset;
use unicorn_core::{
    core_version, default_log_level, init_logging, AttemptOutcome, ConfigError,
    DashboardConfig, DashboardSession, DataSource, StyleTag,
};

fn cli() -> Command {
    Command::new("unicorn-dashboard")
        .version(core_version())
        .about("Unicorn startup dataset resolver and 3D layout exporter")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML config file (defaults to ./unicorn-dashboard.toml or ./config.toml)"),
        )
        .arg(
            Arg::new("log-dir")
                .long("log-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Write rotating log files to this directory"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("resolve")
                .about("Resolve a dataset and print its overview")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("map")
                .about("Resolve a dataset and print coordinates as JSON")
                .arg(
                    Arg::new("style")
                        .long("style")
                        .help("wave | tunnel | ripple | spiral | undulating"),
                ),
        )
        .subcommand(
            Command::new("seed-store")
                .about("Copy the first usable static snapshot into the store"),
        )
}

fn load_config(matches: &ArgMatches) -> Result<DashboardConfig, ConfigError> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => DashboardConfig::load(path),
        None => Ok(DashboardConfig::find_and_load()?.unwrap_or_default()),
    }
}

fn run(matches: &ArgMatches) -> Result<(), String> {
    let config = load_config(matches).map_err(|err| err.to_string())?;

    if let Some(dir) = matches.get_one::<PathBuf>("log-dir") {
        let level = config.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, dir).map_err(|err| err.to_string())?;
    }

    match matches.subcommand() {
        Some(("resolve", args)) => resolve(&config, args.get_flag("json")),
        Some(("map", args)) => {
            let style = match args.get_one::<String>("style") {
                Some(value) => StyleTag::from_str(value).map_err(|err| err.to_string())?,
                None => config.style,
            };
            map(&config, style)
        }
        Some(("seed-store", _)) => seed_store(&config),
        _ => Err("unknown command".to_string()),
    }
}

fn resolve(config: &DashboardConfig, json: bool) -> Result<(), String> {
    let session = DashboardSession::from_config(config).map_err(|err| err.to_string())?;
    let report = session.refresh().map_err(|err| err.to_string())?;
    let overview = session
        .overview()
        .ok_or_else(|| "no dataset after refresh".to_string())?;

    if json {
        let text = serde_json::to_string_pretty(&overview).map_err(|err| err.to_string())?;
        println!("{text}");
        return Ok(());
    }

    for attempt in &report.attempts {
        match &attempt.outcome {
            AttemptOutcome::Loaded { records, skipped } => {
                println!("  {:<18} ok ({records} records, {skipped} skipped)", attempt.source_id)
            }
            AttemptOutcome::Failed(err) => println!("  {:<18} failed: {err}", attempt.source_id),
        }
    }
    println!(
        "dataset: {} records from {} ({} skipped)",
        overview.record_count, overview.provenance, overview.skipped
    );
    if let Some(seed) = overview.seed {
        println!("seed: {seed}");
    }
    println!("total valuation: ${:.1}B", overview.total_valuation);
    for (status, count) in &overview.by_status {
        println!("  {:<10} {count}", status.as_str());
    }
    for (country, count) in &overview.top_countries {
        println!("  {country:<14} {count}");
    }
    Ok(())
}

fn map(config: &DashboardConfig, style: StyleTag) -> Result<(), String> {
    let session = DashboardSession::from_config(config).map_err(|err| err.to_string())?;
    session.select_style(style);
    session.refresh().map_err(|err| err.to_string())?;
    let text =
        serde_json::to_string_pretty(&session.coordinates()).map_err(|err| err.to_string())?;
    println!("{text}");
    Ok(())
}

fn seed_store(config: &DashboardConfig) -> Result<(), String> {
    let path = config
        .store
        .path
        .as_ref()
        .ok_or_else(|| "store.path is not configured".to_string())?;
    let dataset = StaticFileSource::new(config.static_file.paths.clone())
        .load(config.dataset_size_cap)
        .map_err(|err| err.to_string())?;
    let written = persist_dataset(path, &dataset).map_err(|err| err.to_string())?;
    println!("wrote {written} records to {}", path.display());
    Ok(())
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            log::error!("event=cli_failed module=cli status=error error={message}");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}
