//! waysave - Bulk archiver for the Wayback Machine Save Page Now API
//!
//! Submits URL lists for capture, checks the resulting asynchronous
//! jobs, and reports how fresh the archive's existing snapshots are.

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use waysave_core::{HttpConfig, init_logging, install_signal_handlers, set_http_config};
use waysave_spn::{AvailableArgs, CheckArgs, SaveArgs, SaveOptions, runner};

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "waysave")]
#[command(about = "Bulk-archive URL lists via the Wayback Machine Save Page Now API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Suppress info logs (only warnings and errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Enable debug logging (includes raw API responses)
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./waysave.toml or ~/.config/waysave/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Maximum retry attempts for transient HTTP failures
    #[arg(long, global = true)]
    max_retries: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a URL list to Save Page Now
    Save(SaveArgs),
    /// Check recorded capture jobs against the status endpoint
    Check(CheckArgs),
    /// Report archive availability for a URL list
    Available(AvailableArgs),
    /// Show current configuration
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.debug);

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Configuration error: {e:#}");
            return ExitCode::from(2);
        }
    };

    set_http_config(HttpConfig {
        max_retries: cli.max_retries.unwrap_or(config.http.max_retries),
    });

    let result = match &cli.command {
        Command::Save(args) => {
            install_signal_handlers();
            run_save(args, &config)
        }
        Command::Check(args) => {
            install_signal_handlers();
            run_check(args, &config)
        }
        Command::Available(args) => {
            install_signal_handlers();
            run_available(args, &config)
        }
        Command::Config => {
            print_config(&config, cli.max_retries);
            Ok(ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            log::error!("Fatal error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    match &cli.config {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
}

fn run_save(args: &SaveArgs, config: &Config) -> anyhow::Result<ExitCode> {
    let credentials = config.credentials()?;
    let opts = SaveOptions {
        delay: Duration::from_secs(args.delay.unwrap_or(config.save.delay_secs)),
        retry_interval: Duration::from_secs(config.save.retry_interval_secs),
        no_outlinks_for: args.no_outlinks_for.clone(),
    };
    runner::run_save(
        credentials,
        &args.url_list,
        args.session_file.as_deref(),
        &opts,
    )
}

fn run_check(args: &CheckArgs, config: &Config) -> anyhow::Result<ExitCode> {
    let credentials = config.credentials()?;
    runner::run_check(
        credentials,
        &args.session_file,
        args.status_file.as_deref(),
        Duration::from_secs(config.check.poll_interval_secs),
    )
}

fn run_available(args: &AvailableArgs, config: &Config) -> anyhow::Result<ExitCode> {
    runner::run_available(
        &args.url_list,
        Duration::from_secs(config.available.delay_secs),
    )
}

fn print_config(config: &Config, max_retries_override: Option<u32>) {
    use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

    let configured = |v: &Option<String>| if v.is_some() { "configured" } else { "not set" };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    table.add_row(vec!["Access key", configured(&config.credentials.access_key)]);
    table.add_row(vec!["Secret key", configured(&config.credentials.secret)]);
    table.add_row(vec![
        "Max retries",
        &max_retries_override
            .unwrap_or(config.http.max_retries)
            .to_string(),
    ]);
    table.add_row(vec!["Save delay", &format!("{}s", config.save.delay_secs)]);
    table.add_row(vec![
        "Save retry interval",
        &format!("{}s", config.save.retry_interval_secs),
    ]);
    table.add_row(vec![
        "Check poll interval",
        &format!("{}s", config.check.poll_interval_secs),
    ]);
    table.add_row(vec![
        "Availability delay",
        &format!("{}s", config.available.delay_secs),
    ]);

    eprintln!("\n{table}");
}
