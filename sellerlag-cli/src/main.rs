//! SellerLag CLI: run the early-delay analysis and inspect the threshold scan.
//!
//! Commands:
//! - `run`: full pipeline from the Olist CSVs, prints a summary and saves artifacts
//! - `scan`: full pipeline, prints the threshold scan table only
//! - `config`: print the default configuration as TOML

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use sellerlag_core::{AnalysisConfig, DelayColumn, OutcomeColumn, ThresholdScanRecord};
use sellerlag_runner::{run_from_config, save_artifacts, AnalysisResult};

#[derive(Parser)]
#[command(
    name = "sellerlag",
    about = "SellerLag CLI: do early delivery delays predict less seller activity?"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by `run` and `scan`.
#[derive(clap::Args)]
struct AnalysisArgs {
    /// Path to a TOML config file. Missing keys take defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the orders and order items CSVs (overrides config).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Split column: early_max_late, early_p95_late, early_severe7_rate.
    #[arg(long)]
    delay_column: Option<DelayColumn>,

    /// Response column: remaining_orders, remaining_active_days.
    #[arg(long)]
    outcome_column: Option<OutcomeColumn>,

    /// Size of the early window (overrides config).
    #[arg(long)]
    k: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis and save artifacts.
    Run {
        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Run the analysis and print the threshold scan only.
    Scan {
        #[command(flatten)]
        analysis: AnalysisArgs,
    },
    /// Print the default configuration as TOML.
    Config,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            analysis,
            output_dir,
        } => run_cmd(&analysis, &output_dir),
        Commands::Scan { analysis } => scan_cmd(&analysis),
        Commands::Config => {
            let toml = AnalysisConfig::default()
                .to_toml()
                .context("failed to render default config")?;
            print!("{toml}");
            Ok(())
        }
    }
}

fn build_config(args: &AnalysisArgs) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(column) = args.delay_column {
        config.delay_column = column;
    }
    if let Some(column) = args.outcome_column {
        config.outcome_column = column;
    }
    if let Some(k) = args.k {
        config.k_early_orders = k;
    }
    config.validate()?;
    Ok(config)
}

fn run_cmd(args: &AnalysisArgs, output_dir: &std::path::Path) -> Result<()> {
    let config = build_config(args)?;
    let result = run_from_config(&config)?;

    print_summary(&result);
    print_scan(&result.scan, config.min_group_size);

    let run_dir = save_artifacts(&result, output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn scan_cmd(args: &AnalysisArgs) -> Result<()> {
    let config = build_config(args)?;
    let result = run_from_config(&config)?;
    print_scan(&result.scan, config.min_group_size);
    Ok(())
}

fn print_summary(result: &AnalysisResult) {
    let c = &result.counts;
    let cfg = &result.config;
    println!();
    println!("=== Early Delay Analysis ===");
    println!("Orders:          {}", c.orders);
    println!("Order items:     {}", c.items);
    println!("Base rows:       {} ({} sellers)", c.base_rows, c.base_sellers);
    println!(
        "Eligible:        {} rows ({} sellers with >= {} orders)",
        c.eligible_rows, c.eligible_sellers, cfg.min_delivered_orders_per_seller
    );
    println!("Exposed sellers: {} (K = {})", c.exposed_sellers, cfg.k_early_orders);
    println!("No activity after window: {}", c.sellers_without_remaining);
    println!("Split / outcome: {} / {}", cfg.delay_column, cfg.outcome_column);
    println!("Dataset hash:    {}", result.dataset_hash);
    println!();
}

fn print_scan(scan: &[ThresholdScanRecord], min_group_size: usize) {
    println!("{:>4} {:>12} {:>8} {:>8}", "t", "loss_days", "n_hi", "n_lo");
    println!("{}", "-".repeat(36));
    for row in scan {
        let loss = row
            .loss_days
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| "NaN".into());
        let flag = if row.is_low_sample(min_group_size) { "  *" } else { "" };
        println!(
            "{:>4} {:>12} {:>8} {:>8}{flag}",
            row.t, loss, row.n_hi, row.n_lo
        );
    }
    if scan.iter().any(|r| r.is_low_sample(min_group_size)) {
        println!();
        println!("* group smaller than {min_group_size} sellers");
    }
}
