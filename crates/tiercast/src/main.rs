//! Tiercast CLI - record predictions and inspect the telemetry engine.
//!
//! Thin wrapper over `tiercast-core`: every subcommand bootstraps the
//! service against the configured history artifact, runs one operation,
//! and shuts down cleanly (which flushes).

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;

use tiercast_core::config::TiercastConfig;
use tiercast_core::logging::init_logging;
use tiercast_core::policy::ThresholdMode;
use tiercast_core::record::PredictionRecord;
use tiercast_core::service::PredictionService;

#[derive(Parser)]
#[command(name = "tiercast", version, about = "Prediction telemetry and adaptive tiering")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit machine-readable JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a scored prediction and print the assigned tier.
    Record {
        /// Scorer probability in [0,1].
        #[arg(long)]
        probability: f64,

        /// Resolved employee count used for segmentation (0 = unknown).
        #[arg(long)]
        employees: u64,

        /// Echoed request fields as a JSON object.
        #[arg(long, default_value = "{}")]
        summary: String,

        /// Resolved feature vector as a JSON object.
        #[arg(long, default_value = "{}")]
        features: String,

        /// Use quantile-adaptive thresholds when enough history exists.
        #[arg(long)]
        adaptive: bool,
    },

    /// Tier distribution across the buffered history.
    Stats,

    /// Per-segment quantiles and threshold recommendations.
    Quantiles,

    /// The most recent buffered predictions.
    Recent {
        /// Number of records to show (clamped to 1000).
        #[arg(short = 'n', long, default_value_t = 20)]
        count: usize,
    },

    /// Buffer and flush counters.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = TiercastConfig::load(cli.config.as_deref()).context("loading config")?;
    init_logging(&config.log).context("initializing logging")?;
    tracing::debug!(config_file = ?cli.config, "tiercast starting");

    match cli.command {
        Command::Record {
            probability,
            employees,
            summary,
            features,
            adaptive,
        } => {
            let summary: Value =
                serde_json::from_str(&summary).context("--summary must be a JSON object")?;
            let features: Value =
                serde_json::from_str(&features).context("--features must be a JSON object")?;

            let mode = if adaptive {
                ThresholdMode::Adaptive
            } else {
                ThresholdMode::Static
            };
            let service = PredictionService::bootstrap(&config, mode)?;
            let recorded = service.record_prediction(summary, features, probability, employees);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&recorded)?);
            } else {
                println!(
                    "tier {} ({}) - probability {:.4}, segment {}",
                    recorded.record.tier,
                    recorded.record.tier.description(),
                    recorded.record.probability,
                    recorded.decision.segment,
                );
            }
            service.shutdown().await;
        }

        Command::Stats => {
            let service = PredictionService::bootstrap(&config, ThresholdMode::Static)?;
            match service.distribution() {
                None => not_available(cli.json),
                Some(report) => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&report)?);
                    } else {
                        println!("{} predictions buffered", report.total);
                        for share in &report.tiers {
                            println!(
                                "  tier {} ({}): {} ({:.1}%)",
                                share.tier, share.description, share.count, share.percentage
                            );
                        }
                        for segment in &report.segments {
                            let p = &segment.probabilities;
                            println!(
                                "  {}: n={} min={:.4} max={:.4} mean={:.4} median={:.4}",
                                segment.segment.label(),
                                segment.count,
                                p.min,
                                p.max,
                                p.mean,
                                p.median
                            );
                        }
                    }
                }
            }
            service.shutdown().await;
        }

        Command::Quantiles => {
            let service = PredictionService::bootstrap(&config, ThresholdMode::Static)?;
            match service.recalibration() {
                None => not_available(cli.json),
                Some(report) => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&report)?);
                    } else if report.segments.is_empty() {
                        println!("no segment has enough samples for quantiles yet");
                    } else {
                        for sq in &report.segments {
                            println!(
                                "  {}: n={} q25={:.4} q50={:.4} q75={:.4}",
                                sq.segment.label(),
                                sq.sample_count,
                                sq.q25,
                                sq.q50,
                                sq.q75
                            );
                            println!(
                                "    current  a={:.4} b={:.4} c={:.4}",
                                sq.current.a, sq.current.b, sq.current.c
                            );
                            println!(
                                "    suggest  a={:.4} b={:.4} c={:.4}",
                                sq.recommended.a, sq.recommended.b, sq.recommended.c
                            );
                        }
                    }
                }
            }
            service.shutdown().await;
        }

        Command::Recent { count } => {
            let service = PredictionService::bootstrap(&config, ThresholdMode::Static)?;
            let records = service.recent(count);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("no predictions buffered");
            } else {
                for record in &records {
                    println!("{}", render_record(record));
                }
            }
            service.shutdown().await;
        }

        Command::Status => {
            let service = PredictionService::bootstrap(&config, ThresholdMode::Static)?;
            let status = service.status();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!(
                    "buffer: {}/{} ({} appended, {} evicted)",
                    status.history.len,
                    status.history.capacity,
                    status.history.total_appended,
                    status.history.total_evicted
                );
                println!(
                    "flush: {} completed, {} failed, {} coalesced",
                    status.flush.completed, status.flush.failed, status.flush.coalesced
                );
                println!("artifact: {}", status.artifact_path.display());
            }
            service.shutdown().await;
        }
    }

    Ok(())
}

fn not_available(json: bool) {
    if json {
        println!("{}", serde_json::json!({"status": "not_available"}));
    } else {
        println!("no predictions buffered yet");
    }
}

fn render_record(record: &PredictionRecord) -> String {
    let when = chrono::DateTime::from_timestamp_millis(record.timestamp_ms as i64)
        .map_or_else(|| "-".to_string(), |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string());
    format!(
        "{}  tier {}  p={:.4}  employees={}  segment={}",
        when,
        record.tier,
        record.probability,
        record.employee_count,
        record.segment()
    )
}
