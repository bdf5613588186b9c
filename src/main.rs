//! Synheart Motion CLI
//!
//! Condition, segment and label tri-axial motion recordings.

use anyhow::Context;
use chrono::DateTime;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use synheart_motion::{
    config::Config,
    core::{ConditionedStream, FilterConfig, FilterType, LabelExporter, Pipeline, Segmenter},
    recording::{load_csv_file, Recording},
    sink::SummarySink,
    VERSION,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "synheart-motion")]
#[command(author = "Synheart")]
#[command(version = VERSION)]
#[command(about = "Conditioning pipeline for tri-axial motion recordings", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Stage overrides shared by every subcommand that conditions a recording.
#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Merge the three axes into one mean signal after normalization
    #[arg(long)]
    merge: bool,

    /// Sampling rate in Hz (enables the band filter together with --filter)
    #[arg(long)]
    sampling_rate: Option<f64>,

    /// Band filter type (lowpass or highpass)
    #[arg(long)]
    filter: Option<FilterType>,

    /// Odd median filter window
    #[arg(long)]
    median_window: Option<usize>,

    /// Kalman process variance
    #[arg(long)]
    process_variance: Option<f64>,

    /// Kalman measurement variance
    #[arg(long)]
    measurement_variance: Option<f64>,
}

impl FilterArgs {
    fn pipeline(&self, config: &Config) -> Pipeline {
        let base = &config.filter;
        let filter = FilterConfig {
            sampling_rate: self.sampling_rate.or(base.sampling_rate),
            filter_type: self.filter.or(base.filter_type),
            median_window: self.median_window.or(base.median_window),
            process_variance: self.process_variance.unwrap_or(base.process_variance),
            measurement_variance: self
                .measurement_variance
                .unwrap_or(base.measurement_variance),
        };
        Pipeline::new(filter).with_merge(self.merge || config.merge_axes)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the conditioning pipeline over a recording
    Process {
        /// Recording CSV (timestamp,x,y,z)
        file: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// Write the conditioned stream as JSON
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Print per-stage statistics
        #[arg(long)]
        summary: bool,
    },

    /// Condition a recording and segment it at detected peaks
    Segment {
        /// Recording CSV (timestamp,x,y,z)
        file: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// Log the peak analysis
        #[arg(long)]
        visualize: bool,
    },

    /// Export fixed-size sample windows around labeled timestamps
    Label {
        /// Recording CSV (timestamp,x,y,z)
        file: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// Session identifier used in the export file name
        #[arg(long)]
        session_id: Option<String>,

        /// Label as TIMESTAMP:TAG, repeatable
        #[arg(long = "label", value_parser = parse_label, required = true)]
        labels: Vec<(i64, String)>,

        /// Samples per window
        #[arg(long)]
        window: Option<usize>,

        /// Output directory for the export file
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Export raw samples instead of conditioned ones
        #[arg(long)]
        raw: bool,
    },

    /// Show configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "synheart_motion=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(Config::config_path);
    let config = Config::load_from(&config_path)
        .with_context(|| format!("loading configuration from {config_path:?}"))?;

    match cli.command {
        Commands::Process {
            file,
            filters,
            output,
            summary,
        } => cmd_process(&config, &file, &filters, output.as_deref(), summary),
        Commands::Segment {
            file,
            filters,
            visualize,
        } => cmd_segment(&config, &file, &filters, visualize),
        Commands::Label {
            file,
            filters,
            session_id,
            labels,
            window,
            output_dir,
            raw,
        } => {
            let request = LabelRequest {
                session_id,
                labels,
                window,
                output_dir,
                raw,
            };
            cmd_label(&config, &file, &filters, request)
        }
        Commands::Config => cmd_config(&config, &config_path),
    }
}

fn condition(
    config: &Config,
    file: &Path,
    filters: &FilterArgs,
    sink: Option<&mut SummarySink>,
) -> anyhow::Result<ConditionedStream> {
    let stream = load_csv_file(file)?;
    let pipeline = filters.pipeline(config);
    let conditioned = match sink {
        Some(sink) => pipeline.process_with_sink(stream, sink)?,
        None => pipeline.process(stream)?,
    };
    Ok(conditioned)
}

fn cmd_process(
    config: &Config,
    file: &Path,
    filters: &FilterArgs,
    output: Option<&Path>,
    summary: bool,
) -> anyhow::Result<()> {
    let mut sink = SummarySink::new();
    let conditioned = condition(config, file, filters, Some(&mut sink))?;

    println!(
        "Conditioned '{}': {} samples ({})",
        conditioned.name(),
        conditioned.len(),
        if conditioned.is_merged() {
            "merged"
        } else {
            "per-axis"
        }
    );

    if summary {
        println!();
        println!("{}", sink.summary());
    }

    if let Some(output) = output {
        let json = serde_json::to_string_pretty(&conditioned)?;
        std::fs::write(output, json).with_context(|| format!("writing {output:?}"))?;
        println!("Wrote conditioned stream to {output:?}");
    }
    Ok(())
}

fn cmd_segment(
    config: &Config,
    file: &Path,
    filters: &FilterArgs,
    visualize: bool,
) -> anyhow::Result<()> {
    let conditioned = condition(config, file, filters, None)?;
    let result = Segmenter::default().segment(&conditioned, visualize)?;

    println!(
        "Detected {} peaks, {} segments in '{}'",
        result.peaks.len(),
        result.segments.len(),
        conditioned.name()
    );
    for (i, segment) in result.segments.iter().enumerate() {
        println!(
            "  #{:<3} [{} .. {}] {} .. {} ({} ms)",
            i + 1,
            segment.start,
            segment.end,
            format_timestamp(segment.start_timestamp),
            format_timestamp(segment.end_timestamp),
            segment.duration_ms()
        );
    }
    Ok(())
}

struct LabelRequest {
    session_id: Option<String>,
    labels: Vec<(i64, String)>,
    window: Option<usize>,
    output_dir: Option<PathBuf>,
    raw: bool,
}

fn cmd_label(
    config: &Config,
    file: &Path,
    filters: &FilterArgs,
    request: LabelRequest,
) -> anyhow::Result<()> {
    let output_dir = request
        .output_dir
        .unwrap_or_else(|| config.export_path.clone());
    let exporter = LabelExporter::new(output_dir)
        .with_window_size(request.window.unwrap_or(config.label_window_size))?;
    let session_id = request
        .session_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let (timestamps, tags): (Vec<i64>, Vec<String>) = request.labels.into_iter().unzip();

    let recording: Box<dyn Recording> = if request.raw {
        Box::new(load_csv_file(file)?)
    } else {
        Box::new(condition(config, file, filters, None)?)
    };

    let path = exporter.export(recording.as_ref(), &session_id, &timestamps, &tags)?;
    println!("Session: {session_id}");
    println!(
        "Exported {} labeled windows of {} samples to {path:?}",
        tags.len(),
        exporter.window_size()
    );
    Ok(())
}

fn cmd_config(config: &Config, path: &Path) -> anyhow::Result<()> {
    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {path:?}");
    println!();
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

/// Parse `TIMESTAMP:TAG`.
fn parse_label(s: &str) -> Result<(i64, String), String> {
    let (timestamp, tag) = s
        .split_once(':')
        .ok_or_else(|| format!("expected TIMESTAMP:TAG, got '{s}'"))?;
    let timestamp = timestamp
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid label timestamp '{timestamp}': {e}"))?;
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(format!("empty label tag in '{s}'"));
    }
    Ok((timestamp, tag.to_string()))
}

/// Epoch-millisecond timestamps as wall-clock time; small values are printed as-is.
fn format_timestamp(ts: i64) -> String {
    const EPOCH_MS_FLOOR: i64 = 1_000_000_000_000;
    if ts < EPOCH_MS_FLOOR {
        return ts.to_string();
    }
    match DateTime::from_timestamp_millis(ts) {
        Some(dt) => dt.format("%H:%M:%S%.3f").to_string(),
        None => ts.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label() {
        assert_eq!(
            parse_label("1700000000100:tap").unwrap(),
            (1_700_000_000_100, "tap".to_string())
        );
        assert_eq!(parse_label(" 5 : swipe ").unwrap(), (5, "swipe".to_string()));
        assert!(parse_label("tap").is_err());
        assert!(parse_label("abc:tap").is_err());
        assert!(parse_label("5:").is_err());
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(42), "42");
        assert_eq!(format_timestamp(1_700_000_000_123), "22:13:20.123");
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = Config::default();
        config.filter.median_window = Some(3);
        config.merge_axes = true;

        let args = FilterArgs {
            median_window: Some(7),
            filter: Some(FilterType::HighPass),
            ..FilterArgs::default()
        };
        let pipeline = args.pipeline(&config);
        assert_eq!(pipeline.config().median_window, Some(7));
        assert_eq!(pipeline.config().filter_type, Some(FilterType::HighPass));
        assert!(pipeline.merges_axes());
    }

    #[test]
    fn test_cli_parses_label_command() {
        let cli = Cli::try_parse_from([
            "synheart-motion",
            "label",
            "rec.csv",
            "--label",
            "100:tap",
            "--label",
            "300:swipe",
            "--merge",
            "--filter",
            "lowpass",
        ])
        .unwrap();
        match cli.command {
            Commands::Label {
                labels, filters, ..
            } => {
                assert_eq!(labels.len(), 2);
                assert!(filters.merge);
                assert_eq!(filters.filter, Some(FilterType::LowPass));
            }
            _ => panic!("expected label command"),
        }
    }

    #[test]
    fn test_cli_requires_label() {
        assert!(Cli::try_parse_from(["synheart-motion", "label", "rec.csv"]).is_err());
    }
}
