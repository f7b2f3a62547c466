use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use game_pilot::config::{PilotConfig, PilotMode};
use game_pilot::{InputPreset, Layout};
use tracing_subscriber::EnvFilter;

/// Headless game autopilot:
/// - random: press a random WASD key each tick
/// - model: capture the screen, run one ONNX forward pass, press the winner
#[derive(Parser, Debug)]
#[command(name = "pilot")]
#[command(about = "Drive a game window with random or model-chosen WASD presses")]
#[command(long_about = "Drive the focused game window with synthetic WASD key presses, \
either at random or by letting a pre-trained ONNX model look at the screen each tick. \
Runs until Ctrl-C unless a step limit is given.")]
struct Args {
    /// Decision mode
    #[arg(short, long, value_enum, default_value = "random")]
    mode: PilotMode,

    /// Tick interval (supports milliseconds, seconds, minutes)
    #[arg(short, long, default_value = "200ms",
          help = "Pause between ticks: 200ms, 1s, 2m")]
    interval: String,

    /// Stop after this many ticks
    #[arg(short, long, help = "Stop after N ticks (runs until Ctrl-C when omitted)")]
    steps: Option<u64>,

    /// Path to the ONNX action model (model mode)
    #[arg(long, value_name = "PATH")]
    model: Option<PathBuf>,

    /// Model input geometry
    #[arg(long, value_enum, default_value = "s128")]
    preset: InputPreset,

    /// Input tensor axis layout
    #[arg(long, value_enum, default_value = "nhwc")]
    layout: Layout,

    /// Count key presses without emitting them
    #[arg(long)]
    dry_run: bool,

    /// Capture one frame, save the model's view as a PNG, and exit
    #[arg(long, value_name = "PATH")]
    probe: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if let Some(path) = args.probe {
        return probe(&path, args.preset, args.layout).await;
    }

    let interval_ms = parse_interval(&args.interval)?;
    let config = PilotConfig {
        mode: args.mode,
        interval_ms,
        steps: args.steps,
        model: args.model,
        preset: args.preset,
        layout: args.layout,
        dry_run: args.dry_run,
    };
    config.validate().map_err(anyhow::Error::msg)?;
    let options = config.to_pilot_options();

    println!(
        "Mode: {:?}, interval: {}ms, steps: {}",
        options.mode,
        interval_ms,
        options
            .steps
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unlimited".to_string())
    );

    let session = game_pilot::build_session(&options, None)?;
    let shutdown = session.shutdown_sender();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\nStopping...");
            let _ = shutdown.send(true);
        }
    });

    let report = session.run().await?;
    println!(
        "Done: {} ticks, {} presses (W:{} A:{} S:{} D:{}), {} skipped",
        report.steps,
        report.total_presses(),
        report.presses[0],
        report.presses[1],
        report.presses[2],
        report.presses[3],
        report.skipped,
    );
    Ok(())
}

#[cfg(feature = "screen-capture")]
async fn probe(path: &std::path::Path, preset: InputPreset, layout: Layout) -> Result<()> {
    let spec = game_pilot::InputSpec::square(preset.side(), layout);
    game_pilot::probe::save_model_view(path, spec).await?;
    println!("Saved {}", path.display());
    Ok(())
}

#[cfg(not(feature = "screen-capture"))]
async fn probe(_path: &std::path::Path, _preset: InputPreset, _layout: Layout) -> Result<()> {
    Err(anyhow::anyhow!(
        "Screen capture not available - enable with: cargo run --features screen-capture"
    ))
}

/// Parse an interval string like "200ms", "1s", "2m" into milliseconds.
/// A bare number is taken as milliseconds.
fn parse_interval(interval: &str) -> Result<u64> {
    if let Ok(ms) = interval.parse::<u64>() {
        return Ok(ms);
    }

    let parse_num = |s: &str| -> Result<u64> {
        s.parse()
            .map_err(|_| anyhow::anyhow!("Invalid number in interval: {}", s))
    };

    if let Some(num) = interval.strip_suffix("ms") {
        return parse_num(num);
    }
    if let Some(num) = interval.strip_suffix('s') {
        return Ok(parse_num(num)? * 1000);
    }
    if let Some(num) = interval.strip_suffix('m') {
        return Ok(parse_num(num)? * 60_000);
    }
    Err(anyhow::anyhow!(
        "Invalid interval unit: {}. Use 'ms' for milliseconds, 's' for seconds, 'm' for minutes",
        interval
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_interval_units() {
        assert_eq!(parse_interval("200").unwrap(), 200);
        assert_eq!(parse_interval("150ms").unwrap(), 150);
        assert_eq!(parse_interval("2s").unwrap(), 2000);
        assert_eq!(parse_interval("1m").unwrap(), 60_000);
        assert!(parse_interval("2h").is_err());
        assert!(parse_interval("fast").is_err());
    }
}
