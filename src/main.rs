// src/main.rs

mod analysis;
mod config;
mod detection;
mod inference;
mod landmarks;
mod overlay;
mod pipeline;
mod preprocessing;
mod session;
mod smoother;
mod types;
mod video_processor;

use anyhow::Result;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use inference::PoseEstimator;
use pipeline::RunReport;
use session::{summary, PushupSession, SkipOutputPaths, SkipSession};
use std::path::Path;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use types::Config;
use video_processor::{CaptureInput, VideoOutput, VideoReader};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Webcam push-up and jump-rope repetition counter",
    long_about = None
)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true, default_value = "config.yaml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Count push-ups, graded by body posture
    Pushup(RunArgs),
    /// Count jump-rope skips after a short standing calibration
    Skip(RunArgs),
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Replay a recorded video instead of opening the camera
    #[arg(short, long)]
    input: Option<String>,

    /// Camera index
    #[arg(short, long)]
    device: Option<i32>,

    /// Session length in seconds
    #[arg(long)]
    duration: Option<f64>,

    /// Run headless: no window and no quit key
    #[arg(long)]
    no_display: bool,
}

impl Command {
    fn args(&self) -> &RunArgs {
        match self {
            Command::Pushup(args) | Command::Skip(args) => args,
        }
    }
}

fn apply_overrides(config: &mut Config, command: &Command) {
    let args = command.args();
    if let Some(input) = &args.input {
        config.capture.input_path = Some(input.clone());
    }
    if let Some(device) = args.device {
        config.capture.device_id = device;
        if args.input.is_none() {
            config.capture.input_path = None;
        }
    }
    if args.no_display {
        config.display.enabled = false;
    }
    if let Some(duration) = args.duration {
        match command {
            Command::Pushup(_) => config.pushup.duration_secs = duration,
            Command::Skip(_) => config.skip.duration_secs = duration,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_found = Path::new(&cli.config).exists();
    let mut config = Config::load_or_default(&cli.config)?;
    apply_overrides(&mut config, &cli.command);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("rep_counter=info,ort=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if config_found {
        info!("✓ Configuration loaded from {}", cli.config);
    } else {
        warn!("Config file {} not found, using defaults", cli.config);
    }
    config.validate()?;

    match cli.command {
        Command::Pushup(_) => run_pushup(&config),
        Command::Skip(_) => run_skip(&config),
    }
}

fn run_pushup(config: &Config) -> Result<()> {
    info!("💪 Push-up counter starting");
    info!(
        "Thresholds: up>{:.0}°, down<{:.0}°, good posture>={:.0}°, visibility>{:.2}, side={:?}",
        config.pushup.up_angle_deg,
        config.pushup.down_angle_deg,
        config.pushup.good_posture_angle_deg,
        config.pushup.min_visibility,
        config.pushup.side
    );

    let mut estimator = PoseEstimator::new(config.model.clone())?;
    let input = CaptureInput::from_config(&config.capture);
    let mut reader = VideoReader::open(&input, &config.capture, config.pushup.mirror)?;
    let mut output = VideoOutput::create(
        Path::new(&config.pushup.video_path),
        &config.pushup.fourcc,
        reader.width,
        reader.height,
        reader.fps,
        &config.display,
        "Pushup Counter",
    )?;

    let mut session = PushupSession::new(config.pushup.clone());
    let report = pipeline::run(&mut reader, &mut estimator, &mut output, &mut session)?;
    log_report(&report, &reader);
    info!("Recording finished. Video saved as {}", output.path().display());
    drop(output);
    drop(reader);

    for event in session.events() {
        debug!(
            "  rep #{} {:?} at {:.1}s (elbow={:.0}°, torso={:.0}°)",
            event.index,
            event.quality,
            event.timestamp_ms / 1000.0,
            event.elbow_angle,
            event.torso_angle
        );
    }
    let counter = session.counter();
    info!(
        "Correct Pushups: {}, Bad Pushups: {}",
        counter.correct(),
        counter.bad()
    );

    summary::finish_pushup(
        &report,
        &session,
        Path::new(&config.pushup.log_path),
        Local::now(),
    )?;
    Ok(())
}

fn run_skip(config: &Config) -> Result<()> {
    info!("🦘 Jump-rope counter starting");
    info!(
        "Calibration {:.1}s (min {} samples), EMA alpha {:.2}, min airtime {:.0}ms, ankle asymmetry <= {:.3}",
        config.skip.calibration_secs,
        config.skip.min_calibration_samples,
        config.skip.ema_alpha,
        config.skip.min_airtime_ms,
        config.skip.ankle_asymmetry_max
    );

    let mut estimator = PoseEstimator::new(config.model.clone())?;
    let input = CaptureInput::from_config(&config.capture);
    let mut reader = VideoReader::open(&input, &config.capture, config.skip.mirror)?;

    let session_id = summary::session_id(Local::now());
    let paths = SkipOutputPaths::new(Path::new(&config.skip.output_dir), &session_id);
    let mut output = VideoOutput::create(
        &paths.video,
        &config.skip.fourcc,
        reader.width,
        reader.height,
        reader.fps,
        &config.display,
        "Skipping Rope Counter",
    )?;

    let mut session = SkipSession::new(config.skip.clone());
    let report = pipeline::run(&mut reader, &mut estimator, &mut output, &mut session)?;
    log_report(&report, &reader);
    drop(output);
    drop(reader);

    summary::finish_skip(&report, &session, &paths, config.skip.write_jump_log)?;

    info!(
        "✅ Test finished. Video: {}, CSV: {}, Jumps: {}",
        paths.video.display(),
        paths.csv.display(),
        session.jump_count()
    );
    Ok(())
}

fn log_report(report: &RunReport, reader: &VideoReader) {
    let metrics = &report.metrics;
    info!("\n========================================");
    info!("Session ended: {:?}", report.end_reason);
    info!("  Frames processed: {}", metrics.total_frames);
    info!(
        "  Frames with pose: {} ({:.1}%)",
        metrics.frames_with_pose,
        metrics.pose_coverage()
    );
    if metrics.oracle_failures > 0 {
        info!("  Pose detection failures: {}", metrics.oracle_failures);
    }
    if reader.total_frames > 0 {
        info!("  Input consumed: {:.1}%", reader.progress());
    }
    info!(
        "  Duration: {:.1}s ({:.1} FPS)",
        metrics.elapsed_secs, metrics.fps
    );
    info!(
        "  Last frame at {:.1}s of input",
        report.last_timestamp_ms / 1000.0
    );
    info!("========================================\n");
}
