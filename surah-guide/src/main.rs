// Surah hand guidance
// Steers a hand to a selected object with glove, voice or tone feedback

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use surah_core::{BoundingBox, GuidanceConfig, GuidanceMode};
use surah_eye::{FrameSink, HighGuiSink, NullSink, OnnxHandLandmarker, OpenCvCamera, OpenCvTracker};
use surah_guide::{Collaborators, GuidanceOrchestrator, SessionReport};
use surah_spk::{CommandSpeech, CpalTone, HapticDevice, MutedSpeech, SerialGlove, SpeechOutput, ToneDevice};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "surah-guide")]
#[command(about = "Guide a hand to a selected object", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one guidance session towards a selected box
    Run {
        /// Target box as x,y,width,height in camera pixels
        #[arg(long)]
        target: BoundingBox,

        /// Name drawn next to the target
        #[arg(long, default_value = "target")]
        label: String,

        /// Guidance mode (haptic, spoken, tone, none)
        #[arg(long)]
        mode: Option<GuidanceMode>,

        /// Run without a window
        #[arg(long)]
        headless: bool,

        /// Print the session report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate and print the effective configuration
    CheckConfig,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<GuidanceConfig> {
    let mut config = match path {
        Some(path) => GuidanceConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => GuidanceConfig::default(),
    };
    config.apply_env().context("Invalid environment override")?;
    Ok(config)
}

fn build_session(
    config: GuidanceConfig,
    target: BoundingBox,
    label: String,
) -> anyhow::Result<GuidanceOrchestrator> {
    let camera = OpenCvCamera::open(&config.camera).context("Camera unavailable")?;
    let landmarks = OnnxHandLandmarker::from_config(&config.landmarks).context("Hand landmark model unavailable")?;

    let speech: Arc<dyn SpeechOutput> = match config.guidance_mode {
        GuidanceMode::None => Arc::new(MutedSpeech),
        _ => Arc::new(CommandSpeech::new(&config.speech)),
    };

    let haptic: Option<Box<dyn HapticDevice>> = match config.guidance_mode {
        GuidanceMode::Haptic => Some(Box::new(SerialGlove::open(&config.haptic)?)),
        _ => None,
    };

    let tone: Option<Box<dyn ToneDevice>> = match config.guidance_mode {
        GuidanceMode::Tone => Some(Box::new(CpalTone::open()?)),
        _ => None,
    };

    let sink: Box<dyn FrameSink> = if config.display.headless {
        Box::new(NullSink::default())
    } else {
        Box::new(HighGuiSink::new(config.display.window_title.clone()))
    };

    let collaborators = Collaborators {
        camera: Box::new(camera),
        tracker: Box::new(OpenCvTracker::new()),
        landmarks: Box::new(landmarks),
        speech,
        haptic,
        tone,
        sink,
    };

    Ok(GuidanceOrchestrator::new(config, collaborators, target, label)?)
}

fn print_report(report: &SessionReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::CheckConfig => {
            if let Err(e) = config.validate() {
                bail!("Invalid configuration: {}", e);
            }
            print!("{}", config.to_toml()?);
        }
        Commands::Run {
            target,
            label,
            mode,
            headless,
            json,
        } => {
            if let Some(mode) = mode {
                config.guidance_mode = mode;
            }
            if headless {
                config.display.headless = true;
            }
            if let Err(e) = config.validate() {
                bail!("Invalid configuration: {}", e);
            }

            let mut orchestrator = tokio::task::spawn_blocking(move || build_session(config, target, label)).await??;
            let stop = orchestrator.stop_handle();
            let mut session = tokio::task::spawn_blocking(move || orchestrator.run());

            let report = tokio::select! {
                result = &mut session => result??,
                _ = tokio::signal::ctrl_c() => {
                    warn!("Interrupted, finishing guidance");
                    stop.deactivate();
                    session.await??
                }
            };

            info!("Guidance finished: {}", report.outcome);
            print_report(&report, json)?;
        }
    }

    Ok(())
}
