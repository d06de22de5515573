use anyhow::{Context, Result};
use clap::Parser;
use hand2uinput::config::{Config, Preset};
use hand2uinput::detector::DetectorProcess;
use hand2uinput::frame_loop::Controller;
use hand2uinput::inject::{KeyInjector, LogInjector};
use log::info;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "hand2uinput", about = "Play piano tiles with your fingertips")]
struct Cli {
    /// YAML config file (default: ./config.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Built-in layout to start from; overrides the config file's preset
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// Minimum delay between repeated up/down taps, in milliseconds
    #[arg(long)]
    repeat_ms: Option<u64>,

    /// Log key events instead of injecting them
    #[arg(long)]
    dry_run: bool,

    /// Read detector frames from this file instead of stdin
    #[arg(long, conflicts_with = "detector")]
    input: Option<PathBuf>,

    /// Detector program to spawn; frames are read from its stdout
    #[arg(long)]
    detector: Option<PathBuf>,

    /// Extra arguments for the detector program
    #[arg(last = true)]
    detector_args: Vec<String>,

    /// Log every key decision
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => {
            let path = PathBuf::from("config.yaml");
            if path.exists() {
                Config::load(&path)?
            } else {
                Config::default()
            }
        }
    };
    let mut settings = config.resolve(cli.preset)?;
    if let Some(ms) = cli.repeat_ms {
        settings.repeat_interval = Duration::from_millis(ms);
        settings.validate()?;
    }
    info!(
        "frame {}x{}, mirror {:?}, repeat every {:?}",
        settings.frame.width, settings.frame.height, settings.mirror, settings.repeat_interval
    );

    let injector = make_injector(cli.dry_run, &settings.device_name)?;
    let mut controller = Controller::new(settings, injector);

    let summary = match (&cli.detector, &cli.input) {
        (Some(program), _) => {
            let mut detector = DetectorProcess::spawn(program.as_os_str(), cli.detector_args.as_slice())?;
            let (frames, mut overlay) = detector.pipes()?;
            controller.run(frames, Some(&mut overlay))?
        }
        (None, Some(path)) => {
            let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
            controller.run(BufReader::new(file), None)?
        }
        (None, None) => controller.run(io::stdin().lock(), None)?,
    };
    if summary.injection_errors > 0 {
        log::warn!("{} key event(s) could not be injected", summary.injection_errors);
    }
    Ok(())
}

#[cfg(all(target_os = "linux", feature = "uinput"))]
fn make_injector(dry_run: bool, device_name: &str) -> Result<Box<dyn KeyInjector>> {
    if dry_run {
        return Ok(Box::new(LogInjector));
    }
    Ok(Box::new(hand2uinput::linux::UInputInjector::new(device_name)?))
}

#[cfg(not(all(target_os = "linux", feature = "uinput")))]
fn make_injector(dry_run: bool, _device_name: &str) -> Result<Box<dyn KeyInjector>> {
    if !dry_run {
        log::warn!("built without the `uinput` feature on Linux; logging key events only");
    }
    Ok(Box::new(LogInjector))
}
