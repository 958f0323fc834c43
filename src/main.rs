//! Interactive field of spring-loaded 3D cubes, drawn in the terminal.

mod camera;
mod clock;
mod color;
mod config;
mod field;
mod graphics;
mod host;
mod logging;
mod math;
mod mesh;
mod pointer;
mod render;
mod scene;
mod simulator;
mod vertex;

use anyhow::Result;
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::clock::{Clock, FrameClock};
use crate::config::{is_constrained, load_settings, FieldConfig, Settings};
use crate::host::{Host, TerminalHost};
use crate::simulator::{Simulator, SimulatorOptions};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Frames per second to aim for
    #[arg(long)]
    fps: Option<u32>,

    /// Use the smaller, lighter field regardless of terminal size
    #[arg(long)]
    reduced_motion: bool,

    /// Seed for the per-cube spin; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Do not draw cube outlines
    #[arg(long)]
    no_edges: bool,

    /// JSON settings file
    #[arg(short('c'), long)]
    config: Option<PathBuf>,

    /// Directory for log files
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// The name of the log-file to use.
    #[arg(short('l'), long, default_value = "cubefield.log")]
    log_name: String,
}

/// Settings after layering defaults, the settings file and the command line
struct Resolved {
    fps: u32,
    reduced_motion: bool,
    seed: u64,
    show_edges: bool,
    settings: Settings,
}

fn resolve(args: &Args) -> Result<Resolved> {
    let settings = match &args.config {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };
    let seed = args.seed.or(settings.seed).unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_secs()
    });
    Ok(Resolved {
        fps: args.fps.or(settings.fps).unwrap_or(30).clamp(10, 120),
        reduced_motion: args.reduced_motion || settings.reduced_motion.unwrap_or(false),
        seed,
        show_edges: !args.no_edges && settings.show_edges.unwrap_or(true),
        settings,
    })
}

/// Runs the field on an opened surface.
///
/// A surface that could not be opened is logged and the program ends quietly.
fn run_field<H: Host, C: FrameClock>(
    host: Result<H>,
    clock: C,
    options: SimulatorOptions,
    rng: &mut StdRng,
) -> Result<()> {
    let host = match host {
        Ok(host) => host,
        Err(e) => {
            ftlog::error!("Could not open the terminal surface: {e:#}");
            return Ok(());
        }
    };
    Simulator::new(host, clock, options, rng)?.run()
}

fn main() -> Result<()> {
    let args = Args::parse();
    let resolved = resolve(&args)?;

    let (_guard, log_path) = logging::configure_logger(&args.log_dir, &args.log_name)?;
    ftlog::info!("Log file: {log_path:?}");

    let Some((columns, rows)) = TerminalHost::probe() else {
        ftlog::error!("No terminal surface available; background disabled");
        return Ok(());
    };

    let constrained = is_constrained(resolved.reduced_motion, columns);
    ftlog::info!(
        "Surface {columns}x{rows}, fps {}, seed {}, constrained {constrained}",
        resolved.fps,
        resolved.seed
    );

    let options = SimulatorOptions {
        field: FieldConfig::new(&resolved.settings.physics, constrained),
        fps: resolved.fps,
        show_edges: resolved.show_edges,
    };
    let mut rng = StdRng::seed_from_u64(resolved.seed);

    run_field(TerminalHost::begin(columns, rows), Clock::new(), options, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::host::HeadlessHost;

    #[test]
    fn command_line_overrides_defaults() {
        let args = Args::parse_from(["cubefield", "--fps", "500", "--seed", "9", "--no-edges"]);
        let resolved = resolve(&args).unwrap();
        assert_eq!(resolved.fps, 120);
        assert_eq!(resolved.seed, 9);
        assert!(!resolved.show_edges);
        assert!(!resolved.reduced_motion);
    }

    #[test]
    fn settings_file_fills_in_missing_flags() {
        let path = std::env::temp_dir().join(format!("cubefield-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "fps": 24, "reduced_motion": true, "seed": 5 }"#).unwrap();
        let args = Args::parse_from(["cubefield", "--config", path.to_str().unwrap(), "--seed", "6"]);
        let resolved = resolve(&args).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(resolved.fps, 24);
        assert!(resolved.reduced_motion);
        assert_eq!(resolved.seed, 6);
        assert!(resolved.show_edges);
    }

    fn options() -> SimulatorOptions {
        SimulatorOptions {
            field: FieldConfig::new(&Settings::default().physics, true),
            fps: 1000,
            show_edges: false,
        }
    }

    #[test]
    fn surface_that_fails_to_open_ends_quietly() {
        let mut rng = StdRng::seed_from_u64(1);
        let host: Result<HeadlessHost> = Err(anyhow::anyhow!("raw mode unavailable"));
        assert!(run_field(host, FixedClock::new(0.1), options(), &mut rng).is_ok());
    }

    #[test]
    fn opened_surface_runs_until_quit() {
        let mut rng = StdRng::seed_from_u64(1);
        let host = HeadlessHost::new(40, 20).then(vec![]);
        assert!(run_field(Ok(host), FixedClock::new(0.1), options(), &mut rng).is_ok());
    }

    #[test]
    fn invalid_physics_is_rejected_before_startup() {
        let path = std::env::temp_dir().join(format!("cubefield-bad-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "physics": { "damping": 1.2 } }"#).unwrap();
        let args = Args::parse_from(["cubefield", "--config", path.to_str().unwrap()]);
        let result = resolve(&args);
        std::fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }
}
