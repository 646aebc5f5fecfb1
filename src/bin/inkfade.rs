use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use inkfade::{
    CameraPose, DissolveConfig, Frame, MemoryScene, ParticleTemplate, Quat, Rgba, SceneStats,
    SessionSnapshot, StrokeDissolver, Vec3,
};

#[derive(Parser, Debug)]
#[command(name = "inkfade", version)]
struct Cli {
    /// Log conversion internals to stderr (repeat for more).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one stroke conversion headless and print a JSON report.
    Simulate(SimulateArgs),
    /// Print the default config as JSON.
    Config,
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Dissolve config JSON; defaults are used for missing fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stroke points as `x,y,z;x,y,z;...`.
    #[arg(long)]
    points: String,

    /// Fixed frame step in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// RNG seed.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Camera position as `x,y,z`.
    #[arg(long, default_value = "0,0,-10")]
    camera: String,

    /// Give up after this many frames.
    #[arg(long, default_value_t = 100_000)]
    max_frames: u64,

    /// Include per-frame snapshots in the report.
    #[arg(long, default_value_t = false)]
    trace: bool,

    /// Write the report here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, serde::Serialize)]
struct FrameTrace {
    frame: u64,
    time: f32,
    live_particles: usize,
    active_decays: usize,
    sessions: Vec<SessionSnapshot>,
}

#[derive(Debug, serde::Serialize)]
struct Report {
    accepted: bool,
    frames: u64,
    simulated_seconds: f32,
    finished: bool,
    target_particles: usize,
    stats: SceneStats,
    trace: Vec<FrameTrace>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Simulate(args) => cmd_simulate(args),
        Command::Config => {
            println!("{}", DissolveConfig::default().to_json_pretty()?);
            Ok(())
        }
    }
}

fn parse_vec3(s: &str) -> anyhow::Result<Vec3> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("parse point '{s}'"))?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => anyhow::bail!("point '{s}' must have exactly 3 components"),
    }
}

fn parse_points(s: &str) -> anyhow::Result<Vec<Vec3>> {
    s.split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(parse_vec3)
        .collect()
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let cfg = match &args.config {
        Some(path) => DissolveConfig::from_path(path)?,
        None => DissolveConfig::default(),
    };
    if !args.dt.is_finite() || args.dt <= 0.0 {
        anyhow::bail!("--dt must be a positive number of seconds");
    }
    let points = parse_points(&args.points)?;
    let camera = CameraPose {
        position: parse_vec3(&args.camera).context("parse --camera")?,
        rotation: Quat::IDENTITY,
    };

    let mut scene = MemoryScene::new(ParticleTemplate::default());
    let stroke = scene.add_stroke(points, Rgba::rgb(0.05, 0.05, 0.05));
    let mut dissolver = StrokeDissolver::with_seed(cfg, args.seed)?;
    dissolver.begin_conversion(&mut scene, stroke);

    let accepted = !dissolver.is_idle();
    let target_particles = dissolver
        .sessions()
        .first()
        .map_or(0, |s| s.target_particles());

    let frame = Frame::new(args.dt, camera);
    let mut trace = Vec::new();
    let mut frames = 0u64;
    while !dissolver.is_idle() && frames < args.max_frames {
        dissolver.tick(&mut scene, &frame);
        scene.end_frame();
        frames += 1;
        if args.trace {
            trace.push(FrameTrace {
                frame: frames,
                time: frames as f32 * args.dt,
                live_particles: scene.particle_count(),
                active_decays: dissolver.decay_pool().len(),
                sessions: dissolver.snapshots(),
            });
        }
    }

    let report = Report {
        accepted,
        frames,
        simulated_seconds: frames as f32 * args.dt,
        finished: dissolver.is_idle(),
        target_particles,
        stats: scene.stats(),
        trace,
    };
    let json = serde_json::to_string_pretty(&report).context("serialize report")?;
    match &args.out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(path, json)
                .with_context(|| format!("write report '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
