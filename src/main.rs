//! Slingshot headless runner
//!
//! Plays one shot (or a scripted input file) against the classic scene and
//! reports the outcome.
//!
//! Usage:
//!   slingshot --drag-x -50 --drag-y -20 --frames 600
//!   slingshot --script shots/opening.json --tuning tuning.json --json

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use glam::Vec2;

use slingshot::sim::{FrameView, World};
use slingshot::{ReplayScript, Tuning};

#[derive(Parser, Debug)]
#[command(about = "Run the slingshot simulation headless", version, author)]
struct Args {
    /// Tuning JSON (defaults when omitted or unreadable)
    #[arg(long)]
    tuning: Option<PathBuf>,
    /// Replay script JSON; overrides the drag options
    #[arg(long)]
    script: Option<PathBuf>,
    /// Drag offset from the anchor, x
    #[arg(long, default_value_t = -50.0, allow_hyphen_values = true)]
    drag_x: f32,
    /// Drag offset from the anchor, y
    #[arg(long, default_value_t = -20.0, allow_hyphen_values = true)]
    drag_y: f32,
    /// Idle frames simulated after release
    #[arg(long, default_value_t = 600)]
    frames: usize,
    /// Print the final frame view as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    log::info!("Slingshot (headless) starting...");

    let tuning = match &args.tuning {
        Some(path) => {
            let (tuning, err) = Tuning::load_or_default(path);
            if let Some(e) = err {
                log::warn!("Using default tuning: {e}");
            }
            tuning
        }
        None => Tuning::default(),
    };
    for warning in tuning.validate() {
        log::warn!("tuning: {warning}");
    }

    let mut world = World::new(tuning);
    let script = match &args.script {
        Some(path) => ReplayScript::load_from_file(path)
            .map_err(anyhow::Error::msg)
            .context("load replay script")?,
        None => ReplayScript::shot(world.anchor, Vec2::new(args.drag_x, args.drag_y), args.frames),
    };
    if script.is_empty() {
        anyhow::bail!("replay script has no frames");
    }

    let digests = script.run(&mut world);
    log::info!("Simulated {} frames", digests.len());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&FrameView::capture(&world))?);
    } else {
        let alive = world.targets.iter().filter(|t| t.alive).count();
        println!(
            "frames: {}  score: {}  targets left: {}/{}  projectile: {:?}",
            world.frame,
            world.score,
            alive,
            world.targets.len(),
            world.projectile.state
        );
    }
    Ok(())
}
