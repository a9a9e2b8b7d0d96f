// Replay Runtime - headless host for the island viewer navigation core
//
// Loads a scenario (navigable surfaces plus scripted per-frame input), drives a
// NavigationSession one animation frame at a time and prints the debug readout
// the in-page overlay would show.

mod scenario;

use std::{cell::Cell, path::PathBuf, rc::Rc};

use anyhow::Context;
use clap::Parser;
use islandvr::{debug_readout::format_position, NavigationConfig, NavigationSession};
use tracing::info;

use crate::scenario::Scenario;

#[derive(Parser)]
#[command(name = "replay_runtime")]
#[command(about = "Replays scripted desktop and VR input against the navigation core")]
struct Args {
    /// Scenario file (JSON) with surfaces and per-frame input
    #[arg(short, long)]
    scenario: PathBuf,

    /// Navigation config (TOML); defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<usize>,

    /// Only print the final readout
    #[arg(short, long)]
    quiet: bool,

    /// Print the effective navigation config and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> anyhow::Result<()> {
    engine::logging::init_logging("ISLANDVR_LOG");

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => NavigationConfig::load(path)
            .with_context(|| format!("loading navigation config {}", path.display()))?,
        None => NavigationConfig::default(),
    };

    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let scenario = Scenario::load(&args.scenario)?;
    let surfaces = scenario.build_surfaces()?;

    info!(
        "Replaying {} ({} surfaces, {} frames)",
        args.scenario.display(),
        surfaces.len(),
        scenario.frame_count()
    );

    let mut session = NavigationSession::new(config, scenario.viewport());
    session.set_navigable_surfaces(surfaces);

    // The in-page overlay would flip its visibility here
    let overlay_visible = Rc::new(Cell::new(false));
    let toggle = overlay_visible.clone();
    session.set_debug_toggle_callback(move || {
        toggle.set(!toggle.get());
        info!("Debug overlay {}", if toggle.get() { "shown" } else { "hidden" });
    });

    let quiet = args.quiet;
    let reports = engine::profile!(
        "replay",
        scenario::replay(&scenario, &mut session, args.frames, |report, session| {
            if quiet {
                return;
            }
            println!("frame {}", report.index);
            for destination in &report.teleports {
                println!("  teleported to {}", format_position(*destination));
            }
            println!("{}\n", indent(&session.debug_readout().to_string()));
        })
    );

    let teleports: usize = reports.iter().map(|r| r.teleports.len()).sum();
    let rotations: usize = reports.iter().map(|r| r.rotations).sum();

    println!("{} frames, {} teleports, {} turning frames", reports.len(), teleports, rotations);
    println!("{}", session.debug_readout());
    println!(
        "Overlay: {}",
        if overlay_visible.get() { "visible" } else { "hidden" }
    );

    Ok(())
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
