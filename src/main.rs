//! Sway Stack headless runner
//!
//! Drives the simulation with a fixed-timestep loop and logs every event.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;

use sway_stack::Settings;
use sway_stack::consts::*;
use sway_stack::sim::{SwayEvent, SwayState, TickInput, tick};

/// Run a sway stack session without a renderer
#[derive(Parser, Debug)]
#[command(name = "sway-stack", author, version, about)]
struct Cli {
    /// Settings file (JSON); defaults are used when omitted
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write the effective settings to this file and exit
    #[arg(long)]
    write_settings: Option<PathBuf>,

    /// RNG seed
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Simulated duration in seconds
    #[arg(long, default_value_t = 60.0)]
    seconds: f32,

    /// Let the scripted player keep the stack upright
    #[arg(long)]
    autopilot: bool,

    /// Render frame rate used to feed the fixed-timestep accumulator
    #[arg(long, default_value_t = 30.0)]
    fps: f32,
}

#[derive(Debug, Default)]
struct Tally {
    phase_changes: u32,
    drops: u32,
}

/// Frame step for the accumulator; non-finite or out-of-range rates are clamped
fn frame_dt(fps: f32) -> f32 {
    let fps = if fps.is_nan() { 30.0 } else { fps.clamp(1.0, 1000.0) };
    1.0 / fps
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => match Settings::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("Failed to load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };

    if let Some(path) = &cli.write_settings {
        if let Err(e) = settings.save(path) {
            log::error!("Failed to write {}: {}", path.display(), e);
            std::process::exit(1);
        }
        log::info!("Settings written to {}", path.display());
        return;
    }

    log::info!("Sway Stack starting (seed {}, {}s)", cli.seed, cli.seconds);

    let mut state = SwayState::new(&settings, cli.seed);
    let tally = Rc::new(RefCell::new(Tally::default()));
    {
        let tally = tally.clone();
        state.subscribe(move |event| {
            let mut tally = tally.borrow_mut();
            match *event {
                SwayEvent::PhaseChanged { old, new } => {
                    tally.phase_changes += 1;
                    log::info!("[event] {} -> {} ({:?})", old, new, new.severity());
                }
                SwayEvent::ItemDropped { item, position, direction } => {
                    tally.drops += 1;
                    log::info!(
                        "[event] dropped {:?} at ({:.2}, {:.2}) heading {}",
                        item,
                        position.x,
                        position.y,
                        direction
                    );
                }
            }
        });
    }

    let input = TickInput {
        autopilot: cli.autopilot,
        ..Default::default()
    };
    let step = frame_dt(cli.fps);
    let total_ticks = (cli.seconds.max(0.0) * TICKS_PER_SEC as f32).round() as u64;
    let mut accumulator = 0.0;

    while state.time_ticks < total_ticks {
        accumulator += step;
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS && state.time_ticks < total_ticks {
            tick(&mut state, &input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;
        }
    }

    let tally = tally.borrow();
    println!("Simulated {} ticks ({:.1}s)", state.time_ticks, cli.seconds);
    println!(
        "Final phase: {} (gauge {:.2}), stack height {}",
        state.phase(),
        state.phase().gauge_value(),
        state.height()
    );
    println!(
        "Phase timer: {:.2}s remaining ({:?})",
        state.machine.countdown_secs(),
        state.machine.timer()
    );
    println!(
        "Phase changes: {}, items dropped: {}, still falling: {}",
        tally.phase_changes,
        tally.drops,
        state.falling.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_dt_is_always_positive_and_finite() {
        for fps in [f32::INFINITY, f32::NEG_INFINITY, f32::NAN, 0.0, -5.0, 1e9] {
            let dt = frame_dt(fps);
            assert!(dt.is_finite() && dt > 0.0, "{fps} -> {dt}");
        }
        assert!((frame_dt(30.0) - 1.0 / 30.0).abs() < 1e-7);
    }
}
