//! Lucid Maze headless runner
//!
//! Usage: `lucid-maze [seed] [config.json]`
//!
//! Plays one seeded session with a scripted tilt pattern and logs how it
//! went. Set `RUST_LOG=debug` to follow transitions and bonuses.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host drives the library directly
}

/// Longest session the runner plays (ten minutes at the nominal rate)
#[cfg(not(target_arch = "wasm32"))]
const MAX_STEPS: u64 = 10 * 60 * 60;

#[cfg(not(target_arch = "wasm32"))]
fn run() -> lucid_maze::Result<()> {
    use glam::Vec2;
    use lucid_maze::SimConfig;
    use lucid_maze::consts::SIM_DT;
    use lucid_maze::sim::{SimPhase, Simulation, StepInput, step};

    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(arg) => arg
            .parse::<u64>()
            .map_err(|_| lucid_maze::Error::invalid_config(format!("seed must be an integer, got {arg:?}")))?,
        None => 42,
    };
    let config = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .map_err(|e| lucid_maze::Error::invalid_config(format!("cannot read {path}: {e}")))?;
            SimConfig::from_json(&json)?
        }
        None => SimConfig::default(),
    };

    log::info!("Lucid Maze (headless) starting, seed {seed}");
    let mut sim = Simulation::new(config, Vec2::new(1080.0, 1920.0), seed)?;

    let mut collected = 0.0;
    let mut transitions = 0;
    let mut wall_hits = 0;
    while sim.phase() == SimPhase::Running && sim.steps() < MAX_STEPS {
        // Slow figure-eight tilt
        let t = sim.steps() as f32 * SIM_DT;
        let input = StepInput {
            steer: Vec2::new((t * 0.7).sin() * 6.0, (t * 1.3).sin() * 6.0),
            pause: false,
        };
        let outcome = step(&mut sim, &input, SIM_DT);
        collected += outcome.collected;
        transitions += usize::from(outcome.transition.is_some());
        wall_hits += usize::from(outcome.wall_hit);
    }

    log::info!(
        "Finished: {:?} after {} steps, lucidity {:.3} ({:?}), {} transitions, {} wall hits, {:.2} lucidity collected",
        sim.phase(),
        sim.steps(),
        sim.lucidity(),
        sim.config_state(),
        transitions,
        wall_hits,
        collected
    );
    Ok(())
}
