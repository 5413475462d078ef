// LQR car simulator demo
//
// Picks a random initial state and target, runs the fixed-horizon
// simulation, and saves a trajectory summary, a handful of frames, and
// the position history plot.

use rand::Rng;

use car_lqr_sim::utils::CarVisualizer;
use car_lqr_sim::{CarState, SimConfig, SimResult, Simulation};

const OUT_DIR: &str = "img/car_lqr";

// Spawn region half extent [m]
const SPAWN_EXTENT: f64 = 4.0;

// Save one frame every this many ticks
const FRAME_INTERVAL: usize = 25;

fn main() -> SimResult<()> {
    let mut rng = rand::thread_rng();
    let initial = CarState::at_rest(
        rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT),
        rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT),
    );
    let target = CarState::at_rest(
        rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT),
        rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT),
    );

    println!("Initial state: {:?}", initial);
    println!("Target: {:?}", target);

    let config = SimConfig::default();
    let sim = Simulation::new(&config, target)?;
    println!(
        "Gain K = {:.4}",
        sim.controller().k
    );

    let visualizer = CarVisualizer::new(OUT_DIR);
    let mut trajectory = car_lqr_sim::Trajectory::new();
    for (time, state) in sim.states(initial) {
        trajectory.push(time, state);

        let tick = (time / config.dt).round() as usize;
        if tick % FRAME_INTERVAL == 0 {
            visualizer.render_frame(time, &state, &target, &format!("frame_{:04}.png", tick))?;
        }
    }

    let final_state = trajectory.final_state().unwrap_or(initial);
    println!(
        "Final state: x={:.3} [m], y={:.3} [m], v={:.3} [m/s]",
        final_state.x,
        final_state.y,
        final_state.speed()
    );

    visualizer.render_summary(&trajectory, &target, "car_lqr.png")?;
    visualizer.plot_state_history(&trajectory, &target, "car_lqr_history.svg")?;
    println!("Visualizations saved to: {}", OUT_DIR);
    println!("To create a GIF animation, run:");
    println!("  convert -delay 10 -loop 0 {}/frame_*.png {}/animation.gif", OUT_DIR, OUT_DIR);

    Ok(())
}
