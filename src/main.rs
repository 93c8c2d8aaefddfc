// Camera Sensor Simulation - Main Entry Point
//
// Headless by default: runs the simulation for a fixed number of ticks and
// prints statistics. `--window` presents the visualized sensor instead.

use std::path::PathBuf;
use std::sync::Arc;

use camsim::config::SimConfig;
use camsim::display::{run_window, SimulatedDisplays, WindowConfig};
use camsim::sensor::{capture, ConsumerKind, SensorRegistry};
use camsim::sim::Simulation;

fn print_usage() {
    println!("Usage: camsim [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <PATH>   Configuration file (default: camsim.toml, created if missing)");
    println!("  --ticks <N>       Ticks to simulate headless (default: 600)");
    println!("  --capture         Save client-distributed frames under captures/");
    println!("  --window          Present the visualized sensor in a window");
    println!("  -h, --help        Show this help");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("Camera Sensor Simulation (camsim) v0.1.0");
    println!("=========================================");
    println!();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut config_path: Option<PathBuf> = None;
    let mut ticks: u64 = 600;
    let mut capture_frames = false;
    let mut windowed = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.get(i).ok_or("--config requires a path")?;
                config_path = Some(PathBuf::from(path));
            }
            "--ticks" => {
                i += 1;
                ticks = args.get(i).ok_or("--ticks requires a number")?.parse()?;
            }
            "--capture" => capture_frames = true,
            "--window" => windowed = true,
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let config = match &config_path {
        Some(path) => SimConfig::load_from(path)?,
        None => SimConfig::load_or_default(),
    };
    println!(
        "Configuration: {} sensor(s), tick rate {} Hz, profile '{}'",
        config.sensors.len(),
        config.simulation.tick_rate,
        config.environment.active_profile
    );
    println!();

    if windowed {
        println!("Press Escape or the close button to exit.");
        println!();

        run_window(WindowConfig::new(), config)?;

        println!("Window closed.");
        return Ok(());
    }

    // Headless runs still expose one virtual display so sensors configured
    // for direct output can route
    let registry = SensorRegistry::with_builtin();
    let displays = SimulatedDisplays::single(1920, 1080, 60);
    let mut sim = Simulation::from_config(&config, &registry, Box::new(displays))?;

    if capture_frames {
        let capture_dir = PathBuf::from("captures");
        println!("Capturing frames to '{}'", capture_dir.display());
        sim.subscribe(
            ConsumerKind::Client,
            Arc::new(move |frame| {
                if let Err(err) = capture::save_frame(frame, &capture_dir) {
                    log::error!(
                        "failed to save frame {} from sensor {}: {}",
                        frame.frame_id,
                        frame.sensor,
                        err
                    );
                }
            }),
        );
    }

    sim.initialize()?;

    println!("Running {} ticks...", ticks);
    sim.run_for(ticks);

    println!();
    println!("Simulation finished at t = {:.2} s", sim.current_time());
    println!("  Frames published:  {}", sim.hub().published());
    println!("  Frames delivered:  {}", sim.hub().delivered());
    println!("  Renders completed: {}", sim.renderer().renders_completed());

    Ok(())
}
