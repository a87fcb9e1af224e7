use clap::Parser;
use log::info;

use caustica::driver;
use caustica::error::{Error, Result};
use caustica::math::INFINITE;
use caustica::scene::Scene;

mod cli;
mod logger;

use cli::Args;
use logger::init_logger;

fn main() {
    let args = Args::parse();

    init_logger(args.debug_level.clone().into());

    // Log application startup with version information
    info!("Caustica - Git Version {} ({})", env!("GIT_HASH"), env!("GIT_DATE"));

    if let Err(error) = run(&args) {
        eprintln!("ERROR: {error}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let mut scene = Scene::load(&args.scene, 0.0)?;
    if let Some(output) = &args.output {
        scene.set_out_file(output);
    }

    // some performance notices
    if scene.dispersion_mode() {
        info!("Rendering with dispersion effect. This will increase rendering time.");
    }
    if scene.camera().super_sampling_per_axis() > 1 {
        info!("Rendering with supersampling. This will increase rendering time.");
    } else if scene.camera().lens_size() != 0.0 {
        return Err(Error::Config("Depth of field needs supersampling.".to_string()));
    }
    if scene.sub_frames() > 1 {
        info!("Rendering with motion blur. This will increase rendering time.");
    }
    if scene.photon_map_scan_steps() > 0.0 {
        info!("Rendering with caustics. This will increase rendering time.");
    }

    if scene.frames() > 1 && scene.time() == INFINITE {
        info!(
            "Rendering animation: {} frames at {} fps",
            scene.frames(),
            scene.fps()
        );
    }

    driver::render(&scene)
}
