use std::path::PathBuf;
use std::process;

use clap::Parser;
use kiss3d::light::Light;
use kiss3d::window::Window;
use log::{error, info};
use nalgebra::Point3;

use sun_and_moons::config::{read_file, SceneConfig};
use sun_and_moons::gui::Simulation;

/// A spinning sun with a handful of moons. Hover to highlight, click the sun
/// or the fourth moon to fly to it, and press H (or the Home button) to come
/// back.
#[derive(Debug, Parser)]
struct Args {
    /// Scene description (TOML). Defaults to the stock scene.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Fixes the moon sizes and starting angles.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match read_file(path) {
            Ok(config) => {
                info!("Loaded scene from {}", path.display());
                config
            }
            Err(e) => {
                error!("{}", e);
                process::exit(1);
            }
        },
        None => SceneConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let mut window = Window::new("Sun and Moons");
    window.set_light(Light::Absolute(Point3::from(config.light.position)));
    window.set_framerate_limit(Some(60));
    let bg = config.camera.background;
    window.set_background_color(bg.x, bg.y, bg.z);

    match Simulation::new(&config, &mut window) {
        Ok(simulation) => window.render_loop(simulation),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}
