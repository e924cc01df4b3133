//! Reflection demo.
//!
//! Loads a scene file, then walks the main camera along the corridor for a
//! few frames, printing every draw and the visibility listing of each frame.
//!
//! Usage: cargo run -p galaxy3d_demo -- [scene.toml] [--frames N] [--verbose|-v]

mod console_renderer;

use colored::Colorize;
use console_renderer::ConsoleRenderer;
use galaxy_3d_reflections::galaxy3d::config::SceneConfig;
use galaxy_3d_reflections::galaxy3d::log::{DefaultLogger, LogSeverity};
use galaxy_3d_reflections::galaxy3d::render::Renderer;
use galaxy_3d_reflections::galaxy3d::{Engine, FramePhases, ReflectionManager};
use galaxy_3d_reflections::glam::Vec3;
use std::sync::{Arc, Mutex};

const DEFAULT_SCENE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/scenes/facing_mirrors.toml");
const DEFAULT_FRAMES: u32 = 3;

struct Options {
    scene: String,
    frames: u32,
    verbose: bool,
}

fn parse_args() -> Result<Options, Box<dyn std::error::Error>> {
    let mut options = Options {
        scene: DEFAULT_SCENE.to_string(),
        frames: DEFAULT_FRAMES,
        verbose: false,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" | "-v" => options.verbose = true,
            "--frames" => {
                let value = args.next().ok_or("--frames needs a value")?;
                options.frames = value.parse()?;
            }
            _ => options.scene = arg,
        }
    }
    Ok(options)
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let options = parse_args()?;
    if options.verbose {
        Engine::set_logger(DefaultLogger::with_min_severity(LogSeverity::Trace));
    }

    let config = SceneConfig::load_from_file(&options.scene)?;
    println!("{} {} ({} mirror(s), depth {})", "Scene".bold(), options.scene,
        config.mirrors.len(), config.max_recursion_depth);

    let console = Arc::new(Mutex::new(ConsoleRenderer::new(options.verbose)));
    let renderer: Arc<Mutex<dyn Renderer>> = console.clone();
    let mut manager = ReflectionManager::from_config(&config, renderer)?;

    let start = manager.main_camera()?.position();
    for frame in 0..options.frames {
        // Step back along the corridor, keeping the first mirror in view
        let position = start + Vec3::new(0.0, 0.25 * frame as f32, 0.5 * frame as f32);
        let main = manager.main_camera_mut()?;
        main.set_position(position);
        main.look_at(Vec3::ZERO, Vec3::Y);

        println!();
        println!("{}", format!("Frame {}", frame).bold().underline());
        manager.run_frame()?;

        let draws = console
            .lock()
            .map_err(|_| "console renderer lock poisoned")?
            .take_draw_count();
        print!("{}", manager.report());
        println!("{} {} reflection view(s) drawn", "=>".green(), draws);
    }

    println!();
    manager.shutdown()?;
    Ok(())
}
