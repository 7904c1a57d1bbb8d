//! TurtleInk demo runner.
//!
//! Usage: `turtleink-demo [spiral|fill|race|all] [window-config.json]`

mod demos;

use demos::Demo;
use std::process::ExitCode;
use std::time::Duration;
use turtleink_core::{Window, WindowConfig};

fn load_config(path: Option<&str>) -> Result<WindowConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            Ok(WindowConfig::from_json(&json)?)
        }
        None => Ok(WindowConfig::new().with_frame_interval(Duration::from_millis(4))),
    }
}

#[cfg(feature = "vello-renderer")]
fn run(demo: Demo, config: WindowConfig) -> Result<(), Box<dyn std::error::Error>> {
    let surface = turtleink_render::SceneSurface::default();
    let window = Window::with_surface(config, surface.clone())?;
    demo.run(&window)?;
    log::info!("Window: {}", serde_json::to_string(&window.geometry()?)?);
    log::info!(
        "Rendered {} frame(s), {} primitive(s) on canvas",
        surface.frame_count()?,
        surface.display_list()?.len()
    );
    window.dispose()?;
    Ok(())
}

#[cfg(not(feature = "vello-renderer"))]
fn run(demo: Demo, config: WindowConfig) -> Result<(), Box<dyn std::error::Error>> {
    let surface = turtleink_core::RecordingSurface::new();
    let window = Window::with_surface(config, surface.clone())?;
    demo.run(&window)?;
    log::info!("Window: {}", serde_json::to_string(&window.geometry()?)?);
    log::info!(
        "Recorded {} event(s), {} primitive(s) on canvas",
        surface.events().len(),
        surface.primitives().len()
    );
    window.dispose()?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let name = args.first().map(String::as_str).unwrap_or("all");
    let Some(demo) = Demo::parse(name) else {
        eprintln!("Unknown demo '{}'. Expected spiral, fill, race or all.", name);
        return ExitCode::FAILURE;
    };

    let config = match load_config(args.get(1).map(String::as_str)) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load window config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    log::info!("Running {:?} demo", demo);
    match run(demo, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Demo failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
