//! The `sunrise` binary: a resizable window showing the animated sky.

mod app;
mod canvas;

use std::time::Instant;

use eframe::egui;
use sunrise_config::{CliArgs, Config};
use sunrise_sky::{Scene, ViewportExtent};
use tracing::{error, info, warn};

use crate::app::SunriseApp;

fn main() {
    let args = CliArgs::parse_lenient(std::env::args_os());

    // A broken config file falls back to defaults, like a broken flag does.
    let (mut config, load_error) = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(e)),
        },
        None => (Config::default(), None),
    };
    config.apply_cli_overrides(&args);
    sunrise_log::init_logging(Some(&config));
    if let Some(e) = load_error {
        warn!("Ignoring config, using defaults: {e}");
    }

    let viewport = ViewportExtent::new(config.window.width, config.window.height);
    let scene = match Scene::new(&config, viewport, Instant::now()) {
        Ok(scene) => scene,
        Err(e) => {
            error!("Failed to build the scene: {e}");
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(config.window.title.clone())
            .with_inner_size([config.window.width as f32, config.window.height as f32])
            .with_resizable(true)
            .with_fullscreen(config.window.fullscreen),
        ..Default::default()
    };

    info!(
        "Starting {}x{}, tick {} ms",
        config.window.width, config.window.height, config.animation.tick_interval_ms
    );
    let result = eframe::run_native(
        &config.window.title,
        options,
        Box::new(move |_cc| Ok(Box::new(SunriseApp::new(scene)))),
    );
    if let Err(e) = result {
        error!("Window error: {e}");
        std::process::exit(1);
    }
}
