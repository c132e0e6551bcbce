//! eframe glue: input, resize, tick scheduling and painting.

use std::time::Instant;

use eframe::egui;
use sunrise_sky::{Action, Scene, ViewportExtent, WindowRequest};
use tracing::error;

use crate::canvas::{EguiCanvas, TextureCache};

/// Owns the scene for the lifetime of the window.
pub struct SunriseApp {
    scene: Scene,
    textures: TextureCache,
}

impl SunriseApp {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            textures: TextureCache::default(),
        }
    }
}

impl eframe::App for SunriseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let (events, fullscreen) = ctx.input(|i| {
            (
                i.events.clone(),
                i.viewport().fullscreen.unwrap_or(false),
            )
        });
        for action in actions_from_events(&events) {
            if let Some(WindowRequest::ToggleFullscreen) = self.scene.apply(action, now) {
                ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(!fullscreen));
            }
        }

        if let Err(e) = self.scene.resize(viewport_extent(ctx.screen_rect())) {
            error!("Failed to regenerate the sky: {e}");
            std::process::exit(1);
        }

        self.scene.poll(now, Instant::now);

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let painter = ui.painter_at(rect);
                self.textures.sync(self.scene.state().generation);
                let mut canvas = EguiCanvas::new(&painter, rect.min, &mut self.textures);
                self.scene.render(&mut canvas);
            });

        if let Some(delay) = self.scene.time_until_due(Instant::now()) {
            ctx.request_repaint_after(delay);
        }
    }
}

/// Typed characters that map to scene actions, in order.
pub fn actions_from_events(events: &[egui::Event]) -> Vec<Action> {
    events
        .iter()
        .filter_map(|event| match event {
            egui::Event::Text(text) => Some(text.chars()),
            _ => None,
        })
        .flatten()
        .filter_map(Action::from_key)
        .collect()
}

/// Whole-pixel extent of the drawable area.
pub fn viewport_extent(rect: egui::Rect) -> ViewportExtent {
    let size = rect.size();
    ViewportExtent::new(size.x.max(0.0).round() as u32, size.y.max(0.0).round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_keys_become_actions() {
        let events = vec![
            egui::Event::Text(" ".to_string()),
            egui::Event::Text("x".to_string()),
            egui::Event::Text("+-".to_string()),
            egui::Event::PointerGone,
            egui::Event::Text("m".to_string()),
        ];
        assert_eq!(
            actions_from_events(&events),
            vec![
                Action::TogglePause,
                Action::FasterFps,
                Action::SlowerFps,
                Action::ToggleMoon
            ]
        );
    }

    #[test]
    fn test_viewport_extent_rounds() {
        let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(1023.6, 767.4));
        assert_eq!(viewport_extent(rect), ViewportExtent::new(1024, 767));
        assert!(viewport_extent(egui::Rect::NOTHING).is_empty());
    }
}
