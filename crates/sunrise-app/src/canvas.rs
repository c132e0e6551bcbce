//! [`Canvas`] over an egui painter.

use std::collections::HashMap;

use eframe::egui::{self, Color32, Painter, Pos2, TextureHandle, TextureId, TextureOptions};
use glam::Vec2;
use sunrise_sky::color::to_rgba8;
use sunrise_sky::{Canvas, Color, PatchImage};

const TEXT_SIZE: f32 = 14.0;

/// Patch textures uploaded so far, keyed by image id.
///
/// Regenerated fields carry new image ids, so the whole cache is dropped
/// when the field generation changes.
#[derive(Default)]
pub struct TextureCache {
    generation: Option<u64>,
    handles: HashMap<u64, TextureHandle>,
}

impl TextureCache {
    /// Forget every texture if `generation` differs from the cached one.
    pub fn sync(&mut self, generation: u64) {
        if self.generation != Some(generation) {
            self.handles.clear();
            self.generation = Some(generation);
        }
    }

    /// Texture for `image`, uploading it on first use.
    pub fn texture(&mut self, ctx: &egui::Context, image: &PatchImage) -> TextureId {
        self.handles
            .entry(image.id())
            .or_insert_with(|| {
                let size = [image.width() as usize, image.height() as usize];
                let pixels = egui::ColorImage::from_rgba_unmultiplied(size, image.pixels());
                ctx.load_texture(format!("patch-{}", image.id()), pixels, TextureOptions::NEAREST)
            })
            .id()
    }
}

/// Draws into a painter clipped to the scene rect.
pub struct EguiCanvas<'a> {
    painter: &'a Painter,
    origin: Pos2,
    textures: &'a mut TextureCache,
}

impl<'a> EguiCanvas<'a> {
    pub fn new(painter: &'a Painter, origin: Pos2, textures: &'a mut TextureCache) -> Self {
        Self {
            painter,
            origin,
            textures,
        }
    }

    fn pos(&self, p: Vec2) -> Pos2 {
        self.origin + egui::vec2(p.x, p.y)
    }
}

fn color32(color: Color) -> Color32 {
    let [r, g, b, _] = to_rgba8(color, 255);
    Color32::from_rgb(r, g, b)
}

impl Canvas for EguiCanvas<'_> {
    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color) {
        let rect = egui::Rect::from_min_size(self.pos(min), egui::vec2(size.x, size.y));
        self.painter.rect_filled(rect, 0.0, color32(color));
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color) {
        self.painter.add(egui::Shape::ellipse_filled(
            self.pos(center),
            egui::vec2(radii.x, radii.y),
            color32(color),
        ));
    }

    fn line(&mut self, from: Vec2, to: Vec2, color: Color) {
        self.painter.line_segment(
            [self.pos(from), self.pos(to)],
            egui::Stroke::new(1.0, color32(color)),
        );
    }

    fn image(&mut self, image: &PatchImage, top_left: Vec2) {
        let texture = self.textures.texture(self.painter.ctx(), image);
        let rect = egui::Rect::from_min_size(
            self.pos(top_left),
            egui::vec2(image.width() as f32, image.height() as f32),
        );
        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
        self.painter.image(texture, rect, uv, Color32::WHITE);
    }

    fn text(&mut self, pos: Vec2, text: &str, color: Color) {
        self.painter.text(
            self.pos(pos),
            egui::Align2::LEFT_TOP,
            text,
            egui::FontId::monospace(TEXT_SIZE),
            color32(color),
        );
    }
}
