//! The drawing capability the compositor renders through.

use glam::{UVec2, Vec2};

use crate::color::Color;
use crate::patch::PatchImage;

/// Compositing stages, back to front.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// Sky fill.
    Background,
    /// Concentric glow around the sun.
    Halo,
    /// Milky-way patches.
    Nebula,
    /// Stars and their flares.
    Stars,
    /// Meteor streaks.
    Sparks,
    /// Sun disc.
    Sun,
    /// Moon disc and shadow.
    Moon,
    /// Cloud flocks.
    Clouds,
    /// Debug text.
    Overlay,
}

/// Primitive drawing operations, implemented by a rendering backend.
///
/// Positions are pixels with the origin at the top-left corner.
pub trait Canvas {
    /// Marks the start of a compositing stage.
    fn begin_layer(&mut self, _layer: Layer) {}

    /// Axis-aligned filled rectangle.
    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color);

    /// Filled ellipse.
    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color);

    /// One pixel wide line.
    fn line(&mut self, from: Vec2, to: Vec2, color: Color);

    /// Alpha-blended image.
    fn image(&mut self, image: &PatchImage, top_left: Vec2);

    /// Single line of text.
    fn text(&mut self, pos: Vec2, text: &str, color: Color);
}

/// A recorded drawing operation.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Stage marker.
    Layer(Layer),
    /// See [`Canvas::fill_rect`].
    Rect {
        /// Top-left corner.
        min: Vec2,
        /// Extent.
        size: Vec2,
        /// Fill color.
        color: Color,
    },
    /// See [`Canvas::fill_ellipse`].
    Ellipse {
        /// Center.
        center: Vec2,
        /// Horizontal and vertical radius.
        radii: Vec2,
        /// Fill color.
        color: Color,
    },
    /// See [`Canvas::line`].
    Line {
        /// Start point.
        from: Vec2,
        /// End point.
        to: Vec2,
        /// Stroke color.
        color: Color,
    },
    /// See [`Canvas::image`].
    Image {
        /// [`PatchImage::id`].
        id: u64,
        /// Top-left corner.
        top_left: Vec2,
        /// Image size.
        size: UVec2,
    },
    /// See [`Canvas::text`].
    Text {
        /// Anchor (top-left).
        pos: Vec2,
        /// Contents.
        text: String,
        /// Text color.
        color: Color,
    },
}

/// Canvas that records every call, for tests and headless inspection.
#[derive(Clone, Debug, Default)]
pub struct RecordingCanvas {
    /// Operations in call order.
    pub ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages in the order they were started.
    pub fn layers(&self) -> Vec<Layer> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Layer(layer) => Some(*layer),
                _ => None,
            })
            .collect()
    }

    /// Operations recorded inside `layer` (excluding the marker).
    pub fn ops_in(&self, layer: Layer) -> Vec<&DrawOp> {
        let mut current = None;
        self.ops
            .iter()
            .filter(|op| {
                if let DrawOp::Layer(l) = op {
                    current = Some(*l);
                    return false;
                }
                current == Some(layer)
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn begin_layer(&mut self, layer: Layer) {
        self.ops.push(DrawOp::Layer(layer));
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color) {
        self.ops.push(DrawOp::Rect { min, size, color });
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color) {
        self.ops.push(DrawOp::Ellipse {
            center,
            radii,
            color,
        });
    }

    fn line(&mut self, from: Vec2, to: Vec2, color: Color) {
        self.ops.push(DrawOp::Line { from, to, color });
    }

    fn image(&mut self, image: &PatchImage, top_left: Vec2) {
        self.ops.push(DrawOp::Image {
            id: image.id(),
            top_left,
            size: UVec2::new(image.width(), image.height()),
        });
    }

    fn text(&mut self, pos: Vec2, text: &str, color: Color) {
        self.ops.push(DrawOp::Text {
            pos,
            text: text.to_string(),
            color,
        });
    }
}
