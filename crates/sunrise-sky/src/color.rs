//! Linear RGB colors and blending.

use glam::Vec3;

/// Linear RGB color with channels in `[0, 1]`.
pub type Color = Vec3;

/// Pure white.
pub const WHITE: Color = Vec3::ONE;
/// Pure black.
pub const BLACK: Color = Vec3::ZERO;
/// Pure red.
pub const RED: Color = Vec3::new(1.0, 0.0, 0.0);
/// Pure yellow.
pub const YELLOW: Color = Vec3::new(1.0, 1.0, 0.0);

/// Move `from` toward `to` by `t`. `t` is clamped to `[0, 1]`.
pub fn mix(from: Color, to: Color, t: f64) -> Color {
    from.lerp(to, (t as f32).clamp(0.0, 1.0))
}

/// A third of the way toward white.
pub fn lighter(color: Color) -> Color {
    mix(color, WHITE, 1.0 / 3.0)
}

/// Quantize to RGBA8 with the given alpha.
pub fn to_rgba8(color: Color, alpha: u8) -> [u8; 4] {
    let c = color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
    [c.x.round() as u8, c.y.round() as u8, c.z.round() as u8, alpha]
}
