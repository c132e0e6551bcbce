//! Back-to-front compositing of one frame.
//!
//! The compositor only reads [`SceneState`]. The sole writes are the
//! render-only cells on stars (flare counter) and clouds (dissolve factor).
//! Twinkle and sparks come from dice rolled once per tick, so repainting a
//! frame draws it the same way.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use sunrise_config::LightingConfig;

use crate::canvas::{Canvas, Layer};
use crate::color::{BLACK, Color, WHITE, lighter, mix};
use crate::lighting::{LightingModel, SkyPose, moon_phase};
use crate::SkyRng;
use crate::scene::SceneState;

/// Below this |phase| the moon is drawn full, without a shadow disc.
const FULL_MOON_PHASE: f64 = 0.02;

/// Flares are only drawn on stars at least this wide.
const FLARE_MIN_DIAMETER: f32 = 3.0;

/// Flares show while the night factor is below this.
const FLARE_MAX_NIGHT_FACTOR: f64 = 0.25;

/// Wrap a horizontal offset at the viewport width.
fn wrap_x(x: f64, width: f64) -> f32 {
    if width > 0.0 {
        x.rem_euclid(width) as f32
    } else {
        x as f32
    }
}

/// A meteor streak, rolled by the tick and drawn by every render of that tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spark {
    pub from: Vec2,
    pub to: Vec2,
}

/// Draws a [`SceneState`] through a [`Canvas`].
#[derive(Clone, Debug, Default)]
pub struct SceneCompositor {
    lighting: LightingModel,
}

impl SceneCompositor {
    pub fn new(config: &LightingConfig) -> Self {
        Self {
            lighting: LightingModel::new(config),
        }
    }

    /// The lighting rules used for every stage.
    pub fn lighting(&self) -> &LightingModel {
        &self.lighting
    }

    /// Roll this tick's spark: a rare streak from the top band down toward
    /// the middle, only in deep night.
    pub fn roll_spark<R: Rng + ?Sized>(&self, state: &SceneState, rng: &mut R) -> Option<Spark> {
        if !self.lighting.sparks_allowed(state.sun.zenith()) {
            return None;
        }
        let odds = self.lighting.config().spark_odds.max(1);
        if !rng.random_ratio(1, odds) {
            return None;
        }
        let (w, h) = (state.viewport.width, state.viewport.height);
        let (half, eighth) = ((w / 2).max(1), (h / 8).max(1));
        let x0 = rng.random_range(0..half) + w / 3;
        let y0 = rng.random_range(0..eighth);
        let x1 = rng.random_range(0..half) + w / 3;
        let y1 = rng.random_range(0..eighth) + h / 2;
        Some(Spark {
            from: Vec2::new(x0 as f32, y0 as f32),
            to: Vec2::new(x1 as f32, y1 as f32),
        })
    }

    /// Draw one frame.
    pub fn compose<C: Canvas + ?Sized>(&self, state: &SceneState, canvas: &mut C) {
        let pose = state.pose();
        let sun_color = self.lighting.sun_color(&pose);

        self.draw_background(state, canvas);
        self.draw_halo(state, sun_color, canvas);
        self.draw_nebula(state, canvas);
        self.draw_stars(state, &pose, canvas);
        self.draw_sparks(state, canvas);

        canvas.begin_layer(Layer::Sun);
        canvas.fill_ellipse(
            state.sun.position(),
            Vec2::splat(state.sun.radius()),
            sun_color,
        );

        self.draw_moon(state, &pose, canvas);
        self.draw_clouds(state, canvas);
        self.draw_overlay(state, &pose, canvas);
    }

    fn draw_background<C: Canvas + ?Sized>(&self, state: &SceneState, canvas: &mut C) {
        canvas.begin_layer(Layer::Background);
        canvas.fill_rect(Vec2::ZERO, state.viewport.size(), state.background);
    }

    /// Rings from `halo_size` radii inward, each blending a little more of
    /// the sun color into the sky.
    fn draw_halo<C: Canvas + ?Sized>(&self, state: &SceneState, sun_color: Color, canvas: &mut C) {
        canvas.begin_layer(Layer::Halo);
        let config = self.lighting.config();
        if config.halo_step <= 0.0 {
            return;
        }
        let center = state.sun.position();
        let radius = state.sun.radius();
        let mut ring = config.halo_size;
        while ring > 1.0 {
            let color = mix(state.background, sun_color, 1.0 / f64::from(ring));
            canvas.fill_ellipse(center, Vec2::splat(radius * ring), color);
            ring -= config.halo_step;
        }
    }

    fn draw_nebula<C: Canvas + ?Sized>(&self, state: &SceneState, canvas: &mut C) {
        let Some(stride) = self.lighting.nebula_stride(state.sun.zenith()) else {
            return;
        };
        canvas.begin_layer(Layer::Nebula);
        let width = f64::from(state.viewport.width);
        let drift = (state.frame / 3) as f64;
        for patch in state.fields.nebula.iter().step_by(stride) {
            let x = wrap_x(f64::from(patch.position.x) + drift, width);
            canvas.image(patch.image(), Vec2::new(x, patch.position.y));
        }
    }

    fn draw_stars<C: Canvas + ?Sized>(&self, state: &SceneState, pose: &SkyPose, canvas: &mut C) {
        if self.lighting.star_fade(pose) >= 1.0 {
            return;
        }
        canvas.begin_layer(Layer::Stars);

        let width = f64::from(state.viewport.width);
        let drift = (state.frame / 3) as f64;
        let night = pose.clamped_zenith() <= 0.0;
        let flare = self.lighting.night_factor(pose) < FLARE_MAX_NIGHT_FACTOR;
        let flare_period = self.lighting.config().flare_period.max(1);
        let mut twinkle = SkyRng::seed_from_u64(state.twinkle_seed);

        for star in &state.fields.stars {
            let position = Vec2::new(
                wrap_x(f64::from(star.position.x) + drift, width),
                star.position.y,
            );
            if self.lighting.is_star_suppressed(
                position,
                state.sun.position(),
                state.sun.radius(),
                pose.sun_angle,
            ) {
                continue;
            }
            let Some(color) = self
                .lighting
                .star_color(star.color, state.background, pose)
            else {
                continue;
            };

            let mut height = star.diameter;
            if night {
                height = (height + twinkle.random_range(-1..=0i32) as f32).max(0.0);
            }
            canvas.fill_ellipse(position, Vec2::new(star.diameter, height) * 0.5, color);

            let draws = star.record_draw();
            if flare && star.diameter >= FLARE_MIN_DIAMETER && draws % flare_period == 0 {
                let reach = star.diameter * 3.0;
                let ray = lighter(color);
                canvas.line(position - Vec2::X * reach, position + Vec2::X * reach, ray);
                canvas.line(position - Vec2::Y * reach, position + Vec2::Y * reach, ray);
            }
        }
    }

    fn draw_sparks<C: Canvas + ?Sized>(&self, state: &SceneState, canvas: &mut C) {
        let Some(spark) = state.spark else {
            return;
        };
        if !self.lighting.sparks_allowed(state.sun.zenith()) {
            return;
        }
        canvas.begin_layer(Layer::Sparks);
        canvas.line(spark.from, spark.to, WHITE);
    }

    /// Moon disc, then a background-colored disc slid over it by phase.
    fn draw_moon<C: Canvas + ?Sized>(&self, state: &SceneState, pose: &SkyPose, canvas: &mut C) {
        if !state.moon_enabled {
            return;
        }
        canvas.begin_layer(Layer::Moon);
        let center = state.moon.position();
        let radius = state.moon.radius();
        let color = self.lighting.moon_color(pose, state.background);
        canvas.fill_ellipse(center, Vec2::splat(radius), color);

        let phase = moon_phase(state.moon.angle(), state.sun.angle());
        if phase.abs() < FULL_MOON_PHASE {
            return;
        }
        let offset = ((1.0 - phase.abs()) * 2.0 * f64::from(radius)).copysign(phase) as f32;
        canvas.fill_ellipse(
            center + Vec2::new(offset, 0.0),
            Vec2::splat(radius),
            state.background,
        );
    }

    fn draw_clouds<C: Canvas + ?Sized>(&self, state: &SceneState, canvas: &mut C) {
        let visibility = self.lighting.cloud_visibility(state.sun.zenith());
        if visibility <= 0.0 {
            return;
        }
        canvas.begin_layer(Layer::Clouds);
        let dissolve = self.lighting.cloud_dissolve(state.sun.zenith());
        let width = f64::from(state.viewport.width);
        for cloud in &state.fields.clouds {
            cloud.set_dissolve(dissolve);
            let drift = f64::from(cloud.speed) * state.frame as f64 / 2.0;
            let origin = Vec2::new(
                wrap_x(f64::from(cloud.position.x) + drift, width),
                cloud.position.y,
            );
            for flock in cloud.visible_flocks() {
                canvas.image(flock.image(), origin + flock.position);
            }
        }
    }

    fn draw_overlay<C: Canvas + ?Sized>(&self, state: &SceneState, pose: &SkyPose, canvas: &mut C) {
        if !state.debug {
            return;
        }
        canvas.begin_layer(Layer::Overlay);
        let readout = format!(
            "{} fps  zenith {:.0}%  sun {:.2}°",
            state.fps.fps(),
            state.sun.zenith() * 100.0,
            pose.sun_angle
        );
        // Dark text once the sky is light.
        let ink = if self.lighting.night_factor(pose) > 0.5 {
            BLACK
        } else {
            WHITE
        };
        canvas.text(Vec2::new(8.0, 8.0), &readout, ink);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, RecordingCanvas};
    use crate::scene::Scene;
    use crate::viewport::DEFAULT_VIEWPORT;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::time::Instant;
    use sunrise_config::Config;

    fn scene_at(sun_angle: f64, moon: bool, debug: bool) -> Scene {
        let mut config = Config::default();
        config.animation.moon_enabled = moon;
        config.debug.overlay = debug;
        let rng = ChaCha8Rng::seed_from_u64(42);
        let mut scene = Scene::with_rng(&config, DEFAULT_VIEWPORT, rng, Instant::now()).unwrap();
        scene.place_sun(sun_angle);
        scene
    }

    fn render(scene: &Scene) -> RecordingCanvas {
        let mut canvas = RecordingCanvas::new();
        scene.compositor().compose(scene.state(), &mut canvas);
        canvas
    }

    #[test]
    fn test_deep_night_layers() {
        let scene = scene_at(90.0, false, false);
        let canvas = render(&scene);
        let layers = canvas.layers();
        assert_eq!(layers[0], Layer::Background);
        assert_eq!(layers[1], Layer::Halo);
        assert_eq!(layers[2], Layer::Nebula);
        assert_eq!(layers[3], Layer::Stars);
        assert!(layers.contains(&Layer::Sun));
        assert!(!layers.contains(&Layer::Clouds));
        assert!(!layers.contains(&Layer::Moon));
        assert!(!layers.contains(&Layer::Overlay));
        // Stride 1 at the bottom of the path: every patch is drawn.
        assert_eq!(canvas.ops_in(Layer::Nebula).len(), 1000);
    }

    #[test]
    fn test_noon_layers() {
        let scene = scene_at(270.0, true, true);
        let canvas = render(&scene);
        assert_eq!(
            canvas.layers(),
            vec![
                Layer::Background,
                Layer::Halo,
                Layer::Sun,
                Layer::Moon,
                Layer::Clouds,
                Layer::Overlay
            ]
        );
    }

    #[test]
    fn test_layers_are_back_to_front() {
        for angle in [0.0, 45.0, 90.0, 135.0, 200.0, 270.0, 330.0] {
            let mut scene = scene_at(angle, true, true);
            scene.state_mut().spark = Some(Spark {
                from: Vec2::new(400.0, 10.0),
                to: Vec2::new(450.0, 400.0),
            });
            let layers = render(&scene).layers();
            assert!(layers.windows(2).all(|w| w[0] < w[1]), "{angle}: {layers:?}");
        }
    }

    #[test]
    fn test_halo_ring_count() {
        let scene = scene_at(270.0, false, false);
        let canvas = render(&scene);
        let rings = canvas.ops_in(Layer::Halo).len();
        // 10.0 down to just above 1.0 in 0.1 steps.
        assert!((89..=91).contains(&rings), "got {rings} rings");
        let Some(DrawOp::Ellipse { radii, .. }) = canvas.ops_in(Layer::Halo).first().copied()
        else {
            panic!("halo should start with a ring");
        };
        assert!((radii.x - 340.0).abs() < 1e-3);
    }

    #[test]
    fn test_sparks_only_in_deep_night() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let night = scene_at(90.0, false, false);
        let compositor = night.compositor();
        let rolled: Vec<Spark> = (0..2000)
            .filter_map(|_| compositor.roll_spark(night.state(), &mut rng))
            .collect();
        assert!(!rolled.is_empty() && rolled.len() < 100, "got {}", rolled.len());
        for spark in &rolled {
            assert!(spark.from.y < 768.0 / 8.0);
            assert!(spark.to.y >= 768.0 / 2.0);
            assert!((341.0..853.0).contains(&spark.from.x));
        }

        let dusk = scene_at(10.0, false, false);
        assert!((0..500).all(|_| compositor.roll_spark(dusk.state(), &mut rng).is_none()));
    }

    #[test]
    fn test_spark_is_drawn_on_every_repaint_of_its_tick() {
        let mut scene = scene_at(90.0, false, false);
        let spark = Spark {
            from: Vec2::new(400.0, 10.0),
            to: Vec2::new(450.0, 400.0),
        };
        scene.state_mut().spark = Some(spark);
        for _ in 0..5 {
            let canvas = render(&scene);
            let ops = canvas.ops_in(Layer::Sparks);
            let DrawOp::Line { from, to, .. } = ops[0] else {
                panic!("spark should be a line");
            };
            assert_eq!((*from, *to), (spark.from, spark.to));
        }

        // A spark left over from the night is not drawn once the sky is light.
        scene.place_sun(270.0);
        assert!(!render(&scene).layers().contains(&Layer::Sparks));
        scene.state_mut().spark = None;
        scene.place_sun(90.0);
        assert!(!render(&scene).layers().contains(&Layer::Sparks));
    }

    #[test]
    fn test_twinkle_is_stable_within_a_tick() {
        let scene = scene_at(90.0, false, false);
        let heights = |canvas: &RecordingCanvas| -> Vec<f32> {
            canvas
                .ops_in(Layer::Stars)
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Ellipse { radii, .. } => Some(radii.y),
                    _ => None,
                })
                .collect()
        };
        assert_eq!(heights(&render(&scene)), heights(&render(&scene)));
    }

    #[test]
    fn test_full_daylight_hides_stars() {
        let scene = scene_at(270.0, false, false);
        let canvas = render(&scene);
        assert!(canvas.ops_in(Layer::Stars).is_empty());
    }

    #[test]
    fn test_stars_near_sun_are_suppressed() {
        let mut scene = scene_at(200.0, false, false);
        let sun = scene.state().sun.position();
        scene.state_mut().fields.stars = vec![
            crate::starfield::Star::new(sun + Vec2::new(5.0, 0.0), 2.0, WHITE),
            crate::starfield::Star::new(Vec2::new(900.0, 700.0), 2.0, WHITE),
        ];
        let canvas = render(&scene);
        let drawn = canvas
            .ops_in(Layer::Stars)
            .iter()
            .filter(|op| matches!(op, DrawOp::Ellipse { .. }))
            .count();
        assert_eq!(drawn, 1);

        scene.place_sun(90.0);
        let sun = scene.state().sun.position();
        scene.state_mut().fields.stars[0].position = sun + Vec2::new(5.0, 0.0);
        let canvas = render(&scene);
        let drawn = canvas
            .ops_in(Layer::Stars)
            .iter()
            .filter(|op| matches!(op, DrawOp::Ellipse { .. }))
            .count();
        assert_eq!(drawn, 2);
    }

    #[test]
    fn test_bright_star_flares_periodically() {
        let mut scene = scene_at(90.0, false, false);
        scene.state_mut().fields.stars =
            vec![crate::starfield::Star::new(Vec2::new(400.0, 300.0), 4.0, WHITE)];
        let mut lines = 0;
        for _ in 0..80 {
            lines += render(&scene)
                .ops_in(Layer::Stars)
                .iter()
                .filter(|op| matches!(op, DrawOp::Line { .. }))
                .count();
        }
        assert_eq!(scene.state().fields.stars[0].draw_count(), 80);
        assert_eq!(lines, 4);
    }

    #[test]
    fn test_moon_shadow_follows_phase() {
        let mut scene = scene_at(270.0, true, false);
        scene.place_moon(90.0);
        let full = render(&scene);
        assert_eq!(full.ops_in(Layer::Moon).len(), 1);

        scene.place_moon(200.0);
        let crescent = render(&scene);
        let moon = crescent.ops_in(Layer::Moon);
        assert_eq!(moon.len(), 2);
        let DrawOp::Ellipse { color, .. } = moon[1] else {
            panic!("shadow should be a disc");
        };
        assert_eq!(*color, scene.state().background);
    }

    #[test]
    fn test_clouds_receive_dissolve() {
        let scene = scene_at(270.0, false, false);
        render(&scene);
        assert!(scene.state().fields.clouds.iter().all(|c| c.dissolve() == 0.0));
    }

    #[test]
    fn test_flocks_materialize_gradually() {
        let flocks_drawn = |angle: f64| {
            let scene = scene_at(angle, false, false);
            let total = scene.state().fields.flock_count();
            let drawn = render(&scene)
                .ops_in(Layer::Clouds)
                .iter()
                .filter(|op| matches!(op, DrawOp::Image { .. }))
                .count();
            (drawn, total)
        };
        // Sun at 210 degrees: zenith 0.5, in the middle of the fade-in.
        let (mid, total) = flocks_drawn(210.0);
        assert!(total > 0);
        assert!(mid > 0 && mid < total, "{mid} of {total} flocks at mid ramp");

        // Lower in the ramp fewer flocks have formed.
        let (early, _) = flocks_drawn(195.0);
        assert!(early < mid, "{early} early vs {mid} mid");
        let (noon, _) = flocks_drawn(270.0);
        assert_eq!(noon, total);
    }

    #[test]
    fn test_overlay_text() {
        let scene = scene_at(90.0, false, true);
        let canvas = render(&scene);
        let Some(DrawOp::Text { text, .. }) = canvas.ops_in(Layer::Overlay).first().copied() else {
            panic!("overlay should draw text");
        };
        assert!(text.contains("zenith -100%"), "{text}");
        assert!(text.contains("sun 90.00°"), "{text}");
    }

    #[test]
    fn test_wrap_x() {
        assert_eq!(wrap_x(1030.0, 1024.0), 6.0);
        assert_eq!(wrap_x(12.0, 1024.0), 12.0);
        assert_eq!(wrap_x(12.0, 0.0), 12.0);
    }
}
