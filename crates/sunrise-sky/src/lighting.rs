//! Lighting derived from sun and moon positions.
//!
//! Everything here is a pure function of a [`SkyPose`]; the compositor and
//! the clock read the results, nothing is cached between frames.

use glam::Vec2;
use sunrise_config::LightingConfig;

use crate::celestial::{CelestialBody, angular_distance, normalize_angle};
use crate::cloud::FLOCK_THRESHOLDS;
use crate::color::{Color, mix};

/// The angles and elevation lighting depends on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkyPose {
    /// Sun angle in degrees.
    pub sun_angle: f64,
    /// Raw (unclamped) sun zenith.
    pub sun_zenith: f64,
    /// Moon angle in degrees, `None` while the moon is hidden.
    pub moon_angle: Option<f64>,
}

impl SkyPose {
    /// Snapshot the current bodies.
    pub fn new(sun: &CelestialBody, moon: Option<&CelestialBody>) -> Self {
        Self {
            sun_angle: sun.angle(),
            sun_zenith: sun.zenith(),
            moon_angle: moon.map(CelestialBody::angle),
        }
    }

    /// Sun above the horizon.
    pub fn sun_rising(&self) -> bool {
        (180.0..360.0).contains(&self.sun_angle)
    }

    /// Zenith clamped to `[0, 1]`, used by every daylight blend.
    pub fn clamped_zenith(&self) -> f64 {
        clamped_zenith(self.sun_zenith)
    }
}

/// Clamp a raw zenith into `[0, 1]`. NaN maps to 0.
pub fn clamped_zenith(zenith: f64) -> f64 {
    if zenith > 0.0 { zenith.min(1.0) } else { 0.0 }
}

/// Moon phase in `[-1, 1]` from the moon's lead over the sun.
///
/// 0 is full moon (opposite the sun); ±1 is new moon. The sign tells which
/// side is in shadow.
pub fn moon_phase(moon_angle: f64, sun_angle: f64) -> f64 {
    let lead = normalize_angle(moon_angle - sun_angle);
    (lead - 180.0) / 180.0
}

/// Colors and visibility rules for one frame.
#[derive(Clone, Debug)]
pub struct LightingModel {
    night: Color,
    day: Color,
    dawn: Color,
    noon: Color,
    moon_warm: Color,
    moon_cool: Color,
    config: LightingConfig,
}

impl LightingModel {
    /// Build from config.
    pub fn new(config: &LightingConfig) -> Self {
        Self {
            night: Color::from_array(config.night_color),
            day: Color::from_array(config.day_color),
            dawn: Color::from_array(config.dawn_color),
            noon: Color::from_array(config.noon_color),
            moon_warm: Color::from_array(config.moon_warm_color),
            moon_cool: Color::from_array(config.moon_cool_color),
            config: config.clone(),
        }
    }

    /// The thresholds this model was built from.
    pub fn config(&self) -> &LightingConfig {
        &self.config
    }

    /// Daylight weight for the sky color.
    ///
    /// Equal to the clamped zenith, except while the sun is up and the moon
    /// is within the coincidence threshold of it: then it is scaled down by
    /// their closeness, dimming the sky instead of jumping.
    pub fn night_factor(&self, pose: &SkyPose) -> f64 {
        let zenith = pose.clamped_zenith();
        let threshold = self.config.coincidence_threshold_deg;
        match pose.moon_angle {
            Some(moon) if pose.sun_rising() && threshold > 0.0 => {
                let separation = angular_distance(moon, pose.sun_angle);
                if separation < threshold {
                    zenith * (separation / threshold)
                } else {
                    zenith
                }
            }
            _ => zenith,
        }
    }

    /// Sky fill color.
    pub fn background(&self, pose: &SkyPose) -> Color {
        mix(self.night, self.day, self.night_factor(pose))
    }

    /// Sun disc (and halo core) color: warm on the horizon, bright at noon.
    pub fn sun_color(&self, pose: &SkyPose) -> Color {
        mix(self.dawn, self.noon, pose.clamped_zenith())
    }

    /// How far stars are blended into the background. Stars vanish twice as
    /// fast as daylight grows: fully gone at night factor 0.5.
    pub fn star_fade(&self, pose: &SkyPose) -> f64 {
        (self.night_factor(pose) * 2.0).min(1.0)
    }

    /// Drawn star color, or `None` once the star has faded out completely.
    pub fn star_color(&self, base: Color, background: Color, pose: &SkyPose) -> Option<Color> {
        let fade = self.star_fade(pose);
        (fade < 1.0).then(|| mix(base, background, fade))
    }

    /// The sun is up or close enough to the horizon to outshine nearby stars.
    pub fn sun_outshines_stars(&self, sun_angle: f64) -> bool {
        let [from, to] = self.config.star_suppression_band_deg;
        !(from..=to).contains(&sun_angle)
    }

    /// A star this close to the sun is not drawn while the sun outshines stars.
    pub fn is_star_suppressed(
        &self,
        star: Vec2,
        sun: Vec2,
        sun_radius: f32,
        sun_angle: f64,
    ) -> bool {
        self.sun_outshines_stars(sun_angle)
            && star.distance(sun) < self.config.star_suppression_radii * sun_radius
    }

    /// Cloud opacity ramp: 0 below the low threshold, 1 at and above the
    /// high one, a fourth-power ease in between.
    pub fn cloud_visibility(&self, zenith: f64) -> f64 {
        let low = self.config.cloud_fade_low;
        let high = self.config.cloud_fade_high;
        if zenith >= high {
            return 1.0;
        }
        if zenith <= low || high <= low {
            return 0.0;
        }
        let t = (zenith - low) / (high - low);
        let sq = t * t;
        sq * sq
    }

    /// Per-frame cloud dissolve factor; flocks whose threshold exceeds
    /// `256 × dissolve` are drawn.
    ///
    /// The remaining invisibility is scaled into the flock threshold range,
    /// so flocks appear one opacity step at a time across the whole ramp.
    pub fn cloud_dissolve(&self, zenith: f64) -> f64 {
        let hidden = 1.0 - self.cloud_visibility(zenith);
        hidden * f64::from(FLOCK_THRESHOLDS.end) / 256.0
    }

    /// Sampling stride over the nebula field, `None` outside deep night.
    ///
    /// Every patch is drawn at the darkest point; the stride widens toward
    /// `nebula_max_stride` as the sun approaches the nebula threshold.
    pub fn nebula_stride(&self, zenith: f64) -> Option<usize> {
        let limit = self.config.nebula_zenith;
        if zenith >= limit {
            return None;
        }
        let max_stride = self.config.nebula_max_stride.max(1);
        let span = limit + 1.0;
        if span <= 0.0 {
            return Some(1);
        }
        let t = ((zenith + 1.0) / span).clamp(0.0, 1.0);
        Some(1 + (t * (max_stride - 1) as f64).round() as usize)
    }

    /// Sparks may appear.
    pub fn sparks_allowed(&self, zenith: f64) -> bool {
        zenith < self.config.spark_zenith
    }

    /// Moon disc color: cool while the sun is down, warm while it is up,
    /// washed toward the sky as daylight grows.
    pub fn moon_color(&self, pose: &SkyPose, background: Color) -> Color {
        let tint = if pose.sun_rising() {
            self.moon_warm
        } else {
            self.moon_cool
        };
        mix(tint, background, pose.clamped_zenith() * 0.6)
    }
}

impl Default for LightingModel {
    fn default() -> Self {
        Self::new(&LightingConfig::default())
    }
}
