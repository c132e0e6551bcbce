//! Configuration structs with defaults tuned for the 1024×768 scene.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level scene configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Tick rate and celestial step sizes.
    pub animation: AnimationConfig,
    /// Colors and the empirically tuned lighting thresholds.
    pub lighting: LightingConfig,
    /// Procedural field sizes.
    pub field: FieldConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Initial width in logical pixels.
    pub width: u32,
    /// Initial height in logical pixels.
    pub height: u32,
    /// Start in fullscreen mode.
    pub fullscreen: bool,
    /// Window title.
    pub title: String,
}

/// Animation timing configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimationConfig {
    /// Delay between the end of one tick and the start of the next, in milliseconds.
    pub tick_interval_ms: u64,
    /// Delay before the very first tick, in milliseconds.
    pub first_tick_delay_ms: u64,
    /// Frame rates cycled through by the speed keys, ascending.
    pub fps_presets: Vec<u32>,
    /// Sun angle increment per tick, in degrees.
    pub sun_step_deg: f64,
    /// Moon step as a multiple of the sun step. Slightly above 1 so the moon
    /// overtakes the sun once per lunar cycle.
    pub moon_step_ratio: f64,
    /// Initial sun angle in degrees. 180 is the eastern horizon.
    pub start_angle_deg: f64,
    /// Whether the moon is drawn at startup.
    pub moon_enabled: bool,
    /// Largest random offset (degrees) between sun and moon when the moon is
    /// (re)synchronized.
    pub moon_resync_spread_deg: f64,
}

/// Lighting colors and thresholds. Colors are linear RGB in `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    /// Sky color at night factor 0.
    pub night_color: [f32; 3],
    /// Sky color at night factor 1.
    pub day_color: [f32; 3],
    /// Sun color on the horizon.
    pub dawn_color: [f32; 3],
    /// Sun color at full elevation.
    pub noon_color: [f32; 3],
    /// Moon tint while the sun is above the horizon.
    pub moon_warm_color: [f32; 3],
    /// Moon tint while the sun is below the horizon.
    pub moon_cool_color: [f32; 3],
    /// Outermost halo ring radius, in sun radii.
    pub halo_size: f32,
    /// Radius decrement between consecutive halo rings, in sun radii.
    pub halo_step: f32,
    /// Sun/moon separation (degrees) below which daylight is dimmed.
    pub coincidence_threshold_deg: f64,
    /// Sun angle band `[from, to]` (degrees) in which the sun is well below the
    /// horizon and nearby stars are not suppressed.
    pub star_suppression_band_deg: [f64; 2],
    /// Stars closer to the sun than this many sun radii are suppressed.
    pub star_suppression_radii: f32,
    /// Zenith below which clouds are invisible.
    pub cloud_fade_low: f64,
    /// Zenith at and above which clouds are fully visible.
    pub cloud_fade_high: f64,
    /// Raw zenith below which the nebula field is drawn.
    pub nebula_zenith: f64,
    /// Raw zenith below which sparks may appear.
    pub spark_zenith: f64,
    /// A spark is drawn on average once every this many frames.
    pub spark_odds: u32,
    /// Widest sampling stride over the nebula field, reached at `nebula_zenith`.
    pub nebula_max_stride: usize,
    /// A bright star flares on every n-th draw.
    pub flare_period: u32,
}

/// Procedural field configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of stars.
    pub star_count: usize,
    /// Inclusive lower bound of the cloud count.
    pub cloud_min: usize,
    /// Inclusive upper bound of the cloud count.
    pub cloud_max: usize,
    /// Number of background nebula patches.
    pub nebula_count: usize,
    /// The nebula band is re-rolled every this many patches.
    pub nebula_band_period: usize,
    /// A star gets a twinkle bonus size once in this many stars on average.
    pub twinkle_odds: u32,
    /// Fixed RNG seed. `None` seeds from wall-clock time.
    pub seed: Option<u64>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Show the frame rate / zenith / angle overlay.
    pub overlay: bool,
    /// Log level filter (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            fullscreen: false,
            title: "sunrise".to_string(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            first_tick_delay_ms: 100,
            fps_presets: vec![20, 30, 40, 50, 60, 70, 80, 90, 100],
            sun_step_deg: 0.05,
            moon_step_ratio: 1.0 + 1.0 / 29.53,
            start_angle_deg: 170.0,
            moon_enabled: true,
            moon_resync_spread_deg: 10.0,
        }
    }
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            night_color: [0.0, 0.0, 0.34],
            day_color: [0.0, 1.0, 1.0],
            dawn_color: [0.5, 0.0, 0.0],
            noon_color: [1.0, 1.0, 0.33],
            moon_warm_color: [1.0, 0.93, 0.75],
            moon_cool_color: [0.85, 0.88, 0.95],
            halo_size: 10.0,
            halo_step: 0.1,
            coincidence_threshold_deg: 2.0,
            star_suppression_band_deg: [20.0, 160.0],
            star_suppression_radii: 6.0,
            cloud_fade_low: 0.15,
            cloud_fade_high: 0.65,
            nebula_zenith: -0.5,
            spark_zenith: -0.4,
            spark_odds: 100,
            nebula_max_stride: 8,
            flare_period: 40,
        }
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            star_count: 200,
            cloud_min: 5,
            cloud_max: 14,
            nebula_count: 1000,
            nebula_band_period: 100,
            twinkle_odds: 40,
            seed: None,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            overlay: false,
            log_level: "info".to_string(),
        }
    }
}

// --- Load ---

impl Config {
    /// Load config from a RON file. The file is only ever read.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
                path: path.to_path_buf(),
                source,
            })?;
        let config = Self::from_ron_str(&contents)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse config from RON text.
    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        ron::from_str(contents).map_err(ConfigError::ParseError)
    }
}
