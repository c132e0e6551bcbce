//! Day/night sky: sun and moon motion, lighting, procedural stars, nebula and
//! clouds, and a compositor that draws them through an injected [`Canvas`].

pub mod canvas;
pub mod celestial;
pub mod clock;
pub mod cloud;
pub mod color;
pub mod compositor;
pub mod error;
pub mod field;
pub mod lighting;
pub mod nebula;
pub mod patch;
pub mod scene;
pub mod starfield;
pub mod viewport;

pub use canvas::{Canvas, DrawOp, Layer, RecordingCanvas};
pub use celestial::{CelestialBody, angular_distance, normalize_angle, orbit_point};
pub use clock::{AnimationClock, ClockState, FpsMeter};
pub use cloud::{CloudMass, generate_clouds};
pub use color::Color;
pub use compositor::{SceneCompositor, Spark};
pub use error::SkyError;
pub use field::ProceduralFields;
pub use lighting::{LightingModel, SkyPose, clamped_zenith, moon_phase};
pub use nebula::generate_nebula_field;
pub use patch::{NebulaPatch, PatchImage};
pub use scene::{Action, Scene, SceneState, WindowRequest};
pub use starfield::{Star, generate_stars};
pub use viewport::{DEFAULT_VIEWPORT, ViewportExtent};

/// The random stream behind field generation and the per-tick twinkle and spark dice.
pub type SkyRng = rand_chacha::ChaCha8Rng;
