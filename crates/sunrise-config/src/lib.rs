//! Configuration for the sunrise scene.
//!
//! Settings come from three layers: built-in defaults, an optional RON file,
//! and command-line flags. Every section carries `#[serde(default)]` so a
//! partial file only overrides what it names.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AnimationConfig, Config, DebugConfig, FieldConfig, LightingConfig, WindowConfig,
};
pub use error::ConfigError;
