//! TurnKit Settings Crate
//!
//! Handles application configuration, the program template library and the
//! playback speed curve.

pub mod config;
pub mod error;
pub mod playback;
pub mod templates;

pub use config::{Config, CONFIG_FILE_NAME};
pub use error::{SettingsError, SettingsResult};
pub use playback::{PlaybackConfig, SpeedCurve};
pub use templates::{TemplateLibrary, G71_OUTER};
