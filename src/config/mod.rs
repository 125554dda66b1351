//! Configuration management for sgram.
//!
//! This module handles loading application configuration from TOML files and
//! the live, bounded parameter store the control panel adjusts while running.
//! Configuration is stored in the user's config directory.

pub mod file;
pub mod store;

pub use file::{get_config_path, AnalysisConfig, DisplayConfig, RenderPolicyKind, SgramConfig};
pub use store::{control, ConfigStore, Direction, ParamKey};
