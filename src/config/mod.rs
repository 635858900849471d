//! Configuration management for voxclip.
//!
//! Loads application configuration from a TOML file in the user's config
//! directory.

pub mod file;

pub use file::{data_dir, get_config_path, AudioConfig, VoxclipConfig};
