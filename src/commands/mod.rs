//! Application command handlers for voxclip.
//!
//! # Commands
//! - `session`: Interactive recorder and sound test screens
//! - `config`: Open configuration file in user's preferred editor
//! - `list_devices`: List available audio input and output devices
//! - `logs`: Display recent log entries

pub mod config;
pub mod list_devices;
pub mod logs;
pub mod session;

pub use config::handle_config;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use session::handle_session;
