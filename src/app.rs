//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to the command handlers.

use crate::commands;
use crate::config::get_config_path;
use crate::logging;
use crate::setup::{self, version::SetupNeeded};
use crate::ui::Screen;
use anyhow::anyhow;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::process;

/// Runs first-time setup, or refreshes an outdated config, before any command needs it.
///
/// A missing config gets the default template. An outdated one keeps its
/// settings and only has its version line updated.
fn check_and_run_setup() -> anyhow::Result<()> {
    let config_path = get_config_path()?;

    match setup::version::check_setup_needed(&config_path)? {
        Some(SetupNeeded::Missing) => {
            tracing::info!("No config found, running first-time setup");
            setup::run_setup(&config_path).map_err(|e| {
                tracing::error!("Setup failed: {e}");
                anyhow!("Setup failed: {e}")
            })?;
        }
        Some(SetupNeeded::Outdated { from }) => {
            tracing::info!(
                "Migrating config from version {} to {}",
                from,
                env!("CARGO_PKG_VERSION")
            );
            setup::version::update_config_version(&config_path).map_err(|e| {
                tracing::error!("Failed to update config version: {e}");
                anyhow!("Failed to update config version: {e}")
            })?;
        }
        None => {
            tracing::debug!("Config version up to date ({})", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// A terminal recorder for short audio clips
#[derive(Parser)]
#[command(name = "voxclip")]
#[command(version)]
#[command(about = "A terminal recorder for short audio clips")]
#[command(long_about = "A terminal recorder for short audio clips.\n\nRecord from the microphone, replay any clip from the session list, save clips\nto disk, and check audio output with the built-in sound test.\n\nDEFAULT COMMAND:\n    If no command is specified, the recorder opens.\n\nEXAMPLES:\n    # Open the recorder\n    $ voxclip\n\n    # Check audio output with the bundled sound\n    $ voxclip sound-test\n\n    # Toggle recording from a window manager key binding\n    $ pkill -USR1 voxclip\n\n    # Find the device to put in the config file\n    $ voxclip list-devices")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/voxclip/voxclip.toml\n    Saved recordings:   ~/.local/share/voxclip/recordings\n    Logs:               ~/.local/state/voxclip/voxclip.log.*"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record, replay and save clips (default)
    ///
    /// Space toggles recording, arrows select, Enter plays, s saves,
    /// t opens the sound test, Escape/q quits.
    #[command(visible_alias = "r")]
    Record,

    /// Open the sound test screen directly
    ///
    /// l loads the bundled sound, p plays, Space pauses, r resumes,
    /// Escape returns to the recorder.
    #[command(name = "sound-test", visible_alias = "st")]
    SoundTest,

    /// Open configuration file in your preferred editor
    ///
    /// Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input and output devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the devices in voxclip.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   voxclip completions bash > voxclip.bash
    ///   voxclip completions zsh > _voxclip
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the application based on command-line arguments.
///
/// # Errors
/// - If logging initialization or setup fails
/// - If the chosen command fails
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that need neither logging nor config
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "voxclip", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            if let Err(e) = commands::handle_list_devices() {
                eprintln!("Error: {e}");
                process::exit(1);
            }
            return Ok(());
        }
        Some(Commands::Logs) => {
            if let Err(e) = commands::handle_logs() {
                eprintln!("Error: {e}");
                process::exit(1);
            }
            return Ok(());
        }
        _ => {}
    }

    logging::init_logging()?;
    check_and_run_setup()?;

    match cli.command {
        None | Some(Commands::Record) => commands::handle_session(Screen::Recorder).await?,
        Some(Commands::SoundTest) => commands::handle_session(Screen::SoundTest).await?,
        Some(Commands::Config) => commands::handle_config()?,
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
