//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands::{self, RunOptions};
use crate::config::RenderPolicyKind;
use crate::logging;
use crate::setup;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;

/// A live scrolling spectrogram of your microphone, in the terminal
#[derive(Parser)]
#[command(name = "sgram")]
#[command(version)]
#[command(about = "A live spectrogram of your microphone, in the terminal")]
#[command(long_about = "A live spectrogram of your microphone, in the terminal.\n\nDEFAULT COMMAND:\n    If no command is specified, 'run' is used by default.\n    Run options (--policy, --device) can be used without explicitly saying 'run'.\n\nKEYS:\n    Up/Down     select a parameter\n    Left/Right  adjust the selected parameter\n    s           clear the canvas and restart at the left edge\n    o           show or hide the controls panel\n    q / Esc     quit\n\nEXAMPLES:\n    # Sweep at the configured duration\n    $ sgram\n\n    # Continuously scrolling one-pixel columns\n    $ sgram --policy scrolling\n\n    # Use the second input device\n    $ sgram run --device 1\n\n    # Clear the canvas from another shell\n    $ pkill -USR1 sgram")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/sgram/sgram.toml\n    Logs:               ~/.local/state/sgram/sgram.log.*"
)]
struct Cli {
    #[command(flatten)]
    run: RunArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone, Debug, Default)]
struct RunArgs {
    /// Column layout, overriding display.policy
    #[arg(short, long, value_enum, global = true)]
    policy: Option<RenderPolicyKind>,

    /// Input device name or ID, overriding audio.device
    #[arg(short, long, value_name = "DEVICE", global = true)]
    device: Option<String>,
}

impl From<RunArgs> for RunOptions {
    fn from(args: RunArgs) -> Self {
        RunOptions {
            policy: args.policy,
            device: args.device,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the live spectrogram (default)
    ///
    /// Press q or Escape to quit, s to clear the canvas, o to toggle the panel.
    #[command(visible_alias = "r")]
    Run,

    /// Open configuration file in your preferred editor
    ///
    /// Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in sgram.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   sgram completions bash > sgram.bash
    ///   sgram completions zsh > _sgram
    ///   sgram completions fish > sgram.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization or setup fails
/// - If command execution fails
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that need neither logging nor a config file
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "sgram", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => return commands::handle_list_devices(),
        Some(Commands::Logs) => return commands::handle_logs(),
        _ => {}
    }

    logging::init_logging()?;
    setup::ensure_config()?;

    match cli.command {
        None | Some(Commands::Run) => commands::handle_run(cli.run.into()).await?,
        Some(Commands::Config) => commands::handle_config()?,
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
