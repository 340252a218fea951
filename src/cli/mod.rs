//! Command-line interface.

pub mod analyze;
pub mod completions;
pub mod edit;
pub mod init;
pub mod key;
pub mod load;
pub mod output;
pub mod run;
pub mod show;

use clap::{Parser, Subcommand};

use crate::core::constants;

/// Cubby - encrypted per-environment configuration for small projects.
#[derive(Parser)]
#[command(
    name = "cubby",
    about = "Encrypted environment variables for small projects",
    version,
    after_help = "Keys stay readable, values stay secret."
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Create master.key and a starter env.toml
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Decrypt env.toml, open it in your editor, re-encrypt on save
    Edit,

    /// Print env.toml with every value decrypted
    Show,

    /// Print shell export statements for an environment
    Load {
        /// Environment to export
        #[arg(default_value = constants::DEFAULT_ENVIRONMENT)]
        environment: String,
    },

    /// Run a command with decrypted secrets in its environment
    Run {
        /// Environment to load secrets from
        #[arg(short, long, default_value = constants::DEFAULT_ENVIRONMENT)]
        environment: String,

        /// Command and arguments to run
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },

    /// Compare keys and values across environments
    Analyze {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the public key
    Public,

    /// Print the private key
    Private,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Execute a command.
pub fn execute(command: Command) -> crate::error::Result<()> {
    use Command::*;

    match command {
        Init { force } => init::execute(force),
        Edit => edit::execute(),
        Show => show::execute(),
        Load { environment } => load::execute(&environment),
        Run {
            environment,
            command,
        } => run::execute(&environment, &command),
        Analyze { json } => analyze::execute(json),
        Public => key::public(),
        Private => key::private(),
        Completions { shell } => completions::execute(shell),
    }
}
