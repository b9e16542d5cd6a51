// SPDX-License-Identifier: MIT

mod commands;
mod config;
mod size;
mod utils;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{
    config::{Config, Settings},
    size::Size,
    utils::{level_from_flags, set_log_level},
};

#[derive(Parser)]
#[command(name = "flatctl", version, about = "Single-file FAT container tool", long_about = None)]
struct Cli {
    /// Config file (defaults to ./flatctl.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Container path, overrides the config
    #[arg(short = 'f', long, global = true)]
    container: Option<PathBuf>,

    /// Only print command results
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print layout and IO details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Create and format a new container
    Create {
        /// Container size (K, M or G suffix, minimum 6M)
        #[arg(short, long)]
        size: Option<Size>,
    },
    /// Copy a host file into the container
    Import {
        /// Host file to read
        src: PathBuf,
        /// Name inside the container (defaults to the source file name)
        name: Option<String>,
    },
    /// Copy a file out of the container
    Export {
        name: String,
        /// Host path to write
        dest: PathBuf,
    },
    /// Rename a file inside the container
    Rename { old: String, new: String },
    /// Delete a file from the container
    Rm { name: String },
    /// Protect a file against deletion and renaming
    Protect { name: String },
    /// Remove the protection flag
    Unprotect { name: String },
    /// List stored files
    Ls {
        /// Show slot, size, first block and protection
        #[arg(short, long)]
        long: bool,
    },
    /// Show free and total space
    Df,
    /// Run the consistency checker
    Check,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    set_log_level(level_from_flags(cli.quiet, cli.verbose));

    let config = Config::load(cli.config.as_deref())?;
    let size = match &cli.command {
        Commands::Create { size } => *size,
        _ => None,
    };
    let settings = Settings::resolve(config, cli.container, size);
    log_verbose!("Container: {}", settings.container.display());

    if let Err(e) = commands::run(&settings, &cli.command) {
        log_error!("{e:#}");
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_commands() {
        let cli = Cli::parse_from(["flatctl", "-f", "box.flat", "create", "--size", "8M"]);
        assert_eq!(cli.container, Some(PathBuf::from("box.flat")));
        assert_eq!(
            cli.command,
            Commands::Create {
                size: Some(Size(8 << 20))
            }
        );

        let cli = Cli::parse_from(["flatctl", "import", "notes.txt"]);
        assert_eq!(
            cli.command,
            Commands::Import {
                src: PathBuf::from("notes.txt"),
                name: None
            }
        );

        let cli = Cli::parse_from(["flatctl", "ls", "--long", "-q"]);
        assert!(cli.quiet);
        assert_eq!(cli.command, Commands::Ls { long: true });
    }
}
