//! The `scanline config` command group.

use clap::{Args, Subcommand};
use scanline_core::Config;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Print the config file path
    Path,

    /// Write a default config file to the default location
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command.
pub fn execute(args: ConfigArgs, config: Config) -> anyhow::Result<()> {
    match args.action {
        ConfigAction::Show => {
            println!("{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", Config::default_path().display());
        }
        ConfigAction::Init { force } => {
            let path = Config::default_path();
            if path.exists() && !force {
                anyhow::bail!(
                    "config file already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, Config::default().to_toml()?)?;
            println!("Wrote default config to {}", path.display());
        }
    }
    Ok(())
}
