//! `keyscribe config`: inspect, locate, create and check the config file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use keyscribe_core::Config;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Print where the config file is read from
    Path,

    /// Write a config file holding the defaults
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate the config and report which artifact paths exist
    Check,
}

pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => println!("{}", Config::load()?.to_toml()?),
        ConfigCommand::Path => println!("{}", Config::default_path().display()),
        ConfigCommand::Init { force } => {
            let path = write_default(&Config::default_path(), force)?;
            tracing::info!("Wrote default config to {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
        ConfigCommand::Check => {
            let config = Config::load()?;
            let missing = artifact_report(&config)
                .into_iter()
                .inspect(|(label, path, present)| {
                    let mark = if *present { "ok" } else { "missing" };
                    println!("  {label:<14} {mark:<8} {}", path.display());
                })
                .filter(|(_, _, present)| !present)
                .count();
            if missing > 0 {
                anyhow::bail!("{missing} artifact path(s) not found");
            }
        }
    }
    Ok(())
}

/// Write `Config::default()` to `path`, refusing to clobber unless `force`.
fn write_default(path: &Path, force: bool) -> anyhow::Result<PathBuf> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists.\nPass --force to replace it.",
            path.display()
        );
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    std::fs::write(path, Config::default().to_toml()?)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    Ok(path.to_path_buf())
}

fn artifact_report(config: &Config) -> Vec<(&'static str, PathBuf, bool)> {
    [
        ("model", config.model_path()),
        ("vocabulary", config.vocab_path()),
        ("dictionary", config.dictionary_path()),
        ("captions", config.caption_path()),
    ]
    .into_iter()
    .map(|(label, path)| {
        let present = path.exists();
        (label, path, present)
    })
    .collect()
}
