//! CLI for leech.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use leech_core::config::{self, LeechConfig};
use std::path::PathBuf;

use commands::{run_classify, run_completions, run_crawl, run_show_config, ClassifyArgs, CrawlArgs};

/// Top-level CLI for leech.
#[derive(Debug, Parser)]
#[command(name = "leech")]
#[command(about = "leech: catalog image crawler and size classifier", long_about = None)]
pub struct Cli {
    /// Use this config file instead of ~/.config/leech/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Walk the catalog pages and download each product's main image.
    Crawl(CrawlArgs),

    /// Copy downloaded files whose size falls inside the KiB bounds.
    Classify(ClassifyArgs),

    /// Print the config file path and the effective configuration.
    Config,

    /// Generate shell completions on stdout.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<LeechConfig> {
    match path {
        Some(p) => config::load_from_path(p),
        None => config::load_or_init(),
    }
}

/// Apply the command's flag overrides and check only the config sections it reads.
fn prepare_config(command: &CliCommand, cfg: &mut LeechConfig) -> Result<()> {
    match command {
        CliCommand::Crawl(args) => {
            args.apply(cfg);
            cfg.validate_crawl()
        }
        CliCommand::Classify(args) => {
            args.apply(cfg);
            cfg.validate_classify()
        }
        CliCommand::Config | CliCommand::Completions { .. } => Ok(()),
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        if let CliCommand::Completions { shell } = cli.command {
            run_completions(shell);
            return Ok(());
        }

        let mut cfg = load_config(cli.config.as_ref())?;
        tracing::debug!("loaded config: {:?}", cfg);
        prepare_config(&cli.command, &mut cfg)?;

        match cli.command {
            CliCommand::Crawl(_) => run_crawl(&cfg).await?,
            CliCommand::Classify(_) => run_classify(&cfg).await?,
            CliCommand::Config => run_show_config(cli.config.as_deref(), &cfg)?,
            CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
