//! `leech config` – show where the config lives and what is in effect.

use anyhow::Result;
use leech_core::config::{self, LeechConfig};
use leech_core::logging;
use std::path::Path;

pub fn run_show_config(explicit: Option<&Path>, cfg: &LeechConfig) -> Result<()> {
    match explicit {
        Some(p) => println!("# config: {}", p.display()),
        None => println!("# config: {}", config::config_path()?.display()),
    }
    if let Ok(log) = logging::log_file_path() {
        println!("# log:    {}", log.display());
    }
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
