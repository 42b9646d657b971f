//! `zipfetch config` – show where config and logs live and the effective values.

use anyhow::Result;
use zipfetch_core::config::{self, FetchConfig};
use zipfetch_core::logging;

pub fn run_config(cfg: &FetchConfig) -> Result<()> {
    println!("config file: {}", config::config_path()?.display());
    match logging::log_file_path() {
        Ok(path) => println!("log file:    {}", path.display()),
        Err(_) => println!("log file:    -"),
    }
    println!();
    print!("{}", config::render(cfg)?);
    Ok(())
}
