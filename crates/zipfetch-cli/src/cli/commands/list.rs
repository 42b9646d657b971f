//! `zipfetch list` – show what the catalogue holds.

use anyhow::Result;
use zipfetch_core::catalogue::{load_catalogue, select_year, year_counts};
use zipfetch_core::config::FetchConfig;

pub fn run_list(cfg: &FetchConfig, year: Option<&str>) -> Result<()> {
    let catalogue = load_catalogue(&cfg.catalogue_path)?;
    match year {
        None => {
            if catalogue.is_empty() {
                println!("Catalogue {} is empty.", cfg.catalogue_path.display());
                return Ok(());
            }
            println!("{:<8} {}", "YEAR", "ARCHIVES");
            for (year, count) in year_counts(&catalogue) {
                println!("{:<8} {}", year, count);
            }
        }
        Some(year) => {
            let selected = select_year(&catalogue, year)?;
            println!("{:<24} {:<32} {}", "GROUP", "FILE", "URL");
            for d in &selected {
                println!("{:<24} {:<32} {}", d.group, d.file_name, d.source_url);
            }
        }
    }
    Ok(())
}
