//! CLI command handlers, one file per command.

mod config;
mod fetch;
mod list;

pub use config::run_config;
pub use fetch::run_fetch;
pub use list::run_list;

#[cfg(test)]
pub(crate) use fetch::summary_lines;
