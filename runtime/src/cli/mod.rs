//! CLI subcommand implementations for the mf-scrape binary.

pub mod output;
pub mod parse_cmd;
pub mod scrape_cmd;
