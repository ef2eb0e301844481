pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "notecrawl")]
#[command(about = "Crawl notes and comments through an attached browser", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Remote debugging port of the running browser (overrides the config)
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search a keyword and scrape every result
    Search {
        /// Keyword to search for
        keyword: String,

        /// Output file (default: data/xhs_<keyword>.jsonl)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Expected number of results; a single render may return more or fewer
        #[arg(short = 'n', long, default_value_t = 50)]
        max_results: usize,

        /// Append to the output file instead of replacing it
        #[arg(long)]
        append: bool,
    },
    /// Scrape a single note
    Note {
        /// Detail page URL
        url: String,

        /// Append the record to this file instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check that a browser debug endpoint is reachable
    Check,
}

/// Default output path for a keyword search, always a file directly under `data/`
pub fn default_output_path(keyword: &str) -> PathBuf {
    let stem = keyword.replace(['/', '\\'], "_").replace("..", "_");
    PathBuf::from("data").join(format!("xhs_{}.jsonl", stem))
}
