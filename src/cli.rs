// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API: the CLI structure is described by the structs and
// enums below, and clap generates the parsing, --help and --version for us.
//
// Flags map onto CheckOptions / SitemapOptions (src/config.rs); anything not
// given on the command line keeps the library default.
// =============================================================================

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "site-guardian",
    version,
    about = "Find broken links on a page and inspect a site's XML sitemaps",
    long_about = "site-guardian checks every link on a web page for broken or redirected targets, \
                  and discovers, resolves and sanity-checks a website's XML sitemap tree."
)]
pub struct Cli {
    /// Print debug logs to stderr (same as RUST_LOG=debug)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every link on a page
    ///
    /// Example: site-guardian links https://example.com/blog --concurrency 20
    Links {
        /// Page whose links should be checked
        page_url: String,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        /// How many links to probe at the same time
        #[arg(long, default_value_t = 10)]
        concurrency: usize,

        /// Per-link timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout: u64,

        /// Probe at most this many distinct links
        #[arg(long, default_value_t = 100)]
        max_links: usize,
    },

    /// Discover and analyze a site's XML sitemaps
    ///
    /// Example: site-guardian sitemap https://example.com
    Sitemap {
        /// Website to analyze (robots.txt and well-known paths are tried)
        base_url: String,

        /// Use this sitemap instead of discovering one
        #[arg(long)]
        sitemap_url: Option<String>,

        /// How many levels of sitemap indexes to follow
        #[arg(long, default_value_t = 3)]
        max_depth: usize,

        /// Output results in JSON format instead of a summary
        #[arg(long)]
        json: bool,
    },
}
