// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing -> stderr, so --json output stays clean)
// 3. Dispatch to the appropriate subcommand handler
// 4. Print results
// 5. Exit with proper code (0 = all good, 1 = problems found, 2 = error)
// =============================================================================

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use site_guardian::checker::{self, LinkCheckResult, PageLinkReport};
use site_guardian::sitemap::{self, SitemapReport};
use site_guardian::{CheckOptions, SitemapOptions};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG wins when set; otherwise warnings only, or debug with --verbose
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Returns:
//   Ok(0) = nothing wrong
//   Ok(1) = broken links / sitemap errors found
//   Err   = we could not do the job at all
async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Links { page_url, json, concurrency, timeout, max_links } => {
            let options = CheckOptions::default()
                .with_max_concurrency(concurrency)
                .with_timeout(Duration::from_secs(timeout))
                .with_max_links(max_links);
            handle_links(&page_url, json, &options).await
        }
        Commands::Sitemap { base_url, sitemap_url, max_depth, json } => {
            let options = SitemapOptions::default().with_max_depth(max_depth);
            handle_sitemap(&base_url, sitemap_url.as_deref(), json, &options).await
        }
    }
}

async fn handle_links(page_url: &str, json: bool, options: &CheckOptions) -> Result<i32> {
    if !json {
        println!("🔍 Checking links on: {}", page_url);
    }

    let report = checker::check_page_links(page_url, options).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_link_report(&report);
    }

    Ok(if report.broken_links_count > 0 { 1 } else { 0 })
}

async fn handle_sitemap(
    base_url: &str,
    sitemap_url: Option<&str>,
    json: bool,
    options: &SitemapOptions,
) -> Result<i32> {
    if !json {
        println!("🗺️  Analyzing sitemap for: {}", base_url);
    }

    let report = sitemap::analyze_sitemap(base_url, sitemap_url, options).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_sitemap_report(&report);
    }

    Ok(if report.errors.is_empty() { 0 } else { 1 })
}

// Prints link results as a human-readable table in the terminal
fn print_link_report(report: &PageLinkReport) {
    println!();
    println!("{:<60} {:<8} {:<30}", "URL", "STATUS", "MESSAGE");
    println!("{}", "=".repeat(100));

    for result in report.broken_links.iter().chain(&report.working_links) {
        println!(
            "{:<60} {:<8} {:<30}",
            truncate(&result.url, 57),
            format_status(result),
            format_message(result)
        );
    }

    println!();
    println!("📊 Summary:");
    println!("   ✅ OK: {}", report.working_links_count);
    println!("   ❌ Broken: {}", report.broken_links_count);
    println!("      internal: {}", report.internal_broken.len());
    println!("      external: {}", report.external_broken.len());
    println!("   📋 Total: {}", report.total_links_checked);
}

fn print_sitemap_report(report: &SitemapReport) {
    println!();
    println!("📄 Sitemap: {}", report.sitemap_url);
    for node in &report.sitemaps {
        println!("   {:?} {} ({} children)", node.kind, node.url, node.child_count);
    }

    println!();
    println!("📊 Summary:");
    println!("   🗂️  Sitemaps found: {}", report.sitemaps_found);
    println!("   🔗 URLs: {}", report.total_urls);

    if !report.issues.is_empty() {
        println!();
        println!("⚠️  Issues:");
        for issue in &report.issues {
            println!("   - {}", issue);
        }
    }

    if !report.errors.is_empty() {
        println!();
        println!("❌ Errors:");
        for error in &report.errors {
            println!("   - {}", error);
        }
    }
}

fn format_status(result: &LinkCheckResult) -> String {
    if result.status_code == 0 {
        "❌ ---".to_string()
    } else if result.is_broken {
        format!("❌ {}", result.status_code)
    } else if result.is_redirect {
        format!("🔀 {}", result.status_code)
    } else {
        format!("✅ {}", result.status_code)
    }
}

fn format_message(result: &LinkCheckResult) -> String {
    match (&result.error, &result.final_url) {
        (Some(error), _) => error.clone(),
        (None, Some(final_url)) => format!("-> {}", final_url),
        (None, None) => String::new(),
    }
}

// Shortens long URLs for the table, respecting char boundaries
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
