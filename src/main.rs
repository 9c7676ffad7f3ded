//! Trawler main entry point
//!
//! This is the command-line interface for the Trawler file harvester.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use trawler::config::{load_config_with_hash, validate, Config, FileSelector};
use trawler::crawler::crawl;
use trawler::output::{generate_markdown_summary, print_summary};
use tracing_subscriber::EnvFilter;

/// Trawler: a breadth-first file harvester
///
/// Trawler crawls a website from a seed URL, downloads every linked file
/// matching the selector, and can save pages whose content matches a pattern.
#[derive(Parser, Debug)]
#[command(name = "trawler")]
#[command(version)]
#[command(about = "A breadth-first file harvester", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from
    #[arg(value_name = "URL", required_unless_present = "config")]
    url: Option<String>,

    /// File extensions to download (e.g. ".gif,jpg") or "all"
    #[arg(value_name = "SELECTOR", required_unless_present = "config")]
    selector: Option<String>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum link depth from the seed
    #[arg(short = 'd', long = "depth", value_name = "DEPTH")]
    depth: Option<u32>,

    /// Maximum number of pages to crawl
    #[arg(short = 'p', long = "max-pages", value_name = "MAX_PAGES")]
    max_pages: Option<u32>,

    /// Maximum number of pages fetched at once
    #[arg(short = 'c', long = "concurrency", value_name = "CONCURRENCY")]
    concurrency: Option<u32>,

    /// Pause after each page fetch, in seconds
    #[arg(long, value_name = "SECS")]
    delay: Option<f64>,

    /// Follow links to other hosts
    #[arg(long)]
    no_domain_restriction: bool,

    /// Honor the seed host's robots.txt
    #[arg(long)]
    respect_robots: bool,

    /// Save pages whose body matches this regular expression (case-insensitive)
    #[arg(short = 's', long = "search", value_name = "REGEX")]
    search: Option<String>,

    /// Root directory for downloaded files
    #[arg(short = 'o', long = "output", value_name = "OUTPUT_ROOT")]
    output: Option<String>,

    /// Write a markdown summary to this path when the crawl ends
    #[arg(long, value_name = "PATH")]
    summary: Option<String>,

    /// Stop starting new pages after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Validate the configuration and show what would be crawled
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = build_config(&cli)?;
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config)?;
        return Ok(());
    }

    let mut summary = crawl(config.clone()).await.context("Crawl failed to start")?;
    if let Some(hash) = config_hash {
        summary = summary.with_config_hash(hash);
    }

    if !cli.quiet {
        print_summary(&summary);
    }

    if let Some(path) = &config.output.summary_path {
        generate_markdown_summary(&summary, Path::new(path))
            .with_context(|| format!("Failed to write summary to {}", path))?;
        tracing::info!("Summary written to {}", path);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("trawler=info,warn"),
            1 => EnvFilter::new("trawler=debug,info"),
            2 => EnvFilter::new("trawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the crawl configuration from the config file (if any) and CLI flags
///
/// Flags given on the command line override values from the file.
fn build_config(cli: &Cli) -> Result<(Config, Option<String>)> {
    let (mut config, hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => {
            let url = cli.url.clone().context("a seed URL is required")?;
            let selector = parse_selector(cli.selector.as_deref().unwrap_or_default())?;
            (Config::new(url, selector), None)
        }
    };

    if cli.config.is_some() {
        if let Some(url) = &cli.url {
            config.seed = url.clone();
        }
        if let Some(selector) = &cli.selector {
            config.files = parse_selector(selector)?;
        }
    }

    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.max_concurrent = concurrency;
    }
    if let Some(delay) = cli.delay {
        config.crawler.delay = delay;
    }
    if cli.no_domain_restriction {
        config.crawler.same_domain_only = false;
    }
    if cli.respect_robots {
        config.crawler.respect_robots = true;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.crawl_timeout = Some(timeout);
    }
    if let Some(pattern) = &cli.search {
        config.content.pattern = Some(pattern.clone());
    }
    if let Some(root) = &cli.output {
        config.output.root = root.clone();
    }
    if let Some(summary) = &cli.summary {
        config.output.summary_path = Some(summary.clone());
    }

    Ok((config, hash))
}

fn parse_selector(raw: &str) -> Result<FileSelector> {
    raw.parse::<FileSelector>()
        .with_context(|| format!("Invalid file selector '{}'", raw))
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) -> Result<()> {
    println!("=== Trawler Dry Run ===\n");

    println!("Crawl:");
    println!("  Seed: {}", config.seed);
    println!("  Files: {}", config.files);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Max concurrent pages: {}", config.crawler.max_concurrent);
    println!("  Delay: {}s", config.crawler.delay);
    println!("  Same domain only: {}", config.crawler.same_domain_only);
    println!("  Respect robots.txt: {}", config.crawler.respect_robots);
    if let Some(limit) = config.crawler.crawl_timeout {
        println!("  Crawl timeout: {}s", limit);
    }

    println!("\nContent:");
    match &config.content.pattern {
        Some(pattern) => println!("  Pattern: {}", pattern),
        None => println!("  Pattern: (none)"),
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Files: {}", config.output_dir()?.display());
    if let Some(summary) = &config.output.summary_path {
        println!("  Summary: {}", summary);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}
