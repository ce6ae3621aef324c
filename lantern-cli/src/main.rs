//! Lantern CLI
//!
//! Reconnaissance scanner for Tor hidden services.

mod output;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use lantern_core::{ScanTarget, Settings};
use lantern_tor::{check_tor_connection, ScanError, Scanner, SharedFetcher, TorClient};

use output::OutputMode;

#[derive(Parser)]
#[command(name = "lantern")]
#[command(author, version, about = "Reconnaissance scanner for Tor hidden services", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1")]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan an .onion site for pages, exposed paths, and advisory metadata
    Scan {
        /// The .onion URL to scan (e.g. http://example.onion/)
        target: String,

        /// Maximum crawl depth for internal links (0 scans the base URL only)
        #[arg(short, long, default_value = "1")]
        depth: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputMode::Human)]
        output: OutputMode,
    },

    /// Check Tor connection status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match cli.command {
        Commands::Scan {
            target,
            depth,
            output,
        } => {
            run_scan(&target, depth, output).await?;
        }
        Commands::Status => {
            check_status().await?;
        }
    }

    Ok(())
}

async fn run_scan(raw_target: &str, depth: usize, mode: OutputMode) -> Result<()> {
    if mode == OutputMode::Human {
        output::print_banner();
    }

    let target = match ScanTarget::parse(raw_target) {
        Ok(target) => target,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let settings = Settings::load();
    let client = TorClient::new(&settings)?;
    let fetcher: SharedFetcher = Arc::new(client);
    let scanner = Scanner::new(fetcher, settings.clone(), target.clone(), depth);

    if mode == OutputMode::Human {
        println!("Scanning {} (depth {})\n", target, depth);
    }

    let started = Instant::now();
    let findings = match scanner.run().await {
        Ok(findings) => findings,
        Err(ScanError::Unreachable(msg)) => {
            eprintln!("❌ Initial connection to {} failed: {}", target, msg);
            eprintln!(
                "   Cannot proceed with the scan. Is Tor running? Expected proxy at {}",
                settings.http_proxy
            );
            std::process::exit(1);
        }
    };

    match mode {
        OutputMode::Human => {
            output::print_table(&target, &findings);
            println!("\nScan complete.");
        }
        OutputMode::Json => {
            println!(
                "{}",
                output::render_json(&target, depth, &findings, started.elapsed())?
            );
        }
    }

    Ok(())
}

async fn check_status() -> Result<()> {
    println!("🔌 Checking Tor connection...\n");

    let settings = Settings::load();

    match check_tor_connection(&settings).await {
        Ok(true) => {
            println!("✅ Tor is running and accessible");
            println!("   Proxy: {}", settings.http_proxy);
        }
        Ok(false) => {
            println!("❌ Tor is not accessible");
            println!("   Expected proxy at: {}", settings.http_proxy);
            println!("\n   To install Tor:");
            println!("   - Linux: sudo apt install tor");
            println!("   - Mac: brew install tor");
            println!("   - Then start: sudo systemctl start tor (or brew services start tor)");
        }
        Err(e) => {
            println!("❌ Error checking Tor: {}", e);
        }
    }

    Ok(())
}
