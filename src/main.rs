//! Bagyo - typhoon and earthquake tracking for the Philippine Area of
//! Responsibility
//!
//! Fetches active storms, recent earthquakes, and monitored low pressure
//! areas from public feeds, normalizes them, and prints an aggregated
//! snapshot to the terminal.

use std::time::Duration;

use clap::Parser;

use bagyo::aggregate::Aggregator;
use bagyo::cli::Cli;
use bagyo::config::AppConfig;
use bagyo::data::Snapshot;
use bagyo::report;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config = AppConfig::from_env();
    let aggregator = Aggregator::new(&config).with_quake_filter(cli.min_magnitude, cli.limit);

    let snapshot = aggregator.load_all().await;
    print_snapshot(&snapshot, cli.json);

    if cli.watch {
        let mut ticker = tokio::time::interval(Duration::from_secs(cli.interval.max(1)));
        // The first tick fires immediately; the snapshot above covers it
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let snapshot = aggregator.load_all().await;
            print_snapshot(&snapshot, cli.json);
        }
    }
}

fn print_snapshot(snapshot: &Snapshot, as_json: bool) {
    if as_json {
        match report::render_json(snapshot) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error: failed to encode snapshot: {e}"),
        }
    } else {
        print!("{}", report::render_text(snapshot));
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
