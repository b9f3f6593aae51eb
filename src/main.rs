//! Route documentation extractor - Command-line tool for documenting web application routes.
//!
//! This binary scans a Flask or Express code base, finds every route declaration and renders
//! the routes, with their documented parameters and responses, as Markdown, JSON or YAML.
//!
//! # Usage
//!
//! ```bash
//! route-docgen [OPTIONS] <INPUT_PATH>
//! ```
//!
//! # Examples
//!
//! Generate Markdown documentation for a Flask app:
//! ```bash
//! route-docgen ./my-flask-app -w flask -o API.md
//! ```
//!
//! Generate JSON with auto-detection:
//! ```bash
//! route-docgen ./my-app -f json -o routes.json
//! ```
//!
//! Delegate parsing to an external program:
//! ```bash
//! route-docgen ./my-app --parser-command node tools/parse-routes.js
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use route_docgen::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    // Initialize logger based on verbose flag
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Route documentation extractor starting...");

    let args = cli::parse_args_from_parsed(args)?;

    cli::run(args)?;

    info!("Route documentation completed successfully");

    Ok(())
}
