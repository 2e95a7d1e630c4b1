//! Search Wiring Check CLI
//!
//! Loads a wiring configuration into an empty container against an offline
//! transport and prints every registered service identifier. Nothing is sent
//! to a search backend.
//!
//! # Usage
//!
//! ```bash
//! wiring-check search.json
//!
//! # With diagnostics wiring
//! SEARCH_WIRING_CONFIG=search.json SEARCH_WIRING_DEBUG=true wiring-check
//! ```
//!
//! # Environment Variables
//!
//! - `SEARCH_WIRING_CONFIG` - Configuration file path
//! - `SEARCH_WIRING_DEBUG` - Wire connections with diagnostics (default: false)
//! - `SEARCH_WIRING_LOG_LEVEL` - Log level (default: info)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use helios_search_wiring::container::{ServiceContainer, ServiceKind};
use helios_search_wiring::transport::StaticTransport;
use helios_search_wiring::{SearchGraphLoader, WiringConfig, init_logging};
use tracing::info;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "wiring-check")]
#[command(about = "Checks a search wiring configuration")]
#[command(version)]
struct Args {
    /// Configuration file (JSON).
    #[arg(env = "SEARCH_WIRING_CONFIG")]
    config: PathBuf,

    /// Wire connections with the stopwatch and the query collector.
    #[arg(long, env = "SEARCH_WIRING_DEBUG", default_value = "false")]
    debug: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "SEARCH_WIRING_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = WiringConfig::from_path(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    let mut container = ServiceContainer::new();
    let report = SearchGraphLoader::new(Arc::new(StaticTransport::new()))
        .with_diagnostics(args.debug)
        .load(&config, &mut container)
        .context("wiring configuration")?;

    if report.skipped {
        println!("No indexes configured, nothing to wire.");
        return Ok(());
    }

    for kind in [
        ServiceKind::Connection,
        ServiceKind::Index,
        ServiceKind::Type,
        ServiceKind::DocumentManager,
        ServiceKind::Collector,
    ] {
        for id in container.ids_of_kind(kind) {
            println!("{:<18} {}", kind.as_str(), id);
        }
    }

    info!(
        handles = report.total(),
        diagnostics = report.diagnostics,
        "Configuration is valid"
    );
    Ok(())
}
