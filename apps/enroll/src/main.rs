//! # Enroll - Account Registration Server
//!
//! The main binary for the Enroll registration workflow.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for policy checks and scripted registrations
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      apps/enroll (THE BINARY)                   │
//! │                                                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐    │
//! │  │   CLI       │    │   HTTP API  │    │  Backend Client  │    │
//! │  │  (clap)     │    │   (axum)    │    │   (reqwest)      │    │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘    │
//! │         │                  │                    │              │
//! │         └──────────────────┼────────────────────┘              │
//! │                            ▼                                   │
//! │                    ┌───────────────┐                           │
//! │                    │  enroll-core  │                           │
//! │                    │ (THE LOGIC)   │                           │
//! │                    └───────────────┘                           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! enroll server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! enroll check-password --password abc12345
//! enroll check-email someone@example.com
//! enroll register --identifier ada --email ada@example.com --code 123456 \
//!     --password abc12345 --confirm abc12345
//! ```

use clap::Parser;
use enroll::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // ENROLL_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("ENROLL_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "enroll=debug,tower_http=debug"
    } else {
        "enroll=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    match cli::execute(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print the Enroll startup banner.
fn print_banner() {
    println!(
        r#"
  ███████╗███╗   ██╗██████╗  ██████╗ ██╗     ██╗
  ██╔════╝████╗  ██║██╔══██╗██╔═══██╗██║     ██║
  █████╗  ██╔██╗ ██║██████╔╝██║   ██║██║     ██║
  ██╔══╝  ██║╚██╗██║██╔══██╗██║   ██║██║     ██║
  ███████╗██║ ╚████║██║  ██║╚██████╔╝███████╗███████╗
  ╚══════╝╚═╝  ╚═══╝╚═╝  ╚═╝ ╚═════╝ ╚══════╝╚══════╝

  Account Registration Server v{}

  Identify • Verify • Create
"#,
        env!("CARGO_PKG_VERSION")
    );
}
