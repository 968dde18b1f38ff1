//! # Enroll CLI Module
//!
//! This module implements the CLI interface for Enroll.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `check-password` - Evaluate a password against the policy
//! - `check-email` - Check the shape of an email address
//! - `register` - Drive one registration through every stage

mod commands;

use crate::config::AppConfig;
use clap::{Parser, Subcommand};
use enroll_core::EnrollError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Enroll - account registration server
///
/// Three-stage registration workflow: identification, email verification,
/// credential creation.
#[derive(Parser, Debug)]
#[command(name = "enroll")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides the config file)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Evaluate a password against the policy
    CheckPassword {
        /// Password to evaluate
        #[arg(long)]
        password: String,

        /// Confirmation (defaults to the password)
        #[arg(long)]
        confirm: Option<String>,
    },

    /// Check the shape of an email address
    CheckEmail {
        /// Address to check
        address: String,
    },

    /// Drive one registration through every stage
    Register {
        #[arg(long)]
        identifier: String,

        #[arg(long)]
        email: String,

        /// Verification code received by email
        #[arg(long)]
        code: String,

        #[arg(long)]
        password: String,

        #[arg(long)]
        confirm: String,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
///
/// `Ok(false)` means the command ran but its check or registration failed.
pub async fn execute(cli: Cli) -> Result<bool, EnrollError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Server { host, port } => {
            let mut config = AppConfig::load(cli.config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            cmd_server(&config).await.map(|()| true)
        }
        Commands::CheckPassword { password, confirm } => {
            Ok(cmd_check_password(&password, confirm.as_deref(), json_mode))
        }
        Commands::CheckEmail { address } => Ok(cmd_check_email(&address, json_mode)),
        Commands::Register {
            identifier,
            email,
            code,
            password,
            confirm,
        } => {
            let config = AppConfig::load(cli.config.as_deref())?;
            let input = RegisterInput {
                identifier,
                email,
                code,
                password,
                confirm,
            };
            cmd_register(&config, input, json_mode).await
        }
    }
}
