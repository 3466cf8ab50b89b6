// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! This module provides the command-line interface for WARDEN using clap.
//! It supports multiple subcommands:
//!
//! - `run`: Start the access-control service (default)
//! - `check-config`: Validate a configuration file
//! - `version`: Show version information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// WARDEN - role/permission resolution and session issuance service.
#[derive(Parser, Debug)]
#[command(
    name = "warden",
    version = warden_core::VERSION,
    about = "WARDEN access-control service",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "warden.json",
        env = "WARDEN_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        default_value = "info",
        env = "WARDEN_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json, compact)
    #[arg(long, default_value = "text", env = "WARDEN_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the WARDEN CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the service
    ///
    /// This is the default command when no subcommand is specified.
    Run(RunArgs),

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration without starting the
    /// service.
    CheckConfig,

    /// Show detailed version information
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `run` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Seed the in-memory store with demo users and roles
    #[arg(long)]
    pub seed_demo: bool,

    /// Override the listen port
    #[arg(short, long)]
    pub port: Option<u16>,
}

// =============================================================================
// LogFormat
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for log aggregation.
    Json,
    /// Minimal compact output.
    Compact,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["warden"]);

        assert_eq!(cli.log_level, "info");
        assert_eq!(cli.log_format, LogFormat::Text);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_run_command_with_seed() {
        let cli = Cli::parse_from(["warden", "run", "--seed-demo", "--port", "9090"]);

        match cli.command {
            Some(Commands::Run(args)) => {
                assert!(args.seed_demo);
                assert_eq!(args.port, Some(9090));
            }
            other => panic!("expected Run, got {:?}", other),
        }
    }

    #[test]
    fn test_check_config_command() {
        let cli = Cli::parse_from(["warden", "check-config", "--config", "custom.json"]);

        assert!(matches!(cli.command, Some(Commands::CheckConfig)));
        assert_eq!(cli.config, PathBuf::from("custom.json"));
    }
}
