// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! WARDEN - access-control service.
//!
//! Main binary entry point.

use clap::Parser;

use warden_bin::cli::{Cli, Commands, RunArgs};
use warden_bin::logging::init_logging;
use warden_bin::runtime::{load_config, ServiceRuntime};
use warden_bin::BinResult;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format);

    let command = cli.command.clone().unwrap_or(Commands::Run(RunArgs::default()));

    let result = match command {
        Commands::Run(args) => run(&cli, args).await,
        Commands::CheckConfig => check_config(&cli),
        Commands::Version => {
            print_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "fatal error");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli, args: warden_bin::cli::RunArgs) -> BinResult<()> {
    let mut config = load_config(&cli.config)?;
    if let Some(port) = args.port {
        config = config.with_port(port);
    }

    ServiceRuntime::new(config).run(args.seed_demo).await
}

fn check_config(cli: &Cli) -> BinResult<()> {
    let config = load_config(&cli.config)?;
    config.validate().map_err(warden_bin::BinError::from)?;
    println!("Configuration OK: {}", cli.config.display());
    Ok(())
}

fn print_version() {
    println!("warden {}", warden_bin::VERSION);
    println!("  warden-core   {}", warden_core::VERSION);
    println!("  warden-store  {}", warden_store::VERSION);
    println!("  warden-access {}", warden_access::VERSION);
    println!("  warden-api    {}", warden_api::VERSION);
}
