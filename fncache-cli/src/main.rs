// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! fncache CLI entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        // RUST_LOG can still raise this
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    match cli.command {
        Commands::Version => {
            println!("{} {}", "fncache".bold().green(), fncache::VERSION);
            println!("Function cache catalog inspector");
            Ok(())
        }

        Commands::List { function } => cli::handle_list(cli.path, function, cli.format),

        Commands::Show { name, function } => {
            cli::handle_show(cli.path, name, function, cli.format)
        }

        Commands::DropCache { row_id } => cli::handle_drop_cache(cli.path, row_id),

        Commands::DropFunction {
            name,
            cascade_dependents,
        } => cli::handle_drop_function(cli.path, name, cascade_dependents, cli.format),

        Commands::Tables => cli::handle_tables(cli.path, cli.format),

        Commands::Repair => cli::handle_repair(cli.path),
    }
}
