// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Command-line arguments

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fncache")]
#[command(about = "Inspect and maintain a function cache catalog", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Catalog directory
    #[arg(short, long, global = true)]
    pub path: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List function cache entries
    List {
        /// Only caches owned by this function
        #[arg(long)]
        function: Option<String>,
    },

    /// Show one function cache entry
    Show {
        /// Cache name
        name: String,

        /// Owning function, required when several functions share the name
        #[arg(long)]
        function: Option<String>,
    },

    /// Delete a function cache entry
    DropCache {
        /// Row id of the entry
        row_id: u64,
    },

    /// Delete a function and every cache it owns
    DropFunction {
        /// Function name
        name: String,

        /// Also delete caches that merely depend on the function
        #[arg(long)]
        cascade_dependents: bool,
    },

    /// List catalog tables with row counts
    Tables,

    /// Remove rows left dangling by an interrupted delete
    Repair,

    /// Show version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_drop_function() {
        let cli = Cli::parse_from([
            "fncache",
            "--path",
            "/tmp/catalog",
            "drop-function",
            "Blur",
            "--cascade-dependents",
        ]);
        assert_eq!(cli.path, Some(PathBuf::from("/tmp/catalog")));
        match cli.command {
            Commands::DropFunction {
                name,
                cascade_dependents,
            } => {
                assert_eq!(name, "Blur");
                assert!(cascade_dependents);
            }
            _ => panic!("expected drop-function"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["fncache", "list", "--format", "json", "--log-level", "debug"]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        assert!(matches!(cli.command, Commands::List { function: None }));
    }
}
