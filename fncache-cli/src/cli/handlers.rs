// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Command handlers

use super::commands::OutputFormat;
use super::output::CatalogFormatter;
use colored::Colorize;
use fncache::{CatalogConfig, CatalogError, CatalogManager, DependencyDeletePolicy, RowId};
use std::path::PathBuf;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open an existing on-disk catalog
fn open_catalog(path: Option<PathBuf>) -> Result<CatalogManager, Box<dyn std::error::Error>> {
    let path = path.ok_or("--path is required for this command")?;
    if !path.exists() {
        return Err(format!("No catalog found at {}", path.display()).into());
    }
    log::info!("Opening catalog at {}", path.display());
    Ok(CatalogManager::open(&path, CatalogConfig::durable())?)
}

pub fn handle_list(
    path: Option<PathBuf>,
    function: Option<String>,
    format: OutputFormat,
) -> CliResult {
    let catalog = open_catalog(path)?;
    let entries = match function {
        Some(name) => {
            let function = catalog
                .get_function_catalog_entry_by_name(&name)?
                .ok_or_else(|| CatalogError::EntityNotFound(format!("function '{}'", name)))?;
            catalog.function_caches().list_by_function(function.row_id)?
        }
        None => catalog.function_caches().list()?,
    };
    print!("{}", CatalogFormatter::entries(&catalog, &entries, format)?);
    Ok(())
}

pub fn handle_show(
    path: Option<PathBuf>,
    name: String,
    function: Option<String>,
    format: OutputFormat,
) -> CliResult {
    let catalog = open_catalog(path)?;
    let entry = match function {
        Some(function) => catalog.get_function_cache_for_function(&name, &function)?,
        None => catalog.get_function_cache_catalog_entry_by_name(&name)?,
    };
    match entry {
        Some(entry) => print!("{}", CatalogFormatter::entry(&catalog, &entry, format)?),
        None => println!("{}", format!("No function cache named '{}'", name).yellow()),
    }
    Ok(())
}

pub fn handle_drop_cache(path: Option<PathBuf>, row_id: RowId) -> CliResult {
    let catalog = open_catalog(path)?;
    if catalog.drop_function_cache_catalog_entry(row_id)? {
        catalog.flush()?;
        println!("{}", format!("Dropped function cache {}", row_id).green());
    } else {
        println!("{}", format!("No function cache with row id {}", row_id).yellow());
    }
    Ok(())
}

pub fn handle_drop_function(
    path: Option<PathBuf>,
    name: String,
    cascade_dependents: bool,
    format: OutputFormat,
) -> CliResult {
    let catalog = open_catalog(path)?;
    let policy = if cascade_dependents {
        DependencyDeletePolicy::Cascade
    } else {
        catalog.config().dependency_delete_policy
    };
    match catalog.drop_function_with_policy(&name, policy)? {
        Some(summary) => {
            catalog.flush()?;
            print!("{}", CatalogFormatter::drop_summary(&name, &summary, format)?);
        }
        None => println!("{}", format!("No function named '{}'", name).yellow()),
    }
    Ok(())
}

pub fn handle_tables(path: Option<PathBuf>, format: OutputFormat) -> CliResult {
    let catalog = open_catalog(path)?;
    let tables = catalog.list_tables()?;
    print!("{}", CatalogFormatter::tables(&tables, format)?);
    Ok(())
}

pub fn handle_repair(path: Option<PathBuf>) -> CliResult {
    let catalog = open_catalog(path)?;
    let removed = catalog.repair()?;
    catalog.flush()?;
    if removed == 0 {
        println!("{}", "Catalog is consistent".green());
    } else {
        println!("{}", format!("Removed {} dangling rows", removed).yellow());
    }
    Ok(())
}
