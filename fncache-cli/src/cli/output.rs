// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Result formatting for CLI output

use super::commands::OutputFormat;
use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use fncache::{
    CatalogManager, CatalogResult, DropSummary, FunctionCacheCatalogEntry, RowId, TableInfo,
};

/// Formatter for catalog rows
pub struct CatalogFormatter;

impl CatalogFormatter {
    /// Cache entries, one per row
    pub fn entries(
        catalog: &CatalogManager,
        entries: &[FunctionCacheCatalogEntry],
        format: OutputFormat,
    ) -> CatalogResult<String> {
        if format == OutputFormat::Json {
            return Ok(Self::to_json(entries));
        }
        if entries.is_empty() {
            return Ok(format!("{}\n", "No function caches found".yellow()));
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(
            ["row_id", "name", "function", "cache_path", "args", "depends on"]
                .into_iter()
                .map(|h| Cell::new(h).fg(Color::Green))
                .collect::<Vec<_>>(),
        );
        for entry in entries {
            table.add_row(vec![
                entry.row_id.to_string(),
                entry.name.clone(),
                Self::function_label(catalog, entry.function_id)?,
                entry.cache_path.clone(),
                entry.args.to_string(),
                Self::dependency_label(entry),
            ]);
        }

        let mut output = String::new();
        output.push_str(&format!("{}\n", "Function Caches".bold().green()));
        output.push_str(&format!("Entries: {}\n\n", entries.len()));
        output.push_str(&table.to_string());
        output.push('\n');
        Ok(output)
    }

    /// One cache entry, field per row
    pub fn entry(
        catalog: &CatalogManager,
        entry: &FunctionCacheCatalogEntry,
        format: OutputFormat,
    ) -> CatalogResult<String> {
        if format == OutputFormat::Json {
            return Ok(Self::to_json(entry));
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.add_row(vec![Cell::new("row_id").fg(Color::Green), Cell::new(entry.row_id)]);
        table.add_row(vec![Cell::new("name").fg(Color::Green), Cell::new(&entry.name)]);
        table.add_row(vec![
            Cell::new("function").fg(Color::Green),
            Cell::new(Self::function_label(catalog, entry.function_id)?),
        ]);
        table.add_row(vec![
            Cell::new("cache_path").fg(Color::Green),
            Cell::new(&entry.cache_path),
        ]);
        table.add_row(vec![
            Cell::new("args").fg(Color::Green),
            Cell::new(entry.args.to_string()),
        ]);
        table.add_row(vec![
            Cell::new("function_depends").fg(Color::Green),
            Cell::new(Self::id_list(&entry.function_depends)),
        ]);
        table.add_row(vec![
            Cell::new("col_depends").fg(Color::Green),
            Cell::new(Self::id_list(&entry.col_depends)),
        ]);
        Ok(format!("{}\n", table))
    }

    pub fn tables(tables: &[TableInfo], format: OutputFormat) -> CatalogResult<String> {
        if format == OutputFormat::Json {
            return Ok(Self::to_json(tables));
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec![
            Cell::new("table").fg(Color::Green),
            Cell::new("columns").fg(Color::Green),
            Cell::new("rows").fg(Color::Green),
        ]);
        for info in tables {
            let columns: Vec<String> = info
                .schema
                .columns
                .iter()
                .map(|c| format!("{} {}", c.name, c.data_type))
                .collect();
            table.add_row(vec![
                Cell::new(&info.schema.name),
                Cell::new(columns.join(", ")),
                Cell::new(info.row_count),
            ]);
        }
        Ok(format!("{}\n", table))
    }

    pub fn drop_summary(
        function: &str,
        summary: &DropSummary,
        format: OutputFormat,
    ) -> CatalogResult<String> {
        if format == OutputFormat::Json {
            return Ok(Self::to_json(summary));
        }
        let mut output = format!("{}\n", format!("Dropped function '{}'", function).green());
        output.push_str(&format!(
            "  caches deleted:  {}\n",
            Self::id_list(&summary.deleted_caches)
        ));
        output.push_str(&format!(
            "  caches detached: {}\n",
            Self::id_list(&summary.detached_caches)
        ));
        Ok(output)
    }

    fn function_label(catalog: &CatalogManager, function_id: RowId) -> CatalogResult<String> {
        Ok(match catalog.functions().get_by_id(function_id)? {
            Some(function) => format!("{} (#{})", function.name, function_id),
            None => format!("#{} (missing)", function_id).red().to_string(),
        })
    }

    fn dependency_label(entry: &FunctionCacheCatalogEntry) -> String {
        let mut parts = Vec::new();
        if !entry.function_depends.is_empty() {
            parts.push(format!("fn {}", Self::id_list(&entry.function_depends)));
        }
        if !entry.col_depends.is_empty() {
            parts.push(format!("col {}", Self::id_list(&entry.col_depends)));
        }
        parts.join("; ")
    }

    fn id_list(ids: &[RowId]) -> String {
        if ids.is_empty() {
            return "-".to_string();
        }
        ids.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
        let mut json = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
            format!("{{\"status\": \"error\", \"error\": \"{}\"}}", e)
        });
        json.push('\n');
        json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_list() {
        assert_eq!(CatalogFormatter::id_list(&[]), "-");
        assert_eq!(CatalogFormatter::id_list(&[3, 5]), "3, 5");
    }

    #[test]
    fn test_json_drop_summary() {
        let summary = DropSummary {
            deleted_caches: vec![1],
            detached_caches: vec![2, 4],
        };
        let json = CatalogFormatter::drop_summary("Blur", &summary, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["detached_caches"], serde_json::json!([2, 4]));
    }
}
