// SPDX-FileCopyrightText: 2025 Joost van der Laan
// SPDX-License-Identifier: AGPL-3.0-only

use crate::models::RateTable;
use anyhow::Result;
use chrono::Local;
use csv::Writer;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Print the rate table as aligned columns.
pub fn print_rates<W: Write>(table: &RateTable, out: &mut W) -> Result<()> {
    writeln!(out, "Source: {}", describe_source(table))?;
    writeln!(out, "{:<6} {:<24} {:>12}  Prefix", "Code", "Name", "Rate")?;
    for entry in table.iter() {
        writeln!(
            out,
            "{:<6} {:<24} {:>12.4}  {}",
            entry.code,
            entry.name,
            entry.rate,
            entry.prefix.as_deref().unwrap_or("")
        )?;
    }
    Ok(())
}

/// e.g. "cached (2026-10-19 09:12)"
pub fn describe_source(table: &RateTable) -> String {
    match table.cached_at {
        Some(at) => format!("{} ({})", table.source, at.format("%Y-%m-%d %H:%M")),
        None => table.source.to_string(),
    }
}

/// Export the rate table to `output_dir/rates_<timestamp>.csv`.
pub fn export_rates_csv(table: &RateTable, output_dir: &Path) -> Result<PathBuf> {
    // Create output directory if it doesn't exist
    if !output_dir.exists() {
        fs::create_dir_all(output_dir)?;
    }

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let csv_path = output_dir.join(format!("rates_{}.csv", timestamp));
    let mut writer = Writer::from_path(&csv_path)?;

    // Write headers
    writer.write_record(["Code", "Name", "Rate", "Prefix", "Base Currency", "Source"])?;

    let source = table.source.to_string();
    for entry in table.iter() {
        let rate = entry.rate.to_string();
        writer.write_record([
            entry.code.as_str(),
            entry.name.as_str(),
            rate.as_str(),
            entry.prefix.as_deref().unwrap_or(""),
            "USD",
            source.as_str(),
        ])?;
    }

    writer.flush()?;
    tracing::info!(path = %csv_path.display(), count = table.len(), "Exchange rates exported");
    Ok(csv_path)
}
