// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use crate::api::RatesClientTrait;
use crate::models::{static_table, RateTable, SourceKind};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Produce the rate table for `source`. Network and cache errors are fatal.
pub async fn load_rates<C>(source: SourceKind, cache_path: &Path, client: &C) -> Result<RateTable>
where
    C: RatesClientTrait + Sync + ?Sized,
{
    match source {
        SourceKind::Static => Ok(static_table()),
        SourceKind::Remote => fetch_remote(client).await,
        SourceKind::Cached => load_cached(cache_path, client).await,
    }
}

pub async fn fetch_remote<C>(client: &C) -> Result<RateTable>
where
    C: RatesClientTrait + Sync + ?Sized,
{
    let rates = client
        .get_latest_rates()
        .await
        .context("Failed to fetch exchange rates")?;
    Ok(RateTable::from_rates(&rates, SourceKind::Remote))
}

/// Read the cache file, fetching and writing it first if it does not exist.
pub async fn load_cached<C>(cache_path: &Path, client: &C) -> Result<RateTable>
where
    C: RatesClientTrait + Sync + ?Sized,
{
    if let Some(rates) = read_cache(cache_path)? {
        tracing::info!(path = %cache_path.display(), count = rates.len(), "Using cached exchange rates");
        let mut table = RateTable::from_rates(&rates, SourceKind::Cached);
        table.cached_at = cache_modified(cache_path);
        return Ok(table);
    }

    tracing::info!(path = %cache_path.display(), "No rate cache, fetching");
    let rates = client
        .get_latest_rates()
        .await
        .context("Failed to fetch exchange rates")?;
    write_cache(cache_path, &rates, false)?;

    let mut table = RateTable::from_rates(&rates, SourceKind::Cached);
    table.cached_at = cache_modified(cache_path);
    Ok(table)
}

/// Fetch fresh rates and overwrite the cache file.
pub async fn refresh_cache<C>(cache_path: &Path, client: &C) -> Result<RateTable>
where
    C: RatesClientTrait + Sync + ?Sized,
{
    let rates = client
        .get_latest_rates()
        .await
        .context("Failed to fetch exchange rates")?;
    write_cache(cache_path, &rates, true)?;

    let mut table = RateTable::from_rates(&rates, SourceKind::Cached);
    table.cached_at = cache_modified(cache_path);
    Ok(table)
}

/// `Ok(None)` when the cache file does not exist.
pub fn read_cache(cache_path: &Path) -> Result<Option<HashMap<String, f64>>> {
    let text = match fs::read_to_string(cache_path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", cache_path.display()))
        }
    };
    let rates = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse rate cache {}", cache_path.display()))?;
    Ok(Some(rates))
}

/// Write code → rate as a JSON object. Without `overwrite` an existing file is an error.
pub fn write_cache(cache_path: &Path, rates: &HashMap<String, f64>, overwrite: bool) -> Result<()> {
    if let Some(parent) = cache_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let mut file = options
        .open(cache_path)
        .with_context(|| format!("Failed to create rate cache {}", cache_path.display()))?;
    let json = serde_json::to_string(rates)?;
    file.write_all(json.as_bytes())?;

    tracing::info!(path = %cache_path.display(), count = rates.len(), "Exchange rates cached");
    Ok(())
}

fn cache_modified(cache_path: &Path) -> Option<DateTime<Local>> {
    let modified = fs::metadata(cache_path).and_then(|m| m.modified()).ok()?;
    Some(DateTime::<Local>::from(modified))
}
