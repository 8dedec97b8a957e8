// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A single USD → currency rate, with optional display metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct RateEntry {
    pub code: String,
    pub name: String,
    pub rate: f64,
    pub prefix: Option<String>,
}

impl RateEntry {
    /// Entry for a bare numeric rate, as returned by the API or the cache file.
    pub fn bare(code: &str, rate: f64) -> Self {
        Self {
            code: code.to_string(),
            name: code.to_string(),
            rate,
            prefix: None,
        }
    }
}

/// Where a rate table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Built-in table with names and symbols
    Static,
    /// Fetched from the rates API on every start
    Remote,
    /// Read from the local cache file, fetched once if missing
    #[default]
    Cached,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceKind::Static => "static",
            SourceKind::Remote => "remote",
            SourceKind::Cached => "cached",
        };
        f.write_str(s)
    }
}

/// Currency code → rate entry, ordered by code.
#[derive(Debug, Clone)]
pub struct RateTable {
    entries: BTreeMap<String, RateEntry>,
    pub source: SourceKind,
    pub cached_at: Option<DateTime<Local>>,
}

impl RateTable {
    pub fn new(source: SourceKind) -> Self {
        Self {
            entries: BTreeMap::new(),
            source,
            cached_at: None,
        }
    }

    /// Build a table from flat code → rate pairs.
    ///
    /// Rates that are not strictly positive and finite are dropped.
    pub fn from_rates(rates: &HashMap<String, f64>, source: SourceKind) -> Self {
        let mut table = Self::new(source);
        for (code, &rate) in rates {
            table.insert(RateEntry::bare(code, rate));
        }
        table
    }

    /// Returns false (and skips the entry) when the rate is unusable.
    pub fn insert(&mut self, entry: RateEntry) -> bool {
        if !(entry.rate.is_finite() && entry.rate > 0.0) {
            tracing::warn!(code = %entry.code, rate = entry.rate, "Skipping invalid rate");
            return false;
        }
        self.entries.insert(entry.code.clone(), entry);
        true
    }

    pub fn get(&self, code: &str) -> Option<&RateEntry> {
        self.entries.get(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RateEntry> {
        self.entries.values()
    }

    pub fn codes(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The built-in five-currency table.
pub fn static_table() -> RateTable {
    let currencies_data = [
        ("CAD", "Canadian Dollar", 1.33, "$"),
        ("EUR", "Euro", 0.92, "€"),
        ("GBP", "British Pound", 0.77, "£"),
        ("ILS", "Israeli New Shekel", 3.42, "₪"),
        ("JPY", "Japanese Yen", 109.74, "¥"),
    ];

    let mut table = RateTable::new(SourceKind::Static);
    for (code, name, rate, prefix) in currencies_data {
        table.insert(RateEntry {
            code: code.to_string(),
            name: name.to_string(),
            rate,
            prefix: Some(prefix.to_string()),
        });
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_static_table() {
        let table = static_table();
        assert_eq!(table.len(), 5);
        assert_eq!(table.source, SourceKind::Static);
        assert_eq!(table.codes(), vec!["CAD", "EUR", "GBP", "ILS", "JPY"]);

        let jpy = table.get("JPY").unwrap();
        assert_eq!(jpy.name, "Japanese Yen");
        assert_relative_eq!(jpy.rate, 109.74);
        assert_eq!(jpy.prefix.as_deref(), Some("¥"));
    }

    #[test]
    fn test_from_rates_drops_invalid() {
        let mut rates = HashMap::new();
        rates.insert("EUR".to_string(), 0.92);
        rates.insert("BAD".to_string(), 0.0);
        rates.insert("NEG".to_string(), -1.5);
        rates.insert("NAN".to_string(), f64::NAN);

        let table = RateTable::from_rates(&rates, SourceKind::Remote);
        assert_eq!(table.codes(), vec!["EUR"]);

        let eur = table.get("EUR").unwrap();
        assert_eq!(eur.name, "EUR");
        assert!(eur.prefix.is_none());
    }
}
