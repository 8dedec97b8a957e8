// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use super::rates::RateTable;
use thiserror::Error;

/// Validation failures a user can fix by changing the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("Input should be greater than zero.")]
    NonPositiveAmount,
    #[error("Choose a currency.")]
    NoCurrency,
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
}

/// Convert a USD amount into `code` and format it for display.
///
/// The result always carries two decimals, preceded by the currency symbol
/// when the table knows one (e.g. `"$ 133.00"`). `{:.2}` rounds the exact
/// binary value of the product, so there is a single rounding step.
pub fn convert(
    amount: Option<f64>,
    code: Option<&str>,
    table: &RateTable,
) -> Result<String, ConversionError> {
    let amount = match amount {
        Some(a) if a.is_finite() && a > 0.0 => a,
        _ => return Err(ConversionError::NonPositiveAmount),
    };
    let code = match code {
        Some(c) if !c.trim().is_empty() => c.trim(),
        _ => return Err(ConversionError::NoCurrency),
    };
    let entry = table
        .get(code)
        .ok_or_else(|| ConversionError::UnknownCurrency(code.to_string()))?;

    let converted = amount * entry.rate;
    tracing::debug!(amount, code, rate = entry.rate, converted, "Converted");

    Ok(match &entry.prefix {
        Some(prefix) => format!("{} {:.2}", prefix, converted),
        None => format!("{:.2}", converted),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rates::{static_table, SourceKind};
    use std::collections::HashMap;

    fn remote_table() -> RateTable {
        let mut rates = HashMap::new();
        rates.insert("CAD".to_string(), 1.33);
        rates.insert("EUR".to_string(), 0.92);
        rates.insert("JPY".to_string(), 109.74);
        RateTable::from_rates(&rates, SourceKind::Remote)
    }

    #[test]
    fn test_convert_flat_rate() {
        let table = remote_table();
        assert_eq!(convert(Some(100.0), Some("CAD"), &table).unwrap(), "133.00");
        assert_eq!(convert(Some(1.0), Some("EUR"), &table).unwrap(), "0.92");
        assert_eq!(convert(Some(10.0), Some("JPY"), &table).unwrap(), "1097.40");
    }

    #[test]
    fn test_convert_with_prefix() {
        let table = static_table();
        assert_eq!(convert(Some(100.0), Some("CAD"), &table).unwrap(), "$ 133.00");
        assert_eq!(convert(Some(50.0), Some("GBP"), &table).unwrap(), "£ 38.50");
        assert_eq!(convert(Some(2.0), Some("ILS"), &table).unwrap(), "₪ 6.84");
    }

    #[test]
    fn test_convert_rounds_to_two_decimals() {
        let table = remote_table();
        // 0.33 * 0.92 = 0.3036
        assert_eq!(convert(Some(0.33), Some("EUR"), &table).unwrap(), "0.30");
        // 1.01 * 1.33 = 1.3433
        assert_eq!(convert(Some(1.01), Some("CAD"), &table).unwrap(), "1.34");
    }

    #[test]
    fn test_convert_rejects_missing_amount() {
        let table = remote_table();
        assert_eq!(
            convert(None, Some("CAD"), &table),
            Err(ConversionError::NonPositiveAmount)
        );
        assert_eq!(
            convert(Some(0.0), Some("CAD"), &table),
            Err(ConversionError::NonPositiveAmount)
        );
        assert_eq!(
            convert(Some(-5.0), Some("CAD"), &table),
            Err(ConversionError::NonPositiveAmount)
        );
        assert_eq!(
            convert(Some(f64::NAN), Some("CAD"), &table),
            Err(ConversionError::NonPositiveAmount)
        );
    }

    #[test]
    fn test_amount_checked_before_currency() {
        let table = remote_table();
        assert_eq!(convert(Some(0.0), None, &table), Err(ConversionError::NonPositiveAmount));
    }

    #[test]
    fn test_convert_rejects_missing_currency() {
        let table = remote_table();
        assert_eq!(convert(Some(10.0), None, &table), Err(ConversionError::NoCurrency));
        assert_eq!(convert(Some(10.0), Some(""), &table), Err(ConversionError::NoCurrency));
        assert_eq!(
            convert(Some(10.0), Some("XXX"), &table),
            Err(ConversionError::UnknownCurrency("XXX".to_string()))
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ConversionError::NonPositiveAmount.to_string(),
            "Input should be greater than zero."
        );
        assert_eq!(ConversionError::NoCurrency.to_string(), "Choose a currency.");
    }

    #[test]
    fn test_convert_rounds_product_once() {
        let table = static_table();
        // 0.75 * 109.74 is 82.30499999999999 in f64, below the half cent
        assert_eq!(convert(Some(0.75), Some("JPY"), &table).unwrap(), "¥ 82.30");
        // 0.25 * 3.42 is just below 0.855
        assert_eq!(convert(Some(0.25), Some("ILS"), &table).unwrap(), "₪ 0.85");
    }
}
