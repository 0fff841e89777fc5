//! Currency normalization for fare prices.
//!
//! Fare sources quote prices in their own currencies. Before a fare enters
//! the graph its price is converted to a single reference currency so that
//! itinerary prices can be summed and compared.

use std::collections::HashMap;

use serde::Deserialize;

/// Errors from currency conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurrencyError {
    /// The currency code is not in the conversion table
    #[error("unsupported currency: {0}")]
    Unsupported(String),

    /// A conversion multiplier is not a positive finite number
    #[error("invalid rate {rate} for currency {code}")]
    InvalidRate { code: String, rate: f64 },
}

/// On-disk shape of a rates table.
///
/// ```json
/// { "reference": "EUR", "rates": { "PLN": 0.2394, "UAH": 0.0297 } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RatesTable {
    pub reference: String,
    #[serde(default)]
    pub rates: HashMap<String, f64>,
}

/// Converts prices into the reference currency using a fixed table.
///
/// Codes are matched case-insensitively after trimming whitespace. The
/// reference currency itself always converts at 1.0.
///
/// # Examples
///
/// ```
/// use fare_router::fare::FareNormalizer;
///
/// let normalizer = FareNormalizer::default();
/// assert_eq!(normalizer.to_reference_currency(100.0, "EUR").unwrap(), 100.0);
/// assert!(normalizer.to_reference_currency(100.0, "XYZ").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct FareNormalizer {
    reference: String,
    rates: HashMap<String, f64>,
}

impl FareNormalizer {
    /// Create a normalizer that only knows its reference currency.
    pub fn new(reference: &str) -> Self {
        let reference = normalize_code(reference);
        let mut rates = HashMap::new();
        rates.insert(reference.clone(), 1.0);
        Self { reference, rates }
    }

    /// Build a normalizer from a deserialized rates table.
    pub fn from_table(table: RatesTable) -> Result<Self, CurrencyError> {
        let mut normalizer = Self::new(&table.reference);
        for (code, rate) in table.rates {
            normalizer.add_rate(&code, rate)?;
        }
        Ok(normalizer)
    }

    /// Add a conversion multiplier, builder style.
    pub fn with_rate(mut self, code: &str, multiplier: f64) -> Result<Self, CurrencyError> {
        self.add_rate(code, multiplier)?;
        Ok(self)
    }

    /// Add or replace a conversion multiplier.
    ///
    /// `multiplier` converts one unit of `code` into the reference currency.
    pub fn add_rate(&mut self, code: &str, multiplier: f64) -> Result<(), CurrencyError> {
        let code = normalize_code(code);
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(CurrencyError::InvalidRate {
                code,
                rate: multiplier,
            });
        }
        self.rates.insert(code, multiplier);
        Ok(())
    }

    /// The reference currency code.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Returns true if `code` can be converted.
    pub fn supports(&self, code: &str) -> bool {
        self.rates.contains_key(&normalize_code(code))
    }

    /// Number of known currency codes, including the reference.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Convert `amount` in `code` to the reference currency.
    pub fn to_reference_currency(&self, amount: f64, code: &str) -> Result<f64, CurrencyError> {
        let code = normalize_code(code);
        self.rates
            .get(&code)
            .map(|rate| amount * rate)
            .ok_or(CurrencyError::Unsupported(code))
    }
}

impl Default for FareNormalizer {
    /// Euro-based table covering the bus and airline sources.
    ///
    /// `31` is the numeric code one bus operator uses for hryvnia.
    fn default() -> Self {
        let mut rates = HashMap::new();
        rates.insert("EUR".to_string(), 1.0);
        rates.insert("UAH".to_string(), 0.029678566);
        rates.insert("31".to_string(), 0.029678566);
        rates.insert("PLN".to_string(), 0.239407099);

        Self {
            reference: "EUR".to_string(),
            rates,
        }
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
