//! Fare record DTOs.
//!
//! These types map directly to the items emitted by the fare collectors.
//! Every field is optional because the collectors omit fields rather than
//! sending nulls, and because different sources emit numbers as strings.

use serde::Deserialize;

/// A JSON scalar that may arrive as a number or as text.
///
/// Bus listings scrape prices out of HTML, so they arrive as strings like
/// `"23,50"`; airline APIs send plain numbers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Interpret the value as a number.
    ///
    /// Text is trimmed and internal whitespace (including non-breaking
    /// spaces) is removed, so `"1 150"` is 1150. A comma is only ever a
    /// decimal separator: text with more than one `,` or `.` is rejected
    /// rather than guessing at thousands grouping.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(s) => {
                let cleaned: String = s.chars().filter(|c| !c.is_whitespace()).collect();
                if cleaned.matches([',', '.']).count() > 1 {
                    return None;
                }
                cleaned.replace(',', ".").parse().ok()
            }
        }
    }

    /// Interpret the value as text, rendering whole numbers without a
    /// fractional part.
    pub fn as_text(&self) -> String {
        match self {
            Scalar::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{}", *n as i64),
            Scalar::Number(n) => n.to_string(),
            Scalar::Text(s) => s.clone(),
        }
    }
}

/// One fare listing as produced by a collector.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFareRecord {
    pub origin_lat: Option<Scalar>,
    pub origin_lon: Option<Scalar>,
    pub origin_title: Option<String>,

    pub destination_lat: Option<Scalar>,
    pub destination_lon: Option<Scalar>,
    pub destination_title: Option<String>,

    pub price: Option<Scalar>,

    /// ISO currency code, or a source-specific numeric code.
    #[serde(rename = "currencyCode", alias = "currency")]
    pub currency_code: Option<Scalar>,

    /// Departure timestamp (ISO 8601).
    #[serde(rename = "departureDate")]
    pub departure_date: Option<String>,

    /// Arrival timestamp (ISO 8601). Airline fare finders often omit it.
    #[serde(rename = "arrivalDate")]
    pub arrival_date: Option<String>,

    /// Carrier label, overriding the label of the file it came from.
    pub carrier: Option<String>,
}
