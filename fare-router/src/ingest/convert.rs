//! Conversion from fare DTOs to validated records.
//!
//! This is the ingestion boundary: a record that is missing a required
//! field or carries an unparseable value is rejected here and never reaches
//! the graph.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::domain::{Coordinate, InvalidCoordinate};

use super::types::{RawFareRecord, Scalar};

/// Trip length in hours assumed when a listing has no arrival time.
pub const DEFAULT_TRIP_HOURS: i64 = 3;

/// Error during DTO to record conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Field is present but not a number
    #[error("invalid number in {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },

    /// Field is present but not a recognizable timestamp
    #[error("invalid timestamp in {field}: {value}")]
    InvalidTimestamp { field: &'static str, value: String },

    /// Latitude/longitude pair out of range
    #[error("invalid {field} coordinate: {source}")]
    InvalidCoordinate {
        field: &'static str,
        source: InvalidCoordinate,
    },

    /// Price is negative or not finite
    #[error("invalid price: {0}")]
    InvalidPrice(f64),

    /// Arrival precedes departure
    #[error("arrival {arrival} is before departure {departure}")]
    ArrivalBeforeDeparture {
        departure: NaiveDateTime,
        arrival: NaiveDateTime,
    },
}

/// A validated fare listing, price still in its source currency.
#[derive(Debug, Clone, PartialEq)]
pub struct FareRecord {
    pub origin: Coordinate,
    pub origin_name: String,
    pub destination: Coordinate,
    pub destination_name: String,
    pub price: f64,
    /// Currency code as listed, e.g. "EUR" or "31".
    pub currency: String,
    pub departure: NaiveDateTime,
    pub arrival: Option<NaiveDateTime>,
    pub carrier: Option<String>,
}

impl FareRecord {
    /// Arrival time, or departure plus [`DEFAULT_TRIP_HOURS`] if the
    /// listing had none.
    pub fn arrival_or_default(&self) -> NaiveDateTime {
        self.arrival
            .unwrap_or(self.departure + Duration::hours(DEFAULT_TRIP_HOURS))
    }
}

/// Convert a raw fare item into a validated record.
pub fn convert_record(raw: &RawFareRecord) -> Result<FareRecord, ConversionError> {
    let origin = coordinate(
        (&raw.origin_lat, "origin_lat"),
        (&raw.origin_lon, "origin_lon"),
        "origin",
    )?;
    let origin_name = required_text(&raw.origin_title, "origin_title")?;

    let destination = coordinate(
        (&raw.destination_lat, "destination_lat"),
        (&raw.destination_lon, "destination_lon"),
        "destination",
    )?;
    let destination_name = required_text(&raw.destination_title, "destination_title")?;

    let price = number(&raw.price, "price")?;
    if !price.is_finite() || price < 0.0 {
        return Err(ConversionError::InvalidPrice(price));
    }

    let currency = raw
        .currency_code
        .as_ref()
        .map(Scalar::as_text)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or(ConversionError::MissingField("currencyCode"))?;

    let departure_raw = raw
        .departure_date
        .as_deref()
        .ok_or(ConversionError::MissingField("departureDate"))?;
    let departure =
        parse_timestamp(departure_raw).ok_or_else(|| ConversionError::InvalidTimestamp {
            field: "departureDate",
            value: departure_raw.to_string(),
        })?;

    let arrival = match raw.arrival_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(s) => Some(
            parse_timestamp(s).ok_or_else(|| ConversionError::InvalidTimestamp {
                field: "arrivalDate",
                value: s.to_string(),
            })?,
        ),
    };

    if let Some(arrival) = arrival {
        if arrival < departure {
            return Err(ConversionError::ArrivalBeforeDeparture { departure, arrival });
        }
    }

    let carrier = raw
        .carrier
        .as_ref()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    Ok(FareRecord {
        origin,
        origin_name,
        destination,
        destination_name,
        price,
        currency,
        departure,
        arrival,
        carrier,
    })
}

/// Parse a collector timestamp.
///
/// Accepts RFC 3339 (the offset is dropped, keeping local wall-clock time),
/// naive `YYYY-MM-DDTHH:MM[:SS[.fff]]` with `T` or space, and bare dates,
/// which mean midnight.
///
/// # Examples
///
/// ```
/// use fare_router::ingest::parse_timestamp;
///
/// let t = parse_timestamp("2018-01-11T06:30:00+02:00").unwrap();
/// assert_eq!(t.to_string(), "2018-01-11 06:30:00");
///
/// assert!(parse_timestamp("2018-01-11").is_some());
/// assert!(parse_timestamp("next tuesday").is_none());
/// ```
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

fn required_text(value: &Option<String>, field: &'static str) -> Result<String, ConversionError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(ConversionError::MissingField(field))
}

fn number(value: &Option<Scalar>, field: &'static str) -> Result<f64, ConversionError> {
    let value = value.as_ref().ok_or(ConversionError::MissingField(field))?;
    value.as_f64().ok_or_else(|| ConversionError::InvalidNumber {
        field,
        value: value.as_text(),
    })
}

fn coordinate(
    (lat, lat_field): (&Option<Scalar>, &'static str),
    (lon, lon_field): (&Option<Scalar>, &'static str),
    field: &'static str,
) -> Result<Coordinate, ConversionError> {
    let lat = number(lat, lat_field)?;
    let lon = number(lon, lon_field)?;
    Coordinate::new(lat, lon).map_err(|source| ConversionError::InvalidCoordinate { field, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn complete() -> RawFareRecord {
        RawFareRecord {
            origin_lat: Some(Scalar::Number(58.4)),
            origin_lon: Some(Scalar::Number(26.7)),
            origin_title: Some("Tartu".into()),
            destination_lat: Some(Scalar::Number(56.9236)),
            destination_lon: Some(Scalar::Number(23.9711)),
            destination_title: Some("Riga".into()),
            price: Some(Scalar::Text("12,00".into())),
            currency_code: Some(Scalar::Text("EUR".into())),
            departure_date: Some("2018-01-05T07:00:00".into()),
            arrival_date: Some("2018-01-05T11:30:00".into()),
            carrier: None,
        }
    }

    #[test]
    fn converts_complete_record() {
        let record = convert_record(&complete()).unwrap();

        assert_eq!(record.origin_name, "Tartu");
        assert_eq!(record.destination_name, "Riga");
        assert_eq!(record.price, 12.0);
        assert_eq!(record.currency, "EUR");
        assert_eq!(record.departure, dt("2018-01-05 07:00:00"));
        assert_eq!(record.arrival, Some(dt("2018-01-05 11:30:00")));
        assert_eq!(record.arrival_or_default(), dt("2018-01-05 11:30:00"));
    }

    #[test]
    fn missing_arrival_defaults_to_three_hours() {
        let raw = RawFareRecord {
            arrival_date: None,
            ..complete()
        };
        let record = convert_record(&raw).unwrap();
        assert_eq!(record.arrival, None);
        assert_eq!(record.arrival_or_default(), dt("2018-01-05 10:00:00"));
    }

    #[test]
    fn blank_arrival_treated_as_missing() {
        let raw = RawFareRecord {
            arrival_date: Some("  ".into()),
            ..complete()
        };
        assert_eq!(convert_record(&raw).unwrap().arrival, None);
    }

    #[test]
    fn missing_fields_rejected() {
        let cases: [(RawFareRecord, &str); 7] = [
            (
                RawFareRecord {
                    origin_lat: None,
                    ..complete()
                },
                "origin_lat",
            ),
            (
                RawFareRecord {
                    destination_title: Some(" ".into()),
                    ..complete()
                },
                "destination_title",
            ),
            (
                RawFareRecord {
                    destination_lon: None,
                    ..complete()
                },
                "destination_lon",
            ),
            (
                RawFareRecord {
                    price: None,
                    ..complete()
                },
                "price",
            ),
            (
                RawFareRecord {
                    currency_code: None,
                    ..complete()
                },
                "currencyCode",
            ),
            (
                RawFareRecord {
                    currency_code: Some(Scalar::Text("  ".into())),
                    ..complete()
                },
                "currencyCode",
            ),
            (
                RawFareRecord {
                    departure_date: None,
                    ..complete()
                },
                "departureDate",
            ),
        ];

        for (raw, field) in cases {
            assert_eq!(
                convert_record(&raw),
                Err(ConversionError::MissingField(field))
            );
        }
    }

    #[test]
    fn invalid_values_rejected() {
        let raw = RawFareRecord {
            price: Some(Scalar::Text("free".into())),
            ..complete()
        };
        assert!(matches!(
            convert_record(&raw),
            Err(ConversionError::InvalidNumber { field: "price", .. })
        ));

        let raw = RawFareRecord {
            price: Some(Scalar::Number(-5.0)),
            ..complete()
        };
        assert_eq!(convert_record(&raw), Err(ConversionError::InvalidPrice(-5.0)));

        let raw = RawFareRecord {
            origin_lat: Some(Scalar::Number(123.0)),
            ..complete()
        };
        assert!(matches!(
            convert_record(&raw),
            Err(ConversionError::InvalidCoordinate {
                field: "origin",
                ..
            })
        ));

        let raw = RawFareRecord {
            departure_date: Some("soon".into()),
            ..complete()
        };
        assert!(matches!(
            convert_record(&raw),
            Err(ConversionError::InvalidTimestamp {
                field: "departureDate",
                ..
            })
        ));
    }

    #[test]
    fn arrival_before_departure_rejected() {
        let raw = RawFareRecord {
            arrival_date: Some("2018-01-04T07:00:00".into()),
            ..complete()
        };
        assert!(matches!(
            convert_record(&raw),
            Err(ConversionError::ArrivalBeforeDeparture { .. })
        ));
    }

    #[test]
    fn numeric_currency_code_kept_as_text() {
        let raw = RawFareRecord {
            currency_code: Some(Scalar::Number(31.0)),
            ..complete()
        };
        assert_eq!(convert_record(&raw).unwrap().currency, "31");
    }

    #[test]
    fn carrier_override() {
        let raw = RawFareRecord {
            carrier: Some(" lux express ".into()),
            ..complete()
        };
        assert_eq!(
            convert_record(&raw).unwrap().carrier.as_deref(),
            Some("lux express")
        );
    }

    #[test]
    fn timestamp_formats() {
        assert_eq!(
            parse_timestamp("2018-01-11T06:30:00"),
            Some(dt("2018-01-11 06:30:00"))
        );
        assert_eq!(
            parse_timestamp("2018-01-11T06:30:00.000"),
            Some(dt("2018-01-11 06:30:00"))
        );
        assert_eq!(
            parse_timestamp("2018-01-11 06:30"),
            Some(dt("2018-01-11 06:30:00"))
        );
        assert_eq!(
            parse_timestamp("2018-01-11T06:30:00Z"),
            Some(dt("2018-01-11 06:30:00"))
        );
        assert_eq!(
            parse_timestamp("2018-01-11T06:30:00-05:00"),
            Some(dt("2018-01-11 06:30:00"))
        );
        assert_eq!(parse_timestamp("2018-01-11"), Some(dt("2018-01-11 00:00:00")));
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("11/01/2018"), None);
    }
}
