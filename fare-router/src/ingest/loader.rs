//! Loading fare files into a graph.

use std::ops::AddAssign;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::ConnectionId;
use crate::fare::FareNormalizer;
use crate::graph::Graph;

use super::convert::{FareRecord, convert_record};
use super::error::IngestError;
use super::types::RawFareRecord;

/// A collector output file and the carrier label its fares belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FareSource {
    pub carrier: String,
    pub path: PathBuf,
}

impl FareSource {
    pub fn new(carrier: &str, path: impl AsRef<Path>) -> Self {
        Self {
            carrier: carrier.to_string(),
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Parse a `carrier=path` pair.
    ///
    /// # Examples
    ///
    /// ```
    /// use fare_router::ingest::FareSource;
    ///
    /// let source = FareSource::parse("wizzair=data/wizzair.json").unwrap();
    /// assert_eq!(source.carrier, "wizzair");
    ///
    /// assert!(FareSource::parse("wizzair").is_none());
    /// assert!(FareSource::parse("=data/x.json").is_none());
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let (carrier, path) = s.split_once('=')?;
        let (carrier, path) = (carrier.trim(), path.trim());
        if carrier.is_empty() || path.is_empty() {
            return None;
        }
        Some(Self::new(carrier, path))
    }
}

/// Counts of accepted and rejected records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub accepted: usize,
    pub rejected: usize,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.accepted + self.rejected
    }
}

impl AddAssign for IngestReport {
    fn add_assign(&mut self, other: Self) {
        self.accepted += other.accepted;
        self.rejected += other.rejected;
    }
}

/// Insert one validated fare into the graph.
///
/// The price is normalized before the graph is touched, so a record in an
/// unsupported currency leaves the graph unchanged. Both endpoints are
/// clustered onto existing places where possible. `carrier` is used unless
/// the record names its own.
pub fn ingest(
    graph: &mut Graph,
    normalizer: &FareNormalizer,
    record: &FareRecord,
    carrier: &str,
) -> Result<ConnectionId, IngestError> {
    let price = normalizer.to_reference_currency(record.price, &record.currency)?;

    let from = graph.add(record.origin, &record.origin_name);
    let to = graph.add(record.destination, &record.destination_name);
    let carrier = record.carrier.as_deref().unwrap_or(carrier);

    Ok(graph.add_edge(
        from,
        to,
        price,
        carrier,
        record.departure,
        record.arrival_or_default(),
    )?)
}

/// Split a fare file into items.
///
/// The body may be a JSON array or JSON lines (one object per line). Items
/// that fail to deserialize are returned as errors so that one bad item
/// doesn't reject its neighbours.
pub fn parse_records(body: &str) -> Result<Vec<Result<RawFareRecord, serde_json::Error>>, IngestError> {
    let trimmed = body.trim_start();

    if trimmed.starts_with('[') {
        let items: Vec<Value> = serde_json::from_str(trimmed)?;
        return Ok(items.into_iter().map(serde_json::from_value).collect());
    }

    Ok(trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(serde_json::from_str)
        .collect())
}

/// Ingest parsed items, logging and counting rejections.
pub fn ingest_raw(
    graph: &mut Graph,
    normalizer: &FareNormalizer,
    items: Vec<Result<RawFareRecord, serde_json::Error>>,
    carrier: &str,
) -> IngestReport {
    let mut report = IngestReport::default();

    for (index, item) in items.into_iter().enumerate() {
        let result = item
            .map_err(IngestError::from)
            .and_then(|raw| convert_record(&raw).map_err(IngestError::from))
            .and_then(|record| ingest(graph, normalizer, &record, carrier));

        match result {
            Ok(id) => {
                debug!(carrier, index, connection = %id, "Ingested fare");
                report.accepted += 1;
            }
            Err(e) => {
                warn!(carrier, index, error = %e, "Rejected fare record");
                report.rejected += 1;
            }
        }
    }

    report
}

/// Read a fare file and ingest every record in it.
///
/// Fails only if the file can't be read or isn't JSON at all; individual
/// bad records are counted in the report.
pub fn load_source(
    graph: &mut Graph,
    normalizer: &FareNormalizer,
    source: &FareSource,
) -> Result<IngestReport, IngestError> {
    let body = std::fs::read_to_string(&source.path).map_err(|e| IngestError::Io {
        path: source.path.clone(),
        source: e,
    })?;

    let items = parse_records(&body)?;
    let report = ingest_raw(graph, normalizer, items, &source.carrier);

    info!(
        carrier = %source.carrier,
        path = %source.path.display(),
        accepted = report.accepted,
        rejected = report.rejected,
        "Loaded fare source"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::domain::Coordinate;
    use crate::ingest::Scalar;

    fn record(price: f64, currency: &str) -> FareRecord {
        let departure = crate::ingest::parse_timestamp("2018-01-10T08:00:00").unwrap();
        FareRecord {
            origin: Coordinate::new(50.5, 30.5).unwrap(),
            origin_name: "Kyiv".into(),
            destination: Coordinate::new(52.5, 13.5).unwrap(),
            destination_name: "Berlin".into(),
            price,
            currency: currency.to_string(),
            departure,
            arrival: None,
            carrier: None,
        }
    }

    const ITEM: &str = r#"{"origin_title":"Tartu","origin_lat":58.4,"origin_lon":26.7,"destination_title":"Riga","destination_lat":56.9236,"destination_lon":23.9711,"price":"10","currencyCode":"EUR","departureDate":"2018-01-05T07:00:00"}"#;

    #[test]
    fn ingest_normalizes_and_links() {
        let mut graph = Graph::new();
        let normalizer = FareNormalizer::default();

        let id = ingest(&mut graph, &normalizer, &record(100.0, "PLN"), "ecolines").unwrap();
        let connection = graph.connection(id).unwrap();

        assert!((connection.price() - 23.9407099).abs() < 1e-9);
        assert_eq!(connection.carrier(), "ecolines");
        assert_eq!(
            connection.duration(),
            chrono::Duration::hours(crate::ingest::DEFAULT_TRIP_HOURS)
        );
        assert_eq!(graph.place_count(), 2);
    }

    #[test]
    fn reference_currency_kept_as_is() {
        let mut graph = Graph::new();
        let normalizer = FareNormalizer::default();

        let id = ingest(&mut graph, &normalizer, &record(19.99, "EUR"), "ryanair").unwrap();
        assert_eq!(graph.connection(id).unwrap().price(), 19.99);
    }

    #[test]
    fn missing_currency_rejected() {
        let mut graph = Graph::new();
        let normalizer = FareNormalizer::default();

        let good: RawFareRecord = serde_json::from_str(ITEM).unwrap();
        let no_currency = RawFareRecord {
            currency_code: None,
            ..good.clone()
        };
        let blank_currency = RawFareRecord {
            currency_code: Some(Scalar::Text(" ".into())),
            ..good
        };

        let report = ingest_raw(
            &mut graph,
            &normalizer,
            vec![Ok(no_currency), Ok(blank_currency)],
            "ryanair",
        );

        assert_eq!(
            report,
            IngestReport {
                accepted: 0,
                rejected: 2
            }
        );
        assert!(graph.is_empty());
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn unsupported_currency_leaves_graph_untouched() {
        let mut graph = Graph::new();
        let normalizer = FareNormalizer::default();

        let err = ingest(&mut graph, &normalizer, &record(100.0, "XYZ"), "x").unwrap_err();
        assert!(matches!(err, IngestError::Currency(_)));
        assert!(graph.is_empty());
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn record_carrier_overrides_source_label() {
        let mut graph = Graph::new();
        let normalizer = FareNormalizer::default();
        let mut r = record(5.0, "EUR");
        r.carrier = Some("lux express".into());

        let id = ingest(&mut graph, &normalizer, &r, "ecolines").unwrap();
        assert_eq!(graph.connection(id).unwrap().carrier(), "lux express");
    }

    #[test]
    fn parse_json_array_keeps_bad_items_separate() {
        let body = format!("[{ITEM}, {{\"price\": {{\"nested\": true}}}}]");
        let items = parse_records(&body).unwrap();

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(items[1].is_err());
    }

    #[test]
    fn parse_json_lines() {
        let body = format!("{ITEM}\n\n{ITEM}\nnot json\n");
        let items = parse_records(&body).unwrap();

        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        assert!(items[1].is_ok());
        assert!(items[2].is_err());
    }

    #[test]
    fn parse_broken_array_fails() {
        assert!(matches!(parse_records("[{"), Err(IngestError::Json(_))));
    }

    #[test]
    fn ingest_raw_counts_rejections_and_continues() {
        let mut graph = Graph::new();
        let normalizer = FareNormalizer::default();

        let good: RawFareRecord = serde_json::from_str(ITEM).unwrap();
        let bad_currency = RawFareRecord {
            currency_code: Some(Scalar::Text("XYZ".into())),
            ..good.clone()
        };
        let missing_price = RawFareRecord {
            price: None,
            ..good.clone()
        };

        let report = ingest_raw(
            &mut graph,
            &normalizer,
            vec![Ok(good.clone()), Ok(bad_currency), Ok(missing_price), Ok(good)],
            "ecolines",
        );

        assert_eq!(
            report,
            IngestReport {
                accepted: 2,
                rejected: 2
            }
        );
        assert_eq!(report.total(), 4);
        assert_eq!(graph.connection_count(), 2);
        assert_eq!(graph.place_count(), 2);
    }

    #[test]
    fn load_source_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[{ITEM}, {ITEM}]").unwrap();

        let mut graph = Graph::new();
        let normalizer = FareNormalizer::default();
        let source = FareSource::new("ecolines", file.path());

        let report = load_source(&mut graph, &normalizer, &source).unwrap();
        assert_eq!(report.accepted, 2);
        assert_eq!(graph.stats().by_carrier.get("ecolines"), Some(&2));
    }

    #[test]
    fn load_source_missing_file() {
        let mut graph = Graph::new();
        let normalizer = FareNormalizer::default();
        let source = FareSource::new("x", "/definitely/not/here.json");

        let err = load_source(&mut graph, &normalizer, &source).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }

    #[test]
    fn report_add_assign() {
        let mut total = IngestReport::default();
        total += IngestReport {
            accepted: 3,
            rejected: 1,
        };
        total += IngestReport {
            accepted: 2,
            rejected: 0,
        };
        assert_eq!(total.accepted, 5);
        assert_eq!(total.rejected, 1);
    }
}
