//! Fare record ingestion.
//!
//! Turns collector output into graph connections: DTOs are validated into
//! [`FareRecord`]s, endpoints are clustered onto places, and prices are
//! normalized to the reference currency before the connection is inserted.

mod convert;
mod error;
mod loader;
mod types;

pub use convert::{ConversionError, DEFAULT_TRIP_HOURS, FareRecord, convert_record, parse_timestamp};
pub use error::IngestError;
pub use loader::{FareSource, IngestReport, ingest, ingest_raw, load_source, parse_records};
pub use types::{RawFareRecord, Scalar};
