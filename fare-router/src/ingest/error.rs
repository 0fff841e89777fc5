//! Ingestion error types.

use std::path::PathBuf;

use crate::fare::CurrencyError;
use crate::graph::GraphError;

use super::convert::ConversionError;

/// Errors that can occur while ingesting fare records.
///
/// Per-record errors (`Conversion`, `Currency`, `Graph`, `Json` for a single
/// line) reject only that record. `Io` and a malformed JSON array reject the
/// whole file.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Record failed validation
    #[error("malformed record: {0}")]
    Conversion(#[from] ConversionError),

    /// Record priced in an unknown currency
    #[error(transparent)]
    Currency(#[from] CurrencyError),

    /// Graph rejected the connection
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Failed to read a fare file
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse JSON
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}
