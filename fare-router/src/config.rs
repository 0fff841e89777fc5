//! Server configuration read from the environment.

use std::fmt::Display;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::fare::{CurrencyError, FareNormalizer, RatesTable};
use crate::graph::GeoMatcher;
use crate::ingest::FareSource;

pub const ADDR_VAR: &str = "FARE_ROUTER_ADDR";
pub const SOURCES_VAR: &str = "FARE_SOURCES";
pub const RATES_VAR: &str = "FARE_RATES";
pub const RADIUS_VAR: &str = "FARE_MATCH_RADIUS_KM";
pub const TIMEOUT_VAR: &str = "FARE_SEARCH_TIMEOUT_MS";

/// Longest search timeout accepted from the environment.
pub const MAX_SEARCH_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Errors from reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable is set but can't be parsed
    #[error("invalid value {value:?} for {var}: {message}")]
    InvalidVar {
        var: &'static str,
        value: String,
        message: String,
    },

    /// The rates file can't be read
    #[error("failed to read rates file {path}: {source}")]
    RatesIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The rates file isn't a valid rates table
    #[error("invalid rates file {path}: {source}")]
    RatesJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Currency(#[from] CurrencyError),
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address to listen on.
    pub addr: SocketAddr,

    /// Fare files to load at startup.
    pub sources: Vec<FareSource>,

    /// Optional JSON rates table replacing the built-in one.
    pub rates: Option<PathBuf>,

    /// Clustering radius for places, also used to match search endpoints.
    pub match_radius_km: f64,

    /// Per-search time budget. `None` is unbounded.
    pub search_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            sources: Vec::new(),
            rates: None,
            match_radius_km: GeoMatcher::DEFAULT_THRESHOLD_KM,
            search_timeout: Some(Duration::from_secs(5)),
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// unset variables.
    ///
    /// `FARE_SOURCES` is a comma-separated list of `carrier=path` pairs.
    /// `FARE_SEARCH_TIMEOUT_MS=0` disables the search timeout; otherwise it
    /// may be at most [`MAX_SEARCH_TIMEOUT`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let addr = parse_var(&lookup, ADDR_VAR, SocketAddr::from_str)?.unwrap_or(defaults.addr);

        let sources = match lookup(SOURCES_VAR) {
            Some(value) => parse_sources(&value).ok_or_else(|| ConfigError::InvalidVar {
                var: SOURCES_VAR,
                value: value.clone(),
                message: "expected comma-separated carrier=path pairs".to_string(),
            })?,
            None => defaults.sources,
        };

        let rates = lookup(RATES_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let match_radius_km = parse_var(&lookup, RADIUS_VAR, parse_radius)?
            .unwrap_or(defaults.match_radius_km);

        let search_timeout = match parse_var(&lookup, TIMEOUT_VAR, parse_timeout)? {
            Some(timeout) => timeout,
            None => defaults.search_timeout,
        };

        Ok(Self {
            addr,
            sources,
            rates,
            match_radius_km,
            search_timeout,
        })
    }

    /// Build the currency normalizer: the configured rates file, or the
    /// built-in table.
    pub fn normalizer(&self) -> Result<FareNormalizer, ConfigError> {
        match &self.rates {
            Some(path) => load_rates(path),
            None => Ok(FareNormalizer::default()),
        }
    }
}

/// Load a rates table from a JSON file.
pub fn load_rates(path: &Path) -> Result<FareNormalizer, ConfigError> {
    let body = std::fs::read_to_string(path).map_err(|source| ConfigError::RatesIo {
        path: path.to_path_buf(),
        source,
    })?;
    let table: RatesTable =
        serde_json::from_str(&body).map_err(|source| ConfigError::RatesJson {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(FareNormalizer::from_table(table)?)
}

fn parse_var<T, E: Display>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    parser: impl Fn(&str) -> Result<T, E>,
) -> Result<Option<T>, ConfigError> {
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    parser(value.trim())
        .map(Some)
        .map_err(|e| ConfigError::InvalidVar {
            var,
            value,
            message: e.to_string(),
        })
}

fn parse_sources(value: &str) -> Option<Vec<FareSource>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(FareSource::parse)
        .collect()
}

fn parse_radius(s: &str) -> Result<f64, String> {
    let radius: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if radius.is_finite() && radius >= 0.0 {
        Ok(radius)
    } else {
        Err("radius must be a non-negative number".to_string())
    }
}

fn parse_timeout(s: &str) -> Result<Option<Duration>, String> {
    let ms: u64 = s.parse().map_err(|e| format!("{e}"))?;
    let timeout = Duration::from_millis(ms);
    if ms == 0 {
        Ok(None)
    } else if timeout <= MAX_SEARCH_TIMEOUT {
        Ok(Some(timeout))
    } else {
        Err(format!(
            "timeout must be at most {} ms",
            MAX_SEARCH_TIMEOUT.as_millis()
        ))
    }
}
