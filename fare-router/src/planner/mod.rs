//! Cheapest-route planner.
//!
//! This module implements the search that answers: "what is the cheapest way
//! to get from here to there within my budget, hop limit and dates?"
//!
//! The search is an exhaustive depth-first enumeration bounded by price and
//! hop count. Connections are undirected, so a fare may be travelled against
//! the direction it was listed in.

mod config;
mod rank;
mod search;

pub use config::SearchConstraints;
pub use rank::pick_cheapest;
pub use search::{resolve_place, Planner, SearchError, SearchRequest, SearchResult};
