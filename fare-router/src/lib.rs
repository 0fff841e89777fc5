//! Cheap multi-leg fare route planner.
//!
//! Loads fares scraped from bus and airline sources into a graph of places
//! and answers: "what is the cheapest way from here to there, within my
//! budget, hop limit and travel dates?"

pub mod cache;
pub mod config;
pub mod domain;
pub mod fare;
pub mod graph;
pub mod ingest;
pub mod landmarks;
pub mod planner;
pub mod web;
