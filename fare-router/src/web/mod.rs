//! Web layer for the fare route planner.
//!
//! Provides HTTP endpoints for place lookup, graph statistics and route
//! planning.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
