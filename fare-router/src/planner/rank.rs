//! Choosing among candidate itineraries.

use crate::domain::Itinerary;

/// Pick the cheapest itinerary.
///
/// Ties go to the candidate that appears first, which for search results is
/// the one found first in incident-connection order.
pub fn pick_cheapest(candidates: Vec<Itinerary>) -> Option<Itinerary> {
    candidates
        .into_iter()
        .min_by(|a, b| a.price().total_cmp(&b.price()))
}
