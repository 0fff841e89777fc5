//! Resolved routes.
//!
//! A `Route` is an itinerary with every place and connection resolved into
//! owned values, so it can be printed, serialized or drawn without access to
//! the graph that produced it.

use chrono::{Duration, NaiveDateTime};

use super::{Coordinate, DomainError, PlaceId};

/// A place as it appears on a route.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceSummary {
    pub id: PlaceId,
    pub name: String,
    pub coordinate: Coordinate,
}

/// One leg of a route, oriented in the direction of travel.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLeg {
    pub from: PlaceSummary,
    pub to: PlaceSummary,
    /// Price in the reference currency
    pub price: f64,
    pub carrier: String,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
}

impl RouteLeg {
    /// Time spent travelling on this leg.
    pub fn duration(&self) -> Duration {
        self.arrival - self.departure
    }
}

/// A complete route from origin to destination.
///
/// # Invariants
///
/// - At least one leg
/// - Consecutive legs connect (destination of one = origin of next)
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    legs: Vec<RouteLeg>,
}

impl Route {
    /// Construct a route from resolved legs.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the list is empty or consecutive legs don't share a
    /// place.
    pub fn new(legs: Vec<RouteLeg>) -> Result<Self, DomainError> {
        if legs.is_empty() {
            return Err(DomainError::EmptyRoute);
        }

        for window in legs.windows(2) {
            let prev = &window[0].to;
            let next = &window[1].from;
            if prev.id != next.id {
                return Err(DomainError::LegsNotConnected(prev.id, next.id));
            }
        }

        Ok(Route { legs })
    }

    pub fn legs(&self) -> &[RouteLeg] {
        &self.legs
    }

    /// Sum of leg prices.
    pub fn total_price(&self) -> f64 {
        self.legs.iter().map(|l| l.price).sum()
    }

    /// Number of legs.
    pub fn hops(&self) -> usize {
        self.legs.len()
    }

    pub fn origin(&self) -> &PlaceSummary {
        // Non-empty by construction
        &self.legs[0].from
    }

    pub fn destination(&self) -> &PlaceSummary {
        &self.legs[self.legs.len() - 1].to
    }

    pub fn departure(&self) -> NaiveDateTime {
        self.legs[0].departure
    }

    pub fn arrival(&self) -> NaiveDateTime {
        self.legs[self.legs.len() - 1].arrival
    }

    /// Gaps between consecutive legs.
    pub fn layovers(&self) -> Vec<Duration> {
        self.legs
            .windows(2)
            .map(|w| w[1].departure - w[0].arrival)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn place(id: usize, name: &str) -> PlaceSummary {
        PlaceSummary {
            id: PlaceId(id),
            name: name.into(),
            coordinate: Coordinate::new(id as f64, 0.0).unwrap(),
        }
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn leg(from: usize, to: usize, price: f64, dep: NaiveDateTime, arr: NaiveDateTime) -> RouteLeg {
        RouteLeg {
            from: place(from, "x"),
            to: place(to, "y"),
            price,
            carrier: "wizzair".into(),
            departure: dep,
            arrival: arr,
        }
    }

    #[test]
    fn empty_route_rejected() {
        assert!(matches!(Route::new(vec![]), Err(DomainError::EmptyRoute)));
    }

    #[test]
    fn disconnected_legs_rejected() {
        let legs = vec![
            leg(0, 1, 10.0, at(1, 8), at(1, 10)),
            leg(2, 3, 10.0, at(4, 8), at(4, 10)),
        ];
        assert!(matches!(
            Route::new(legs),
            Err(DomainError::LegsNotConnected(PlaceId(1), PlaceId(2)))
        ));
    }

    #[test]
    fn accessors() {
        let route = Route::new(vec![
            leg(0, 1, 50.0, at(1, 8), at(1, 10)),
            leg(1, 2, 30.0, at(3, 9), at(3, 11)),
        ])
        .unwrap();

        assert_eq!(route.hops(), 2);
        assert_eq!(route.total_price(), 80.0);
        assert_eq!(route.origin().id, PlaceId(0));
        assert_eq!(route.destination().id, PlaceId(2));
        assert_eq!(route.departure(), at(1, 8));
        assert_eq!(route.arrival(), at(3, 11));
        assert_eq!(route.layovers(), vec![Duration::hours(47)]);
        assert_eq!(route.legs()[0].duration(), Duration::hours(2));
    }
}
