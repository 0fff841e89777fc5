//! Search constraints for the route planner.

use chrono::{Duration, NaiveDateTime};

/// Constraints applied to every itinerary the search builds.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConstraints {
    /// Maximum cumulative price, in the reference currency.
    pub max_price: f64,

    /// Maximum number of legs.
    pub max_hops: usize,

    /// Earliest allowed departure of any leg (inclusive). `None` is unbounded.
    pub window_start: Option<NaiveDateTime>,

    /// Latest allowed departure of any leg (inclusive). `None` is unbounded.
    pub window_end: Option<NaiveDateTime>,

    /// Minimum gap between one leg's arrival and the next leg's departure
    /// (minutes).
    pub min_layover_mins: i64,
}

impl SearchConstraints {
    /// Create constraints with the given parameters.
    pub fn new(
        max_price: f64,
        max_hops: usize,
        window_start: Option<NaiveDateTime>,
        window_end: Option<NaiveDateTime>,
        min_layover_mins: i64,
    ) -> Self {
        Self {
            max_price,
            max_hops,
            window_start,
            window_end,
            min_layover_mins,
        }
    }

    /// Returns the minimum layover as a Duration.
    ///
    /// Values too large for a `Duration` saturate; [`Self::validate`]
    /// rejects them.
    pub fn min_layover(&self) -> Duration {
        Duration::try_minutes(self.min_layover_mins).unwrap_or(Duration::MAX)
    }

    /// Returns true if a leg departing at `departure` is inside the window.
    pub fn departs_within(&self, departure: NaiveDateTime) -> bool {
        self.window_start.is_none_or(|start| departure >= start)
            && self.window_end.is_none_or(|end| departure <= end)
    }

    /// Check the constraints are usable.
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_price.is_nan() || self.max_price < 0.0 {
            return Err(format!(
                "max price must be a non-negative number, got {}",
                self.max_price
            ));
        }

        if let (Some(start), Some(end)) = (self.window_start, self.window_end) {
            if start > end {
                return Err(format!("search window starts ({start}) after it ends ({end})"));
            }
        }

        if self.min_layover_mins < 0 {
            return Err(format!(
                "minimum layover must not be negative, got {} minutes",
                self.min_layover_mins
            ));
        }

        if Duration::try_minutes(self.min_layover_mins).is_none() {
            return Err(format!(
                "minimum layover out of range, got {} minutes",
                self.min_layover_mins
            ));
        }

        Ok(())
    }
}

impl Default for SearchConstraints {
    fn default() -> Self {
        Self {
            max_price: 1000.0,
            max_hops: 2,
            window_start: None,
            window_end: None,
            min_layover_mins: 2 * 24 * 60, // 2 days
        }
    }
}
