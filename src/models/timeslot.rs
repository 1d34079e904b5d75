//! Discrete time slot domain.
//!
//! A timetable week is a finite grid of `(day, period)` pairs. Each pair is
//! one teaching hour; lessons occupy exactly one slot.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One teaching hour in the weekly grid.
///
/// Ordering is day-major, so sorting a list of slots yields the natural
/// chronological order of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Day of the week (0-based, consumer-defined).
    pub day: u32,
    /// Period within the day (0-based, consumer-defined).
    pub period: u32,
}

impl TimeSlot {
    /// Creates a time slot.
    pub fn new(day: u32, period: u32) -> Self {
        Self { day, period }
    }

    /// Enumerates the full `days × periods` grid in chronological order.
    ///
    /// # Example
    /// ```
    /// use u_timetable::models::TimeSlot;
    ///
    /// let week = TimeSlot::grid(5, 4);
    /// assert_eq!(week.len(), 20);
    /// assert_eq!(week[4], TimeSlot::new(1, 0));
    /// ```
    pub fn grid(days: u32, periods: u32) -> Vec<TimeSlot> {
        (0..days)
            .flat_map(|day| (0..periods).map(move |period| TimeSlot::new(day, period)))
            .collect()
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}P{}", self.day, self.period)
    }
}
