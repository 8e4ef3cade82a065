use crate::Location;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A [`Location`] annotated with schedule data.
///
/// Every time field is optional: a stop at the start of a trip has no
/// arrival, a stop at the end has no departure, and predicted (real time)
/// values exist only when the provider sent them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    location: Location,
    arrival: Option<NaiveDateTime>,
    departure: Option<NaiveDateTime>,
    arrival_platform: Option<String>,
    departure_platform: Option<String>,
    predicted_arrival: Option<NaiveDateTime>,
    predicted_departure: Option<NaiveDateTime>,
}

impl Stop {
    /// A stop with no schedule data attached yet.
    pub fn new(location: Location) -> Self {
        Self {
            location,
            arrival: None,
            departure: None,
            arrival_platform: None,
            departure_platform: None,
            predicted_arrival: None,
            predicted_departure: None,
        }
    }

    #[must_use]
    pub fn with_arrival(mut self, at: NaiveDateTime) -> Self {
        self.arrival = Some(at);
        self
    }

    #[must_use]
    pub fn with_departure(mut self, at: NaiveDateTime) -> Self {
        self.departure = Some(at);
        self
    }

    #[must_use]
    pub fn with_arrival_platform(mut self, platform: impl Into<String>) -> Self {
        self.arrival_platform = Some(platform.into());
        self
    }

    #[must_use]
    pub fn with_departure_platform(mut self, platform: impl Into<String>) -> Self {
        self.departure_platform = Some(platform.into());
        self
    }

    #[must_use]
    pub fn with_predicted_arrival(mut self, at: NaiveDateTime) -> Self {
        self.predicted_arrival = Some(at);
        self
    }

    #[must_use]
    pub fn with_predicted_departure(mut self, at: NaiveDateTime) -> Self {
        self.predicted_departure = Some(at);
        self
    }

    #[inline]
    pub fn location(&self) -> &Location {
        &self.location
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.location.name()
    }

    #[inline]
    pub fn arrival(&self) -> Option<NaiveDateTime> {
        self.arrival
    }

    #[inline]
    pub fn departure(&self) -> Option<NaiveDateTime> {
        self.departure
    }

    #[inline]
    pub fn arrival_platform(&self) -> Option<&str> {
        self.arrival_platform.as_deref()
    }

    #[inline]
    pub fn departure_platform(&self) -> Option<&str> {
        self.departure_platform.as_deref()
    }

    #[inline]
    pub fn predicted_arrival(&self) -> Option<NaiveDateTime> {
        self.predicted_arrival
    }

    #[inline]
    pub fn predicted_departure(&self) -> Option<NaiveDateTime> {
        self.predicted_departure
    }

    /// The difference between predicted and planned arrival in whole
    /// minutes, truncating. Zero when either side is absent.
    pub fn arrival_delay(&self) -> i64 {
        delay_minutes(self.arrival, self.predicted_arrival)
    }

    /// The difference between predicted and planned departure in whole
    /// minutes, truncating. Zero when either side is absent.
    pub fn departure_delay(&self) -> i64 {
        delay_minutes(self.departure, self.predicted_departure)
    }
}

fn delay_minutes(planned: Option<NaiveDateTime>, predicted: Option<NaiveDateTime>) -> i64 {
    match (planned, predicted) {
        (Some(planned), Some(predicted)) => (predicted - planned).num_minutes(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2014, 2, 21)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn erpel() -> Location {
        Location::new("Erpel(Rhein)", 7.241593, 50.582067)
    }

    #[test]
    fn test_departure_delay() {
        let stop = Stop::new(erpel())
            .with_departure(at(9, 56))
            .with_predicted_departure(at(10, 1));
        assert_eq!(stop.departure_delay(), 5);
        assert_eq!(stop.arrival_delay(), 0);
    }

    #[test]
    fn test_delay_is_zero_without_prediction() {
        let stop = Stop::new(erpel()).with_departure(at(9, 56));
        assert_eq!(stop.departure_delay(), 0);
    }

    #[test]
    fn test_delay_truncates_partial_minutes() {
        let base = at(9, 56);
        let stop = Stop::new(erpel())
            .with_arrival(base)
            .with_predicted_arrival(base + chrono::TimeDelta::seconds(119));
        assert_eq!(stop.arrival_delay(), 1);
    }

    #[test]
    fn test_early_arrival_is_negative() {
        let stop = Stop::new(erpel())
            .with_arrival(at(10, 10))
            .with_predicted_arrival(at(10, 7));
        assert_eq!(stop.arrival_delay(), -3);
    }

    #[test]
    fn test_arrival_only_stop_is_valid() {
        let stop = Stop::new(erpel()).with_arrival(at(10, 10));
        assert_eq!(stop.arrival(), Some(at(10, 10)));
        assert_eq!(stop.departure(), None);
    }
}
