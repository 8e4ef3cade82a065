use crate::Stop;
use enumset::{EnumSet, EnumSetType};
use serde::{Deserialize, Serialize};

/// Status flags attached to a whole trip.
#[derive(EnumSetType, Debug, Serialize, Deserialize)]
pub enum TripFlag {
    /// The provider reported the trip (or one of its stops) as canceled.
    Canceled,
}

/// One leg of a trip, traveled on a single line/vehicle/mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPart {
    start: Stop,
    end: Stop,
    line: String,
    stops: Vec<Stop>,
}

impl TripPart {
    /// `stops` are the intermediate stops in traversal order; `start` and
    /// `end` are not repeated in them.
    pub fn new(start: Stop, end: Stop, line: impl Into<String>, stops: Vec<Stop>) -> Self {
        Self {
            start,
            end,
            line: line.into(),
            stops,
        }
    }

    #[inline]
    pub fn start(&self) -> &Stop {
        &self.start
    }

    #[inline]
    pub fn end(&self) -> &Stop {
        &self.end
    }

    /// The line or service name, e.g. `"RE 27106"` or `"Fussweg"`.
    #[inline]
    pub fn line(&self) -> &str {
        &self.line
    }

    #[inline]
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }
}

/// A complete journey from origin to destination.
///
/// Parts are ordered by traversal: the first part starts the trip, the
/// last one ends it. A trip always has at least one part; decoders never
/// produce an empty one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    parts: Vec<TripPart>,
    flags: EnumSet<TripFlag>,
}

impl Trip {
    pub fn new(parts: Vec<TripPart>, flags: EnumSet<TripFlag>) -> Self {
        debug_assert!(!parts.is_empty(), "a trip must have at least one part");
        Self { parts, flags }
    }

    #[inline]
    pub fn parts(&self) -> &[TripPart] {
        &self.parts
    }

    #[inline]
    pub fn flags(&self) -> EnumSet<TripFlag> {
        self.flags
    }

    #[inline]
    pub fn is_canceled(&self) -> bool {
        self.flags.contains(TripFlag::Canceled)
    }

    /// The first stop of the journey.
    pub fn origin(&self) -> Option<&Stop> {
        self.parts.first().map(TripPart::start)
    }

    /// The final stop of the journey.
    pub fn destination(&self) -> Option<&Stop> {
        self.parts.last().map(TripPart::end)
    }
}
