//! # Public transport domain model
//!
//! Provider-independent value types describing a timetable query result:
//! [`Location`]s, [`Stop`]s annotated with planned and predicted times,
//! [`TripPart`]s (one leg on a single vehicle), and complete [`Trip`]s.
//!
//! Values are constructed once by a decoder or lookup parser and are
//! immutable afterwards; they carry no reference back to the response
//! they were decoded from.

mod location;
mod stop;
mod trip;

pub use location::Location;
pub use stop::Stop;
pub use trip::{Trip, TripFlag, TripPart};
