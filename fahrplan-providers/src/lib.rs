//! Request plumbing for HAFAS binary backends.
//!
//! The binary trip format is served by several European transit
//! authorities behind slightly different URLs but identical request
//! conventions: locations are looked up with a small XML POST body, and
//! trips are fetched with a GET whose query string carries the journey
//! parameters. This crate knows the known deployments and builds those
//! requests; it performs no I/O itself, so any HTTP client can drive it
//! and feed the response body to the decoder.

mod locations;
mod provider;
mod trips;

pub use locations::{LocationsError, locations_request_body, parse_locations};
pub use provider::Provider;
pub use trips::{Direction, QueryError, trips_query};
