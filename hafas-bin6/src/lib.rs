//! # HAFAS Binary v6 decoder
//!
//! This crate turns the gzip-compressed binary response of a HAFAS v6
//! trip query into the domain model of [`fahrplan_model`].
//!
//! The wire format is a single buffer holding a fixed header, a per-trip
//! record array, and several offset-indirected tables (trip parts, trip
//! details, stops, stations, service days, and a shared string table
//! referenced by 16-bit byte offsets). Every multi-byte integer is
//! little-endian and records are packed without padding, so all access
//! goes through [`zerocopy`] unaligned views that are bounds-checked
//! against the buffer before use.
//!
//! The decode pipeline is pure and synchronous: it performs no I/O, holds
//! no shared state, and can run concurrently from any number of tasks.
//! Transport (HTTP, sessions) is the caller's business; hand the raw
//! response body to [`decode_trips`] and get `Result<Vec<Trip>, DecodeError>`
//! back.

pub mod builder;
mod calendar;
mod inflate;
pub mod response;
mod text;

use thiserror::Error;

pub use fahrplan_model::{Location, Stop, Trip, TripFlag, TripPart};
pub use inflate::inflate;
pub use response::{ResponseView, decode_trips, parse_trips};

/// Everything that can go wrong while decoding a trip response.
///
/// A single error anywhere aborts the whole decode: the offset tables are
/// shared between records, so one bad offset cannot be contained locally
/// and no partial result is ever returned.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The gzip stream was malformed, truncated, or followed by trailing
    /// garbage.
    #[error("failed to inflate the response body: {0}")]
    Compression(#[from] std::io::Error),
    /// The response declares a format version this decoder does not speak.
    #[error("unsupported HAFAS binary version {0} (expected 6)")]
    UnsupportedVersion(u16),
    /// A computed offset or length lies outside the response buffer.
    #[error("a computed offset lies outside the response buffer")]
    Truncated,
    /// The trip details sub-header declares a schema version or record
    /// sizes this decoder was not built for.
    #[error("declared record sizes or detail schema version disagree with this decoder")]
    SchemaMismatch,
    /// The provider backend embedded an application-level error code,
    /// e.g. an expired session.
    #[error("the provider backend reported error code {0}")]
    ProviderReported(u16),
    /// The extension header carries a non-positive sequence number.
    #[error("illegal sequence number {0}")]
    InvalidSequence(u16),
    /// The declared text encoding is unknown, or string bytes are not
    /// valid for it.
    #[error("the declared text encoding is unsupported or a string is not valid for it")]
    Encoding,
    /// The response is structurally valid but contains zero trips; an
    /// all-filtered response is indistinguishable from a parse failure
    /// in this format, so callers are told explicitly.
    #[error("the response contains no trips")]
    NoTrips,
}
