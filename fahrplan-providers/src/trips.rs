use chrono::NaiveDateTime;
use fahrplan_model::Location;
use thiserror::Error;
use tracing::debug;

/// Every vehicle class enabled; the backend expects one flag digit per
/// product class.
const ALL_PRODUCTS: &str = "11111111111111";

/// Whether the queried time bounds the departure or the arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Departure,
    Arrival,
}

/// Failure modes of [`trips_query`].
#[derive(Debug, Error)]
pub enum QueryError {
    /// The location has never been resolved against this backend, so
    /// there is no station id to put in the query.
    #[error("location {0:?} carries no provider id; resolve it via a locations query first")]
    MissingOpaqueId(String),
}

/// The query parameters of a binary trips request, in the order the
/// backend is known to accept them.
///
/// Both endpoints must carry the opaque id obtained from a locations
/// lookup against the same provider; ids are not portable between
/// providers.
///
/// # Errors
///
/// Returns [`QueryError::MissingOpaqueId`] when an endpoint has no id.
pub fn trips_query(
    start: &Location,
    end: &Location,
    when: NaiveDateTime,
    direction: Direction,
) -> Result<Vec<(String, String)>, QueryError> {
    let start_id = start
        .opaque_id()
        .ok_or_else(|| QueryError::MissingOpaqueId(start.name().to_owned()))?;
    let end_id = end
        .opaque_id()
        .ok_or_else(|| QueryError::MissingOpaqueId(end.name().to_owned()))?;

    let by_departure = match direction {
        Direction::Departure => "1",
        Direction::Arrival => "0",
    };

    debug!(start = start.name(), end = end.name(), %when, "building trips query");

    Ok(vec![
        ("start".to_owned(), "Suchen".to_owned()),
        ("REQ0JourneyStopsS0ID".to_owned(), start_id.to_owned()),
        ("REQ0JourneyStopsZ0ID".to_owned(), end_id.to_owned()),
        ("REQ0JourneyDate".to_owned(), when.format("%d.%m.%y").to_string()),
        ("REQ0JourneyTime".to_owned(), when.format("%H:%M").to_string()),
        ("REQ0HafasSearchForw".to_owned(), by_departure.to_owned()),
        ("REQ0JourneyProduct_prod_list_1".to_owned(), ALL_PRODUCTS.to_owned()),
        // Asks for the gzipped binary response instead of HTML.
        ("h2g-direct".to_owned(), "11".to_owned()),
        ("clientType".to_owned(), "ANDROID".to_owned()),
    ])
}
