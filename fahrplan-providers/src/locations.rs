use fahrplan_model::Location;
use minidom::Element;
use thiserror::Error;
use tracing::debug;

/// Failure modes of [`parse_locations`].
#[derive(Debug, Error)]
pub enum LocationsError {
    /// The response body is not well-formed XML.
    #[error("the locations response is not well-formed XML: {0}")]
    Xml(#[from] minidom::Error),
    /// A station entry lacks a required attribute.
    #[error("a station entry is missing the {0:?} attribute")]
    MissingAttribute(&'static str),
    /// A station coordinate is not a number.
    #[error("a station entry carries a malformed coordinate: {0}")]
    Coordinate(#[from] std::num::ParseFloatError),
    /// The response parsed but matched no stations at all.
    #[error("the response contains no stations")]
    NoStations,
}

/// The XML POST body of a locations lookup for `name`.
///
/// Free-form user input goes into an attribute value, so it is escaped
/// here rather than trusted.
pub fn locations_request_body(name: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <ReqC ver=\"1.1\" prod=\"String\" lang=\"EN\">\
         <MLcReq><MLc n=\"{}\" t=\"ST\"/></MLcReq></ReqC>",
        escape_attribute(name)
    )
}

/// Extracts the matched stations from a locations response.
///
/// Stations are `MLc` elements with `t="ST"`, wherever they sit in the
/// tree. Coordinates come in micro-degrees; the `i` attribute is the
/// opaque station id later fed back into a trips query.
///
/// # Errors
///
/// Returns [`LocationsError::Xml`] for malformed XML,
/// [`LocationsError::MissingAttribute`] or [`LocationsError::Coordinate`]
/// for broken station entries, and [`LocationsError::NoStations`] when
/// nothing matched.
pub fn parse_locations(xml: &str) -> Result<Vec<Location>, LocationsError> {
    let root: Element = xml.parse()?;
    let mut locations = Vec::new();
    collect_stations(&root, &mut locations)?;
    if locations.is_empty() {
        return Err(LocationsError::NoStations);
    }
    debug!(stations = locations.len(), "parsed locations response");
    Ok(locations)
}

fn collect_stations(element: &Element, out: &mut Vec<Location>) -> Result<(), LocationsError> {
    if element.name() == "MLc" && element.attr("t") == Some("ST") {
        out.push(station(element)?);
    }
    for child in element.children() {
        collect_stations(child, out)?;
    }
    Ok(())
}

fn station(element: &Element) -> Result<Location, LocationsError> {
    let name = element
        .attr("n")
        .ok_or(LocationsError::MissingAttribute("n"))?;
    let lon: f64 = element
        .attr("x")
        .ok_or(LocationsError::MissingAttribute("x"))?
        .parse()?;
    let lat: f64 = element
        .attr("y")
        .ok_or(LocationsError::MissingAttribute("y"))?
        .parse()?;

    let mut location = Location::new(name, lon / 1_000_000.0, lat / 1_000_000.0);
    if let Some(id) = element.attr("i") {
        location = location.with_opaque_id(id);
    }
    Ok(location)
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
