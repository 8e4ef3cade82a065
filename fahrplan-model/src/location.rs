use serde::{Deserialize, Serialize};

/// A named place on the network: a station, address, or point of interest.
///
/// Coordinates are WGS84 degrees. The opaque identifier is a
/// provider-specific token used to re-query the same provider; locations
/// decoded from a binary trip response do not carry one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    name: String,
    longitude: f64,
    latitude: f64,
    opaque_id: Option<String>,
}

impl Location {
    pub fn new(name: impl Into<String>, longitude: f64, latitude: f64) -> Self {
        Self {
            name: name.into(),
            longitude,
            latitude,
            opaque_id: None,
        }
    }

    /// Attaches the provider-specific identifier obtained from a lookup
    /// endpoint.
    #[must_use]
    pub fn with_opaque_id(mut self, id: impl Into<String>) -> Self {
        self.opaque_id = Some(id.into());
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Longitude in degrees, in the range [-180, 180].
    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Latitude in degrees, in the range [-90, 90].
    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[inline]
    pub fn opaque_id(&self) -> Option<&str> {
        self.opaque_id.as_deref()
    }
}
