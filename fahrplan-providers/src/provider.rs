/// A known deployment of the HAFAS binary backend.
///
/// Each authority serves the same protocol from its own host; some use
/// separate hosts for location lookup and trip queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provider {
    name: &'static str,
    locations_url: &'static str,
    trips_url: &'static str,
}

impl Provider {
    /// Deutsche Bahn (Germany, long distance and regional).
    pub const fn de_db() -> Self {
        Self {
            name: "de-db",
            locations_url: "http://mobile.bahn.de/bin/mobil/query.exe/en",
            trips_url: "http://reiseauskunft.bahn.de/bin/query.exe/eox",
        }
    }

    /// Berliner Verkehrsbetriebe (Berlin local transit).
    pub const fn de_bvg() -> Self {
        Self {
            name: "de-bvg",
            locations_url: "http://www.fahrinfo-berlin.de/Fahrinfo/bin/query.bin/d",
            trips_url: "http://www.fahrinfo-berlin.de/Fahrinfo/bin/query.bin/d",
        }
    }

    /// Schweizerische Bundesbahnen (Switzerland).
    pub const fn ch_sbb() -> Self {
        Self {
            name: "ch-sbb",
            locations_url: "http://fahrplan.sbb.ch/bin/query.exe/dn",
            trips_url: "http://fahrplan.sbb.ch/bin/query.exe/dn",
        }
    }

    /// Every deployment this crate knows about.
    pub const fn all() -> [Self; 3] {
        [Self::de_db(), Self::de_bvg(), Self::ch_sbb()]
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Endpoint for the XML locations lookup (POST).
    #[inline]
    pub fn locations_url(&self) -> &'static str {
        self.locations_url
    }

    /// Endpoint for the binary trips query (GET).
    #[inline]
    pub fn trips_url(&self) -> &'static str {
        self.trips_url
    }
}
