use zerocopy::{I32, LE, U16, U32};
use zerocopy_derive::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// One entry of the station table. Trip parts and stops reference
/// stations by index, not by byte offset.
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Debug)]
#[repr(C)]
pub struct StationRecord {
    pub(crate) name_off: U16<LE>,
    pub(crate) id: U32<LE>,
    /// Longitude in micro-degrees.
    pub(crate) lon: I32<LE>,
    /// Latitude in micro-degrees.
    pub(crate) lat: I32<LE>,
}

impl StationRecord {
    #[inline]
    pub fn name_off(&self) -> u16 {
        self.name_off.get()
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id.get()
    }

    #[inline]
    pub fn lon_degrees(&self) -> f64 {
        f64::from(self.lon.get()) / 1_000_000.0
    }

    #[inline]
    pub fn lat_degrees(&self) -> f64 {
        f64::from(self.lat.get()) / 1_000_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sizes_match_the_wire_format() {
        assert_eq!(size_of::<StationRecord>(), 0x0e);
    }

    #[test]
    fn test_micro_degree_scaling() {
        let station = StationRecord {
            name_off: 0.into(),
            id: 8_003_330.into(),
            lon: 7_230_429.into(),
            lat: 50_583_823.into(),
        };
        assert!((station.lon_degrees() - 7.230_429).abs() < 1e-9);
        assert!((station.lat_degrees() - 50.583_823).abs() < 1e-9);
    }
}
