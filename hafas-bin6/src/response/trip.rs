use zerocopy::{LE, U16, U32};
use zerocopy_derive::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// One entry of the per-trip array that follows directly after the header.
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Debug)]
#[repr(C)]
pub struct TripRecord {
    /// Byte offset of this trip's service-day record, relative to the
    /// service table.
    pub(crate) service_off: U16<LE>,
    /// Byte offset of this trip's part records, relative to the start of
    /// the trips table (i.e. the end of the header).
    pub(crate) parts_off: U32<LE>,
    pub(crate) part_cnt: U16<LE>,
    /// Number of vehicle changes on this trip.
    pub(crate) changes: U16<LE>,
    pub(crate) _unknown: U16<LE>,
}

impl TripRecord {
    #[inline]
    pub fn service_off(&self) -> u16 {
        self.service_off.get()
    }

    #[inline]
    pub fn parts_off(&self) -> u32 {
        self.parts_off.get()
    }

    #[inline]
    pub fn part_cnt(&self) -> u16 {
        self.part_cnt.get()
    }

    #[inline]
    pub fn changes(&self) -> u16 {
        self.changes.get()
    }
}

/// One leg of a trip on a single vehicle.
///
/// Station references are indices into the station table; everything
/// ending in `_off` is a byte offset into the string table. Times are
/// packed HHMM integers with `0xFFFF` meaning "absent".
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Debug)]
#[repr(C)]
pub struct TripPartRecord {
    pub(crate) dep: U16<LE>,
    pub(crate) dep_station: U16<LE>,
    pub(crate) arr: U16<LE>,
    pub(crate) arr_station: U16<LE>,
    /// 1 = footway, 2 = train; informational only.
    pub(crate) part_type: U16<LE>,
    pub(crate) line_off: U16<LE>,
    pub(crate) dep_platform_off: U16<LE>,
    pub(crate) arr_platform_off: U16<LE>,
    /// Index into the attribute table shared via the extension header.
    pub(crate) attr_index: U16<LE>,
    pub(crate) comments_off: U16<LE>,
}

impl TripPartRecord {
    #[inline]
    pub fn dep(&self) -> u16 {
        self.dep.get()
    }

    #[inline]
    pub fn arr(&self) -> u16 {
        self.arr.get()
    }

    #[inline]
    pub fn dep_station(&self) -> u16 {
        self.dep_station.get()
    }

    #[inline]
    pub fn arr_station(&self) -> u16 {
        self.arr_station.get()
    }

    #[inline]
    pub fn line_off(&self) -> u16 {
        self.line_off.get()
    }

    #[inline]
    pub fn dep_platform_off(&self) -> u16 {
        self.dep_platform_off.get()
    }

    #[inline]
    pub fn arr_platform_off(&self) -> u16 {
        self.arr_platform_off.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sizes_match_the_wire_format() {
        assert_eq!(size_of::<TripRecord>(), 0x0c);
        assert_eq!(size_of::<TripPartRecord>(), 0x14);
    }
}
