use zerocopy::{I16, I32, LE, U16, U32};
use zerocopy_derive::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// The fixed header at offset 0 of every response.
///
/// Table fields (`*_tbl`) are absolute byte offsets into the buffer;
/// the per-trip record array follows immediately after this header.
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Debug)]
#[repr(C)]
pub struct Header {
    pub(crate) version: U16<LE>,
    pub(crate) start: Loc,
    pub(crate) end: Loc,
    pub(crate) num_trips: U16<LE>,
    pub(crate) service_tbl: U32<LE>,
    pub(crate) strings_tbl: U32<LE>,
    /// Base date as days since 1979-12-31.
    pub(crate) days: I16<LE>,
    pub(crate) _unknown0: [u8; 12],
    pub(crate) stations_tbl: U32<LE>,
    pub(crate) comments_tbl: U32<LE>,
    pub(crate) _unknown1: [u8; 8],
    /// Absolute offset of the extension header.
    pub(crate) ext: U32<LE>,
}

impl Header {
    #[inline]
    pub fn version(&self) -> u16 {
        self.version.get()
    }

    #[inline]
    pub fn num_trips(&self) -> u16 {
        self.num_trips.get()
    }

    #[inline]
    pub fn base_days(&self) -> i16 {
        self.days.get()
    }

    #[inline]
    pub fn start(&self) -> &Loc {
        &self.start
    }

    #[inline]
    pub fn end(&self) -> &Loc {
        &self.end
    }
}

/// The start/end location summaries embedded inline in the [`Header`].
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Debug)]
#[repr(C)]
pub struct Loc {
    pub(crate) name_off: U16<LE>,
    pub(crate) _unknown: U16<LE>,
    pub(crate) loc_type: U16<LE>,
    /// Longitude in micro-degrees.
    pub(crate) lon: I32<LE>,
    /// Latitude in micro-degrees.
    pub(crate) lat: I32<LE>,
}

impl Loc {
    #[inline]
    pub fn name_off(&self) -> u16 {
        self.name_off.get()
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

/// The extension header, located via [`Header::ext`].
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Debug)]
#[repr(C)]
pub struct ExtHeader {
    /// Declared length of this header; servers have historically grown it.
    pub(crate) length: U32<LE>,
    pub(crate) _unknown0: U32<LE>,
    pub(crate) seq: U16<LE>,
    /// Request id string offset.
    pub(crate) req_id_off: U16<LE>,
    /// Absolute offset of the trip details header.
    pub(crate) details_tbl: U32<LE>,
    /// Non-zero when the backend reports a server-side failure.
    pub(crate) err: U16<LE>,
    pub(crate) _unknown1: [u8; 14],
    /// String offset of the response's declared text encoding name.
    pub(crate) enc_off: U16<LE>,
    pub(crate) ld_off: U16<LE>,
    pub(crate) attrs_off: U16<LE>,
    pub(crate) _pad: [u8; 6],
    pub(crate) attrs_index0: U32<LE>,
}

impl ExtHeader {
    #[inline]
    pub fn length(&self) -> u32 {
        self.length.get()
    }

    #[inline]
    pub fn seq(&self) -> u16 {
        self.seq.get()
    }

    #[inline]
    pub fn err(&self) -> u16 {
        self.err.get()
    }

    #[inline]
    pub fn req_id_off(&self) -> u16 {
        self.req_id_off.get()
    }

    #[inline]
    pub fn enc_off(&self) -> u16 {
        self.enc_off.get()
    }
}

/// Header of the trip details region, located via [`ExtHeader::details_tbl`].
///
/// The offsets inside are relative to this header's own position. The two
/// declared record sizes are a self-consistency check: a server emitting a
/// nominally-v6 revision with grown records would otherwise silently shear
/// every indexed access.
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Debug)]
#[repr(C)]
pub struct TripDetailsHeader {
    pub(crate) version: U16<LE>,
    pub(crate) _unknown: U16<LE>,
    pub(crate) details_index_off: U16<LE>,
    pub(crate) part_details_off: U16<LE>,
    pub(crate) part_detail_size: U16<LE>,
    pub(crate) stop_size: U16<LE>,
    pub(crate) stops_off: U16<LE>,
}

impl TripDetailsHeader {
    #[inline]
    pub fn version(&self) -> u16 {
        self.version.get()
    }

    #[inline]
    pub fn part_detail_size(&self) -> u16 {
        self.part_detail_size.get()
    }

    #[inline]
    pub fn stop_size(&self) -> u16 {
        self.stop_size.get()
    }
}
