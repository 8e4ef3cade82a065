use zerocopy::{LE, U16, U32};
use zerocopy_derive::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Flag bit set when a single stop was canceled.
pub const FLAG_STOP_CANCELED: u16 = 0x20;
/// Flag bits set when the whole trip was canceled.
pub const FLAG_TRIP_CANCELED: u16 = 0x30;
/// Either cancellation case; the decoder treats both as a canceled trip.
pub const FLAG_CANCELED_MASK: u16 = 0x30;

/// Real-time status summary for one trip, reached through the shared
/// per-trip detail index.
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Debug)]
#[repr(C)]
pub struct TripDetailRecord {
    pub(crate) rt_status: U16<LE>,
    pub(crate) delay: U16<LE>,
}

impl TripDetailRecord {
    #[inline]
    pub fn rt_status(&self) -> u16 {
        self.rt_status.get()
    }

    #[inline]
    pub fn delay(&self) -> u16 {
        self.delay.get()
    }
}

/// Real-time detail for one trip part: predicted counterparts of the
/// planned values in the part record, plus the location of the part's
/// intermediate stops in the stop table.
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Debug)]
#[repr(C)]
pub struct TripPartDetailRecord {
    pub(crate) dep_pred: U16<LE>,
    pub(crate) arr_pred: U16<LE>,
    pub(crate) dep_platform_pred_off: U16<LE>,
    pub(crate) arr_platform_pred_off: U16<LE>,
    pub(crate) flags: U16<LE>,
    pub(crate) _unknown: U16<LE>,
    /// Index of this part's first stop in the stop table.
    pub(crate) stop_index: U16<LE>,
    pub(crate) stops_cnt: U16<LE>,
}

impl TripPartDetailRecord {
    #[inline]
    pub fn dep_pred(&self) -> u16 {
        self.dep_pred.get()
    }

    #[inline]
    pub fn arr_pred(&self) -> u16 {
        self.arr_pred.get()
    }

    #[inline]
    pub fn flags(&self) -> u16 {
        self.flags.get()
    }

    #[inline]
    pub fn stop_index(&self) -> u16 {
        self.stop_index.get()
    }

    #[inline]
    pub fn stops_cnt(&self) -> u16 {
        self.stops_cnt.get()
    }

    #[inline]
    pub fn is_canceled(&self) -> bool {
        self.flags() & FLAG_CANCELED_MASK != 0
    }
}

/// Planned and predicted times/platforms for one intermediate stop.
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Debug)]
#[repr(C)]
pub struct TripStopRecord {
    pub(crate) dep: U16<LE>,
    pub(crate) arr: U16<LE>,
    pub(crate) dep_platform_off: U16<LE>,
    pub(crate) arr_platform_off: U16<LE>,
    pub(crate) _unknown0: U32<LE>,
    pub(crate) dep_pred: U16<LE>,
    pub(crate) arr_pred: U16<LE>,
    pub(crate) dep_platform_pred_off: U16<LE>,
    pub(crate) arr_platform_pred_off: U16<LE>,
    pub(crate) _unknown1: U32<LE>,
    /// Index into the station table.
    pub(crate) station: U16<LE>,
}

impl TripStopRecord {
    #[inline]
    pub fn dep(&self) -> u16 {
        self.dep.get()
    }

    #[inline]
    pub fn arr(&self) -> u16 {
        self.arr.get()
    }

    #[inline]
    pub fn dep_pred(&self) -> u16 {
        self.dep_pred.get()
    }

    #[inline]
    pub fn arr_pred(&self) -> u16 {
        self.arr_pred.get()
    }

    #[inline]
    pub fn dep_platform_off(&self) -> u16 {
        self.dep_platform_off.get()
    }

    #[inline]
    pub fn arr_platform_off(&self) -> u16 {
        self.arr_platform_off.get()
    }

    #[inline]
    pub fn station(&self) -> u16 {
        self.station.get()
    }
}
