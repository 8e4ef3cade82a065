use zerocopy::{LE, U16};
use zerocopy_derive::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Fixed prefix of a service-day record. The bitmask continues past
/// `first_mask_byte` for `byte_len - 1` further bytes.
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Debug)]
#[repr(C)]
pub struct ServiceDayRecord {
    /// String-table offset of a human-readable validity description.
    pub(crate) days_off: U16<LE>,
    /// Days already elapsed before the mask starts, in units of 8.
    pub(crate) byte_base: U16<LE>,
    /// Total number of mask bytes, including the one embedded here.
    pub(crate) byte_len: U16<LE>,
    pub(crate) first_mask_byte: u8,
}

impl ServiceDayRecord {
    #[inline]
    pub fn byte_base(&self) -> u16 {
        self.byte_base.get()
    }

    #[inline]
    pub fn byte_len(&self) -> u16 {
        self.byte_len.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sizes_match_the_wire_format() {
        assert_eq!(size_of::<ServiceDayRecord>(), 0x07);
    }
}
