use crate::DecodeError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

/// The sentinel for "no value" in any packed time field, planned or
/// predicted.
pub(crate) const NO_TIME: u16 = 0xFFFF;

/// All dates in a response are day counts relative to this anchor.
///
/// The anchor is a civil calendar date with no timezone attached; see the
/// design notes for why we deliberately keep it naive.
pub(crate) const ANCHOR: NaiveDate = match NaiveDate::from_ymd_opt(1979, 12, 31) {
    Some(date) => date,
    None => unreachable!(),
};

/// Decodes a service-day bitmask into the day offset from the response's
/// base date on which the trip first runs.
///
/// The scan starts at `byte_base * 8` days. An all-zero byte stands for
/// eight elapsed days without service; the first byte with a set bit
/// contributes the position of that bit counted from the most significant
/// end and terminates the scan. A mask with no set bit at all describes a
/// trip that never runs, which the caller must reject.
pub(crate) fn service_day_offset(byte_base: u16, mask: &[u8]) -> Option<u32> {
    let mut offset = u32::from(byte_base) * 8;
    for &byte in mask {
        if byte == 0 {
            offset += 8;
            continue;
        }
        return Some(offset + byte.leading_zeros());
    }
    None
}

/// Turns a `(base day count, day offset, packed HHMM)` triple into an
/// absolute timestamp.
///
/// `packed` encodes hours and minutes as `hours * 100 + minutes`
/// (e.g. 956 is 09:56). The [`NO_TIME`] sentinel must be filtered by the
/// caller before this is reached.
///
/// # Errors
///
/// Returns [`DecodeError::Truncated`] if the resulting date falls outside
/// the representable range, which only happens for garbage day counts.
pub(crate) fn resolve_time(
    base_days: i32,
    day_offset: u32,
    packed: u16,
) -> Result<NaiveDateTime, DecodeError> {
    debug_assert_ne!(packed, NO_TIME);
    let days = i64::from(base_days) + i64::from(day_offset);
    let delta = TimeDelta::days(days)
        + TimeDelta::hours(i64::from(packed / 100))
        + TimeDelta::minutes(i64::from(packed % 100));
    ANCHOR
        .and_time(NaiveTime::MIN)
        .checked_add_signed(delta)
        .ok_or(DecodeError::Truncated)
}
