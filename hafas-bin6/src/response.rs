//! Bounds-checked access to an inflated response buffer.
//!
//! The format is offset soup: the fixed [`Header`] points at several
//! tables, trips point into the part and service tables, the extension
//! header points at the details region, and a shared per-trip index
//! table inside that region locates both the trip details and the part
//! details. [`ResponseView`] validates the spine once, then resolves
//! every further offset against the buffer bounds on access. Nothing in
//! here panics on hostile input.

mod detail;
mod header;
mod service_day;
mod station;
mod trip;

pub use detail::{
    FLAG_CANCELED_MASK, FLAG_STOP_CANCELED, FLAG_TRIP_CANCELED, TripDetailRecord,
    TripPartDetailRecord, TripStopRecord,
};
pub use header::{ExtHeader, Header, Loc, TripDetailsHeader};
pub use service_day::ServiceDayRecord;
pub use station::StationRecord;
pub use trip::{TripPartRecord, TripRecord};

use crate::DecodeError;
use crate::calendar::{NO_TIME, resolve_time, service_day_offset};
use crate::inflate::inflate;
use crate::text::{NO_PLATFORM, decode_text, encoding_for_label};
use chrono::NaiveDateTime;
use encoding_rs::Encoding;
use enumset::EnumSet;
use fahrplan_model::{Location, Stop, Trip, TripFlag, TripPart};
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

const SUPPORTED_VERSION: u16 = 6;
const DETAILS_VERSION: u16 = 1;

const HEADER_SIZE: u64 = 0x4a;
const PART_RECORD_SIZE: u64 = 0x14;
const STATION_RECORD_SIZE: u64 = 0x0e;
const STOP_RECORD_SIZE: u64 = 0x1a;
const PART_DETAIL_RECORD_SIZE: u64 = 0x10;
/// Bytes of a service-day record before the mask starts.
const SERVICE_DAY_PREFIX: u64 = 6;
/// The extension header may grow beyond this, but never legally shrink.
const EXT_MIN_LENGTH: u32 = 0x30;

/// Decompresses and decodes a complete response body.
///
/// This is the whole pipeline: gzip inflation, structural validation,
/// and trip assembly.
///
/// # Errors
///
/// Returns [`DecodeError::Compression`] when the body is not a clean
/// gzip stream, and any of the other variants for the failure modes of
/// [`parse_trips`].
pub fn decode_trips(body: &[u8]) -> Result<Vec<Trip>, DecodeError> {
    let inflated = inflate(body)?;
    parse_trips(&inflated)
}

/// Decodes an already-inflated response buffer into trips.
///
/// # Errors
///
/// Any [`DecodeError`] variant except `Compression`: version and schema
/// checks, backend-reported errors, out-of-bounds offsets, undecodable
/// strings, or a structurally valid response with zero trips.
pub fn parse_trips(buf: &[u8]) -> Result<Vec<Trip>, DecodeError> {
    ResponseView::new(buf)?.trips()
}

/// A validated, read-only view over one inflated response buffer.
///
/// Construction checks the spine (version, headers, declared schema,
/// backend status) in a fixed order so that callers get the most
/// specific error first; per-trip data is only touched during
/// [`ResponseView::trips`].
pub struct ResponseView<'a> {
    buf: &'a [u8],
    header: &'a Header,
    trip_records: &'a [TripRecord],
    ext: &'a ExtHeader,
    details: &'a TripDetailsHeader,
    encoding: &'static Encoding,
}

impl<'a> ResponseView<'a> {
    /// Validates the buffer spine and captures the header views.
    ///
    /// # Errors
    ///
    /// In check order: [`DecodeError::UnsupportedVersion`] for anything
    /// but version 6 (checked before any other field is trusted),
    /// [`DecodeError::Truncated`] when a header or the trip array falls
    /// outside the buffer, [`DecodeError::ProviderReported`] for a
    /// backend error code, [`DecodeError::InvalidSequence`] for a zero
    /// sequence number, [`DecodeError::SchemaMismatch`] when the details
    /// sub-header declares a foreign schema, and [`DecodeError::Encoding`]
    /// when the declared text encoding is unknown.
    pub fn new(buf: &'a [u8]) -> Result<Self, DecodeError> {
        // The version is the only field read before we trust the layout.
        let version_bytes = buf.get(0..2).ok_or(DecodeError::Truncated)?;
        let version = u16::from_le_bytes([version_bytes[0], version_bytes[1]]);
        if version != SUPPORTED_VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }

        let header = record_at::<Header>(buf, 0)?;
        let after_header = buf
            .get(usize::try_from(HEADER_SIZE).map_err(|_| DecodeError::Truncated)?..)
            .ok_or(DecodeError::Truncated)?;
        let (trip_records, _) = <[TripRecord]>::ref_from_prefix_with_elems(
            after_header,
            usize::from(header.num_trips()),
        )
        .map_err(|_| DecodeError::Truncated)?;

        let ext = record_at::<ExtHeader>(buf, u64::from(header.ext.get()))?;
        if ext.length() < EXT_MIN_LENGTH {
            return Err(DecodeError::Truncated);
        }
        if ext.err() != 0 {
            return Err(DecodeError::ProviderReported(ext.err()));
        }
        if ext.seq() == 0 {
            return Err(DecodeError::InvalidSequence(ext.seq()));
        }

        let details = record_at::<TripDetailsHeader>(buf, u64::from(ext.details_tbl.get()))?;
        if details.version() != DETAILS_VERSION {
            return Err(DecodeError::SchemaMismatch);
        }
        if usize::from(details.stop_size()) != size_of::<TripStopRecord>()
            || usize::from(details.part_detail_size()) != size_of::<TripPartDetailRecord>()
        {
            return Err(DecodeError::SchemaMismatch);
        }

        let label_off = u64::from(header.strings_tbl.get()) + u64::from(ext.enc_off());
        let encoding = encoding_for_label(string_at(buf, label_off)?)?;

        Ok(Self {
            buf,
            header,
            trip_records,
            ext,
            details,
            encoding,
        })
    }

    #[inline]
    pub fn header(&self) -> &'a Header {
        self.header
    }

    #[inline]
    pub fn num_trips(&self) -> usize {
        self.trip_records.len()
    }

    /// The text encoding the response declared for its string table.
    #[inline]
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// The start and end locations of the original query, as echoed back
    /// in the header.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Truncated`] or [`DecodeError::Encoding`]
    /// when a name cannot be resolved from the string table.
    pub fn query_endpoints(&self) -> Result<(Location, Location), DecodeError> {
        Ok((
            self.endpoint(self.header.start())?,
            self.endpoint(self.header.end())?,
        ))
    }

    /// The request id the backend assigned, usable for follow-up queries
    /// against the same session.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Truncated`] or [`DecodeError::Encoding`]
    /// when the id cannot be resolved from the string table.
    pub fn request_id(&self) -> Result<String, DecodeError> {
        self.text(self.ext.req_id_off())
    }

    /// Assembles every trip in the response.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::NoTrips`] for an empty (all-filtered)
    /// response and [`DecodeError::Truncated`] or [`DecodeError::Encoding`]
    /// when per-trip data cannot be resolved.
    pub fn trips(&self) -> Result<Vec<Trip>, DecodeError> {
        if self.trip_records.is_empty() {
            return Err(DecodeError::NoTrips);
        }
        let mut trips = Vec::with_capacity(self.trip_records.len());
        for (index, record) in self.trip_records.iter().enumerate() {
            trips.push(self.assemble_trip(index, record)?);
        }
        Ok(trips)
    }

    fn endpoint(&self, loc: &Loc) -> Result<Location, DecodeError> {
        Ok(Location::new(
            self.text(loc.name_off())?,
            loc.lon_degrees(),
            loc.lat_degrees(),
        ))
    }

    /// Null-terminated raw bytes at `off` in the string table.
    fn string(&self, off: u16) -> Result<&'a [u8], DecodeError> {
        string_at(
            self.buf,
            u64::from(self.header.strings_tbl.get()) + u64::from(off),
        )
    }

    /// A string-table entry converted to UTF-8 via the declared encoding.
    fn text(&self, off: u16) -> Result<String, DecodeError> {
        decode_text(self.string(off)?, self.encoding)
    }

    /// A platform name, with the empty string and the `---` sentinel both
    /// mapped to "no platform".
    fn platform(&self, off: u16) -> Result<Option<String>, DecodeError> {
        let name = self.text(off)?;
        if name.is_empty() || name == NO_PLATFORM {
            Ok(None)
        } else {
            Ok(Some(name))
        }
    }

    fn station(&self, index: u16) -> Result<Location, DecodeError> {
        let offset = u64::from(self.header.stations_tbl.get())
            + u64::from(index) * STATION_RECORD_SIZE;
        let record = record_at::<StationRecord>(self.buf, offset)?;
        Ok(Location::new(
            self.text(record.name_off())?,
            record.lon_degrees(),
            record.lat_degrees(),
        ))
    }

    fn trip_part(&self, record: &TripRecord, part: usize) -> Result<&'a TripPartRecord, DecodeError> {
        let part = u64::try_from(part).map_err(|_| DecodeError::Truncated)?;
        let offset = HEADER_SIZE + u64::from(record.parts_off()) + part * PART_RECORD_SIZE;
        record_at(self.buf, offset)
    }

    /// The day offset from the base date on which this trip first runs,
    /// scanned from its service-day bitmask.
    fn first_service_day(&self, record: &TripRecord) -> Result<u32, DecodeError> {
        let base = u64::from(self.header.service_tbl.get()) + u64::from(record.service_off());
        let day = record_at::<ServiceDayRecord>(self.buf, base)?;
        let mask = slice_at(
            self.buf,
            base + SERVICE_DAY_PREFIX,
            u64::from(day.byte_len()),
        )?;
        // A mask with no set bit describes a trip that never runs; a real
        // backend does not emit one, so it is treated as corruption.
        service_day_offset(day.byte_base(), mask).ok_or(DecodeError::Truncated)
    }

    /// The shared per-trip byte offset into both detail tables.
    fn detail_index(&self, trip: usize) -> Result<u16, DecodeError> {
        let trip = u64::try_from(trip).map_err(|_| DecodeError::Truncated)?;
        let offset = u64::from(self.ext.details_tbl.get())
            + u64::from(self.details.details_index_off.get())
            + 2 * trip;
        read_u16(self.buf, offset)
    }

    fn trip_detail(&self, trip: usize) -> Result<&'a TripDetailRecord, DecodeError> {
        let offset = u64::from(self.ext.details_tbl.get())
            + u64::from(self.details.details_index_off.get())
            + u64::from(self.detail_index(trip)?);
        record_at(self.buf, offset)
    }

    fn part_detail(
        &self,
        trip: usize,
        part: usize,
    ) -> Result<&'a TripPartDetailRecord, DecodeError> {
        let part = u64::try_from(part).map_err(|_| DecodeError::Truncated)?;
        let offset = u64::from(self.ext.details_tbl.get())
            + u64::from(self.details.part_details_off.get())
            + u64::from(self.detail_index(trip)?)
            + part * PART_DETAIL_RECORD_SIZE;
        record_at(self.buf, offset)
    }

    fn trip_stop(
        &self,
        detail: &TripPartDetailRecord,
        stop: usize,
    ) -> Result<&'a TripStopRecord, DecodeError> {
        let stop = u64::try_from(stop).map_err(|_| DecodeError::Truncated)?;
        let offset = u64::from(self.ext.details_tbl.get())
            + u64::from(self.details.stops_off.get())
            + (u64::from(detail.stop_index()) + stop) * STOP_RECORD_SIZE;
        record_at(self.buf, offset)
    }

    fn time_at(&self, day_offset: u32, packed: u16) -> Result<Option<NaiveDateTime>, DecodeError> {
        if packed == NO_TIME {
            return Ok(None);
        }
        resolve_time(i32::from(self.header.base_days()), day_offset, packed).map(Some)
    }

    fn assemble_trip(&self, index: usize, record: &TripRecord) -> Result<Trip, DecodeError> {
        let day_offset = self.first_service_day(record)?;
        let mut flags = EnumSet::empty();
        let mut parts = Vec::with_capacity(usize::from(record.part_cnt()));
        for part_index in 0..usize::from(record.part_cnt()) {
            let part = self.trip_part(record, part_index)?;
            let detail = self.part_detail(index, part_index)?;
            if detail.is_canceled() {
                flags.insert(TripFlag::Canceled);
            }
            parts.push(self.assemble_part(day_offset, part, detail)?);
        }
        if parts.is_empty() {
            return Err(DecodeError::Truncated);
        }
        Ok(Trip::new(parts, flags))
    }

    fn assemble_part(
        &self,
        day_offset: u32,
        part: &TripPartRecord,
        detail: &TripPartDetailRecord,
    ) -> Result<TripPart, DecodeError> {
        let line = self.text(part.line_off())?;

        // The first stop of a part only ever departs and the last only
        // ever arrives; the opposite sides belong to the adjacent parts.
        let mut start = Stop::new(self.station(part.dep_station())?);
        if let Some(at) = self.time_at(day_offset, part.dep())? {
            start = start.with_departure(at);
        }
        if let Some(at) = self.time_at(day_offset, detail.dep_pred())? {
            start = start.with_predicted_departure(at);
        }
        if let Some(platform) = self.platform(part.dep_platform_off())? {
            start = start.with_departure_platform(platform);
        }

        let mut end = Stop::new(self.station(part.arr_station())?);
        if let Some(at) = self.time_at(day_offset, part.arr())? {
            end = end.with_arrival(at);
        }
        if let Some(at) = self.time_at(day_offset, detail.arr_pred())? {
            end = end.with_predicted_arrival(at);
        }
        if let Some(platform) = self.platform(part.arr_platform_off())? {
            end = end.with_arrival_platform(platform);
        }

        let mut stops = Vec::with_capacity(usize::from(detail.stops_cnt()));
        for stop_index in 0..usize::from(detail.stops_cnt()) {
            stops.push(self.intermediate_stop(day_offset, detail, stop_index)?);
        }

        Ok(TripPart::new(start, end, line, stops))
    }

    fn intermediate_stop(
        &self,
        day_offset: u32,
        detail: &TripPartDetailRecord,
        index: usize,
    ) -> Result<Stop, DecodeError> {
        let record = self.trip_stop(detail, index)?;
        let mut stop = Stop::new(self.station(record.station())?);
        if let Some(at) = self.time_at(day_offset, record.arr())? {
            stop = stop.with_arrival(at);
        }
        if let Some(at) = self.time_at(day_offset, record.dep())? {
            stop = stop.with_departure(at);
        }
        if let Some(at) = self.time_at(day_offset, record.arr_pred())? {
            stop = stop.with_predicted_arrival(at);
        }
        if let Some(at) = self.time_at(day_offset, record.dep_pred())? {
            stop = stop.with_predicted_departure(at);
        }
        if let Some(platform) = self.platform(record.arr_platform_off())? {
            stop = stop.with_arrival_platform(platform);
        }
        if let Some(platform) = self.platform(record.dep_platform_off())? {
            stop = stop.with_departure_platform(platform);
        }
        Ok(stop)
    }
}

/// A typed record view at an arbitrary buffer offset.
fn record_at<T>(buf: &[u8], offset: u64) -> Result<&T, DecodeError>
where
    T: FromBytes + KnownLayout + Immutable + Unaligned,
{
    let start = usize::try_from(offset).map_err(|_| DecodeError::Truncated)?;
    let tail = buf.get(start..).ok_or(DecodeError::Truncated)?;
    T::ref_from_prefix(tail)
        .map(|(record, _)| record)
        .map_err(|_| DecodeError::Truncated)
}

fn slice_at(buf: &[u8], offset: u64, len: u64) -> Result<&[u8], DecodeError> {
    let start = usize::try_from(offset).map_err(|_| DecodeError::Truncated)?;
    let len = usize::try_from(len).map_err(|_| DecodeError::Truncated)?;
    let end = start.checked_add(len).ok_or(DecodeError::Truncated)?;
    buf.get(start..end).ok_or(DecodeError::Truncated)
}

fn read_u16(buf: &[u8], offset: u64) -> Result<u16, DecodeError> {
    let bytes = slice_at(buf, offset, 2)?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// The null-terminated byte run starting at an absolute offset.
fn string_at(buf: &[u8], offset: u64) -> Result<&[u8], DecodeError> {
    let start = usize::try_from(offset).map_err(|_| DecodeError::Truncated)?;
    let tail = buf.get(start..).ok_or(DecodeError::Truncated)?;
    let end = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or(DecodeError::Truncated)?;
    Ok(&tail[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{PartSpec, ResponseBuilder, StationSpec, StopSpec, TripSpec};
    use crate::calendar::ANCHOR;
    use chrono::{NaiveDate, NaiveDateTime};
    use proptest::prelude::*;

    fn day_count(date: NaiveDate) -> i16 {
        i16::try_from((date - ANCHOR).num_days()).unwrap()
    }

    fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        date.and_hms_opt(h, m, 0).unwrap()
    }

    fn erpel() -> StationSpec {
        StationSpec::new("Erpel(Rhein)", 7_241_593, 50_582_067).with_id(8_001_858)
    }

    fn linz() -> StationSpec {
        StationSpec::new("Linz(Rhein)", 7_277_718, 50_568_931).with_id(8_003_724)
    }

    fn linz_busbf() -> StationSpec {
        StationSpec::new("Linz(Rhein) Busbf", 7_278_050, 50_569_120)
    }

    fn faehre() -> StationSpec {
        StationSpec::new("Rheinfähre, Erpel", 7_230_429, 50_583_823)
    }

    fn unkel() -> StationSpec {
        StationSpec::new("Unkel", 7_219_703, 50_596_290).with_id(8_005_461)
    }

    /// Three trips Erpel(Rhein) -> Unkel on 2014-02-21, modeled on real
    /// DB responses: a direct train, a three-part footway/bus connection,
    /// and a canceled train.
    fn fixture() -> ResponseBuilder {
        let date = NaiveDate::from_ymd_opt(2014, 2, 21).unwrap();

        // Trip 1 first runs on the base date itself.
        let direct = TripSpec::new()
            .with_service(0, vec![0b1000_0000])
            .with_delay(5)
            .with_part(
                PartSpec::new("MRB 86575", erpel(), 958, unkel(), 1001)
                    .with_dep_platform("2")
                    .with_arr_platform("1")
                    .with_dep_pred(1003)
                    .with_arr_pred(1006),
            );

        // Trip 2 first runs nine days into its mask window.
        let connection = TripSpec::new()
            .with_service(0, vec![0, 0b0100_0000])
            .with_part(
                PartSpec::new("MRB 86577", erpel(), 1058, linz(), 1101).with_dep_platform("2"),
            )
            .with_part(PartSpec::new("Fussweg", linz(), 1101, linz_busbf(), 1105))
            .with_part(
                PartSpec::new("Bus 565", linz_busbf(), 1110, unkel(), 1140)
                    .with_stop(StopSpec::new(faehre(), 1112, 1113))
                    .with_stop(StopSpec::new(StationSpec::new("Erpel Mitte", 7_235_685, 50_583_508), 1115, 1116))
                    .with_stop(StopSpec::new(StationSpec::new("Erpel Rathaus", 7_233_107, 50_583_438), 1117, 1118))
                    .with_stop(
                        StopSpec::new(StationSpec::new("Orsberg Ort, Erpel", 7_235_000, 50_589_000), 1121, 1122)
                            .with_arr_pred(1124)
                            .with_dep_pred(1125),
                    )
                    .with_stop(StopSpec::new(StationSpec::new("Bruchhausen Post", 7_229_000, 50_590_500), 1124, 1125))
                    .with_stop(StopSpec::new(StationSpec::new("Scheuren Sonnenbergstr., Unkel", 7_224_000, 50_592_000), 1128, 1129))
                    .with_stop(StopSpec::new(StationSpec::new("Unkel Gartenstr.", 7_221_500, 50_594_200), 1131, 1132))
                    .with_stop(StopSpec::new(StationSpec::new("Unkel Markt", 7_220_400, 50_595_600), 1134, 1135).with_dep_platform("---")),
            );

        let canceled = TripSpec::new()
            .with_service(0, vec![0b1000_0000])
            .with_part(
                PartSpec::new("MRB 86579", erpel(), 1158, unkel(), 1201)
                    .with_arr_platform("---")
                    .with_flags(FLAG_TRIP_CANCELED),
            );

        ResponseBuilder::new(day_count(date))
            .with_endpoints(erpel(), unkel())
            .with_trip(direct)
            .with_trip(connection)
            .with_trip(canceled)
    }

    #[test]
    fn test_direct_trip() {
        let date = NaiveDate::from_ymd_opt(2014, 2, 21).unwrap();
        let buf = fixture().build().unwrap();
        let trips = parse_trips(&buf).unwrap();
        assert_eq!(trips.len(), 3);

        let direct = &trips[0];
        assert_eq!(direct.parts().len(), 1);
        assert!(!direct.is_canceled());

        let origin = direct.origin().unwrap();
        assert_eq!(origin.name(), "Erpel(Rhein)");
        assert_eq!(origin.departure(), Some(at(date, 9, 58)));
        assert_eq!(origin.arrival(), None);
        assert_eq!(origin.departure_platform(), Some("2"));
        assert_eq!(origin.departure_delay(), 5);
        assert!((origin.location().longitude() - 7.241_593).abs() < 1e-9);

        let destination = direct.destination().unwrap();
        assert_eq!(destination.name(), "Unkel");
        assert_eq!(destination.arrival(), Some(at(date, 10, 1)));
        assert_eq!(destination.departure(), None);
        assert_eq!(destination.arrival_platform(), Some("1"));
        assert_eq!(destination.arrival_delay(), 5);
    }

    #[test]
    fn test_service_mask_shifts_the_date() {
        let date = NaiveDate::from_ymd_opt(2014, 2, 21).unwrap();
        let buf = fixture().build().unwrap();
        let trips = parse_trips(&buf).unwrap();

        // Trip 2's mask places its first service day nine days after base.
        let connection = &trips[1];
        let expected = at(date + chrono::TimeDelta::days(9), 10, 58);
        assert_eq!(connection.origin().unwrap().departure(), Some(expected));
    }

    #[test]
    fn test_multi_part_connection() {
        let buf = fixture().build().unwrap();
        let trips = parse_trips(&buf).unwrap();

        let connection = &trips[1];
        let lines: Vec<&str> = connection.parts().iter().map(TripPart::line).collect();
        assert_eq!(lines, ["MRB 86577", "Fussweg", "Bus 565"]);
        assert_eq!(connection.origin().unwrap().name(), "Erpel(Rhein)");
        assert_eq!(connection.destination().unwrap().name(), "Unkel");

        let bus = &connection.parts()[2];
        assert_eq!(bus.stops().len(), 8);
        assert_eq!(bus.stops()[0].name(), "Rheinfähre, Erpel");
        assert_eq!(bus.stops()[3].name(), "Orsberg Ort, Erpel");
        assert_eq!(bus.stops()[3].arrival_delay(), 3);
        assert_eq!(bus.stops()[3].departure_delay(), 3);
        assert_eq!(bus.stops()[7].name(), "Unkel Markt");
        // Stop-level platform sentinel maps to "no platform" as well.
        assert_eq!(bus.stops()[7].departure_platform(), None);
    }

    #[test]
    fn test_canceled_trip_and_platform_sentinel() {
        let buf = fixture().build().unwrap();
        let trips = parse_trips(&buf).unwrap();

        let canceled = &trips[2];
        assert!(canceled.is_canceled());
        // "---" means no platform assigned, not a platform named "---".
        assert_eq!(canceled.destination().unwrap().arrival_platform(), None);
    }

    #[test]
    fn test_view_accessors() {
        let buf = fixture().build().unwrap();
        let view = ResponseView::new(&buf).unwrap();

        assert_eq!(view.num_trips(), 3);
        assert_eq!(view.encoding().name(), "windows-1252");

        let (start, end) = view.query_endpoints().unwrap();
        assert_eq!(start.name(), "Erpel(Rhein)");
        assert_eq!(end.name(), "Unkel");

        assert!(!view.request_id().unwrap().is_empty());
        assert_eq!(view.trip_detail(0).unwrap().delay(), 5);
        assert_eq!(view.trip_detail(1).unwrap().delay(), 0);
    }

    #[test]
    fn test_unsupported_version() {
        let buf = fixture().with_version(5).build().unwrap();
        assert!(matches!(
            parse_trips(&buf),
            Err(DecodeError::UnsupportedVersion(5))
        ));
    }

    #[test]
    fn test_provider_reported_error() {
        let buf = fixture().with_provider_error(20).build().unwrap();
        assert!(matches!(
            parse_trips(&buf),
            Err(DecodeError::ProviderReported(20))
        ));
    }

    #[test]
    fn test_zero_sequence_is_rejected() {
        let buf = fixture().with_sequence(0).build().unwrap();
        assert!(matches!(
            parse_trips(&buf),
            Err(DecodeError::InvalidSequence(0))
        ));
    }

    #[test]
    fn test_foreign_details_schema_is_rejected() {
        let buf = fixture().with_details_version(2).build().unwrap();
        assert!(matches!(parse_trips(&buf), Err(DecodeError::SchemaMismatch)));

        let buf = fixture().with_declared_stop_size(28).build().unwrap();
        assert!(matches!(parse_trips(&buf), Err(DecodeError::SchemaMismatch)));

        let buf = fixture().with_declared_part_detail_size(20).build().unwrap();
        assert!(matches!(parse_trips(&buf), Err(DecodeError::SchemaMismatch)));
    }

    #[test]
    fn test_unknown_encoding_label_is_rejected() {
        let buf = fixture().with_declared_encoding("x-bogus-charset").build().unwrap();
        assert!(matches!(parse_trips(&buf), Err(DecodeError::Encoding)));
    }

    #[test]
    fn test_empty_response_has_no_trips() {
        let buf = ResponseBuilder::new(0)
            .with_endpoints(erpel(), unkel())
            .build()
            .unwrap();
        assert!(matches!(parse_trips(&buf), Err(DecodeError::NoTrips)));
    }

    #[test]
    fn test_never_running_trip_is_rejected() {
        let buf = ResponseBuilder::new(0)
            .with_endpoints(erpel(), unkel())
            .with_trip(
                TripSpec::new()
                    .with_service(0, vec![0, 0, 0])
                    .with_part(PartSpec::new("MRB 86575", erpel(), 958, unkel(), 1001)),
            )
            .build()
            .unwrap();
        assert!(matches!(parse_trips(&buf), Err(DecodeError::Truncated)));
    }

    #[test]
    fn test_every_truncation_point_errors() {
        let buf = fixture().build().unwrap();
        for cut in 0..buf.len() {
            assert!(
                parse_trips(&buf[..cut]).is_err(),
                "prefix of {cut} bytes decoded successfully"
            );
        }
    }

    #[test]
    fn test_decode_trips_inflates_first() {
        let body = fixture().build_gzip().unwrap();
        let trips = decode_trips(&body).unwrap();
        assert_eq!(trips.len(), 3);

        assert!(matches!(
            decode_trips(b"not gzip at all"),
            Err(DecodeError::Compression(_))
        ));
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let buf = fixture().build().unwrap();
        assert_eq!(parse_trips(&buf).unwrap(), parse_trips(&buf).unwrap());
    }

    proptest! {
        #[test]
        fn test_arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let _ = parse_trips(&bytes);
            let _ = decode_trips(&bytes);
        }

        #[test]
        fn test_bit_flips_never_panic(
            index in 0usize..4096,
            bit in 0u8..8,
        ) {
            let mut buf = fixture().build().unwrap();
            let index = index % buf.len();
            buf[index] ^= 1 << bit;
            let _ = parse_trips(&buf);
        }
    }
}
