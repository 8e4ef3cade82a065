//! Serializes synthetic responses in the binary wire layout.
//!
//! The decoder is exercised against buffers produced here: real
//! responses come gzipped out of a session-bound backend and cannot be
//! replayed, so tests describe trips declaratively and let the builder
//! lay out the tables, intern the strings, and wire up the offset
//! indirections. Knobs exist to emit deliberately broken spines
//! (foreign version numbers, backend error codes, misdeclared record
//! sizes) for the validation paths.

use crate::calendar::NO_TIME;
use crate::response::{
    ExtHeader, Header, Loc, StationRecord, TripDetailRecord, TripDetailsHeader,
    TripPartDetailRecord, TripPartRecord, TripRecord, TripStopRecord,
};
use flate2::{Compression, write::GzEncoder};
use std::collections::HashMap;
use std::io::Write;
use thiserror::Error;
use zerocopy::IntoBytes;

/// Failure modes of [`ResponseBuilder::build`].
#[derive(Debug, Error)]
pub enum BuildError {
    /// A string cannot be represented in the response text encoding.
    #[error("string {0:?} is not representable in the response encoding")]
    Unencodable(String),
    /// A table grew past what its offset field width can address.
    #[error("a section grew past the field width of the format")]
    Overflow,
    /// Gzip framing failed in [`ResponseBuilder::build_gzip`].
    #[error("failed to gzip the response body: {0}")]
    Compression(#[from] std::io::Error),
}

/// A station referenced by trips; deduplicated into the station table.
#[derive(Debug, Clone)]
pub struct StationSpec {
    name: String,
    id: u32,
    lon: i32,
    lat: i32,
}

impl StationSpec {
    /// Coordinates are given in micro-degrees, as on the wire.
    pub fn new(name: impl Into<String>, lon_micro: i32, lat_micro: i32) -> Self {
        Self {
            name: name.into(),
            id: 0,
            lon: lon_micro,
            lat: lat_micro,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }
}

/// An intermediate stop of one trip part.
#[derive(Debug, Clone)]
pub struct StopSpec {
    station: StationSpec,
    arr: u16,
    dep: u16,
    arr_pred: u16,
    dep_pred: u16,
    arr_platform: Option<String>,
    dep_platform: Option<String>,
}

impl StopSpec {
    /// Times are packed `HHMM`; predictions default to absent.
    pub fn new(station: StationSpec, arr: u16, dep: u16) -> Self {
        Self {
            station,
            arr,
            dep,
            arr_pred: NO_TIME,
            dep_pred: NO_TIME,
            arr_platform: None,
            dep_platform: None,
        }
    }

    #[must_use]
    pub fn with_arr_pred(mut self, packed: u16) -> Self {
        self.arr_pred = packed;
        self
    }

    #[must_use]
    pub fn with_dep_pred(mut self, packed: u16) -> Self {
        self.dep_pred = packed;
        self
    }

    #[must_use]
    pub fn with_arr_platform(mut self, platform: impl Into<String>) -> Self {
        self.arr_platform = Some(platform.into());
        self
    }

    #[must_use]
    pub fn with_dep_platform(mut self, platform: impl Into<String>) -> Self {
        self.dep_platform = Some(platform.into());
        self
    }
}

/// One leg of a trip.
#[derive(Debug, Clone)]
pub struct PartSpec {
    line: String,
    dep_station: StationSpec,
    dep: u16,
    arr_station: StationSpec,
    arr: u16,
    dep_pred: u16,
    arr_pred: u16,
    dep_platform: Option<String>,
    arr_platform: Option<String>,
    flags: u16,
    stops: Vec<StopSpec>,
}

impl PartSpec {
    pub fn new(
        line: impl Into<String>,
        dep_station: StationSpec,
        dep: u16,
        arr_station: StationSpec,
        arr: u16,
    ) -> Self {
        Self {
            line: line.into(),
            dep_station,
            dep,
            arr_station,
            arr,
            dep_pred: NO_TIME,
            arr_pred: NO_TIME,
            dep_platform: None,
            arr_platform: None,
            flags: 0,
            stops: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_dep_pred(mut self, packed: u16) -> Self {
        self.dep_pred = packed;
        self
    }

    #[must_use]
    pub fn with_arr_pred(mut self, packed: u16) -> Self {
        self.arr_pred = packed;
        self
    }

    #[must_use]
    pub fn with_dep_platform(mut self, platform: impl Into<String>) -> Self {
        self.dep_platform = Some(platform.into());
        self
    }

    #[must_use]
    pub fn with_arr_platform(mut self, platform: impl Into<String>) -> Self {
        self.arr_platform = Some(platform.into());
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_stop(mut self, stop: StopSpec) -> Self {
        self.stops.push(stop);
        self
    }
}

/// One trip with its service-day mask.
#[derive(Debug, Clone)]
pub struct TripSpec {
    byte_base: u16,
    mask: Vec<u8>,
    delay: u16,
    parts: Vec<PartSpec>,
}

impl TripSpec {
    /// Defaults to a service mask whose first bit is set, i.e. a trip
    /// running on the base date itself.
    pub fn new() -> Self {
        Self {
            byte_base: 0,
            mask: vec![0b1000_0000],
            delay: 0,
            parts: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_service(mut self, byte_base: u16, mask: Vec<u8>) -> Self {
        self.byte_base = byte_base;
        self.mask = mask;
        self
    }

    /// Overall delay in minutes, reported in the trip detail record.
    #[must_use]
    pub fn with_delay(mut self, minutes: u16) -> Self {
        self.delay = minutes;
        self
    }

    #[must_use]
    pub fn with_part(mut self, part: PartSpec) -> Self {
        self.parts.push(part);
        self
    }
}

impl Default for TripSpec {
    fn default() -> Self {
        Self::new()
    }
}

/// Declarative description of a whole response buffer.
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    version: u16,
    base_days: i16,
    sequence: u16,
    provider_error: u16,
    details_version: u16,
    declared_stop_size: u16,
    declared_part_detail_size: u16,
    declared_encoding: String,
    request_id: String,
    start: Option<StationSpec>,
    end: Option<StationSpec>,
    trips: Vec<TripSpec>,
}

impl ResponseBuilder {
    /// `base_days` is the response base date in days since 1979-12-31.
    pub fn new(base_days: i16) -> Self {
        Self {
            version: 6,
            base_days,
            sequence: 1,
            provider_error: 0,
            details_version: 1,
            declared_stop_size: 0x1a,
            declared_part_detail_size: 0x10,
            declared_encoding: "iso-8859-1".to_owned(),
            request_id: "07.02.1554942".to_owned(),
            start: None,
            end: None,
            trips: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn with_sequence(mut self, sequence: u16) -> Self {
        self.sequence = sequence;
        self
    }

    #[must_use]
    pub fn with_provider_error(mut self, code: u16) -> Self {
        self.provider_error = code;
        self
    }

    #[must_use]
    pub fn with_details_version(mut self, version: u16) -> Self {
        self.details_version = version;
        self
    }

    #[must_use]
    pub fn with_declared_stop_size(mut self, size: u16) -> Self {
        self.declared_stop_size = size;
        self
    }

    #[must_use]
    pub fn with_declared_part_detail_size(mut self, size: u16) -> Self {
        self.declared_part_detail_size = size;
        self
    }

    /// The encoding label written at the extension header's `enc_off`.
    /// Strings are always serialized as windows-1252 regardless, so a
    /// bogus label exercises the decoder's label check in isolation.
    #[must_use]
    pub fn with_declared_encoding(mut self, label: impl Into<String>) -> Self {
        self.declared_encoding = label.into();
        self
    }

    /// The query start and end echoed in the header.
    #[must_use]
    pub fn with_endpoints(mut self, start: StationSpec, end: StationSpec) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn with_trip(mut self, trip: TripSpec) -> Self {
        self.trips.push(trip);
        self
    }

    /// Serializes the response into its uncompressed wire layout.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Unencodable`] for strings outside
    /// windows-1252 and [`BuildError::Overflow`] when a table outgrows
    /// its offset field.
    pub fn build(&self) -> Result<Vec<u8>, BuildError> {
        let mut strings = StringTable::new();
        let mut stations = StationTable::default();

        let start = endpoint_loc(self.start.as_ref(), &mut strings)?;
        let end = endpoint_loc(self.end.as_ref(), &mut strings)?;

        // First pass: resolve strings and stations, build the fixed-size
        // records whose offsets do not depend on section placement.
        let mut wires: Vec<Vec<(TripPartRecord, TripPartDetailRecord)>> = Vec::new();
        let mut all_stops: Vec<TripStopRecord> = Vec::new();
        for trip in &self.trips {
            let mut parts = Vec::with_capacity(trip.parts.len());
            for part in &trip.parts {
                let record = TripPartRecord {
                    dep: part.dep.into(),
                    dep_station: stations.index(&part.dep_station, &mut strings)?.into(),
                    arr: part.arr.into(),
                    arr_station: stations.index(&part.arr_station, &mut strings)?.into(),
                    part_type: 2.into(),
                    line_off: strings.intern(&part.line)?.into(),
                    dep_platform_off: strings.intern_opt(part.dep_platform.as_deref())?.into(),
                    arr_platform_off: strings.intern_opt(part.arr_platform.as_deref())?.into(),
                    attr_index: 0.into(),
                    comments_off: 0.into(),
                };
                let stop_index = offset16(all_stops.len())?;
                for stop in &part.stops {
                    all_stops.push(TripStopRecord {
                        dep: stop.dep.into(),
                        arr: stop.arr.into(),
                        dep_platform_off: strings.intern_opt(stop.dep_platform.as_deref())?.into(),
                        arr_platform_off: strings.intern_opt(stop.arr_platform.as_deref())?.into(),
                        _unknown0: 0.into(),
                        dep_pred: stop.dep_pred.into(),
                        arr_pred: stop.arr_pred.into(),
                        dep_platform_pred_off: 0.into(),
                        arr_platform_pred_off: 0.into(),
                        _unknown1: 0.into(),
                        station: stations.index(&stop.station, &mut strings)?.into(),
                    });
                }
                let detail = TripPartDetailRecord {
                    dep_pred: part.dep_pred.into(),
                    arr_pred: part.arr_pred.into(),
                    dep_platform_pred_off: 0.into(),
                    arr_platform_pred_off: 0.into(),
                    flags: part.flags.into(),
                    _unknown: 0.into(),
                    stop_index: stop_index.into(),
                    stops_cnt: offset16(part.stops.len())?.into(),
                };
                parts.push((record, detail));
            }
            wires.push(parts);
        }
        let enc_off = strings.intern(&self.declared_encoding)?;
        let req_id_off = strings.intern(&self.request_id)?;

        // The service table interleaves fixed prefixes with variable
        // masks, so it is serialized directly.
        let mut service = Vec::new();
        let mut service_offs = Vec::with_capacity(self.trips.len());
        for trip in &self.trips {
            service_offs.push(offset16(service.len())?);
            service.extend_from_slice(&0u16.to_le_bytes());
            service.extend_from_slice(&trip.byte_base.to_le_bytes());
            service.extend_from_slice(&offset16(trip.mask.len())?.to_le_bytes());
            service.extend_from_slice(&trip.mask);
        }

        // Section placement. The extension header goes last so its
        // absolute offset caps the buffer.
        let trip_count = self.trips.len();
        let trips_size = trip_count * size_of::<TripRecord>();
        let parts_size: usize = wires
            .iter()
            .map(|parts| parts.len() * size_of::<TripPartRecord>())
            .sum();
        let service_tbl = size_of::<Header>() + trips_size + parts_size;
        let strings_tbl = service_tbl + service.len();
        let stations_tbl = strings_tbl + strings.blob.len();
        let details_tbl = stations_tbl + stations.records.len() * size_of::<StationRecord>();

        // Both detail tables are addressed through one shared per-trip
        // byte index, so they get the same footprint; each trip's slot
        // must fit its part details and the 4-byte trip detail.
        let index_size = 2 * trip_count;
        let mut idx_vals = Vec::with_capacity(trip_count);
        let mut cursor = index_size;
        for parts in &wires {
            idx_vals.push(offset16(cursor)?);
            cursor += (parts.len() * size_of::<TripPartDetailRecord>())
                .max(size_of::<TripDetailRecord>());
        }
        let shared_size = cursor;
        let details_index_off = size_of::<TripDetailsHeader>();
        let part_details_off = details_index_off + shared_size;
        let stops_off = part_details_off + shared_size;
        let details_size = stops_off + all_stops.len() * size_of::<TripStopRecord>();
        let ext_off = details_tbl + details_size;
        let total_size = ext_off + size_of::<ExtHeader>();

        // Second pass: serialize the sections in placement order.
        let mut buf = Vec::with_capacity(total_size);

        let header = Header {
            version: self.version.into(),
            start,
            end,
            num_trips: offset16(trip_count)?.into(),
            service_tbl: offset32(service_tbl)?.into(),
            strings_tbl: offset32(strings_tbl)?.into(),
            days: self.base_days.into(),
            _unknown0: [0; 12],
            stations_tbl: offset32(stations_tbl)?.into(),
            comments_tbl: offset32(strings_tbl)?.into(),
            _unknown1: [0; 8],
            ext: offset32(ext_off)?.into(),
        };
        buf.extend_from_slice(header.as_bytes());

        let mut parts_cursor = trips_size;
        for (parts, service_off) in wires.iter().zip(&service_offs) {
            let record = TripRecord {
                service_off: (*service_off).into(),
                parts_off: offset32(parts_cursor)?.into(),
                part_cnt: offset16(parts.len())?.into(),
                changes: offset16(parts.len().saturating_sub(1))?.into(),
                _unknown: 0.into(),
            };
            parts_cursor += parts.len() * size_of::<TripPartRecord>();
            buf.extend_from_slice(record.as_bytes());
        }
        for parts in &wires {
            for (record, _) in parts {
                buf.extend_from_slice(record.as_bytes());
            }
        }
        buf.extend_from_slice(&service);
        buf.extend_from_slice(&strings.blob);
        for station in &stations.records {
            buf.extend_from_slice(station.as_bytes());
        }

        let details_header = TripDetailsHeader {
            version: self.details_version.into(),
            _unknown: 0.into(),
            details_index_off: offset16(details_index_off)?.into(),
            part_details_off: offset16(part_details_off)?.into(),
            part_detail_size: self.declared_part_detail_size.into(),
            stop_size: self.declared_stop_size.into(),
            stops_off: offset16(stops_off)?.into(),
        };
        buf.extend_from_slice(details_header.as_bytes());

        let mut trip_details = vec![0u8; shared_size];
        let mut part_details = vec![0u8; shared_size];
        for (i, (parts, trip)) in wires.iter().zip(&self.trips).enumerate() {
            let slot = usize::from(idx_vals[i]);
            write_at(&mut trip_details, 2 * i, &idx_vals[i].to_le_bytes())?;
            let detail = TripDetailRecord {
                rt_status: 0.into(),
                delay: trip.delay.into(),
            };
            write_at(&mut trip_details, slot, detail.as_bytes())?;
            for (j, (_, part_detail)) in parts.iter().enumerate() {
                write_at(
                    &mut part_details,
                    slot + j * size_of::<TripPartDetailRecord>(),
                    part_detail.as_bytes(),
                )?;
            }
        }
        buf.extend_from_slice(&trip_details);
        buf.extend_from_slice(&part_details);
        for stop in &all_stops {
            buf.extend_from_slice(stop.as_bytes());
        }

        let ext = ExtHeader {
            length: offset32(size_of::<ExtHeader>())?.into(),
            _unknown0: 0.into(),
            seq: self.sequence.into(),
            req_id_off: req_id_off.into(),
            details_tbl: offset32(details_tbl)?.into(),
            err: self.provider_error.into(),
            _unknown1: [0; 14],
            enc_off: enc_off.into(),
            ld_off: 0.into(),
            attrs_off: 0.into(),
            _pad: [0; 6],
            attrs_index0: 0.into(),
        };
        buf.extend_from_slice(ext.as_bytes());

        debug_assert_eq!(buf.len(), total_size);
        Ok(buf)
    }

    /// [`ResponseBuilder::build`] plus the gzip framing of a real
    /// response body.
    ///
    /// # Errors
    ///
    /// The failure modes of [`ResponseBuilder::build`], plus
    /// [`BuildError::Compression`] if the encoder fails.
    pub fn build_gzip(&self) -> Result<Vec<u8>, BuildError> {
        let raw = self.build()?;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw)?;
        Ok(encoder.finish()?)
    }
}

fn endpoint_loc(
    spec: Option<&StationSpec>,
    strings: &mut StringTable,
) -> Result<Loc, BuildError> {
    let (name_off, lon, lat) = match spec {
        Some(spec) => (strings.intern(&spec.name)?, spec.lon, spec.lat),
        None => (0, 0, 0),
    };
    Ok(Loc {
        name_off: name_off.into(),
        _unknown: 0.into(),
        loc_type: 1.into(),
        lon: lon.into(),
        lat: lat.into(),
    })
}

fn offset16(value: usize) -> Result<u16, BuildError> {
    u16::try_from(value).map_err(|_| BuildError::Overflow)
}

fn offset32(value: usize) -> Result<u32, BuildError> {
    u32::try_from(value).map_err(|_| BuildError::Overflow)
}

fn write_at(buf: &mut [u8], offset: usize, bytes: &[u8]) -> Result<(), BuildError> {
    let end = offset.checked_add(bytes.len()).ok_or(BuildError::Overflow)?;
    buf.get_mut(offset..end)
        .ok_or(BuildError::Overflow)?
        .copy_from_slice(bytes);
    Ok(())
}

/// The string table: null-terminated entries addressed by 16-bit byte
/// offsets, with offset zero reserved for the empty string.
struct StringTable {
    blob: Vec<u8>,
    interned: HashMap<Vec<u8>, u16>,
}

impl StringTable {
    fn new() -> Self {
        Self {
            blob: vec![0],
            interned: HashMap::new(),
        }
    }

    fn intern(&mut self, text: &str) -> Result<u16, BuildError> {
        if text.is_empty() {
            return Ok(0);
        }
        let (encoded, _, unmappable) = encoding_rs::WINDOWS_1252.encode(text);
        if unmappable {
            return Err(BuildError::Unencodable(text.to_owned()));
        }
        let encoded = encoded.into_owned();
        if let Some(&off) = self.interned.get(&encoded) {
            return Ok(off);
        }
        let off = offset16(self.blob.len())?;
        self.blob.extend_from_slice(&encoded);
        self.blob.push(0);
        self.interned.insert(encoded, off);
        Ok(off)
    }

    fn intern_opt(&mut self, text: Option<&str>) -> Result<u16, BuildError> {
        match text {
            Some(text) => self.intern(text),
            None => Ok(0),
        }
    }
}

#[derive(Default)]
struct StationTable {
    records: Vec<StationRecord>,
    interned: HashMap<(u16, u32, i32, i32), u16>,
}

impl StationTable {
    fn index(
        &mut self,
        spec: &StationSpec,
        strings: &mut StringTable,
    ) -> Result<u16, BuildError> {
        let name_off = strings.intern(&spec.name)?;
        let key = (name_off, spec.id, spec.lon, spec.lat);
        if let Some(&index) = self.interned.get(&key) {
            return Ok(index);
        }
        let index = offset16(self.records.len())?;
        self.records.push(StationRecord {
            name_off: name_off.into(),
            id: spec.id.into(),
            lon: spec.lon.into(),
            lat: spec.lat.into(),
        });
        self.interned.insert(key, index);
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_interning_deduplicates() {
        let mut strings = StringTable::new();
        let a = strings.intern("Unkel").unwrap();
        let b = strings.intern("Unkel").unwrap();
        let c = strings.intern("Erpel(Rhein)").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(strings.intern("").unwrap(), 0);
    }

    #[test]
    fn test_unencodable_string_is_rejected() {
        let mut strings = StringTable::new();
        assert!(matches!(
            strings.intern("駅"),
            Err(BuildError::Unencodable(_))
        ));
    }

    #[test]
    fn test_station_deduplication() {
        let mut strings = StringTable::new();
        let mut stations = StationTable::default();
        let unkel = StationSpec::new("Unkel", 7_219_703, 50_596_290);
        let a = stations.index(&unkel, &mut strings).unwrap();
        let b = stations.index(&unkel.clone(), &mut strings).unwrap();
        let c = stations
            .index(&StationSpec::new("Erpel(Rhein)", 7_241_593, 50_582_067), &mut strings)
            .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(stations.records.len(), 2);
    }

    #[test]
    fn test_empty_build_has_a_valid_spine() {
        let buf = ResponseBuilder::new(0).build().unwrap();
        let view = crate::ResponseView::new(&buf).unwrap();
        assert_eq!(view.num_trips(), 0);
        assert_eq!(view.request_id().unwrap(), "07.02.1554942");
    }
}
