//! Structured records and field tables for the RMC and GGA sentences.
//!
//! ```text
//! $GPRMC,time,status,lat,N/S,lon,E/W,knots,course,date,...*HH
//!          1     2    3   4   5   6    7     8     9
//! $GPGGA,time,lat,N/S,lon,E/W,quality,sats,hdop,alt,M,...*HH
//!                                       7    8    9
//! ```

use heapless::String;

use super::schema::{FieldSpec, Fields, SentenceSchema};
use crate::units::{Axis, knots_to_kmh, parse_coordinate};

/// Capacity of the UTC time field (`hhmmss.sss`).
pub const TIME_LEN: usize = 16;
/// Capacity of the date field (`ddmmyy`).
pub const DATE_LEN: usize = 8;

/// Position/velocity fix from the latest RMC sentence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixRecord {
    /// Decimal degrees, negative south.
    pub latitude: f64,
    /// Decimal degrees, negative west.
    pub longitude: f64,
    pub speed_kmh: f32,
    pub course_deg: f32,
    /// UTC time as transmitted (`hhmmss.sss`).
    pub time: String<TIME_LEN>,
    /// UTC date as transmitted (`ddmmyy`).
    pub date: String<DATE_LEN>,
    /// `true` only when the status field is `A`.
    pub valid: bool,
}

/// Fix quality from the latest GGA sentence.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QualityRecord {
    /// Metres above mean sea level.
    pub altitude_m: f32,
    pub satellites: u8,
    pub hdop: f32,
}

// ── Converters ────────────────────────────────────────────────

fn bounded_text<const N: usize>(value: &str) -> Option<String<N>> {
    // Over-length text is rejected whole, never cut.
    let mut s = String::new();
    s.push_str(value).ok()?;
    Some(s)
}

fn finite_f32(value: &str) -> Option<f32> {
    value.parse::<f32>().ok().filter(|v| v.is_finite())
}

fn rmc_time(r: &mut FixRecord, v: &str, _: &Fields<'_>) -> Option<()> {
    r.time = bounded_text(v)?;
    Some(())
}

fn rmc_status(r: &mut FixRecord, v: &str, _: &Fields<'_>) -> Option<()> {
    r.valid = v == "A";
    Some(())
}

fn rmc_status_absent(r: &mut FixRecord) {
    r.valid = false;
}

fn rmc_latitude(r: &mut FixRecord, v: &str, f: &Fields<'_>) -> Option<()> {
    r.latitude = parse_coordinate(v, f.get(4)?, Axis::Latitude)?;
    Some(())
}

fn rmc_longitude(r: &mut FixRecord, v: &str, f: &Fields<'_>) -> Option<()> {
    r.longitude = parse_coordinate(v, f.get(6)?, Axis::Longitude)?;
    Some(())
}

fn rmc_speed(r: &mut FixRecord, v: &str, _: &Fields<'_>) -> Option<()> {
    let knots = finite_f32(v).filter(|k| *k >= 0.0)?;
    r.speed_kmh = knots_to_kmh(knots);
    Some(())
}

fn rmc_course(r: &mut FixRecord, v: &str, _: &Fields<'_>) -> Option<()> {
    r.course_deg = finite_f32(v)?;
    Some(())
}

fn rmc_date(r: &mut FixRecord, v: &str, _: &Fields<'_>) -> Option<()> {
    r.date = bounded_text(v)?;
    Some(())
}

fn gga_satellites(r: &mut QualityRecord, v: &str, _: &Fields<'_>) -> Option<()> {
    r.satellites = v.parse().ok()?;
    Some(())
}

fn gga_hdop(r: &mut QualityRecord, v: &str, _: &Fields<'_>) -> Option<()> {
    r.hdop = finite_f32(v).filter(|h| *h >= 0.0)?;
    Some(())
}

fn gga_altitude(r: &mut QualityRecord, v: &str, _: &Fields<'_>) -> Option<()> {
    r.altitude_m = finite_f32(v)?;
    Some(())
}

// ── Schemas ───────────────────────────────────────────────────

/// Recommended minimum position/velocity sentence.
pub static RMC: SentenceSchema<FixRecord> = SentenceSchema {
    sentence_type: "RMC",
    fields: &[
        FieldSpec { name: "time", index: 1, convert: rmc_time, on_absent: None },
        FieldSpec { name: "status", index: 2, convert: rmc_status, on_absent: Some(rmc_status_absent) },
        FieldSpec { name: "latitude", index: 3, convert: rmc_latitude, on_absent: None },
        FieldSpec { name: "longitude", index: 5, convert: rmc_longitude, on_absent: None },
        FieldSpec { name: "speed", index: 7, convert: rmc_speed, on_absent: None },
        FieldSpec { name: "course", index: 8, convert: rmc_course, on_absent: None },
        FieldSpec { name: "date", index: 9, convert: rmc_date, on_absent: None },
    ],
};

/// Fix information sentence (only the quality fields are consumed).
pub static GGA: SentenceSchema<QualityRecord> = SentenceSchema {
    sentence_type: "GGA",
    fields: &[
        FieldSpec { name: "satellites", index: 7, convert: gga_satellites, on_absent: None },
        FieldSpec { name: "hdop", index: 8, convert: gga_hdop, on_absent: None },
        FieldSpec { name: "altitude", index: 9, convert: gga_altitude, on_absent: None },
    ],
};

/// Decode an RMC sentence into `fix`. `false` if the tag is not RMC.
pub fn parse_rmc(sentence: &str, fix: &mut FixRecord) -> bool {
    RMC.apply(sentence, fix)
}

/// Decode a GGA sentence into `quality`. `false` if the tag is not GGA.
pub fn parse_gga(sentence: &str, quality: &mut QualityRecord) -> bool {
    GGA.apply(sentence, quality)
}
