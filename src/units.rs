//! Unit and coordinate conversion for receiver output.

/// Kilometres per hour in one knot.
pub const KNOTS_TO_KMH: f32 = 1.852;

/// Convert speed over ground from knots to km/h.
pub fn knots_to_kmh(knots: f32) -> f32 {
    knots * KNOTS_TO_KMH
}

/// Convert an NMEA `ddmm.mmmm` / `dddmm.mmmm` angle to decimal degrees.
///
/// Negated for the southern (`S`) and western (`W`) hemispheres.
pub fn nmea_to_decimal(value: f64, hemisphere: char) -> f64 {
    let degrees = (value / 100.0).floor();
    let minutes = value - degrees * 100.0;
    let decimal = degrees + minutes / 60.0;
    if matches!(hemisphere, 'S' | 'W') {
        -decimal
    } else {
        decimal
    }
}

/// Axis a coordinate belongs to; decides which hemisphere letters are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

/// Parse a raw coordinate field plus its hemisphere field.
///
/// Returns `None` for an unparsable value, a value outside the axis range,
/// or a hemisphere letter that does not belong to the axis.
pub fn parse_coordinate(value: &str, hemisphere: &str, axis: Axis) -> Option<f64> {
    let hemi = match (axis, hemisphere) {
        (Axis::Latitude, "N" | "S") | (Axis::Longitude, "E" | "W") => hemisphere.chars().next()?,
        _ => return None,
    };
    let raw: f64 = value.parse().ok()?;
    if !raw.is_finite() || raw < 0.0 {
        return None;
    }
    let decimal = nmea_to_decimal(raw, hemi);
    let limit = match axis {
        Axis::Latitude => 90.0,
        Axis::Longitude => 180.0,
    };
    (decimal.abs() <= limit).then_some(decimal)
}
