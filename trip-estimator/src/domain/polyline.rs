//! Encoded polyline codec.
//!
//! Routing providers return paths in the compact "encoded polyline" format:
//! each coordinate is stored as a pair of signed deltas from the previous
//! point, in 1e-5 degree fixed point. Every delta is zig-zag encoded, split
//! into 5-bit groups (least significant first) and written one group per
//! character as `group + 63`, with `0x20` set on every group but the last.
//!
//! Decoding must be bit-exact: a single misread group shifts every
//! following coordinate.

use super::Coordinates;

/// Fixed-point scale of the format (five decimal places).
const PRECISION: f64 = 1e5;

/// Offset added to every 5-bit group to make it printable.
const CHAR_OFFSET: u8 = 63;

/// Continuation flag on a 5-bit group.
const CONTINUATION: i64 = 0x20;

/// Error returned when decoding a malformed polyline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedPolyline {
    /// The string ended inside a delta (last group still had the continuation bit)
    #[error("polyline truncated at byte {offset}")]
    Truncated { offset: usize },

    /// A byte outside the printable range used by the format
    #[error("invalid polyline character {byte:#04x} at byte {offset}")]
    InvalidCharacter { byte: u8, offset: usize },

    /// A delta too long to fit in 64 bits
    #[error("polyline delta overflows at byte {offset}")]
    Overflow { offset: usize },

    /// Decoded point lies outside valid latitude/longitude ranges
    #[error("decoded coordinate out of range at byte {offset}")]
    OutOfRange { offset: usize },
}

/// Decode an encoded polyline into its coordinates, in path order.
///
/// An empty string decodes to an empty path.
///
/// # Examples
///
/// ```
/// use trip_estimator::domain::polyline;
///
/// let path = polyline::decode("_p~iF~ps|U_ulLnnqC").unwrap();
/// assert_eq!(path.len(), 2);
/// assert_eq!(path[0].latitude(), 38.5);
/// assert_eq!(path[0].longitude(), -120.2);
/// assert_eq!(path[1].latitude(), 40.7);
/// ```
pub fn decode(encoded: &str) -> Result<Vec<Coordinates>, MalformedPolyline> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut path = Vec::new();

    while index < bytes.len() {
        lat = lat.wrapping_add(next_delta(bytes, &mut index)?);
        lng = lng.wrapping_add(next_delta(bytes, &mut index)?);

        let point = Coordinates::new(lat as f64 / PRECISION, lng as f64 / PRECISION)
            .map_err(|_| MalformedPolyline::OutOfRange { offset: index })?;
        path.push(point);
    }

    Ok(path)
}

/// Read one zig-zag encoded delta starting at `*index`, advancing past it.
fn next_delta(bytes: &[u8], index: &mut usize) -> Result<i64, MalformedPolyline> {
    let mut result: i64 = 0;
    let mut shift = 0u32;

    loop {
        let offset = *index;
        let byte = *bytes
            .get(offset)
            .ok_or(MalformedPolyline::Truncated { offset })?;
        if !(CHAR_OFFSET..=126).contains(&byte) {
            return Err(MalformedPolyline::InvalidCharacter { byte, offset });
        }
        if shift > 60 {
            return Err(MalformedPolyline::Overflow { offset });
        }
        *index += 1;

        let group = i64::from(byte - CHAR_OFFSET);
        result |= (group & 0x1f) << shift;
        shift += 5;

        if group & CONTINUATION == 0 {
            break;
        }
    }

    Ok(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

/// Encode a path as a polyline.
///
/// Coordinates are rounded to five decimal places, so
/// `decode(&encode(path))` reproduces `path` to within 1e-5 degrees.
pub fn encode(path: &[Coordinates]) -> String {
    let mut out = String::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for point in path {
        let lat = (point.latitude() * PRECISION).round() as i64;
        let lng = (point.longitude() * PRECISION).round() as i64;
        encode_delta(lat - prev_lat, &mut out);
        encode_delta(lng - prev_lng, &mut out);
        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

fn encode_delta(delta: i64, out: &mut String) {
    let mut value = if delta < 0 { !(delta << 1) } else { delta << 1 };
    while value >= CONTINUATION {
        out.push(char::from(((CONTINUATION | (value & 0x1f)) as u8) + CHAR_OFFSET));
        value >>= 5;
    }
    out.push(char::from(value as u8 + CHAR_OFFSET));
}
