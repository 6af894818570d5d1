//! Flexible polyline codec
//!
//! HERE routing returns section geometry as a flexible polyline: a header
//! (format version, coordinate precision, optional third dimension) followed
//! by zig-zag signed, variable-length integer deltas. Every character carries
//! five data bits plus a continuation bit.
//!
//! [`Decoder`] walks the string lazily; [`decode`] collects it. [`encode`]
//! produces the reference encoding and is what the round-trip tests lean on.

use serde::ser::{Serialize, SerializeSeq, Serializer};
use thiserror::Error;

/// Character table; position in the table is the 6-bit value of the character
const ENCODING_TABLE: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Only version of the header format in existence
const FORMAT_VERSION: u64 = 1;

const CONTINUATION_BIT: u64 = 0x20;
const DATA_MASK: u64 = 0x1f;
const MAX_PRECISION: u32 = 15;

/// Shift of the last character that still fits a 64-bit value
const MAX_SHIFT: u32 = 60;

/// Errors raised while decoding an encoded polyline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty polyline")]
    Empty,

    #[error("invalid character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },

    #[error("input ends in the middle of a value")]
    TruncatedValue,

    #[error("input ends in the middle of a coordinate")]
    IncompleteCoordinate,

    #[error("missing header after format version")]
    MissingHeader,

    #[error("unsupported format version {0}")]
    UnsupportedVersion(u64),

    #[error("reserved third dimension type {0}")]
    ReservedThirdDimension(u64),

    #[error("value too large at position {0}")]
    Overflow(usize),
}

/// Errors raised while encoding coordinates
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("precision {0} out of range 0-15")]
    InvalidPrecision(u32),

    #[error("coordinate {0} has no third dimension value")]
    MissingThirdDimension(usize),

    #[error("third dimension values given but none declared")]
    UndeclaredThirdDimension,

    #[error("reserved third dimension cannot be encoded")]
    ReservedThirdDimension,
}

/// Meaning of the optional third value of each coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThirdDimension {
    Absent,
    Level,
    Altitude,
    Elevation,
    Reserved1,
    Reserved2,
    Custom1,
    Custom2,
}

impl ThirdDimension {
    fn from_bits(bits: u64) -> Result<Self, DecodeError> {
        match bits {
            0 => Ok(Self::Absent),
            1 => Ok(Self::Level),
            2 => Ok(Self::Altitude),
            3 => Ok(Self::Elevation),
            6 => Ok(Self::Custom1),
            7 => Ok(Self::Custom2),
            other => Err(DecodeError::ReservedThirdDimension(other)),
        }
    }

    fn bits(self) -> u64 {
        match self {
            Self::Absent => 0,
            Self::Level => 1,
            Self::Altitude => 2,
            Self::Elevation => 3,
            Self::Reserved1 => 4,
            Self::Reserved2 => 5,
            Self::Custom1 => 6,
            Self::Custom2 => 7,
        }
    }

    /// Whether each coordinate carries a third value
    pub fn is_present(self) -> bool {
        self != Self::Absent
    }
}

/// Decoded header of a flexible polyline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Decimal digits of latitude/longitude
    pub precision: u32,
    pub third_dimension: ThirdDimension,
    /// Decimal digits of the third dimension
    pub third_dimension_precision: u32,
}

impl Header {
    fn from_bits(bits: u64) -> Result<Self, DecodeError> {
        Ok(Self {
            precision: (bits & 15) as u32,
            third_dimension: ThirdDimension::from_bits((bits >> 4) & 7)?,
            third_dimension_precision: ((bits >> 7) & 15) as u32,
        })
    }
}

/// A latitude/longitude pair with an optional third value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
    pub z: Option<f64>,
}

impl Coordinate {
    /// Create a two-dimensional coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng, z: None }
    }

    /// Attach a third-dimension value
    pub fn with_z(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }

    /// Round every axis to the given number of decimal digits
    pub fn rounded(self, decimals: u32) -> Self {
        let factor = 10f64.powi(decimals as i32);
        let round = |v: f64| (v * factor).round() / factor;
        Self {
            lat: round(self.lat),
            lng: round(self.lng),
            z: self.z.map(round),
        }
    }
}

// Serialized as `[lat, lng]` or `[lat, lng, z]`
impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.z.is_some() { 3 } else { 2 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.lat)?;
        seq.serialize_element(&self.lng)?;
        if let Some(z) = self.z {
            seq.serialize_element(&z)?;
        }
        seq.end()
    }
}

/// Lazy, single-pass decoder over an encoded polyline
///
/// Yields one `Result<Coordinate, DecodeError>` per coordinate. After the
/// first error the iterator is exhausted.
#[derive(Debug)]
pub struct Decoder<'a> {
    chars: std::str::CharIndices<'a>,
    header: Header,
    lat: i64,
    lng: i64,
    z: i64,
    lat_lng_scale: f64,
    z_scale: f64,
    done: bool,
}

impl<'a> Decoder<'a> {
    /// Read the header and position the decoder on the first coordinate
    pub fn new(encoded: &'a str) -> Result<Self, DecodeError> {
        let mut chars = encoded.char_indices();

        let version = next_unsigned(&mut chars)?.ok_or(DecodeError::Empty)?;
        if version != FORMAT_VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }

        let header_bits = next_unsigned(&mut chars)?.ok_or(DecodeError::MissingHeader)?;
        let header = Header::from_bits(header_bits)?;

        Ok(Self {
            chars,
            header,
            lat: 0,
            lng: 0,
            z: 0,
            lat_lng_scale: 10f64.powi(header.precision as i32),
            z_scale: 10f64.powi(header.third_dimension_precision as i32),
            done: false,
        })
    }

    /// Header read from the start of the input
    pub fn header(&self) -> Header {
        self.header
    }

    fn next_coordinate(&mut self) -> Result<Option<Coordinate>, DecodeError> {
        let Some(delta_lat) = next_signed(&mut self.chars)? else {
            return Ok(None);
        };
        let delta_lng = next_signed(&mut self.chars)?.ok_or(DecodeError::IncompleteCoordinate)?;

        self.lat = self.accumulate(self.lat, delta_lat)?;
        self.lng = self.accumulate(self.lng, delta_lng)?;
        let mut coordinate = Coordinate::new(
            self.lat as f64 / self.lat_lng_scale,
            self.lng as f64 / self.lat_lng_scale,
        );

        if self.header.third_dimension.is_present() {
            let delta_z = next_signed(&mut self.chars)?.ok_or(DecodeError::IncompleteCoordinate)?;
            self.z = self.accumulate(self.z, delta_z)?;
            coordinate = coordinate.with_z(self.z as f64 / self.z_scale);
        }

        Ok(Some(coordinate))
    }

    /// Add a delta to a running total; the error points at the last character read
    fn accumulate(&self, total: i64, delta: i64) -> Result<i64, DecodeError> {
        total
            .checked_add(delta)
            .ok_or_else(|| DecodeError::Overflow(self.chars.offset().saturating_sub(1)))
    }
}

impl Iterator for Decoder<'_> {
    type Item = Result<Coordinate, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_coordinate() {
            Ok(Some(coordinate)) => Some(Ok(coordinate)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Decode a whole polyline, failing on the first malformed value
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, DecodeError> {
    Decoder::new(encoded)?.collect()
}

/// Encode coordinates with the given header
pub fn encode(
    coordinates: &[Coordinate],
    precision: u32,
    third_dimension: ThirdDimension,
    third_dimension_precision: u32,
) -> Result<String, EncodeError> {
    if precision > MAX_PRECISION {
        return Err(EncodeError::InvalidPrecision(precision));
    }
    if third_dimension_precision > MAX_PRECISION {
        return Err(EncodeError::InvalidPrecision(third_dimension_precision));
    }
    if matches!(third_dimension, ThirdDimension::Reserved1 | ThirdDimension::Reserved2) {
        return Err(EncodeError::ReservedThirdDimension);
    }

    let mut out = String::new();
    encode_unsigned(FORMAT_VERSION, &mut out);
    let header = u64::from(precision)
        | (third_dimension.bits() << 4)
        | (u64::from(third_dimension_precision) << 7);
    encode_unsigned(header, &mut out);

    let scale = 10f64.powi(precision as i32);
    let z_scale = 10f64.powi(third_dimension_precision as i32);
    let (mut last_lat, mut last_lng, mut last_z) = (0i64, 0i64, 0i64);

    for (index, coordinate) in coordinates.iter().enumerate() {
        let lat = (coordinate.lat * scale).round() as i64;
        let lng = (coordinate.lng * scale).round() as i64;
        encode_signed(lat - last_lat, &mut out);
        encode_signed(lng - last_lng, &mut out);
        last_lat = lat;
        last_lng = lng;

        match (third_dimension.is_present(), coordinate.z) {
            (true, Some(z)) => {
                let z = (z * z_scale).round() as i64;
                encode_signed(z - last_z, &mut out);
                last_z = z;
            }
            (true, None) => return Err(EncodeError::MissingThirdDimension(index)),
            (false, Some(_)) => return Err(EncodeError::UndeclaredThirdDimension),
            (false, None) => {}
        }
    }

    Ok(out)
}

fn decode_char(character: char, position: usize) -> Result<u64, DecodeError> {
    u8::try_from(character)
        .ok()
        .and_then(|byte| ENCODING_TABLE.iter().position(|&b| b == byte))
        .map(|value| value as u64)
        .ok_or(DecodeError::InvalidCharacter { character, position })
}

/// Next unsigned varint, or `None` at a clean end of input
fn next_unsigned(chars: &mut std::str::CharIndices<'_>) -> Result<Option<u64>, DecodeError> {
    let mut result = 0u64;
    let mut shift = 0u32;
    let mut started = false;

    loop {
        let Some((position, character)) = chars.next() else {
            return if started {
                Err(DecodeError::TruncatedValue)
            } else {
                Ok(None)
            };
        };
        started = true;

        let value = decode_char(character, position)?;
        // Only four data bits are left at the final shift
        if shift > MAX_SHIFT || (shift == MAX_SHIFT && value & DATA_MASK > 0xf) {
            return Err(DecodeError::Overflow(position));
        }
        result |= (value & DATA_MASK) << shift;
        if value & CONTINUATION_BIT == 0 {
            return Ok(Some(result));
        }
        shift += 5;
    }
}

fn next_signed(chars: &mut std::str::CharIndices<'_>) -> Result<Option<i64>, DecodeError> {
    Ok(next_unsigned(chars)?.map(|value| {
        if value & 1 == 1 {
            !(value >> 1) as i64
        } else {
            (value >> 1) as i64
        }
    }))
}

fn encode_unsigned(mut value: u64, out: &mut String) {
    while value > DATA_MASK {
        out.push(ENCODING_TABLE[((value & DATA_MASK) | CONTINUATION_BIT) as usize] as char);
        value >>= 5;
    }
    out.push(ENCODING_TABLE[value as usize] as char);
}

fn encode_signed(value: i64, out: &mut String) {
    let mut zigzag = (value << 1) as u64;
    if value < 0 {
        zigzag = !zigzag;
    }
    encode_unsigned(zigzag, out);
}
