//! Geometric primitives and the filename-friendly edge token codec.
//!
//! An [`Edge`] is an ordered pair of points. It round-trips through an
//! ASCII, case-insensitive token safe for use in file names: a 20-byte
//! little-endian packing of `(precision: i16, from.lat, from.lng,
//! to.lat, to.lng: f32)`, base32-encoded with the padding stripped.

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::Error;

/// RFC 4648 alphabet without padding; stripping and re-padding `=` is
/// then the codec's concern rather than the caller's.
const ALPHABET: base32::Alphabet = base32::Alphabet::Rfc4648 { padding: false };

/// Size of the packed token body: one `i16` plus four `f32`s.
const TOKEN_BYTES: usize = 20;

/// A directed pair of points. Coordinates follow the `geo` convention:
/// `x` is longitude, `y` is latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: Point<f64>,
    pub to: Point<f64>,
}

impl Edge {
    #[must_use]
    pub fn new(from: Point<f64>, to: Point<f64>) -> Self {
        Edge { from, to }
    }

    /// Encodes this edge as a lowercase, case-insensitive token.
    ///
    /// If `precision` is not negative, coordinates are rounded to that
    /// many decimal places before packing; otherwise they are narrowed
    /// to `f32` unrounded.
    #[must_use]
    pub fn to_token(&self, precision: i16) -> String {
        let coords = [self.from.y(), self.from.x(), self.to.y(), self.to.x()];
        let mut body = [0u8; TOKEN_BYTES];
        body[..2].copy_from_slice(&precision.to_le_bytes());
        for (slot, value) in body[2..].chunks_exact_mut(4).zip(coords) {
            let value = if precision >= 0 {
                round_to(value, precision) as f32
            } else {
                value as f32
            };
            slot.copy_from_slice(&value.to_le_bytes());
        }
        base32::encode(ALPHABET, &body).to_ascii_lowercase()
    }

    /// Decodes a token produced by [`Edge::to_token`], in either case.
    ///
    /// # Errors
    /// [`Error::MalformedEdgeToken`] when the token is not base32 or
    /// does not decode to exactly 20 bytes.
    pub fn from_token(token: &str) -> Result<Self, Error> {
        let body = base32::decode(ALPHABET, &token.to_ascii_uppercase())
            .ok_or_else(|| Error::MalformedEdgeToken(token.to_string()))?;
        if body.len() != TOKEN_BYTES {
            return Err(Error::MalformedEdgeToken(token.to_string()));
        }
        let precision = i16::from_le_bytes([body[0], body[1]]);
        let mut coords = [0f64; 4];
        for (value, chunk) in coords.iter_mut().zip(body[2..].chunks_exact(4)) {
            let raw = f64::from(f32::from_le_bytes(chunk.try_into().unwrap()));
            *value = if precision >= 0 {
                round_to(raw, precision)
            } else {
                raw
            };
        }
        Ok(Edge::new(
            Point::new(coords[1], coords[0]),
            Point::new(coords[3], coords[2]),
        ))
    }
}

/// Rounds `value` to `digits` decimal places.
#[must_use]
pub fn round_to(value: f64, digits: i16) -> f64 {
    let factor = 10f64.powi(i32::from(digits));
    (value * factor).round() / factor
}
