//! Points and axis-aligned boxes used to bound the sampling region.

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, VolError};
use crate::rng::RngHandle;

/// Point in three dimensional space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Position {
    /// Coordinate along the x axis.
    pub x: f64,
    /// Coordinate along the y axis.
    pub y: f64,
    /// Coordinate along the z axis.
    pub z: f64,
}

impl Position {
    /// Creates a position from its three coordinates.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns the coordinates as an array.
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Squared euclidean distance to another point.
    pub fn distance_squared(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }
}

impl From<[f64; 3]> for Position {
    fn from(value: [f64; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl From<Position> for [f64; 3] {
    fn from(value: Position) -> Self {
        value.to_array()
    }
}

/// Axis-aligned box described by its lower-left and upper-right corners.
///
/// Construction through [`BoundingBox::new`] guarantees finite coordinates,
/// extents and volume, and `lower_left <= upper_right` componentwise. Flat boxes (zero extent along an
/// axis) are accepted and have zero volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    lower_left: Position,
    upper_right: Position,
}

impl BoundingBox {
    /// Validates the corners and builds the box.
    pub fn new(lower_left: Position, upper_right: Position) -> Result<Self, VolError> {
        let low = lower_left.to_array();
        let high = upper_right.to_array();
        for (axis, (lo, hi)) in low.iter().zip(high.iter()).enumerate() {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(VolError::Config(
                    ErrorInfo::new("bbox-non-finite", "bounding box corners must be finite")
                        .with_context("axis", axis)
                        .with_context("lower", lo)
                        .with_context("upper", hi),
                ));
            }
            if lo > hi {
                return Err(VolError::Config(
                    ErrorInfo::new(
                        "bbox-inverted",
                        "lower_left must not exceed upper_right along any axis",
                    )
                    .with_context("axis", axis)
                    .with_context("lower", lo)
                    .with_context("upper", hi)
                    .with_hint("swap the corners or fix the offending coordinate"),
                ));
            }
            let extent = hi - lo;
            if !extent.is_finite() {
                return Err(VolError::Config(
                    ErrorInfo::new("bbox-non-finite", "bounding box extent overflows")
                        .with_context("axis", axis)
                        .with_context("lower", lo)
                        .with_context("upper", hi),
                ));
            }
        }
        let bbox = Self {
            lower_left,
            upper_right,
        };
        let volume = bbox.volume();
        if !volume.is_finite() {
            return Err(VolError::Config(
                ErrorInfo::new("bbox-non-finite", "bounding box volume overflows")
                    .with_context("volume", volume),
            ));
        }
        Ok(bbox)
    }

    /// Lower-left corner.
    pub fn lower_left(&self) -> Position {
        self.lower_left
    }

    /// Upper-right corner.
    pub fn upper_right(&self) -> Position {
        self.upper_right
    }

    /// Volume enclosed by the box.
    pub fn volume(&self) -> f64 {
        (self.upper_right.x - self.lower_left.x)
            * (self.upper_right.y - self.lower_left.y)
            * (self.upper_right.z - self.lower_left.z)
    }

    /// Returns true when `point` lies inside the closed box.
    pub fn contains(&self, point: &Position) -> bool {
        (self.lower_left.x..=self.upper_right.x).contains(&point.x)
            && (self.lower_left.y..=self.upper_right.y).contains(&point.y)
            && (self.lower_left.z..=self.upper_right.z).contains(&point.z)
    }

    /// Draws a point uniformly inside the box, one independent draw per axis.
    pub fn sample(&self, rng: &mut RngHandle) -> Position {
        Position::new(
            rng.uniform(self.lower_left.x, self.upper_right.x),
            rng.uniform(self.lower_left.y, self.upper_right.y),
            rng.uniform(self.lower_left.z, self.upper_right.z),
        )
    }
}
