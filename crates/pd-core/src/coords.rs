//! Absolute ⇄ viewport-relative coordinate conversion.
//!
//! Relative coordinates are normalised against the viewport so the host sees
//! the same numbers regardless of the current zoom/pan or canvas size.

use crate::error::EditorError;
use kurbo::{Point, Size};
use std::fmt;
use std::str::FromStr;

/// Which space points are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSpace {
    /// Project coordinates as stored.
    Absolute,
    /// Normalised to [0,1] against the viewport.
    Relative,
}

impl FromStr for CoordinateSpace {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "absolute" => Ok(Self::Absolute),
            "relative" => Ok(Self::Relative),
            other => Err(EditorError::InvalidCoordinateSpace(other.to_string())),
        }
    }
}

impl fmt::Display for CoordinateSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute => f.write_str("absolute"),
            Self::Relative => f.write_str("relative"),
        }
    }
}

/// Normalise a project point.
///
/// `viewport` is the visible project-space size; multiplying it by `zoom`
/// recovers the device size, which makes the result independent of zoom.
pub fn to_relative(point: Point, viewport: Size, zoom: f64) -> Point {
    Point::new(
        point.x / (viewport.width * zoom),
        point.y / (viewport.height * zoom),
    )
}

/// Inverse of [`to_relative`] at zoom 1.
pub fn to_absolute(point: Point, viewport: Size) -> Point {
    Point::new(point.x * viewport.width, point.y * viewport.height)
}
