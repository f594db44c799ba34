use nalgebra as na;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Canonical object id assigned by the upstream tracker.
///
/// The backend sends ids as numbers or strings interchangeably, both forms
/// end up here as the same string so `7` and `"7"` address one trajectory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TrackId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for TrackId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for TrackId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl std::borrow::Borrow<str> for TrackId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Position of an object in image coordinates (y grows downward)
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<u32>,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, frame: None }
    }

    #[inline]
    pub fn at(x: f64, y: f64, frame: u32) -> Self {
        Self {
            x,
            y,
            frame: Some(frame),
        }
    }

    /// Frame number, or the given sequence index for untagged points.
    #[inline(always)]
    pub fn frame_or(&self, idx: usize) -> u32 {
        self.frame
            .unwrap_or_else(|| u32::try_from(idx).unwrap_or(u32::MAX))
    }

    #[inline(always)]
    pub fn coords(&self) -> na::Vector2<f64> {
        na::Vector2::new(self.x, self.y)
    }

    /// Displacement from `self` to `other`.
    #[inline(always)]
    pub fn delta(&self, other: &Point) -> na::Vector2<f64> {
        other.coords() - self.coords()
    }

    #[inline]
    pub fn distance(&self, other: &Point) -> f64 {
        self.delta(other).norm()
    }
}
