//! Human readable direction of a displacement vector.
//!
//! Image coordinates are assumed: `y` grows downward, so a negative `dy`
//! means the object moved up the screen.

use nalgebra as na;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Displacements shorter than this are reported as [`Heading::Static`].
pub const MIN_MOVEMENT: f64 = 0.1;

/// Per-axis threshold of the two-axis labeler.
pub const AXIS_MOVEMENT: f64 = 0.5;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heading {
    #[serde(rename = "la derecha")]
    Right,
    #[serde(rename = "abajo a la derecha")]
    DownRight,
    #[serde(rename = "abajo")]
    Down,
    #[serde(rename = "abajo a la izquierda")]
    DownLeft,
    #[serde(rename = "la izquierda")]
    Left,
    #[serde(rename = "arriba a la izquierda")]
    UpLeft,
    #[serde(rename = "arriba")]
    Up,
    #[serde(rename = "arriba a la derecha")]
    UpRight,
    #[serde(rename = "sin movimiento significativo")]
    Static,
}

// clockwise from +x in image coordinates
const SECTORS: [Heading; 8] = [
    Heading::Right,
    Heading::DownRight,
    Heading::Down,
    Heading::DownLeft,
    Heading::Left,
    Heading::UpLeft,
    Heading::Up,
    Heading::UpRight,
];

impl Heading {
    /// Snaps the vector to the nearest of 8 sectors spaced 45 degrees apart.
    pub fn compass(v: &na::Vector2<f64>) -> Self {
        let norm = v.norm();
        if !(norm >= MIN_MOVEMENT) {
            return Heading::Static;
        }

        let v = v / norm;
        let deg = v.y.atan2(v.x).to_degrees().rem_euclid(360.0);
        let sector = (deg / 45.0).round() as usize % SECTORS.len();

        SECTORS[sector]
    }

    /// Classifies each axis on its own and combines the results.
    pub fn two_axis(v: &na::Vector2<f64>) -> Self {
        let horizontal = if v.x.abs() > AXIS_MOVEMENT { v.x.signum() as i8 } else { 0 };
        let vertical = if v.y.abs() > AXIS_MOVEMENT { v.y.signum() as i8 } else { 0 };

        Self::from_components(horizontal, vertical)
    }

    fn from_components(horizontal: i8, vertical: i8) -> Self {
        match (horizontal, vertical) {
            (1, 0) => Heading::Right,
            (1, 1) => Heading::DownRight,
            (0, 1) => Heading::Down,
            (-1, 1) => Heading::DownLeft,
            (-1, 0) => Heading::Left,
            (-1, -1) => Heading::UpLeft,
            (0, -1) => Heading::Up,
            (1, -1) => Heading::UpRight,
            _ => Heading::Static,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Heading::Right => "la derecha",
            Heading::DownRight => "abajo a la derecha",
            Heading::Down => "abajo",
            Heading::DownLeft => "abajo a la izquierda",
            Heading::Left => "la izquierda",
            Heading::UpLeft => "arriba a la izquierda",
            Heading::Up => "arriba",
            Heading::UpRight => "arriba a la derecha",
            Heading::Static => "sin movimiento significativo",
        }
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which labeler a deployment uses, never mixed within one analysis.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Labeling {
    #[default]
    Compass,
    TwoAxis,
}

impl Labeling {
    #[inline]
    pub fn heading(&self, v: &na::Vector2<f64>) -> Heading {
        match self {
            Labeling::Compass => Heading::compass(v),
            Labeling::TwoAxis => Heading::two_axis(v),
        }
    }
}
