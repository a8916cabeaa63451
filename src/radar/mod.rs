//! Geometry for the three-axis impact radar: Environmental on top, Social to
//! the lower right, Governance/Economic to the lower left, in a 100x100 box.

use crate::domain::{CsrAssessment, Rating};

const COS_30: f64 = 0.866;
const SIN_30: f64 = 0.5;
pub const GRID_RINGS: [f64; 4] = [25.0, 50.0, 75.0, 100.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Distance from the centre for a rating, 25 for `Low` up to 100 for `Very High`.
pub fn radius(rating: Rating) -> f64 {
    f64::from(rating.value()) / f64::from(Rating::MAX_VALUE) * 100.0
}

fn triangle(e: f64, s: f64, g: f64) -> [Point; 3] {
    [
        Point { x: 50.0, y: 100.0 - e },
        Point { x: 50.0 + s * COS_30, y: 100.0 - s * SIN_30 },
        Point { x: 50.0 - g * COS_30, y: 100.0 - g * SIN_30 },
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct Radar {
    pub environmental: f64,
    pub social: f64,
    pub governance_economic: f64,
}

impl Radar {
    pub fn from_assessment(a: &CsrAssessment) -> Self {
        Self {
            environmental: radius(a.environmental.rating),
            social: radius(a.social.rating),
            governance_economic: radius(a.governance_economic.rating),
        }
    }

    /// Data polygon vertices in E, S, G order.
    pub fn polygon(&self) -> [Point; 3] {
        triangle(self.environmental, self.social, self.governance_economic)
    }

    /// SVG `points` attribute for the data polygon.
    pub fn svg_points(&self) -> String {
        to_svg_points(&self.polygon())
    }

    pub fn grid() -> Vec<[Point; 3]> {
        GRID_RINGS.iter().map(|&r| triangle(r, r, r)).collect()
    }
}

pub fn to_svg_points(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{:.1},{:.1}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}
