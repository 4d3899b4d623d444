use std::{cmp::Ordering, fmt, ops::Add};

use num_traits::{Float, Zero};
use serde::{Deserialize, Serialize};

use crate::errors::GeometryError;


/// Euclidean distance
pub fn euclidean<T>(x1: T, y1: T, x2: T, y2: T) -> T
where
    T: Float,
    {
    ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt()
}


/// 2D Point in projected map units
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        euclidean(self.x, self.y, other.x, other.y)
    }

    /// Both coordinates are finite numbers
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}


/// Non-negative, finite edge or path length
/// Totally ordered so it can key a binary heap
#[derive(Clone, Copy, Debug, Default)]
pub struct Distance(f64);

impl Distance {

    /// Rejects negative, NaN and infinite values
    pub fn new(value: f64) -> Result<Self, GeometryError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value + 0.0)) // -0.0 becomes 0.0
        } else {
            Err(GeometryError::InvalidDistance(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Distance {
    type Error = GeometryError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Distance::new(value)
    }
}

impl From<Distance> for f64 {
    fn from(distance: Distance) -> Self {
        distance.0
    }
}

impl Add for Distance {
    type Output = Distance;

    fn add(self, rhs: Distance) -> Distance {
        Distance(self.0 + rhs.0)
    }
}

impl Zero for Distance {
    fn zero() -> Self {
        Distance(0.0)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl Ord for Distance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}
impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Distance {}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(precision) => write!(f, "{:.*}", precision, self.0),
            None => write!(f, "{}", self.0),
        }
    }
}
