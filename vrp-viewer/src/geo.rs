use std::fmt::{Display, Formatter};

use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize};

const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Geographic point in degrees.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_m(&self, other: &Coordinate) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let d_lat = lat2 - lat1;
        let d_lng = (other.lng - self.lng).to_radians();

        let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * h.sqrt().asin()
    }
}

/// Formats the coordinate as `lat, lng` with 4 decimal places.
impl Display for Coordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// Ordered path returned by the solver.
///
/// On the wire a route is an array of `[lat, lng]` pairs. Extra values after `lng`, such as
/// altitude, are ignored.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Route {
    points: Vec<Coordinate>,
}

impl Route {
    /// Creates a route through the given points.
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Points of the route in drawing order.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }
}

impl<'de> Deserialize<'de> for Route {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pairs = Vec::<Vec<f64>>::deserialize(deserializer)?;
        let points = pairs
            .into_iter()
            .map(|pair| match pair[..] {
                [lat, lng, ..] => Ok(Coordinate::new(lat, lng)),
                _ => Err(D::Error::invalid_length(
                    pair.len(),
                    &"at least a [lat, lng] coordinate pair",
                )),
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { points })
    }
}
