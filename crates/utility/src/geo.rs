pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// Coordinate deltas are compared after rounding to this many decimal places.
/// Without it `40.01 - 40.0` comes out just below `0.01`.
pub const DELTA_DECIMALS: i32 = 9;
const DELTA_SCALE: f64 = 1e9;

/// Absolute difference of two coordinates, rounded to `DELTA_DECIMALS`.
pub fn degree_delta(a: f64, b: f64) -> f64 {
    ((a - b).abs() * DELTA_SCALE).round() / DELTA_SCALE
}

fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

pub fn is_valid_latitude(latitude: f64) -> bool {
    latitude.is_finite() && (MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude)
}

pub fn is_valid_longitude(longitude: f64) -> bool {
    longitude.is_finite() && (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude)
}

/// An axis aligned box of `half_width` degrees in every direction around a
/// center. Membership is tested on the raw latitude and longitude deltas, so
/// the covered ground distance along the longitude axis shrinks towards the
/// poles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub half_width: f64,
}

impl BoundingBox {
    pub fn around(center_latitude: f64, center_longitude: f64, half_width: f64) -> Self {
        Self {
            center_latitude,
            center_longitude,
            half_width,
        }
    }

    /// Strict containment: a point exactly `half_width` away is outside.
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        degree_delta(latitude, self.center_latitude) < self.half_width
            && degree_delta(longitude, self.center_longitude) < self.half_width
    }

    /// ((min_lat, min_lon), (max_lat, max_lon))
    pub fn corners(&self) -> ((f64, f64), (f64, f64)) {
        (
            (
                self.center_latitude - self.half_width,
                self.center_longitude - self.half_width,
            ),
            (
                self.center_latitude + self.half_width,
                self.center_longitude + self.half_width,
            ),
        )
    }
}

pub fn haversine_distance(
    latitude_1: f64,
    longitude_1: f64,
    latitude_2: f64,
    longitude_2: f64,
) -> f64 {
    let lat1_rad = to_radians(latitude_1);
    let lon1_rad = to_radians(longitude_1);
    let lat2_rad = to_radians(latitude_2);
    let lon2_rad = to_radians(longitude_2);

    let dlat = lat2_rad - lat1_rad;
    let dlon = lon2_rad - lon1_rad;

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
