use crate::domain::model::GeoPoint;

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// 顯示用單位；管線內部一律使用公尺
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceUnit {
    Meters,
    Kilometers,
}

impl DistanceUnit {
    pub fn scale(self) -> f64 {
        match self {
            DistanceUnit::Meters => 1.0,
            DistanceUnit::Kilometers => 0.001,
        }
    }

    pub fn format(self, meters: f64) -> String {
        match self {
            DistanceUnit::Meters => format!("{:.0} m", meters * self.scale()),
            DistanceUnit::Kilometers => format!("{:.2} km", meters * self.scale()),
        }
    }

    /// 一公里以內用公尺顯示
    pub fn for_display(meters: f64) -> Self {
        if meters < 1000.0 {
            DistanceUnit::Meters
        } else {
            DistanceUnit::Kilometers
        }
    }
}

/// Great-circle distance in meters (haversine).
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let dlat = (b.latitude() - a.latitude()).to_radians();
    let dlon = (b.longitude() - a.longitude()).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_METERS * h.clamp(0.0, 1.0).sqrt().asin()
}

pub fn distance_in(a: GeoPoint, b: GeoPoint, unit: DistanceUnit) -> f64 {
    distance(a, b) * unit.scale()
}
