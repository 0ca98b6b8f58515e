use crate::utils::error::{FinderError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 經緯度座標，建立時即驗證範圍，之後不可變
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = FinderError;

    fn try_from(raw: RawGeoPoint) -> Result<Self> {
        GeoPoint::new(raw.latitude, raw.longitude)
    }
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(FinderError::invalid_input(format!(
                "latitude {} is outside [-90, 90]",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(FinderError::invalid_input(format!(
                "longitude {} is outside [-180, 180]",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtmRecord {
    pub atm_id: String,
    pub name: String,
    pub address: String,
    pub location: GeoPoint,
}

/// 靜態 ATM 目錄：非空、id 唯一、載入後唯讀
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<AtmRecord>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn from_records(records: Vec<AtmRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(FinderError::invalid_input("ATM catalog is empty"));
        }

        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if record.atm_id.trim().is_empty() {
                return Err(FinderError::invalid_input(format!(
                    "catalog entry #{} has a blank atmId",
                    position + 1
                )));
            }
            if index.insert(record.atm_id.clone(), position).is_some() {
                return Err(FinderError::invalid_input(format!(
                    "duplicate atmId '{}' in catalog",
                    record.atm_id
                )));
            }
        }

        Ok(Self { records, index })
    }

    pub fn get(&self, atm_id: &str) -> Option<&AtmRecord> {
        self.index.get(atm_id).map(|&position| &self.records[position])
    }

    pub fn contains(&self, atm_id: &str) -> bool {
        self.index.contains_key(atm_id)
    }

    pub fn records(&self) -> &[AtmRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedAtm {
    pub atm_id: String,
    pub distance_meters: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationDecision {
    pub atm_id: String,
    #[serde(deserialize_with = "flag")]
    pub recommended: bool,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "optional_flag")]
    pub currency_available: Option<bool>,
}

/// 評分服務以 0/1 或布林值回傳旗標
#[derive(Deserialize)]
#[serde(untagged)]
enum WireFlag {
    Bool(bool),
    Number(i64),
}

impl WireFlag {
    fn into_bool<E: serde::de::Error>(self) -> std::result::Result<bool, E> {
        match self {
            WireFlag::Bool(value) => Ok(value),
            WireFlag::Number(0) => Ok(false),
            WireFlag::Number(1) => Ok(true),
            WireFlag::Number(other) => Err(E::custom(format!(
                "expected 0 or 1 for a flag, got {}",
                other
            ))),
        }
    }
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    WireFlag::deserialize(deserializer)?.into_bool()
}

fn optional_flag<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<bool>, D::Error> {
    Option::<WireFlag>::deserialize(deserializer)?
        .map(|wire| wire.into_bool::<D::Error>())
        .transpose()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRecommendation {
    #[serde(flatten)]
    pub atm: AtmRecord,
    pub distance_meters: Option<f64>,
    pub rating: Option<f64>,
    pub currency_available: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub points: Vec<GeoPoint>,
    pub distance_meters: Option<f64>,
    pub duration_seconds: Option<f64>,
}

impl Route {
    pub fn single_point(point: GeoPoint) -> Self {
        Self {
            points: vec![point],
            distance_meters: Some(0.0),
            duration_seconds: Some(0.0),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 2
    }
}
