use crate::domain::model::GeoPoint;
use crate::domain::ports::LocationProvider;
use crate::utils::error::{FinderError, Result};
use async_trait::async_trait;

/// 固定座標的定位來源（命令列參數或設定檔預設值）
#[derive(Debug, Clone)]
pub struct FixedLocationProvider {
    point: Option<GeoPoint>,
}

impl FixedLocationProvider {
    pub fn new(point: GeoPoint) -> Self {
        Self { point: Some(point) }
    }

    /// 依序使用第一個可用的座標
    pub fn first_available(candidates: impl IntoIterator<Item = Option<GeoPoint>>) -> Self {
        Self {
            point: candidates.into_iter().flatten().next(),
        }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current_location(&self) -> Result<GeoPoint> {
        self.point.ok_or_else(|| FinderError::LocationUnavailable {
            message: "no coordinates were supplied".to_string(),
        })
    }
}
