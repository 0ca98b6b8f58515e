use crate::domain::model::{GeoPoint, RankedAtm, RecommendationDecision, Route};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 單次定位請求：回傳座標或失敗
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(&self) -> Result<GeoPoint>;
}

#[async_trait]
pub trait RecommendationService: Send + Sync {
    async fn request_recommendations(
        &self,
        shortlist: &[RankedAtm],
    ) -> Result<Vec<RecommendationDecision>>;
}

#[async_trait]
pub trait RoutingService: Send + Sync {
    async fn request_route(&self, origin: GeoPoint, destination: GeoPoint) -> Result<Route>;
}

pub trait ConfigProvider: Send + Sync {
    fn catalog_path(&self) -> &str;
    fn shortlist_size(&self) -> usize;
    fn recommendation_timeout(&self) -> std::time::Duration;
    fn routing_timeout(&self) -> std::time::Duration;
    fn routing_enabled(&self) -> bool;
}
