pub mod distance;
pub mod merger;
pub mod orchestrator;
pub mod ranker;

pub use crate::domain::model::{
    AtmRecord, Catalog, EnrichedRecommendation, GeoPoint, RankedAtm, RecommendationDecision, Route,
};
pub use crate::domain::ports::{ConfigProvider, LocationProvider, RecommendationService, RoutingService};
pub use crate::utils::error::Result;
