// Application layer: wires configuration, catalog and http adapters into a running pipeline.

use crate::adapters::{load_catalog, FixedLocationProvider, RecommendationClient, RouteClient};
use crate::config::TomlConfig;
use crate::core::ConfigProvider;
use crate::core::orchestrator::{PipelineOrchestrator, PipelineSettings, SessionState};
use crate::domain::model::{Catalog, GeoPoint};
use crate::utils::error::Result;
use std::sync::Arc;

pub fn build_orchestrator(catalog: Arc<Catalog>, config: &TomlConfig) -> Result<PipelineOrchestrator> {
    let recommender = RecommendationClient::from_config(&config.recommendation)?;
    let orchestrator = PipelineOrchestrator::new(
        catalog,
        Arc::new(recommender),
        PipelineSettings::from_config(config),
    );

    match config.active_routing() {
        Some(routing) => {
            tracing::debug!("Routing enabled via {}", routing.endpoint);
            Ok(orchestrator.with_router(Arc::new(RouteClient::from_config(routing)?)))
        }
        None => {
            tracing::info!("🚫 Routing disabled, results will not include a route");
            Ok(orchestrator)
        }
    }
}

/// 載入目錄並以指定座標（或設定檔預設座標）跑完一個週期
pub async fn find_atms(config: &TomlConfig, location: Option<GeoPoint>) -> Result<SessionState> {
    let catalog = Arc::new(load_catalog(config.catalog_path()).await?);
    let mut orchestrator = build_orchestrator(catalog, config)?;

    let provider = FixedLocationProvider::first_available([location, config.default_location()]);
    orchestrator.start(Arc::new(provider));

    orchestrator.run_until_settled().await
}
