pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliArgs;

pub use crate::app::{build_orchestrator, find_atms};
pub use crate::config::TomlConfig;
pub use crate::core::orchestrator::{PipelineOrchestrator, PipelineState, SessionState};
pub use crate::domain::model::{AtmRecord, Catalog, EnrichedRecommendation, GeoPoint, RankedAtm, Route};
pub use crate::utils::error::{FinderError, Result};
