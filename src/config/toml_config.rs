use crate::core::orchestrator::{DEFAULT_SHORTLIST_SIZE, DEFAULT_TIMEOUT};
use crate::core::ConfigProvider;
use crate::domain::model::GeoPoint;
use crate::utils::error::{FinderError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

const MAX_TIMEOUT_SECONDS: u64 = 120;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub catalog: CatalogConfig,
    pub ranking: Option<RankingConfig>,
    pub recommendation: RecommendationConfig,
    pub routing: Option<RoutingConfig>,
    pub location: Option<LocationConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    pub shortlist_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

impl RecommendationConfig {
    pub fn timeout(&self) -> Duration {
        self.timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub enabled: Option<bool>,
    pub endpoint: String,
    pub profile: Option<String>,
    pub access_token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl RoutingConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn profile(&self) -> &str {
        self.profile
            .as_deref()
            .unwrap_or(crate::adapters::routing::DEFAULT_PROFILE)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }
}

/// 沒有裝置定位時使用的預設座標
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FinderError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MAPBOX_TOKEN})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            FinderError::ConfigValidationError {
                field: "environment".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_catalog_path("catalog.path", &self.catalog.path, &["csv", "json"])?;

        validation::validate_positive_number("ranking.shortlist_size", self.shortlist_size(), 1)?;

        validation::validate_url("recommendation.endpoint", &self.recommendation.endpoint)?;
        if let Some(seconds) = self.recommendation.timeout_seconds {
            validation::validate_range(
                "recommendation.timeout_seconds",
                seconds,
                1,
                MAX_TIMEOUT_SECONDS,
            )?;
        }

        if let Some(routing) = self.routing.as_ref().filter(|r| r.is_enabled()) {
            validation::validate_url("routing.endpoint", &routing.endpoint)?;
            validation::validate_non_empty_string("routing.profile", routing.profile())?;
            let token = validation::validate_required_field("routing.access_token", &routing.access_token)?;
            if token.starts_with("${") {
                return Err(FinderError::MissingConfigError {
                    field: format!("routing.access_token (environment variable {})", token),
                });
            }
            if let Some(seconds) = routing.timeout_seconds {
                validation::validate_range("routing.timeout_seconds", seconds, 1, MAX_TIMEOUT_SECONDS)?;
            }
        }

        if let Some(location) = &self.location {
            validation::validate_range("location.latitude", location.latitude, -90.0, 90.0)?;
            validation::validate_range("location.longitude", location.longitude, -180.0, 180.0)?;
        }

        Ok(())
    }

    pub fn shortlist_size(&self) -> usize {
        self.ranking
            .as_ref()
            .and_then(|r| r.shortlist_size)
            .unwrap_or(DEFAULT_SHORTLIST_SIZE)
    }

    pub fn set_shortlist_size(&mut self, size: usize) {
        self.ranking = Some(RankingConfig {
            shortlist_size: Some(size),
        });
    }

    /// 啟用中的路線設定
    pub fn active_routing(&self) -> Option<&RoutingConfig> {
        self.routing.as_ref().filter(|r| r.is_enabled())
    }

    pub fn default_location(&self) -> Option<GeoPoint> {
        self.location
            .as_ref()
            .and_then(|l| GeoPoint::new(l.latitude, l.longitude).ok())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn catalog_path(&self) -> &str {
        &self.catalog.path
    }

    fn shortlist_size(&self) -> usize {
        self.shortlist_size()
    }

    fn recommendation_timeout(&self) -> Duration {
        self.recommendation.timeout()
    }

    fn routing_timeout(&self) -> Duration {
        self.routing
            .as_ref()
            .map(RoutingConfig::timeout)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    fn routing_enabled(&self) -> bool {
        self.active_routing().is_some()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
