use crate::config::toml_config::RecommendationConfig;
use crate::domain::model::{RankedAtm, RecommendationDecision};
use crate::domain::ports::RecommendationService;
use crate::utils::error::{FinderError, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

pub const CSV_HEADER: [&str; 2] = ["atmId", "distanceMeters"];

/// 評分服務可能直接回傳陣列，或包在 `recommendations` 欄位中
#[derive(Deserialize)]
#[serde(untagged)]
enum DecisionPayload {
    List(Vec<RecommendationDecision>),
    Wrapped {
        recommendations: Vec<RecommendationDecision>,
    },
}

impl DecisionPayload {
    fn into_decisions(self) -> Vec<RecommendationDecision> {
        match self {
            DecisionPayload::List(decisions) => decisions,
            DecisionPayload::Wrapped { recommendations } => recommendations,
        }
    }
}

pub struct RecommendationClient {
    client: Client,
    endpoint: String,
    headers: HashMap<String, String>,
}

impl RecommendationClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            headers: HashMap::new(),
        })
    }

    pub fn from_config(config: &RecommendationConfig) -> Result<Self> {
        Ok(Self::new(config.endpoint.clone(), config.timeout())?
            .with_headers(config.headers.clone().unwrap_or_default()))
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// 產生 `atmId,distanceMeters` 表頭加上每筆一列的 CSV
    pub fn encode_shortlist(shortlist: &[RankedAtm]) -> Result<String> {
        let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;
        for ranked in shortlist {
            writer.write_record([
                ranked.atm_id.as_str(),
                format!("{:.2}", ranked.distance_meters).as_str(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| FinderError::Io(e.into_error()))?;
        String::from_utf8(bytes)
            .map_err(|e| FinderError::invalid_input(format!("shortlist is not valid UTF-8: {}", e)))
    }

    pub fn parse_decisions(body: &str) -> Result<Vec<RecommendationDecision>> {
        let payload: DecisionPayload = serde_json::from_str(body).map_err(|e| {
            tracing::error!("Failed to parse recommendation response: {}. Body: {}", e, body);
            FinderError::recommendation(format!("malformed response: {}", e))
        })?;

        let decisions = payload.into_decisions();
        for decision in &decisions {
            if decision.atm_id.trim().is_empty() {
                return Err(FinderError::recommendation(
                    "malformed response: decision without atmId",
                ));
            }
            if decision.rating.is_some_and(|rating| !rating.is_finite()) {
                return Err(FinderError::recommendation(format!(
                    "malformed response: non-finite rating for '{}'",
                    decision.atm_id
                )));
            }
        }
        Ok(decisions)
    }

    fn describe(&self, e: &reqwest::Error) -> FinderError {
        if e.is_timeout() {
            FinderError::recommendation(format!("request to {} timed out", self.endpoint))
        } else {
            FinderError::recommendation(format!("request to {} failed: {}", self.endpoint, e))
        }
    }
}

#[async_trait]
impl RecommendationService for RecommendationClient {
    async fn request_recommendations(
        &self,
        shortlist: &[RankedAtm],
    ) -> Result<Vec<RecommendationDecision>> {
        if shortlist.is_empty() {
            tracing::debug!("Empty shortlist, skipping recommendation request");
            return Ok(Vec::new());
        }

        let payload = Self::encode_shortlist(shortlist)?;
        tracing::debug!(
            "Requesting recommendations for {} ATMs from {}",
            shortlist.len(),
            self.endpoint
        );

        let mut request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/csv")
            .header(ACCEPT, "application/json")
            .body(payload);
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(|e| self.describe(&e))?;
        let status = response.status();
        tracing::debug!("Recommendation service responded with {}", status);

        let body = response.text().await.map_err(|e| self.describe(&e))?;
        if !status.is_success() {
            tracing::error!(
                "Recommendation service returned {}. Body: {}",
                status,
                body
            );
            return Err(FinderError::recommendation(format!(
                "service returned status {}",
                status
            )));
        }

        let shortlisted: HashSet<&str> = shortlist.iter().map(|r| r.atm_id.as_str()).collect();
        let decisions = Self::parse_decisions(&body)?
            .into_iter()
            .filter(|decision| {
                let known = shortlisted.contains(decision.atm_id.as_str());
                if !known {
                    tracing::warn!(
                        "⚠️ Ignoring decision for '{}': not in the shortlist",
                        decision.atm_id
                    );
                }
                known
            })
            .collect();

        Ok(decisions)
    }
}
