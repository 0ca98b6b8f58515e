use crate::core::merger::merge;
use crate::core::ranker::rank_nearest;
use crate::domain::model::{
    Catalog, EnrichedRecommendation, GeoPoint, RankedAtm, RecommendationDecision, Route,
};
use crate::domain::ports::{ConfigProvider, LocationProvider, RecommendationService, RoutingService};
use crate::utils::error::{FinderError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub const DEFAULT_SHORTLIST_SIZE: usize = 5;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    InvalidInput,
    LocationUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    Idle,
    LocationPending,
    Ranking,
    AwaitingDecision,
    Enriched,
    RoutePending,
    Ready,
    Error(ErrorKind),
}

impl PipelineState {
    pub fn is_settled(&self) -> bool {
        matches!(self, PipelineState::Ready | PipelineState::Error(_))
    }
}

/// 所有階段完成與新定位都經由同一個事件通道送進協調器
#[derive(Debug)]
pub enum PipelineEvent {
    LocationFix(GeoPoint),
    /// `cycle` 為發出定位請求時的週期
    LocationFailed {
        cycle: u64,
        message: String,
    },
    DecisionsReady {
        cycle: u64,
        result: Result<Vec<RecommendationDecision>>,
    },
    RouteReady {
        cycle: u64,
        result: Result<Route>,
    },
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub shortlist_size: usize,
    pub recommendation_timeout: Duration,
    pub routing_timeout: Duration,
}

impl PipelineSettings {
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            shortlist_size: config.shortlist_size(),
            recommendation_timeout: config.recommendation_timeout(),
            routing_timeout: config.routing_timeout(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            shortlist_size: DEFAULT_SHORTLIST_SIZE,
            recommendation_timeout: DEFAULT_TIMEOUT,
            routing_timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// 單一使用者工作階段的狀態，只有協調器能寫入
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub cycle: u64,
    pub state: PipelineState,
    pub location: Option<GeoPoint>,
    pub shortlist: Vec<RankedAtm>,
    pub recommendations: Vec<EnrichedRecommendation>,
    pub route: Option<Route>,
    pub route_destination: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            cycle: 0,
            state: PipelineState::Idle,
            location: None,
            shortlist: Vec::new(),
            recommendations: Vec::new(),
            route: None,
            route_destination: None,
            updated_at: Utc::now(),
        }
    }

    pub fn top_recommendation(&self) -> Option<&EnrichedRecommendation> {
        self.recommendations.first()
    }
}

/// 讓呈現層推送新的定位
#[derive(Debug, Clone)]
pub struct LocationUpdates {
    sender: mpsc::UnboundedSender<PipelineEvent>,
}

impl LocationUpdates {
    pub fn push(&self, point: GeoPoint) -> Result<()> {
        self.sender
            .send(PipelineEvent::LocationFix(point))
            .map_err(|_| FinderError::LocationUnavailable {
                message: "pipeline is no longer running".to_string(),
            })
    }
}

pub struct PipelineOrchestrator {
    catalog: Arc<Catalog>,
    recommender: Arc<dyn RecommendationService>,
    router: Option<Arc<dyn RoutingService>>,
    settings: PipelineSettings,
    session: SessionState,
    events_tx: mpsc::UnboundedSender<PipelineEvent>,
    events_rx: mpsc::UnboundedReceiver<PipelineEvent>,
}

impl PipelineOrchestrator {
    pub fn new(
        catalog: Arc<Catalog>,
        recommender: Arc<dyn RecommendationService>,
        settings: PipelineSettings,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            catalog,
            recommender,
            router: None,
            settings,
            session: SessionState::new(),
            events_tx,
            events_rx,
        }
    }

    pub fn with_router(mut self, router: Arc<dyn RoutingService>) -> Self {
        self.router = Some(router);
        self
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn snapshot(&self) -> SessionState {
        self.session.clone()
    }

    pub fn state(&self) -> PipelineState {
        self.session.state
    }

    pub fn location_updates(&self) -> LocationUpdates {
        LocationUpdates {
            sender: self.events_tx.clone(),
        }
    }

    /// Idle → LocationPending，並發出單次定位請求
    pub fn start(&mut self, provider: Arc<dyn LocationProvider>) {
        self.transition(PipelineState::LocationPending);

        let cycle = self.session.cycle;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let event = match provider.current_location().await {
                Ok(point) => PipelineEvent::LocationFix(point),
                Err(e) => PipelineEvent::LocationFailed {
                    cycle,
                    message: e.to_string(),
                },
            };
            if tx.send(event).is_err() {
                tracing::debug!("Location result dropped: pipeline is gone");
            }
        });
    }

    /// 處理事件直到管線進入 Ready 或 Error
    pub async fn run_until_settled(&mut self) -> Result<SessionState> {
        loop {
            while let Ok(event) = self.events_rx.try_recv() {
                self.handle_event(event)?;
            }

            if self.session.state.is_settled() || self.session.state == PipelineState::Idle {
                return Ok(self.snapshot());
            }

            match self.events_rx.recv().await {
                Some(event) => self.handle_event(event)?,
                // 協調器自己持有 sender，正常執行時不會走到這裡
                None => {
                    return Err(FinderError::LocationUnavailable {
                        message: "event channel closed".to_string(),
                    })
                }
            }
        }
    }

    pub fn handle_event(&mut self, event: PipelineEvent) -> Result<()> {
        match event {
            PipelineEvent::LocationFix(point) => self.on_location_fix(point),
            PipelineEvent::LocationFailed { cycle, message } => {
                self.on_location_failed(cycle, message);
                Ok(())
            }
            PipelineEvent::DecisionsReady { cycle, result } => {
                self.on_decisions(cycle, result);
                Ok(())
            }
            PipelineEvent::RouteReady { cycle, result } => {
                self.on_route(cycle, result);
                Ok(())
            }
        }
    }

    fn on_location_fix(&mut self, point: GeoPoint) -> Result<()> {
        self.begin_cycle();
        let cycle = self.session.cycle;
        tracing::info!("📍 Location fix {} (cycle {})", point, cycle);

        self.session.location = Some(point);
        self.transition(PipelineState::LocationPending);
        self.transition(PipelineState::Ranking);

        let shortlist = match rank_nearest(point, self.catalog.records(), self.settings.shortlist_size)
        {
            Ok(shortlist) => shortlist,
            Err(e) => {
                tracing::error!("❌ Ranking failed: {}", e);
                self.transition(PipelineState::Error(ErrorKind::InvalidInput));
                return Err(e);
            }
        };

        self.session.shortlist = shortlist.clone();
        self.transition(PipelineState::AwaitingDecision);

        let recommender = Arc::clone(&self.recommender);
        let timeout = self.settings.recommendation_timeout;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result =
                match tokio::time::timeout(timeout, recommender.request_recommendations(&shortlist))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(FinderError::recommendation(format!(
                        "no response within {:?}",
                        timeout
                    ))),
                };
            if tx.send(PipelineEvent::DecisionsReady { cycle, result }).is_err() {
                tracing::debug!("Decisions for cycle {} dropped: pipeline is gone", cycle);
            }
        });

        Ok(())
    }

    fn on_location_failed(&mut self, cycle: u64, message: String) {
        // 請求發出後已有新定位，失敗不再適用
        if cycle < self.session.cycle {
            tracing::debug!(
                "Ignoring location failure from cycle {} (current {}): {}",
                cycle,
                self.session.cycle,
                message
            );
            return;
        }

        // 進行中的遠端呼叫一律作廢
        self.begin_cycle();
        self.session.location = None;
        tracing::warn!("⚠️ Location unavailable: {}", message);
        self.transition(PipelineState::Error(ErrorKind::LocationUnavailable));
    }

    fn on_decisions(&mut self, cycle: u64, result: Result<Vec<RecommendationDecision>>) {
        if !self.is_current(cycle, PipelineState::AwaitingDecision) {
            return;
        }

        let decisions = result.unwrap_or_else(|e| {
            tracing::warn!("⚠️ {} - continuing without recommendations", e);
            Vec::new()
        });

        self.session.recommendations = merge(&self.catalog, &self.session.shortlist, &decisions);
        self.transition(PipelineState::Enriched);
        tracing::info!(
            "✅ {} recommended ATMs out of {} nearby",
            self.session.recommendations.len(),
            self.session.shortlist.len()
        );

        let target = match (
            &self.router,
            self.session.location,
            self.session.recommendations.first(),
        ) {
            (Some(router), Some(origin), Some(top)) => Some((
                Arc::clone(router),
                origin,
                top.atm.location,
                top.atm.atm_id.clone(),
            )),
            _ => None,
        };

        let Some((router, origin, destination, destination_id)) = target else {
            self.transition(PipelineState::Ready);
            return;
        };

        self.session.route_destination = Some(destination_id);
        self.transition(PipelineState::RoutePending);

        let timeout = self.settings.routing_timeout;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, router.request_route(origin, destination))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(FinderError::routing(format!(
                    "no response within {:?}",
                    timeout
                ))),
            };
            if tx.send(PipelineEvent::RouteReady { cycle, result }).is_err() {
                tracing::debug!("Route for cycle {} dropped: pipeline is gone", cycle);
            }
        });
    }

    fn on_route(&mut self, cycle: u64, result: Result<Route>) {
        if !self.is_current(cycle, PipelineState::RoutePending) {
            return;
        }

        match result {
            Ok(route) => {
                tracing::info!("🗺️ Route ready with {} points", route.points.len());
                self.session.route = Some(route);
            }
            Err(e) => {
                tracing::warn!("⚠️ {} - no route will be shown", e);
                self.session.route = None;
            }
        }
        self.transition(PipelineState::Ready);
    }

    fn is_current(&self, cycle: u64, expected: PipelineState) -> bool {
        if cycle != self.session.cycle {
            tracing::debug!(
                "Discarding result from superseded cycle {} (current {})",
                cycle,
                self.session.cycle
            );
            return false;
        }
        if self.session.state != expected {
            tracing::debug!(
                "Ignoring result in state {:?}, expected {:?}",
                self.session.state,
                expected
            );
            return false;
        }
        true
    }

    fn begin_cycle(&mut self) {
        self.session.cycle += 1;
        self.session.shortlist.clear();
        self.session.recommendations.clear();
        self.session.route = None;
        self.session.route_destination = None;
    }

    fn transition(&mut self, next: PipelineState) {
        tracing::debug!("Pipeline state {:?} → {:?}", self.session.state, next);
        self.session.state = next;
        self.session.updated_at = Utc::now();
    }
}
