//! Top-level orchestrator wiring the six components together (spec §2).

use crate::detections::Detections;
use crate::error::Result;
use crate::events::{self, AppendOutcome};
use crate::ingestion::EventInput;
use crate::model::{AlertStatus, Detection, FalsePositiveRecord, RiskAlert, RiskObject};
use crate::queries::{self, AlertFilter};
use crate::store::Store;
use crate::{contributing, decay, efficacy};
use risk_core::config::Config;
use risk_core::{DatabasePool, PeriodicTask};

pub struct RiskEngine {
    store: Store,
    config: Config,
    decay_task: Option<PeriodicTask>,
}

impl RiskEngine {
    /// Connects to storage and bootstraps the schema. Does not start the
    /// decay scheduler; call [`RiskEngine::start_decay_scheduler`]
    /// explicitly so tests and one-shot tools can opt out of the background
    /// task.
    pub async fn connect(config: Config) -> Result<Self> {
        let db = DatabasePool::new(config.database.clone()).await?;
        let store = Store::new(db);
        store.bootstrap_schema().await?;

        Ok(Self {
            store,
            config,
            decay_task: None,
        })
    }

    /// Starts the Decay Scheduler as a named background task (spec §9: "must
    /// not be spawned from a constructor without a handle back to the
    /// owner").
    pub fn start_decay_scheduler(&mut self) {
        if self.decay_task.is_some() {
            return;
        }
        self.decay_task = Some(decay::spawn(self.store.clone(), self.config.scoring.clone()));
    }

    /// Requests cooperative shutdown of the decay scheduler, if running, and
    /// waits for its current pass to finish.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.decay_task.take() {
            task.shutdown().await;
        }
    }

    pub async fn append_event(&self, input: &EventInput) -> Result<AppendOutcome> {
        events::append(&self.store, input, &self.config.limits, &self.config.scoring).await
    }

    pub async fn append_events(&self, inputs: &[EventInput]) -> Result<Vec<AppendOutcome>> {
        events::append_batch(&self.store, inputs, &self.config.limits, &self.config.scoring).await
    }

    pub async fn mark_false_positive(
        &self,
        event_id: i64,
        analyst: &str,
        reason: &str,
    ) -> Result<Option<FalsePositiveRecord>> {
        events::mark_false_positive(&self.store, event_id, analyst, reason).await
    }

    pub async fn transition_alert(
        &self,
        alert_id: i64,
        new_status: AlertStatus,
        notes: Option<String>,
        owner: Option<String>,
    ) -> Result<RiskAlert> {
        crate::alerts::transition_status(self.store.pool(), alert_id, new_status, notes, owner).await
    }

    pub async fn get_alert(&self, alert_id: i64) -> Result<RiskAlert> {
        crate::alerts::get(self.store.pool(), alert_id).await
    }

    pub async fn get_detection(&self, detection_id: i64) -> Result<Detection> {
        Detections::new(self.store.pool()).get(detection_id).await
    }

    pub async fn contributing_events(&self, alert_id: i64) -> Result<Vec<crate::model::Event>> {
        contributing::for_alert(self.store.pool(), alert_id).await
    }

    pub async fn efficacy(&self, detection_id: i64) -> Result<efficacy::EfficacySummary> {
        efficacy::summarize(
            self.store.pool(),
            detection_id,
            self.config.scoring.efficacy_window_days,
        )
        .await
    }

    pub async fn list_risk_objects(&self, min_score: Option<i64>) -> Result<Vec<RiskObject>> {
        queries::list_risk_objects(self.store.pool(), min_score).await
    }

    pub async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<RiskAlert>> {
        queries::list_alerts(self.store.pool(), filter).await
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
