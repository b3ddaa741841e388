//! Persistence collaborators used by the scoring and recommendation core.
//!
//! The core never touches storage directly. Callers pass implementations of
//! these traits; [`crate::file_store`] provides JSONL-backed ones.

use crate::{
    ContentId, ContentItem, HealthMetric, Interaction, Result, StressIndicator, UserId,
};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Append-only stress history
pub trait StressIndicatorStore {
    /// Persist a new indicator and return it as stored
    fn create_stress_indicator(&mut self, indicator: StressIndicator) -> Result<StressIndicator>;

    /// Most recent indicator by timestamp, if the user has any
    fn latest_stress_indicator(&self, user_id: UserId) -> Result<Option<StressIndicator>>;

    /// All indicators for a user, newest first
    fn stress_indicators_for_user(&self, user_id: UserId) -> Result<Vec<StressIndicator>>;
}

/// Raw health readings as ingested from devices
pub trait HealthMetricStore {
    fn create_health_metric(&mut self, metric: HealthMetric) -> Result<HealthMetric>;

    /// Readings for a user within an optional inclusive window, newest first
    fn health_metrics_for_user(
        &self,
        user_id: UserId,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<HealthMetric>>;

    fn latest_health_metric(&self, user_id: UserId) -> Result<Option<HealthMetric>> {
        Ok(self
            .health_metrics_for_user(user_id, None, None)?
            .into_iter()
            .next())
    }
}

/// Read side of the content catalog as seen by the recommender
pub trait ContentCatalog {
    /// Ids of every item the user already consumed
    fn interacted_content_ids(&self, user_id: UserId) -> Result<HashSet<ContentId>>;

    /// Every catalog item whose id is not in `excluded`
    fn content_excluding(&self, excluded: &HashSet<ContentId>) -> Result<Vec<ContentItem>>;
}

/// Write side of the interaction record
pub trait InteractionRecorder {
    fn record_interaction(&mut self, user_id: UserId, interaction: Interaction) -> Result<()>;
}
