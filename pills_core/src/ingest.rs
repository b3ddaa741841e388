//! Health data ingestion: persist a device reading, then derive stress.
//!
//! Storing the reading is the part that must succeed. Deriving and storing
//! the stress indicator afterwards is best-effort.

use crate::analysis::derive_and_record_stress_indicator;
use crate::store::{HealthMetricStore, StressIndicatorStore};
use crate::{
    Error, HealthMetric, HealthMetricReading, Result, StressIndicator, UserId,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A reading as submitted by a device
#[derive(Clone, Debug, Default)]
pub struct IngestRequest {
    pub user_id: UserId,
    /// Defaults to the time of ingestion
    pub timestamp: Option<DateTime<Utc>>,
    pub heart_rate_bpm: Option<i32>,
    pub steps: Option<i32>,
    pub sleep_hours: Option<f64>,
    pub heart_rate_variability_ms: Option<i32>,
    pub body_temperature_c: Option<f64>,
    pub device_id: Option<String>,
    pub device_type: Option<String>,
}

/// Result of a successful ingestion
#[derive(Clone, Debug)]
pub struct IngestOutcome {
    pub metric: HealthMetric,
    /// `None` when the derived indicator could not be stored
    pub indicator: Option<StressIndicator>,
}

/// Accepts device readings and feeds them to the stress scorer
pub struct Ingestor {
    default_device_type: String,
}

impl Ingestor {
    pub fn new(default_device_type: impl Into<String>) -> Self {
        Self {
            default_device_type: default_device_type.into(),
        }
    }

    pub fn from_config(config: &crate::config::IngestionConfig) -> Self {
        Self::new(config.default_device_type.clone())
    }

    /// Validate and persist a reading, then record its derived stress level
    pub fn ingest<M, S>(
        &self,
        request: IngestRequest,
        metrics: &mut M,
        indicators: &mut S,
    ) -> Result<IngestOutcome>
    where
        M: HealthMetricStore + ?Sized,
        S: StressIndicatorStore + ?Sized,
    {
        if request.user_id <= 0 {
            return Err(Error::Validation(
                "user id is required and must be greater than 0".into(),
            ));
        }

        let reading = HealthMetricReading {
            heart_rate_bpm: request.heart_rate_bpm,
            steps: request.steps,
            sleep_hours: request.sleep_hours,
            heart_rate_variability_ms: request.heart_rate_variability_ms,
            body_temperature_c: request.body_temperature_c,
            timestamp: request.timestamp.unwrap_or_else(Utc::now),
        };

        let metric = metrics.create_health_metric(HealthMetric {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            reading,
            device_id: request.device_id,
            device_type: request
                .device_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| self.default_device_type.clone()),
        })?;

        tracing::info!(
            "Stored health metric {} for user {} from {}",
            metric.id,
            metric.user_id,
            metric.device_type
        );

        let indicator =
            derive_and_record_stress_indicator(metric.user_id, &metric.reading, indicators);

        Ok(IngestOutcome { metric, indicator })
    }
}

/// Ingest with the default device type
pub fn ingest_reading<M, S>(
    request: IngestRequest,
    metrics: &mut M,
    indicators: &mut S,
) -> Result<IngestOutcome>
where
    M: HealthMetricStore + ?Sized,
    S: StressIndicatorStore + ?Sized,
{
    Ingestor::default().ingest(request, metrics, indicators)
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::from_config(&crate::config::IngestionConfig::default())
    }
}
