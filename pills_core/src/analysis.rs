//! Turning health readings into recorded stress indicators.

use crate::scorer::score_reading;
use crate::store::StressIndicatorStore;
use crate::{HealthMetricReading, IndicatorSource, StressIndicator, UserId};
use std::fmt::Display;
use uuid::Uuid;

/// Score a reading and persist the result as a derived stress indicator.
///
/// Persistence failures are logged and swallowed: the caller (typically an
/// ingestion path) must succeed even when the indicator cannot be stored.
/// Returns the stored indicator, or `None` if the store rejected it.
pub fn derive_and_record_stress_indicator<S>(
    user_id: UserId,
    reading: &HealthMetricReading,
    store: &mut S,
) -> Option<StressIndicator>
where
    S: StressIndicatorStore + ?Sized,
{
    let indicator = derive_stress_indicator(user_id, reading);
    let level = indicator.stress_level;

    match store.create_stress_indicator(indicator) {
        Ok(stored) => {
            tracing::info!(
                "Recorded derived stress indicator for user {}: {}",
                user_id,
                level
            );
            Some(stored)
        }
        Err(e) => {
            tracing::warn!(
                "Failed to record derived stress indicator for user {}: {}",
                user_id,
                e
            );
            None
        }
    }
}

/// Build (but do not persist) the indicator for a reading
pub fn derive_stress_indicator(user_id: UserId, reading: &HealthMetricReading) -> StressIndicator {
    StressIndicator {
        id: Uuid::new_v4(),
        user_id,
        stress_level: score_reading(reading),
        timestamp: reading.timestamp,
        notes: Some(summarize_reading(reading)),
        source: IndicatorSource::Derived,
    }
}

/// Human-readable summary of the raw values behind a derived indicator
pub fn summarize_reading(reading: &HealthMetricReading) -> String {
    format!(
        "Auto-generated from health metrics: HR={}, Sleep={}, HRV={}, Temp={}, Steps={}",
        with_unit(reading.heart_rate_bpm, ""),
        with_unit(reading.sleep_hours, "h"),
        with_unit(reading.heart_rate_variability_ms, "ms"),
        with_unit(reading.body_temperature_c, "C"),
        with_unit(reading.steps, ""),
    )
}

fn with_unit<T: Display>(value: Option<T>, unit: &str) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{}{}", v, unit))
}
