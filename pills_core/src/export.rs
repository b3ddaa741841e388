//! CSV export of stress and health metric history.
//!
//! Exports overwrite the target file and are synced to disk before
//! returning. Stress levels are written as their 1-based codes.

use crate::{HealthMetric, Result, StressIndicator};
use std::fs::File;
use std::path::Path;

#[derive(Debug, serde::Serialize)]
struct StressRow {
    id: String,
    user_id: i64,
    timestamp: String,
    stress_level: u8,
    level_name: &'static str,
    source: &'static str,
    notes: Option<String>,
}

impl From<&StressIndicator> for StressRow {
    fn from(indicator: &StressIndicator) -> Self {
        StressRow {
            id: indicator.id.to_string(),
            user_id: indicator.user_id,
            timestamp: indicator.timestamp.to_rfc3339(),
            stress_level: indicator.stress_level.into(),
            level_name: indicator.stress_level.name(),
            source: match indicator.source {
                crate::IndicatorSource::Manual => "manual",
                crate::IndicatorSource::Derived => "derived",
            },
            notes: indicator.notes.clone(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
struct MetricRow {
    id: String,
    user_id: i64,
    timestamp: String,
    heart_rate_bpm: Option<i32>,
    steps: Option<i32>,
    sleep_hours: Option<f64>,
    heart_rate_variability_ms: Option<i32>,
    body_temperature_c: Option<f64>,
    device_id: Option<String>,
    device_type: String,
}

impl From<&HealthMetric> for MetricRow {
    fn from(metric: &HealthMetric) -> Self {
        let r = &metric.reading;
        MetricRow {
            id: metric.id.to_string(),
            user_id: metric.user_id,
            timestamp: r.timestamp.to_rfc3339(),
            heart_rate_bpm: r.heart_rate_bpm,
            steps: r.steps,
            sleep_hours: r.sleep_hours,
            heart_rate_variability_ms: r.heart_rate_variability_ms,
            body_temperature_c: r.body_temperature_c,
            device_id: metric.device_id.clone(),
            device_type: metric.device_type.clone(),
        }
    }
}

/// Write stress indicators to `path` in the given order
pub fn export_stress_history(indicators: &[StressIndicator], path: &Path) -> Result<usize> {
    write_rows(path, indicators.iter().map(StressRow::from))?;
    tracing::info!("Exported {} stress indicators to {:?}", indicators.len(), path);
    Ok(indicators.len())
}

/// Write health metrics to `path` in the given order
pub fn export_health_metrics(metrics: &[HealthMetric], path: &Path) -> Result<usize> {
    write_rows(path, metrics.iter().map(MetricRow::from))?;
    tracing::info!("Exported {} health metrics to {:?}", metrics.len(), path);
    Ok(metrics.len())
}

fn write_rows<R, I>(path: &Path, rows: I) -> Result<()>
where
    R: serde::Serialize,
    I: IntoIterator<Item = R>,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_writer(File::create(path)?);
    for row in rows {
        writer.serialize(row)?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;
    Ok(())
}
