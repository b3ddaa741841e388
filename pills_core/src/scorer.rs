//! Stress scoring from health metric readings.
//!
//! Each sensor signal adds points independently:
//! - Heart rate outside the 60-100 bpm resting band
//! - Sleep outside the recommended 7-9 hours
//! - Low heart rate variability
//! - Body temperature outside 36.0-37.5 °C
//! - Very low daily step count
//!
//! The point total maps onto a [`StressLevel`]: 0-1 Low, 2-3 Medium,
//! 4-5 High, 6+ Critical.

use crate::{HealthMetricReading, StressLevel};

/// Sensor signal that contributed points to a score
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    HeartRate,
    Sleep,
    HeartRateVariability,
    BodyTemperature,
    Steps,
}

/// Points awarded by one rule
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contribution {
    pub signal: Signal,
    pub rule: &'static str,
    pub points: u32,
}

/// Full breakdown of a scored reading
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StressAssessment {
    pub points: u32,
    pub level: StressLevel,
    pub contributions: Vec<Contribution>,
}

impl StressLevel {
    /// Map a point total to a level
    pub fn from_points(points: u32) -> Self {
        match points {
            0..=1 => StressLevel::Low,
            2..=3 => StressLevel::Medium,
            4..=5 => StressLevel::High,
            _ => StressLevel::Critical,
        }
    }
}

/// Score a reading into a stress level.
///
/// Total over its input: absent fields contribute nothing, so an empty
/// reading is `Low`.
pub fn score_reading(reading: &HealthMetricReading) -> StressLevel {
    StressLevel::from_points(stress_points(reading))
}

/// Sum of all rule points for a reading
pub fn stress_points(reading: &HealthMetricReading) -> u32 {
    contributions(reading).iter().map(|c| c.points).sum()
}

/// Score a reading and keep the per-rule breakdown
pub fn assess(reading: &HealthMetricReading) -> StressAssessment {
    let contributions = contributions(reading);
    let points = contributions.iter().map(|c| c.points).sum();

    tracing::debug!(
        "Assessed reading at {}: {} points from {} rules",
        reading.timestamp,
        points,
        contributions.len()
    );

    StressAssessment {
        points,
        level: StressLevel::from_points(points),
        contributions,
    }
}

fn contributions(reading: &HealthMetricReading) -> Vec<Contribution> {
    let mut out = Vec::new();
    let mut add = |signal: Signal, rule: &'static str, points: u32| {
        out.push(Contribution {
            signal,
            rule,
            points,
        });
    };

    // Heart rate. The >100 and >120 rules stack: 130 bpm earns both.
    if let Some(hr) = reading.heart_rate_bpm {
        if hr < 60 {
            add(Signal::HeartRate, "heart rate < 60 bpm", 1);
        }
        if hr > 100 {
            add(Signal::HeartRate, "heart rate > 100 bpm", 2);
        }
        if hr > 120 {
            add(Signal::HeartRate, "heart rate > 120 bpm", 3);
        }
    }

    // NaN compares false everywhere and falls through every arm.
    if let Some(sleep) = reading.sleep_hours {
        if sleep < 6.0 {
            add(Signal::Sleep, "sleep < 6 h", 2);
        } else if sleep < 7.0 {
            add(Signal::Sleep, "sleep < 7 h", 1);
        } else if sleep > 9.0 {
            add(Signal::Sleep, "sleep > 9 h", 1);
        }
    }

    if let Some(hrv) = reading.heart_rate_variability_ms {
        if hrv < 20 {
            add(Signal::HeartRateVariability, "HRV < 20 ms", 3);
        } else if hrv < 30 {
            add(Signal::HeartRateVariability, "HRV < 30 ms", 2);
        } else if hrv < 40 {
            add(Signal::HeartRateVariability, "HRV < 40 ms", 1);
        }
    }

    if let Some(temp) = reading.body_temperature_c {
        if temp < 36.0 || temp > 37.5 {
            add(Signal::BodyTemperature, "temperature outside 36.0-37.5 °C", 1);
        }
    }

    // 3000-4999 steps is low but earns nothing
    if let Some(steps) = reading.steps {
        if steps < 3000 {
            add(Signal::Steps, "steps < 3000", 1);
        }
    }

    out
}
