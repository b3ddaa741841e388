//! Per-user history queries over journal records.
//!
//! Journals hold every user's records in append order; these helpers pick
//! out one user's entries and return them newest first.

use crate::{HealthMetric, StressIndicator, UserId};
use chrono::{DateTime, Utc};

/// One user's stress indicators, newest first.
///
/// Indicators sharing a timestamp keep their recording order reversed, so
/// the most recently appended one comes first.
pub fn stress_history(records: Vec<StressIndicator>, user_id: UserId) -> Vec<StressIndicator> {
    let mut history: Vec<_> = records
        .into_iter()
        .filter(|i| i.user_id == user_id)
        .collect();
    history.reverse();
    // stable sort keeps the reversed append order for equal timestamps
    history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    history
}

/// One user's health metrics inside an inclusive window, newest first
pub fn metric_history(
    records: Vec<HealthMetric>,
    user_id: UserId,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Vec<HealthMetric> {
    let mut history: Vec<_> = records
        .into_iter()
        .filter(|m| m.user_id == user_id)
        .filter(|m| start.map_or(true, |s| m.reading.timestamp >= s))
        .filter(|m| end.map_or(true, |e| m.reading.timestamp <= e))
        .collect();
    history.reverse();
    history.sort_by(|a, b| b.reading.timestamp.cmp(&a.reading.timestamp));

    tracing::debug!(
        "Selected {} health metrics for user {}",
        history.len(),
        user_id
    );
    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HealthMetricReading, StressLevel};
    use chrono::Duration;
    use uuid::Uuid;

    fn indicator(user_id: UserId, level: StressLevel, days_ago: i64) -> StressIndicator {
        StressIndicator::manual(user_id, level, Utc::now() - Duration::days(days_ago), None)
    }

    fn metric(user_id: UserId, at: DateTime<Utc>) -> HealthMetric {
        HealthMetric {
            id: Uuid::new_v4(),
            user_id,
            reading: HealthMetricReading::empty(at),
            device_id: None,
            device_type: "unknown".into(),
        }
    }

    #[test]
    fn test_stress_history_sorted_newest_first() {
        let records = vec![
            indicator(1, StressLevel::Low, 5),
            indicator(2, StressLevel::Critical, 0),
            indicator(1, StressLevel::High, 1),
            indicator(1, StressLevel::Medium, 3),
        ];

        let levels: Vec<_> = stress_history(records, 1)
            .into_iter()
            .map(|i| i.stress_level)
            .collect();
        assert_eq!(
            levels,
            vec![StressLevel::High, StressLevel::Medium, StressLevel::Low]
        );
    }

    #[test]
    fn test_equal_timestamps_latest_append_wins() {
        let at = Utc::now();
        let first = StressIndicator::manual(1, StressLevel::Low, at, None);
        let second = StressIndicator::manual(1, StressLevel::Critical, at, None);

        let history = stress_history(vec![first, second.clone()], 1);
        assert_eq!(history[0], second);
    }

    #[test]
    fn test_metric_window_is_inclusive() {
        let now = Utc::now();
        let records = vec![
            metric(1, now - Duration::days(10)),
            metric(1, now - Duration::days(5)),
            metric(1, now - Duration::days(1)),
            metric(2, now - Duration::days(5)),
        ];

        let window = metric_history(
            records,
            1,
            Some(now - Duration::days(5)),
            Some(now - Duration::days(1)),
        );
        assert_eq!(window.len(), 2);
        assert!(window[0].reading.timestamp > window[1].reading.timestamp);
    }

    #[test]
    fn test_metric_history_unbounded() {
        let now = Utc::now();
        let records = vec![metric(1, now - Duration::days(400)), metric(1, now)];
        assert_eq!(metric_history(records, 1, None, None).len(), 2);
    }
}
