//! Core domain types for the Tech Knowledge Pills wellness core.
//!
//! This module defines the fundamental types used throughout the system:
//! - Health metric readings coming from wearables / IoT devices
//! - Stress levels and recorded stress indicators
//! - Content catalog items and user interactions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a user (positive integers, as issued by the account system)
pub type UserId = i64;

/// Identifier of a catalog item
pub type ContentId = i64;

// ============================================================================
// Health Metrics
// ============================================================================

/// A timestamped snapshot of wearable sensor values.
///
/// Every sensor field is optional: a device may report any subset.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthMetricReading {
    #[serde(default)]
    pub heart_rate_bpm: Option<i32>,
    #[serde(default)]
    pub steps: Option<i32>,
    #[serde(default)]
    pub sleep_hours: Option<f64>,
    #[serde(default)]
    pub heart_rate_variability_ms: Option<i32>,
    #[serde(default)]
    pub body_temperature_c: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl HealthMetricReading {
    /// A reading with no sensor values at the given instant
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            heart_rate_bpm: None,
            steps: None,
            sleep_hours: None,
            heart_rate_variability_ms: None,
            body_temperature_c: None,
            timestamp,
        }
    }

    /// True when no sensor value is present
    pub fn is_empty(&self) -> bool {
        self.heart_rate_bpm.is_none()
            && self.steps.is_none()
            && self.sleep_hours.is_none()
            && self.heart_rate_variability_ms.is_none()
            && self.body_temperature_c.is_none()
    }
}

/// A persisted reading together with its device metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthMetric {
    pub id: Uuid,
    pub user_id: UserId,
    pub reading: HealthMetricReading,
    pub device_id: Option<String>,
    pub device_type: String,
}

// ============================================================================
// Stress
// ============================================================================

/// Coarse wellness category, totally ordered `Low < Medium < High < Critical`.
///
/// Serialized as 1-based integers (see [`crate::wire`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum StressLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl StressLevel {
    pub const ALL: [StressLevel; 4] = [
        StressLevel::Low,
        StressLevel::Medium,
        StressLevel::High,
        StressLevel::Critical,
    ];

    /// Lowercase name used by config files and the CLI
    pub fn name(self) -> &'static str {
        match self {
            StressLevel::Low => "low",
            StressLevel::Medium => "medium",
            StressLevel::High => "high",
            StressLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for StressLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            StressLevel::Low => "Low",
            StressLevel::Medium => "Medium",
            StressLevel::High => "High",
            StressLevel::Critical => "Critical",
        };
        f.pad(label)
    }
}

impl std::str::FromStr for StressLevel {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        StressLevel::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::Error::Validation(format!("Unknown stress level: {}", s)))
    }
}

/// How a stress indicator came to exist
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorSource {
    /// Entered directly by the user
    #[default]
    Manual,
    /// Computed from a health metric reading
    Derived,
}

/// A point in a user's append-only stress history
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StressIndicator {
    pub id: Uuid,
    pub user_id: UserId,
    pub stress_level: StressLevel,
    pub timestamp: DateTime<Utc>,
    pub notes: Option<String>,
    #[serde(default)]
    pub source: IndicatorSource,
}

impl StressIndicator {
    /// Build a user-entered indicator
    pub fn manual(
        user_id: UserId,
        stress_level: StressLevel,
        timestamp: DateTime<Utc>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            stress_level,
            timestamp,
            notes,
            source: IndicatorSource::Manual,
        }
    }
}

// ============================================================================
// Content
// ============================================================================

/// Kind of educational item. Serialized as 1-based integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ContentType {
    Article,
    Video,
    Quiz,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [ContentType::Article, ContentType::Video, ContentType::Quiz];

    pub fn name(self) -> &'static str {
        match self {
            ContentType::Article => "article",
            ContentType::Video => "video",
            ContentType::Quiz => "quiz",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ContentType::Article => "Article",
            ContentType::Video => "Video",
            ContentType::Quiz => "Quiz",
        };
        f.pad(label)
    }
}

impl std::str::FromStr for ContentType {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        ContentType::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::Error::Validation(format!("Unknown content type: {}", s)))
    }
}

/// A read-only catalog entry
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ContentItem {
    pub id: ContentId,
    pub title: String,
    pub content_type: ContentType,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub video_url: Option<String>,
    /// Questions and answers as an opaque JSON document
    #[serde(default)]
    pub quiz_data: Option<String>,
}

/// Record that a user consumed a catalog item
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    pub content_id: ContentId,
    pub completed_at: DateTime<Utc>,
    /// Optional 1-5 rating
    pub rating: Option<u8>,
}
