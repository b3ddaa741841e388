#![forbid(unsafe_code)]

//! Core domain model and business logic for Tech Knowledge Pills.
//!
//! This crate provides:
//! - Domain types (health readings, stress indicators, content items)
//! - Stress scoring from wearable readings
//! - Stress-aware content recommendation
//! - Persistence (JSONL journals, interaction state, catalog file)
//! - Health data ingestion and CSV export

pub mod types;
pub mod error;
pub mod wire;
pub mod scorer;
pub mod analysis;
pub mod store;
pub mod recommender;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod journal;
pub mod state;
pub mod history;
pub mod file_store;
pub mod ingest;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{seed_catalog, Catalog};
pub use config::Config;
pub use scorer::{assess, score_reading, StressAssessment};
pub use analysis::derive_and_record_stress_indicator;
pub use store::{ContentCatalog, HealthMetricStore, InteractionRecorder, StressIndicatorStore};
pub use recommender::ContentRecommender;
pub use file_store::FileStore;
pub use ingest::{ingest_reading, IngestRequest, Ingestor};
