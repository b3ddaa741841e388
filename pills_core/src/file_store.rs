//! File-backed implementations of the persistence collaborators.
//!
//! Data directory layout:
//! - `log/stress_indicators.jsonl` - append-only stress history
//! - `log/health_metrics.jsonl` - append-only ingested readings
//! - `state/interactions.json` - consumed content per user
//! - `catalog.json` - optional catalog override (seed catalog otherwise)

use crate::catalog::Catalog;
use crate::history::{metric_history, stress_history};
use crate::journal::JsonlJournal;
use crate::state::InteractionState;
use crate::store::{ContentCatalog, HealthMetricStore, InteractionRecorder, StressIndicatorStore};
use crate::{
    ContentId, ContentItem, Error, HealthMetric, Interaction, Result, StressIndicator, UserId,
};
use chrono::{DateTime, Utc};
use once_cell::unsync::OnceCell;
use std::collections::HashSet;
use std::path::PathBuf;

/// Well-known file locations inside a data directory
#[derive(Clone, Debug)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn stress_log(&self) -> PathBuf {
        self.root.join("log").join("stress_indicators.jsonl")
    }

    pub fn metrics_log(&self) -> PathBuf {
        self.root.join("log").join("health_metrics.jsonl")
    }

    pub fn interactions(&self) -> PathBuf {
        self.root.join("state").join("interactions.json")
    }

    pub fn catalog(&self) -> PathBuf {
        self.root.join("catalog.json")
    }
}

/// All collaborators over one data directory.
///
/// The catalog is loaded and validated on first use, so the metric and
/// stress journals stay usable when `catalog.json` is broken.
pub struct FileStore {
    paths: DataPaths,
    indicators: JsonlJournal<StressIndicator>,
    metrics: JsonlJournal<HealthMetric>,
    catalog: OnceCell<Catalog>,
}

impl FileStore {
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let paths = DataPaths::new(data_dir);
        Ok(Self {
            indicators: JsonlJournal::new(paths.stress_log()),
            metrics: JsonlJournal::new(paths.metrics_log()),
            paths,
            catalog: OnceCell::new(),
        })
    }

    /// The directory's catalog, or the seed catalog when none is present
    pub fn catalog(&self) -> Result<&Catalog> {
        self.catalog.get_or_try_init(|| {
            let path = self.paths.catalog();
            let catalog = Catalog::load_or_seed(&path)?;

            let errors = catalog.validate();
            if !errors.is_empty() {
                for error in &errors {
                    tracing::error!("Catalog validation: {}", error);
                }
                return Err(Error::Store(format!(
                    "Catalog at {:?} has {} validation errors",
                    path,
                    errors.len()
                )));
            }
            Ok(catalog)
        })
    }

    /// Interactions recorded for a user
    pub fn interactions_for_user(&self, user_id: UserId) -> Result<Vec<Interaction>> {
        let state = InteractionState::load(&self.paths.interactions())?;
        Ok(state.interactions(user_id).to_vec())
    }
}

impl StressIndicatorStore for FileStore {
    fn create_stress_indicator(&mut self, indicator: StressIndicator) -> Result<StressIndicator> {
        self.indicators.append(&indicator)?;
        Ok(indicator)
    }

    fn latest_stress_indicator(&self, user_id: UserId) -> Result<Option<StressIndicator>> {
        Ok(self
            .stress_indicators_for_user(user_id)?
            .into_iter()
            .next())
    }

    fn stress_indicators_for_user(&self, user_id: UserId) -> Result<Vec<StressIndicator>> {
        Ok(stress_history(self.indicators.read_all()?, user_id))
    }
}

impl HealthMetricStore for FileStore {
    fn create_health_metric(&mut self, metric: HealthMetric) -> Result<HealthMetric> {
        self.metrics.append(&metric)?;
        Ok(metric)
    }

    fn health_metrics_for_user(
        &self,
        user_id: UserId,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<HealthMetric>> {
        Ok(metric_history(self.metrics.read_all()?, user_id, start, end))
    }
}

impl ContentCatalog for FileStore {
    fn interacted_content_ids(&self, user_id: UserId) -> Result<HashSet<ContentId>> {
        Ok(InteractionState::load(&self.paths.interactions())?.consumed_ids(user_id))
    }

    fn content_excluding(&self, excluded: &HashSet<ContentId>) -> Result<Vec<ContentItem>> {
        Ok(self.catalog()?.excluding(excluded))
    }
}

impl InteractionRecorder for FileStore {
    fn record_interaction(&mut self, user_id: UserId, interaction: Interaction) -> Result<()> {
        if user_id <= 0 {
            return Err(Error::Validation(
                "user id must be greater than 0".into(),
            ));
        }
        if !self.catalog()?.contains(interaction.content_id) {
            return Err(Error::Validation(format!(
                "No content with id {}",
                interaction.content_id
            )));
        }
        let content_id = interaction.content_id;
        InteractionState::update(&self.paths.interactions(), |state| {
            state.record(user_id, interaction)
        })?;
        tracing::info!("User {} completed content {}", user_id, content_id);
        Ok(())
    }
}
