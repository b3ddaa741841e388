//! Content recommendations biased by the user's stress level.
//!
//! ## Algorithm
//! 1. Look up the ids the user already consumed
//! 2. Fetch the catalog minus those ids
//! 3. Run the candidate filters (already consumed, calm content at High+)
//! 4. Order by creation time, newest first, ties by ascending id
//! 5. Keep the first `page_size` items
//!
//! When the user has no recorded stress indicator the level defaults to
//! `Medium` (configurable).

use crate::store::{ContentCatalog, StressIndicatorStore};
use crate::{ContentId, ContentItem, ContentType, Result, StressLevel, UserId};
use std::collections::HashSet;

/// Page size used when none is configured
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Everything a filter may base its decision on
#[derive(Clone, Debug)]
pub struct RecommendationContext {
    pub user_id: UserId,
    pub stress_level: StressLevel,
    pub consumed: HashSet<ContentId>,
}

/// A composable candidate filter
pub trait ContentFilter: Send + Sync {
    /// Name for logging
    fn name(&self) -> &str;

    fn apply(&self, candidates: Vec<ContentItem>, ctx: &RecommendationContext) -> Vec<ContentItem>;
}

/// Drops anything the user already consumed.
///
/// The catalog query excludes these too; filtering again keeps the
/// guarantee independent of the catalog implementation.
pub struct AlreadyConsumedFilter;

impl ContentFilter for AlreadyConsumedFilter {
    fn name(&self) -> &str {
        "AlreadyConsumedFilter"
    }

    fn apply(&self, candidates: Vec<ContentItem>, ctx: &RecommendationContext) -> Vec<ContentItem> {
        candidates
            .into_iter()
            .filter(|item| !ctx.consumed.contains(&item.id))
            .collect()
    }
}

/// At `High` stress or above, keeps only articles and videos (no quizzes)
pub struct CalmContentFilter;

impl ContentFilter for CalmContentFilter {
    fn name(&self) -> &str {
        "CalmContentFilter"
    }

    fn apply(&self, candidates: Vec<ContentItem>, ctx: &RecommendationContext) -> Vec<ContentItem> {
        if ctx.stress_level < StressLevel::High {
            return candidates;
        }
        candidates
            .into_iter()
            .filter(|item| {
                matches!(item.content_type, ContentType::Article | ContentType::Video)
            })
            .collect()
    }
}

/// Chooses unseen content appropriate to a stress level
pub struct ContentRecommender {
    filters: Vec<Box<dyn ContentFilter>>,
    page_size: usize,
    default_level: StressLevel,
}

impl ContentRecommender {
    /// Recommender with the standard filters
    pub fn new(page_size: usize) -> Self {
        Self {
            filters: Vec::new(),
            page_size,
            default_level: StressLevel::Medium,
        }
        .with_filter(AlreadyConsumedFilter)
        .with_filter(CalmContentFilter)
    }

    /// Build from the `[recommendations]` config section
    pub fn from_config(config: &crate::config::RecommendationConfig) -> Self {
        Self::new(config.page_size).with_default_level(config.default_stress_level)
    }

    /// Level assumed for users without stress history
    pub fn with_default_level(mut self, level: StressLevel) -> Self {
        self.default_level = level;
        self
    }

    /// Append a filter (builder pattern)
    pub fn with_filter(mut self, filter: impl ContentFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Recommend for the user's latest recorded stress level
    pub fn get_recommendations<S, C>(
        &self,
        user_id: UserId,
        indicators: &S,
        catalog: &C,
    ) -> Result<Vec<ContentItem>>
    where
        S: StressIndicatorStore + ?Sized,
        C: ContentCatalog + ?Sized,
    {
        let level = match indicators.latest_stress_indicator(user_id)? {
            Some(indicator) => indicator.stress_level,
            None => {
                tracing::debug!(
                    "No stress history for user {}, assuming {}",
                    user_id,
                    self.default_level
                );
                self.default_level
            }
        };
        self.recommend(user_id, level, catalog)
    }

    /// Recommend for an explicit stress level
    pub fn recommend<C>(
        &self,
        user_id: UserId,
        stress_level: StressLevel,
        catalog: &C,
    ) -> Result<Vec<ContentItem>>
    where
        C: ContentCatalog + ?Sized,
    {
        let consumed = catalog.interacted_content_ids(user_id)?;
        let mut candidates = catalog.content_excluding(&consumed)?;

        let ctx = RecommendationContext {
            user_id,
            stress_level,
            consumed,
        };

        for filter in &self.filters {
            let before = candidates.len();
            candidates = filter.apply(candidates, &ctx);
            tracing::debug!(
                "Filter {} kept {} of {} candidates",
                filter.name(),
                candidates.len(),
                before
            );
        }

        candidates.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        candidates.truncate(self.page_size);

        tracing::info!(
            "Recommending {} items to user {} at {} stress",
            candidates.len(),
            user_id,
            stress_level
        );
        Ok(candidates)
    }
}

impl Default for ContentRecommender {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, StressIndicator};
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use std::collections::HashMap;

    /// In-memory catalog that deliberately ignores the exclusion set
    /// when `leaky` is set, to prove the recommender re-filters.
    #[derive(Default)]
    struct MemoryCatalog {
        items: Vec<ContentItem>,
        consumed: HashMap<UserId, HashSet<ContentId>>,
        leaky: bool,
    }

    impl ContentCatalog for MemoryCatalog {
        fn interacted_content_ids(&self, user_id: UserId) -> Result<HashSet<ContentId>> {
            Ok(self.consumed.get(&user_id).cloned().unwrap_or_default())
        }

        fn content_excluding(&self, excluded: &HashSet<ContentId>) -> Result<Vec<ContentItem>> {
            Ok(self
                .items
                .iter()
                .filter(|item| self.leaky || !excluded.contains(&item.id))
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct MemoryIndicators {
        latest: HashMap<UserId, StressIndicator>,
    }

    impl StressIndicatorStore for MemoryIndicators {
        fn create_stress_indicator(&mut self, indicator: StressIndicator) -> Result<StressIndicator> {
            self.latest.insert(indicator.user_id, indicator.clone());
            Ok(indicator)
        }

        fn latest_stress_indicator(&self, user_id: UserId) -> Result<Option<StressIndicator>> {
            Ok(self.latest.get(&user_id).cloned())
        }

        fn stress_indicators_for_user(&self, user_id: UserId) -> Result<Vec<StressIndicator>> {
            Ok(self.latest.get(&user_id).cloned().into_iter().collect())
        }
    }

    struct FailingCatalog;

    impl ContentCatalog for FailingCatalog {
        fn interacted_content_ids(&self, _: UserId) -> Result<HashSet<ContentId>> {
            Err(Error::Store("catalog offline".into()))
        }

        fn content_excluding(&self, _: &HashSet<ContentId>) -> Result<Vec<ContentItem>> {
            Err(Error::Store("catalog offline".into()))
        }
    }

    fn item(id: ContentId, content_type: ContentType, days_old: i64) -> ContentItem {
        let base = Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap();
        ContentItem {
            id,
            title: format!("Item {}", id),
            content_type,
            body: String::new(),
            tags: vec![],
            created_at: base - Duration::days(days_old),
            video_url: None,
            quiz_data: None,
        }
    }

    fn ids(items: &[ContentItem]) -> Vec<ContentId> {
        items.iter().map(|i| i.id).collect()
    }

    fn mixed_catalog() -> MemoryCatalog {
        MemoryCatalog {
            items: vec![
                item(1, ContentType::Article, 5),
                item(2, ContentType::Video, 1),
                item(3, ContentType::Quiz, 0),
                item(4, ContentType::Article, 3),
                item(5, ContentType::Quiz, 2),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_newest_first_at_medium() {
        let catalog = mixed_catalog();
        let recs = ContentRecommender::default()
            .recommend(1, StressLevel::Medium, &catalog)
            .unwrap();
        assert_eq!(ids(&recs), vec![3, 2, 5, 4, 1]);
    }

    #[test]
    fn test_high_stress_excludes_quizzes() {
        let catalog = mixed_catalog();
        for level in [StressLevel::High, StressLevel::Critical] {
            let recs = ContentRecommender::default()
                .recommend(1, level, &catalog)
                .unwrap();
            assert_eq!(ids(&recs), vec![2, 4, 1]);
        }
    }

    #[test]
    fn test_low_stress_keeps_quizzes() {
        let catalog = mixed_catalog();
        let recs = ContentRecommender::default()
            .recommend(1, StressLevel::Low, &catalog)
            .unwrap();
        assert!(recs.iter().any(|i| i.content_type == ContentType::Quiz));
    }

    #[test]
    fn test_consumed_items_excluded_even_from_leaky_catalog() {
        let mut catalog = mixed_catalog();
        catalog.leaky = true;
        catalog.consumed.insert(9, [2, 3].into_iter().collect());

        let recs = ContentRecommender::default()
            .recommend(9, StressLevel::Low, &catalog)
            .unwrap();
        assert_eq!(ids(&recs), vec![5, 4, 1]);
    }

    #[test]
    fn test_page_size_caps_results() {
        let catalog = MemoryCatalog {
            items: (1..=25).map(|id| item(id, ContentType::Article, id)).collect(),
            ..Default::default()
        };
        let recs = ContentRecommender::default()
            .recommend(1, StressLevel::Low, &catalog)
            .unwrap();
        assert_eq!(recs.len(), DEFAULT_PAGE_SIZE);
        assert_eq!(recs[0].id, 1);

        let recs = ContentRecommender::new(3)
            .recommend(1, StressLevel::Low, &catalog)
            .unwrap();
        assert_eq!(ids(&recs), vec![1, 2, 3]);
    }

    #[test]
    fn test_equal_timestamps_ordered_by_id() {
        let catalog = MemoryCatalog {
            items: vec![
                item(30, ContentType::Video, 2),
                item(10, ContentType::Article, 2),
                item(20, ContentType::Quiz, 2),
            ],
            ..Default::default()
        };
        let recs = ContentRecommender::default()
            .recommend(1, StressLevel::Medium, &catalog)
            .unwrap();
        assert_eq!(ids(&recs), vec![10, 20, 30]);
    }

    #[test]
    fn test_empty_catalog_is_not_an_error() {
        let catalog = MemoryCatalog::default();
        let recs = ContentRecommender::default()
            .get_recommendations(1, &MemoryIndicators::default(), &catalog)
            .unwrap();
        assert!(recs.is_empty());
    }

    #[test]
    fn test_missing_history_defaults_to_medium() {
        let catalog = mixed_catalog();
        let recs = ContentRecommender::default()
            .get_recommendations(1, &MemoryIndicators::default(), &catalog)
            .unwrap();
        // Medium keeps quizzes
        assert_eq!(ids(&recs), vec![3, 2, 5, 4, 1]);
    }

    #[test]
    fn test_configured_default_level() {
        let catalog = mixed_catalog();
        let recs = ContentRecommender::default()
            .with_default_level(StressLevel::High)
            .get_recommendations(1, &MemoryIndicators::default(), &catalog)
            .unwrap();
        assert_eq!(ids(&recs), vec![2, 4, 1]);
    }

    #[test]
    fn test_latest_indicator_drives_level() {
        let catalog = mixed_catalog();
        let mut indicators = MemoryIndicators::default();
        indicators
            .create_stress_indicator(StressIndicator::manual(
                4,
                StressLevel::Critical,
                Utc::now(),
                None,
            ))
            .unwrap();

        let recs = ContentRecommender::default()
            .get_recommendations(4, &indicators, &catalog)
            .unwrap();
        assert!(recs.iter().all(|i| i.content_type != ContentType::Quiz));
    }

    #[test]
    fn test_catalog_errors_propagate() {
        let result = ContentRecommender::default().recommend(1, StressLevel::Low, &FailingCatalog);
        assert!(matches!(result, Err(Error::Store(_))));
    }

    fn arb_catalog() -> impl Strategy<Value = (Vec<ContentItem>, HashSet<ContentId>)> {
        let kinds = prop_oneof![
            Just(ContentType::Article),
            Just(ContentType::Video),
            Just(ContentType::Quiz),
        ];
        (
            proptest::collection::vec((kinds, 0i64..30), 0..40),
            proptest::collection::hash_set(0i64..40, 0..20),
        )
            .prop_map(|(specs, consumed)| {
                let items = specs
                    .into_iter()
                    .enumerate()
                    .map(|(idx, (kind, age))| item(idx as ContentId, kind, age))
                    .collect();
                (items, consumed)
            })
    }

    fn arb_level() -> impl Strategy<Value = StressLevel> {
        prop_oneof![
            Just(StressLevel::Low),
            Just(StressLevel::Medium),
            Just(StressLevel::High),
            Just(StressLevel::Critical),
        ]
    }

    proptest! {
        #[test]
        fn prop_recommendations_respect_invariants(
            (items, consumed) in arb_catalog(),
            level in arb_level(),
            leaky in any::<bool>(),
        ) {
            let mut catalog = MemoryCatalog { items, leaky, ..Default::default() };
            catalog.consumed.insert(1, consumed.clone());
            let recommender = ContentRecommender::default();

            let first = recommender.recommend(1, level, &catalog).unwrap();

            prop_assert!(first.len() <= DEFAULT_PAGE_SIZE);
            prop_assert!(first.iter().all(|i| !consumed.contains(&i.id)));
            if level >= StressLevel::High {
                prop_assert!(first.iter().all(|i| i.content_type != ContentType::Quiz));
            }

            let second = recommender.recommend(1, level, &catalog).unwrap();
            prop_assert_eq!(ids(&first), ids(&second));
        }
    }
}
