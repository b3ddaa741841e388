//! Content catalog: the built-in seed set and file-backed catalogs.
//!
//! A data directory may carry a `catalog.json` (array of content items);
//! without one the built-in seed catalog is used.

use crate::{ContentId, ContentItem, ContentType, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use once_cell::sync::Lazy;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Cached seed catalog - built once and reused
static SEED_CATALOG: Lazy<Catalog> = Lazy::new(build_seed_catalog);

/// Get a reference to the cached seed catalog
pub fn seed_catalog() -> &'static Catalog {
    &SEED_CATALOG
}

/// The set of educational items available for recommendation, keyed by id
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    items: BTreeMap<ContentId, ContentItem>,
    /// Ids that appeared more than once; the first occurrence is kept
    duplicates: Vec<ContentId>,
}

impl Catalog {
    pub fn new(items: impl IntoIterator<Item = ContentItem>) -> Self {
        let mut catalog = Self::default();
        for item in items {
            if catalog.items.contains_key(&item.id) {
                catalog.duplicates.push(item.id);
            } else {
                catalog.items.insert(item.id, item);
            }
        }
        catalog
    }

    /// Load a catalog from a JSON array of items
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let items: Vec<ContentItem> = serde_json::from_str(&contents)?;
        tracing::info!("Loaded {} catalog items from {:?}", items.len(), path);
        Ok(Self::new(items))
    }

    /// Load `path` if it exists, otherwise fall back to the seed catalog
    pub fn load_or_seed(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            tracing::debug!("No catalog at {:?}, using seed catalog", path);
            Ok(seed_catalog().clone())
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ContentId) -> Option<&ContentItem> {
        self.items.get(&id)
    }

    pub fn contains(&self, id: ContentId) -> bool {
        self.items.contains_key(&id)
    }

    /// All items, newest first
    pub fn all(&self) -> Vec<&ContentItem> {
        let mut items: Vec<_> = self.items.values().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        items
    }

    /// Items of one type, newest first
    pub fn by_type(&self, content_type: ContentType) -> Vec<&ContentItem> {
        self.all()
            .into_iter()
            .filter(|item| item.content_type == content_type)
            .collect()
    }

    /// Every item whose id is not excluded, in id order
    pub fn excluding(&self, excluded: &HashSet<ContentId>) -> Vec<ContentItem> {
        self.items
            .values()
            .filter(|item| !excluded.contains(&item.id))
            .cloned()
            .collect()
    }

    /// Check the catalog for structural problems
    pub fn validate(&self) -> Vec<String> {
        let mut errors: Vec<String> = self
            .duplicates
            .iter()
            .map(|id| format!("Content id {} appears more than once", id))
            .collect();

        for (id, item) in &self.items {
            if *id <= 0 {
                errors.push(format!("Content id {} is not positive", id));
            }
            if item.title.trim().is_empty() {
                errors.push(format!("Content {} has empty title", id));
            }
            if item.content_type == ContentType::Video && item.video_url.is_none() {
                errors.push(format!("Video {} has no video_url", id));
            }
            if let Some(quiz) = &item.quiz_data {
                if let Err(e) = serde_json::from_str::<serde_json::Value>(quiz) {
                    errors.push(format!("Quiz {} has invalid quiz_data: {}", id, e));
                }
            }
            if item.content_type == ContentType::Quiz && item.quiz_data.is_none() {
                errors.push(format!("Quiz {} has no quiz_data", id));
            }
        }

        errors
    }
}

fn seeded_at(days_before: i64) -> DateTime<Utc> {
    let base = Utc
        .with_ymd_and_hms(2025, 1, 15, 9, 0, 0)
        .single()
        .unwrap_or_default();
    base - Duration::days(days_before)
}

fn tags(list: &str) -> Vec<String> {
    list.split(',').map(|t| t.trim().to_string()).collect()
}

fn article(id: ContentId, title: &str, body: &str, tag_list: &str, days: i64) -> ContentItem {
    ContentItem {
        id,
        title: title.into(),
        content_type: ContentType::Article,
        body: body.into(),
        tags: tags(tag_list),
        created_at: seeded_at(days),
        video_url: None,
        quiz_data: None,
    }
}

fn video(id: ContentId, title: &str, body: &str, url: &str, tag_list: &str, days: i64) -> ContentItem {
    ContentItem {
        video_url: Some(url.into()),
        content_type: ContentType::Video,
        ..article(id, title, body, tag_list, days)
    }
}

fn quiz(
    id: ContentId,
    title: &str,
    body: &str,
    questions: serde_json::Value,
    tag_list: &str,
    days: i64,
) -> ContentItem {
    ContentItem {
        quiz_data: Some(json!({ "questions": questions }).to_string()),
        content_type: ContentType::Quiz,
        ..article(id, title, body, tag_list, days)
    }
}

fn build_seed_catalog() -> Catalog {
    Catalog::new(vec![
        // Articles
        article(
            1,
            "Understanding RESTful APIs: A Beginner's Guide",
            "REST is an architectural style for networked applications. A RESTful API \
             uses stateless HTTP requests (GET, POST, PUT, DELETE) against meaningful \
             resource URLs and answers with appropriate status codes.",
            "API, REST, Web Development, Backend",
            5,
        ),
        article(
            2,
            "Docker Containers Explained: From Zero to Hero",
            "Docker packages an application with its dependencies into an image. \
             Containers are running instances of images, isolated yet lightweight \
             because they share the host kernel.",
            "Docker, DevOps, Containers, Infrastructure",
            4,
        ),
        article(
            3,
            "Async/Await in JavaScript: Mastering Asynchronous Programming",
            "Async functions return promises; await pauses the function until a \
             promise settles. Combine with try/catch for errors and Promise.all for \
             concurrent work.",
            "JavaScript, Async, Programming, Frontend",
            3,
        ),
        article(
            4,
            "Git Workflow: Branching Strategies for Teams",
            "Feature branches, GitFlow and trunk-based development trade review \
             overhead against integration speed. Pick one and keep branches short-lived.",
            "Git, Version Control, DevOps, Collaboration",
            2,
        ),
        article(
            5,
            "Microservices Architecture: When and How to Use It",
            "Microservices split a system into independently deployable services. \
             They pay off for large teams and uneven scaling needs, and cost \
             operational complexity everywhere else.",
            "Architecture, Microservices, Backend, System Design",
            1,
        ),
        // Videos
        video(
            6,
            "Introduction to React Hooks",
            "Manage state and side effects in functional components with useState, \
             useEffect, useContext and custom hooks.",
            "https://www.youtube.com/watch?v=demo-react-hooks",
            "React, Hooks, Frontend, JavaScript",
            5,
        ),
        video(
            7,
            "Building REST APIs with ASP.NET Core",
            "Controllers, routing, dependency injection and best practices for \
             RESTful services on ASP.NET Core.",
            "https://www.youtube.com/watch?v=demo-aspnet-api",
            "ASP.NET, C#, API, Backend",
            4,
        ),
        video(
            8,
            "Kotlin Coroutines Deep Dive",
            "Suspend functions, coroutine scopes, channels and flow for asynchronous \
             Kotlin.",
            "https://www.youtube.com/watch?v=demo-kotlin-coroutines",
            "Kotlin, Coroutines, Android, Asynchronous",
            3,
        ),
        video(
            9,
            "Database Design Fundamentals",
            "Normalization, relationships, indexing and query optimization for \
             backend developers.",
            "https://www.youtube.com/watch?v=demo-database-design",
            "Database, SQL, Design, Backend",
            2,
        ),
        // Quizzes
        quiz(
            10,
            "JavaScript Fundamentals Quiz",
            "Variables, functions, closures and ES6+ features.",
            json!([
                {
                    "question": "What is the output of: console.log(typeof null)",
                    "options": ["null", "object", "undefined", "boolean"],
                    "correct": 1
                },
                {
                    "question": "What is a closure in JavaScript?",
                    "options": [
                        "A function that returns another function",
                        "A function that has access to variables in its outer scope",
                        "A way to hide variables",
                        "A type of loop"
                    ],
                    "correct": 1
                }
            ]),
            "JavaScript, Quiz, Programming, Fundamentals",
            5,
        ),
        quiz(
            11,
            "SQL Database Quiz",
            "Queries, joins, indexes and database optimization.",
            json!([
                {
                    "question": "What is the purpose of an INDEX in a database?",
                    "options": [
                        "To speed up data retrieval",
                        "To enforce foreign keys",
                        "To back up tables",
                        "To encrypt columns"
                    ],
                    "correct": 0
                },
                {
                    "question": "What does ACID stand for in database transactions?",
                    "options": [
                        "Atomicity, Consistency, Isolation, Durability",
                        "Access, Control, Integrity, Data",
                        "Async, Cached, Indexed, Distributed",
                        "None of the above"
                    ],
                    "correct": 0
                }
            ]),
            "SQL, Database, Quiz, Backend",
            4,
        ),
        quiz(
            12,
            "Docker & Containerization Quiz",
            "Images, containers, Dockerfiles and compose.",
            json!([
                {
                    "question": "What is the difference between a Docker image and a container?",
                    "options": [
                        "An image is a template, a container is a running instance",
                        "They are the same thing",
                        "A container is a template, an image is a running instance",
                        "Images only exist on Docker Hub"
                    ],
                    "correct": 0
                }
            ]),
            "Docker, Containers, DevOps, Quiz",
            3,
        ),
        quiz(
            13,
            "API Design Best Practices Quiz",
            "Status codes, versioning and HTTP verbs.",
            json!([
                {
                    "question": "Which HTTP status code should be returned when a resource is successfully created?",
                    "options": ["200", "201", "204", "302"],
                    "correct": 1
                },
                {
                    "question": "Which HTTP method should be used to update an existing resource?",
                    "options": ["GET", "POST", "PUT", "DELETE"],
                    "correct": 2
                }
            ]),
            "API, REST, Web Development, Quiz",
            2,
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_catalog_contents() {
        let catalog = seed_catalog();
        assert_eq!(catalog.len(), 13);
        assert_eq!(catalog.by_type(ContentType::Article).len(), 5);
        assert_eq!(catalog.by_type(ContentType::Video).len(), 4);
        assert_eq!(catalog.by_type(ContentType::Quiz).len(), 4);
    }

    #[test]
    fn test_seed_catalog_validates() {
        let errors = seed_catalog().validate();
        assert!(
            errors.is_empty(),
            "Seed catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_all_is_newest_first() {
        let all = seed_catalog().all();
        for pair in all.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
        assert_eq!(all[0].id, 5);
    }

    #[test]
    fn test_excluding() {
        let excluded: HashSet<ContentId> = [1, 2, 3].into_iter().collect();
        let remaining = seed_catalog().excluding(&excluded);
        assert_eq!(remaining.len(), 10);
        assert!(remaining.iter().all(|item| !excluded.contains(&item.id)));
    }

    #[test]
    fn test_load_or_seed_prefers_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("catalog.json");

        let seeded = Catalog::load_or_seed(&path).unwrap();
        assert_eq!(seeded.len(), 13);

        let custom = vec![seed_catalog().get(6).cloned().unwrap()];
        std::fs::write(&path, serde_json::to_string(&custom).unwrap()).unwrap();

        let loaded = Catalog::load_or_seed(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains(6));
    }

    #[test]
    fn test_validate_flags_problems() {
        let mut broken = seed_catalog().get(10).cloned().unwrap();
        broken.quiz_data = Some("{ not json".into());
        let mut untitled = seed_catalog().get(1).cloned().unwrap();
        untitled.title = "  ".into();

        let errors = Catalog::new(vec![broken, untitled]).validate();
        assert_eq!(errors.len(), 2, "{:?}", errors);
    }

    #[test]
    fn test_duplicate_ids_reported() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("catalog.json");
        let first = seed_catalog().get(1).cloned().unwrap();
        let mut second = seed_catalog().get(2).cloned().unwrap();
        second.id = 1;
        std::fs::write(&path, serde_json::to_string(&vec![first.clone(), second]).unwrap())
            .unwrap();

        let catalog = Catalog::load_from(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(1), Some(&first));

        let errors = catalog.validate();
        assert_eq!(errors, vec!["Content id 1 appears more than once".to_string()]);
    }
}
