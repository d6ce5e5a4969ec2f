//! Site Counts test utilities.
//!
//! In-memory stand-ins for the host's content-type registry and item
//! query engine, item fixture builders, and assertion helpers.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Timelike, Utc};
use parking_lot::RwLock;

use site_counts_sdk::HostError;
use site_counts_sdk::host::{ContentTypeSource, ItemQueryService, TransientStore};
use site_counts_sdk::types::{ItemQuery, ItemSummary, QueryResult, StatusFilter, Term};

/// Status string for published items.
pub const STATUS_PUBLISH: &str = "publish";

/// Create a published test item created at noon UTC on 2024-01-15.
pub fn test_item(id: u64, item_type: &str, title: &str) -> TestItem {
    TestItem {
        id,
        item_type: item_type.to_string(),
        title: title.to_string(),
        status: STATUS_PUBLISH.to_string(),
        created: Utc
            .with_ymd_and_hms(2024, 1, 15, 12, 0, 0)
            .single()
            .unwrap_or_default(),
        terms: Vec::new(),
    }
}

/// A test item builder for creating fixtures.
#[derive(Debug, Clone)]
pub struct TestItem {
    pub id: u64,
    pub item_type: String,
    pub title: String,
    pub status: String,
    pub created: DateTime<Utc>,
    pub terms: Vec<Term>,
}

impl TestItem {
    /// Set an arbitrary status ("draft", "private", ...).
    pub fn with_status(mut self, status: &str) -> Self {
        self.status = status.to_string();
        self
    }

    /// Set as draft.
    pub fn draft(self) -> Self {
        self.with_status("draft")
    }

    /// Set the creation time.
    pub fn created(mut self, created: DateTime<Utc>) -> Self {
        self.created = created;
        self
    }

    /// Move the creation time to `hour` on the same day.
    pub fn created_at_hour(mut self, hour: u32) -> Self {
        if let Some(at) = self.created.with_hour(hour) {
            self.created = at;
        }
        self
    }

    /// Attach a `post_tag` term whose slug and name are both `slug`.
    pub fn tagged(self, slug: &str) -> Self {
        self.with_term("post_tag", slug, slug)
    }

    /// Attach a `category` term with the given display name.
    pub fn in_category(self, name: &str) -> Self {
        let slug = name.to_lowercase().replace(' ', "-");
        self.with_term("category", &slug, name)
    }

    /// Attach an arbitrary term.
    pub fn with_term(mut self, taxonomy: &str, slug: &str, name: &str) -> Self {
        self.terms.push(Term {
            taxonomy: taxonomy.to_string(),
            slug: slug.to_string(),
            name: name.to_string(),
        });
        self
    }

    /// Whether this item satisfies every condition of `query`.
    ///
    /// The limit is not considered here.
    pub fn matches(&self, query: &ItemQuery) -> bool {
        let type_ok = query.item_types.is_empty() || query.item_types.contains(&self.item_type);
        let status_ok = match query.status {
            StatusFilter::Any => true,
            StatusFilter::Published => self.status == STATUS_PUBLISH,
        };
        let hour = self.created.hour();

        type_ok
            && status_ok
            && !query.exclude_ids.contains(&self.id)
            && query.date_conditions.iter().all(|c| c.matches(hour))
            && query
                .taxonomy_conditions
                .iter()
                .all(|c| c.matches(&self.terms))
    }
}

/// In-memory site: content types plus items, with call counters.
///
/// Implements both [`ContentTypeSource`] and [`ItemQueryService`].
#[derive(Debug, Default)]
pub struct FakeSite {
    content_types: RwLock<Vec<(String, bool)>>,
    items: RwLock<Vec<TestItem>>,
    type_calls: AtomicUsize,
    count_calls: AtomicUsize,
    query_calls: AtomicUsize,
    fail_queries: AtomicBool,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a content type.
    pub fn with_content_type(self, name: &str, public: bool) -> Self {
        self.content_types.write().push((name.to_string(), public));
        self
    }

    /// Declare several public content types.
    pub fn with_public_types(self, names: &[&str]) -> Self {
        names
            .iter()
            .fold(self, |site, name| site.with_content_type(name, true))
    }

    pub fn with_item(self, item: TestItem) -> Self {
        self.add_item(item);
        self
    }

    /// Add `n` published items of `item_type` with sequential IDs from `first_id`.
    pub fn with_items_of_type(self, item_type: &str, first_id: u64, n: u64) -> Self {
        (first_id..first_id + n).fold(self, |site, id| {
            site.with_item(test_item(id, item_type, &format!("{item_type} {id}")))
        })
    }

    pub fn add_item(&self, item: TestItem) {
        self.items.write().push(item);
    }

    /// Make every subsequent count/query call fail.
    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Number of `public_content_types` calls so far.
    pub fn type_calls(&self) -> usize {
        self.type_calls.load(Ordering::SeqCst)
    }

    /// Number of `count` calls so far.
    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }

    /// Number of `query` calls so far.
    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), HostError> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(HostError::Query("query engine unavailable".into()));
        }
        Ok(())
    }
}

impl ContentTypeSource for FakeSite {
    fn public_content_types(&self) -> Result<Vec<String>, HostError> {
        self.type_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .content_types
            .read()
            .iter()
            .filter(|(_, public)| *public)
            .map(|(name, _)| name.clone())
            .collect())
    }
}

impl ItemQueryService for FakeSite {
    fn count(&self, query: &ItemQuery) -> Result<u64, HostError> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let items = self.items.read();
        Ok(items.iter().filter(|i| i.matches(query)).count() as u64)
    }

    fn query(&self, query: &ItemQuery) -> Result<QueryResult, HostError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let items = self.items.read();
        let matched: Vec<&TestItem> = items.iter().filter(|i| i.matches(query)).collect();
        let limit = query.limit.map_or(usize::MAX, |l| l as usize);

        Ok(QueryResult {
            found: matched.len() as u64,
            items: matched
                .into_iter()
                .take(limit)
                .map(|i| ItemSummary {
                    id: i.id,
                    title: i.title.clone(),
                })
                .collect(),
        })
    }
}

/// Transient store whose every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingTransients;

impl TransientStore for FailingTransients {
    fn get(&self, _key: &str) -> Result<Option<String>, HostError> {
        Err(HostError::Cache("transient backend offline".into()))
    }

    fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), HostError> {
        Err(HostError::Cache("transient backend offline".into()))
    }

    fn delete(&self, _key: &str) -> Result<(), HostError> {
        Err(HostError::Cache("transient backend offline".into()))
    }
}

/// Assertion helpers for rendered markup.
pub mod assert {
    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that `needle` occurs exactly `n` times.
    pub fn occurrences(haystack: &str, needle: &str, n: usize) {
        let found = haystack.matches(needle).count();
        assert_eq!(
            found, n,
            "Expected '{needle}' {n} time(s), found {found}\nActual: {haystack}"
        );
    }
}
