//! The two cached aggregates behind the block.
//!
//! Each aggregate lives in its own transient. A miss (absent, expired, or
//! undecodable) rebuilds it synchronously and stores it again before use.
//! Concurrent misses each rebuild; the last write wins.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use site_counts_sdk::prelude::*;

/// Transient holding the per-content-type counts.
pub const SITE_COUNTS_KEY: &str = "xwp_site_counts";

/// Transient holding the filtered item query result.
pub const POST_COUNTS_KEY: &str = "xwp_post_counts";

/// Lifetime of both transients.
pub const TRANSIENT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Tag slug the filtered listing requires.
pub const TAG_SLUG: &str = "foo";

/// Category name the filtered listing requires.
pub const CATEGORY_NAME: &str = "baz";

/// Item counts for every public content type, in registry order.
pub(crate) fn content_type_counts(
    services: &HostServices,
) -> Result<Vec<ContentTypeCount>, HostError> {
    cached(services.transients.as_ref(), SITE_COUNTS_KEY, || {
        build_content_type_counts(services)
    })
}

fn build_content_type_counts(services: &HostServices) -> Result<Vec<ContentTypeCount>, HostError> {
    let mut counts: Vec<ContentTypeCount> = Vec::new();

    for item_type in services.content_types.public_content_types()? {
        let query = ItemQuery::of_type(&item_type).status(StatusFilter::Any);
        let count = services.items.count(&query)?;

        match counts.iter_mut().find(|c| c.item_type == item_type) {
            Some(existing) => existing.count = count,
            None => counts.push(ContentTypeCount { item_type, count }),
        }
    }

    Ok(counts)
}

/// The fixed query behind the item listing.
///
/// Posts and pages in any status, created between 09:00 and 17:59, tagged
/// `foo` and categorized `baz`. The item being displayed is not excluded.
pub fn filtered_query() -> ItemQuery {
    ItemQuery::of_types(&["post", "page"])
        .status(StatusFilter::Any)
        .date(DateCondition::hour(9, Compare::GreaterOrEqual))
        .date(DateCondition::hour(17, Compare::LessOrEqual))
        .taxonomy(TaxonomyCondition::new("post_tag", TermField::Slug, TAG_SLUG))
        .taxonomy(TaxonomyCondition::new("category", TermField::Name, CATEGORY_NAME))
}

/// Result of [`filtered_query`].
pub(crate) fn filtered_items(services: &HostServices) -> Result<QueryResult, HostError> {
    cached(services.transients.as_ref(), POST_COUNTS_KEY, || {
        services.items.query(&filtered_query())
    })
}

/// Read `key` as JSON, or build the value and store it for [`TRANSIENT_TTL`].
fn cached<T, F>(store: &dyn TransientStore, key: &str, build: F) -> Result<T, HostError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<T, HostError>,
{
    if let Some(raw) = store.get(key)? {
        match serde_json::from_str(&raw) {
            Ok(value) => return Ok(value),
            Err(e) => warn!(key = %key, error = %e, "discarding undecodable transient"),
        }
    }

    let value = build()?;
    store.set(key, &serde_json::to_string(&value)?, TRANSIENT_TTL)?;
    debug!(key = %key, "transient rebuilt");
    Ok(value)
}
