//! Core types exchanged between plugins and the kernel.
//!
//! Item queries, query results, and the content-type aggregate all
//! serialize to JSON so they can be stored in transients as-is.

use serde::{Deserialize, Serialize};

/// Publication status filter for item queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    /// Published items only.
    #[default]
    Published,
    /// Every status (published, draft, pending, private, ...).
    Any,
}

/// Comparison operators for date conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compare {
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessOrEqual,
}

impl Compare {
    /// Apply the operator as `left <op> right`.
    pub fn matches(self, left: u32, right: u32) -> bool {
        match self {
            Compare::Equal => left == right,
            Compare::NotEqual => left != right,
            Compare::GreaterThan => left > right,
            Compare::GreaterOrEqual => left >= right,
            Compare::LessThan => left < right,
            Compare::LessOrEqual => left <= right,
        }
    }
}

/// A condition on the hour-of-day an item was created.
///
/// Each condition in a query is evaluated on its own against the item's
/// creation hour; multiple conditions are AND-combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCondition {
    /// Hour of day, 0-23.
    pub hour: u32,
    #[serde(rename = "compare")]
    pub cmp: Compare,
}

impl DateCondition {
    pub fn hour(hour: u32, cmp: Compare) -> Self {
        Self { hour, cmp }
    }

    /// Whether an item created at `item_hour` satisfies this condition.
    pub fn matches(&self, item_hour: u32) -> bool {
        self.cmp.matches(item_hour, self.hour)
    }
}

/// Which term property a taxonomy condition matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermField {
    Slug,
    Name,
}

/// A taxonomy term attached to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub taxonomy: String,
    pub slug: String,
    pub name: String,
}

/// Require items to carry at least one of `terms` in `taxonomy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyCondition {
    pub taxonomy: String,
    pub field: TermField,
    pub terms: Vec<String>,
}

impl TaxonomyCondition {
    pub fn new(taxonomy: &str, field: TermField, term: &str) -> Self {
        Self {
            taxonomy: taxonomy.into(),
            field,
            terms: vec![term.into()],
        }
    }

    /// Whether any of `item_terms` satisfies this condition.
    pub fn matches(&self, item_terms: &[Term]) -> bool {
        item_terms
            .iter()
            .filter(|t| t.taxonomy == self.taxonomy)
            .any(|t| {
                let value = match self.field {
                    TermField::Slug => &t.slug,
                    TermField::Name => &t.name,
                };
                self.terms.iter().any(|wanted| wanted == value)
            })
    }
}

/// Declarative item query handed to the host's query engine.
///
/// All populated conditions are AND-combined. `limit: None` is an
/// unbounded fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemQuery {
    pub item_types: Vec<String>,
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub date_conditions: Vec<DateCondition>,
    #[serde(default)]
    pub taxonomy_conditions: Vec<TaxonomyCondition>,
    /// Item IDs to leave out of the result.
    #[serde(default)]
    pub exclude_ids: Vec<u64>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl ItemQuery {
    /// Query for items of a single content type.
    pub fn of_type(item_type: &str) -> Self {
        Self::of_types(&[item_type])
    }

    /// Query for items of several content types.
    pub fn of_types(item_types: &[&str]) -> Self {
        Self {
            item_types: item_types.iter().map(|t| (*t).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn date(mut self, condition: DateCondition) -> Self {
        self.date_conditions.push(condition);
        self
    }

    pub fn taxonomy(mut self, condition: TaxonomyCondition) -> Self {
        self.taxonomy_conditions.push(condition);
        self
    }

    pub fn exclude(mut self, id: u64) -> Self {
        self.exclude_ids.push(id);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// The minimal item record a query returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub id: u64,
    pub title: String,
}

/// Outcome of an item query.
///
/// `found` is the total number of matches; `items` may be shorter when
/// the query was limited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    pub found: u64,
    pub items: Vec<ItemSummary>,
}

impl QueryResult {
    /// Whether the query returned any items to iterate.
    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }
}

/// Item count for one content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTypeCount {
    pub item_type: String,
    pub count: u64,
}
