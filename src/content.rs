//! Content records and the read-only data source the engines sample from.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::random::{shuffle, RandomSource};
use crate::{Error, Result};

// Column names used by the exported spreadsheets, in fallback order.
const CATEGORY_KEYS: &[&str] = &["category", "주제", "대주제"];
const SUBCATEGORY_KEYS: &[&str] = &["subcategory", "직종", "직군"];
const TEXT_KEYS: &[&str] = &["text", "멘트"];
const SOURCE_KEYS: &[&str] = &["source", "출처"];
const SECTOR_KEYS: &[&str] = &["sector", "업종"];

/// One immutable quote record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub category: String,
    pub subcategory: String,
    pub text: String,
    pub source: String,
    /// Industry the speaker works in; empty when the export has no sector column.
    #[serde(default)]
    pub sector: String,
}

impl ContentItem {
    pub fn new(
        category: impl Into<String>,
        subcategory: impl Into<String>,
        text: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            subcategory: subcategory.into(),
            text: text.into(),
            source: source.into(),
            sector: String::new(),
        }
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = sector.into();
        self
    }

    /// Build an item from a loosely keyed record.
    ///
    /// Each field takes the first non-empty value among its accepted keys, so
    /// records exported with either English or Korean column names load.
    pub fn from_record(record: &Map<String, Value>) -> Self {
        Self {
            category: first_field(record, CATEGORY_KEYS),
            subcategory: first_field(record, SUBCATEGORY_KEYS),
            text: first_field(record, TEXT_KEYS),
            source: first_field(record, SOURCE_KEYS),
            sector: first_field(record, SECTOR_KEYS),
        }
    }

    /// Short label shown on a feed card, e.g. `"Wages · Courier"`.
    pub fn label(&self) -> String {
        format!("{} · {}", self.category, self.subcategory)
    }

    /// Header shown on a stack card: `"{sector}-{subcategory}"`.
    pub fn stack_header(&self) -> String {
        format!("{}-{}", self.sector, self.subcategory)
    }
}

fn first_field(record: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| record.get(*k))
        .map(|v| match v {
            Value::String(s) => s.trim().to_string(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

/// Full content surfaced to a detail view when a card is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDetail {
    pub content: Arc<ContentItem>,
    /// `"{category} ({subcategory})"`
    pub category_line: String,
    /// The text wrapped in double quotes
    pub quote: String,
    /// `"— {source}"`
    pub source_line: String,
}

impl CardDetail {
    pub fn from_content(content: Arc<ContentItem>) -> Self {
        let category_line = format!("{} ({})", content.category, content.subcategory);
        let quote = format!("\"{}\"", content.text);
        let source_line = format!("— {}", content.source);
        Self {
            content,
            category_line,
            quote,
            source_line,
        }
    }
}

/// Finite, fully resident sequence of content items.
///
/// Cloning is cheap; clones share the same items.
#[derive(Debug, Clone, Default)]
pub struct DataSource {
    items: Arc<Vec<Arc<ContentItem>>>,
}

impl DataSource {
    pub fn from_items(items: Vec<ContentItem>) -> Self {
        Self {
            items: Arc::new(items.into_iter().map(Arc::new).collect()),
        }
    }

    /// Parse either a bare array of records or an inline-data object whose
    /// `quotes` field holds the array.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let records = match &value {
            Value::Array(records) => records,
            Value::Object(obj) => match obj.get("quotes") {
                Some(Value::Array(records)) => records,
                Some(_) => return Err(Error::DataError("`quotes` must be an array".into())),
                None => return Err(Error::DataError("object has no `quotes` array".into())),
            },
            _ => {
                return Err(Error::DataError(
                    "expected an array of records or an object with `quotes`".into(),
                ))
            }
        };

        let mut items = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            match record {
                Value::Object(map) => items.push(ContentItem::from_record(map)),
                _ => return Err(Error::DataError(format!("record {} is not an object", i))),
            }
        }
        log::debug!("loaded {} content items", items.len());
        Ok(Self::from_items(items))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<ContentItem>> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ContentItem>> {
        self.items.iter()
    }

    /// Uniform sample with replacement.
    pub fn sample<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Option<Arc<ContentItem>> {
        rng.pick_index(self.items.len())
            .and_then(|i| self.items.get(i))
            .cloned()
    }

    /// A reordered copy of this source (items are shared, not cloned).
    pub fn shuffled<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Self {
        Self {
            items: Arc::new(shuffle(&self.items, rng)),
        }
    }
}

/// Facet filter: OR within a facet, AND across facets. An empty facet
/// matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFilter {
    #[serde(default)]
    pub sectors: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub subcategories: Vec<String>,
}

impl ContentFilter {
    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty() && self.categories.is_empty() && self.subcategories.is_empty()
    }

    pub fn toggle_sector(&mut self, value: &str) {
        toggle(&mut self.sectors, value);
    }

    /// Add the category if absent, remove it if present.
    pub fn toggle_category(&mut self, value: &str) {
        toggle(&mut self.categories, value);
    }

    pub fn toggle_subcategory(&mut self, value: &str) {
        toggle(&mut self.subcategories, value);
    }

    pub fn matches(&self, item: &ContentItem) -> bool {
        facet_matches(&self.sectors, &item.sector)
            && facet_matches(&self.categories, &item.category)
            && facet_matches(&self.subcategories, &item.subcategory)
    }

    /// Indices into `source` of the matching items, in source order.
    pub fn matching_indices(&self, source: &DataSource) -> Vec<usize> {
        source
            .iter()
            .enumerate()
            .filter(|(_, item)| self.matches(item))
            .map(|(i, _)| i)
            .collect()
    }
}

fn toggle(values: &mut Vec<String>, value: &str) {
    if let Some(pos) = values.iter().position(|v| v == value) {
        values.remove(pos);
    } else {
        values.push(value.to_string());
    }
}

fn facet_matches(selected: &[String], value: &str) -> bool {
    selected.is_empty() || selected.iter().any(|s| s == value)
}
