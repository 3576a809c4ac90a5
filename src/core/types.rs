use super::value;
use super::{ListError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Filter name → value. Ordered so insertion order never changes request identity.
pub type Filters = BTreeMap<String, String>;

// ============================================================================
// SORT CRITERION
// ============================================================================

/// Client-selectable ordering of a list page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortCriterion {
    #[serde(rename = "price-asc")]
    PriceAsc,
    #[serde(rename = "price-desc")]
    PriceDesc,
    #[serde(rename = "duration-asc")]
    DurationAsc,
    #[serde(rename = "duration-desc")]
    DurationDesc,
}

impl SortCriterion {
    pub const ALL: [SortCriterion; 4] = [
        Self::PriceAsc,
        Self::PriceDesc,
        Self::DurationAsc,
        Self::DurationDesc,
    ];

    /// Record field compared by this criterion.
    pub fn field(&self) -> &'static str {
        match self {
            Self::PriceAsc | Self::PriceDesc => "price",
            Self::DurationAsc | Self::DurationDesc => "duration",
        }
    }

    pub fn is_descending(&self) -> bool {
        matches!(self, Self::PriceDesc | Self::DurationDesc)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::DurationAsc => "duration-asc",
            Self::DurationDesc => "duration-desc",
        }
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortCriterion {
    type Err = ListError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ListError::InvalidRequest(format!("Unknown sort criterion '{}'", s)))
    }
}

// ============================================================================
// PAGE REQUEST
// ============================================================================

/// Identifies one page of one resource list. Equal requests share a cache slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageRequest {
    pub resource: String,
    pub page_index: usize,
    pub page_size: usize,
    pub filters: Filters,
    pub sort: Option<SortCriterion>,
}

impl PageRequest {
    pub fn new(resource: impl Into<String>, page_index: usize, page_size: usize) -> Self {
        Self {
            resource: resource.into(),
            page_index,
            page_size,
            filters: Filters::new(),
            sort: None,
        }
    }

    pub fn filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(name.into(), value.into());
        self
    }

    pub fn sort(mut self, sort: SortCriterion) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.resource.trim().is_empty() {
            return Err(ListError::InvalidRequest("Resource name cannot be empty".into()));
        }
        if self.resource.contains('/') || self.resource.contains('?') {
            return Err(ListError::InvalidRequest(format!(
                "Resource name '{}' must be a single path segment",
                self.resource
            )));
        }
        if self.page_size == 0 {
            return Err(ListError::InvalidRequest("page_size must be > 0".into()));
        }
        Ok(())
    }

    /// Endpoint path of the resource collection.
    pub fn path(&self) -> String {
        format!("/{}", self.resource)
    }

    /// `page`, `size`, filters in name order, then `sort` when present.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 3);
        pairs.push(("page".to_string(), self.page_index.to_string()));
        pairs.push(("size".to_string(), self.page_size.to_string()));
        for (name, value) in &self.filters {
            pairs.push((name.clone(), value.clone()));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort".to_string(), sort.as_str().to_string()));
        }
        pairs
    }

    /// True when the two requests differ at most in `page_index`.
    pub fn same_query(&self, other: &PageRequest) -> bool {
        self.resource == other.resource
            && self.page_size == other.page_size
            && self.filters == other.filters
            && self.sort == other.sort
    }
}

impl fmt::Display for PageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[page={} size={}", self.resource, self.page_index, self.page_size)?;
        for (name, value) in &self.filters {
            write!(f, " {}={}", name, value)?;
        }
        if let Some(sort) = self.sort {
            write!(f, " sort={}", sort)?;
        }
        f.write_str("]")
    }
}

// ============================================================================
// RECORD
// ============================================================================

/// One opaque row of a resource list (a package, a user, a booking, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ListError::Decode(format!(
                "Expected a JSON object for a list item, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Row key: `_id` (plain or `{ "$oid": ... }`) or `id`.
    pub fn id(&self) -> Option<String> {
        let raw = self.0.get("_id").or_else(|| self.0.get("id"))?;
        match raw {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Object(map) => map.get("$oid").and_then(Value::as_str).map(str::to_string),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Numeric view of a field, see [`value::numeric`].
    pub fn number(&self, name: &str) -> f64 {
        value::numeric(self.0.get(name))
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

// ============================================================================
// PAGE RESPONSE
// ============================================================================

/// One page of records plus the server-side total.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse {
    pub items: Vec<Record>,
    pub total_count: u64,
}

const ITEM_FIELDS: [&str; 3] = ["items", "data", "result"];
const COUNT_FIELDS: [&str; 3] = ["count", "totalCount", "total"];

impl PageResponse {
    pub fn new(items: Vec<Record>, total_count: u64) -> Self {
        Self { items, total_count }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    /// `ceil(total_count / page_size)`; zero when there is nothing to show.
    pub fn total_pages(&self, page_size: usize) -> usize {
        total_pages(self.total_count, page_size)
    }

    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// Normalize a list endpoint body to a page.
    ///
    /// Accepts `{ items|data|result: [...], count|totalCount|total: n }`,
    /// `{ ..., totalPages: n }` (total becomes `n * page_size`), or a bare array.
    pub fn decode(body: &[u8], page_size: usize) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        Self::from_json(value, page_size)
    }

    pub fn from_json(value: Value, page_size: usize) -> Result<Self> {
        let (raw_items, total_count) = match value {
            Value::Array(items) => {
                let total = items.len() as u64;
                (items, total)
            }
            Value::Object(mut map) => {
                let items = ITEM_FIELDS
                    .iter()
                    .find_map(|key| map.remove(*key))
                    .ok_or_else(|| ListError::Decode("Response has no items array".into()))?;
                let items = match items {
                    Value::Array(items) => items,
                    other => {
                        return Err(ListError::Decode(format!(
                            "Expected items to be an array, got {}",
                            json_kind(&other)
                        )));
                    }
                };
                let total = Self::total_from(&map, page_size)?;
                (items, total)
            }
            other => {
                return Err(ListError::Decode(format!(
                    "Expected an object or array body, got {}",
                    json_kind(&other)
                )));
            }
        };

        if raw_items.len() > page_size {
            return Err(ListError::Decode(format!(
                "Page holds {} items but page size is {}",
                raw_items.len(),
                page_size
            )));
        }

        let items = raw_items
            .into_iter()
            .map(Record::from_value)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { items, total_count })
    }

    fn total_from(map: &Map<String, Value>, page_size: usize) -> Result<u64> {
        if let Some(raw) = COUNT_FIELDS.iter().find_map(|key| map.get(*key)) {
            return value::count(Some(raw))
                .ok_or_else(|| ListError::Decode(format!("Invalid item count: {}", raw)));
        }
        if let Some(raw) = map.get("totalPages") {
            let pages = value::count(Some(raw))
                .ok_or_else(|| ListError::Decode(format!("Invalid page count: {}", raw)))?;
            return Ok(pages.saturating_mul(page_size as u64));
        }
        Err(ListError::Decode("Response has no item count".into()))
    }
}

/// `ceil(total_count / page_size)`, zero for an empty list or a zero page size.
pub fn total_pages(total_count: u64, page_size: usize) -> usize {
    if total_count == 0 || page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size as u64) as usize
}

// ============================================================================
// LIST STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStatus {
    Idle,
    Loading,
    Success,
    Error,
}

impl fmt::Display for ListStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
