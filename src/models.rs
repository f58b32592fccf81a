use crate::error::CaraError;
use log::debug;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const FOOD_ENTRY_TYPE: &str = "food";

/// One logged diary record (food, activity, symptom, ...).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiaryEntry {
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(rename = "userDateTracking")]
    pub user_date_tracking: String,
    #[serde(rename = "mealItems", default, deserialize_with = "null_as_default")]
    pub meal_items: Vec<MealItem>,
    /// Remaining fields of the record, kept as sent by the dashboard.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MealItem {
    #[serde(rename = "hasImage", default, deserialize_with = "null_as_default")]
    pub has_image: bool,
    #[serde(rename = "realmIdString", default)]
    pub realm_id_string: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DiaryEntry {
    pub fn is_food(&self) -> bool {
        self.entry_type == FOOD_ENTRY_TYPE
    }

    /// Image ids of meal items flagged with `hasImage`, in source order.
    /// Empty for anything that is not a food entry.
    pub fn image_ids(&self) -> Vec<&str> {
        if !self.is_food() {
            return Vec::new();
        }
        self.meal_items
            .iter()
            .filter(|item| item.has_image)
            .filter_map(|item| item.realm_id_string.as_deref())
            .collect()
    }

    /// Text value of an extra field, for display in the report.
    pub fn text(&self, key: &str) -> Option<String> {
        self.extra.get(key).and_then(json_value_to_string)
    }
}

/// One page of the `data-points` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EntriesPage {
    pub results: Vec<DiaryEntry>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
}

impl EntriesPage {
    /// Whether the server reports more entries in the window than this page holds.
    pub fn is_truncated(&self) -> bool {
        let over_count = self
            .count
            .is_some_and(|count| count > self.results.len() as u64);
        over_count || self.next.as_deref().is_some_and(|next| !next.is_empty())
    }
}

/// Entries sharing one `userDateTracking` value, in the order they were fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup {
    pub date: String,
    pub entries: Vec<DiaryEntry>,
}

/// Day buckets ordered newest date first.
pub type GroupedEntries = Vec<DayGroup>;

/// Bucket entries by date, keeping fetch order inside a bucket, and order the
/// buckets by descending date string.
pub fn group_by_date(entries: Vec<DiaryEntry>) -> GroupedEntries {
    let mut buckets: BTreeMap<String, Vec<DiaryEntry>> = BTreeMap::new();
    for entry in entries {
        buckets
            .entry(entry.user_date_tracking.clone())
            .or_default()
            .push(entry);
    }
    debug!("Grouped entries into {} days", buckets.len());
    buckets
        .into_iter()
        .rev()
        .map(|(date, entries)| DayGroup { date, entries })
        .collect()
}

pub fn parse_entries_page(data: &str) -> Result<EntriesPage, CaraError> {
    let page: EntriesPage = serde_json::from_str(data).map_err(|_| CaraError::InvalidResponse)?;
    debug!("Parsed {} diary entries", page.results.len());
    Ok(page)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let raw: Option<T> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default())
}

fn json_value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
