//! Field tree view of profile data and the dotted-path resolver.
//!
//! Profiles expose their data as a [`FieldValue::Object`] tree so schema paths such as
//! `location.city` can be resolved without knowing the concrete role type. Completeness is a
//! uniform rule over that tree; see [`FieldValue::is_complete`].

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

/// Maximum number of segments a field path may contain.
pub const MAX_PATH_DEPTH: usize = 8;

/// Nested objects deeper than this are treated as incomplete.
pub const MAX_NESTING_DEPTH: usize = 16;

/// Typed value of a single profile field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Bool(bool),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    List(Vec<FieldValue>),
    Object(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Build an object node from `(key, value)` pairs.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, FieldValue)>,
    {
        FieldValue::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }

    /// Build a list node from anything convertible into field values.
    pub fn list<T, I>(items: I) -> Self
    where
        T: Into<FieldValue>,
        I: IntoIterator<Item = T>,
    {
        FieldValue::List(items.into_iter().map(Into::into).collect())
    }

    /// Look up a direct child of an object node.
    pub fn child(&self, key: &str) -> Option<&FieldValue> {
        match self {
            FieldValue::Object(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Apply the completeness rule:
    ///
    /// - `Null` is incomplete.
    /// - Lists are complete when non-empty. Elements are not inspected.
    /// - Dates and timestamps are always complete.
    /// - Objects are complete when at least one property is complete.
    /// - Text is complete when it has non-whitespace content.
    /// - Integers and booleans are complete, including `0` and `false`.
    pub fn is_complete(&self) -> bool {
        is_complete_within(self, 0)
    }
}

fn is_complete_within(value: &FieldValue, depth: usize) -> bool {
    match value {
        FieldValue::Null => false,
        FieldValue::List(items) => !items.is_empty(),
        FieldValue::Date(_) | FieldValue::Timestamp(_) => true,
        FieldValue::Object(entries) => {
            depth < MAX_NESTING_DEPTH
                && entries
                    .values()
                    .any(|entry| is_complete_within(entry, depth + 1))
        }
        FieldValue::Text(text) => !text.trim().is_empty(),
        FieldValue::Integer(_) | FieldValue::Bool(_) => true,
    }
}

/// Completeness of a possibly missing value. A missing field is incomplete.
pub fn is_complete(value: Option<&FieldValue>) -> bool {
    value.map(FieldValue::is_complete).unwrap_or(false)
}

/// Walk `path` (dot separated) from `root`.
///
/// Returns `None` when a segment is absent, when an intermediate node is not an object, when
/// the path has an empty segment, or when it is deeper than [`MAX_PATH_DEPTH`].
pub fn resolve<'a>(root: &'a FieldValue, path: &str) -> Option<&'a FieldValue> {
    let segments = path_segments(path)?;
    segments
        .into_iter()
        .try_fold(root, |node, segment| node.child(segment))
}

/// Split a path into segments, rejecting malformed paths.
pub fn path_segments(path: &str) -> Option<Vec<&str>> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.len() > MAX_PATH_DEPTH || segments.iter().any(|segment| segment.is_empty()) {
        return None;
    }
    Some(segments)
}

/// Implemented by anything that can present itself as a field tree.
pub trait FieldTree {
    fn field_tree(&self) -> FieldValue;
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::Text(value.clone())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<u8> for FieldValue {
    fn from(value: u8) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl<T> From<Option<T>> for FieldValue
where
    T: Into<FieldValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}
