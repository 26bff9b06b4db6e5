//! Front-matter validation
//!
//! A document is publishable only when `title`, `date`, `description` and
//! `tags` are all present and well-formed. Everything else the author wrote
//! is kept in [`FrontMatter::extra`] without interpretation.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::Value;

use super::frontmatter::Metadata;
use crate::error::{FailureReason, ValidationFailure};

/// Keys with a defined meaning; all of them are required
pub const RESERVED_KEYS: [&str; 4] = ["title", "date", "description", "tags"];

/// Validated front-matter of a publishable document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontMatter {
    pub title: String,
    /// Date exactly as written by the author
    pub date: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Parsed form of `date`, used for ordering
    #[serde(skip)]
    pub published: NaiveDateTime,
    /// Additional author-supplied keys, in source order
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl FrontMatter {
    /// Calendar day the post was published on
    pub fn day(&self) -> NaiveDate {
        self.published.date()
    }
}

/// Check decoded metadata against the publishable invariant
pub fn validate(metadata: &Metadata) -> Result<FrontMatter, ValidationFailure> {
    let title = required_text(metadata, "title")?;
    let date = required_text(metadata, "date")?;
    let published = parse_date_string(&date)
        .ok_or_else(|| ValidationFailure::new("date", FailureReason::BadDate(date.clone())))?;
    let description = required_text(metadata, "description")?;
    let tags = required_tags(metadata)?;

    let extra = metadata
        .iter()
        .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(FrontMatter {
        title,
        date,
        description,
        tags,
        published,
        extra,
    })
}

fn required<'a>(metadata: &'a Metadata, field: &str) -> Result<&'a Value, ValidationFailure> {
    match metadata.get(field) {
        None | Some(Value::Null) => Err(ValidationFailure::new(field, FailureReason::Missing)),
        Some(value) => Ok(value),
    }
}

fn required_text(metadata: &Metadata, field: &str) -> Result<String, ValidationFailure> {
    let value = required(metadata, field)?;
    let text = scalar_text(value)
        .ok_or_else(|| ValidationFailure::new(field, FailureReason::WrongType("a string")))?;
    if text.trim().is_empty() {
        return Err(ValidationFailure::new(field, FailureReason::Empty));
    }
    Ok(text)
}

fn required_tags(metadata: &Metadata) -> Result<Vec<String>, ValidationFailure> {
    let wrong_type = || ValidationFailure::new("tags", FailureReason::WrongType("a list of strings"));

    let Value::Sequence(items) = required(metadata, "tags")? else {
        return Err(wrong_type());
    };
    if items.is_empty() {
        return Err(ValidationFailure::new("tags", FailureReason::Empty));
    }

    items
        .iter()
        .map(|item| match scalar_text(item) {
            Some(tag) if !tag.trim().is_empty() => Ok(tag),
            _ => Err(wrong_type()),
        })
        .collect()
}

/// Strings, numbers and booleans all read naturally as text in front-matter
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}

/// Parse a date string in various formats
pub fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // RFC 3339 / ISO 8601 with offset, normalized to UTC
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_utc())
}
