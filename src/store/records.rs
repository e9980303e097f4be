//! Record types and the normalization step from stored rows to canonical records

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use rusqlite::types::ValueRef;
use rusqlite::Row;
use serde::Serialize;
use serde_json::Value;

use super::schema::ChartSchema;
use crate::chart::{ChartPayload, Judgment};

pub const DEFAULT_CATEGORY: &str = "general";

/// A stored horary chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRecord {
    pub id: i64,
    pub question: String,
    pub location: String,
    pub timestamp: DateTime<Utc>,
    pub judgment: Judgment,
    pub confidence: u8,
    pub chart_payload: ChartPayload,
    pub notes: String,
    pub tags: Vec<String>,
    pub category: String,
}

impl ChartRecord {
    pub fn summary(&self) -> ChartSummary {
        ChartSummary {
            id: self.id,
            question: self.question.clone(),
            location: self.location.clone(),
            timestamp: self.timestamp,
            judgment: self.judgment,
            confidence: self.confidence,
            category: self.category.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// Flat chart view used by listings and exports
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSummary {
    pub id: i64,
    pub question: String,
    pub location: String,
    pub timestamp: DateTime<Utc>,
    pub judgment: Judgment,
    pub confidence: u8,
    pub category: String,
    pub tags: Vec<String>,
}

/// A free-form research note
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotebookEntry {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    /// Lookup-only reference; the chart may no longer exist
    pub chart_id: Option<i64>,
}

/// Mutable fields of a chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartAnnotations {
    pub notes: String,
    pub tags: Vec<String>,
    pub category: String,
}

impl Default for ChartAnnotations {
    fn default() -> Self {
        Self {
            notes: String::new(),
            tags: Vec::new(),
            category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

/// Optional fields of a notebook entry
#[derive(Debug, Clone, PartialEq)]
pub struct NoteAnnotations {
    pub category: String,
    pub tags: Vec<String>,
    pub chart_id: Option<i64>,
}

impl Default for NoteAnnotations {
    fn default() -> Self {
        Self {
            category: DEFAULT_CATEGORY.to_string(),
            tags: Vec::new(),
            chart_id: None,
        }
    }
}

// ============================================
// STORED ROWS
// ============================================

/// Columns shared by every version of the charts table
#[derive(Debug, Default)]
pub(crate) struct ChartColumns {
    pub id: i64,
    pub question: Option<String>,
    pub location: Option<String>,
    pub timestamp: Option<String>,
    pub judgment: Option<String>,
    pub confidence: Option<i64>,
    pub tags: Option<String>,
    pub chart_data: Option<String>,
    pub notes: Option<String>,
}

/// A chart row as read from disk, tagged by the table version it came from
#[derive(Debug)]
pub(crate) enum StoredChart {
    Legacy(ChartColumns),
    Current {
        columns: ChartColumns,
        category: Option<String>,
    },
}

impl StoredChart {
    /// Read a row selected with [`ChartSchema::summary_columns`]
    pub fn summary_from_row(schema: ChartSchema, row: &Row) -> rusqlite::Result<Self> {
        let columns = ChartColumns {
            id: row.get(0)?,
            question: column_text(row, 1)?,
            location: column_text(row, 2)?,
            timestamp: column_text(row, 3)?,
            judgment: column_text(row, 4)?,
            confidence: column_i64(row, 5)?,
            tags: column_text(row, 6)?,
            ..Default::default()
        };
        Self::tag(schema, columns, row, 7)
    }

    /// Read a row selected with [`ChartSchema::record_columns`]
    pub fn record_from_row(schema: ChartSchema, row: &Row) -> rusqlite::Result<Self> {
        let columns = ChartColumns {
            id: row.get(0)?,
            question: column_text(row, 1)?,
            location: column_text(row, 2)?,
            timestamp: column_text(row, 3)?,
            judgment: column_text(row, 4)?,
            confidence: column_i64(row, 5)?,
            tags: column_text(row, 6)?,
            chart_data: column_text(row, 7)?,
            notes: column_text(row, 8)?,
        };
        Self::tag(schema, columns, row, 9)
    }

    fn tag(
        schema: ChartSchema,
        columns: ChartColumns,
        row: &Row,
        category_idx: usize,
    ) -> rusqlite::Result<Self> {
        Ok(match schema {
            ChartSchema::Legacy => StoredChart::Legacy(columns),
            ChartSchema::Current => StoredChart::Current {
                columns,
                category: column_text(row, category_idx)?,
            },
        })
    }

    /// Collapse either table version into the canonical record
    pub fn normalize(self) -> ChartRecord {
        let (columns, category) = match self {
            StoredChart::Legacy(columns) => (columns, None),
            StoredChart::Current { columns, category } => (columns, category),
        };

        let chart_payload = columns
            .chart_data
            .as_deref()
            .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
            .map(|value| ChartPayload::from_value(&value))
            .unwrap_or_default();

        ChartRecord {
            id: columns.id,
            question: columns.question.unwrap_or_default(),
            location: columns.location.unwrap_or_default(),
            timestamp: columns
                .timestamp
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or_default(),
            judgment: columns
                .judgment
                .as_deref()
                .map(Judgment::from_label)
                .unwrap_or_default(),
            confidence: clamp_confidence(columns.confidence),
            chart_payload,
            notes: columns.notes.unwrap_or_default(),
            tags: decode_tags(columns.tags.as_deref()),
            category: normalize_category(category),
        }
    }

    /// Flat view of the record; summary rows carry no payload
    pub fn into_summary(self) -> ChartSummary {
        self.normalize().summary()
    }
}

pub(crate) fn notebook_entry_from_row(row: &Row) -> rusqlite::Result<NotebookEntry> {
    let created_at = column_text(row, 5)?
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or_default();
    let modified_at = column_text(row, 6)?
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or(created_at);

    Ok(NotebookEntry {
        id: row.get(0)?,
        title: column_text(row, 1)?.unwrap_or_default(),
        content: column_text(row, 2)?.unwrap_or_default(),
        category: normalize_category(column_text(row, 3)?),
        tags: decode_tags(column_text(row, 4)?.as_deref()),
        created_at,
        modified_at: modified_at.max(created_at),
        chart_id: column_i64(row, 7)?,
    })
}

// ============================================
// COLUMN HELPERS
// ============================================

/// Read a column as text whatever its storage class
fn column_text(row: &Row, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
    })
}

fn column_i64(row: &Row, idx: usize) -> rusqlite::Result<Option<i64>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Integer(i) => Some(i),
        ValueRef::Real(f) => Some(f.round() as i64),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .map(|f| f.round() as i64),
        ValueRef::Null | ValueRef::Blob(_) => None,
    })
}

fn clamp_confidence(raw: Option<i64>) -> u8 {
    raw.unwrap_or(0).clamp(0, 100) as u8
}

fn normalize_category(raw: Option<String>) -> String {
    match raw {
        Some(c) if !c.trim().is_empty() => c,
        _ => DEFAULT_CATEGORY.to_string(),
    }
}

pub(crate) fn decode_tags(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str::<Vec<String>>(s).ok())
        .map(dedup_tags)
        .unwrap_or_default()
}

pub(crate) fn encode_tags(tags: &[String]) -> String {
    // Vec<String> always serializes
    serde_json::to_string(&dedup_tags(tags.to_vec())).unwrap_or_else(|_| "[]".to_string())
}

/// Trim, drop empties and repeated labels, keep first-seen order
pub(crate) fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

// ============================================
// TIMESTAMPS
// ============================================

/// Fixed-width RFC 3339 so text order matches time order
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse RFC 3339 or SQLite's `CURRENT_TIMESTAMP` form (taken as UTC)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_timestamp_formats() {
        let ts = parse_timestamp("2025-06-06 14:30:00").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day(), ts.hour()), (2025, 6, 6, 14));

        let ts = parse_timestamp("2025-06-06T14:30:00.250Z").unwrap();
        assert_eq!(ts.minute(), 30);

        let ts = parse_timestamp("2025-06-06T14:30:00.123456").unwrap();
        assert_eq!(ts.second(), 0);

        assert!(parse_timestamp("last tuesday").is_none());
    }

    #[test]
    fn test_format_round_trips() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(&ts), "2025-01-02T03:04:05.000Z");
        assert_eq!(parse_timestamp(&format_timestamp(&ts)), Some(ts));
    }

    #[test]
    fn test_tags_tolerate_garbage() {
        assert!(decode_tags(Some("not json")).is_empty());
        assert!(decode_tags(None).is_empty());
        assert_eq!(
            decode_tags(Some(r#"["career", " career", "", "job"]"#)),
            vec!["career".to_string(), "job".to_string()]
        );
    }

    #[test]
    fn test_legacy_row_normalizes_to_general() {
        let stored = StoredChart::Legacy(ChartColumns {
            id: 3,
            question: Some("Where is my ring?".into()),
            location: Some("Paris".into()),
            timestamp: Some("2024-03-01 10:00:00".into()),
            judgment: Some("NOT RADICAL".into()),
            confidence: Some(250),
            tags: Some("{broken".into()),
            chart_data: Some("{\"houses\": [1.0]".into()),
            notes: None,
        });
        let record = stored.normalize();
        assert_eq!(record.category, "general");
        assert_eq!(record.judgment, Judgment::NotRadical);
        assert_eq!(record.confidence, 100);
        assert!(record.tags.is_empty());
        assert!(record.chart_payload.is_empty());
    }

    #[test]
    fn test_blank_category_defaults() {
        let stored = StoredChart::Current {
            columns: ChartColumns::default(),
            category: Some("  ".into()),
        };
        assert_eq!(stored.into_summary().category, "general");
    }
}
