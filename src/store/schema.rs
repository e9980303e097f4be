//! SQLite schema definition and physical-schema detection
//!
//! Older databases were created before charts carried a `category` column.
//! `CREATE TABLE IF NOT EXISTS` leaves such tables untouched, so every chart
//! query inspects the live table first and picks a matching column list.

use rusqlite::Connection;

pub const SCHEMA: &str = r#"
-- ============================================
-- CHARTS
-- ============================================

CREATE TABLE IF NOT EXISTS charts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    question TEXT NOT NULL,
    location TEXT NOT NULL,
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
    judgment TEXT,
    confidence INTEGER,
    chart_data TEXT,                       -- JSON: full engine result
    notes TEXT,
    tags TEXT,                             -- JSON array of labels
    category TEXT DEFAULT 'general'
);

-- ============================================
-- NOTEBOOK
-- ============================================

-- chart_id is a lookup-only back-reference: no foreign key, no cascade
CREATE TABLE IF NOT EXISTS notebook_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    content TEXT,
    category TEXT DEFAULT 'general',
    tags TEXT,
    created_date DATETIME DEFAULT CURRENT_TIMESTAMP,
    modified_date DATETIME DEFAULT CURRENT_TIMESTAMP,
    chart_id INTEGER
);

-- ============================================
-- SETTINGS
-- ============================================

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT
);

-- ============================================
-- INDEXES
-- ============================================

CREATE INDEX IF NOT EXISTS idx_charts_timestamp ON charts(timestamp);
CREATE INDEX IF NOT EXISTS idx_charts_judgment ON charts(judgment);
CREATE INDEX IF NOT EXISTS idx_notebook_modified ON notebook_entries(modified_date DESC);
CREATE INDEX IF NOT EXISTS idx_notebook_category ON notebook_entries(category);
CREATE INDEX IF NOT EXISTS idx_notebook_chart ON notebook_entries(chart_id);
"#;

/// Physical shape of the `charts` table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartSchema {
    /// Written before categories existed
    Legacy,
    Current,
}

impl ChartSchema {
    pub fn detect(conn: &Connection) -> rusqlite::Result<Self> {
        let mut stmt = conn.prepare("PRAGMA table_info(charts)")?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;

        let schema = if columns.iter().any(|c| c == "category") {
            ChartSchema::Current
        } else {
            ChartSchema::Legacy
        };
        tracing::debug!(?schema, "Detected charts table layout");
        Ok(schema)
    }

    pub fn has_category(&self) -> bool {
        matches!(self, ChartSchema::Current)
    }

    /// Column list for summary rows: id, question, location, timestamp,
    /// judgment, confidence, tags and, on the current schema, category.
    pub fn summary_columns(&self) -> &'static str {
        match self {
            ChartSchema::Current => {
                "id, question, location, timestamp, judgment, confidence, tags, category"
            }
            ChartSchema::Legacy => "id, question, location, timestamp, judgment, confidence, tags",
        }
    }

    /// Column list for full records: the summary columns plus chart_data and notes
    pub fn record_columns(&self) -> &'static str {
        match self {
            ChartSchema::Current => {
                "id, question, location, timestamp, judgment, confidence, tags, chart_data, notes, \
                 category"
            }
            ChartSchema::Legacy => {
                "id, question, location, timestamp, judgment, confidence, tags, chart_data, notes"
            }
        }
    }
}
