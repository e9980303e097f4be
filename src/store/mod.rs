//! Chart storage with SQLite
//!
//! - Every operation opens its own connection and drops it before returning
//! - Chart reads inspect the physical table first, so databases written before
//!   `category` existed keep working
//! - Read paths log failures and degrade to empty results; writes propagate them

mod records;
mod schema;
mod stats;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use rusqlite::{params, Connection, Params};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

use crate::chart::{Judgment, JudgmentResult};
use crate::error::{StoreError, StoreResult};

pub use records::{
    format_timestamp, parse_timestamp, ChartAnnotations, ChartRecord, ChartSummary,
    NoteAnnotations, NotebookEntry, DEFAULT_CATEGORY,
};
pub use schema::{ChartSchema, SCHEMA};
pub use stats::{success_rate, ChartFilter, PeriodSummary, Statistics};

use records::{dedup_tags, encode_tags, notebook_entry_from_row, StoredChart};

const NOTEBOOK_COLUMNS: &str =
    "id, title, content, category, tags, created_date, modified_date, chart_id";

pub struct ChartStore {
    path: PathBuf,
}

impl ChartStore {
    pub fn open(path: &Path) -> StoreResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let store = Self {
            path: path.to_path_buf(),
        };
        store.init_schema()?;
        info!("Database initialized: {}", path.display());
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> StoreResult<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }

    fn init_schema(&self) -> StoreResult<()> {
        self.connect()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Run a read on a fresh connection; failures are logged and replaced by `fallback`
    fn read_or<T>(
        &self,
        what: &str,
        fallback: T,
        read: impl FnOnce(&Connection) -> StoreResult<T>,
    ) -> T {
        match self.connect().and_then(|conn| read(&conn)) {
            Ok(value) => value,
            Err(e) => {
                error!("Error {}: {}", what, e);
                fallback
            }
        }
    }

    // ============================================
    // CHARTS
    // ============================================

    /// Store a freshly judged chart and return its id
    pub fn save_chart(
        &self,
        question: &str,
        location: &str,
        result: &JudgmentResult,
        annotations: ChartAnnotations,
    ) -> StoreResult<i64> {
        if question.trim().is_empty() {
            return Err(StoreError::Validation("question must not be empty"));
        }
        if location.trim().is_empty() {
            return Err(StoreError::Validation("location must not be empty"));
        }

        let chart_data = serde_json::to_string(result)?;
        let tags = encode_tags(&annotations.tags);
        let category = category_or_default(&annotations.category);
        let now = format_timestamp(&Utc::now());

        let conn = self.connect()?;
        if ChartSchema::detect(&conn)?.has_category() {
            conn.execute(
                "INSERT INTO charts
                     (question, location, timestamp, judgment, confidence,
                      chart_data, notes, tags, category)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    question,
                    location,
                    now,
                    result.judgment.as_str(),
                    result.confidence_percent(),
                    chart_data,
                    annotations.notes,
                    tags,
                    category,
                ],
            )?;
        } else {
            conn.execute(
                "INSERT INTO charts
                     (question, location, timestamp, judgment, confidence, chart_data, notes, tags)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    question,
                    location,
                    now,
                    result.judgment.as_str(),
                    result.confidence_percent(),
                    chart_data,
                    annotations.notes,
                    tags,
                ],
            )?;
        }

        let id = conn.last_insert_rowid();
        info!(
            "Chart saved with ID: {} ({}, {}%)",
            id,
            result.judgment,
            result.confidence_percent()
        );
        Ok(id)
    }

    pub fn get_chart(&self, id: i64) -> Option<ChartRecord> {
        self.read_or("getting chart", None, |conn| {
            let schema = ChartSchema::detect(conn)?;
            let result = conn.query_row(
                &format!("SELECT {} FROM charts WHERE id = ?", schema.record_columns()),
                params![id],
                |row| StoredChart::record_from_row(schema, row),
            );

            match result {
                Ok(stored) => Ok(Some(stored.normalize())),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Newest charts first, at most `limit`
    pub fn get_recent_charts(&self, limit: usize) -> Vec<ChartSummary> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.read_or("getting recent charts", Vec::new(), |conn| {
            select_summaries(
                conn,
                "ORDER BY julianday(timestamp) DESC, id DESC LIMIT ?",
                params![limit],
            )
        })
    }

    /// Charts cast between `start` and `end` inclusive, oldest first
    pub fn get_charts_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<ChartSummary> {
        self.read_or("getting charts by date range", Vec::new(), |conn| {
            select_summaries(
                conn,
                "WHERE julianday(timestamp) BETWEEN julianday(?1) AND julianday(?2)
                 ORDER BY julianday(timestamp) ASC, id ASC",
                params![format_timestamp(&start), format_timestamp(&end)],
            )
        })
    }

    /// Every chart, newest first
    pub fn all_chart_summaries(&self) -> Vec<ChartSummary> {
        self.read_or("exporting charts", Vec::new(), |conn| {
            select_summaries(conn, "ORDER BY julianday(timestamp) DESC, id DESC", [])
        })
    }

    /// Replace notes, tags and category of a chart
    pub fn update_chart_annotations(
        &self,
        id: i64,
        annotations: ChartAnnotations,
    ) -> StoreResult<()> {
        let tags = encode_tags(&annotations.tags);
        let conn = self.connect()?;

        let changed = if ChartSchema::detect(&conn)?.has_category() {
            conn.execute(
                "UPDATE charts SET notes = ?, tags = ?, category = ? WHERE id = ?",
                params![
                    annotations.notes,
                    tags,
                    category_or_default(&annotations.category),
                    id
                ],
            )?
        } else {
            conn.execute(
                "UPDATE charts SET notes = ?, tags = ? WHERE id = ?",
                params![annotations.notes, tags, id],
            )?
        };

        if changed == 0 {
            return Err(StoreError::NotFound { kind: "chart", id });
        }
        info!("Chart {} annotations updated", id);
        Ok(())
    }

    /// Delete one chart. Notebook entries pointing at it are kept.
    pub fn delete_chart(&self, id: i64) -> StoreResult<()> {
        let changed = self
            .connect()?
            .execute("DELETE FROM charts WHERE id = ?", params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound { kind: "chart", id });
        }
        info!("Chart {} deleted", id);
        Ok(())
    }

    /// Delete every chart and return how many were removed
    pub fn clear_charts(&self) -> StoreResult<usize> {
        let removed = self.connect()?.execute("DELETE FROM charts", [])?;
        info!("Cleared {} charts", removed);
        Ok(removed)
    }

    // ============================================
    // STATISTICS
    // ============================================

    pub fn get_statistics(&self) -> Statistics {
        self.statistics_as_of(Utc::now())
    }

    /// Statistics with "this month" taken as the UTC calendar month containing `now`
    pub fn statistics_as_of(&self, now: DateTime<Utc>) -> Statistics {
        self.read_or("getting statistics", Statistics::default(), |conn| {
            let total_charts: i64 =
                conn.query_row("SELECT COUNT(*) FROM charts", [], |row| row.get(0))?;

            let first_of_month = Utc
                .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
                .single()
                .unwrap_or(now);
            let this_month: i64 = conn.query_row(
                "SELECT COUNT(*) FROM charts WHERE julianday(timestamp) >= julianday(?)",
                params![format_timestamp(&first_of_month)],
                |row| row.get(0),
            )?;

            // Success rate only counts charts judged exactly YES or NO
            let mut yes = 0u64;
            let mut no = 0u64;
            let mut stmt = conn.prepare(
                "SELECT judgment, COUNT(*) FROM charts
                 WHERE judgment IN (?1, ?2) GROUP BY judgment",
            )?;
            let rows = stmt.query_map(
                params![Judgment::Yes.as_str(), Judgment::No.as_str()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )?;
            for row in rows {
                let (judgment, count) = row?;
                match Judgment::from_label(&judgment) {
                    Judgment::Yes => yes = count as u64,
                    Judgment::No => no = count as u64,
                    _ => {}
                }
            }

            let per_category_counts = if ChartSchema::detect(conn)?.has_category() {
                let mut stmt = conn.prepare(
                    "SELECT COALESCE(NULLIF(TRIM(category), ''), ?1), COUNT(*)
                     FROM charts GROUP BY 1",
                )?;
                let counts: BTreeMap<String, u64> = stmt
                    .query_map(params![DEFAULT_CATEGORY], |row| {
                        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
                    })?
                    .collect::<Result<_, _>>()?;
                counts
            } else if total_charts > 0 {
                [(DEFAULT_CATEGORY.to_string(), total_charts as u64)]
                    .into_iter()
                    .collect()
            } else {
                Default::default()
            };

            Ok(Statistics {
                total_charts: total_charts as u64,
                charts_this_month: this_month as u64,
                success_rate_percent: success_rate(yes, no),
                per_category_counts,
                total_judged_count: yes + no,
            })
        })
    }

    // ============================================
    // NOTEBOOK
    // ============================================

    pub fn save_notebook_entry(
        &self,
        title: &str,
        content: &str,
        annotations: NoteAnnotations,
    ) -> StoreResult<i64> {
        if title.trim().is_empty() {
            return Err(StoreError::Validation("title must not be empty"));
        }

        let now = format_timestamp(&Utc::now());
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO notebook_entries
                 (title, content, category, tags, created_date, modified_date, chart_id)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                title,
                content,
                category_or_default(&annotations.category),
                encode_tags(&annotations.tags),
                now,
                now,
                annotations.chart_id,
            ],
        )?;

        let id = conn.last_insert_rowid();
        info!("Notebook entry saved with ID: {}", id);
        Ok(id)
    }

    /// Most recently modified first, optionally restricted to one category
    pub fn get_notebook_entries(&self, category: Option<&str>) -> Vec<NotebookEntry> {
        self.read_or("getting notebook entries", Vec::new(), |conn| match category {
            Some(category) => select_entries(
                conn,
                "WHERE category = ? ORDER BY julianday(modified_date) DESC, id DESC",
                params![category],
            ),
            None => select_entries(
                conn,
                "ORDER BY julianday(modified_date) DESC, id DESC",
                [],
            ),
        })
    }

    pub fn get_notebook_entry(&self, id: i64) -> Option<NotebookEntry> {
        self.read_or("getting notebook entry", None, |conn| {
            Ok(select_entries(conn, "WHERE id = ?", params![id])?
                .into_iter()
                .next())
        })
    }

    /// Entries whose back-reference points at `chart_id`
    pub fn notes_for_chart(&self, chart_id: i64) -> Vec<NotebookEntry> {
        self.read_or("getting chart notes", Vec::new(), |conn| {
            select_entries(
                conn,
                "WHERE chart_id = ? ORDER BY julianday(modified_date) DESC, id DESC",
                params![chart_id],
            )
        })
    }

    /// Replace every mutable field of an entry and bump its modification time
    pub fn update_notebook_entry(
        &self,
        id: i64,
        title: &str,
        content: &str,
        annotations: NoteAnnotations,
    ) -> StoreResult<()> {
        if title.trim().is_empty() {
            return Err(StoreError::Validation("title must not be empty"));
        }

        let changed = self.connect()?.execute(
            "UPDATE notebook_entries
             SET title = ?, content = ?, category = ?, tags = ?, chart_id = ?, modified_date = ?
             WHERE id = ?",
            params![
                title,
                content,
                category_or_default(&annotations.category),
                encode_tags(&annotations.tags),
                annotations.chart_id,
                format_timestamp(&Utc::now()),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: "notebook entry",
                id,
            });
        }
        Ok(())
    }

    pub fn delete_notebook_entry(&self, id: i64) -> StoreResult<()> {
        let changed = self
            .connect()?
            .execute("DELETE FROM notebook_entries WHERE id = ?", params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: "notebook entry",
                id,
            });
        }
        Ok(())
    }

    // ============================================
    // SETTINGS
    // ============================================

    pub fn get_setting(&self, key: &str) -> Option<String> {
        self.read_or("getting setting", None, |conn| {
            let result = conn.query_row(
                "SELECT value FROM settings WHERE key = ?",
                params![key],
                |row| row.get::<_, Option<String>>(0),
            );

            match result {
                Ok(value) => Ok(value),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn set_setting(&self, key: &str, value: &str) -> StoreResult<()> {
        if key.trim().is_empty() {
            return Err(StoreError::Validation("setting key must not be empty"));
        }
        self.connect()?.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a setting; removing an absent key is not an error
    pub fn delete_setting(&self, key: &str) -> StoreResult<()> {
        self.connect()?
            .execute("DELETE FROM settings WHERE key = ?", params![key])?;
        Ok(())
    }

    pub fn list_settings(&self) -> Vec<(String, String)> {
        self.read_or("listing settings", Vec::new(), |conn| {
            let mut stmt =
                conn.prepare("SELECT key, COALESCE(value, '') FROM settings ORDER BY key")?;
            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // ============================================
    // MAINTENANCE
    // ============================================

    /// Write a consistent copy of the database to `dest`, which must not exist yet
    pub fn backup_to(&self, dest: &Path) -> StoreResult<()> {
        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.connect()?.execute(
            "VACUUM INTO ?",
            params![dest.to_string_lossy().to_string()],
        )?;
        info!("Database backed up to {}", dest.display());
        Ok(())
    }
}

// ============================================
// QUERY HELPERS
// ============================================

/// Inspect the charts table once, then select summaries with the matching columns
fn select_summaries<P: Params>(
    conn: &Connection,
    tail: &str,
    params: P,
) -> StoreResult<Vec<ChartSummary>> {
    let schema = ChartSchema::detect(conn)?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM charts {}",
        schema.summary_columns(),
        tail
    ))?;

    let rows = stmt
        .query_map(params, |row| StoredChart::summary_from_row(schema, row))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows.into_iter().map(StoredChart::into_summary).collect())
}

fn select_entries<P: Params>(
    conn: &Connection,
    tail: &str,
    params: P,
) -> StoreResult<Vec<NotebookEntry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM notebook_entries {}",
        NOTEBOOK_COLUMNS, tail
    ))?;

    let rows = stmt
        .query_map(params, notebook_entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn category_or_default(category: &str) -> &str {
    let category = category.trim();
    if category.is_empty() {
        DEFAULT_CATEGORY
    } else {
        category
    }
}

/// Parse a comma-separated tag list as typed by a user
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    dedup_tags(raw.split(',').map(String::from).collect())
}
