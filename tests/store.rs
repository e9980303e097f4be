use chrono::{TimeZone, Utc};
use rusqlite::{params, Connection};
use serde_json::json;
use tempfile::TempDir;

use horary::chart::{Aspect, ChartPayload, Judgment, JudgmentResult, PlanetPosition};
use horary::store::{
    format_timestamp, ChartAnnotations, ChartFilter, ChartStore, NoteAnnotations, PeriodSummary,
};
use horary::StoreError;

fn open_store() -> (TempDir, ChartStore) {
    let dir = TempDir::new().unwrap();
    let store = ChartStore::open(&dir.path().join("charts.db")).unwrap();
    (dir, store)
}

fn raw(store: &ChartStore) -> Connection {
    Connection::open(store.path()).unwrap()
}

fn set_timestamp(store: &ChartStore, id: i64, ts: &str) {
    raw(store)
        .execute("UPDATE charts SET timestamp = ? WHERE id = ?", params![ts, id])
        .unwrap();
}

fn save(store: &ChartStore, question: &str, judgment: Judgment) -> i64 {
    store
        .save_chart(
            question,
            "London",
            &JudgmentResult::new(judgment, 50),
            ChartAnnotations::default(),
        )
        .unwrap()
}

fn sample_payload() -> ChartPayload {
    let mut chart = ChartPayload {
        houses: (0..12).map(|i| (i as f64 * 30.0 + 5.0) % 360.0).collect(),
        ..Default::default()
    };
    chart.planets.insert("Sun".into(), PlanetPosition::at(45.5));
    chart.planets.insert("Mars".into(), PlanetPosition::at(200.0));
    chart.aspects.push(Aspect {
        planet1: "Sun".into(),
        planet2: "Mars".into(),
        aspect_type: "Opposition".into(),
        orb: 5.5,
        applying: true,
        degrees_to_exact: 5.5,
        ..Default::default()
    });
    chart
}

#[test]
fn test_save_and_get_round_trip() {
    let (_dir, store) = open_store();

    let result = JudgmentResult::new(Judgment::Yes, 85).with_chart(sample_payload());
    let id = store
        .save_chart(
            "Will I get the job?",
            "London",
            &result,
            ChartAnnotations {
                notes: "asked on a Tuesday".into(),
                tags: vec!["career".into(), " work ".into(), "career".into()],
                category: "career".into(),
            },
        )
        .unwrap();

    let chart = store.get_chart(id).unwrap();
    assert_eq!(chart.id, id);
    assert_eq!(chart.question, "Will I get the job?");
    assert_eq!(chart.location, "London");
    assert_eq!(chart.judgment, Judgment::Yes);
    assert_eq!(chart.confidence, 85);
    assert_eq!(chart.category, "career");
    assert_eq!(chart.notes, "asked on a Tuesday");
    assert_eq!(chart.tags, vec!["career", "work"]);
    assert_eq!(chart.chart_payload, sample_payload());
    assert!((Utc::now() - chart.timestamp).num_seconds().abs() < 60);

    assert!(store.get_chart(id + 100).is_none());
}

#[test]
fn test_rejects_blank_question_without_writing() {
    let (_dir, store) = open_store();
    save(&store, "Is it lost?", Judgment::No);

    let err = store
        .save_chart(
            "   ",
            "Paris",
            &JudgmentResult::new(Judgment::Yes, 10),
            ChartAnnotations::default(),
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let err = store
        .save_chart(
            "Will it sell?",
            "",
            &JudgmentResult::new(Judgment::Yes, 10),
            ChartAnnotations::default(),
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    assert_eq!(store.get_statistics().total_charts, 1);
}

#[test]
fn test_recent_charts_newest_first_with_limit() {
    let (_dir, store) = open_store();
    let a = save(&store, "first", Judgment::Yes);
    let b = save(&store, "second", Judgment::No);
    let c = save(&store, "third", Judgment::Unclear);
    set_timestamp(&store, a, "2024-01-01T10:00:00.000Z");
    set_timestamp(&store, b, "2024-03-01 10:00:00");
    set_timestamp(&store, c, "2024-02-01T10:00:00.000Z");

    let recent = store.get_recent_charts(10);
    let ids: Vec<i64> = recent.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![b, c, a]);

    let limited = store.get_recent_charts(2);
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].id, b);

    assert!(store.get_recent_charts(0).is_empty());
}

#[test]
fn test_same_timestamp_orders_by_id() {
    let (_dir, store) = open_store();
    let a = save(&store, "one", Judgment::Yes);
    let b = save(&store, "two", Judgment::Yes);
    set_timestamp(&store, a, "2024-05-05T05:05:05.000Z");
    set_timestamp(&store, b, "2024-05-05T05:05:05.000Z");

    let ids: Vec<i64> = store.get_recent_charts(5).iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![b, a]);
}

#[test]
fn test_date_range_is_inclusive() {
    let (_dir, store) = open_store();
    let before = save(&store, "before", Judgment::Yes);
    let start = save(&store, "start", Judgment::Yes);
    let middle = save(&store, "middle", Judgment::No);
    let end = save(&store, "end", Judgment::Yes);
    let after = save(&store, "after", Judgment::Yes);
    set_timestamp(&store, before, "2024-02-29T23:59:59.000Z");
    set_timestamp(&store, start, "2024-03-01T00:00:00.000Z");
    set_timestamp(&store, middle, "2024-03-15 12:00:00");
    set_timestamp(&store, end, "2024-03-31T23:59:59.000Z");
    set_timestamp(&store, after, "2024-04-01T00:00:00.000Z");

    let charts = store.get_charts_by_date_range(
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap(),
    );
    let ids: Vec<i64> = charts.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![start, middle, end]);

    let summary = PeriodSummary::from_charts(&charts);
    assert_eq!((summary.total, summary.yes, summary.no), (3, 2, 1));
    assert_eq!(summary.average_confidence, 50.0);
}

#[test]
fn test_statistics() {
    let (_dir, store) = open_store();
    assert_eq!(store.get_statistics().total_charts, 0);
    assert_eq!(store.get_statistics().success_rate_percent, 0.0);

    save(&store, "a", Judgment::Yes);
    save(&store, "b", Judgment::Yes);
    save(&store, "c", Judgment::Yes);
    save(&store, "d", Judgment::No);
    let old = save(&store, "e", Judgment::Unclear);
    store
        .save_chart(
            "f",
            "Rome",
            &JudgmentResult::new(Judgment::NotRadical, 0),
            ChartAnnotations {
                category: "travel".into(),
                ..Default::default()
            },
        )
        .unwrap();
    set_timestamp(&store, old, "2020-01-01T00:00:00.000Z");

    let stats = store.statistics_as_of(Utc::now());
    assert_eq!(stats.total_charts, 6);
    assert_eq!(stats.charts_this_month, 5);
    assert_eq!(stats.total_judged_count, 4);
    assert_eq!(stats.success_rate_percent, 75.0);
    assert_eq!(stats.per_category_counts.get("general"), Some(&5));
    assert_eq!(stats.per_category_counts.get("travel"), Some(&1));
}

#[test]
fn test_legacy_table_without_category() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("legacy.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE charts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                question TEXT NOT NULL,
                location TEXT NOT NULL,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
                judgment TEXT,
                confidence INTEGER,
                chart_data TEXT,
                notes TEXT,
                tags TEXT
            );
            INSERT INTO charts
                (question, location, timestamp, judgment, confidence, chart_data, notes, tags)
            VALUES
                ('Will the cat come home?', 'York', '2023-06-01 08:00:00', 'YES', 70,
                 NULL, NULL, NULL);",
        )
        .unwrap();
    }

    let store = ChartStore::open(&path).unwrap();

    let recent = store.get_recent_charts(10);
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].category, "general");
    assert_eq!(recent[0].question, "Will the cat come home?");
    assert_eq!(recent[0].judgment, Judgment::Yes);

    let chart = store.get_chart(recent[0].id).unwrap();
    assert_eq!(chart.category, "general");
    assert!(chart.tags.is_empty());
    assert!(chart.chart_payload.is_empty());

    let stats = store.get_statistics();
    assert_eq!(stats.total_charts, 1);
    assert_eq!(stats.per_category_counts.get("general"), Some(&1));

    // Writes still work against the old table
    let id = store
        .save_chart(
            "Is the job offer real?",
            "York",
            &JudgmentResult::new(Judgment::No, 40),
            ChartAnnotations {
                category: "career".into(),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(store.get_chart(id).unwrap().category, "general");
    store
        .update_chart_annotations(
            id,
            ChartAnnotations {
                notes: "updated".into(),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(store.get_chart(id).unwrap().notes, "updated");
    assert_eq!(store.get_statistics().total_charts, 2);
}

#[test]
fn test_malformed_columns_read_as_empty() {
    let (_dir, store) = open_store();
    let id = save(&store, "Where are my keys?", Judgment::Yes);
    raw(&store)
        .execute(
            "UPDATE charts
             SET chart_data = '{not json', tags = 'oops', confidence = 250, judgment = 'MAYBE'
             WHERE id = ?",
            params![id],
        )
        .unwrap();

    let chart = store.get_chart(id).unwrap();
    assert!(chart.chart_payload.is_empty());
    assert!(chart.tags.is_empty());
    assert_eq!(chart.confidence, 100);
    assert_eq!(chart.judgment, Judgment::Unknown);
}

#[test]
fn test_payload_nested_in_engine_result() {
    let (_dir, store) = open_store();
    let id = save(&store, "Will the deal close?", Judgment::Yes);
    let stored = json!({
        "judgment": "YES",
        "confidence": 50,
        "chart_data": {
            "houses": [0.0, 30.0],
            "planets": { "Moon": { "longitude": 100.0, "retrograde": true } },
            "aspects": []
        },
        "reasoning": ["Moon applies to Venus"]
    });
    raw(&store)
        .execute(
            "UPDATE charts SET chart_data = ? WHERE id = ?",
            params![stored.to_string(), id],
        )
        .unwrap();

    let chart = store.get_chart(id).unwrap();
    assert_eq!(chart.chart_payload.houses, vec![0.0, 30.0]);
    assert!(chart.chart_payload.planets["Moon"].retrograde);
}

fn engine_result() -> JudgmentResult {
    serde_json::from_value(json!({
        "judgment": "YES",
        "confidence": 82,
        "chart_data": {
            "houses": [
                0.0, 30.0, 60.0, 90.0, 120.0, 150.0, 180.0, 210.0, 240.0, 270.0, 300.0, 330.0
            ],
            "ascendant": 12.5,
            "midheaven": 280.0,
            "planets": {
                "Sun": {"longitude": 95.4, "sign": "Cancer", "speed": 0.95},
                "Moon": {"longitude": 185.4, "sign": "Libra"},
                "North Node": {"sign": "Aries"}
            },
            "aspects": [
                {
                    "planet1": "Sun",
                    "planet2": "Moon",
                    "aspect": "Square",
                    "applying": true,
                    "orb": 0.0
                }
            ]
        },
        "reasoning": ["Moon applies to Sun"]
    }))
    .unwrap()
}

#[test]
fn test_point_without_longitude_does_not_block_save() {
    let (_dir, store) = open_store();
    let id = store
        .save_chart(
            "Will I get the job?",
            "London, England",
            &engine_result(),
            ChartAnnotations::default(),
        )
        .unwrap();

    let chart = store.get_chart(id).unwrap();
    assert_eq!(chart.judgment, Judgment::Yes);
    assert_eq!(chart.confidence, 82);
    assert_eq!(chart.chart_payload.houses.len(), 12);
    assert!(chart.chart_payload.planets.contains_key("Sun"));
    assert!(chart.chart_payload.planets.contains_key("Moon"));
    assert!(!chart.chart_payload.planets.contains_key("North Node"));
    assert_eq!(chart.chart_payload.aspects.len(), 1);
    assert_eq!(chart.chart_payload.angle("ascendant"), Some(12.5));
}

#[test]
fn test_engine_result_stored_verbatim() {
    let (_dir, store) = open_store();
    let id = store
        .save_chart(
            "Will the house sell?",
            "Leeds",
            &engine_result(),
            ChartAnnotations::default(),
        )
        .unwrap();

    let stored: String = raw(&store)
        .query_row("SELECT chart_data FROM charts WHERE id = ?", params![id], |row| {
            row.get(0)
        })
        .unwrap();
    let stored: serde_json::Value = serde_json::from_str(&stored).unwrap();

    assert_eq!(stored["chart_data"]["ascendant"], json!(12.5));
    assert_eq!(stored["chart_data"]["midheaven"], json!(280.0));
    assert_eq!(stored["chart_data"]["planets"]["North Node"]["sign"], "Aries");
    assert_eq!(stored["chart_data"]["planets"]["Sun"]["speed"], json!(0.95));
    assert_eq!(stored["reasoning"][0], "Moon applies to Sun");
}

#[test]
fn test_update_and_delete_chart() {
    let (_dir, store) = open_store();
    let id = save(&store, "Will I pass?", Judgment::Yes);

    store
        .update_chart_annotations(
            id,
            ChartAnnotations {
                notes: "passed".into(),
                tags: vec!["exam".into()],
                category: "education".into(),
            },
        )
        .unwrap();
    let chart = store.get_chart(id).unwrap();
    assert_eq!(chart.notes, "passed");
    assert_eq!(chart.tags, vec!["exam"]);
    assert_eq!(chart.category, "education");

    let err = store
        .update_chart_annotations(999, ChartAnnotations::default())
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { id: 999, .. }));

    store.delete_chart(id).unwrap();
    assert!(store.get_chart(id).is_none());
    assert!(matches!(
        store.delete_chart(id),
        Err(StoreError::NotFound { .. })
    ));
}

#[test]
fn test_clear_keeps_notebook() {
    let (_dir, store) = open_store();
    let id = save(&store, "Will it snow?", Judgment::No);
    save(&store, "Will it rain?", Judgment::Yes);
    store
        .save_notebook_entry(
            "Weather questions",
            "Both cast at noon",
            NoteAnnotations {
                chart_id: Some(id),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(store.clear_charts().unwrap(), 2);
    assert_eq!(store.get_statistics().total_charts, 0);
    assert!(store.get_recent_charts(10).is_empty());

    let notes = store.notes_for_chart(id);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].chart_id, Some(id));
}

#[test]
fn test_notebook_entries() {
    let (_dir, store) = open_store();

    let first = store
        .save_notebook_entry(
            "Moon void of course",
            "Nothing comes of the matter",
            NoteAnnotations::default(),
        )
        .unwrap();
    let second = store
        .save_notebook_entry(
            "Reception",
            "Mutual reception by sign",
            NoteAnnotations {
                category: "technique".into(),
                tags: vec!["dignity".into()],
                chart_id: None,
            },
        )
        .unwrap();
    for (id, month) in [(first, 1), (second, 2)] {
        let ts = format_timestamp(&Utc.with_ymd_and_hms(2024, month, 1, 0, 0, 0).unwrap());
        raw(&store)
            .execute(
                "UPDATE notebook_entries SET created_date = ?1, modified_date = ?1 WHERE id = ?2",
                params![ts, id],
            )
            .unwrap();
    }

    let all = store.get_notebook_entries(None);
    assert_eq!(all.iter().map(|e| e.id).collect::<Vec<_>>(), vec![second, first]);
    assert_eq!(all[1].category, "general");

    let technique = store.get_notebook_entries(Some("technique"));
    assert_eq!(technique.len(), 1);
    assert_eq!(technique[0].tags, vec!["dignity"]);
    assert!(store.get_notebook_entries(Some("missing")).is_empty());

    // Editing bumps the entry back to the top
    store
        .update_notebook_entry(first, "Void Moon", "Revised", NoteAnnotations::default())
        .unwrap();
    let entry = store.get_notebook_entry(first).unwrap();
    assert_eq!(entry.title, "Void Moon");
    assert_eq!(entry.content, "Revised");
    assert!(entry.modified_at > entry.created_at);
    assert_eq!(store.get_notebook_entries(None)[0].id, first);

    assert!(matches!(
        store.save_notebook_entry(" ", "", NoteAnnotations::default()),
        Err(StoreError::Validation(_))
    ));
    assert!(matches!(
        store.update_notebook_entry(999, "x", "", NoteAnnotations::default()),
        Err(StoreError::NotFound { .. })
    ));

    store.delete_notebook_entry(second).unwrap();
    assert!(store.get_notebook_entry(second).is_none());
    assert!(store.delete_notebook_entry(second).is_err());
}

#[test]
fn test_settings() {
    let (_dir, store) = open_store();
    assert_eq!(store.get_setting("house_system"), None);

    store.set_setting("house_system", "Regiomontanus").unwrap();
    store.set_setting("house_system", "Placidus").unwrap();
    store.set_setting("timezone", "UTC").unwrap();
    assert_eq!(store.get_setting("house_system").as_deref(), Some("Placidus"));

    let keys: Vec<String> = store.list_settings().into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["house_system", "timezone"]);

    store.delete_setting("timezone").unwrap();
    store.delete_setting("timezone").unwrap();
    assert_eq!(store.get_setting("timezone"), None);
    assert!(store.set_setting("", "x").is_err());
}

#[test]
fn test_filter_and_export_view() {
    let (_dir, store) = open_store();
    save(&store, "Will I find my ring?", Judgment::Yes);
    save(&store, "Will the house sell?", Judgment::No);

    let all = store.all_chart_summaries();
    assert_eq!(all.len(), 2);

    let filter = ChartFilter {
        search: Some("RING".into()),
        ..Default::default()
    };
    let found = filter.apply(all.clone());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].question, "Will I find my ring?");

    let filter = ChartFilter {
        judgment: Some(Judgment::No),
        ..Default::default()
    };
    assert_eq!(filter.apply(all)[0].question, "Will the house sell?");
}

#[test]
fn test_backup_copies_everything() {
    let (dir, store) = open_store();
    save(&store, "Will the backup work?", Judgment::Yes);
    store.set_setting("theme", "dark").unwrap();

    let dest = dir.path().join("backups").join("copy.db");
    store.backup_to(&dest).unwrap();

    let copy = ChartStore::open(&dest).unwrap();
    assert_eq!(copy.get_statistics().total_charts, 1);
    assert_eq!(copy.get_setting("theme").as_deref(), Some("dark"));

    // VACUUM INTO refuses to overwrite
    assert!(store.backup_to(&dest).is_err());
}

#[test]
fn test_reads_on_broken_database_fall_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("charts.db");
    let store = ChartStore::open(&path).unwrap();
    raw(&store).execute_batch("DROP TABLE charts;").unwrap();

    assert!(store.get_recent_charts(5).is_empty());
    assert!(store.get_chart(1).is_none());
    assert_eq!(store.get_statistics().total_charts, 0);
}
