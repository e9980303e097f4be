//! List and range command implementations

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use super::truncate;
use crate::chart::Judgment;
use crate::store::{parse_timestamp, ChartFilter, ChartStore, ChartSummary, PeriodSummary};

pub fn run(
    store: &ChartStore,
    limit: usize,
    search: Option<String>,
    judgment: Option<String>,
    category: Option<String>,
) -> Result<()> {
    let filter = ChartFilter {
        search,
        judgment: judgment.as_deref().map(Judgment::from_label),
        category,
    };
    let charts = filter.apply(store.get_recent_charts(limit));

    if charts.is_empty() {
        println!("No charts found. Save one with 'horary save' first.");
        return Ok(());
    }

    print_table(&charts);
    Ok(())
}

/// Charts between two dates (inclusive), oldest first
pub fn range(store: &ChartStore, from: &str, to: &str) -> Result<()> {
    let start = parse_bound(from, NaiveTime::MIN)?;
    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    let end = parse_bound(to, end_of_day)?;
    if start > end {
        anyhow::bail!("Range start {} is after end {}", from, to);
    }

    let charts = store.get_charts_by_date_range(start, end);
    if charts.is_empty() {
        println!("No charts between {} and {}.", from, to);
        return Ok(());
    }

    print_table(&charts);

    let summary = PeriodSummary::from_charts(&charts);
    println!("{}", "-".repeat(100));
    println!(
        "{} charts | {} YES | {} NO | average confidence {:.1}%",
        summary.total, summary.yes, summary.no, summary.average_confidence
    );
    Ok(())
}

/// Accept a full timestamp or a bare date, which is pinned to `time`
fn parse_bound(raw: &str, time: NaiveTime) -> Result<DateTime<Utc>> {
    if let Some(ts) = parse_timestamp(raw) {
        return Ok(ts);
    }
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", raw))?;
    Ok(date.and_time(time).and_utc())
}

fn print_table(charts: &[ChartSummary]) {
    println!(
        "{:<6} {:<17} {:<12} {:<5} {:<12} {:<16} {}",
        "ID", "Timestamp", "Judgment", "Conf", "Category", "Location", "Question"
    );
    println!("{}", "-".repeat(100));

    for chart in charts {
        println!(
            "{:<6} {:<17} {:<12} {:<5} {:<12} {:<16} {}",
            chart.id,
            chart.timestamp.format("%Y-%m-%d %H:%M"),
            chart.judgment.as_str(),
            format!("{}%", chart.confidence),
            truncate(&chart.category, 12),
            truncate(&chart.location, 16),
            truncate(&chart.question, 40),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_date_bounds() {
        let start = parse_bound("2024-03-01", NaiveTime::MIN).unwrap();
        assert_eq!((start.year(), start.month(), start.day(), start.hour()), (2024, 3, 1, 0));

        let end = parse_bound(
            "2024-03-31",
            NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap(),
        )
        .unwrap();
        assert_eq!((end.day(), end.hour(), end.minute()), (31, 23, 59));

        let exact = parse_bound("2024-03-05T10:30:00Z", NaiveTime::MIN).unwrap();
        assert_eq!(exact.hour(), 10);

        assert!(parse_bound("March", NaiveTime::MIN).is_err());
    }
}
