//! Aggregate views over stored charts

use serde::Serialize;
use std::collections::BTreeMap;

use super::records::ChartSummary;
use crate::chart::Judgment;

/// Dashboard statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub total_charts: u64,
    pub charts_this_month: u64,
    /// YES share of charts judged exactly YES or NO; 0 when there are none
    pub success_rate_percent: f64,
    pub per_category_counts: BTreeMap<String, u64>,
    /// Number of charts judged exactly YES or NO
    pub total_judged_count: u64,
}

pub fn success_rate(yes: u64, no: u64) -> f64 {
    let judged = yes + no;
    if judged == 0 {
        0.0
    } else {
        yes as f64 / judged as f64 * 100.0
    }
}

/// Totals for a span of charts, as shown on the timeline
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub total: usize,
    pub yes: usize,
    pub no: usize,
    pub average_confidence: f64,
}

impl PeriodSummary {
    pub fn from_charts(charts: &[ChartSummary]) -> Self {
        let yes = charts.iter().filter(|c| c.judgment == Judgment::Yes).count();
        let no = charts.iter().filter(|c| c.judgment == Judgment::No).count();
        let average_confidence = if charts.is_empty() {
            0.0
        } else {
            charts.iter().map(|c| c.confidence as f64).sum::<f64>() / charts.len() as f64
        };

        Self {
            total: charts.len(),
            yes,
            no,
            average_confidence,
        }
    }
}

/// Dashboard filter over chart summaries
#[derive(Debug, Clone, Default)]
pub struct ChartFilter {
    /// Case-insensitive substring of the question or location
    pub search: Option<String>,
    pub judgment: Option<Judgment>,
    /// Case-insensitive category name
    pub category: Option<String>,
}

impl ChartFilter {
    pub fn matches(&self, chart: &ChartSummary) -> bool {
        if let Some(search) = self.search.as_deref().map(str::to_lowercase) {
            if !search.is_empty()
                && !chart.question.to_lowercase().contains(&search)
                && !chart.location.to_lowercase().contains(&search)
            {
                return false;
            }
        }

        if let Some(judgment) = self.judgment {
            if chart.judgment != judgment {
                return false;
            }
        }

        match &self.category {
            Some(category) => chart.category.eq_ignore_ascii_case(category),
            None => true,
        }
    }

    pub fn apply(&self, charts: Vec<ChartSummary>) -> Vec<ChartSummary> {
        charts.into_iter().filter(|c| self.matches(c)).collect()
    }
}
