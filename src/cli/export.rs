//! Export and backup command implementations

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::{Path, PathBuf};

use crate::store::{format_timestamp, ChartStore, ChartSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Yaml,
    Csv,
}

pub fn render(charts: &[ChartSummary], format: ExportFormat) -> Result<String> {
    let text = match format {
        ExportFormat::Json => serde_json::to_string_pretty(charts)?,
        ExportFormat::Yaml => serde_yaml::to_string(charts)?,
        ExportFormat::Csv => to_csv(charts)?,
    };
    Ok(text)
}

/// One row per chart; tags and payload are left out
fn to_csv(charts: &[ChartSummary]) -> Result<String> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record([
        "ID",
        "Question",
        "Location",
        "Timestamp",
        "Judgment",
        "Confidence",
        "Category",
    ])?;
    for chart in charts {
        w.write_record([
            chart.id.to_string(),
            chart.question.clone(),
            chart.location.clone(),
            format_timestamp(&chart.timestamp),
            chart.judgment.to_string(),
            chart.confidence.to_string(),
            chart.category.clone(),
        ])?;
    }
    let bytes = w.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Write every chart to `out`, or stdout when no path is given
pub fn run(store: &ChartStore, format: ExportFormat, out: Option<PathBuf>) -> Result<()> {
    let charts = store.all_chart_summaries();
    let text = render(&charts, format)?;

    match out {
        Some(path) => {
            std::fs::write(&path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Exported {} charts to {}", charts.len(), path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

pub fn backup(store: &ChartStore, dest: &Path) -> Result<()> {
    if dest.exists() {
        anyhow::bail!("Backup target {} already exists", dest.display());
    }
    store.backup_to(dest)?;
    println!("Backed up {} to {}", store.path().display(), dest.display());
    Ok(())
}
