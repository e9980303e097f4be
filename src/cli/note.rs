use anyhow::Result;

use super::truncate;
use crate::store::{parse_tag_list, ChartStore, NoteAnnotations};

pub fn add(
    store: &ChartStore,
    title: String,
    content: String,
    category: Option<String>,
    tags: Option<String>,
    chart: Option<i64>,
) -> Result<()> {
    let mut annotations = NoteAnnotations {
        chart_id: chart,
        ..Default::default()
    };
    if let Some(category) = category {
        annotations.category = category;
    }
    if let Some(tags) = tags {
        annotations.tags = parse_tag_list(&tags);
    }

    let id = store.save_notebook_entry(&title, &content, annotations)?;
    println!("Notebook entry '{}' created with ID: {}", title, id);
    Ok(())
}

pub fn list(store: &ChartStore, category: Option<String>) -> Result<()> {
    let entries = store.get_notebook_entries(category.as_deref());
    if entries.is_empty() {
        println!("No notebook entries found.");
        return Ok(());
    }

    println!("{:<6} {:<17} {:<12} {:<7} {}", "ID", "Modified", "Category", "Chart", "Title");
    println!("{}", "-".repeat(85));
    for e in entries {
        println!(
            "{:<6} {:<17} {:<12} {:<7} {}",
            e.id,
            e.modified_at.format("%Y-%m-%d %H:%M"),
            truncate(&e.category, 12),
            e.chart_id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
            truncate(&e.title, 40),
        );
    }
    Ok(())
}

pub fn show(store: &ChartStore, id: i64) -> Result<()> {
    let entry = match store.get_notebook_entry(id) {
        Some(e) => e,
        None => {
            println!("Notebook entry {} not found.", id);
            return Ok(());
        }
    };

    println!("\n{}", "=".repeat(80));
    println!("#{} {}", entry.id, entry.title);
    println!(
        "Category: {} | Created: {} | Modified: {}",
        entry.category,
        entry.created_at.format("%Y-%m-%d %H:%M"),
        entry.modified_at.format("%Y-%m-%d %H:%M")
    );
    if !entry.tags.is_empty() {
        println!("Tags: {}", entry.tags.join(", "));
    }
    if let Some(chart_id) = entry.chart_id {
        match store.get_chart(chart_id) {
            Some(chart) => println!("Chart: #{} {}", chart.id, chart.question),
            None => println!("Chart: #{} (deleted)", chart_id),
        }
    }
    println!("{}", "=".repeat(80));
    println!("{}", entry.content);
    Ok(())
}

/// Replace the fields that are given, keeping the rest as stored
pub fn edit(
    store: &ChartStore,
    id: i64,
    title: Option<String>,
    content: Option<String>,
    category: Option<String>,
    tags: Option<String>,
) -> Result<()> {
    let entry = store
        .get_notebook_entry(id)
        .ok_or_else(|| anyhow::anyhow!("Notebook entry not found: {}", id))?;

    let annotations = NoteAnnotations {
        category: category.unwrap_or(entry.category),
        tags: tags.map(|t| parse_tag_list(&t)).unwrap_or(entry.tags),
        chart_id: entry.chart_id,
    };
    store.update_notebook_entry(
        id,
        &title.unwrap_or(entry.title),
        &content.unwrap_or(entry.content),
        annotations,
    )?;
    println!("Updated notebook entry {}", id);
    Ok(())
}

pub fn delete(store: &ChartStore, id: i64) -> Result<()> {
    store.delete_notebook_entry(id)?;
    println!("Deleted notebook entry {}", id);
    Ok(())
}
