use anyhow::Result;

use crate::store::{parse_tag_list, ChartAnnotations, ChartStore};

/// Replace the fields that are given, keeping the rest as stored
pub fn annotate(
    store: &ChartStore,
    id: i64,
    notes: Option<String>,
    tags: Option<String>,
    category: Option<String>,
) -> Result<()> {
    let chart = store
        .get_chart(id)
        .ok_or_else(|| anyhow::anyhow!("Chart not found: {}", id))?;

    let annotations = ChartAnnotations {
        notes: notes.unwrap_or(chart.notes),
        tags: tags.map(|t| parse_tag_list(&t)).unwrap_or(chart.tags),
        category: category.unwrap_or(chart.category),
    };

    store.update_chart_annotations(id, annotations)?;
    println!("Updated chart {}", id);
    Ok(())
}

pub fn delete(store: &ChartStore, id: i64) -> Result<()> {
    store.delete_chart(id)?;
    println!("Deleted chart {}", id);
    Ok(())
}

pub fn clear(store: &ChartStore, yes: bool) -> Result<()> {
    if !yes {
        println!("Refusing to delete every chart without --yes.");
        return Ok(());
    }
    let removed = store.clear_charts()?;
    println!("Deleted {} charts. Notebook entries were kept.", removed);
    Ok(())
}
