//! Render command implementation

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::store::ChartStore;
use crate::wheel::{render_svg, RenderOutcome};

pub fn run(store: &ChartStore, id: i64, out: Option<PathBuf>, size: f64) -> Result<()> {
    let chart = store
        .get_chart(id)
        .ok_or_else(|| anyhow::anyhow!("Chart not found: {}", id))?;

    let out = out.unwrap_or_else(|| PathBuf::from(format!("chart-{}.svg", id)));
    let (svg, outcome) = render_svg(chart, size);
    std::fs::write(&out, svg).with_context(|| format!("Failed to write {}", out.display()))?;

    match outcome {
        RenderOutcome::Wheel => println!("Wrote chart wheel to {}", out.display()),
        RenderOutcome::Placeholder => println!(
            "Chart {} has no chart data; wrote placeholder to {}",
            id,
            out.display()
        ),
        RenderOutcome::Degraded => println!(
            "Chart {} could not be drawn; wrote placeholder to {}",
            id,
            out.display()
        ),
    }
    Ok(())
}
