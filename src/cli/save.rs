//! Save command implementation

use anyhow::Result;
use tracing::info;

use crate::engine::{form_field, EngineCapability, JudgmentEngine, Question};
use crate::store::{parse_tag_list, ChartAnnotations, ChartStore};

pub struct SaveArgs {
    pub question: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<String>,
    pub category: Option<String>,
}

/// Judge a question with `engine` and store the result
pub fn run(store: &ChartStore, engine: &dyn JudgmentEngine, args: SaveArgs) -> Result<()> {
    println!("Using engine {} ({})", engine.id(), engine.description());

    if let EngineCapability::Unavailable { reason } = engine.capability() {
        anyhow::bail!("Judgment engine unavailable: {}", reason);
    }

    let question = Question {
        text: args.question.clone().unwrap_or_default(),
        location: args.location.clone().unwrap_or_default(),
        ..Default::default()
    };
    let result = engine.judge(&question)?;

    // Engines echo the submitted form; fall back to it for anything not given here
    let text = args
        .question
        .or_else(|| form_field(&result, "question").map(str::to_string))
        .unwrap_or_default();
    let location = args
        .location
        .or_else(|| form_field(&result, "location").map(str::to_string))
        .unwrap_or_default();

    let mut annotations = ChartAnnotations::default();
    if let Some(notes) = args.notes {
        annotations.notes = notes;
    }
    if let Some(tags) = args.tags {
        annotations.tags = parse_tag_list(&tags);
    }
    if let Some(category) = args.category {
        annotations.category = category;
    }

    let id = store.save_chart(&text, &location, &result, annotations)?;
    info!("Saved chart {} from {}", id, engine.id());

    println!(
        "Chart {} saved: {} ({}% confidence)",
        id,
        result.judgment,
        result.confidence_percent()
    );
    Ok(())
}
