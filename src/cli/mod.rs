//! Command implementations for the `horary` binary

pub mod annotate;
pub mod export;
pub mod list;
pub mod note;
pub mod render;
pub mod save;
pub mod setting;
pub mod show;
pub mod stats;

/// First line of `text`, cut to `max` characters with an ellipsis
pub(crate) fn truncate(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() > max {
        let cut: String = line.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}
