//! Presentation model handed to the CLI and HTTP layers.

use crate::{
    bookmarks::BookmarkState,
    catalog::{ToolId, ToolRecord},
};
use serde::Serialize;

/// Ellipsis suffix when a description preview is cut
const TRUNCATION_SUFFIX: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowseMode {
    Unranked,
    Ranked,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCard {
    pub id: ToolId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub description: String,
    pub url: String,
    pub state: BookmarkState,
    /// Only present for ranked results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
}

impl ToolCard {
    pub fn new(
        record: &ToolRecord,
        similarity: Option<f32>,
        state: BookmarkState,
        preview_chars: usize,
    ) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            category: record.category.clone(),
            description: preview(record.description_text(), preview_chars),
            url: record.url.clone(),
            state,
            similarity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrowseResponse {
    pub mode: BrowseMode,
    pub category: String,
    /// True when a query was given and nothing cleared the threshold.
    pub no_results: bool,
    pub cards: Vec<ToolCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedTool {
    pub id: ToolId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub url: String,
}

impl From<&ToolRecord> for SavedTool {
    fn from(record: &ToolRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            category: record.category.clone(),
            url: record.url.clone(),
        }
    }
}

/// First `max_chars` characters of `text`, with an ellipsis if anything was cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_SUFFIX),
    }
}
