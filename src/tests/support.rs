//! Deterministic stand-ins for the embedding model.

use crate::catalog::{Catalog, ToolRow};
use crate::semantic::{Embedder, EmbeddingError};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Words grouped into concepts; each concept is one vector dimension.
const CONCEPTS: &[&[&str]] = &[
    &["generate", "generates", "create", "creates", "make", "makes"],
    &["image", "images", "picture", "pictures", "photo", "photos"],
    &["text", "conversational", "chat", "replies", "reply"],
    &["code", "coding", "program", "programming"],
    &["video", "videos", "clip", "clips"],
    &["music", "audio", "song", "songs"],
];

/// Bag-of-concepts embedder: counts how often each concept's words occur.
///
/// Texts without any known word (including "") map to the zero vector.
#[derive(Default)]
pub struct KeywordEmbedder {
    pub single_calls: AtomicUsize,
    pub batch_calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; CONCEPTS.len()];
        for word in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            for (dim, words) in CONCEPTS.iter().enumerate() {
                if words.contains(&word) {
                    vector[dim] += 1.0;
                }
            }
        }
        vector
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub fn single_calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst)
    }
}

impl Embedder for KeywordEmbedder {
    fn name(&self) -> &str {
        "keyword"
    }

    fn dimensions(&self) -> usize {
        CONCEPTS.len()
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector(text))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

/// Embedder that always fails, for error-path tests.
pub struct BrokenEmbedder;

impl Embedder for BrokenEmbedder {
    fn name(&self) -> &str {
        "broken"
    }

    fn dimensions(&self) -> usize {
        0
    }

    fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::EmbeddingFailed("model unavailable".to_string()))
    }

    fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Err(EmbeddingError::EmbeddingFailed("model unavailable".to_string()))
    }
}

pub fn tool(name: &str, category: Option<&str>, description: Option<&str>, url: &str) -> ToolRow {
    ToolRow {
        name: name.to_string(),
        category: category.map(String::from),
        description: description.map(String::from),
        url: url.to_string(),
    }
}

/// The two-tool catalog used throughout: a chat bot and an image generator.
pub fn chat_and_image_catalog() -> Catalog {
    Catalog::from_rows(vec![
        tool(
            "ChatBot",
            Some("Chat"),
            Some("Generates conversational text replies"),
            "http://a",
        ),
        tool(
            "ImgGen",
            Some("Image"),
            Some("Creates images from text prompts"),
            "http://b",
        ),
    ])
}

/// A larger catalog with ties, blanks and a duplicate name.
pub fn mixed_catalog() -> Catalog {
    Catalog::from_rows(vec![
        tool("Painter", Some("Image"), Some("Creates pictures"), "http://p"),
        tool("Blank", Some("Misc"), None, "http://blank"),
        tool("Photo Maker", Some("Image"), Some("Makes photos"), "http://pm"),
        tool("Coder", Some("Code"), Some("Writes code"), "http://c"),
        tool("Painter", None, Some("Creates images"), "http://p2"),
        tool("Tunes", Some("Audio"), Some("Generates music"), "http://t"),
    ])
}
