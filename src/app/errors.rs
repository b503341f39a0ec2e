use crate::{catalog::CatalogError, eid::Eid, semantic::SemanticSearchError};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("session {0} not found")]
    SessionNotFound(Eid),

    #[error("unknown category \"{0}\"")]
    InvalidCategory(String),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("search error: {0}")]
    Search(#[from] SemanticSearchError),
}
