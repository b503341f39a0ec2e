use crate::{
    bookmarks::{BookmarkSet, BookmarkState},
    catalog::{Catalog, ToolId},
    config::Config,
    semantic::{Ranking, SemanticSearchService},
};

use super::{
    cards::{BrowseMode, BrowseResponse, SavedTool, ToolCard},
    errors::AppError,
};

/// The catalog plus the search service, shared read-only by every session.
///
/// Per-user state (bookmarks) is passed in on each call, never stored here.
pub struct ToolHub {
    catalog: Catalog,
    search: SemanticSearchService,
    preview_chars: usize,
}

impl ToolHub {
    pub fn new(catalog: Catalog, search: SemanticSearchService, preview_chars: usize) -> Self {
        Self {
            catalog,
            search,
            preview_chars,
        }
    }

    /// Load the configured catalog and set up (but not load) the model.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let catalog = Catalog::load(config.resolved_catalog_path())?;
        let search = SemanticSearchService::new(
            config.semantic_search.clone(),
            config.base_path().to_path_buf(),
        );

        Ok(Self::new(catalog, search, config.description_preview_chars))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Load the embedding model now rather than on the first query.
    pub fn initialize(&self) -> Result<(), AppError> {
        if self.search.is_initialized() {
            return Ok(());
        }
        Ok(self.search.initialize()?)
    }

    pub fn category_options(&self) -> Vec<String> {
        self.catalog.category_options()
    }

    /// Rank by `query`, then narrow to `category`, then render cards.
    pub fn browse(
        &self,
        query: Option<&str>,
        category: &str,
        bookmarks: &BookmarkSet,
    ) -> Result<BrowseResponse, AppError> {
        if !self.catalog.has_category(category) {
            return Err(AppError::InvalidCategory(category.to_string()));
        }

        let ranking = self.search.rank(query, self.catalog.records())?;

        let no_results = ranking.is_ranked() && ranking.is_empty();
        if no_results {
            log::info!(
                "no tools cleared the similarity threshold of {}",
                self.search.threshold()
            );
        }

        let ranking = ranking.filter_by_category(category);

        let (mode, cards) = match ranking {
            Ranking::Unranked(records) => (
                BrowseMode::Unranked,
                records
                    .into_iter()
                    .map(|r| ToolCard::new(r, None, bookmarks.state(r.id), self.preview_chars))
                    .collect(),
            ),
            Ranking::Ranked(scored) => (
                BrowseMode::Ranked,
                scored
                    .into_iter()
                    .map(|s| {
                        ToolCard::new(
                            s.record,
                            Some(s.similarity),
                            bookmarks.state(s.record.id),
                            self.preview_chars,
                        )
                    })
                    .collect(),
            ),
        };

        Ok(BrowseResponse {
            mode,
            category: category.to_string(),
            no_results,
            cards,
        })
    }

    /// Flip a tool's saved state. Ids outside the catalog are ignored.
    pub fn toggle_bookmark(&self, bookmarks: &mut BookmarkSet, id: ToolId) -> Option<BookmarkState> {
        if !self.catalog.contains(id) {
            log::debug!("ignoring bookmark toggle for unknown tool {id}");
            return None;
        }

        let state = bookmarks.toggle(id);
        log::debug!("tool {id} is now {state:?}, {} saved", bookmarks.len());
        Some(state)
    }

    pub fn saved_tools(&self, bookmarks: &BookmarkSet) -> Vec<SavedTool> {
        bookmarks
            .saved(&self.catalog)
            .into_iter()
            .map(SavedTool::from)
            .collect()
    }
}
