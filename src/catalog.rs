use serde::{Deserialize, Serialize};
use std::{fmt::Display, path::Path, time::Instant};

/// Category sentinel that disables category filtering.
pub const ALL_CATEGORIES: &str = "All";

const COL_NAME: &str = "Tool Name";
const COL_CATEGORY: &str = "Category";
const COL_DESCRIPTION: &str = "Description";
const COL_URL: &str = "URL";

/// Stable identifier of a tool: its zero-based row position in the catalog.
///
/// Names are not unique in the dataset, so bookmarks are keyed on this instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolId(pub usize);

impl Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolRecord {
    pub id: ToolId,
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub url: String,
}

impl ToolRecord {
    /// Text fed to the embedding model. A missing description embeds as "".
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn matches_category(&self, category: &str) -> bool {
        category == ALL_CATEGORIES || self.category.as_deref() == Some(category)
    }
}

/// A catalog row before it has been assigned an id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolRow {
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("catalog is missing required column \"{0}\"")]
    MissingColumn(&'static str),

    #[error("row {row}: missing required value for \"{column}\"")]
    MissingField { row: usize, column: &'static str },
}

/// Immutable, ordered set of tools. Row order is the default display order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<ToolRecord>,
}

impl Catalog {
    pub fn from_rows(rows: impl IntoIterator<Item = ToolRow>) -> Self {
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(idx, row)| ToolRecord {
                id: ToolId(idx),
                name: row.name,
                category: non_blank(row.category),
                description: non_blank(row.description),
                url: row.url,
            })
            .collect();

        Self { records }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let now = Instant::now();

        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)?;

        let headers = csv_reader.byte_headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| decode_cell(h).trim() == name)
                .ok_or(CatalogError::MissingColumn(name))
        };
        let name_col = column(COL_NAME)?;
        let url_col = column(COL_URL)?;
        let category_col = column(COL_CATEGORY).ok();
        let description_col = column(COL_DESCRIPTION).ok();

        let mut rows = vec![];
        for (idx, record) in csv_reader.byte_records().enumerate() {
            let record = record?;
            // header is line 1
            let row = idx + 2;
            let cell = |col: Option<usize>| col.and_then(|c| record.get(c)).map(decode_cell);

            let name = cell(Some(name_col))
                .filter(|v| !v.trim().is_empty())
                .ok_or(CatalogError::MissingField {
                    row,
                    column: COL_NAME,
                })?;
            let url = cell(Some(url_col))
                .filter(|v| !v.trim().is_empty())
                .ok_or(CatalogError::MissingField { row, column: COL_URL })?;

            rows.push(ToolRow {
                name,
                category: cell(category_col),
                description: cell(description_col),
                url,
            });
        }

        let catalog = Self::from_rows(rows);
        if catalog.is_empty() {
            log::warn!("{} contains no tools", path.display());
        }

        log::info!(
            "loaded {} tools from {} in {}ms",
            catalog.len(),
            path.display(),
            now.elapsed().as_micros() as f64 / 1000.0
        );

        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: ToolId) -> Option<&ToolRecord> {
        self.records.get(id.0)
    }

    pub fn contains(&self, id: ToolId) -> bool {
        id.0 < self.records.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[ToolRecord] {
        &self.records
    }

    /// Distinct non-empty categories, sorted ascending.
    pub fn categories(&self) -> Vec<String> {
        let mut categories = self
            .iter()
            .filter_map(|r| r.category.clone())
            .collect::<Vec<_>>();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Options offered by the category filter: the "All" sentinel first.
    pub fn category_options(&self) -> Vec<String> {
        let mut options = vec![ALL_CATEGORIES.to_string()];
        options.extend(self.categories());
        options
    }

    pub fn has_category(&self, category: &str) -> bool {
        category == ALL_CATEGORIES
            || self
                .iter()
                .any(|r| r.category.as_deref() == Some(category))
    }
}

/// Keep the records whose category equals `category` exactly.
/// `"All"` returns the input unchanged.
pub fn filter_by_category<'a, I>(records: I, category: &str) -> Vec<&'a ToolRecord>
where
    I: IntoIterator<Item = &'a ToolRecord>,
{
    records
        .into_iter()
        .filter(|r| r.matches_category(category))
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// UTF-8 when valid, otherwise Latin-1 (every byte maps to the same code point).
fn decode_cell(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
