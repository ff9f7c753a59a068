use serde::{Deserialize, Serialize};

/// One catalog entry as returned by the search endpoint. Optional fields
/// that the upstream omits deserialize to `None`/empty and are rendered as
/// omitted, never as errors.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Book {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub publisher: Option<String>,
    pub extension: String,
    pub filesize: u64,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub pages: Option<u32>,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub ipfs_cid: String,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub md5: Option<String>,
}

impl Book {
    /// Human-readable filesize for presentation, e.g. "3.1 MB".
    pub fn human_filesize(&self) -> String {
        const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
        let mut size = self.filesize as f64;
        let mut unit = 0;
        while size >= 1024.0 && unit < UNITS.len() - 1 {
            size /= 1024.0;
            unit += 1;
        }
        if unit == 0 {
            format!("{} B", self.filesize)
        } else {
            format!("{size:.1} {}", UNITS[unit])
        }
    }
}

/// Query sent to a search backend. Structured fields and the free-text
/// `query` term are all optional; empty fields are never sent upstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub extension: Option<String>,
    pub language: Option<String>,
    pub isbn: Option<String>,
    pub md5: Option<String>,
    pub query: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl SearchQuery {
    /// Flatten into URL query parameters, dropping unset or empty fields.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(id) = self.id {
            params.push(("id", id.to_string()));
        }
        let fields = [
            ("title", &self.title),
            ("author", &self.author),
            ("publisher", &self.publisher),
            ("extension", &self.extension),
            ("language", &self.language),
            ("isbn", &self.isbn),
            ("md5", &self.md5),
            ("query", &self.query),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                if !value.is_empty() {
                    params.push((key, value.clone()));
                }
            }
        }
        params.push(("limit", self.limit.to_string()));
        params.push(("offset", self.offset.to_string()));
        params
    }
}

/// Body of a successful search response. `books` defaults to empty and
/// `total` to zero when the upstream leaves them out.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SearchResults {
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub total: u64,
}

impl SearchResults {
    /// Number of pages the numbered-pagination view needs for this result
    /// set: `ceil(total / page_size)`.
    pub fn page_count(&self, page_size: usize) -> u64 {
        page_count(self.total, page_size)
    }
}

pub fn page_count(total: u64, page_size: usize) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size as u64)
}
