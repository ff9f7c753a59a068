use anyhow::Context;
use async_trait::async_trait;
use reqwest::Url;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::config::CONFIG;
use crate::models::{Book, SearchQuery, SearchResults};

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid search endpoint: {0}")]
    Endpoint(String),

    #[error("page limit must be greater than zero")]
    InvalidLimit,

    #[error("unknown backend kind: {0}")]
    UnknownKind(String),
}

/// Seam between the client and wherever search results come from. The
/// implementation is selected once at startup; callers only see the trait.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    fn name(&self) -> &str;

    /// One best-effort search attempt. No retries, no backoff.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResults, BackendError>;
}

/// Talks to the remote catalog over HTTP: one GET per search, JSON body
/// with `books` and `total`.
pub struct HttpBackend {
    client: reqwest::Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base = Url::parse(base_url).map_err(|e| BackendError::Endpoint(e.to_string()))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    /// Full request URL for a query, with empty fields already dropped.
    pub fn endpoint(&self, query: &SearchQuery) -> Result<Url, BackendError> {
        let base = format!("{}/search", self.base.as_str().trim_end_matches('/'));
        Url::parse_with_params(&base, query.to_params())
            .map_err(|e| BackendError::Endpoint(e.to_string()))
    }
}

#[async_trait]
impl SearchBackend for HttpBackend {
    fn name(&self) -> &str {
        "remote"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResults, BackendError> {
        let url = self.endpoint(query)?;
        tracing::debug!(%url, "dispatching search request");
        let results = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<SearchResults>()
            .await?;
        Ok(results)
    }
}

/// In-memory backend over a fixed record list. Filters on the structured
/// fields and paginates with limit/offset like the remote endpoint does.
/// Backs offline demos and deterministic tests.
pub struct StaticBackend {
    books: Vec<Book>,
}

impl StaticBackend {
    pub fn with_books(books: Vec<Book>) -> Self {
        Self { books }
    }

    fn matches(book: &Book, query: &SearchQuery) -> bool {
        fn contains(haystack: &str, needle: &Option<String>) -> bool {
            match needle.as_deref() {
                None | Some("") => true,
                Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
            }
        }
        fn equals(value: &str, wanted: &Option<String>) -> bool {
            match wanted.as_deref() {
                None | Some("") => true,
                Some(w) => value.eq_ignore_ascii_case(w),
            }
        }

        let free_text = match query.query.as_deref() {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                book.title.to_lowercase().contains(&term)
                    || book.author.to_lowercase().contains(&term)
                    || book
                        .publisher
                        .as_deref()
                        .is_some_and(|p| p.to_lowercase().contains(&term))
                    || book.isbn.contains(&term)
            }
        };

        free_text
            && query.id.is_none_or(|id| id == book.id)
            && contains(&book.title, &query.title)
            && contains(&book.author, &query.author)
            && contains(book.publisher.as_deref().unwrap_or(""), &query.publisher)
            && contains(&book.isbn, &query.isbn)
            && equals(&book.extension, &query.extension)
            && equals(&book.language, &query.language)
            && equals(book.md5.as_deref().unwrap_or(""), &query.md5)
    }
}

#[async_trait]
impl SearchBackend for StaticBackend {
    fn name(&self) -> &str {
        "static"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResults, BackendError> {
        let matched: Vec<&Book> = self
            .books
            .iter()
            .filter(|b| Self::matches(b, query))
            .collect();
        let total = matched.len() as u64;
        let books = matched
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect();
        Ok(SearchResults { books, total })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Remote,
    Static,
}

impl FromStr for BackendKind {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "remote" => Ok(BackendKind::Remote),
            "static" => Ok(BackendKind::Static),
            other => Err(BackendError::UnknownKind(other.to_string())),
        }
    }
}

/// Pick the search backend once at startup from configuration. The static
/// variant reads its record list from the configured fixture file.
pub fn select_backend(kind: BackendKind) -> anyhow::Result<Box<dyn SearchBackend>> {
    match kind {
        BackendKind::Remote => {
            let backend = HttpBackend::new(
                &CONFIG.api_base_url,
                Duration::from_secs(CONFIG.timeout_secs),
            )?;
            Ok(Box::new(backend))
        }
        BackendKind::Static => {
            let books = if CONFIG.fixture_path.is_empty() {
                Vec::new()
            } else {
                let raw = std::fs::read_to_string(&CONFIG.fixture_path)
                    .with_context(|| format!("Failed to read fixture {}", CONFIG.fixture_path))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to parse fixture {}", CONFIG.fixture_path))?
            };
            Ok(Box::new(StaticBackend::with_books(books)))
        }
    }
}
