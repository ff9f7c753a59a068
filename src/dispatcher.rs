use crate::backend::{BackendError, SearchBackend};
use crate::models::{Book, SearchQuery};

/// One page of category results plus the server-side total for the
/// numbered-pagination view.
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    pub records: Vec<Book>,
    pub total: u64,
}

/// Stateless translation of a (category, offset) pair into one search
/// request. All accumulation state lives in the cache.
pub struct QueryDispatcher {
    backend: Box<dyn SearchBackend>,
}

impl QueryDispatcher {
    pub fn new(backend: Box<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Fetch one page of results for a category. The category label is
    /// sanitized before being used as the free-text query term, so the
    /// visible tab label and the upstream term may differ.
    pub async fn fetch_page(
        &self,
        category: &str,
        offset: usize,
        limit: usize,
    ) -> Result<FetchedPage, BackendError> {
        if limit == 0 {
            return Err(BackendError::InvalidLimit);
        }
        let query = SearchQuery {
            query: Some(strip_decorations(category)),
            limit,
            offset,
            ..Default::default()
        };
        let results = self.backend.search(&query).await?;
        Ok(FetchedPage {
            records: results.books,
            total: results.total,
        })
    }
}

/// Strip decorative emoji (and the variation selector that often trails
/// them) from a category label. Tab labels may carry pictographs that the
/// upstream index does not know about.
pub fn strip_decorations(label: &str) -> String {
    label
        .chars()
        .filter(|c| !matches!(c, '\u{1F300}'..='\u{1FAFF}' | '\u{FE0F}'))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_decorations_removes_emoji() {
        assert_eq!(strip_decorations("📚 文学"), "文学");
        assert_eq!(strip_decorations("🚀 计算"), "计算");
        assert_eq!(strip_decorations("❤\u{FE0F}心理"), "❤心理");
    }

    #[test]
    fn test_strip_decorations_keeps_plain_labels() {
        assert_eq!(strip_decorations("哲学"), "哲学");
        assert_eq!(strip_decorations("history"), "history");
    }
}
