use crate::models::Book;

/// Local asset shown when every remote cover candidate fails to load.
pub const COVER_PLACEHOLDER: &str = "white.jpg";

/// Ordered cover sources for a record: the record's own cover reference
/// first (joined onto `cover_base` when relative), then the md5-derived
/// fallback under `md5_base`, then the local placeholder. Consumers try
/// them in order; a load failure just moves to the next entry, so a
/// missing cover never surfaces as an error.
pub fn cover_candidates(book: &Book, cover_base: &str, md5_base: &str) -> Vec<String> {
    let mut candidates = Vec::with_capacity(3);

    if let Some(cover) = book.cover_url.as_deref().filter(|c| !c.is_empty()) {
        if cover.starts_with("http://") || cover.starts_with("https://") {
            candidates.push(cover.to_string());
        } else if !cover_base.is_empty() {
            candidates.push(format!(
                "{}/{}",
                cover_base.trim_end_matches('/'),
                cover.trim_start_matches('/')
            ));
        }
    }

    // a malformed digest is treated like a missing one, never an error
    if let Some(md5) = book.md5.as_deref().filter(|m| is_md5_like(m)) {
        if !md5_base.is_empty() {
            candidates.push(format!(
                "{}/covers/{}/{md5}.jpg",
                md5_base.trim_end_matches('/'),
                &md5[..3]
            ));
        }
    }

    candidates.push(COVER_PLACEHOLDER.to_string());
    candidates
}

fn is_md5_like(value: &str) -> bool {
    value.len() >= 3 && value.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(cover_url: Option<&str>, md5: Option<&str>) -> Book {
        Book {
            id: 7,
            title: "活着".to_string(),
            author: "余华".to_string(),
            publisher: None,
            extension: "epub".to_string(),
            filesize: 2048,
            language: "Chinese".to_string(),
            year: Some(1993),
            pages: None,
            isbn: String::new(),
            ipfs_cid: String::new(),
            cover_url: cover_url.map(String::from),
            md5: md5.map(String::from),
        }
    }

    #[test]
    fn test_full_chain_in_order() {
        let b = book(Some("/covers/7.jpg"), Some("d41d8cd98f00b204e9800998ecf8427e"));
        let chain = cover_candidates(&b, "http://localhost:7070", "https://libgen.is");
        assert_eq!(
            chain,
            vec![
                "http://localhost:7070/covers/7.jpg".to_string(),
                "https://libgen.is/covers/d41/d41d8cd98f00b204e9800998ecf8427e.jpg".to_string(),
                COVER_PLACEHOLDER.to_string(),
            ]
        );
    }

    #[test]
    fn test_absolute_cover_url_kept_as_is() {
        let b = book(Some("https://cdn.example.net/7.jpg"), None);
        let chain = cover_candidates(&b, "http://localhost:7070", "https://libgen.is");
        assert_eq!(chain[0], "https://cdn.example.net/7.jpg");
        assert_eq!(chain.last().unwrap(), COVER_PLACEHOLDER);
    }

    #[test]
    fn test_placeholder_only_when_nothing_known() {
        let b = book(None, None);
        let chain = cover_candidates(&b, "http://localhost:7070", "https://libgen.is");
        assert_eq!(chain, vec![COVER_PLACEHOLDER.to_string()]);
    }

    #[test]
    fn test_short_md5_is_skipped() {
        let b = book(None, Some("ab"));
        let chain = cover_candidates(&b, "", "https://libgen.is");
        assert_eq!(chain, vec![COVER_PLACEHOLDER.to_string()]);
    }

    #[test]
    fn test_garbage_md5_falls_through_to_placeholder() {
        // a multibyte field must not panic on the prefix slice
        let b = book(None, Some("éé"));
        let chain = cover_candidates(&b, "http://localhost:7070", "https://libgen.is");
        assert_eq!(chain, vec![COVER_PLACEHOLDER.to_string()]);

        // non-hex ASCII is skipped too
        let b = book(None, Some("not-a-digest"));
        let chain = cover_candidates(&b, "http://localhost:7070", "https://libgen.is");
        assert_eq!(chain, vec![COVER_PLACEHOLDER.to_string()]);
    }
}
