use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::seq::SliceRandom;

use crate::dispatcher::QueryDispatcher;
use crate::models::{Book, page_count};

/// Category tabs the browse view starts with.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "文学", "心理", "艺术", "设计", "小说", "哲学", "传记", "教育", "历史", "宗教", "计算",
    "理财", "政治", "军事", "儿童",
];

/// Accumulated records for one category. Append-only until the category is
/// reset; overlapping upstream pages may repeat records and that is kept
/// as-is, no de-duplication.
#[derive(Debug, Clone, Default)]
pub struct CategoryBucket {
    pub records: Vec<Book>,
    pub total: u64,
}

/// Per-category result cache behind the browse view.
///
/// A category is either Empty (no bucket) or Loaded (bucket with N >= 0
/// records). `activate` performs the first fetch, `load_more` appends the
/// next page at the current length, `reset` clears back to Empty. All I/O
/// goes through the dispatcher; the cache only owns the mapping.
///
/// Two guards keep rapid user actions from corrupting a bucket:
/// - at most one request per category is in flight; a duplicate
///   `activate`/`load_more` while one is pending is dropped, so two rapid
///   "load more" clicks cannot double-append the same page;
/// - every request carries the category generation at issue time, and its
///   response is applied only if no `reset` bumped the generation since.
///   A stale page can never resurrect a bucket the user already cleared.
///
/// Different categories fetch independently and concurrently. Buckets are
/// never evicted; session-scoped growth is accepted.
pub struct BrowseCache {
    dispatcher: QueryDispatcher,
    page_size: usize,
    shuffle_first_page: bool,
    buckets: DashMap<String, CategoryBucket>,
    // category -> generation of the request currently in flight
    in_flight: DashMap<String, u64>,
    // bumped by reset; survives bucket removal
    generations: DashMap<String, u64>,
}

impl BrowseCache {
    pub fn new(dispatcher: QueryDispatcher, page_size: usize, shuffle_first_page: bool) -> Self {
        Self {
            dispatcher,
            page_size,
            shuffle_first_page,
            buckets: DashMap::new(),
            in_flight: DashMap::new(),
            generations: DashMap::new(),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// First activation of a category tab: fetch page zero and store it.
    /// Idempotent once Loaded. A dispatcher failure is logged and leaves
    /// the category Empty; it never propagates. Returns the number of
    /// records the bucket holds afterwards.
    pub async fn activate(&self, category: &str) -> usize {
        if let Some(bucket) = self.buckets.get(category) {
            return bucket.records.len();
        }
        let Some(generation) = self.begin(category) else {
            tracing::trace!(category, "activate dropped, request already in flight");
            return 0;
        };
        let result = self.dispatcher.fetch_page(category, 0, self.page_size).await;
        self.finish(category, generation);
        match result {
            Err(e) => {
                tracing::warn!(category, error = %e, "category fetch failed, leaving empty");
                0
            }
            Ok(page) => {
                if self.generation(category) != generation {
                    tracing::debug!(category, "dropping stale first page after reset");
                    return 0;
                }
                let mut records = page.records;
                if self.shuffle_first_page {
                    // presentation-only; appended pages keep arrival order
                    records.shuffle(&mut rand::thread_rng());
                }
                let count = records.len();
                self.buckets.insert(
                    category.to_string(),
                    CategoryBucket {
                        records,
                        total: page.total,
                    },
                );
                count
            }
        }
    }

    /// Append the next page at the current bucket length. Requires a
    /// Loaded category; on an Empty one this is a logged no-op. Returns
    /// how many records were appended.
    pub async fn load_more(&self, category: &str) -> usize {
        if !self.buckets.contains_key(category) {
            tracing::debug!(category, "load_more on a category that was never activated");
            return 0;
        }
        let Some(generation) = self.begin(category) else {
            tracing::trace!(category, "load_more dropped, request already in flight");
            return 0;
        };
        // the offset is read only while the slot is held; two requests can
        // never observe the same bucket length
        let offset = match self.buckets.get(category) {
            Some(bucket) => bucket.records.len(),
            None => {
                self.finish(category, generation);
                return 0;
            }
        };
        let result = self
            .dispatcher
            .fetch_page(category, offset, self.page_size)
            .await;
        self.finish(category, generation);
        match result {
            Err(e) => {
                tracing::warn!(category, error = %e, "load_more failed, bucket unchanged");
                0
            }
            Ok(page) => {
                if self.generation(category) != generation {
                    tracing::debug!(category, "dropping stale page after reset");
                    return 0;
                }
                match self.buckets.get_mut(category) {
                    Some(mut bucket) => {
                        let appended = page.records.len();
                        bucket.records.extend(page.records);
                        bucket.total = page.total;
                        appended
                    }
                    None => 0,
                }
            }
        }
    }

    /// Clear a category back to Empty. Any response still in flight for it
    /// becomes stale and will be dropped on arrival.
    pub fn reset(&self, category: &str) {
        *self.generations.entry(category.to_string()).or_insert(0) += 1;
        self.buckets.remove(category);
        tracing::debug!(category, "category reset");
    }

    /// The "view all" variant: drop the incremental bucket and replace it
    /// wholesale with one larger fetch.
    pub async fn view_all(&self, category: &str, limit: usize) -> usize {
        self.reset(category);
        let generation = self.begin_forced(category);
        let result = self.dispatcher.fetch_page(category, 0, limit).await;
        self.finish(category, generation);
        match result {
            Err(e) => {
                tracing::warn!(category, error = %e, "view_all fetch failed, leaving empty");
                0
            }
            Ok(page) => {
                if self.generation(category) != generation {
                    return 0;
                }
                let count = page.records.len();
                self.buckets.insert(
                    category.to_string(),
                    CategoryBucket {
                        records: page.records,
                        total: page.total,
                    },
                );
                count
            }
        }
    }

    /// Activate several categories concurrently, one outstanding request
    /// per category. Returns the combined record count.
    pub async fn prefetch<'a, I>(&self, categories: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let loads = categories.into_iter().map(|c| self.activate(c));
        futures::future::join_all(loads).await.into_iter().sum()
    }

    pub fn is_loaded(&self, category: &str) -> bool {
        self.buckets.contains_key(category)
    }

    pub fn len(&self, category: &str) -> usize {
        self.buckets
            .get(category)
            .map_or(0, |b| b.records.len())
    }

    /// Server-side total last reported for this category, if Loaded.
    pub fn total(&self, category: &str) -> Option<u64> {
        self.buckets.get(category).map(|b| b.total)
    }

    pub fn page_count(&self, category: &str) -> u64 {
        self.total(category)
            .map_or(0, |t| page_count(t, self.page_size))
    }

    /// Clone of the accumulated records for a category, if Loaded.
    pub fn snapshot(&self, category: &str) -> Option<Vec<Book>> {
        self.buckets.get(category).map(|b| b.records.clone())
    }

    fn generation(&self, category: &str) -> u64 {
        self.generations.get(category).map_or(0, |g| *g)
    }

    /// Claim the in-flight slot for a category. `None` means another
    /// request is already pending and the caller must drop its attempt.
    fn begin(&self, category: &str) -> Option<u64> {
        let generation = self.generation(category);
        match self.in_flight.entry(category.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(generation);
                Some(generation)
            }
        }
    }

    /// Claim the slot even if an older request still holds it. The old
    /// request's `finish` only removes the slot if its own generation is
    /// still recorded, so it cannot release ours.
    fn begin_forced(&self, category: &str) -> u64 {
        let generation = self.generation(category);
        self.in_flight.insert(category.to_string(), generation);
        generation
    }

    fn finish(&self, category: &str, generation: u64) {
        self.in_flight
            .remove_if(category, |_, pending| *pending == generation);
    }
}
