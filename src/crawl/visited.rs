// src/crawl/visited.rs
// =============================================================================
// Set of URLs already claimed by a page task.
//
// One VisitedSet lives exactly as long as one crawl. It only ever grows.
// `check_and_mark` is the single point where two tasks racing on the same
// URL are told apart: exactly one of them wins the claim.
// =============================================================================

use dashmap::DashSet;

#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: DashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `url` for the caller.
    ///
    /// Returns `true` if the URL was already claimed (the caller must back
    /// off) and `false` if this call claimed it. Insert-if-absent happens
    /// under the shard lock, so concurrent callers cannot both get `false`.
    pub fn check_and_mark(&self, url: &str) -> bool {
        !self.urls.insert(url.to_string())
    }

    // Racy peek; only good for skipping obviously redundant spawns
    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
