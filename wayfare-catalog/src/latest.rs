use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome<T> {
    Fresh(T),
    /// A newer search started while this one was in flight; its result was dropped.
    Superseded,
}

/// Keeps only the result of the most recently started search, so a slow
/// request that finishes late cannot overwrite a newer one.
pub struct LatestSearch<T> {
    generation: AtomicU64,
    latest: Mutex<Option<T>>,
}

impl<T: Clone> LatestSearch<T> {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            latest: Mutex::new(None),
        }
    }

    /// Start a search and get its generation token.
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == token
    }

    /// Store `result` if `token` is still the newest generation.
    pub async fn commit(&self, token: u64, result: T) -> SearchOutcome<T> {
        let mut latest = self.latest.lock().await;
        if !self.is_current(token) {
            debug!(token, "Discarding superseded search result");
            return SearchOutcome::Superseded;
        }
        *latest = Some(result.clone());
        SearchOutcome::Fresh(result)
    }

    pub async fn run<F>(&self, search: F) -> SearchOutcome<T>
    where
        F: Future<Output = T>,
    {
        let token = self.begin();
        let result = search.await;
        self.commit(token, result).await
    }

    pub async fn latest(&self) -> Option<T> {
        self.latest.lock().await.clone()
    }
}

impl<T: Clone> Default for LatestSearch<T> {
    fn default() -> Self {
        Self::new()
    }
}
