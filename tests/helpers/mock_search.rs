use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use ragcompare::search::{Backend, ResultItem, Search, SearchError};

/// Searcher returning canned results and recording what it was asked.
pub struct MockSearch {
    backend: Backend,
    results: Vec<ResultItem>,
    calls: AtomicUsize,
    last: Mutex<Option<(String, usize)>>,
}

impl MockSearch {
    pub fn new(backend: Backend, results: Vec<ResultItem>) -> Self {
        Self {
            backend,
            results,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Query and k of the most recent call
    pub fn last_call(&self) -> Option<(String, usize)> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl Search for MockSearch {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<ResultItem>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((query.to_string(), k));
        Ok(self.results.iter().take(k).cloned().collect())
    }

    fn backend(&self) -> Backend {
        self.backend
    }
}

/// Searcher whose engine is always down.
pub struct FailingSearch {
    pub backend: Backend,
    pub message: String,
}

#[async_trait]
impl Search for FailingSearch {
    async fn search(&self, _query: &str, _k: usize) -> Result<Vec<ResultItem>, SearchError> {
        Err(SearchError::BackendUnavailable(self.message.clone()))
    }

    fn backend(&self) -> Backend {
        self.backend
    }
}
