//! Fetch-once cells.
//!
//! A [`FetchCell`] holds the outcome of a single asynchronous lookup. The
//! first caller runs the fetch; concurrent callers wait for it; every later
//! caller receives the stored outcome, including a stored failure.

use std::future::Future;

use tokio::sync::Mutex;

/// Lifecycle of a cell's value.
#[derive(Debug)]
enum FetchState<T, E> {
    NotFetched,
    Pending,
    Ready(T),
    Failed(E),
}

/// Observable status of a [`FetchCell`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchStatus {
    NotFetched,
    Pending,
    Ready,
    Failed,
}

/// A lazily fetched value that is fetched at most once.
#[derive(Debug)]
pub struct FetchCell<T, E> {
    state: Mutex<FetchState<T, E>>,
}

impl<T: Clone, E: Clone> FetchCell<T, E> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FetchState::NotFetched),
        }
    }

    /// Return the cached outcome, running `fetch` if this is the first use.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut state = self.state.lock().await;
        match &*state {
            FetchState::Ready(value) => return Ok(value.clone()),
            FetchState::Failed(err) => return Err(err.clone()),
            FetchState::NotFetched | FetchState::Pending => {}
        }

        *state = FetchState::Pending;
        let outcome = fetch().await;
        *state = match &outcome {
            Ok(value) => FetchState::Ready(value.clone()),
            Err(err) => FetchState::Failed(err.clone()),
        };
        outcome
    }

    /// Current status without waiting. A fetch in progress reports `Pending`.
    pub fn status(&self) -> FetchStatus {
        match self.state.try_lock() {
            Err(_) => FetchStatus::Pending,
            Ok(state) => match &*state {
                FetchState::NotFetched => FetchStatus::NotFetched,
                FetchState::Pending => FetchStatus::Pending,
                FetchState::Ready(_) => FetchStatus::Ready,
                FetchState::Failed(_) => FetchStatus::Failed,
            },
        }
    }
}

impl<T: Clone, E: Clone> Default for FetchCell<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn fetches_once_on_success() {
        let cell: FetchCell<u32, String> = FetchCell::new();
        let calls = AtomicUsize::new(0);
        assert_eq!(cell.status(), FetchStatus::NotFetched);

        for _ in 0..3 {
            let value = cell
                .get_or_fetch(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await;
            assert_eq!(value, Ok(7));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cell.status(), FetchStatus::Ready);
    }

    #[tokio::test]
    async fn failures_are_cached() {
        let cell: FetchCell<u32, String> = FetchCell::new();
        let first = cell.get_or_fetch(|| async { Err("down".to_string()) }).await;
        let second = cell.get_or_fetch(|| async { Ok(1) }).await;
        assert_eq!(first, Err("down".to_string()));
        assert_eq!(second, Err("down".to_string()));
        assert_eq!(cell.status(), FetchStatus::Failed);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_fetch() {
        let cell: Arc<FetchCell<u32, String>> = Arc::new(FetchCell::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let cell = Arc::clone(&cell);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cell.get_or_fetch(|| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    Ok(42)
                })
                .await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(42));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
