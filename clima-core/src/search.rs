//! Debounced city search behind the autocomplete box.
//!
//! Keystrokes reset a timer; when it expires the query is dispatched. An
//! in-flight request is never cancelled, but every dispatch is numbered and a
//! response older than one that already completed is dropped.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tokio::{sync::watch, task::JoinHandle};

use crate::{model::CitySearchResult, provider::WeatherProvider};

/// Shorter queries never reach the provider.
pub const MIN_QUERY_CHARS: usize = 2;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<CitySearchResult>,
    pub is_searching: bool,
    /// Dispatches that have finished, whatever their outcome.
    pub completed: u64,
}

#[derive(Debug, Default)]
struct Dispatch {
    /// Sequence number of the newest dispatched search.
    issued: u64,
    /// Responses at or below this number are stale. Moves forward on every
    /// completion that is not itself stale, failed ones included.
    applied: u64,
    in_flight: usize,
}

pub struct CitySearch {
    provider: Arc<dyn WeatherProvider>,
    debounce: Duration,
    state: Arc<watch::Sender<SearchState>>,
    dispatch: Arc<Mutex<Dispatch>>,
    timer: Option<JoinHandle<()>>,
}

impl CitySearch {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self::with_debounce(provider, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(provider: Arc<dyn WeatherProvider>, debounce: Duration) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            provider,
            debounce,
            state: Arc::new(state),
            dispatch: Arc::new(Mutex::new(Dispatch::default())),
            timer: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Record a keystroke. Must be called from within a tokio runtime.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        self.state.send_modify(|s| s.query = query.clone());

        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        if query.chars().count() < MIN_QUERY_CHARS {
            self.discard_pending();
            self.state.send_modify(|s| s.results.clear());
            return;
        }

        let provider = Arc::clone(&self.provider);
        let state = Arc::clone(&self.state);
        let dispatch = Arc::clone(&self.dispatch);
        let debounce = self.debounce;

        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            let seq = {
                let mut d = dispatch.lock().unwrap_or_else(PoisonError::into_inner);
                d.issued += 1;
                d.in_flight += 1;
                d.issued
            };
            state.send_modify(|s| s.is_searching = true);
            tracing::debug!(%query, seq, "dispatching city search");

            // Detached so the next keystroke cannot cancel it.
            tokio::spawn(run_search(provider, state, dispatch, query, seq));
        }));
    }

    /// Reset query and results. Responses still in flight are ignored.
    pub fn clear(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.discard_pending();
        self.state.send_modify(|s| {
            s.query.clear();
            s.results.clear();
        });
    }

    fn discard_pending(&self) {
        let mut d = self.dispatch.lock().unwrap_or_else(PoisonError::into_inner);
        d.applied = d.issued;
    }
}

impl Drop for CitySearch {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

async fn run_search(
    provider: Arc<dyn WeatherProvider>,
    state: Arc<watch::Sender<SearchState>>,
    dispatch: Arc<Mutex<Dispatch>>,
    query: String,
    seq: u64,
) {
    let outcome = provider.search_cities(&query).await;

    // Held while publishing so two completions cannot interleave.
    let mut d = dispatch.lock().unwrap_or_else(PoisonError::into_inner);
    d.in_flight -= 1;
    let still_searching = d.in_flight > 0;

    match outcome {
        Ok(results) if seq > d.applied => {
            d.applied = seq;
            tracing::debug!(%query, seq, count = results.len(), "city search completed");
            state.send_modify(|s| {
                s.results = results;
                s.is_searching = still_searching;
                s.completed += 1;
            });
        }
        Ok(_) => {
            tracing::debug!(%query, seq, applied = d.applied, "dropping stale city search response");
            state.send_modify(|s| {
                s.is_searching = still_searching;
                s.completed += 1;
            });
        }
        Err(err) => {
            tracing::error!(%query, error = %err, "city search failed");
            d.applied = d.applied.max(seq);
            state.send_modify(|s| {
                s.is_searching = still_searching;
                s.completed += 1;
            });
        }
    }
}
