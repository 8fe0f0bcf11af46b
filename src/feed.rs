use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::ReviewBackend;
use crate::error::ClientError;
use crate::listing::ReviewPage;
use crate::store::{FetchRequest, FilterAction, LoadState, ReviewStore};

struct Completion {
    seq: u64,
    result: Result<ReviewPage, ClientError>,
}

/// Runs the store's fetches on the tokio runtime.
///
/// Issuing a new action aborts the fetch still in flight. A fetch that
/// finished just before the abort still reaches the channel; the store's
/// sequence check drops it.
pub struct ReviewFeed<B: ReviewBackend + 'static> {
    backend: Arc<B>,
    store: ReviewStore,
    in_flight: Option<(u64, JoinHandle<()>)>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<B: ReviewBackend + 'static> ReviewFeed<B> {
    pub fn new(backend: Arc<B>, store: ReviewStore) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            backend,
            store,
            in_flight: None,
            completions_tx,
            completions_rx,
        }
    }

    pub fn store(&self) -> &ReviewStore {
        &self.store
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Apply `action` and start the fetch it calls for, if any.
    pub fn dispatch(&mut self, action: FilterAction) {
        if let Some(request) = self.store.dispatch(action) {
            self.spawn_fetch(request);
        }
    }

    fn spawn_fetch(&mut self, request: FetchRequest) {
        if let Some((seq, handle)) = self.in_flight.take() {
            debug!(seq, "aborting superseded review fetch");
            handle.abort();
        }

        let backend = Arc::clone(&self.backend);
        let tx = self.completions_tx.clone();
        let seq = request.seq;
        let handle = tokio::spawn(async move {
            let result = backend.fetch_reviews(&request.query).await;
            // The receiver lives as long as the feed.
            let _ = tx.send(Completion {
                seq: request.seq,
                result,
            });
        });
        self.in_flight = Some((seq, handle));
    }

    /// Abort the current fetch. The store moves to `Errored` with
    /// [`ClientError::Aborted`] and keeps the last loaded page.
    pub fn cancel(&mut self) {
        if let Some((seq, handle)) = self.in_flight.take() {
            handle.abort();
            self.store.complete(seq, Err(ClientError::Aborted));
        }
    }

    /// Apply every completion that has already arrived without waiting.
    /// Returns whether the visible state changed.
    pub fn poll(&mut self) -> bool {
        // Checked before draining: a task that finished has already sent
        // its completion unless it died first.
        let finished = self
            .in_flight
            .as_ref()
            .is_some_and(|(_, handle)| handle.is_finished());

        let mut changed = false;
        while let Ok(completion) = self.completions_rx.try_recv() {
            changed |= self.apply(completion);
        }

        if finished {
            if let Some((seq, _)) = self.in_flight.take() {
                warn!(seq, "review fetch ended without a result");
                changed |= self.store.complete(
                    seq,
                    Err(ClientError::Task("fetch ended without a result".to_string())),
                );
            }
        }
        changed
    }

    /// Wait until the most recent fetch has been applied.
    pub async fn settle(&mut self) {
        while self.store.state() == LoadState::Loading {
            let Some((seq, handle)) = self.in_flight.take() else {
                break;
            };
            if let Err(e) = handle.await {
                warn!(seq, error = %e, "review fetch task failed");
                self.store.complete(seq, Err(ClientError::Task(e.to_string())));
            }
            self.poll();
        }
    }

    fn apply(&mut self, completion: Completion) -> bool {
        let applied = self.store.complete(completion.seq, completion.result);
        if applied && matches!(&self.in_flight, Some((seq, _)) if *seq == completion.seq) {
            self.in_flight = None;
        }
        applied
    }
}
