use std::sync::Arc;

use log::{debug, error, warn};
use tokio::sync::{mpsc, watch};

use crate::config::{DashboardConfig, StaleResultPolicy};
use crate::error::FetchError;
use crate::fetch::{FetchResult, PriceSample, QuoteService, WindowQuery};

use super::catalog::CatalogStore;
use super::state::{DashboardState, RequestPhase};

/// Shown when the instrument listing cannot be fetched at startup.
pub const CATALOG_FAILURE_MESSAGE: &str = "Failed to fetch stocks";

/// User intents forwarded by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SelectInstrument(String),
    SetWindowMinutes(i64),
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    CurrentPrice,
    History,
}

impl RequestKind {
    fn label(self) -> &'static str {
        match self {
            RequestKind::CurrentPrice => "current price",
            RequestKind::History => "price history",
        }
    }
}

#[derive(Debug)]
pub enum FetchOutcome {
    CurrentPrice(FetchResult<PriceSample>),
    History(FetchResult<Vec<PriceSample>>),
}

/// Completion of one request, tagged with the submission that issued it.
#[derive(Debug)]
pub struct FetchEvent {
    pub submission: u64,
    pub query: WindowQuery,
    pub outcome: FetchOutcome,
}

#[derive(Debug)]
struct Inflight {
    submission: u64,
    pending: u8,
    failed: bool,
}

/// Owns `DashboardState` and drives the request lifecycle.
///
/// Each submission spawns the current-price and history requests as separate
/// tasks that report back over a channel; results are applied one at a time
/// through [`FetchCoordinator::apply`] as they arrive.
pub struct FetchCoordinator {
    service: Arc<dyn QuoteService>,
    state: DashboardState,
    stale_results: StaleResultPolicy,
    last_submission: u64,
    /// Submissions at or below this id predate the current selection.
    selection_epoch: u64,
    inflight: Option<Inflight>,
    events_tx: mpsc::UnboundedSender<FetchEvent>,
    events_rx: mpsc::UnboundedReceiver<FetchEvent>,
    snapshot_tx: watch::Sender<DashboardState>,
}

impl FetchCoordinator {
    pub fn new(service: Arc<dyn QuoteService>, config: &DashboardConfig) -> Self {
        let state = DashboardState::new(config.default_window_minutes);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(state.clone());

        Self {
            service,
            state,
            stale_results: config.stale_results,
            last_submission: 0,
            selection_epoch: 0,
            inflight: None,
            events_tx,
            events_rx,
            snapshot_tx,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Read-only feed of state snapshots; yields the latest one immediately.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.snapshot_tx.subscribe()
    }

    /// True once the latest submission has no request left in flight.
    pub fn is_settled(&self) -> bool {
        self.inflight.is_none()
    }

    /// Populate the catalog. Runs at most once per coordinator.
    pub async fn load_catalog(&mut self) {
        if self.state.catalog().is_loaded() {
            debug!("Catalog already loaded, skipping reload");
            return;
        }

        match CatalogStore::load(self.service.as_ref()).await {
            Ok(catalog) => self.state.set_catalog(catalog),
            Err(err) => {
                error!("{CATALOG_FAILURE_MESSAGE}: {err}");
                self.state.set_catalog(CatalogStore::unavailable());
                self.state.set_error(CATALOG_FAILURE_MESSAGE);
            }
        }
        self.publish();
    }

    pub fn handle(&mut self, intent: Intent) -> FetchResult<()> {
        match intent {
            Intent::SelectInstrument(symbol) => self.select_instrument(&symbol),
            Intent::SetWindowMinutes(minutes) => self.set_window_minutes(minutes),
            Intent::Submit => {
                self.submit()?;
            }
        }
        Ok(())
    }

    /// Change the selected instrument. Results still in flight for the old
    /// selection will not be applied; no fetch is started.
    pub fn select_instrument(&mut self, symbol: &str) {
        let symbol = symbol.trim();
        let next = (!symbol.is_empty()).then(|| symbol.to_string());
        if next.as_deref() == self.state.selection() {
            return;
        }

        if let Some(symbol) = next.as_deref() {
            if self.state.catalog().is_loaded() && self.state.catalog().find(symbol).is_none() {
                warn!("Selected symbol {symbol} is not in the loaded catalog");
            }
        }

        debug!("Selection changed to {:?}", next);
        self.inflight = None;
        self.selection_epoch = self.last_submission;
        self.state.set_selection(next);
        self.publish();
    }

    pub fn set_window_minutes(&mut self, minutes: i64) {
        self.state.set_window_minutes(minutes);
        self.publish();
    }

    /// Start a new request pair for the current selection and window.
    ///
    /// Fails with [`FetchError::Validation`] and leaves the state untouched when
    /// nothing is selected or the window is not positive.
    pub fn submit(&mut self) -> FetchResult<u64> {
        let query = self.window_query()?;

        self.last_submission += 1;
        let submission = self.last_submission;
        debug!(
            "Submission {submission}: {} over {} minutes",
            query.symbol, query.window_minutes
        );

        self.inflight = Some(Inflight {
            submission,
            pending: 2,
            failed: false,
        });
        self.state.clear_error();
        self.state.set_phase(RequestPhase::Loading);
        self.dispatch(submission, query);
        self.publish();

        Ok(submission)
    }

    /// Wait for the next request completion. Pending forever while nothing is in flight.
    pub async fn next_event(&mut self) -> Option<FetchEvent> {
        self.events_rx.recv().await
    }

    /// Apply completions until the latest submission has settled.
    pub async fn settle(&mut self) {
        while !self.is_settled() {
            match self.events_rx.recv().await {
                Some(event) => self.apply(event),
                None => break,
            }
        }
    }

    /// Fold one request completion into the dashboard state.
    pub fn apply(&mut self, event: FetchEvent) {
        let current = self
            .inflight
            .as_ref()
            .is_some_and(|inflight| inflight.submission == event.submission);

        if !current && !self.accepts_stale(&event) {
            warn!(
                "Discarding stale result from submission {} ({})",
                event.submission, event.query.symbol
            );
            return;
        }

        if !current {
            self.apply_stale(event);
            return;
        }

        let failed = match event.outcome {
            FetchOutcome::CurrentPrice(Ok(sample)) => {
                self.state.set_current_price(sample);
                false
            }
            FetchOutcome::History(Ok(history)) => {
                debug!(
                    "Received {} samples for {}",
                    history.len(),
                    event.query.symbol
                );
                self.state.set_history(history);
                false
            }
            FetchOutcome::CurrentPrice(Err(err)) => {
                self.record_failure(RequestKind::CurrentPrice, &event.query, &err);
                true
            }
            FetchOutcome::History(Err(err)) => {
                self.record_failure(RequestKind::History, &event.query, &err);
                true
            }
        };

        self.settle_request(failed);
        self.publish();
    }

    /// Late data from a superseded submission. Failures are only logged so the
    /// phase and error keep describing the latest submission.
    fn apply_stale(&mut self, event: FetchEvent) {
        match event.outcome {
            FetchOutcome::CurrentPrice(Ok(sample)) => self.state.set_current_price(sample),
            FetchOutcome::History(Ok(history)) => self.state.set_history(history),
            FetchOutcome::CurrentPrice(Err(err)) | FetchOutcome::History(Err(err)) => {
                warn!(
                    "Ignoring failure from superseded submission {} ({}): {err}",
                    event.submission, event.query.symbol
                );
                return;
            }
        }
        debug!(
            "Applied late result from submission {} ({})",
            event.submission, event.query.symbol
        );
        self.publish();
    }

    fn accepts_stale(&self, event: &FetchEvent) -> bool {
        match self.stale_results {
            StaleResultPolicy::Discard => false,
            StaleResultPolicy::Apply => {
                event.submission > self.selection_epoch
                    && self.state.selection() == Some(event.query.symbol.as_str())
            }
        }
    }

    fn settle_request(&mut self, failed: bool) {
        let Some(inflight) = self.inflight.as_mut() else {
            return;
        };
        inflight.pending = inflight.pending.saturating_sub(1);
        inflight.failed |= failed;

        if inflight.pending == 0 {
            if !inflight.failed {
                self.state.set_phase(RequestPhase::Loaded);
            }
            self.inflight = None;
        }
    }

    fn record_failure(&mut self, kind: RequestKind, query: &WindowQuery, err: &FetchError) {
        error!(
            "Failed to fetch {} for {}: {err}",
            kind.label(),
            query.symbol
        );
        self.state.set_error(failure_message(kind, err));
        self.state.set_phase(RequestPhase::Failed);
    }

    fn window_query(&self) -> FetchResult<WindowQuery> {
        let symbol = self
            .state
            .selection()
            .ok_or_else(|| FetchError::validation("Select an instrument before requesting data"))?;

        let minutes = self.state.window_minutes();
        let window_minutes = u32::try_from(minutes)
            .ok()
            .filter(|minutes| *minutes > 0)
            .ok_or_else(|| {
                FetchError::validation(format!(
                    "Window must be a positive number of minutes, got {minutes}"
                ))
            })?;

        Ok(WindowQuery::new(symbol, window_minutes))
    }

    fn dispatch(&self, submission: u64, query: WindowQuery) {
        let service = Arc::clone(&self.service);
        let events = self.events_tx.clone();
        let price_query = query.clone();
        tokio::spawn(async move {
            let outcome = FetchOutcome::CurrentPrice(service.current_price(&price_query.symbol).await);
            let _ = events.send(FetchEvent {
                submission,
                query: price_query,
                outcome,
            });
        });

        let service = Arc::clone(&self.service);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = FetchOutcome::History(
                service
                    .history(&query.symbol, query.window_minutes)
                    .await,
            );
            let _ = events.send(FetchEvent {
                submission,
                query,
                outcome,
            });
        });
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.state.clone());
    }
}

/// User-facing text for a failed request, specific to the failure kind.
pub fn failure_message(kind: RequestKind, err: &FetchError) -> String {
    let what = kind.label();
    match err {
        FetchError::NotFound(symbol) => {
            format!("Failed to fetch {what}: {symbol} is not listed by the quote service")
        }
        FetchError::Transport(_) => {
            format!("Failed to fetch {what}: the quote service could not be reached")
        }
        FetchError::Service(_) => {
            format!("Failed to fetch {what}: the quote service returned an invalid response")
        }
        FetchError::Validation(detail) => format!("Failed to fetch {what}: {detail}"),
    }
}
