use crate::fetch::PriceSample;
use crate::stats::average_price;

use super::catalog::CatalogStore;

/// Lifecycle of the latest submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Everything the presentation layer renders. Only `FetchCoordinator` mutates it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    catalog: CatalogStore,
    selection: Option<String>,
    window_minutes: i64,
    current_price: Option<PriceSample>,
    history: Vec<PriceSample>,
    average: Option<f64>,
    phase: RequestPhase,
    error_message: Option<String>,
}

impl DashboardState {
    pub fn new(window_minutes: i64) -> Self {
        Self {
            window_minutes,
            ..Self::default()
        }
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    pub fn window_minutes(&self) -> i64 {
        self.window_minutes
    }

    pub fn current_price(&self) -> Option<&PriceSample> {
        self.current_price.as_ref()
    }

    pub fn history(&self) -> &[PriceSample] {
        &self.history
    }

    pub fn average(&self) -> Option<f64> {
        self.average
    }

    pub fn phase(&self) -> RequestPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == RequestPhase::Loading
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub(crate) fn set_catalog(&mut self, catalog: CatalogStore) {
        self.catalog = catalog;
    }

    /// Switch instruments. Derived data for the previous one goes away immediately.
    pub(crate) fn set_selection(&mut self, selection: Option<String>) {
        self.selection = selection;
        self.clear_results();
        self.error_message = None;
        self.phase = RequestPhase::Idle;
    }

    pub(crate) fn set_window_minutes(&mut self, minutes: i64) {
        self.window_minutes = minutes;
    }

    pub(crate) fn set_current_price(&mut self, sample: PriceSample) {
        self.current_price = Some(sample);
    }

    /// Store a history window; the average is recomputed from it, absent when empty.
    pub(crate) fn set_history(&mut self, history: Vec<PriceSample>) {
        self.average = average_price(&history);
        self.history = history;
    }

    pub(crate) fn set_phase(&mut self, phase: RequestPhase) {
        self.phase = phase;
    }

    pub(crate) fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    pub(crate) fn clear_error(&mut self) {
        self.error_message = None;
    }

    fn clear_results(&mut self) {
        self.current_price = None;
        self.history.clear();
        self.average = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample(price: f64) -> PriceSample {
        PriceSample {
            price,
            observed_at: Utc.with_ymd_and_hms(2025, 5, 8, 4, 0, 0).unwrap(),
        }
    }

    #[test]
    fn average_follows_history() {
        let mut state = DashboardState::new(30);
        state.set_history(vec![sample(10.0), sample(20.0)]);
        assert_eq!(state.average(), Some(15.0));

        state.set_history(Vec::new());
        assert_eq!(state.average(), None);
        assert!(state.history().is_empty());
    }

    #[test]
    fn selection_change_clears_derived_data() {
        let mut state = DashboardState::new(30);
        state.set_selection(Some("AAPL".to_string()));
        state.set_current_price(sample(12.0));
        state.set_history(vec![sample(12.0)]);
        state.set_error("Failed to fetch price history");
        state.set_phase(RequestPhase::Failed);

        state.set_selection(Some("TSLA".to_string()));

        assert_eq!(state.selection(), Some("TSLA"));
        assert!(state.current_price().is_none());
        assert!(state.history().is_empty());
        assert_eq!(state.average(), None);
        assert_eq!(state.error_message(), None);
        assert_eq!(state.phase(), RequestPhase::Idle);
        assert_eq!(state.window_minutes(), 30);
    }
}
