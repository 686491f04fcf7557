use crate::app::catalog::CatalogStore;
use crate::app::state::{DashboardState, RequestPhase};
use crate::utils::format_local_timestamp;

use super::table::render_table;

pub fn render_catalog(catalog: &CatalogStore, selection: Option<&str>) -> String {
    if catalog.is_empty() {
        return "No instruments available.".to_string();
    }

    let rows: Vec<Vec<String>> = catalog
        .instruments()
        .iter()
        .map(|instrument| {
            let marker = if selection == Some(instrument.symbol.as_str()) {
                "*"
            } else {
                ""
            };
            vec![
                marker.to_string(),
                instrument.name.clone(),
                instrument.symbol.clone(),
            ]
        })
        .collect();

    render_table(&["", "Name", "Symbol"], &rows)
}

/// Full text view of the dashboard for the current state snapshot.
pub fn render_dashboard(state: &DashboardState) -> String {
    let mut lines = Vec::new();

    match state.selection() {
        Some(symbol) => {
            let label = state
                .catalog()
                .find(symbol)
                .map(|instrument| format!("{} ({})", instrument.name, instrument.symbol))
                .unwrap_or_else(|| symbol.to_string());
            lines.push(format!("Instrument: {label}"));
        }
        None => lines.push("Instrument: none selected".to_string()),
    }
    lines.push(format!("Window: {} minutes", state.window_minutes()));

    if state.phase() == RequestPhase::Loading {
        lines.push("Loading...".to_string());
    }

    if let Some(message) = state.error_message() {
        lines.push(format!("Error: {message}"));
    }

    if let Some(sample) = state.current_price() {
        lines.push(format!(
            "Current price: {:.2} (updated {})",
            sample.price,
            format_local_timestamp(&sample.observed_at)
        ));
    }

    if let Some(average) = state.average() {
        lines.push(format!(
            "Average price over last {} minutes: {:.2}",
            state.window_minutes(),
            average
        ));
    }

    if !state.history().is_empty() {
        let rows: Vec<Vec<String>> = state
            .history()
            .iter()
            .map(|sample| {
                vec![
                    format!("{:.2}", sample.price),
                    format_local_timestamp(&sample.observed_at),
                ]
            })
            .collect();
        lines.push(render_table(&["Price", "Last Updated"], &rows));
    } else if state.phase() == RequestPhase::Loaded {
        lines.push("No price samples in this window.".to_string());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{Instrument, PriceSample};
    use chrono::{TimeZone, Utc};

    fn sample(price: f64, minute: u32) -> PriceSample {
        PriceSample {
            price,
            observed_at: Utc.with_ymd_and_hms(2025, 5, 8, 4, minute, 0).unwrap(),
        }
    }

    fn state_with_catalog() -> DashboardState {
        let mut state = DashboardState::new(30);
        state.set_catalog(CatalogStore::from_instruments(vec![
            Instrument::new("Apple Inc.", "AAPL"),
            Instrument::new("Tesla, Inc.", "TSLA"),
        ]));
        state
    }

    #[test]
    fn catalog_marks_selected_symbol() {
        let state = state_with_catalog();
        let text = render_catalog(state.catalog(), Some("TSLA"));

        let tesla = text.lines().find(|line| line.contains("TSLA")).unwrap();
        assert!(tesla.contains('*'));
        let apple = text.lines().find(|line| line.contains("AAPL")).unwrap();
        assert!(!apple.contains('*'));
    }

    #[test]
    fn empty_catalog_says_so() {
        let text = render_catalog(&CatalogStore::unavailable(), None);
        assert_eq!(text, "No instruments available.");
    }

    #[test]
    fn loaded_dashboard_shows_price_average_and_history() {
        let mut state = state_with_catalog();
        state.set_selection(Some("AAPL".to_string()));
        state.set_current_price(sample(231.456, 5));
        state.set_history(vec![sample(230.0, 1), sample(232.0, 3)]);
        state.set_phase(RequestPhase::Loaded);

        let text = render_dashboard(&state);

        assert!(text.contains("Instrument: Apple Inc. (AAPL)"));
        assert!(text.contains("Current price: 231.46"));
        assert!(text.contains("Average price over last 30 minutes: 231.00"));
        assert!(text.contains("Last Updated"));
        assert!(text.contains("232.00"));
        assert!(!text.contains("Loading..."));
    }

    #[test]
    fn loading_and_errors_are_visible() {
        let mut state = state_with_catalog();
        state.set_selection(Some("AAPL".to_string()));
        state.set_phase(RequestPhase::Loading);
        assert!(render_dashboard(&state).contains("Loading..."));

        state.set_phase(RequestPhase::Failed);
        state.set_error("Failed to fetch price history: timed out");
        let text = render_dashboard(&state);
        assert!(!text.contains("Loading..."));
        assert!(text.contains("Error: Failed to fetch price history: timed out"));
        assert!(!text.contains("Average price"));
    }
}
