use std::collections::HashSet;

use log::{info, warn};

use crate::fetch::{FetchResult, Instrument, QuoteService};

/// Instrument catalog, loaded once per session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogStore {
    instruments: Vec<Instrument>,
    loaded: bool,
}

impl CatalogStore {
    /// Pull the listing from the service. Shape anomalies are already folded
    /// into an empty listing by the decoder; only transport/service failures error.
    pub async fn load(service: &dyn QuoteService) -> FetchResult<Self> {
        let instruments = service.list_instruments().await?;
        let store = Self::from_instruments(instruments);
        info!("Loaded {} instruments", store.len());
        Ok(store)
    }

    /// Build a loaded catalog, keeping the first entry for any repeated symbol.
    pub fn from_instruments(instruments: Vec<Instrument>) -> Self {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(instruments.len());

        for instrument in instruments {
            if instrument.symbol.is_empty() {
                warn!("Skipping instrument `{}` without a symbol", instrument.name);
                continue;
            }
            if seen.insert(instrument.symbol.clone()) {
                unique.push(instrument);
            } else {
                warn!(
                    "Duplicate symbol {} in catalog, keeping the first entry",
                    instrument.symbol
                );
            }
        }

        Self {
            instruments: unique,
            loaded: true,
        }
    }

    /// Loaded but empty; used when the listing request itself failed.
    pub fn unavailable() -> Self {
        Self {
            instruments: Vec::new(),
            loaded: true,
        }
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn find(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments
            .iter()
            .find(|instrument| instrument.symbol == symbol)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}
