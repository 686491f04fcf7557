use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tradable entity as listed by the quote service catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    pub symbol: String,
}

impl Instrument {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
        }
    }
}

/// A single observed price. Only produced by decoding service payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSample {
    pub price: f64,
    pub observed_at: DateTime<Utc>,
}

/// Parameters of one submission. Replaced wholesale on every submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowQuery {
    pub symbol: String,
    pub window_minutes: u32,
}

impl WindowQuery {
    pub fn new(symbol: impl Into<String>, window_minutes: u32) -> Self {
        Self {
            symbol: symbol.into(),
            window_minutes,
        }
    }
}
