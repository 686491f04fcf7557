use async_trait::async_trait;

use crate::error::FetchError;

pub mod client;
pub mod decode;
pub mod models;
pub mod request;

pub use client::HttpQuoteClient;
pub use decode::CatalogShape;
pub use models::{Instrument, PriceSample, WindowQuery};

pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// The three read-only operations of the remote quote service.
///
/// Implementations hold no per-call state and never retry; failures surface
/// as the raw [`FetchError`] kind so the caller decides what to show.
#[async_trait]
pub trait QuoteService: Send + Sync {
    async fn list_instruments(&self) -> FetchResult<Vec<Instrument>>;

    async fn current_price(&self, symbol: &str) -> FetchResult<PriceSample>;

    /// Samples observed over the trailing `window_minutes`, in service order.
    async fn history(&self, symbol: &str, window_minutes: u32) -> FetchResult<Vec<PriceSample>>;
}
