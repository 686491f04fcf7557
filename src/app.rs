pub mod bootstrap;
pub mod catalog;
pub mod controller;
pub mod state;

pub use bootstrap::run;
pub use catalog::CatalogStore;
pub use controller::{FetchCoordinator, Intent};
pub use state::{DashboardState, RequestPhase};
