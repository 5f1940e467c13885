pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::http::ApiClient;
pub use app::{CartView, ProductOverview};
pub use config::StorefrontConfig;
pub use crate::core::filter_tree::{CategoryTree, FilterState, ParentSync};
pub use crate::core::pricing::{calculate_totals, CartTotals, PricingPolicy};
pub use utils::error::{Result, StorefrontError};
