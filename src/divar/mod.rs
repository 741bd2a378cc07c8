pub mod client;
pub mod models;
pub mod query;

use async_trait::async_trait;

use crate::error::ScoutError;
pub use client::DivarClient;
pub use models::ListingSummary;
pub use query::{build_query, MarketScope, SearchQuery};

/// Where candidate listings come from.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Run a search. Results are newest first.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<ListingSummary>, ScoutError>;

    /// Photo gallery for one listing. Best-effort: empty on any failure.
    async fn photos(&self, token: &str) -> Vec<String>;
}
