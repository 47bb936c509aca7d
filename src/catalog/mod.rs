//! Catalog data contracts.
//!
//! - [`Item`] and its parts: the fully detailed entry shown in list and detail views
//! - [`ItemSummary`] / [`SummaryPage`]: what the paginated endpoint returns
//! - [`DetailedPage`]: a summary page after per-entry enrichment
//! - [`Catalog`]: the upstream service seam, implemented over HTTP by
//!   [`crate::api::PokeApiClient`] and by in-memory fakes in tests

mod types;

#[cfg(test)]
pub(crate) mod testing;

pub(crate) use types::{DetailResponse, ListResponse};
pub use types::{
    capitalize, DetailedPage, Item, ItemSummary, Sprites, StatEntry, SummaryPage, TypeSlot,
};

use crate::api::ApiError;
use async_trait::async_trait;

/// The remote catalog service.
///
/// Both calls are single requests with no retry. `fetch_detail` reports a
/// missing entry as [`ApiError::NotFound`] so callers can tell it apart from a
/// transport or service failure.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch up to `limit` summaries starting at `offset`.
    async fn fetch_page(&self, limit: usize, offset: usize) -> Result<SummaryPage, ApiError>;

    /// Fetch one entry by name or numeric id.
    async fn fetch_detail(&self, name_or_id: &str) -> Result<Item, ApiError>;
}
