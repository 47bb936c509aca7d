//! Remote catalog access.
//!
//! [`PokeApiClient`] binds the two catalog endpoints over HTTP;
//! [`fetch_page_with_details`] composes them into one detailed page.

mod client;
mod pager;

pub use client::{ApiError, PokeApiClient, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
pub use pager::fetch_page_with_details;
