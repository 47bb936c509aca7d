//! Utility functions shared by the API client and the terminal front-end.
//!
//! - **URL validation**: base-URL policy for the catalog client and a guard
//!   for links handed to the system opener
//! - **Text processing**: Unicode-aware width calculation, truncation and
//!   control-character stripping for server-provided strings

mod text;
mod url_validator;

pub use text::{display_width, pad_to_width, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_base_url, validate_url_for_open, UrlValidationError};

/// Maximum accepted search query length, enforced by the search input.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 64;
