//! Terminal Pokédex core: catalog client, list and detail state controllers.

pub mod api;
pub mod catalog;
pub mod config;
pub mod detail;
pub mod list;
pub mod util;
