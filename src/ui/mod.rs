//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Controller completion handling
//! - `render` - View rendering dispatch
//! - `list` - Search bar and paginated list widget
//! - `detail` - Entry detail widget
//! - `status` - Status bar widget

mod detail;
mod events;
mod input;
mod list;
mod loop_runner;
mod render;
mod status;

pub use loop_runner::run;
