//! Terminal User Interface module.
//!
//! This module provides the TUI for the recipe client, including:
//! - Main event loop (`run`)
//! - Input handling for the login gate, browse, detail, and search modes
//! - Rendering for the recipe list, detail view, and form overlays
//! - Background task event processing
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task spawning and event processing
//! - `render` - View rendering dispatch and overlays
//! - `browse` - Recipe list widget
//! - `detail` - Single-recipe view widget
//! - `login` - Login/register gate widget
//! - `form` - Recipe editor overlay widget
//! - `status` - Status bar widget

mod browse;
mod detail;
mod events;
mod form;
mod input;
mod login;
mod loop_runner;
mod render;
mod status;

// Re-export the public API
pub use events::spawn_session_check;
pub use loop_runner::{run, Action};
