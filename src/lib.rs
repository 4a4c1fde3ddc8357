//! Terminal client for a recipe-box backend.
//!
//! Talks to the backend's session-authenticated REST API (cookie session
//! plus CSRF token) and presents the recipe collection in a filterable,
//! searchable TUI.

pub mod api;
pub mod app;
pub mod collection;
pub mod config;
pub mod ui;
pub mod util;
