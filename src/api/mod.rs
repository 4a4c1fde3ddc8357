//! HTTP client for the recipe-box backend.
//!
//! The backend uses Django-style session authentication: a session cookie
//! plus a CSRF cookie, with an `X-CSRFToken` header required on mutating
//! verbs. This module owns the cookie jar, the CSRF handshake, the
//! session/auth operations, and the recipe CRUD surface.

mod auth;
mod client;
mod csrf;
mod error;
mod recipes;

pub use auth::{AuthState, CurrentUser};
pub use client::ApiClient;
pub use csrf::{CsrfManager, CSRF_HEADER};
pub use error::ApiError;
pub use recipes::{Recipe, RecipeDraft};
