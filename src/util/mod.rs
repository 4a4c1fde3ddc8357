//! Utility functions for common operations.
//!
//! - **Link validation**: scheme checks before opening external links
//! - **Text processing**: Unicode-aware width calculation and truncation

mod link;
mod text;

pub use link::{validate_link_for_open, LinkError};
pub use text::{display_width, single_line, truncate_to_width};

/// Maximum allowed search input length, enforced in the UI layer.
pub const MAX_SEARCH_LENGTH: usize = 256;
