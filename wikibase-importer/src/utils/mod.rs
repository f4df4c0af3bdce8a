//! Shared utilities.

pub mod text;

pub use text::{is_blank, literal_or_placeholder, EMPTY_LITERAL_PLACEHOLDER};
