//! Common utilities module
//!
//! Shared error type for the codec, the folder walker and graph freezing.

pub mod error;

pub use error::{ConversionError, Result};
