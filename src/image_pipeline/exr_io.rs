//! EXR reading and writing module
//!
//! This module wraps the `exr` crate behind the [`ChannelReader`] and
//! [`ExrWriter`] traits so the codec can be exercised with in-memory doubles.

mod reader;
mod exr_reader;
mod writer;
mod standard_exr_writer;
pub mod types;

pub use reader::ChannelReader;
pub use exr_reader::ExrChannelReader;
pub use writer::ExrWriter;
pub use standard_exr_writer::StandardExrWriter;
pub use types::{ExrCompression, ConversionConfig, ConversionConfigBuilder};
