//! Dataset conversions module
//!
//! This module contains the codec that reads and re-encodes single files and
//! the orchestration that walks dataset folders.

mod classifier;
mod codec;
mod folder;
mod model_list;
mod report;

#[cfg(test)]
mod tests;

pub use classifier::{FileKind, INPUT_MARKER, TRUTH_MARKER};
pub use codec::ChannelCodec;
pub use folder::FolderConverter;
pub use model_list::{load_models, parse_models};
pub use report::{BatchReport, FileFailure, FolderReport, ascii_sanitize, is_progress_tick, progress_line};
