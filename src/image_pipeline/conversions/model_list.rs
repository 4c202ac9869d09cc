use std::path::Path;

use crate::image_pipeline::common::error::{ConversionError, Result};

/// Splits a model list into one name per line. Only the line terminator is
/// removed, so names keep any other surrounding whitespace.
pub fn parse_models(contents: &str) -> Vec<String> {
    contents.lines().map(str::to_string).collect()
}

/// Reads a newline-delimited model list file.
pub fn load_models<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ConversionError::InputReadError(format!("{}: {}", path.display(), e)))?;
    Ok(parse_models(&contents))
}
