//! Dataset image pipeline module
//!
//! This module provides the EXR conversion used to prepare training data,
//! with separate modules for channel packing, EXR reading/writing, and
//! folder-level orchestration.

pub mod channels;
pub mod exr_io;
pub mod conversions;
pub mod common;

pub use common::{
    ConversionError,
    Result,
};

pub use channels::{
    DecodedChannels,
    DecodedImage,
    DecodedLayer,
    RgbaPlanes,
};

pub use exr_io::{
    ExrCompression,
    ConversionConfig,
    ConversionConfigBuilder,
    ChannelReader,
    ExrChannelReader,
    ExrWriter,
    StandardExrWriter,
};

pub use conversions::{
    BatchReport,
    ChannelCodec,
    FileKind,
    FolderConverter,
    FolderReport,
    load_models,
};
