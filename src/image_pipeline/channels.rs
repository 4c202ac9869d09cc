//! Channel buffers and packing
//!
//! This module turns decoded float buffers into the four R, G, B, A planes
//! written to every output file.

mod packing;
pub mod types;

pub use packing::{OPAQUE_ALPHA, pack_four_channel, pack_shaped, pack_single};
pub use types::{DecodedChannels, DecodedImage, DecodedLayer, RgbaPlanes};
