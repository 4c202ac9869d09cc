//! Channel reader backed by the `exr` crate.
//!
//! Reads the first valid layer at its largest resolution level and widens
//! every channel to f32, whatever sample type the file stores.

use std::io::Cursor;

use exr::prelude::*;
use tracing::debug;

use crate::image_pipeline::channels::DecodedLayer;
use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::exr_io::reader::ChannelReader;

pub struct ExrChannelReader;

fn samples_to_f32(samples: FlatSamples) -> Vec<f32> {
    match samples {
        FlatSamples::F16(values) => values.iter().map(|value| value.to_f32()).collect(),
        FlatSamples::F32(values) => values,
        FlatSamples::U32(values) => values.iter().map(|&value| value as f32).collect(),
    }
}

impl ChannelReader for ExrChannelReader {
    fn read_channels(&self, data: &[u8]) -> Result<DecodedLayer> {
        debug!("Decoding EXR image, {} bytes", data.len());

        let image = read()
            .no_deep_data()
            .largest_resolution_level()
            .all_channels()
            .first_valid_layer()
            .all_attributes()
            .non_parallel()
            .from_buffered(Cursor::new(data))
            // The caller knows the path and turns this into `UnreadableFile`.
            .map_err(|e| ConversionError::InputReadError(e.to_string()))?;

        let layer = image.layer_data;
        let Vec2(width, height) = layer.size;

        let channels: Vec<(String, Vec<f32>)> = layer
            .channel_data
            .list
            .into_iter()
            .map(|channel| (channel.name.to_string(), samples_to_f32(channel.sample_data)))
            .collect();

        debug!(
            "Decoded image: {}x{} with channels {:?}",
            width,
            height,
            channels.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>()
        );

        Ok(DecodedLayer {
            width,
            height,
            channels,
        })
    }
}
