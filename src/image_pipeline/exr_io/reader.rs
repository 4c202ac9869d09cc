use crate::image_pipeline::channels::DecodedLayer;
use crate::image_pipeline::common::error::Result;

pub trait ChannelReader {
    /// Decodes every channel of the first valid layer in `data`.
    fn read_channels(&self, data: &[u8]) -> Result<DecodedLayer>;
}
