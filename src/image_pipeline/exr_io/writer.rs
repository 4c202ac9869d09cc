use std::io::Write;

use crate::image_pipeline::channels::RgbaPlanes;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::exr_io::types::ConversionConfig;

pub trait ExrWriter {
    fn write_exr(&self, image: &RgbaPlanes, output: &mut dyn Write, config: &ConversionConfig) -> Result<()>;
}
