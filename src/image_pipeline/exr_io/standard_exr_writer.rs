use std::io::{Cursor, Write};

use exr::prelude::*;
use tracing::debug;

use crate::image_pipeline::channels::RgbaPlanes;
use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::exr_io::types::{ConversionConfig, ExrCompression};
use crate::image_pipeline::exr_io::writer::ExrWriter;

pub struct StandardExrWriter;

struct PlanePixels<'a> {
    planes: &'a RgbaPlanes,
}

impl GetPixel for PlanePixels<'_> {
    type Pixel = (f32, f32, f32, f32);

    fn get_pixel(&self, position: Vec2<usize>) -> Self::Pixel {
        self.planes.pixel(position.x(), position.y())
    }
}

fn encoding_for(compression: ExrCompression) -> Encoding {
    let compression = match compression {
        ExrCompression::None => Compression::Uncompressed,
        ExrCompression::Rle => Compression::RLE,
        ExrCompression::Zip => Compression::ZIP16,
        ExrCompression::Piz => Compression::PIZ,
    };

    // Scan lines in increasing order, the layout OpenEXR writes by default.
    Encoding {
        compression,
        ..Encoding::UNCOMPRESSED
    }
}

impl ExrWriter for StandardExrWriter {
    fn write_exr(&self, image: &RgbaPlanes, output: &mut dyn Write, config: &ConversionConfig) -> Result<()> {
        debug!("Encoding EXR image: {}x{}", image.width, image.height);

        let mut buffer = Vec::new();

        let layer = Layer::new(
            (image.width, image.height),
            LayerAttributes::default(),
            encoding_for(config.compression),
            SpecificChannels::rgba(PlanePixels { planes: image }),
        );

        Image::from_layer(layer)
            .write()
            .non_parallel()
            .to_buffered(Cursor::new(&mut buffer))
            .map_err(|e| ConversionError::EncodeError(e.to_string()))?;

        output
            .write_all(&buffer)
            .map_err(|e| ConversionError::OutputWriteError(e.to_string()))?;

        debug!("EXR encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}
