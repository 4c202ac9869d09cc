use std::path::{Path, PathBuf};

use tracing::{debug, debug_span};

use crate::image_pipeline::{
    channels::{self, DecodedChannels, DecodedImage, DecodedLayer, RgbaPlanes},
    common::error::{ConversionError, Result},
    conversions::FileKind,
    exr_io::{ChannelReader, ConversionConfig, ExrChannelReader, ExrWriter, StandardExrWriter},
};

/// Reads truth and input files and writes them back as R, G, B, A EXRs.
pub struct ChannelCodec<R: ChannelReader, W: ExrWriter> {
    reader: R,
    writer: W,
    config: ConversionConfig,
}

impl ChannelCodec<ExrChannelReader, StandardExrWriter> {
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            reader: ExrChannelReader,
            writer: StandardExrWriter,
            config,
        }
    }
}

impl<R: ChannelReader, W: ExrWriter> ChannelCodec<R, W> {
    pub fn with_custom(reader: R, writer: W, config: ConversionConfig) -> Self {
        Self {
            reader,
            writer,
            config,
        }
    }

    fn validate_dimensions(&self, width: usize, height: usize) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }

        Ok(())
    }

    /// Reads `path` and selects the channels a file of `kind` carries.
    pub fn decode_read<P: AsRef<Path>>(&self, path: P, kind: FileKind) -> Result<DecodedImage> {
        let path = path.as_ref();
        let unreadable = |reason: String| ConversionError::UnreadableFile {
            path: path.to_path_buf(),
            reason,
        };

        let data = {
            let _span = debug_span!("read_input_file").entered();
            std::fs::read(path).map_err(|e| unreadable(e.to_string()))?
        };

        let layer = {
            let _span = debug_span!("decode_exr").entered();
            self.reader
                .read_channels(&data)
                .map_err(|e| unreadable(e.to_string()))?
        };

        self.select_channels(path, layer, kind)
    }

    fn select_channels(&self, path: &Path, mut layer: DecodedLayer, kind: FileKind) -> Result<DecodedImage> {
        let missing = |channel: String| ConversionError::MissingChannel {
            path: path.to_path_buf(),
            channel,
        };

        let channels = match kind {
            FileKind::Truth => {
                let truth_channel = &self.config.truth_channel;
                let data = match layer.take_channel(truth_channel) {
                    Some(data) => data,
                    None if layer.channels.len() == 1 => layer.channels.remove(0).1,
                    None => return Err(missing(truth_channel.clone())),
                };
                DecodedChannels::Truth(data)
            }
            FileKind::Input => {
                let r = layer.take_channel("R").ok_or_else(|| missing("R".to_string()))?;
                let g = layer.take_channel("G").ok_or_else(|| missing("G".to_string()))?;
                let b = layer.take_channel("B").ok_or_else(|| missing("B".to_string()))?;
                let d = self
                    .config
                    .depth_channels
                    .iter()
                    .find_map(|name| layer.take_channel(name))
                    .ok_or_else(|| missing(self.config.depth_channels.join("|")))?;
                DecodedChannels::Input { r, g, b, d }
            }
        };

        let unused: Vec<&str> = layer.channel_names().collect();
        debug!(
            path = %path.display(),
            width = layer.width,
            height = layer.height,
            unused = ?unused,
            "Selected {:?} channels",
            kind
        );

        Ok(DecodedImage {
            width: layer.width,
            height: layer.height,
            channels,
        })
    }

    /// Writes a truth buffer of the configured truth dimensions.
    pub fn pack_and_write_single<P: AsRef<Path>>(&self, path: P, data: &[f32]) -> Result<()> {
        let planes = channels::pack_single(data, self.config.truth_width, self.config.truth_height)?;
        self.write_planes(path.as_ref(), &planes)
    }

    /// Writes a 2-D grid whose dimensions come from the grid itself.
    pub fn pack_and_write_shaped<P: AsRef<Path>, Row: AsRef<[f32]>>(&self, path: P, rows: &[Row]) -> Result<()> {
        let planes = channels::pack_shaped(rows)?;
        self.write_planes(path.as_ref(), &planes)
    }

    /// Writes R, G, B unchanged and `d` into the alpha slot.
    #[allow(clippy::too_many_arguments)]
    pub fn pack_and_write_four_channel<P: AsRef<Path>>(
        &self,
        path: P,
        r: &[f32],
        g: &[f32],
        b: &[f32],
        d: &[f32],
        width: usize,
        height: usize,
    ) -> Result<()> {
        let planes = channels::pack_four_channel(r, g, b, d, width, height)?;
        self.write_planes(path.as_ref(), &planes)
    }

    /// Encodes into a temp file next to `path` and renames it into place, so
    /// `path` is either fully replaced or left untouched.
    fn write_planes(&self, path: &Path, planes: &RgbaPlanes) -> Result<()> {
        self.validate_dimensions(planes.width, planes.height)?;

        let write_error = |e: std::io::Error| {
            ConversionError::OutputWriteError(format!("{}: {}", path.display(), e))
        };

        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut temp = {
            let _span = debug_span!("create_output_file").entered();
            tempfile::NamedTempFile::new_in(&directory).map_err(write_error)?
        };

        {
            let _span = debug_span!("encode_exr", width = planes.width, height = planes.height).entered();
            self.writer.write_exr(planes, temp.as_file_mut(), &self.config)?;
        }

        // Keep the permissions of a file being replaced; temp files start out private.
        if let Ok(metadata) = std::fs::metadata(path) {
            temp.as_file()
                .set_permissions(metadata.permissions())
                .map_err(write_error)?;
        }

        temp.persist(path).map_err(|e| write_error(e.error))?;

        debug!(path = %path.display(), "Wrote {}x{} EXR", planes.width, planes.height);
        Ok(())
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ConversionConfig) {
        self.config = config;
    }
}
