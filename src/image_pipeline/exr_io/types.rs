//! EXR conversion configuration types

use std::path::PathBuf;

/// EXR compression methods. All of them are lossless for f32 samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExrCompression {
    /// No compression (fastest, largest file)
    None,
    /// Run-length encoding
    Rle,
    /// Zlib over blocks of 16 scan lines (OpenEXR's default)
    Zip,
    /// Wavelet compression, good on noisy data
    Piz,
}

/// Configuration shared by the codec and the folder walker
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Width of every truth file
    pub truth_width: usize,
    /// Height of every truth file
    pub truth_height: usize,
    /// Compression method to use
    pub compression: ExrCompression,
    /// Whether to reject zero-sized images before encoding
    pub validate_dimensions: bool,
    /// Channel read from truth files when they carry more than one
    pub truth_channel: String,
    /// Candidate names for the depth channel of input files, first match wins
    pub depth_channels: Vec<String>,
    /// Write outputs under this root instead of overwriting the inputs
    pub output_root: Option<PathBuf>,
    /// Log progress every this many folder entries, 0 disables
    pub progress_interval: usize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            truth_width: 256,
            truth_height: 256,
            compression: ExrCompression::Zip,
            validate_dimensions: true,
            truth_channel: "R".to_string(),
            depth_channels: vec!["D".to_string(), "Z".to_string(), "A".to_string()],
            output_root: None,
            progress_interval: 100,
        }
    }
}

impl ConversionConfig {
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder::default()
    }
}

/// Builder for ConversionConfig
#[derive(Default)]
pub struct ConversionConfigBuilder {
    truth_dimensions: Option<(usize, usize)>,
    compression: Option<ExrCompression>,
    validate_dimensions: Option<bool>,
    truth_channel: Option<String>,
    depth_channels: Option<Vec<String>>,
    output_root: Option<Option<PathBuf>>,
    progress_interval: Option<usize>,
}

impl ConversionConfigBuilder {
    pub fn truth_dimensions(mut self, width: usize, height: usize) -> Self {
        self.truth_dimensions = Some((width, height));
        self
    }

    pub fn compression(mut self, compression: ExrCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn truth_channel(mut self, name: impl Into<String>) -> Self {
        self.truth_channel = Some(name.into());
        self
    }

    pub fn depth_channels<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depth_channels = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn output_root(mut self, root: Option<PathBuf>) -> Self {
        self.output_root = Some(root);
        self
    }

    pub fn progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = Some(interval);
        self
    }

    pub fn build(self) -> ConversionConfig {
        let default = ConversionConfig::default();
        let (truth_width, truth_height) = self
            .truth_dimensions
            .unwrap_or((default.truth_width, default.truth_height));
        ConversionConfig {
            truth_width,
            truth_height,
            compression: self.compression.unwrap_or(default.compression),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            truth_channel: self.truth_channel.unwrap_or(default.truth_channel),
            depth_channels: self.depth_channels.unwrap_or(default.depth_channels),
            output_root: self.output_root.unwrap_or(default.output_root),
            progress_interval: self.progress_interval.unwrap_or(default.progress_interval),
        }
    }
}
