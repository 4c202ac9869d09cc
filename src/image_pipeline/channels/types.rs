//! Channel buffer types

/// Four row-major f32 planes ready to be encoded as R, G, B, A.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaPlanes {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    pub r: Vec<f32>,
    pub g: Vec<f32>,
    pub b: Vec<f32>,
    /// Opaque alpha for truth files, the depth channel for input files
    pub a: Vec<f32>,
}

impl RgbaPlanes {
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Returns the `(r, g, b, a)` sample at `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> (f32, f32, f32, f32) {
        let index = y * self.width + x;
        (self.r[index], self.g[index], self.b[index], self.a[index])
    }
}

/// Every channel of the first valid layer in a file, widened to f32.
#[derive(Debug, Clone, Default)]
pub struct DecodedLayer {
    pub width: usize,
    pub height: usize,
    /// `(channel name, row-major samples)` in file order
    pub channels: Vec<(String, Vec<f32>)>,
}

impl DecodedLayer {
    pub fn channel(&self, name: &str) -> Option<&[f32]> {
        self.channels
            .iter()
            .find(|(channel_name, _)| channel_name == name)
            .map(|(_, samples)| samples.as_slice())
    }

    /// Removes and returns the named channel.
    pub fn take_channel(&mut self, name: &str) -> Option<Vec<f32>> {
        let index = self
            .channels
            .iter()
            .position(|(channel_name, _)| channel_name == name)?;
        Some(self.channels.remove(index).1)
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|(name, _)| name.as_str())
    }
}

/// The channels selected from a truth file (one) or an input file (four).
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedChannels {
    Truth(Vec<f32>),
    Input {
        r: Vec<f32>,
        g: Vec<f32>,
        b: Vec<f32>,
        /// Depth or disparity samples
        d: Vec<f32>,
    },
}

/// Result of reading a truth or input file back into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: usize,
    pub height: usize,
    pub channels: DecodedChannels,
}
