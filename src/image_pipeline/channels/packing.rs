//! Packing of decoded buffers into R, G, B, A planes.
//!
//! All planes are row-major: sample `(x, y)` lives at `y * width + x`.

use crate::image_pipeline::channels::types::RgbaPlanes;
use crate::image_pipeline::common::error::{ConversionError, Result};

/// Alpha written for single-channel outputs.
pub const OPAQUE_ALPHA: f32 = 1.0;

fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(ConversionError::ShapeMismatch { expected, actual });
    }
    Ok(())
}

/// Broadcasts one flat buffer into R, G and B with an opaque alpha.
///
/// # Errors
///
/// `ShapeMismatch` if `data.len() != width * height`.
pub fn pack_single(data: &[f32], width: usize, height: usize) -> Result<RgbaPlanes> {
    check_len(width * height, data.len())?;

    Ok(RgbaPlanes {
        width,
        height,
        r: data.to_vec(),
        g: data.to_vec(),
        b: data.to_vec(),
        a: vec![OPAQUE_ALPHA; data.len()],
    })
}

/// Like [`pack_single`], but the dimensions come from the grid itself:
/// `height = rows.len()`, `width = rows[0].len()`.
///
/// # Errors
///
/// `ShapeMismatch` if any row differs in length from the first one.
pub fn pack_shaped<Row: AsRef<[f32]>>(rows: &[Row]) -> Result<RgbaPlanes> {
    let height = rows.len();
    let width = rows.first().map_or(0, |row| row.as_ref().len());

    let mut output = vec![0.0f32; width * height];
    for (y, row) in rows.iter().enumerate() {
        let row = row.as_ref();
        check_len(width, row.len())?;
        for (x, &value) in row.iter().enumerate() {
            output[y * width + x] = value;
        }
    }

    Ok(RgbaPlanes {
        width,
        height,
        r: output.clone(),
        g: output.clone(),
        b: output,
        a: vec![OPAQUE_ALPHA; width * height],
    })
}

/// Packs four independent channels, storing `d` in the alpha slot.
///
/// Consumers of the output read depth from A, so `d` is copied unchanged.
///
/// # Errors
///
/// `ShapeMismatch` if any channel is not `width * height` samples long.
pub fn pack_four_channel(
    r: &[f32],
    g: &[f32],
    b: &[f32],
    d: &[f32],
    width: usize,
    height: usize,
) -> Result<RgbaPlanes> {
    let expected = width * height;
    for channel in [r, g, b, d] {
        check_len(expected, channel.len())?;
    }

    Ok(RgbaPlanes {
        width,
        height,
        r: r.to_vec(),
        g: g.to_vec(),
        b: b.to_vec(),
        a: d.to_vec(),
    })
}
