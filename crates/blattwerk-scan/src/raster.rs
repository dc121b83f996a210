// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster — immutable RGBA pixel buffer with codec helpers. All transforms in
// this crate take rasters by reference and return new rasters.

use std::io::Cursor;
use std::path::Path;

use blattwerk_core::Rotation;
use blattwerk_core::error::{BlattwerkError, Result};
use image::{DynamicImage, ImageFormat, RgbaImage, imageops};
use tracing::{debug, info, instrument};

/// An RGBA image: row-major byte buffer, 4 bytes per pixel.
///
/// Coordinates used throughout the pipeline are pixel coordinates in this
/// raster's own space. A `Raster` is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Raster {
    // -- Construction ---------------------------------------------------------

    /// Create a raster filled with a single RGBA color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..width as usize * height as usize {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Build a raster from a raw RGBA buffer. The buffer length must be
    /// exactly `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(BlattwerkError::ImageError(format!(
                "raster buffer length {} does not match {}x{} RGBA ({} bytes)",
                data.len(),
                width,
                height,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Internal constructor for buffers whose length is guaranteed by the
    /// producing transform.
    pub(crate) fn from_raw_parts(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize * 4);
        Self {
            width,
            height,
            data,
        }
    }

    /// Decode an image from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(bytes), fields(data_len = bytes.len()))]
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|err| BlattwerkError::ImageError(format!("failed to decode image: {}", err)))?;
        info!(width = img.width(), height = img.height(), "Image decoded");
        Ok(Self::from_rgba_image(img.to_rgba8()))
    }

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let img = image::open(path.as_ref()).map_err(|err| {
            BlattwerkError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        Ok(Self::from_rgba_image(img.to_rgba8()))
    }

    /// Wrap an already-decoded RGBA image buffer.
    pub fn from_rgba_image(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The raw RGBA bytes, row-major.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// RGBA value at (x, y). Panics if out of bounds, like slice indexing.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// Copy into an `image` crate buffer for codec and rotation operations.
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .expect("raster buffer matches dimensions")
    }

    // -- Orientation ----------------------------------------------------------

    /// Rotate by a quarter turn. The output canvas is exactly the swapped
    /// dimensions; rotation is lossless.
    pub fn rotated(&self, rotation: Rotation) -> Raster {
        let img = self.to_rgba_image();
        let out = match rotation {
            Rotation::Clockwise => imageops::rotate90(&img),
            Rotation::CounterClockwise => imageops::rotate270(&img),
        };
        debug!(degrees = rotation.degrees(), "Raster rotated");
        Self::from_rgba_image(out)
    }

    // -- Output ---------------------------------------------------------------

    /// Encode as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.to_rgba_image()
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|err| BlattwerkError::ImageError(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Encode as JPEG bytes with the given quality (1-100). Alpha is dropped.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let rgb = DynamicImage::ImageRgba8(self.to_rgba_image()).to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb.write_with_encoder(encoder)
            .map_err(|err| BlattwerkError::ImageError(format!("JPEG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Write to a file. The format is inferred from the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.to_rgba_image().save(path.as_ref()).map_err(|err| {
            BlattwerkError::ImageError(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}

// -- Tests --------------------------------------------------------------------
