// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::io;
use std::sync::Arc;

use kurbo::Size;
use thiserror::Error;
use trestle_imaging::ImageDesc;

/// A decoded raster image, straight-alpha RGBA8.
///
/// Pixels are shared, so cloning is cheap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl RasterImage {
    /// Wraps tightly packed RGBA8 rows.
    ///
    /// Returns `None` when `pixels` does not hold exactly
    /// `width * height * 4` bytes.
    pub fn from_rgba8(width: u32, height: u32, pixels: impl Into<Arc<[u8]>>) -> Option<Self> {
        let pixels = pixels.into();
        let expected = usize::try_from(u64::from(width) * u64::from(height) * 4).ok()?;
        (pixels.len() == expected).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// A `width` × `height` image filled with one RGBA8 color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let pixels: Vec<u8> = rgba.iter().copied().cycle().take(count * 4).collect();
        Self {
            width,
            height,
            pixels: pixels.into(),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel size as a [`Size`].
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// The RGBA8 pixel rows.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Descriptor for uploading this image to an imaging backend.
    pub fn desc(&self) -> ImageDesc {
        ImageDesc::rgba8(self.width, self.height)
    }
}

/// Why an image could not be provided.
///
/// Load failures only ever affect the layer that needed the image.
#[derive(Debug, Error)]
pub enum ImageLoadError {
    /// The image could not be read.
    #[error("failed to read image `{url}`")]
    Io {
        /// Requested URL.
        url: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The bytes are not a decodable image.
    #[error("failed to decode image `{url}`")]
    Decode {
        /// Requested URL.
        url: String,
        /// Underlying error.
        #[source]
        source: png::DecodingError,
    },
    /// Decoded, but into a pixel layout that is not supported.
    #[error("image `{url}` has an unsupported pixel format ({detail})")]
    UnsupportedFormat {
        /// Requested URL.
        url: String,
        /// Description of the format.
        detail: String,
    },
    /// The pass that wanted the image was superseded before the load started.
    #[error("load of `{url}` abandoned by a newer pass")]
    Cancelled {
        /// Requested URL.
        url: String,
    },
}

impl ImageLoadError {
    /// A not-found error for `url`.
    pub fn not_found(url: &str) -> Self {
        Self::Io {
            url: url.to_owned(),
            source: io::Error::from(io::ErrorKind::NotFound),
        }
    }

    /// Whether the load was abandoned rather than failed.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
