// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Where raster images come from.

use std::collections::HashMap;
use std::future::{self, Future};
use std::path::{Path, PathBuf};

use png::{BitDepth, ColorType, Transformations};

use crate::{ImageLoadError, RasterImage};

/// Asynchronous access to raster images by URL.
///
/// Each request resolves exactly once, to an image or an error. The
/// compositor deduplicates URLs within a pass, so an implementation sees at
/// most one request per distinct URL per pass.
pub trait ImageCache {
    /// Requests the image addressed by `url`.
    fn request(&self, url: &str) -> impl Future<Output = Result<RasterImage, ImageLoadError>>;
}

impl<T: ImageCache + ?Sized> ImageCache for &T {
    fn request(&self, url: &str) -> impl Future<Output = Result<RasterImage, ImageLoadError>> {
        (**self).request(url)
    }
}

/// Images held in memory, keyed by URL.
#[derive(Clone, Debug, Default)]
pub struct MemoryImageSource {
    images: HashMap<String, RasterImage>,
}

impl MemoryImageSource {
    /// An empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the image for `url`.
    pub fn insert(&mut self, url: impl Into<String>, image: RasterImage) {
        self.images.insert(url.into(), image);
    }

    /// Builder form of [`MemoryImageSource::insert`].
    #[must_use]
    pub fn with(mut self, url: impl Into<String>, image: RasterImage) -> Self {
        self.insert(url, image);
        self
    }

    /// Removes the image for `url`.
    pub fn remove(&mut self, url: &str) -> Option<RasterImage> {
        self.images.remove(url)
    }

    /// Number of images held.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether no images are held.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageCache for MemoryImageSource {
    fn request(&self, url: &str) -> impl Future<Output = Result<RasterImage, ImageLoadError>> {
        future::ready(
            self.images
                .get(url)
                .cloned()
                .ok_or_else(|| ImageLoadError::not_found(url)),
        )
    }
}

/// PNG files under a base directory.
///
/// A URL is a path relative to the base directory; a leading `/` is ignored.
#[derive(Clone, Debug)]
pub struct PngDirectorySource {
    base: PathBuf,
}

impl PngDirectorySource {
    /// Serves PNG files from `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// The base directory.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// The file a URL refers to.
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.base.join(url.trim_start_matches('/'))
    }
}

impl ImageCache for PngDirectorySource {
    fn request(&self, url: &str) -> impl Future<Output = Result<RasterImage, ImageLoadError>> {
        let path = self.path_for(url);
        let url = url.to_owned();
        async move {
            let bytes = std::fs::read(&path).map_err(|source| ImageLoadError::Io {
                url: url.clone(),
                source,
            })?;
            decode_png(&url, &bytes)
        }
    }
}

/// Decodes PNG bytes into straight-alpha RGBA8.
///
/// Palette and 16-bit images are normalized; grayscale is widened to RGB.
pub fn decode_png(url: &str, bytes: &[u8]) -> Result<RasterImage, ImageLoadError> {
    let decode_err = |source| ImageLoadError::Decode {
        url: url.to_owned(),
        source,
    };

    let mut decoder = png::Decoder::new(bytes);
    decoder.set_transformations(Transformations::ALPHA | Transformations::STRIP_16);
    let mut reader = decoder.read_info().map_err(decode_err)?;
    let mut buf = vec![0_u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).map_err(decode_err)?;
    buf.truncate(info.buffer_size());

    let pixels = match (info.color_type, info.bit_depth) {
        (ColorType::Rgba, BitDepth::Eight) => buf,
        (ColorType::GrayscaleAlpha, BitDepth::Eight) => buf
            .chunks_exact(2)
            .flat_map(|ga| [ga[0], ga[0], ga[0], ga[1]])
            .collect(),
        (color, depth) => {
            return Err(ImageLoadError::UnsupportedFormat {
                url: url.to_owned(),
                detail: format!("{color:?} at {depth:?}"),
            });
        }
    };

    RasterImage::from_rgba8(info.width, info.height, pixels).ok_or_else(|| {
        ImageLoadError::UnsupportedFormat {
            url: url.to_owned(),
            detail: "row padding".to_owned(),
        }
    })
}
