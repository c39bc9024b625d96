// MIT/Apache2 License

//! Image handles, the shared image cache, and the drawable that renders cached images.

mod cache;
mod drawable;
mod loader;

#[cfg(feature = "async")]
mod ready;

pub use cache::*;
pub use drawable::*;
pub use loader::*;

use std::num::NonZeroUsize;

/// Represents a host-side image.
///
/// The rendering host, or whatever is actually decoding and rasterizing images, owns the pixels. An `Image` is
/// just the ID or pointer that the host uses to identify them. It is cheap to copy and carries no lifetime, so a
/// single loaded `Image` can be handed to every surface that draws it.
///
/// The `Image` struct itself is a thin wrapper around [`NonZeroUsize`]. There is no automatic management or
/// cleanup of the `Image`'s resources; see [`ImageStore::destroy_image`].
///
/// [`NonZeroUsize`]: https://doc.rust-lang.org/std/num/struct.NonZeroUsize.html
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Image {
    inner: NonZeroUsize,
}

impl Image {
    /// Create a new `Image` from a `NonZeroUsize` representing a host-side image.
    #[inline]
    pub fn from_raw(raw: NonZeroUsize) -> Image {
        Image { inner: raw }
    }

    /// Get the `NonZeroUsize` backing this `Image`.
    #[inline]
    pub fn into_raw(self) -> NonZeroUsize {
        self.inner
    }
}

/// The format that client-side image bytes can have.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImageFormat {
    /// Grayscale format. Each element of the byte slice is a pixel representing how bright it is.
    Grayscale,
    /// Every three elements of the byte slice is an array of channels consisting of red, green and blue.
    Rgb,
    /// Every four elements of the byte slice is an array of channels consisting of red, green, blue and alpha.
    Rgba,
}

impl ImageFormat {
    /// Does this `ImageFormat` carry an alpha channel?
    #[inline]
    pub fn is_transparent(self) -> bool {
        matches!(self, ImageFormat::Rgba)
    }

    /// Get the quantum (i.e. bytes per pixel) for this image.
    #[inline]
    pub fn quantum(self) -> usize {
        match self {
            ImageFormat::Grayscale => 1,
            ImageFormat::Rgb => 3,
            ImageFormat::Rgba => 4,
        }
    }

    /// Expand one pixel's worth of bytes into RGBA channels. `pixel` must hold at least `quantum()` bytes.
    #[inline]
    pub(crate) fn to_rgba(self, pixel: &[u8]) -> [u8; 4] {
        match self {
            ImageFormat::Grayscale => [pixel[0], pixel[0], pixel[0], 0xFF],
            ImageFormat::Rgb => [pixel[0], pixel[1], pixel[2], 0xFF],
            ImageFormat::Rgba => [pixel[0], pixel[1], pixel[2], pixel[3]],
        }
    }

    /// Divide a given image into chunks representing pixels.
    #[inline]
    pub fn into_chunks(self, bytes: &[u8], width: u32, height: u32) -> impl Iterator<Item = &[u8]> {
        bytes
            .chunks_exact(self.quantum())
            .take(width as usize * height as usize)
    }
}

/// Something that owns image memory on behalf of rendering contexts.
///
/// For our purposes, the store exists for creating and destroying `Image`s out of client-side pixel data. An
/// `ImageLoader` usually decodes a source into bytes and then asks a store for the `Image` handle it reports.
pub trait ImageStore {
    /// Creates a new `Image`.
    ///
    /// The `image_bytes` slice is expected to contain bytes in accordance with the supplied `ImageFormat`. The
    /// `width` and `height` specify the dimensions of the image.
    fn create_image(
        &mut self,
        image_bytes: &[u8],
        width: u32,
        height: u32,
        format: ImageFormat,
    ) -> crate::Result<Image>;

    /// Destroys an `Image`.
    ///
    /// This takes an `Image` and deallocates its memory. Images referenced by the image cache are expected to
    /// stay alive for as long as the cache does.
    fn destroy_image(&mut self, image: Image) -> crate::Result;
}

impl<S: ImageStore + ?Sized> ImageStore for &mut S {
    #[inline]
    fn create_image(
        &mut self,
        image_bytes: &[u8],
        width: u32,
        height: u32,
        format: ImageFormat,
    ) -> crate::Result<Image> {
        (**self).create_image(image_bytes, width, height, format)
    }
    #[inline]
    fn destroy_image(&mut self, image: Image) -> crate::Result {
        (**self).destroy_image(image)
    }
}
