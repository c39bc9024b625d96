// MIT/Apache2 License

use crate::{Error, Image, ImageFormat, ImageStore};
use parking_lot::Mutex;
use std::{collections::HashMap, num::NonZeroUsize, sync::Arc};

/// Client-side pixels behind an `Image`, expanded to RGBA.
#[derive(Debug, Clone)]
pub(crate) struct Bitmap {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) pixels: Vec<[u8; 4]>,
}

impl Bitmap {
    #[inline]
    pub(crate) fn get(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels[(y * self.width + x) as usize]
    }
}

/// An [`ImageStore`] that keeps pixel data in memory for [`PixelBuffer`]s.
///
/// Clones share the same images, so one `Image` created here can be drawn by every pixel buffer built with
/// [`PixelBuffer::with_store`].
///
/// [`PixelBuffer`]: crate::PixelBuffer
/// [`PixelBuffer::with_store`]: crate::PixelBuffer::with_store
#[derive(Debug, Clone, Default)]
pub struct BitmapStore {
    inner: Arc<Mutex<Bitmaps>>,
}

#[derive(Debug, Default)]
struct Bitmaps {
    last_id: usize,
    images: HashMap<Image, Arc<Bitmap>>,
}

impl BitmapStore {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of live images.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.lock().images.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn contains(&self, image: Image) -> bool {
        self.inner.lock().images.contains_key(&image)
    }

    /// The dimensions of an image, as (width, height).
    #[inline]
    pub fn dimensions(&self, image: Image) -> Option<(u32, u32)> {
        self.inner
            .lock()
            .images
            .get(&image)
            .map(|bitmap| (bitmap.width, bitmap.height))
    }

    #[inline]
    pub(crate) fn bitmap(&self, image: Image) -> crate::Result<Arc<Bitmap>> {
        self.inner
            .lock()
            .images
            .get(&image)
            .cloned()
            .ok_or(Error::UnknownImage(image))
    }
}

impl ImageStore for BitmapStore {
    fn create_image(
        &mut self,
        image_bytes: &[u8],
        width: u32,
        height: u32,
        format: ImageFormat,
    ) -> crate::Result<Image> {
        let expected = width as usize * height as usize * format.quantum();
        if image_bytes.len() < expected {
            return Err(Error::Msg(format!(
                "Expected {} bytes for a {}x{} {:?} image, got {}",
                expected,
                width,
                height,
                format,
                image_bytes.len()
            )));
        }

        let pixels = format
            .into_chunks(image_bytes, width, height)
            .map(|pixel| format.to_rgba(pixel))
            .collect();

        let mut bitmaps = self.inner.lock();
        bitmaps.last_id += 1;
        let image = Image::from_raw(
            NonZeroUsize::new(bitmaps.last_id).ok_or(Error::StaticMsg("Ran out of image IDs"))?,
        );
        bitmaps.images.insert(
            image,
            Arc::new(Bitmap {
                width,
                height,
                pixels,
            }),
        );
        Ok(image)
    }

    fn destroy_image(&mut self, image: Image) -> crate::Result {
        match self.inner.lock().images.remove(&image) {
            Some(_) => Ok(()),
            None => Err(Error::UnknownImage(image)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_and_destroys_images() {
        let mut store = BitmapStore::new();
        let gray = store
            .create_image(&[0, 255, 128, 64], 2, 2, ImageFormat::Grayscale)
            .unwrap();
        let rgb = store
            .create_image(&[1, 2, 3], 1, 1, ImageFormat::Rgb)
            .unwrap();
        assert_ne!(gray, rgb);
        assert_eq!(store.len(), 2);
        assert_eq!(store.dimensions(gray), Some((2, 2)));
        assert_eq!(store.bitmap(gray).unwrap().get(1, 0), [255, 255, 255, 255]);
        assert_eq!(store.bitmap(rgb).unwrap().get(0, 0), [1, 2, 3, 255]);

        store.destroy_image(gray).unwrap();
        assert!(!store.contains(gray));
        assert!(matches!(
            store.destroy_image(gray),
            Err(Error::UnknownImage(_))
        ));
    }

    #[test]
    fn rejects_short_data() {
        let mut store = BitmapStore::new();
        assert!(store
            .create_image(&[0; 11], 2, 2, ImageFormat::Rgb)
            .is_err());
        assert!(store.is_empty());
    }
}
