// MIT/Apache2 License

use super::{Enqueued, Image, ImageCache, Registration, ResourceIndex};
use crate::{Drawable, SharedContext};
use lyon_geom::{point, Point};
use parking_lot::Mutex;
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

/// An image placed somewhere on a surface.
///
/// The pixels come from a shared resource in an [`ImageCache`]; any number of `ImageDrawable`s may use the same
/// resource. Drawing one before its resource has loaded queues the draw, and the cache replays it onto the same
/// context once the load completes, using whatever geometry the drawable has at that point.
///
/// `ImageDrawable` is a handle. Clones refer to the same drawable, and the mutators take `&self` so that a
/// drawable can be moved while a draw of it is pending.
#[derive(Clone)]
pub struct ImageDrawable {
    inner: Arc<Shared>,
}

struct Shared {
    cache: ImageCache,
    index: ResourceIndex,
    frame: Mutex<Frame>,
    // only ever goes from false to true
    loaded: AtomicBool,
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct Frame {
    position: Point<f32>,
    height: f32,
    width: f32,
}

impl ImageDrawable {
    /// Create a drawable for `source`, registering the source with `cache` if it is new.
    pub fn new(cache: &ImageCache, source: &str, x: f32, y: f32, height: f32, width: f32) -> Self {
        let Registration {
            index,
            already_loaded,
        } = cache.register(source);

        let drawable = Self {
            inner: Arc::new(Shared {
                cache: cache.clone(),
                index,
                frame: Mutex::new(Frame {
                    position: point(x, y),
                    height,
                    width,
                }),
                loaded: AtomicBool::new(already_loaded),
            }),
        };

        if !already_loaded {
            // a request with no context, so the replay marks this drawable as loaded
            match cache.enqueue_draw(index, None, &drawable) {
                Ok(Enqueued::Deferred) => {}
                Ok(Enqueued::Ready(_)) => drawable.mark_loaded(),
                Err(e) => log::debug!("{}", e),
            }
        }

        drawable
    }

    /// The cache resource this drawable renders.
    #[inline]
    pub fn index(&self) -> ResourceIndex {
        self.inner.index
    }

    #[inline]
    pub fn cache(&self) -> &ImageCache {
        &self.inner.cache
    }

    /// Can this drawable render right away? This does not mean it has been drawn.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.inner.loaded.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn mark_loaded(&self) {
        self.inner.loaded.store(true, Ordering::Release);
    }

    #[inline]
    pub fn position(&self) -> Point<f32> {
        self.inner.frame.lock().position
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.inner.frame.lock().height
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.inner.frame.lock().width
    }

    #[inline]
    pub fn set_position(&self, x: f32, y: f32) -> &Self {
        self.inner.frame.lock().position = point(x, y);
        self
    }

    #[inline]
    pub fn set_x(&self, x: f32) -> &Self {
        self.inner.frame.lock().position.x = x;
        self
    }

    #[inline]
    pub fn set_y(&self, y: f32) -> &Self {
        self.inner.frame.lock().position.y = y;
        self
    }

    #[inline]
    pub fn set_height(&self, height: f32) -> &Self {
        self.inner.frame.lock().height = height;
        self
    }

    #[inline]
    pub fn set_width(&self, width: f32) -> &Self {
        self.inner.frame.lock().width = width;
        self
    }

    /// Do these two handles refer to the same drawable?
    #[inline]
    pub fn ptr_eq(&self, other: &ImageDrawable) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn render(&self, context: &SharedContext, image: Image) -> crate::Result {
        let Frame {
            position,
            height,
            width,
        } = *self.inner.frame.lock();
        context
            .lock()
            .draw_image(image, position.x, position.y, width, height)
    }
}

impl Drawable for ImageDrawable {
    fn draw(&self, context: Option<&SharedContext>) -> crate::Result {
        let context = match context {
            Some(context) => context,
            None => return Ok(()),
        };

        if self.is_loaded() {
            let image = self.inner.cache.image(self.inner.index)?;
            return self.render(context, image);
        }

        match self
            .inner
            .cache
            .enqueue_draw(self.inner.index, Some(context.clone()), self)?
        {
            Enqueued::Deferred => Ok(()),
            Enqueued::Ready(image) => {
                self.mark_loaded();
                self.render(context, image)
            }
        }
    }
}

impl fmt::Debug for ImageDrawable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = *self.inner.frame.lock();
        f.debug_struct("ImageDrawable")
            .field("index", &self.inner.index)
            .field("position", &frame.position)
            .field("height", &frame.height)
            .field("width", &frame.width)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
