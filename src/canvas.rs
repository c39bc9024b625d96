// MIT/Apache2 License

use crate::{share, Drawable, RenderContext, SharedContext};

/// A drawing surface with fixed pixel dimensions.
///
/// The `Canvas` owns the rendering context for its surface and nothing else. Drawing something on it hands that
/// context to the drawable, which decides what to do with it.
#[derive(Clone)]
pub struct Canvas {
    id: String,
    height: u32,
    width: u32,
    context: SharedContext,
}

impl Canvas {
    /// Create a canvas around `context`, sizing the context to match.
    #[inline]
    pub fn new<C: RenderContext + Send + 'static>(
        id: impl Into<String>,
        height: u32,
        width: u32,
        context: C,
    ) -> crate::Result<Self> {
        Self::from_shared(id, height, width, share(context))
    }

    /// Create a canvas around a context that is already shared.
    pub fn from_shared(
        id: impl Into<String>,
        height: u32,
        width: u32,
        context: SharedContext,
    ) -> crate::Result<Self> {
        let id = id.into();
        log::debug!("Creating canvas \"{}\" ({}x{})", id, width, height);
        context.lock().resize(width, height)?;
        Ok(Self {
            id,
            height,
            width,
            context,
        })
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The rendering context drawables receive from this canvas.
    #[inline]
    pub fn context(&self) -> &SharedContext {
        &self.context
    }

    /// Draw something on this canvas.
    #[inline]
    pub fn draw<D: Drawable + ?Sized>(&self, drawable: &D) -> crate::Result<&Self> {
        drawable.draw(Some(&self.context))?;
        Ok(self)
    }

    #[inline]
    pub fn set_height(&mut self, height: u32) -> crate::Result<&mut Self> {
        self.context.lock().resize(self.width, height)?;
        self.height = height;
        Ok(self)
    }

    #[inline]
    pub fn set_width(&mut self, width: u32) -> crate::Result<&mut Self> {
        self.context.lock().resize(width, self.height)?;
        self.width = width;
        Ok(self)
    }

    /// Flush all drawing operations down to the host.
    #[inline]
    pub fn flush(&self) -> crate::Result {
        self.context.lock().flush()
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("id", &self.id)
            .field("height", &self.height)
            .field("width", &self.width)
            .finish()
    }
}
