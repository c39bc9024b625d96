// MIT/Apache2 License

use crate::{Color, Image};
use lyon_geom::Angle;
use parking_lot::Mutex;
use std::sync::Arc;

/// A rendering context, otherwise known as the thing every drawable eventually talks to.
///
/// `RenderContext`s are usually canvases, windows, or pixel buffers that can be modified through a host's 2D
/// drawing API. The trait mirrors the small set of primitives every such API exposes:
///
/// * Setting the current fill and stroke colors with `set_fill_color` and `set_stroke_color`.
/// * Filling and outlining axis-aligned rectangles with `fill_rect` and `stroke_rect`.
/// * Building a path of arcs with `begin_path` and `arc`, then filling or outlining it with `fill` or `stroke`.
/// * Copying an [`Image`] onto the context, scaled to a destination rectangle, with `draw_image`.
///
/// Geometry is not validated; negative sizes are passed to the host unchanged.
pub trait RenderContext {
    /// Set the color used to fill shapes.
    fn set_fill_color(&mut self, color: Color) -> crate::Result;
    /// Set the color used to draw outlines.
    fn set_stroke_color(&mut self, color: Color) -> crate::Result;

    /// Fill in a rectangle with the current fill color.
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> crate::Result;
    /// Draw the outline of a rectangle with the current stroke color.
    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> crate::Result;

    /// Discard the current path and start a new one.
    fn begin_path(&mut self) -> crate::Result;
    /// Add a circular arc centered on (x, y) to the current path, going clockwise from `start` to `end`.
    fn arc(&mut self, x: f32, y: f32, radius: f32, start: Angle<f32>, end: Angle<f32>)
        -> crate::Result;
    /// Fill in the current path with the current fill color.
    fn fill(&mut self) -> crate::Result;
    /// Draw the outline of the current path with the current stroke color.
    fn stroke(&mut self) -> crate::Result;

    /// Copy an image onto this context, scaled to fit the given rectangle.
    fn draw_image(&mut self, image: Image, x: f32, y: f32, width: f32, height: f32)
        -> crate::Result;

    /// The surface backing this context changed size.
    #[inline]
    fn resize(&mut self, _width: u32, _height: u32) -> crate::Result {
        Ok(())
    }

    /// Flush all drawing operations down to the host, if necessary.
    #[inline]
    fn flush(&mut self) -> crate::Result {
        Ok(())
    }
}

/// A rendering context that can be kept around and drawn to later, possibly from another thread.
///
/// Deferred image draws hold on to one of these until the image they are waiting on finishes loading.
pub type SharedContext = Arc<Mutex<dyn RenderContext + Send>>;

/// Wrap a rendering context so that it can be shared.
#[inline]
pub fn share<C: RenderContext + Send + 'static>(context: C) -> SharedContext {
    Arc::new(Mutex::new(context))
}

impl<C: RenderContext + ?Sized> RenderContext for &mut C {
    #[inline]
    fn set_fill_color(&mut self, color: Color) -> crate::Result {
        (**self).set_fill_color(color)
    }
    #[inline]
    fn set_stroke_color(&mut self, color: Color) -> crate::Result {
        (**self).set_stroke_color(color)
    }
    #[inline]
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> crate::Result {
        (**self).fill_rect(x, y, width, height)
    }
    #[inline]
    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> crate::Result {
        (**self).stroke_rect(x, y, width, height)
    }
    #[inline]
    fn begin_path(&mut self) -> crate::Result {
        (**self).begin_path()
    }
    #[inline]
    fn arc(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        start: Angle<f32>,
        end: Angle<f32>,
    ) -> crate::Result {
        (**self).arc(x, y, radius, start, end)
    }
    #[inline]
    fn fill(&mut self) -> crate::Result {
        (**self).fill()
    }
    #[inline]
    fn stroke(&mut self) -> crate::Result {
        (**self).stroke()
    }
    #[inline]
    fn draw_image(
        &mut self,
        image: Image,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> crate::Result {
        (**self).draw_image(image, x, y, width, height)
    }
    #[inline]
    fn resize(&mut self, width: u32, height: u32) -> crate::Result {
        (**self).resize(width, height)
    }
    #[inline]
    fn flush(&mut self) -> crate::Result {
        (**self).flush()
    }
}

impl<C: RenderContext + ?Sized> RenderContext for Box<C> {
    #[inline]
    fn set_fill_color(&mut self, color: Color) -> crate::Result {
        (**self).set_fill_color(color)
    }
    #[inline]
    fn set_stroke_color(&mut self, color: Color) -> crate::Result {
        (**self).set_stroke_color(color)
    }
    #[inline]
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> crate::Result {
        (**self).fill_rect(x, y, width, height)
    }
    #[inline]
    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> crate::Result {
        (**self).stroke_rect(x, y, width, height)
    }
    #[inline]
    fn begin_path(&mut self) -> crate::Result {
        (**self).begin_path()
    }
    #[inline]
    fn arc(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        start: Angle<f32>,
        end: Angle<f32>,
    ) -> crate::Result {
        (**self).arc(x, y, radius, start, end)
    }
    #[inline]
    fn fill(&mut self) -> crate::Result {
        (**self).fill()
    }
    #[inline]
    fn stroke(&mut self) -> crate::Result {
        (**self).stroke()
    }
    #[inline]
    fn draw_image(
        &mut self,
        image: Image,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> crate::Result {
        (**self).draw_image(image, x, y, width, height)
    }
    #[inline]
    fn resize(&mut self, width: u32, height: u32) -> crate::Result {
        (**self).resize(width, height)
    }
    #[inline]
    fn flush(&mut self) -> crate::Result {
        (**self).flush()
    }
}
