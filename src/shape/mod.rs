// MIT/Apache2 License

//! Things that know how to draw themselves.

mod circle;
mod rectangle;

pub use circle::*;
pub use rectangle::*;

use crate::SharedContext;

/// Something that can be drawn onto a rendering context.
///
/// `None` stands for "no surface has asked for this yet"; every drawable treats it as a no-op.
pub trait Drawable {
    /// Draw this object using the given context.
    fn draw(&self, context: Option<&SharedContext>) -> crate::Result;
}

impl<D: Drawable + ?Sized> Drawable for &D {
    #[inline]
    fn draw(&self, context: Option<&SharedContext>) -> crate::Result {
        (**self).draw(context)
    }
}

impl<D: Drawable + ?Sized> Drawable for Box<D> {
    #[inline]
    fn draw(&self, context: Option<&SharedContext>) -> crate::Result {
        (**self).draw(context)
    }
}
