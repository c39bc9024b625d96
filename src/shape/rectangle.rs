// MIT/Apache2 License

use super::Drawable;
use crate::{Color, RenderContext, SharedContext};
use lyon_geom::{point, Point};

/// An axis-aligned rectangle, either filled or outlined.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rectangle {
    position: Point<f32>,
    height: f32,
    width: f32,
    color: Color,
    filled: bool,
}

impl Default for Rectangle {
    #[inline]
    fn default() -> Self {
        Self {
            position: point(0.0, 0.0),
            height: 10.0,
            width: 10.0,
            color: Color::BLACK,
            filled: true,
        }
    }
}

impl Rectangle {
    /// Create a new black rectangle with its top-left corner at (x, y).
    #[inline]
    pub fn new(x: f32, y: f32, height: f32, width: f32, filled: bool) -> Self {
        Self {
            position: point(x, y),
            height,
            width,
            filled,
            ..Default::default()
        }
    }

    #[inline]
    pub fn position(&self) -> Point<f32> {
        self.position
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        self.filled
    }

    #[inline]
    pub fn set_height(&mut self, height: f32) -> &mut Self {
        self.height = height;
        self
    }

    #[inline]
    pub fn set_width(&mut self, width: f32) -> &mut Self {
        self.width = width;
        self
    }

    #[inline]
    pub fn set_position(&mut self, x: f32, y: f32) -> &mut Self {
        self.position = point(x, y);
        self
    }

    #[inline]
    pub fn set_x(&mut self, x: f32) -> &mut Self {
        self.position.x = x;
        self
    }

    #[inline]
    pub fn set_y(&mut self, y: f32) -> &mut Self {
        self.position.y = y;
        self
    }

    #[inline]
    pub fn set_color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    #[inline]
    pub fn set_filled(&mut self, filled: bool) -> &mut Self {
        self.filled = filled;
        self
    }

    /// Issue this rectangle's single fill or stroke call.
    pub fn render<C: RenderContext + ?Sized>(&self, context: &mut C) -> crate::Result {
        let Point { x, y, .. } = self.position;
        if self.filled {
            context.set_fill_color(self.color)?;
            context.fill_rect(x, y, self.width, self.height)
        } else {
            context.set_stroke_color(self.color)?;
            context.stroke_rect(x, y, self.width, self.height)
        }
    }
}

impl Drawable for Rectangle {
    #[inline]
    fn draw(&self, context: Option<&SharedContext>) -> crate::Result {
        match context {
            Some(context) => self.render(&mut *context.lock()),
            None => Ok(()),
        }
    }
}
