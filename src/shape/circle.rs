// MIT/Apache2 License

use super::Drawable;
use crate::{Color, RenderContext, SharedContext};
use lyon_geom::{point, Angle, Point};

/// A full circle, either filled or outlined.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Circle {
    center: Point<f32>,
    radius: f32,
    color: Color,
    filled: bool,
}

impl Default for Circle {
    #[inline]
    fn default() -> Self {
        Self {
            center: point(0.0, 0.0),
            radius: 10.0,
            color: Color::BLACK,
            filled: true,
        }
    }
}

impl Circle {
    /// Create a new black circle centered on (x, y).
    #[inline]
    pub fn new(x: f32, y: f32, radius: f32, filled: bool) -> Self {
        Self {
            center: point(x, y),
            radius,
            filled,
            ..Default::default()
        }
    }

    #[inline]
    pub fn position(&self) -> Point<f32> {
        self.center
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
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
    pub fn set_radius(&mut self, radius: f32) -> &mut Self {
        self.radius = radius;
        self
    }

    #[inline]
    pub fn set_position(&mut self, x: f32, y: f32) -> &mut Self {
        self.center = point(x, y);
        self
    }

    #[inline]
    pub fn set_x(&mut self, x: f32) -> &mut Self {
        self.center.x = x;
        self
    }

    #[inline]
    pub fn set_y(&mut self, y: f32) -> &mut Self {
        self.center.y = y;
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

    /// Trace a single full-circle arc and fill or stroke it.
    pub fn render<C: RenderContext + ?Sized>(&self, context: &mut C) -> crate::Result {
        context.begin_path()?;
        context.set_fill_color(self.color)?;
        context.set_stroke_color(self.color)?;
        context.arc(
            self.center.x,
            self.center.y,
            self.radius,
            Angle::radians(0.0),
            Angle::radians(2.0 * std::f32::consts::PI),
        )?;

        if self.filled {
            context.fill()
        } else {
            context.stroke()
        }
    }
}

impl Drawable for Circle {
    #[inline]
    fn draw(&self, context: Option<&SharedContext>) -> crate::Result {
        match context {
            Some(context) => self.render(&mut *context.lock()),
            None => Ok(()),
        }
    }
}
