// MIT/Apache2 License

use crate::{intensity::Intensity, Error};
use std::{fmt, str::FromStr};

/// A four-element color.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Color {
    r: Intensity,
    g: Intensity,
    b: Intensity,
    a: Intensity,
}

impl Color {
    pub const WHITE: Color = unsafe { Color::new_unchecked(1.0, 1.0, 1.0, 1.0) };
    pub const BLACK: Color = unsafe { Color::new_unchecked(0.0, 0.0, 0.0, 1.0) };
    pub const TRANSPARENT: Color = unsafe { Color::new_unchecked(0.0, 0.0, 0.0, 0.0) };

    /// Create a new color.
    ///
    /// # Safety
    ///
    /// Behavior is undefined if any of the elements are NaN or outside of the range [0, 1].
    #[allow(unused_unsafe)]
    #[inline]
    pub const unsafe fn new_unchecked(r: f32, g: f32, b: f32, a: f32) -> Self {
        unsafe {
            Self {
                r: Intensity::new_unchecked(r),
                g: Intensity::new_unchecked(g),
                b: Intensity::new_unchecked(b),
                a: Intensity::new_unchecked(a),
            }
        }
    }

    /// Creates a new color. This function returns `None` if any of the elements are NaN or out of range.
    #[inline]
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Option<Self> {
        Some(Self {
            r: Intensity::new(r)?,
            g: Intensity::new(g)?,
            b: Intensity::new(b)?,
            a: Intensity::new(a)?,
        })
    }

    /// Creates a new color from 8-bit channels.
    #[inline]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: Intensity::from_u8(r),
            g: Intensity::from_u8(g),
            b: Intensity::from_u8(b),
            a: Intensity::from_u8(a),
        }
    }

    /// Gets the red element.
    #[inline]
    pub fn red(self) -> f32 {
        self.r.into_inner()
    }

    /// Gets the green element.
    #[inline]
    pub fn green(self) -> f32 {
        self.g.into_inner()
    }

    /// Gets the blue element.
    #[inline]
    pub fn blue(self) -> f32 {
        self.b.into_inner()
    }

    /// Gets the alpha element.
    #[inline]
    pub fn alpha(self) -> f32 {
        self.a.into_inner()
    }

    /// Is this color fully opaque?
    #[inline]
    pub fn is_opaque(self) -> bool {
        self.a == Intensity::ONE
    }

    /// Clamp to u8's.
    #[inline]
    pub fn clamp_u8(self) -> (u8, u8, u8, u8) {
        let r = self.r.clamp_u8();
        let g = self.g.clamp_u8();
        let b = self.b.clamp_u8();
        let a = self.a.clamp_u8();
        (r, g, b, a)
    }

    /// Clamp to u16's.
    #[inline]
    pub fn clamp_u16(self) -> (u16, u16, u16, u16) {
        let r: u16 = self.r.clamp_u16();
        let g: u16 = self.g.clamp_u16();
        let b: u16 = self.b.clamp_u16();
        let a: u16 = self.a.clamp_u16();
        (r, g, b, a)
    }
}

/// Parses CSS hex literals: `#rgb`, `#rgba`, `#rrggbb` and `#rrggbbaa`.
impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let invalid = || Error::InvalidColor(s.to_string());
        let digits = s.strip_prefix('#').ok_or_else(invalid)?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let nibble = |i: usize| u8::from_str_radix(&digits[i..=i], 16).map_err(|_| invalid());
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());

        match digits.len() {
            3 | 4 => {
                let a = if digits.len() == 4 { nibble(3)? * 17 } else { 0xFF };
                Ok(Color::from_rgba8(
                    nibble(0)? * 17,
                    nibble(1)? * 17,
                    nibble(2)? * 17,
                    a,
                ))
            }
            6 | 8 => {
                let a = if digits.len() == 8 { byte(6)? } else { 0xFF };
                Ok(Color::from_rgba8(byte(0)?, byte(2)?, byte(4)?, a))
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b, a) = self.clamp_u8();
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)?;
        if a != 0xFF {
            write!(f, "{:02x}", a)?;
        }
        Ok(())
    }
}
