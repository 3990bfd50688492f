use std::ops::{ Add, Sub, Mul };

use crate::feq_within;
use crate::consts::COLOR_EPSILON;

/// A color.
///
/// Represented with red-green-blue (RGB) channels. Channels nominally range
/// from 0.0 to 1.0, but intermediate results of lighting routinely exceed
/// that; clamping only happens when a `Canvas` is serialized.
///
/// # Examples
///
/// ```
/// # use raytracer::color::Color;
/// let yellow = Color::rgb(1.0, 1.0, 0.0);
/// let purple = Color::rgb(1.0, 0.0, 1.0);
/// assert_eq!(yellow * purple, Color::red());
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Colors are compared channel-wise with a tolerance of `COLOR_EPSILON`.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq_within(self.r, other.r, COLOR_EPSILON) &&
            feq_within(self.g, other.g, COLOR_EPSILON) &&
            feq_within(self.b, other.b, COLOR_EPSILON)
    }
}

impl Color {
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    pub fn black() -> Color {
        Color::rgb(0.0, 0.0, 0.0)
    }

    pub fn white() -> Color {
        Color::rgb(1.0, 1.0, 1.0)
    }

    pub fn red() -> Color {
        Color::rgb(1.0, 0.0, 0.0)
    }

    pub fn green() -> Color {
        Color::rgb(0.0, 1.0, 0.0)
    }

    pub fn blue() -> Color {
        Color::rgb(0.0, 0.0, 1.0)
    }

    /// Multiplies each channel of two colors (the Hadamard product).
    pub fn hadamard(c1: &Color, c2: &Color) -> Color {
        Color {
            r: c1.r * c2.r,
            g: c1.g * c2.g,
            b: c1.b * c2.b,
        }
    }

    /// Linear interpolation; `fraction == 0.0` yields `self`.
    pub fn lerp(&self, other: &Color, fraction: f64) -> Color {
        *self + (*other - *self) * fraction
    }

    /// Scales each channel to `0..=255`, rounding and clamping.
    pub fn to_bytes(&self) -> [u8; 3] {
        let scale = |c: f64| (c * 255.0).round().clamp(0.0, 255.0) as u8;
        [scale(self.r), scale(self.g), scale(self.b)]
    }
}

impl Add<Color> for Color {
    type Output = Color;

    fn add(self, other: Color) -> Self::Output {
        Color {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
        }
    }
}

impl Sub<Color> for Color {
    type Output = Color;

    fn sub(self, other: Color) -> Self::Output {
        Color {
            r: self.r - other.r,
            g: self.g - other.g,
            b: self.b - other.b,
        }
    }
}

impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, other: f64) -> Self::Output {
        Color {
            r: self.r * other,
            g: self.g * other,
            b: self.b * other,
        }
    }
}

impl Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        other * self
    }
}

/// Shorthand for `Color::hadamard(&c1, &c2)`.
impl Mul<Color> for Color {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        Color::hadamard(&self, &other)
    }
}

#[test]
fn add_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(c1 + c2, Color::rgb(1.6, 0.7, 1.0));
}

#[test]
fn subtract_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(c1 - c2, Color::rgb(0.2, 0.5, 0.5));
}

#[test]
fn multiply_color_by_scalar() {
    let c = Color::rgb(0.2, 0.3, 0.4);

    assert_eq!(c * 2.0, Color::rgb(0.4, 0.6, 0.8));
    assert_eq!(2.0 * c, Color::rgb(0.4, 0.6, 0.8));
}

#[test]
fn multiply_colors() {
    let c1 = Color::rgb(1.0, 0.2, 0.4);
    let c2 = Color::rgb(0.9, 1.0, 0.1);

    assert_eq!(c1 * c2, Color::rgb(0.9, 0.2, 0.04));
}

#[test]
fn lerp_between_colors() {
    let a = Color::white();
    let b = Color::black();

    assert_eq!(a.lerp(&b, 0.25), Color::rgb(0.75, 0.75, 0.75));
    assert_eq!(a.lerp(&b, 0.0), a);
}

#[test]
fn scale_to_bytes() {
    assert_eq!(Color::rgb(1.5, 0.0, 0.0).to_bytes(), [255, 0, 0]);
    assert_eq!(Color::rgb(0.0, 0.5, 0.0).to_bytes(), [0, 128, 0]);
    assert_eq!(Color::rgb(-0.5, 0.0, 1.0).to_bytes(), [0, 0, 255]);
}
