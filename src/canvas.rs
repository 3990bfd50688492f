use std::fs;
use std::path::Path;

use rayon::prelude::*;

use crate::color::Color;
use crate::error::Result;

/// Maximum line length of a PPM file.
const PPM_LINE_WIDTH: usize = 70;

/// A grid of pixels.
///
/// The `Camera` renders into a canvas; once rendering finishes, the canvas is
/// serialized to a plain-text PPM image. Pixels are stored row-major as a
/// flattened vector, starting at the top-left corner.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl Canvas {
    /// Creates a black canvas with the specified width and height.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::black(); width * height]
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Writes a color to column `x`, row `y`.
    ///
    /// Out-of-bounds pixels are ignored.
    ///
    /// ```
    /// # use raytracer::color::Color;
    /// # use raytracer::canvas::Canvas;
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, &Color::red());
    /// assert_eq!(canvas.read_pixel(4, 2), Some(Color::red()));
    /// ```
    pub fn write_pixel(&mut self, x: usize, y: usize, pixel: &Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = *pixel;
    }

    /// Reads the color at column `x`, row `y`, or `None` if out of bounds.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None
        }

        Some(self.pixels[(y * self.width) + x])
    }

    /// Sets every pixel to `fun(x, y)`, spreading rows across the rayon
    /// thread pool.
    pub fn set_each_pixel<F>(&mut self, fun: F)
    where
        F: Fn(usize, usize) -> Color + Sync,
    {
        if self.width == 0 {
            return;
        }

        self.pixels
            .par_chunks_mut(self.width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, pixel) in row.iter_mut().enumerate() {
                    *pixel = fun(x, y);
                }
            });
    }

    /// Serializes the canvas to a PPM (`P3`) string.
    ///
    /// Every row starts on a new line, no line exceeds 70 characters, and the
    /// output ends with a newline.
    pub fn to_ppm(&self) -> String {
        let mut out = format!("P3\n{} {}\n255\n", self.width, self.height);

        for row in self.pixels.chunks(self.width.max(1)) {
            let mut line = String::new();

            for value in row.iter().flat_map(|pixel| pixel.to_bytes()) {
                let value = value.to_string();

                if !line.is_empty() {
                    if line.len() + 1 + value.len() > PPM_LINE_WIDTH {
                        out.push_str(&line);
                        out.push('\n');
                        line.clear();
                    } else {
                        line.push(' ');
                    }
                }

                line.push_str(&value);
            }

            out.push_str(&line);
            out.push('\n');
        }

        out
    }

    /// Saves the canvas to a PPM file.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_ppm())?;
        Ok(())
    }
}

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new(10, 20);

    assert_eq!(c.width(), 10);
    assert_eq!(c.height(), 20);
    for y in 0..20 {
        for x in 0..10 {
            assert_eq!(c.read_pixel(x, y), Some(Color::black()));
        }
    }
}

#[test]
fn out_of_bounds_pixels_are_ignored() {
    let mut c = Canvas::new(2, 2);
    c.write_pixel(2, 0, &Color::red());

    assert_eq!(c.read_pixel(2, 0), None);
    assert_eq!(c, Canvas::new(2, 2));
}

#[test]
fn ppm_header() {
    let c = Canvas::new(5, 3);

    assert!(c.to_ppm().starts_with("P3\n5 3\n255\n"));
}

#[test]
fn ppm_pixel_data() {
    let mut c = Canvas::new(5, 3);
    c.write_pixel(0, 0, &Color::rgb(1.5, 0.0, 0.0));
    c.write_pixel(2, 1, &Color::rgb(0.0, 0.5, 0.0));
    c.write_pixel(4, 2, &Color::rgb(-0.5, 0.0, 1.0));

    let ppm = c.to_ppm();
    let lines: Vec<&str> = ppm.lines().skip(3).collect();

    assert_eq!(lines, vec![
        "255 0 0 0 0 0 0 0 0 0 0 0 0 0 0",
        "0 0 0 0 0 0 0 128 0 0 0 0 0 0 0",
        "0 0 0 0 0 0 0 0 0 0 0 0 0 0 255",
    ]);
}

#[test]
fn ppm_splits_long_lines() {
    let mut c = Canvas::new(10, 2);
    for y in 0..2 {
        for x in 0..10 {
            c.write_pixel(x, y, &Color::rgb(1.0, 0.8, 0.6));
        }
    }

    let ppm = c.to_ppm();
    let lines: Vec<&str> = ppm.lines().skip(3).collect();

    assert_eq!(lines, vec![
        "255 204 153 255 204 153 255 204 153 255 204 153 255 204 153 255 204",
        "153 255 204 153 255 204 153 255 204 153 255 204 153",
        "255 204 153 255 204 153 255 204 153 255 204 153 255 204 153 255 204",
        "153 255 204 153 255 204 153 255 204 153 255 204 153",
    ]);
    assert!(lines.iter().all(|l| l.len() <= 70));
}

#[test]
fn ppm_ends_with_newline() {
    assert!(Canvas::new(5, 3).to_ppm().ends_with('\n'));
}

#[test]
fn set_each_pixel_visits_every_pixel() {
    let mut c = Canvas::new(4, 3);
    c.set_each_pixel(|x, y| Color::rgb(x as f64, y as f64, 0.0));

    assert_eq!(c.read_pixel(3, 2), Some(Color::rgb(3.0, 2.0, 0.0)));
    assert_eq!(c.read_pixel(0, 1), Some(Color::rgb(0.0, 1.0, 0.0)));
}
