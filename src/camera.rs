use std::time::Instant;

use crate::ray::Ray4D;
use crate::tuple::Tuple4D;
use crate::matrix::Matrix4D;
use crate::world::World;
use crate::canvas::Canvas;
use crate::consts::MAX_RECURSION_DEPTH;
use crate::error::{ RayTracerError, Result };

/// A pinhole camera looking down -z in its own space.
///
/// The camera gives a "frame" of the world: `transform` orients the world
/// relative to the eye (typically a view transformation), and the canvas is
/// one unit in front of it. Different parameters produce different
/// perspectives.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// The horizontal size of the resultant canvas.
    pub hsize: usize,

    /// The vertical size of the resultant canvas.
    pub vsize: usize,

    /// The angle describing "how much" the camera can see.
    pub field_of_view: f64,

    half_width: f64,
    half_height: f64,
    pixel_size: f64,

    transform: Matrix4D,
    inverse: Matrix4D,
}

impl Camera {
    /// Creates a camera with the identity transform.
    pub fn new(hsize: usize, vsize: usize, field_of_view: f64) -> Camera {
        let half_view = (field_of_view / 2.0).tan();
        let aspect = (hsize as f64) / (vsize as f64);

        let (half_width, half_height) = if aspect >= 1.0 {
            (half_view, half_view / aspect)
        } else {
            (half_view * aspect, half_view)
        };

        Camera {
            hsize,
            vsize,
            field_of_view,
            half_width,
            half_height,
            pixel_size: half_width * 2.0 / (hsize as f64),
            transform: Matrix4D::identity(),
            inverse: Matrix4D::identity(),
        }
    }

    pub fn half_width(&self) -> f64 {
        self.half_width
    }

    pub fn half_height(&self) -> f64 {
        self.half_height
    }

    /// The size of one pixel on the canvas, one unit in front of the eye.
    pub fn pixel_size(&self) -> f64 {
        self.pixel_size
    }

    pub fn transform(&self) -> &Matrix4D {
        &self.transform
    }

    /// Replaces the view transform. Fails if it cannot be inverted.
    pub fn set_transform(&mut self, transform: Matrix4D) -> Result<()> {
        self.inverse = transform.try_inverse()?;
        self.transform = transform;
        Ok(())
    }

    pub fn with_transform(mut self, transform: Matrix4D) -> Result<Camera> {
        self.set_transform(transform)?;
        Ok(self)
    }

    /// The ray from the eye through the center of pixel (`px`, `py`).
    pub fn ray_for_pixel(&self, px: usize, py: usize) -> Result<Ray4D> {
        if px >= self.hsize || py >= self.vsize {
            return Err(RayTracerError::PixelOutOfBounds {
                x: px,
                y: py,
                hsize: self.hsize,
                vsize: self.vsize,
            });
        }

        Ok(self.ray_through(px, py))
    }

    fn ray_through(&self, px: usize, py: usize) -> Ray4D {
        // Offsets from the edge of the canvas to the pixel's center
        let xoffset = (px as f64 + 0.5) * self.pixel_size;
        let yoffset = (py as f64 + 0.5) * self.pixel_size;

        // The camera looks toward -z, so +x is to the *left*
        let world_x = self.half_width - xoffset;
        let world_y = self.half_height - yoffset;

        let pixel = self.inverse * Tuple4D::point(world_x, world_y, -1.0);
        let origin = self.inverse * Tuple4D::point(0.0, 0.0, 0.0);

        Ray4D::new(origin, (pixel - origin).normalize())
    }

    /// Renders `world` with the default recursion depth.
    pub fn render(&self, world: &World) -> Canvas {
        self.render_with_depth(world, MAX_RECURSION_DEPTH)
    }

    pub fn render_with_depth(&self, world: &World, depth: usize) -> Canvas {
        self.render_with_progress(world, depth, || {})
    }

    /// Renders `world`, calling `progress` once for every finished pixel.
    ///
    /// Rows are shaded in parallel; `progress` may be called from any worker
    /// thread and has no effect on the image.
    pub fn render_with_progress<P>(&self, world: &World, depth: usize, progress: P)
        -> Canvas
    where
        P: Fn() + Sync,
    {
        log::info!(
            "rendering {}x{} pixels, {} shapes, recursion depth {}",
            self.hsize, self.vsize, world.shapes.len(), depth
        );
        let now = Instant::now();

        let mut image = Canvas::new(self.hsize, self.vsize);
        image.set_each_pixel(|x, y| {
            let color = world.color_at(&self.ray_through(x, y), depth);
            progress();
            color
        });

        log::info!("render time: {:?}", now.elapsed());
        image
    }
}

#[test]
fn pixel_size_horizontal_canvas() {
    let c = Camera::new(200, 125, std::f64::consts::PI / 2.0);

    assert!(crate::feq(c.pixel_size(), 0.01));
}

#[test]
fn pixel_size_vertical_canvas() {
    let c = Camera::new(125, 200, std::f64::consts::PI / 2.0);

    assert!(crate::feq(c.pixel_size(), 0.01));
}

#[test]
fn ray_through_center() {
    let c = Camera::new(201, 101, std::f64::consts::PI / 2.0);
    let r = c.ray_for_pixel(100, 50).unwrap();

    assert_eq!(r.origin, Tuple4D::point(0.0, 0.0, 0.0));
    assert_eq!(r.direction, Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
fn ray_through_corner() {
    let c = Camera::new(201, 101, std::f64::consts::PI / 2.0);
    let r = c.ray_for_pixel(0, 0).unwrap();

    assert_eq!(r.origin, Tuple4D::point(0.0, 0.0, 0.0));
    assert_eq!(r.direction, Tuple4D::vector(0.66519, 0.33259, -0.66851));
}

#[test]
fn ray_when_camera_transformed() {
    let c = Camera::new(201, 101, std::f64::consts::PI / 2.0)
        .with_transform(
            Matrix4D::rotation_y(std::f64::consts::PI / 4.0)
                * Matrix4D::translation(0.0, -2.0, 5.0)
        ).unwrap();
    let r = c.ray_for_pixel(100, 50).unwrap();

    assert_eq!(r.origin, Tuple4D::point(0.0, 2.0, -5.0));
    assert_eq!(r.direction,
        Tuple4D::vector(2.0f64.sqrt() / 2.0, 0.0, -(2.0f64.sqrt() / 2.0)));
}

#[test]
fn ray_outside_canvas_fails() {
    let c = Camera::new(11, 11, std::f64::consts::PI / 2.0);

    assert!(matches!(
        c.ray_for_pixel(11, 0),
        Err(RayTracerError::PixelOutOfBounds { x: 11, y: 0, hsize: 11, vsize: 11 })
    ));
    assert!(c.ray_for_pixel(10, 10).is_ok());
}

#[test]
fn singular_camera_transform_is_rejected() {
    let mut c = Camera::new(11, 11, std::f64::consts::PI / 2.0);

    assert!(c.set_transform(Matrix4D::scaling(0.0, 1.0, 1.0)).is_err());
    assert_eq!(c.transform(), &Matrix4D::identity());
}

#[test]
fn render_world_with_camera() {
    use crate::color::Color;

    let w = World::default();
    let from = Tuple4D::point(0.0, 0.0, -5.0);
    let to = Tuple4D::point(0.0, 0.0, 0.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    let c = Camera::new(11, 11, std::f64::consts::PI / 2.0)
        .with_transform(Matrix4D::view_transform(from, to, up))
        .unwrap();

    let image = c.render(&w);
    assert_eq!(image.read_pixel(5, 5).unwrap(),
        Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn progress_is_reported_once_per_pixel() {
    use std::sync::atomic::{ AtomicUsize, Ordering };

    let w = World::default();
    let c = Camera::new(7, 5, std::f64::consts::PI / 2.0)
        .with_transform(Matrix4D::translation(0.0, 0.0, -5.0))
        .unwrap();

    let ticks = AtomicUsize::new(0);
    let with_progress = c.render_with_progress(&w, 5, || {
        ticks.fetch_add(1, Ordering::Relaxed);
    });

    assert_eq!(ticks.load(Ordering::Relaxed), 35);
    assert_eq!(with_progress, c.render_with_depth(&w, 5));
}
