use std::ops::AddAssign;

use crate::consts::EPSILON;
use crate::tuple::Tuple4D;
use crate::matrix::Matrix4D;
use crate::ray::Ray4D;

/// An axis-aligned bounding box.
///
/// An *empty* box has `minimum` at `+∞` and `maximum` at `-∞`, so that adding
/// any point or box to it yields that point or box. Planes and infinite
/// cylinders produce boxes with infinite components.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub minimum: Tuple4D,
    pub maximum: Tuple4D,
}

impl Default for Bounds {
    fn default() -> Bounds {
        Bounds::empty()
    }
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, min_z: f64,
        max_x: f64, max_y: f64, max_z: f64) -> Bounds {
        Bounds {
            minimum: Tuple4D::point(min_x, min_y, min_z),
            maximum: Tuple4D::point(max_x, max_y, max_z),
        }
    }

    pub fn empty() -> Bounds {
        let inf = f64::INFINITY;
        Bounds::new(inf, inf, inf, -inf, -inf, -inf)
    }

    pub fn infinite() -> Bounds {
        let inf = f64::INFINITY;
        Bounds::new(-inf, -inf, -inf, inf, inf, inf)
    }

    pub fn is_empty(&self) -> bool {
        self.minimum.x > self.maximum.x
            || self.minimum.y > self.maximum.y
            || self.minimum.z > self.maximum.z
    }

    fn is_unbounded(&self) -> bool {
        [self.minimum, self.maximum].iter()
            .any(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
    }

    pub fn add_point(&mut self, p: Tuple4D) {
        self.minimum.x = self.minimum.x.min(p.x);
        self.minimum.y = self.minimum.y.min(p.y);
        self.minimum.z = self.minimum.z.min(p.z);
        self.maximum.x = self.maximum.x.max(p.x);
        self.maximum.y = self.maximum.y.max(p.y);
        self.maximum.z = self.maximum.z.max(p.z);
    }

    /// Grows this box to enclose `other`.
    pub fn union(&mut self, other: &Bounds) {
        if other.is_empty() {
            return;
        }

        self.add_point(other.minimum);
        self.add_point(other.maximum);
    }

    pub fn contains_point(&self, p: Tuple4D) -> bool {
        (self.minimum.x..=self.maximum.x).contains(&p.x)
            && (self.minimum.y..=self.maximum.y).contains(&p.y)
            && (self.minimum.z..=self.maximum.z).contains(&p.z)
    }

    /// Transforms all eight corners and encloses the results.
    ///
    /// Corners at infinity cannot be transformed meaningfully (`∞ · 0` is
    /// NaN), so a box with any infinite extent becomes `Bounds::infinite()`.
    pub fn transform(&self, m: &Matrix4D) -> Bounds {
        if self.is_empty() {
            return *self;
        }

        if self.is_unbounded() {
            return Bounds::infinite();
        }

        let (lo, hi) = (self.minimum, self.maximum);
        let mut out = Bounds::empty();
        for &x in &[lo.x, hi.x] {
            for &y in &[lo.y, hi.y] {
                for &z in &[lo.z, hi.z] {
                    out.add_point(*m * Tuple4D::point(x, y, z));
                }
            }
        }

        out
    }

    /// The midpoint of the box. Infinite extents produce an infinite or NaN
    /// coordinate, which sorts consistently with `f64::total_cmp`.
    pub fn center(&self) -> Tuple4D {
        Tuple4D::point(
            (self.minimum.x + self.maximum.x) / 2.0,
            (self.minimum.y + self.maximum.y) / 2.0,
            (self.minimum.z + self.maximum.z) / 2.0,
        )
    }

    /// The index (0 = x, 1 = y, 2 = z) of the widest extent.
    pub fn longest_axis(&self) -> usize {
        let extent = self.maximum - self.minimum;

        if extent.x >= extent.y && extent.x >= extent.z {
            0
        } else if extent.y >= extent.z {
            1
        } else {
            2
        }
    }

    /// Computes the entry and exit offsets of a ray along one axis.
    ///
    /// A near-zero direction multiplies by infinity instead of dividing, which
    /// preserves the sign of the numerator.
    pub fn check_axis(min: f64, max: f64, origin: f64, direction: f64)
        -> (f64, f64) {
        Bounds::check_axis_within(min, max, origin, direction, EPSILON)
    }

    /// Like `check_axis`, treating `|direction| <= parallel` as parallel to
    /// the slab.
    fn check_axis_within(min: f64, max: f64, origin: f64, direction: f64,
        parallel: f64) -> (f64, f64) {
        let tmin_numerator = min - origin;
        let tmax_numerator = max - origin;

        let (tmin, tmax) = if direction.abs() > parallel {
            (tmin_numerator / direction, tmax_numerator / direction)
        } else {
            (tmin_numerator * f64::INFINITY, tmax_numerator * f64::INFINITY)
        };

        if tmin > tmax {
            (tmax, tmin)
        } else {
            (tmin, tmax)
        }
    }

    /// Slab test. Returns whether the ray's line passes through the box.
    ///
    /// The test deliberately ignores the sign of `t`: callers that need every
    /// intersection along the line, including those behind the origin, rely
    /// on it.
    pub fn intersects(&self, ray: &Ray4D) -> bool {
        if self.is_empty() {
            return false;
        }

        // Only an exactly zero component is parallel to a slab.
        let (xtmin, xtmax) = Bounds::check_axis_within(
            self.minimum.x, self.maximum.x, ray.origin.x, ray.direction.x, 0.0
        );
        let (ytmin, ytmax) = Bounds::check_axis_within(
            self.minimum.y, self.maximum.y, ray.origin.y, ray.direction.y, 0.0
        );
        let (ztmin, ztmax) = Bounds::check_axis_within(
            self.minimum.z, self.maximum.z, ray.origin.z, ray.direction.z, 0.0
        );

        // `f64::max`/`min` skip NaN from `0 * ∞` on degenerate axes.
        let tmin = xtmin.max(ytmin).max(ztmin);
        let tmax = xtmax.min(ytmax).min(ztmax);

        tmin <= tmax
    }
}

impl AddAssign<&Bounds> for Bounds {
    fn add_assign(&mut self, other: &Bounds) {
        self.union(other);
    }
}

#[test]
fn empty_bounds_absorb_points() {
    let mut b = Bounds::empty();
    assert!(b.is_empty());

    b.add_point(Tuple4D::point(-5.0, 2.0, 0.0));
    b.add_point(Tuple4D::point(7.0, 0.0, -3.0));

    assert!(!b.is_empty());
    assert_eq!(b, Bounds::new(-5.0, 0.0, -3.0, 7.0, 2.0, 0.0));
}

#[test]
fn union_of_bounds() {
    let mut b1 = Bounds::new(-5.0, -2.0, 0.0, 7.0, 4.0, 4.0);
    let b2 = Bounds::new(8.0, -7.0, -2.0, 14.0, 2.0, 8.0);
    b1 += &b2;
    b1 += &Bounds::empty();

    assert_eq!(b1, Bounds::new(-5.0, -7.0, -2.0, 14.0, 4.0, 8.0));
}

#[test]
fn contains_point() {
    let b = Bounds::new(5.0, -2.0, 0.0, 11.0, 4.0, 7.0);

    assert!(b.contains_point(Tuple4D::point(5.0, -2.0, 0.0)));
    assert!(b.contains_point(Tuple4D::point(8.0, 1.0, 3.0)));
    assert!(!b.contains_point(Tuple4D::point(3.0, 0.0, 3.0)));
    assert!(!b.contains_point(Tuple4D::point(8.0, 1.0, 8.0)));
}

#[test]
fn transform_bounds() {
    let b = Bounds::new(-1.0, -1.0, -1.0, 1.0, 1.0, 1.0);
    let m = Matrix4D::rotation_x(std::f64::consts::PI / 4.0)
        * Matrix4D::rotation_y(std::f64::consts::PI / 4.0);
    let t = b.transform(&m);

    assert_eq!(t.minimum, Tuple4D::point(-1.41421, -1.70711, -1.70711));
    assert_eq!(t.maximum, Tuple4D::point(1.41421, 1.70711, 1.70711));
}

#[test]
fn transform_infinite_bounds() {
    let plane = Bounds::new(-f64::INFINITY, 0.0, -f64::INFINITY,
        f64::INFINITY, 0.0, f64::INFINITY);
    let t = plane.transform(&Matrix4D::translation(0.0, 1.0, 0.0));

    assert_eq!(t, Bounds::infinite());
    assert!(Bounds::empty().transform(&Matrix4D::scaling(2.0, 2.0, 2.0))
        .is_empty());
}

#[test]
fn center_and_longest_axis() {
    let b = Bounds::new(-1.0, -4.0, 0.0, 3.0, 4.0, 1.0);

    assert_eq!(b.center(), Tuple4D::point(1.0, 0.0, 0.5));
    assert_eq!(b.longest_axis(), 1);
}

#[test]
fn ray_intersects_cubic_bounds() {
    let b = Bounds::new(-1.0, -1.0, -1.0, 1.0, 1.0, 1.0);
    let cases = [
        ((5.0, 0.5, 0.0), (-1.0, 0.0, 0.0), true),
        ((-5.0, 0.5, 0.0), (1.0, 0.0, 0.0), true),
        ((0.5, 5.0, 0.0), (0.0, -1.0, 0.0), true),
        ((0.0, 0.5, 0.0), (0.0, 0.0, 1.0), true),
        ((-2.0, 0.0, 0.0), (2.0, 4.0, 6.0), false),
        ((0.0, -2.0, 0.0), (6.0, 2.0, 4.0), false),
        ((2.0, 0.0, 2.0), (0.0, 0.0, -1.0), false),
        ((0.0, 2.0, 2.0), (0.0, -1.0, 0.0), false),
    ];

    for ((ox, oy, oz), (dx, dy, dz), expected) in cases.iter() {
        let r = Ray4D::new(
            Tuple4D::point(*ox, *oy, *oz),
            Tuple4D::vector(*dx, *dy, *dz).normalize()
        );
        assert_eq!(b.intersects(&r), *expected);
    }
}

#[test]
fn ray_behind_bounds_still_intersects_line() {
    let b = Bounds::new(-1.0, -1.0, -1.0, 1.0, 1.0, 1.0);
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );

    assert!(b.intersects(&r));
    assert!(!Bounds::empty().intersects(&r));
}

#[test]
fn nearly_parallel_ray_crosses_box() {
    let b = Bounds::new(-1.0, -1.0, -1.0, 1.0, 1.0, 1.0);
    let r = Ray4D::new(
        Tuple4D::point(-1000.0, -1.0005, 0.0),
        Tuple4D::vector(1.0, 5e-6, 0.0).normalize()
    );

    assert!(b.intersects(&r));

    // Exactly parallel and outside the y slab.
    let r = Ray4D::new(
        Tuple4D::point(-1000.0, -1.0005, 0.0),
        Tuple4D::vector(1.0, 0.0, 0.0)
    );
    assert!(!b.intersects(&r));
}
