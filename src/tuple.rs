use std::ops::{ Add, Sub, Neg, Mul, Div };

use crate::feq;
use crate::error::{ RayTracerError, Result };

/// A homogeneous 4D tuple.
///
/// Points carry `w == 1.0` and vectors carry `w == 0.0`. The distinction is
/// not tracked by the type system; callers that need a guarantee can use
/// `as_point` or `as_vector`, which check `w` and fail otherwise.
///
/// Equality is approximate (see `crate::feq`).
#[derive(Debug, Default, Copy, Clone, PartialOrd)]
pub struct Tuple4D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64
}

impl PartialEq for Tuple4D {
    fn eq(&self, other: &Tuple4D) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z) &&
            feq(self.w, other.w)
    }
}

impl Tuple4D {
    pub fn tuple(x: f64, y: f64, z: f64, w: f64) -> Tuple4D {
        Tuple4D { x, y, z, w }
    }

    pub fn point(x: f64, y: f64, z: f64) -> Tuple4D {
        Tuple4D { x, y, z, w: 1.0 }
    }

    pub fn vector(x: f64, y: f64, z: f64) -> Tuple4D {
        Tuple4D { x, y, z, w: 0.0 }
    }

    pub fn is_point(&self) -> bool {
        feq(self.w, 1.0)
    }

    pub fn is_vector(&self) -> bool {
        feq(self.w, 0.0)
    }

    /// Returns this tuple if it is a point.
    ///
    /// ```
    /// # use raytracer::tuple::Tuple4D;
    /// assert!(Tuple4D::point(1.0, 2.0, 3.0).as_point().is_ok());
    /// assert!(Tuple4D::vector(1.0, 2.0, 3.0).as_point().is_err());
    /// ```
    pub fn as_point(self) -> Result<Tuple4D> {
        if self.is_point() {
            Ok(Tuple4D { w: 1.0, ..self })
        } else {
            Err(RayTracerError::TupleKind { expected: "point", w: self.w })
        }
    }

    /// Returns this tuple if it is a vector.
    pub fn as_vector(self) -> Result<Tuple4D> {
        if self.is_vector() {
            Ok(Tuple4D { w: 0.0, ..self })
        } else {
            Err(RayTracerError::TupleKind { expected: "vector", w: self.w })
        }
    }

    /// Component along axis `0` (x), `1` (y) or `2` (z).
    pub fn axis(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn magnitude(&self) -> f64 {
        f64::sqrt(
            self.x.powi(2)
            + self.y.powi(2)
            + self.z.powi(2)
            + self.w.powi(2)
        )
    }

    pub fn normalize(&self) -> Tuple4D {
        let mag = self.magnitude();

        Tuple4D {
            x: self.x / mag,
            y: self.y / mag,
            z: self.z / mag,
            w: self.w / mag,
        }
    }

    pub fn dot(&self, other: &Tuple4D) -> f64 {
        self.x * other.x
            + self.y * other.y
            + self.z * other.z
            + self.w * other.w
    }

    pub fn cross(&self, other: &Tuple4D) -> Tuple4D {
        Tuple4D {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
            w: 0.0
        }
    }

    /// Reflects a vector across a normal.
    pub fn reflect(&self, normal: &Tuple4D) -> Tuple4D {
        *self - (*normal * 2.0 * self.dot(normal))
    }
}

impl Add for Tuple4D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
            w: self.w + other.w
        }
    }
}

impl Sub for Tuple4D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
            w: self.w - other.w
        }
    }
}

impl Neg for Tuple4D {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: -self.w
        }
    }
}

/// Scalar right-multiplication.
///
/// ```
/// use raytracer::tuple::Tuple4D;
///
/// let t = Tuple4D::tuple(1.0, 2.0, 3.0, 4.0);
/// assert_eq!(t * 5.0, Tuple4D::tuple(5.0, 10.0, 15.0, 20.0));
/// ```
impl Mul<f64> for Tuple4D {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self {
            x: self.x * other,
            y: self.y * other,
            z: self.z * other,
            w: self.w * other
        }
    }
}

/// Scalar left-multiplication.
impl Mul<Tuple4D> for f64 {
    type Output = Tuple4D;

    fn mul(self, other: Tuple4D) -> Tuple4D {
        other * self
    }
}

impl Div<f64> for Tuple4D {
    type Output = Self;

    fn div(self, other: f64) -> Self {
        Self {
            x: self.x / other,
            y: self.y / other,
            z: self.z / other,
            w: self.w / other
        }
    }
}

/* Tests */

#[test]
fn point_has_w_of_one() {
    let p = Tuple4D::tuple(4.3, -4.2, 3.1, 1.0);

    assert!(p.is_point());
    assert!(!p.is_vector());
    assert_eq!(p, Tuple4D::point(4.3, -4.2, 3.1));
}

#[test]
fn vector_has_w_of_zero() {
    let v = Tuple4D::tuple(4.3, -4.2, 3.1, 0.0);

    assert!(v.is_vector());
    assert!(!v.is_point());
    assert_eq!(v, Tuple4D::vector(4.3, -4.2, 3.1));
}

#[test]
fn kind_conversions_check_w() {
    let p = Tuple4D::point(1.0, 2.0, 3.0);
    let v = Tuple4D::vector(1.0, 2.0, 3.0);

    assert_eq!(p.as_point().unwrap(), p);
    assert_eq!(v.as_vector().unwrap(), v);
    assert!(matches!(
        p.as_vector(),
        Err(RayTracerError::TupleKind { expected: "vector", .. })
    ));
    assert!(v.as_point().is_err());
    assert!(Tuple4D::tuple(1.0, 1.0, 1.0, 0.5).as_point().is_err());
}

#[test]
fn equality_tolerates_small_error() {
    let a = Tuple4D::point(1.0, 2.0, 3.0);
    let b = Tuple4D::point(1.000004, 1.999996, 3.0);
    let c = Tuple4D::point(1.0002, 2.0, 3.0);

    assert_eq!(a, b);
    assert_eq!(b, a);
    assert_ne!(a, c);
}

#[test]
fn add_tuples() {
    let a1 = Tuple4D::tuple(3.0, -2.0, 5.0, 1.0);
    let a2 = Tuple4D::tuple(-2.0, 3.0, 1.0, 0.0);

    assert_eq!(a1 + a2, Tuple4D::tuple(1.0, 1.0, 6.0, 1.0));
}

#[test]
fn sub_points() {
    let p1 = Tuple4D::point(3.0, 2.0, 1.0);
    let p2 = Tuple4D::point(5.0, 6.0, 7.0);

    assert_eq!(p1 - p2, Tuple4D::vector(-2.0, -4.0, -6.0));
}

#[test]
fn sub_vector_from_point() {
    let p = Tuple4D::point(3.0, 2.0, 1.0);
    let v = Tuple4D::vector(5.0, 6.0, 7.0);

    assert_eq!(p - v, Tuple4D::point(-2.0, -4.0, -6.0));
}

#[test]
fn neg_tuple() {
    let a = Tuple4D::tuple(1.0, -2.0, 3.0, -4.0);

    assert_eq!(-a, Tuple4D::tuple(-1.0, 2.0, -3.0, 4.0));
}

#[test]
fn mul_and_div_scalar() {
    let a = Tuple4D::tuple(1.0, -2.0, 3.0, -4.0);

    assert_eq!(a * 3.5, Tuple4D::tuple(3.5, -7.0, 10.5, -14.0));
    assert_eq!(0.5 * a, Tuple4D::tuple(0.5, -1.0, 1.5, -2.0));
    assert_eq!(a / 2.0, Tuple4D::tuple(0.5, -1.0, 1.5, -2.0));
}

#[test]
fn magnitude() {
    assert_eq!(Tuple4D::vector(1.0, 2.0, 3.0).magnitude(), f64::sqrt(14.0));
    assert_eq!(Tuple4D::vector(-1.0, -2.0, -3.0).magnitude(), f64::sqrt(14.0));
    assert_eq!(Tuple4D::vector(0.0, 1.0, 0.0).magnitude(), 1.0);
}

#[test]
fn normalize() {
    let v = Tuple4D::vector(1.0, 2.0, 3.0);
    let e = Tuple4D::vector(
        1.0 / f64::sqrt(14.0),
        2.0 / f64::sqrt(14.0),
        3.0 / f64::sqrt(14.0)
    );

    assert_eq!(Tuple4D::vector(4.0, 0.0, 0.0).normalize(),
        Tuple4D::vector(1.0, 0.0, 0.0));
    assert_eq!(v.normalize(), e);
    assert!(crate::feq(v.normalize().magnitude(), 1.0));
}

#[test]
fn dot_vectors() {
    let a = Tuple4D::vector(1.0, 2.0, 3.0);
    let b = Tuple4D::vector(2.0, 3.0, 4.0);

    assert_eq!(a.dot(&b), 20.0);
}

#[test]
fn cross_vectors() {
    let a = Tuple4D::vector(1.0, 2.0, 3.0);
    let b = Tuple4D::vector(2.0, 3.0, 4.0);

    assert_eq!(a.cross(&b), Tuple4D::vector(-1.0, 2.0, -1.0));
    assert_eq!(b.cross(&a), Tuple4D::vector(1.0, -2.0, 1.0));
}

#[test]
fn reflect_45() {
    let v = Tuple4D::vector(1.0, -1.0, 0.0);
    let n = Tuple4D::vector(0.0, 1.0, 0.0);

    assert_eq!(v.reflect(&n), Tuple4D::vector(1.0, 1.0, 0.0));
}

#[test]
fn reflect_slanted() {
    let v = Tuple4D::vector(0.0, -1.0, 0.0);
    let n = Tuple4D::vector(2.0f64.sqrt() / 2.0, 2.0f64.sqrt() / 2.0, 0.0);

    assert_eq!(v.reflect(&n), Tuple4D::vector(1.0, 0.0, 0.0));
}
