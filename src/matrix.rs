use std::fmt;
use std::ops::{ Index, IndexMut, Mul };

use crate::feq;
use crate::tuple::Tuple4D;
use crate::error::{ RayTracerError, Result };

/// A 2x2 matrix. Only used while expanding cofactors.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct Matrix2D {
    data: [f64; 4],
}

impl From<[f64; 4]> for Matrix2D {
    fn from(data: [f64; 4]) -> Matrix2D {
        Matrix2D { data }
    }
}

impl Index<(usize, usize)> for Matrix2D {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.data[(index.0 * 2) + index.1]
    }
}

impl Matrix2D {
    fn determinant(&self) -> f64 {
        self[(0, 0)] * self[(1, 1)] - self[(0, 1)] * self[(1, 0)]
    }
}

/// A 3x3 matrix. Only used while expanding cofactors.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct Matrix3D {
    data: [f64; 9],
}

impl From<[f64; 9]> for Matrix3D {
    fn from(data: [f64; 9]) -> Matrix3D {
        Matrix3D { data }
    }
}

impl Index<(usize, usize)> for Matrix3D {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.data[(index.0 * 3) + index.1]
    }
}

impl Matrix3D {
    /// Removes `row` and `col`, leaving a 2x2 matrix.
    fn submatrix(&self, row: usize, col: usize) -> Matrix2D {
        let mut buf = [0.0; 4];
        let mut count = 0;

        for r in (0..3).filter(|&r| r != row) {
            for c in (0..3).filter(|&c| c != col) {
                buf[count] = self[(r, c)];
                count += 1;
            }
        }

        Matrix2D { data: buf }
    }

    fn minor(&self, row: usize, col: usize) -> f64 {
        self.submatrix(row, col).determinant()
    }

    fn cofactor(&self, row: usize, col: usize) -> f64 {
        let m = self.minor(row, col);
        if (row + col) % 2 == 0 { m } else { -m }
    }

    fn determinant(&self) -> f64 {
        (0..3).map(|c| self[(0, c)] * self.cofactor(0, c)).sum()
    }
}

/// A 4x4 matrix.
///
/// Every affine transformation in the ray tracer (object transforms, pattern
/// transforms, the camera's view transform) is a `Matrix4D`. Points and
/// vectors are multiplied on the right.
///
/// Equality is approximate, per cell.
///
/// # Examples
///
/// Calculating a view transformation for a camera:
///
/// ```
/// # use raytracer::tuple::Tuple4D;
/// # use raytracer::matrix::Matrix4D;
/// let from = Tuple4D::point(0.0, 0.0, 8.0);
/// let to = Tuple4D::point(0.0, 0.0, 0.0);
/// let up = Tuple4D::vector(0.0, 1.0, 0.0);
/// let view = Matrix4D::view_transform(from, to, up);
/// assert_eq!(view, Matrix4D::translation(0.0, 0.0, -8.0));
/// ```
#[derive(Copy, Clone, Debug)]
pub struct Matrix4D {
    data: [f64; 16],
}

impl PartialEq for Matrix4D {
    fn eq(&self, other: &Matrix4D) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(x, y)| feq(*x, *y))
    }
}

impl Default for Matrix4D {
    fn default() -> Matrix4D {
        Matrix4D::identity()
    }
}

impl Matrix4D {
    /// A matrix with every element set to `0.0`.
    pub fn zero() -> Matrix4D {
        Matrix4D { data: [0.0; 16] }
    }

    pub fn identity() -> Matrix4D {
        let mut buf = [0.0; 16];
        buf[0] = 1.0; buf[5] = 1.0; buf[10] = 1.0; buf[15] = 1.0;

        Matrix4D { data: buf }
    }

    /// Offsets a point by `x`, `y` and `z`. Vectors are unaffected.
    pub fn translation(x: f64, y: f64, z: f64) -> Matrix4D {
        let mut trans = Self::identity();
        trans[(0, 3)] = x;
        trans[(1, 3)] = y;
        trans[(2, 3)] = z;

        trans
    }

    pub fn scaling(x: f64, y: f64, z: f64) -> Matrix4D {
        let mut scale = Self::identity();
        scale[(0, 0)] = x;
        scale[(1, 1)] = y;
        scale[(2, 2)] = z;

        scale
    }

    /// Rotation about the X axis by `r` radians.
    ///
    /// ```
    /// # use raytracer::tuple::Tuple4D;
    /// # use raytracer::matrix::Matrix4D;
    /// let point = Tuple4D::point(0.0, 1.0, 0.0);
    /// let m = Matrix4D::rotation_x(std::f64::consts::PI / 2.0);
    /// assert_eq!(m * point, Tuple4D::point(0.0, 0.0, 1.0));
    /// ```
    pub fn rotation_x(r: f64) -> Matrix4D {
        let mut rotate = Self::identity();
        rotate[(1, 1)] =  r.cos();
        rotate[(1, 2)] = -r.sin();
        rotate[(2, 1)] =  r.sin();
        rotate[(2, 2)] =  r.cos();

        rotate
    }

    /// Rotation about the Y axis by `r` radians.
    pub fn rotation_y(r: f64) -> Matrix4D {
        let mut rotate = Self::identity();
        rotate[(0, 0)] =  r.cos();
        rotate[(0, 2)] =  r.sin();
        rotate[(2, 0)] = -r.sin();
        rotate[(2, 2)] =  r.cos();

        rotate
    }

    /// Rotation about the Z axis by `r` radians.
    pub fn rotation_z(r: f64) -> Matrix4D {
        let mut rotate = Self::identity();
        rotate[(0, 0)] =  r.cos();
        rotate[(0, 1)] = -r.sin();
        rotate[(1, 0)] =  r.sin();
        rotate[(1, 1)] =  r.cos();

        rotate
    }

    /// Shears each axis in proportion to the other two.
    ///
    /// Parameter `xy` moves `x` in proportion to `y`, `xz` moves `x` in
    /// proportion to `z`, and so on.
    ///
    /// ```
    /// # use raytracer::tuple::Tuple4D;
    /// # use raytracer::matrix::Matrix4D;
    /// let point = Tuple4D::point(2.0, 3.0, 4.0);
    /// let m = Matrix4D::shearing(1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    /// assert_eq!(m * point, Tuple4D::point(5.0, 3.0, 4.0));
    /// ```
    pub fn shearing(xy: f64, xz: f64, yx: f64, yz: f64, zx: f64, zy: f64)
        -> Matrix4D {
        let mut shear = Self::identity();
        shear[(0, 1)] = xy;
        shear[(0, 2)] = xz;
        shear[(1, 0)] = yx;
        shear[(1, 2)] = yz;
        shear[(2, 0)] = zx;
        shear[(2, 1)] = zy;

        shear
    }

    /// Orients the world relative to an eye at `from` looking at `to`.
    ///
    /// The view transform moves the *world*, not the eye. `up` only needs to
    /// point roughly upwards; the true up vector is recomputed.
    pub fn view_transform(from: Tuple4D, to: Tuple4D, up: Tuple4D) -> Matrix4D {
        let forward = (to - from).normalize();
        let left = forward.cross(&up.normalize());
        let true_up = left.cross(&forward);

        let orientation: Matrix4D = [
             left.x,     left.y,     left.z,    0.0,
             true_up.x,  true_up.y,  true_up.z, 0.0,
            -forward.x, -forward.y, -forward.z, 0.0,
             0.0,        0.0,        0.0,       1.0,
        ].into();

        orientation * Matrix4D::translation(-from.x, -from.y, -from.z)
    }

    /// Returns the transpose of this matrix.
    pub fn transposition(&self) -> Matrix4D {
        let mut buf = *self;

        for r in 0..4 {
            for c in (r+1)..4 {
                buf[(r, c)] = self[(c, r)];
                buf[(c, r)] = self[(r, c)];
            }
        }

        buf
    }

    /// Removes `row` and `col`, leaving a 3x3 matrix.
    fn submatrix(&self, row: usize, col: usize) -> Matrix3D {
        let mut buf = [0.0; 9];
        let mut count = 0;

        for r in (0..4).filter(|&r| r != row) {
            for c in (0..4).filter(|&c| c != col) {
                buf[count] = self[(r, c)];
                count += 1;
            }
        }

        Matrix3D { data: buf }
    }

    /// The determinant of the submatrix at `row` and `col`.
    pub fn minor(&self, row: usize, col: usize) -> f64 {
        self.submatrix(row, col).determinant()
    }

    /// The minor at `row` and `col`, negated when `row + col` is odd.
    pub fn cofactor(&self, row: usize, col: usize) -> f64 {
        let m = self.minor(row, col);
        if (row + col) % 2 == 0 { m } else { -m }
    }

    /// Laplace expansion along the first row.
    pub fn determinant(&self) -> f64 {
        (0..4).map(|c| self[(0, c)] * self.cofactor(0, c)).sum()
    }

    /// Exact test: a determinant of `0.0`, or one that is not finite, has
    /// no usable inverse.
    pub fn is_invertible(&self) -> bool {
        let det = self.determinant();
        det != 0.0 && det.is_finite()
    }

    /// Calculates the inverse of a `Matrix4D`, if it exists.
    ///
    /// Each element is `cofactor(r, c) / det`, stored transposed at `(c, r)`.
    pub fn inverse(&self) -> Option<Matrix4D> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }

        let mut inv = Matrix4D::zero();
        for r in 0..4 {
            for c in 0..4 {
                inv[(c, r)] = self.cofactor(r, c) / det;
            }
        }

        Some(inv)
    }

    /// Like `inverse`, but reports a singular matrix as an error.
    pub fn try_inverse(&self) -> Result<Matrix4D> {
        self.inverse().ok_or(RayTracerError::NonInvertibleMatrix)
    }
}

impl From<[f64; 16]> for Matrix4D {
    fn from(data: [f64; 16]) -> Matrix4D {
        Matrix4D { data }
    }
}

impl Index<(usize, usize)> for Matrix4D {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.data[(index.0 * 4) + index.1]
    }
}

impl IndexMut<(usize, usize)> for Matrix4D {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut f64 {
        &mut self.data[(index.0 * 4) + index.1]
    }
}

/// Matrix product. Not commutative in general.
///
/// ```
/// # use raytracer::matrix::Matrix4D;
/// let m1 = Matrix4D::scaling(2.0, 3.0, 4.0);
/// let m2 = Matrix4D::scaling(4.0, 3.0, 2.0);
/// assert_eq!(m1 * m2, Matrix4D::scaling(8.0, 9.0, 8.0));
/// ```
impl Mul<Matrix4D> for Matrix4D {
    type Output = Matrix4D;

    fn mul(self, other: Matrix4D) -> Matrix4D {
        let mut res = Matrix4D::zero();

        for r in 0..4 {
            for c in 0..4 {
                res[(r, c)] = (0..4).map(|k| self[(r, k)] * other[(k, c)]).sum();
            }
        }

        res
    }
}

impl Mul<Tuple4D> for Matrix4D {
    type Output = Tuple4D;

    fn mul(self, other: Tuple4D) -> Tuple4D {
        let row = |r: usize| {
            self[(r, 0)] * other.x
                + self[(r, 1)] * other.y
                + self[(r, 2)] * other.z
                + self[(r, 3)] * other.w
        };

        Tuple4D { x: row(0), y: row(1), z: row(2), w: row(3) }
    }
}

impl fmt::Display for Matrix4D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..4 {
            write!(f, "|")?;
            for c in 0..4 {
                write!(f, " {} |", self[(r, c)])?;
            }

            if r != 3 {
                writeln!(f)?;
            }
        }

        Ok(())
    }
}

#[test]
fn identity() {
    let i = Matrix4D::identity();
    let a: Matrix4D = [ 0.0, 1.0,  2.0,  4.0,
                        1.0, 2.0,  4.0,  8.0,
                        2.0, 4.0,  8.0, 16.0,
                        4.0, 8.0, 16.0, 32.0, ].into();

    assert_eq!(i * a, a);
    assert_eq!(a * i, a);
    assert_eq!(Matrix4D::default(), i);
}

#[test]
fn multiply_matrices() {
    let a: Matrix4D = [ 1.0, 2.0, 3.0, 4.0,
                        5.0, 6.0, 7.0, 8.0,
                        9.0, 8.0, 7.0, 6.0,
                        5.0, 4.0, 3.0, 2.0, ].into();
    let b: Matrix4D = [ -2.0, 1.0, 2.0,  3.0,
                         3.0, 2.0, 1.0, -1.0,
                         4.0, 3.0, 6.0,  5.0,
                         1.0, 2.0, 7.0,  8.0, ].into();
    let p: Matrix4D = [ 20.0, 22.0,  50.0,  48.0,
                        44.0, 54.0, 114.0, 108.0,
                        40.0, 58.0, 110.0, 102.0,
                        16.0, 26.0,  46.0,  42.0, ].into();

    assert_eq!(a * b, p);
}

#[test]
fn multiply_matrix_by_tuple() {
    let a: Matrix4D = [ 1.0, 2.0, 3.0, 4.0,
                        2.0, 4.0, 4.0, 2.0,
                        8.0, 6.0, 4.0, 1.0,
                        0.0, 0.0, 0.0, 1.0, ].into();
    let b = Tuple4D::tuple(1.0, 2.0, 3.0, 1.0);

    assert_eq!(a * b, Tuple4D::tuple(18.0, 24.0, 33.0, 1.0));
}

#[test]
fn transpose() {
    let a: Matrix4D = [ 0.0, 9.0, 3.0, 0.0,
                        9.0, 8.0, 0.0, 8.0,
                        1.0, 8.0, 5.0, 3.0,
                        0.0, 0.0, 5.0, 8.0, ].into();

    let t: Matrix4D = [ 0.0, 9.0, 1.0, 0.0,
                        9.0, 8.0, 8.0, 0.0,
                        3.0, 0.0, 5.0, 5.0,
                        0.0, 8.0, 3.0, 8.0, ].into();

    assert_eq!(t, a.transposition());
    assert_eq!(t.transposition(), a);
    assert_eq!(Matrix4D::identity().transposition(), Matrix4D::identity());
}

#[test]
fn mat2_determinant() {
    let a: Matrix2D = [ 1.0, 5.0, -3.0, 2.0 ].into();

    assert_eq!(a.determinant(), 17.0);
}

#[test]
fn mat3_submatrix() {
    let a: Matrix3D = [  1.0, 5.0,  0.0,
                        -3.0, 2.0,  7.0,
                         0.0, 6.0, -3.0, ].into();

    let s: Matrix2D = [ -3.0, 2.0,
                         0.0, 6.0  ].into();

    assert_eq!(a.submatrix(0, 2), s);
}

#[test]
fn mat4_submatrix() {
    let a: Matrix4D = [ -6.0, 1.0,  1.0, 6.0,
                        -8.0, 5.0,  8.0, 6.0,
                        -1.0, 0.0,  8.0, 2.0,
                        -7.0, 1.0, -1.0, 1.0, ].into();

    let s: Matrix3D = [ -6.0,  1.0, 6.0,
                        -8.0,  8.0, 6.0,
                        -7.0, -1.0, 1.0, ].into();

    assert_eq!(a.submatrix(2, 1), s);
}

#[test]
fn mat3_minor_and_cofactor() {
    let a: Matrix3D = [ 3.0,  5.0,  0.0,
                        2.0, -1.0, -7.0,
                        6.0, -1.0,  5.0, ].into();

    assert_eq!(a.minor(0, 0), -12.0);
    assert_eq!(a.cofactor(0, 0), -12.0);
    assert_eq!(a.minor(1, 0), 25.0);
    assert_eq!(a.cofactor(1, 0), -25.0);
}

#[test]
fn mat3_determinant() {
    let a: Matrix3D = [  1.0, 2.0,  6.0,
                        -5.0, 8.0, -4.0,
                         2.0, 6.0,  4.0, ].into();

    assert_eq!(a.cofactor(0, 0), 56.0);
    assert_eq!(a.cofactor(0, 1), 12.0);
    assert_eq!(a.cofactor(0, 2), -46.0);
    assert_eq!(a.determinant(), -196.0);
}

#[test]
fn mat4_determinant() {
    let a: Matrix4D = [ -2.0, -8.0,  3.0,  5.0,
                        -3.0,  1.0,  7.0,  3.0,
                         1.0,  2.0, -9.0,  6.0,
                        -6.0,  7.0,  7.0, -9.0, ].into();

    assert_eq!(a.cofactor(0, 0), 690.0);
    assert_eq!(a.cofactor(0, 1), 447.0);
    assert_eq!(a.cofactor(0, 2), 210.0);
    assert_eq!(a.cofactor(0, 3), 51.0);
    assert_eq!(a.determinant(), -4071.0);
}

#[test]
fn invertibility() {
    let a: Matrix4D = [ 6.0,  4.0, 4.0,  4.0,
                        5.0,  5.0, 7.0,  6.0,
                        4.0, -9.0, 3.0, -7.0,
                        9.0,  1.0, 7.0, -6.0, ].into();
    let b: Matrix4D = [ -4.0,  2.0, -2.0, -3.0,
                         9.0,  6.0,  2.0,  6.0,
                         0.0, -5.0,  1.0, -5.0,
                         0.0,  0.0,  0.0,  0.0, ].into();

    assert!(a.is_invertible());
    assert!(!b.is_invertible());
    assert!(b.inverse().is_none());
    assert!(matches!(b.try_inverse(), Err(RayTracerError::NonInvertibleMatrix)));
    assert!(!Matrix4D::scaling(0.0, 1.0, 1.0).is_invertible());
}

#[test]
fn mat4_inverse() {
    let a: Matrix4D = [  8.0, -5.0,  9.0,  2.0,
                         7.0,  5.0,  6.0,  1.0,
                        -6.0,  0.0,  9.0,  6.0,
                        -3.0,  0.0, -9.0, -4.0, ].into();

    let i: Matrix4D = [ -0.15385, -0.15385, -0.28205, -0.53846,
                        -0.07692,  0.12308,  0.02564,  0.03077,
                         0.35897,  0.35897,  0.43590,  0.92308,
                        -0.69231, -0.69231, -0.76923, -1.92308, ].into();

    assert_eq!(a.inverse().unwrap(), i);
}

#[test]
fn mat4_inverse_round_trips() {
    let a: Matrix4D = [  3.0, -9.0,  7.0,  3.0,
                         3.0,  8.0,  2.0, -9.0,
                        -4.0,  4.0,  4.0,  1.0,
                        -6.0,  5.0, -1.0,  1.0, ].into();

    let b: Matrix4D = [ 8.0,  2.0, 2.0, 2.0,
                        3.0, -1.0, 7.0, 0.0,
                        7.0,  0.0, 5.0, 4.0,
                        6.0, -2.0, 0.0, 5.0  ].into();

    let c = a * b;
    let inv = a.inverse().unwrap();

    assert_eq!(a, c * b.inverse().unwrap());
    assert_eq!(a * inv, Matrix4D::identity());
    assert_eq!(inv.inverse().unwrap(), a);
}

#[test]
fn mat4_translation() {
    let transform = Matrix4D::translation(5.0, -3.0, 2.0);
    let point = Tuple4D::point(-3.0, 4.0, 5.0);
    let vector = Tuple4D::vector(-3.0, 4.0, 5.0);

    assert_eq!(transform * point, Tuple4D::point(2.0, 1.0, 7.0));
    assert_eq!(transform.inverse().unwrap() * point,
        Tuple4D::point(-8.0, 7.0, 3.0));
    assert_eq!(transform * vector, vector);
}

#[test]
fn mat4_scaling() {
    let transform = Matrix4D::scaling(2.0, 3.0, 4.0);
    let vector = Tuple4D::vector(-4.0, 6.0, 8.0);

    assert_eq!(transform * vector, Tuple4D::vector(-8.0, 18.0, 32.0));
    assert_eq!(transform.inverse().unwrap() * vector,
        Tuple4D::vector(-2.0, 2.0, 2.0));
    assert_eq!(Matrix4D::scaling(-1.0, 1.0, 1.0) * Tuple4D::point(2.0, 3.0, 4.0),
        Tuple4D::point(-2.0, 3.0, 4.0));
}

#[test]
fn mat4_rotations() {
    use std::f64::consts::PI;

    let h = 2.0f64.sqrt() / 2.0;

    assert_eq!(Matrix4D::rotation_x(PI / 4.0) * Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::point(0.0, h, h));
    assert_eq!(Matrix4D::rotation_x(PI / 4.0).inverse().unwrap()
        * Tuple4D::point(0.0, 1.0, 0.0), Tuple4D::point(0.0, h, -h));
    assert_eq!(Matrix4D::rotation_y(PI / 2.0) * Tuple4D::point(0.0, 0.0, 1.0),
        Tuple4D::point(1.0, 0.0, 0.0));
    assert_eq!(Matrix4D::rotation_y(PI / 4.0) * Tuple4D::point(0.0, 0.0, 1.0),
        Tuple4D::point(h, 0.0, h));
    assert_eq!(Matrix4D::rotation_z(PI / 2.0) * Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::point(-1.0, 0.0, 0.0));
    assert_eq!(Matrix4D::rotation_z(PI / 4.0) * Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::point(-h, h, 0.0));
}

#[test]
fn mat4_shearing() {
    let point = Tuple4D::point(2.0, 3.0, 4.0);

    assert_eq!(Matrix4D::shearing(0.0, 1.0, 0.0, 0.0, 0.0, 0.0) * point,
        Tuple4D::point(6.0, 3.0, 4.0));
    assert_eq!(Matrix4D::shearing(0.0, 0.0, 1.0, 0.0, 0.0, 0.0) * point,
        Tuple4D::point(2.0, 5.0, 4.0));
    assert_eq!(Matrix4D::shearing(0.0, 0.0, 0.0, 1.0, 0.0, 0.0) * point,
        Tuple4D::point(2.0, 7.0, 4.0));
    assert_eq!(Matrix4D::shearing(0.0, 0.0, 0.0, 0.0, 1.0, 0.0) * point,
        Tuple4D::point(2.0, 3.0, 6.0));
    assert_eq!(Matrix4D::shearing(0.0, 0.0, 0.0, 0.0, 0.0, 1.0) * point,
        Tuple4D::point(2.0, 3.0, 7.0));
}

#[test]
fn chained_transforms() {
    let a = Matrix4D::rotation_x(std::f64::consts::PI / 2.0);
    let b = Matrix4D::scaling(5.0, 5.0, 5.0);
    let c = Matrix4D::translation(10.0, 5.0, 7.0);
    let p = Tuple4D::point(1.0, 0.0, 1.0);

    assert_eq!(c * b * a * p, Tuple4D::point(15.0, 0.0, 7.0));
}

#[test]
fn default_view() {
    let from = Tuple4D::point(0.0, 0.0, 0.0);
    let to = Tuple4D::point(0.0, 0.0, -1.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    assert_eq!(Matrix4D::identity(), Matrix4D::view_transform(from, to, up));
}

#[test]
fn positive_z_view() {
    let from = Tuple4D::point(0.0, 0.0, 0.0);
    let to = Tuple4D::point(0.0, 0.0, 1.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    assert_eq!(Matrix4D::view_transform(from, to, up),
        Matrix4D::scaling(-1.0, 1.0, -1.0));
}

#[test]
fn arbitrary_view() {
    let from = Tuple4D::point(1.0, 3.0, 2.0);
    let to = Tuple4D::point(4.0, -2.0, 8.0);
    let up = Tuple4D::vector(1.0, 1.0, 0.0);

    let a: Matrix4D = [ -0.50709, 0.50709,  0.67612, -2.36643,
                         0.76772, 0.60609,  0.12122, -2.82843,
                        -0.35857, 0.59761, -0.71714,  0.00000,
                         0.00000, 0.00000,  0.00000,  1.00000, ].into();

    assert_eq!(Matrix4D::view_transform(from, to, up), a);
}

#[test]
fn infinite_scaling_has_no_inverse() {
    let m = Matrix4D::scaling(f64::INFINITY, f64::INFINITY, f64::INFINITY);

    assert!(!m.is_invertible());
    assert!(matches!(m.try_inverse(), Err(RayTracerError::NonInvertibleMatrix)));
}
