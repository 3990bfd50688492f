use std::sync::OnceLock;

use rand::{ SeedableRng, rngs::StdRng, seq::SliceRandom };

use crate::tuple::Tuple4D;
use crate::color::Color;
use crate::matrix::Matrix4D;
use crate::arena::ShapeArena;
use crate::shape::ShapeId;
use crate::error::Result;

/// Seed for the noise permutation table. Fixed so renders are reproducible.
const NOISE_SEED: u64 = 0x5eed_0f_9e71;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PatternKind {
    /// Alternates `a` and `b` every unit along X.
    Stripe,

    /// Blends linearly from `a` to `b` across each unit of X.
    Gradient,

    /// Concentric rings in the XZ plane.
    Ring,

    /// 3D checkers, alternating every unit along every axis.
    Checkers,

    /// Perlin noise, blending `a` towards `b`.
    Noise,

    /// Returns the pattern-space point itself as a color.
    #[cfg(test)]
    Test,
}

/// A color-generating function of a point in pattern space.
///
/// A pattern carries two colors and its own transform. Points reach pattern
/// space by first going from world to object space (through any parent
/// groups), then through the inverse of the pattern transform.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pattern {
    pub kind: PatternKind,
    pub a: Color,
    pub b: Color,

    transform: Matrix4D,
    inverse: Matrix4D,
}

impl Pattern {
    pub fn new(kind: PatternKind, a: Color, b: Color) -> Pattern {
        Pattern {
            kind, a, b,
            transform: Matrix4D::identity(),
            inverse: Matrix4D::identity(),
        }
    }

    pub fn stripe(a: Color, b: Color) -> Pattern {
        Pattern::new(PatternKind::Stripe, a, b)
    }

    pub fn gradient(a: Color, b: Color) -> Pattern {
        Pattern::new(PatternKind::Gradient, a, b)
    }

    pub fn ring(a: Color, b: Color) -> Pattern {
        Pattern::new(PatternKind::Ring, a, b)
    }

    pub fn checkers(a: Color, b: Color) -> Pattern {
        Pattern::new(PatternKind::Checkers, a, b)
    }

    pub fn noise(a: Color, b: Color) -> Pattern {
        Pattern::new(PatternKind::Noise, a, b)
    }

    #[cfg(test)]
    pub fn test() -> Pattern {
        Pattern::new(PatternKind::Test, Color::white(), Color::black())
    }

    pub fn transform(&self) -> &Matrix4D {
        &self.transform
    }

    /// Sets the pattern transform, rejecting singular matrices.
    pub fn set_transform(&mut self, transform: Matrix4D) -> Result<()> {
        self.inverse = transform.try_inverse()?;
        self.transform = transform;
        Ok(())
    }

    pub fn with_transform(mut self, transform: Matrix4D) -> Result<Pattern> {
        self.set_transform(transform)?;
        Ok(self)
    }

    /// Evaluates the pattern at a point already in pattern space.
    pub fn pattern_at(&self, p: Tuple4D) -> Color {
        match self.kind {
            PatternKind::Stripe => self.pick(p.x.floor()),
            PatternKind::Gradient => self.a.lerp(&self.b, p.x - p.x.floor()),
            PatternKind::Ring => self.pick((p.x.powi(2) + p.z.powi(2)).sqrt().floor()),
            PatternKind::Checkers
                => self.pick(p.x.floor() + p.y.floor() + p.z.floor()),
            PatternKind::Noise => self.a.lerp(&self.b, perlin(p)),

            #[cfg(test)]
            PatternKind::Test => Color::rgb(p.x, p.y, p.z),
        }
    }

    /// Evaluates the pattern at a world-space point on shape `object`.
    pub fn pattern_at_shape(&self, shapes: &ShapeArena, object: ShapeId,
        world_point: Tuple4D) -> Color {
        let object_point = shapes.world_to_object(object, world_point);
        let pattern_point = self.inverse * object_point;

        self.pattern_at(pattern_point)
    }

    /// `a` on even cells, `b` on odd ones.
    fn pick(&self, cell: f64) -> Color {
        if cell.rem_euclid(2.0) == 0.0 {
            self.a
        } else {
            self.b
        }
    }
}

/// Improved Perlin noise, roughly in `[-1, 1]`.
fn perlin(p: Tuple4D) -> f64 {
    let perm = permutation();

    let cell = |v: f64| (v.floor() as i64 & 255) as usize;
    let (xi, yi, zi) = (cell(p.x), cell(p.y), cell(p.z));

    let x = p.x - p.x.floor();
    let y = p.y - p.y.floor();
    let z = p.z - p.z.floor();

    let u = fade(x);
    let v = fade(y);
    let w = fade(z);

    let a = perm[xi] as usize + yi;
    let aa = perm[a] as usize + zi;
    let ab = perm[a + 1] as usize + zi;
    let b = perm[xi + 1] as usize + yi;
    let ba = perm[b] as usize + zi;
    let bb = perm[b + 1] as usize + zi;

    lerp(w,
        lerp(v,
            lerp(u, grad(perm[aa], x, y, z), grad(perm[ba], x - 1.0, y, z)),
            lerp(u, grad(perm[ab], x, y - 1.0, z),
                grad(perm[bb], x - 1.0, y - 1.0, z))),
        lerp(v,
            lerp(u, grad(perm[aa + 1], x, y, z - 1.0),
                grad(perm[ba + 1], x - 1.0, y, z - 1.0)),
            lerp(u, grad(perm[ab + 1], x, y - 1.0, z - 1.0),
                grad(perm[bb + 1], x - 1.0, y - 1.0, z - 1.0))))
}

/// A shuffled `0..256` table, repeated twice to avoid index wrapping.
fn permutation() -> &'static [u8; 512] {
    static TABLE: OnceLock<[u8; 512]> = OnceLock::new();

    TABLE.get_or_init(|| {
        let mut base: Vec<u8> = (0..=255).collect();
        base.shuffle(&mut StdRng::seed_from_u64(NOISE_SEED));

        let mut table = [0; 512];
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = base[i % 256];
        }

        table
    })
}

fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

fn grad(hash: u8, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = match h {
        0..=3 => y,
        12 | 14 => x,
        _ => z,
    };

    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

#[test]
fn stripe_pattern_is_constant_along_y_and_z() {
    let pattern = Pattern::stripe(Color::white(), Color::black());

    for &(y, z) in &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 1.0), (0.0, 2.0)] {
        assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, y, z)), Color::white());
    }
}

#[test]
fn stripe_pattern_alternates_along_x() {
    let pattern = Pattern::stripe(Color::white(), Color::black());
    let at = |x: f64| pattern.pattern_at(Tuple4D::point(x, 0.0, 0.0));

    assert_eq!(at(0.0), Color::white());
    assert_eq!(at(0.9), Color::white());
    assert_eq!(at(1.0), Color::black());
    assert_eq!(at(-0.1), Color::black());
    assert_eq!(at(-1.0), Color::black());
    assert_eq!(at(-1.1), Color::white());
}

#[test]
fn stripes_with_object_transformation() {
    let mut shapes = ShapeArena::new();
    let object = shapes.add_root(
        crate::shape::Shape::sphere()
            .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap()
    );
    let pattern = Pattern::stripe(Color::white(), Color::black());

    assert_eq!(
        pattern.pattern_at_shape(&shapes, object, Tuple4D::point(1.5, 0.0, 0.0)),
        Color::white()
    );
}

#[test]
fn stripes_with_pattern_transformation() {
    let mut shapes = ShapeArena::new();
    let object = shapes.add_root(crate::shape::Shape::sphere());
    let pattern = Pattern::stripe(Color::white(), Color::black())
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();

    assert_eq!(
        pattern.pattern_at_shape(&shapes, object, Tuple4D::point(1.5, 0.0, 0.0)),
        Color::white()
    );
}

#[test]
fn pattern_with_object_and_pattern_transformation() {
    let mut shapes = ShapeArena::new();
    let object = shapes.add_root(
        crate::shape::Shape::sphere()
            .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap()
    );
    let pattern = Pattern::test()
        .with_transform(Matrix4D::translation(0.5, 1.0, 1.5)).unwrap();

    assert_eq!(
        pattern.pattern_at_shape(&shapes, object, Tuple4D::point(2.5, 3.0, 3.5)),
        Color::rgb(0.75, 0.5, 0.25)
    );
}

#[test]
fn pattern_on_shape_inside_group() {
    use crate::shape::Shape;

    let mut shapes = ShapeArena::new();
    let group = shapes.add_root(
        Shape::group().with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap()
    );
    let object = shapes.add_child(group,
        Shape::sphere().with_transform(Matrix4D::translation(1.0, 0.0, 0.0)).unwrap()
    ).unwrap();

    assert_eq!(
        Pattern::test().pattern_at_shape(&shapes, object, Tuple4D::point(4.0, 2.0, 6.0)),
        Color::rgb(1.0, 1.0, 3.0)
    );
}

#[test]
fn singular_pattern_transform_is_rejected() {
    let mut pattern = Pattern::stripe(Color::white(), Color::black());

    assert!(pattern.set_transform(Matrix4D::scaling(0.0, 1.0, 1.0)).is_err());
    assert_eq!(*pattern.transform(), Matrix4D::identity());
}

#[test]
fn gradient_interpolates_between_colors() {
    let pattern = Pattern::gradient(Color::white(), Color::black());
    let at = |x: f64| pattern.pattern_at(Tuple4D::point(x, 0.0, 0.0));

    assert_eq!(at(0.0), Color::white());
    assert_eq!(at(0.25), Color::rgb(0.75, 0.75, 0.75));
    assert_eq!(at(0.5), Color::rgb(0.5, 0.5, 0.5));
    assert_eq!(at(0.75), Color::rgb(0.25, 0.25, 0.25));
}

#[test]
fn ring_extends_in_x_and_z() {
    let pattern = Pattern::ring(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 0.0)), Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(1.0, 0.0, 0.0)), Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 1.0)), Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.708, 0.0, 0.708)),
        Color::black());
}

#[test]
fn checkers_repeat_in_every_dimension() {
    let pattern = Pattern::checkers(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 0.0)), Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.99, 0.0, 0.0)), Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(1.01, 0.0, 0.0)), Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.99, 0.0)), Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 1.01, 0.0)), Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 0.99)), Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 1.01)), Color::black());
}

#[test]
fn noise_is_deterministic_and_bounded() {
    let pattern = Pattern::noise(Color::black(), Color::white());

    for i in 0..200 {
        let f = i as f64 * 0.37;
        let p = Tuple4D::point(f, -f * 0.5, f * 1.3);
        let c1 = pattern.pattern_at(p);
        let c2 = pattern.pattern_at(p);

        assert_eq!(c1, c2);
        assert!(c1.r.abs() <= 1.5);
    }

    // Noise vanishes on lattice points.
    assert_eq!(perlin(Tuple4D::point(3.0, -2.0, 7.0)), 0.0);
}
