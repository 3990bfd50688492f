use std::ops::{ AddAssign, Index };

use crate::consts::SURFACE_OFFSET;
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::shape::ShapeId;
use crate::arena::ShapeArena;

/// An intersection.
///
/// Parameter `t` is the offset along the ray that produced it, measured in
/// multiples of the ray's direction. `object` is the primitive that was hit.
///
/// Two intersections are equal when both `t` and `object` match exactly.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intersection {
    pub t: f64,
    pub object: ShapeId,
}

impl Intersection {
    pub fn new(t: f64, object: ShapeId) -> Intersection {
        Intersection { t, object }
    }
}

/// A collection of intersections.
///
/// Mostly a wrapper for a vector of `Intersection` objects. Concatenation
/// (`push`, `extend`, `+=`) keeps insertion order; call `sort` when an
/// ordering by `t` is required.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Intersections {
    pub intersections: Vec<Intersection>,
}

impl Intersections {
    pub fn new() -> Intersections {
        Intersections { intersections: Vec::new() }
    }

    pub fn push(&mut self, i: Intersection) {
        self.intersections.push(i);
    }

    pub fn extend(&mut self, other: Intersections) {
        self.intersections.extend(other.intersections);
    }

    /// Stable sort by ascending `t`.
    pub fn sort(&mut self) {
        self.intersections.sort_by(|a, b| a.t.total_cmp(&b.t));
    }

    /// The visible intersection: the one with the smallest non-negative `t`.
    ///
    /// Does not require the list to be sorted, and does not reorder it.
    pub fn hit(&self) -> Option<Intersection> {
        self.intersections.iter()
            .filter(|i| i.t >= 0.0)
            .min_by(|a, b| a.t.total_cmp(&b.t))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Intersection> {
        self.intersections.iter()
    }
}

impl From<Vec<Intersection>> for Intersections {
    fn from(intersections: Vec<Intersection>) -> Intersections {
        Intersections { intersections }
    }
}

impl AddAssign<Intersections> for Intersections {
    fn add_assign(&mut self, other: Intersections) {
        self.extend(other);
    }
}

impl Index<usize> for Intersections {
    type Output = Intersection;

    fn index(&self, index: usize) -> &Intersection {
        &self.intersections[index]
    }
}

/// Shading state derived from a hit.
///
/// Mostly a superset of an `Intersection`.
#[derive(Copy, Clone, Debug)]
pub struct IntersectionComputation {
    /// The "time" of the ray intersection.
    pub t: f64,

    /// The primitive being intersected.
    pub object: ShapeId,

    /// The point where the intersection occurs.
    pub point: Tuple4D,

    /// A point slightly above the surface, used for shadow and reflection
    /// rays so a surface never shadows itself ("acne").
    pub over_point: Tuple4D,

    /// A point slightly below the surface, the origin of refracted rays.
    pub under_point: Tuple4D,

    pub eyev: Tuple4D,

    /// The surface normal, flipped to face the eye when the hit is inside.
    pub normalv: Tuple4D,

    /// The incoming ray, reflected across the normal.
    pub reflectv: Tuple4D,

    pub inside: bool,

    /// Refractive index of the material being exited.
    pub n1: f64,

    /// Refractive index of the material being entered.
    pub n2: f64,
}

impl IntersectionComputation {
    /// Prepares shading state for `hit` along ray `r`.
    ///
    /// `xs` is the full, sorted intersection list the hit came from; it is
    /// needed to work out which transparent objects the ray is inside. When
    /// it is `None`, the hit is treated as the only intersection.
    pub fn new(r: &Ray4D, hit: &Intersection, xs: Option<&Intersections>,
        shapes: &ShapeArena) -> IntersectionComputation {
        let t = hit.t;
        let point = r.position(t);
        let eyev = -r.direction;
        let mut normalv = shapes.normal_at(hit.object, point);

        let inside = normalv.dot(&eyev) < 0.0;
        if inside {
            normalv = -normalv;
        }

        let over_point = point + normalv * SURFACE_OFFSET;
        let under_point = point - normalv * SURFACE_OFFSET;
        let reflectv = r.direction.reflect(&normalv);

        let (n1, n2) = match xs {
            Some(xs) => refraction_indices(hit, xs.iter(), shapes),
            None => refraction_indices(hit, std::iter::once(hit), shapes),
        };

        IntersectionComputation {
            t, object: hit.object,
            point, over_point, under_point,
            eyev, normalv, reflectv,
            inside,
            n1, n2,
        }
    }

    /// The Schlick approximation of the Fresnel reflectance: the fraction of
    /// light reflected at this hit, between 0 and 1.
    pub fn schlick(&self) -> f64 {
        let mut cos = self.eyev.dot(&self.normalv);

        // Total internal reflection is only possible going into a less dense
        // medium.
        if self.n1 > self.n2 {
            let n = self.n1 / self.n2;
            let sin2_t = n.powi(2) * (1.0 - cos.powi(2));

            if sin2_t > 1.0 {
                return 1.0;
            }

            cos = (1.0 - sin2_t).sqrt();
        }

        let r0 = ((self.n1 - self.n2) / (self.n1 + self.n2)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cos).powi(5)
    }
}

/// Walks the intersections in order, tracking which objects the ray is
/// currently inside. The indices on either side of `hit` come from the most
/// recently entered container, or 1.0 when there is none.
fn refraction_indices<'a>(hit: &Intersection,
    xs: impl Iterator<Item = &'a Intersection>, shapes: &ShapeArena)
    -> (f64, f64) {
    let index_of = |containers: &[ShapeId]| containers.last()
        .map(|&id| shapes[id].material.refractive_index)
        .unwrap_or(1.0);

    let mut containers: Vec<ShapeId> = Vec::new();
    let mut n1 = 1.0;

    for i in xs {
        if i == hit {
            n1 = index_of(&containers);
        }

        match containers.iter().position(|&c| c == i.object) {
            Some(j) => { containers.remove(j); },
            None => containers.push(i.object),
        }

        if i == hit {
            return (n1, index_of(&containers));
        }
    }

    (n1, 1.0)
}

#[test]
fn hit_ignores_negative_intersections() {
    let s = ShapeId(0);

    let all_positive: Intersections = vec![
        Intersection::new(1.0, s), Intersection::new(2.0, s)
    ].into();
    assert_eq!(all_positive.hit(), Some(Intersection::new(1.0, s)));

    let some_negative: Intersections = vec![
        Intersection::new(-1.0, s), Intersection::new(1.0, s)
    ].into();
    assert_eq!(some_negative.hit(), Some(Intersection::new(1.0, s)));

    let all_negative: Intersections = vec![
        Intersection::new(-2.0, s), Intersection::new(-1.0, s)
    ].into();
    assert_eq!(all_negative.hit(), None);
}

#[test]
fn hit_is_lowest_nonnegative_and_does_not_reorder() {
    let s = ShapeId(0);
    let xs: Intersections = vec![
        Intersection::new(5.0, s),
        Intersection::new(7.0, s),
        Intersection::new(-3.0, s),
        Intersection::new(2.0, s),
    ].into();

    assert_eq!(xs.hit(), Some(Intersection::new(2.0, s)));
    assert_eq!(xs[0].t, 5.0);
    assert_eq!(xs.len(), 4);
}

#[test]
fn sort_is_stable() {
    let (a, b) = (ShapeId(0), ShapeId(1));
    let mut xs = Intersections::new();
    xs.push(Intersection::new(3.0, a));
    xs += vec![Intersection::new(1.0, b), Intersection::new(3.0, b)].into();
    xs.sort();

    let order: Vec<(f64, ShapeId)> = xs.iter().map(|i| (i.t, i.object)).collect();
    assert_eq!(order, vec![(1.0, b), (3.0, a), (3.0, b)]);
}

#[test]
fn precompute_outside_intersection() {
    use crate::shape::Shape;

    let mut shapes = ShapeArena::new();
    let s = shapes.add_root(Shape::sphere());
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let comps = IntersectionComputation::new(
        &r, &Intersection::new(4.0, s), None, &shapes
    );

    assert_eq!(comps.t, 4.0);
    assert_eq!(comps.object, s);
    assert_eq!(comps.point, Tuple4D::point(0.0, 0.0, -1.0));
    assert_eq!(comps.eyev, Tuple4D::vector(0.0, 0.0, -1.0));
    assert_eq!(comps.normalv, Tuple4D::vector(0.0, 0.0, -1.0));
    assert!(!comps.inside);
}

#[test]
fn precompute_inside_intersection() {
    use crate::shape::Shape;

    let mut shapes = ShapeArena::new();
    let s = shapes.add_root(Shape::sphere());
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let comps = IntersectionComputation::new(
        &r, &Intersection::new(1.0, s), None, &shapes
    );

    assert_eq!(comps.point, Tuple4D::point(0.0, 0.0, 1.0));
    assert_eq!(comps.eyev, Tuple4D::vector(0.0, 0.0, -1.0));
    assert_eq!(comps.normalv, Tuple4D::vector(0.0, 0.0, -1.0));
    assert!(comps.inside);
}

#[test]
fn hit_offsets_over_and_under_points() {
    use crate::shape::Shape;
    use crate::matrix::Matrix4D;

    let mut shapes = ShapeArena::new();
    let s = shapes.add_root(
        Shape::glass_sphere()
            .with_transform(Matrix4D::translation(0.0, 0.0, 1.0)).unwrap()
    );
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let i = Intersection::new(5.0, s);
    let xs: Intersections = vec![i].into();
    let comps = IntersectionComputation::new(&r, &i, Some(&xs), &shapes);

    assert!(comps.over_point.z < -SURFACE_OFFSET / 2.0);
    assert!(comps.point.z > comps.over_point.z);
    assert!(comps.under_point.z > SURFACE_OFFSET / 2.0);
    assert!(comps.point.z < comps.under_point.z);
}

#[test]
fn precompute_reflection_vector() {
    use crate::shape::Shape;

    let mut shapes = ShapeArena::new();
    let s = shapes.add_root(Shape::plane());
    let k = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(
        Tuple4D::point(0.0, 1.0, -1.0),
        Tuple4D::vector(0.0, -k, k)
    );
    let comps = IntersectionComputation::new(
        &r, &Intersection::new(2.0f64.sqrt(), s), None, &shapes
    );

    assert_eq!(comps.reflectv, Tuple4D::vector(0.0, k, k));
}

#[test]
fn n1_and_n2_at_various_intersections() {
    use crate::shape::Shape;
    use crate::matrix::Matrix4D;

    let mut shapes = ShapeArena::new();
    let mut glass = |scale: f64, z: f64, index: f64| {
        let mut s = Shape::glass_sphere()
            .with_transform(
                Matrix4D::translation(0.0, 0.0, z)
                    * Matrix4D::scaling(scale, scale, scale)
            ).unwrap();
        s.material.refractive_index = index;
        shapes.add_root(s)
    };

    let a = glass(2.0, 0.0, 1.5);
    let b = glass(1.0, -0.25, 2.0);
    let c = glass(1.0, 0.25, 2.5);

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -4.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let xs: Intersections = vec![
        Intersection::new(2.0, a),
        Intersection::new(2.75, b),
        Intersection::new(3.25, c),
        Intersection::new(4.75, b),
        Intersection::new(5.25, c),
        Intersection::new(6.0, a),
    ].into();
    let expected = [
        (1.0, 1.5), (1.5, 2.0), (2.0, 2.5), (2.5, 2.5), (2.5, 1.5), (1.5, 1.0)
    ];

    for (i, (n1, n2)) in expected.iter().enumerate() {
        let comps = IntersectionComputation::new(&r, &xs[i], Some(&xs), &shapes);
        assert_eq!(comps.n1, *n1);
        assert_eq!(comps.n2, *n2);
    }
}

#[test]
fn schlick_under_total_internal_reflection() {
    use crate::shape::Shape;

    let mut shapes = ShapeArena::new();
    let s = shapes.add_root(Shape::glass_sphere());
    let k = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, k),
        Tuple4D::vector(0.0, 1.0, 0.0)
    );
    let xs: Intersections = vec![
        Intersection::new(-k, s), Intersection::new(k, s)
    ].into();
    let comps = IntersectionComputation::new(&r, &xs[1], Some(&xs), &shapes);

    assert_eq!(comps.schlick(), 1.0);
}

#[test]
fn schlick_with_perpendicular_and_small_angles() {
    use crate::shape::Shape;

    let mut shapes = ShapeArena::new();
    let s = shapes.add_root(Shape::glass_sphere());

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0)
    );
    let xs: Intersections = vec![
        Intersection::new(-1.0, s), Intersection::new(1.0, s)
    ].into();
    let comps = IntersectionComputation::new(&r, &xs[1], Some(&xs), &shapes);
    assert!(crate::feq(comps.schlick(), 0.04));

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.99, -2.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let xs: Intersections = vec![Intersection::new(1.8589, s)].into();
    let comps = IntersectionComputation::new(&r, &xs[0], Some(&xs), &shapes);
    assert!((comps.schlick() - 0.48873).abs() < 0.0001);
}
