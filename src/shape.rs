use crate::consts::EPSILON;
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::matrix::Matrix4D;
use crate::light::Material;
use crate::bounds::Bounds;
use crate::partition::KdTree;
use crate::intersect::{ Intersection, Intersections };
use crate::error::Result;

/// A handle to a shape stored in a `ShapeArena`.
///
/// Ids are never reused; a removed shape's id simply stops resolving.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShapeId(pub(crate) usize);

impl ShapeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Precomputed data for a flat triangle.
///
/// `e1` and `e2` are the edges leaving `p1`; the normal is shared by every
/// point on the face.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangleInfo {
    pub p1: Tuple4D,
    pub p2: Tuple4D,
    pub p3: Tuple4D,
    pub e1: Tuple4D,
    pub e2: Tuple4D,
    pub normal: Tuple4D,
}

impl TriangleInfo {
    pub fn new(p1: Tuple4D, p2: Tuple4D, p3: Tuple4D) -> TriangleInfo {
        let e1 = p2 - p1;
        let e2 = p3 - p1;
        let normal = e2.cross(&e1).normalize();

        TriangleInfo { p1, p2, p3, e1, e2, normal }
    }

    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::empty();
        bounds.add_point(self.p1);
        bounds.add_point(self.p2);
        bounds.add_point(self.p3);
        bounds
    }
}

#[derive(Clone, Debug)]
pub enum ShapeKind {
    /// A unit sphere centered at the object-space origin.
    Sphere,

    /// The XZ plane.
    Plane,

    /// An axis-aligned cube spanning `[-1, 1]` on every axis.
    Cube,

    /// A unit-radius cylinder around the Y axis, truncated to
    /// `minimum < y < maximum` and optionally capped.
    Cylinder { minimum: f64, maximum: f64, closed: bool },

    /// A double-napped cone `x² - y² + z² = 0`, truncated like a cylinder.
    Cone { minimum: f64, maximum: f64, closed: bool },

    Triangle(TriangleInfo),

    /// An ordered list of child shapes sharing this shape's transform.
    Group(Vec<ShapeId>),

    /// A group whose children are indexed by a k-d tree.
    Partition(KdTree),
}

impl ShapeKind {
    pub fn is_composite(&self) -> bool {
        matches!(self, ShapeKind::Group(_) | ShapeKind::Partition(_))
    }
}

/// A shape: its geometry, material and transform.
///
/// Composite shapes (groups and partitions) only hold ids; their children
/// live in the same `ShapeArena`. Transform-aware queries that need to walk
/// the hierarchy (intersection, normals, bounds) live on the arena.
#[derive(Clone, Debug)]
pub struct Shape {
    pub(crate) kind: ShapeKind,
    pub material: Material,

    transform: Matrix4D,
    inverse: Matrix4D,

    pub(crate) parent: Option<ShapeId>,
}

impl Shape {
    pub fn new(kind: ShapeKind) -> Shape {
        Shape {
            kind,
            material: Material::default(),
            transform: Matrix4D::identity(),
            inverse: Matrix4D::identity(),
            parent: None,
        }
    }

    pub fn sphere() -> Shape {
        Shape::new(ShapeKind::Sphere)
    }

    /// A sphere with a glass material: fully transparent, index 1.5.
    pub fn glass_sphere() -> Shape {
        Shape {
            material: Material::glass(),
            ..Shape::sphere()
        }
    }

    pub fn plane() -> Shape {
        Shape::new(ShapeKind::Plane)
    }

    pub fn cube() -> Shape {
        Shape::new(ShapeKind::Cube)
    }

    /// An infinitely long cylinder with no caps.
    pub fn cylinder() -> Shape {
        Shape::bounded_cylinder(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn bounded_cylinder(minimum: f64, maximum: f64) -> Shape {
        Shape::new(ShapeKind::Cylinder { minimum, maximum, closed: false })
    }

    pub fn capped_cylinder(minimum: f64, maximum: f64) -> Shape {
        Shape::new(ShapeKind::Cylinder { minimum, maximum, closed: true })
    }

    /// An infinite double-napped cone with no caps.
    pub fn cone() -> Shape {
        Shape::bounded_cone(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn bounded_cone(minimum: f64, maximum: f64) -> Shape {
        Shape::new(ShapeKind::Cone { minimum, maximum, closed: false })
    }

    pub fn capped_cone(minimum: f64, maximum: f64) -> Shape {
        Shape::new(ShapeKind::Cone { minimum, maximum, closed: true })
    }

    pub fn triangle(p1: Tuple4D, p2: Tuple4D, p3: Tuple4D) -> Shape {
        Shape::new(ShapeKind::Triangle(TriangleInfo::new(p1, p2, p3)))
    }

    /// An empty group. Children are added through `ShapeArena::attach`.
    pub fn group() -> Shape {
        Shape::new(ShapeKind::Group(Vec::new()))
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    pub fn is_composite(&self) -> bool {
        self.kind.is_composite()
    }

    /// The children of a group or partition; empty for primitives.
    pub fn children(&self) -> &[ShapeId] {
        match self.kind {
            ShapeKind::Group(ref children) => children,
            ShapeKind::Partition(ref tree) => tree.children(),
            _ => &[],
        }
    }

    pub fn parent(&self) -> Option<ShapeId> {
        self.parent
    }

    pub fn transform(&self) -> &Matrix4D {
        &self.transform
    }

    pub fn inverse(&self) -> &Matrix4D {
        &self.inverse
    }

    /// Sets the transform and caches its inverse.
    ///
    /// Fails without modifying the shape if `transform` is singular. Shapes
    /// already stored in an arena should go through
    /// `ShapeArena::set_transform`, which also refreshes any partitions above
    /// them.
    pub fn set_transform(&mut self, transform: Matrix4D) -> Result<()> {
        self.inverse = transform.try_inverse()?;
        self.transform = transform;
        Ok(())
    }

    pub fn with_transform(mut self, transform: Matrix4D) -> Result<Shape> {
        self.set_transform(transform)?;
        Ok(self)
    }

    pub fn with_material(mut self, material: Material) -> Shape {
        self.material = material;
        self
    }

    /// Intersects a ray, already in object space, with a primitive.
    ///
    /// `id` is recorded in the returned intersections. Composite shapes have
    /// no geometry of their own and return nothing here; the arena
    /// intersects their children.
    pub fn local_intersect(&self, id: ShapeId, ray: &Ray4D) -> Intersections {
        let ts = match self.kind {
            ShapeKind::Sphere => intersect_sphere(ray),
            ShapeKind::Plane => intersect_plane(ray),
            ShapeKind::Cube => intersect_cube(ray),
            ShapeKind::Cylinder { minimum, maximum, closed }
                => intersect_cylinder(ray, minimum, maximum, closed),
            ShapeKind::Cone { minimum, maximum, closed }
                => intersect_cone(ray, minimum, maximum, closed),
            ShapeKind::Triangle(ref info) => intersect_triangle(ray, info),
            ShapeKind::Group(_) | ShapeKind::Partition(_) => Vec::new(),
        };

        Intersections {
            intersections: ts.into_iter()
                .map(|t| Intersection::new(t, id))
                .collect()
        }
    }

    /// The surface normal at an object-space point.
    ///
    /// Composite shapes never produce hits of their own, so their normal is
    /// the zero vector.
    pub fn local_normal_at(&self, p: Tuple4D) -> Tuple4D {
        match self.kind {
            ShapeKind::Sphere => Tuple4D::vector(p.x, p.y, p.z),
            ShapeKind::Plane => Tuple4D::vector(0.0, 1.0, 0.0),
            ShapeKind::Cube => normal_at_cube(p),
            ShapeKind::Cylinder { minimum, maximum, .. }
                => normal_at_cylinder(p, minimum, maximum),
            ShapeKind::Cone { minimum, maximum, .. }
                => normal_at_cone(p, minimum, maximum),
            ShapeKind::Triangle(ref info) => info.normal,
            ShapeKind::Group(_) | ShapeKind::Partition(_)
                => Tuple4D::vector(0.0, 0.0, 0.0),
        }
    }

    /// Object-space bounds of a primitive. Composite bounds depend on their
    /// children and come from `ShapeArena::bounds`.
    pub fn local_bounds(&self) -> Bounds {
        let inf = f64::INFINITY;

        match self.kind {
            ShapeKind::Sphere | ShapeKind::Cube
                => Bounds::new(-1.0, -1.0, -1.0, 1.0, 1.0, 1.0),
            ShapeKind::Plane => Bounds::new(-inf, 0.0, -inf, inf, 0.0, inf),
            ShapeKind::Cylinder { minimum, maximum, .. }
                => Bounds::new(-1.0, minimum, -1.0, 1.0, maximum, 1.0),
            ShapeKind::Cone { minimum, maximum, .. } => {
                let r = minimum.abs().max(maximum.abs());
                Bounds::new(-r, minimum, -r, r, maximum, r)
            },
            ShapeKind::Triangle(ref info) => info.bounds(),
            ShapeKind::Group(_) | ShapeKind::Partition(_) => Bounds::empty(),
        }
    }
}

/// Roots of the unit sphere's quadratic, ascending. A tangent ray yields the
/// same root twice.
fn intersect_sphere(ray: &Ray4D) -> Vec<f64> {
    let sphere_to_ray = ray.origin - Tuple4D::point(0.0, 0.0, 0.0);

    let a = ray.direction.dot(&ray.direction);
    let b = 2.0 * ray.direction.dot(&sphere_to_ray);
    let c = sphere_to_ray.dot(&sphere_to_ray) - 1.0;

    let discriminant = b.powi(2) - (4.0 * a * c);
    if discriminant < 0.0 {
        return Vec::new();
    }

    let t1 = (-b - discriminant.sqrt()) / (2.0 * a);
    let t2 = (-b + discriminant.sqrt()) / (2.0 * a);

    vec![t1, t2]
}

fn intersect_plane(ray: &Ray4D) -> Vec<f64> {
    // Parallel (or coplanar) rays never hit.
    if ray.direction.y.abs() < EPSILON {
        return Vec::new();
    }

    vec![-ray.origin.y / ray.direction.y]
}

fn intersect_cube(ray: &Ray4D) -> Vec<f64> {
    let (xtmin, xtmax)
        = Bounds::check_axis(-1.0, 1.0, ray.origin.x, ray.direction.x);
    let (ytmin, ytmax)
        = Bounds::check_axis(-1.0, 1.0, ray.origin.y, ray.direction.y);
    let (ztmin, ztmax)
        = Bounds::check_axis(-1.0, 1.0, ray.origin.z, ray.direction.z);

    let tmin = xtmin.max(ytmin).max(ztmin);
    let tmax = xtmax.min(ytmax).min(ztmax);

    if tmin > tmax {
        return Vec::new();
    }

    vec![tmin, tmax]
}

fn normal_at_cube(p: Tuple4D) -> Tuple4D {
    let xa = p.x.abs();
    let ya = p.y.abs();
    let za = p.z.abs();

    let max_component = xa.max(ya).max(za);
    if max_component == xa {
        Tuple4D::vector(p.x, 0.0, 0.0)
    } else if max_component == ya {
        Tuple4D::vector(0.0, p.y, 0.0)
    } else {
        Tuple4D::vector(0.0, 0.0, p.z)
    }
}

/// Keeps the roots of a quadric whose hit lies strictly between the caps.
fn push_truncated(ts: &mut Vec<f64>, ray: &Ray4D, t: f64,
    minimum: f64, maximum: f64) {
    let y = ray.origin.y + t * ray.direction.y;
    if minimum < y && y < maximum {
        ts.push(t);
    }
}

/// Intersects the caps at `y = minimum` and `y = maximum`. A cap is hit when
/// the point on its plane lies within `radius(y)²` of the Y axis.
fn intersect_caps(ts: &mut Vec<f64>, ray: &Ray4D, minimum: f64, maximum: f64,
    closed: bool, radius_sq: impl Fn(f64) -> f64) {
    if !closed || ray.direction.y.abs() < EPSILON {
        return;
    }

    for &cap in &[minimum, maximum] {
        let t = (cap - ray.origin.y) / ray.direction.y;
        let x = ray.origin.x + t * ray.direction.x;
        let z = ray.origin.z + t * ray.direction.z;

        if x.powi(2) + z.powi(2) <= radius_sq(cap) {
            ts.push(t);
        }
    }
}

fn intersect_cylinder(ray: &Ray4D, minimum: f64, maximum: f64, closed: bool)
    -> Vec<f64> {
    let mut ts = Vec::new();
    let a = ray.direction.x.powi(2) + ray.direction.z.powi(2);

    // Parallel to the Y axis: only the caps can be hit.
    if a.abs() < EPSILON {
        intersect_caps(&mut ts, ray, minimum, maximum, closed, |_| 1.0);
        return ts;
    }

    let b = 2.0 * ray.origin.x * ray.direction.x
          + 2.0 * ray.origin.z * ray.direction.z;
    let c = ray.origin.x.powi(2) + ray.origin.z.powi(2) - 1.0;

    let disc = b.powi(2) - 4.0 * a * c;
    if disc < 0.0 {
        return ts;
    }

    let mut t0 = (-b - disc.sqrt()) / (2.0 * a);
    let mut t1 = (-b + disc.sqrt()) / (2.0 * a);
    if t0 > t1 {
        std::mem::swap(&mut t0, &mut t1);
    }

    push_truncated(&mut ts, ray, t0, minimum, maximum);
    push_truncated(&mut ts, ray, t1, minimum, maximum);
    intersect_caps(&mut ts, ray, minimum, maximum, closed, |_| 1.0);

    ts
}

fn normal_at_cylinder(p: Tuple4D, minimum: f64, maximum: f64) -> Tuple4D {
    let dist = p.x.powi(2) + p.z.powi(2);

    if dist < 1.0 && p.y >= maximum - EPSILON {
        Tuple4D::vector(0.0, 1.0, 0.0)
    } else if dist < 1.0 && p.y <= minimum + EPSILON {
        Tuple4D::vector(0.0, -1.0, 0.0)
    } else {
        Tuple4D::vector(p.x, 0.0, p.z)
    }
}

fn intersect_cone(ray: &Ray4D, minimum: f64, maximum: f64, closed: bool)
    -> Vec<f64> {
    let mut ts = Vec::new();
    let (o, d) = (ray.origin, ray.direction);

    let a = d.x.powi(2) - d.y.powi(2) + d.z.powi(2);
    let b = 2.0 * o.x * d.x - 2.0 * o.y * d.y + 2.0 * o.z * d.z;
    let c = o.x.powi(2) - o.y.powi(2) + o.z.powi(2);

    if a.abs() < EPSILON {
        // Parallel to one of the cone's halves: at most one side hit.
        if b.abs() >= EPSILON {
            push_truncated(&mut ts, ray, -c / (2.0 * b), minimum, maximum);
        }
    } else {
        let disc = b.powi(2) - 4.0 * a * c;
        if disc < 0.0 {
            return ts;
        }

        let mut t0 = (-b - disc.sqrt()) / (2.0 * a);
        let mut t1 = (-b + disc.sqrt()) / (2.0 * a);
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }

        push_truncated(&mut ts, ray, t0, minimum, maximum);
        push_truncated(&mut ts, ray, t1, minimum, maximum);
    }

    intersect_caps(&mut ts, ray, minimum, maximum, closed, |y| y.powi(2));

    ts
}

fn normal_at_cone(p: Tuple4D, minimum: f64, maximum: f64) -> Tuple4D {
    let dist = p.x.powi(2) + p.z.powi(2);

    if dist < maximum.powi(2) && p.y >= maximum - EPSILON {
        Tuple4D::vector(0.0, 1.0, 0.0)
    } else if dist < minimum.powi(2) && p.y <= minimum + EPSILON {
        Tuple4D::vector(0.0, -1.0, 0.0)
    } else {
        let mut y = dist.sqrt();
        if p.y > 0.0 {
            y = -y;
        }

        Tuple4D::vector(p.x, y, p.z)
    }
}

/// Möller–Trumbore. Triangles are hit from either side.
fn intersect_triangle(ray: &Ray4D, info: &TriangleInfo) -> Vec<f64> {
    let dir_cross_e2 = ray.direction.cross(&info.e2);
    let determinant = info.e1.dot(&dir_cross_e2);

    if determinant.abs() < EPSILON {
        return Vec::new();
    }

    let f = 1.0 / determinant;
    let p1_to_origin = ray.origin - info.p1;
    let u = f * p1_to_origin.dot(&dir_cross_e2);
    if !(0.0..=1.0).contains(&u) {
        return Vec::new();
    }

    let origin_cross_e1 = p1_to_origin.cross(&info.e1);
    let v = f * ray.direction.dot(&origin_cross_e1);
    if v < 0.0 || u + v > 1.0 {
        return Vec::new();
    }

    vec![f * info.e2.dot(&origin_cross_e1)]
}

#[cfg(test)]
fn local_ts(shape: &Shape, origin: Tuple4D, direction: Tuple4D) -> Vec<f64> {
    shape.local_intersect(ShapeId(0), &Ray4D::new(origin, direction))
        .iter()
        .map(|i| i.t)
        .collect()
}

#[test]
fn ray_intersects_sphere_at_two_points() {
    let ts = local_ts(&Shape::sphere(),
        Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert_eq!(ts, vec![4.0, 6.0]);
}

#[test]
fn ray_is_tangent_to_sphere() {
    let ts = local_ts(&Shape::sphere(),
        Tuple4D::point(0.0, 1.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert_eq!(ts, vec![5.0, 5.0]);
}

#[test]
fn ray_misses_sphere() {
    let ts = local_ts(&Shape::sphere(),
        Tuple4D::point(0.0, 2.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert!(ts.is_empty());
}

#[test]
fn ray_originates_inside_sphere() {
    let ts = local_ts(&Shape::sphere(),
        Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert_eq!(ts, vec![-1.0, 1.0]);
}

#[test]
fn sphere_is_behind_ray() {
    let ts = local_ts(&Shape::sphere(),
        Tuple4D::point(0.0, 0.0, 5.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert_eq!(ts, vec![-6.0, -4.0]);
}

#[test]
fn intersections_record_the_shape_id() {
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let xs = Shape::sphere().local_intersect(ShapeId(7), &r);

    assert!(xs.iter().all(|i| i.object == ShapeId(7)));
}

#[test]
fn normal_on_sphere() {
    let s = Shape::sphere();
    let k = 3.0f64.sqrt() / 3.0;

    assert_eq!(s.local_normal_at(Tuple4D::point(1.0, 0.0, 0.0)),
        Tuple4D::vector(1.0, 0.0, 0.0));
    assert_eq!(s.local_normal_at(Tuple4D::point(0.0, 0.0, 1.0)),
        Tuple4D::vector(0.0, 0.0, 1.0));
    assert_eq!(s.local_normal_at(Tuple4D::point(k, k, k)),
        Tuple4D::vector(k, k, k));
}

#[test]
fn glass_sphere_preset() {
    let s = Shape::glass_sphere();

    assert_eq!(*s.transform(), Matrix4D::identity());
    assert_eq!(s.material.transparency, 1.0);
    assert_eq!(s.material.refractive_index, 1.5);
}

#[test]
fn singular_transform_is_rejected() {
    let mut s = Shape::sphere();
    let result = s.set_transform(Matrix4D::scaling(1.0, 0.0, 1.0));

    assert!(matches!(result, Err(crate::RayTracerError::NonInvertibleMatrix)));
    assert_eq!(*s.transform(), Matrix4D::identity());
}

#[test]
fn normal_on_plane_is_constant() {
    let p = Shape::plane();

    for point in &[
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::point(10.0, 0.0, -10.0),
        Tuple4D::point(-5.0, 0.0, 150.0),
    ] {
        assert_eq!(p.local_normal_at(*point), Tuple4D::vector(0.0, 1.0, 0.0));
    }
}

#[test]
fn ray_parallel_or_coplanar_to_plane() {
    let p = Shape::plane();

    assert!(local_ts(&p, Tuple4D::point(0.0, 10.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0)).is_empty());
    assert!(local_ts(&p, Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0)).is_empty());
}

#[test]
fn ray_intersecting_plane_from_above_and_below() {
    let p = Shape::plane();

    assert_eq!(local_ts(&p, Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::vector(0.0, -1.0, 0.0)), vec![1.0]);
    assert_eq!(local_ts(&p, Tuple4D::point(0.0, -1.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0)), vec![1.0]);
}

#[test]
fn ray_intersects_cube() {
    let c = Shape::cube();
    let cases = [
        ((5.0, 0.5, 0.0), (-1.0, 0.0, 0.0), 4.0, 6.0),
        ((-5.0, 0.5, 0.0), (1.0, 0.0, 0.0), 4.0, 6.0),
        ((0.5, 5.0, 0.0), (0.0, -1.0, 0.0), 4.0, 6.0),
        ((0.5, -5.0, 0.0), (0.0, 1.0, 0.0), 4.0, 6.0),
        ((0.5, 0.0, 5.0), (0.0, 0.0, -1.0), 4.0, 6.0),
        ((0.5, 0.0, -5.0), (0.0, 0.0, 1.0), 4.0, 6.0),
        ((0.0, 0.5, 0.0), (0.0, 0.0, 1.0), -1.0, 1.0),
    ];

    for ((ox, oy, oz), (dx, dy, dz), t1, t2) in cases.iter() {
        let ts = local_ts(&c, Tuple4D::point(*ox, *oy, *oz),
            Tuple4D::vector(*dx, *dy, *dz));
        assert_eq!(ts, vec![*t1, *t2]);
    }
}

#[test]
fn ray_misses_cube() {
    let c = Shape::cube();
    let cases = [
        ((-2.0, 0.0, 0.0), (0.2673, 0.5345, 0.8018)),
        ((0.0, -2.0, 0.0), (0.8018, 0.2673, 0.5345)),
        ((0.0, 0.0, -2.0), (0.5345, 0.8018, 0.2673)),
        ((2.0, 0.0, 2.0), (0.0, 0.0, -1.0)),
        ((0.0, 2.0, 2.0), (0.0, -1.0, 0.0)),
        ((2.0, 2.0, 0.0), (-1.0, 0.0, 0.0)),
    ];

    for ((ox, oy, oz), (dx, dy, dz)) in cases.iter() {
        let ts = local_ts(&c, Tuple4D::point(*ox, *oy, *oz),
            Tuple4D::vector(*dx, *dy, *dz));
        assert!(ts.is_empty());
    }
}

#[test]
fn normal_on_cube() {
    let c = Shape::cube();
    let cases = [
        ((1.0, 0.5, -0.8), (1.0, 0.0, 0.0)),
        ((-1.0, -0.2, 0.9), (-1.0, 0.0, 0.0)),
        ((-0.4, 1.0, -0.1), (0.0, 1.0, 0.0)),
        ((0.3, -1.0, -0.7), (0.0, -1.0, 0.0)),
        ((-0.6, 0.3, 1.0), (0.0, 0.0, 1.0)),
        ((0.4, 0.4, -1.0), (0.0, 0.0, -1.0)),
        ((1.0, 1.0, 1.0), (1.0, 0.0, 0.0)),
        ((-1.0, -1.0, -1.0), (-1.0, 0.0, 0.0)),
    ];

    for ((px, py, pz), (nx, ny, nz)) in cases.iter() {
        assert_eq!(c.local_normal_at(Tuple4D::point(*px, *py, *pz)),
            Tuple4D::vector(*nx, *ny, *nz));
    }
}

#[test]
fn ray_misses_cylinder() {
    let c = Shape::cylinder();
    let cases = [
        ((1.0, 0.0, 0.0), (0.0, 1.0, 0.0)),
        ((0.0, 0.0, 0.0), (0.0, 1.0, 0.0)),
        ((0.0, 0.0, -5.0), (1.0, 1.0, 1.0)),
    ];

    for ((ox, oy, oz), (dx, dy, dz)) in cases.iter() {
        let ts = local_ts(&c, Tuple4D::point(*ox, *oy, *oz),
            Tuple4D::vector(*dx, *dy, *dz).normalize());
        assert!(ts.is_empty());
    }
}

#[test]
fn ray_strikes_cylinder() {
    let c = Shape::cylinder();
    let cases = [
        ((1.0, 0.0, -5.0), (0.0, 0.0, 1.0), 5.0, 5.0),
        ((0.0, 0.0, -5.0), (0.0, 0.0, 1.0), 4.0, 6.0),
        ((0.5, 0.0, -5.0), (0.1, 1.0, 1.0), 6.80798, 7.08872),
    ];

    for ((ox, oy, oz), (dx, dy, dz), t0, t1) in cases.iter() {
        let ts = local_ts(&c, Tuple4D::point(*ox, *oy, *oz),
            Tuple4D::vector(*dx, *dy, *dz).normalize());

        assert_eq!(ts.len(), 2);
        assert!(crate::feq(ts[0], *t0));
        assert!(crate::feq(ts[1], *t1));
    }
}

#[test]
fn normal_on_cylinder() {
    let c = Shape::cylinder();

    assert_eq!(c.local_normal_at(Tuple4D::point(1.0, 0.0, 0.0)),
        Tuple4D::vector(1.0, 0.0, 0.0));
    assert_eq!(c.local_normal_at(Tuple4D::point(0.0, 5.0, -1.0)),
        Tuple4D::vector(0.0, 0.0, -1.0));
    assert_eq!(c.local_normal_at(Tuple4D::point(0.0, -2.0, 1.0)),
        Tuple4D::vector(0.0, 0.0, 1.0));
    assert_eq!(c.local_normal_at(Tuple4D::point(-1.0, 1.0, 0.0)),
        Tuple4D::vector(-1.0, 0.0, 0.0));
}

#[test]
fn intersecting_truncated_cylinder() {
    let c = Shape::bounded_cylinder(1.0, 2.0);
    let cases = [
        ((0.0, 1.5, 0.0), (0.1, 1.0, 0.0), 0),
        ((0.0, 3.0, -5.0), (0.0, 0.0, 1.0), 0),
        ((0.0, 0.0, -5.0), (0.0, 0.0, 1.0), 0),
        ((0.0, 2.0, -5.0), (0.0, 0.0, 1.0), 0),
        ((0.0, 1.0, -5.0), (0.0, 0.0, 1.0), 0),
        ((0.0, 1.5, -2.0), (0.0, 0.0, 1.0), 2),
    ];

    for ((ox, oy, oz), (dx, dy, dz), count) in cases.iter() {
        let ts = local_ts(&c, Tuple4D::point(*ox, *oy, *oz),
            Tuple4D::vector(*dx, *dy, *dz).normalize());
        assert_eq!(ts.len(), *count);
    }
}

#[test]
fn intersecting_capped_cylinder() {
    let c = Shape::capped_cylinder(1.0, 2.0);
    let cases = [
        ((0.0, 3.0, 0.0), (0.0, -1.0, 0.0), 2),
        ((0.0, 3.0, -2.0), (0.0, -1.0, 2.0), 2),
        ((0.0, 4.0, -2.0), (0.0, -1.0, 1.0), 2),
        ((0.0, 0.0, -2.0), (0.0, 1.0, 2.0), 2),
        ((0.0, -1.0, -2.0), (0.0, 1.0, 1.0), 2),
    ];

    for ((ox, oy, oz), (dx, dy, dz), count) in cases.iter() {
        let ts = local_ts(&c, Tuple4D::point(*ox, *oy, *oz),
            Tuple4D::vector(*dx, *dy, *dz).normalize());
        assert_eq!(ts.len(), *count);
    }
}

#[test]
fn normal_on_cylinder_caps() {
    let c = Shape::capped_cylinder(1.0, 2.0);
    let cases = [
        ((0.0, 1.0, 0.0), (0.0, -1.0, 0.0)),
        ((0.5, 1.0, 0.0), (0.0, -1.0, 0.0)),
        ((0.0, 1.0, 0.5), (0.0, -1.0, 0.0)),
        ((0.0, 2.0, 0.0), (0.0, 1.0, 0.0)),
        ((0.5, 2.0, 0.0), (0.0, 1.0, 0.0)),
        ((0.0, 2.0, 0.5), (0.0, 1.0, 0.0)),
    ];

    for ((px, py, pz), (nx, ny, nz)) in cases.iter() {
        assert_eq!(c.local_normal_at(Tuple4D::point(*px, *py, *pz)),
            Tuple4D::vector(*nx, *ny, *nz));
    }
}

#[test]
fn intersecting_cone() {
    let c = Shape::cone();
    let cases = [
        ((0.0, 0.0, -5.0), (0.0, 0.0, 1.0), 5.0, 5.0),
        ((0.0, 0.0, -5.0), (1.0, 1.0, 1.0), 8.66025, 8.66025),
        ((1.0, 1.0, -5.0), (-0.5, -1.0, 1.0), 4.55006, 49.44994),
    ];

    for ((ox, oy, oz), (dx, dy, dz), t0, t1) in cases.iter() {
        let ts = local_ts(&c, Tuple4D::point(*ox, *oy, *oz),
            Tuple4D::vector(*dx, *dy, *dz).normalize());

        assert_eq!(ts.len(), 2);
        assert!((ts[0] - t0).abs() < 0.0001);
        assert!((ts[1] - t1).abs() < 0.0001);
    }
}

#[test]
fn intersecting_cone_parallel_to_one_half() {
    let ts = local_ts(&Shape::cone(), Tuple4D::point(0.0, 0.0, -1.0),
        Tuple4D::vector(0.0, 1.0, 1.0).normalize());

    assert_eq!(ts.len(), 1);
    assert!((ts[0] - 0.35355).abs() < 0.0001);
}

#[test]
fn single_cone_root_respects_truncation() {
    // The lone root lies at y = 0.5, outside [1, 2].
    let ts = local_ts(&Shape::bounded_cone(1.0, 2.0),
        Tuple4D::point(0.0, 0.0, -1.0),
        Tuple4D::vector(0.0, 1.0, 1.0).normalize());

    assert!(ts.is_empty());
}

#[test]
fn intersecting_cone_caps() {
    let c = Shape::capped_cone(-0.5, 0.5);
    let cases = [
        ((0.0, 0.0, -5.0), (0.0, 1.0, 0.0), 0),
        ((0.0, 0.0, -0.25), (0.0, 1.0, 1.0), 2),
        ((0.0, 0.0, -0.25), (0.0, 1.0, 0.0), 4),
    ];

    for ((ox, oy, oz), (dx, dy, dz), count) in cases.iter() {
        let ts = local_ts(&c, Tuple4D::point(*ox, *oy, *oz),
            Tuple4D::vector(*dx, *dy, *dz).normalize());
        assert_eq!(ts.len(), *count);
    }
}

#[test]
fn normal_on_cone() {
    let c = Shape::cone();

    assert_eq!(c.local_normal_at(Tuple4D::point(0.0, 0.0, 0.0)),
        Tuple4D::vector(0.0, 0.0, 0.0));
    assert_eq!(c.local_normal_at(Tuple4D::point(1.0, 1.0, 1.0)),
        Tuple4D::vector(1.0, -(2.0f64.sqrt()), 1.0));
    assert_eq!(c.local_normal_at(Tuple4D::point(-1.0, -1.0, 0.0)),
        Tuple4D::vector(-1.0, 1.0, 0.0));
}

#[test]
fn normal_on_cone_caps() {
    let c = Shape::capped_cone(-0.5, 0.5);

    assert_eq!(c.local_normal_at(Tuple4D::point(0.2, 0.5, 0.0)),
        Tuple4D::vector(0.0, 1.0, 0.0));
    assert_eq!(c.local_normal_at(Tuple4D::point(0.2, -0.5, 0.0)),
        Tuple4D::vector(0.0, -1.0, 0.0));
    assert_eq!(c.local_normal_at(Tuple4D::point(0.0, 0.5, -0.3)),
        Tuple4D::vector(0.0, 1.0, 0.0));

    // On the rim and on the side, the side normal wins.
    assert_eq!(c.local_normal_at(Tuple4D::point(0.5, 0.5, 0.0)),
        Tuple4D::vector(0.5, -0.5, 0.0));
    assert_eq!(c.local_normal_at(Tuple4D::point(0.3, 0.3, 0.0)),
        Tuple4D::vector(0.3, -0.3, 0.0));
    assert_eq!(c.local_normal_at(Tuple4D::point(0.0, -0.4, 0.4)),
        Tuple4D::vector(0.0, 0.4, 0.4));
}

#[test]
fn constructing_a_triangle() {
    let p1 = Tuple4D::point(0.0, 1.0, 0.0);
    let p2 = Tuple4D::point(-1.0, 0.0, 0.0);
    let p3 = Tuple4D::point(1.0, 0.0, 0.0);
    let info = TriangleInfo::new(p1, p2, p3);

    assert_eq!(info.e1, Tuple4D::vector(-1.0, -1.0, 0.0));
    assert_eq!(info.e2, Tuple4D::vector(1.0, -1.0, 0.0));
    assert_eq!(info.normal, Tuple4D::vector(0.0, 0.0, -1.0));

    let t = Shape::triangle(p1, p2, p3);
    assert_eq!(t.local_normal_at(Tuple4D::point(0.0, 0.5, 0.0)), info.normal);
    assert_eq!(t.local_normal_at(Tuple4D::point(-0.5, 0.75, 0.0)), info.normal);
}

#[test]
fn ray_and_triangle() {
    let t = Shape::triangle(
        Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::point(-1.0, 0.0, 0.0),
        Tuple4D::point(1.0, 0.0, 0.0),
    );
    let forward = Tuple4D::vector(0.0, 0.0, 1.0);

    // Parallel
    assert!(local_ts(&t, Tuple4D::point(0.0, -1.0, -2.0),
        Tuple4D::vector(0.0, 1.0, 0.0)).is_empty());

    // Misses each edge
    assert!(local_ts(&t, Tuple4D::point(1.0, 1.0, -2.0), forward).is_empty());
    assert!(local_ts(&t, Tuple4D::point(-1.0, 1.0, -2.0), forward).is_empty());
    assert!(local_ts(&t, Tuple4D::point(0.0, -1.0, -2.0), forward).is_empty());

    assert_eq!(local_ts(&t, Tuple4D::point(0.0, 0.5, -2.0), forward), vec![2.0]);
}

#[test]
fn primitive_bounds() {
    let inf = f64::INFINITY;

    assert_eq!(Shape::sphere().local_bounds(),
        Bounds::new(-1.0, -1.0, -1.0, 1.0, 1.0, 1.0));
    assert_eq!(Shape::plane().local_bounds(),
        Bounds::new(-inf, 0.0, -inf, inf, 0.0, inf));
    assert_eq!(Shape::bounded_cylinder(-5.0, 3.0).local_bounds(),
        Bounds::new(-1.0, -5.0, -1.0, 1.0, 3.0, 1.0));
    assert_eq!(Shape::bounded_cone(-5.0, 3.0).local_bounds(),
        Bounds::new(-5.0, -5.0, -5.0, 5.0, 3.0, 5.0));
    assert_eq!(Shape::cone().local_bounds(), Bounds::infinite());
    assert_eq!(
        Shape::triangle(
            Tuple4D::point(-3.0, 7.0, 2.0),
            Tuple4D::point(6.0, 2.0, -4.0),
            Tuple4D::point(2.0, -1.0, -1.0),
        ).local_bounds(),
        Bounds::new(-3.0, -1.0, -4.0, 6.0, 7.0, 2.0)
    );
    assert!(Shape::group().local_bounds().is_empty());
}
