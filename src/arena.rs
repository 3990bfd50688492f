use std::ops::Index;
use std::f64::consts::PI;

use crate::consts::EPSILON;
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::matrix::Matrix4D;
use crate::bounds::Bounds;
use crate::light::Material;
use crate::shape::{ Shape, ShapeId, ShapeKind };
use crate::partition::KdTree;
use crate::intersect::Intersections;
use crate::error::{ RayTracerError, Result };

/// Owns every shape in a scene.
///
/// Shapes form a strict tree. Each shape is either *detached* (just
/// inserted), a *root* (listed in `roots`, owned by the world), or the child
/// of exactly one group or partition. A shape can never be attached twice,
/// and a group can never end up inside itself.
///
/// Composite shapes store their children's ids. Queries that depend on the
/// hierarchy (transform-aware intersection, world/object conversions,
/// bounds) are answered here, walking `parent` links where needed.
#[derive(Clone, Debug, Default)]
pub struct ShapeArena {
    slots: Vec<Option<Shape>>,
    roots: Vec<ShapeId>,
}

impl ShapeArena {
    pub fn new() -> ShapeArena {
        ShapeArena::default()
    }

    /// Stores a shape without an owner. A composite starts out empty.
    pub fn insert(&mut self, mut shape: Shape) -> ShapeId {
        shape.parent = None;
        match shape.kind {
            ShapeKind::Group(ref mut children) => children.clear(),
            ShapeKind::Partition(ref mut tree) => *tree = KdTree::new(tree.max_depth()),
            _ => (),
        }

        self.slots.push(Some(shape));
        ShapeId(self.slots.len() - 1)
    }

    /// Stores a shape as a top-level shape of the scene.
    pub fn add_root(&mut self, shape: Shape) -> ShapeId {
        let id = self.insert(shape);
        self.roots.push(id);
        id
    }

    /// Makes a detached shape a top-level shape.
    pub fn attach_root(&mut self, id: ShapeId) -> Result<()> {
        self.get(id)?;
        if self.is_owned(id) {
            return Err(RayTracerError::AlreadyOwned(id));
        }

        self.roots.push(id);
        Ok(())
    }

    /// Attaches a detached shape to a group or partition.
    pub fn attach(&mut self, parent: ShapeId, child: ShapeId) -> Result<()> {
        if !self.get(parent)?.is_composite() {
            return Err(RayTracerError::NotAGroup(parent));
        }
        self.get(child)?;

        let mut ancestor = Some(parent);
        while let Some(a) = ancestor {
            if a == child {
                return Err(RayTracerError::Cycle { parent, child });
            }
            ancestor = self[a].parent;
        }

        if self.is_owned(child) {
            return Err(RayTracerError::AlreadyOwned(child));
        }

        match self.get_mut(parent)?.kind {
            ShapeKind::Group(ref mut children) => children.push(child),
            ShapeKind::Partition(ref mut tree) => tree.push_child(child),
            _ => unreachable!(),
        }
        self.get_mut(child)?.parent = Some(parent);

        self.refresh_partitions(Some(parent));
        Ok(())
    }

    /// Inserts a shape and attaches it to `parent`.
    pub fn add_child(&mut self, parent: ShapeId, shape: Shape)
        -> Result<ShapeId> {
        if !self.get(parent)?.is_composite() {
            return Err(RayTracerError::NotAGroup(parent));
        }

        let id = self.insert(shape);
        self.attach(parent, id)?;
        Ok(id)
    }

    /// Detaches a shape from its owner and frees it along with all of its
    /// descendants.
    pub fn remove(&mut self, id: ShapeId) -> Result<()> {
        let parent = self.get(id)?.parent;

        match parent {
            Some(p) => {
                match self.get_mut(p)?.kind {
                    ShapeKind::Group(ref mut children)
                        => children.retain(|&c| c != id),
                    ShapeKind::Partition(ref mut tree) => tree.remove_child(id),
                    _ => (),
                }
                self.refresh_partitions(Some(p));
            },
            None => self.roots.retain(|&r| r != id),
        }

        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(shape) = self.slots.get_mut(next.0).and_then(Option::take) {
                pending.extend_from_slice(shape.children());
            }
        }

        Ok(())
    }

    pub fn get(&self, id: ShapeId) -> Result<&Shape> {
        self.slots.get(id.0)
            .and_then(Option::as_ref)
            .ok_or(RayTracerError::UnknownShape(id))
    }

    fn get_mut(&mut self, id: ShapeId) -> Result<&mut Shape> {
        self.slots.get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(RayTracerError::UnknownShape(id))
    }

    /// Whether a shape is a root or the child of some composite.
    pub fn is_owned(&self, id: ShapeId) -> bool {
        match self.get(id) {
            Ok(shape) => shape.parent.is_some() || self.roots.contains(&id),
            Err(_) => false,
        }
    }

    pub fn material_mut(&mut self, id: ShapeId) -> Result<&mut Material> {
        Ok(&mut self.get_mut(id)?.material)
    }

    /// Sets a shape's transform, then rebuilds every partition above it so
    /// that their bounds stay correct.
    pub fn set_transform(&mut self, id: ShapeId, transform: Matrix4D)
        -> Result<()> {
        let shape = self.get_mut(id)?;
        shape.set_transform(transform)?;
        let parent = shape.parent;

        self.refresh_partitions(parent);
        Ok(())
    }

    pub fn children(&self, id: ShapeId) -> Result<&[ShapeId]> {
        Ok(self.get(id)?.children())
    }

    pub fn roots(&self) -> &[ShapeId] {
        &self.roots
    }

    /// Number of live shapes.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rebuilds the k-d tree of every partition from `start` up to the root,
    /// innermost first.
    fn refresh_partitions(&mut self, start: Option<ShapeId>) {
        let mut current = start;

        while let Some(id) = current {
            let rebuilt = match self.get(id).map(Shape::kind) {
                Ok(ShapeKind::Partition(tree)) => Some(
                    KdTree::build(self, tree.children().to_vec(), tree.max_depth())
                ),
                _ => None,
            };

            let shape = match self.get_mut(id) {
                Ok(shape) => shape,
                Err(_) => return,
            };
            if let Some(tree) = rebuilt {
                shape.kind = ShapeKind::Partition(tree);
            }

            current = shape.parent;
        }
    }

    /// Intersects a ray, given in the space of `id`'s parent, with a shape.
    ///
    /// The ray is moved into object space with the shape's inverse
    /// transform. Groups and partitions recurse into their children. The
    /// returned `t` values stay valid for the original ray.
    pub fn intersect(&self, id: ShapeId, ray: &Ray4D) -> Intersections {
        let shape = match self.get(id) {
            Ok(shape) => shape,
            Err(_) => return Intersections::new(),
        };
        let local_ray = ray.transform(shape.inverse());

        match shape.kind {
            ShapeKind::Group(ref children) => {
                let mut xs = Intersections::new();
                for &child in children {
                    xs += self.intersect(child, &local_ray);
                }

                xs.sort();
                xs
            },
            ShapeKind::Partition(ref tree) => tree.intersect(self, &local_ray),
            _ => shape.local_intersect(id, &local_ray),
        }
    }

    /// Converts a world-space point into `id`'s object space, applying every
    /// ancestor's inverse transform from the root down.
    pub fn world_to_object(&self, id: ShapeId, point: Tuple4D) -> Tuple4D {
        let shape = match self.get(id) {
            Ok(shape) => shape,
            Err(_) => return point,
        };

        let point = match shape.parent {
            Some(parent) => self.world_to_object(parent, point),
            None => point,
        };

        *shape.inverse() * point
    }

    /// Converts an object-space point of `id` into world space.
    pub fn object_to_world(&self, id: ShapeId, point: Tuple4D) -> Tuple4D {
        let shape = match self.get(id) {
            Ok(shape) => shape,
            Err(_) => return point,
        };

        let point = *shape.transform() * point;
        match shape.parent {
            Some(parent) => self.object_to_world(parent, point),
            None => point,
        }
    }

    /// Converts an object-space normal of `id` into world space.
    pub fn normal_to_world(&self, id: ShapeId, normal: Tuple4D) -> Tuple4D {
        let shape = match self.get(id) {
            Ok(shape) => shape,
            Err(_) => return normal,
        };

        let mut normal = shape.inverse().transposition() * normal;
        normal.w = 0.0;
        if normal.magnitude() >= EPSILON {
            normal = normal.normalize();
        }

        match shape.parent {
            Some(parent) => self.normal_to_world(parent, normal),
            None => normal,
        }
    }

    /// The world-space surface normal of `id` at a world-space point.
    pub fn normal_at(&self, id: ShapeId, world_point: Tuple4D) -> Tuple4D {
        let local_point = self.world_to_object(id, world_point);
        let local_normal = match self.get(id) {
            Ok(shape) => shape.local_normal_at(local_point),
            Err(_) => Tuple4D::vector(0.0, 0.0, 0.0),
        };

        self.normal_to_world(id, local_normal)
    }

    /// Object-space bounds of a shape. Composite bounds enclose every child
    /// in the composite's own space.
    pub fn bounds(&self, id: ShapeId) -> Bounds {
        let shape = match self.get(id) {
            Ok(shape) => shape,
            Err(_) => return Bounds::empty(),
        };

        match shape.kind {
            ShapeKind::Partition(ref tree) => tree.bounds(),
            ShapeKind::Group(ref children) => {
                let mut bounds = Bounds::empty();
                for &child in children {
                    bounds += &self.parent_space_bounds(child);
                }
                bounds
            },
            _ => shape.local_bounds(),
        }
    }

    /// Bounds of a shape expressed in its parent's space.
    pub fn parent_space_bounds(&self, id: ShapeId) -> Bounds {
        match self.get(id) {
            Ok(shape) => self.bounds(id).transform(shape.transform()),
            Err(_) => Bounds::empty(),
        }
    }

    /// Converts a group into a partition in place. Its children keep their
    /// ids and owner. Calling this on a partition rebuilds it with the new
    /// depth.
    pub fn partition(&mut self, group: ShapeId, max_depth: usize) -> Result<()> {
        let children = match self.get(group)?.kind {
            ShapeKind::Group(ref children) => children.clone(),
            ShapeKind::Partition(ref tree) => tree.children().to_vec(),
            _ => return Err(RayTracerError::NotAGroup(group)),
        };

        let tree = KdTree::build(self, children, max_depth);
        let shape = self.get_mut(group)?;
        shape.kind = ShapeKind::Partition(tree);
        let parent = shape.parent;

        self.refresh_partitions(parent);
        Ok(())
    }

    /// Builds a new, detached partition over detached shapes.
    pub fn partition_shapes(&mut self, shapes: &[ShapeId], max_depth: usize)
        -> Result<ShapeId> {
        let group = self.group_of(shapes)?;
        self.partition(group, max_depth)?;
        Ok(group)
    }

    /// A detached group holding `shapes`, which must all be detached.
    fn group_of(&mut self, shapes: &[ShapeId]) -> Result<ShapeId> {
        for &s in shapes {
            self.get(s)?;
            if self.is_owned(s) {
                return Err(RayTracerError::AlreadyOwned(s));
            }
        }

        let group = self.insert(Shape::group());
        for &s in shapes {
            self.attach(group, s)?;
        }

        Ok(group)
    }

    /// A detached hexagon: six sides rotated about Y, each made of a corner
    /// sphere and an edge cylinder.
    pub fn hexagon(&mut self) -> Result<ShapeId> {
        let hex = self.insert(Shape::group());

        for n in 0..6 {
            let side = self.add_child(hex,
                Shape::group()
                    .with_transform(Matrix4D::rotation_y(n as f64 * PI / 3.0))?
            )?;

            self.add_child(side,
                Shape::sphere().with_transform(
                    Matrix4D::translation(0.0, 0.0, -1.0)
                        * Matrix4D::scaling(0.25, 0.25, 0.25)
                )?
            )?;

            self.add_child(side,
                Shape::bounded_cylinder(0.0, 1.0).with_transform(
                    Matrix4D::translation(0.0, 0.0, -1.0)
                        * Matrix4D::rotation_y(-PI / 6.0)
                        * Matrix4D::rotation_z(-PI / 2.0)
                        * Matrix4D::scaling(0.25, 1.0, 0.25)
                )?
            )?;
        }

        Ok(hex)
    }

    /// Recursively sorts detached shapes into nested groups by octant.
    ///
    /// At each level, shapes are split around the center of their combined
    /// bounds by comparing each shape's own bounds center. Recursion stops at
    /// `depth == 0`, at a single shape, or when every shape lands in the same
    /// octant. Returns `None` for an empty list.
    pub fn octree_group(&mut self, shapes: &[ShapeId], depth: usize)
        -> Result<Option<ShapeId>> {
        if shapes.is_empty() {
            return Ok(None);
        }

        let mut all = Bounds::empty();
        for &s in shapes {
            all += &self.parent_space_bounds(s);
        }
        let center = all.center();

        let mut octants: [Vec<ShapeId>; 8] = Default::default();
        for &s in shapes {
            let c = self.parent_space_bounds(s).center();
            let octant = (c.x > center.x) as usize
                | ((c.y > center.y) as usize) << 1
                | ((c.z > center.z) as usize) << 2;
            octants[octant].push(s);
        }

        let occupied = octants.iter().filter(|o| !o.is_empty()).count();
        if depth == 0 || shapes.len() == 1 || occupied == 1 {
            return self.group_of(shapes).map(Some);
        }

        let group = self.insert(Shape::group());
        for octant in &octants {
            if let Some(sub) = self.octree_group(octant, depth - 1)? {
                self.attach(group, sub)?;
            }
        }

        Ok(Some(group))
    }
}

impl Index<ShapeId> for ShapeArena {
    type Output = Shape;

    /// Panics if `id` does not name a live shape; see `ShapeArena::get` for
    /// the fallible version.
    fn index(&self, id: ShapeId) -> &Shape {
        match self.get(id) {
            Ok(shape) => shape,
            Err(e) => panic!("{}", e),
        }
    }
}

#[test]
fn shapes_start_detached() {
    let mut shapes = ShapeArena::new();
    let s = shapes.insert(Shape::sphere());

    assert!(!shapes.is_owned(s));
    assert!(shapes.roots().is_empty());
    assert_eq!(shapes[s].parent(), None);
    assert_eq!(shapes.len(), 1);
}

#[test]
fn adding_a_child_to_a_group() {
    let mut shapes = ShapeArena::new();
    let g = shapes.add_root(Shape::group());
    let s = shapes.add_child(g, Shape::sphere()).unwrap();

    assert_eq!(shapes.children(g).unwrap(), &[s]);
    assert_eq!(shapes[s].parent(), Some(g));
    assert!(shapes.is_owned(s));
}

#[test]
fn a_shape_cannot_have_two_owners() {
    let mut shapes = ShapeArena::new();
    let g1 = shapes.add_root(Shape::group());
    let g2 = shapes.add_root(Shape::group());
    let s = shapes.add_child(g1, Shape::sphere()).unwrap();

    assert!(matches!(shapes.attach(g2, s), Err(RayTracerError::AlreadyOwned(id)) if id == s));
    assert!(matches!(shapes.attach_root(s), Err(RayTracerError::AlreadyOwned(_))));
    assert!(shapes.children(g2).unwrap().is_empty());
}

#[test]
fn attaching_to_a_primitive_fails() {
    let mut shapes = ShapeArena::new();
    let s = shapes.add_root(Shape::sphere());
    let c = shapes.insert(Shape::cube());

    assert!(matches!(shapes.attach(s, c), Err(RayTracerError::NotAGroup(id)) if id == s));
    assert!(matches!(shapes.add_child(s, Shape::cube()), Err(RayTracerError::NotAGroup(_))));
    assert_eq!(shapes.len(), 2);
}

#[test]
fn cycles_are_rejected() {
    let mut shapes = ShapeArena::new();
    let outer = shapes.add_root(Shape::group());
    let inner = shapes.add_child(outer, Shape::group()).unwrap();

    assert!(matches!(shapes.attach(inner, outer), Err(RayTracerError::Cycle { .. })));
    assert!(matches!(shapes.attach(inner, inner), Err(RayTracerError::Cycle { .. })));
}

#[test]
fn unknown_ids_are_reported() {
    let mut shapes = ShapeArena::new();
    let g = shapes.add_root(Shape::group());

    assert!(matches!(shapes.get(ShapeId(42)), Err(RayTracerError::UnknownShape(_))));
    assert!(matches!(shapes.attach(g, ShapeId(42)), Err(RayTracerError::UnknownShape(_))));
}

#[test]
fn removing_a_group_frees_its_subtree() {
    let mut shapes = ShapeArena::new();
    let outer = shapes.add_root(Shape::group());
    let inner = shapes.add_child(outer, Shape::group()).unwrap();
    let leaf = shapes.add_child(inner, Shape::sphere()).unwrap();
    let other = shapes.add_root(Shape::cube());

    shapes.remove(inner).unwrap();

    assert!(shapes.children(outer).unwrap().is_empty());
    assert!(shapes.get(inner).is_err());
    assert!(shapes.get(leaf).is_err());
    assert_eq!(shapes.len(), 2);

    shapes.remove(outer).unwrap();
    assert_eq!(shapes.roots(), &[other]);
}

#[test]
fn intersecting_ray_with_empty_group() {
    let mut shapes = ShapeArena::new();
    let g = shapes.add_root(Shape::group());
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );

    assert!(shapes.intersect(g, &r).is_empty());
}

#[test]
fn intersecting_ray_with_nonempty_group() {
    let mut shapes = ShapeArena::new();
    let g = shapes.add_root(Shape::group());
    let s1 = shapes.add_child(g, Shape::sphere()).unwrap();
    let s2 = shapes.add_child(g,
        Shape::sphere().with_transform(Matrix4D::translation(0.0, 0.0, -3.0)).unwrap()
    ).unwrap();
    shapes.add_child(g,
        Shape::sphere().with_transform(Matrix4D::translation(5.0, 0.0, 0.0)).unwrap()
    ).unwrap();

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let xs = shapes.intersect(g, &r);
    let objects: Vec<ShapeId> = xs.iter().map(|i| i.object).collect();

    assert_eq!(objects, vec![s2, s2, s1, s1]);
}

#[test]
fn intersecting_a_transformed_group() {
    let mut shapes = ShapeArena::new();
    let g = shapes.add_root(
        Shape::group().with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap()
    );
    shapes.add_child(g,
        Shape::sphere().with_transform(Matrix4D::translation(5.0, 0.0, 0.0)).unwrap()
    ).unwrap();

    let r = Ray4D::new(
        Tuple4D::point(10.0, 0.0, -10.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );

    assert_eq!(shapes.intersect(g, &r).len(), 2);
}

#[test]
fn intersecting_scaled_and_translated_spheres() {
    let mut shapes = ShapeArena::new();
    let scaled = shapes.add_root(
        Shape::sphere().with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap()
    );
    let moved = shapes.add_root(
        Shape::sphere().with_transform(Matrix4D::translation(5.0, 0.0, 0.0)).unwrap()
    );
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );

    let xs = shapes.intersect(scaled, &r);
    assert_eq!(xs.len(), 2);
    assert_eq!(xs[0].t, 3.0);
    assert_eq!(xs[1].t, 7.0);

    assert!(shapes.intersect(moved, &r).is_empty());
}

#[test]
fn normal_on_transformed_spheres() {
    let mut shapes = ShapeArena::new();
    let moved = shapes.add_root(
        Shape::sphere().with_transform(Matrix4D::translation(0.0, 1.0, 0.0)).unwrap()
    );
    let squashed = shapes.add_root(
        Shape::sphere().with_transform(
            Matrix4D::scaling(1.0, 0.5, 1.0) * Matrix4D::rotation_z(PI / 5.0)
        ).unwrap()
    );
    let k = 2.0f64.sqrt() / 2.0;

    assert_eq!(shapes.normal_at(moved, Tuple4D::point(0.0, 1.70711, -0.70711)),
        Tuple4D::vector(0.0, 0.70711, -0.70711));
    assert_eq!(shapes.normal_at(squashed, Tuple4D::point(0.0, k, -k)),
        Tuple4D::vector(0.0, 0.97014, -0.24254));
}

#[test]
fn converting_between_world_and_object_space() {
    let mut shapes = ShapeArena::new();
    let g1 = shapes.add_root(
        Shape::group().with_transform(Matrix4D::rotation_y(PI / 2.0)).unwrap()
    );
    let g2 = shapes.add_child(g1,
        Shape::group().with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap()
    ).unwrap();
    let s = shapes.add_child(g2,
        Shape::sphere().with_transform(Matrix4D::translation(5.0, 0.0, 0.0)).unwrap()
    ).unwrap();

    let world = Tuple4D::point(-2.0, 0.0, -10.0);
    let object = shapes.world_to_object(s, world);
    assert_eq!(object, Tuple4D::point(0.0, 0.0, -1.0));
    assert_eq!(shapes.object_to_world(s, object), world);

    let k = 3.0f64.sqrt() / 3.0;
    assert_eq!(shapes.normal_to_world(s, Tuple4D::vector(k, k, k)),
        Tuple4D::vector(0.28571, 0.42857, -0.85714));
}

#[test]
fn finding_the_normal_on_a_child_object() {
    let mut shapes = ShapeArena::new();
    let g1 = shapes.add_root(
        Shape::group().with_transform(Matrix4D::rotation_y(PI / 2.0)).unwrap()
    );
    let g2 = shapes.add_child(g1,
        Shape::group().with_transform(Matrix4D::scaling(1.0, 2.0, 3.0)).unwrap()
    ).unwrap();
    let s = shapes.add_child(g2,
        Shape::sphere().with_transform(Matrix4D::translation(5.0, 0.0, 0.0)).unwrap()
    ).unwrap();

    assert_eq!(shapes.normal_at(s, Tuple4D::point(1.7321, 1.1547, -5.5774)),
        Tuple4D::vector(0.28570, 0.42854, -0.85716));
}

#[test]
fn changing_a_group_transform_moves_its_children() {
    let mut shapes = ShapeArena::new();
    let g = shapes.add_root(Shape::group());
    let s = shapes.add_child(g, Shape::sphere()).unwrap();

    shapes.set_transform(g, Matrix4D::translation(0.0, 0.0, 10.0)).unwrap();

    assert_eq!(shapes.world_to_object(s, Tuple4D::point(0.0, 0.0, 10.0)),
        Tuple4D::point(0.0, 0.0, 0.0));
    assert!(shapes.set_transform(g, Matrix4D::zero()).is_err());
}

#[test]
fn group_bounds_enclose_transformed_children() {
    let mut shapes = ShapeArena::new();
    let g = shapes.add_root(Shape::group());
    shapes.add_child(g,
        Shape::sphere().with_transform(
            Matrix4D::translation(2.0, 5.0, -3.0) * Matrix4D::scaling(2.0, 2.0, 2.0)
        ).unwrap()
    ).unwrap();
    shapes.add_child(g,
        Shape::bounded_cylinder(-2.0, 2.0).with_transform(
            Matrix4D::translation(-4.0, -1.0, 4.0) * Matrix4D::scaling(0.5, 1.0, 0.5)
        ).unwrap()
    ).unwrap();

    assert_eq!(shapes.bounds(g), Bounds::new(-4.5, -3.0, -5.0, 4.0, 7.0, 4.5));
}

#[test]
fn hexagon_has_six_sides() {
    let mut shapes = ShapeArena::new();
    let hex = shapes.hexagon().unwrap();
    shapes.attach_root(hex).unwrap();

    assert_eq!(shapes.children(hex).unwrap().len(), 6);
    for &side in shapes.children(hex).unwrap() {
        assert_eq!(shapes.children(side).unwrap().len(), 2);
    }
    assert_eq!(shapes.len(), 1 + 6 * 3);

    // The corner spheres sit on a ring of radius 1 around the Y axis.
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    assert!(shapes.intersect(hex, &r).hit().is_some());
}

#[test]
fn octree_group_splits_by_octant() {
    let mut shapes = ShapeArena::new();
    let mut spheres = Vec::new();
    for &(x, y, z) in &[(-5.0, -5.0, -5.0), (5.0, 5.0, 5.0), (5.0, -5.0, 5.0)] {
        spheres.push(shapes.insert(
            Shape::sphere().with_transform(Matrix4D::translation(x, y, z)).unwrap()
        ));
    }

    let root = shapes.octree_group(&spheres, 3).unwrap().unwrap();
    assert_eq!(shapes.children(root).unwrap().len(), 3);
    assert!(spheres.iter().all(|&s| shapes.is_owned(s)));

    assert_eq!(shapes.octree_group(&[], 3).unwrap(), None);

    let flat = shapes.insert(Shape::sphere());
    let single = shapes.octree_group(&[flat], 0).unwrap().unwrap();
    assert_eq!(shapes.children(single).unwrap(), &[flat]);
}
