use crate::ray::Ray4D;
use crate::bounds::Bounds;
use crate::shape::ShapeId;
use crate::arena::ShapeArena;
use crate::intersect::Intersections;

/// A node of the tree. Bounds are in the owning partition's object space.
#[derive(Clone, Debug)]
enum Node {
    Leaf {
        bounds: Bounds,
        shapes: Vec<ShapeId>,
    },
    Branch {
        bounds: Bounds,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn bounds(&self) -> &Bounds {
        match self {
            Node::Leaf { bounds, .. } | Node::Branch { bounds, .. } => bounds,
        }
    }
}

/// A k-d tree over the children of a partition.
///
/// Built by recursive median splits: at each node, children are ordered by
/// the center of their bounds along the axis where those centers spread the
/// most, and divided into two halves of equal count. Recursion stops at
/// `max_depth`, at a single child, or when every center coincides.
///
/// A ray only visits nodes whose bounds its *line* crosses, regardless of
/// the sign of `t`, so the tree reports exactly what a plain group would,
/// negative hits included.
#[derive(Clone, Debug)]
pub struct KdTree {
    children: Vec<ShapeId>,
    root: Node,
    max_depth: usize,
}

impl KdTree {
    /// An empty tree.
    pub fn new(max_depth: usize) -> KdTree {
        KdTree {
            children: Vec::new(),
            root: Node::Leaf { bounds: Bounds::empty(), shapes: Vec::new() },
            max_depth,
        }
    }

    /// Builds a tree over `children`, whose bounds are looked up in
    /// `shapes`.
    pub fn build(shapes: &ShapeArena, children: Vec<ShapeId>, max_depth: usize)
        -> KdTree {
        let mut entries: Vec<(ShapeId, Bounds)> = children.iter()
            .map(|&id| (id, shapes.parent_space_bounds(id)))
            .collect();

        let root = build_node(&mut entries, 0, max_depth);
        let tree = KdTree { children, root, max_depth };

        log::debug!(
            "built k-d tree over {} shapes: {} leaves, depth {}",
            tree.children.len(), tree.leaf_count(), tree.depth()
        );

        tree
    }

    /// Every child, in insertion order.
    pub fn children(&self) -> &[ShapeId] {
        &self.children
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Bounds of all children.
    pub fn bounds(&self) -> Bounds {
        *self.root.bounds()
    }

    pub fn leaf_count(&self) -> usize {
        fn count(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 1,
                Node::Branch { left, right, .. } => count(left) + count(right),
            }
        }

        count(&self.root)
    }

    /// Number of levels below the root.
    pub fn depth(&self) -> usize {
        fn depth(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Branch { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }

        depth(&self.root)
    }

    /// Records a new child. The tree is stale until the arena rebuilds it.
    pub(crate) fn push_child(&mut self, id: ShapeId) {
        self.children.push(id);
    }

    /// Forgets a child. The tree is stale until the arena rebuilds it.
    pub(crate) fn remove_child(&mut self, id: ShapeId) {
        self.children.retain(|&c| c != id);
    }

    /// Intersects a ray, already in the partition's object space, with every
    /// child whose node the ray crosses. The result is sorted by `t`.
    pub fn intersect(&self, shapes: &ShapeArena, ray: &Ray4D) -> Intersections {
        let mut xs = Intersections::new();
        let mut pending = vec![&self.root];

        while let Some(node) = pending.pop() {
            if !node.bounds().intersects(ray) {
                continue;
            }

            match node {
                Node::Leaf { shapes: ids, .. } => {
                    for &id in ids {
                        xs += shapes.intersect(id, ray);
                    }
                },
                Node::Branch { left, right, .. } => {
                    pending.push(right);
                    pending.push(left);
                },
            }
        }

        xs.sort();
        xs
    }
}

fn build_node(entries: &mut [(ShapeId, Bounds)], depth: usize, max_depth: usize)
    -> Node {
    let mut bounds = Bounds::empty();
    let mut centers = Bounds::empty();
    for (_, b) in entries.iter() {
        bounds += b;
        centers.add_point(b.center());
    }

    let leaf = |entries: &[(ShapeId, Bounds)]| Node::Leaf {
        bounds,
        shapes: entries.iter().map(|(id, _)| *id).collect(),
    };

    if depth >= max_depth || entries.len() <= 1 {
        return leaf(entries);
    }

    // All centers coincide (or are undefined); no split can separate them.
    let axis = centers.longest_axis();
    if centers.is_empty() || centers.minimum.axis(axis) == centers.maximum.axis(axis) {
        return leaf(entries);
    }

    let mid = entries.len() / 2;
    entries.select_nth_unstable_by(mid, |a, b|
        a.1.center().axis(axis).total_cmp(&b.1.center().axis(axis))
    );

    let (lower, upper) = entries.split_at_mut(mid);
    Node::Branch {
        bounds,
        left: Box::new(build_node(lower, depth + 1, max_depth)),
        right: Box::new(build_node(upper, depth + 1, max_depth)),
    }
}

#[cfg(test)]
fn random_scene(seed: u64, count: usize) -> (ShapeArena, Vec<ShapeId>) {
    use rand::{ Rng, SeedableRng, rngs::StdRng };
    use crate::shape::Shape;
    use crate::matrix::Matrix4D;
    use crate::tuple::Tuple4D;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut shapes = ShapeArena::new();
    let mut ids = Vec::new();

    for i in 0..count {
        let (x, y, z) = (
            rng.random_range(-10.0..10.0),
            rng.random_range(-10.0..10.0),
            rng.random_range(-10.0..10.0),
        );

        let shape = if i % 2 == 0 {
            let r = rng.random_range(0.2..1.5);
            Shape::sphere().with_transform(
                Matrix4D::translation(x, y, z) * Matrix4D::scaling(r, r, r)
            ).unwrap()
        } else {
            let mut corner = || Tuple4D::point(
                x + rng.random_range(-1.5..1.5),
                y + rng.random_range(-1.5..1.5),
                z + rng.random_range(-1.5..1.5),
            );
            let (p1, p2, p3) = (corner(), corner(), corner());
            Shape::triangle(p1, p2, p3)
        };

        ids.push(shapes.insert(shape));
    }

    (shapes, ids)
}

#[test]
fn partition_matches_naive_group() {
    use rand::{ Rng, SeedableRng, rngs::StdRng };
    use crate::shape::Shape;
    use crate::tuple::Tuple4D;

    let (mut naive, naive_ids) = random_scene(7, 120);
    let group = naive.add_root(Shape::group());
    for id in naive_ids {
        naive.attach(group, id).unwrap();
    }

    let (mut split, split_ids) = random_scene(7, 120);
    let partition = split.partition_shapes(&split_ids, 6).unwrap();
    split.attach_root(partition).unwrap();

    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..300 {
        let origin = Tuple4D::point(
            rng.random_range(-15.0..15.0),
            rng.random_range(-15.0..15.0),
            rng.random_range(-15.0..15.0),
        );
        let target = Tuple4D::point(
            rng.random_range(-8.0..8.0),
            rng.random_range(-8.0..8.0),
            rng.random_range(-8.0..8.0),
        );
        let r = Ray4D::new(origin, (target - origin).normalize());

        let expected = naive.intersect(group, &r);
        let actual = split.intersect(partition, &r);

        // Both scenes insert shapes in the same order, so ids line up.
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert_eq!(a.object, e.object);
            assert!(crate::feq(a.t, e.t));
        }
    }
}

#[test]
fn partition_keeps_nearly_parallel_hits() {
    use crate::shape::Shape;
    use crate::tuple::Tuple4D;

    let scene = || {
        let mut shapes = ShapeArena::new();
        let g = shapes.add_root(Shape::group());
        shapes.add_child(g, Shape::sphere()).unwrap();
        (shapes, g)
    };
    let (naive, g) = scene();
    let (mut split, p) = scene();
    split.partition(p, 4).unwrap();

    // Starts just below the sphere's box and climbs into it very slowly.
    let r = Ray4D::new(
        Tuple4D::point(-1000.0, -1.0005, 0.0),
        Tuple4D::vector(1.0, 5e-6, 0.0).normalize()
    );

    let expected = naive.intersect(g, &r);
    let actual = split.intersect(p, &r);
    assert_eq!(expected.len(), 2);
    assert_eq!(actual, expected);
}

#[test]
fn partition_keeps_negative_hits() {
    use crate::shape::Shape;
    use crate::tuple::Tuple4D;
    use crate::matrix::Matrix4D;

    let mut shapes = ShapeArena::new();
    let mut ids = Vec::new();
    for x in -3..=3 {
        ids.push(shapes.insert(
            Shape::sphere()
                .with_transform(Matrix4D::translation(x as f64 * 3.0, 0.0, 0.0))
                .unwrap()
        ));
    }
    let p = shapes.partition_shapes(&ids, 4).unwrap();

    // Starts inside the middle sphere: the hits behind the origin remain.
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(1.0, 0.0, 0.0)
    );
    let xs = shapes.intersect(p, &r);

    assert_eq!(xs.len(), 14);
    assert_eq!(xs[0].t, -10.0);
    assert_eq!(xs.hit().map(|i| i.t), Some(1.0));
}

#[test]
fn tree_respects_max_depth() {
    let (mut shapes, ids) = random_scene(3, 64);
    let p = shapes.partition_shapes(&ids, 2).unwrap();

    match shapes[p].kind() {
        crate::shape::ShapeKind::Partition(tree) => {
            assert!(tree.depth() <= 2);
            assert_eq!(tree.leaf_count(), 4);
            assert_eq!(tree.children().len(), 64);
        },
        _ => panic!("expected a partition"),
    }
}

#[test]
fn partition_rebuilds_when_a_child_moves() {
    use crate::shape::Shape;
    use crate::tuple::Tuple4D;
    use crate::matrix::Matrix4D;

    let mut shapes = ShapeArena::new();
    let a = shapes.insert(Shape::sphere());
    let b = shapes.insert(
        Shape::sphere().with_transform(Matrix4D::translation(10.0, 0.0, 0.0)).unwrap()
    );
    let p = shapes.partition_shapes(&[a, b], 4).unwrap();

    shapes.set_transform(b, Matrix4D::translation(0.0, 20.0, 0.0)).unwrap();

    let r = Ray4D::new(
        Tuple4D::point(0.0, 20.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let xs = shapes.intersect(p, &r);
    assert_eq!(xs.len(), 2);
    assert!(xs.iter().all(|i| i.object == b));
    assert_eq!(shapes.bounds(p), crate::bounds::Bounds::new(
        -1.0, -1.0, -1.0, 1.0, 21.0, 1.0
    ));

    // Children attached later are indexed too.
    let c = shapes.add_child(p,
        Shape::sphere().with_transform(Matrix4D::translation(0.0, -20.0, 0.0)).unwrap()
    ).unwrap();
    let r = Ray4D::new(
        Tuple4D::point(0.0, -20.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    assert_eq!(shapes.intersect(p, &r).hit().map(|i| i.object), Some(c));
}

#[test]
fn partitioning_a_primitive_fails() {
    use crate::shape::Shape;

    let mut shapes = ShapeArena::new();
    let s = shapes.add_root(Shape::sphere());

    assert!(matches!(
        shapes.partition(s, 4),
        Err(crate::RayTracerError::NotAGroup(_))
    ));
}
