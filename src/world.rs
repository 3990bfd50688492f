use crate::ray::Ray4D;
use crate::tuple::Tuple4D;
use crate::color::Color;
use crate::matrix::Matrix4D;
use crate::light::{ PointLight, Material, lighting };
use crate::shape::{ Shape, ShapeId };
use crate::arena::ShapeArena;
use crate::intersect::{ Intersections, IntersectionComputation };

/// A world: every shape in the scene, plus a single light.
///
/// Most of the ray tracer's logic happens here. A ray is intersected with
/// every root shape, the closest hit is shaded, and reflected or refracted
/// rays recurse back into `color_at` until `remaining` runs out.
#[derive(Clone, Debug)]
pub struct World {
    pub shapes: ShapeArena,
    pub light_source: Option<PointLight>,
}

/// Two concentric spheres lit from the upper left, the usual fixture for
/// shading tests.
impl Default for World {
    fn default() -> World {
        let mut shapes = ShapeArena::new();

        shapes.add_root(Shape::sphere().with_material(Material {
            color: Color::rgb(0.8, 1.0, 0.6),
            diffuse: 0.7,
            specular: 0.2,
            ..Default::default()
        }));

        let inner = match Shape::sphere()
            .with_transform(Matrix4D::scaling(0.5, 0.5, 0.5)) {
            Ok(inner) => inner,
            Err(_) => unreachable!("uniform scaling is invertible"),
        };
        shapes.add_root(inner);

        World {
            shapes,
            light_source: Some(PointLight::new(
                Color::white(),
                Tuple4D::point(-10.0, 10.0, -10.0)
            )),
        }
    }
}

impl World {
    /// A world with no shapes and no light.
    pub fn empty() -> World {
        World { shapes: ShapeArena::new(), light_source: None }
    }

    /// The first root shape, if any.
    pub fn first(&self) -> Option<ShapeId> {
        self.shapes.roots().first().copied()
    }

    /// The second root shape, if any.
    pub fn second(&self) -> Option<ShapeId> {
        self.shapes.roots().get(1).copied()
    }

    /// Adds a shape at the top level of the world.
    pub fn add(&mut self, shape: Shape) -> ShapeId {
        self.shapes.add_root(shape)
    }

    /// Intersects a ray with every shape, sorted by `t`.
    pub fn intersect(&self, r: &Ray4D) -> Intersections {
        let mut xs = Intersections::new();
        for &root in self.shapes.roots() {
            xs += self.shapes.intersect(root, r);
        }

        xs.sort();
        xs
    }

    /// Whether something lies between `p` and the light. Without a light,
    /// everything is in shadow.
    pub fn is_shadowed(&self, p: Tuple4D) -> bool {
        let light = match self.light_source {
            Some(ref light) => light,
            None => return true,
        };

        let v = light.position - p;
        let distance = v.magnitude();
        let r = Ray4D::new(p, v.normalize());

        match self.intersect(&r).hit() {
            Some(i) => i.t < distance,
            None => false,
        }
    }

    /// The color at a hit: surface lighting, plus reflection and refraction.
    ///
    /// When a material is both reflective and transparent, the two are
    /// blended with the Schlick approximation.
    pub fn shade_hit(&self, comps: &IntersectionComputation, remaining: usize)
        -> Color {
        let material = &self.shapes[comps.object].material;

        let surface = match self.light_source {
            Some(ref light) => lighting(material, &self.shapes, comps.object,
                light, comps.over_point, comps.eyev, comps.normalv,
                self.is_shadowed(comps.over_point)),
            None => Color::black(),
        };

        let reflected = self.reflected_color(comps, remaining);
        let refracted = self.refracted_color(comps, remaining);

        if material.reflective > 0.0 && material.transparency > 0.0 {
            let reflectance = comps.schlick();
            surface + reflected * reflectance + refracted * (1.0 - reflectance)
        } else {
            surface + reflected + refracted
        }
    }

    /// The color seen along a ray; black if nothing is hit.
    pub fn color_at(&self, r: &Ray4D, remaining: usize) -> Color {
        let xs = self.intersect(r);

        match xs.hit() {
            Some(hit) => {
                let comps = IntersectionComputation::new(
                    r, &hit, Some(&xs), &self.shapes
                );
                self.shade_hit(&comps, remaining)
            },
            None => Color::black(),
        }
    }

    pub fn reflected_color(&self, comps: &IntersectionComputation,
        remaining: usize) -> Color {
        let reflective = self.shapes[comps.object].material.reflective;
        if remaining == 0 || reflective == 0.0 {
            return Color::black();
        }

        let reflect_ray = Ray4D::new(comps.over_point, comps.reflectv);
        self.color_at(&reflect_ray, remaining - 1) * reflective
    }

    pub fn refracted_color(&self, comps: &IntersectionComputation,
        remaining: usize) -> Color {
        let transparency = self.shapes[comps.object].material.transparency;
        if remaining == 0 || transparency == 0.0 {
            return Color::black();
        }

        // Snell's law.
        let n_ratio = comps.n1 / comps.n2;
        let cos_i = comps.eyev.dot(&comps.normalv);
        let sin2_t = n_ratio.powi(2) * (1.0 - cos_i.powi(2));

        // Total internal reflection.
        if sin2_t > 1.0 {
            return Color::black();
        }

        let cos_t = (1.0 - sin2_t).sqrt();
        let direction = comps.normalv * (n_ratio * cos_i - cos_t)
            - comps.eyev * n_ratio;

        let refract_ray = Ray4D::new(comps.under_point, direction);
        self.color_at(&refract_ray, remaining - 1) * transparency
    }
}

#[cfg(test)]
use crate::intersect::Intersection;

#[cfg(test)]
use crate::consts::MAX_RECURSION_DEPTH;

#[test]
fn default_world() {
    let w = World::default();

    assert_eq!(w.shapes.roots().len(), 2);
    assert_eq!(w.light_source.map(|l| l.position),
        Some(Tuple4D::point(-10.0, 10.0, -10.0)));
    assert_eq!(w.shapes[w.first().unwrap()].material.color,
        Color::rgb(0.8, 1.0, 0.6));
    assert_eq!(*w.shapes[w.second().unwrap()].transform(),
        Matrix4D::scaling(0.5, 0.5, 0.5));

    let empty = World::empty();
    assert!(empty.shapes.is_empty());
    assert!(empty.light_source.is_none());
}

#[test]
fn intersect_default_world_with_ray() {
    let w = World::default();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    let ts: Vec<f64> = w.intersect(&r).iter().map(|i| i.t).collect();
    assert_eq!(ts, vec![4.0, 4.5, 5.5, 6.0]);
}

#[test]
fn shade_intersection_from_outside() {
    let w = World::default();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let i = Intersection::new(4.0, w.first().unwrap());
    let comps = IntersectionComputation::new(&r, &i, None, &w.shapes);

    assert_eq!(w.shade_hit(&comps, MAX_RECURSION_DEPTH),
        Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn shade_intersection_from_inside() {
    let mut w = World::default();
    w.light_source = Some(PointLight::new(
        Color::white(),
        Tuple4D::point(0.0, 0.25, 0.0),
    ));
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );
    let i = Intersection::new(0.5, w.second().unwrap());
    let comps = IntersectionComputation::new(&r, &i, None, &w.shapes);

    assert_eq!(w.shade_hit(&comps, MAX_RECURSION_DEPTH),
        Color::rgb(0.90498, 0.90498, 0.90498));
}

#[test]
fn shade_intersection_in_shadow() {
    let mut w = World::empty();
    w.light_source = Some(PointLight::new(
        Color::white(),
        Tuple4D::point(0.0, 0.0, -10.0),
    ));
    w.add(Shape::sphere());
    let s2 = w.add(
        Shape::sphere().with_transform(Matrix4D::translation(0.0, 0.0, 10.0)).unwrap()
    );

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );
    let comps = IntersectionComputation::new(
        &r, &Intersection::new(4.0, s2), None, &w.shapes
    );

    assert_eq!(w.shade_hit(&comps, MAX_RECURSION_DEPTH), Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn color_when_ray_misses_or_hits() {
    let w = World::default();

    let miss = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 1.0, 0.0),
    );
    assert_eq!(w.color_at(&miss, MAX_RECURSION_DEPTH), Color::black());

    let hit = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );
    assert_eq!(w.color_at(&hit, MAX_RECURSION_DEPTH),
        Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn color_with_intersection_behind_ray() {
    let mut w = World::default();
    let outer = w.first().unwrap();
    let inner = w.second().unwrap();
    w.shapes.material_mut(outer).unwrap().ambient = 1.0;
    w.shapes.material_mut(inner).unwrap().ambient = 1.0;

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.75),
        Tuple4D::vector(0.0, 0.0, -1.0)
    );

    assert_eq!(w.color_at(&r, MAX_RECURSION_DEPTH),
        w.shapes[inner].material.color);
}

#[test]
fn shadows_in_default_world() {
    let w = World::default();

    // Nothing collinear with point and light.
    assert!(!w.is_shadowed(Tuple4D::point(0.0, 10.0, 0.0)));
    // Object between point and light.
    assert!(w.is_shadowed(Tuple4D::point(10.0, -10.0, 10.0)));
    // Object behind the light.
    assert!(!w.is_shadowed(Tuple4D::point(-20.0, 20.0, -20.0)));
    // Object behind the point.
    assert!(!w.is_shadowed(Tuple4D::point(-2.0, 2.0, -2.0)));
}

#[test]
fn world_without_light_is_dark() {
    let mut w = World::default();
    w.light_source = None;
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    assert!(w.is_shadowed(Tuple4D::point(0.0, 10.0, 0.0)));
    assert_eq!(w.color_at(&r, MAX_RECURSION_DEPTH), Color::black());
}

#[test]
fn reflected_color_for_nonreflective_material() {
    let mut w = World::default();
    let inner = w.second().unwrap();
    w.shapes.material_mut(inner).unwrap().ambient = 1.0;

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let comps = IntersectionComputation::new(
        &r, &Intersection::new(1.0, inner), None, &w.shapes
    );

    assert_eq!(w.reflected_color(&comps, MAX_RECURSION_DEPTH), Color::black());
}

#[cfg(test)]
fn world_with_reflective_floor() -> (World, ShapeId) {
    let mut w = World::default();
    let mut floor = Shape::plane()
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0)).unwrap();
    floor.material.reflective = 0.5;
    let floor = w.add(floor);

    (w, floor)
}

#[test]
fn reflected_color_for_reflective_material() {
    let (w, floor) = world_with_reflective_floor();
    let k = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -3.0),
        Tuple4D::vector(0.0, -k, k)
    );
    let comps = IntersectionComputation::new(
        &r, &Intersection::new(2.0f64.sqrt(), floor), None, &w.shapes
    );

    assert_eq!(w.reflected_color(&comps, MAX_RECURSION_DEPTH),
        Color::rgb(0.19032, 0.2379, 0.14274));
    assert_eq!(w.shade_hit(&comps, MAX_RECURSION_DEPTH),
        Color::rgb(0.87677, 0.92436, 0.82918));
    assert_eq!(w.reflected_color(&comps, 0), Color::black());
}

#[test]
fn mutually_reflective_surfaces_terminate() {
    let mut w = World::empty();
    w.light_source = Some(PointLight::new(
        Color::white(), Tuple4D::point(0.0, 0.0, 0.0)
    ));

    for y in &[-1.0, 1.0] {
        let mut plane = Shape::plane()
            .with_transform(Matrix4D::translation(0.0, *y, 0.0)).unwrap();
        plane.material.reflective = 1.0;
        w.add(plane);
    }

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0)
    );

    // Terminates; each bounce adds ambient and reflected light.
    let c = w.color_at(&r, MAX_RECURSION_DEPTH);
    assert!(c.r > 0.0);
}

#[test]
fn refracted_color_of_opaque_surface_or_at_max_depth() {
    let mut w = World::default();
    let s = w.first().unwrap();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let xs: Intersections = vec![
        Intersection::new(4.0, s), Intersection::new(6.0, s)
    ].into();

    let comps = IntersectionComputation::new(&r, &xs[0], Some(&xs), &w.shapes);
    assert_eq!(w.refracted_color(&comps, MAX_RECURSION_DEPTH), Color::black());

    let m = w.shapes.material_mut(s).unwrap();
    m.transparency = 1.0;
    m.refractive_index = 1.5;
    let comps = IntersectionComputation::new(&r, &xs[0], Some(&xs), &w.shapes);
    assert_eq!(w.refracted_color(&comps, 0), Color::black());
}

#[test]
fn refracted_color_under_total_internal_reflection() {
    let mut w = World::default();
    let s = w.first().unwrap();
    let m = w.shapes.material_mut(s).unwrap();
    m.transparency = 1.0;
    m.refractive_index = 1.5;

    let k = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, k),
        Tuple4D::vector(0.0, 1.0, 0.0)
    );
    let xs: Intersections = vec![
        Intersection::new(-k, s), Intersection::new(k, s)
    ].into();
    let comps = IntersectionComputation::new(&r, &xs[1], Some(&xs), &w.shapes);

    assert_eq!(w.refracted_color(&comps, MAX_RECURSION_DEPTH), Color::black());
}

#[test]
fn refracted_color_with_refracted_ray() {
    use crate::pattern::Pattern;

    let mut w = World::default();
    let a = w.first().unwrap();
    let b = w.second().unwrap();

    let ma = w.shapes.material_mut(a).unwrap();
    ma.ambient = 1.0;
    ma.pattern = Some(Pattern::test());

    let mb = w.shapes.material_mut(b).unwrap();
    mb.transparency = 1.0;
    mb.refractive_index = 1.5;

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.1),
        Tuple4D::vector(0.0, 1.0, 0.0)
    );
    let xs: Intersections = vec![
        Intersection::new(-0.9899, a),
        Intersection::new(-0.4899, b),
        Intersection::new(0.4899, b),
        Intersection::new(0.9899, a),
    ].into();
    let comps = IntersectionComputation::new(&r, &xs[2], Some(&xs), &w.shapes);

    assert_eq!(w.refracted_color(&comps, MAX_RECURSION_DEPTH),
        Color::rgb(0.0, 0.99888, 0.04725));
}

#[cfg(test)]
fn world_with_glass_floor(reflective: f64) -> (World, ShapeId) {
    let mut w = World::default();

    let mut floor = Shape::plane()
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0)).unwrap();
    floor.material.reflective = reflective;
    floor.material.transparency = 0.5;
    floor.material.refractive_index = 1.5;
    let floor = w.add(floor);

    let mut ball = Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, -3.5, -0.5)).unwrap();
    ball.material.color = Color::red();
    ball.material.ambient = 0.5;
    w.add(ball);

    (w, floor)
}

#[test]
fn shade_hit_with_transparent_material() {
    let (w, floor) = world_with_glass_floor(0.0);
    let k = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -3.0),
        Tuple4D::vector(0.0, -k, k)
    );
    let xs: Intersections = vec![Intersection::new(2.0f64.sqrt(), floor)].into();
    let comps = IntersectionComputation::new(&r, &xs[0], Some(&xs), &w.shapes);

    assert_eq!(w.shade_hit(&comps, MAX_RECURSION_DEPTH),
        Color::rgb(0.93642, 0.68642, 0.68642));
}

#[test]
fn shade_hit_with_reflective_transparent_material() {
    let (w, floor) = world_with_glass_floor(0.5);
    let k = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -3.0),
        Tuple4D::vector(0.0, -k, k)
    );
    let xs: Intersections = vec![Intersection::new(2.0f64.sqrt(), floor)].into();
    let comps = IntersectionComputation::new(&r, &xs[0], Some(&xs), &w.shapes);

    assert_eq!(w.shade_hit(&comps, MAX_RECURSION_DEPTH),
        Color::rgb(0.93391, 0.69643, 0.69243));
}

#[test]
fn partitioned_world_renders_like_grouped_world() {
    let mut grouped = World::default();
    let mut split = World::default();

    for w in [&mut grouped, &mut split].iter_mut() {
        let g = w.add(Shape::group());
        for x in -2..=2 {
            w.shapes.add_child(g,
                Shape::sphere().with_transform(
                    Matrix4D::translation(x as f64 * 2.5, 0.0, 3.0)
                ).unwrap()
            ).unwrap();
        }
    }
    let g = *split.shapes.roots().last().unwrap();
    split.shapes.partition(g, 4).unwrap();

    for x in -6..=6 {
        let r = Ray4D::new(
            Tuple4D::point(x as f64, 0.3, -5.0),
            Tuple4D::vector(0.0, 0.0, 1.0)
        );
        assert_eq!(grouped.color_at(&r, MAX_RECURSION_DEPTH),
            split.color_at(&r, MAX_RECURSION_DEPTH));
    }
}
