use crate::feq;
use crate::consts::GLASS_RI;
use crate::color::Color;
use crate::pattern::Pattern;
use crate::tuple::Tuple4D;
use crate::shape::ShapeId;
use crate::arena::ShapeArena;

/// A point light: a position that emits light of a single color.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PointLight {
    pub intensity: Color,
    pub position: Tuple4D,
}

impl PointLight {
    /// Creates a point light. `position` is forced to be a point.
    pub fn new(intensity: Color, position: Tuple4D) -> PointLight {
        PointLight {
            intensity,
            position: Tuple4D { w: 1.0, ..position },
        }
    }
}

/// Surface attributes for the Phong reflection model (ambient, diffuse,
/// specular, shininess), plus reflection and refraction.
///
/// A material owns its pattern outright; copying a material copies the
/// pattern with it.
#[derive(Copy, Clone, Debug)]
pub struct Material {
    pub color: Color,
    pub pattern: Option<Pattern>,

    pub ambient: f64,
    pub diffuse: f64,
    pub specular: f64,
    pub shininess: f64,

    pub reflective: f64,
    pub transparency: f64,
    pub refractive_index: f64,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            color: Color::white(),
            pattern: None,

            ambient: 0.1,
            diffuse: 0.9,
            specular: 0.9,
            shininess: 200.0,

            reflective: 0.0,
            transparency: 0.0,
            refractive_index: 1.0,
        }
    }
}

impl PartialEq for Material {
    fn eq(&self, other: &Material) -> bool {
        self.color == other.color
            && self.pattern == other.pattern
            && feq(self.ambient, other.ambient)
            && feq(self.diffuse, other.diffuse)
            && feq(self.specular, other.specular)
            && feq(self.shininess, other.shininess)
            && feq(self.reflective, other.reflective)
            && feq(self.transparency, other.transparency)
            && feq(self.refractive_index, other.refractive_index)
    }
}

impl Material {
    /// Fully transparent glass.
    pub fn glass() -> Material {
        Material {
            transparency: 1.0,
            refractive_index: GLASS_RI,
            ..Default::default()
        }
    }
}

/// Shades a single point with the Phong reflection model.
///
/// The surface color comes from the material's pattern if it has one
/// (evaluated on `object`, hence the arena), otherwise from its flat color.
/// Points in shadow receive ambient light only. The result is not clamped.
#[allow(clippy::too_many_arguments)]
pub fn lighting(m: &Material, shapes: &ShapeArena, object: ShapeId,
    light: &PointLight, point: Tuple4D, eyev: Tuple4D, normalv: Tuple4D,
    in_shadow: bool) -> Color {
    let color = match m.pattern {
        Some(ref pattern) => pattern.pattern_at_shape(shapes, object, point),
        None => m.color,
    };

    let effective_color = color * light.intensity;
    let ambient = effective_color * m.ambient;

    if in_shadow {
        return ambient;
    }

    let lightv = (light.position - point).normalize();
    let light_dot_normal = lightv.dot(&normalv);

    // The light is on the other side of the surface.
    if light_dot_normal < 0.0 {
        return ambient;
    }

    let diffuse = effective_color * m.diffuse * light_dot_normal;

    let reflectv = (-lightv).reflect(&normalv);
    let reflect_dot_eye = reflectv.dot(&eyev);
    let specular = if reflect_dot_eye <= 0.0 {
        Color::black()
    } else {
        light.intensity * m.specular * reflect_dot_eye.powf(m.shininess)
    };

    ambient + diffuse + specular
}

/// Shades the origin of a default sphere, lit from `light_position`.
#[cfg(test)]
fn shade_origin(eyev: Tuple4D, light_position: Tuple4D, in_shadow: bool)
    -> Color {
    use crate::shape::Shape;

    let mut shapes = ShapeArena::new();
    let s = shapes.add_root(Shape::sphere());
    let light = PointLight::new(Color::white(), light_position);

    lighting(&Material::default(), &shapes, s, &light,
        Tuple4D::point(0.0, 0.0, 0.0), eyev,
        Tuple4D::vector(0.0, 0.0, -1.0), in_shadow)
}

#[test]
fn default_material() {
    let m = Material::default();

    assert_eq!(m.color, Color::white());
    assert_eq!(m.ambient, 0.1);
    assert_eq!(m.diffuse, 0.9);
    assert_eq!(m.specular, 0.9);
    assert_eq!(m.shininess, 200.0);
    assert_eq!(m.reflective, 0.0);
    assert_eq!(m.transparency, 0.0);
    assert_eq!(m.refractive_index, 1.0);
    assert_ne!(m, Material::glass());
}

#[test]
fn eye_between_light_and_surface() {
    let res = shade_origin(Tuple4D::vector(0.0, 0.0, -1.0),
        Tuple4D::point(0.0, 0.0, -10.0), false);

    assert_eq!(res, Color::rgb(1.9, 1.9, 1.9));
}

#[test]
fn eye_between_light_and_surface_offset_45() {
    let k = 2.0f64.sqrt() / 2.0;
    let res = shade_origin(Tuple4D::vector(0.0, k, -k),
        Tuple4D::point(0.0, 0.0, -10.0), false);

    assert_eq!(res, Color::rgb(1.0, 1.0, 1.0));
}

#[test]
fn eye_opposite_surface_light_offset_45() {
    let res = shade_origin(Tuple4D::vector(0.0, 0.0, -1.0),
        Tuple4D::point(0.0, 10.0, -10.0), false);

    assert_eq!(res, Color::rgb(0.7364, 0.7364, 0.7364));
}

#[test]
fn eye_in_path_of_reflection() {
    let k = 2.0f64.sqrt() / 2.0;
    let res = shade_origin(Tuple4D::vector(0.0, -k, -k),
        Tuple4D::point(0.0, 10.0, -10.0), false);

    assert_eq!(res, Color::rgb(1.6364, 1.6364, 1.6364));
}

#[test]
fn light_behind_surface() {
    let res = shade_origin(Tuple4D::vector(0.0, 0.0, -1.0),
        Tuple4D::point(0.0, 0.0, 10.0), false);

    assert_eq!(res, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn surface_in_shadow() {
    let res = shade_origin(Tuple4D::vector(0.0, 0.0, -1.0),
        Tuple4D::point(0.0, 0.0, -10.0), true);

    assert_eq!(res, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn lighting_with_stripe_pattern() {
    use crate::shape::Shape;

    let m = Material {
        pattern: Some(Pattern::stripe(Color::white(), Color::black())),
        ambient: 1.0,
        diffuse: 0.0,
        specular: 0.0,
        ..Default::default()
    };

    let mut shapes = ShapeArena::new();
    let s = shapes.add_root(Shape::sphere().with_material(m));
    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::white(), Tuple4D::point(0.0, 0.0, -10.0));

    assert_eq!(
        lighting(&m, &shapes, s, &light, Tuple4D::point(0.9, 0.0, 0.0),
            eyev, normalv, false),
        Color::white()
    );
    assert_eq!(
        lighting(&m, &shapes, s, &light, Tuple4D::point(1.1, 0.0, 0.0),
            eyev, normalv, false),
        Color::black()
    );
}
