use std::path::PathBuf;
use std::f64::consts::PI;

use anyhow::{ Context, Result };
use clap::Parser;

use raytracer::consts::EPSILON;
use raytracer::tuple::Tuple4D;
use raytracer::matrix::Matrix4D;
use raytracer::color::Color;
use raytracer::pattern::Pattern;
use raytracer::light::{ PointLight, Material };
use raytracer::bounds::Bounds;
use raytracer::shape::Shape;
use raytracer::world::World;
use raytracer::camera::Camera;
use raytracer::obj::ObjParser;
use raytracer::config::{ RenderConfig, DemoScene };

/// Renders one of the built-in scenes to a PPM image.
#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// JSON render configuration; flags below override its fields
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Width (in pixels) of the output image
    #[clap(long, value_parser)]
    width: Option<usize>,

    /// Height (in pixels) of the output image
    #[clap(long, value_parser)]
    height: Option<usize>,

    /// Field of view of the camera in radians
    #[clap(long, value_parser)]
    fov: Option<f64>,

    /// Maximum number of reflection/refraction bounces
    #[clap(short, long, value_parser)]
    depth: Option<usize>,

    /// Which scene to render
    #[clap(short, long, value_enum)]
    scene: Option<DemoScene>,

    /// OBJ file rendered by the `mesh` scene
    #[clap(short, long, value_parser)]
    mesh: Option<PathBuf>,

    /// File name to write the image to
    #[clap(short, long, value_parser)]
    output: Option<PathBuf>,

    /// Do not draw a progress bar
    #[clap(long)]
    no_progress: bool,
}

impl Args {
    fn into_config(self) -> Result<RenderConfig> {
        let mut config = match self.config {
            Some(ref path) => RenderConfig::from_file(path)
                .with_context(|| format!("failed to load config {:?}", path))?,
            None => RenderConfig::default(),
        };

        if let Some(width) = self.width { config.width = width; }
        if let Some(height) = self.height { config.height = height; }
        if let Some(fov) = self.fov { config.field_of_view = fov; }
        if let Some(depth) = self.depth { config.max_depth = depth; }
        if let Some(scene) = self.scene { config.scene = scene; }
        if let Some(mesh) = self.mesh { config.mesh = Some(mesh); }
        if let Some(output) = self.output { config.output = output; }

        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let show_progress = !args.no_progress;
    let config = args.into_config()?;

    let (world, from, to) = match config.scene {
        DemoScene::Spheres => spheres()?,
        DemoScene::Hexagon => hexagon()?,
        DemoScene::Mesh => mesh(&config)?,
    };

    let camera = Camera::new(config.width, config.height, config.field_of_view)
        .with_transform(
            Matrix4D::view_transform(from, to, Tuple4D::vector(0.0, 1.0, 0.0))
        )?;

    let pb = if show_progress {
        let style = indicatif::ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {wide_bar:.cyan/blue} pixels shaded: {human_pos}/{human_len} {percent}% ({eta})",
        )?;
        indicatif::ProgressBar::new((config.width * config.height) as u64)
            .with_style(style)
    } else {
        indicatif::ProgressBar::hidden()
    };

    let canvas = camera.render_with_progress(&world, config.max_depth, || pb.inc(1));
    pb.finish();

    canvas.save(&config.output)
        .with_context(|| format!("failed to write {:?}", config.output))?;
    log::info!("wrote {:?}", config.output);

    Ok(())
}

/// A floor, a light above and to the left, and nothing else.
fn stage() -> Result<World> {
    let mut world = World::empty();
    world.light_source = Some(PointLight::new(
        Color::white(),
        Tuple4D::point(-10.0, 10.0, -10.0),
    ));

    world.add(Shape::plane().with_material(Material {
        color: Color::rgb(0.5, 0.5, 0.5),
        specular: 0.0,
        reflective: 0.3,
        pattern: Some(
            Pattern::checkers(Color::white(), Color::rgb(0.3, 0.3, 0.3))
                .with_transform(Matrix4D::scaling(0.5, 0.5, 0.5))?
        ),
        ..Default::default()
    }));

    Ok(world)
}

fn spheres() -> Result<(World, Tuple4D, Tuple4D)> {
    let mut world = stage()?;

    world.add(Shape::glass_sphere()
        .with_transform(Matrix4D::translation(-0.5, 1.0, 0.5))?
        .with_material(Material {
            color: Color::rgb(0.1, 0.1, 0.15),
            diffuse: 0.1,
            specular: 1.0,
            shininess: 300.0,
            reflective: 0.9,
            ..Material::glass()
        }));

    world.add(Shape::sphere()
        .with_transform(
            Matrix4D::translation(1.5, 0.5, -0.5) * Matrix4D::scaling(0.5, 0.5, 0.5)
        )?
        .with_material(Material {
            color: Color::rgb(1.0, 0.4666, 0.2666),
            diffuse: 0.7,
            specular: 0.3,
            pattern: Some(
                Pattern::stripe(Color::rgb(1.0, 0.4666, 0.2666), Color::white())
                    .with_transform(
                        Matrix4D::rotation_z(PI / 4.0) * Matrix4D::scaling(0.2, 0.2, 0.2)
                    )?
            ),
            ..Default::default()
        }));

    world.add(Shape::capped_cone(-1.0, 0.0)
        .with_transform(
            Matrix4D::translation(-1.8, 0.66, -0.9) * Matrix4D::scaling(0.33, 0.66, 0.33)
        )?
        .with_material(Material {
            color: Color::rgb(0.8666, 0.2, 0.2),
            diffuse: 0.7,
            specular: 0.3,
            reflective: 0.2,
            ..Default::default()
        }));

    world.add(Shape::cube()
        .with_transform(
            Matrix4D::translation(0.2, 0.25, -1.4)
                * Matrix4D::rotation_y(PI / 5.0)
                * Matrix4D::scaling(0.25, 0.25, 0.25)
        )?
        .with_material(Material {
            pattern: Some(
                Pattern::noise(Color::rgb(0.2, 0.4, 0.9), Color::rgb(0.9, 0.9, 1.0))
                    .with_transform(Matrix4D::scaling(0.1, 0.1, 0.1))?
            ),
            ..Default::default()
        }));

    Ok((world, Tuple4D::point(0.0, 1.5, -5.0), Tuple4D::point(0.0, 1.0, 0.0)))
}

fn hexagon() -> Result<(World, Tuple4D, Tuple4D)> {
    let mut world = stage()?;

    let hex = world.shapes.hexagon()?;
    world.shapes.set_transform(hex,
        Matrix4D::translation(0.0, 1.0, 0.0) * Matrix4D::rotation_x(-PI / 6.0)
    )?;
    world.shapes.attach_root(hex)?;

    Ok((world, Tuple4D::point(0.0, 2.5, -4.0), Tuple4D::point(0.0, 1.0, 0.0)))
}

fn mesh(config: &RenderConfig) -> Result<(World, Tuple4D, Tuple4D)> {
    let path = config.mesh.as_ref()
        .context("the mesh scene needs an OBJ file (--mesh or \"mesh\" in the config)")?;
    let obj = ObjParser::parse_file(path)
        .with_context(|| format!("failed to load mesh {:?}", path))?;

    let mut world = stage()?;
    let mesh = obj.into_partition(&mut world.shapes, config.partition_depth)?;

    let bounds = world.shapes.bounds(mesh);
    let fit = fit_to_floor(&bounds)
        .with_context(|| format!("cannot place mesh {:?}", path))?;
    world.shapes.set_transform(mesh, fit)?;
    world.shapes.attach_root(mesh)?;

    Ok((world, Tuple4D::point(0.0, 2.0, -5.0), Tuple4D::point(0.0, 1.0, 0.0)))
}

/// Scales `bounds` to a two-unit box resting on the floor.
fn fit_to_floor(bounds: &Bounds) -> Result<Matrix4D> {
    if bounds.is_empty() {
        anyhow::bail!("mesh has no faces");
    }

    let size = bounds.maximum - bounds.minimum;
    let extent = size.x.max(size.y).max(size.z);
    if extent < EPSILON || !extent.is_finite() {
        anyhow::bail!("mesh extent {} is degenerate", extent);
    }

    let scale = 2.0 / extent;
    let center = bounds.center();
    Ok(Matrix4D::translation(0.0, size.y * scale / 2.0, 0.0)
        * Matrix4D::scaling(scale, scale, scale)
        * Matrix4D::translation(-center.x, -center.y, -center.z))
}

#[test]
fn fitting_a_mesh_to_the_floor() {
    let fit = fit_to_floor(&Bounds::new(1.0, 0.0, 1.0, 5.0, 2.0, 3.0)).unwrap();

    assert_eq!(fit * Tuple4D::point(3.0, 1.0, 2.0), Tuple4D::point(0.0, 0.5, 0.0));
    assert_eq!(fit * Tuple4D::point(5.0, 0.0, 3.0), Tuple4D::point(1.0, 0.0, 0.5));
}

#[test]
fn degenerate_meshes_are_rejected() {
    let mut point = Bounds::empty();
    point.add_point(Tuple4D::point(1.0, 2.0, 3.0));

    assert!(fit_to_floor(&point).is_err());
    assert!(fit_to_floor(&Bounds::empty()).is_err());
}
