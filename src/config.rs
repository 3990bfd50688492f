use std::fs;
use std::path::{ Path, PathBuf };

use serde::{ Serialize, Deserialize };

use crate::consts::{ MAX_RECURSION_DEPTH, DEFAULT_PARTITION_DEPTH };
use crate::error::Result;

/// The built-in scenes the renderer knows how to assemble.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DemoScene {
    /// A checkered floor with a glass, a mirror and a matte sphere.
    Spheres,

    /// A hexagon of spheres and cylinders built from nested groups.
    Hexagon,

    /// An OBJ mesh, indexed by a k-d tree.
    Mesh,
}

/// Everything needed to render a scene to disk.
///
/// Missing fields in a JSON file take their default value:
///
/// ```
/// # use raytracer::config::{ RenderConfig, DemoScene };
/// let config = RenderConfig::from_json(r#"{ "width": 320, "scene": "hexagon" }"#)
///     .unwrap();
/// assert_eq!(config.width, 320);
/// assert_eq!(config.height, RenderConfig::default().height);
/// assert_eq!(config.scene, DemoScene::Hexagon);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,

    /// In radians.
    pub field_of_view: f64,

    /// How many times reflected and refracted rays may recurse.
    pub max_depth: usize,

    /// Depth of the k-d tree built over meshes.
    pub partition_depth: usize,

    pub output: PathBuf,
    pub scene: DemoScene,

    /// OBJ file for `DemoScene::Mesh`.
    pub mesh: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> RenderConfig {
        RenderConfig {
            width: 400,
            height: 200,
            field_of_view: std::f64::consts::FRAC_PI_3,
            max_depth: MAX_RECURSION_DEPTH,
            partition_depth: DEFAULT_PARTITION_DEPTH,
            output: PathBuf::from("render.ppm"),
            scene: DemoScene::Spheres,
            mesh: None,
        }
    }
}

impl RenderConfig {
    pub fn from_json(source: &str) -> Result<RenderConfig> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn from_file(path: &Path) -> Result<RenderConfig> {
        RenderConfig::from_json(&fs::read_to_string(path)?)
    }
}

#[test]
fn empty_config_is_default() {
    assert_eq!(RenderConfig::from_json("{}").unwrap(), RenderConfig::default());
}

#[test]
fn config_fields_are_read() {
    let config = RenderConfig::from_json(r#"{
        "width": 64,
        "height": 48,
        "field_of_view": 1.2,
        "max_depth": 2,
        "partition_depth": 6,
        "output": "teapot.ppm",
        "scene": "mesh",
        "mesh": "models/teapot.obj"
    }"#).unwrap();

    assert_eq!(config, RenderConfig {
        width: 64,
        height: 48,
        field_of_view: 1.2,
        max_depth: 2,
        partition_depth: 6,
        output: PathBuf::from("teapot.ppm"),
        scene: DemoScene::Mesh,
        mesh: Some(PathBuf::from("models/teapot.obj")),
    });
}

#[test]
fn bad_config_is_an_error() {
    use crate::RayTracerError;

    assert!(matches!(
        RenderConfig::from_json(r#"{ "scene": "teapot" }"#),
        Err(RayTracerError::Config(_))
    ));
    assert!(matches!(
        RenderConfig::from_json(r#"{ "widht": 10 }"#),
        Err(RayTracerError::Config(_))
    ));
}

#[test]
fn missing_config_file_is_an_io_error() {
    use crate::RayTracerError;

    assert!(matches!(
        RenderConfig::from_file(Path::new("does/not/exist.json")),
        Err(RayTracerError::Io(_))
    ));
}
