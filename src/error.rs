use std::io;

use crate::shape::ShapeId;

/// Errors raised while building or rendering a scene.
///
/// These are precondition failures: a singular transform, a tuple of the
/// wrong kind, a pixel outside the camera, or a malformed shape tree. Numeric
/// edge cases such as a ray parallel to a plane are not errors; they simply
/// produce no intersections.
#[derive(Debug, thiserror::Error)]
pub enum RayTracerError {
    #[error("matrix is not invertible")]
    NonInvertibleMatrix,

    #[error("expected a {expected}, found a tuple with w = {w}")]
    TupleKind { expected: &'static str, w: f64 },

    #[error("pixel ({x}, {y}) lies outside a {hsize}x{vsize} camera")]
    PixelOutOfBounds { x: usize, y: usize, hsize: usize, vsize: usize },

    #[error("no shape with id {0:?}")]
    UnknownShape(ShapeId),

    #[error("shape {0:?} cannot hold children")]
    NotAGroup(ShapeId),

    #[error("shape {0:?} already has an owner")]
    AlreadyOwned(ShapeId),

    #[error("attaching {child:?} to {parent:?} would create a cycle")]
    Cycle { parent: ShapeId, child: ShapeId },

    #[error("OBJ line {line}: {reason}")]
    ObjParse { line: usize, reason: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("invalid render configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RayTracerError>;

#[test]
fn errors_render_readable_messages() {
    let e = RayTracerError::PixelOutOfBounds { x: 12, y: 3, hsize: 10, vsize: 10 };
    assert_eq!(e.to_string(), "pixel (12, 3) lies outside a 10x10 camera");

    let e = RayTracerError::NotAGroup(ShapeId(4));
    assert_eq!(e.to_string(), "shape ShapeId(4) cannot hold children");
}
