pub mod consts;
pub mod error;

pub mod tuple;
pub mod matrix;
pub mod ray;

pub mod color;
pub mod canvas;

pub mod pattern;
pub mod light;

pub mod bounds;
pub mod shape;
pub mod arena;
pub mod partition;
pub mod intersect;

pub mod world;
pub mod camera;

pub mod obj;
pub mod config;

pub use error::{ RayTracerError, Result };

use consts::EPSILON;

/// Approximate equality for geometric quantities.
pub fn feq(left: f64, right: f64) -> bool {
    feq_within(left, right, EPSILON)
}

/// Approximate equality with an explicit tolerance.
pub fn feq_within(left: f64, right: f64, epsilon: f64) -> bool {
    if left == right {
        return true;
    }

    (left - right).abs() < epsilon
}
