// Floating point comparisons
pub const EPSILON: f64 = 0.00001;

/// Offset applied along the normal when computing `over_point` and
/// `under_point`. Looser than `EPSILON` so that points survive the round trip
/// through inverse transforms without landing back inside their surface.
pub const SURFACE_OFFSET: f64 = 0.0001;

/// Tolerance for color comparisons; reference colors carry five digits.
pub const COLOR_EPSILON: f64 = 0.0001;

// Maximum recursion depth for reflected and refracted rays
pub const MAX_RECURSION_DEPTH: usize = 5;

// Maximum depth of a k-d tree partition
pub const DEFAULT_PARTITION_DEPTH: usize = 10;

// Refractive index of `Material::glass()`
pub const GLASS_RI: f64 = 1.5;
