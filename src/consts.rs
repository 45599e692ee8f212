//! Float-precision copies of the `std::f32::consts` values used throughout
//! the renderer's spherical-coordinate and solid-angle math, under the
//! shorter names the rest of the crate expects.

use crate::Float;

pub const PI: Float = std::f32::consts::PI;
pub const FRAC_PI_2: Float = std::f32::consts::FRAC_PI_2;
pub const FRAC_PI_4: Float = std::f32::consts::FRAC_PI_4;
pub const FRAC_1_PI: Float = std::f32::consts::FRAC_1_PI;
pub const INV_2_PI: Float = 1.0 / (2.0 * PI);
pub const INV_4_PI: Float = 1.0 / (4.0 * PI);
