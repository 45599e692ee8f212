use crate::Float;

pub const INFINITY: Float = std::f32::INFINITY;

pub fn lerp(t: Float, v1: Float, v2: Float) -> Float {
    (1.0 - t) * v1 + t * v2
}
