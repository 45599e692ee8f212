#[macro_use]
pub mod macros;

pub mod consts;
pub mod efloat;
pub mod err_float;
pub mod math;
pub mod geometry;
pub mod interaction;
pub mod shapes;
pub mod primitive;
pub mod bvh;
pub mod reflection;
pub mod fresnel;
pub mod material;
pub mod light;
pub mod sampling;
pub mod lowdiscrepancy;
pub mod sampler;
pub mod camera;
pub mod film;
pub mod filter;
pub mod spectrum;
pub mod memory;
pub mod concurrency;
pub mod scene;
pub mod integrator;
pub mod config;
pub mod imageio;

pub use crate::geometry::{
    bounds::{Bounds2, Bounds2f, Bounds2i, Bounds3, Bounds3f},
    abs_dot, faceforward, spherical_direction,
    ComponentWiseExt, Differential, Normal3, Ray, RayDifferential, Scalar, Transform, Transformable,
};
pub use crate::interaction::SurfaceInteraction;
pub use crate::math::{lerp, INFINITY};

use cgmath::{EuclideanSpace, InnerSpace, Matrix2};

/// Build-time-selected scalar width for the whole crate. Fixed to `f32` to
/// match the geometry pipeline's existing floating-point error machinery.
pub type Float = f32;
pub type Int = i32;

pub type Point2f = cgmath::Point2<Float>;
pub type Point3f = cgmath::Point3<Float>;
pub type Point2i = cgmath::Point2<Int>;
pub type Vec2f = cgmath::Vector2<Float>;
pub type Vec2i = cgmath::Vector2<Int>;
pub type Vec3f = cgmath::Vector3<Float>;

/// Nudge a ray origin off a surface along its geometric normal, away from
/// the side the error bounds could have placed it on, so re-intersection
/// with the originating surface can't happen from floating-point round-off.
pub fn offset_ray_origin(p: &Point3f, p_err: &Vec3f, n: &Normal3, w: &Vec3f) -> Point3f {
    use crate::err_float::{next_float_down, next_float_up};

    let d = n.abs_dot(*p_err);
    let mut offset = n.0 * d;
    if w.dot(n.0) < 0.0 {
        offset = -offset;
    }
    let mut po = p + offset;
    for i in 0..3 {
        if offset[i] > 0.0 {
            po[i] = next_float_up(po[i]);
        } else if offset[i] < 0.0 {
            po[i] = next_float_down(po[i]);
        }
    }
    po
}

/// Solve `A x = b` for a 2x2 system, returning `None` if `A` is singular.
/// Used to project ray-differential offsets onto a surface's `(u, v)` basis.
pub fn solve_linear_system_2x2(a: Matrix2<Float>, b: Vec2f) -> Option<Vec2f> {
    let det = a.x.x * a.y.y - a.y.x * a.x.y;
    if det.abs() < 1e-10 {
        return None;
    }
    let x0 = (a.y.y * b.x - a.y.x * b.y) / det;
    let x1 = (a.x.x * b.y - a.x.y * b.x) / det;
    if x0.is_nan() || x1.is_nan() {
        return None;
    }
    Some(Vec2f::new(x0, x1))
}
