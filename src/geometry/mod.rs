use crate::{Float, Point3f, Vec3f};
use cgmath::{InnerSpace, Zero};
use std::ops::{Add, Deref, DerefMut, Mul, Neg, Sub};

pub mod bounds;
pub mod transform;

pub use transform::{Transform, Transformable, TransformableErr};

/// A surface normal. Kept as its own type (rather than a plain `Vec3f`) so
/// that transforming it by the inverse-transpose, rather than the forward
/// matrix, is a type-level distinction instead of a convention to remember.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Normal3(pub Vec3f);

impl Normal3 {
    pub fn new(x: Float, y: Float, z: Float) -> Self {
        Normal3(Vec3f::new(x, y, z))
    }

    pub fn normalize(self) -> Self {
        Normal3(self.0.normalize())
    }

    pub fn abs_dot(self, other: Vec3f) -> Float {
        self.0.dot(other).abs()
    }

    /// Flip this normal to lie in the same hemisphere as `v`, if it doesn't already.
    pub fn faceforward(self, v: Vec3f) -> Normal3 {
        if self.0.dot(v) < 0.0 { -self } else { self }
    }
}

/// Flip `v` to lie in the same hemisphere as `n`, if it doesn't already.
pub fn faceforward(v: Vec3f, n: Vec3f) -> Vec3f {
    if v.dot(n) < 0.0 { -v } else { v }
}

/// `|v1 . v2|`, used throughout the BxDFs where only the magnitude of the
/// cosine between two directions in the local shading frame matters.
pub fn abs_dot(v1: Vec3f, v2: Vec3f) -> Float {
    v1.dot(v2).abs()
}

/// Build a direction from spherical coordinates specified directly by their
/// sine/cosine (callers usually already have `cos_theta` on hand from a BxDF
/// sample, so taking `acos` of it just to re-apply `cos`/`sin` would be wasteful).
pub fn spherical_direction(sin_theta: Float, cos_theta: Float, phi: Float) -> Vec3f {
    Vec3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

impl Deref for Normal3 {
    type Target = Vec3f;
    fn deref(&self) -> &Vec3f { &self.0 }
}

impl DerefMut for Normal3 {
    fn deref_mut(&mut self) -> &mut Vec3f { &mut self.0 }
}

impl From<Vec3f> for Normal3 {
    fn from(v: Vec3f) -> Self { Normal3(v) }
}

impl From<Normal3> for Vec3f {
    fn from(n: Normal3) -> Self { n.0 }
}

impl Neg for Normal3 {
    type Output = Normal3;
    fn neg(self) -> Normal3 { Normal3(-self.0) }
}

impl Add for Normal3 {
    type Output = Normal3;
    fn add(self, rhs: Normal3) -> Normal3 { Normal3(self.0 + rhs.0) }
}

impl Sub for Normal3 {
    type Output = Normal3;
    fn sub(self, rhs: Normal3) -> Normal3 { Normal3(self.0 - rhs.0) }
}

impl Mul<Float> for Normal3 {
    type Output = Normal3;
    fn mul(self, rhs: Float) -> Normal3 { Normal3(self.0 * rhs) }
}

impl cgmath::AbsDiffEq for Normal3 {
    type Epsilon = <Float as cgmath::AbsDiffEq>::Epsilon;

    fn default_epsilon() -> Self::Epsilon { Float::default_epsilon() }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        Vec3f::abs_diff_eq(&self.0, &other.0, epsilon)
    }
}

impl Zero for Normal3 {
    fn zero() -> Self { Normal3(Vec3f::zero()) }
    fn is_zero(&self) -> bool { self.0 == Vec3f::zero() }
}

/// A ray in 3D space. `t_max` is a design-sanctioned mutable upper bound:
/// closest-hit intersection routines shrink it as they commit a hit.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Point3f,
    pub dir: Vec3f,
    pub t_max: Float,
    pub time: Float,
}

impl Ray {
    pub fn new(origin: Point3f, dir: Vec3f) -> Self {
        Self { origin, dir, t_max: Float::INFINITY, time: 0.0 }
    }

    pub fn new_with_time(origin: Point3f, dir: Vec3f, t_max: Float, time: Float) -> Self {
        Self { origin, dir, t_max, time }
    }

    pub fn at(&self, t: Float) -> Point3f {
        self.origin + self.dir * t
    }
}

/// The x/y offset rays pbrt uses to estimate texture-space derivatives.
/// Not populated by this crate's cameras by default (no texturing), but the
/// shading-geometry machinery is written in terms of it so a camera can
/// opt in.
#[derive(Clone, Copy, Debug)]
pub struct Differential {
    pub rx_origin: Point3f,
    pub ry_origin: Point3f,
    pub rx_dir: Vec3f,
    pub ry_dir: Vec3f,
}

#[derive(Clone, Copy, Debug)]
pub struct RayDifferential {
    pub ray: Ray,
    pub diff: Option<Differential>,
}

impl RayDifferential {
    pub fn new(ray: Ray) -> Self {
        Self { ray, diff: None }
    }

    /// Shrink the offset rays towards the primary ray by `1/sqrt(spp)` so
    /// high sample counts don't over-blur texture-space derivatives.
    pub fn scale_differentials(&mut self, s: Float) {
        if let Some(diff) = &mut self.diff {
            diff.rx_origin = self.ray.origin + (diff.rx_origin - self.ray.origin) * s;
            diff.ry_origin = self.ray.origin + (diff.ry_origin - self.ray.origin) * s;
            diff.rx_dir = self.ray.dir + (diff.rx_dir - self.ray.dir) * s;
            diff.ry_dir = self.ray.dir + (diff.ry_dir - self.ray.dir) * s;
        }
    }
}

impl Deref for RayDifferential {
    type Target = Ray;
    fn deref(&self) -> &Ray { &self.ray }
}

impl DerefMut for RayDifferential {
    fn deref_mut(&mut self) -> &mut Ray { &mut self.ray }
}

/// Bound on the trait requirements a type needs to participate in the
/// `Bounds2`/`Bounds3` generic containers: ordered, has min/max element
/// values, and is usable as a `cgmath` scalar.
pub trait Scalar: cgmath::BaseNum + num::Bounded {
    fn max(self, other: Self) -> Self;
    fn min(self, other: Self) -> Self;
}

impl Scalar for f32 {
    fn max(self, other: Self) -> Self { f32::max(self, other) }
    fn min(self, other: Self) -> Self { f32::min(self, other) }
}

impl Scalar for i32 {
    fn max(self, other: Self) -> Self { std::cmp::max(self, other) }
    fn min(self, other: Self) -> Self { std::cmp::min(self, other) }
}

/// Component-wise (rather than lexicographic) min/max over whole
/// points/vectors, used by the tile iterator and bounding-box clamps.
pub trait ComponentWiseExt: Sized {
    fn min(self, other: Self) -> Self;
    fn max(self, other: Self) -> Self;
}

macro_rules! impl_component_wise {
    ($t:ty, $($field:ident),+) => {
        impl ComponentWiseExt for $t {
            fn min(self, other: Self) -> Self {
                Self::new($(self.$field.min(other.$field)),+)
            }
            fn max(self, other: Self) -> Self {
                Self::new($(self.$field.max(other.$field)),+)
            }
        }
    };
}

impl_component_wise!(crate::Point2i, x, y);
impl_component_wise!(crate::Point2f, x, y);
impl_component_wise!(crate::Point3f, x, y, z);
impl_component_wise!(Vec3f, x, y, z);
