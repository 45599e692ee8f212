use crate::geometry::bounds::Bounds3;
use crate::geometry::{Normal3, Ray, Transform, Transformable};
use crate::interaction::{DiffGeom, SurfaceHit, SurfaceInteraction};
use crate::shapes::Shape;
use crate::{consts, Float, Point2f, Point3f, Vec3f};
use cgmath::InnerSpace;

/// A disk of `radius` (optionally with a concentric `inner_radius` hole),
/// lying in the object-space `z = height` plane. The common choice of shape
/// for ground planes and area-light panels.
pub struct Disk<'t> {
    object_to_world: &'t Transform,
    world_to_object: &'t Transform,
    reverse_orientation: bool,

    height: Float,
    radius: Float,
    inner_radius: Float,
    phi_max: Float,
}

impl<'t> Disk<'t> {
    pub fn new(
        object_to_world: &'t Transform,
        world_to_object: &'t Transform,
        reverse_orientation: bool,
        height: Float,
        radius: Float,
        inner_radius: Float,
        phi_max: Float,
    ) -> Self {
        Self {
            object_to_world,
            world_to_object,
            reverse_orientation,
            height,
            radius,
            inner_radius,
            phi_max: phi_max.clamp(0.0, 360.0).to_radians(),
        }
    }

    pub fn whole(object_to_world: &'t Transform, world_to_object: &'t Transform, radius: Float) -> Self {
        Self::new(object_to_world, world_to_object, false, 0.0, radius, 0.0, 360.0)
    }
}

impl<'t> Shape for Disk<'t> {
    fn object_bound(&self) -> Bounds3<f32> {
        bounds3f!(
            (-self.radius, -self.radius, self.height),
            (self.radius, self.radius, self.height)
        )
    }

    fn object_to_world(&self) -> &Transform {
        self.object_to_world
    }

    fn world_to_object(&self) -> &Transform {
        self.world_to_object
    }

    fn reverse_orientation(&self) -> bool {
        self.reverse_orientation
    }

    fn intersect(&self, ray: &Ray) -> Option<(Float, SurfaceInteraction)> {
        let oray = self.world_to_object.transform(*ray);

        // the ray is parallel to the disk's plane.
        if oray.dir.z == 0.0 {
            return None;
        }
        let t_shape_hit = (self.height - oray.origin.z) / oray.dir.z;
        if t_shape_hit <= 0.0 || t_shape_hit >= oray.t_max {
            return None;
        }

        let p_hit = oray.at(t_shape_hit);
        let dist2 = p_hit.x * p_hit.x + p_hit.y * p_hit.y;
        if dist2 > self.radius * self.radius || dist2 < self.inner_radius * self.inner_radius {
            return None;
        }

        let mut phi = p_hit.y.atan2(p_hit.x);
        if phi < 0.0 {
            phi += 2.0 * consts::PI;
        }
        if phi > self.phi_max {
            return None;
        }

        let u = phi / self.phi_max;
        let r_hit = dist2.sqrt();
        let v = (self.radius - r_hit) / (self.radius - self.inner_radius);

        let dpdu = Vec3f::new(-self.phi_max * p_hit.y, self.phi_max * p_hit.x, 0.0);
        let dpdv = Vec3f::new(p_hit.x, p_hit.y, 0.0) * ((self.inner_radius - self.radius) / r_hit.max(1e-8));
        let dndu = Normal3(Vec3f::new(0.0, 0.0, 0.0));
        let dndv = Normal3(Vec3f::new(0.0, 0.0, 0.0));

        let p_err = Vec3f::new(0.0, 0.0, 0.0);
        let n = Normal3(Vec3f::new(0.0, 0.0, 1.0));

        let si = SurfaceInteraction::new(
            p_hit,
            p_err,
            ray.time,
            Point2f::new(u, v),
            Vec3f::new(0.0, 0.0, 0.0),
            n,
            DiffGeom { dpdu, dpdv, dndu, dndv },
        );
        let world_si = self.object_to_world.transform(si);
        Some((t_shape_hit, world_si))
    }

    fn area(&self) -> Float {
        self.phi_max * 0.5 * (self.radius * self.radius - self.inner_radius * self.inner_radius)
    }

    fn sample(&self, u: Point2f) -> (SurfaceHit, Float) {
        let concentric = crate::sampling::concentric_sample_disk(u);
        let p_obj = Point3f::new(concentric.x * self.radius, concentric.y * self.radius, self.height);
        let n_obj = Normal3(Vec3f::new(0.0, 0.0, 1.0));

        let p_world = self.object_to_world.transform(p_obj);
        let n_world = self.object_to_world.transform_normal(&n_obj).normalize();
        let n_world = if self.reverse_orientation { -n_world } else { n_world };

        let hit = SurfaceHit { p: p_world, p_err: Vec3f::new(0.0, 0.0, 0.0), time: 0.0, n: n_world };
        (hit, 1.0 / self.area())
    }
}
