use crate::efloat::{quadratic, EFloat};
use crate::err_float::gamma;
use crate::geometry::bounds::Bounds3;
use crate::geometry::{Normal3, Ray, Transform, Transformable};
use crate::interaction::{DiffGeom, SurfaceHit, SurfaceInteraction};
use crate::shapes::Shape;
use crate::{consts, Float, Point2f, Point3f, Vec3f};
use cgmath::{EuclideanSpace, InnerSpace};

/// A (possibly partial, via `z_min`/`z_max`/`phi_max` clipping) sphere of
/// the given `radius`, centered at the origin of object space.
pub struct Sphere<'t> {
    object_to_world: &'t Transform,
    world_to_object: &'t Transform,
    reverse_orientation: bool,

    radius: Float,
    z_min: Float,
    z_max: Float,
    theta_min: Float,
    theta_max: Float,
    phi_max: Float,
}

impl<'t> Sphere<'t> {
    pub fn new(
        object_to_world: &'t Transform,
        world_to_object: &'t Transform,
        reverse_orientation: bool,
        radius: Float,
        z_min: Float,
        z_max: Float,
        phi_max: Float,
    ) -> Self {
        Self {
            object_to_world,
            world_to_object,
            reverse_orientation,
            radius,
            z_min: Float::min(z_min, z_max).clamp(-radius, radius),
            z_max: Float::max(z_min, z_max).clamp(-radius, radius),
            theta_min: Float::clamp(z_min / radius, -1.0, 1.0).acos(),
            theta_max: Float::clamp(z_max / radius, -1.0, 1.0).acos(),
            phi_max: phi_max.clamp(0.0, 360.0).to_radians(),
        }
    }

    /// A full, unclipped sphere: the common case.
    pub fn whole(object_to_world: &'t Transform, world_to_object: &'t Transform, radius: Float) -> Self {
        Self::new(object_to_world, world_to_object, false, radius, -radius, radius, 360.0)
    }

    fn build_interaction(&self, p_hit: Point3f, phi: Float, t: Float, ray_time: Float) -> SurfaceInteraction {
        let u = phi / self.phi_max;
        let theta = Float::clamp(p_hit.z / self.radius, -1.0, 1.0).acos();
        let v = (theta - self.theta_min) / (self.theta_max - self.theta_min);

        let z_radius = (p_hit.x * p_hit.x + p_hit.y * p_hit.y).sqrt();
        let inv_z_radius = 1.0 / z_radius;
        let cos_phi = p_hit.x * inv_z_radius;
        let sin_phi = p_hit.y * inv_z_radius;
        let dpdu = Vec3f::new(-self.phi_max * p_hit.y, self.phi_max * p_hit.x, 0.0);
        let dpdv = (self.theta_max - self.theta_min)
            * Vec3f::new(p_hit.z * cos_phi, p_hit.z * sin_phi, -self.radius * theta.sin());

        let d2p_duu = -self.phi_max * self.phi_max * Vec3f::new(p_hit.x, p_hit.y, 0.0);
        let d2p_duv =
            (self.theta_max - self.theta_min) * p_hit.z * self.phi_max * Vec3f::new(-sin_phi, cos_phi, 0.0);
        let d2p_dvv = -(self.theta_max - self.theta_min)
            * (self.theta_max - self.theta_min)
            * Vec3f::new(p_hit.x, p_hit.y, p_hit.z);

        let e1 = dpdu.dot(dpdu);
        let f1 = dpdu.dot(dpdv);
        let g1 = dpdv.dot(dpdv);
        let n = dpdu.cross(dpdv).normalize();
        let e2 = n.dot(d2p_duu);
        let f2 = n.dot(d2p_duv);
        let g2 = n.dot(d2p_dvv);

        let inv_egf2 = 1.0 / (e1 * g1 - f1 * f1);
        let dndu = Normal3(
            (f2 * f1 - e2 * g1) * inv_egf2 * dpdu + (e2 * f1 - f2 * e1) * inv_egf2 * dpdv,
        );
        let dndv = Normal3(
            (g2 * f1 - f2 * g1) * inv_egf2 * dpdu + (f2 * f1 - g2 * e1) * inv_egf2 * dpdv,
        );

        let p_err = Vec3f::new(p_hit.x, p_hit.y, p_hit.z).map(Float::abs) * gamma(5);

        let mut si = SurfaceInteraction::new(
            p_hit,
            p_err,
            ray_time,
            Point2f::new(u, v),
            Vec3f::new(0.0, 0.0, 0.0),
            Normal3(dpdu.cross(dpdv)).normalize(),
            DiffGeom { dpdu, dpdv, dndu, dndv },
        );
        si.hit.time = ray_time;
        let world_si = self.object_to_world.transform(si);
        let _ = t;
        world_si
    }
}

impl<'t> Shape for Sphere<'t> {
    fn object_bound(&self) -> Bounds3<f32> {
        bounds3f!((-self.radius, -self.radius, self.z_min), (self.radius, self.radius, self.z_max))
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

        let ox = EFloat::new(oray.origin.x, 0.0);
        let oy = EFloat::new(oray.origin.y, 0.0);
        let oz = EFloat::new(oray.origin.z, 0.0);
        let dx = EFloat::new(oray.dir.x, 0.0);
        let dy = EFloat::new(oray.dir.y, 0.0);
        let dz = EFloat::new(oray.dir.z, 0.0);

        let a = dx * dx + dy * dy + dz * dz;
        let b = (dx * ox + dy * oy + dz * oz) * 2.0;
        let c = ox * ox + oy * oy + oz * oz - EFloat::new(self.radius, 0.0) * EFloat::new(self.radius, 0.0);

        let (t0, t1) = quadratic(a, b, c)?;
        if t0.upper_bound() > oray.t_max || t1.lower_bound() <= 0.0 {
            return None;
        }
        let mut t_shape_hit = t0;
        if t_shape_hit.lower_bound() <= 0.0 {
            t_shape_hit = t1;
            if t_shape_hit.upper_bound() > oray.t_max {
                return None;
            }
        }

        let refine = |t: EFloat| -> Option<(Point3f, Float)> {
            let mut p_hit = oray.at(t.v);
            p_hit *= self.radius / p_hit.to_vec().magnitude();
            if p_hit.x == 0.0 && p_hit.y == 0.0 {
                p_hit.x = 1e-5 * self.radius;
            }
            let mut phi = p_hit.y.atan2(p_hit.x);
            if phi < 0.0 {
                phi += 2.0 * consts::PI;
            }
            if (self.z_min > -self.radius && p_hit.z < self.z_min)
                || (self.z_max < self.radius && p_hit.z > self.z_max)
                || phi > self.phi_max
            {
                return None;
            }
            Some((p_hit, phi))
        };

        let (p_hit, phi) = match refine(t_shape_hit) {
            Some(v) => v,
            None => {
                if t_shape_hit.v == t1.v {
                    return None;
                }
                t_shape_hit = t1;
                if t_shape_hit.upper_bound() > oray.t_max {
                    return None;
                }
                refine(t_shape_hit)?
            }
        };

        let si = self.build_interaction(p_hit, phi, t_shape_hit.v, ray.time);
        Some((t_shape_hit.v, si))
    }

    fn area(&self) -> Float {
        self.phi_max * self.radius * (self.z_max - self.z_min)
    }

    fn sample(&self, u: Point2f) -> (SurfaceHit, Float) {
        let z = 2.0 * u.x - 1.0; // only exact for the whole sphere; clipped spheres sample uniformly over the full sphere's z range
        let r = (1.0 - z * z).max(0.0).sqrt();
        let phi = 2.0 * consts::PI * u.y;
        let p_obj = Point3f::new(self.radius * r * phi.cos(), self.radius * r * phi.sin(), self.radius * z);
        let n_obj = Normal3(p_obj.to_vec() / self.radius);

        let p_world = self.object_to_world.transform(p_obj);
        let n_world = self.object_to_world.transform_normal(&n_obj).normalize();
        let n_world = if self.reverse_orientation { -n_world } else { n_world };

        let p_err = Vec3f::new(p_world.x, p_world.y, p_world.z).map(Float::abs) * gamma(5);
        let hit = SurfaceHit { p: p_world, p_err, time: 0.0, n: n_world };
        (hit, 1.0 / self.area())
    }
}
