use crate::geometry::bounds::Bounds3f;
use crate::geometry::{Ray, Transform, Transformable};
use crate::interaction::{SurfaceHit, SurfaceInteraction};
use crate::{Float, Point2f, Vec3f};
use cgmath::InnerSpace;

pub mod disk;
pub mod sphere;

/// A geometric primitive's local-space description plus the transform
/// placing it into the scene. Kept object-safe (no generic methods) so
/// shapes can live behind `Arc<dyn Shape>` in `GeometricPrimitive` and
/// `BVH`.
pub trait Shape: Send + Sync {
    fn object_bound(&self) -> Bounds3f;

    fn world_bound(&self) -> Bounds3f {
        self.object_to_world().transform(self.object_bound())
    }

    fn object_to_world(&self) -> &Transform;

    fn world_to_object(&self) -> &Transform;

    fn reverse_orientation(&self) -> bool {
        false
    }

    fn transform_swaps_handedness(&self) -> bool {
        self.object_to_world().swaps_handedness()
    }

    /// Intersect with `ray`. Implementations do not need to shrink
    /// `ray.t_max` themselves; the caller (the BVH) uses the returned `t`.
    fn intersect(&self, ray: &Ray) -> Option<(Float, SurfaceInteraction)>;

    fn intersect_test(&self, ray: &Ray) -> bool {
        self.intersect(ray).is_some()
    }

    fn area(&self) -> Float;

    /// Uniformly sample a point on the shape's surface with respect to
    /// area, returning the sampled hit and the pdf with respect to area
    /// (`1 / area` for every shape implemented here).
    fn sample(&self, u: Point2f) -> (SurfaceHit, Float);

    /// Sample a point on the shape as seen from `reference`, returning the
    /// pdf with respect to solid angle at `reference`. The default
    /// converts an area sample via the standard
    /// `pdf_area * dist^2 / |cos theta|` Jacobian; shapes with a closed-form
    /// solid-angle sampling strategy (e.g. spheres seen from outside) should
    /// override it.
    fn sample_from_ref(&self, reference: &SurfaceHit, u: Point2f) -> (SurfaceHit, Float) {
        let (hit, pdf_area) = self.sample(u);
        let to_hit = hit.p - reference.p;
        let dist2 = to_hit.magnitude2();
        if dist2 == 0.0 {
            return (hit, 0.0);
        }
        let wi = to_hit / dist2.sqrt();
        let cos_theta = hit.n.abs_dot(-wi);
        if cos_theta == 0.0 {
            return (hit, 0.0);
        }
        (hit, pdf_area * dist2 / cos_theta)
    }

    /// Solid-angle pdf of `sample_from_ref` having produced direction `wi`
    /// from `reference`; used on the BSDF-sampling side of multiple
    /// importance sampling when a BSDF sample happens to hit this shape.
    fn pdf_from_ref(&self, reference: &SurfaceHit, wi: Vec3f) -> Float {
        let ray = reference.spawn_ray(wi);
        let isect = match self.intersect(&ray) {
            Some((_, isect)) => isect,
            None => return 0.0,
        };
        let dist2 = (isect.hit.p - reference.p).magnitude2();
        let cos_theta = isect.hit.n.abs_dot(-wi);
        if cos_theta == 0.0 {
            0.0
        } else {
            dist2 / (cos_theta * self.area())
        }
    }
}
