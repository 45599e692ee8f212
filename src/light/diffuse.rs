use crate::interaction::SurfaceHit;
use crate::light::{Light, LightFlags, LiSample, VisibilityTester, AreaLight};
use crate::shapes::Shape;
use crate::spectrum::Spectrum;
use crate::{Float, Point2f, Transform, Vec3f};
use cgmath::InnerSpace;
use std::sync::Arc;

/// A one-sided, uniformly emissive area light bound to a shape's surface.
/// `two_sided` flips it to emit from both faces, matching the common
/// pbrt scene-file flag of the same name.
pub struct DiffuseAreaLight {
    l2w: Transform,
    w2l: Transform,
    emit: Spectrum,
    shape: Arc<dyn Shape>,
    two_sided: bool,
}

impl DiffuseAreaLight {
    pub fn new(light_to_world: Transform, emit: Spectrum, shape: Arc<dyn Shape>, two_sided: bool) -> Self {
        let w2l = light_to_world.inverse();
        Self { l2w: light_to_world, w2l, emit, shape, two_sided }
    }
}

impl Light for DiffuseAreaLight {
    fn flags(&self) -> LightFlags {
        LightFlags::Area
    }

    fn light_to_world(&self) -> &Transform {
        &self.l2w
    }

    fn world_to_light(&self) -> &Transform {
        &self.w2l
    }

    fn sample_incident_radiance(&self, reference: &SurfaceHit, u: Point2f) -> LiSample {
        let (p1, pdf) = self.shape.sample_from_ref(reference, u);
        let wi = if pdf == 0.0 || (p1.p - reference.p).magnitude2() == 0.0 {
            Vec3f::new(0.0, 0.0, 1.0)
        } else {
            (p1.p - reference.p).normalize()
        };
        let radiance = self.emitted_radiance(p1, -wi);
        let vis = VisibilityTester { p0: *reference, p1 };
        LiSample { radiance, wi, pdf, vis }
    }

    fn pdf_incident_radiance(&self, reference: &SurfaceHit, wi: Vec3f) -> Float {
        self.shape.pdf_from_ref(reference, wi)
    }

    fn power(&self) -> Spectrum {
        let sides = if self.two_sided { 2.0 } else { 1.0 };
        self.emit * (sides * crate::consts::PI * self.shape.area())
    }
}

impl AreaLight for DiffuseAreaLight {
    fn emitted_radiance(&self, hit: SurfaceHit, w: Vec3f) -> Spectrum {
        if self.two_sided || hit.n.dot(w) > 0.0 {
            self.emit
        } else {
            Spectrum::new(0.0)
        }
    }

    fn as_light(&self) -> &dyn Light {
        self
    }
}
