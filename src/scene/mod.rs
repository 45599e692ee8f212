use crate::bvh::BVH;
use crate::{SurfaceInteraction, Ray, RayDifferential, Bounds3f};
use crate::light::Light;
use crate::spectrum::Spectrum;
use std::sync::Arc;

pub struct SceneBuilder {

}

pub struct Scene<'p> {
    pub primitives_aggregate: BVH<'p>,
    pub lights: Vec<Arc<dyn Light>>,
}

impl<'p> Scene<'p> {

    /// Lights come in uniquely owned so each can be preprocessed (which
    /// needs `&mut self` — a distant light fixes up its world radius
    /// here, for instance) before becoming a shared `Arc` for the
    /// lifetime of the scene.
    pub fn new(primitives: BVH<'p>, mut lights: Vec<Box<dyn Light>>) -> Self {
        for light in lights.iter_mut() {
            light.preprocess(&primitives);
        }

        let lights = lights.into_iter().map(Arc::from).collect();

        Self {
            primitives_aggregate: primitives,
            lights
        }
    }

    pub fn intersect(&self, ray: &mut Ray) -> Option<SurfaceInteraction> {
        self.primitives_aggregate.intersect(ray)
    }

    pub fn intersect_test(&self, ray: &Ray) -> bool {
        self.primitives_aggregate.intersect_test(ray)
    }

    pub fn world_bound(&self) -> Bounds3f {
        self.primitives_aggregate.bounds
    }

    /// Sum of every light's contribution to a ray that escaped the scene.
    /// Lights without an environment term (point, distant, area) default to black.
    pub fn environment_emitted_radiance(&self, ray: &RayDifferential) -> Spectrum {
        self.lights.iter()
            .map(|light| light.environment_emitted_radiance(ray))
            .fold(Spectrum::uniform(0.0), |acc, l| acc + l)
    }
}