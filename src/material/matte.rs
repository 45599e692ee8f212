use crate::spectrum::Spectrum;
use crate::material::{Material, TransportMode};
use crate::interaction::SurfaceInteraction;
use crate::memory::MemoryPool;
use crate::reflection::bsdf::Bsdf;
use crate::reflection::{LambertianReflection, OrenNayar};
use crate::Float;
use cgmath::Deg;

/// A perfectly diffuse (or, with nonzero `sigma`, rough diffuse)
/// surface. `sigma` is the standard deviation of the Oren-Nayar
/// microfacet orientation angle in degrees; `0` collapses to Lambertian.
pub struct MatteMaterial {
    pub diffuse: Spectrum,
    pub sigma: Float,
}

impl MatteMaterial {
    pub fn new(diffuse: Spectrum, sigma: Float) -> Self {
        Self { diffuse, sigma }
    }
}

impl Material for MatteMaterial {
    fn compute_scattering_functions<'a>(&self, si: &SurfaceInteraction, pool: &'a MemoryPool, _mode: TransportMode, _allow_multiple_lobes: bool) -> Bsdf<'a> {
        let mut bsdf = Bsdf::new(si, 1.0);

        let r = self.diffuse.clamp_positive();
        if !r.is_black() {
            if self.sigma == 0.0 {
                bsdf.add(pool.alloc_one(LambertianReflection { r }));
            } else {
                bsdf.add(pool.alloc_one(OrenNayar::new(r, Deg(self.sigma))));
            }
        }
        bsdf
    }
}