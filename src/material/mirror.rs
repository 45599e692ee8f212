use crate::spectrum::Spectrum;
use crate::material::{Material, TransportMode};
use crate::SurfaceInteraction;
use crate::memory::MemoryPool;
use crate::reflection::bsdf::Bsdf;
use crate::reflection::SpecularReflection;
use crate::fresnel::FresnelNoOp;

pub struct MirrorMaterial {
    pub reflectance: Spectrum,
}

impl MirrorMaterial {
    pub fn new(reflectance: Spectrum) -> Self {
        Self { reflectance }
    }
}

impl Material for MirrorMaterial {
    fn compute_scattering_functions<'a>(&self, si: &SurfaceInteraction, pool: &'a MemoryPool, _mode: TransportMode, _allow_multiple_lobes: bool) -> Bsdf<'a> {
        let mut bsdf = Bsdf::new(si, 1.0);
        let r = self.reflectance.clamp_positive();
        if !r.is_black() {
            let reflection = pool.alloc_one(SpecularReflection::new(r, FresnelNoOp));
            bsdf.add(reflection);
        }
        bsdf
    }
}