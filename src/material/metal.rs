use crate::spectrum::Spectrum;
use crate::{Float, SurfaceInteraction};
use crate::material::{Material, TransportMode};
use crate::memory::MemoryPool;
use crate::reflection::bsdf::Bsdf;
use crate::reflection::microfacet::TrowbridgeReitzDistribution;
use crate::reflection::MicrofacetReflection;
use crate::fresnel::FresnelConductor;

#[derive(Copy, Clone)]
pub enum Roughness {
    Anisotropic { u: Float, v: Float },
    Isotropic(Float),
}

pub struct MetalMaterial {
    /// Index of refraction
    pub eta: Spectrum,

    /// Absorption coefficient
    pub k: Spectrum,

    pub roughness: Roughness,

    pub remap_roughness: bool,
}

impl MetalMaterial {
    pub fn new(eta: Spectrum, k: Spectrum, roughness: Roughness, remap_roughness: bool) -> Self {
        MetalMaterial { eta, k, roughness, remap_roughness }
    }
}

impl Material for MetalMaterial {
    fn compute_scattering_functions<'a>(&self, si: &SurfaceInteraction, pool: &'a MemoryPool, _mode: TransportMode, _allow_multiple_lobes: bool) -> Bsdf<'a> {
        let (u_rough, v_rough) = match self.roughness {
            Roughness::Anisotropic { u, v } => (u, v),
            Roughness::Isotropic(r) => (r, r),
        };
        let (u_rough, v_rough) = if self.remap_roughness {
            (TrowbridgeReitzDistribution::roughness_to_alpha(u_rough), TrowbridgeReitzDistribution::roughness_to_alpha(v_rough))
        } else { (u_rough, v_rough) };
        let distribution = TrowbridgeReitzDistribution::new(u_rough, v_rough);
        let fresnel = FresnelConductor::new(Spectrum::uniform(1.0), self.eta, self.k);
        let mut bsdf = Bsdf::new(si, 1.0);
        let bxdf = MicrofacetReflection {
            r: Spectrum::uniform(1.0),
            distribution,
            fresnel,
        };
        bsdf.add(pool.alloc_one(bxdf));
        bsdf
    }
}