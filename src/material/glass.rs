use crate::spectrum::Spectrum;
use crate::{Float, SurfaceInteraction};
use crate::material::{Material, TransportMode};
use crate::memory::MemoryPool;
use crate::reflection::bsdf::Bsdf;
use crate::reflection::{SpecularReflection, SpecularTransmission, MicrofacetReflection, MicrofacetTransmission};
use crate::fresnel::FresnelDielectric;
use crate::reflection::microfacet::TrowbridgeReitzDistribution;

pub struct GlassMaterial {
    pub reflectance: Spectrum,
    pub transmittance: Spectrum,
    pub u_roughness: Float,
    pub v_roughness: Float,
    pub eta: Float,
    pub remap_roughness: bool,
}

impl GlassMaterial {
    pub fn new(
        kr: Spectrum,
        kt: Spectrum,
        u_roughness: Float,
        v_roughness: Float,
        eta: Float,
        remap_roughness: bool
    ) -> Self {
        Self {
            reflectance: kr,
            transmittance: kt,
            u_roughness,
            v_roughness,
            eta,
            remap_roughness,
        }
    }
    pub fn constant(kr: Spectrum, kt: Spectrum, eta: Float) -> Self {
        Self {
            reflectance: kr,
            transmittance: kt,
            u_roughness: 0.0,
            v_roughness: 0.0,
            eta,
            remap_roughness: false
        }
    }
}

impl Material for GlassMaterial {
    fn compute_scattering_functions<'a>(&self, si: &SurfaceInteraction, pool: &'a MemoryPool, mode: TransportMode, _allow_multiple_lobes: bool) -> Bsdf<'a> {
        let eta = self.eta;
        let r = self.reflectance.clamp_positive();
        let t = self.transmittance.clamp_positive();
        let (mut u_rough, mut v_rough) = (self.u_roughness, self.v_roughness);
        if self.remap_roughness {
            u_rough = TrowbridgeReitzDistribution::roughness_to_alpha(u_rough);
            v_rough = TrowbridgeReitzDistribution::roughness_to_alpha(v_rough);
        }
        let mut bsdf = Bsdf::new(si, eta);

        let is_specular = u_rough == 0.0 && v_rough == 0.0;

        if !r.is_black() {
            let fresnel = FresnelDielectric::new(1.0, eta);
            if is_specular {
                let reflection = pool.alloc_one(SpecularReflection::new(r, fresnel));
                bsdf.add(reflection);
            } else {
                let distribution = TrowbridgeReitzDistribution::new(u_rough, v_rough);
                let reflection = pool.alloc_one(MicrofacetReflection::new(r, distribution, fresnel));
                bsdf.add(reflection);
            }
        }

        if !t.is_black() {
            if is_specular {
                let transmission = pool.alloc_one(SpecularTransmission::new(t, 1.0, eta, mode));
                bsdf.add(transmission);
            } else {
                let distribution = TrowbridgeReitzDistribution::new(u_rough, v_rough);
                let transmission = pool.alloc_one(MicrofacetTransmission::new(t, distribution, 1.0, eta, mode));
                bsdf.add(transmission);
            }
        }
        bsdf
    }
}