use crate::interaction::SurfaceInteraction;
use crate::memory::MemoryPool;
use crate::reflection::bsdf::Bsdf;

pub mod matte;
pub mod plastic;
pub mod glass;
pub mod metal;
pub mod mirror;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransportMode {
    Radiance,
    Importance,
}

pub trait Material: Send + Sync {
    fn compute_scattering_functions<'a>(
        &self,
        si: &SurfaceInteraction,
        pool: &'a MemoryPool,
        mode: TransportMode,
        allow_multiple_lobes: bool
    ) -> Bsdf<'a>;
}