//! Strategies for choosing which light to sample at a shading point.
//!
//! `Uniform` and `Power` each precompute a single scene-wide
//! `Distribution1D` and hand out clones of it everywhere. `Spatial`
//! divides the scene into voxels and builds a distribution per voxel the
//! first time it's queried, caching the result for the life of the
//! distribution.

use crate::interaction::SurfaceHit;
use crate::light::Light;
use crate::lowdiscrepancy::halton_2d;
use crate::sampling::Distribution1D;
use crate::{Bounds3f, Float, Normal3, Point3f, Vec3f};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

const SPATIAL_SAMPLES_PER_VOXEL: u64 = 128;

pub trait LightDistribution: Send + Sync {
    /// The distribution to use for sampling lights at `p`.
    fn lookup(&self, p: Point3f) -> Arc<Distribution1D>;
}

pub struct UniformLightDistribution {
    distribution: Arc<Distribution1D>,
}

impl UniformLightDistribution {
    pub fn new(lights: &[Arc<dyn Light>]) -> Self {
        let func = vec![1.0; lights.len().max(1)];
        Self { distribution: Arc::new(Distribution1D::new(&func)) }
    }
}

impl LightDistribution for UniformLightDistribution {
    fn lookup(&self, _p: Point3f) -> Arc<Distribution1D> {
        self.distribution.clone()
    }
}

pub struct PowerLightDistribution {
    distribution: Arc<Distribution1D>,
}

impl PowerLightDistribution {
    pub fn new(lights: &[Arc<dyn Light>]) -> Self {
        let mut func: Vec<Float> = lights.iter().map(|l| l.power().y()).collect();
        if func.is_empty() {
            func.push(1.0);
        } else if func.iter().all(|&v| v == 0.0) {
            func.iter_mut().for_each(|v| *v = 1.0);
        }
        Self { distribution: Arc::new(Distribution1D::new(&func)) }
    }
}

impl LightDistribution for PowerLightDistribution {
    fn lookup(&self, _p: Point3f) -> Arc<Distribution1D> {
        self.distribution.clone()
    }
}

/// `Distribution1D`s over lights, one per voxel of a regular grid spanning
/// the scene's world bound. Voxel keys are mixed into a 64-bit hash, so
/// the cache need not be addressed by position directly.
pub struct SpatialLightDistribution {
    lights: Vec<Arc<dyn Light>>,
    world_bound: Bounds3f,
    n_voxels: [i32; 3],
    cache: Mutex<HashMap<u64, Arc<Distribution1D>>>,
}

impl SpatialLightDistribution {
    pub fn new(lights: Vec<Arc<dyn Light>>, world_bound: Bounds3f) -> Self {
        let diag = world_bound.diagonal();
        let d = [diag.x, diag.y, diag.z];
        let max_extent = world_bound.maximum_extent() as usize;
        let max_d = d[max_extent].max(1e-6);

        let mut n_voxels = [0i32; 3];
        for axis in 0..3 {
            n_voxels[axis] = if axis == max_extent {
                64
            } else {
                ((64.0 * d[axis] / max_d).round() as i32).max(1)
            };
            assert!(
                n_voxels[axis] < (1 << 20),
                "voxel grid dimension {} would overflow its 20-bit packed slot",
                n_voxels[axis]
            );
        }

        let n_buckets = 4 * (n_voxels[0] * n_voxels[1] * n_voxels[2]) as usize;
        Self { lights, world_bound, n_voxels, cache: Mutex::new(HashMap::with_capacity(n_buckets)) }
    }

    fn voxel_center(&self, v: [i32; 3]) -> Point3f {
        let diag = self.world_bound.diagonal();
        Point3f::new(
            self.world_bound.min.x + (v[0] as Float + 0.5) / self.n_voxels[0] as Float * diag.x,
            self.world_bound.min.y + (v[1] as Float + 0.5) / self.n_voxels[1] as Float * diag.y,
            self.world_bound.min.z + (v[2] as Float + 0.5) / self.n_voxels[2] as Float * diag.z,
        )
    }

    fn compute_distribution(&self, v: [i32; 3]) -> Distribution1D {
        let p = self.voxel_center(v);
        let hit = SurfaceHit { p, p_err: Vec3f::new(0.0, 0.0, 0.0), time: 0.0, n: Normal3::new(0.0, 0.0, 0.0) };

        let mut func = vec![0.0; self.lights.len().max(1)];
        if !self.lights.is_empty() {
            for i in 0..SPATIAL_SAMPLES_PER_VOXEL {
                let u = halton_2d(i);
                for (j, light) in self.lights.iter().enumerate() {
                    let sample = light.sample_incident_radiance(&hit, u);
                    if sample.pdf > 0.0 {
                        func[j] += sample.radiance.y() / sample.pdf;
                    }
                }
            }
        }

        let sum: Float = func.iter().sum();
        if sum <= 0.0 {
            func.iter_mut().for_each(|v| *v = 1.0);
        } else {
            let floor = 0.01 * sum / func.len() as Float;
            for v in func.iter_mut() {
                *v = v.max(floor);
            }
        }
        Distribution1D::new(&func)
    }
}

impl LightDistribution for SpatialLightDistribution {
    fn lookup(&self, p: Point3f) -> Arc<Distribution1D> {
        let offset = self.world_bound.offset(&p);
        let axes = [offset.x, offset.y, offset.z];
        let mut v = [0i32; 3];
        for axis in 0..3 {
            v[axis] = ((axes[axis] * self.n_voxels[axis] as Float) as i32).clamp(0, self.n_voxels[axis] - 1);
        }

        let key = voxel_key(v);
        if let Some(dist) = self.cache.lock().get(&key) {
            return dist.clone();
        }

        let dist = Arc::new(self.compute_distribution(v));
        let mut cache = self.cache.lock();
        cache.entry(key).or_insert_with(|| dist.clone()).clone()
    }
}

fn voxel_key(v: [i32; 3]) -> u64 {
    let packed = (v[0] as u64) | ((v[1] as u64) << 20) | ((v[2] as u64) << 40);
    mix_bits(packed)
}

/// Zimbry's 64-bit finalizer, used to spread packed voxel coordinates
/// across the hash table's buckets.
fn mix_bits(mut v: u64) -> u64 {
    v ^= v >> 31;
    v = v.wrapping_mul(0x7fb5d329728ea185);
    v ^= v >> 27;
    v = v.wrapping_mul(0x81dadef4bc2dd44d);
    v ^= v >> 33;
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::point::PointLight;
    use crate::spectrum::Spectrum;
    use crate::Transform;

    fn sample_lights() -> Vec<Arc<dyn Light>> {
        vec![
            Arc::new(PointLight::new(Transform::IDENTITY, Spectrum::uniform(1.0))),
            Arc::new(PointLight::new(Transform::translate(Vec3f::new(5.0, 0.0, 0.0)), Spectrum::uniform(4.0))),
        ]
    }

    #[test]
    fn uniform_distribution_weighs_lights_equally() {
        let lights = sample_lights();
        let dist = UniformLightDistribution::new(&lights);
        assert_eq!(dist.lookup(Point3f::new(0.0, 0.0, 0.0)).count(), 2);
        assert!((dist.lookup(Point3f::new(0.0, 0.0, 0.0)).discrete_pdf(0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn power_distribution_favors_brighter_light() {
        let lights = sample_lights();
        let dist = PowerLightDistribution::new(&lights);
        let d = dist.lookup(Point3f::new(0.0, 0.0, 0.0));
        assert!(d.discrete_pdf(1) > d.discrete_pdf(0));
    }

    #[test]
    fn spatial_distribution_caches_per_voxel() {
        let lights = sample_lights();
        let bound = Bounds3f::with_bounds(Point3f::new(-10.0, -10.0, -10.0), Point3f::new(10.0, 10.0, 10.0));
        let dist = SpatialLightDistribution::new(lights, bound);
        let a = dist.lookup(Point3f::new(-9.0, -9.0, -9.0));
        let b = dist.lookup(Point3f::new(-9.0, -9.0, -9.0));
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn voxel_key_is_stable_for_same_input() {
        assert_eq!(voxel_key([1, 2, 3]), voxel_key([1, 2, 3]));
        assert_ne!(voxel_key([1, 2, 3]), voxel_key([3, 2, 1]));
    }
}
