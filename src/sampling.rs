//! Low-level Monte Carlo sampling helpers: disk/hemisphere warps, the power
//! heuristic for multiple importance sampling, and the piecewise-constant
//! `Distribution1D` used to importance-sample lights by power.

use crate::{Float, Point2f, Point3f, Vec2f, Vec3f};
use rand::Rng;
use std::f32;

pub fn concentric_sample_disk(u: Point2f) -> Point2f {
    // map sample from [0, 1] to [-1, 1]
    let u_offset = 2.0 * u - Vec2f::new(1.0, 1.0);
    if u_offset.x == 0.0 && u_offset.y == 0.0 {
        return Point2f::new(0.0, 0.0);
    }

    let (r, theta) = if u_offset.x.abs() > u_offset.y.abs() {
        (u_offset.x, f32::consts::FRAC_PI_4 * (u_offset.y / u_offset.x))
    } else {
        (u_offset.y, f32::consts::FRAC_PI_2 - f32::consts::FRAC_PI_4 * (u_offset.x / u_offset.y))
    };

    r * Point2f::new(theta.cos(), theta.sin())
}

pub fn cosine_sample_hemisphere(u: Point2f) -> Vec3f {
    let d = concentric_sample_disk(u);
    let z = Float::sqrt(Float::max(0.0, 1.0 - d.x * d.x - d.y * d.y));
    Vec3f::new(d.x, d.y, z)
}

pub fn uniform_sample_sphere(u: Point2f) -> Vec3f {
    let z = 1.0 - 2.0 * u.x;
    let r = Float::max(0.0, 1.0 - z * z).sqrt();
    let phi = 2.0 * crate::consts::PI * u.y;
    Vec3f::new(r * phi.cos(), r * phi.sin(), z)
}

pub fn rejection_sample_sphere(rng: &mut impl Rng, radius: Float) -> Point3f {
    loop {
        let x = rng.gen_range(-radius, radius);
        let y = rng.gen_range(-radius, radius);
        let z = rng.gen_range(-radius, radius);
        let d = x * x + y * y + z * z;
        if d < radius * radius {
            return Point3f::new(x, y, z);
        }
    }
}

/// The power heuristic (beta = 2) for weighting two sampling strategies in
/// multiple importance sampling: `nf` samples were drawn with density
/// `f_pdf`, `ng` with density `g_pdf`; returns the weight to apply to an
/// `f`-strategy sample.
pub fn power_heuristic(nf: i32, f_pdf: Float, ng: i32, g_pdf: Float) -> Float {
    let f = nf as Float * f_pdf;
    let g = ng as Float * g_pdf;
    if f == 0.0 && g == 0.0 {
        return 0.0;
    }
    (f * f) / (f * f + g * g)
}

/// Fill `samples` with `samples.len()` 1D stratified samples over `[0, 1)`,
/// one per bin, jittered within the bin unless `jitter` is false.
pub fn stratified_sample_1d(samples: &mut [Float], rng: &mut impl Rng, jitter: bool) {
    let n = samples.len();
    let inv_n = 1.0 / n as Float;
    for (i, s) in samples.iter_mut().enumerate() {
        let delta = if jitter { rng.gen() } else { 0.5 };
        *s = ((i as Float + delta) * inv_n).min(1.0 - Float::EPSILON);
    }
}

/// Fill `samples` (length `nx * ny`) with a jittered `nx` by `ny` grid of 2D
/// stratified samples over the unit square.
pub fn stratified_sample_2d(samples: &mut [Point2f], nx: usize, ny: usize, rng: &mut impl Rng, jitter: bool) {
    let dx = 1.0 / nx as Float;
    let dy = 1.0 / ny as Float;
    let mut samples = samples.iter_mut();
    for y in 0..ny {
        for x in 0..nx {
            let (jx, jy) = if jitter { (rng.gen(), rng.gen()) } else { (0.5, 0.5) };
            *samples.next().expect("samples buffer sized nx * ny") = Point2f::new(
                ((x as Float + jx) * dx).min(1.0 - Float::EPSILON),
                ((y as Float + jy) * dy).min(1.0 - Float::EPSILON),
            );
        }
    }
}

/// Latin hypercube sampling of `samples.len()` 2D points: each coordinate is
/// independently stratified into `samples.len()` bins, then the per-axis
/// orderings are shuffled so pairs don't correlate. Used for array-valued
/// samples (e.g. a light's stratified shadow-ray set) where the count isn't
/// a convenient `nx * ny` grid.
pub fn latin_hypercube_2d(samples: &mut [Point2f], rng: &mut impl Rng) {
    let n = samples.len();
    let inv_n = 1.0 / n as Float;
    for (i, s) in samples.iter_mut().enumerate() {
        s.x = ((i as Float + rng.gen::<Float>()) * inv_n).min(1.0 - Float::EPSILON);
        s.y = ((i as Float + rng.gen::<Float>()) * inv_n).min(1.0 - Float::EPSILON);
    }
    for i in (1..n).rev() {
        let other = rng.gen_range(0, i + 1);
        let x = samples[i].x;
        samples[i].x = samples[other].x;
        samples[other].x = x;
    }
    for i in (1..n).rev() {
        let other = rng.gen_range(0, i + 1);
        let y = samples[i].y;
        samples[i].y = samples[other].y;
        samples[other].y = y;
    }
}

/// Fisher-Yates shuffle, used to decorrelate the stratified 1D/2D samples
/// generated per dimension so different dimensions don't share structure.
pub fn shuffle<T>(samples: &mut [T], rng: &mut impl Rng) {
    for i in (1..samples.len()).rev() {
        let other = rng.gen_range(0, i + 1);
        samples.swap(i, other);
    }
}

/// A piecewise-constant 1D probability distribution over `[0, 1)`, built
/// from a function sampled at `n` equal-width intervals. Used to
/// importance-sample lights by power and, per-voxel, inside
/// `SpatialLightDistribution`'s tables.
#[derive(Clone, Debug)]
pub struct Distribution1D {
    func: Vec<Float>,
    cdf: Vec<Float>,
    func_integral: Float,
}

impl Distribution1D {
    pub fn new(func: &[Float]) -> Self {
        let n = func.len();
        let mut cdf = vec![0.0; n + 1];
        for i in 1..=n {
            cdf[i] = cdf[i - 1] + func[i - 1] / n as Float;
        }

        let func_integral = cdf[n];
        if func_integral == 0.0 {
            for (i, c) in cdf.iter_mut().enumerate().skip(1) {
                *c = i as Float / n as Float;
            }
        } else {
            for c in cdf.iter_mut().skip(1) {
                *c /= func_integral;
            }
        }

        Distribution1D { func: func.to_vec(), cdf, func_integral }
    }

    pub fn count(&self) -> usize {
        self.func.len()
    }

    pub fn func_integral(&self) -> Float {
        self.func_integral
    }

    /// Sample a continuous value in `[0, 1)`, returning `(value, pdf, offset)`
    /// where `offset` is the interval the sample landed in.
    pub fn sample_continuous(&self, u: Float) -> (Float, Float, usize) {
        let offset = self.find_interval(u);

        let mut du = u - self.cdf[offset];
        let denom = self.cdf[offset + 1] - self.cdf[offset];
        if denom > 0.0 {
            du /= denom;
        }

        let pdf = if self.func_integral > 0.0 {
            self.func[offset] / self.func_integral
        } else {
            0.0
        };

        let value = (offset as Float + du) / self.count() as Float;
        (value, pdf, offset)
    }

    /// Sample one of the `n` discrete intervals with probability
    /// proportional to its function value, returning `(index, pdf, remapped_u)`.
    pub fn sample_discrete(&self, u: Float) -> (usize, Float, Float) {
        let offset = self.find_interval(u);
        let pdf = if self.func_integral > 0.0 {
            self.func[offset] / (self.func_integral * self.count() as Float)
        } else {
            0.0
        };
        let denom = self.cdf[offset + 1] - self.cdf[offset];
        let u_remapped = if denom > 0.0 { (u - self.cdf[offset]) / denom } else { 0.0 };
        (offset, pdf, u_remapped)
    }

    pub fn discrete_pdf(&self, index: usize) -> Float {
        if self.func_integral > 0.0 {
            self.func[index] / (self.func_integral * self.count() as Float)
        } else {
            0.0
        }
    }

    fn find_interval(&self, u: Float) -> usize {
        let mut lo = 0usize;
        let mut hi = self.cdf.len() - 1;
        while lo + 1 < hi {
            let mid = (lo + hi) / 2;
            if self.cdf[mid] <= u {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo.min(self.func.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_heuristic_balances_equal_strategies() {
        let w = power_heuristic(1, 2.0, 1, 2.0);
        assert!((w - 0.5).abs() < 1e-6);
    }

    #[test]
    fn power_heuristic_favors_lower_variance_strategy() {
        let w = power_heuristic(1, 4.0, 1, 1.0);
        assert!(w > 0.9);
    }

    #[test]
    fn distribution1d_uniform_matches_uniform_pdf() {
        let dist = Distribution1D::new(&[1.0, 1.0, 1.0, 1.0]);
        let (_, pdf, _) = dist.sample_continuous(0.1);
        assert!((pdf - 1.0).abs() < 1e-5);
    }

    #[test]
    fn distribution1d_weights_toward_larger_bucket() {
        let dist = Distribution1D::new(&[1.0, 9.0]);
        let (idx, pdf, _) = dist.sample_discrete(0.95);
        assert_eq!(idx, 1);
        assert!((pdf - 0.9).abs() < 1e-5);
    }

    #[test]
    fn concentric_sample_disk_stays_in_unit_disk() {
        let p = concentric_sample_disk(Point2f::new(0.7, 0.3));
        assert!(p.x * p.x + p.y * p.y <= 1.0 + 1e-5);
    }

    #[test]
    fn stratified_sample_1d_one_per_bin() {
        let mut rng = rand::thread_rng();
        let mut samples = vec![0.0; 8];
        stratified_sample_1d(&mut samples, &mut rng, true);
        let mut sorted = samples.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for (i, &s) in sorted.iter().enumerate() {
            let lo = i as Float / 8.0;
            let hi = (i + 1) as Float / 8.0;
            assert!(s >= lo && s < hi);
        }
    }

    #[test]
    fn stratified_sample_2d_covers_grid_cells() {
        let mut rng = rand::thread_rng();
        let mut samples = vec![Point2f::new(0.0, 0.0); 6];
        stratified_sample_2d(&mut samples, 3, 2, &mut rng, true);
        for p in &samples {
            assert!(p.x >= 0.0 && p.x < 1.0);
            assert!(p.y >= 0.0 && p.y < 1.0);
        }
    }

    #[test]
    fn latin_hypercube_2d_stays_in_unit_square() {
        let mut rng = rand::thread_rng();
        let mut samples = vec![Point2f::new(0.0, 0.0); 16];
        latin_hypercube_2d(&mut samples, &mut rng);
        for p in &samples {
            assert!(p.x >= 0.0 && p.x < 1.0);
            assert!(p.y >= 0.0 && p.y < 1.0);
        }
    }
}
