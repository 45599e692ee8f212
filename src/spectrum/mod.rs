//! Spectral power distributions. `Spectrum<S>` is a thin generic wrapper
//! over a fixed-size coefficient array; `SampledSpectrum` (60 bins across
//! 400-700nm) is the renderer's working representation, `RGBSpectrum` is
//! used only where a value is already known to be three-channel (texture
//! maps, final framebuffer output).

use crate::Float;
use std::ops::{Add, Sub, AddAssign, SubAssign, Mul, MulAssign, Div, DivAssign, Index, IndexMut, Deref};

pub fn xyz_to_rgb(xyz: [Float; 3]) -> [Float; 3] {
    let mut rgb = [0.0; 3];
    rgb[0] =  3.240479*xyz[0] - 1.537150*xyz[1] - 0.498535*xyz[2];
    rgb[1] = -0.969256*xyz[0] + 1.875991*xyz[1] + 0.041556*xyz[2];
    rgb[2] =  0.055648*xyz[0] - 0.204043*xyz[1] + 1.057311*xyz[2];
    rgb
}

pub fn rgb_to_xyz(rgb: [Float; 3]) -> [Float; 3] {
    let mut xyz = [0.0; 3];
    xyz[0] = 0.412453*rgb[0] + 0.357580*rgb[1] + 0.180423*rgb[2];
    xyz[1] = 0.212671*rgb[0] + 0.715160*rgb[1] + 0.072169*rgb[2];
    xyz[2] = 0.019334*rgb[0] + 0.119193*rgb[1] + 0.950227*rgb[2];
    xyz
}

pub trait CoefficientSpectrum: Index<usize, Output=Float> + IndexMut<usize, Output=Float> + Copy {
    const N_SAMPLES: usize;

    fn new(v: Float) -> Self;

    fn to_xyz(&self) -> [Float; 3];

    fn to_rgb(&self) -> [Float; 3];
}

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Spectrum<S: CoefficientSpectrum=SampledSpectrum>(S);

impl<S: CoefficientSpectrum> Spectrum<S> {
    pub fn new(v: Float) -> Self {
        Self(S::new(v))
    }

    /// Alias for `new`; reads better at call sites constructing a flat,
    /// wavelength-independent spectrum (e.g. `Spectrum::uniform(1.0)`).
    pub fn uniform(v: Float) -> Self {
        Self::new(v)
    }

    pub fn sqrt(&self) -> Self {
        let mut res = S::new(0.0);
        for i in 0..S::N_SAMPLES {
            res[i] = self.0[i].sqrt();
        }
        Self(res)
    }

    pub fn lerp(t: Float, s1: Self, s2: Self) -> Self {
        (1.0 - t) * s1 + t * s2
    }

    pub fn clamp(&self, low: Float, high: Float) -> Self {
        let mut ret = S::new(0.0);
        for i in 0..S::N_SAMPLES {
            ret[i] = self.0[i].clamp(low, high);
        }
        Self(ret)
    }

    pub fn clamp_positive(&self) -> Self {
        self.clamp(0.0, std::f32::INFINITY)
    }

    pub fn is_black(&self) -> bool {
        for i in 0..S::N_SAMPLES {
            if self.0[i] != 0.0 { return false; }
        }
        true
    }

    pub fn has_nans(&self) -> bool {
        for i in 0..S::N_SAMPLES {
            if self.0[i].is_nan() { return true }
        }
        false
    }

    /// True if any coefficient is NaN, infinite, or negative — none of
    /// which a physically valid radiance sample can be.
    pub fn has_invalid(&self) -> bool {
        for i in 0..S::N_SAMPLES {
            let v = self.0[i];
            if v.is_nan() || v.is_infinite() || v < 0.0 {
                return true;
            }
        }
        false
    }

    /// Largest coefficient, used by the path integrator's Russian roulette
    /// termination test.
    pub fn max_component_value(&self) -> Float {
        let mut m = self.0[0];
        for i in 1..S::N_SAMPLES {
            m = m.max(self.0[i]);
        }
        m
    }

    /// Mean coefficient.
    pub fn average(&self) -> Float {
        let mut sum = 0.0;
        for i in 0..S::N_SAMPLES {
            sum += self.0[i];
        }
        sum / S::N_SAMPLES as Float
    }

    /// Luminance (CIE Y).
    pub fn y(&self) -> Float {
        self.0.to_xyz()[1]
    }
}

impl<S: CoefficientSpectrum> std::iter::Sum for Spectrum<S> {
    fn sum<I: Iterator<Item=Self>>(iter: I) -> Self {
        iter.fold(Self::new(0.0), Add::add)
    }
}

impl From<Spectrum<RGBSpectrum>> for [Float; 3] {
    fn from(s: Spectrum<RGBSpectrum>) -> Self {
        s.c
    }
}

impl From<[Float; 3]> for Spectrum<RGBSpectrum> {
    fn from(c: [Float; 3]) -> Self {
        Self(RGBSpectrum{ c })
    }
}

impl<S: CoefficientSpectrum> Deref for Spectrum<S> {
    type Target = S;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}


#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct RGBSpectrum {
    c: [Float; 3]
}

impl RGBSpectrum {
}

impl CoefficientSpectrum for RGBSpectrum {
    const N_SAMPLES: usize = 3;

    fn new(v: Float) -> Self {
        Self {c: [v; 3]}
    }

    fn to_xyz(&self) -> [Float; 3] {
        rgb_to_xyz(self.c)
    }

    fn to_rgb(&self) -> [Float; 3] {
        self.c
    }
}

impl Index<usize> for RGBSpectrum {
    type Output = Float;

    fn index(&self, index: usize) -> &Self::Output {
        &self.c[index]
    }
}

impl IndexMut<usize> for RGBSpectrum {

    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.c[index]
    }
}

//
// Spectrum (op) Spectrum
//

impl<S> Add for Spectrum<S> where S: CoefficientSpectrum {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        let mut ret = S::new(0.0);
        for i in 0..S::N_SAMPLES {
            ret[i] = self.0[i] + rhs.0[i];
        }
        Self(ret)
    }
}

impl<S> AddAssign for Spectrum<S> where S: CoefficientSpectrum {
    fn add_assign(&mut self, rhs: Self) {
        for i in 0..S::N_SAMPLES {
            self.0[i] += rhs.0[i]
        }
    }
}

impl<S> Sub for Spectrum<S> where S: CoefficientSpectrum {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        let mut ret = S::new(0.0);
        for i in 0..S::N_SAMPLES {
            ret[i] = self.0[i] - rhs.0[i];
        }
        Self(ret)
    }
}

impl<S> SubAssign for Spectrum<S> where S: CoefficientSpectrum {
    fn sub_assign(&mut self, rhs: Self) {
        for i in 0..S::N_SAMPLES {
            self.0[i] -= rhs.0[i]
        }
    }
}

impl<S> Mul for Spectrum<S> where S: CoefficientSpectrum {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        let mut ret = S::new(0.0);
        for i in 0..S::N_SAMPLES {
            ret[i] = self.0[i] * rhs.0[i];
        }
        Self(ret)
    }
}

impl<S> MulAssign for Spectrum<S> where S: CoefficientSpectrum {
    fn mul_assign(&mut self, rhs: Self) {
        for i in 0..S::N_SAMPLES {
            self.0[i] *= rhs.0[i]
        }
    }
}

impl<S> Div for Spectrum<S> where S: CoefficientSpectrum {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        let mut ret = S::new(0.0);
        for i in 0..S::N_SAMPLES {
            ret[i] = self.0[i] / rhs.0[i];
        }
        Self(ret)
    }
}

impl<S> DivAssign for Spectrum<S> where S: CoefficientSpectrum {
    fn div_assign(&mut self, rhs: Self) {
        for i in 0..S::N_SAMPLES {
            self.0[i] /= rhs.0[i]
        }
    }
}

impl<S> std::ops::Neg for Spectrum<S> where S: CoefficientSpectrum {
    type Output = Self;

    fn neg(self) -> Self {
        let mut ret = S::new(0.0);
        for i in 0..S::N_SAMPLES {
            ret[i] = -self.0[i]
        }
        Self(ret)
    }
}

//
// Float (op) Spectrum
//

impl<S> Mul<Spectrum<S>> for Float where S: CoefficientSpectrum {
    type Output = Spectrum<S>;

    fn mul(self, rhs: Spectrum<S>) -> Self::Output {
        let mut ret = S::new(0.0);
        for i in 0..S::N_SAMPLES {
            ret[i] = self * rhs.0[i];
        }
        Spectrum(ret)
    }
}

impl<S> Add<Spectrum<S>> for Float where S: CoefficientSpectrum {
    type Output = Spectrum<S>;

    fn add(self, rhs: Spectrum<S>) -> Self::Output {
        let mut ret = S::new(0.0);
        for i in 0..S::N_SAMPLES {
            ret[i] = self + rhs.0[i];
        }
        Spectrum(ret)
    }
}

//
// Spectrum (op) Float
//

impl<S> Mul<Float> for Spectrum<S> where S: CoefficientSpectrum {
    type Output = Spectrum<S>;

    fn mul(self, rhs: Float) -> Self::Output {
        let mut ret = S::new(0.0);
        for i in 0..S::N_SAMPLES {
            ret[i] = self[i] * rhs;
        }
        Spectrum(ret)
    }
}

impl<S> Div<Float> for Spectrum<S> where S: CoefficientSpectrum {
    type Output = Spectrum<S>;

    fn div(self, rhs: Float) -> Self::Output {
        let mut ret = S::new(0.0);
        for i in 0..S::N_SAMPLES {
            ret[i] = self[i] / rhs;
        }
        Spectrum(ret)
    }
}

impl<S> Sub<Float> for Spectrum<S> where S: CoefficientSpectrum {
    type Output = Spectrum<S>;

    fn sub(self, rhs: Float) -> Self::Output {
        let mut ret = S::new(0.0);
        for i in 0..S::N_SAMPLES {
            ret[i] = self[i] - rhs;
        }
        Spectrum(ret)
    }
}

impl<S> Add<Float> for Spectrum<S> where S: CoefficientSpectrum {
    type Output = Spectrum<S>;

    fn add(self, rhs: Float) -> Self::Output {
        let mut ret = S::new(0.0);
        for i in 0..S::N_SAMPLES {
            ret[i] = self[i] + rhs;
        }
        Spectrum(ret)
    }
}

pub const SAMPLED_LAMBDA_START: Float = 400.0;
pub const SAMPLED_LAMBDA_END: Float = 700.0;
pub const N_SPECTRAL_SAMPLES: usize = 60;

fn lerp(t: Float, a: Float, b: Float) -> Float {
    a + t * (b - a)
}

/// A Gaussian lobe, used below to build closed-form approximations of the
/// CIE 1931 XYZ color matching curves instead of carrying their full tables.
fn gaussian(x: Float, alpha: Float, mu: Float, sigma1: Float, sigma2: Float) -> Float {
    let sigma = if x < mu { sigma1 } else { sigma2 };
    alpha * (-0.5 * ((x - mu) / sigma).powi(2)).exp()
}

fn cie_x(lambda: Float) -> Float {
    gaussian(lambda, 1.056, 599.8, 37.9, 31.0)
        + gaussian(lambda, 0.362, 442.0, 16.0, 26.7)
        + gaussian(lambda, -0.065, 501.1, 20.4, 26.2)
}

fn cie_y(lambda: Float) -> Float {
    gaussian(lambda, 0.821, 568.8, 46.9, 40.5) + gaussian(lambda, 0.286, 530.9, 16.3, 31.1)
}

fn cie_z(lambda: Float) -> Float {
    gaussian(lambda, 1.217, 437.0, 11.8, 36.0) + gaussian(lambda, 0.681, 459.0, 26.0, 13.8)
}

/// Integral of the CIE Y matching curve over the visible range; normalizes
/// `SampledSpectrum::to_xyz` so an equal-energy white spectrum maps to `Y=1`.
const CIE_Y_INTEGRAL: Float = 106.856895;

/// Average the piecewise-linear function described by `samples` over
/// `[lambda0, lambda1)`. `samples` must be sorted by wavelength. Used both to
/// bin irregularly-sampled measured spectra into our 60 bins and to upsample
/// RGB triples, so a bin always reflects the mean power across its range
/// rather than a single point sample at the bin's center.
fn average_samples(samples: &[(Float, Float)], lambda0: Float, lambda1: Float) -> Float {
    if samples.is_empty() {
        return 0.0;
    }
    if samples.len() == 1 || lambda1 <= samples[0].0 {
        return samples[0].1;
    }
    if lambda0 >= samples[samples.len() - 1].0 {
        return samples[samples.len() - 1].1;
    }

    let interp = |lambda: Float, i: usize| -> Float {
        let (l0, v0) = samples[i];
        let (l1, v1) = samples[i + 1];
        if l1 == l0 {
            v0
        } else {
            lerp((lambda - l0) / (l1 - l0), v0, v1)
        }
    };

    let mut sum = 0.0;
    let lo = lambda0.max(samples[0].0);
    let hi = lambda1.min(samples[samples.len() - 1].0);

    let mut i = 0;
    while i + 1 < samples.len() && samples[i + 1].0 < lo {
        i += 1;
    }

    let mut seg_start = lo;
    while seg_start < hi && i + 1 < samples.len() {
        let seg_end = samples[i + 1].0.min(hi);
        if seg_end > seg_start {
            let v_start = interp(seg_start, i);
            let v_end = interp(seg_end, i);
            sum += 0.5 * (v_start + v_end) * (seg_end - seg_start);
        }
        seg_start = seg_end;
        if seg_start >= samples[i + 1].0 {
            i += 1;
        }
    }
    sum / (lambda1 - lambda0)
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SampledSpectrum {
    c: [Float; N_SPECTRAL_SAMPLES],
}

impl Default for SampledSpectrum {
    fn default() -> Self {
        CoefficientSpectrum::new(0.0)
    }
}

impl SampledSpectrum {
    /// Bin arbitrary (possibly irregularly-spaced) `(wavelength, value)`
    /// measurements into the 60 fixed bins, averaging within each bin's
    /// `[lambda_i, lambda_{i+1})` range rather than sampling at its midpoint.
    pub fn from_sampled(lambdas: &[Float], values: &[Float]) -> Self {
        assert_eq!(lambdas.len(), values.len());
        let mut pairs: Vec<(Float, Float)> =
            lambdas.iter().copied().zip(values.iter().copied()).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

        let mut c = [0.0; N_SPECTRAL_SAMPLES];
        for (i, slot) in c.iter_mut().enumerate() {
            let lambda0 = lerp(
                i as Float / N_SPECTRAL_SAMPLES as Float,
                SAMPLED_LAMBDA_START,
                SAMPLED_LAMBDA_END,
            );
            let lambda1 = lerp(
                (i + 1) as Float / N_SPECTRAL_SAMPLES as Float,
                SAMPLED_LAMBDA_START,
                SAMPLED_LAMBDA_END,
            );
            *slot = average_samples(&pairs, lambda0, lambda1);
        }
        SampledSpectrum { c }
    }

    /// Upsample an RGB triple into a plausible smooth spectrum: three broad
    /// Gaussian primaries mixed by the channel weights, then rebinned the
    /// same way measured data is. Not a spectral-reflectance-accurate
    /// upsampling (that needs the full Smits/Meng basis tables), but close
    /// enough for light and material color parameters given only as RGB.
    pub fn from_rgb(rgb: [Float; 3]) -> Self {
        let n = N_SPECTRAL_SAMPLES;
        let mut lambdas = Vec::with_capacity(n);
        let mut values = Vec::with_capacity(n);
        for i in 0..n {
            let lambda = lerp(
                (i as Float + 0.5) / n as Float,
                SAMPLED_LAMBDA_START,
                SAMPLED_LAMBDA_END,
            );
            let r = gaussian(lambda, 1.0, 630.0, 40.0, 60.0);
            let g = gaussian(lambda, 1.0, 532.0, 35.0, 35.0);
            let b = gaussian(lambda, 1.0, 465.0, 45.0, 25.0);
            lambdas.push(lambda);
            values.push(rgb[0] * r + rgb[1] * g + rgb[2] * b);
        }
        Self::from_sampled(&lambdas, &values)
    }
}

impl CoefficientSpectrum for SampledSpectrum {
    const N_SAMPLES: usize = N_SPECTRAL_SAMPLES;

    fn new(v: Float) -> Self {
        SampledSpectrum { c: [v; N_SPECTRAL_SAMPLES] }
    }

    fn to_xyz(&self) -> [Float; 3] {
        let mut xyz = [0.0; 3];
        for i in 0..N_SPECTRAL_SAMPLES {
            let lambda = lerp(
                (i as Float + 0.5) / N_SPECTRAL_SAMPLES as Float,
                SAMPLED_LAMBDA_START,
                SAMPLED_LAMBDA_END,
            );
            xyz[0] += cie_x(lambda) * self.c[i];
            xyz[1] += cie_y(lambda) * self.c[i];
            xyz[2] += cie_z(lambda) * self.c[i];
        }
        let scale = (SAMPLED_LAMBDA_END - SAMPLED_LAMBDA_START)
            / (CIE_Y_INTEGRAL * N_SPECTRAL_SAMPLES as Float);
        for v in xyz.iter_mut() {
            *v *= scale;
        }
        xyz
    }

    fn to_rgb(&self) -> [Float; 3] {
        xyz_to_rgb(self.to_xyz())
    }
}

impl Index<usize> for SampledSpectrum {
    type Output = Float;

    fn index(&self, index: usize) -> &Self::Output {
        &self.c[index]
    }
}

impl IndexMut<usize> for SampledSpectrum {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.c[index]
    }
}

impl From<Spectrum<SampledSpectrum>> for [Float; 3] {
    fn from(s: Spectrum<SampledSpectrum>) -> Self {
        s.to_rgb()
    }
}

impl From<[Float; 3]> for Spectrum<SampledSpectrum> {
    fn from(rgb: [Float; 3]) -> Self {
        Spectrum(SampledSpectrum::from_rgb(rgb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iter_sum() {
        let spectra = vec![
            Spectrum::<RGBSpectrum>::new(1.0),
            Spectrum::<RGBSpectrum>::from([0.0, 1.0, 0.5]),
        ];
        let sum: Spectrum<RGBSpectrum> = spectra.into_iter().sum();
        assert_eq!(sum, Spectrum::<RGBSpectrum>::from([1.0, 2.0, 1.5]));
    }

    #[test]
    fn sampled_spectrum_uniform_is_near_achromatic() {
        let white = Spectrum::<SampledSpectrum>::new(1.0);
        let rgb = white.to_rgb();
        assert!((rgb[0] - rgb[1]).abs() < 0.1);
        assert!((rgb[1] - rgb[2]).abs() < 0.1);
    }

    #[test]
    fn sampled_spectrum_roundtrips_through_rgb_approximately() {
        let original = [0.8, 0.2, 0.1];
        let spec = Spectrum::<SampledSpectrum>::from(original);
        let rgb = spec.to_rgb();
        // hue should roughly survive a Gaussian-primary upsample + CIE downsample
        assert!(rgb[0] > rgb[1] && rgb[1] > rgb[2]);
    }

    #[test]
    fn average_samples_matches_constant_value() {
        let samples = [(400.0, 2.0), (700.0, 2.0)];
        let avg = average_samples(&samples, 450.0, 550.0);
        assert!((avg - 2.0).abs() < 1e-4);
    }

    #[test]
    fn average_samples_handles_ramp() {
        let samples = [(0.0, 0.0), (100.0, 100.0)];
        // mean of a linear ramp over its full domain is its midpoint value
        let avg = average_samples(&samples, 0.0, 100.0);
        assert!((avg - 50.0).abs() < 1e-3);
    }
}
