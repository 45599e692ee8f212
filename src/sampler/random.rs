use crate::{Point2i, Point2f, Float};
use rand_xoshiro::Xoshiro256Plus;
use rand::{SeedableRng, Rng};
use crate::sampler::{Sampler, SamplerState};

/// The simplest possible sampler: every dimension is an independent draw
/// from the RNG, no stratification or low-discrepancy structure at all.
/// Useful as a baseline to compare the stratified sampler's variance
/// reduction against.
pub struct RandomSampler {
    state: SamplerState,
    rng: Xoshiro256Plus,
}

impl RandomSampler {
    pub fn new_with_seed(samples_per_pixel: usize, seed: u64) -> Self {
        Self {
            state: SamplerState::new(samples_per_pixel),
            rng: Xoshiro256Plus::seed_from_u64(seed),
        }
    }
}

impl Sampler for RandomSampler {
    fn start_pixel(&mut self, pixel: Point2i) {
        self.state.start_pixel(pixel);
    }

    fn start_next_sample(&mut self) -> bool {
        self.state.start_next_sample()
    }

    fn get_1d(&mut self) -> Float {
        self.rng.gen()
    }

    fn get_2d(&mut self) -> Point2f {
        Point2f::new(self.rng.gen(), self.rng.gen())
    }

    fn request_1d_array(&mut self, len: usize) {
        self.state.request_1d_array(len);
    }

    fn request_2d_array(&mut self, len: usize) {
        self.state.request_2d_array(len);
    }

    fn get_1d_array(&mut self, len: usize) -> &[Float] {
        self.state.get_1d_array(len)
    }

    fn get_2d_array(&mut self, len: usize) -> &[Point2f] {
        self.state.get_2d_array(len)
    }

    fn clone_with_seed(&self, seed: u64) -> Box<dyn Sampler> {
        Box::new(Self::new_with_seed(self.state.samples_per_pixel, seed))
    }

    fn samples_per_pixel(&self) -> usize {
        self.state.samples_per_pixel
    }

    fn set_sample_number(&mut self, sample_num: u64) -> bool {
        self.state.set_sample_number(sample_num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_sampler_1d_samples_stay_in_unit_interval() {
        let mut sampler = RandomSampler::new_with_seed(16, 42);
        sampler.start_pixel(Point2i::new(0, 0));
        for _ in 0..16 {
            let s = sampler.get_1d();
            assert!(s >= 0.0 && s < 1.0);
        }
    }

    #[test]
    fn random_sampler_runs_requested_spp() {
        let mut sampler = RandomSampler::new_with_seed(10, 1);
        sampler.start_pixel(Point2i::new(0, 0));
        let mut count = 1;
        while sampler.start_next_sample() {
            count += 1;
        }
        assert_eq!(count, 10);
    }
}
