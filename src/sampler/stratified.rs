use crate::{Float, Point2f, Point2i};
use crate::sampler::{PixelSampler, Sampler};
use crate::sampling::{latin_hypercube_2d, shuffle, stratified_sample_1d, stratified_sample_2d};

/// Jittered-grid stratified sampler: per-pixel 1D samples are one-per-bin,
/// 2D samples fall one per cell of an `x_pixel_samples` by `y_pixel_samples`
/// grid, and requested sample arrays use Latin hypercube sampling (an
/// arbitrary array length isn't generally factorable into a clean grid).
pub struct StratifiedSampler {
    pixel: PixelSampler,
    x_pixel_samples: usize,
    y_pixel_samples: usize,
    jitter_samples: bool,
    n_sampled_dimensions: usize,
}

impl StratifiedSampler {
    pub fn new(
        x_pixel_samples: usize,
        y_pixel_samples: usize,
        jitter_samples: bool,
        n_sampled_dimensions: usize,
        seed: u64,
    ) -> Self {
        let samples_per_pixel = x_pixel_samples * y_pixel_samples;
        Self {
            pixel: PixelSampler::new(samples_per_pixel, n_sampled_dimensions, seed),
            x_pixel_samples,
            y_pixel_samples,
            jitter_samples,
            n_sampled_dimensions,
        }
    }
}

impl Sampler for StratifiedSampler {
    fn start_pixel(&mut self, p: Point2i) {
        let spp = self.pixel.state.samples_per_pixel;
        let jitter = self.jitter_samples;

        for samples in self.pixel.samples_1d.iter_mut() {
            stratified_sample_1d(samples, &mut self.pixel.rng, jitter);
            shuffle(samples, &mut self.pixel.rng);
        }
        for samples in self.pixel.samples_2d.iter_mut() {
            stratified_sample_2d(samples, self.x_pixel_samples, self.y_pixel_samples, &mut self.pixel.rng, jitter);
            shuffle(samples, &mut self.pixel.rng);
        }

        let array_1d_sizes = self.pixel.state.array_1d_sizes().to_vec();
        for (i, count) in array_1d_sizes.into_iter().enumerate() {
            for sample_idx in 0..spp {
                let start = sample_idx * count;
                let dst = &mut self.pixel.state.sample_array_1d_mut()[i][start..start + count];
                stratified_sample_1d(dst, &mut self.pixel.rng, jitter);
                shuffle(dst, &mut self.pixel.rng);
            }
        }
        let array_2d_sizes = self.pixel.state.array_2d_sizes().to_vec();
        for (i, count) in array_2d_sizes.into_iter().enumerate() {
            for sample_idx in 0..spp {
                let start = sample_idx * count;
                let dst = &mut self.pixel.state.sample_array_2d_mut()[i][start..start + count];
                latin_hypercube_2d(dst, &mut self.pixel.rng);
            }
        }

        self.pixel.start_pixel(p);
    }

    fn start_next_sample(&mut self) -> bool {
        self.pixel.start_next_sample()
    }

    fn get_1d(&mut self) -> Float {
        self.pixel.get_1d()
    }

    fn get_2d(&mut self) -> Point2f {
        self.pixel.get_2d()
    }

    fn request_1d_array(&mut self, len: usize) {
        self.pixel.state.request_1d_array(len);
    }

    fn request_2d_array(&mut self, len: usize) {
        self.pixel.state.request_2d_array(len);
    }

    fn get_1d_array(&mut self, len: usize) -> &[Float] {
        self.pixel.state.get_1d_array(len)
    }

    fn get_2d_array(&mut self, len: usize) -> &[Point2f] {
        self.pixel.state.get_2d_array(len)
    }

    fn clone_with_seed(&self, seed: u64) -> Box<dyn Sampler> {
        Box::new(Self::new(
            self.x_pixel_samples,
            self.y_pixel_samples,
            self.jitter_samples,
            self.n_sampled_dimensions,
            seed,
        ))
    }

    fn samples_per_pixel(&self) -> usize {
        self.pixel.state.samples_per_pixel
    }

    fn set_sample_number(&mut self, sample_num: u64) -> bool {
        self.pixel.set_sample_number(sample_num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stratified_sampler_covers_requested_spp() {
        let mut sampler = StratifiedSampler::new(2, 2, true, 2, 7);
        sampler.start_pixel(Point2i::new(0, 0));
        assert_eq!(sampler.samples_per_pixel(), 4);

        let mut count = 1;
        while sampler.start_next_sample() {
            count += 1;
        }
        assert_eq!(count, 4);
    }

    #[test]
    fn stratified_sampler_2d_samples_stay_in_unit_square() {
        let mut sampler = StratifiedSampler::new(4, 4, true, 1, 11);
        sampler.start_pixel(Point2i::new(0, 0));
        loop {
            let p = sampler.get_2d();
            assert!(p.x >= 0.0 && p.x < 1.0);
            assert!(p.y >= 0.0 && p.y < 1.0);
            if !sampler.start_next_sample() {
                break;
            }
        }
    }
}
