use cgmath::EuclideanSpace;
use rand::Rng;
use rand_xoshiro::Xoshiro256Plus;
use rand::SeedableRng;

use crate::{Float, Point2f, Point2i};
use crate::camera::CameraSample;

pub mod random;
pub mod stratified;

pub trait Sampler: Sync + Send {
    fn start_pixel(&mut self, pixel: Point2i);

    fn start_next_sample(&mut self) -> bool;

    fn get_1d(&mut self) -> Float;

    fn get_2d(&mut self) -> Point2f;

    fn request_1d_array(&mut self, len: usize);

    fn request_2d_array(&mut self, len: usize);

    fn get_1d_array(&mut self, len: usize) -> &[Float];

    fn get_2d_array(&mut self, len: usize) -> &[Point2f];

    fn round_count(&self, n: usize) -> usize { n }

    fn clone_with_seed(&self, seed: u64) -> Box<dyn Sampler>;

    fn samples_per_pixel(&self) -> usize;

    fn get_camera_sample(&mut self, p_raster: Point2i) -> CameraSample {
        let p_film = p_raster.cast::<Float>().unwrap() + self.get_2d().to_vec();

        CameraSample {
            p_film,
            p_lens: self.get_2d(),
            time: self.get_1d(),
        }
    }

    fn set_sample_number(&mut self, sample_num: u64) -> bool;
}

/// Lets a boxed, type-erased sampler (as produced by `clone_with_seed`) stand
/// in wherever an `impl Sampler` is expected, e.g. a tile's own sampler clone.
impl Sampler for Box<dyn Sampler> {
    fn start_pixel(&mut self, pixel: Point2i) { (**self).start_pixel(pixel) }

    fn start_next_sample(&mut self) -> bool { (**self).start_next_sample() }

    fn get_1d(&mut self) -> Float { (**self).get_1d() }

    fn get_2d(&mut self) -> Point2f { (**self).get_2d() }

    fn request_1d_array(&mut self, len: usize) { (**self).request_1d_array(len) }

    fn request_2d_array(&mut self, len: usize) { (**self).request_2d_array(len) }

    fn get_1d_array(&mut self, len: usize) -> &[Float] { (**self).get_1d_array(len) }

    fn get_2d_array(&mut self, len: usize) -> &[Point2f] { (**self).get_2d_array(len) }

    fn round_count(&self, n: usize) -> usize { (**self).round_count(n) }

    fn clone_with_seed(&self, seed: u64) -> Box<dyn Sampler> { (**self).clone_with_seed(seed) }

    fn samples_per_pixel(&self) -> usize { (**self).samples_per_pixel() }

    fn set_sample_number(&mut self, sample_num: u64) -> bool { (**self).set_sample_number(sample_num) }
}

/// Bookkeeping shared by every `Sampler`: current pixel/sample-within-pixel
/// position, plus the array-request machinery (`request_1d_array` reserves
/// `len` samples per pixel sample; `get_*_array` hands back this pixel
/// sample's slice of it).
pub struct SamplerState {
    pub samples_per_pixel: usize,
    pub current_pixel: Point2i,
    pub current_pixel_sample_index: usize,

    sample_array_1d: Vec<Vec<Float>>,
    sample_array_2d: Vec<Vec<Point2f>>,
    samples_1d_array_sizes: Vec<usize>,
    samples_2d_array_sizes: Vec<usize>,
    array_1d_offset: usize,
    array_2d_offset: usize,
}

impl SamplerState {
    pub fn new(samples_per_pixel: usize) -> Self {
        Self {
            samples_per_pixel,
            current_pixel: Point2i::new(0, 0),
            current_pixel_sample_index: 0,
            sample_array_1d: vec![],
            sample_array_2d: vec![],
            samples_1d_array_sizes: vec![],
            samples_2d_array_sizes: vec![],
            array_1d_offset: 0,
            array_2d_offset: 0,
        }
    }

    pub fn start_pixel(&mut self, p: Point2i) {
        self.current_pixel = p;
        self.current_pixel_sample_index = 0;
        self.array_1d_offset = 0;
        self.array_2d_offset = 0;
    }

    pub fn start_next_sample(&mut self) -> bool {
        self.array_1d_offset = 0;
        self.array_2d_offset = 0;
        self.current_pixel_sample_index += 1;
        self.current_pixel_sample_index < self.samples_per_pixel
    }

    pub fn set_sample_number(&mut self, sample_num: u64) -> bool {
        self.array_1d_offset = 0;
        self.array_2d_offset = 0;
        self.current_pixel_sample_index = sample_num as usize;
        self.current_pixel_sample_index < self.samples_per_pixel
    }

    pub fn request_1d_array(&mut self, len: usize) {
        self.samples_1d_array_sizes.push(len);
        self.sample_array_1d.push(vec![0.0; len * self.samples_per_pixel]);
    }

    pub fn request_2d_array(&mut self, len: usize) {
        self.samples_2d_array_sizes.push(len);
        self.sample_array_2d.push(vec![Point2f::new(0.0, 0.0); len * self.samples_per_pixel]);
    }

    pub fn get_1d_array(&mut self, len: usize) -> &[Float] {
        if self.array_1d_offset == self.sample_array_1d.len() {
            return &[];
        }
        let start = self.current_pixel_sample_index * len;
        let array = &self.sample_array_1d[self.array_1d_offset][start..start + len];
        self.array_1d_offset += 1;
        array
    }

    pub fn get_2d_array(&mut self, len: usize) -> &[Point2f] {
        if self.array_2d_offset == self.sample_array_2d.len() {
            return &[];
        }
        let start = self.current_pixel_sample_index * len;
        let array = &self.sample_array_2d[self.array_2d_offset][start..start + len];
        self.array_2d_offset += 1;
        array
    }

    pub fn array_1d_sizes(&self) -> &[usize] { &self.samples_1d_array_sizes }
    pub fn array_2d_sizes(&self) -> &[usize] { &self.samples_2d_array_sizes }
    pub fn sample_array_1d_mut(&mut self) -> &mut [Vec<Float>] { &mut self.sample_array_1d }
    pub fn sample_array_2d_mut(&mut self) -> &mut [Vec<Point2f>] { &mut self.sample_array_2d }
}

/// Shared base for samplers that precompute every sample for a pixel up
/// front (as opposed to a `GlobalSampler`, which would map
/// `(pixel, sample index, dimension)` to a value on the fly — this crate
/// only implements the pixel-precomputed kind).
pub struct PixelSampler {
    pub state: SamplerState,
    pub(crate) samples_1d: Vec<Vec<Float>>,
    pub(crate) samples_2d: Vec<Vec<Point2f>>,
    current_1d_dimension: usize,
    current_2d_dimension: usize,
    pub(crate) rng: Xoshiro256Plus,
}

impl PixelSampler {
    pub fn new(samples_per_pixel: usize, n_sampled_dimensions: usize, seed: u64) -> Self {
        let samples_1d = (0..n_sampled_dimensions).map(|_| vec![0.0; samples_per_pixel]).collect();
        let samples_2d = (0..n_sampled_dimensions)
            .map(|_| vec![Point2f::new(0.0, 0.0); samples_per_pixel])
            .collect();

        Self {
            state: SamplerState::new(samples_per_pixel),
            samples_1d,
            samples_2d,
            current_1d_dimension: 0,
            current_2d_dimension: 0,
            rng: Xoshiro256Plus::seed_from_u64(seed),
        }
    }

    pub fn start_pixel(&mut self, p: Point2i) {
        self.current_1d_dimension = 0;
        self.current_2d_dimension = 0;
        self.state.start_pixel(p);
    }

    pub fn start_next_sample(&mut self) -> bool {
        self.current_1d_dimension = 0;
        self.current_2d_dimension = 0;
        self.state.start_next_sample()
    }

    pub fn set_sample_number(&mut self, sample_num: u64) -> bool {
        self.current_1d_dimension = 0;
        self.current_2d_dimension = 0;
        self.state.set_sample_number(sample_num)
    }

    pub fn get_1d(&mut self) -> Float {
        if self.current_1d_dimension < self.samples_1d.len() {
            let v = self.samples_1d[self.current_1d_dimension][self.state.current_pixel_sample_index];
            self.current_1d_dimension += 1;
            v
        } else {
            self.rng.gen()
        }
    }

    pub fn get_2d(&mut self) -> Point2f {
        if self.current_2d_dimension < self.samples_2d.len() {
            let v = self.samples_2d[self.current_2d_dimension][self.state.current_pixel_sample_index];
            self.current_2d_dimension += 1;
            v
        } else {
            Point2f::new(self.rng.gen(), self.rng.gen())
        }
    }

}
