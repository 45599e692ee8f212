use crate::{Float, Point2f, Vec2f};

pub trait Filter {
    fn evaluate(&self, p: &Point2f) -> Float;

    fn radius(&self) -> (Vec2f, Vec2f);
}

#[derive(Debug)]
pub struct BoxFilter {
    pub radius: Vec2f,
    pub inv_radius: Vec2f,
}

impl Filter for BoxFilter {
    fn evaluate(&self, p: &Point2f) -> Float {
        1.0
    }

    fn radius(&self) -> (Vec2f, Vec2f) {
        (self.radius, self.inv_radius)
    }
}

impl Default for BoxFilter {
    fn default() -> Self {
        let radius = Vec2f::new(0.5, 0.5);
        let inv_radius = Vec2f::new(2.0, 2.0);
        Self {
            radius, inv_radius
        }
    }
}

#[derive(Debug)]
pub struct TriangleFilter {
    pub radius: Vec2f,
    pub inv_radius: Vec2f,
}

impl TriangleFilter {
    pub fn new(radius: Vec2f) -> Self {
        let inv_radius = Vec2f::new(1.0 / radius.x, 1.0 / radius.y);
        Self { radius, inv_radius }
    }
}

impl Default for TriangleFilter {
    fn default() -> Self {
        Self::new(Vec2f::new(2.0, 2.0))
    }
}

impl Filter for TriangleFilter {
    fn evaluate(&self, p: &Point2f) -> Float {
        Float::max(0.0, self.radius.x - p.x.abs()) * Float::max(0.0, self.radius.y - p.y.abs())
    }

    fn radius(&self) -> (Vec2f, Vec2f) {
        (self.radius, self.inv_radius)
    }
}

#[derive(Debug)]
pub struct GaussianFilter {
    pub radius: Vec2f,
    pub inv_radius: Vec2f,
    alpha: Float,
    exp_x: Float,
    exp_y: Float,
}

impl GaussianFilter {
    pub fn new(radius: Vec2f, alpha: Float) -> Self {
        let inv_radius = Vec2f::new(1.0 / radius.x, 1.0 / radius.y);
        let exp_x = (-alpha * radius.x * radius.x).exp();
        let exp_y = (-alpha * radius.y * radius.y).exp();
        Self { radius, inv_radius, alpha, exp_x, exp_y }
    }

    fn gaussian(&self, d: Float, expv: Float) -> Float {
        Float::max(0.0, (-self.alpha * d * d).exp() - expv)
    }
}

impl Default for GaussianFilter {
    fn default() -> Self {
        Self::new(Vec2f::new(2.0, 2.0), 2.0)
    }
}

impl Filter for GaussianFilter {
    fn evaluate(&self, p: &Point2f) -> Float {
        self.gaussian(p.x, self.exp_x) * self.gaussian(p.y, self.exp_y)
    }

    fn radius(&self) -> (Vec2f, Vec2f) {
        (self.radius, self.inv_radius)
    }
}

fn sinc(x: Float) -> Float {
    let x = x.abs();
    if x < 1e-5 {
        1.0
    } else {
        (std::f32::consts::PI * x).sin() / (std::f32::consts::PI * x)
    }
}

/// Lanczos-windowed sinc: `sinc(x) * sinc(x / tau)`, zeroed past `tau`.
fn windowed_sinc(x: Float, radius: Float, tau: Float) -> Float {
    let x = x.abs();
    if x > radius {
        0.0
    } else {
        sinc(x) * sinc(x / tau)
    }
}

#[derive(Debug)]
pub struct LanczosSincFilter {
    pub radius: Vec2f,
    pub inv_radius: Vec2f,
    tau: Float,
}

impl LanczosSincFilter {
    pub fn new(radius: Vec2f, tau: Float) -> Self {
        let inv_radius = Vec2f::new(1.0 / radius.x, 1.0 / radius.y);
        Self { radius, inv_radius, tau }
    }
}

impl Default for LanczosSincFilter {
    fn default() -> Self {
        Self::new(Vec2f::new(4.0, 4.0), 3.0)
    }
}

impl Filter for LanczosSincFilter {
    fn evaluate(&self, p: &Point2f) -> Float {
        windowed_sinc(p.x, self.radius.x, self.tau) * windowed_sinc(p.y, self.radius.y, self.tau)
    }

    fn radius(&self) -> (Vec2f, Vec2f) {
        (self.radius, self.inv_radius)
    }
}

#[derive(Debug)]
pub struct MitchellFilter {
    pub radius: Vec2f,
    pub inv_radius: Vec2f,
    b: Float,
    c: Float,
}

impl MitchellFilter {
    pub fn new(radius: Vec2f, b: Float, c: Float) -> Self {
        let inv_radius = Vec2f::new(1.0 / radius.x, 1.0 / radius.y);
        Self { radius, inv_radius, b, c }
    }

    fn mitchell_1d(&self, x: Float) -> Float {
        let x = (2.0 * x).abs();
        let (b, c) = (self.b, self.c);
        if x > 1.0 {
            ((-b - 6.0 * c) * x * x * x + (6.0 * b + 30.0 * c) * x * x
                + (-12.0 * b - 48.0 * c) * x + (8.0 * b + 24.0 * c)) * (1.0 / 6.0)
        } else {
            ((12.0 - 9.0 * b - 6.0 * c) * x * x * x
                + (-18.0 + 12.0 * b + 6.0 * c) * x * x
                + (6.0 - 2.0 * b)) * (1.0 / 6.0)
        }
    }
}

impl Default for MitchellFilter {
    fn default() -> Self {
        Self::new(Vec2f::new(2.0, 2.0), 1.0 / 3.0, 1.0 / 3.0)
    }
}

impl Filter for MitchellFilter {
    fn evaluate(&self, p: &Point2f) -> Float {
        self.mitchell_1d(p.x * self.inv_radius.x) * self.mitchell_1d(p.y * self.inv_radius.y)
    }

    fn radius(&self) -> (Vec2f, Vec2f) {
        (self.radius, self.inv_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_filter_is_zero_past_radius() {
        let f = TriangleFilter::new(Vec2f::new(1.0, 1.0));
        assert_eq!(f.evaluate(&Point2f::new(2.0, 0.0)), 0.0);
        assert!(f.evaluate(&Point2f::new(0.25, 0.25)) > 0.0);
    }

    #[test]
    fn gaussian_filter_peaks_at_origin() {
        let f = GaussianFilter::new(Vec2f::new(2.0, 2.0), 2.0);
        let center = f.evaluate(&Point2f::new(0.0, 0.0));
        let off_center = f.evaluate(&Point2f::new(1.0, 1.0));
        assert!(center > off_center);
    }

    #[test]
    fn lanczos_sinc_is_zero_past_radius() {
        let f = LanczosSincFilter::new(Vec2f::new(4.0, 4.0), 3.0);
        assert_eq!(f.evaluate(&Point2f::new(5.0, 0.0)), 0.0);
    }

    #[test]
    fn mitchell_filter_is_symmetric() {
        let f = MitchellFilter::new(Vec2f::new(2.0, 2.0), 1.0 / 3.0, 1.0 / 3.0);
        let a = f.evaluate(&Point2f::new(0.7, -0.3));
        let b = f.evaluate(&Point2f::new(-0.7, 0.3));
        assert!((a - b).abs() < 1e-5);
    }
}
