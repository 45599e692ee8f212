//! A floating-point value tracked alongside a conservative running error
//! bound, used by shape intersection routines (the quadratic solve for
//! spheres in particular) so that an intersection's reported `t` carries a
//! bound usable by `offset_ray_origin`.

use crate::err_float::{next_float_down, next_float_up, MACHINE_EPSILON};
use crate::Float;
use std::ops::{Add, Div, Mul, Neg, Sub};

#[derive(Clone, Copy, Debug)]
pub struct EFloat {
    pub v: Float,
    low: Float,
    high: Float,
}

impl EFloat {
    pub fn new(v: Float, err: Float) -> Self {
        if err == 0.0 {
            EFloat { v, low: v, high: v }
        } else {
            EFloat {
                v,
                low: next_float_down(v - err),
                high: next_float_up(v + err),
            }
        }
    }

    pub fn exact(v: Float) -> Self {
        Self::new(v, 0.0)
    }

    pub fn lower_bound(&self) -> Float { self.low }
    pub fn upper_bound(&self) -> Float { self.high }
    pub fn absolute_error(&self) -> Float { self.high - self.low }

    pub fn sqrt(self) -> Self {
        EFloat {
            v: self.v.sqrt(),
            low: next_float_down(self.low.max(0.0).sqrt()),
            high: next_float_up(self.high.sqrt()),
        }
    }
}

impl From<EFloat> for Float {
    fn from(e: EFloat) -> Float { e.v }
}

impl Add for EFloat {
    type Output = EFloat;
    fn add(self, rhs: EFloat) -> EFloat {
        EFloat {
            v: self.v + rhs.v,
            low: next_float_down(self.low + rhs.low),
            high: next_float_up(self.high + rhs.high),
        }
    }
}

impl Sub for EFloat {
    type Output = EFloat;
    fn sub(self, rhs: EFloat) -> EFloat {
        EFloat {
            v: self.v - rhs.v,
            low: next_float_down(self.low - rhs.high),
            high: next_float_up(self.high - rhs.low),
        }
    }
}

impl Mul for EFloat {
    type Output = EFloat;
    fn mul(self, rhs: EFloat) -> EFloat {
        let prod = [
            self.low * rhs.low,
            self.high * rhs.low,
            self.low * rhs.high,
            self.high * rhs.high,
        ];
        EFloat {
            v: self.v * rhs.v,
            low: next_float_down(prod.iter().cloned().fold(Float::INFINITY, Float::min)),
            high: next_float_up(prod.iter().cloned().fold(Float::NEG_INFINITY, Float::max)),
        }
    }
}

impl Mul<Float> for EFloat {
    type Output = EFloat;
    fn mul(self, rhs: Float) -> EFloat {
        self * EFloat::exact(rhs)
    }
}

impl Mul<EFloat> for Float {
    type Output = EFloat;
    fn mul(self, rhs: EFloat) -> EFloat {
        EFloat::exact(self) * rhs
    }
}

impl Div for EFloat {
    type Output = EFloat;
    fn div(self, rhs: EFloat) -> EFloat {
        let (lo, hi) = if rhs.low < 0.0 && rhs.high > 0.0 {
            // the divisor's interval straddles zero: interval is unbounded
            (Float::NEG_INFINITY, Float::INFINITY)
        } else {
            let quot = [
                self.low / rhs.low,
                self.high / rhs.low,
                self.low / rhs.high,
                self.high / rhs.high,
            ];
            (
                quot.iter().cloned().fold(Float::INFINITY, Float::min),
                quot.iter().cloned().fold(Float::NEG_INFINITY, Float::max),
            )
        };
        EFloat {
            v: self.v / rhs.v,
            low: next_float_down(lo),
            high: next_float_up(hi),
        }
    }
}

impl Neg for EFloat {
    type Output = EFloat;
    fn neg(self) -> EFloat {
        EFloat { v: -self.v, low: -self.high, high: -self.low }
    }
}

/// Solve `a*t^2 + b*t + c = 0`, returning the two roots in ascending order
/// of `v`, or `None` if the discriminant is negative.
pub fn quadratic(a: EFloat, b: EFloat, c: EFloat) -> Option<(EFloat, EFloat)> {
    let discrim = (b.v as f64) * (b.v as f64) - 4.0 * (a.v as f64) * (c.v as f64);
    if discrim < 0.0 {
        return None;
    }
    let root_discrim = discrim.sqrt();
    let float_root_discrim = EFloat::new(root_discrim as Float, MACHINE_EPSILON as Float * root_discrim as Float);

    let q = if b.v < 0.0 {
        (b - float_root_discrim) * -0.5
    } else {
        (b + float_root_discrim) * -0.5
    };

    let mut t0 = q / a;
    let mut t1 = c / q;
    if t0.v > t1.v {
        std::mem::swap(&mut t0, &mut t1);
    }
    Some((t0, t1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadratic_matches_exact_roots() {
        // t^2 - 3t + 2 = 0  =>  t = 1, 2
        let (t0, t1) = quadratic(EFloat::exact(1.0), EFloat::exact(-3.0), EFloat::exact(2.0)).unwrap();
        assert!((t0.v - 1.0).abs() < 1e-4);
        assert!((t1.v - 2.0).abs() < 1e-4);
    }

    #[test]
    fn quadratic_rejects_negative_discriminant() {
        assert!(quadratic(EFloat::exact(1.0), EFloat::exact(0.0), EFloat::exact(1.0)).is_none());
    }
}
