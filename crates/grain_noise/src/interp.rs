//! Dimension-generic blending of lattice neighbourhoods.
//!
//! Values are laid out the way [`crate::grid::corner`] and
//! [`crate::grid::neighbor`] enumerate them: axis 0 is the fastest moving
//! digit. Reduction collapses axis 0 first, so after each pass the remaining
//! values are again ordered with the next axis fastest.

use std::f64::consts::PI;

use crate::error::NoiseError;

#[inline(always)]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Catmull-Rom segment between `a` and `b`, with `a_` before `a` and `b_`
/// after `b`.
#[inline(always)]
pub fn cubic(a_: f64, a: f64, b: f64, b_: f64, t: f64) -> f64 {
    a + 0.5
        * t
        * (b - a_ + t * (2.0 * a_ - 5.0 * a + 4.0 * b - b_ + t * (3.0 * (a - b) + b_ - a_)))
}

/// Shapes an in-cell offset before it is used as a blend weight.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Kernel {
    #[default]
    Linear,
    Smoothstep,
    Quintic,
    Cosine,
}

impl Kernel {
    #[inline(always)]
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Kernel::Linear => t,
            Kernel::Smoothstep => t * t * (3.0 - 2.0 * t),
            // t³(6t² - 15t + 10)
            Kernel::Quintic => t * t * t * (t * (t * 6.0 - 15.0) + 10.0),
            Kernel::Cosine => (1.0 - (PI * t).cos()) * 0.5,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Interpolation {
    #[default]
    Linear,
    Cubic,
}

impl Interpolation {
    /// Points needed per axis.
    #[inline]
    pub fn support(self) -> usize {
        match self {
            Interpolation::Linear => 2,
            Interpolation::Cubic => 4,
        }
    }

    /// Offset of the first point relative to the containing cell.
    #[inline]
    pub fn low(self) -> i64 {
        match self {
            Interpolation::Linear => 0,
            Interpolation::Cubic => -1,
        }
    }
}

/// Multilinear reduction in place. `values` must hold `2^weights.len()`
/// entries.
#[inline]
pub fn collapse_linear(values: &mut [f64], weights: &[f64]) -> f64 {
    let mut len = values.len();
    for &w in weights {
        len /= 2;
        for j in 0..len {
            values[j] = lerp(values[2 * j], values[2 * j + 1], w);
        }
    }
    values[0]
}

/// Catmull-Rom reduction in place. `values` must hold `4^weights.len()`
/// entries; the weight of each axis is the offset between its second and
/// third point.
#[inline]
pub fn collapse_cubic(values: &mut [f64], weights: &[f64]) -> f64 {
    let mut len = values.len();
    for &w in weights {
        len /= 4;
        for j in 0..len {
            let k = 4 * j;
            values[j] = cubic(values[k], values[k + 1], values[k + 2], values[k + 3], w);
        }
    }
    values[0]
}

/// Blends a neighbourhood of lattice values at fractional `offsets`.
///
/// Weights outside `[0, 1]` extrapolate. The result is not clamped; cubic
/// blending can overshoot the inputs.
pub fn interpolate(
    values: &[f64],
    offsets: &[f64],
    interpolation: Interpolation,
    kernel: Kernel,
) -> Result<f64, NoiseError> {
    let expected = u32::try_from(offsets.len())
        .ok()
        .and_then(|rank| interpolation.support().checked_pow(rank));
    if expected != Some(values.len()) {
        return Err(NoiseError::InvalidShape(format!(
            "{:?} interpolation over {} axes needs {}^{} points, got {}",
            interpolation,
            offsets.len(),
            interpolation.support(),
            offsets.len(),
            values.len()
        )));
    }
    let mut values = values.to_vec();
    let weights: Vec<f64> = offsets.iter().map(|&t| kernel.apply(t)).collect();
    Ok(match interpolation {
        Interpolation::Linear => collapse_linear(&mut values, &weights),
        Interpolation::Cubic => collapse_cubic(&mut values, &weights),
    })
}

#[cfg(test)]
mod test {
    use crate::error::NoiseError;
    use crate::interp::{Interpolation, Kernel, cubic, interpolate, lerp};

    #[test]
    fn lerp_vectors() {
        let a = [0.0, 1.0, 2.0, 3.0, 4.0];
        let b = [1.0, 2.0, 3.0, 4.0, 5.0];
        let expected = [0.5, 1.5, 2.5, 3.5, 4.5];
        for i in 0..5 {
            assert_eq!(lerp(a[i], b[i], 0.5), expected[i]);
        }
        assert_eq!(lerp(2.0, 4.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 4.0, 1.0), 4.0);
        assert_eq!(lerp(2.0, 4.0, 1.5), 5.0);
    }

    #[test]
    fn cubic_vectors() {
        let a_ = [-1.0, 0.0, 1.0, 4.0];
        let a = [0.0, 1.0, 4.0, 9.0];
        let b = [1.0, 4.0, 9.0, 16.0];
        let b_ = [4.0, 9.0, 16.0, 25.0];
        let expected = [0.375, 2.25, 6.25, 12.25];
        for i in 0..4 {
            assert_eq!(cubic(a_[i], a[i], b[i], b_[i], 0.5), expected[i]);
        }
        assert_eq!(cubic(3.0, 5.0, 7.0, 11.0, 0.0), 5.0);
        assert_eq!(cubic(3.0, 5.0, 7.0, 11.0, 1.0), 7.0);
    }

    #[test]
    fn kernels_fix_endpoints() {
        for kernel in [
            Kernel::Linear,
            Kernel::Smoothstep,
            Kernel::Quintic,
            Kernel::Cosine,
        ] {
            assert_eq!(kernel.apply(0.0), 0.0);
            assert!((kernel.apply(1.0) - 1.0).abs() < 1e-15);
            assert!((kernel.apply(0.5) - 0.5).abs() < 1e-15);
        }
        assert_eq!(
            format!("{:.4}", Kernel::Quintic.apply(0.25)),
            format!("{:.4}", 0.103515625)
        );
        assert_eq!(
            format!("{:.4}", Kernel::Cosine.apply(0.25)),
            format!("{:.4}", 0.14644660940672627)
        );
    }

    #[test]
    fn bilinear() {
        // corners (0,0) (1,0) (0,1) (1,1)
        let values = [0.0, 1.0, 2.0, 3.0];
        let v = interpolate(&values, &[0.5, 0.5], Interpolation::Linear, Kernel::Linear).unwrap();
        assert_eq!(v, 1.5);
        let v = interpolate(&values, &[1.0, 0.0], Interpolation::Linear, Kernel::Linear).unwrap();
        assert_eq!(v, 1.0);
        let v = interpolate(&values, &[0.0, 1.0], Interpolation::Linear, Kernel::Linear).unwrap();
        assert_eq!(v, 2.0);
    }

    #[test]
    fn trilinear_is_convex() {
        let values = [0.1, 0.9, 0.3, 0.7, 0.5, 0.2, 0.8, 0.4];
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let v = interpolate(
                &values,
                &[t, 1.0 - t, t * t],
                Interpolation::Linear,
                Kernel::Smoothstep,
            )
            .unwrap();
            assert!(v >= 0.1 - 1e-12 && v <= 0.9 + 1e-12);
        }
    }

    #[test]
    fn cubic_reproduces_lines() {
        // f(x, y) = x + 2y sampled on a 4x4 block starting at (-1, -1)
        let mut values = [0.0; 16];
        for (i, v) in values.iter_mut().enumerate() {
            let x = (i % 4) as f64 - 1.0;
            let y = (i / 4) as f64 - 1.0;
            *v = x + 2.0 * y;
        }
        let v = interpolate(&values, &[0.25, 0.5], Interpolation::Cubic, Kernel::Linear).unwrap();
        assert!((v - 1.25).abs() < 1e-12);
    }

    #[test]
    fn zero_rank_is_the_single_value() {
        let v = interpolate(&[0.75], &[], Interpolation::Cubic, Kernel::Linear).unwrap();
        assert_eq!(v, 0.75);
    }

    #[test]
    fn wrong_point_count() {
        assert!(matches!(
            interpolate(&[0.0; 3], &[0.5, 0.5], Interpolation::Linear, Kernel::Linear),
            Err(NoiseError::InvalidShape(_))
        ));
        assert!(matches!(
            interpolate(&[0.0; 8], &[0.5, 0.5], Interpolation::Cubic, Kernel::Linear),
            Err(NoiseError::InvalidShape(_))
        ));
    }
}
