// Copyright 2023 Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

//! # Distance metrics
//!
//! Separation vectors between two particles in `D` dimensions, either plain
//! Cartesian or wrapped to the minimum image in a rectangular periodic box.

use nalgebra::SVector;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Displacement between two particles in `D` dimensions
pub trait DistanceMetric<const D: usize>: Debug + Send + Sync {
    /// Displacement vector from `xj` to `xi`, i.e. 𝒓ᵢ - 𝒓ⱼ.
    ///
    /// Both slices must have length `D`.
    fn displacement(&self, xi: &[f64], xj: &[f64]) -> SVector<f64, D>;

    /// Squared distance between two positions
    #[inline]
    fn distance_squared(&self, xi: &[f64], xj: &[f64]) -> f64 {
        self.displacement(xi, xj).norm_squared()
    }
}

/// Euclidean distance without any boundary wrapping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Cartesian<const D: usize>;

impl<const D: usize> DistanceMetric<D> for Cartesian<D> {
    #[inline(always)]
    fn displacement(&self, xi: &[f64], xj: &[f64]) -> SVector<f64, D> {
        SVector::from_fn(|k, _| xi[k] - xj[k])
    }
}

/// Periodic boundary conditions in a rectangular box using the minimum image convention
///
/// Each component of the displacement is wrapped into (-L/2, L/2].
///
/// # Examples
/// ~~~
/// use hswca::{DistanceMetric, Periodic};
/// let periodic = Periodic::new([10.0, 10.0, 10.0]);
/// let d = periodic.displacement(&[9.5, 0.0, 0.0], &[0.5, 0.0, 0.0]);
/// assert!((d[0] + 1.0).abs() < 1e-12);
/// ~~~
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(deny_unknown_fields)
)]
pub struct Periodic<const D: usize> {
    /// Side lengths of the box
    #[cfg_attr(feature = "serde", serde(rename = "box"))]
    box_length: SVector<f64, D>,
}

impl<const D: usize> Periodic<D> {
    /// Create from box side lengths; these must be positive
    pub fn new(box_length: [f64; D]) -> Self {
        Self {
            box_length: SVector::from(box_length),
        }
    }

    /// Create from a slice of box side lengths, checking length and sign
    pub fn try_new(box_length: &[f64]) -> anyhow::Result<Self> {
        anyhow::ensure!(
            box_length.len() == D,
            "box vector must have {D} components, got {}",
            box_length.len()
        );
        anyhow::ensure!(
            box_length.iter().all(|l| l.is_finite() && *l > 0.0),
            "box lengths must be positive, got {box_length:?}"
        );
        Ok(Self {
            box_length: SVector::from_column_slice(box_length),
        })
    }

    /// Side lengths of the box
    pub const fn box_length(&self) -> &SVector<f64, D> {
        &self.box_length
    }

    /// Wrap a single displacement component along axis `k`
    #[inline(always)]
    fn wrap(&self, delta: f64, k: usize) -> f64 {
        let length = self.box_length[k];
        let wrapped = delta - length * (delta / length).round();
        // `round` leaves ±L/2 untouched; keep the upper bound only
        if wrapped <= -0.5 * length {
            wrapped + length
        } else {
            wrapped
        }
    }
}

impl<const D: usize> DistanceMetric<D> for Periodic<D> {
    #[inline(always)]
    fn displacement(&self, xi: &[f64], xj: &[f64]) -> SVector<f64, D> {
        SVector::from_fn(|k, _| self.wrap(xi[k] - xj[k], k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cartesian() {
        let cartesian = Cartesian::<3>;
        let xi = [1.0, 2.0, 3.0];
        let xj = [0.0, 4.0, 3.5];
        let d = cartesian.displacement(&xi, &xj);
        assert_eq!(d, SVector::from([1.0, -2.0, -0.5]));
        assert_relative_eq!(cartesian.distance_squared(&xi, &xj), 5.25);

        let planar = Cartesian::<2>;
        assert_relative_eq!(planar.distance_squared(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
    }

    #[test]
    fn test_minimum_image() {
        let periodic = Periodic::new([10.0, 4.0]);
        let d = periodic.displacement(&[9.0, 0.5], &[1.0, 3.5]);
        assert_relative_eq!(d[0], -2.0, epsilon = 1e-12);
        assert_relative_eq!(d[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(periodic.distance_squared(&[9.0, 0.5], &[1.0, 3.5]), 5.0, epsilon = 1e-12);

        // several box lengths apart
        let d = periodic.displacement(&[31.0, -7.0], &[0.0, 0.0]);
        assert_relative_eq!(d[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(d[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_half_box_is_positive() {
        let periodic = Periodic::new([10.0, 10.0, 10.0]);
        let d = periodic.displacement(&[5.0, 0.0, 0.0], &[0.0, 5.0, 0.0]);
        assert_eq!(d[0], 5.0);
        assert_eq!(d[1], 5.0);
        assert_eq!(d[2], 0.0);
        for delta in [-12.0, -5.0, -4.9, 0.0, 4.9, 5.0, 15.0, 25.0] {
            let d = periodic.displacement(&[delta, 0.0, 0.0], &[0.0, 0.0, 0.0]);
            assert!(d[0] > -5.0 && d[0] <= 5.0, "{delta} wrapped to {}", d[0]);
        }
    }

    #[test]
    fn test_large_box_is_cartesian() {
        let periodic = Periodic::new([1e6, 1e6, 1e6]);
        let (xi, xj) = ([0.3, -1.2, 4.0], [2.5, 0.1, -3.0]);
        assert_relative_eq!(
            periodic.distance_squared(&xi, &xj),
            Cartesian::<3>.distance_squared(&xi, &xj),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_try_new() {
        assert!(Periodic::<3>::try_new(&[1.0, 2.0, 3.0]).is_ok());
        assert!(Periodic::<3>::try_new(&[1.0, 2.0]).is_err());
        assert!(Periodic::<2>::try_new(&[1.0, -2.0]).is_err());
        assert!(Periodic::<2>::try_new(&[0.0, 2.0]).is_err());
    }
}
