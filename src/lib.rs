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

//! # HS-WCA
//!
//! Pairwise potential energy, gradient and Hessian for N particles in 2D or 3D,
//! as needed by energy-landscape exploration codes such as basin-hopping and
//! local minimizers.
//!
//! A potential is composed from three independent parts:
//!
//! 1. an interaction law acting on a squared pair distance, see [`twobody::PairInteraction`],
//! 2. a distance metric, see [`distance::DistanceMetric`] (plain or minimum image),
//! 3. a pair enumeration strategy, see [`pairs::PairEnumeration`] (all pairs, a pair list, or atom subsets).
//!
//! These are glued together by [`pairwise::PairwisePotential`], and any [`Potential`] can be
//! wrapped by [`frozen::FrozenPotential`] to hold a subset of coordinates fixed.
//!
//! ## Examples
//! ~~~
//! use hswca::{HsWca3d, Potential, INFTY};
//! let potential = HsWca3d::hs_wca(1.0, 0.2, &[1.0, 1.0]).unwrap();
//! let overlapping = [0.0, 0.0, 0.0, 1.5, 0.0, 0.0];
//! assert_eq!(potential.energy(&overlapping).unwrap(), INFTY);
//! let separated = [0.0, 0.0, 0.0, 3.0, 0.0, 0.0];
//! assert_eq!(potential.energy(&separated).unwrap(), 0.0);
//! ~~~

#[cfg(test)]
extern crate approx;

use dyn_clone::DynClone;
use std::fmt::Debug;

pub mod distance;
pub mod frozen;
pub mod pairs;
pub mod pairwise;
pub mod twobody;

pub use distance::{Cartesian, DistanceMetric, Periodic};
pub use frozen::{FrozenCoordinates, FrozenPotential};
pub use pairs::{AllPairs, AtomSubsets, PairEnumeration, PairList};
pub use pairwise::{
    HsWca2d, HsWca3d, HsWcaNeighborList, HsWcaPeriodic2d, HsWcaPeriodic3d, PairwisePotential,
};
pub use twobody::{HsWca, HsWcaParameters, PairInteraction};

/// Dense Hessian matrix over all (mobile) coordinates
pub type Hessian = nalgebra::DMatrix<f64>;

/// Energy assigned to overlapping hard cores.
///
/// This is a large but finite number so that it can be compared, doubled and
/// summed without overflowing. Minimizers should treat it as "reject this configuration".
pub const INFTY: f64 = 1e50;

/// Defines a cutoff distance for a pair of particles
pub trait Cutoff {
    /// Squared cutoff distance
    fn cutoff_squared(&self, atomi: usize, atomj: usize) -> f64 {
        self.cutoff(atomi, atomj).powi(2)
    }

    /// Cutoff distance
    fn cutoff(&self, atomi: usize, atomj: usize) -> f64;
}

/// Energy, gradient and Hessian of a full configuration.
///
/// Coordinates are a flat slice, `[x₀, y₀, z₀, x₁, y₁, z₁, ...]` in 3D and
/// `[x₀, y₀, x₁, y₁, ...]` in 2D. Gradient and Hessian buffers are supplied by the
/// caller, must match the coordinate length, and are overwritten on every call.
///
/// Malformed input, e.g. a coordinate slice of the wrong length or a buffer of the
/// wrong shape, is reported as an error. Overlapping hard cores are *not* an error
/// but give an energy of [`INFTY`].
pub trait Potential: DynClone + Debug + Send + Sync {
    /// Total potential energy
    fn energy(&self, coords: &[f64]) -> anyhow::Result<f64>;

    /// Total potential energy and its gradient with respect to all coordinates
    fn energy_gradient(&self, coords: &[f64], gradient: &mut [f64]) -> anyhow::Result<f64>;

    /// Total potential energy, gradient and Hessian
    fn energy_gradient_hessian(
        &self,
        coords: &[f64],
        gradient: &mut [f64],
        hessian: &mut Hessian,
    ) -> anyhow::Result<f64>;

    /// Gradient from central differences of the energy using step size `step`
    fn numerical_gradient(&self, coords: &[f64], step: f64) -> anyhow::Result<Vec<f64>> {
        let mut displaced = coords.to_vec();
        let mut gradient = vec![0.0; coords.len()];
        for (k, gradient) in gradient.iter_mut().enumerate() {
            displaced[k] = coords[k] + step;
            let energy_up = self.energy(&displaced)?;
            displaced[k] = coords[k] - step;
            let energy_down = self.energy(&displaced)?;
            displaced[k] = coords[k];
            *gradient = (energy_up - energy_down) / (2.0 * step);
        }
        Ok(gradient)
    }

    /// Hessian from central differences of the analytical gradient using step size `step`
    fn numerical_hessian(&self, coords: &[f64], step: f64) -> anyhow::Result<Hessian> {
        let ndof = coords.len();
        let mut hessian = Hessian::zeros(ndof, ndof);
        let mut displaced = coords.to_vec();
        let mut gradient_up = vec![0.0; ndof];
        let mut gradient_down = vec![0.0; ndof];
        for k in 0..ndof {
            displaced[k] = coords[k] + step;
            self.energy_gradient(&displaced, &mut gradient_up)?;
            displaced[k] = coords[k] - step;
            self.energy_gradient(&displaced, &mut gradient_down)?;
            displaced[k] = coords[k];
            for l in 0..ndof {
                hessian[(l, k)] = (gradient_up[l] - gradient_down[l]) / (2.0 * step);
            }
        }
        Ok(hessian)
    }
}

dyn_clone::clone_trait_object!(Potential);

/// Check that a caller supplied Hessian buffer is square with `ndof` rows
pub(crate) fn ensure_hessian_shape(hessian: &Hessian, ndof: usize) -> anyhow::Result<()> {
    anyhow::ensure!(
        hessian.nrows() == ndof && hessian.ncols() == ndof,
        "hessian must be {ndof}x{ndof} but is {}x{}",
        hessian.nrows(),
        hessian.ncols()
    );
    Ok(())
}
