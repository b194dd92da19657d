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

//! ## Twobody interactions
//!
//! Interaction laws between exactly two particles, expressed as functions of the
//! squared center-to-center distance. A law knows nothing about dimensionality,
//! periodic boundaries or how pairs are enumerated; particle indices are only passed
//! along so that per-particle parameters, e.g. radii, can be looked up.

use std::fmt::Debug;

mod hs_wca;
pub use self::hs_wca::{HsWca, HsWcaParameters};

/// Potential energy and radial derivatives between a pair of isotropic particles, 𝑈(𝑟).
///
/// The gradient scalar follows the force-over-distance convention,
/// 𝑔 = -𝑈'(𝑟)/𝑟, so that multiplying by the displacement vector 𝒓ᵢ - 𝒓ⱼ directly gives
/// the Cartesian force on particle 𝑖. The Hessian scalar is the second radial derivative, 𝑈''(𝑟).
///
/// All three tiers must return the same energy for the same input.
pub trait PairInteraction: Debug + Send + Sync {
    /// Interaction energy from the squared distance between `atomi` and `atomj`
    fn energy(&self, distance_squared: f64, atomi: usize, atomj: usize) -> f64;

    /// Energy and gradient scalar, (𝑈, -𝑈'/𝑟)
    ///
    /// The default implementation uses a central difference in 𝑟 and should be
    /// overridden with the exact analytical expression for better speed and accuracy.
    fn energy_gradient(&self, distance_squared: f64, atomi: usize, atomj: usize) -> (f64, f64) {
        let energy = self.energy(distance_squared, atomi, atomj);
        let r = distance_squared.sqrt();
        let (up, down) = shifted_energies(self, r, atomi, atomj);
        let derivative = (up - down) / (2.0 * DIFFERENCE_STEP);
        (energy, -derivative / r)
    }

    /// Energy, gradient scalar and Hessian scalar, (𝑈, -𝑈'/𝑟, 𝑈'')
    ///
    /// The default implementation uses central differences in 𝑟.
    fn energy_gradient_hessian(
        &self,
        distance_squared: f64,
        atomi: usize,
        atomj: usize,
    ) -> (f64, f64, f64) {
        let (energy, gradient) = self.energy_gradient(distance_squared, atomi, atomj);
        let (up, down) = shifted_energies(self, distance_squared.sqrt(), atomi, atomj);
        let second = (up - 2.0 * energy + down) / DIFFERENCE_STEP.powi(2);
        (energy, gradient, second)
    }

    /// Number of particles this law holds parameters for, if it holds any
    fn num_atoms(&self) -> Option<usize> {
        None
    }
}

/// Energies at 𝑟 ± h
fn shifted_energies<T: PairInteraction + ?Sized>(
    interaction: &T,
    r: f64,
    atomi: usize,
    atomj: usize,
) -> (f64, f64) {
    (
        interaction.energy((r + DIFFERENCE_STEP).powi(2), atomi, atomj),
        interaction.energy((r - DIFFERENCE_STEP).powi(2), atomi, atomj),
    )
}

/// Step in 𝑟 used by the finite difference fallbacks
const DIFFERENCE_STEP: f64 = 1e-5;
