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

//! Hard sphere combined with a Weeks-Chandler-Andersen soft shell.

use super::PairInteraction;
use crate::{Cutoff, INFTY};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Parameters for [`HsWca`] shared by all particles
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(deny_unknown_fields)
)]
pub struct HsWcaParameters {
    /// Well depth, ε
    #[cfg_attr(feature = "serde", serde(alias = "ε", alias = "epsilon"))]
    pub eps: f64,
    /// Shell thickness relative to the hard core contact distance
    #[cfg_attr(feature = "serde", serde(alias = "scale"))]
    pub sca: f64,
}

impl Default for HsWcaParameters {
    fn default() -> Self {
        Self { eps: 1.0, sca: 0.2 }
    }
}

impl HsWcaParameters {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.eps.is_finite() && self.eps > 0.0,
            "well depth must be positive, got {}",
            self.eps
        );
        anyhow::ensure!(
            self.sca.is_finite() && self.sca > 0.0,
            "shell scale factor must be positive, got {}",
            self.sca
        );
        Ok(())
    }
}

/// Hard sphere + Weeks-Chandler-Andersen potential
///
/// Each particle has a hard core radius, Rᵢ, and the contact distance of a pair is
/// r₀ = Rᵢ + Rⱼ. Around the hard core sits a soft shell of thickness `sca` × r₀ where a
/// WCA-like repulsion acts in the variable δ = r² - r₀²:
///
/// $$ u(r) = 4ε \left [ \frac{C_{12}}{δ^{12}} - \frac{C_6}{δ^6} \right ] + ε $$
///
/// with $C_6 = (p r_0^6)^2$, $C_{12} = C_6^2$ and $p = (2s + s^2)^3 / \sqrt 2$ where $s$ is `sca`.
/// The constants are chosen such that the energy and its first derivative vanish at the
/// outer cutoff, r = r₀(1 + s). Overlapping hard cores, r ≤ r₀, have the energy [`INFTY`].
///
/// See S. Martiniani, CPGS, p. 20.
///
/// # Examples
/// ~~~
/// use hswca::{HsWca, PairInteraction, INFTY};
/// let hs_wca = HsWca::new(1.0, 0.2, &[1.0, 1.0]);
/// assert_eq!(hs_wca.energy(2.25, 0, 1), INFTY); // inside the hard core, r₀² = 4
/// assert_eq!(hs_wca.energy(9.0, 0, 1), 0.0); // beyond the cutoff, (2.4)² = 5.76
/// assert!(hs_wca.energy(4.5, 0, 1) > 0.0); // in the soft shell
/// ~~~
#[derive(Debug, Clone, PartialEq)]
pub struct HsWca {
    /// Well depth, ε
    eps: f64,
    /// Shell thickness scale factor
    sca: f64,
    /// (2s + s²)³/√2
    prefactor: f64,
    /// Hard core radius of each particle
    radii: Arc<[f64]>,
}

impl HsWca {
    /// Create from well depth, shell scale factor and per-particle radii.
    ///
    /// The radii are copied. No validation is done, see [`HsWca::try_new`].
    pub fn new(eps: f64, sca: f64, radii: &[f64]) -> Self {
        Self {
            eps,
            sca,
            prefactor: (2.0 * sca + sca * sca).powi(3) / std::f64::consts::SQRT_2,
            radii: Arc::from(radii),
        }
    }

    /// Create after checking that all parameters and radii are positive
    pub fn try_new(eps: f64, sca: f64, radii: &[f64]) -> anyhow::Result<Self> {
        Self::from_parameters(HsWcaParameters { eps, sca }, radii)
    }

    /// Create from a parameter set, checking that all parameters and radii are positive
    pub fn from_parameters(parameters: HsWcaParameters, radii: &[f64]) -> anyhow::Result<Self> {
        parameters.validate()?;
        if let Some((index, radius)) = radii
            .iter()
            .enumerate()
            .find(|(_, radius)| !(radius.is_finite() && **radius > 0.0))
        {
            anyhow::bail!("radius of particle {index} must be positive, got {radius}");
        }
        log::debug!(
            "HS-WCA with eps = {}, sca = {} for {} particles",
            parameters.eps,
            parameters.sca,
            radii.len()
        );
        Ok(Self::new(parameters.eps, parameters.sca, radii))
    }

    /// Well depth, ε
    pub const fn eps(&self) -> f64 {
        self.eps
    }

    /// Shell thickness scale factor
    pub const fn sca(&self) -> f64 {
        self.sca
    }

    pub fn parameters(&self) -> HsWcaParameters {
        HsWcaParameters {
            eps: self.eps,
            sca: self.sca,
        }
    }

    /// Hard core radii
    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    /// Squared hard core contact distance, r₀²
    #[inline]
    pub fn hard_core_squared(&self, atomi: usize, atomj: usize) -> f64 {
        self.contact_distance(atomi, atomj).powi(2)
    }

    #[inline(always)]
    fn contact_distance(&self, atomi: usize, atomj: usize) -> f64 {
        self.radii[atomi] + self.radii[atomj]
    }

    /// Classify a pair distance and, inside the soft shell, evaluate the common terms
    #[inline(always)]
    fn regime(&self, distance_squared: f64, atomi: usize, atomj: usize) -> Regime {
        let r0 = self.contact_distance(atomi, atomj);
        let r0_squared = r0 * r0;
        if distance_squared <= r0_squared {
            return Regime::Overlap;
        }
        let cutoff = r0 * (1.0 + self.sca);
        if distance_squared > cutoff * cutoff {
            return Regime::Outside;
        }
        let delta = distance_squared - r0_squared; // difference of squares, never zero here
        let inv_delta_squared = 1.0 / (delta * delta);
        let inv_delta6 = inv_delta_squared * inv_delta_squared * inv_delta_squared;
        let c3 = self.prefactor * r0_squared * r0_squared * r0_squared;
        let c6 = c3 * c3;
        let c6_term = c6 * inv_delta6; // C₆/δ⁶
        Regime::Shell(Shell {
            delta,
            inv_delta_squared,
            c6_term,
            c12_term: c6_term * c6_term, // C₁₂/δ¹²
        })
    }

    #[inline(always)]
    fn shell_energy(&self, shell: &Shell) -> f64 {
        4.0 * self.eps * (shell.c12_term - shell.c6_term) + self.eps
    }

    /// -u'(r)/r; 1/δ since the powers in r are 13 and 7
    #[inline(always)]
    fn shell_gradient(&self, shell: &Shell) -> f64 {
        self.eps * (96.0 * shell.c12_term - 48.0 * shell.c6_term) / shell.delta
    }
}

enum Regime {
    Overlap,
    Outside,
    Shell(Shell),
}

struct Shell {
    /// r² - r₀²
    delta: f64,
    inv_delta_squared: f64,
    c6_term: f64,
    c12_term: f64,
}

impl PairInteraction for HsWca {
    #[inline]
    fn energy(&self, distance_squared: f64, atomi: usize, atomj: usize) -> f64 {
        match self.regime(distance_squared, atomi, atomj) {
            Regime::Overlap => INFTY,
            Regime::Outside => 0.0,
            Regime::Shell(shell) => self.shell_energy(&shell),
        }
    }

    #[inline]
    fn energy_gradient(&self, distance_squared: f64, atomi: usize, atomj: usize) -> (f64, f64) {
        match self.regime(distance_squared, atomi, atomj) {
            Regime::Overlap => (INFTY, INFTY),
            Regime::Outside => (0.0, 0.0),
            Regime::Shell(shell) => (self.shell_energy(&shell), self.shell_gradient(&shell)),
        }
    }

    #[inline]
    fn energy_gradient_hessian(
        &self,
        distance_squared: f64,
        atomi: usize,
        atomj: usize,
    ) -> (f64, f64, f64) {
        match self.regime(distance_squared, atomi, atomj) {
            Regime::Overlap => (INFTY, INFTY, INFTY),
            Regime::Outside => (0.0, 0.0, 0.0),
            Regime::Shell(shell) => {
                let gradient = self.shell_gradient(&shell);
                let hessian = -gradient
                    + self.eps
                        * (2496.0 * shell.c12_term - 672.0 * shell.c6_term)
                        * distance_squared
                        * shell.inv_delta_squared;
                (self.shell_energy(&shell), gradient, hessian)
            }
        }
    }

    fn num_atoms(&self) -> Option<usize> {
        Some(self.radii.len())
    }
}

impl Cutoff for HsWca {
    /// Outer edge of the soft shell, r₀(1 + s)
    fn cutoff(&self, atomi: usize, atomj: usize) -> f64 {
        self.contact_distance(atomi, atomj) * (1.0 + self.sca)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pair() -> HsWca {
        HsWca::new(1.0, 0.2, &[1.0, 1.0])
    }

    /// Exposes only the energy so that the finite difference fallbacks are used
    #[derive(Debug)]
    struct EnergyOnly(HsWca);

    impl PairInteraction for EnergyOnly {
        fn energy(&self, distance_squared: f64, atomi: usize, atomj: usize) -> f64 {
            self.0.energy(distance_squared, atomi, atomj)
        }
    }

    #[test]
    fn test_hard_core_sentinel() {
        let hs_wca = pair();
        for r2 in [0.0, 1.0, 2.25, 3.999, 4.0] {
            assert_eq!(hs_wca.energy(r2, 0, 1), INFTY);
            assert_eq!(hs_wca.energy_gradient(r2, 0, 1), (INFTY, INFTY));
            assert_eq!(hs_wca.energy_gradient_hessian(r2, 0, 1), (INFTY, INFTY, INFTY));
        }
        // sentinel survives ordinary arithmetic
        assert!((2.0 * INFTY + hs_wca.eps()).is_finite());
    }

    #[test]
    fn test_compact_support() {
        let hs_wca = pair();
        let cutoff_squared = hs_wca.cutoff_squared(0, 1);
        assert_relative_eq!(cutoff_squared, 5.76, epsilon = 1e-12);
        for r2 in [5.7601, 6.0, 9.0, 1e6] {
            assert_eq!(hs_wca.energy(r2, 0, 1), 0.0);
            assert_eq!(hs_wca.energy_gradient(r2, 0, 1), (0.0, 0.0));
            assert_eq!(hs_wca.energy_gradient_hessian(r2, 0, 1), (0.0, 0.0, 0.0));
        }
    }

    #[test]
    fn test_continuity_at_cutoff() {
        for sca in [0.1, 0.2, 0.3] {
            let hs_wca = HsWca::new(1.0, sca, &[0.7, 1.3]);
            let cutoff_squared = hs_wca.cutoff_squared(0, 1);
            let mut previous = f64::INFINITY;
            // approach the cutoff from inside
            for k in 1..=8 {
                let r2 = cutoff_squared * (1.0 - 10f64.powi(-k));
                let (energy, gradient) = hs_wca.energy_gradient(r2, 0, 1);
                assert!(energy > -1e-12);
                assert!(energy <= previous + 1e-12);
                previous = energy;
                if k >= 6 {
                    assert!(gradient.abs() < 1e-2);
                }
            }
            assert_relative_eq!(
                hs_wca.energy(cutoff_squared * (1.0 - 1e-10), 0, 1),
                0.0,
                epsilon = 1e-8
            );
        }
    }

    #[test]
    fn test_tiers_agree_on_energy() {
        let hs_wca = HsWca::new(0.5, 0.25, &[0.8, 1.1, 1.4]);
        for (atomi, atomj) in [(0, 1), (1, 2), (0, 2)] {
            let r0_squared = hs_wca.hard_core_squared(atomi, atomj);
            let cutoff_squared = hs_wca.cutoff_squared(atomi, atomj);
            for k in 0..=20 {
                let r2 = 0.5 * r0_squared + k as f64 * (cutoff_squared * 1.5 - 0.5 * r0_squared) / 20.0;
                let energy = hs_wca.energy(r2, atomi, atomj);
                let (energy_g, _) = hs_wca.energy_gradient(r2, atomi, atomj);
                let (energy_h, _, _) = hs_wca.energy_gradient_hessian(r2, atomi, atomj);
                assert_eq!(energy, energy_g);
                assert_eq!(energy, energy_h);
            }
        }
    }

    #[test]
    fn test_symmetric_in_particle_order() {
        let hs_wca = HsWca::new(1.0, 0.2, &[0.9, 1.2]);
        let r2 = 4.8;
        assert_eq!(hs_wca.energy(r2, 0, 1), hs_wca.energy(r2, 1, 0));
        assert_eq!(
            hs_wca.energy_gradient_hessian(r2, 0, 1),
            hs_wca.energy_gradient_hessian(r2, 1, 0)
        );
    }

    #[test]
    fn test_shell_energy() {
        let hs_wca = pair();
        let (r0_squared, r2): (f64, f64) = (4.0, 4.5);
        let delta = r2 - r0_squared;
        let c3 = (2.0 * 0.2 + 0.2 * 0.2_f64).powi(3) / 2.0_f64.sqrt() * r0_squared.powi(3);
        let c6 = c3 * c3;
        let expected = 4.0 * (c6 * c6 / delta.powi(12) - c6 / delta.powi(6)) + 1.0;
        assert_relative_eq!(hs_wca.energy(r2, 0, 1), expected, max_relative = 1e-12);
        assert!(expected > 0.0);
    }

    #[test]
    fn test_derivatives_match_finite_differences() {
        let hs_wca = HsWca::new(1.5, 0.3, &[0.5, 0.6]);
        let numerical = EnergyOnly(hs_wca.clone());
        let r0_squared = hs_wca.hard_core_squared(0, 1);
        let cutoff_squared = hs_wca.cutoff_squared(0, 1);
        for k in 1..10 {
            let r2 = r0_squared + k as f64 * (cutoff_squared - r0_squared) / 10.0;
            let (energy, gradient, hessian) = hs_wca.energy_gradient_hessian(r2, 0, 1);
            let (energy_n, gradient_n, hessian_n) = numerical.energy_gradient_hessian(r2, 0, 1);
            assert_eq!(energy, energy_n);
            assert_relative_eq!(gradient, gradient_n, max_relative = 1e-4, epsilon = 1e-6);
            assert_relative_eq!(hessian, hessian_n, max_relative = 1e-3, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_try_new_rejects_bad_input() {
        assert!(HsWca::try_new(1.0, 0.2, &[1.0, 1.0]).is_ok());
        assert!(HsWca::try_new(0.0, 0.2, &[1.0]).is_err());
        assert!(HsWca::try_new(1.0, -0.1, &[1.0]).is_err());
        assert!(HsWca::try_new(1.0, 0.2, &[1.0, 0.0]).is_err());
        assert!(HsWca::try_new(1.0, 0.2, &[f64::NAN]).is_err());
    }

    #[test]
    fn test_radii_are_copied() {
        let mut radii = vec![1.0, 1.0];
        let hs_wca = HsWca::new(1.0, 0.2, &radii);
        radii[0] = 10.0;
        assert_eq!(hs_wca.radii(), &[1.0, 1.0]);
        assert_eq!(hs_wca.num_atoms(), Some(2));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_parameters_serde() {
        let parameters: HsWcaParameters = serde_json::from_str(r#"{"ε": 0.5, "sca": 0.1}"#).unwrap();
        assert_eq!(parameters, HsWcaParameters { eps: 0.5, sca: 0.1 });
        assert!(serde_json::from_str::<HsWcaParameters>(r#"{"eps": 1.0, "sca": 0.1, "sigma": 2.0}"#).is_err());
        let json = serde_json::to_string(&HsWcaParameters::default()).unwrap();
        assert_eq!(json, r#"{"eps":1.0,"sca":0.2}"#);
    }
}
