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

//! # Pairwise potentials
//!
//! [`PairwisePotential`] sums an interaction law over the pairs given by an
//! enumeration strategy, with distances measured by a distance metric. The three
//! parts are independent, so e.g. a periodic 2D neighbor-list potential is simply
//! `PairwisePotential<HsWca, Periodic<2>, PairList, 2>`.

use crate::distance::{Cartesian, DistanceMetric, Periodic};
use crate::pairs::{AllPairs, PairEnumeration, PairList};
use crate::twobody::{HsWca, PairInteraction};
use crate::{ensure_hessian_shape, Hessian, Potential, INFTY};
use std::sync::Arc;

/// Dense HS-WCA potential in 3D
pub type HsWca3d = PairwisePotential<HsWca, Cartesian<3>, AllPairs, 3>;
/// Dense HS-WCA potential in 2D
pub type HsWca2d = PairwisePotential<HsWca, Cartesian<2>, AllPairs, 2>;
/// Dense HS-WCA potential in a periodic 3D box
pub type HsWcaPeriodic3d = PairwisePotential<HsWca, Periodic<3>, AllPairs, 3>;
/// Dense HS-WCA potential in a periodic 2D box
pub type HsWcaPeriodic2d = PairwisePotential<HsWca, Periodic<2>, AllPairs, 2>;
/// HS-WCA potential in 3D evaluated over a neighbor list
pub type HsWcaNeighborList = PairwisePotential<HsWca, Cartesian<3>, PairList, 3>;

/// Sum of pair interactions over an enumeration of particle pairs in `D` dimensions
///
/// The interaction law and distance metric are shared, immutable and reference counted.
#[derive(Debug)]
pub struct PairwisePotential<I, M, E, const D: usize> {
    interaction: Arc<I>,
    metric: Arc<M>,
    pairs: E,
}

impl<I, M, E: Clone, const D: usize> Clone for PairwisePotential<I, M, E, D> {
    fn clone(&self) -> Self {
        Self {
            interaction: Arc::clone(&self.interaction),
            metric: Arc::clone(&self.metric),
            pairs: self.pairs.clone(),
        }
    }
}

/// Position of particle `index` in a flat coordinate slice
#[inline(always)]
fn position<const D: usize>(coords: &[f64], index: usize) -> &[f64] {
    &coords[D * index..D * (index + 1)]
}

impl<I, M, E, const D: usize> PairwisePotential<I, M, E, D>
where
    I: PairInteraction,
    M: DistanceMetric<D>,
    E: PairEnumeration,
{
    pub fn new(interaction: I, metric: M, pairs: E) -> Self {
        Self::from_shared(Arc::new(interaction), Arc::new(metric), pairs)
    }

    /// Create from an interaction law and a metric that may be shared with other potentials
    pub fn from_shared(interaction: Arc<I>, metric: Arc<M>, pairs: E) -> Self {
        log::debug!(
            "pairwise potential in {D}D with {:?} and {:?}",
            metric,
            pairs
        );
        Self {
            interaction,
            metric,
            pairs,
        }
    }

    pub fn interaction(&self) -> &I {
        &self.interaction
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    pub fn pairs(&self) -> &E {
        &self.pairs
    }

    /// Number of particles in `coords`, after checking that it fits this potential
    fn num_atoms(&self, coords: &[f64]) -> anyhow::Result<usize> {
        anyhow::ensure!(
            coords.len() % D == 0,
            "coordinate length {} is not a multiple of the dimension {D}",
            coords.len()
        );
        let num_atoms = coords.len() / D;
        if let Some(expected) = self.interaction.num_atoms() {
            anyhow::ensure!(
                num_atoms == expected,
                "got coordinates for {num_atoms} particles but the interaction has parameters for {expected}"
            );
        }
        self.pairs.validate(num_atoms)?;
        Ok(num_atoms)
    }

    /// Pairs whose hard cores overlap, i.e. where the pair energy is [`INFTY`]
    pub fn overlaps(&self, coords: &[f64]) -> anyhow::Result<Vec<(usize, usize)>> {
        let num_atoms = self.num_atoms(coords)?;
        let mut overlaps = Vec::new();
        self.pairs.for_each_pair(num_atoms, |i, j| {
            let distance_squared = self
                .metric
                .distance_squared(position::<D>(coords, i), position::<D>(coords, j));
            if self.interaction.energy(distance_squared, i, j) >= INFTY {
                overlaps.push((i, j));
            }
        });
        if !overlaps.is_empty() {
            log::debug!("{} overlapping pairs", overlaps.len());
        }
        Ok(overlaps)
    }
}

impl<I, M, E, const D: usize> Potential for PairwisePotential<I, M, E, D>
where
    I: PairInteraction + 'static,
    M: DistanceMetric<D> + 'static,
    E: PairEnumeration + 'static,
{
    fn energy(&self, coords: &[f64]) -> anyhow::Result<f64> {
        let num_atoms = self.num_atoms(coords)?;
        let mut energy = 0.0;
        self.pairs.for_each_pair(num_atoms, |i, j| {
            let distance_squared = self
                .metric
                .distance_squared(position::<D>(coords, i), position::<D>(coords, j));
            energy += self.interaction.energy(distance_squared, i, j);
        });
        Ok(energy)
    }

    fn energy_gradient(&self, coords: &[f64], gradient: &mut [f64]) -> anyhow::Result<f64> {
        let num_atoms = self.num_atoms(coords)?;
        anyhow::ensure!(
            gradient.len() == coords.len(),
            "gradient length {} does not match coordinate length {}",
            gradient.len(),
            coords.len()
        );
        gradient.fill(0.0);
        let mut energy = 0.0;
        self.pairs.for_each_pair(num_atoms, |i, j| {
            let dr = self
                .metric
                .displacement(position::<D>(coords, i), position::<D>(coords, j));
            let (pair_energy, g) = self
                .interaction
                .energy_gradient(dr.norm_squared(), i, j);
            energy += pair_energy;
            for k in 0..D {
                gradient[D * i + k] -= g * dr[k];
                gradient[D * j + k] += g * dr[k];
            }
        });
        Ok(energy)
    }

    fn energy_gradient_hessian(
        &self,
        coords: &[f64],
        gradient: &mut [f64],
        hessian: &mut Hessian,
    ) -> anyhow::Result<f64> {
        let num_atoms = self.num_atoms(coords)?;
        anyhow::ensure!(
            gradient.len() == coords.len(),
            "gradient length {} does not match coordinate length {}",
            gradient.len(),
            coords.len()
        );
        ensure_hessian_shape(hessian, coords.len())?;
        gradient.fill(0.0);
        hessian.fill(0.0);
        let mut energy = 0.0;
        self.pairs.for_each_pair(num_atoms, |i, j| {
            let dr = self
                .metric
                .displacement(position::<D>(coords, i), position::<D>(coords, j));
            let r2 = dr.norm_squared();
            let (pair_energy, g, h) = self.interaction.energy_gradient_hessian(r2, i, j);
            energy += pair_energy;
            for k in 0..D {
                gradient[D * i + k] -= g * dr[k];
                gradient[D * j + k] += g * dr[k];
            }
            // coincident particles have no radial direction
            let radial = if r2 > 0.0 { (h + g) / r2 } else { 0.0 };
            for k in 0..D {
                for l in 0..D {
                    let mut block = radial * dr[k] * dr[l];
                    if k == l {
                        block -= g;
                    }
                    hessian[(D * i + k, D * i + l)] += block;
                    hessian[(D * j + k, D * j + l)] += block;
                    hessian[(D * i + k, D * j + l)] -= block;
                    hessian[(D * j + k, D * i + l)] -= block;
                }
            }
        });
        Ok(energy)
    }
}

impl<const D: usize> PairwisePotential<HsWca, Cartesian<D>, AllPairs, D> {
    /// Dense HS-WCA potential without periodic boundaries
    pub fn hs_wca(eps: f64, sca: f64, radii: &[f64]) -> anyhow::Result<Self> {
        Ok(Self::new(HsWca::try_new(eps, sca, radii)?, Cartesian, AllPairs))
    }
}

impl<const D: usize> PairwisePotential<HsWca, Periodic<D>, AllPairs, D> {
    /// Dense HS-WCA potential in a rectangular periodic box
    pub fn hs_wca_periodic(
        eps: f64,
        sca: f64,
        radii: &[f64],
        box_length: &[f64],
    ) -> anyhow::Result<Self> {
        Ok(Self::new(
            HsWca::try_new(eps, sca, radii)?,
            Periodic::try_new(box_length)?,
            AllPairs,
        ))
    }
}

impl<const D: usize> PairwisePotential<HsWca, Cartesian<D>, PairList, D> {
    /// HS-WCA potential evaluated only over the pairs in `pairs`
    pub fn hs_wca_neighbor_list(
        pairs: PairList,
        eps: f64,
        sca: f64,
        radii: &[f64],
    ) -> anyhow::Result<Self> {
        let interaction = HsWca::try_new(eps, sca, radii)?;
        pairs.validate(radii.len())?;
        Ok(Self::new(interaction, Cartesian, pairs))
    }
}
