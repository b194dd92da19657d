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

//! # Frozen degrees of freedom
//!
//! Hold a subset of the coordinates fixed at reference values and expose any
//! [`Potential`] over the remaining, mobile, coordinates only.

use crate::{ensure_hessian_shape, Hessian, Potential};
use itertools::Itertools;
use std::sync::Arc;

/// Splits a full coordinate vector into frozen and mobile degrees of freedom
///
/// # Examples
/// ~~~
/// use hswca::FrozenCoordinates;
/// let frozen = FrozenCoordinates::new(&[0.0, 1.0, 2.0, 3.0], &[2, 0]).unwrap();
/// assert_eq!(frozen.mobile_dof(), &[1, 3]);
/// assert_eq!(frozen.full_coords(&[10.0, 30.0]).unwrap(), vec![0.0, 10.0, 2.0, 30.0]);
/// ~~~
#[derive(Debug, Clone, PartialEq)]
pub struct FrozenCoordinates {
    /// Full coordinate vector holding the frozen values
    reference: Arc<[f64]>,
    /// Sorted indices of frozen coordinates
    frozen_dof: Arc<[usize]>,
    /// Sorted indices of mobile coordinates
    mobile_dof: Arc<[usize]>,
}

impl FrozenCoordinates {
    /// Create from reference coordinates and the indices to freeze.
    ///
    /// Duplicated indices are ignored; indices outside the reference vector are an error.
    pub fn new(reference: &[f64], frozen_dof: &[usize]) -> anyhow::Result<Self> {
        if let Some(index) = frozen_dof.iter().find(|&&index| index >= reference.len()) {
            anyhow::bail!(
                "frozen coordinate {index} is out of range for {} coordinates",
                reference.len()
            );
        }
        let frozen_dof: Vec<usize> = frozen_dof.iter().copied().sorted().dedup().collect();
        let mobile_dof: Vec<usize> = (0..reference.len())
            .filter(|index| frozen_dof.binary_search(index).is_err())
            .collect();
        log::debug!(
            "freezing {} of {} coordinates",
            frozen_dof.len(),
            reference.len()
        );
        Ok(Self {
            reference: reference.into(),
            frozen_dof: frozen_dof.into(),
            mobile_dof: mobile_dof.into(),
        })
    }

    /// Number of coordinates in the full space
    pub fn ndof(&self) -> usize {
        self.reference.len()
    }

    pub fn ndof_frozen(&self) -> usize {
        self.frozen_dof.len()
    }

    pub fn ndof_mobile(&self) -> usize {
        self.mobile_dof.len()
    }

    pub fn frozen_dof(&self) -> &[usize] {
        &self.frozen_dof
    }

    pub fn mobile_dof(&self) -> &[usize] {
        &self.mobile_dof
    }

    /// Full reference coordinates
    pub fn reference(&self) -> &[f64] {
        &self.reference
    }

    /// Full coordinate vector with `reduced` placed at the mobile indices
    pub fn full_coords(&self, reduced: &[f64]) -> anyhow::Result<Vec<f64>> {
        anyhow::ensure!(
            reduced.len() == self.ndof_mobile(),
            "expected {} mobile coordinates, got {}",
            self.ndof_mobile(),
            reduced.len()
        );
        let mut full = self.reference.to_vec();
        for (&index, &value) in self.mobile_dof.iter().zip(reduced) {
            full[index] = value;
        }
        Ok(full)
    }

    /// Mobile part of a full coordinate (or gradient) vector
    pub fn reduced_coords(&self, full: &[f64]) -> anyhow::Result<Vec<f64>> {
        anyhow::ensure!(
            full.len() == self.ndof(),
            "expected {} coordinates, got {}",
            self.ndof(),
            full.len()
        );
        Ok(self.mobile_dof.iter().map(|&index| full[index]).collect())
    }

    /// Rows and columns of a full Hessian belonging to mobile coordinates
    pub fn reduced_hessian(&self, full: &Hessian) -> anyhow::Result<Hessian> {
        ensure_hessian_shape(full, self.ndof())?;
        Ok(full
            .select_rows(self.mobile_dof.iter())
            .select_columns(self.mobile_dof.iter()))
    }
}

/// Potential over mobile coordinates only, with the frozen ones held at reference values
///
/// Energies equal those of the wrapped potential evaluated on the spliced full
/// coordinates. Gradients and Hessians are restricted to the mobile coordinates.
#[derive(Debug)]
pub struct FrozenPotential<P: ?Sized> {
    potential: Arc<P>,
    coords: FrozenCoordinates,
}

impl<P: ?Sized> Clone for FrozenPotential<P> {
    fn clone(&self) -> Self {
        Self {
            potential: Arc::clone(&self.potential),
            coords: self.coords.clone(),
        }
    }
}

impl<P: Potential + ?Sized> FrozenPotential<P> {
    /// Wrap `potential`, freezing `frozen_dof` at the values in `reference`
    pub fn new(potential: Arc<P>, reference: &[f64], frozen_dof: &[usize]) -> anyhow::Result<Self> {
        // also catches reference vectors of the wrong length
        potential.energy(reference)?;
        Ok(Self {
            potential,
            coords: FrozenCoordinates::new(reference, frozen_dof)?,
        })
    }

    /// The wrapped full space potential
    pub fn inner(&self) -> &P {
        &self.potential
    }

    /// Mapping between full and mobile coordinates
    pub fn frozen_coordinates(&self) -> &FrozenCoordinates {
        &self.coords
    }

    fn ensure_gradient_length(&self, gradient: &[f64]) -> anyhow::Result<()> {
        anyhow::ensure!(
            gradient.len() == self.coords.ndof_mobile(),
            "gradient length {} does not match the {} mobile coordinates",
            gradient.len(),
            self.coords.ndof_mobile()
        );
        Ok(())
    }
}

impl<P: Potential + ?Sized + 'static> Potential for FrozenPotential<P> {
    fn energy(&self, coords: &[f64]) -> anyhow::Result<f64> {
        self.potential.energy(&self.coords.full_coords(coords)?)
    }

    fn energy_gradient(&self, coords: &[f64], gradient: &mut [f64]) -> anyhow::Result<f64> {
        self.ensure_gradient_length(gradient)?;
        let full = self.coords.full_coords(coords)?;
        let mut full_gradient = vec![0.0; full.len()];
        let energy = self.potential.energy_gradient(&full, &mut full_gradient)?;
        for (gradient, &index) in gradient.iter_mut().zip(self.coords.mobile_dof()) {
            *gradient = full_gradient[index];
        }
        Ok(energy)
    }

    fn energy_gradient_hessian(
        &self,
        coords: &[f64],
        gradient: &mut [f64],
        hessian: &mut Hessian,
    ) -> anyhow::Result<f64> {
        self.ensure_gradient_length(gradient)?;
        ensure_hessian_shape(hessian, self.coords.ndof_mobile())?;
        let full = self.coords.full_coords(coords)?;
        let ndof = full.len();
        let mut full_gradient = vec![0.0; ndof];
        let mut full_hessian = Hessian::zeros(ndof, ndof);
        let energy =
            self.potential
                .energy_gradient_hessian(&full, &mut full_gradient, &mut full_hessian)?;
        for (gradient, &index) in gradient.iter_mut().zip(self.coords.mobile_dof()) {
            *gradient = full_gradient[index];
        }
        hessian.copy_from(&self.coords.reduced_hessian(&full_hessian)?);
        Ok(energy)
    }
}
