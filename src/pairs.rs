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

//! # Pair enumeration
//!
//! Strategies for visiting the particle pairs that contribute to a potential.

use itertools::{iproduct, Itertools};
use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Arc;

/// Visits unordered particle pairs `(i, j)` with `i != j`
pub trait PairEnumeration: Debug + Clone + Send + Sync {
    /// Check that every visited pair is valid for a system of `num_atoms` particles
    fn validate(&self, num_atoms: usize) -> anyhow::Result<()>;

    /// Call `f` once for every pair
    fn for_each_pair<F: FnMut(usize, usize)>(&self, num_atoms: usize, f: F);
}

/// All N(N-1)/2 unordered pairs, `i < j`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllPairs;

impl PairEnumeration for AllPairs {
    fn validate(&self, _num_atoms: usize) -> anyhow::Result<()> {
        Ok(())
    }

    #[inline]
    fn for_each_pair<F: FnMut(usize, usize)>(&self, num_atoms: usize, mut f: F) {
        (0..num_atoms)
            .tuple_combinations()
            .for_each(|(i, j)| f(i, j));
    }
}

/// Caller supplied list of interacting pairs, typically a neighbor list
///
/// Duplicate pairs are not detected and are visited as many times as they occur.
///
/// # Examples
/// ~~~
/// use hswca::PairList;
/// let pairs = PairList::from_flat(&[0, 1, 1, 2]).unwrap();
/// assert_eq!(pairs.len(), 2);
/// assert!(PairList::from_flat(&[0, 1, 2]).is_err());
/// ~~~
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairList {
    pairs: Arc<[(usize, usize)]>,
    /// Largest particle index in the list
    max_index: Option<usize>,
}

impl PairList {
    /// Create from a list of index pairs
    pub fn new(pairs: Vec<(usize, usize)>) -> anyhow::Result<Self> {
        if let Some((i, j)) = pairs.iter().find(|(i, j)| i == j) {
            anyhow::bail!("pair ({i}, {j}) refers to the same particle twice");
        }
        let max_index = pairs.iter().map(|&(i, j)| i.max(j)).max();
        Ok(Self {
            pairs: pairs.into(),
            max_index,
        })
    }

    /// Create from a flat sequence `[i₀, j₀, i₁, j₁, ...]`
    pub fn from_flat(flat: &[usize]) -> anyhow::Result<Self> {
        anyhow::ensure!(
            flat.len() % 2 == 0,
            "flat pair list must have even length, got {}",
            flat.len()
        );
        Self::new(flat.iter().copied().tuples().collect())
    }

    /// Number of pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }
}

impl PairEnumeration for PairList {
    fn validate(&self, num_atoms: usize) -> anyhow::Result<()> {
        match self.max_index {
            Some(max_index) if max_index >= num_atoms => anyhow::bail!(
                "pair list refers to particle {max_index} but there are only {num_atoms} particles"
            ),
            _ => Ok(()),
        }
    }

    #[inline]
    fn for_each_pair<F: FnMut(usize, usize)>(&self, _num_atoms: usize, mut f: F) {
        self.pairs.iter().for_each(|&(i, j)| f(i, j));
    }
}

/// Pairs restricted to subsets of the particles
///
/// Useful e.g. for the interaction of a cluster with a fixed substrate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomSubsets {
    /// All unordered pairs within a single subset
    Within(Arc<[usize]>),
    /// All pairs with one particle in each of two disjoint subsets
    Between(Arc<[usize]>, Arc<[usize]>),
}

impl AtomSubsets {
    /// All pairs among `atoms`, which must be distinct
    pub fn within(atoms: &[usize]) -> anyhow::Result<Self> {
        anyhow::ensure!(
            atoms.iter().all_unique(),
            "atom subset contains duplicates: {atoms:?}"
        );
        Ok(Self::Within(atoms.into()))
    }

    /// All pairs between `first` and `second`, which must not share particles
    pub fn between(first: &[usize], second: &[usize]) -> anyhow::Result<Self> {
        let first_set: HashSet<_> = first.iter().collect();
        if let Some(shared) = second.iter().find(|atom| first_set.contains(atom)) {
            anyhow::bail!("particle {shared} appears in both atom subsets");
        }
        Ok(Self::Between(first.into(), second.into()))
    }

    fn max_index(&self) -> Option<usize> {
        match self {
            Self::Within(atoms) => atoms.iter().copied().max(),
            Self::Between(first, second) => first.iter().chain(second.iter()).copied().max(),
        }
    }
}

impl PairEnumeration for AtomSubsets {
    fn validate(&self, num_atoms: usize) -> anyhow::Result<()> {
        match self.max_index() {
            Some(max_index) if max_index >= num_atoms => anyhow::bail!(
                "atom subset refers to particle {max_index} but there are only {num_atoms} particles"
            ),
            _ => Ok(()),
        }
    }

    #[inline]
    fn for_each_pair<F: FnMut(usize, usize)>(&self, _num_atoms: usize, mut f: F) {
        match self {
            Self::Within(atoms) => atoms
                .iter()
                .tuple_combinations()
                .for_each(|(&i, &j)| f(i, j)),
            Self::Between(first, second) => {
                iproduct!(first.iter(), second.iter()).for_each(|(&i, &j)| f(i, j))
            }
        }
    }
}
