//! Append-only, duplicate-free and order-stable storage of doubly-occupied determinants.

use std::fmt;
use std::ops::Range;
use std::path::Path;

use derive_builder::Builder;
use indexmap::IndexSet;
use log;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combinatorics::binomial;
use crate::determinant::{check_nbasis, nword, Determinant};
use crate::error::{invalid_arg, resource_exceeded, DociError};
use crate::excitation::ExcitationGenerator;
use crate::io::format::nice_bool;
use crate::io::wfn_file::{read_wfn_file, write_wfn_file};


/// The default upper bound on the number of determinants a single store may hold.
pub const DEFAULT_MAX_DETERMINANTS: u64 = 1 << 32;

/// The default minimum size of a bulk enumeration before it is split across threads.
pub const DEFAULT_PARALLEL_THRESHOLD: u64 = 1 << 16;

// ==================
// Struct definitions
// ==================

// ----------
// Parameters
// ----------

/// A structure containing control parameters for a [`DeterminantStore`].
#[derive(Clone, Builder, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeterminantStoreParams {
    /// The maximum number of determinants the store may hold. Any insertion that could take the
    /// store beyond this bound is rejected before anything is generated or allocated.
    #[builder(default = "DEFAULT_MAX_DETERMINANTS")]
    #[serde(default = "default_max_determinants")]
    pub max_determinants: u64,

    /// The minimum number of determinants in a bulk enumeration for it to be partitioned by rank
    /// ranges and generated on the `rayon` thread pool.
    #[builder(default = "DEFAULT_PARALLEL_THRESHOLD")]
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: u64,

    /// The number of rank partitions for parallel enumeration. If `None`, the number of threads
    /// in the current `rayon` thread pool is used.
    #[builder(default = "None")]
    #[serde(default)]
    pub n_partitions: Option<usize>,
}

fn default_max_determinants() -> u64 {
    DEFAULT_MAX_DETERMINANTS
}

fn default_parallel_threshold() -> u64 {
    DEFAULT_PARALLEL_THRESHOLD
}

impl DeterminantStoreParams {
    /// Returns a builder to construct a [`DeterminantStoreParams`] structure.
    pub fn builder() -> DeterminantStoreParamsBuilder {
        DeterminantStoreParamsBuilder::default()
    }

    /// Returns the number of rank partitions to use for an enumeration of `n` determinants.
    fn n_partitions_for(&self, n: u64) -> usize {
        if n < self.parallel_threshold {
            1
        } else {
            self.n_partitions
                .unwrap_or_else(rayon::current_num_threads)
                .max(1)
        }
    }
}

impl Default for DeterminantStoreParams {
    fn default() -> Self {
        Self::builder()
            .build()
            .expect("Unable to build a default `DeterminantStoreParams`.")
    }
}

impl fmt::Display for DeterminantStoreParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Maximum number of determinants: {}", self.max_determinants)?;
        writeln!(
            f,
            "Parallel enumeration threshold: {} determinants",
            self.parallel_threshold
        )?;
        writeln!(
            f,
            "Rank partitions: {}",
            self.n_partitions
                .map(|n| n.to_string())
                .unwrap_or_else(|| format!("auto ({})", rayon::current_num_threads()))
        )?;
        Ok(())
    }
}

// -----
// Store
// -----

/// A structure to own the determinants of a doubly-occupied configuration-interaction
/// wavefunction.
///
/// Determinants are kept in insertion order and are never removed or reordered, so the position
/// of a determinant is permanently stable once assigned and may be used by collaborators as a
/// matrix index. A content-keyed reverse index gives the position of any stored determinant in
/// amortised constant time.
#[derive(Clone, Debug)]
pub struct DeterminantStore {
    /// The number of spatial orbitals.
    nbasis: usize,

    /// The number of occupied spatial orbitals.
    nocc: usize,

    /// The size of the full determinant space, $`\binom{n_{\mathrm{basis}}}{n_{\mathrm{occ}}}`$.
    ndet_max: u64,

    /// The control parameters.
    params: DeterminantStoreParams,

    /// The generator for determinants of this store's sector.
    generator: ExcitationGenerator,

    /// The stored determinants, in insertion order.
    dets: IndexSet<Determinant>,
}

impl DeterminantStore {
    /// Creates an empty store for determinants with `nocc` pairs in `nbasis` orbitals using
    /// default parameters.
    ///
    /// # Errors
    ///
    /// [`DociError::InvalidArgument`] if `nocc == 0` or `nocc >= nbasis`, and
    /// [`DociError::ResourceExceeded`] if `nbasis` exceeds [`crate::determinant::MAX_NBASIS`] or
    /// the determinant space cannot be addressed.
    pub fn new(nbasis: usize, nocc: usize) -> Result<Self, DociError> {
        Self::with_params(nbasis, nocc, DeterminantStoreParams::default())
    }

    /// Creates an empty store with the given control parameters.
    ///
    /// The record width and the size of the full determinant space are checked before anything
    /// is allocated.
    pub fn with_params(
        nbasis: usize,
        nocc: usize,
        params: DeterminantStoreParams,
    ) -> Result<Self, DociError> {
        if nocc == 0 || nocc >= nbasis {
            invalid_arg!("The number of occupied orbitals must lie in [1, {nbasis}), got {nocc}.");
        }
        check_nbasis(nbasis)?;
        let ndet_max = binomial(nbasis, nocc)?;
        if usize::try_from(ndet_max).is_err() {
            resource_exceeded!(
                "C({nbasis}, {nocc}) = {ndet_max} determinant positions cannot be addressed."
            );
        }
        let generator = ExcitationGenerator::new(nbasis, nocc)?;
        Ok(Self {
            nbasis,
            nocc,
            ndet_max,
            params,
            generator,
            dets: IndexSet::new(),
        })
    }

    /// Returns the number of spatial orbitals.
    pub fn nbasis(&self) -> usize {
        self.nbasis
    }

    /// Returns the number of occupied spatial orbitals.
    pub fn nocc(&self) -> usize {
        self.nocc
    }

    /// Returns the number of virtual spatial orbitals.
    pub fn nvir(&self) -> usize {
        self.nbasis - self.nocc
    }

    /// Returns the number of 64-bit words needed to pack one determinant.
    pub fn nword(&self) -> usize {
        nword(self.nbasis)
    }

    /// Returns the size of the full determinant space.
    pub fn ndet_max(&self) -> u64 {
        self.ndet_max
    }

    /// Returns the control parameters.
    pub fn params(&self) -> &DeterminantStoreParams {
        &self.params
    }

    /// Returns the reference determinant, which has the `nocc` lowest orbitals occupied.
    pub fn reference(&self) -> &Determinant {
        self.generator.reference()
    }

    /// Returns the number of stored determinants.
    pub fn count(&self) -> usize {
        self.dets.len()
    }

    /// Returns `true` if no determinants are stored.
    pub fn is_empty(&self) -> bool {
        self.dets.is_empty()
    }

    /// Returns the number of determinants that can be held without reallocating.
    pub fn capacity(&self) -> usize {
        self.dets.capacity()
    }

    /// Returns the determinant at `position`.
    pub fn get(&self, position: usize) -> Option<&Determinant> {
        self.dets.get_index(position)
    }

    /// Returns the position of `det`, if stored.
    pub fn find(&self, det: &Determinant) -> Option<usize> {
        self.dets.get_index_of(det)
    }

    /// Returns the number of occupied orbitals in `det`.
    pub fn popcount(&self, det: &Determinant) -> usize {
        det.popcount()
    }

    /// Returns an iterator over `(position, determinant)` pairs in position order. Since
    /// determinants are never removed or reordered, repeated traversals yield identical results.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (usize, &Determinant)> + '_ {
        self.dets.iter().enumerate()
    }

    /// Returns the combinatorial ranks of the stored determinants in position order.
    pub fn ranks(&self) -> Result<Vec<u64>, DociError> {
        self.dets
            .par_iter()
            .map(Determinant::rank)
            .collect::<Result<Vec<_>, _>>()
    }

    /// Checks that holding up to `bound` determinants is allowed by
    /// [`DeterminantStoreParams::max_determinants`].
    fn check_capacity(&self, bound: u64) -> Result<(), DociError> {
        if bound > self.params.max_determinants {
            resource_exceeded!(
                "Up to {bound} determinants would be stored, exceeding the bound of {}.",
                self.params.max_determinants
            );
        }
        Ok(())
    }

    /// Pre-allocates storage for at least `n` determinants in total. Requests beyond the size of
    /// the full determinant space are capped at that size. Storage never shrinks.
    ///
    /// # Errors
    ///
    /// [`DociError::ResourceExceeded`] if the (capped) request exceeds the capacity bound or
    /// cannot be allocated.
    pub fn reserve(&mut self, n: usize) -> Result<(), DociError> {
        let target = (n as u64).min(self.ndet_max);
        self.check_capacity(target)?;
        self.reserve_total(target)
    }

    /// Reserves room for `total` determinants in all, without checking the capacity bound.
    fn reserve_total(&mut self, total: u64) -> Result<(), DociError> {
        let total = usize::try_from(total).map_err(|_| {
            DociError::ResourceExceeded(format!("{total} determinants cannot be addressed."))
        })?;
        let additional = total.saturating_sub(self.dets.len());
        if additional > 0 && self.dets.capacity() < total {
            self.dets.try_reserve(additional).map_err(|err| {
                DociError::ResourceExceeded(format!(
                    "Unable to reserve room for {total} determinants: {err}"
                ))
            })?;
        }
        Ok(())
    }

    /// Appends `dets`, silently skipping those already present.
    ///
    /// # Returns
    ///
    /// The number of determinants appended.
    fn extend_unique(&mut self, dets: Vec<Determinant>) -> Result<usize, DociError> {
        let before = self.dets.len();
        let total = (before as u64)
            .saturating_add(dets.len() as u64)
            .min(self.ndet_max);
        self.reserve_total(total)?;
        self.dets.extend(dets);
        Ok(self.dets.len() - before)
    }

    /// Appends every determinant of the full space in lexicographic order of occupied orbitals,
    /// silently skipping any already present. A second call changes nothing.
    ///
    /// # Returns
    ///
    /// The number of determinants appended.
    ///
    /// # Errors
    ///
    /// [`DociError::ResourceExceeded`] if the full space exceeds the capacity bound. The store is
    /// left unchanged in that case.
    pub fn add_all_dets(&mut self) -> Result<usize, DociError> {
        if self.dets.len() as u64 == self.ndet_max {
            return Ok(0);
        }
        self.check_capacity(self.ndet_max)?;
        let nparts = self.params.n_partitions_for(self.ndet_max);
        let dets = if nparts > 1 {
            self.generator.par_all_dets(nparts)?
        } else {
            self.generator.all_dets_in_range(0..self.ndet_max)?
        };
        let added = self.extend_unique(dets)?;
        log::debug!(
            "Added {added} of {} determinants of the full space.",
            self.ndet_max
        );
        Ok(added)
    }

    /// Appends every determinant of excitation order `order` relative to the reference
    /// determinant, silently skipping any already present.
    ///
    /// # Returns
    ///
    /// The number of determinants appended.
    ///
    /// # Errors
    ///
    /// [`DociError::InvalidArgument`] if `order < 0` or `order > nocc`, and
    /// [`DociError::ResourceExceeded`] if the insertion could exceed the capacity bound. The
    /// store is left unchanged in either case.
    pub fn add_excited_dets(&mut self, order: i64) -> Result<usize, DociError> {
        let n = self.generator.n_excited(order)?;
        let bound = (self.dets.len() as u64)
            .saturating_add(n)
            .min(self.ndet_max);
        self.check_capacity(bound)?;
        let nparts = self.params.n_partitions_for(n);
        let dets = if nparts > 1 {
            self.generator.par_excited_dets(order, nparts)?
        } else {
            self.generator.excited_dets(order)?
        };
        let added = self.extend_unique(dets)?;
        log::debug!("Added {added} of {n} order-{order} excited determinants.");
        Ok(added)
    }

    /// Appends the reference determinant if it is not already present.
    ///
    /// # Returns
    ///
    /// The position of the reference determinant if it was appended, or `None` if it was already
    /// present.
    pub fn add_hartreefock_det(&mut self) -> Result<Option<usize>, DociError> {
        self.add_det(self.generator.reference().clone())
    }

    /// Appends a single determinant if it is not already present.
    ///
    /// # Returns
    ///
    /// The position of the new determinant, or `None` if it was already present.
    ///
    /// # Errors
    ///
    /// [`DociError::InvalidArgument`] if `det` does not span `nbasis` orbitals or does not have
    /// exactly `nocc` occupied orbitals, and [`DociError::ResourceExceeded`] if the store is
    /// full.
    pub fn add_det(&mut self, det: Determinant) -> Result<Option<usize>, DociError> {
        self.check_det(&det)?;
        if self.dets.contains(&det) {
            return Ok(None);
        }
        self.check_capacity(self.dets.len() as u64 + 1)?;
        let (position, _) = self.dets.insert_full(det);
        Ok(Some(position))
    }

    /// Appends the determinant with the given occupied orbitals if it is not already present.
    pub fn add_occs(&mut self, occs: &[usize]) -> Result<Option<usize>, DociError> {
        self.add_det(Determinant::from_occs(self.nbasis, occs)?)
    }

    /// Checks that `det` belongs to this store's sector.
    fn check_det(&self, det: &Determinant) -> Result<(), DociError> {
        if det.nbasis() != self.nbasis {
            invalid_arg!(
                "Determinant {det} spans {} orbitals instead of {}.",
                det.nbasis(),
                self.nbasis
            );
        }
        if det.popcount() != self.nocc {
            invalid_arg!(
                "Determinant {det} has {} occupied orbitals instead of {}.",
                det.popcount(),
                self.nocc
            );
        }
        Ok(())
    }

    /// Appends `det` without checking its sector, for use by readers that have already
    /// validated it.
    ///
    /// # Returns
    ///
    /// `false` if `det` was already present, in which case nothing is appended.
    pub(crate) fn push_checked(&mut self, det: Determinant) -> Result<bool, DociError> {
        self.check_det(&det)?;
        self.check_capacity(self.dets.len() as u64 + 1)?;
        Ok(self.dets.insert(det))
    }

    /// Returns the packed words of the determinants in `positions`, concatenated.
    pub fn to_det_array(&self, positions: Range<usize>) -> Result<Vec<u64>, DociError> {
        self.check_positions(&positions)?;
        Ok(positions
            .filter_map(|position| self.dets.get_index(position))
            .flat_map(Determinant::words)
            .collect())
    }

    /// Returns the occupied orbitals of the determinants in `positions`.
    pub fn to_occs_array(&self, positions: Range<usize>) -> Result<Vec<Vec<usize>>, DociError> {
        self.check_positions(&positions)?;
        Ok(positions
            .filter_map(|position| self.dets.get_index(position))
            .map(Determinant::occs)
            .collect())
    }

    fn check_positions(&self, positions: &Range<usize>) -> Result<(), DociError> {
        if positions.start > positions.end || positions.end > self.dets.len() {
            invalid_arg!(
                "Positions {}..{} are outside [0, {}).",
                positions.start,
                positions.end,
                self.dets.len()
            );
        }
        Ok(())
    }

    /// Builds a store from concatenated packed determinants, `nword` words each, skipping
    /// repeated determinants.
    pub fn from_det_array(nbasis: usize, nocc: usize, words: &[u64]) -> Result<Self, DociError> {
        let mut store = Self::new(nbasis, nocc)?;
        let nword = store.nword();
        if words.len() % nword != 0 {
            invalid_arg!(
                "{} words cannot be split into records of {nword} words.",
                words.len()
            );
        }
        store.reserve(words.len() / nword)?;
        for record in words.chunks_exact(nword) {
            store.add_det(Determinant::from_words(nbasis, record)?)?;
        }
        Ok(store)
    }

    /// Builds a store from lists of occupied orbitals, skipping repeated determinants.
    pub fn from_occs_array(
        nbasis: usize,
        nocc: usize,
        occs_array: &[Vec<usize>],
    ) -> Result<Self, DociError> {
        let mut store = Self::new(nbasis, nocc)?;
        store.reserve(occs_array.len())?;
        for occs in occs_array {
            store.add_occs(occs)?;
        }
        Ok(store)
    }

    /// Writes the store to a binary file. See [`crate::io::wfn_file`] for the layout.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), DociError> {
        write_wfn_file(path, self)
    }

    /// Reads a store back from a binary file written by [`Self::to_file`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DociError> {
        read_wfn_file(path)
    }
}

impl<'a> IntoIterator for &'a DeterminantStore {
    type Item = &'a Determinant;
    type IntoIter = indexmap::set::Iter<'a, Determinant>;

    fn into_iter(self) -> Self::IntoIter {
        self.dets.iter()
    }
}

impl fmt::Display for DeterminantStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of spatial orbitals: {}", self.nbasis)?;
        writeln!(f, "Number of occupied orbitals: {}", self.nocc)?;
        writeln!(f, "Number of virtual orbitals: {}", self.nvir())?;
        writeln!(f, "Words per determinant: {}", self.nword())?;
        writeln!(
            f,
            "Stored determinants: {} of {}",
            self.count(),
            self.ndet_max
        )?;
        writeln!(
            f,
            "Full space enumerated: {}",
            nice_bool(self.count() as u64 == self.ndet_max)
        )?;
        Ok(())
    }
}
