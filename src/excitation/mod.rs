//! Enumeration of determinants by excitation order relative to the reference determinant.

use std::ops::Range;

use log;
use rayon::prelude::*;

use crate::combinatorics::{binomial, fill_combination, next_combination, partition_ranks};
use crate::determinant::{check_nbasis, Determinant};
use crate::error::{invalid_arg, DociError};


// ==================
// Struct definitions
// ==================

/// A structure to generate doubly-occupied determinants over `nbasis` orbitals with `nocc` pairs.
///
/// The reference determinant has the `nocc` lowest orbitals occupied. An excitation of order
/// $`i`$ vacates $`i`$ of the reference-occupied orbitals and fills $`i`$ of the `nvir`
/// reference-virtual orbitals. Within one order, determinants are enumerated with the
/// lexicographically ordered $`i`$-subsets of occupied orbitals to vacate as the outer loop and the
/// lexicographically ordered $`i`$-subsets of virtual orbitals to fill as the inner loop. The
/// position of a determinant in this enumeration is its *excitation rank*,
///
/// ```math
/// \text{outer rank} \times \binom{n_{\mathrm{vir}}}{i} + \text{inner rank}.
/// ```
#[derive(Clone, Debug)]
pub struct ExcitationGenerator {
    /// The number of spatial orbitals.
    nbasis: usize,

    /// The number of occupied spatial orbitals.
    nocc: usize,

    /// The reference determinant.
    reference: Determinant,
}

impl ExcitationGenerator {
    /// Constructs a generator for determinants with `nocc` pairs in `nbasis` orbitals.
    ///
    /// # Errors
    ///
    /// [`DociError::InvalidArgument`] if `nocc > nbasis`, and [`DociError::ResourceExceeded`] if
    /// `nbasis` exceeds [`crate::determinant::MAX_NBASIS`].
    pub fn new(nbasis: usize, nocc: usize) -> Result<Self, DociError> {
        check_nbasis(nbasis)?;
        if nocc > nbasis {
            invalid_arg!("Cannot place {nocc} pairs in {nbasis} orbitals.");
        }
        let reference = Determinant::from_occs(nbasis, &(0..nocc).collect::<Vec<_>>())?;
        Ok(Self {
            nbasis,
            nocc,
            reference,
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

    /// Returns the number of virtual spatial orbitals in the reference determinant.
    pub fn nvir(&self) -> usize {
        self.nbasis - self.nocc
    }

    /// Returns the reference determinant, which has the `nocc` lowest orbitals occupied.
    pub fn reference(&self) -> &Determinant {
        &self.reference
    }

    /// Checks that `order` is a valid excitation order and converts it to `usize`.
    pub(crate) fn check_order(&self, order: i64) -> Result<usize, DociError> {
        match usize::try_from(order) {
            Ok(order) if order <= self.nocc => Ok(order),
            _ => invalid_arg!(
                "Excitation order {order} is outside [0, {}].",
                self.nocc
            ),
        }
    }

    /// Returns the number of determinants of excitation order `order`, that is,
    /// $`\binom{n_{\mathrm{occ}}}{i} \binom{n_{\mathrm{vir}}}{i}`$.
    pub fn n_excited(&self, order: i64) -> Result<u64, DociError> {
        let order = self.check_order(order)?;
        binomial(self.nocc, order)?
            .checked_mul(binomial(self.nvir(), order)?)
            .ok_or_else(|| {
                DociError::ResourceExceeded(format!(
                    "The number of order-{order} excitations overflows `u64`."
                ))
            })
    }

    /// Returns the number of determinants in the full space, $`\binom{n}{n_{\mathrm{occ}}}`$.
    pub fn n_all(&self) -> Result<u64, DociError> {
        binomial(self.nbasis, self.nocc)
    }

    /// Generates all determinants of excitation order `order`.
    pub fn excited_dets(&self, order: i64) -> Result<Vec<Determinant>, DociError> {
        let n = self.n_excited(order)?;
        self.excited_dets_in_range(order, 0..n)
    }

    /// Generates the determinants of excitation order `order` whose excitation ranks lie in
    /// `ranks`, in increasing rank.
    ///
    /// The first determinant of the range is located directly via its rank; the remaining ones are
    /// obtained by stepping the vacated and filled subsets to their lexicographic successors.
    ///
    /// # Errors
    ///
    /// [`DociError::InvalidArgument`] if `order` is invalid or `ranks` is not a sub-range of
    /// $`[0, \binom{n_{\mathrm{occ}}}{i} \binom{n_{\mathrm{vir}}}{i})`$.
    pub fn excited_dets_in_range(
        &self,
        order: i64,
        ranks: Range<u64>,
    ) -> Result<Vec<Determinant>, DociError> {
        let n = self.n_excited(order)?;
        let order = self.check_order(order)?;
        let len = checked_range_len(&ranks, n)?;
        if len == 0 {
            return Ok(Vec::new());
        }

        let nvir = self.nvir();
        let n_fill = binomial(nvir, order)?;
        let mut vacate = vec![0; order];
        let mut fill = vec![0; order];
        fill_combination(ranks.start / n_fill, self.nocc, &mut vacate)?;
        fill_combination(ranks.start % n_fill, nvir, &mut fill)?;

        let mut occs = Vec::with_capacity(self.nocc);
        let mut dets = Vec::with_capacity(len);
        for _ in ranks {
            self.fill_excited_occs(&vacate, &fill, &mut occs);
            dets.push(Determinant::from_occs(self.nbasis, &occs)?);
            if !next_combination(&mut fill, nvir) {
                fill.iter_mut().enumerate().for_each(|(j, a)| *a = j);
                next_combination(&mut vacate, self.nocc);
            }
        }
        Ok(dets)
    }

    /// Writes into `occs` the occupied orbitals of the reference determinant with the orbitals in
    /// `vacate` emptied and the virtual orbitals in `fill` (indexed from the first virtual
    /// orbital) occupied.
    fn fill_excited_occs(&self, vacate: &[usize], fill: &[usize], occs: &mut Vec<usize>) {
        occs.clear();
        let mut vacated = vacate.iter().peekable();
        for orb in 0..self.nocc {
            if vacated.peek() == Some(&&orb) {
                vacated.next();
            } else {
                occs.push(orb);
            }
        }
        occs.extend(fill.iter().map(|a| self.nocc + a));
    }

    /// Generates the determinants of the full space whose combinatorial ranks lie in `ranks`, in
    /// increasing rank.
    pub fn all_dets_in_range(&self, ranks: Range<u64>) -> Result<Vec<Determinant>, DociError> {
        let len = checked_range_len(&ranks, self.n_all()?)?;
        if len == 0 {
            return Ok(Vec::new());
        }
        let mut occs = vec![0; self.nocc];
        fill_combination(ranks.start, self.nbasis, &mut occs)?;
        let mut dets = Vec::with_capacity(len);
        for _ in ranks {
            dets.push(Determinant::from_occs(self.nbasis, &occs)?);
            next_combination(&mut occs, self.nbasis);
        }
        Ok(dets)
    }

    /// Generates all determinants of excitation order `order` by splitting the excitation-rank
    /// space into `nparts` contiguous ranges that are generated independently on the `rayon`
    /// thread pool. The partitions are concatenated in rank order, so the result is identical to
    /// that of [`Self::excited_dets`].
    pub fn par_excited_dets(
        &self,
        order: i64,
        nparts: usize,
    ) -> Result<Vec<Determinant>, DociError> {
        let n = self.n_excited(order)?;
        let parts = partition_ranks(n, nparts);
        log::debug!(
            "Generating {n} order-{order} excitations in {} partition(s).",
            parts.len()
        );
        let chunks = parts
            .into_par_iter()
            .map(|ranks| self.excited_dets_in_range(order, ranks))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(chunks.into_iter().flatten().collect())
    }

    /// Generates all determinants of the full space in rank order, partitioned as in
    /// [`Self::par_excited_dets`].
    pub fn par_all_dets(&self, nparts: usize) -> Result<Vec<Determinant>, DociError> {
        let n = self.n_all()?;
        let parts = partition_ranks(n, nparts);
        log::debug!(
            "Generating all {n} determinants in {} partition(s).",
            parts.len()
        );
        let chunks = parts
            .into_par_iter()
            .map(|ranks| self.all_dets_in_range(ranks))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(chunks.into_iter().flatten().collect())
    }
}

/// Validates that `ranks` lies within `[0, total)` and returns its length as `usize`.
fn checked_range_len(ranks: &Range<u64>, total: u64) -> Result<usize, DociError> {
    if ranks.start > ranks.end || ranks.end > total {
        invalid_arg!(
            "Rank range {}..{} is outside [0, {total}).",
            ranks.start,
            ranks.end
        );
    }
    usize::try_from(ranks.end - ranks.start).map_err(|_| {
        DociError::ResourceExceeded(format!(
            "Rank range {}..{} cannot be addressed in memory.",
            ranks.start, ranks.end
        ))
    })
}
