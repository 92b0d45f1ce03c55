//! Doubly-occupied determinants as fixed-width occupation bit patterns.

use std::fmt;

use bitvec::prelude::*;
use itertools::Itertools;

use crate::combinatorics::combination_to_rank;
use crate::error::{invalid_arg, resource_exceeded, DociError};

#[cfg(test)]
#[path = "determinant_tests.rs"]
mod determinant_tests;

/// The number of orbitals packed into one persisted word.
pub const WORD_BITS: usize = u64::BITS as usize;

/// The largest number of words in one determinant record.
pub const MAX_NWORD: usize = 1 << 16;

/// The largest number of spatial orbitals a determinant may span.
pub const MAX_NBASIS: usize = MAX_NWORD * WORD_BITS;

/// Returns the number of 64-bit words needed to hold `nbasis` occupation bits.
pub fn nword(nbasis: usize) -> usize {
    nbasis.div_ceil(WORD_BITS)
}

/// Checks that determinants over `nbasis` orbitals fit within records of [`MAX_NWORD`] words.
///
/// # Errors
///
/// [`DociError::ResourceExceeded`] if `nbasis` exceeds [`MAX_NBASIS`].
pub fn check_nbasis(nbasis: usize) -> Result<(), DociError> {
    if nword(nbasis) > MAX_NWORD {
        resource_exceeded!(
            "{nbasis} orbitals need {} words per determinant, exceeding the limit of {MAX_NWORD}.",
            nword(nbasis)
        );
    }
    Ok(())
}

// ==================
// Struct definitions
// ==================

/// A structure to manage a doubly-occupied determinant over `nbasis` spatial orbitals.
///
/// Bit $`p`$ is set if and only if spatial orbital $`p`$ holds a pair of particles. Determinants
/// are immutable: operations that change the occupation pattern, such as [`Self::excite`], return
/// new determinants. Equality and hashing are by content.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Determinant {
    /// The occupation bits, one per spatial orbital.
    bits: BitBox<u64, Lsb0>,
}

impl Determinant {
    /// Constructs a determinant from a list of occupied orbital indices.
    ///
    /// # Arguments
    ///
    /// * `nbasis` - The number of spatial orbitals.
    /// * `occs` - The occupied orbital indices, in any order.
    ///
    /// # Errors
    ///
    /// [`DociError::InvalidArgument`] if an index is out of range or repeated, and
    /// [`DociError::ResourceExceeded`] if `nbasis` exceeds [`MAX_NBASIS`].
    pub fn from_occs(nbasis: usize, occs: &[usize]) -> Result<Self, DociError> {
        check_nbasis(nbasis)?;
        let mut bits = bitvec![u64, Lsb0; 0; nbasis];
        for &occ in occs {
            if occ >= nbasis {
                invalid_arg!("Orbital index {occ} is outside [0, {nbasis}).");
            }
            if bits.replace(occ, true) {
                invalid_arg!("Orbital index {occ} is occupied more than once in `{occs:?}`.");
            }
        }
        Ok(Self {
            bits: bits.into_boxed_bitslice(),
        })
    }

    /// Constructs a determinant from its packed words, bit $`p`$ being bit $`p \bmod 64`$ of word
    /// $`\lfloor p / 64 \rfloor`$.
    ///
    /// # Errors
    ///
    /// [`DociError::InvalidArgument`] if the number of words does not match `nbasis`, or if any
    /// bit beyond `nbasis` is set.
    pub fn from_words(nbasis: usize, words: &[u64]) -> Result<Self, DociError> {
        check_nbasis(nbasis)?;
        if words.len() != nword(nbasis) {
            invalid_arg!(
                "{} words given, but {nbasis} orbitals require {}.",
                words.len(),
                nword(nbasis)
            );
        }
        if let Some(&last) = words.last() {
            let used = nbasis - (words.len() - 1) * WORD_BITS;
            if used < WORD_BITS && last >> used != 0 {
                invalid_arg!("Occupation bits set beyond orbital {nbasis} in the last word.");
            }
        }
        let mut bits = BitVec::<u64, Lsb0>::from_vec(words.to_vec());
        bits.truncate(nbasis);
        Ok(Self {
            bits: bits.into_boxed_bitslice(),
        })
    }

    /// Returns the number of spatial orbitals spanned by this determinant.
    pub fn nbasis(&self) -> usize {
        self.bits.len()
    }

    /// Returns the number of occupied orbitals.
    pub fn popcount(&self) -> usize {
        self.bits.count_ones()
    }

    /// Returns `true` if orbital `orb` is occupied. Out-of-range orbitals are reported as empty.
    pub fn is_occupied(&self, orb: usize) -> bool {
        self.bits.get(orb).is_some_and(|bit| *bit)
    }

    /// Returns the occupied orbital indices in increasing order.
    pub fn occs(&self) -> Vec<usize> {
        self.bits.iter_ones().collect_vec()
    }

    /// Returns the unoccupied orbital indices in increasing order.
    pub fn virs(&self) -> Vec<usize> {
        self.bits.iter_zeros().collect_vec()
    }

    /// Returns the packed words of this determinant. Bits beyond [`Self::nbasis`] are zero.
    pub fn words(&self) -> Vec<u64> {
        let mut words = self.bits.as_raw_slice().to_vec();
        let used = self.nbasis() % WORD_BITS;
        if let (Some(last), true) = (words.last_mut(), used != 0) {
            *last &= (1u64 << used) - 1;
        }
        words
    }

    /// Returns the rank of this determinant among all determinants with the same number of
    /// orbitals and occupied orbitals.
    pub fn rank(&self) -> Result<u64, DociError> {
        combination_to_rank(&self.occs(), self.nbasis())
    }

    /// Returns the determinant obtained by moving the pair in orbital `occ` to orbital `vir`.
    ///
    /// # Errors
    ///
    /// [`DociError::InvalidArgument`] if `occ` is not occupied or `vir` is not empty.
    pub fn excite(&self, occ: usize, vir: usize) -> Result<Self, DociError> {
        if !self.is_occupied(occ) {
            invalid_arg!("Orbital {occ} is not occupied in {self}.");
        }
        if vir >= self.nbasis() || self.is_occupied(vir) {
            invalid_arg!("Orbital {vir} is not a virtual orbital of {self}.");
        }
        let mut bits = BitVec::<u64, Lsb0>::from_bitslice(self.bits.as_bitslice());
        bits.set(occ, false);
        bits.set(vir, true);
        Ok(Self {
            bits: bits.into_boxed_bitslice(),
        })
    }

    /// Returns the number of pairs that must be moved to turn `other` into `self`, or `None` if
    /// the two determinants do not span the same orbitals with the same number of pairs.
    pub fn excitation_level(&self, other: &Self) -> Option<usize> {
        if self.nbasis() != other.nbasis() || self.popcount() != other.popcount() {
            return None;
        }
        Some(
            self.bits
                .iter_ones()
                .filter(|&orb| !other.bits[orb])
                .count(),
        )
    }

    /// Returns every determinant that differs from this one by a single pair excitation, ordered
    /// by occupied orbital and then by virtual orbital.
    pub fn pair_excitations(&self) -> Vec<Self> {
        let virs = self.virs();
        self.bits
            .iter_ones()
            .cartesian_product(virs.iter().copied())
            .map(|(occ, vir)| {
                let mut bits = BitVec::<u64, Lsb0>::from_bitslice(self.bits.as_bitslice());
                bits.set(occ, false);
                bits.set(vir, true);
                Self {
                    bits: bits.into_boxed_bitslice(),
                }
            })
            .collect_vec()
    }
}

impl fmt::Display for Determinant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pattern = self
            .bits
            .iter()
            .map(|bit| if *bit { '2' } else { '0' })
            .collect::<String>();
        write!(f, "|{pattern}⟩")
    }
}

impl fmt::Debug for Determinant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Determinant{:?}", self.occs())
    }
}
