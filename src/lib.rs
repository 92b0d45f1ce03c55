//! # doci: Determinant storage for doubly-occupied configuration interaction
//!
//! `doci` provides the determinant container underlying a doubly-occupied
//! configuration-interaction (DOCI) wavefunction. In the DOCI ansatz, every spatial orbital is
//! either doubly occupied or empty, so a determinant over $`n_{\mathrm{basis}}`$ orbitals with
//! $`n_{\mathrm{occ}}`$ occupied pairs is a bit vector with exactly $`n_{\mathrm{occ}}`$ bits set.
//!
//! The crate offers:
//! - checked binomial arithmetic and a bijection between combinatorial ranks and occupation
//!   patterns in lexicographic order ([`combinatorics`]),
//! - a compact, hashable determinant value type ([`determinant`]),
//! - enumeration of determinants by excitation order relative to the reference determinant, with
//!   optional partitioning of rank ranges across `rayon` threads ([`excitation`]),
//! - an append-only, duplicate-free and order-stable determinant store whose positions may be used
//!   directly as matrix indices by downstream numerical stages ([`store`]),
//! - bit-exact binary persistence of stores, YAML control files, and `log4rs`-based output
//!   logging ([`io`]), and
//! - a parameter-driven driver sequencing the construction, population and saving of a store
//!   ([`drivers`]).
//!
//! Integral evaluation, Hamiltonian assembly, eigensolving and density-matrix algebra are left to
//! collaborators, which address determinants through [`store::DeterminantStore::get`],
//! [`store::DeterminantStore::find`] and [`store::DeterminantStore::iter`].
//!
//! ## Examples and usage
//!
//! For most items (structs, enums, functions, and traits), their usages are illustrated in test
//! functions.
//!
//! ## License
//!
//! GNU Lesser General Public License v3.0.

pub mod combinatorics;
pub mod determinant;
pub mod drivers;
pub mod error;
pub mod excitation;
pub mod io;
pub mod store;

pub use determinant::Determinant;
pub use error::{DociError, DociErrorKind};
pub use store::{DeterminantStore, DeterminantStoreParams};
