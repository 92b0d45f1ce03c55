//! Drivers to sequence the construction, population and persistence of determinant stores.
//!
//! A driver borrows a parameter structure, builds a [`crate::store::DeterminantStore`] from it,
//! populates the store in the requested steps and keeps the outcome for later retrieval through
//! [`DociDriver::result`].

use anyhow;

pub mod enumeration;

// =================
// Trait definitions
// =================

/// Trait defining behaviours of `doci` drivers, each of which turns its parameter structure into
/// a populated determinant store.
pub trait DociDriver {
    /// The type of the parameter structure controlling the driver.
    type Params;

    /// The type of the successful outcome when executing the driver.
    type Outcome;

    /// Executes the driver and stores the result internally.
    fn run(&mut self) -> Result<(), anyhow::Error>;

    /// Returns the result of the driver execution.
    fn result(&self) -> Result<&Self::Outcome, anyhow::Error>;
}
