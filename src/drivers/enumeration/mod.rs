//! Driver for the construction and population of a determinant store.

use std::fmt;
use std::path::PathBuf;

use anyhow::{self, format_err, Context};
use derive_builder::Builder;
use itertools::Itertools;
use log;
use serde::{Deserialize, Serialize};

use crate::drivers::DociDriver;
use crate::error::DociErrorKind;
use crate::io::format::{
    doci_error, doci_output, doci_warn, log_subtitle, log_title, nice_bool, write_subtitle,
    DociOutput,
};
use crate::io::DociFileType;
use crate::store::{DeterminantStore, DeterminantStoreParams};

#[cfg(test)]
#[path = "enumeration_tests.rs"]
mod enumeration_tests;

// ==================
// Struct definitions
// ==================

// ----------
// Parameters
// ----------

/// A structure containing control parameters for determinant enumeration.
#[derive(Clone, Builder, Debug, PartialEq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct DeterminantEnumerationParams {
    /// The number of spatial orbitals.
    pub nbasis: usize,

    /// The number of occupied spatial orbitals.
    pub nocc: usize,

    /// The excitation orders, relative to the reference determinant, whose determinants are to be
    /// added, in the order given. If `None`, the full determinant space is added.
    #[builder(default = "None")]
    #[serde(default)]
    pub excitation_orders: Option<Vec<i64>>,

    /// The number of determinants for which storage is to be reserved before population.
    #[builder(default = "None")]
    #[serde(default)]
    pub reserve: Option<usize>,

    /// Control parameters for the determinant store.
    #[builder(default)]
    #[serde(default)]
    pub store_params: DeterminantStoreParams,

    /// Optional name for saving the populated store as a binary file of type
    /// [`DociFileType::Wfn`]. If `None`, the store will not be saved.
    #[builder(default = "None")]
    #[serde(default)]
    pub result_save_name: Option<PathBuf>,
}

impl DeterminantEnumerationParamsBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(Some(orders)) = self.excitation_orders.as_ref() {
            if orders.is_empty() {
                return Err("At least one excitation order must be given.".to_string());
            }
        }
        Ok(())
    }
}

impl DeterminantEnumerationParams {
    /// Returns a builder to construct a [`DeterminantEnumerationParams`] structure.
    pub fn builder() -> DeterminantEnumerationParamsBuilder {
        DeterminantEnumerationParamsBuilder::default()
    }
}

impl fmt::Display for DeterminantEnumerationParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of spatial orbitals: {}", self.nbasis)?;
        writeln!(f, "Number of occupied orbitals: {}", self.nocc)?;
        writeln!(
            f,
            "Determinants to add: {}",
            self.excitation_orders
                .as_ref()
                .map(|orders| format!(
                    "excitation orders {}",
                    orders.iter().map(|order| order.to_string()).join(", ")
                ))
                .unwrap_or_else(|| "full space".to_string())
        )?;
        writeln!(
            f,
            "Reserved storage: {}",
            self.reserve
                .map(|n| format!("{n} determinants"))
                .unwrap_or_else(|| nice_bool(false))
        )?;
        write!(f, "{}", self.store_params)?;
        writeln!(
            f,
            "Save populated store to file: {}",
            if let Some(name) = self.result_save_name.as_ref() {
                DociFileType::Wfn.path_for(name).display().to_string()
            } else {
                nice_bool(false)
            }
        )?;
        writeln!(f)?;
        Ok(())
    }
}

// ------
// Result
// ------

/// A structure to contain determinant enumeration results.
#[derive(Clone, Builder, Debug)]
pub struct DeterminantEnumerationResult {
    /// The control parameters used to obtain this set of results.
    pub parameters: DeterminantEnumerationParams,

    /// The populated determinant store.
    pub store: DeterminantStore,

    /// The number of determinants appended by each population step. A step is labelled by its
    /// excitation order, or by `None` for the full space.
    pub additions: Vec<(Option<i64>, usize)>,

    /// The path to which the store has been saved, if any.
    #[builder(default = "None")]
    pub saved_path: Option<PathBuf>,
}

impl DeterminantEnumerationResult {
    /// Returns a builder to construct a [`DeterminantEnumerationResult`] structure.
    fn builder() -> DeterminantEnumerationResultBuilder {
        DeterminantEnumerationResultBuilder::default()
    }

    /// Consumes the result and returns the populated store.
    pub fn into_store(self) -> DeterminantStore {
        self.store
    }
}

impl fmt::Display for DeterminantEnumerationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = 12;
        write_subtitle(f, "Population summary")?;
        writeln!(f)?;
        writeln!(f, "{}", "┈".repeat(label_width + 16))?;
        writeln!(f, "{:>label_width$} {:>15}", "Step", "Added")?;
        writeln!(f, "{}", "┈".repeat(label_width + 16))?;
        for (order, added) in self.additions.iter() {
            let label = order
                .map(|order| format!("order {order}"))
                .unwrap_or_else(|| "full space".to_string());
            writeln!(f, "{label:>label_width$} {added:>15}")?;
        }
        writeln!(f, "{}", "┈".repeat(label_width + 16))?;
        writeln!(f)?;
        write!(f, "{}", self.store)?;
        Ok(())
    }
}

// ------
// Driver
// ------

/// A driver for determinant enumeration.
#[derive(Clone, Builder)]
pub struct DeterminantEnumerationDriver<'a> {
    /// The control parameters for determinant enumeration.
    parameters: &'a DeterminantEnumerationParams,

    /// The result of the determinant enumeration.
    #[builder(setter(skip), default = "None")]
    result: Option<DeterminantEnumerationResult>,
}

impl<'a> DeterminantEnumerationDriver<'a> {
    /// Returns a builder to construct a [`DeterminantEnumerationDriver`] structure.
    pub fn builder() -> DeterminantEnumerationDriverBuilder<'a> {
        DeterminantEnumerationDriverBuilder::default()
    }

    /// Executes determinant enumeration.
    fn enumerate_determinants(&mut self) -> Result<(), anyhow::Error> {
        log_title("Determinant Enumeration");
        doci_output!("");
        let params = self.parameters;
        params.log_output_display();

        let mut store =
            DeterminantStore::with_params(params.nbasis, params.nocc, params.store_params.clone())
                .with_context(|| {
                    format!(
                        "Unable to create a store for {} pairs in {} orbitals",
                        params.nocc, params.nbasis
                    )
                })?;
        if let Some(n) = params.reserve {
            if n as u64 > store.ndet_max() {
                doci_warn!(
                    "Requested reservation of {n} determinants exceeds the full space of {}; \
                    reserving {} instead.",
                    store.ndet_max(),
                    store.ndet_max()
                );
            }
            store
                .reserve(n)
                .with_context(|| format!("Unable to reserve room for {n} determinants"))?;
        }

        log_subtitle("Population");
        doci_output!("");
        let steps = params
            .excitation_orders
            .as_ref()
            .map(|orders| orders.iter().copied().map(Some).collect_vec())
            .unwrap_or_else(|| vec![None]);
        let additions = steps
            .into_iter()
            .map(|step| {
                let added = match step {
                    Some(order) => store.add_excited_dets(order),
                    None => store.add_all_dets(),
                }
                .map_err(|err| {
                    if err.kind() == DociErrorKind::ResourceExceeded {
                        doci_error!("{err}");
                    }
                    err
                })
                .with_context(|| match step {
                    Some(order) => format!("Unable to add order-{order} excited determinants"),
                    None => "Unable to add the full determinant space".to_string(),
                })?;
                log::debug!("Population step {step:?} appended {added} determinants.");
                Ok((step, added))
            })
            .collect::<Result<Vec<_>, anyhow::Error>>()?;

        let saved_path = params
            .result_save_name
            .as_ref()
            .map(|name| {
                let path = DociFileType::Wfn.path_for(name);
                store
                    .to_file(&path)
                    .with_context(|| format!("Unable to save the store to `{}`", path.display()))?;
                Ok::<_, anyhow::Error>(path)
            })
            .transpose()?;

        let result = DeterminantEnumerationResult::builder()
            .parameters(params.clone())
            .store(store)
            .additions(additions)
            .saved_path(saved_path)
            .build()
            .map_err(|err| format_err!(err))?;
        result.log_output_display();
        doci_output!("");
        if let Some(path) = result.saved_path.as_ref() {
            doci_output!("Determinant store saved as {}.", path.display());
            doci_output!("");
        }

        self.result = Some(result);
        Ok(())
    }
}

impl<'a> DociDriver for DeterminantEnumerationDriver<'a> {
    type Params = DeterminantEnumerationParams;

    type Outcome = DeterminantEnumerationResult;

    fn result(&self) -> Result<&Self::Outcome, anyhow::Error> {
        self.result
            .as_ref()
            .ok_or_else(|| format_err!("No determinant enumeration results found."))
    }

    fn run(&mut self) -> Result<(), anyhow::Error> {
        self.enumerate_determinants()
    }
}
