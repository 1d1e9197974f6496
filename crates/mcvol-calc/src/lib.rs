#![deny(missing_docs)]

//! Monte Carlo estimation of domain volumes and nuclide inventories.
//!
//! A [`VolumeCalculation`] draws points uniformly inside a bounding box, asks a
//! [`GeometryOracle`](mcvol_core::GeometryOracle) what occupies each point and
//! turns the hit counts into a [`DomainResult`] per requested domain. Partial
//! results computed with different seed offsets are merged with
//! [`DomainResult::combine`].

/// Stochastic sampler and estimator.
pub mod calculation;
/// YAML configuration schema.
pub mod config;
/// Deterministic seed offsets for batches and workers.
pub mod determinism;
/// Thread pool execution of a calculation.
pub mod dispatch;
/// Reference primitive-cell geometry and material model.
pub mod model;
/// Owned collection of the calculations of a run.
pub mod registry;
/// JSON report sink.
pub mod report;
/// Per-domain results and their combination rules.
pub mod result;
mod tally;

pub use calculation::VolumeCalculation;
pub use config::{CalculationSpec, VolumeConfig};
pub use dispatch::{execute_parallel, DispatchOpts};
pub use model::{Model, ModelSpec};
pub use registry::CalculationSet;
pub use report::{stamp_provenance, VolumeReport};
pub use result::{combine_sets, fold_results, DomainResult};
