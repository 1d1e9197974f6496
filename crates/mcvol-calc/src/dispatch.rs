use mcvol_core::errors::ErrorInfo;
use mcvol_core::{GeometryOracle, MaterialRegistry, VolError};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::calculation::VolumeCalculation;
use crate::determinism::{self, WorkerSlice};
use crate::result::{fold_results, DomainResult};

/// Options governing how a calculation is spread over threads and batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOpts {
    /// Number of worker threads; each batch is split across all of them.
    pub workers: usize,
    /// Number of sequential batches of `n_samples` points each.
    pub batches: usize,
}

impl Default for DispatchOpts {
    fn default() -> Self {
        Self {
            workers: 1,
            batches: 1,
        }
    }
}

impl DispatchOpts {
    /// Rejects zero workers or batches.
    pub fn validate(&self) -> Result<(), VolError> {
        if self.workers == 0 {
            return Err(VolError::config("workers-zero", "worker count must be positive"));
        }
        if self.batches == 0 {
            return Err(VolError::config("batches-zero", "batch count must be positive"));
        }
        Ok(())
    }

    /// Enumerates every worker slice of every batch, batch-major.
    pub fn plan(&self, calculation: &VolumeCalculation) -> Vec<WorkerSlice> {
        (0..self.batches)
            .flat_map(|batch| {
                let offset = determinism::batch_offset(
                    calculation.seed_offset(),
                    batch,
                    calculation.n_samples(),
                );
                determinism::worker_slices(offset, calculation.n_samples(), self.workers, batch)
            })
            .collect()
    }
}

/// Executes a calculation on a dedicated thread pool and merges the partial
/// results in plan order once every worker has finished.
pub fn execute_parallel<G, M>(
    calculation: &VolumeCalculation,
    geometry: &G,
    materials: &M,
    opts: &DispatchOpts,
) -> Result<Vec<DomainResult>, VolError>
where
    G: GeometryOracle + ?Sized,
    M: MaterialRegistry + ?Sized,
{
    opts.validate()?;
    let plan = opts.plan(calculation);
    info!(
        domain_type = %calculation.domain_type(),
        domains = calculation.domain_ids().len(),
        samples = calculation.n_samples(),
        workers = opts.workers,
        batches = opts.batches,
        "starting volume calculation"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.workers)
        .build()
        .map_err(|err| {
            VolError::Config(
                ErrorInfo::new("thread-pool", err.to_string())
                    .with_context("workers", opts.workers),
            )
        })?;

    let partials: Result<Vec<_>, VolError> = pool.install(|| {
        plan.par_iter()
            .map(|slice| {
                debug!(
                    worker = slice.worker,
                    batch = slice.batch,
                    seed_offset = slice.seed_offset,
                    samples = slice.samples,
                    "worker slice"
                );
                calculation.execute_samples(slice.seed_offset, slice.samples, geometry, materials)
            })
            .collect()
    });

    let merged = fold_results(partials?)?;
    for result in &merged {
        info!(
            domain_id = result.domain_id,
            volume = result.volume[0],
            sigma = result.volume[1],
            samples = result.num_samples,
            "domain volume"
        );
    }
    Ok(merged)
}
