use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use mcvol_calc::report::report_path;
use mcvol_calc::{stamp_provenance, Model, VolumeConfig, VolumeReport};
use tracing::info;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML model describing materials and cells.
    #[arg(long)]
    pub model: PathBuf,
    /// YAML configuration listing the volume calculations.
    #[arg(long)]
    pub config: PathBuf,
    /// Output directory for `volume_N.json` reports.
    #[arg(long)]
    pub out: PathBuf,
    /// Overrides the worker count of the configuration.
    #[arg(long)]
    pub workers: Option<usize>,
    /// Overrides the batch count of the configuration.
    #[arg(long)]
    pub batches: Option<usize>,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let model = Model::load(&args.model)?;
    let mut config = VolumeConfig::load(&args.config)?;
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(batches) = args.batches {
        config.batches = batches;
    }

    let set = config.build(&model)?;
    let opts = config.dispatch_opts();
    let input_hash = config.input_hash()?;
    let outcomes = set.run_all(&model, &model, &opts)?;

    fs::create_dir_all(&args.out)?;
    for (index, (calculation, results)) in set.iter().zip(outcomes.iter()).enumerate() {
        let samples = calculation
            .n_samples()
            .saturating_mul(opts.batches as u64);
        let provenance = stamp_provenance(
            input_hash.clone(),
            calculation.seed_offset(),
            samples,
            opts.workers,
        );
        let report = VolumeReport::new(calculation, results, provenance, &model)?;
        let path = report_path(&args.out, index);
        report.write(&path)?;
        info!(path = %path.display(), domains = results.len(), "wrote volume report");
    }
    Ok(())
}
