use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use mcvol_calc::VolumeReport;
use tracing::info;

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Reports to merge, in order.
    #[arg(long = "inputs", value_name = "PATH", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,
    /// Destination of the merged report.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &MergeArgs) -> Result<(), Box<dyn Error>> {
    let mut paths = args.inputs.iter();
    let Some(first) = paths.next() else {
        return Err("provide at least one --inputs path".into());
    };
    let mut merged = VolumeReport::load(first)?;
    for path in paths {
        merged = merged.merge(&VolumeReport::load(path)?)?;
    }
    merged.write(&args.out)?;
    info!(
        inputs = args.inputs.len(),
        samples = merged.samples,
        path = %args.out.display(),
        "wrote merged report"
    );
    Ok(())
}
