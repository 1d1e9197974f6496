/// Slice of sample indices executed by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSlice {
    /// Worker position within its batch.
    pub worker: usize,
    /// Batch the slice belongs to.
    pub batch: usize,
    /// Seed offset of the first sample in the slice.
    pub seed_offset: u64,
    /// Number of samples in the slice.
    pub samples: u64,
}

/// Seed offset of sequential batch `batch` for a calculation drawing
/// `n_samples` points per batch.
pub fn batch_offset(seed_offset: u64, batch: usize, n_samples: u64) -> u64 {
    seed_offset.wrapping_add((batch as u64).wrapping_mul(n_samples))
}

/// Splits `n_samples` over `workers`, lowest workers taking the remainder.
///
/// Each worker receives the seed offset of its first sample, so the union of
/// all slices draws exactly the points of a single-threaded run. Workers left
/// without samples are omitted.
pub fn worker_slices(
    seed_offset: u64,
    n_samples: u64,
    workers: usize,
    batch: usize,
) -> Vec<WorkerSlice> {
    let workers = workers.max(1) as u64;
    let base = n_samples / workers;
    let remainder = n_samples % workers;
    let mut start = 0u64;
    let mut slices = Vec::new();
    for worker in 0..workers {
        let samples = base + u64::from(worker < remainder);
        if samples == 0 {
            continue;
        }
        slices.push(WorkerSlice {
            worker: worker as usize,
            batch,
            seed_offset: seed_offset.wrapping_add(start),
            samples,
        });
        start += samples;
    }
    slices
}
