use std::collections::{BTreeMap, BTreeSet};

use mcvol_core::errors::ErrorInfo;
use mcvol_core::{DomainId, NuclideIndex, VolError};
use serde::{Deserialize, Serialize};

/// Volume and nuclide inventory estimate for a single domain.
///
/// `nuclides`, `atoms` and `uncertainty` are positionally correlated and always
/// have the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainResult {
    /// Domain the estimate belongs to.
    pub domain_id: DomainId,
    /// Mean and standard deviation of the volume.
    pub volume: [f64; 2],
    /// Nuclides present in the domain.
    pub nuclides: Vec<NuclideIndex>,
    /// Mean number of atoms of each nuclide.
    pub atoms: Vec<f64>,
    /// Standard deviation of the number of atoms of each nuclide.
    pub uncertainty: Vec<f64>,
    /// Number of samples that produced this estimate.
    pub num_samples: u64,
}

impl DomainResult {
    /// Zero-sample result, the identity element of [`DomainResult::combine`].
    pub fn empty(domain_id: DomainId) -> Self {
        Self {
            domain_id,
            volume: [0.0, 0.0],
            nuclides: Vec::new(),
            atoms: Vec::new(),
            uncertainty: Vec::new(),
            num_samples: 0,
        }
    }

    /// Mean volume estimate.
    pub fn volume_mean(&self) -> f64 {
        self.volume[0]
    }

    /// Standard deviation of the volume estimate.
    pub fn volume_std(&self) -> f64 {
        self.volume[1]
    }

    /// Returns the `(atoms, uncertainty)` pair recorded for a nuclide.
    pub fn nuclide(&self, nuclide: NuclideIndex) -> Option<(f64, f64)> {
        self.nuclides
            .iter()
            .position(|&candidate| candidate == nuclide)
            .map(|idx| (self.atoms[idx], self.uncertainty[idx]))
    }

    /// Checks the parallel-list invariants.
    pub fn validate(&self) -> Result<(), VolError> {
        if self.atoms.len() != self.nuclides.len() || self.uncertainty.len() != self.nuclides.len()
        {
            return Err(VolError::Combine(
                ErrorInfo::new(
                    "nuclide-length-mismatch",
                    "nuclide, atom and uncertainty lists must have equal length",
                )
                .with_context("domain_id", self.domain_id)
                .with_context("nuclides", self.nuclides.len())
                .with_context("atoms", self.atoms.len())
                .with_context("uncertainty", self.uncertainty.len()),
            ));
        }
        let unique: BTreeSet<_> = self.nuclides.iter().collect();
        if unique.len() != self.nuclides.len() {
            return Err(VolError::Combine(
                ErrorInfo::new("nuclide-duplicate", "nuclide indices must be unique")
                    .with_context("domain_id", self.domain_id),
            ));
        }
        Ok(())
    }

    /// Merges two independent estimates of the same domain into a new record.
    ///
    /// Means are averaged with the sample counts as weights. Standard deviations
    /// follow `sqrt(n1*s1^2 + n2*s2^2) / (n1 + n2)`. That figure is indicative: it
    /// does not reduce to the standard error of the pooled mean. Nuclides missing
    /// from one operand count as zero atoms with zero uncertainty. A zero-sample
    /// operand leaves the other one unchanged.
    pub fn combine(&self, other: &DomainResult) -> Result<DomainResult, VolError> {
        if self.domain_id != other.domain_id {
            return Err(VolError::Combine(
                ErrorInfo::new("domain-mismatch", "cannot combine results of different domains")
                    .with_context("left", self.domain_id)
                    .with_context("right", other.domain_id),
            ));
        }
        self.validate()?;
        other.validate()?;

        if other.num_samples == 0 {
            return Ok(self.clone());
        }
        if self.num_samples == 0 {
            return Ok(other.clone());
        }

        let n1 = self.num_samples as f64;
        let n2 = other.num_samples as f64;

        let lhs = self.nuclide_map();
        let rhs = other.nuclide_map();
        let nuclides: BTreeSet<NuclideIndex> = lhs.keys().chain(rhs.keys()).copied().collect();

        let mut merged = DomainResult {
            domain_id: self.domain_id,
            volume: [
                weighted_mean(n1, self.volume[0], n2, other.volume[0]),
                propagated_std(n1, self.volume[1], n2, other.volume[1]),
            ],
            nuclides: Vec::with_capacity(nuclides.len()),
            atoms: Vec::with_capacity(nuclides.len()),
            uncertainty: Vec::with_capacity(nuclides.len()),
            num_samples: self.num_samples + other.num_samples,
        };
        for nuclide in nuclides {
            let (a1, u1) = lhs.get(&nuclide).copied().unwrap_or((0.0, 0.0));
            let (a2, u2) = rhs.get(&nuclide).copied().unwrap_or((0.0, 0.0));
            merged.nuclides.push(nuclide);
            merged.atoms.push(weighted_mean(n1, a1, n2, a2));
            merged.uncertainty.push(propagated_std(n1, u1, n2, u2));
        }
        Ok(merged)
    }

    fn nuclide_map(&self) -> BTreeMap<NuclideIndex, (f64, f64)> {
        self.nuclides
            .iter()
            .zip(self.atoms.iter().zip(self.uncertainty.iter()))
            .map(|(&nuclide, (&atoms, &sigma))| (nuclide, (atoms, sigma)))
            .collect()
    }
}

fn weighted_mean(n1: f64, x1: f64, n2: f64, x2: f64) -> f64 {
    (n1 * x1 + n2 * x2) / (n1 + n2)
}

fn propagated_std(n1: f64, s1: f64, n2: f64, s2: f64) -> f64 {
    (n1 * s1 * s1 + n2 * s2 * s2).sqrt() / (n1 + n2)
}

/// Combines two result sets domain by domain.
///
/// Both sets must list the same domains in the same order.
pub fn combine_sets(
    left: &[DomainResult],
    right: &[DomainResult],
) -> Result<Vec<DomainResult>, VolError> {
    if left.len() != right.len() {
        return Err(VolError::Combine(
            ErrorInfo::new("set-length-mismatch", "result sets cover different domain counts")
                .with_context("left", left.len())
                .with_context("right", right.len()),
        ));
    }
    left.iter()
        .zip(right.iter())
        .map(|(lhs, rhs)| lhs.combine(rhs))
        .collect()
}

/// Folds any number of result sets into one, left to right.
pub fn fold_results<I>(sets: I) -> Result<Vec<DomainResult>, VolError>
where
    I: IntoIterator<Item = Vec<DomainResult>>,
{
    let mut iter = sets.into_iter();
    let Some(mut acc) = iter.next() else {
        return Ok(Vec::new());
    };
    for set in iter {
        acc = combine_sets(&acc, &set)?;
    }
    Ok(acc)
}
