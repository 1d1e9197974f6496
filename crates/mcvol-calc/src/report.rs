use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use mcvol_core::errors::ErrorInfo;
use mcvol_core::provenance::{RunProvenance, SampleRange, SchemaVersion};
use mcvol_core::{DomainId, DomainType, MaterialRegistry, NuclideIndex, Position, VolError};
use serde::{Deserialize, Serialize};

use crate::calculation::VolumeCalculation;
use crate::result::{combine_sets, DomainResult};

/// Schema version written into every report.
pub const REPORT_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Serialized outcome of one volume calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeReport {
    /// Schema of this payload.
    pub schema_version: SchemaVersion,
    /// How and when the data was produced.
    pub provenance: RunProvenance,
    /// Kind of domain measured.
    pub domain_type: DomainType,
    /// Total samples behind each domain estimate.
    pub samples: u64,
    /// Lower-left corner of the sampling box.
    pub lower_left: Position,
    /// Upper-right corner of the sampling box.
    pub upper_right: Position,
    /// One entry per requested domain, in request order.
    pub domains: Vec<DomainReport>,
}

/// Estimate for one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainReport {
    /// Domain id.
    pub domain_id: DomainId,
    /// Volume mean and standard deviation.
    pub volume: [f64; 2],
    /// Samples behind the estimate.
    pub num_samples: u64,
    /// Nuclide inventory.
    pub nuclides: Vec<NuclideEntry>,
}

/// Atom count estimate for one nuclide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NuclideEntry {
    /// Registry index of the nuclide.
    pub index: NuclideIndex,
    /// Display name of the nuclide.
    pub name: String,
    /// Mean number of atoms.
    pub atoms: f64,
    /// Standard deviation of the number of atoms.
    pub uncertainty: f64,
}

impl DomainReport {
    fn from_result<M>(result: &DomainResult, materials: &M) -> Self
    where
        M: MaterialRegistry + ?Sized,
    {
        let nuclides = result
            .nuclides
            .iter()
            .zip(result.atoms.iter().zip(result.uncertainty.iter()))
            .map(|(&index, (&atoms, &uncertainty))| NuclideEntry {
                index,
                name: materials
                    .nuclide_name(index)
                    .map(str::to_owned)
                    .unwrap_or_else(|| format!("nuclide-{}", index.as_raw())),
                atoms,
                uncertainty,
            })
            .collect();
        Self {
            domain_id: result.domain_id,
            volume: result.volume,
            num_samples: result.num_samples,
            nuclides,
        }
    }

    /// Converts the entry back into a combinable result.
    pub fn to_result(&self) -> DomainResult {
        DomainResult {
            domain_id: self.domain_id,
            volume: self.volume,
            nuclides: self.nuclides.iter().map(|entry| entry.index).collect(),
            atoms: self.nuclides.iter().map(|entry| entry.atoms).collect(),
            uncertainty: self.nuclides.iter().map(|entry| entry.uncertainty).collect(),
            num_samples: self.num_samples,
        }
    }
}

impl VolumeReport {
    /// Builds a report from the results of `calculation`.
    pub fn new<M>(
        calculation: &VolumeCalculation,
        results: &[DomainResult],
        provenance: RunProvenance,
        materials: &M,
    ) -> Result<Self, VolError>
    where
        M: MaterialRegistry + ?Sized,
    {
        let ids: Vec<DomainId> = results.iter().map(|result| result.domain_id).collect();
        if ids != calculation.domain_ids() {
            return Err(VolError::Serde(
                ErrorInfo::new("report-domains", "results do not match the requested domains")
                    .with_context("expected", format!("{:?}", calculation.domain_ids()))
                    .with_context("found", format!("{ids:?}")),
            ));
        }
        Ok(Self {
            schema_version: REPORT_SCHEMA,
            provenance,
            domain_type: calculation.domain_type(),
            samples: results.first().map_or(0, |result| result.num_samples),
            lower_left: calculation.bounding_box().lower_left(),
            upper_right: calculation.bounding_box().upper_right(),
            domains: results
                .iter()
                .map(|result| DomainReport::from_result(result, materials))
                .collect(),
        })
    }

    /// Converts every domain entry back into a combinable result.
    pub fn results(&self) -> Vec<DomainResult> {
        self.domains.iter().map(DomainReport::to_result).collect()
    }

    /// Merges two reports of the same calculation run with independent seeds.
    ///
    /// Domain type, bounding box and domain order must agree, and the sample
    /// ranges of the two reports must be disjoint. The provenance of `self` is
    /// kept, extended with the sample ranges of `other`.
    pub fn merge(&self, other: &VolumeReport) -> Result<VolumeReport, VolError> {
        if !self.schema_version.reads(&other.schema_version)
            || self.domain_type != other.domain_type
            || self.lower_left != other.lower_left
            || self.upper_right != other.upper_right
        {
            return Err(VolError::Combine(
                ErrorInfo::new("report-mismatch", "reports describe different calculations")
                    .with_context("left_domain_type", self.domain_type)
                    .with_context("right_domain_type", other.domain_type),
            ));
        }
        let shared = self.provenance.sample_ranges.iter().find_map(|left| {
            other
                .provenance
                .sample_ranges
                .iter()
                .find(|right| left.overlaps(right))
                .map(|right| (left, right))
        });
        if let Some((left, right)) = shared {
            return Err(VolError::Combine(
                ErrorInfo::new("report-overlap", "reports share sample streams")
                    .with_context("left", left)
                    .with_context("right", right)
                    .with_hint("rerun one calculation past the other's sample range"),
            ));
        }
        let merged = combine_sets(&self.results(), &other.results())?;

        let mut names: BTreeMap<NuclideIndex, String> = BTreeMap::new();
        let entries = self
            .domains
            .iter()
            .chain(other.domains.iter())
            .flat_map(|domain| domain.nuclides.iter());
        for entry in entries {
            names.entry(entry.index).or_insert_with(|| entry.name.clone());
        }

        let domains = merged
            .iter()
            .map(|result| {
                let mut report = DomainReport {
                    domain_id: result.domain_id,
                    volume: result.volume,
                    num_samples: result.num_samples,
                    nuclides: Vec::with_capacity(result.nuclides.len()),
                };
                for (idx, &index) in result.nuclides.iter().enumerate() {
                    report.nuclides.push(NuclideEntry {
                        index,
                        name: names.get(&index).cloned().unwrap_or_default(),
                        atoms: result.atoms[idx],
                        uncertainty: result.uncertainty[idx],
                    });
                }
                report
            })
            .collect();

        let mut provenance = self.provenance.clone();
        provenance
            .sample_ranges
            .extend(other.provenance.sample_ranges.iter().copied());
        provenance.sample_ranges.sort_unstable();
        Ok(VolumeReport {
            schema_version: self.schema_version.max(other.schema_version),
            provenance,
            domain_type: self.domain_type,
            samples: merged.first().map_or(0, |result| result.num_samples),
            lower_left: self.lower_left,
            upper_right: self.upper_right,
            domains,
        })
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> Result<(), VolError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| VolError::io("report-mkdir", err, parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|err| VolError::io("report-serialize", err, path.display()))?;
        fs::write(path, json).map_err(|err| VolError::io("report-write", err, path.display()))
    }

    /// Loads a report from disk, rejecting other major schema versions.
    pub fn load(path: &Path) -> Result<Self, VolError> {
        let contents = fs::read_to_string(path)
            .map_err(|err| VolError::io("report-read", err, path.display()))?;
        let report: VolumeReport = serde_json::from_str(&contents)
            .map_err(|err| VolError::io("report-parse", err, path.display()))?;
        if !REPORT_SCHEMA.reads(&report.schema_version) {
            return Err(VolError::Serde(
                ErrorInfo::new("report-schema", "unsupported report schema version")
                    .with_context("path", path.display())
                    .with_context("found", report.schema_version)
                    .with_context("supported", REPORT_SCHEMA),
            ));
        }
        Ok(report)
    }
}

/// Builds the provenance block for a freshly computed report of `samples`
/// points drawn from `seed_offset` onwards.
pub fn stamp_provenance(
    input_hash: String,
    seed_offset: u64,
    samples: u64,
    workers: usize,
) -> RunProvenance {
    RunProvenance {
        input_hash,
        seed_offset,
        workers,
        sample_ranges: vec![SampleRange::new(seed_offset, samples)],
        created_at: chrono::Utc::now().to_rfc3339(),
        tool_versions: [(
            env!("CARGO_PKG_NAME").to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        )]
        .into_iter()
        .collect(),
    }
}

/// Report path of the calculation at position `index` (1-based file names).
pub fn report_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("volume_{}.json", index + 1))
}
