use std::fs;
use std::path::Path;

use mcvol_core::errors::ErrorInfo;
use mcvol_core::{BoundingBox, DomainId, DomainType, GeometryOracle, Position, VolError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::calculation::VolumeCalculation;
use crate::dispatch::DispatchOpts;
use crate::registry::CalculationSet;

/// YAML descriptor listing the volume calculations of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeConfig {
    /// Calculations executed in order.
    pub calculations: Vec<CalculationSpec>,
    /// Worker threads per calculation.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Sequential batches per calculation.
    #[serde(default = "default_batches")]
    pub batches: usize,
}

fn default_workers() -> usize {
    1
}

fn default_batches() -> usize {
    1
}

/// Settings of a single volume calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationSpec {
    /// Kind of domain being measured.
    pub domain_type: DomainType,
    /// Ids of the domains to measure, in output order.
    pub domain_ids: Vec<DomainId>,
    /// Points drawn per batch.
    pub samples: u64,
    /// Offset of the first sampling stream.
    #[serde(default)]
    pub seed_offset: u64,
    /// Lower-left corner of the sampling box.
    pub lower_left: Position,
    /// Upper-right corner of the sampling box.
    pub upper_right: Position,
}

impl CalculationSpec {
    /// Validates the settings and builds the calculation.
    pub fn build(&self) -> Result<VolumeCalculation, VolError> {
        let bounding_box = BoundingBox::new(self.lower_left, self.upper_right)?;
        VolumeCalculation::new(
            self.domain_type,
            self.samples,
            self.seed_offset,
            bounding_box,
            self.domain_ids.clone(),
        )
    }
}

impl VolumeConfig {
    /// Parses a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, VolError> {
        serde_yaml::from_str(text)
            .map_err(|err| VolError::Serde(ErrorInfo::new("config-parse", err.to_string())))
    }

    /// Loads a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, VolError> {
        let text = fs::read_to_string(path)
            .map_err(|err| VolError::io("config-read", err, path.display()))?;
        Self::from_yaml_str(&text).map_err(|err| match err {
            VolError::Serde(info) => {
                VolError::Serde(info.with_context("path", path.display()))
            }
            other => other,
        })
    }

    /// Dispatch options requested by the configuration.
    pub fn dispatch_opts(&self) -> DispatchOpts {
        DispatchOpts {
            workers: self.workers,
            batches: self.batches,
        }
    }

    /// Validates every calculation against the geometry and builds the set.
    ///
    /// Nothing is sampled when any calculation is rejected.
    pub fn build<G>(&self, geometry: &G) -> Result<CalculationSet, VolError>
    where
        G: GeometryOracle + ?Sized,
    {
        if self.calculations.is_empty() {
            return Err(VolError::config(
                "calculations-empty",
                "configuration lists no volume calculations",
            ));
        }
        self.dispatch_opts().validate()?;
        let set = self
            .calculations
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                spec.build().map_err(|err| tag_calculation(err, index))
            })
            .collect::<Result<CalculationSet, _>>()?;
        set.validate_domains(geometry)?;
        Ok(set)
    }

    /// SHA-256 over the canonical JSON form of the configuration.
    pub fn input_hash(&self) -> Result<String, VolError> {
        let bytes = serde_json::to_vec(self)
            .map_err(|err| VolError::Serde(ErrorInfo::new("config-hash", err.to_string())))?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

fn tag_calculation(err: VolError, index: usize) -> VolError {
    match err {
        VolError::Config(info) => VolError::Config(info.with_context("calculation", index)),
        other => other,
    }
}
