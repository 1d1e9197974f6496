use mcvol_core::{GeometryOracle, MaterialRegistry, VolError};

use crate::calculation::VolumeCalculation;
use crate::dispatch::{self, DispatchOpts};
use crate::result::DomainResult;

/// Owned collection of the calculations configured for a run.
///
/// Built once at run setup and released with [`CalculationSet::into_inner`] or
/// by dropping it at teardown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculationSet {
    calculations: Vec<VolumeCalculation>,
}

impl CalculationSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a calculation, returning its position.
    pub fn push(&mut self, calculation: VolumeCalculation) -> usize {
        self.calculations.push(calculation);
        self.calculations.len() - 1
    }

    /// Number of configured calculations.
    pub fn len(&self) -> usize {
        self.calculations.len()
    }

    /// Returns true when no calculation is configured.
    pub fn is_empty(&self) -> bool {
        self.calculations.is_empty()
    }

    /// Returns the calculation at `index`.
    pub fn get(&self, index: usize) -> Option<&VolumeCalculation> {
        self.calculations.get(index)
    }

    /// Iterates over the calculations in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &VolumeCalculation> {
        self.calculations.iter()
    }

    /// Checks that every requested domain exists in the geometry.
    pub fn validate_domains<G>(&self, geometry: &G) -> Result<(), VolError>
    where
        G: GeometryOracle + ?Sized,
    {
        self.calculations
            .iter()
            .try_for_each(|calculation| calculation.validate_domains(geometry))
    }

    /// Executes every calculation in order, one result set per calculation.
    pub fn run_all<G, M>(
        &self,
        geometry: &G,
        materials: &M,
        opts: &DispatchOpts,
    ) -> Result<Vec<Vec<DomainResult>>, VolError>
    where
        G: GeometryOracle + ?Sized,
        M: MaterialRegistry + ?Sized,
    {
        self.calculations
            .iter()
            .map(|calculation| dispatch::execute_parallel(calculation, geometry, materials, opts))
            .collect()
    }

    /// Releases the calculations.
    pub fn into_inner(self) -> Vec<VolumeCalculation> {
        self.calculations
    }
}

impl FromIterator<VolumeCalculation> for CalculationSet {
    fn from_iter<T: IntoIterator<Item = VolumeCalculation>>(iter: T) -> Self {
        Self {
            calculations: iter.into_iter().collect(),
        }
    }
}
