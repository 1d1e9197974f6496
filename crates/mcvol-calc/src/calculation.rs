use std::collections::{BTreeMap, HashMap};

use mcvol_core::errors::ErrorInfo;
use mcvol_core::{
    BoundingBox, DomainId, DomainType, GeometryOracle, MaterialRegistry, NuclideIndex, Occupant,
    RngHandle, VolError,
};
use tracing::{debug, debug_span};

use crate::determinism;
use crate::result::{fold_results, DomainResult};
use crate::tally::HitTally;

/// Stochastic volume calculation over a list of domains.
///
/// Immutable once built; every execution owns its own hit tallies, so a single
/// calculation may be executed concurrently from several threads.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeCalculation {
    domain_type: DomainType,
    n_samples: u64,
    seed_offset: u64,
    bounding_box: BoundingBox,
    domain_ids: Vec<DomainId>,
}

impl VolumeCalculation {
    /// Validates the settings and builds the calculation.
    ///
    /// Rejects an empty or duplicated domain list and a zero sample count. The
    /// bounding box is validated by [`BoundingBox::new`].
    pub fn new(
        domain_type: DomainType,
        n_samples: u64,
        seed_offset: u64,
        bounding_box: BoundingBox,
        domain_ids: Vec<DomainId>,
    ) -> Result<Self, VolError> {
        if n_samples == 0 {
            return Err(VolError::Config(
                ErrorInfo::new("samples-zero", "sample count must be positive")
                    .with_context("domain_type", domain_type),
            ));
        }
        if domain_ids.is_empty() {
            return Err(VolError::Config(
                ErrorInfo::new("domains-empty", "at least one domain id is required")
                    .with_context("domain_type", domain_type),
            ));
        }
        let mut seen = HashMap::with_capacity(domain_ids.len());
        for (position, &id) in domain_ids.iter().enumerate() {
            if let Some(first) = seen.insert(id, position) {
                return Err(VolError::Config(
                    ErrorInfo::new("domain-duplicate", "domain ids must be unique")
                        .with_context("domain_id", id)
                        .with_context("first", first)
                        .with_context("second", position),
                ));
            }
        }
        Ok(Self {
            domain_type,
            n_samples,
            seed_offset,
            bounding_box,
            domain_ids,
        })
    }

    /// Kind of domain being measured.
    pub fn domain_type(&self) -> DomainType {
        self.domain_type
    }

    /// Samples drawn per execution.
    pub fn n_samples(&self) -> u64 {
        self.n_samples
    }

    /// Configured seed offset.
    pub fn seed_offset(&self) -> u64 {
        self.seed_offset
    }

    /// Sampling region.
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    /// Requested domains, in output order.
    pub fn domain_ids(&self) -> &[DomainId] {
        &self.domain_ids
    }

    /// Checks every requested domain id against the geometry.
    pub fn validate_domains<G>(&self, geometry: &G) -> Result<(), VolError>
    where
        G: GeometryOracle + ?Sized,
    {
        for &id in &self.domain_ids {
            if !geometry.contains_domain(self.domain_type, id) {
                return Err(VolError::Config(
                    ErrorInfo::new("domain-unresolved", "domain id not present in the model")
                        .with_context("domain_type", self.domain_type)
                        .with_context("domain_id", id),
                ));
            }
        }
        Ok(())
    }

    /// Runs the calculation with the configured seed offset.
    pub fn execute<G, M>(&self, geometry: &G, materials: &M) -> Result<Vec<DomainResult>, VolError>
    where
        G: GeometryOracle + ?Sized,
        M: MaterialRegistry + ?Sized,
    {
        self.execute_with_offset(self.seed_offset, geometry, materials)
    }

    /// Runs the calculation with an explicit seed offset.
    ///
    /// Distinct offsets give independent partial results that can be merged
    /// with [`DomainResult::combine`].
    pub fn execute_with_offset<G, M>(
        &self,
        seed_offset: u64,
        geometry: &G,
        materials: &M,
    ) -> Result<Vec<DomainResult>, VolError>
    where
        G: GeometryOracle + ?Sized,
        M: MaterialRegistry + ?Sized,
    {
        self.execute_samples(seed_offset, self.n_samples, geometry, materials)
    }

    /// Runs `batches` consecutive executions and folds them into one result set.
    ///
    /// Batch `b` starts at offset `seed_offset + b * n_samples`, so the batches
    /// draw the same points as one execution of `batches * n_samples` samples.
    pub fn execute_batches<G, M>(
        &self,
        batches: usize,
        geometry: &G,
        materials: &M,
    ) -> Result<Vec<DomainResult>, VolError>
    where
        G: GeometryOracle + ?Sized,
        M: MaterialRegistry + ?Sized,
    {
        if batches == 0 {
            return Err(VolError::config("batches-zero", "batch count must be positive"));
        }
        let partials = (0..batches)
            .map(|batch| {
                let offset = determinism::batch_offset(self.seed_offset, batch, self.n_samples);
                self.execute_with_offset(offset, geometry, materials)
            })
            .collect::<Result<Vec<_>, _>>()?;
        fold_results(partials)
    }

    /// Draws `n_samples` points starting at `seed_offset` and converts the hits
    /// into one result per requested domain.
    pub fn execute_samples<G, M>(
        &self,
        seed_offset: u64,
        n_samples: u64,
        geometry: &G,
        materials: &M,
    ) -> Result<Vec<DomainResult>, VolError>
    where
        G: GeometryOracle + ?Sized,
        M: MaterialRegistry + ?Sized,
    {
        if n_samples == 0 {
            return Err(VolError::Config(
                ErrorInfo::new("samples-zero", "sample count must be positive")
                    .with_context("seed_offset", seed_offset),
            ));
        }
        let span = debug_span!(
            "volume_execute",
            domain_type = %self.domain_type,
            samples = n_samples,
            seed_offset
        );
        let _guard = span.enter();

        let slots: HashMap<DomainId, usize> = self
            .domain_ids
            .iter()
            .enumerate()
            .map(|(slot, &id)| (id, slot))
            .collect();
        let mut tallies = vec![HitTally::default(); self.domain_ids.len()];
        let mut matched = Vec::new();
        let mut misses = 0u64;

        for index in 0..n_samples {
            let mut rng = RngHandle::for_sample(seed_offset, index);
            let point = self.bounding_box.sample(&mut rng);
            let Some(occupant) = geometry.locate(&point) else {
                misses += 1;
                continue;
            };
            self.matching_slots(&occupant, materials, &slots, &mut matched);
            for &slot in &matched {
                tallies[slot].record(occupant.material);
            }
        }
        debug!(misses, "sampling finished");

        self.domain_ids
            .iter()
            .zip(tallies.iter())
            .map(|(&id, tally)| self.estimate(id, tally, n_samples, materials))
            .collect()
    }

    fn matching_slots<M>(
        &self,
        occupant: &Occupant,
        materials: &M,
        slots: &HashMap<DomainId, usize>,
        matched: &mut Vec<usize>,
    ) where
        M: MaterialRegistry + ?Sized,
    {
        matched.clear();
        match self.domain_type {
            DomainType::Cell => {
                matched.extend(occupant.cells.iter().filter_map(|id| slots.get(id)));
            }
            DomainType::Universe => {
                matched.extend(occupant.universes.iter().filter_map(|id| slots.get(id)));
            }
            DomainType::Material => {
                let slot = occupant
                    .material
                    .and_then(|index| materials.material_id(index))
                    .and_then(|id| slots.get(&id));
                matched.extend(slot);
            }
        }
        matched.sort_unstable();
        matched.dedup();
    }

    fn estimate<M>(
        &self,
        domain_id: DomainId,
        tally: &HitTally,
        n_samples: u64,
        materials: &M,
    ) -> Result<DomainResult, VolError>
    where
        M: MaterialRegistry + ?Sized,
    {
        let n = n_samples as f64;
        let box_volume = self.bounding_box.volume();
        let hits = tally.total();
        let fraction = hits as f64 / n;

        let mut inventory: BTreeMap<NuclideIndex, (f64, f64)> = BTreeMap::new();
        for (material, material_hits) in tally.materials() {
            let share = material_hits as f64 / n;
            let share_variance = share * (1.0 - share) / n;
            let composition = materials.composition(material).map_err(|err| {
                VolError::Material(
                    ErrorInfo::new("composition-missing", err.to_string())
                        .with_context("domain_id", domain_id)
                        .with_context("material_index", material.as_raw()),
                )
            })?;
            for entry in composition {
                let scale = entry.density * box_volume;
                let slot = inventory.entry(entry.nuclide).or_insert((0.0, 0.0));
                slot.0 += scale * share;
                slot.1 += scale * scale * share_variance;
            }
        }

        let mut result = DomainResult {
            domain_id,
            volume: [
                box_volume * fraction,
                box_volume * (fraction * (1.0 - fraction) / n).sqrt(),
            ],
            nuclides: Vec::with_capacity(inventory.len()),
            atoms: Vec::with_capacity(inventory.len()),
            uncertainty: Vec::with_capacity(inventory.len()),
            num_samples: n_samples,
        };
        for (nuclide, (atoms, variance)) in inventory {
            result.nuclides.push(nuclide);
            result.atoms.push(atoms);
            result.uncertainty.push(variance.sqrt());
        }
        debug!(
            domain_id,
            hits,
            volume = result.volume[0],
            sigma = result.volume[1],
            nuclides = result.nuclides.len(),
            "domain estimate"
        );
        Ok(result)
    }
}
