use std::collections::BTreeMap;

use mcvol_core::MaterialIndex;

/// Hit counts for one domain, keyed by the occupying material.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct HitTally {
    void_hits: u64,
    materials: BTreeMap<MaterialIndex, u64>,
}

impl HitTally {
    pub(crate) fn record(&mut self, material: Option<MaterialIndex>) {
        match material {
            Some(index) => *self.materials.entry(index).or_insert(0) += 1,
            None => self.void_hits += 1,
        }
    }

    /// Hits landing in the domain, void included.
    pub(crate) fn total(&self) -> u64 {
        self.void_hits + self.materials.values().sum::<u64>()
    }

    pub(crate) fn materials(&self) -> impl Iterator<Item = (MaterialIndex, u64)> + '_ {
        self.materials.iter().map(|(&index, &hits)| (index, hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_hit_registers_material_and_repeats_increment() {
        let mut tally = HitTally::default();
        let fuel = MaterialIndex::from_raw(3);
        tally.record(Some(fuel));
        tally.record(Some(fuel));
        tally.record(Some(MaterialIndex::from_raw(1)));
        tally.record(None);

        let counts: Vec<_> = tally.materials().collect();
        assert_eq!(counts, vec![(MaterialIndex::from_raw(1), 1), (fuel, 2)]);
        assert_eq!(tally.total(), 4);
    }
}
