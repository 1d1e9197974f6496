#![allow(dead_code)]

use mcvol_calc::{Model, VolumeCalculation};
use mcvol_core::{
    BoundingBox, DomainId, DomainType, GeometryOracle, MaterialIndex, MaterialRegistry,
    NuclideDensity, NuclideIndex, Occupant, Position, VolError,
};

/// Registry holding a single material (id 7) made of two nuclides.
pub struct SingleMaterial {
    composition: Vec<NuclideDensity>,
}

impl SingleMaterial {
    pub fn new() -> Self {
        Self {
            composition: vec![
                NuclideDensity {
                    nuclide: NuclideIndex::from_raw(0),
                    density: 0.5,
                },
                NuclideDensity {
                    nuclide: NuclideIndex::from_raw(1),
                    density: 2.0,
                },
            ],
        }
    }
}

impl MaterialRegistry for SingleMaterial {
    fn material_id(&self, index: MaterialIndex) -> Option<DomainId> {
        (index.as_raw() == 0).then_some(7)
    }

    fn composition(&self, index: MaterialIndex) -> Result<&[NuclideDensity], VolError> {
        if index.as_raw() == 0 {
            Ok(&self.composition)
        } else {
            Err(VolError::config("material-unknown", "no such material"))
        }
    }

    fn nuclide_name(&self, index: NuclideIndex) -> Option<&str> {
        ["H1", "O16"].get(index.as_raw()).copied()
    }
}

/// Every point belongs to cell 1 in universe 0, filled with material 7.
pub struct Everywhere;

impl GeometryOracle for Everywhere {
    fn locate(&self, _point: &Position) -> Option<Occupant> {
        Some(Occupant {
            cells: vec![1],
            universes: vec![0],
            material: Some(MaterialIndex::from_raw(0)),
        })
    }

    fn contains_domain(&self, _domain_type: DomainType, _id: DomainId) -> bool {
        true
    }
}

/// No point belongs to any cell.
pub struct Nowhere;

impl GeometryOracle for Nowhere {
    fn locate(&self, _point: &Position) -> Option<Occupant> {
        None
    }

    fn contains_domain(&self, _domain_type: DomainType, _id: DomainId) -> bool {
        true
    }
}

pub const SPHERE_VOLUME: f64 = 4.0 / 3.0 * std::f64::consts::PI;

/// Unit sphere (cell 10, fuel) inside the [-1, 1]^3 box (cell 20, water).
pub const SPHERE_IN_BOX: &str = r#"
materials:
  - id: 1
    name: fuel
    nuclides:
      U235: 0.01
      U238: 0.2
  - id: 2
    name: water
    nuclides:
      H1: 0.06
      O16: 0.03
cells:
  - id: 10
    material: 1
    region:
      type: sphere
      center: [0.0, 0.0, 0.0]
      radius: 1.0
  - id: 20
    material: 2
    region:
      type: box
      lower_left: [-1.0, -1.0, -1.0]
      upper_right: [1.0, 1.0, 1.0]
"#;

pub fn sphere_in_box() -> Model {
    Model::from_yaml_str(SPHERE_IN_BOX).unwrap()
}

pub fn unit_cube() -> BoundingBox {
    BoundingBox::new(Position::new(0.0, 0.0, 0.0), Position::new(1.0, 1.0, 1.0)).unwrap()
}

pub fn cube_around_sphere() -> BoundingBox {
    BoundingBox::new(Position::new(-1.0, -1.0, -1.0), Position::new(1.0, 1.0, 1.0)).unwrap()
}

pub fn cell_calculation(ids: Vec<DomainId>, samples: u64, seed_offset: u64) -> VolumeCalculation {
    VolumeCalculation::new(
        DomainType::Cell,
        samples,
        seed_offset,
        cube_around_sphere(),
        ids,
    )
    .unwrap()
}
