//! Reference geometry and material model built from primitive cells.
//!
//! Cells are tested in the order they are listed and the first one whose region
//! contains the point claims it. Every cell belongs to a single universe, so a
//! located point reports a one-level cell and universe path.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use mcvol_core::errors::ErrorInfo;
use mcvol_core::{
    BoundingBox, DomainId, DomainType, GeometryOracle, MaterialIndex, MaterialRegistry,
    NuclideDensity, NuclideIndex, Occupant, Position, VolError,
};
use serde::{Deserialize, Serialize};

/// Serialized description of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Materials available to cells.
    #[serde(default)]
    pub materials: Vec<MaterialSpec>,
    /// Cells in lookup order.
    pub cells: Vec<CellSpec>,
}

/// Material composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSpec {
    /// User facing material id.
    pub id: DomainId,
    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Nuclide name to atom density (atoms per unit volume).
    pub nuclides: BTreeMap<String, f64>,
}

/// Cell filled with a material, or void.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSpec {
    /// User facing cell id.
    pub id: DomainId,
    /// Universe the cell belongs to.
    #[serde(default)]
    pub universe: DomainId,
    /// Filling material id; absent for void.
    #[serde(default)]
    pub material: Option<DomainId>,
    /// Region occupied by the cell.
    pub region: Region,
}

/// Primitive region shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Region {
    /// Axis-aligned box.
    Box {
        /// Lower-left corner.
        lower_left: Position,
        /// Upper-right corner.
        upper_right: Position,
    },
    /// Sphere.
    Sphere {
        /// Center point.
        center: Position,
        /// Radius.
        radius: f64,
    },
}

#[derive(Debug, Clone)]
enum Shape {
    Box(BoundingBox),
    Sphere { center: Position, radius_sq: f64 },
}

impl Shape {
    fn contains(&self, point: &Position) -> bool {
        match self {
            Shape::Box(bbox) => bbox.contains(point),
            Shape::Sphere { center, radius_sq } => center.distance_squared(point) <= *radius_sq,
        }
    }
}

#[derive(Debug, Clone)]
struct Cell {
    id: DomainId,
    universe: DomainId,
    material: Option<MaterialIndex>,
    shape: Shape,
}

#[derive(Debug, Clone)]
struct Material {
    id: DomainId,
    composition: Vec<NuclideDensity>,
}

/// Geometry oracle and material registry backed by a [`ModelSpec`].
#[derive(Debug, Clone)]
pub struct Model {
    cells: Vec<Cell>,
    materials: Vec<Material>,
    nuclide_names: Vec<String>,
    cell_ids: BTreeSet<DomainId>,
    universe_ids: BTreeSet<DomainId>,
    material_slots: HashMap<DomainId, MaterialIndex>,
}

impl Model {
    /// Validates the description and builds the model.
    ///
    /// Nuclides are indexed in lexicographic order of their names.
    pub fn from_spec(spec: &ModelSpec) -> Result<Self, VolError> {
        let nuclide_names: Vec<String> = spec
            .materials
            .iter()
            .flat_map(|material| material.nuclides.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let nuclide_slots: HashMap<&str, NuclideIndex> = nuclide_names
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), NuclideIndex::from_raw(idx)))
            .collect();

        let mut material_slots = HashMap::new();
        let mut materials = Vec::with_capacity(spec.materials.len());
        for (idx, material) in spec.materials.iter().enumerate() {
            if material_slots
                .insert(material.id, MaterialIndex::from_raw(idx))
                .is_some()
            {
                return Err(VolError::Material(
                    ErrorInfo::new("material-duplicate", "material ids must be unique")
                        .with_context("material_id", material.id),
                ));
            }
            let mut composition = Vec::with_capacity(material.nuclides.len());
            for (name, &density) in &material.nuclides {
                if !density.is_finite() || density < 0.0 {
                    return Err(VolError::Material(
                        ErrorInfo::new(
                            "density-invalid",
                            "atom densities must be finite and non-negative",
                        )
                        .with_context("material_id", material.id)
                        .with_context("nuclide", name)
                        .with_context("density", density),
                    ));
                }
                composition.push(NuclideDensity {
                    nuclide: nuclide_slots[name.as_str()],
                    density,
                });
            }
            materials.push(Material {
                id: material.id,
                composition,
            });
        }

        let mut cell_ids = BTreeSet::new();
        let mut universe_ids = BTreeSet::new();
        let mut cells = Vec::with_capacity(spec.cells.len());
        for cell in &spec.cells {
            if !cell_ids.insert(cell.id) {
                return Err(VolError::Geometry(
                    ErrorInfo::new("cell-duplicate", "cell ids must be unique")
                        .with_context("cell_id", cell.id),
                ));
            }
            universe_ids.insert(cell.universe);
            let material = match cell.material {
                Some(id) => Some(*material_slots.get(&id).ok_or_else(|| {
                    VolError::Geometry(
                        ErrorInfo::new(
                            "cell-material-unknown",
                            "cell references an unknown material",
                        )
                        .with_context("cell_id", cell.id)
                        .with_context("material_id", id),
                    )
                })?),
                None => None,
            };
            cells.push(Cell {
                id: cell.id,
                universe: cell.universe,
                material,
                shape: build_shape(cell)?,
            });
        }

        Ok(Self {
            cells,
            materials,
            nuclide_names,
            cell_ids,
            universe_ids,
            material_slots,
        })
    }

    /// Parses a model from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, VolError> {
        let spec: ModelSpec = serde_yaml::from_str(text)
            .map_err(|err| VolError::Serde(ErrorInfo::new("model-parse", err.to_string())))?;
        Self::from_spec(&spec)
    }

    /// Loads a model from a YAML file.
    pub fn load(path: &Path) -> Result<Self, VolError> {
        let text = fs::read_to_string(path)
            .map_err(|err| VolError::io("model-read", err, path.display()))?;
        Self::from_yaml_str(&text)
    }

    /// Index of the material with the given id.
    pub fn material_index(&self, id: DomainId) -> Option<MaterialIndex> {
        self.material_slots.get(&id).copied()
    }

    /// Index of the nuclide with the given name.
    pub fn nuclide_index(&self, name: &str) -> Option<NuclideIndex> {
        self.nuclide_names
            .binary_search_by(|candidate| candidate.as_str().cmp(name))
            .ok()
            .map(NuclideIndex::from_raw)
    }
}

fn build_shape(cell: &CellSpec) -> Result<Shape, VolError> {
    let invalid = |err: VolError| {
        VolError::Geometry(
            ErrorInfo::new("cell-region-invalid", err.info().message.clone())
                .with_context("cell_id", cell.id),
        )
    };
    match &cell.region {
        Region::Box {
            lower_left,
            upper_right,
        } => Ok(Shape::Box(
            BoundingBox::new(*lower_left, *upper_right).map_err(invalid)?,
        )),
        Region::Sphere { center, radius } => {
            if !radius.is_finite() || *radius < 0.0 {
                return Err(VolError::Geometry(
                    ErrorInfo::new(
                        "cell-region-invalid",
                        "sphere radius must be finite and non-negative",
                    )
                    .with_context("cell_id", cell.id)
                    .with_context("radius", radius),
                ));
            }
            Ok(Shape::Sphere {
                center: *center,
                radius_sq: radius * radius,
            })
        }
    }
}

impl GeometryOracle for Model {
    fn locate(&self, point: &Position) -> Option<Occupant> {
        self.cells
            .iter()
            .find(|cell| cell.shape.contains(point))
            .map(|cell| Occupant {
                cells: vec![cell.id],
                universes: vec![cell.universe],
                material: cell.material,
            })
    }

    fn contains_domain(&self, domain_type: DomainType, id: DomainId) -> bool {
        match domain_type {
            DomainType::Cell => self.cell_ids.contains(&id),
            DomainType::Material => self.material_slots.contains_key(&id),
            DomainType::Universe => self.universe_ids.contains(&id),
        }
    }
}

impl MaterialRegistry for Model {
    fn material_id(&self, index: MaterialIndex) -> Option<DomainId> {
        self.materials.get(index.as_raw()).map(|material| material.id)
    }

    fn composition(&self, index: MaterialIndex) -> Result<&[NuclideDensity], VolError> {
        self.materials
            .get(index.as_raw())
            .map(|material| material.composition.as_slice())
            .ok_or_else(|| {
                VolError::Material(
                    ErrorInfo::new("material-unknown", "material index out of range")
                        .with_context("material_index", index.as_raw())
                        .with_context("materials", self.materials.len()),
                )
            })
    }

    fn nuclide_name(&self, index: NuclideIndex) -> Option<&str> {
        self.nuclide_names.get(index.as_raw()).map(String::as_str)
    }
}
