#![deny(missing_docs)]
//! Core traits and data types for stochastic domain volume estimation.
//!
//! The sampler in `mcvol-calc` never talks to a concrete geometry engine. It
//! relies on two collaborator traits defined here: [`GeometryOracle`] answers
//! "what occupies this point" and [`MaterialRegistry`] answers "which nuclides
//! does this material contain, at what atom density".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod geometry;
pub mod provenance;
pub mod rng;

pub use errors::{ErrorInfo, VolError};
pub use geometry::{BoundingBox, Position};
pub use provenance::{RunProvenance, SampleRange, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle, SAMPLE_STREAM_KEY};

/// User facing identifier of a cell, material or universe.
pub type DomainId = i32;

/// Index of a material within a [`MaterialRegistry`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MaterialIndex(usize);

impl MaterialIndex {
    /// Creates a new index from its raw integer representation.
    pub fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the index.
    pub fn as_raw(&self) -> usize {
        self.0
    }
}

/// Index of a nuclide within a [`MaterialRegistry`]'s nuclide catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NuclideIndex(usize);

impl NuclideIndex {
    /// Creates a new index from its raw integer representation.
    pub fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the index.
    pub fn as_raw(&self) -> usize {
        self.0
    }
}

/// Classification of the domains a calculation measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainType {
    /// Domains are cells; a point belongs to every cell on its nesting path.
    Cell,
    /// Domains are materials, matched by material id.
    Material,
    /// Domains are universes; a point belongs to every universe on its path.
    Universe,
}

impl DomainType {
    /// Stable lowercase label used in reports and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainType::Cell => "cell",
            DomainType::Material => "material",
            DomainType::Universe => "universe",
        }
    }
}

impl fmt::Display for DomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DomainType {
    type Err = VolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cell" => Ok(DomainType::Cell),
            "material" => Ok(DomainType::Material),
            "universe" => Ok(DomainType::Universe),
            other => Err(VolError::Config(
                ErrorInfo::new("domain-type", "unknown domain type")
                    .with_context("value", other)
                    .with_hint("expected one of: cell, material, universe"),
            )),
        }
    }
}

/// What the geometry reports at a sampled point.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Occupant {
    /// Cell ids from the outermost to the innermost nesting level.
    pub cells: Vec<DomainId>,
    /// Universe ids from the outermost to the innermost nesting level.
    pub universes: Vec<DomainId>,
    /// Occupying material; `None` for a void cell.
    pub material: Option<MaterialIndex>,
}

/// Point-location contract supplied by the geometry subsystem.
pub trait GeometryOracle: Send + Sync {
    /// Locates the point, returning `None` when it lies outside every cell.
    ///
    /// Implementations must be deterministic and side-effect free.
    fn locate(&self, point: &Position) -> Option<Occupant>;

    /// Returns true when a domain with the given type and id exists.
    fn contains_domain(&self, domain_type: DomainType, id: DomainId) -> bool;
}

/// Atom density of one nuclide inside a material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NuclideDensity {
    /// Nuclide the density refers to.
    pub nuclide: NuclideIndex,
    /// Atoms per unit volume.
    pub density: f64,
}

/// Material composition lookup, stable for the duration of one execution.
pub trait MaterialRegistry: Send + Sync {
    /// Returns the user facing id of the material.
    fn material_id(&self, index: MaterialIndex) -> Option<DomainId>;

    /// Returns the nuclide composition of the material.
    fn composition(&self, index: MaterialIndex) -> Result<&[NuclideDensity], VolError>;

    /// Returns the display name of a nuclide.
    fn nuclide_name(&self, index: NuclideIndex) -> Option<&str>;
}
