//! Schema and provenance stamps carried by every volume report.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// `major.minor.patch` version of a serialized report layout.
///
/// Readers accept any payload sharing their major version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Bumped when a field is removed or changes meaning.
    pub major: u32,
    /// Bumped when fields are added.
    pub minor: u32,
    /// Bumped for fixes that leave the layout untouched.
    pub patch: u32,
}

impl SchemaVersion {
    /// Builds a version from its three components.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Returns true when a reader at `self` can decode a payload at `other`.
    pub fn reads(&self, other: &SchemaVersion) -> bool {
        self.major == other.major
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Half-open range `[start, end)` of sample stream positions.
///
/// Sample `i` of a run at seed offset `o` draws from position `o + i`, so two
/// estimates over the same box are independent only when their ranges are
/// disjoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SampleRange {
    /// First position drawn.
    pub start: u64,
    /// One past the last position drawn.
    pub end: u64,
}

impl SampleRange {
    /// Range of `samples` positions starting at `seed_offset`.
    pub fn new(seed_offset: u64, samples: u64) -> Self {
        Self {
            start: seed_offset,
            end: seed_offset.saturating_add(samples),
        }
    }

    /// Returns true when both ranges contain at least one common position.
    pub fn overlaps(&self, other: &SampleRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for SampleRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Where a report came from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunProvenance {
    /// SHA-256 of the calculation configuration, hex encoded.
    pub input_hash: String,
    /// Seed offset of the first sample stream.
    pub seed_offset: u64,
    /// Worker threads the samples were spread over.
    pub workers: usize,
    /// Stream positions behind the estimates, sorted.
    #[serde(default)]
    pub sample_ranges: Vec<SampleRange>,
    /// RFC 3339 generation time.
    pub created_at: String,
    /// Crate name to version of every tool that touched the data.
    pub tool_versions: BTreeMap<String, String>,
}
