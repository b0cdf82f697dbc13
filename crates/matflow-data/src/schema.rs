//! Serde data file structs for material-flow datasets.
//!
//! These structs define the on-disk format for materials and relationships.
//! They are deserialized from RON, JSON, or TOML data files and then resolved
//! into core types by the loader. Material types and predicates stay as
//! strings here so the loader can report unknown values with the file name.

use serde::Deserialize;

// ===========================================================================
// Materials
// ===========================================================================

/// A material definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct MaterialData {
    pub uuid: String,
    pub name: String,
    /// `"input"`, `"intermediate"`, or `"output"`.
    #[serde(rename = "type")]
    pub material_type: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub color: String,
}

// ===========================================================================
// Relationships
// ===========================================================================

/// A relationship endpoint, supporting a bare uuid or a full form with an
/// optional display name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EndpointData {
    /// Short form: `"uuid"`.
    Uuid(String),
    /// Full form. At least one of `uuid` and `name` must be present; a
    /// name-only endpoint is resolved against the material list.
    Full {
        #[serde(default)]
        uuid: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
}

/// A relationship statement in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct RelationshipData {
    /// `"IS_INPUT_OF"` or `"IS_OUTPUT_OF"`.
    pub predicate: String,
    pub subject: EndpointData,
    pub object: EndpointData,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: String,
    #[serde(default, alias = "processName")]
    pub process_name: String,
}

// ===========================================================================
// TOML wrappers
// ===========================================================================

/// TOML needs a top-level table; materials live under `[[materials]]`.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlMaterials {
    pub materials: Vec<MaterialData>,
}

/// TOML wrapper for `[[relationships]]`.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlRelationships {
    pub relationships: Vec<RelationshipData>,
}
