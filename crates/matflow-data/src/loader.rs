//! Resolution pipeline: reads dataset files, resolves endpoint references,
//! builds core material and relationship lists.
//!
//! A dataset directory holds `materials.*` and `relationships.*` (required)
//! and `layout.*` (optional), each in RON, JSON, or TOML.

use matflow_core::graph::MissingEndpoint;
use matflow_core::layout::{LayoutConfig, LayoutEngine, LayoutResult};
use matflow_core::material::{
    MaterialNode, MaterialRef, MaterialRelationship, MaterialType, Predicate,
};
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::schema::{EndpointData, MaterialData, RelationshipData};

/// Base name of the required materials file.
pub const MATERIALS_FILE: &str = "materials";
/// Base name of the required relationships file.
pub const RELATIONSHIPS_FILE: &str = "relationships";
/// Base name of the optional layout configuration file.
pub const LAYOUT_FILE: &str = "layout";

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during dataset loading or payload export.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: &'static str, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name-only endpoint matched no material.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// Two materials share a uuid.
    #[error("duplicate material uuid '{uuid}' in {file}")]
    DuplicateUuid { file: PathBuf, uuid: String },

    /// A material's `type` is not one of the known roles.
    #[error("unknown material type '{value}' for '{uuid}' in {file}")]
    UnknownMaterialType {
        file: PathBuf,
        uuid: String,
        value: String,
    },

    /// A relationship's predicate is not recognized.
    #[error("unknown predicate '{value}' at relationship {index} in {file}")]
    UnknownPredicate {
        file: PathBuf,
        index: usize,
        value: String,
    },

    /// The layout payload could not be serialized.
    #[error("failed to serialize layout: {0}")]
    Serialize(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without extension).
///
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// more than one format exists for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if !candidate.exists() {
            continue;
        }
        if let Some(existing) = found {
            return Err(DataLoadError::ConflictingFormats {
                a: existing,
                b: candidate,
            });
        }
        found = Some(candidate);
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &'static str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name,
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Read a file and deserialize it according to its format.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list from a file. TOML files hold the array under
/// `toml_key` in a top-level table; RON and JSON hold a bare list.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    if detect_format(path)? != Format::Toml {
        return deserialize_file(path);
    }

    let content = std::fs::read_to_string(path)?;
    let mut table: toml::Table = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
    let array = table
        .remove(toml_key)
        .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?;

    array
        .try_into()
        .map_err(|e: toml::de::Error| parse_error(path, e))
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Look up a name in a map, returning an `UnresolvedRef` error if not found.
pub fn resolve_name<'a, V>(
    map: &'a HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, DataLoadError> {
    map.get(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

// ===========================================================================
// FlowData
// ===========================================================================

/// A relationship whose subject or object uuid names no loaded material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DanglingRelationship {
    /// Position in [`FlowData::relationships`].
    pub index: usize,
    pub missing: MissingEndpoint,
}

/// A resolved dataset, ready for layout.
#[derive(Debug, Clone, Default)]
pub struct FlowData {
    pub materials: Vec<MaterialNode>,
    pub relationships: Vec<MaterialRelationship>,
    /// From `layout.*`, or the default when that file is absent.
    pub config: LayoutConfig,
}

impl FlowData {
    /// Relationships the layout will count but not place. They are kept in
    /// [`relationships`](Self::relationships) unchanged.
    pub fn dangling_relationships(&self) -> Vec<DanglingRelationship> {
        let known: HashSet<&str> = self.materials.iter().map(|m| m.uuid.as_str()).collect();

        self.relationships
            .iter()
            .enumerate()
            .filter_map(|(index, rel)| {
                let subject = known.contains(rel.subject.uuid.as_str());
                let object = known.contains(rel.object.uuid.as_str());
                let missing = match (subject, object) {
                    (true, true) => return None,
                    (false, true) => MissingEndpoint::Subject,
                    (true, false) => MissingEndpoint::Object,
                    (false, false) => MissingEndpoint::Both,
                };
                Some(DanglingRelationship { index, missing })
            })
            .collect()
    }

    /// An engine carrying this dataset's configuration.
    pub fn engine(&self) -> LayoutEngine {
        LayoutEngine::with_config(self.config.clone())
    }

    /// Lay out the dataset with its own configuration.
    pub fn layout(&self) -> LayoutResult {
        self.engine().layout(&self.materials, &self.relationships)
    }
}

// ===========================================================================
// Loading pipeline
// ===========================================================================

/// Load a dataset directory.
///
/// Material uuids must be unique and types must be known roles. Relationship
/// endpoints given by uuid are kept even when no material matches; endpoints
/// given by name alone must match a material. Omitted endpoint names are
/// filled from the material list.
pub fn load_flow_data(dir: &Path) -> Result<FlowData, DataLoadError> {
    let materials_path = require_data_file(dir, MATERIALS_FILE)?;
    let relationships_path = require_data_file(dir, RELATIONSHIPS_FILE)?;

    let raw_materials: Vec<MaterialData> = deserialize_list(&materials_path, "materials")?;
    let raw_relationships: Vec<RelationshipData> =
        deserialize_list(&relationships_path, "relationships")?;

    let config = match find_data_file(dir, LAYOUT_FILE)? {
        Some(path) => deserialize_file(&path)?,
        None => LayoutConfig::default(),
    };

    let materials = resolve_materials(raw_materials, &materials_path)?;
    let relationships = resolve_relationships(raw_relationships, &materials, &relationships_path)?;

    Ok(FlowData {
        materials,
        relationships,
        config,
    })
}

fn resolve_materials(
    raw: Vec<MaterialData>,
    file: &Path,
) -> Result<Vec<MaterialNode>, DataLoadError> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut materials = Vec::with_capacity(raw.len());

    for data in raw {
        if !seen.insert(data.uuid.clone()) {
            return Err(DataLoadError::DuplicateUuid {
                file: file.to_path_buf(),
                uuid: data.uuid,
            });
        }

        let material_type: MaterialType =
            data.material_type
                .parse()
                .map_err(|_| DataLoadError::UnknownMaterialType {
                    file: file.to_path_buf(),
                    uuid: data.uuid.clone(),
                    value: data.material_type.clone(),
                })?;

        materials.push(MaterialNode {
            uuid: data.uuid,
            name: data.name,
            material_type,
            category: data.category,
            color: data.color,
        });
    }

    Ok(materials)
}

/// Endpoint lookup tables over the loaded materials.
struct EndpointIndex<'a> {
    names_by_uuid: HashMap<String, &'a str>,
    uuids_by_name: HashMap<String, &'a str>,
}

impl<'a> EndpointIndex<'a> {
    fn new(materials: &'a [MaterialNode]) -> Self {
        let mut names_by_uuid = HashMap::with_capacity(materials.len());
        let mut uuids_by_name = HashMap::with_capacity(materials.len());
        for m in materials {
            names_by_uuid.insert(m.uuid.clone(), m.name.as_str());
            // First material with a given name wins.
            uuids_by_name.entry(m.name.clone()).or_insert(m.uuid.as_str());
        }
        Self {
            names_by_uuid,
            uuids_by_name,
        }
    }

    fn name_of(&self, uuid: &str) -> String {
        self.names_by_uuid
            .get(uuid)
            .map(|n| n.to_string())
            .unwrap_or_default()
    }

    fn resolve(
        &self,
        endpoint: EndpointData,
        index: usize,
        file: &Path,
    ) -> Result<MaterialRef, DataLoadError> {
        match endpoint {
            EndpointData::Uuid(uuid) => {
                let name = self.name_of(&uuid);
                Ok(MaterialRef::new(uuid, name))
            }
            EndpointData::Full {
                uuid: Some(uuid),
                name,
            } => {
                let name = name.unwrap_or_else(|| self.name_of(&uuid));
                Ok(MaterialRef::new(uuid, name))
            }
            EndpointData::Full {
                uuid: None,
                name: Some(name),
            } => {
                let uuid = resolve_name(&self.uuids_by_name, &name, file, "material")?;
                Ok(MaterialRef::new(*uuid, name))
            }
            EndpointData::Full {
                uuid: None,
                name: None,
            } => Err(parse_error(
                file,
                format!("relationship {index}: endpoint needs a uuid or a name"),
            )),
        }
    }
}

fn resolve_relationships(
    raw: Vec<RelationshipData>,
    materials: &[MaterialNode],
    file: &Path,
) -> Result<Vec<MaterialRelationship>, DataLoadError> {
    let index = EndpointIndex::new(materials);

    raw.into_iter()
        .enumerate()
        .map(|(i, data)| {
            let predicate: Predicate =
                data.predicate
                    .parse()
                    .map_err(|_| DataLoadError::UnknownPredicate {
                        file: file.to_path_buf(),
                        index: i,
                        value: data.predicate.clone(),
                    })?;
            let subject = index.resolve(data.subject, i, file)?;
            let object = index.resolve(data.object, i, file)?;

            Ok(MaterialRelationship {
                predicate,
                subject,
                object,
                quantity: data.quantity,
                unit: data.unit,
                process_name: data.process_name,
            })
        })
        .collect()
}

// ===========================================================================
// Tests
// ===========================================================================
