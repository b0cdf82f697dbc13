//! Input payload types: materials and the relationships between them.
//!
//! Field names serialize in the renderer's camelCase schema (`type`,
//! `processName`), and predicates use their triple-store spelling
//! (`IS_INPUT_OF`, `IS_OUTPUT_OF`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when parsing textual model values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("unknown material type: {0:?}")]
    UnknownMaterialType(String),
    #[error("unknown relationship predicate: {0:?}")]
    UnknownPredicate(String),
}

// ---------------------------------------------------------------------------
// Material type
// ---------------------------------------------------------------------------

/// The declared role of a material in the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialType {
    /// Raw or reclaimed material entering the flow.
    Input,
    /// Processed material that is both consumed and produced.
    Intermediate,
    /// Product, waste stream, or environmental sink.
    Output,
    /// Any role string the engine does not recognize.
    #[serde(other)]
    Unknown,
}

impl MaterialType {
    pub fn as_str(self) -> &'static str {
        match self {
            MaterialType::Input => "input",
            MaterialType::Intermediate => "intermediate",
            MaterialType::Output => "output",
            MaterialType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaterialType {
    type Err = ModelError;

    /// Strict parse: only the three known roles are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(MaterialType::Input),
            "intermediate" => Ok(MaterialType::Intermediate),
            "output" => Ok(MaterialType::Output),
            other => Err(ModelError::UnknownMaterialType(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Predicate
// ---------------------------------------------------------------------------

/// Relationship predicate as stored in the statement triples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Predicate {
    /// Material flows subject -> object.
    #[serde(rename = "IS_INPUT_OF")]
    IsInputOf,
    /// Subject is produced by object, so material flows object -> subject.
    #[serde(rename = "IS_OUTPUT_OF")]
    IsOutputOf,
}

impl Predicate {
    pub fn as_str(self) -> &'static str {
        match self {
            Predicate::IsInputOf => "IS_INPUT_OF",
            Predicate::IsOutputOf => "IS_OUTPUT_OF",
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Predicate {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IS_INPUT_OF" => Ok(Predicate::IsInputOf),
            "IS_OUTPUT_OF" => Ok(Predicate::IsOutputOf),
            other => Err(ModelError::UnknownPredicate(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Materials
// ---------------------------------------------------------------------------

/// A material in the flow. Identity is `uuid`; `name` only feeds the
/// classification heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialNode {
    pub uuid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub material_type: MaterialType,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub color: String,
}

impl MaterialNode {
    /// Create a material with empty category and color.
    pub fn new(
        uuid: impl Into<String>,
        name: impl Into<String>,
        material_type: MaterialType,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            material_type,
            category: String::new(),
            color: String::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}

/// One endpoint of a relationship: the referenced material's uuid and the
/// name recorded on the statement (which may differ from the material's).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialRef {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
}

impl MaterialRef {
    pub fn new(uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
        }
    }
}

impl From<&MaterialNode> for MaterialRef {
    fn from(node: &MaterialNode) -> Self {
        Self::new(node.uuid.clone(), node.name.clone())
    }
}

/// A directed subject-predicate-object relationship between two materials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRelationship {
    pub predicate: Predicate,
    pub subject: MaterialRef,
    pub object: MaterialRef,
    /// Flow quantity. `None` counts as zero in every aggregate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub process_name: String,
}

impl MaterialRelationship {
    /// Create a relationship with no quantity, unit, or process name.
    pub fn new(predicate: Predicate, subject: MaterialRef, object: MaterialRef) -> Self {
        Self {
            predicate,
            subject,
            object,
            quantity: None,
            unit: String::new(),
            process_name: String::new(),
        }
    }

    pub fn with_quantity(mut self, quantity: f64, unit: impl Into<String>) -> Self {
        self.quantity = Some(quantity);
        self.unit = unit.into();
        self
    }

    pub fn with_process(mut self, process_name: impl Into<String>) -> Self {
        self.process_name = process_name.into();
        self
    }

    /// Quantity used for aggregation: missing or non-finite values count as 0.
    pub fn effective_quantity(&self) -> f64 {
        match self.quantity {
            Some(q) if q.is_finite() => q,
            _ => 0.0,
        }
    }

    /// The `(from, to)` uuids in material-flow direction.
    ///
    /// `IS_OUTPUT_OF` statements name the product as subject, so the flow
    /// runs object -> subject.
    pub fn flow_endpoints(&self) -> (&str, &str) {
        match self.predicate {
            Predicate::IsInputOf => (&self.subject.uuid, &self.object.uuid),
            Predicate::IsOutputOf => (&self.object.uuid, &self.subject.uuid),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_type_parses_known_roles() {
        assert_eq!("input".parse::<MaterialType>(), Ok(MaterialType::Input));
        assert_eq!(
            "intermediate".parse::<MaterialType>(),
            Ok(MaterialType::Intermediate)
        );
        assert_eq!("output".parse::<MaterialType>(), Ok(MaterialType::Output));
    }

    #[test]
    fn material_type_rejects_unknown_role() {
        assert_eq!(
            "byproduct".parse::<MaterialType>(),
            Err(ModelError::UnknownMaterialType("byproduct".to_string()))
        );
    }

    #[test]
    fn unknown_type_deserializes_to_unknown_variant() {
        let json = r#"{"uuid":"m1","name":"Mystery","type":"catalyst"}"#;
        let node: MaterialNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.material_type, MaterialType::Unknown);
        assert_eq!(node.category, "");
    }

    #[test]
    fn predicate_round_trips_through_display() {
        for p in [Predicate::IsInputOf, Predicate::IsOutputOf] {
            assert_eq!(p.to_string().parse::<Predicate>(), Ok(p));
        }
        assert!("IS_PART_OF".parse::<Predicate>().is_err());
    }

    #[test]
    fn relationship_uses_camel_case_payload() {
        let rel = MaterialRelationship::new(
            Predicate::IsInputOf,
            MaterialRef::new("w", "Water"),
            MaterialRef::new("c", "Concrete"),
        )
        .with_quantity(180.0, "kg")
        .with_process("Mixing");

        let value = serde_json::to_value(&rel).unwrap();
        assert_eq!(value["predicate"], "IS_INPUT_OF");
        assert_eq!(value["processName"], "Mixing");
        assert_eq!(value["quantity"], 180.0);
        assert_eq!(value["subject"]["uuid"], "w");
    }

    #[test]
    fn missing_quantity_deserializes_as_none() {
        let json = r#"{
            "predicate": "IS_OUTPUT_OF",
            "subject": {"uuid": "a", "name": "A"},
            "object": {"uuid": "b", "name": "B"}
        }"#;
        let rel: MaterialRelationship = serde_json::from_str(json).unwrap();
        assert_eq!(rel.quantity, None);
        assert_eq!(rel.effective_quantity(), 0.0);
        assert_eq!(rel.process_name, "");
    }

    #[test]
    fn effective_quantity_ignores_non_finite() {
        let rel = MaterialRelationship::new(
            Predicate::IsInputOf,
            MaterialRef::new("a", "A"),
            MaterialRef::new("b", "B"),
        );
        assert_eq!(rel.clone().with_quantity(f64::NAN, "t").effective_quantity(), 0.0);
        assert_eq!(
            rel.clone().with_quantity(f64::INFINITY, "t").effective_quantity(),
            0.0
        );
        assert_eq!(rel.with_quantity(12.5, "t").effective_quantity(), 12.5);
    }

    #[test]
    fn flow_endpoints_normalize_output_of() {
        let input_of = MaterialRelationship::new(
            Predicate::IsInputOf,
            MaterialRef::new("sand", "Sand"),
            MaterialRef::new("mortar", "Mortar"),
        );
        assert_eq!(input_of.flow_endpoints(), ("sand", "mortar"));

        let output_of = MaterialRelationship::new(
            Predicate::IsOutputOf,
            MaterialRef::new("slab", "Floor Slab"),
            MaterialRef::new("concrete", "Concrete"),
        );
        assert_eq!(output_of.flow_endpoints(), ("concrete", "slab"));
    }
}
