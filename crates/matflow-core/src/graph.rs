use crate::id::MaterialKey;
use crate::material::{MaterialNode, MaterialRelationship, MaterialType, Predicate};
use crate::trace::{TraceEvent, Tracer};
use slotmap::{SecondaryMap, SlotMap};
use std::collections::{BTreeSet, HashMap};

// ---------------------------------------------------------------------------
// Core data structures
// ---------------------------------------------------------------------------

/// Adjacency sets for a single material, in material-flow direction.
#[derive(Debug, Clone, Default)]
struct Adjacency {
    /// Materials flowing directly into this one.
    inputs: BTreeSet<MaterialKey>,
    /// Materials this one flows directly into.
    outputs: BTreeSet<MaterialKey>,
    /// Subjects of every statement naming this material as object, in
    /// statement order. Feeds the intermediate depth rule.
    declared_sources: Vec<MaterialKey>,
}

/// Per-material data held by the graph.
#[derive(Debug, Clone)]
struct GraphNode {
    uuid: String,
    material_type: MaterialType,
}

/// Which endpoint of a relationship could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingEndpoint {
    Subject,
    Object,
    Both,
}

// ---------------------------------------------------------------------------
// DependencyGraph
// ---------------------------------------------------------------------------

/// Per-material map of direct input and output materials, built from the
/// relationship list.
///
/// Every supplied material has an entry, even when no relationship touches
/// it. Relationships with an endpoint that names no supplied material are
/// skipped and counted in [`skipped_relationships`](Self::skipped_relationships).
/// When two materials share a uuid, the first one wins.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: SlotMap<MaterialKey, GraphNode>,
    adjacency: SecondaryMap<MaterialKey, Adjacency>,
    index: HashMap<String, MaterialKey>,
    skipped: usize,
}

/// Build the dependency graph for `materials` and `relationships`.
pub fn build_dependency_graph(
    materials: &[MaterialNode],
    relationships: &[MaterialRelationship],
) -> DependencyGraph {
    DependencyGraph::build(materials, relationships)
}

impl DependencyGraph {
    /// Build the graph. Runs in O(V + E).
    pub fn build(materials: &[MaterialNode], relationships: &[MaterialRelationship]) -> Self {
        Self::build_traced(materials, relationships, &Tracer::silent())
    }

    pub(crate) fn build_traced(
        materials: &[MaterialNode],
        relationships: &[MaterialRelationship],
        tracer: &Tracer<'_>,
    ) -> Self {
        let mut graph = Self {
            nodes: SlotMap::with_capacity_and_key(materials.len()),
            adjacency: SecondaryMap::with_capacity(materials.len()),
            index: HashMap::with_capacity(materials.len()),
            skipped: 0,
        };

        for material in materials {
            if graph.index.contains_key(&material.uuid) {
                continue;
            }
            let key = graph.nodes.insert(GraphNode {
                uuid: material.uuid.clone(),
                material_type: material.material_type,
            });
            graph.adjacency.insert(key, Adjacency::default());
            graph.index.insert(material.uuid.clone(), key);
        }

        for (index, rel) in relationships.iter().enumerate() {
            let subject = graph.index.get(&rel.subject.uuid).copied();
            let object = graph.index.get(&rel.object.uuid).copied();

            let (subject, object) = match (subject, object) {
                (Some(s), Some(o)) => (s, o),
                (s, o) => {
                    graph.skipped += 1;
                    let missing = match (s, o) {
                        (None, Some(_)) => MissingEndpoint::Subject,
                        (Some(_), None) => MissingEndpoint::Object,
                        _ => MissingEndpoint::Both,
                    };
                    tracer.emit(|| TraceEvent::RelationshipSkipped {
                        index,
                        subject: rel.subject.uuid.clone(),
                        object: rel.object.uuid.clone(),
                        missing,
                    });
                    continue;
                }
            };

            let (from, to) = match rel.predicate {
                Predicate::IsInputOf => (subject, object),
                Predicate::IsOutputOf => (object, subject),
            };

            if let Some(adj) = graph.adjacency.get_mut(from) {
                adj.outputs.insert(to);
            }
            if let Some(adj) = graph.adjacency.get_mut(to) {
                adj.inputs.insert(from);
            }
            if let Some(adj) = graph.adjacency.get_mut(object) {
                adj.declared_sources.push(subject);
            }
        }

        tracer.emit(|| TraceEvent::GraphBuilt {
            materials: graph.nodes.len(),
            relationships: relationships.len(),
            skipped: graph.skipped,
        });

        graph
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Number of distinct materials in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of relationships skipped because an endpoint was unresolved.
    pub fn skipped_relationships(&self) -> usize {
        self.skipped
    }

    /// Whether a material with this uuid is in the graph.
    pub fn contains(&self, uuid: &str) -> bool {
        self.index.contains_key(uuid)
    }

    /// The declared type of a material, if present.
    pub fn material_type(&self, uuid: &str) -> Option<MaterialType> {
        self.key(uuid).map(|k| self.nodes[k].material_type)
    }

    /// Uuids of the materials flowing directly into `uuid`.
    pub fn inputs(&self, uuid: &str) -> impl Iterator<Item = &str> + '_ {
        self.adjacency_of(uuid)
            .into_iter()
            .flat_map(|adj| adj.inputs.iter())
            .map(|&k| self.nodes[k].uuid.as_str())
    }

    /// Uuids of the materials `uuid` flows directly into.
    pub fn outputs(&self, uuid: &str) -> impl Iterator<Item = &str> + '_ {
        self.adjacency_of(uuid)
            .into_iter()
            .flat_map(|adj| adj.outputs.iter())
            .map(|&k| self.nodes[k].uuid.as_str())
    }

    /// Size of the input set. Zero for unknown uuids.
    pub fn input_count(&self, uuid: &str) -> usize {
        self.adjacency_of(uuid).map_or(0, |adj| adj.inputs.len())
    }

    /// Size of the output set. Zero for unknown uuids.
    pub fn output_count(&self, uuid: &str) -> usize {
        self.adjacency_of(uuid).map_or(0, |adj| adj.outputs.len())
    }

    /// Types of the resolvable subjects of every relationship whose object is
    /// `uuid`, in relationship order. Predicate is not considered.
    pub fn declared_source_types(&self, uuid: &str) -> impl Iterator<Item = MaterialType> + '_ {
        self.adjacency_of(uuid)
            .into_iter()
            .flat_map(|adj| adj.declared_sources.iter())
            .map(|&k| self.nodes[k].material_type)
    }

    /// Iterate all material uuids in insertion order.
    pub fn uuids(&self) -> impl Iterator<Item = &str> {
        self.nodes.values().map(|n| n.uuid.as_str())
    }

    fn key(&self, uuid: &str) -> Option<MaterialKey> {
        self.index.get(uuid).copied()
    }

    fn adjacency_of(&self, uuid: &str) -> Option<&Adjacency> {
        self.key(uuid).and_then(|k| self.adjacency.get(k))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
