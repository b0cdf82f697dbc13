//! DAG compliance filter: partitions relationships by layer order.
//!
//! An edge is renderable only if its source sits strictly left of its
//! target. Every other resolvable edge is a backward (cyclic) flow and goes
//! to the recycling set instead. Forward edges with recycling semantics are
//! kept in `links` and also copied into the recycling set so the recycling
//! rate sees them.
//!
//! Endpoints are resolved from the raw statement `subject`/`object`, not the
//! predicate-normalized flow direction.

use crate::layout::LayeredNode;
use crate::material::MaterialRelationship;
use crate::trace::{TraceEvent, Tracer};
use std::collections::HashMap;

/// How the filter placed a resolvable edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeClass {
    /// In `links` only.
    Forward,
    /// In both `links` and `recycling_flows`.
    ForwardRecycling,
    /// In `recycling_flows` only.
    Backward,
}

impl EdgeClass {
    /// Classify an edge from its endpoint layers and recycling semantics.
    ///
    /// Equal layers count as backward so `links` stays strictly increasing.
    pub fn from_layers(source_layer: f64, target_layer: f64, recycling_process: bool) -> Self {
        if source_layer >= target_layer {
            EdgeClass::Backward
        } else if recycling_process {
            EdgeClass::ForwardRecycling
        } else {
            EdgeClass::Forward
        }
    }

    pub fn in_links(self) -> bool {
        matches!(self, EdgeClass::Forward | EdgeClass::ForwardRecycling)
    }

    pub fn in_recycling_flows(self) -> bool {
        matches!(self, EdgeClass::ForwardRecycling | EdgeClass::Backward)
    }
}

/// Output of the filter. `nodes` is the input passed through untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DagFlow {
    pub nodes: Vec<LayeredNode>,
    pub links: Vec<MaterialRelationship>,
    pub recycling_flows: Vec<MaterialRelationship>,
}

/// Whether a relationship carries recycling semantics: a reclamation
/// process, waste or scrap as subject, or recycled material as object.
pub fn is_recycling_process(rel: &MaterialRelationship) -> bool {
    let process = rel.process_name.to_lowercase();
    let subject = rel.subject.name.to_lowercase();
    let object = rel.object.name.to_lowercase();

    process.contains("recycl")
        || process.contains("reclaim")
        || subject.contains("waste")
        || subject.contains("scrap")
        || object.contains("recycled")
}

/// Partition `relationships` into renderable links and recycling flows.
pub fn create_dag_compliant_flow(
    nodes: Vec<LayeredNode>,
    relationships: &[MaterialRelationship],
) -> DagFlow {
    create_dag_compliant_flow_traced(nodes, relationships, &Tracer::silent())
}

pub(crate) fn create_dag_compliant_flow_traced(
    nodes: Vec<LayeredNode>,
    relationships: &[MaterialRelationship],
    tracer: &Tracer<'_>,
) -> DagFlow {
    let mut layers: HashMap<&str, f64> = HashMap::with_capacity(nodes.len());
    for node in &nodes {
        // First node with a given uuid wins.
        layers.entry(node.material.uuid.as_str()).or_insert(node.layer);
    }

    let mut links = Vec::new();
    let mut recycling_flows = Vec::new();

    for (index, rel) in relationships.iter().enumerate() {
        let source = layers.get(rel.subject.uuid.as_str()).copied();
        let target = layers.get(rel.object.uuid.as_str()).copied();

        let (Some(source_layer), Some(target_layer)) = (source, target) else {
            tracer.emit(|| TraceEvent::EdgeDropped {
                index,
                subject: rel.subject.uuid.clone(),
                object: rel.object.uuid.clone(),
            });
            continue;
        };

        let class = EdgeClass::from_layers(source_layer, target_layer, is_recycling_process(rel));
        if class.in_links() {
            links.push(rel.clone());
        }
        if class.in_recycling_flows() {
            recycling_flows.push(rel.clone());
        }

        tracer.emit(|| TraceEvent::EdgeClassified {
            index,
            subject: rel.subject.uuid.clone(),
            object: rel.object.uuid.clone(),
            class,
            equal_layers: source_layer == target_layer,
        });
    }

    DagFlow {
        nodes,
        links,
        recycling_flows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{MaterialNode, MaterialRef, MaterialType, Predicate};
    use crate::test_utils::*;

    fn at(material: MaterialNode, layer: f64) -> LayeredNode {
        LayeredNode::new(material, layer, 180.0)
    }

    #[test]
    fn edge_class_table() {
        assert_eq!(EdgeClass::from_layers(0.0, 1.0, false), EdgeClass::Forward);
        assert_eq!(EdgeClass::from_layers(0.0, 1.0, true), EdgeClass::ForwardRecycling);
        assert_eq!(EdgeClass::from_layers(4.2, 0.2, false), EdgeClass::Backward);
        assert_eq!(EdgeClass::from_layers(4.2, 0.2, true), EdgeClass::Backward);
        assert_eq!(EdgeClass::from_layers(1.5, 1.5, false), EdgeClass::Backward);
    }

    #[test]
    fn recycling_process_heuristics() {
        let plain = feeds(&water(), &ready_mix_concrete(), 1.0);
        assert!(!is_recycling_process(&plain));

        assert!(is_recycling_process(&plain.clone().with_process("Concrete RECYCLING")));
        assert!(is_recycling_process(&plain.clone().with_process("Timber reclaim")));
        assert!(is_recycling_process(&feeds(&concrete_waste(), &ready_mix_concrete(), 1.0)));
        assert!(is_recycling_process(&feeds(&water(), &recycled_aggregate(), 1.0)));

        let scrap = MaterialNode::new("scrap", "Steel Scrap", MaterialType::Output);
        assert!(is_recycling_process(&feeds(&scrap, &water(), 1.0)));
    }

    #[test]
    fn statement_names_drive_heuristics_not_material_names() {
        let rel = MaterialRelationship::new(
            Predicate::IsInputOf,
            MaterialRef::new("water", "Process Waste Water"),
            MaterialRef::new("ready-mix", "Ready-Mix Concrete"),
        );
        assert!(is_recycling_process(&rel));
    }

    #[test]
    fn forward_edge_goes_to_links() {
        let nodes = vec![at(water(), 0.0), at(ready_mix_concrete(), 1.0)];
        let rels = vec![feeds(&water(), &ready_mix_concrete(), 180.0)];
        let flow = create_dag_compliant_flow(nodes.clone(), &rels);

        assert_eq!(flow.nodes, nodes);
        assert_eq!(flow.links, rels);
        assert!(flow.recycling_flows.is_empty());
    }

    #[test]
    fn backward_edge_goes_to_recycling_only() {
        let nodes = vec![at(concrete_waste(), 4.2), at(recycled_aggregate(), 0.2)];
        let rels = vec![
            feeds(&concrete_waste(), &recycled_aggregate(), 100.0).with_process("Concrete Recycling"),
        ];
        let flow = create_dag_compliant_flow(nodes, &rels);

        assert!(flow.links.is_empty());
        assert_eq!(flow.recycling_flows, rels);
    }

    #[test]
    fn forward_recycling_edge_goes_to_both() {
        let precast = MaterialNode::new("precast", "Precast Panel", MaterialType::Intermediate);
        let nodes = vec![at(recycled_aggregate(), 0.2), at(precast.clone(), 1.5)];
        let rels = vec![feeds(&recycled_aggregate(), &precast, 60.0)];
        let flow = create_dag_compliant_flow(nodes, &rels);

        // Subject name "Recycled Concrete Aggregate" does not trigger the
        // heuristic; only object names do for "recycled".
        assert_eq!(flow.links.len(), 1);
        assert!(flow.recycling_flows.is_empty());

        let rels = vec![feeds(&recycled_aggregate(), &precast, 60.0).with_process("Recycled feed")];
        let nodes = vec![at(recycled_aggregate(), 0.2), at(precast, 1.5)];
        let flow = create_dag_compliant_flow(nodes, &rels);
        assert_eq!(flow.links, rels);
        assert_eq!(flow.recycling_flows, rels);
    }

    #[test]
    fn equal_layers_are_backward() {
        let a = MaterialNode::new("a", "Mortar", MaterialType::Intermediate);
        let b = MaterialNode::new("b", "Grout", MaterialType::Intermediate);
        let nodes = vec![at(a.clone(), 1.5), at(b.clone(), 1.5)];
        let rels = vec![feeds(&a, &b, 5.0)];
        let flow = create_dag_compliant_flow(nodes, &rels);

        assert!(flow.links.is_empty());
        assert_eq!(flow.recycling_flows.len(), 1);
    }

    #[test]
    fn unresolved_endpoint_is_dropped_from_both_sets() {
        let nodes = vec![at(water(), 0.0), at(ready_mix_concrete(), 1.0)];
        let dangling = MaterialRelationship::new(
            Predicate::IsInputOf,
            MaterialRef::new("ghost", "Waste Ghost"),
            MaterialRef::from(&ready_mix_concrete()),
        );
        let rels = vec![dangling, feeds(&water(), &ready_mix_concrete(), 180.0)];
        let flow = create_dag_compliant_flow(nodes, &rels);

        assert_eq!(flow.links.len(), 1);
        assert!(flow.recycling_flows.is_empty());
    }

    #[test]
    fn output_of_uses_raw_subject_and_object() {
        // Slab IS_OUTPUT_OF concrete: subject slab (3.2) -> object concrete (1.0).
        let nodes = vec![at(ready_mix_concrete(), 1.0), at(floor_slab(), 3.2)];
        let rels = vec![produced_by(&floor_slab(), &ready_mix_concrete(), 40.0)];
        let flow = create_dag_compliant_flow(nodes, &rels);

        assert!(flow.links.is_empty());
        assert_eq!(flow.recycling_flows.len(), 1);
    }

    #[test]
    fn links_preserve_relationship_order() {
        let nodes = vec![
            at(water(), 0.0),
            at(cement(), 0.0),
            at(ready_mix_concrete(), 1.0),
        ];
        let rels = vec![
            feeds(&cement(), &ready_mix_concrete(), 320.0),
            feeds(&water(), &ready_mix_concrete(), 180.0),
        ];
        let flow = create_dag_compliant_flow(nodes, &rels);
        assert_eq!(flow.links, rels);
    }
}
