//! The layout engine: composes graph building, stage classification, DAG
//! filtering, and statistics into one pure call.
//!
//! ```rust
//! use matflow_core::layout::LayoutEngine;
//! use matflow_core::material::{MaterialNode, MaterialRef, MaterialRelationship, MaterialType, Predicate};
//!
//! let water = MaterialNode::new("w", "Water", MaterialType::Input);
//! let concrete = MaterialNode::new("c", "Ready-Mix Concrete", MaterialType::Intermediate);
//! let rel = MaterialRelationship::new(
//!     Predicate::IsInputOf,
//!     MaterialRef::from(&water),
//!     MaterialRef::from(&concrete),
//! )
//! .with_quantity(180.0, "kg");
//!
//! let result = LayoutEngine::new().layout(&[water, concrete], &[rel]);
//! assert_eq!(result.links.len(), 1);
//! assert_eq!(result.stats.recycling_rate, "0.0");
//! ```

use crate::dag::create_dag_compliant_flow_traced;
use crate::graph::DependencyGraph;
use crate::material::{MaterialNode, MaterialRelationship};
use crate::palette::StageBand;
use crate::stage::{self, Classification};
use crate::stats::{FlowStats, compute_stats};
use crate::trace::{TraceEvent, TraceListener, Tracer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal distance per unit of layer; `x = layer * column_spacing`.
    pub column_spacing: f64,
    /// Minimum material count before classification runs on the rayon pool.
    /// Only consulted with the `parallel` feature.
    pub parallel_threshold: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_spacing: 180.0,
            parallel_threshold: 512,
        }
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A material with its computed layer and rendering hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayeredNode {
    #[serde(flatten)]
    pub material: MaterialNode,
    /// Stage position; non-negative for every classifier output.
    pub layer: f64,
    /// Horizontal position hint, `layer * column_spacing`.
    pub x: f64,
    /// The material name denotes recycled or reclaimed material.
    pub is_recycling_related: bool,
}

impl LayeredNode {
    pub fn new(material: MaterialNode, layer: f64, column_spacing: f64) -> Self {
        let is_recycling_related = stage::is_recycling_related(&material.name);
        Self {
            material,
            layer,
            x: layer * column_spacing,
            is_recycling_related,
        }
    }

    pub fn uuid(&self) -> &str {
        &self.material.uuid
    }

    pub fn name(&self) -> &str {
        &self.material.name
    }

    /// The legend band this node's layer falls in.
    pub fn band(&self) -> StageBand {
        StageBand::from_stage(self.layer)
    }
}

/// The full layout: layered nodes, renderable links, recycling flows, stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    pub nodes: Vec<LayeredNode>,
    pub links: Vec<MaterialRelationship>,
    pub recycling_flows: Vec<MaterialRelationship>,
    pub stats: FlowStats,
}

impl LayoutResult {
    /// The well-formed result for no materials.
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            recycling_flows: Vec::new(),
            stats: FlowStats::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node with this uuid.
    pub fn node(&self, uuid: &str) -> Option<&LayeredNode> {
        self.nodes.iter().find(|n| n.uuid() == uuid)
    }

    /// Layer of the first node with this uuid.
    pub fn layer_of(&self, uuid: &str) -> Option<f64> {
        self.node(uuid).map(|n| n.layer)
    }

    /// Nodes whose layer falls in `band`, in input order.
    pub fn nodes_in_band(&self, band: StageBand) -> impl Iterator<Item = &LayeredNode> {
        self.nodes.iter().filter(move |n| n.band() == band)
    }

    /// Non-empty bands left to right, each with its nodes in input order.
    pub fn column_order(&self) -> Vec<(StageBand, Vec<&LayeredNode>)> {
        StageBand::ALL
            .iter()
            .map(|&band| (band, self.nodes_in_band(band).collect::<Vec<_>>()))
            .filter(|(_, nodes)| !nodes.is_empty())
            .collect()
    }

    /// Whether every link runs strictly left to right.
    pub fn is_dag_compliant(&self) -> bool {
        let mut layers: HashMap<&str, f64> = HashMap::with_capacity(self.nodes.len());
        for node in &self.nodes {
            layers.entry(node.uuid()).or_insert(node.layer);
        }
        self.links.iter().all(|link| {
            match (
                layers.get(link.subject.uuid.as_str()),
                layers.get(link.object.uuid.as_str()),
            ) {
                (Some(source), Some(target)) => source < target,
                _ => false,
            }
        })
    }
}

impl Default for LayoutResult {
    fn default() -> Self {
        Self::empty()
    }
}

// ---------------------------------------------------------------------------
// LayoutEngine
// ---------------------------------------------------------------------------

/// Runs the layering pipeline. Holds configuration and trace listeners only;
/// every call to [`layout`](Self::layout) is independent.
pub struct LayoutEngine {
    config: LayoutConfig,
    listeners: Vec<TraceListener>,
}

impl std::fmt::Debug for LayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("config", &self.config)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine {
    /// An engine with the default configuration and no listeners.
    pub fn new() -> Self {
        Self::with_config(LayoutConfig::default())
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            config,
            listeners: Vec::new(),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Register a passive trace listener. Listeners run in registration
    /// order on the calling thread.
    pub fn on_trace(&mut self, listener: TraceListener) {
        self.listeners.push(listener);
    }

    /// Builder form of [`on_trace`](Self::on_trace).
    pub fn with_trace(mut self, listener: TraceListener) -> Self {
        self.on_trace(listener);
        self
    }

    /// Lay out `materials` and `relationships`.
    ///
    /// Never fails. Returns [`LayoutResult::empty`] when `materials` is empty,
    /// regardless of `relationships`.
    pub fn layout(
        &self,
        materials: &[MaterialNode],
        relationships: &[MaterialRelationship],
    ) -> LayoutResult {
        if materials.is_empty() {
            return LayoutResult::empty();
        }

        let tracer = Tracer::new(&self.listeners);

        let graph = DependencyGraph::build_traced(materials, relationships, &tracer);
        let nodes = self.layer_nodes(materials, &graph, &tracer);
        let flow = create_dag_compliant_flow_traced(nodes, relationships, &tracer);
        let stats = compute_stats(relationships, &flow.recycling_flows);

        tracer.emit(|| TraceEvent::StatsComputed {
            total_flows: stats.total_flows,
            recycling_flows: stats.recycling_flows,
            recycling_rate: stats.recycling_rate.clone(),
        });

        LayoutResult {
            nodes: flow.nodes,
            links: flow.links,
            recycling_flows: flow.recycling_flows,
            stats,
        }
    }

    fn layer_nodes(
        &self,
        materials: &[MaterialNode],
        graph: &DependencyGraph,
        tracer: &Tracer<'_>,
    ) -> Vec<LayeredNode> {
        let classifications = self.classify_all(materials, graph);

        materials
            .iter()
            .zip(classifications)
            .map(|(material, c)| {
                tracer.emit(|| TraceEvent::NodeClassified {
                    uuid: material.uuid.clone(),
                    layer: c.layer,
                    reason: c.reason,
                });
                LayeredNode::new(material.clone(), c.layer, self.config.column_spacing)
            })
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn classify_all(&self, materials: &[MaterialNode], graph: &DependencyGraph) -> Vec<Classification> {
        use rayon::prelude::*;

        if materials.len() >= self.config.parallel_threshold {
            materials.par_iter().map(|m| stage::classify(m, graph)).collect()
        } else {
            materials.iter().map(|m| stage::classify(m, graph)).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn classify_all(&self, materials: &[MaterialNode], graph: &DependencyGraph) -> Vec<Classification> {
        materials.iter().map(|m| stage::classify(m, graph)).collect()
    }
}

/// Lay out with the default configuration and no tracing.
pub fn create_layered_layout(
    materials: &[MaterialNode],
    relationships: &[MaterialRelationship],
) -> LayoutResult {
    LayoutEngine::new().layout(materials, relationships)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
