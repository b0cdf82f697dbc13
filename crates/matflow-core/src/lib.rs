//! Matflow Core -- the material-flow layering engine.
//!
//! Turns an arbitrary, possibly cyclic graph of material relationships into a
//! strictly left-to-right staged layout for a Sankey-style flow diagram. The
//! edges that had to be removed to keep the layout acyclic are preserved
//! separately as recycling flows, and aggregate flow statistics are computed
//! alongside.
//!
//! # Four-Stage Pipeline
//!
//! Each call to [`layout::LayoutEngine::layout`] runs these stages in order,
//! every one a pure function over the caller's immutable input:
//!
//! 1. **Graph** -- Build the per-material adjacency of direct inputs and
//!    outputs, normalizing `IS_OUTPUT_OF` edges to flow direction.
//! 2. **Stage** -- Assign each material a real-valued layer from its role,
//!    its name, and the types of the materials feeding it.
//! 3. **DAG filter** -- Split relationships into forward `links` and
//!    backward/recycling `recycling_flows`.
//! 4. **Stats** -- Aggregate quantities into a recycling rate.
//!
//! ```rust
//! use matflow_core::layout::create_layered_layout;
//!
//! let result = create_layered_layout(&[], &[]);
//! assert!(result.is_empty());
//! assert_eq!(result.stats.recycling_rate, "0");
//! ```
//!
//! # Key Types
//!
//! - [`material::MaterialNode`] / [`material::MaterialRelationship`] -- Input
//!   payload, serde-compatible with the renderer's camelCase schema.
//! - [`graph::DependencyGraph`] -- Adjacency sets keyed by material uuid.
//! - [`stage`] -- Ordered, data-driven name rule tables for layer assignment.
//! - [`dag::DagFlow`] -- Forward and recycling edge partitions.
//! - [`palette::StageBand`] -- Layer to color/stage-name lookup.
//! - [`trace::TraceEvent`] -- Structured diagnostics delivered to listeners.

pub mod dag;
pub mod graph;
pub mod id;
pub mod layout;
pub mod material;
pub mod palette;
pub mod stage;
pub mod stats;
pub mod trace;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
