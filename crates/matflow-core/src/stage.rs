//! Stage classification: assigns every material a real-valued layer.
//!
//! This is a heuristic, not a topological sort. Raw materials are pinned to
//! the left edge, intermediates land in a mid band that grows with the kind
//! of material feeding them, and outputs fan out into structural, waste, and
//! environmental sub-bands so disposal flows render downstream of products.
//!
//! All name-based policy lives in the ordered tables [`INTERMEDIATE_FLOORS`]
//! and [`OUTPUT_BANDS`]. Names are matched case-insensitively by substring.

use crate::graph::DependencyGraph;
use crate::material::{MaterialNode, MaterialType};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Layer of a primary (virgin) input material.
pub const PRIMARY_INPUT_LAYER: f64 = 0.0;
/// Layer of a recycled or reclaimed input material.
pub const RECYCLED_INPUT_LAYER: f64 = 0.2;
/// Layer of an output whose name matches no band.
pub const DEFAULT_OUTPUT_LAYER: f64 = 3.0;
/// Layer of a material whose type is not recognized.
pub const UNKNOWN_TYPE_LAYER: f64 = 1.5;

/// Intermediate depth when no supplied material feeds the node.
pub const UNFED_DEPTH: f64 = 1.0;
/// Added on top of the deepest feeding material's weight.
pub const DEPTH_STEP: f64 = 0.5;
/// Depth weight of an `input`-typed feeding material.
pub const INPUT_SOURCE_WEIGHT: f64 = 0.5;
/// Depth weight of an `intermediate`-typed feeding material.
pub const INTERMEDIATE_SOURCE_WEIGHT: f64 = 1.0;

const RECYCLED_KEYWORDS: &[&str] = &["recycled", "reclaimed"];

// ---------------------------------------------------------------------------
// Rule tables
// ---------------------------------------------------------------------------

/// When an intermediate floor rule applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FloorCondition {
    /// Lower-cased name contains any of the keywords.
    NameContains(&'static [&'static str]),
    /// Name contains any keyword, or the node has more than `n` inputs.
    NameContainsOrInputsAbove(&'static [&'static str], usize),
    /// The node has more than `n` outputs.
    OutputsAbove(usize),
    /// Always applies. Terminates the table.
    Always,
}

impl FloorCondition {
    pub fn matches(&self, name_lower: &str, input_count: usize, output_count: usize) -> bool {
        match *self {
            FloorCondition::NameContains(keywords) => find_keyword(name_lower, keywords).is_some(),
            FloorCondition::NameContainsOrInputsAbove(keywords, n) => {
                find_keyword(name_lower, keywords).is_some() || input_count > n
            }
            FloorCondition::OutputsAbove(n) => output_count > n,
            FloorCondition::Always => true,
        }
    }
}

/// A minimum layer for intermediates matching `condition`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorRule {
    pub condition: FloorCondition,
    pub floor: f64,
}

/// Intermediate floors, evaluated in order. The first matching rule raises
/// the computed depth to its floor; later rules are not consulted.
pub const INTERMEDIATE_FLOORS: &[FloorRule] = &[
    FloorRule {
        condition: FloorCondition::NameContains(&["concrete"]),
        floor: 1.0,
    },
    FloorRule {
        condition: FloorCondition::NameContains(&["window"]),
        floor: 1.4,
    },
    FloorRule {
        condition: FloorCondition::NameContains(&["stairs"]),
        floor: 1.6,
    },
    FloorRule {
        condition: FloorCondition::NameContains(&["lift", "elevator"]),
        floor: 1.8,
    },
    FloorRule {
        condition: FloorCondition::NameContainsOrInputsAbove(&["reinforced"], 2),
        floor: 2.2,
    },
    FloorRule {
        condition: FloorCondition::OutputsAbove(2),
        floor: 1.8,
    },
    FloorRule {
        condition: FloorCondition::Always,
        floor: 1.5,
    },
];

/// A fixed layer for outputs whose name contains any of `keywords`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputBand {
    pub keywords: &'static [&'static str],
    pub layer: f64,
}

/// Output sub-bands, first match wins. Unmatched outputs get
/// [`DEFAULT_OUTPUT_LAYER`].
pub const OUTPUT_BANDS: &[OutputBand] = &[
    OutputBand {
        keywords: &["building", "completed"],
        layer: 3.8,
    },
    OutputBand {
        keywords: &["foundation", "wall", "floor", "roof"],
        layer: 3.2,
    },
    OutputBand {
        keywords: &["waste", "scrap", "debris"],
        layer: 4.2,
    },
    OutputBand {
        keywords: &["emission", "runoff", "landfill"],
        layer: 4.8,
    },
];

// ---------------------------------------------------------------------------
// Classification result
// ---------------------------------------------------------------------------

/// Which rule decided a material's layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageReason {
    PrimaryInput,
    RecycledInput,
    /// `depth` from the feeding materials, raised to `floor` by the rule at
    /// `rule` in [`INTERMEDIATE_FLOORS`].
    Intermediate { depth: f64, rule: usize, floor: f64 },
    /// Matched the band at `band` in [`OUTPUT_BANDS`] via `keyword`.
    OutputBand { band: usize, keyword: &'static str },
    OutputDefault,
    UnknownType,
}

/// A layer together with the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub layer: f64,
    pub reason: StageReason,
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Compute the layer of `material`. Pure; reads the graph only.
pub fn stage_level(material: &MaterialNode, graph: &DependencyGraph) -> f64 {
    classify(material, graph).layer
}

/// Compute the layer of `material` and record which rule decided it.
pub fn classify(material: &MaterialNode, graph: &DependencyGraph) -> Classification {
    let name = material.name.to_lowercase();

    match material.material_type {
        MaterialType::Input => {
            if is_recycled_name(&name) {
                Classification {
                    layer: RECYCLED_INPUT_LAYER,
                    reason: StageReason::RecycledInput,
                }
            } else {
                Classification {
                    layer: PRIMARY_INPUT_LAYER,
                    reason: StageReason::PrimaryInput,
                }
            }
        }
        MaterialType::Intermediate => {
            let depth = intermediate_depth(&material.uuid, graph);
            let (rule, floor) = intermediate_floor(
                &name,
                graph.input_count(&material.uuid),
                graph.output_count(&material.uuid),
            );
            Classification {
                layer: depth.max(floor),
                reason: StageReason::Intermediate { depth, rule, floor },
            }
        }
        MaterialType::Output => match output_band(&name) {
            Some((band, keyword)) => Classification {
                layer: OUTPUT_BANDS[band].layer,
                reason: StageReason::OutputBand { band, keyword },
            },
            None => Classification {
                layer: DEFAULT_OUTPUT_LAYER,
                reason: StageReason::OutputDefault,
            },
        },
        MaterialType::Unknown => Classification {
            layer: UNKNOWN_TYPE_LAYER,
            reason: StageReason::UnknownType,
        },
    }
}

/// Depth of an intermediate from the materials feeding it.
///
/// Feeding materials are the resolvable subjects of every relationship whose
/// object is `uuid`. Each contributes a weight by type (outputs and unknown
/// types contribute nothing); depth is the largest weight plus
/// [`DEPTH_STEP`]. With no feeding material at all, depth is
/// [`UNFED_DEPTH`].
pub fn intermediate_depth(uuid: &str, graph: &DependencyGraph) -> f64 {
    let mut fed = false;
    let mut deepest = 0.0_f64;

    for source_type in graph.declared_source_types(uuid) {
        fed = true;
        let weight = match source_type {
            MaterialType::Input => INPUT_SOURCE_WEIGHT,
            MaterialType::Intermediate => INTERMEDIATE_SOURCE_WEIGHT,
            MaterialType::Output | MaterialType::Unknown => continue,
        };
        deepest = deepest.max(weight);
    }

    if fed { deepest + DEPTH_STEP } else { UNFED_DEPTH }
}

/// The first floor rule matching an intermediate, as `(rule index, floor)`.
///
/// `name_lower` must already be lower-cased.
pub fn intermediate_floor(name_lower: &str, input_count: usize, output_count: usize) -> (usize, f64) {
    INTERMEDIATE_FLOORS
        .iter()
        .enumerate()
        .find(|(_, rule)| rule.condition.matches(name_lower, input_count, output_count))
        .map(|(i, rule)| (i, rule.floor))
        .unwrap_or((INTERMEDIATE_FLOORS.len(), UNKNOWN_TYPE_LAYER))
}

/// The first output band matching `name_lower`, as `(band index, keyword)`.
pub fn output_band(name_lower: &str) -> Option<(usize, &'static str)> {
    OUTPUT_BANDS
        .iter()
        .enumerate()
        .find_map(|(i, band)| find_keyword(name_lower, band.keywords).map(|kw| (i, kw)))
}

/// Whether a material name denotes recycled or reclaimed material.
pub fn is_recycling_related(name: &str) -> bool {
    is_recycled_name(&name.to_lowercase())
}

fn is_recycled_name(name_lower: &str) -> bool {
    find_keyword(name_lower, RECYCLED_KEYWORDS).is_some()
}

fn find_keyword(name_lower: &str, keywords: &'static [&'static str]) -> Option<&'static str> {
    keywords.iter().copied().find(|kw| name_lower.contains(kw))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_dependency_graph;
    use crate::test_utils::*;

    fn level_alone(material: MaterialNode) -> f64 {
        let graph = build_dependency_graph(std::slice::from_ref(&material), &[]);
        stage_level(&material, &graph)
    }

    // -----------------------------------------------------------------------
    // Rule tables in isolation
    // -----------------------------------------------------------------------

    #[test]
    fn floor_table_ends_with_catch_all() {
        let last = INTERMEDIATE_FLOORS.last().unwrap();
        assert_eq!(last.condition, FloorCondition::Always);
        assert_eq!(last.floor, 1.5);
    }

    #[test]
    fn floor_first_match_wins() {
        // "concrete" beats "reinforced" because it comes first.
        assert_eq!(intermediate_floor("reinforced concrete", 0, 0), (0, 1.0));
        assert_eq!(intermediate_floor("window frame", 0, 0), (1, 1.4));
        assert_eq!(intermediate_floor("stairs", 0, 0), (2, 1.6));
        assert_eq!(intermediate_floor("goods lift", 0, 0), (3, 1.8));
        assert_eq!(intermediate_floor("elevator shaft", 0, 0), (3, 1.8));
        assert_eq!(intermediate_floor("reinforced steel", 0, 0), (4, 2.2));
        assert_eq!(intermediate_floor("mortar", 0, 0), (6, 1.5));
    }

    #[test]
    fn floor_uses_adjacency_counts() {
        assert_eq!(intermediate_floor("mortar", 3, 0), (4, 2.2));
        assert_eq!(intermediate_floor("mortar", 2, 0), (6, 1.5));
        assert_eq!(intermediate_floor("mortar", 0, 3), (5, 1.8));
        // Inputs are checked before outputs.
        assert_eq!(intermediate_floor("mortar", 3, 3), (4, 2.2));
    }

    #[test]
    fn output_bands_first_match_wins() {
        assert_eq!(output_band("completed building"), Some((0, "building")));
        assert_eq!(output_band("roof panel"), Some((1, "roof")));
        // "wall" precedes "waste" in table order.
        assert_eq!(output_band("wall waste"), Some((1, "wall")));
        assert_eq!(output_band("concrete debris"), Some((2, "debris")));
        assert_eq!(output_band("stormwater runoff"), Some((3, "runoff")));
        assert_eq!(output_band("facade panel"), None);
    }

    #[test]
    fn recycling_related_is_case_insensitive() {
        assert!(is_recycling_related("Recycled Concrete Aggregate"));
        assert!(is_recycling_related("RECLAIMED timber"));
        assert!(!is_recycling_related("Recycling Plant Output"));
    }

    // -----------------------------------------------------------------------
    // Inputs
    // -----------------------------------------------------------------------

    #[test]
    fn primary_input_is_zero() {
        assert_eq!(level_alone(water()), 0.0);
    }

    #[test]
    fn recycled_input_is_point_two() {
        assert_eq!(level_alone(recycled_aggregate()), 0.2);
        let reclaimed = MaterialNode::new("rt", "Reclaimed Timber", MaterialType::Input);
        assert_eq!(level_alone(reclaimed), 0.2);
    }

    // -----------------------------------------------------------------------
    // Intermediates
    // -----------------------------------------------------------------------

    #[test]
    fn concrete_fed_by_input_is_one() {
        let materials = vec![water(), ready_mix_concrete()];
        let rels = vec![feeds(&water(), &ready_mix_concrete(), 180.0)];
        let graph = build_dependency_graph(&materials, &rels);

        let c = classify(&materials[1], &graph);
        assert_eq!(c.layer, 1.0);
        assert_eq!(
            c.reason,
            StageReason::Intermediate {
                depth: 1.0,
                rule: 0,
                floor: 1.0
            }
        );
    }

    #[test]
    fn unfed_intermediate_uses_unfed_depth_then_floor() {
        // Depth 1.0, no name match, fallback floor 1.5.
        let mortar = MaterialNode::new("mortar", "Mortar", MaterialType::Intermediate);
        assert_eq!(level_alone(mortar), 1.5);
        // Depth 1.0 against a 1.0 floor.
        assert_eq!(level_alone(ready_mix_concrete()), 1.0);
    }

    #[test]
    fn intermediate_fed_by_intermediate_goes_deeper() {
        let rebar_cage = MaterialNode::new("cage", "Rebar Cage", MaterialType::Intermediate);
        let precast = MaterialNode::new("precast", "Precast Concrete", MaterialType::Intermediate);
        let materials = vec![rebar_cage.clone(), precast.clone()];
        let rels = vec![feeds(&rebar_cage, &precast, 10.0)];
        let graph = build_dependency_graph(&materials, &rels);

        assert_eq!(intermediate_depth("precast", &graph), 1.5);
        assert_eq!(stage_level(&precast, &graph), 1.5);
    }

    #[test]
    fn output_source_contributes_no_weight() {
        let slab = floor_slab();
        let concrete = ready_mix_concrete();
        let materials = vec![concrete.clone(), slab.clone()];
        // Concrete is the object of this statement, slab the subject.
        let rels = vec![produced_by(&slab, &concrete, 40.0)];
        let graph = build_dependency_graph(&materials, &rels);

        assert_eq!(intermediate_depth(&concrete.uuid, &graph), 0.5);
        // Raised by the concrete floor.
        assert_eq!(stage_level(&concrete, &graph), 1.0);
    }

    #[test]
    fn many_inputs_push_intermediate_to_main_processing() {
        let mix = MaterialNode::new("mix", "Structural Mix", MaterialType::Intermediate);
        let materials = vec![water(), cement(), sand(), gravel(), mix.clone()];
        let rels: Vec<_> = materials[..4].iter().map(|m| feeds(m, &mix, 10.0)).collect();
        let graph = build_dependency_graph(&materials, &rels);

        assert_eq!(stage_level(&mix, &graph), 2.2);
    }

    #[test]
    fn depth_can_exceed_floor() {
        let cage = MaterialNode::new("cage", "Rebar Cage", MaterialType::Intermediate);
        let glazing = MaterialNode::new("glazing", "Window Unit", MaterialType::Intermediate);
        let materials = vec![cage.clone(), glazing.clone()];
        let rels = vec![feeds(&cage, &glazing, 1.0)];
        let graph = build_dependency_graph(&materials, &rels);

        // depth 1.5 beats the 1.4 window floor.
        assert_eq!(stage_level(&glazing, &graph), 1.5);
    }

    // -----------------------------------------------------------------------
    // Outputs and unknown types
    // -----------------------------------------------------------------------

    #[test]
    fn output_bands_assign_layers() {
        assert_eq!(level_alone(concrete_waste()), 4.2);
        assert_eq!(level_alone(floor_slab()), 3.2);
        let building = MaterialNode::new("b", "Completed Building", MaterialType::Output);
        assert_eq!(level_alone(building), 3.8);
        let landfill = MaterialNode::new("lf", "Landfill", MaterialType::Output);
        assert_eq!(level_alone(landfill), 4.8);
        let facade = MaterialNode::new("f", "Facade Panel", MaterialType::Output);
        assert_eq!(level_alone(facade), 3.0);
    }

    #[test]
    fn unknown_type_is_one_point_five() {
        let odd = MaterialNode::new("odd", "Recycled Waste Concrete", MaterialType::Unknown);
        let c = classify(&odd, &build_dependency_graph(&[odd.clone()], &[]));
        assert_eq!(c.layer, 1.5);
        assert_eq!(c.reason, StageReason::UnknownType);
    }
}
