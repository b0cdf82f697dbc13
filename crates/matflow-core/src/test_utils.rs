//! Shared test helpers for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`. Material
//! constructors use short, stable uuids so assertions can name them directly.

use crate::material::{MaterialNode, MaterialRef, MaterialRelationship, MaterialType, Predicate};

// ===========================================================================
// Relationship constructors
// ===========================================================================

/// `from IS_INPUT_OF to`, quantity in kg, no process name.
pub fn feeds(from: &MaterialNode, to: &MaterialNode, quantity: f64) -> MaterialRelationship {
    MaterialRelationship::new(Predicate::IsInputOf, MaterialRef::from(from), MaterialRef::from(to))
        .with_quantity(quantity, "kg")
}

/// `product IS_OUTPUT_OF producer`, quantity in kg, no process name.
pub fn produced_by(
    product: &MaterialNode,
    producer: &MaterialNode,
    quantity: f64,
) -> MaterialRelationship {
    MaterialRelationship::new(
        Predicate::IsOutputOf,
        MaterialRef::from(product),
        MaterialRef::from(producer),
    )
    .with_quantity(quantity, "kg")
}

// ===========================================================================
// Inputs
// ===========================================================================

pub fn water() -> MaterialNode {
    MaterialNode::new("water", "Water", MaterialType::Input)
        .with_category("Raw")
        .with_color("#60a5fa")
}
pub fn cement() -> MaterialNode {
    MaterialNode::new("cement", "Portland Cement", MaterialType::Input).with_category("Raw")
}
pub fn sand() -> MaterialNode {
    MaterialNode::new("sand", "Sand", MaterialType::Input).with_category("Raw")
}
pub fn gravel() -> MaterialNode {
    MaterialNode::new("gravel", "Gravel", MaterialType::Input).with_category("Raw")
}
pub fn steel_rebar() -> MaterialNode {
    MaterialNode::new("rebar", "Steel Rebar", MaterialType::Input).with_category("Metal")
}
pub fn float_glass() -> MaterialNode {
    MaterialNode::new("glass", "Float Glass", MaterialType::Input).with_category("Glass")
}
pub fn recycled_aggregate() -> MaterialNode {
    MaterialNode::new("rca", "Recycled Concrete Aggregate", MaterialType::Input)
        .with_category("Recycled")
}
pub fn reclaimed_timber() -> MaterialNode {
    MaterialNode::new("timber", "Reclaimed Timber", MaterialType::Input).with_category("Recycled")
}

// ===========================================================================
// Intermediates
// ===========================================================================

pub fn ready_mix_concrete() -> MaterialNode {
    MaterialNode::new("ready-mix", "Ready-Mix Concrete", MaterialType::Intermediate)
        .with_category("Concrete")
}
pub fn reinforced_concrete() -> MaterialNode {
    MaterialNode::new("rc", "Reinforced Concrete", MaterialType::Intermediate)
        .with_category("Concrete")
}
pub fn window_unit() -> MaterialNode {
    MaterialNode::new("window", "Window Unit", MaterialType::Intermediate).with_category("Glazing")
}
pub fn precast_stairs() -> MaterialNode {
    MaterialNode::new("stairs", "Precast Stairs", MaterialType::Intermediate)
        .with_category("Concrete")
}
pub fn lift_car() -> MaterialNode {
    MaterialNode::new("lift", "Lift Car", MaterialType::Intermediate).with_category("Mechanical")
}
pub fn mortar() -> MaterialNode {
    MaterialNode::new("mortar", "Mortar", MaterialType::Intermediate).with_category("Binder")
}

// ===========================================================================
// Outputs
// ===========================================================================

pub fn foundation() -> MaterialNode {
    MaterialNode::new("foundation", "Foundation", MaterialType::Output).with_category("Structure")
}
pub fn floor_slab() -> MaterialNode {
    MaterialNode::new("slab", "Floor Slab", MaterialType::Output).with_category("Structure")
}
pub fn completed_building() -> MaterialNode {
    MaterialNode::new("building", "Completed Building", MaterialType::Output)
        .with_category("Product")
}
pub fn concrete_waste() -> MaterialNode {
    MaterialNode::new("concrete-waste", "Concrete Waste", MaterialType::Output)
        .with_category("Waste")
}
pub fn construction_debris() -> MaterialNode {
    MaterialNode::new("debris", "Construction Debris", MaterialType::Output).with_category("Waste")
}
pub fn landfill() -> MaterialNode {
    MaterialNode::new("landfill", "Landfill", MaterialType::Output).with_category("Disposal")
}
pub fn co2_emissions() -> MaterialNode {
    MaterialNode::new("co2", "CO2 Emissions", MaterialType::Output).with_category("Environment")
}

// ===========================================================================
// Datasets
// ===========================================================================

/// Water feeding concrete (180 kg) and concrete waste recycled into
/// aggregate (100 kg). The recycling edge runs right to left.
pub fn concrete_recycling_loop() -> (Vec<MaterialNode>, Vec<MaterialRelationship>) {
    let materials = vec![
        water(),
        ready_mix_concrete(),
        concrete_waste(),
        recycled_aggregate(),
    ];
    let relationships = vec![
        feeds(&water(), &ready_mix_concrete(), 180.0),
        feeds(&concrete_waste(), &recycled_aggregate(), 100.0).with_process("Concrete Recycling"),
    ];
    (materials, relationships)
}

/// The reference construction-materials dataset: every material above.
pub fn reference_materials() -> Vec<MaterialNode> {
    vec![
        water(),
        cement(),
        sand(),
        gravel(),
        steel_rebar(),
        float_glass(),
        recycled_aggregate(),
        reclaimed_timber(),
        ready_mix_concrete(),
        reinforced_concrete(),
        window_unit(),
        precast_stairs(),
        lift_car(),
        mortar(),
        foundation(),
        floor_slab(),
        completed_building(),
        concrete_waste(),
        construction_debris(),
        landfill(),
        co2_emissions(),
    ]
}

/// Relationships for [`reference_materials`], mixing both predicates and
/// including two recycling loops.
pub fn reference_relationships() -> Vec<MaterialRelationship> {
    vec![
        feeds(&water(), &ready_mix_concrete(), 180.0).with_process("Batching"),
        feeds(&cement(), &ready_mix_concrete(), 320.0).with_process("Batching"),
        feeds(&sand(), &ready_mix_concrete(), 700.0).with_process("Batching"),
        feeds(&gravel(), &ready_mix_concrete(), 1100.0).with_process("Batching"),
        feeds(&recycled_aggregate(), &ready_mix_concrete(), 150.0).with_process("Batching"),
        feeds(&ready_mix_concrete(), &reinforced_concrete(), 2000.0).with_process("Casting"),
        feeds(&steel_rebar(), &reinforced_concrete(), 120.0).with_process("Casting"),
        feeds(&float_glass(), &window_unit(), 30.0).with_process("Glazing"),
        feeds(&ready_mix_concrete(), &precast_stairs(), 200.0).with_process("Precasting"),
        feeds(&steel_rebar(), &lift_car(), 15.0).with_process("Fabrication"),
        feeds(&sand(), &mortar(), 50.0).with_process("Mixing"),
        feeds(&cement(), &mortar(), 20.0).with_process("Mixing"),
        feeds(&reinforced_concrete(), &foundation(), 900.0).with_process("Pouring"),
        produced_by(&floor_slab(), &reinforced_concrete(), 800.0).with_process("Pouring"),
        feeds(&foundation(), &completed_building(), 900.0).with_process("Assembly"),
        feeds(&window_unit(), &completed_building(), 30.0).with_process("Assembly"),
        feeds(&precast_stairs(), &completed_building(), 200.0).with_process("Assembly"),
        feeds(&lift_car(), &completed_building(), 15.0).with_process("Assembly"),
        feeds(&mortar(), &completed_building(), 70.0).with_process("Assembly"),
        feeds(&reclaimed_timber(), &completed_building(), 25.0).with_process("Assembly"),
        produced_by(&concrete_waste(), &ready_mix_concrete(), 60.0).with_process("Site Waste"),
        feeds(&construction_debris(), &landfill(), 40.0).with_process("Disposal"),
        feeds(&completed_building(), &co2_emissions(), 10.0).with_process("Embodied Carbon"),
        feeds(&concrete_waste(), &recycled_aggregate(), 55.0).with_process("Concrete Recycling"),
        feeds(&construction_debris(), &reclaimed_timber(), 12.0).with_process("Timber Reclaim"),
    ]
}

/// A layered synthetic flow for benchmarks: `width` parallel chains of
/// input -> intermediate -> intermediate -> output, plus a waste edge from
/// every output back to the chain's input.
pub fn synthetic_flow(width: usize) -> (Vec<MaterialNode>, Vec<MaterialRelationship>) {
    let mut materials = Vec::with_capacity(width * 4);
    let mut relationships = Vec::with_capacity(width * 4);

    for i in 0..width {
        let raw = MaterialNode::new(format!("raw-{i}"), format!("Aggregate {i}"), MaterialType::Input);
        let mix = MaterialNode::new(format!("mix-{i}"), format!("Concrete Mix {i}"), MaterialType::Intermediate);
        let part = MaterialNode::new(format!("part-{i}"), format!("Precast Part {i}"), MaterialType::Intermediate);
        let out = MaterialNode::new(format!("out-{i}"), format!("Wall Panel {i}"), MaterialType::Output);

        relationships.push(feeds(&raw, &mix, 100.0));
        relationships.push(feeds(&mix, &part, 90.0));
        relationships.push(feeds(&part, &out, 80.0));
        relationships.push(feeds(&out, &raw, 5.0).with_process("Recycling"));

        materials.extend([raw, mix, part, out]);
    }

    (materials, relationships)
}
