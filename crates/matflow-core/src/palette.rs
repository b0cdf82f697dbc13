//! Layer to legend lookup: display color and human-readable stage name.
//!
//! Bands are ordered thresholds covering the whole real line, so both
//! lookups are total. The thresholds line up with the layers produced by
//! [`crate::stage`]: inputs land in the first two bands, intermediates in
//! the processing bands, and outputs in the last three.

use serde::{Deserialize, Serialize};

/// A contiguous range of layers sharing a color and a stage name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StageBand {
    /// `layer <= 0.5`
    PrimaryInputs,
    /// `0.5 < layer < 1`
    RecycledInputs,
    /// `1 <= layer < 2`
    EarlyProcessing,
    /// `2 <= layer < 3`
    MainProcessing,
    /// `3 <= layer < 3.5`
    Products,
    /// `3.5 <= layer < 4.5`
    WasteStreams,
    /// `layer >= 4.5`, and anything that compares false (NaN).
    FinalDisposal,
}

impl StageBand {
    /// All bands, left to right.
    pub const ALL: [StageBand; 7] = [
        StageBand::PrimaryInputs,
        StageBand::RecycledInputs,
        StageBand::EarlyProcessing,
        StageBand::MainProcessing,
        StageBand::Products,
        StageBand::WasteStreams,
        StageBand::FinalDisposal,
    ];

    /// The band containing `stage`.
    pub fn from_stage(stage: f64) -> Self {
        if stage <= 0.5 {
            StageBand::PrimaryInputs
        } else if stage < 1.0 {
            StageBand::RecycledInputs
        } else if stage < 2.0 {
            StageBand::EarlyProcessing
        } else if stage < 3.0 {
            StageBand::MainProcessing
        } else if stage < 3.5 {
            StageBand::Products
        } else if stage < 4.5 {
            StageBand::WasteStreams
        } else {
            StageBand::FinalDisposal
        }
    }

    /// Hex display color.
    pub fn color(self) -> &'static str {
        match self {
            StageBand::PrimaryInputs => "#1e40af",
            StageBand::RecycledInputs => "#3b82f6",
            StageBand::EarlyProcessing => "#8b5cf6",
            StageBand::MainProcessing => "#ef4444",
            StageBand::Products => "#10b981",
            StageBand::WasteStreams => "#f59e0b",
            StageBand::FinalDisposal => "#991b1b",
        }
    }

    /// Legend label.
    pub fn name(self) -> &'static str {
        match self {
            StageBand::PrimaryInputs => "Primary Material Inputs",
            StageBand::RecycledInputs => "Recycled Material Inputs",
            StageBand::EarlyProcessing => "Early Processing",
            StageBand::MainProcessing => "Main Processing",
            StageBand::Products => "Products & Components",
            StageBand::WasteStreams => "Waste Streams",
            StageBand::FinalDisposal => "Final Disposal & Environment",
        }
    }
}

/// Display color for a layer.
pub fn stage_color(stage: f64) -> &'static str {
    StageBand::from_stage(stage).color()
}

/// Stage name for a layer.
pub fn stage_name(stage: f64) -> &'static str {
    StageBand::from_stage(stage).name()
}
