//! Layout payload export in the renderer's camelCase JSON schema.

use matflow_core::layout::LayoutResult;
use std::path::Path;

use crate::loader::DataLoadError;

/// Serialize a layout as pretty-printed JSON.
pub fn to_json_payload(result: &LayoutResult) -> Result<String, DataLoadError> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Write a layout as JSON to `path`, replacing any existing file.
pub fn write_layout_json(path: &Path, result: &LayoutResult) -> Result<(), DataLoadError> {
    let payload = to_json_payload(result)?;
    std::fs::write(path, payload)?;
    Ok(())
}
