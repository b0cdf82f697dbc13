pub mod export;
pub mod loader;
pub mod schema;

pub use export::{to_json_payload, write_layout_json};
pub use loader::{DataLoadError, DanglingRelationship, FlowData, load_flow_data};
