#![forbid(unsafe_code)]

//! Visual projection and layout for SDF schema documents.
//!
//! The pipeline is `project` (document to visual graph), `visibility` (per-edge display rules
//! over per-node UI state) and `layout` (region placement). Node sizes are measured by the
//! caller and passed in.

pub mod geom;
pub mod layout;
pub mod model;
pub mod project;
pub mod visibility;

pub use layout::{
    LayoutEngine, NodeSizes, PlacedNode, PositionedGraph, Region, RegionKind, StructuralHash,
};
pub use model::{
    Category, EdgeData, EdgeKind, Handle, NodeDetail, Partition, RoleSlot, SlotFiller,
    VisualEdge, VisualGraph, VisualNode, Warning,
};
pub use project::{PREDICTION_THRESHOLD, project};
pub use visibility::{UiState, UiStates, edge_visible, resolve};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid visual model: {message}")]
    InvalidModel { message: String },
    #[error("size for unknown node {id}")]
    UnknownNode { id: String },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Parses measured sizes given as `{"id": {"width": w, "height": h}}`.
pub fn sizes_from_json(text: &str) -> Result<NodeSizes> {
    #[derive(serde::Deserialize)]
    struct Measured {
        width: f64,
        height: f64,
    }
    let raw: std::collections::BTreeMap<String, Measured> = serde_json::from_str(text)?;
    let mut out = NodeSizes::default();
    for (id, m) in raw {
        if !(m.width.is_finite() && m.height.is_finite()) || m.width < 0.0 || m.height < 0.0 {
            return Err(Error::InvalidModel {
                message: format!("size of {id} must be finite and non-negative"),
            });
        }
        out.insert(id, geom::size(m.width, m.height));
    }
    Ok(out)
}

/// Serializes any visual output as pretty JSON.
pub fn to_json_pretty<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
