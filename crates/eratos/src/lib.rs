#![forbid(unsafe_code)]

//! `eratos` is a headless editing engine for SDF schema documents.
//!
//! The core (always available) covers the document model, structural edits, normalization,
//! patches and undo/redo. See [`Editor`] for the command surface.
//!
//! # Features
//!
//! - `render`: enable projection, edge visibility and region layout (`eratos::render`)

pub use eratos_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use eratos_render::geom;
    pub use eratos_render::layout::packing;
    pub use eratos_render::{
        Category, EdgeData, EdgeKind, Handle, LayoutEngine, NodeDetail, NodeSizes, Partition,
        PlacedNode, PositionedGraph, Region, RegionKind, RoleSlot, UiState, UiStates, VisualEdge,
        VisualGraph, VisualNode, Warning, edge_visible, project, resolve, sizes_from_json,
    };

    mod session;

    pub use session::Session;

    #[derive(Debug, thiserror::Error)]
    pub enum SessionError {
        #[error(transparent)]
        Core(#[from] eratos_core::Error),
        #[error(transparent)]
        Render(#[from] eratos_render::Error),
    }

    pub type Result<T> = std::result::Result<T, SessionError>;
}
