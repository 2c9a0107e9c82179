//! Core types for Dusk: the level data model and its spatial index.
//!
//! This crate knows nothing about entities or time. It answers "which sector
//! is this point in", "which lines could this box touch" and "can sector A
//! see sector B" for a loaded [`MapData`]. A map can be decoded from JSON or
//! assembled with [`RowMapBuilder`].

/// Uniform-grid broad-phase over linedefs.
pub mod blockmap;
/// Programmatic row-of-rooms map construction.
pub mod builder;
/// Error types used throughout the crate.
pub mod error;
/// Planar geometry helpers.
pub mod geometry;
/// BSP point location and per-level lookup structures.
pub mod index;
/// Level records: vertices, lines, sectors, BSP and spawn data.
pub mod map;
/// Sector-to-sector visibility table.
pub mod reject;

/// Re-export the spatial index.
pub use blockmap::{BLOCK_SIZE, Blockmap};
/// Re-export the map builder.
pub use builder::{Room, RowMapBuilder};
/// Re-export error types.
pub use error::{MapError, MapResult};
/// Re-export geometry primitives.
pub use geometry::{Aabb, Side};
/// Re-export index types.
pub use index::{MapIndex, Opening, SectorHeights};
/// Re-export level records.
pub use map::{
    Linedef, LinedefFlags, MapData, Node, NodeChild, Sector, Seg, Sidedef, Subsector, ThingSpawn,
    Vertex,
};
/// Re-export the reject table.
pub use reject::Reject;
