//! Bot navigation meshes of CS 1.6 and Condition Zero
//!
//! This crate reads the binary `.nav` files written by the bot navigation
//! generator, rebuilds the references between areas and indexes the areas
//! spatially.
//!
//! # Example
//!
//! ```rust,ignore
//! use nav_mesh::NavMesh;
//!
//! let mut mesh = NavMesh::load("de_dust2.nav")?;
//! let report = mesh.resolve();
//! if !report.is_ok() {
//!     println!("{} corrupt references", report.issues.len());
//! }
//!
//! let grid = mesh.build_grid();
//! let area = grid.query(&glam::Vec3::new(100.0, 200.0, 64.0));
//! ```
//!
//! # Architecture
//!
//! - [`binary_format`]: decodes the file into raw records, nothing resolved
//! - [`NavMesh::resolve`]: turns stored ids into indices, derives encounter
//!   paths and reports corruption
//! - [`AreaGrid`]: uniform grid for point location and lookup by id

mod area_grid;
pub mod binary_format;
mod hiding_spot;
mod nav_area;
mod nav_mesh;
mod resolver;
mod status;

#[cfg(test)]
mod test_mesh_helpers;

#[cfg(test)]
mod nav_decode_tests;

pub use area_grid::{AreaGrid, AreaHandle, DEFAULT_BENEATH_LIMIT, GRID_CELL_SIZE};
pub use binary_format::{load_nav_mesh_from_binary, read_nav_mesh, NavHeader, NAV_MAGIC, NAV_MAX_VERSION};
pub use hiding_spot::HidingSpotTable;
pub use nav_area::{
    ApproachConnect, ApproachInfo, AreaAttributes, AreaId, Direction, EncounterEndpoint,
    EncounterPath, EncounterSpot, HidingSpot, HidingSpotFlags, HidingSpotRecord,
    LegacyEncounterPath, LegacySpot, NavArea, NavConnect, Place, Ray, SpotOrder, TraverseType,
    NUM_DIRECTIONS,
};
pub use nav_mesh::NavMesh;
pub use resolver::{ApproachSlot, Corruption, EncounterEnd, ResolveReport};
pub use status::NavStatus;

/// Maximum height difference a walking player can step up
pub const STEP_HEIGHT: f32 = 18.0;

/// Half the height of a standing player, the eye height above the floor
pub const HUMAN_HEIGHT_HALF: f32 = 36.0;
