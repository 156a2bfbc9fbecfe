//! `info_node` placement over bot navigation meshes
//!
//! Converts the areas of a resolved [`nav_mesh::NavMesh`] into a
//! deduplicated, deterministically ordered list of placement nodes.
//!
//! # Example
//!
//! ```rust,ignore
//! use nav_nodes::{generate, nodes_to_text, BuildFlags, NodeBuildConfig};
//!
//! let config = NodeBuildConfig::default().with_build_flags("ac".parse()?);
//! let nodes = generate(&mesh, &config)?;
//! std::fs::write("de_dust2.ent", nodes_to_text(&mesh, &nodes))?;
//! ```
//!
//! # Build modes
//!
//! - `a`: three points around the portal of every connected area pair
//! - `b`: both ends of every encounter path
//! - `c`: a sample grid inside every area, at least its center
//!
//! Candidates whose hulls overlap are merged; see [`NodeRegistry`].

mod build_flags;
mod config;
mod generator;
mod info_node;
mod node_registry;


pub use build_flags::{BuildFlags, BuildMode};
pub use config::{
    NodeBuildConfig, AREA_INSIDE_SIZE, CONNECTION_FLANK_DISTANCE, ENTITY_HULL_DEFAULT_MAX,
    ENTITY_HULL_DEFAULT_MIN, ENTITY_OFFSET_Z_ADD,
};
pub use generator::{generate, is_ignorable, NodeGenerator, MAX_INTERIOR_SAMPLES};
pub use info_node::{
    is_generated_entity, AreaRef, InfoNode, INFO_NODE_CLASSNAME, NETNAME_PREFIX, PLACE_MERGED,
    PLACE_UNDEFINED,
};
pub use node_registry::NodeRegistry;

use bsp_entities::{serialize_entities, Entity};
use nav_mesh::NavMesh;

/// Entity blocks of `nodes`, in order
pub fn nodes_to_entities(mesh: &NavMesh, nodes: &[InfoNode]) -> Vec<Entity> {
    nodes.iter().map(|node| node.to_entity(mesh)).collect()
}

/// Entity text of `nodes`
pub fn nodes_to_text(mesh: &NavMesh, nodes: &[InfoNode]) -> String {
    serialize_entities(&nodes_to_entities(mesh, nodes))
}
