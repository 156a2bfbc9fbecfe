//! Entities of GoldSrc BSP maps
//!
//! Reads the text entities lump out of a version 30 `.bsp` file and converts
//! between entity text and ordered key/value blocks.

mod bsp;
mod ent;

pub use bsp::{
    load_entities, read_entities_text, read_lump, BspHeader, Lump, LumpType, BSP_VERSION,
    HEADER_LUMPS,
};
pub use ent::{parse_entities, serialize_entities, Entity};
