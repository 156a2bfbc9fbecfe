//! Lookup table of hiding spots by id
//!
//! The table is filled by the decoder while it reads area records and is
//! consulted by the resolver to validate encounter spot orders. It belongs to
//! a single decode session; a new [`crate::NavMesh`] always starts with an
//! empty table.

use std::collections::HashMap;

use crate::nav_area::HidingSpot;

/// Hiding spots of one decoded mesh, keyed by id
#[derive(Debug, Clone, Default)]
pub struct HidingSpotTable {
    spots: HashMap<u32, HidingSpot>,
    registered: usize,
}

impl HidingSpotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a decoded spot. The first spot registered under an id wins.
    pub fn register(&mut self, spot: HidingSpot) {
        self.registered += 1;
        self.spots.entry(spot.id).or_insert(spot);
    }

    /// Given a hiding spot id, return the associated spot
    pub fn get(&self, id: u32) -> Option<&HidingSpot> {
        self.spots.get(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.spots.contains_key(&id)
    }

    /// Number of distinct ids
    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    /// Number of spots registered, duplicates included
    pub fn registered_count(&self) -> usize {
        self.registered
    }
}
