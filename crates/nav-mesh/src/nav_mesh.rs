//! Navigation mesh container
//!
//! The mesh owns every area in file order. Areas refer to each other by
//! index into [`NavMesh::areas`]; the id -> index map is built by the
//! resolver.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::area_grid::AreaGrid;
use super::binary_format::{load_nav_mesh_from_binary, NavHeader, NAV_MAGIC};
use super::hiding_spot::HidingSpotTable;
use super::nav_area::{AreaId, NavArea, Place};
use super::resolver::{self, ResolveReport};
use nav_common::{Error, Result};

/// A decoded navigation mesh
#[derive(Debug, Clone)]
pub struct NavMesh {
    pub(crate) header: NavHeader,
    pub(crate) places: Vec<Place>,
    pub(crate) areas: Vec<NavArea>,
    pub(crate) hiding_spots: HidingSpotTable,
    pub(crate) area_index: HashMap<AreaId, usize>,
    pub(crate) resolved: bool,
}

impl NavMesh {
    pub(crate) fn from_parts(
        header: NavHeader,
        places: Vec<Place>,
        areas: Vec<NavArea>,
        hiding_spots: HidingSpotTable,
    ) -> Self {
        Self {
            header,
            places,
            areas,
            hiding_spots,
            area_index: HashMap::new(),
            resolved: false,
        }
    }

    /// Builds an unresolved mesh from areas assembled in memory.
    ///
    /// Hiding spots carried by the areas are registered the same way the
    /// decoder registers them.
    pub fn from_areas(version: u32, places: Vec<Place>, areas: Vec<NavArea>) -> Self {
        let mut hiding_spots = HidingSpotTable::new();
        for area in &areas {
            for record in &area.hiding_spots {
                if let super::nav_area::HidingSpotRecord::Spot(spot) = record {
                    hiding_spots.register(*spot);
                }
            }
        }

        let header = NavHeader {
            magic: NAV_MAGIC,
            version,
            bsp_size: None,
        };
        Self::from_parts(header, places, areas, hiding_spots)
    }

    /// Reads and decodes a `.nav` file. The mesh is not resolved.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path)?;
        load_nav_mesh_from_binary(&data)
    }

    /// Reads, decodes and resolves a `.nav` file, failing on any corruption
    pub fn load_strict<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut mesh = Self::load(path)?;
        let report = mesh.resolve();
        if let Some(first) = report.issues.first() {
            return Err(Error::CorruptData(format!(
                "{} ({} issue(s) in total)",
                first,
                report.issues.len()
            )));
        }
        Ok(mesh)
    }

    /// Converts stored ids into indices and computes encounter paths.
    ///
    /// Never fails: every unresolved reference is logged and collected in
    /// the returned report, and processing continues.
    pub fn resolve(&mut self) -> ResolveReport {
        let report = resolver::resolve(self);
        self.resolved = true;
        report
    }

    /// True once [`NavMesh::resolve`] has run
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn header(&self) -> &NavHeader {
        &self.header
    }

    pub fn version(&self) -> u32 {
        self.header.version
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn areas(&self) -> &[NavArea] {
        &self.areas
    }

    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    pub fn area(&self, index: usize) -> Option<&NavArea> {
        self.areas.get(index)
    }

    pub fn hiding_spots(&self) -> &HidingSpotTable {
        &self.hiding_spots
    }

    /// Index of the area with the given id (resolved meshes only)
    pub fn index_of(&self, id: AreaId) -> Option<usize> {
        if id == 0 {
            return None;
        }
        self.area_index.get(&id).copied()
    }

    /// Given an id, return the associated area (resolved meshes only)
    pub fn area_by_id(&self, id: AreaId) -> Option<&NavArea> {
        self.index_of(id).map(|index| &self.areas[index])
    }

    /// Place of an area, if it has a valid one
    pub fn place_of(&self, area: &NavArea) -> Option<&Place> {
        if area.is_undefined_place() {
            return None;
        }
        self.places.get(area.place as usize - 1)
    }

    /// Builds a spatial index over every area of this mesh
    pub fn build_grid(&self) -> AreaGrid<'_> {
        AreaGrid::build(&self.areas)
    }
}
