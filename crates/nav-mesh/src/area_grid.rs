//! Uniform grid over navigation areas for point-location queries
//!
//! Every cell of the grid lists the areas whose extent overlaps it, so a
//! position query only tests the handful of areas stored in one cell. A
//! small chained hash table keyed on the low byte of the area id provides
//! lookup by id and constant time unlinking of an inserted area.

use glam::Vec3;

use super::nav_area::{AreaId, NavArea};

/// Default edge length of a grid cell (in world units)
pub const GRID_CELL_SIZE: f32 = 300.0;

/// Default distance a floor may sit below the query point
pub const DEFAULT_BENEATH_LIMIT: f32 = 120.0;

/// Number of buckets in the id hash table
const HASH_TABLE_SIZE: usize = 256;

/// Upper bound on the number of cells along either axis
const MAX_GRID_DIM: usize = 1024;

/// Height the query point is raised by before testing containment
const QUERY_RAISE: f32 = 5.0;

/// Handle returned by [`AreaGrid::insert`], used to remove the area again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AreaHandle(usize);

/// Hash chain entry for one inserted area
#[derive(Debug, Clone, Copy)]
struct GridEntry {
    /// Index of the area in the backing slice
    area: usize,
    id: AreaId,
    prev: Option<usize>,
    next: Option<usize>,
}

#[inline]
fn hash_key(id: AreaId) -> usize {
    (id & 0xFF) as usize
}

/// Spatial index over a slice of navigation areas
#[derive(Debug, Clone)]
pub struct AreaGrid<'a> {
    areas: &'a [NavArea],
    cell_size: f32,
    min_x: f32,
    min_y: f32,
    size_x: usize,
    size_y: usize,
    /// Area indices per cell, row-major
    cells: Vec<Vec<usize>>,
    /// Slab of hash chain entries, `None` once removed
    entries: Vec<Option<GridEntry>>,
    buckets: [Option<usize>; HASH_TABLE_SIZE],
    area_count: usize,
}

impl<'a> AreaGrid<'a> {
    /// Builds a grid over `areas` with the default cell size
    pub fn build(areas: &'a [NavArea]) -> Self {
        Self::with_cell_size(areas, GRID_CELL_SIZE)
    }

    /// Builds a grid over `areas` using the given cell size
    pub fn with_cell_size(areas: &'a [NavArea], cell_size: f32) -> Self {
        let mut grid = Self {
            areas,
            cell_size: if cell_size > 0.0 { cell_size } else { GRID_CELL_SIZE },
            min_x: 0.0,
            min_y: 0.0,
            size_x: 0,
            size_y: 0,
            cells: Vec::new(),
            entries: Vec::new(),
            buckets: [None; HASH_TABLE_SIZE],
            area_count: 0,
        };

        if areas.is_empty() {
            return grid;
        }

        // union of all extents, each axis on its own
        let mut lo = Vec3::splat(f32::MAX);
        let mut hi = Vec3::splat(f32::MIN);
        for area in areas {
            if !area.is_bounded() {
                log::warn!("Navigation area #{} is outside the world, not indexed", area.id);
                continue;
            }
            if area.is_degenerate() {
                log::warn!(
                    "Degenerate navigation area #{} at {}",
                    area.id,
                    area.extent.center()
                );
            }
            let ext = &area.extent;
            lo.x = lo.x.min(ext.lo.x);
            lo.y = lo.y.min(ext.lo.y);
            hi.x = hi.x.max(ext.hi.x);
            hi.y = hi.y.max(ext.hi.y);
        }

        if lo.x > hi.x || lo.y > hi.y {
            return grid;
        }

        grid.allocate(lo.x, hi.x, lo.y, hi.y);
        for index in 0..areas.len() {
            grid.insert(index);
        }

        log::debug!(
            "Area grid: {}x{} cells of {} units, {} areas",
            grid.size_x,
            grid.size_y,
            grid.cell_size,
            grid.area_count
        );

        grid
    }

    fn allocate(&mut self, min_x: f32, max_x: f32, min_y: f32, max_y: f32) {
        let span_x = max_x - min_x;
        let span_y = max_y - min_y;

        // coarsen the cells rather than exceed the dimension cap
        let max_cells = (MAX_GRID_DIM - 1) as f32;
        self.cell_size = self
            .cell_size
            .max(span_x / max_cells)
            .max(span_y / max_cells);

        self.min_x = min_x;
        self.min_y = min_y;
        self.size_x = ((span_x / self.cell_size) as usize).min(MAX_GRID_DIM - 1) + 1;
        self.size_y = ((span_y / self.cell_size) as usize).min(MAX_GRID_DIM - 1) + 1;
        self.cells = vec![Vec::new(); self.size_x * self.size_y];
    }

    /// Grid dimensions in cells (x, y)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.size_x, self.size_y)
    }

    /// Number of areas currently in the grid
    pub fn area_count(&self) -> usize {
        self.area_count
    }

    /// Converts a world X coordinate into a valid column
    pub fn world_to_grid_x(&self, wx: f32) -> usize {
        Self::to_cell(wx, self.min_x, self.cell_size, self.size_x)
    }

    /// Converts a world Y coordinate into a valid row
    pub fn world_to_grid_y(&self, wy: f32) -> usize {
        Self::to_cell(wy, self.min_y, self.cell_size, self.size_y)
    }

    fn to_cell(w: f32, min: f32, cell_size: f32, size: usize) -> usize {
        // truncation toward zero, then clamp into the grid
        let c = ((w - min) / cell_size) as i64;
        c.clamp(0, size.saturating_sub(1) as i64) as usize
    }

    /// Cell range (lo_x, lo_y, hi_x, hi_y) covered by an area's extent
    fn cell_range(&self, area: &NavArea) -> (usize, usize, usize, usize) {
        let ext = &area.extent;
        (
            self.world_to_grid_x(ext.lo.x),
            self.world_to_grid_y(ext.lo.y),
            self.world_to_grid_x(ext.hi.x),
            self.world_to_grid_y(ext.hi.y),
        )
    }

    /// Adds the area at `index` of the backing slice to the grid.
    ///
    /// Returns `None` if the index is out of range, the area's extent is
    /// not bounded, or the grid has no cells.
    pub fn insert(&mut self, index: usize) -> Option<AreaHandle> {
        let areas = self.areas;
        let area = areas.get(index)?;
        if self.cells.is_empty() || !area.is_bounded() {
            return None;
        }

        let (lo_x, lo_y, hi_x, hi_y) = self.cell_range(area);
        for y in lo_y..=hi_y {
            for x in lo_x..=hi_x {
                self.cells[x + y * self.size_x].push(index);
            }
        }

        // add to the head of the bucket chain
        let slot = self.entries.len();
        let key = hash_key(area.id);
        let head = self.buckets[key];
        if let Some(head) = head {
            if let Some(entry) = self.entries[head].as_mut() {
                entry.prev = Some(slot);
            }
        }
        self.entries.push(Some(GridEntry {
            area: index,
            id: area.id,
            prev: None,
            next: head,
        }));
        self.buckets[key] = Some(slot);
        self.area_count += 1;

        Some(AreaHandle(slot))
    }

    /// Removes a previously inserted area. Returns false for stale handles.
    pub fn remove(&mut self, handle: AreaHandle) -> bool {
        let entry = match self.entries.get_mut(handle.0).and_then(Option::take) {
            Some(entry) => entry,
            None => return false,
        };

        let areas = self.areas;
        let (lo_x, lo_y, hi_x, hi_y) = self.cell_range(&areas[entry.area]);
        for y in lo_y..=hi_y {
            for x in lo_x..=hi_x {
                let cell = &mut self.cells[x + y * self.size_x];
                if let Some(pos) = cell.iter().position(|&i| i == entry.area) {
                    cell.remove(pos);
                }
            }
        }

        // unlink from the bucket chain
        match entry.prev {
            Some(prev) => {
                if let Some(p) = self.entries[prev].as_mut() {
                    p.next = entry.next;
                }
            }
            None => self.buckets[hash_key(entry.id)] = entry.next,
        }
        if let Some(next) = entry.next {
            if let Some(n) = self.entries[next].as_mut() {
                n.prev = entry.prev;
            }
        }

        self.area_count -= 1;
        true
    }

    /// Removes the area with the same id as `area`, if present
    pub fn remove_area(&mut self, area: &NavArea) -> bool {
        match self.handle_of(area.id) {
            Some(handle) => self.remove(handle),
            None => false,
        }
    }

    fn handle_of(&self, id: AreaId) -> Option<AreaHandle> {
        if id == 0 {
            return None;
        }

        let mut cursor = self.buckets[hash_key(id)];
        while let Some(slot) = cursor {
            let entry = self.entries[slot].as_ref()?;
            if entry.id == id {
                return Some(AreaHandle(slot));
            }
            cursor = entry.next;
        }
        None
    }

    /// Given an id, return the associated area. Id 0 never resolves.
    pub fn lookup_by_id(&self, id: AreaId) -> Option<&'a NavArea> {
        let handle = self.handle_of(id)?;
        let entry = self.entries[handle.0].as_ref()?;
        self.areas.get(entry.area)
    }

    /// Area containing `pos` whose surface is immediately beneath it
    pub fn query(&self, pos: &Vec3) -> Option<&'a NavArea> {
        self.query_with_limit(pos, DEFAULT_BENEATH_LIMIT)
    }

    /// Like [`AreaGrid::query`], with an explicit beneath tolerance
    pub fn query_with_limit(&self, pos: &Vec3, beneath_limit: f32) -> Option<&'a NavArea> {
        if self.cells.is_empty() {
            return None;
        }

        let x = self.world_to_grid_x(pos.x);
        let y = self.world_to_grid_y(pos.y);
        let test = Vec3::new(pos.x, pos.y, pos.z + QUERY_RAISE);

        let mut best: Option<&'a NavArea> = None;
        let mut best_z = f32::MIN;
        for &index in &self.cells[x + y * self.size_x] {
            let area = &self.areas[index];
            if !area.is_overlapping(&test) {
                continue;
            }

            let z = area.get_z(&test);
            // above us
            if z > test.z {
                continue;
            }
            // too far below us
            if z < pos.z - beneath_limit {
                continue;
            }

            if z > best_z {
                best = Some(area);
                best_z = z;
            }
        }
        best
    }
}
