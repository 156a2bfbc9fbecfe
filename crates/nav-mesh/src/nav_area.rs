//! Navigation area records
//!
//! A navigation area is an axis-aligned rectangle in X/Y with elevations at
//! its four corners. Areas reference each other, their hiding spots and the
//! place directory through integer ids; the resolver turns those ids into
//! indices into the owning mesh's area list.

use glam::Vec3;
use nav_common::Extent;

/// Unique identifier of a navigation area (0 is never a valid area)
pub type AreaId = u32;

/// Number of cardinal directions
pub const NUM_DIRECTIONS: usize = 4;

/// Cardinal direction of an area connection. North is -Y, east is +X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
#[repr(u8)]
pub enum Direction {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Direction {
    /// All directions in storage order
    pub const ALL: [Direction; NUM_DIRECTIONS] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Converts a stored direction byte
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Direction::North),
            1 => Some(Direction::East),
            2 => Some(Direction::South),
            3 => Some(Direction::West),
            _ => None,
        }
    }

    /// Index of this direction into per-direction arrays
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// True for directions whose portals run along the X axis
    #[inline]
    pub fn is_north_south(self) -> bool {
        matches!(self, Direction::North | Direction::South)
    }
}

/// How a bot moves from one area to the next along an approach path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
#[repr(u8)]
pub enum TraverseType {
    GoNorth = 0,
    GoEast = 1,
    GoSouth = 2,
    GoWest = 3,
    GoLadderUp = 4,
    GoLadderDown = 5,
    GoJump = 6,
}

impl TraverseType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TraverseType::GoNorth),
            1 => Some(TraverseType::GoEast),
            2 => Some(TraverseType::GoSouth),
            3 => Some(TraverseType::GoWest),
            4 => Some(TraverseType::GoLadderUp),
            5 => Some(TraverseType::GoLadderDown),
            6 => Some(TraverseType::GoJump),
            _ => None,
        }
    }
}

bitflags::bitflags! {
    /// Area attribute bits, least significant bit first
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(
        feature = "serialization",
        derive(serde::Serialize, serde::Deserialize)
    )]
    pub struct AreaAttributes: u8 {
        /// Must crouch to use this area
        const CROUCH = 0x01;
        /// Must jump to traverse this area
        const JUMP = 0x02;
        /// Do not adjust for obstacles, just move along the area
        const PRECISE = 0x04;
        /// Inhibit discontinuity jumping
        const NO_JUMP = 0x08;
    }
}

bitflags::bitflags! {
    /// Hiding spot bits, least significant bit first
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(
        feature = "serialization",
        derive(serde::Serialize, serde::Deserialize)
    )]
    pub struct HidingSpotFlags: u8 {
        const IN_COVER = 0x01;
        const GOOD_SNIPER_SPOT = 0x02;
        const IDEAL_SNIPER_SPOT = 0x04;
    }
}

/// Reference to another area by id, resolved to an index after post-load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct NavConnect {
    /// Stored area id
    pub id: AreaId,
    /// Index of the referenced area in the owning mesh, once resolved
    pub area: Option<usize>,
}

impl NavConnect {
    pub fn new(id: AreaId) -> Self {
        Self { id, area: None }
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.area.is_some()
    }
}

/// A good place for a bot to crouch and wait for enemies
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct HidingSpot {
    pub id: u32,
    pub origin: Vec3,
    pub flags: HidingSpotFlags,
}

/// Hiding spot list entry. Version 1 files store bare positions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum HidingSpotRecord {
    Position(Vec3),
    Spot(HidingSpot),
}

impl HidingSpotRecord {
    /// World position of the spot
    pub fn origin(&self) -> Vec3 {
        match self {
            HidingSpotRecord::Position(pos) => *pos,
            HidingSpotRecord::Spot(spot) => spot.origin,
        }
    }
}

/// One hop of an approach path together with its traversal type
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ApproachConnect {
    pub connect: NavConnect,
    /// Raw traversal byte, see [`TraverseType`]
    pub how: u8,
}

impl ApproachConnect {
    pub fn traverse_type(&self) -> Option<TraverseType> {
        TraverseType::from_u8(self.how)
    }
}

/// Approach record: the area we came from and where to go next
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ApproachInfo {
    pub here: NavConnect,
    pub prev: ApproachConnect,
    pub next: ApproachConnect,
}

/// Segment endpoints, source first
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Ray {
    pub source: Vec3,
    pub target: Vec3,
}

/// One end of an encounter path
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct EncounterEndpoint {
    pub connect: NavConnect,
    /// Raw direction byte, see [`Direction`]
    pub direction: u8,
}

impl EncounterEndpoint {
    pub fn direction(&self) -> Option<Direction> {
        Direction::from_u8(self.direction)
    }
}

/// A hiding spot and the parametric distance along the path where it first
/// has line of sight to the path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct SpotOrder {
    pub hiding_spot_id: u32,
    /// Distance quantized to a byte
    pub t_char: u8,
}

impl SpotOrder {
    /// Parametric distance in `[0, 1]`
    pub fn t(&self) -> f32 {
        self.t_char as f32 / 255.0
    }
}

/// Possible path segment through an area and the dangerous spots to look at
/// while traversing it
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct EncounterPath {
    pub from: EncounterEndpoint,
    pub to: EncounterEndpoint,
    pub spots: Vec<SpotOrder>,
    /// Portal-to-portal segment at eye height, filled in by the resolver
    pub path: Option<Ray>,
}

/// Point of a legacy encounter record
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct LegacySpot {
    pub position: Vec3,
    pub t: f32,
}

/// Encounter record layout used before version 3
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct LegacyEncounterPath {
    pub from: NavConnect,
    pub to: NavConnect,
    pub stored_path: Ray,
    pub spots: Vec<LegacySpot>,
    /// Stored path, kept once both ends resolve
    pub path: Option<Ray>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum EncounterSpot {
    Current(EncounterPath),
    Legacy(LegacyEncounterPath),
}

impl EncounterSpot {
    /// Derived path segment, if the resolver could compute one
    pub fn path(&self) -> Option<Ray> {
        match self {
            EncounterSpot::Current(enc) => enc.path,
            EncounterSpot::Legacy(enc) => enc.path,
        }
    }

    /// Connections of the two ends, source first
    pub fn endpoints(&self) -> (NavConnect, NavConnect) {
        match self {
            EncounterSpot::Current(enc) => (enc.from.connect, enc.to.connect),
            EncounterSpot::Legacy(enc) => (enc.from, enc.to),
        }
    }
}

/// Named group of navigation areas
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Place {
    pub name: String,
}

impl std::fmt::Display for Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// A rectangular region defining a walkable area in the map
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct NavArea {
    pub id: AreaId,
    pub attributes: AreaAttributes,
    pub extent: Extent,
    /// Elevation of the (hi.x, lo.y) corner
    pub ne_z: f32,
    /// Elevation of the (lo.x, hi.y) corner
    pub sw_z: f32,
    /// Adjacent areas per [`Direction`]
    pub connections: [Vec<NavConnect>; NUM_DIRECTIONS],
    pub hiding_spots: Vec<HidingSpotRecord>,
    pub approaches: Vec<ApproachInfo>,
    pub encounters: Vec<EncounterSpot>,
    /// 1-based index into the place directory, 0 for no place
    pub place: u16,
}

impl NavArea {
    /// Creates a flat area with no connections
    pub fn new(id: AreaId, extent: Extent) -> Self {
        Self {
            id,
            attributes: AreaAttributes::empty(),
            extent,
            ne_z: extent.lo.z,
            sw_z: extent.lo.z,
            connections: Default::default(),
            hiding_spots: Vec::new(),
            approaches: Vec::new(),
            encounters: Vec::new(),
            place: 0,
        }
    }

    /// Connections in one direction
    pub fn connections(&self, dir: Direction) -> &[NavConnect] {
        &self.connections[dir.index()]
    }

    /// Adds an (unresolved) connection to `id` in direction `dir`
    pub fn connect(&mut self, dir: Direction, id: AreaId) {
        self.connections[dir.index()].push(NavConnect::new(id));
    }

    /// Direction in which `id` is listed as adjacent, if any
    pub fn direction_to(&self, id: AreaId) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|dir| self.connections(*dir).iter().any(|c| c.id == id))
    }

    /// North-east corner (hi.x, lo.y)
    pub fn corner_northeast(&self) -> Vec3 {
        Vec3::new(self.extent.hi.x, self.extent.lo.y, self.ne_z)
    }

    /// South-west corner (lo.x, hi.y)
    pub fn corner_southwest(&self) -> Vec3 {
        Vec3::new(self.extent.lo.x, self.extent.hi.y, self.sw_z)
    }

    /// True if the area has no place assigned
    pub fn is_undefined_place(&self) -> bool {
        self.place == 0
    }

    /// True if this area is badly formed
    pub fn is_degenerate(&self) -> bool {
        self.extent.is_degenerate()
    }

    /// False if the extent holds non-finite or out-of-world coordinates
    pub fn is_bounded(&self) -> bool {
        self.extent.is_bounded()
    }

    /// True if `pos` is within the 2D extents of the area
    pub fn is_overlapping(&self, pos: &Vec3) -> bool {
        self.extent.contains_2d(pos)
    }

    /// Z of the area surface at the (x, y) of `pos`.
    ///
    /// Bilinear interpolation between the four corner elevations. The
    /// normalized coordinates are clamped, so points outside the rectangle
    /// take the elevation of the nearest edge. `pos.z` is ignored.
    pub fn get_z(&self, pos: &Vec3) -> f32 {
        let ext = &self.extent;
        let dx = ext.hi.x - ext.lo.x;
        let dy = ext.hi.y - ext.lo.y;

        // guard against division by zero due to degenerate areas
        if dx == 0.0 || dy == 0.0 {
            return self.ne_z;
        }

        let u = ((pos.x - ext.lo.x) / dx).clamp(0.0, 1.0);
        let v = ((pos.y - ext.lo.y) / dy).clamp(0.0, 1.0);

        let north_z = ext.lo.z + u * (self.ne_z - ext.lo.z);
        let south_z = self.sw_z + u * (ext.hi.z - self.sw_z);
        north_z + v * (south_z - north_z)
    }

    /// Closest point to `pos` on the area surface
    pub fn closest_point(&self, pos: &Vec3) -> Vec3 {
        let mut close = self.extent.clamp_2d(pos);
        close.z = self.get_z(&close);
        close
    }

    /// `pos` projected onto the area surface, or `None` if it lies outside
    /// the 2D extents
    pub fn aligned_origin(&self, pos: &Vec3) -> Option<Vec3> {
        if !self.is_overlapping(pos) {
            return None;
        }
        Some(Vec3::new(pos.x, pos.y, self.get_z(pos)))
    }

    /// Computes the portal between this area and an adjacent `target` lying
    /// in direction `dir`.
    ///
    /// Returns the center of the opening (with `z` left at 0) and the
    /// half-width of the opening. The opening is clamped to this area's
    /// extent, so disjoint areas produce a zero-width portal on our edge.
    pub fn compute_portal(&self, target: &NavArea, dir: Direction) -> (Vec3, f32) {
        let src = &self.extent;
        let tgt = &target.extent;
        let mut center = Vec3::ZERO;

        let half_width = if dir.is_north_south() {
            center.y = if dir == Direction::North {
                src.lo.y
            } else {
                src.hi.y
            };

            let left = src.lo.x.max(tgt.lo.x).clamp_to(src.lo.x, src.hi.x);
            let right = src.hi.x.min(tgt.hi.x).clamp_to(src.lo.x, src.hi.x);
            center.x = (left + right) / 2.0;
            (right - left) / 2.0
        } else {
            center.x = if dir == Direction::West {
                src.lo.x
            } else {
                src.hi.x
            };

            let top = src.lo.y.max(tgt.lo.y).clamp_to(src.lo.y, src.hi.y);
            let bottom = src.hi.y.min(tgt.hi.y).clamp_to(src.lo.y, src.hi.y);
            center.y = (top + bottom) / 2.0;
            (bottom - top) / 2.0
        };

        (center, half_width)
    }
}

/// Like `f32::clamp`, but tolerates `min > max` from inverted extents.
trait ClampTo {
    fn clamp_to(self, min: f32, max: f32) -> f32;
}

impl ClampTo for f32 {
    #[inline]
    fn clamp_to(self, min: f32, max: f32) -> f32 {
        if self < min {
            min
        } else if self > max {
            max
        } else {
            self
        }
    }
}
