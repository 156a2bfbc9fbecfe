//! Binary format reader for CS 1.6 / Condition Zero bot navigation files
//!
//! This module decodes `.nav` files into raw [`NavArea`] records. Nothing is
//! resolved here: adjacency, approach and encounter entries keep the ids
//! stored in the file until [`NavMesh::resolve`] runs.
//!
//! Layout (all little-endian):
//!
//! ```text
//! u32 magic (0xFEEDFACE)
//! u32 version (<= 5)
//! u32 bsp size                      version >= 4
//! u16 place count, places           version >= 5
//! u32 area count, areas
//! ```

use byteorder::{LittleEndian, ReadBytesExt};
use glam::Vec3;
use std::io::{Cursor, Read};

use super::hiding_spot::HidingSpotTable;
use super::nav_area::{
    ApproachConnect, ApproachInfo, AreaAttributes, EncounterEndpoint, EncounterPath,
    EncounterSpot, HidingSpot, HidingSpotFlags, HidingSpotRecord, LegacyEncounterPath,
    LegacySpot, NavArea, NavConnect, Place, Ray, SpotOrder, NUM_DIRECTIONS,
};
use super::nav_mesh::NavMesh;
use nav_common::{Error, Extent, Result};

/// Magic number for navigation mesh files
pub const NAV_MAGIC: u32 = 0xFEED_FACE;

/// Highest navigation file version this reader understands
pub const NAV_MAX_VERSION: u32 = 5;

/// First version storing the size of the companion BSP file
const NAV_VERSION_BSP_SIZE: u32 = 4;

/// First version carrying the place directory
const NAV_VERSION_PLACES: u32 = 5;

/// Versions below this store encounter spots in the legacy layout
const NAV_VERSION_ENCOUNTER_DIRECTIONS: u32 = 3;

/// Version storing hiding spots as bare positions
const NAV_VERSION_BARE_HIDING_SPOTS: u32 = 1;

/// Upper bound on speculative allocation for counts read from the file
const MAX_PREALLOC: usize = 1024;

/// Navigation file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavHeader {
    pub magic: u32,
    pub version: u32,
    /// Size of the BSP file the mesh was generated for (version >= 4)
    pub bsp_size: Option<u32>,
}

impl NavHeader {
    /// Reads and validates a header
    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let magic = reader.read_u32::<LittleEndian>()?;
        if magic != NAV_MAGIC {
            return Err(Error::InvalidFormat(magic));
        }

        let version = reader.read_u32::<LittleEndian>()?;
        if version > NAV_MAX_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        let bsp_size = if version >= NAV_VERSION_BSP_SIZE {
            Some(reader.read_u32::<LittleEndian>()?)
        } else {
            None
        };

        Ok(Self {
            magic,
            version,
            bsp_size,
        })
    }

    /// True if the file carries a place directory and per-area place ids
    pub fn has_places(&self) -> bool {
        self.version >= NAV_VERSION_PLACES
    }
}

fn read_vector<R: Read>(reader: &mut R) -> Result<Vec3> {
    Ok(Vec3::new(
        reader.read_f32::<LittleEndian>()?,
        reader.read_f32::<LittleEndian>()?,
        reader.read_f32::<LittleEndian>()?,
    ))
}

fn read_connect<R: Read>(reader: &mut R) -> Result<NavConnect> {
    Ok(NavConnect::new(reader.read_u32::<LittleEndian>()?))
}

fn read_place<R: Read>(reader: &mut R) -> Result<Place> {
    let len = reader.read_u16::<LittleEndian>()? as usize;
    let mut raw = vec![0u8; len];
    reader.read_exact(&mut raw)?;

    // names are stored NUL-terminated inside their length
    if let Some(end) = raw.iter().position(|&b| b == 0) {
        raw.truncate(end);
    }

    Ok(Place {
        name: String::from_utf8_lossy(&raw).into_owned(),
    })
}

fn read_hiding_spot<R: Read>(reader: &mut R, version: u32) -> Result<HidingSpotRecord> {
    if version == NAV_VERSION_BARE_HIDING_SPOTS {
        return Ok(HidingSpotRecord::Position(read_vector(reader)?));
    }

    let id = reader.read_u32::<LittleEndian>()?;
    let origin = read_vector(reader)?;
    let flags = HidingSpotFlags::from_bits_truncate(reader.read_u8()?);
    Ok(HidingSpotRecord::Spot(HidingSpot { id, origin, flags }))
}

fn read_approach<R: Read>(reader: &mut R) -> Result<ApproachInfo> {
    let here = read_connect(reader)?;
    let prev = ApproachConnect {
        connect: read_connect(reader)?,
        how: reader.read_u8()?,
    };
    let next = ApproachConnect {
        connect: read_connect(reader)?,
        how: reader.read_u8()?,
    };
    Ok(ApproachInfo { here, prev, next })
}

fn read_encounter<R: Read>(reader: &mut R, version: u32) -> Result<EncounterSpot> {
    if version < NAV_VERSION_ENCOUNTER_DIRECTIONS {
        let from = read_connect(reader)?;
        let to = read_connect(reader)?;
        let stored_path = Ray {
            source: read_vector(reader)?,
            target: read_vector(reader)?,
        };
        let count = reader.read_u8()? as usize;
        let mut spots = Vec::with_capacity(count);
        for _ in 0..count {
            spots.push(LegacySpot {
                position: read_vector(reader)?,
                t: reader.read_f32::<LittleEndian>()?,
            });
        }
        return Ok(EncounterSpot::Legacy(LegacyEncounterPath {
            from,
            to,
            stored_path,
            spots,
            path: None,
        }));
    }

    let from = EncounterEndpoint {
        connect: read_connect(reader)?,
        direction: reader.read_u8()?,
    };
    let to = EncounterEndpoint {
        connect: read_connect(reader)?,
        direction: reader.read_u8()?,
    };
    let count = reader.read_u8()? as usize;
    let mut spots = Vec::with_capacity(count);
    for _ in 0..count {
        spots.push(SpotOrder {
            hiding_spot_id: reader.read_u32::<LittleEndian>()?,
            t_char: reader.read_u8()?,
        });
    }

    Ok(EncounterSpot::Current(EncounterPath {
        from,
        to,
        spots,
        path: None,
    }))
}

/// Reads one area record, registering its hiding spots in `spots`
fn read_area<R: Read>(
    reader: &mut R,
    header: &NavHeader,
    spots: &mut HidingSpotTable,
) -> Result<NavArea> {
    let id = reader.read_u32::<LittleEndian>()?;
    let attributes = AreaAttributes::from_bits_truncate(reader.read_u8()?);
    let extent = Extent::new(read_vector(reader)?, read_vector(reader)?);
    let ne_z = reader.read_f32::<LittleEndian>()?;
    let sw_z = reader.read_f32::<LittleEndian>()?;

    let mut connections: [Vec<NavConnect>; NUM_DIRECTIONS] = Default::default();
    for list in connections.iter_mut() {
        let count = reader.read_u32::<LittleEndian>()? as usize;
        list.reserve(count.min(MAX_PREALLOC));
        for _ in 0..count {
            list.push(read_connect(reader)?);
        }
    }

    let count = reader.read_u8()? as usize;
    let mut hiding_spots = Vec::with_capacity(count);
    for _ in 0..count {
        let record = read_hiding_spot(reader, header.version)?;
        if let HidingSpotRecord::Spot(spot) = record {
            spots.register(spot);
        }
        hiding_spots.push(record);
    }

    let count = reader.read_u8()? as usize;
    let mut approaches = Vec::with_capacity(count);
    for _ in 0..count {
        approaches.push(read_approach(reader)?);
    }

    let count = reader.read_u32::<LittleEndian>()? as usize;
    let mut encounters = Vec::with_capacity(count.min(MAX_PREALLOC));
    for _ in 0..count {
        encounters.push(read_encounter(reader, header.version)?);
    }

    let place = if header.has_places() {
        reader.read_u16::<LittleEndian>()?
    } else {
        0
    };

    Ok(NavArea {
        id,
        attributes,
        extent,
        ne_z,
        sw_z,
        connections,
        hiding_spots,
        approaches,
        encounters,
        place,
    })
}

/// Reads a navigation mesh from a reader.
///
/// The returned mesh is unresolved; call [`NavMesh::resolve`] before using
/// any cross-reference.
pub fn read_nav_mesh<R: Read>(reader: &mut R) -> Result<NavMesh> {
    let header = NavHeader::read_from(reader)?;

    let mut places = Vec::new();
    if header.has_places() {
        let count = reader.read_u16::<LittleEndian>()? as usize;
        places.reserve(count);
        for _ in 0..count {
            places.push(read_place(reader)?);
        }
    }

    let mut hiding_spots = HidingSpotTable::new();
    let count = reader.read_u32::<LittleEndian>()? as usize;
    let mut areas = Vec::with_capacity(count.min(MAX_PREALLOC));
    for _ in 0..count {
        areas.push(read_area(reader, &header, &mut hiding_spots)?);
    }

    log::debug!(
        "Decoded navigation mesh v{}: {} places, {} areas, {} hiding spots",
        header.version,
        places.len(),
        areas.len(),
        hiding_spots.registered_count()
    );

    Ok(NavMesh::from_parts(header, places, areas, hiding_spots))
}

/// Loads a navigation mesh from an in-memory `.nav` file
pub fn load_nav_mesh_from_binary(data: &[u8]) -> Result<NavMesh> {
    let mut cursor = Cursor::new(data);
    read_nav_mesh(&mut cursor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_magic() {
        let mut data = Vec::new();
        data.extend_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        data.extend_from_slice(&5u32.to_le_bytes());

        match load_nav_mesh_from_binary(&data) {
            Err(Error::InvalidFormat(magic)) => assert_eq!(magic, 0xDEAD_BEEF),
            other => panic!("expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_future_version() {
        let mut data = Vec::new();
        data.extend_from_slice(&NAV_MAGIC.to_le_bytes());
        data.extend_from_slice(&6u32.to_le_bytes());

        assert!(matches!(
            load_nav_mesh_from_binary(&data),
            Err(Error::UnsupportedVersion(6))
        ));
    }

    #[test]
    fn test_truncated_header_is_io_error() {
        let data = NAV_MAGIC.to_le_bytes();
        assert!(matches!(load_nav_mesh_from_binary(&data), Err(Error::Io(_))));
    }

    #[test]
    fn test_header_version_gates() {
        let mut v3 = Vec::new();
        v3.extend_from_slice(&NAV_MAGIC.to_le_bytes());
        v3.extend_from_slice(&3u32.to_le_bytes());
        let header = NavHeader::read_from(&mut Cursor::new(&v3)).unwrap();
        assert_eq!(header.bsp_size, None);
        assert!(!header.has_places());

        let mut v4 = Vec::new();
        v4.extend_from_slice(&NAV_MAGIC.to_le_bytes());
        v4.extend_from_slice(&4u32.to_le_bytes());
        v4.extend_from_slice(&1234u32.to_le_bytes());
        let header = NavHeader::read_from(&mut Cursor::new(&v4)).unwrap();
        assert_eq!(header.bsp_size, Some(1234));
        assert!(!header.has_places());
    }

    #[test]
    fn test_place_name_stops_at_nul() {
        let mut data = Vec::new();
        data.extend_from_slice(&6u16.to_le_bytes());
        data.extend_from_slice(b"Ramp\0\0");
        let place = read_place(&mut Cursor::new(&data)).unwrap();
        assert_eq!(place.name, "Ramp");
    }
}
