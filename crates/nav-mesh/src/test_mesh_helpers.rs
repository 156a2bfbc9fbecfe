//! Test helpers that write synthetic `.nav` files
//!
//! The writer mirrors the decoder field by field so tests can build files
//! from in-memory areas and check that decoding reproduces them.

use byteorder::{LittleEndian, WriteBytesExt};
use glam::Vec3;

use crate::binary_format::NAV_MAGIC;
use crate::nav_area::{EncounterSpot, HidingSpotRecord, NavArea, Place};
use nav_common::Extent;

fn write_vector(out: &mut Vec<u8>, v: &Vec3) {
    out.write_f32::<LittleEndian>(v.x).unwrap();
    out.write_f32::<LittleEndian>(v.y).unwrap();
    out.write_f32::<LittleEndian>(v.z).unwrap();
}

fn write_area(out: &mut Vec<u8>, version: u32, area: &NavArea) {
    out.write_u32::<LittleEndian>(area.id).unwrap();
    out.write_u8(area.attributes.bits()).unwrap();
    write_vector(out, &area.extent.lo);
    write_vector(out, &area.extent.hi);
    out.write_f32::<LittleEndian>(area.ne_z).unwrap();
    out.write_f32::<LittleEndian>(area.sw_z).unwrap();

    for list in &area.connections {
        out.write_u32::<LittleEndian>(list.len() as u32).unwrap();
        for connect in list {
            out.write_u32::<LittleEndian>(connect.id).unwrap();
        }
    }

    out.write_u8(area.hiding_spots.len() as u8).unwrap();
    for record in &area.hiding_spots {
        match record {
            HidingSpotRecord::Position(pos) => {
                assert_eq!(version, 1, "bare positions only exist in version 1");
                write_vector(out, pos);
            }
            HidingSpotRecord::Spot(spot) => {
                assert_ne!(version, 1, "version 1 has no hiding spot ids");
                out.write_u32::<LittleEndian>(spot.id).unwrap();
                write_vector(out, &spot.origin);
                out.write_u8(spot.flags.bits()).unwrap();
            }
        }
    }

    out.write_u8(area.approaches.len() as u8).unwrap();
    for approach in &area.approaches {
        out.write_u32::<LittleEndian>(approach.here.id).unwrap();
        out.write_u32::<LittleEndian>(approach.prev.connect.id).unwrap();
        out.write_u8(approach.prev.how).unwrap();
        out.write_u32::<LittleEndian>(approach.next.connect.id).unwrap();
        out.write_u8(approach.next.how).unwrap();
    }

    out.write_u32::<LittleEndian>(area.encounters.len() as u32).unwrap();
    for encounter in &area.encounters {
        match encounter {
            EncounterSpot::Legacy(enc) => {
                assert!(version < 3, "legacy encounters only exist before version 3");
                out.write_u32::<LittleEndian>(enc.from.id).unwrap();
                out.write_u32::<LittleEndian>(enc.to.id).unwrap();
                write_vector(out, &enc.stored_path.source);
                write_vector(out, &enc.stored_path.target);
                out.write_u8(enc.spots.len() as u8).unwrap();
                for spot in &enc.spots {
                    write_vector(out, &spot.position);
                    out.write_f32::<LittleEndian>(spot.t).unwrap();
                }
            }
            EncounterSpot::Current(enc) => {
                assert!(version >= 3, "directed encounters start at version 3");
                out.write_u32::<LittleEndian>(enc.from.connect.id).unwrap();
                out.write_u8(enc.from.direction).unwrap();
                out.write_u32::<LittleEndian>(enc.to.connect.id).unwrap();
                out.write_u8(enc.to.direction).unwrap();
                out.write_u8(enc.spots.len() as u8).unwrap();
                for order in &enc.spots {
                    out.write_u32::<LittleEndian>(order.hiding_spot_id).unwrap();
                    out.write_u8(order.t_char).unwrap();
                }
            }
        }
    }

    if version >= 5 {
        out.write_u16::<LittleEndian>(area.place).unwrap();
    }
}

/// Encodes a complete `.nav` file
pub fn write_nav_file(version: u32, bsp_size: u32, places: &[Place], areas: &[NavArea]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u32::<LittleEndian>(NAV_MAGIC).unwrap();
    out.write_u32::<LittleEndian>(version).unwrap();
    if version >= 4 {
        out.write_u32::<LittleEndian>(bsp_size).unwrap();
    }

    if version >= 5 {
        out.write_u16::<LittleEndian>(places.len() as u16).unwrap();
        for place in places {
            let mut raw = place.name.as_bytes().to_vec();
            raw.push(0);
            out.write_u16::<LittleEndian>(raw.len() as u16).unwrap();
            out.extend_from_slice(&raw);
        }
    }

    out.write_u32::<LittleEndian>(areas.len() as u32).unwrap();
    for area in areas {
        write_area(&mut out, version, area);
    }
    out
}

/// Flat rectangular area at height `z`
pub fn flat_area(id: u32, lo: (f32, f32), hi: (f32, f32), z: f32) -> NavArea {
    NavArea::new(
        id,
        Extent::new(Vec3::new(lo.0, lo.1, z), Vec3::new(hi.0, hi.1, z)),
    )
}

pub fn place(name: &str) -> Place {
    Place {
        name: name.to_string(),
    }
}
