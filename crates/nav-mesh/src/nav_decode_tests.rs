//! Decoder tests over synthetic navigation files

use std::io::Write;

use glam::Vec3;

use crate::binary_format::load_nav_mesh_from_binary;
use crate::nav_area::{
    ApproachConnect, ApproachInfo, AreaAttributes, Direction, EncounterEndpoint, EncounterPath,
    EncounterSpot, HidingSpot, HidingSpotFlags, HidingSpotRecord, LegacyEncounterPath,
    LegacySpot, NavConnect, Ray, SpotOrder,
};
use crate::test_mesh_helpers::{flat_area, place, write_nav_file};
use crate::NavMesh;
use nav_common::Error;

#[test]
fn test_decode_version_5_reproduces_fields() {
    let mut a = flat_area(10, (0.0, 0.0), (100.0, 150.0), 8.0);
    a.attributes = AreaAttributes::JUMP | AreaAttributes::NO_JUMP;
    a.extent.hi.z = 12.5;
    a.ne_z = 9.0;
    a.sw_z = -3.25;
    a.connect(Direction::East, 11);
    a.connect(Direction::East, 12);
    a.connect(Direction::West, 99);
    a.hiding_spots.push(HidingSpotRecord::Spot(HidingSpot {
        id: 3,
        origin: Vec3::new(40.0, 50.0, 8.0),
        flags: HidingSpotFlags::GOOD_SNIPER_SPOT | HidingSpotFlags::IN_COVER,
    }));
    a.approaches.push(ApproachInfo {
        here: NavConnect::new(10),
        prev: ApproachConnect {
            connect: NavConnect::new(11),
            how: 4,
        },
        next: ApproachConnect {
            connect: NavConnect::new(12),
            how: 6,
        },
    });
    a.encounters.push(EncounterSpot::Current(EncounterPath {
        from: EncounterEndpoint {
            connect: NavConnect::new(11),
            direction: Direction::East as u8,
        },
        to: EncounterEndpoint {
            connect: NavConnect::new(12),
            direction: Direction::East as u8,
        },
        spots: vec![SpotOrder {
            hiding_spot_id: 3,
            t_char: 200,
        }],
        path: None,
    }));
    a.place = 2;

    let b = flat_area(11, (100.0, 0.0), (200.0, 100.0), 8.0);
    let areas = vec![a, b];
    let places = vec![place("BombsiteA"), place("LongHall")];

    let data = write_nav_file(5, 0x0012_3456, &places, &areas);
    let mesh = load_nav_mesh_from_binary(&data).unwrap();

    assert_eq!(mesh.version(), 5);
    assert_eq!(mesh.header().bsp_size, Some(0x0012_3456));
    assert_eq!(mesh.places(), &places[..]);
    assert_eq!(mesh.areas(), &areas[..]);
    assert!(!mesh.is_resolved());

    let approach = &mesh.areas()[0].approaches[0];
    assert_eq!(
        approach.prev.traverse_type(),
        Some(crate::TraverseType::GoLadderUp)
    );
    assert_eq!(mesh.hiding_spots().len(), 1);
    assert_eq!(mesh.place_of(&mesh.areas()[0]).unwrap().name, "LongHall");
}

#[test]
fn test_decode_version_1_bare_hiding_spots() {
    let mut a = flat_area(1, (0.0, 0.0), (64.0, 64.0), 0.0);
    a.hiding_spots
        .push(HidingSpotRecord::Position(Vec3::new(1.0, 2.0, 3.0)));
    a.hiding_spots
        .push(HidingSpotRecord::Position(Vec3::new(4.0, 5.0, 6.0)));
    a.encounters.push(EncounterSpot::Legacy(LegacyEncounterPath {
        from: NavConnect::new(1),
        to: NavConnect::new(1),
        stored_path: Ray {
            source: Vec3::new(0.0, 1.0, 2.0),
            target: Vec3::new(3.0, 4.0, 5.0),
        },
        spots: vec![LegacySpot {
            position: Vec3::new(7.0, 8.0, 9.0),
            t: 0.5,
        }],
        path: None,
    }));

    let data = write_nav_file(1, 0, &[], std::slice::from_ref(&a));
    let mesh = load_nav_mesh_from_binary(&data).unwrap();

    assert_eq!(mesh.header().bsp_size, None);
    assert!(mesh.places().is_empty());
    assert_eq!(mesh.areas()[0], a);
    // bare positions carry no id and are not registered
    assert!(mesh.hiding_spots().is_empty());
    assert_eq!(mesh.areas()[0].hiding_spots[1].origin(), Vec3::new(4.0, 5.0, 6.0));
}

#[test]
fn test_decode_version_2_legacy_encounter_with_spot_ids() {
    let mut a = flat_area(1, (0.0, 0.0), (64.0, 64.0), 0.0);
    a.hiding_spots.push(HidingSpotRecord::Spot(HidingSpot {
        id: 9,
        origin: Vec3::new(1.0, 1.0, 0.0),
        flags: HidingSpotFlags::IDEAL_SNIPER_SPOT,
    }));
    a.encounters.push(EncounterSpot::Legacy(LegacyEncounterPath {
        from: NavConnect::new(1),
        to: NavConnect::new(1),
        stored_path: Ray::default(),
        spots: Vec::new(),
        path: None,
    }));

    let data = write_nav_file(2, 0, &[], std::slice::from_ref(&a));
    let mesh = load_nav_mesh_from_binary(&data).unwrap();
    assert_eq!(mesh.areas()[0], a);
    assert!(mesh.hiding_spots().contains(9));
    // no place id before version 5
    assert!(mesh.areas()[0].is_undefined_place());
}

#[test]
fn test_attribute_bits_least_significant_first() {
    let mut data = write_nav_file(3, 0, &[], &[flat_area(1, (0.0, 0.0), (1.0, 1.0), 0.0)]);
    // magic, version, area count, id
    let flags_offset = 4 + 4 + 4 + 4;
    data[flags_offset] = 0b0000_0101;

    let mesh = load_nav_mesh_from_binary(&data).unwrap();
    let attributes = mesh.areas()[0].attributes;
    assert!(attributes.contains(AreaAttributes::CROUCH));
    assert!(attributes.contains(AreaAttributes::PRECISE));
    assert!(!attributes.contains(AreaAttributes::JUMP));
    assert!(!attributes.contains(AreaAttributes::NO_JUMP));
}

#[test]
fn test_truncated_area_is_io_error() {
    let mut area = flat_area(1, (0.0, 0.0), (10.0, 10.0), 0.0);
    area.connect(Direction::North, 2);
    let data = write_nav_file(5, 0, &[place("Mid")], &[area]);

    for cut in [data.len() - 1, data.len() - 20, 14] {
        assert!(
            matches!(load_nav_mesh_from_binary(&data[..cut]), Err(Error::Io(_))),
            "cut at {}",
            cut
        );
    }
}

#[test]
fn test_load_from_file() {
    let a = flat_area(5, (0.0, 0.0), (50.0, 50.0), 0.0);
    let data = write_nav_file(4, 77, &[], &[a]);

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&data).unwrap();
    file.flush().unwrap();

    let mesh = NavMesh::load(file.path()).unwrap();
    assert_eq!(mesh.area_count(), 1);
    assert_eq!(mesh.header().bsp_size, Some(77));

    let strict = NavMesh::load_strict(file.path()).unwrap();
    assert!(strict.is_resolved());
    assert_eq!(strict.area_by_id(5).unwrap().extent.hi, Vec3::new(50.0, 50.0, 0.0));
}

#[test]
fn test_load_strict_rejects_corruption() {
    let mut a = flat_area(5, (0.0, 0.0), (50.0, 50.0), 0.0);
    a.connect(Direction::South, 6);
    let data = write_nav_file(5, 0, &[], &[a]);

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&data).unwrap();
    file.flush().unwrap();

    assert!(matches!(
        NavMesh::load_strict(file.path()),
        Err(Error::CorruptData(_))
    ));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        NavMesh::load(dir.path().join("missing.nav")),
        Err(Error::Io(_))
    ));
}
