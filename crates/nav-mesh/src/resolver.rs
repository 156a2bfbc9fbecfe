//! Post-load pass: turn stored ids into indices and derive encounter paths
//!
//! Every reference is attempted even after corruption is found. Unresolved
//! references are left as `None`, logged, and collected in the
//! [`ResolveReport`].

use std::collections::HashMap;
use std::fmt;

use glam::Vec3;

use super::hiding_spot::HidingSpotTable;
use super::nav_area::{AreaId, Direction, EncounterPath, EncounterSpot, NavArea, NavConnect, Ray};
use super::nav_mesh::NavMesh;
use super::status::NavStatus;
use super::HUMAN_HEIGHT_HALF;

/// Approach record slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApproachSlot {
    Here,
    Prev,
    Next,
}

impl fmt::Display for ApproachSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApproachSlot::Here => write!(f, "here"),
            ApproachSlot::Prev => write!(f, "prev"),
            ApproachSlot::Next => write!(f, "next"),
        }
    }
}

/// End of an encounter path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterEnd {
    From,
    To,
}

impl fmt::Display for EncounterEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncounterEnd::From => write!(f, "from"),
            EncounterEnd::To => write!(f, "to"),
        }
    }
}

/// A single corruption finding
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Corruption {
    #[error("degenerate navigation area #{area} at {center}")]
    DegenerateArea { area: AreaId, center: Vec3 },

    #[error("navigation area #{area} has an extent outside the world: {lo} .. {hi}")]
    UnboundedArea { area: AreaId, lo: Vec3, hi: Vec3 },

    #[error("area #{area} cannot connect to missing area #{target} ({direction:?})")]
    MissingAdjacentArea {
        area: AreaId,
        direction: Direction,
        target: AreaId,
    },

    #[error("area #{area} is missing approach area #{target} ({slot})")]
    MissingApproachArea {
        area: AreaId,
        slot: ApproachSlot,
        target: AreaId,
    },

    #[error("area #{area} is missing the \"{end}\" area #{target} of an encounter spot")]
    MissingEncounterArea {
        area: AreaId,
        end: EncounterEnd,
        target: AreaId,
    },

    #[error("area #{area} has an encounter spot with invalid direction {direction}")]
    InvalidEncounterDirection { area: AreaId, direction: u8 },

    #[error("area #{area} references missing hiding spot #{spot}")]
    MissingHidingSpot { area: AreaId, spot: u32 },

    #[error("area #{area} references missing place {place}")]
    MissingPlace { area: AreaId, place: u16 },
}

/// Outcome of [`NavMesh::resolve`]
#[derive(Debug, Clone, Default)]
pub struct ResolveReport {
    pub status: NavStatus,
    pub issues: Vec<Corruption>,
}

impl ResolveReport {
    fn flag(&mut self, issue: Corruption) {
        log::warn!("Corrupt navigation data. {}", issue);
        self.status = NavStatus::CorruptData;
        self.issues.push(issue);
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}

fn lookup(index: &HashMap<AreaId, usize>, id: AreaId) -> Option<usize> {
    if id == 0 {
        None
    } else {
        index.get(&id).copied()
    }
}

/// Resolves a connection in place, returning true on success
fn resolve_connect(index: &HashMap<AreaId, usize>, connect: &mut NavConnect) -> bool {
    connect.area = lookup(index, connect.id);
    connect.area.is_some()
}

/// Portal-to-portal segment of an encounter path, at eye height
fn encounter_ray(
    areas: &[NavArea],
    owner: &NavArea,
    enc: &EncounterPath,
    from_area: usize,
    to_area: usize,
    report: &mut ResolveReport,
) -> Option<Ray> {
    let from_dir = enc.from.direction();
    let to_dir = enc.to.direction();
    let (from_dir, to_dir) = match (from_dir, to_dir) {
        (Some(f), Some(t)) => (f, t),
        _ => {
            let bad = if from_dir.is_none() {
                enc.from.direction
            } else {
                enc.to.direction
            };
            report.flag(Corruption::InvalidEncounterDirection {
                area: owner.id,
                direction: bad,
            });
            return None;
        }
    };

    let from = &areas[from_area];
    let to = &areas[to_area];

    let (mut target, _) = owner.compute_portal(to, to_dir);
    let (mut source, _) = owner.compute_portal(from, from_dir);
    source.z = from.get_z(&source) + HUMAN_HEIGHT_HALF;
    target.z = to.get_z(&target) + HUMAN_HEIGHT_HALF;

    Some(Ray { source, target })
}

fn check_hiding_spots(
    owner: AreaId,
    enc: &EncounterPath,
    spots: &HidingSpotTable,
    report: &mut ResolveReport,
) {
    for order in &enc.spots {
        if !spots.contains(order.hiding_spot_id) {
            report.flag(Corruption::MissingHidingSpot {
                area: owner,
                spot: order.hiding_spot_id,
            });
        }
    }
}

pub(crate) fn resolve(mesh: &mut NavMesh) -> ResolveReport {
    let mut report = ResolveReport::default();

    // a later duplicate id shadows an earlier one
    mesh.area_index = mesh
        .areas
        .iter()
        .enumerate()
        .map(|(i, area)| (area.id, i))
        .collect();

    let index = &mesh.area_index;
    let place_count = mesh.places.len();

    // connect areas together and resolve approach areas
    for area in mesh.areas.iter_mut() {
        if !area.is_bounded() {
            report.flag(Corruption::UnboundedArea {
                area: area.id,
                lo: area.extent.lo,
                hi: area.extent.hi,
            });
        } else if area.is_degenerate() {
            report.flag(Corruption::DegenerateArea {
                area: area.id,
                center: area.extent.center(),
            });
        }

        for dir in Direction::ALL {
            for connect in area.connections[dir.index()].iter_mut() {
                if !resolve_connect(index, connect) && connect.id != 0 {
                    report.flag(Corruption::MissingAdjacentArea {
                        area: area.id,
                        direction: dir,
                        target: connect.id,
                    });
                }
            }
        }

        for approach in area.approaches.iter_mut() {
            let slots = [
                (ApproachSlot::Here, &mut approach.here),
                (ApproachSlot::Prev, &mut approach.prev.connect),
                (ApproachSlot::Next, &mut approach.next.connect),
            ];
            for (slot, connect) in slots {
                if !resolve_connect(index, connect) && connect.id != 0 {
                    report.flag(Corruption::MissingApproachArea {
                        area: area.id,
                        slot,
                        target: connect.id,
                    });
                }
            }
        }

        for encounter in area.encounters.iter_mut() {
            let (from, to) = match encounter {
                EncounterSpot::Current(enc) => (&mut enc.from.connect, &mut enc.to.connect),
                EncounterSpot::Legacy(enc) => (&mut enc.from, &mut enc.to),
            };
            for (end, connect) in [(EncounterEnd::From, from), (EncounterEnd::To, to)] {
                if !resolve_connect(index, connect) {
                    report.flag(Corruption::MissingEncounterArea {
                        area: area.id,
                        end,
                        target: connect.id,
                    });
                }
            }
        }

        if area.place as usize > place_count {
            report.flag(Corruption::MissingPlace {
                area: area.id,
                place: area.place,
            });
        }
    }

    // compute encounter paths now that every connection is resolved
    for i in 0..mesh.areas.len() {
        let rays: Vec<Option<Ray>> = {
            let areas = &mesh.areas;
            let owner = &areas[i];
            owner
                .encounters
                .iter()
                .map(|encounter| match encounter {
                    EncounterSpot::Current(enc) => {
                        check_hiding_spots(owner.id, enc, &mesh.hiding_spots, &mut report);
                        match (enc.from.connect.area, enc.to.connect.area) {
                            (Some(from), Some(to)) => {
                                encounter_ray(areas, owner, enc, from, to, &mut report)
                            }
                            _ => None,
                        }
                    }
                    EncounterSpot::Legacy(enc) => match (enc.from.area, enc.to.area) {
                        (Some(_), Some(_)) => Some(enc.stored_path),
                        _ => None,
                    },
                })
                .collect()
        };

        for (encounter, ray) in mesh.areas[i].encounters.iter_mut().zip(rays) {
            match encounter {
                EncounterSpot::Current(enc) => enc.path = ray,
                EncounterSpot::Legacy(enc) => enc.path = ray,
            }
        }
    }

    log::debug!(
        "Resolved {} areas: {} ({} issue(s))",
        mesh.areas.len(),
        report.status,
        report.issues.len()
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav_area::{
        ApproachConnect, ApproachInfo, EncounterEndpoint, HidingSpot, HidingSpotFlags,
        HidingSpotRecord, LegacyEncounterPath, SpotOrder,
    };
    use nav_common::Extent;

    fn area(id: AreaId, lo: (f32, f32), hi: (f32, f32), z: f32) -> NavArea {
        NavArea::new(
            id,
            Extent::new(Vec3::new(lo.0, lo.1, z), Vec3::new(hi.0, hi.1, z)),
        )
    }

    fn endpoint(id: AreaId, dir: Direction) -> EncounterEndpoint {
        EncounterEndpoint {
            connect: NavConnect::new(id),
            direction: dir as u8,
        }
    }

    #[test]
    fn test_resolves_adjacency() {
        let mut a = area(1, (0.0, 0.0), (100.0, 100.0), 0.0);
        let mut b = area(2, (100.0, 0.0), (200.0, 100.0), 0.0);
        a.connect(Direction::East, 2);
        b.connect(Direction::West, 1);

        let mut mesh = NavMesh::from_areas(5, Vec::new(), vec![a, b]);
        let report = mesh.resolve();

        assert!(report.is_ok());
        assert!(report.issues.is_empty());
        assert_eq!(mesh.areas()[0].connections(Direction::East)[0].area, Some(1));
        assert_eq!(mesh.areas()[1].connections(Direction::West)[0].area, Some(0));
    }

    #[test]
    fn test_missing_adjacent_area_is_reported_and_skipped() {
        let mut a = area(1, (0.0, 0.0), (100.0, 100.0), 0.0);
        a.connect(Direction::North, 99);
        a.connect(Direction::North, 0);
        let b = area(2, (100.0, 0.0), (200.0, 100.0), 0.0);

        let mut mesh = NavMesh::from_areas(5, Vec::new(), vec![a, b]);
        let report = mesh.resolve();

        assert_eq!(report.status, NavStatus::CorruptData);
        // id 0 is "no area", not corruption
        assert_eq!(
            report.issues,
            vec![Corruption::MissingAdjacentArea {
                area: 1,
                direction: Direction::North,
                target: 99
            }]
        );
        assert!(mesh.areas()[0].connections(Direction::North)[0].area.is_none());
    }

    #[test]
    fn test_approach_slots() {
        let mut a = area(1, (0.0, 0.0), (100.0, 100.0), 0.0);
        a.approaches.push(ApproachInfo {
            here: NavConnect::new(1),
            prev: ApproachConnect {
                connect: NavConnect::new(42),
                how: 6,
            },
            next: ApproachConnect {
                connect: NavConnect::new(0),
                how: 0,
            },
        });

        let mut mesh = NavMesh::from_areas(5, Vec::new(), vec![a]);
        let report = mesh.resolve();

        assert_eq!(report.issues.len(), 1);
        assert_eq!(
            report.issues[0],
            Corruption::MissingApproachArea {
                area: 1,
                slot: ApproachSlot::Prev,
                target: 42
            }
        );
        assert_eq!(mesh.areas()[0].approaches[0].here.area, Some(0));
    }

    #[test]
    fn test_encounter_path_at_eye_height() {
        // A(0..100) -- B(100..200) -- C(200..300) along x, B owns the path
        let a = area(1, (0.0, 0.0), (100.0, 100.0), 10.0);
        let mut b = area(2, (100.0, 0.0), (200.0, 100.0), 20.0);
        let c = area(3, (200.0, 0.0), (300.0, 100.0), 30.0);
        b.connect(Direction::West, 1);
        b.connect(Direction::East, 3);
        b.hiding_spots.push(HidingSpotRecord::Spot(HidingSpot {
            id: 7,
            origin: Vec3::new(150.0, 50.0, 20.0),
            flags: HidingSpotFlags::IN_COVER,
        }));
        b.encounters.push(EncounterSpot::Current(EncounterPath {
            from: endpoint(1, Direction::West),
            to: endpoint(3, Direction::East),
            spots: vec![SpotOrder {
                hiding_spot_id: 7,
                t_char: 128,
            }],
            path: None,
        }));

        let mut mesh = NavMesh::from_areas(5, Vec::new(), vec![a, b, c]);
        let report = mesh.resolve();
        assert!(report.is_ok(), "{:?}", report.issues);

        let ray = mesh.areas()[1].encounters[0].path().expect("path computed");
        assert_eq!(ray.source, Vec3::new(100.0, 50.0, 10.0 + HUMAN_HEIGHT_HALF));
        assert_eq!(ray.target, Vec3::new(200.0, 50.0, 30.0 + HUMAN_HEIGHT_HALF));
    }

    #[test]
    fn test_encounter_missing_end_and_hiding_spot() {
        let mut a = area(1, (0.0, 0.0), (100.0, 100.0), 0.0);
        a.encounters.push(EncounterSpot::Current(EncounterPath {
            from: endpoint(0, Direction::North),
            to: endpoint(1, Direction::South),
            spots: vec![SpotOrder {
                hiding_spot_id: 55,
                t_char: 0,
            }],
            path: None,
        }));

        let mut mesh = NavMesh::from_areas(5, Vec::new(), vec![a]);
        let report = mesh.resolve();

        assert!(report.status.is_corrupt());
        assert!(report.issues.contains(&Corruption::MissingEncounterArea {
            area: 1,
            end: EncounterEnd::From,
            target: 0
        }));
        assert!(report
            .issues
            .contains(&Corruption::MissingHidingSpot { area: 1, spot: 55 }));
        assert!(mesh.areas()[0].encounters[0].path().is_none());
    }

    #[test]
    fn test_invalid_encounter_direction() {
        let mut a = area(1, (0.0, 0.0), (100.0, 100.0), 0.0);
        a.encounters.push(EncounterSpot::Current(EncounterPath {
            from: EncounterEndpoint {
                connect: NavConnect::new(1),
                direction: 9,
            },
            to: endpoint(1, Direction::South),
            spots: Vec::new(),
            path: None,
        }));

        let mut mesh = NavMesh::from_areas(5, Vec::new(), vec![a]);
        let report = mesh.resolve();
        assert_eq!(
            report.issues,
            vec![Corruption::InvalidEncounterDirection {
                area: 1,
                direction: 9
            }]
        );
    }

    #[test]
    fn test_legacy_encounter_keeps_stored_path() {
        let stored = Ray {
            source: Vec3::new(1.0, 2.0, 3.0),
            target: Vec3::new(4.0, 5.0, 6.0),
        };
        let mut a = area(1, (0.0, 0.0), (100.0, 100.0), 0.0);
        a.encounters.push(EncounterSpot::Legacy(LegacyEncounterPath {
            from: NavConnect::new(1),
            to: NavConnect::new(1),
            stored_path: stored,
            spots: Vec::new(),
            path: None,
        }));

        let mut mesh = NavMesh::from_areas(2, Vec::new(), vec![a]);
        assert!(mesh.resolve().is_ok());
        assert_eq!(mesh.areas()[0].encounters[0].path(), Some(stored));
    }

    #[test]
    fn test_degenerate_and_missing_place() {
        let mut a = area(1, (0.0, 0.0), (0.0, 100.0), 0.0);
        a.place = 3;
        let mut mesh = NavMesh::from_areas(5, Vec::new(), vec![a]);
        let report = mesh.resolve();

        assert_eq!(report.issues.len(), 2);
        assert!(matches!(
            report.issues[0],
            Corruption::DegenerateArea { area: 1, .. }
        ));
        assert_eq!(
            report.issues[1],
            Corruption::MissingPlace { area: 1, place: 3 }
        );
        // degenerate areas stay in the mesh
        assert_eq!(mesh.area_count(), 1);
    }

    #[test]
    fn test_unbounded_extent_is_reported() {
        let huge = area(1, (-3.0e38, 0.0), (0.0, 50.0), 0.0);
        let mut nan = area(2, (0.0, 0.0), (100.0, 100.0), 0.0);
        nan.extent.hi.x = f32::NAN;
        let fine = area(3, (0.0, 0.0), (100.0, 100.0), 0.0);

        let mut mesh = NavMesh::from_areas(5, Vec::new(), vec![huge, nan, fine]);
        let report = mesh.resolve();

        assert_eq!(report.status, NavStatus::CorruptData);
        assert_eq!(report.issues.len(), 2);
        assert!(matches!(
            report.issues[0],
            Corruption::UnboundedArea { area: 1, .. }
        ));
        assert!(matches!(
            report.issues[1],
            Corruption::UnboundedArea { area: 2, .. }
        ));
        assert_eq!(mesh.area_count(), 3);
    }
}
