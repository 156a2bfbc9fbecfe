//! Candidate generation over a resolved navigation mesh
//!
//! Every usable area contributes candidate points from the selected build
//! modes, in area order. Candidates become simple nodes and go through the
//! [`NodeRegistry`], which merges colliding ones.

use std::collections::HashSet;

use glam::Vec3;

use super::build_flags::BuildMode;
use super::config::NodeBuildConfig;
use super::info_node::{AreaRef, InfoNode};
use super::node_registry::NodeRegistry;
use nav_common::{midpoint, raised, Error, Result};
use nav_mesh::{AreaAttributes, AreaId, Direction, NavArea, NavMesh};

/// Upper bound on interior samples along either axis of one area
pub const MAX_INTERIOR_SAMPLES: i64 = 256;

/// Crouch-only or jump-only areas are skipped unless marked precise.
/// Areas with an extent outside the world are skipped as well.
pub fn is_ignorable(area: &NavArea) -> bool {
    let attr = area.attributes;
    let crouch_or_jump = !attr.contains(AreaAttributes::PRECISE)
        && attr.intersects(AreaAttributes::CROUCH | AreaAttributes::JUMP);
    crouch_or_jump || !area.is_bounded()
}

/// Offsets of the (source, target) flank points from a portal center
fn flank_offsets(dir: Direction, size: f32) -> (Vec3, Vec3) {
    match dir {
        Direction::North => (Vec3::new(0.0, size, 0.0), Vec3::new(0.0, -size, 0.0)),
        Direction::South => (Vec3::new(0.0, -size, 0.0), Vec3::new(0.0, size, 0.0)),
        Direction::East => (Vec3::new(-size, 0.0, 0.0), Vec3::new(size, 0.0, 0.0)),
        Direction::West => (Vec3::new(size, 0.0, 0.0), Vec3::new(-size, 0.0, 0.0)),
    }
}

/// Generates candidates for one conversion run
pub struct NodeGenerator<'m> {
    mesh: &'m NavMesh,
    config: NodeBuildConfig,
    /// Unordered area id pairs already handled in connection mode
    visited: HashSet<(AreaId, AreaId)>,
}

impl<'m> NodeGenerator<'m> {
    /// Fails if the configuration is invalid or the mesh is not resolved
    pub fn new(mesh: &'m NavMesh, config: NodeBuildConfig) -> Result<Self> {
        config.validate()?;
        if !mesh.is_resolved() {
            return Err(Error::CorruptData(
                "navigation mesh must be resolved before generating nodes".to_string(),
            ));
        }

        Ok(Self {
            mesh,
            config,
            visited: HashSet::new(),
        })
    }

    pub fn config(&self) -> &NodeBuildConfig {
        &self.config
    }

    fn area_ref(&self, index: usize) -> AreaRef {
        AreaRef::new(index, self.mesh.areas()[index].id)
    }

    fn node(&self, source: usize, origin: Vec3, target: Option<usize>) -> InfoNode {
        InfoNode::with_hull(
            self.area_ref(source),
            origin,
            target.map(|t| self.area_ref(t)),
            self.config.hull_mins,
            self.config.hull_maxs,
        )
    }

    /// Usable area at `index` of an adjacency or encounter reference
    fn usable_target(&self, index: Option<usize>) -> Option<usize> {
        let index = index?;
        let area = self.mesh.area(index)?;
        (!is_ignorable(area)).then_some(index)
    }

    /// Flank points around every portal not visited yet, from either side
    pub fn connection_candidates(&mut self, source: usize) -> Vec<InfoNode> {
        let mut out = Vec::new();
        let mesh = self.mesh;
        let Some(area) = mesh.area(source) else {
            return out;
        };

        for dir in Direction::ALL {
            for connect in area.connections(dir) {
                let Some(ti) = self.usable_target(connect.area) else {
                    continue;
                };
                let target = &mesh.areas()[ti];

                let pair = (area.id.min(target.id), area.id.max(target.id));
                if !self.visited.insert(pair) {
                    continue;
                }

                let (hook, _) = area.compute_portal(target, dir);
                let (from_offset, to_offset) = flank_offsets(dir, self.config.flank_distance);

                let mut from = hook + from_offset;
                from.z = area.get_z(&from);
                let mut to = hook + to_offset;
                to.z = target.get_z(&to);
                let draw_to = target.closest_point(&to);

                if (draw_to.z - from.z).abs() > self.config.step_height {
                    continue;
                }

                let dz = self.config.z_offset;
                out.push(self.node(source, raised(&midpoint(&from, &draw_to), dz), Some(ti)));
                out.push(self.node(source, raised(&from, dz), Some(ti)));
                out.push(self.node(source, raised(&draw_to, dz), Some(ti)));
            }
        }
        out
    }

    /// Both ends of every derived encounter path, lowered to the floor
    pub fn encounter_candidates(&self, source: usize) -> Vec<InfoNode> {
        let mut out = Vec::new();
        let Some(area) = self.mesh.area(source) else {
            return out;
        };

        for encounter in &area.encounters {
            let Some(path) = encounter.path() else {
                continue;
            };
            let (from, to) = encounter.endpoints();
            for (connect, point) in [(from, path.source), (to, path.target)] {
                if let Some(ti) = self.usable_target(connect.area) {
                    let origin = raised(&point, -self.config.encounter_drop);
                    out.push(self.node(source, origin, Some(ti)));
                }
            }
        }
        out
    }

    /// Sample grid inside the area, or its center if the area is small
    pub fn interior_candidates(&self, source: usize) -> Vec<InfoNode> {
        let mut out = Vec::new();
        let Some(area) = self.mesh.area(source) else {
            return out;
        };

        let ext = &area.extent;
        let delta = ext.delta();
        let center = ext.center();
        let size = self.config.interior_sample_size;
        let dz = self.config.z_offset;

        let count_x = ((delta.x / size) as i64).clamp(1, MAX_INTERIOR_SAMPLES);
        let count_y = ((delta.y / size) as i64).clamp(1, MAX_INTERIOR_SAMPLES);

        if count_x == 1 && count_y == 1 {
            out.push(self.node(source, raised(&center, dz), None));
            return out;
        }

        let step_x = delta.x / count_x as f32;
        let step_y = delta.y / count_y as f32;
        for i in 0..count_x {
            let x = if count_x > 1 {
                ext.lo.x + step_x * (i + 1) as f32
            } else {
                center.x
            };
            for j in 0..count_y {
                let y = if count_y > 1 {
                    ext.lo.y + step_y * (j + 1) as f32
                } else {
                    center.y
                };
                let point = area.closest_point(&Vec3::new(x, y, center.z));
                out.push(self.node(source, raised(&point, dz), None));
            }
        }
        out
    }

    /// Every candidate of every usable area, in generation order
    pub fn candidates(&mut self) -> Vec<InfoNode> {
        let modes: Vec<BuildMode> = self.config.build_flags.modes().collect();
        let mut out = Vec::new();
        let mesh = self.mesh;

        for (index, area) in mesh.areas().iter().enumerate() {
            if is_ignorable(area) {
                log::debug!("Skipping area #{} ({:?})", area.id, area.attributes);
                continue;
            }
            for mode in &modes {
                let mut batch = match mode {
                    BuildMode::Connections => self.connection_candidates(index),
                    BuildMode::Encounters => self.encounter_candidates(index),
                    BuildMode::Interior => self.interior_candidates(index),
                };
                out.append(&mut batch);
            }
        }
        out
    }

    /// Runs every candidate through a fresh registry and returns the
    /// surviving nodes in emission order
    pub fn build(mut self) -> Result<Vec<InfoNode>> {
        let candidates = self.candidates();
        let mut registry = NodeRegistry::new();
        for node in candidates.iter().cloned() {
            registry.add(node);
        }

        log::debug!(
            "{} candidates, {} merges, {} nodes",
            candidates.len(),
            registry.merge_count(),
            registry.len()
        );

        registry.into_sorted(self.mesh)
    }
}

/// Generates the final node list of a resolved mesh
pub fn generate(mesh: &NavMesh, config: &NodeBuildConfig) -> Result<Vec<InfoNode>> {
    NodeGenerator::new(mesh, config.clone())?.build()
}
