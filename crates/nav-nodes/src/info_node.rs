//! Placement nodes emitted as `info_node` entities
//!
//! A node is either simple (one candidate point of one area) or merged (a
//! group of simple nodes whose hulls collided). Merge groups never nest.

use glam::Vec3;

use super::config::{ENTITY_HULL_DEFAULT_MAX, ENTITY_HULL_DEFAULT_MIN};
use bsp_entities::Entity;
use nav_common::{keyvalue, overlap_bounds, point_in_bounds};
use nav_mesh::{AreaId, Direction, NavMesh};

/// Prefix of the `netname` of every generated node
pub const NETNAME_PREFIX: &str = "nav2ent_";

/// Place label of merged nodes
pub const PLACE_MERGED: &str = "__MERGED";

/// Place label of nodes whose area has no place
pub const PLACE_UNDEFINED: &str = "__UNDEFINED";

pub const INFO_NODE_CLASSNAME: &str = "info_node";

/// An area of the mesh, by index and id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AreaRef {
    pub index: usize,
    pub id: AreaId,
}

impl AreaRef {
    pub fn new(index: usize, id: AreaId) -> Self {
        Self { index, id }
    }
}

#[derive(Debug, Clone)]
pub struct InfoNode {
    source: Option<AreaRef>,
    origin: Vec3,
    target: Option<AreaRef>,
    mins: Vec3,
    maxs: Vec3,
    absmin: Vec3,
    absmax: Vec3,
    members: Vec<InfoNode>,
}

/// Nodes are identified by their origin
impl PartialEq for InfoNode {
    fn eq(&self, other: &Self) -> bool {
        self.origin == other.origin
    }
}

impl InfoNode {
    /// Simple node of `source` with the default hull
    pub fn new(source: AreaRef, origin: Vec3, target: Option<AreaRef>) -> Self {
        Self::with_hull(
            source,
            origin,
            target,
            ENTITY_HULL_DEFAULT_MIN,
            ENTITY_HULL_DEFAULT_MAX,
        )
    }

    pub fn with_hull(
        source: AreaRef,
        origin: Vec3,
        target: Option<AreaRef>,
        mins: Vec3,
        maxs: Vec3,
    ) -> Self {
        Self {
            source: Some(source),
            origin,
            target,
            mins,
            maxs,
            absmin: origin + mins,
            absmax: origin + maxs,
            members: Vec::new(),
        }
    }

    /// Simple node with no source area, which never passes [`InfoNode::is_valid`]
    #[cfg(test)]
    pub(crate) fn without_source(origin: Vec3) -> Self {
        Self {
            source: None,
            ..Self::new(AreaRef::new(0, 0), origin, None)
        }
    }

    pub fn source(&self) -> Option<AreaRef> {
        self.source
    }

    pub fn target(&self) -> Option<AreaRef> {
        self.target
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn absmin(&self) -> Vec3 {
        self.absmin
    }

    pub fn absmax(&self) -> Vec3 {
        self.absmax
    }

    /// Simple nodes merged into this one (empty for simple nodes)
    pub fn members(&self) -> &[InfoNode] {
        &self.members
    }

    pub fn is_merged(&self) -> bool {
        !self.members.is_empty()
    }

    /// Simple nodes need a source area, merged nodes must not nest
    pub fn is_valid(&self) -> bool {
        if self.is_merged() {
            !self.members.iter().any(InfoNode::is_merged)
        } else {
            self.source.is_some()
        }
    }

    /// Inclusive test on all six faces of both hulls
    pub fn intersects(&self, other: &InfoNode) -> bool {
        overlap_bounds(&self.absmin, &self.absmax, &other.absmin, &other.absmax)
    }

    pub fn contains_point(&self, point: &Vec3) -> bool {
        point_in_bounds(point, &self.absmin, &self.absmax)
    }

    /// `merged`, `<source>` or `<source>_<target>`
    pub fn name(&self) -> String {
        if self.is_merged() {
            return "merged".to_string();
        }
        match (self.source, self.target) {
            (Some(source), Some(target)) => format!("{}_{}", source.id, target.id),
            (Some(source), None) => source.id.to_string(),
            _ => String::new(),
        }
    }

    /// Ascending, deduplicated source ids of the areas this node stands for
    pub fn id_list(&self) -> Vec<AreaId> {
        let mut ids: Vec<AreaId> = if self.is_merged() {
            self.members
                .iter()
                .filter_map(|m| m.source.map(|s| s.id))
                .collect()
        } else {
            self.source.map(|s| s.id).into_iter().collect()
        };
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// `;`-joined [`InfoNode::id_list`]
    pub fn id_string(&self) -> String {
        self.id_list()
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Place name of the source area, or one of the reserved labels
    pub fn place_label(&self, mesh: &NavMesh) -> String {
        if self.is_merged() {
            return PLACE_MERGED.to_string();
        }
        self.source
            .and_then(|s| mesh.area(s.index))
            .and_then(|area| mesh.place_of(area))
            .map(|place| place.name.clone())
            .unwrap_or_else(|| PLACE_UNDEFINED.to_string())
    }

    /// Direction of the target among the source's adjacency lists
    pub fn direction(&self, mesh: &NavMesh) -> Option<Direction> {
        if self.is_merged() {
            return None;
        }
        let target = self.target?;
        let source = mesh.area(self.source?.index)?;
        Direction::ALL.into_iter().find(|dir| {
            source
                .connections(*dir)
                .iter()
                .any(|c| c.area == Some(target.index))
        })
    }

    /// Sorted, deduplicated member names joined with `;`
    pub fn noise(&self) -> String {
        let mut names: Vec<String> = self.members.iter().map(InfoNode::name).collect();
        names.sort();
        names.dedup();
        names.join(";")
    }

    /// Adds `node` to the member set (its members if it is merged itself),
    /// skipping origins already present
    pub fn absorb(&mut self, node: InfoNode) {
        let incoming = if node.is_merged() {
            node.members
        } else {
            vec![node]
        };
        for member in incoming {
            if !self.members.contains(&member) {
                self.members.push(member);
            }
        }
    }

    /// New merged node at `existing`'s origin owning both nodes
    pub fn merge_pair(existing: InfoNode, incoming: InfoNode) -> InfoNode {
        let mut merged = InfoNode {
            source: None,
            origin: existing.origin,
            target: None,
            mins: existing.mins,
            maxs: existing.maxs,
            absmin: existing.absmin,
            absmax: existing.absmax,
            members: Vec::new(),
        };
        merged.absorb(existing);
        merged.absorb(incoming);
        merged
    }

    /// Entity block with keys in output order
    pub fn to_entity(&self, mesh: &NavMesh) -> Entity {
        let sequence = self
            .direction(mesh)
            .map(|dir| (dir as u8).to_string())
            .unwrap_or_default();

        Entity::new()
            .with("origin", keyvalue(&self.origin))
            .with("netname", format!("{}{}", NETNAME_PREFIX, self.name()))
            .with("message", self.place_label(mesh))
            .with("sequence", sequence)
            .with("noise", self.noise())
            .with("classname", INFO_NODE_CLASSNAME)
    }
}

/// True for entities written by an earlier run: a `nav2ent_` netname and a
/// classname that is absent or non-empty
pub fn is_generated_entity(entity: &Entity) -> bool {
    let generated = entity
        .get("netname")
        .is_some_and(|name| name.starts_with(NETNAME_PREFIX));
    let classname = entity.classname().map_or(true, |c| !c.is_empty());
    generated && classname
}
