//! Live set of placement nodes with collision merging
//!
//! Nodes keep their insertion order. Inserting a node whose hull overlaps a
//! live node merges the two, and the result goes back through the same
//! conflict check until nothing overlaps.

use super::info_node::InfoNode;
use nav_common::{Error, Result};
use nav_mesh::NavMesh;

/// A node waiting for a conflict-free slot
enum Pending {
    /// Not in the registry yet
    Detached(InfoNode),
    /// Already live at this slot, re-checked after absorbing another node
    Live(usize),
}

#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    /// Insertion-ordered slots, `None` once a node is superseded
    slots: Vec<Option<InfoNode>>,
    live: usize,
    merges: usize,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of merges performed so far
    pub fn merge_count(&self) -> usize {
        self.merges
    }

    /// Live nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &InfoNode> {
        self.slots.iter().flatten()
    }

    /// First live node in insertion order overlapping `node`, skipping the
    /// slot `node` itself occupies
    fn first_conflict(&self, node: &InfoNode, skip: Option<usize>) -> Option<usize> {
        self.slots.iter().enumerate().find_map(|(i, slot)| match slot {
            Some(live) if Some(i) != skip && live.intersects(node) => Some(i),
            _ => None,
        })
    }

    fn take(&mut self, slot: usize) -> Option<InfoNode> {
        let node = self.slots.get_mut(slot)?.take()?;
        self.live -= 1;
        Some(node)
    }

    /// Inserts a node, merging it with whatever it collides with
    pub fn add(&mut self, node: InfoNode) {
        let mut pending = Pending::Detached(node);

        loop {
            let conflict = match &pending {
                Pending::Detached(node) => self.first_conflict(node, None),
                Pending::Live(slot) => match &self.slots[*slot] {
                    Some(node) => self.first_conflict(node, Some(*slot)),
                    None => return,
                },
            };

            let Some(conflict) = conflict else {
                if let Pending::Detached(node) = pending {
                    self.slots.push(Some(node));
                    self.live += 1;
                }
                return;
            };

            let incoming = match pending {
                Pending::Detached(node) => node,
                Pending::Live(slot) => match self.take(slot) {
                    Some(node) => node,
                    None => return,
                },
            };

            self.merges += 1;
            let absorbing = self.slots[conflict]
                .as_ref()
                .is_some_and(InfoNode::is_merged);
            pending = if absorbing {
                if let Some(existing) = self.slots[conflict].as_mut() {
                    existing.absorb(incoming);
                }
                Pending::Live(conflict)
            } else {
                match self.take(conflict) {
                    Some(existing) => Pending::Detached(InfoNode::merge_pair(existing, incoming)),
                    None => Pending::Detached(incoming),
                }
            };
        }
    }

    /// Live nodes in emission order: ascending place label, then ascending
    /// member id list. Fails if any node is malformed.
    pub fn into_sorted(self, mesh: &NavMesh) -> Result<Vec<InfoNode>> {
        let mut keyed = Vec::with_capacity(self.live);
        for node in self.slots.into_iter().flatten() {
            if !node.is_valid() {
                return Err(Error::CorruptNode(format!(
                    "{} at {} ({})",
                    node.name(),
                    node.origin(),
                    node.id_string()
                )));
            }
            keyed.push((node.place_label(mesh), node.id_list(), node));
        }

        keyed.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));
        Ok(keyed.into_iter().map(|(_, _, node)| node).collect())
    }
}
