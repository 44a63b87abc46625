//! Arena snapshot of the parent/child relation
//!
//! Built once from the store's `(eventId, parentEventId)` pairs. Nodes are
//! indices into flat vectors; traversals use explicit queues, so depth is
//! bounded only by memory. Building fails if any parent chain loops.

use std::collections::{HashMap, VecDeque};

use uuid::Uuid;

use super::errors::{HierarchyError, HierarchyResult};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    OnPath,
    Done,
}

/// Forest of events
#[derive(Debug, Clone, Default)]
pub struct EventTree {
    ids: Vec<Uuid>,
    index: HashMap<Uuid, usize>,
    /// Parent id as recorded, even when it matches no event
    parent_id: Vec<Option<Uuid>>,
    /// Parent node, `None` for roots and dangling references
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
}

impl EventTree {
    /// Builds the tree, rejecting cycles.
    pub fn build(links: impl IntoIterator<Item = (Uuid, Option<Uuid>)>) -> HierarchyResult<Self> {
        let mut tree = EventTree::default();
        for (id, parent) in links {
            if let Some(&existing) = tree.index.get(&id) {
                tree.parent_id[existing] = parent;
                continue;
            }
            tree.index.insert(id, tree.ids.len());
            tree.ids.push(id);
            tree.parent_id.push(parent);
        }

        tree.parent = tree
            .parent_id
            .iter()
            .map(|p| p.and_then(|p| tree.index.get(&p).copied()))
            .collect();

        tree.children = vec![Vec::new(); tree.ids.len()];
        for (node, parent) in tree.parent.iter().enumerate() {
            if let Some(parent) = parent {
                tree.children[*parent].push(node);
            }
        }

        tree.check_acyclic()?;
        Ok(tree)
    }

    /// Walks every parent chain once; a chain that reaches a node already on
    /// the current walk is a cycle.
    fn check_acyclic(&self) -> HierarchyResult<()> {
        let mut state = vec![Visit::New; self.ids.len()];
        for start in 0..self.ids.len() {
            let mut path = Vec::new();
            let mut current = Some(start);
            while let Some(node) = current {
                match state[node] {
                    Visit::Done => break,
                    Visit::OnPath => {
                        let from = path.iter().position(|n| *n == node).unwrap_or(0);
                        let cycle: Vec<Uuid> = path[from..].iter().map(|n| self.ids[*n]).collect();
                        return Err(HierarchyError::cycle(&cycle));
                    }
                    Visit::New => {
                        state[node] = Visit::OnPath;
                        path.push(node);
                        current = self.parent[node];
                    }
                }
            }
            for node in path {
                state[node] = Visit::Done;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.index.contains_key(id)
    }

    /// Events without a parent id
    pub fn roots(&self) -> Vec<Uuid> {
        (0..self.ids.len())
            .filter(|n| self.parent_id[*n].is_none())
            .map(|n| self.ids[n])
            .collect()
    }

    /// Direct children
    pub fn children(&self, id: &Uuid) -> HierarchyResult<Vec<Uuid>> {
        let node = self.node(id)?;
        Ok(self.children[node].iter().map(|n| self.ids[*n]).collect())
    }

    /// Parent chain, nearest first. A dangling parent id ends the chain and
    /// is included.
    pub fn ancestors(&self, id: &Uuid) -> HierarchyResult<Vec<Uuid>> {
        let mut node = self.node(id)?;
        let mut chain = Vec::new();
        loop {
            match (self.parent[node], self.parent_id[node]) {
                (Some(parent), _) => {
                    chain.push(self.ids[parent]);
                    node = parent;
                }
                (None, Some(dangling)) => {
                    chain.push(dangling);
                    break;
                }
                (None, None) => break,
            }
        }
        Ok(chain)
    }

    /// All descendants in breadth-first order
    pub fn descendants(&self, id: &Uuid) -> HierarchyResult<Vec<Uuid>> {
        let node = self.node(id)?;
        let mut out = Vec::new();
        let mut queue: VecDeque<usize> = self.children[node].iter().copied().collect();
        while let Some(next) = queue.pop_front() {
            out.push(self.ids[next]);
            queue.extend(self.children[next].iter().copied());
        }
        Ok(out)
    }

    /// Parent-to-child pairs in ancestor-before-descendant order, starting
    /// from the roots. Subtrees under a dangling parent are not reached.
    pub fn edges_from_roots(&self) -> Vec<(Uuid, Vec<Uuid>)> {
        let mut out = Vec::new();
        let mut queue: VecDeque<usize> = (0..self.ids.len())
            .filter(|n| self.parent_id[*n].is_none())
            .collect();
        while let Some(node) = queue.pop_front() {
            let children = &self.children[node];
            if !children.is_empty() {
                out.push((self.ids[node], children.iter().map(|c| self.ids[*c]).collect()));
                queue.extend(children.iter().copied());
            }
        }
        out
    }

    /// Events whose parent chain ends at a dangling reference
    pub fn detached(&self) -> Vec<Uuid> {
        (0..self.ids.len())
            .filter(|n| {
                let mut node = *n;
                loop {
                    match (self.parent[node], self.parent_id[node]) {
                        (Some(p), _) => node = p,
                        (None, Some(_)) => return true,
                        (None, None) => return false,
                    }
                }
            })
            .map(|n| self.ids[n])
            .collect()
    }

    fn node(&self, id: &Uuid) -> HierarchyResult<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| HierarchyError::unknown_event(id))
    }
}
