//! Descendant closure over the hierarchy forest.
//!
//! The closure grows one generation at a time from the root: each round adds
//! the children of the previous round's nodes until a round adds nothing.
//! Every node has a single parent pointer, so a node reached twice means the
//! stored edges contain a cycle through the root; that is reported instead of
//! looping.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::entity::hierarchies;
use crate::error::AppResult;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("hierarchy cycle detected at node {node}")]
    Cycle { node: Uuid },
}

/// Incrementally built descendant set of one root node.
#[derive(Debug)]
pub struct Closure {
    members: HashSet<Uuid>,
    frontier: Vec<Uuid>,
}

impl Closure {
    #[must_use]
    pub fn new(root: Uuid) -> Self {
        Self {
            members: HashSet::from([root]),
            frontier: vec![root],
        }
    }

    /// Nodes added in the last round; their children are still unknown.
    #[must_use]
    pub fn frontier(&self) -> &[Uuid] {
        &self.frontier
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Add one generation, given as `(child, parent)` edges.
    ///
    /// Edges whose parent is not on the current frontier are ignored.
    ///
    /// # Errors
    ///
    /// Returns `HierarchyError::Cycle` if a child is already in the closure.
    pub fn absorb<I>(&mut self, edges: I) -> Result<(), HierarchyError>
    where
        I: IntoIterator<Item = (Uuid, Uuid)>,
    {
        let parents: HashSet<Uuid> = self.frontier.iter().copied().collect();
        let mut next = Vec::new();

        for (child, parent) in edges {
            if !parents.contains(&parent) {
                continue;
            }
            if !self.members.insert(child) {
                return Err(HierarchyError::Cycle { node: child });
            }
            next.push(child);
        }

        self.frontier = next;
        Ok(())
    }

    #[must_use]
    pub fn into_members(self) -> HashSet<Uuid> {
        self.members
    }
}

/// Descendants of `root` (inclusive) over an in-memory `(id, parent_id)` list.
///
/// # Errors
///
/// Returns `HierarchyError::Cycle` if the edges loop back into the closure.
pub fn descendants_in(
    root: Uuid,
    nodes: &[(Uuid, Option<Uuid>)],
) -> Result<HashSet<Uuid>, HierarchyError> {
    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for &(id, parent) in nodes {
        if let Some(parent) = parent {
            children.entry(parent).or_default().push(id);
        }
    }

    let mut closure = Closure::new(root);
    while !closure.is_complete() {
        let generation: Vec<(Uuid, Uuid)> = closure
            .frontier()
            .iter()
            .flat_map(|parent| {
                children
                    .get(parent)
                    .into_iter()
                    .flatten()
                    .map(move |child| (*child, *parent))
            })
            .collect();
        closure.absorb(generation)?;
    }

    Ok(closure.into_members())
}

/// Descendants of `root` (inclusive), expanding one generation per query.
///
/// An unknown root yields `{root}`, which then matches no devices.
///
/// # Errors
///
/// Returns `AppError::Database` on store failure and `AppError::DataIntegrity`
/// if the stored hierarchy contains a cycle.
pub async fn resolve_descendants(db: &DatabaseConnection, root: Uuid) -> AppResult<HashSet<Uuid>> {
    let mut closure = Closure::new(root);
    let mut depth = 0_usize;

    while !closure.is_complete() {
        let rows = hierarchies::Entity::find()
            .filter(hierarchies::Column::ParentId.is_in(closure.frontier().to_vec()))
            .all(db)
            .await?;

        closure
            .absorb(
                rows.into_iter()
                    .filter_map(|node| node.parent_id.map(|parent| (node.id, parent))),
            )
            .inspect_err(|e| tracing::error!(root = %root, error = %e, "hierarchy_integrity"))?;
        depth += 1;
    }

    let members = closure.into_members();
    tracing::debug!(root = %root, depth, nodes = members.len(), "hierarchy_resolved");
    Ok(members)
}
