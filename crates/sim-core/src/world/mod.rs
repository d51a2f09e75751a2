//! World: the entity arena and the containment tree rooted at the unique
//! parentless world entity. Ownership uniqueness is enforced by `attach`
//! (auto-detach), not by callers.

use std::collections::BTreeMap;

use contracts::EntityId;
use thiserror::Error;

use crate::entity::Entity;

mod inspect;
#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),
    /// The one programming-error condition: detaching an entity that is
    /// not a child of the given container means the containment invariant
    /// was already broken upstream.
    #[error("{child} is not a child of {parent}")]
    NotAChild { parent: EntityId, child: EntityId },
    #[error("attaching {child} under {parent} would create a cycle")]
    CycleRejected { parent: EntityId, child: EntityId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct World {
    entities: BTreeMap<EntityId, Entity>,
    root: EntityId,
    next_id: u64,
}

impl World {
    pub fn new(root_name: impl Into<String>) -> Self {
        let root = EntityId(0);
        let mut entities = BTreeMap::new();
        entities.insert(root, Entity::new(root, root_name));
        Self {
            entities,
            root,
            next_id: 1,
        }
    }

    pub fn root(&self) -> EntityId {
        self.root
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// All arena entities in id order, detached ones included.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entity(&self, id: EntityId) -> Result<&Entity, WorldError> {
        self.entities.get(&id).ok_or(WorldError::UnknownEntity(id))
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity, WorldError> {
        self.entities
            .get_mut(&id)
            .ok_or(WorldError::UnknownEntity(id))
    }

    /// Create a detached entity. Scenario setup usually follows with
    /// `attach`, or uses `spawn_in` directly.
    pub fn spawn(&mut self, name: impl Into<String>) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, Entity::new(id, name));
        id
    }

    pub fn spawn_in(
        &mut self,
        parent: EntityId,
        name: impl Into<String>,
    ) -> Result<EntityId, WorldError> {
        if !self.contains(parent) {
            return Err(WorldError::UnknownEntity(parent));
        }
        let id = self.spawn(name);
        self.attach(parent, id)?;
        Ok(id)
    }

    /// Attach `child` under `parent`, auto-detaching it from any current
    /// parent first. This is where the at-most-one-parent invariant lives.
    pub fn attach(&mut self, parent: EntityId, child: EntityId) -> Result<(), WorldError> {
        if !self.contains(parent) {
            return Err(WorldError::UnknownEntity(parent));
        }
        if !self.contains(child) {
            return Err(WorldError::UnknownEntity(child));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(WorldError::CycleRejected { parent, child });
        }
        if let Some(current_parent) = self.entity(child)?.parent {
            self.detach(current_parent, child)?;
        }
        self.entity_mut(parent)?.children.push(child);
        self.entity_mut(child)?.parent = Some(parent);
        Ok(())
    }

    pub fn detach(&mut self, parent: EntityId, child: EntityId) -> Result<(), WorldError> {
        let position = self
            .entity(parent)?
            .children
            .iter()
            .position(|existing| *existing == child)
            .ok_or(WorldError::NotAChild { parent, child })?;
        self.entity_mut(parent)?.children.remove(position);
        self.entity_mut(child)?.parent = None;
        Ok(())
    }

    /// No-op for roots.
    pub fn detach_self(&mut self, child: EntityId) -> Result<(), WorldError> {
        match self.entity(child)?.parent {
            Some(parent) => self.detach(parent, child),
            None => Ok(()),
        }
    }

    /// Pre-order depth-first traversal of the subtree under `id`, self
    /// excluded, children in insertion order. Deterministic; callers must
    /// not rely on the ordering for anything beyond that.
    pub fn descendants(&self, id: EntityId) -> Vec<EntityId> {
        let mut ordered = Vec::new();
        let mut stack = self
            .entities
            .get(&id)
            .map(|entity| entity.children.iter().rev().copied().collect::<Vec<_>>())
            .unwrap_or_default();
        while let Some(current) = stack.pop() {
            ordered.push(current);
            if let Some(entity) = self.entities.get(&current) {
                for child in entity.children.iter().rev() {
                    stack.push(*child);
                }
            }
        }
        ordered
    }

    /// Direct children only. Zero, one, or many matches; ambiguity is a
    /// first-class outcome and callers pick their own disambiguation.
    pub fn find_by_name(&self, parent: EntityId, name: &str) -> Vec<EntityId> {
        self.entities
            .get(&parent)
            .map(|entity| {
                entity
                    .children
                    .iter()
                    .filter(|child| {
                        self.entities
                            .get(child)
                            .map(|candidate| candidate.name == name)
                            .unwrap_or(false)
                    })
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First pre-order match anywhere in the tree, root included.
    pub fn first_by_name(&self, name: &str) -> Option<EntityId> {
        if self
            .entities
            .get(&self.root)
            .map(|root| root.name == name)
            .unwrap_or(false)
        {
            return Some(self.root);
        }
        self.descendants(self.root).into_iter().find(|id| {
            self.entities
                .get(id)
                .map(|entity| entity.name == name)
                .unwrap_or(false)
        })
    }

    pub fn open(&mut self, id: EntityId) -> Result<(String, bool), WorldError> {
        Ok(self.entity_mut(id)?.open())
    }

    pub fn close(&mut self, id: EntityId) -> Result<(String, bool), WorldError> {
        Ok(self.entity_mut(id)?.close())
    }

    /// Advance every entity in the tree by one tick, exactly once, in
    /// traversal order.
    pub fn tick_all(&mut self) {
        for id in self.descendants(self.root) {
            if let Some(entity) = self.entities.get_mut(&id) {
                entity.tick();
            }
        }
    }

    fn is_ancestor(&self, candidate: EntityId, of: EntityId) -> bool {
        let mut cursor = self.entities.get(&of).and_then(|entity| entity.parent);
        while let Some(current) = cursor {
            if current == candidate {
                return true;
            }
            cursor = self.entities.get(&current).and_then(|entity| entity.parent);
        }
        false
    }
}
