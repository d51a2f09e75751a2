//! ActionCatalog: the full set of currently legal action labels, derived
//! from the live object graph and rebuilt after every committed step.

use std::collections::BTreeMap;

use contracts::{Action, ActionTarget, VerbDef};

use crate::world::World;

/// Universal no-op inspection action; always present.
pub const LOOK_LABEL: &str = "look";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionCatalog {
    actions: BTreeMap<String, Action>,
}

impl ActionCatalog {
    /// Derive the catalog for the current graph. Labels combine the verb
    /// token with the target's display name and bind to the entity
    /// instance, not the name; when two entities share a name the first in
    /// traversal order wins and later bindings are ignored. That collision
    /// is deliberate name-based addressing and several scenarios depend on
    /// it.
    pub fn rebuild(world: &World, verbs: &[VerbDef]) -> Self {
        let mut actions = BTreeMap::new();
        actions.insert(
            LOOK_LABEL.to_string(),
            Action {
                label: LOOK_LABEL.to_string(),
                target: ActionTarget::Look,
            },
        );
        for id in world.descendants(world.root()) {
            let Ok(entity) = world.entity(id) else {
                continue;
            };
            for (verb_index, verb) in verbs.iter().enumerate() {
                if !entity.eligible_for(verb) {
                    continue;
                }
                let label = format!("{} {}", verb.verb, entity.name);
                actions.entry(label.clone()).or_insert(Action {
                    label,
                    target: ActionTarget::Apply {
                        verb_index,
                        entity: id,
                    },
                });
            }
        }
        Self { actions }
    }

    pub fn get(&self, label: &str) -> Option<&Action> {
        self.actions.get(label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.actions.contains_key(label)
    }

    /// Labels in lexical order.
    pub fn labels(&self) -> Vec<&str> {
        self.actions.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
