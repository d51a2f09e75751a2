use contracts::{EntityId, EntitySnapshot, WorldSnapshot, SCHEMA_VERSION_V1};
use serde_json::{json, Value};

use super::World;

impl World {
    /// Multi-line report over the whole tree, two-space indent per depth.
    pub fn describe(&self) -> String {
        let mut lines = Vec::new();
        self.describe_into(self.root(), 0, &mut lines);
        lines.join("\n")
    }

    fn describe_into(&self, id: EntityId, depth: usize, lines: &mut Vec<String>) {
        let Ok(entity) = self.entity(id) else {
            return;
        };
        lines.push(format!("{}{}", "  ".repeat(depth), entity.describe()));
        for child in &entity.children {
            self.describe_into(*child, depth + 1, lines);
        }
    }

    /// Flattened view of the whole arena in id order, detached entities
    /// included.
    pub fn snapshot(&self, run_id: &str, tick: u64) -> WorldSnapshot {
        let entities = self
            .entities()
            .map(|entity| EntitySnapshot {
                id: entity.id,
                name: entity.name.clone(),
                parent: entity.parent,
                children: entity.children.clone(),
                props: entity.props.clone(),
                open: entity.portal.map(|portal| portal.open),
            })
            .collect();
        WorldSnapshot {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: run_id.to_string(),
            tick,
            root: self.root(),
            entities,
        }
    }

    /// JSON view of the first entity matching `name`, pre-order. Child
    /// names are resolved so the caller sees display names, not ids.
    pub fn inspect_by_name(&self, name: &str) -> Option<Value> {
        let id = self.first_by_name(name)?;
        let entity = self.entity(id).ok()?;
        let children = entity
            .children
            .iter()
            .filter_map(|child| self.entity(*child).ok())
            .map(|child| child.name.clone())
            .collect::<Vec<_>>();
        let parent_name = entity
            .parent
            .and_then(|parent| self.entity(parent).ok())
            .map(|parent| parent.name.clone());
        Some(json!({
            "id": entity.id.to_string(),
            "name": entity.name,
            "parent": parent_name,
            "children": children,
            "props": entity.props,
            "open": entity.portal.map(|portal| portal.open),
        }))
    }
}
