//! Entity: a single node in the object graph, composing a property bag,
//! optional containment links, an optional open/close protocol, and a
//! data-driven per-step update hook.

use std::collections::BTreeMap;

use contracts::{EntityId, PropValue, TickRule, VerbDef, VerbEffect};

/// Open/close state for entities that support the sub-protocol. Both
/// transitions fail softly with an explanatory message rather than raising.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Portal {
    pub openable: bool,
    pub open: bool,
}

impl Portal {
    pub fn closed() -> Self {
        Self {
            openable: true,
            open: false,
        }
    }

    pub fn sealed() -> Self {
        Self {
            openable: false,
            open: false,
        }
    }
}

/// A named node with mutable properties. Containment and openability are
/// capabilities on the same struct rather than subclasses; a leaf entity is
/// simply one that never receives children.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub props: BTreeMap<String, PropValue>,
    /// Relation only; ownership lives in the world arena.
    pub parent: Option<EntityId>,
    /// Insertion order is display and traversal order.
    pub children: Vec<EntityId>,
    pub portal: Option<Portal>,
    pub tick_rules: Vec<TickRule>,
}

impl Entity {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            props: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
            portal: None,
            tick_rules: Vec::new(),
        }
    }

    /// Missing keys are a valid result, never an error.
    pub fn get_property(&self, key: &str) -> Option<&PropValue> {
        self.props.get(key)
    }

    /// Unconditional overwrite; the bag is dynamically typed by design.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.props.insert(key.into(), value.into());
    }

    /// One discrete unit of time-based state change. Rules apply in order
    /// and only touch this entity's own bag; cross-entity effects belong to
    /// verb dispatch in the simulation loop. No rules means no-op.
    pub fn tick(&mut self) {
        let rules = self.tick_rules.clone();
        for rule in &rules {
            match rule {
                TickRule::Adjust {
                    key,
                    delta,
                    min,
                    max,
                } => {
                    if let Some(current) = self.props.get(key) {
                        let next = current.adjusted(*delta, *min, *max);
                        self.props.insert(key.clone(), next);
                    }
                }
                TickRule::SetWhen {
                    key,
                    cmp,
                    threshold,
                    set_key,
                    set_value,
                } => {
                    let fires = self
                        .props
                        .get(key)
                        .and_then(PropValue::as_f64)
                        .map(|value| cmp.compare(value, *threshold))
                        .unwrap_or(false);
                    if fires {
                        self.props.insert(set_key.clone(), set_value.clone());
                    }
                }
            }
        }
    }

    /// Human-readable one-line rendering: name, property values in key
    /// order, portal state.
    pub fn describe(&self) -> String {
        let mut line = self.name.clone();
        if !self.props.is_empty() {
            let rendered = self
                .props
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect::<Vec<_>>()
                .join(", ");
            line.push_str(&format!(" [{rendered}]"));
        }
        if let Some(portal) = &self.portal {
            line.push_str(if portal.open { " (open)" } else { " (closed)" });
        }
        line
    }

    pub fn open(&mut self) -> (String, bool) {
        match self.portal.as_mut() {
            None => (format!("The {} cannot be opened.", self.name), false),
            Some(portal) if !portal.openable => {
                (format!("The {} cannot be opened.", self.name), false)
            }
            Some(portal) if portal.open => (format!("The {} is already open.", self.name), false),
            Some(portal) => {
                portal.open = true;
                (format!("You open the {}.", self.name), true)
            }
        }
    }

    pub fn close(&mut self) -> (String, bool) {
        match self.portal.as_mut() {
            None => (format!("The {} cannot be closed.", self.name), false),
            Some(portal) if !portal.openable => {
                (format!("The {} cannot be closed.", self.name), false)
            }
            Some(portal) if !portal.open => {
                (format!("The {} is already closed.", self.name), false)
            }
            Some(portal) => {
                portal.open = false;
                (format!("You close the {}.", self.name), true)
            }
        }
    }

    /// Whether this entity's runtime shape makes the verb legal right now.
    /// Numeric effects need a numeric slot, toggles a boolean slot, and the
    /// open/close protocol a portal; the optional gate is evaluated last.
    pub fn eligible_for(&self, verb: &VerbDef) -> bool {
        let shape_ok = match &verb.effect {
            VerbEffect::Adjust { key, .. } => self
                .props
                .get(key)
                .map(PropValue::is_numeric)
                .unwrap_or(false),
            VerbEffect::Toggle { key } => {
                matches!(self.props.get(key), Some(PropValue::Bool(_)))
            }
            VerbEffect::Open | VerbEffect::Close => self.portal.is_some(),
        };
        if !shape_ok {
            return false;
        }
        verb.requires
            .as_ref()
            .map(|gate| gate.holds(self.props.get(&gate.key)))
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Cmp;

    #[test]
    fn missing_property_is_absent_not_error() {
        let entity = Entity::new(EntityId(1), "lantern");
        assert!(entity.get_property("fuel").is_none());
    }

    #[test]
    fn set_property_overwrites_across_types() {
        let mut entity = Entity::new(EntityId(1), "lantern");
        entity.set_property("fuel", 10_i64);
        entity.set_property("fuel", "empty");
        assert_eq!(
            entity.get_property("fuel"),
            Some(&PropValue::Text("empty".to_string()))
        );
    }

    #[test]
    fn tick_without_rules_is_noop() {
        let mut entity = Entity::new(EntityId(1), "stone");
        entity.set_property("mass", 3_i64);
        let before = entity.clone();
        entity.tick();
        assert_eq!(entity, before);
    }

    #[test]
    fn adjust_rule_decays_and_clamps() {
        let mut entity = Entity::new(EntityId(1), "candle");
        entity.set_property("wax", 2_i64);
        entity.tick_rules.push(TickRule::Adjust {
            key: "wax".to_string(),
            delta: -1.0,
            min: Some(0.0),
            max: None,
        });
        entity.tick();
        entity.tick();
        entity.tick();
        assert_eq!(entity.get_property("wax"), Some(&PropValue::Int(0)));
    }

    #[test]
    fn set_when_rule_fires_at_threshold() {
        let mut entity = Entity::new(EntityId(1), "kettle");
        entity.set_property("temp", 99_i64);
        entity.tick_rules.push(TickRule::Adjust {
            key: "temp".to_string(),
            delta: 1.0,
            min: None,
            max: None,
        });
        entity.tick_rules.push(TickRule::SetWhen {
            key: "temp".to_string(),
            cmp: Cmp::Ge,
            threshold: 100.0,
            set_key: "boiling".to_string(),
            set_value: PropValue::Bool(true),
        });
        entity.tick();
        assert_eq!(entity.get_property("boiling"), Some(&PropValue::Bool(true)));
    }

    #[test]
    fn describe_renders_props_and_portal() {
        let mut entity = Entity::new(EntityId(1), "chest");
        entity.set_property("gold", 5_i64);
        entity.portal = Some(Portal::closed());
        assert_eq!(entity.describe(), "chest [gold=5] (closed)");
    }

    #[test]
    fn open_close_fail_softly() {
        let mut window = Entity::new(EntityId(1), "window");
        window.portal = Some(Portal::sealed());
        let (message, succeeded) = window.open();
        assert!(!succeeded);
        assert_eq!(message, "The window cannot be opened.");

        let mut chest = Entity::new(EntityId(2), "chest");
        chest.portal = Some(Portal::closed());
        assert!(chest.open().1);
        let (message, succeeded) = chest.open();
        assert!(!succeeded);
        assert_eq!(message, "The chest is already open.");
        assert!(chest.close().1);
        assert!(!chest.close().1);
    }
}
