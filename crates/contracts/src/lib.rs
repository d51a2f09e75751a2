//! v1 cross-boundary contracts shared by the simulation kernel and its drivers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION_V1: &str = "1.0";

/// Stable identity of an entity within one run. Display names are not
/// unique across the object graph; entity ids are.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity:{}", self.0)
    }
}

/// A single scalar slot in an entity's property bag. Absence of a key is a
/// valid lookup result, never an error, so there is no null variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl PropValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropValue::Int(value) => Some(*value as f64),
            PropValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, PropValue::Int(_) | PropValue::Float(_))
    }

    /// Numeric drift with optional clamping. Integer slots stay integers
    /// unless the result has a fractional part; non-numeric slots are
    /// returned unchanged.
    pub fn adjusted(&self, delta: f64, min: Option<f64>, max: Option<f64>) -> PropValue {
        let Some(current) = self.as_f64() else {
            return self.clone();
        };
        let mut next = current + delta;
        if let Some(floor) = min {
            next = next.max(floor);
        }
        if let Some(ceiling) = max {
            next = next.min(ceiling);
        }
        match self {
            PropValue::Int(_) if next.fract() == 0.0 => PropValue::Int(next as i64),
            _ => PropValue::Float(next),
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Int(value) => write!(f, "{value}"),
            PropValue::Float(value) => write!(f, "{value}"),
            PropValue::Bool(value) => write!(f, "{value}"),
            PropValue::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Text(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Text(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cmp {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
    Ne,
}

impl Cmp {
    pub fn compare(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            Cmp::Lt => lhs < rhs,
            Cmp::Le => lhs <= rhs,
            Cmp::Eq => lhs == rhs,
            Cmp::Ge => lhs >= rhs,
            Cmp::Gt => lhs > rhs,
            Cmp::Ne => lhs != rhs,
        }
    }
}

/// Availability gate evaluated against a target entity's property bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub key: String,
    pub cmp: Cmp,
    pub value: PropValue,
}

impl Condition {
    pub fn new(key: impl Into<String>, cmp: Cmp, value: impl Into<PropValue>) -> Self {
        Self {
            key: key.into(),
            cmp,
            value: value.into(),
        }
    }

    /// A missing key never satisfies a condition. Numeric slots compare
    /// numerically; booleans and text only support equality tests.
    pub fn holds(&self, value: Option<&PropValue>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match (value.as_f64(), self.value.as_f64()) {
            (Some(lhs), Some(rhs)) => self.cmp.compare(lhs, rhs),
            _ => match self.cmp {
                Cmp::Eq => value == &self.value,
                Cmp::Ne => value != &self.value,
                _ => false,
            },
        }
    }
}

/// Per-entity update rule applied once per committed step. Rules only read
/// and write the owning entity's property bag; cross-entity effects belong
/// to verb dispatch in the simulation loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TickRule {
    /// Saturating numeric drift: decay (negative delta) or accumulation.
    Adjust {
        key: String,
        delta: f64,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Threshold-triggered transition: when `props[key] cmp threshold`,
    /// overwrite `set_key` with `set_value`.
    SetWhen {
        key: String,
        cmp: Cmp,
        threshold: f64,
        set_key: String,
        set_value: PropValue,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VerbEffect {
    Adjust { key: String, delta: f64 },
    Toggle { key: String },
    Open,
    Close,
}

/// A globally registered verb. Eligibility is re-derived per entity on
/// every catalog rebuild: the effect's key must be present with the right
/// runtime type (a portal, for open/close) and the optional gate must hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerbDef {
    pub verb: String,
    pub effect: VerbEffect,
    pub requires: Option<Condition>,
}

impl VerbDef {
    pub fn new(verb: impl Into<String>, effect: VerbEffect) -> Self {
        Self {
            verb: verb.into(),
            effect,
            requires: None,
        }
    }

    pub fn with_requires(mut self, requires: Condition) -> Self {
        self.requires = Some(requires);
        self
    }
}

/// One currently legal action. Regenerated after every committed step and
/// never stored long-term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub label: String,
    pub target: ActionTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionTarget {
    /// Universal inspection action.
    Look,
    /// A verb bound to a specific entity instance, not to its name.
    Apply { verb_index: usize, entity: EntityId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    pub schema_version: String,
    pub run_id: String,
    /// 0 means unbounded.
    pub max_steps: u64,
    /// Observation is never free in the base design; scenarios that want a
    /// free "look" opt out here.
    pub look_advances_time: bool,
    pub unknown_action_message: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: "sim_local_001".to_string(),
            max_steps: 0,
            look_advances_time: true,
            unknown_action_message: "Action not understood.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub name: String,
    pub parent: Option<EntityId>,
    pub children: Vec<EntityId>,
    pub props: BTreeMap<String, PropValue>,
    /// Present only for entities with an open/close protocol.
    pub open: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub schema_version: String,
    pub run_id: String,
    pub tick: u64,
    pub root: EntityId,
    pub entities: Vec<EntitySnapshot>,
}

/// One committed step in the run transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub tick: u64,
    pub label: String,
    pub observation: String,
}

impl fmt::Display for StepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tick={} label={:?} {}",
            self.tick, self.label, self.observation
        )
    }
}
