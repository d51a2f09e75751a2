//! Simulation: owns the world, drives the step loop, and exposes the
//! latest human-readable observation plus read-only post-hoc queries.
//!
//! The step loop is: resolve label -> apply effect -> tick every entity ->
//! rebuild the action catalog -> return the observation.

use contracts::{PropValue, SimConfig, StepRecord, VerbDef, WorldSnapshot};
use serde_json::Value;

use crate::catalog::ActionCatalog;
use crate::world::World;

mod step;

pub use step::RUN_COMPLETE_MESSAGE;

#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    world: World,
    verbs: Vec<VerbDef>,
    catalog: ActionCatalog,
    observation: String,
    tick: u64,
    records: Vec<StepRecord>,
}

impl Simulation {
    /// Take ownership of a populated world, compute the initial catalog and
    /// the initial observation. Scenario setup happens before this call;
    /// after it, all mutation goes through `step`.
    pub fn new(config: SimConfig, world: World, verbs: Vec<VerbDef>) -> Self {
        let catalog = ActionCatalog::rebuild(&world, &verbs);
        let observation = world.describe();
        Self {
            config,
            world,
            verbs,
            catalog,
            observation,
            tick: 0,
            records: Vec::new(),
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    /// Valid `step` labels for the current graph, lexically ordered.
    pub fn current_actions(&self) -> Vec<String> {
        self.catalog
            .labels()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn observation(&self) -> &str {
        &self.observation
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Transcript of committed steps, oldest first.
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn is_complete(&self) -> bool {
        self.config.max_steps > 0 && self.tick >= self.config.max_steps
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        self.world.snapshot(&self.config.run_id, self.tick)
    }

    /// First-class post-hoc queries: read-only lookups by display name,
    /// first pre-order match. These replace ad-hoc direct state access
    /// after the step loop ends.
    pub fn inspect(&self, name: &str) -> Option<Value> {
        self.world.inspect_by_name(name)
    }

    pub fn property(&self, name: &str, key: &str) -> Option<PropValue> {
        let id = self.world.first_by_name(name)?;
        self.world
            .entity(id)
            .ok()
            .and_then(|entity| entity.get_property(key))
            .cloned()
    }
}
