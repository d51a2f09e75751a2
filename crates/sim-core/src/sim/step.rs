use contracts::{ActionTarget, EntityId, PropValue, StepRecord, VerbEffect};
use tracing::debug;

use super::Simulation;
use crate::catalog::ActionCatalog;

/// Observation returned once a bounded run has used up its steps.
pub const RUN_COMPLETE_MESSAGE: &str = "Run complete.";

impl Simulation {
    /// Interpret one action label. Unknown labels and completed runs
    /// change nothing; every other label mutates state, advances every
    /// entity by one tick, and rebuilds the catalog. Always returns
    /// something printable.
    pub fn step(&mut self, label: &str) -> String {
        if self.is_complete() {
            self.observation = RUN_COMPLETE_MESSAGE.to_string();
            return self.observation.clone();
        }
        let Some(action) = self.catalog.get(label).cloned() else {
            debug!(label, "unknown action label");
            self.observation = self.config.unknown_action_message.clone();
            return self.observation.clone();
        };

        let effect_observation = match action.target {
            ActionTarget::Look => None,
            ActionTarget::Apply { verb_index, entity } => {
                Some(self.apply_verb(verb_index, entity))
            }
        };

        let advances = match action.target {
            ActionTarget::Look => self.config.look_advances_time,
            ActionTarget::Apply { .. } => true,
        };
        if advances {
            self.world.tick_all();
            self.tick += 1;
            self.catalog = ActionCatalog::rebuild(&self.world, &self.verbs);
            debug!(
                tick = self.tick,
                actions = self.catalog.len(),
                "catalog rebuilt"
            );
        }

        // The inspection verb reports the post-tick world; every other
        // verb reports what its effect did.
        let observation = match effect_observation {
            Some(text) => text,
            None => self.world.describe(),
        };
        self.observation = observation.clone();
        self.records.push(StepRecord {
            tick: self.tick,
            label: label.to_string(),
            observation: observation.clone(),
        });
        observation
    }

    pub fn step_n(&mut self, label: &str, n: u64) -> Vec<String> {
        (0..n).map(|_| self.step(label)).collect()
    }

    /// Pure driver: feed a whole action script, collect one observation
    /// per label.
    pub fn run<S: AsRef<str>>(&mut self, actions: &[S]) -> Vec<String> {
        actions
            .iter()
            .map(|label| self.step(label.as_ref()))
            .collect()
    }

    /// Verb dispatch. Ineligible runtime shapes produce a descriptive
    /// rejection string, never a panic; the step still commits.
    fn apply_verb(&mut self, verb_index: usize, id: EntityId) -> String {
        let Some(verb) = self.verbs.get(verb_index).cloned() else {
            return "Nothing happens.".to_string();
        };
        let Ok(entity) = self.world.entity_mut(id) else {
            return "Nothing happens.".to_string();
        };
        match verb.effect {
            VerbEffect::Adjust { key, delta } => match entity.get_property(&key).cloned() {
                Some(value) if value.is_numeric() => {
                    let next = value.adjusted(delta, None, None);
                    entity.set_property(key.clone(), next.clone());
                    format!("The {} {} is now {}.", entity.name, key, next)
                }
                _ => format!("You cannot {} the {}.", verb.verb, entity.name),
            },
            VerbEffect::Toggle { key } => {
                match entity.get_property(&key).and_then(PropValue::as_bool) {
                    Some(current) => {
                        entity.set_property(key.clone(), !current);
                        format!("The {} {} is now {}.", entity.name, key, !current)
                    }
                    None => format!("You cannot {} the {}.", verb.verb, entity.name),
                }
            }
            VerbEffect::Open => entity.open().0,
            VerbEffect::Close => entity.close().0,
        }
    }
}
