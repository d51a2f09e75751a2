//! Deterministic micro-world simulation kernel: a tree of named, typed
//! entities with property bags, a per-step update pass, and an action
//! catalog regenerated from the live object graph after every step.

pub mod catalog;
pub mod entity;
pub mod sim;
pub mod world;

pub use catalog::ActionCatalog;
pub use entity::{Entity, Portal};
pub use sim::Simulation;
pub use world::{World, WorldError};
