//! Badge catalog and unlock-rule evaluation

pub mod definitions;
mod engine;

pub use definitions::{Badge, BadgeDef, UnlockRule, DEFAULT_BADGES};
pub use engine::{evaluate, granted, ActivityStats};
