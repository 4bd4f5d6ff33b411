//! Core domain types for the rewards engine

mod action;
mod error;
mod outcome;

pub use action::{ActionEvent, ActionKind};
pub use error::{Result, RewardsError};
pub use outcome::{ActionOutcome, GrantedBadge, StreakTransition};
