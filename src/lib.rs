//! FoodShare rewards engine
//!
//! Converts discrete user actions on the FoodShare platform (posting a
//! donation, claiming one, completing a delivery) into persistent
//! reputation state: a point balance, consecutive-day and monthly
//! activity streaks, and one-time badge unlocks.
//!
//! The surrounding platform (HTTP routing, auth, donation CRUD,
//! notifications) feeds [`ActionEvent`]s into [`rewards::RewardsEngine`]
//! and consumes the structured [`ActionOutcome`] it returns.

pub mod config;
pub mod domain;
pub mod rewards;

pub use domain::*;
