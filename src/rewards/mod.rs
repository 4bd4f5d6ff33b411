//! Rewards engine for the FoodShare platform
//!
//! Tracks point balances, activity streaks and badge grants in a
//! SQLite database (`rewards.db`).
//!
//! # Usage
//!
//! ```ignore
//! let engine = RewardsEngine::open(&path, config)?;
//!
//! // Platform layer reports an action
//! let outcome = engine.process_action(&event, &activity_stats)?;
//!
//! // Read views
//! let board = engine.leaderboard(10)?;
//! ```

pub mod badges;
mod db;
pub mod ledger;
pub mod leaderboard;
pub mod streaks;

pub use badges::{ActivityStats, Badge, BadgeDef, UnlockRule, DEFAULT_BADGES};
pub use db::RewardsDb;
pub use leaderboard::LeaderboardEntry;
pub use streaks::StreakRecord;

use std::path::Path;

use rusqlite::TransactionBehavior;
use tracing::{debug, warn};

use crate::config::PointsConfig;
use crate::domain::{ActionEvent, ActionOutcome, GrantedBadge, Result, RewardsError};

/// Central entry point for the rewards subsystem.
///
/// Clones share the underlying connection and configuration. Each
/// processed action runs as one immediate transaction scoped to the
/// acting user's rows, so concurrent actions never lose an increment
/// or duplicate a grant.
#[derive(Clone)]
pub struct RewardsEngine {
    db: RewardsDb,
    config: PointsConfig,
}

impl RewardsEngine {
    /// Open or create the rewards database at `path`.
    pub fn open(path: &Path, config: PointsConfig) -> Result<Self> {
        let db = RewardsDb::open(path)?;
        Ok(Self { db, config })
    }

    /// The live points configuration; reloads take effect immediately.
    pub fn config(&self) -> &PointsConfig {
        &self.config
    }

    /// Process one action event: resolve points, award them, advance
    /// the user's streak, then evaluate badge rules. All-or-nothing per
    /// transaction; a conflicted transaction surfaces as
    /// [`RewardsError::ConcurrencyConflict`] and is safe to retry.
    pub fn process_action(
        &self,
        event: &ActionEvent,
        stats: &dyn ActivityStats,
    ) -> Result<ActionOutcome> {
        let key = event.action.points_key();
        let points = match self.config.resolve(&key) {
            Ok(v) => v,
            Err(RewardsError::ConfigMissing { key }) => {
                warn!(%key, user_id = event.user_id, "no points configured, awarding zero");
                0
            }
            Err(e) => return Err(e),
        };

        let mut conn = self.db.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if points > 0 {
            ledger::award(&tx, event.user_id, points)?;
        }
        let streak = streaks::process(&tx, event.user_id, event.timestamp)?;
        let badges_awarded = badges::evaluate(&tx, event.user_id, event.timestamp, stats)?;
        // After badge rewards landed
        let new_balance = ledger::balance(&tx, event.user_id)?;

        tx.commit()?;

        debug!(
            user_id = event.user_id,
            action = event.action.as_str(),
            points,
            new_balance,
            badges = badges_awarded.len(),
            "action processed"
        );

        Ok(ActionOutcome {
            points_awarded: points,
            new_balance,
            badges_awarded,
            streak,
        })
    }

    /// Register a badge in the catalog (or update it by code).
    pub fn define_badge(
        &self,
        code: &str,
        title: &str,
        points_reward: i64,
        rule: UnlockRule,
    ) -> Result<()> {
        let conn = self.db.conn();
        conn.execute(
            r#"INSERT INTO badges (code, title, points_reward, rule_type, rule_value, is_active)
               VALUES (?1, ?2, ?3, ?4, ?5, 1)
               ON CONFLICT(code) DO UPDATE SET
                   title = ?2, points_reward = ?3, rule_type = ?4, rule_value = ?5"#,
            rusqlite::params![code, title, points_reward, rule.rule_type(), rule.rule_value()],
        )?;
        Ok(())
    }

    /// Retire or reactivate a badge without touching existing grants.
    pub fn set_badge_active(&self, code: &str, active: bool) -> Result<()> {
        let conn = self.db.conn();
        conn.execute(
            "UPDATE badges SET is_active = ?2 WHERE code = ?1",
            rusqlite::params![code, active as i32],
        )?;
        Ok(())
    }

    /// Current point balance for a user (zero when unknown).
    pub fn balance(&self, user_id: i64) -> Result<i64> {
        ledger::balance(&self.db.conn(), user_id)
    }

    /// Current streak state for a user, if any activity was processed.
    pub fn streak(&self, user_id: i64) -> Result<Option<StreakRecord>> {
        streaks::load(&self.db.conn(), user_id)
    }

    /// Badges already granted to a user, in grant order.
    pub fn granted_badges(&self, user_id: i64) -> Result<Vec<GrantedBadge>> {
        badges::granted(&self.db.conn(), user_id)
    }

    /// Top `limit` users by balance, ties broken by lower user id.
    pub fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>> {
        leaderboard::top(&self.db.conn(), limit)
    }

    /// Delete all per-user reputation state (balances, streaks, grants).
    pub fn reset_all(&self) -> Result<()> {
        self.db.reset_all()
    }
}
