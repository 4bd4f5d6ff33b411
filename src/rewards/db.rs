//! SQLite connection and schema management for the rewards engine
//!
//! Owns the reputation tables (balances, streaks, badge catalog,
//! grants) with versioned migrations. Donation/claim/delivery records
//! stay in the platform's own storage.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::Connection;

use super::badges::definitions::DEFAULT_BADGES;
use crate::domain::Result;

/// Database wrapper shared by the engine components.
#[derive(Clone)]
pub struct RewardsDb {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl RewardsDb {
    /// Open or create the rewards database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL so leaderboard reads don't block writers
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(Duration::from_secs(5))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Get a reference to the connection
    pub fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("rewards DB lock poisoned")
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA_SQL)?;
        drop(conn);
        self.run_migrations()?;
        Ok(())
    }

    /// Run any pending migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn();

        let version: i32 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))
            .unwrap_or(0);

        // Migration 2: Seed the default badge catalog. INSERT OR IGNORE
        // by code, so administrative edits survive re-opens.
        if version < 2 {
            let mut stmt = conn.prepare(
                r#"INSERT OR IGNORE INTO badges (code, title, points_reward, rule_type, rule_value, is_active)
                   VALUES (?1, ?2, ?3, ?4, ?5, 1)"#,
            )?;
            for def in DEFAULT_BADGES {
                stmt.execute(rusqlite::params![
                    def.code,
                    def.title,
                    def.points_reward,
                    def.rule.rule_type(),
                    def.rule.rule_value(),
                ])?;
            }
            drop(stmt);
            conn.execute("INSERT OR REPLACE INTO schema_version VALUES (2)", [])?;
        }

        Ok(())
    }

    /// Delete all per-user reputation state (balances, streaks, grants).
    /// The badge catalog is administrative and stays untouched.
    pub fn reset_all(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(
            r#"
            DELETE FROM badge_grants;
            DELETE FROM streaks;
            DELETE FROM points_balances;
            "#,
        )?;
        Ok(())
    }
}

/// SQL schema for the rewards database
const SCHEMA_SQL: &str = r#"
-- Per-user point balances (one row per user, created lazily on first award)
CREATE TABLE IF NOT EXISTS points_balances (
    user_id INTEGER PRIMARY KEY,
    points INTEGER NOT NULL DEFAULT 0 CHECK (points >= 0)
);

-- Per-user streak state
CREATE TABLE IF NOT EXISTS streaks (
    user_id INTEGER PRIMARY KEY,
    current_streak INTEGER NOT NULL DEFAULT 0,
    longest_streak INTEGER NOT NULL DEFAULT 0,
    last_action_date TEXT,
    monthly_streak INTEGER NOT NULL DEFAULT 0,
    monthly_streak_month TEXT,
    last_awarded_at INTEGER
);

-- Badge catalog (administrative rows; read-only to the engine)
CREATE TABLE IF NOT EXISTS badges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    points_reward INTEGER NOT NULL DEFAULT 0,
    rule_type TEXT NOT NULL,
    rule_value INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1
);

-- One-time badge grants, append-only
CREATE TABLE IF NOT EXISTS badge_grants (
    user_id INTEGER NOT NULL,
    badge_id INTEGER NOT NULL,
    awarded_at INTEGER NOT NULL,
    UNIQUE (user_id, badge_id),
    FOREIGN KEY (badge_id) REFERENCES badges(id)
);
CREATE INDEX IF NOT EXISTS idx_grants_user ON badge_grants(user_id);

-- Schema version
CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
INSERT OR IGNORE INTO schema_version VALUES (1);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_and_init() {
        let dir = tempdir().unwrap();
        let db = RewardsDb::open(&dir.path().join("rewards.db")).unwrap();

        let conn = db.conn();
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap();
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"points_balances".to_string()));
        assert!(tables.contains(&"streaks".to_string()));
        assert!(tables.contains(&"badges".to_string()));
        assert!(tables.contains(&"badge_grants".to_string()));
    }

    #[test]
    fn test_default_badges_seeded_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rewards.db");

        let db = RewardsDb::open(&path).unwrap();
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM badges", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count as usize, DEFAULT_BADGES.len());
        drop(db);

        // Re-opening must not duplicate or clobber the catalog
        let db = RewardsDb::open(&path).unwrap();
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM badges", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count as usize, DEFAULT_BADGES.len());
    }
}
