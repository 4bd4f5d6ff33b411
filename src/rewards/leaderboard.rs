//! Leaderboard - read-only ranking of users by point balance
//!
//! Reads are not coupled to writer transactions; a ranking computed
//! mid-award is simply slightly stale.

use rusqlite::Connection;
use serde::Serialize;

use crate::domain::Result;

/// One row of the ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based position.
    pub rank: u32,
    pub user_id: i64,
    pub points: i64,
}

/// Top `limit` users by balance. Ties break on lower user id so the
/// ordering is stable across repeated computation.
pub fn top(conn: &Connection, limit: u32) -> Result<Vec<LeaderboardEntry>> {
    let mut stmt = conn.prepare(
        r#"SELECT user_id, points FROM points_balances
           ORDER BY points DESC, user_id ASC
           LIMIT ?1"#,
    )?;
    let rows = stmt.query_map([limit], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, i64>(1)?)))?;

    let mut entries = Vec::new();
    for (i, row) in rows.enumerate() {
        let (user_id, points) = row?;
        entries.push(LeaderboardEntry {
            rank: i as u32 + 1,
            user_id,
            points,
        });
    }
    Ok(entries)
}
