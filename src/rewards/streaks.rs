//! Streak tracking
//!
//! Maintains per-user consecutive-day counters and a monthly counter
//! driven by action timestamps. The monthly counter is the number of
//! distinct calendar days with a qualifying action within the current
//! month; it resets when the month rolls over.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension};

use crate::domain::{Result, StreakTransition};

const DATE_FMT: &str = "%Y-%m-%d";

/// Per-user streak state as stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreakRecord {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_action_date: Option<NaiveDate>,
    pub monthly_streak: u32,
    pub monthly_streak_month: Option<NaiveDate>,
    /// Millisecond timestamp of the last action that changed the record.
    pub last_awarded_at: Option<i64>,
}

/// First day of the month containing `day`.
pub fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// Apply one timestamped action to the user's streak state.
///
/// Runs on the caller's connection (inside its transaction) and
/// returns the previous/new daily streak for the rule engine.
/// Re-entrant calls on the same calendar day are no-ops.
pub fn process(conn: &Connection, user_id: i64, action_ts: DateTime<Utc>) -> Result<StreakTransition> {
    let today = action_ts.date_naive();
    let record = load(conn, user_id)?.unwrap_or_default();
    let previous = record.current_streak;

    let next = advance(&record, today);
    if next == record {
        // Same-day repeat (or an out-of-order event from the past):
        // counters must not double-count.
        return Ok(StreakTransition {
            previous,
            new: previous,
        });
    }

    persist(conn, user_id, &next, action_ts)?;
    Ok(StreakTransition {
        previous,
        new: next.current_streak,
    })
}

/// Load a user's streak record, if one exists yet.
pub fn load(conn: &Connection, user_id: i64) -> Result<Option<StreakRecord>> {
    let row = conn
        .query_row(
            r#"SELECT current_streak, longest_streak, last_action_date,
                      monthly_streak, monthly_streak_month, last_awarded_at
               FROM streaks WHERE user_id = ?1"#,
            [user_id],
            |r| {
                Ok((
                    r.get::<_, u32>(0)?,
                    r.get::<_, u32>(1)?,
                    r.get::<_, Option<String>>(2)?,
                    r.get::<_, u32>(3)?,
                    r.get::<_, Option<String>>(4)?,
                    r.get::<_, Option<i64>>(5)?,
                ))
            },
        )
        .optional()?;

    Ok(row.map(|(current, longest, last_day, monthly, month, awarded)| StreakRecord {
        current_streak: current,
        longest_streak: longest,
        last_action_date: last_day.and_then(|d| NaiveDate::parse_from_str(&d, DATE_FMT).ok()),
        monthly_streak: monthly,
        monthly_streak_month: month.and_then(|d| NaiveDate::parse_from_str(&d, DATE_FMT).ok()),
        last_awarded_at: awarded,
    }))
}

/// Pure date-window transition: no record -> day 1; same day -> no-op;
/// previous day -> extend; gap of 2+ days -> reset to 1.
fn advance(rec: &StreakRecord, today: NaiveDate) -> StreakRecord {
    let month = first_of_month(today);

    let Some(last) = rec.last_action_date else {
        return StreakRecord {
            current_streak: 1,
            longest_streak: rec.longest_streak.max(1),
            last_action_date: Some(today),
            monthly_streak: 1,
            monthly_streak_month: Some(month),
            last_awarded_at: rec.last_awarded_at,
        };
    };

    // Out-of-order events from the past never rewind the streak.
    if today <= last {
        return rec.clone();
    }

    let current = if (today - last).num_days() == 1 {
        rec.current_streak + 1
    } else {
        1
    };

    // New month resets the monthly counter; a genuinely new day within
    // the same month counts as one more active day.
    let monthly = if rec.monthly_streak_month != Some(month) {
        1
    } else {
        rec.monthly_streak + 1
    };

    StreakRecord {
        current_streak: current,
        longest_streak: rec.longest_streak.max(current),
        last_action_date: Some(today),
        monthly_streak: monthly,
        monthly_streak_month: Some(month),
        last_awarded_at: rec.last_awarded_at,
    }
}

fn persist(conn: &Connection, user_id: i64, rec: &StreakRecord, action_ts: DateTime<Utc>) -> Result<()> {
    conn.execute(
        r#"INSERT INTO streaks
               (user_id, current_streak, longest_streak, last_action_date,
                monthly_streak, monthly_streak_month, last_awarded_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
           ON CONFLICT(user_id) DO UPDATE SET
               current_streak = ?2, longest_streak = ?3, last_action_date = ?4,
               monthly_streak = ?5, monthly_streak_month = ?6, last_awarded_at = ?7"#,
        rusqlite::params![
            user_id,
            rec.current_streak,
            rec.longest_streak,
            rec.last_action_date.map(|d| d.format(DATE_FMT).to_string()),
            rec.monthly_streak,
            rec.monthly_streak_month.map(|d| d.format(DATE_FMT).to_string()),
            action_ts.timestamp_millis(),
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewards::RewardsDb;
    use tempfile::tempdir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        day(y, m, d).and_hms_opt(12, 0, 0).unwrap().and_utc()
    }

    #[test]
    fn test_first_action_starts_streak() {
        let rec = advance(&StreakRecord::default(), day(2025, 1, 1));
        assert_eq!(rec.current_streak, 1);
        assert_eq!(rec.longest_streak, 1);
        assert_eq!(rec.monthly_streak, 1);
        assert_eq!(rec.monthly_streak_month, Some(day(2025, 1, 1)));
    }

    #[test]
    fn test_next_day_extends() {
        let rec = advance(&StreakRecord::default(), day(2025, 1, 1));
        let rec = advance(&rec, day(2025, 1, 2));
        assert_eq!(rec.current_streak, 2);
        assert_eq!(rec.longest_streak, 2);
        assert_eq!(rec.monthly_streak, 2);
    }

    #[test]
    fn test_same_day_is_noop() {
        let rec = advance(&StreakRecord::default(), day(2025, 1, 1));
        let again = advance(&rec, day(2025, 1, 1));
        assert_eq!(again, rec);
    }

    #[test]
    fn test_gap_resets_but_longest_survives() {
        let rec = advance(&StreakRecord::default(), day(2025, 1, 1));
        let rec = advance(&rec, day(2025, 1, 2));
        let rec = advance(&rec, day(2025, 1, 4)); // skipped Jan 3
        assert_eq!(rec.current_streak, 1);
        assert_eq!(rec.longest_streak, 2);
    }

    #[test]
    fn test_out_of_order_event_does_not_rewind() {
        let rec = advance(&StreakRecord::default(), day(2025, 1, 5));
        let again = advance(&rec, day(2025, 1, 2));
        assert_eq!(again, rec);
    }

    #[test]
    fn test_month_rollover_resets_monthly_counter() {
        let rec = advance(&StreakRecord::default(), day(2025, 1, 30));
        let rec = advance(&rec, day(2025, 1, 31));
        assert_eq!(rec.monthly_streak, 2);

        let rec = advance(&rec, day(2025, 2, 1));
        assert_eq!(rec.monthly_streak, 1);
        assert_eq!(rec.monthly_streak_month, Some(day(2025, 2, 1)));
        // Daily streak crosses the month boundary untouched
        assert_eq!(rec.current_streak, 3);
    }

    #[test]
    fn test_monthly_counts_distinct_days_after_gap() {
        let rec = advance(&StreakRecord::default(), day(2025, 3, 3));
        let rec = advance(&rec, day(2025, 3, 10)); // gap resets daily streak
        assert_eq!(rec.current_streak, 1);
        assert_eq!(rec.monthly_streak, 2);
    }

    #[test]
    fn test_process_persists_and_is_idempotent_per_day() {
        let dir = tempdir().unwrap();
        let db = RewardsDb::open(&dir.path().join("rewards.db")).unwrap();
        let conn = db.conn();

        let t = process(&conn, 1, ts(2025, 1, 1)).unwrap();
        assert_eq!((t.previous, t.new), (0, 1));

        let t = process(&conn, 1, ts(2025, 1, 1)).unwrap();
        assert_eq!((t.previous, t.new), (1, 1));

        let t = process(&conn, 1, ts(2025, 1, 2)).unwrap();
        assert_eq!((t.previous, t.new), (1, 2));

        let stored = load(&conn, 1).unwrap().unwrap();
        assert_eq!(stored.current_streak, 2);
        assert_eq!(stored.last_action_date, Some(day(2025, 1, 2)));
    }

    #[test]
    fn test_longest_streak_never_decreases() {
        let dir = tempdir().unwrap();
        let db = RewardsDb::open(&dir.path().join("rewards.db")).unwrap();
        let conn = db.conn();

        let mut longest_seen = 0;
        for d in [1, 2, 3, 7, 8, 20] {
            process(&conn, 1, ts(2025, 1, d)).unwrap();
            let rec = load(&conn, 1).unwrap().unwrap();
            assert!(rec.longest_streak >= longest_seen);
            assert!(rec.longest_streak >= rec.current_streak);
            longest_seen = rec.longest_streak;
        }
        assert_eq!(longest_seen, 3);
    }
}
