//! Badge rule evaluation and granting
//!
//! Evaluates every active, not-yet-granted badge against the user's
//! aggregates and streak state. A successful grant applies the badge's
//! point reward, which can newly satisfy a points rule, so passes
//! repeat until one produces no grant; the once-only grant invariant
//! bounds the loop at the number of remaining badges.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rusqlite::Connection;
use tracing::{debug, warn};

use super::definitions::{Badge, UnlockRule};
use crate::domain::{GrantedBadge, Result};
use crate::rewards::{ledger, streaks};

/// Read access to the donation/claim/delivery aggregates owned by the
/// surrounding platform. The engine never touches those tables itself.
pub trait ActivityStats {
    fn donations_count(&self, user_id: i64) -> Result<u64>;
    fn donations_in_week(&self, user_id: i64, start: NaiveDate, end: NaiveDate) -> Result<u64>;
    fn deliveries_count(&self, user_id: i64) -> Result<u64>;
    fn weight_donated_total(&self, user_id: i64) -> Result<i64>;
}

/// Evaluate all ungranted active badges for `user_id` and grant the
/// satisfied ones. Runs on the caller's connection, inside its
/// transaction, so a storage failure leaves no partial grant.
pub fn evaluate(
    conn: &Connection,
    user_id: i64,
    now: DateTime<Utc>,
    stats: &dyn ActivityStats,
) -> Result<Vec<GrantedBadge>> {
    let mut granted = Vec::new();

    loop {
        let candidates = load_ungranted(conn, user_id)?;
        let mut pass_granted = false;

        for badge in candidates {
            if !satisfied(conn, user_id, &badge, now, stats)? {
                continue;
            }
            // The unique (user, badge) constraint makes concurrent
            // evaluations converge to exactly one grant.
            if !try_grant(conn, user_id, &badge, now)? {
                continue;
            }
            if badge.points_reward > 0 {
                ledger::award(conn, user_id, badge.points_reward)?;
            }
            debug!(user_id, code = %badge.code, "badge granted");
            granted.push(GrantedBadge {
                code: badge.code,
                title: badge.title,
                points_reward: badge.points_reward,
            });
            pass_granted = true;
        }

        // A reward may have satisfied another points rule; go once more
        // over the now-smaller ungranted set.
        if !pass_granted {
            break;
        }
    }

    Ok(granted)
}

/// Badges already granted to a user, in grant order.
pub fn granted(conn: &Connection, user_id: i64) -> Result<Vec<GrantedBadge>> {
    let mut stmt = conn.prepare(
        r#"SELECT b.code, b.title, b.points_reward
           FROM badge_grants g JOIN badges b ON b.id = g.badge_id
           WHERE g.user_id = ?1
           ORDER BY g.awarded_at, b.id"#,
    )?;
    let rows = stmt.query_map([user_id], |r| {
        Ok(GrantedBadge {
            code: r.get(0)?,
            title: r.get(1)?,
            points_reward: r.get(2)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Active badges the user has not been granted yet.
fn load_ungranted(conn: &Connection, user_id: i64) -> Result<Vec<Badge>> {
    let mut stmt = conn.prepare(
        r#"SELECT b.id, b.code, b.title, b.points_reward, b.rule_type, b.rule_value
           FROM badges b
           WHERE b.is_active = 1
             AND NOT EXISTS (
                 SELECT 1 FROM badge_grants g
                 WHERE g.user_id = ?1 AND g.badge_id = b.id
             )
           ORDER BY b.id"#,
    )?;
    let rows = stmt.query_map([user_id], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, i64>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, i64>(5)?,
        ))
    })?;

    let mut badges = Vec::new();
    for row in rows {
        let (id, code, title, points_reward, rule_type, rule_value) = row?;
        let rule = UnlockRule::parse(&rule_type, rule_value);
        if rule == UnlockRule::Fallback && rule_type != "fallback" {
            warn!(code = %code, rule_type = %rule_type, "unknown unlock rule type, using points fallback");
        }
        badges.push(Badge {
            id,
            code,
            title,
            points_reward,
            rule,
        });
    }
    Ok(badges)
}

fn satisfied(
    conn: &Connection,
    user_id: i64,
    badge: &Badge,
    now: DateTime<Utc>,
    stats: &dyn ActivityStats,
) -> Result<bool> {
    let ok = match badge.rule {
        UnlockRule::PointsTotal(v) => ledger::balance(conn, user_id)? >= v,
        UnlockRule::DonationsCount(v) => stats.donations_count(user_id)? >= v,
        UnlockRule::DonationsInWeek(v) => {
            let (start, end) = week_bounds(now.date_naive());
            stats.donations_in_week(user_id, start, end)? >= v
        }
        UnlockRule::DeliveriesCount(v) => stats.deliveries_count(user_id)? >= v,
        UnlockRule::WeightDonatedTotal(v) => stats.weight_donated_total(user_id)? >= v,
        UnlockRule::StreakDays(v) => {
            streaks::load(conn, user_id)?
                .map(|r| r.current_streak >= v)
                .unwrap_or(false)
        }
        UnlockRule::MonthlyStreakDays(v) => {
            streaks::load(conn, user_id)?
                .map(|r| r.monthly_streak >= v)
                .unwrap_or(false)
        }
        UnlockRule::Fallback => ledger::balance(conn, user_id)? >= badge.points_reward,
    };
    Ok(ok)
}

/// Insert the grant; returns false when the unique pair already exists.
fn try_grant(conn: &Connection, user_id: i64, badge: &Badge, now: DateTime<Utc>) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO badge_grants (user_id, badge_id, awarded_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![user_id, badge.id, now.timestamp_millis()],
    )?;
    Ok(inserted > 0)
}

/// Monday-to-Sunday week containing `day`.
fn week_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = day - Duration::days(day.weekday().num_days_from_monday() as i64);
    (monday, monday + Duration::days(6))
}
