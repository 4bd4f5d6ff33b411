//! Points ledger - per-user balances
//!
//! Balances only ever grow; decrements are not part of the model.
//! Both functions run on the caller's connection so the facade can
//! scope them inside one transaction per action event.

use rusqlite::{Connection, OptionalExtension};

use crate::domain::Result;

/// Atomically add `amount` points to a user's balance, creating the
/// row on first award. Returns the new balance.
///
/// `amount` must be strictly positive; validating that is the caller's
/// responsibility.
pub fn award(conn: &Connection, user_id: i64, amount: i64) -> Result<i64> {
    debug_assert!(amount > 0, "award amount must be strictly positive");

    let balance = conn.query_row(
        r#"INSERT INTO points_balances (user_id, points) VALUES (?1, ?2)
           ON CONFLICT(user_id) DO UPDATE SET points = points + ?2
           RETURNING points"#,
        (user_id, amount),
        |r| r.get(0),
    )?;
    Ok(balance)
}

/// Current balance, zero when the user has no row yet.
pub fn balance(conn: &Connection, user_id: i64) -> Result<i64> {
    let points = conn
        .query_row(
            "SELECT points FROM points_balances WHERE user_id = ?1",
            [user_id],
            |r| r.get(0),
        )
        .optional()?;
    Ok(points.unwrap_or(0))
}
