//! Points configuration
//!
//! Maps symbolic action keys (e.g. `points_post_donation`) to point
//! values. The platform keeps these as mutable key/value rows; the
//! engine holds an explicit in-memory map with a reload operation so
//! values change at runtime without a redeploy.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::{Result, RewardsError};

/// Hot-reloadable action-key to point-value map.
///
/// Clones share the underlying map, so a reload through one handle is
/// visible to every component holding the config.
#[derive(Clone, Default)]
pub struct PointsConfig {
    entries: Arc<RwLock<HashMap<String, i64>>>,
}

impl PointsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: HashMap<String, i64>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Look up the point value registered for `key`.
    ///
    /// Missing configuration is not fatal: callers log the
    /// [`RewardsError::ConfigMissing`] and proceed with zero points.
    pub fn resolve(&self, key: &str) -> Result<i64> {
        self.entries
            .read()
            .expect("config lock poisoned")
            .get(key)
            .copied()
            .ok_or_else(|| RewardsError::ConfigMissing {
                key: key.to_string(),
            })
    }

    /// Replace the whole map, e.g. after the platform's config rows
    /// change.
    pub fn reload(&self, entries: HashMap<String, i64>) {
        *self.entries.write().expect("config lock poisoned") = entries;
    }

    /// Set or overwrite a single entry.
    pub fn set(&self, key: &str, value: i64) {
        self.entries
            .write()
            .expect("config lock poisoned")
            .insert(key.to_string(), value);
    }

    /// Remove a single entry.
    pub fn remove(&self, key: &str) {
        self.entries
            .write()
            .expect("config lock poisoned")
            .remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_hit_and_miss() {
        let config = PointsConfig::new();
        config.set("points_post_donation", 20);

        assert_eq!(config.resolve("points_post_donation").unwrap(), 20);
        assert!(matches!(
            config.resolve("points_claim_donation"),
            Err(RewardsError::ConfigMissing { key }) if key == "points_claim_donation"
        ));
    }

    #[test]
    fn test_remove_makes_key_missing() {
        let config = PointsConfig::new();
        config.set("points_post_donation", 20);
        config.remove("points_post_donation");

        assert!(config.resolve("points_post_donation").is_err());
    }

    #[test]
    fn test_reload_replaces_map() {
        let config = PointsConfig::from_entries(HashMap::from([(
            "points_post_donation".to_string(),
            20,
        )]));

        config.reload(HashMap::from([("points_claim_donation".to_string(), 5)]));

        assert!(config.resolve("points_post_donation").is_err());
        assert_eq!(config.resolve("points_claim_donation").unwrap(), 5);
    }

    #[test]
    fn test_reload_visible_through_clones() {
        let config = PointsConfig::new();
        let clone = config.clone();
        config.set("points_post_donation", 20);

        assert_eq!(clone.resolve("points_post_donation").unwrap(), 20);
    }
}
