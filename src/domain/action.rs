use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A discrete user action fed into the engine by the platform layer.
///
/// The timestamp travels with the event so all date-window logic is a
/// pure function of the event, never of an ambient clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEvent {
    pub user_id: i64,
    pub action: ActionKind,
    pub timestamp: DateTime<Utc>,
}

impl ActionEvent {
    pub fn new(user_id: i64, action: ActionKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            user_id,
            action,
            timestamp,
        }
    }
}

/// The point-bearing actions the platform reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    PostDonation,
    ClaimDonation,
    CompleteDelivery,
}

impl ActionKind {
    /// Stable string key for configuration and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PostDonation => "post_donation",
            Self::ClaimDonation => "claim_donation",
            Self::CompleteDelivery => "complete_delivery",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "post_donation" => Some(Self::PostDonation),
            "claim_donation" => Some(Self::ClaimDonation),
            "complete_delivery" => Some(Self::CompleteDelivery),
            _ => None,
        }
    }

    /// Configuration key holding the point value for this action.
    pub fn points_key(&self) -> String {
        format!("points_{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_kind_roundtrip() {
        for kind in [
            ActionKind::PostDonation,
            ActionKind::ClaimDonation,
            ActionKind::CompleteDelivery,
        ] {
            assert_eq!(ActionKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(ActionKind::from_str("unknown_action"), None);
    }

    #[test]
    fn test_points_key() {
        assert_eq!(ActionKind::PostDonation.points_key(), "points_post_donation");
    }
}
