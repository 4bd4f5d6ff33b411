use serde::Serialize;

/// Structured result of one processed action event.
///
/// Returned synchronously to the caller; the notification dispatcher
/// downstream serializes it as-is.
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    /// Base points awarded for the action itself (badge rewards are
    /// reported per badge, not here).
    pub points_awarded: i64,
    /// Balance after the action and any badge rewards landed.
    pub new_balance: i64,
    pub badges_awarded: Vec<GrantedBadge>,
    pub streak: StreakTransition,
}

/// A badge that was unlocked during this cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantedBadge {
    pub code: String,
    pub title: String,
    pub points_reward: i64,
}

/// Daily streak before and after the action was applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreakTransition {
    pub previous: u32,
    pub new: u32,
}
