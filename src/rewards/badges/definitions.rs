//! Badge definitions and unlock rules
//!
//! The catalog lives in the `badges` table so administrators can add
//! or retire badges at runtime; `DEFAULT_BADGES` is only the seed.

/// A badge row loaded from the catalog.
#[derive(Debug, Clone)]
pub struct Badge {
    pub id: i64,
    pub code: String,
    pub title: String,
    pub points_reward: i64,
    pub rule: UnlockRule,
}

/// Unlock rules, one variant per rule kind.
///
/// Stored as a `(rule_type, rule_value)` pair. Unrecognized types parse
/// to [`UnlockRule::Fallback`] so a stray catalog row can never fail an
/// evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockRule {
    /// Point balance reaches the threshold.
    PointsTotal(i64),
    /// Lifetime donation count reaches the threshold.
    DonationsCount(u64),
    /// Donations within the event's Monday-to-Sunday week.
    DonationsInWeek(u64),
    /// Completed deliveries performed by the user.
    DeliveriesCount(u64),
    /// Total donated weight, in the platform's weight unit.
    WeightDonatedTotal(i64),
    /// Consecutive-day streak reaches the threshold.
    StreakDays(u32),
    /// Distinct active days in the current month reach the threshold.
    MonthlyStreakDays(u32),
    /// Default rule: balance must cover the badge's own point reward.
    Fallback,
}

impl UnlockRule {
    /// Parse the stored pair. Unknown rule types become `Fallback`.
    pub fn parse(rule_type: &str, value: i64) -> Self {
        let threshold = value.max(0);
        match rule_type {
            "points_total" => Self::PointsTotal(threshold),
            "donations_count" => Self::DonationsCount(threshold as u64),
            "donations_in_week" => Self::DonationsInWeek(threshold as u64),
            "deliveries_count" => Self::DeliveriesCount(threshold as u64),
            "weight_donated_total" => Self::WeightDonatedTotal(threshold),
            "streak_days" => Self::StreakDays(threshold as u32),
            "monthly_streak_days" => Self::MonthlyStreakDays(threshold as u32),
            _ => Self::Fallback,
        }
    }

    /// Stable string for catalog storage.
    pub fn rule_type(&self) -> &'static str {
        match self {
            Self::PointsTotal(_) => "points_total",
            Self::DonationsCount(_) => "donations_count",
            Self::DonationsInWeek(_) => "donations_in_week",
            Self::DeliveriesCount(_) => "deliveries_count",
            Self::WeightDonatedTotal(_) => "weight_donated_total",
            Self::StreakDays(_) => "streak_days",
            Self::MonthlyStreakDays(_) => "monthly_streak_days",
            Self::Fallback => "fallback",
        }
    }

    /// Threshold as stored in the catalog.
    pub fn rule_value(&self) -> i64 {
        match *self {
            Self::PointsTotal(v) | Self::WeightDonatedTotal(v) => v,
            Self::DonationsCount(v) | Self::DonationsInWeek(v) | Self::DeliveriesCount(v) => {
                v as i64
            }
            Self::StreakDays(v) | Self::MonthlyStreakDays(v) => v as i64,
            Self::Fallback => 0,
        }
    }
}

/// Seed definition for a default badge.
#[derive(Debug, Clone, Copy)]
pub struct BadgeDef {
    pub code: &'static str,
    pub title: &'static str,
    pub points_reward: i64,
    pub rule: UnlockRule,
}

/// Default catalog seeded on first open.
pub static DEFAULT_BADGES: &[BadgeDef] = &[
    // === DONATIONS ===
    BadgeDef {
        code: "first_donation",
        title: "First Donation",
        points_reward: 10,
        rule: UnlockRule::DonationsCount(1),
    },
    BadgeDef {
        code: "donations_10",
        title: "Regular Giver",
        points_reward: 25,
        rule: UnlockRule::DonationsCount(10),
    },
    BadgeDef {
        code: "donations_50",
        title: "Community Pillar",
        points_reward: 100,
        rule: UnlockRule::DonationsCount(50),
    },
    BadgeDef {
        code: "busy_week",
        title: "Busy Week",
        points_reward: 15,
        rule: UnlockRule::DonationsInWeek(5),
    },
    // === DELIVERIES ===
    BadgeDef {
        code: "first_delivery",
        title: "First Delivery",
        points_reward: 10,
        rule: UnlockRule::DeliveriesCount(1),
    },
    BadgeDef {
        code: "deliveries_25",
        title: "Courier",
        points_reward: 50,
        rule: UnlockRule::DeliveriesCount(25),
    },
    // === WEIGHT ===
    BadgeDef {
        code: "weight_100",
        title: "Heavy Lifter",
        points_reward: 40,
        rule: UnlockRule::WeightDonatedTotal(100),
    },
    BadgeDef {
        code: "weight_500",
        title: "Ton of Good",
        points_reward: 150,
        rule: UnlockRule::WeightDonatedTotal(500),
    },
    // === POINTS ===
    BadgeDef {
        code: "points_100",
        title: "Rising Star",
        points_reward: 20,
        rule: UnlockRule::PointsTotal(100),
    },
    BadgeDef {
        code: "points_500",
        title: "Local Hero",
        points_reward: 50,
        rule: UnlockRule::PointsTotal(500),
    },
    // === STREAKS ===
    BadgeDef {
        code: "streak_3days",
        title: "On a Roll",
        points_reward: 15,
        rule: UnlockRule::StreakDays(3),
    },
    BadgeDef {
        code: "streak_7days",
        title: "Week of Giving",
        points_reward: 30,
        rule: UnlockRule::StreakDays(7),
    },
    BadgeDef {
        code: "streak_14days",
        title: "Fortnight of Giving",
        points_reward: 60,
        rule: UnlockRule::StreakDays(14),
    },
    BadgeDef {
        code: "streak_28days",
        title: "Month of Giving",
        points_reward: 100,
        rule: UnlockRule::MonthlyStreakDays(28),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_rule_types() {
        assert_eq!(UnlockRule::parse("points_total", 100), UnlockRule::PointsTotal(100));
        assert_eq!(UnlockRule::parse("donations_count", 10), UnlockRule::DonationsCount(10));
        assert_eq!(UnlockRule::parse("streak_days", 3), UnlockRule::StreakDays(3));
        assert_eq!(
            UnlockRule::parse("monthly_streak_days", 28),
            UnlockRule::MonthlyStreakDays(28)
        );
    }

    #[test]
    fn test_unknown_rule_type_falls_back() {
        assert_eq!(UnlockRule::parse("karma_total", 5), UnlockRule::Fallback);
    }

    #[test]
    fn test_storage_pair_roundtrip() {
        for def in DEFAULT_BADGES {
            let parsed = UnlockRule::parse(def.rule.rule_type(), def.rule.rule_value());
            assert_eq!(parsed, def.rule, "badge {}", def.code);
        }
    }

    #[test]
    fn test_negative_threshold_clamped() {
        assert_eq!(UnlockRule::parse("donations_count", -3), UnlockRule::DonationsCount(0));
    }
}
