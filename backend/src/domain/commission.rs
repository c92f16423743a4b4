//! Platform commission taken from each settled booking.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Inclusive bounds for a commission percentage.
pub const COMMISSION_PERCENTAGE_RANGE: std::ops::RangeInclusive<i32> = 1..=100;

/// The single commission row configured by super administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCommission {
    pub id: Uuid,
    pub percentage: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceCommission {
    /// Whether `percentage` is a whole percentage the platform may charge.
    ///
    /// # Examples
    /// ```
    /// use marketplace::domain::ServiceCommission;
    ///
    /// assert!(ServiceCommission::is_valid_percentage(15));
    /// assert!(!ServiceCommission::is_valid_percentage(0));
    /// ```
    pub fn is_valid_percentage(percentage: i32) -> bool {
        COMMISSION_PERCENTAGE_RANGE.contains(&percentage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, true)]
    #[case(100, true)]
    #[case(0, false)]
    #[case(-5, false)]
    #[case(101, false)]
    fn percentage_bounds(#[case] percentage: i32, #[case] valid: bool) {
        assert_eq!(ServiceCommission::is_valid_percentage(percentage), valid);
    }
}
