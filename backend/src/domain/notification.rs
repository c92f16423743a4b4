//! User-facing inbox entries.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::UserId;

/// Which workflow produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Booking,
    Payment,
}

impl NotificationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Booking => "booking",
            Self::Payment => "payment",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a notification kind string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown notification kind: {0}")]
pub struct UnknownNotificationKind(pub String);

impl FromStr for NotificationKind {
    type Err = UnknownNotificationKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "booking" => Ok(Self::Booking),
            "payment" => Ok(Self::Payment),
            other => Err(UnknownNotificationKind(other.to_owned())),
        }
    }
}

/// A stored inbox entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub user_id: UserId,
    pub booking_id: Option<Uuid>,
    pub message: String,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

/// An inbox entry waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub user_id: UserId,
    pub booking_id: Option<Uuid>,
    pub message: String,
}

impl NewNotification {
    /// Booking notification addressed to `user_id`.
    pub fn booking(user_id: UserId, booking_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: NotificationKind::Booking,
            user_id,
            booking_id: Some(booking_id),
            message: message.into(),
        }
    }

    /// Payment notification addressed to `user_id`.
    pub fn payment(user_id: UserId, booking_id: Option<Uuid>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: NotificationKind::Payment,
            user_id,
            booking_id,
            message: message.into(),
        }
    }

    /// The stored form of this entry, unseen, created at `at`.
    pub fn into_notification(self, at: DateTime<Utc>) -> Notification {
        Notification {
            id: self.id,
            kind: self.kind,
            user_id: self.user_id,
            booking_id: self.booking_id,
            message: self.message,
            seen: false,
            created_at: at,
        }
    }
}

/// Inbox messages emitted by the booking lifecycle.
pub mod messages {
    use uuid::Uuid;

    pub fn selected(booking_id: Uuid) -> String {
        format!("You have been selected for booking {booking_id}.")
    }

    pub const ACCEPTED: &str = "booking accepted.";
    pub const REJECTED: &str = "booking rejected.";
    pub const COMPLETED: &str = "booking completed.";
    pub const CANCELED: &str = "booking canceled.";
    pub const PAYMENT_VERIFIED: &str = "payment verified.";
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn booking_notification_targets_booking() {
        let user = UserId::random();
        let booking_id = Uuid::new_v4();
        let note = NewNotification::booking(user.clone(), booking_id, messages::ACCEPTED);

        assert_eq!(note.kind, NotificationKind::Booking);
        assert_eq!(note.booking_id, Some(booking_id));
        assert_eq!(note.user_id, user);
    }

    #[rstest]
    fn stored_form_starts_unseen() {
        let at = Utc::now();
        let stored = NewNotification::payment(UserId::random(), None, messages::PAYMENT_VERIFIED)
            .into_notification(at);
        assert!(!stored.seen);
        assert_eq!(stored.created_at, at);
    }

    #[rstest]
    fn selection_message_names_booking() {
        let id = Uuid::nil();
        assert_eq!(
            messages::selected(id),
            "You have been selected for booking 00000000-0000-0000-0000-000000000000."
        );
    }

    #[rstest]
    #[case("booking", NotificationKind::Booking)]
    #[case("payment", NotificationKind::Payment)]
    fn kind_round_trips(#[case] raw: &str, #[case] kind: NotificationKind) {
        assert_eq!(raw.parse::<NotificationKind>(), Ok(kind));
        assert_eq!(kind.to_string(), raw);
    }
}
