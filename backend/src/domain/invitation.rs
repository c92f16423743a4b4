//! Provider invitations to act on an open booking.
//!
//! A provider may accept or reject a booking only while holding an invitation
//! for it. Invitations are unique per booking and invitee.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::UserId;

/// Response state of an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl InvitationStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored invitation status is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown invitation status: {0}")]
pub struct UnknownInvitationStatus(pub String);

impl FromStr for InvitationStatus {
    type Err = UnknownInvitationStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownInvitationStatus(other.to_owned())),
        }
    }
}

/// A requester's invitation of one provider to one booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub booking_id: Uuid,
    pub invitee_id: UserId,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invitation {
    /// A fresh pending invitation.
    pub fn pending(booking_id: Uuid, invitee_id: UserId, at: DateTime<Utc>) -> Self {
        Self {
            booking_id,
            invitee_id,
            status: InvitationStatus::Pending,
            created_at: at,
            updated_at: at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("pending", InvitationStatus::Pending)]
    #[case("accepted", InvitationStatus::Accepted)]
    #[case("rejected", InvitationStatus::Rejected)]
    fn status_round_trips(#[case] raw: &str, #[case] status: InvitationStatus) {
        assert_eq!(raw.parse::<InvitationStatus>(), Ok(status));
        assert_eq!(status.as_str(), raw);
    }

    #[rstest]
    fn pending_invitation_uses_one_timestamp() {
        let at = Utc::now();
        let invitation = Invitation::pending(Uuid::new_v4(), UserId::random(), at);
        assert_eq!(invitation.status, InvitationStatus::Pending);
        assert_eq!(invitation.created_at, invitation.updated_at);
    }
}
