//! Marketplace user identity, roles, and the authorization policy.
//!
//! Roles are closed enums. Handlers and services never compare role strings;
//! they ask [`User::can`] or [`authorize`] whether a [`Capability`] is held.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Error;

/// Validation errors raised while parsing user fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier was empty.
    #[error("user id must not be empty")]
    EmptyId,
    /// The identifier was not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// The role string is not a known role.
    #[error("unknown role: {0}")]
    UnknownRole(String),
    /// The service role string is not a known service role.
    #[error("unknown service role: {0}")]
    UnknownServiceRole(String),
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Wrap an existing UUID, typically read back from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Platform role controlling administrative access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Ordinary marketplace member.
    Regular,
    /// Administrator with read access to every booking.
    Admin,
    /// Administrator who may also manage service pricing.
    #[serde(rename = "admin_super")]
    SuperAdmin,
}

impl Role {
    /// Storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Admin => "admin",
            Self::SuperAdmin => "admin_super",
        }
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "regular" => Ok(Self::Regular),
            "admin" => Ok(Self::Admin),
            "admin_super" => Ok(Self::SuperAdmin),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// Which side of the marketplace a user participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ServiceRole {
    /// Offers services only.
    #[serde(rename = "service_provider")]
    Provider,
    /// Requests services only.
    #[serde(rename = "service_requester")]
    Requester,
    /// Both offers and requests services.
    #[serde(rename = "service_both")]
    Both,
}

impl ServiceRole {
    /// Storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Provider => "service_provider",
            Self::Requester => "service_requester",
            Self::Both => "service_both",
        }
    }
}

impl FromStr for ServiceRole {
    type Err = UserValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "service_provider" => Ok(Self::Provider),
            "service_requester" => Ok(Self::Requester),
            "service_both" => Ok(Self::Both),
            other => Err(UserValidationError::UnknownServiceRole(other.to_owned())),
        }
    }
}

/// Actions gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Create bookings and pay for them.
    RequestServices,
    /// Be invited to, accept, or reject bookings and list services.
    ProvideServices,
    /// Read any booking regardless of participation.
    ViewAllBookings,
    /// Create, update, or delete service pricing and the commission.
    ManagePricing,
    /// Browse the member directory and read contact details of others.
    ViewUserDirectory,
    /// Change another member's platform role.
    ManageRoles,
}

/// Authenticated marketplace user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Contact email, forwarded to the payment gateway.
    pub email: String,
    /// Platform role.
    pub role: Role,
    /// Marketplace participation.
    pub service_role: ServiceRole,
}

impl User {
    /// Whether this user holds `capability`.
    ///
    /// # Examples
    /// ```
    /// use marketplace::domain::{Capability, Role, ServiceRole, User, UserId};
    ///
    /// let provider = User {
    ///     id: UserId::random(),
    ///     email: "p@example.com".to_owned(),
    ///     role: Role::Regular,
    ///     service_role: ServiceRole::Provider,
    /// };
    /// assert!(provider.can(Capability::ProvideServices));
    /// assert!(!provider.can(Capability::RequestServices));
    /// ```
    pub fn can(&self, capability: Capability) -> bool {
        match capability {
            Capability::RequestServices => self.service_role != ServiceRole::Provider,
            Capability::ProvideServices => self.service_role != ServiceRole::Requester,
            Capability::ViewAllBookings => matches!(self.role, Role::Admin | Role::SuperAdmin),
            Capability::ViewUserDirectory => matches!(self.role, Role::Admin | Role::SuperAdmin),
            Capability::ManagePricing | Capability::ManageRoles => self.role == Role::SuperAdmin,
        }
    }
}

/// Require `capability`, returning a forbidden error carrying `message`.
pub fn authorize(user: &User, capability: Capability, message: &str) -> Result<(), Error> {
    if user.can(capability) {
        Ok(())
    } else {
        Err(Error::forbidden(message))
    }
}
