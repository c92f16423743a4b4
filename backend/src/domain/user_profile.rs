//! Member profiles and the edits members may make to their own.
//!
//! A [`UserProfile`] carries contact details that only the member and
//! administrators see. Everyone else gets [`UserProfile::public_view`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Address, Role, ServiceRole, User, UserId};

/// Longest accepted first or last name, in characters.
pub const MAX_NAME_LENGTH: usize = 64;
/// Longest accepted bio, in characters.
pub const MAX_BIO_LENGTH: usize = 500;

/// Reasons a profile edit is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileValidationError {
    #[error("{field} must not be blank")]
    BlankName { field: &'static str },
    #[error("{field} must be at most {MAX_NAME_LENGTH} characters")]
    NameTooLong { field: &'static str },
    #[error("bio must be at most {MAX_BIO_LENGTH} characters")]
    BioTooLong,
    #[error("phone number must be 7 to 15 digits with an optional leading +")]
    InvalidPhoneNumber,
    #[error("address must include street, city, state and country")]
    InvalidAddress,
}

impl ProfileValidationError {
    /// Wire name of the offending field.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::BlankName { field } | Self::NameTooLong { field } => field,
            Self::BioTooLong => "bio",
            Self::InvalidPhoneNumber => "phoneNumber",
            Self::InvalidAddress => "address",
        }
    }
}

/// Phone number normalised to digits with an optional leading `+`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Strip spaces and hyphens, then require 7 to 15 digits.
    ///
    /// # Examples
    /// ```
    /// use marketplace::domain::PhoneNumber;
    ///
    /// let phone = PhoneNumber::new("+234 803-123-4567").expect("valid phone");
    /// assert_eq!(phone.as_str(), "+2348031234567");
    /// assert!(PhoneNumber::new("12ab").is_err());
    /// ```
    pub fn new(raw: &str) -> Result<Self, ProfileValidationError> {
        let compact: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect();
        let digits = compact.strip_prefix('+').unwrap_or(&compact);
        let valid = (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
        if valid {
            Ok(Self(compact))
        } else {
            Err(ProfileValidationError::InvalidPhoneNumber)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

/// A member as shown on profile pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    /// Hidden from the public view.
    pub email: Option<String>,
    pub role: Role,
    pub service_role: ServiceRole,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Hidden from the public view.
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    /// Hidden from the public view.
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// A profile with nothing but the account fields filled in.
    pub fn bare(user: &User, at: DateTime<Utc>) -> Self {
        Self {
            id: user.id.clone(),
            email: Some(user.email.clone()),
            role: user.role,
            service_role: user.service_role,
            first_name: None,
            last_name: None,
            phone_number: None,
            bio: None,
            address: None,
            created_at: at,
            updated_at: at,
        }
    }

    /// The profile without email, phone number or address.
    pub fn public_view(self) -> Self {
        Self {
            email: None,
            phone_number: None,
            address: None,
            ..self
        }
    }

    /// Apply `update`, leaving fields it does not set untouched.
    pub fn apply(&mut self, update: &ProfileUpdate, at: DateTime<Utc>) {
        if let Some(first_name) = &update.first_name {
            self.first_name = Some(first_name.clone());
        }
        if let Some(last_name) = &update.last_name {
            self.last_name = Some(last_name.clone());
        }
        if let Some(phone) = &update.phone_number {
            self.phone_number = Some(phone.as_str().to_owned());
        }
        if let Some(bio) = &update.bio {
            self.bio = Some(bio.clone());
        }
        if let Some(address) = &update.address {
            self.address = Some(address.as_str().to_owned());
        }
        self.updated_at = at;
    }
}

/// Raw profile edit as submitted by a member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileEdit {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub address: Option<String>,
}

/// Validated profile edit. `None` leaves the stored value as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<PhoneNumber>,
    pub bio: Option<String>,
    pub address: Option<Address>,
}

fn validate_name(
    field: &'static str,
    raw: Option<String>,
) -> Result<Option<String>, ProfileValidationError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ProfileValidationError::BlankName { field });
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ProfileValidationError::NameTooLong { field });
    }
    Ok(Some(trimmed.to_owned()))
}

impl TryFrom<ProfileEdit> for ProfileUpdate {
    type Error = ProfileValidationError;

    fn try_from(edit: ProfileEdit) -> Result<Self, Self::Error> {
        let bio = edit.bio.map(|bio| bio.trim().to_owned());
        if bio
            .as_deref()
            .is_some_and(|bio| bio.chars().count() > MAX_BIO_LENGTH)
        {
            return Err(ProfileValidationError::BioTooLong);
        }
        Ok(Self {
            first_name: validate_name("firstName", edit.first_name)?,
            last_name: validate_name("lastName", edit.last_name)?,
            phone_number: edit
                .phone_number
                .as_deref()
                .map(PhoneNumber::new)
                .transpose()?,
            bio,
            address: edit
                .address
                .map(|raw| Address::new(raw.trim()))
                .transpose()
                .map_err(|_| ProfileValidationError::InvalidAddress)?,
        })
    }
}

impl ProfileUpdate {
    /// Whether the edit changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Directory filters. Text filters match case-insensitive substrings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub service_role: Option<ServiceRole>,
    pub email: Option<String>,
    /// Matches either the first or the last name.
    pub name: Option<String>,
}
