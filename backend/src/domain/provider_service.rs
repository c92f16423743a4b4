//! Provider offerings, their weekly availability, and gallery images.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Address, ServiceType, UserId};

const TIME_OF_DAY_FORMAT: &str = "%H:%M";

/// Validation errors for provider offerings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderServiceValidationError {
    #[error("{day}: times must use HH:MM")]
    InvalidTimeOfDay { day: &'static str },
    #[error("{day}: start must be before end")]
    EmptyWindow { day: &'static str },
    #[error("{day}: start and end must both be set or both be empty")]
    HalfOpenWindow { day: &'static str },
    #[error("rate per hour must be greater than zero")]
    NonPositiveRate,
    #[error("experience years must not be negative")]
    NegativeExperience,
}

/// Daily availability window. Two empty strings mean unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeRange {
    #[schema(example = "09:00")]
    pub start: String,
    #[schema(example = "17:00")]
    pub end: String,
}

impl TimeRange {
    fn validate(&self, day: &'static str) -> Result<(), ProviderServiceValidationError> {
        match (self.start.is_empty(), self.end.is_empty()) {
            (true, true) => return Ok(()),
            (false, false) => {}
            _ => return Err(ProviderServiceValidationError::HalfOpenWindow { day }),
        }
        let parse = |raw: &str| {
            NaiveTime::parse_from_str(raw, TIME_OF_DAY_FORMAT)
                .map_err(|_| ProviderServiceValidationError::InvalidTimeOfDay { day })
        };
        if parse(&self.start)? >= parse(&self.end)? {
            return Err(ProviderServiceValidationError::EmptyWindow { day });
        }
        Ok(())
    }
}

/// Weekly availability stored as a JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Availability {
    pub monday: TimeRange,
    pub tuesday: TimeRange,
    pub wednesday: TimeRange,
    pub thursday: TimeRange,
    pub friday: TimeRange,
    pub saturday: TimeRange,
    pub sunday: TimeRange,
}

impl Availability {
    /// Check every day's window.
    pub fn validate(&self) -> Result<(), ProviderServiceValidationError> {
        [
            (&self.monday, "monday"),
            (&self.tuesday, "tuesday"),
            (&self.wednesday, "wednesday"),
            (&self.thursday, "thursday"),
            (&self.friday, "friday"),
            (&self.saturday, "saturday"),
            (&self.sunday, "sunday"),
        ]
        .into_iter()
        .try_for_each(|(range, day)| range.validate(day))
    }
}

/// Provider-editable fields of an offering.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderServiceDetails {
    pub description: String,
    pub rate_per_hour: f64,
    pub experience_years: i32,
    pub availability: Availability,
    pub address: Address,
}

impl ProviderServiceDetails {
    pub fn validate(&self) -> Result<(), ProviderServiceValidationError> {
        if !(self.rate_per_hour.is_finite() && self.rate_per_hour > 0.0) {
            return Err(ProviderServiceValidationError::NonPositiveRate);
        }
        if self.experience_years < 0 {
            return Err(ProviderServiceValidationError::NegativeExperience);
        }
        self.availability.validate()
    }
}

/// A provider's offering of one service type.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderService {
    pub id: Uuid,
    pub user_id: UserId,
    pub service_type: ServiceType,
    pub details: ProviderServiceDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An image in a provider's service gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceImage {
    pub id: Uuid,
    pub user_id: UserId,
    pub service_type: ServiceType,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl ServiceImage {
    /// Object storage key for this image.
    pub fn storage_key(&self) -> String {
        image_storage_key(self.service_type, &self.user_id, self.id)
    }
}

/// `profiles/services/{service_type}/{user_id}/{image_id}`
pub fn image_storage_key(service_type: ServiceType, user_id: &UserId, image_id: Uuid) -> String {
    format!("profiles/services/{service_type}/{user_id}/{image_id}")
}

/// Image content types accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageContentType {
    Jpeg,
    Png,
}

impl ImageContentType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "image/jpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            _ => None,
        }
    }

    pub const fn as_mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn window(start: &str, end: &str) -> TimeRange {
        TimeRange {
            start: start.to_owned(),
            end: end.to_owned(),
        }
    }

    #[fixture]
    fn details() -> ProviderServiceDetails {
        ProviderServiceDetails {
            description: "plumbing repairs".to_owned(),
            rate_per_hour: 3000.0,
            experience_years: 4,
            availability: Availability {
                monday: window("09:00", "17:00"),
                ..Availability::default()
            },
            address: Address::new("3 Ring Road, Ibadan, Oyo, Nigeria").expect("valid address"),
        }
    }

    #[rstest]
    fn valid_details_pass(details: ProviderServiceDetails) {
        assert_eq!(details.validate(), Ok(()));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-5.0)]
    #[case(f64::NAN)]
    fn rate_must_be_positive(mut details: ProviderServiceDetails, #[case] rate: f64) {
        details.rate_per_hour = rate;
        assert_eq!(
            details.validate(),
            Err(ProviderServiceValidationError::NonPositiveRate)
        );
    }

    #[rstest]
    #[case(window("9am", "17:00"), ProviderServiceValidationError::InvalidTimeOfDay { day: "friday" })]
    #[case(window("17:00", "09:00"), ProviderServiceValidationError::EmptyWindow { day: "friday" })]
    #[case(window("09:00", ""), ProviderServiceValidationError::HalfOpenWindow { day: "friday" })]
    fn bad_windows_name_the_day(
        mut details: ProviderServiceDetails,
        #[case] friday: TimeRange,
        #[case] expected: ProviderServiceValidationError,
    ) {
        details.availability.friday = friday;
        assert_eq!(details.validate(), Err(expected));
    }

    #[rstest]
    fn storage_key_layout() {
        let user = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
        let key = image_storage_key(ServiceType::Cooking, &user, Uuid::nil());
        assert_eq!(
            key,
            "profiles/services/cooking/3fa85f64-5717-4562-b3fc-2c963f66afa6/00000000-0000-0000-0000-000000000000"
        );
    }

    #[rstest]
    #[case("image/jpeg", Some(ImageContentType::Jpeg))]
    #[case("image/png", Some(ImageContentType::Png))]
    #[case("image/gif", None)]
    fn accepted_content_types(#[case] raw: &str, #[case] expected: Option<ImageContentType>) {
        assert_eq!(ImageContentType::parse(raw), expected);
    }

    #[rstest]
    fn availability_deserialises_missing_days_as_unavailable() {
        let parsed: Availability =
            serde_json::from_str(r#"{"monday":{"start":"08:00","end":"12:00"}}"#)
                .expect("valid availability");
        assert_eq!(parsed.monday, window("08:00", "12:00"));
        assert_eq!(parsed.sunday, TimeRange::default());
        assert_eq!(parsed.validate(), Ok(()));
    }
}
