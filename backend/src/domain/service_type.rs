//! Kinds of service traded on the marketplace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A service category with its own hourly pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    /// Household cleaning.
    Cleaning,
    /// Plumbing repairs and installation.
    Plumbing,
    /// Meal preparation.
    Cooking,
}

impl ServiceType {
    /// Every supported service type.
    pub const ALL: [Self; 3] = [Self::Cleaning, Self::Plumbing, Self::Cooking];

    /// Storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cleaning => "cleaning",
            Self::Plumbing => "plumbing",
            Self::Cooking => "cooking",
        }
    }
}

/// Raised when a string does not name a supported service type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported service type: {0}")]
pub struct UnknownServiceType(pub String);

impl FromStr for ServiceType {
    type Err = UnknownServiceType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| UnknownServiceType(value.to_owned()))
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cleaning", ServiceType::Cleaning)]
    #[case("plumbing", ServiceType::Plumbing)]
    #[case("cooking", ServiceType::Cooking)]
    fn parses_known_types(#[case] raw: &str, #[case] expected: ServiceType) {
        assert_eq!(raw.parse::<ServiceType>(), Ok(expected));
        assert_eq!(expected.to_string(), raw);
    }

    #[rstest]
    #[case("Cleaning")]
    #[case("gardening")]
    #[case("")]
    fn rejects_unknown_types(#[case] raw: &str) {
        assert_eq!(
            raw.parse::<ServiceType>(),
            Err(UnknownServiceType(raw.to_owned()))
        );
    }
}
