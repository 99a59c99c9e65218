//! Domain primitives for referral matching with strong typing.
//!
//! Identifiers are newtypes so a `UserId` can never be passed where a
//! `ReferralId` is expected. The enums double as `SeaORM` active enums and are
//! stored as their upper-case names.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a [`User`](crate::models::user::User).
///
/// # Examples
///
/// ```rust
/// use referral_platform::domain::UserId;
///
/// let id = UserId::new(7);
/// assert_eq!(id.value(), 7);
/// assert_eq!(id.to_string(), "7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UserId(i32);

impl UserId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        debug_assert!(id >= 0, "UserId should be non-negative");
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

/// Unique identifier for a referral request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ReferralId(i32);

impl ReferralId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        debug_assert!(id >= 0, "ReferralId should be non-negative");
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

macro_rules! id_conversions {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$ty> for i32 {
            fn from(id: $ty) -> Self {
                id.0
            }
        }

        impl From<i32> for $ty {
            fn from(id: i32) -> Self {
                Self::new(id)
            }
        }

        impl Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_i32(self.0)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let id = i32::deserialize(deserializer)?;
                Ok(Self::new(id))
            }
        }
    };
}

id_conversions!(UserId);
id_conversions!(ReferralId);

/// Account role. Employee capability is not a role: it comes from the
/// presence of a company name on the account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[default]
    #[sea_orm(string_value = "REGULAR")]
    Regular,

    #[sea_orm(string_value = "ADMIN")]
    Admin,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "REGULAR",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REGULAR" | "USER" => Ok(Self::Regular),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(ParseEnumError::new("role", s)),
        }
    }
}

/// How the account authenticates with the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthProvider {
    #[sea_orm(string_value = "EXTERNAL_OAUTH")]
    ExternalOauth,

    #[sea_orm(string_value = "EMAIL_PASSWORD")]
    EmailPassword,
}

impl AuthProvider {
    /// Maps the identity provider's sign-in method claim.
    ///
    /// Only `password` sign-ins need an explicit email verification step.
    #[must_use]
    pub fn from_sign_in_provider(provider: Option<&str>) -> Self {
        match provider {
            Some("password") => Self::EmailPassword,
            _ => Self::ExternalOauth,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ExternalOauth => "EXTERNAL_OAUTH",
            Self::EmailPassword => "EMAIL_PASSWORD",
        }
    }
}

impl fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a referral request.
///
/// ```text
/// PENDING ──claim──▶ ACCEPTED ──▶ HIRED
///    │                   │
///    └──────▶ REJECTED ◀─┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferralStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,

    #[sea_orm(string_value = "ACCEPTED")]
    Accepted,

    #[sea_orm(string_value = "REJECTED")]
    Rejected,

    #[sea_orm(string_value = "HIRED")]
    Hired,
}

impl ReferralStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Hired => "HIRED",
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Hired | Self::Rejected)
    }

    /// Statuses from which a plain status update may move to `target`.
    ///
    /// `ACCEPTED` is absent on purpose: it is only reachable by claiming.
    #[must_use]
    pub const fn predecessors(target: Self) -> &'static [Self] {
        match target {
            Self::Pending | Self::Accepted => &[],
            Self::Rejected => &[Self::Pending, Self::Accepted],
            Self::Hired => &[Self::Accepted],
        }
    }

    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        Self::predecessors(target).contains(self)
    }
}

impl fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferralStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "ACCEPTED" => Ok(Self::Accepted),
            "REJECTED" => Ok(Self::Rejected),
            "HIRED" => Ok(Self::Hired),
            _ => Err(ParseEnumError::new("status", s)),
        }
    }
}

/// Returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("hired".parse::<ReferralStatus>(), Ok(ReferralStatus::Hired));
        assert_eq!(" Pending ".parse::<ReferralStatus>(), Ok(ReferralStatus::Pending));

        let err = "promoted".parse::<ReferralStatus>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid status: promoted");
    }

    #[test]
    fn allowed_status_edges() {
        use ReferralStatus::{Accepted, Hired, Pending, Rejected};

        assert!(Pending.can_transition_to(Rejected));
        assert!(Accepted.can_transition_to(Hired));
        assert!(Accepted.can_transition_to(Rejected));

        assert!(!Pending.can_transition_to(Accepted));
        assert!(!Pending.can_transition_to(Hired));
        assert!(!Hired.can_transition_to(Pending));
        assert!(!Rejected.can_transition_to(Accepted));
        assert!(!Hired.can_transition_to(Hired));
    }

    #[test]
    fn terminal_statuses() {
        assert!(ReferralStatus::Hired.is_terminal());
        assert!(ReferralStatus::Rejected.is_terminal());
        assert!(!ReferralStatus::Accepted.is_terminal());
    }

    #[test]
    fn sign_in_provider_mapping() {
        assert_eq!(
            AuthProvider::from_sign_in_provider(Some("password")),
            AuthProvider::EmailPassword
        );
        assert_eq!(
            AuthProvider::from_sign_in_provider(Some("google.com")),
            AuthProvider::ExternalOauth
        );
        assert_eq!(
            AuthProvider::from_sign_in_provider(None),
            AuthProvider::ExternalOauth
        );
    }

    #[test]
    fn ids_serialize_as_plain_integers() {
        let json = serde_json::to_string(&ReferralId::new(12)).unwrap();
        assert_eq!(json, "12");

        let id: UserId = serde_json::from_str("3").unwrap();
        assert_eq!(id, UserId::new(3));
    }

    #[test]
    fn enums_serialize_upper_case() {
        assert_eq!(
            serde_json::to_string(&AuthProvider::EmailPassword).unwrap(),
            "\"EMAIL_PASSWORD\""
        );
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"ADMIN\"");
    }
}
