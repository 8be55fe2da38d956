//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Role of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular account: can browse and buy
    #[default]
    User,
    /// Approved seller: can publish and manage listings
    Vendor,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Vendor => "vendor",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "user" => Ok(Self::User),
            "vendor" => Ok(Self::Vendor),
            other => Err(DomainError::internal(format!(
                "Unknown user role '{other}'"
            ))),
        }
    }

    /// Check if the role allows managing product listings
    pub fn can_sell(&self) -> bool {
        matches!(self, Self::Vendor)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Academic information attached to a user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicProfile {
    pub school: String,
    pub program: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
}

/// User account
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    /// Derived from the email local part at registration
    pub username: String,
    pub email: String,
    /// Argon2 password hash - never exposed in serialization
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: UserRole,
    pub registered_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic: Option<AcademicProfile>,
}

impl User {
    pub fn is_vendor(&self) -> bool {
        self.role.can_sell()
    }
}

/// Data needed to insert a new user row
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub academic: AcademicProfile,
}

/// Partial update of user account fields; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.password_hash.is_none()
    }
}

/// State of a vendor role request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorRequestStatus {
    Pending,
    Approved,
    Denied,
}

impl VendorRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "denied" => Ok(Self::Denied),
            other => Err(DomainError::internal(format!(
                "Unknown vendor request status '{other}'"
            ))),
        }
    }
}

/// A request to be granted the vendor role
#[derive(Debug, Clone, Serialize)]
pub struct VendorRequest {
    pub id: i64,
    pub user_id: i64,
    pub reason: String,
    pub status: VendorRequestStatus,
    pub requested_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
}

/// Derive the login username from the email local part
pub fn username_from_email(email: &str) -> String {
    email
        .split('@')
        .next()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 1,
            username: "jlopez".to_string(),
            email: "jlopez@campus.edu".to_string(),
            password_hash: "argon2-hash".to_string(),
            first_name: "Juana".to_string(),
            last_name: "Lopez".to_string(),
            phone: None,
            role: UserRole::User,
            registered_at: Utc::now(),
            academic: Some(AcademicProfile {
                school: "Engineering".to_string(),
                program: "Computer Science".to_string(),
                term: Some("5".to_string()),
            }),
        }
    }

    #[test]
    fn test_role_parse_roundtrip() {
        assert_eq!(UserRole::parse("user").unwrap(), UserRole::User);
        assert_eq!(UserRole::parse("vendor").unwrap(), UserRole::Vendor);
        assert!(UserRole::parse("admin").is_err());
    }

    #[test]
    fn test_role_can_sell() {
        assert!(!UserRole::User.can_sell());
        assert!(UserRole::Vendor.can_sell());
    }

    #[test]
    fn test_username_from_email() {
        assert_eq!(username_from_email("jlopez@campus.edu"), "jlopez");
        assert_eq!(username_from_email("plain"), "plain");
        assert_eq!(username_from_email("@campus.edu"), "");
    }

    #[test]
    fn test_serialization_excludes_password_hash() {
        let user = sample_user();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2-hash"));
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn test_vendor_request_status_parse() {
        assert_eq!(
            VendorRequestStatus::parse("pending").unwrap(),
            VendorRequestStatus::Pending
        );
        assert!(VendorRequestStatus::parse("rejected").is_err());
    }

    #[test]
    fn test_profile_patch_is_empty() {
        assert!(ProfilePatch::default().is_empty());

        let patch = ProfilePatch {
            email: Some("new@campus.edu".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
