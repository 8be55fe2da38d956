//! User repository trait

use async_trait::async_trait;

use super::{NewUser, ProfilePatch, User, UserRole, VendorRequest};
use crate::domain::DomainError;

/// Repository for user accounts, academic profiles and vendor requests
#[async_trait]
pub trait UserRepository: Send + Sync + std::fmt::Debug {
    /// Get a user by ID, with the academic profile attached
    async fn get(&self, id: i64) -> Result<Option<User>, DomainError>;

    /// Get a user by email (exact match)
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Insert a user and its academic profile atomically.
    /// Returns `Conflict` when the email is already registered.
    async fn create(&self, new_user: NewUser) -> Result<User, DomainError>;

    /// Apply a partial account update. `Conflict` when the new email is taken,
    /// `NotFound` when the user does not exist.
    async fn update_profile(&self, id: i64, patch: ProfilePatch) -> Result<User, DomainError>;

    /// Replace the user's role
    async fn set_role(&self, id: i64, role: UserRole) -> Result<User, DomainError>;

    /// File a vendor role request. `Conflict` when a pending request exists.
    async fn create_vendor_request(
        &self,
        user_id: i64,
        reason: String,
    ) -> Result<VendorRequest, DomainError>;

    async fn get_vendor_request(&self, id: i64) -> Result<Option<VendorRequest>, DomainError>;

    /// Mark a pending request approved or denied. `Conflict` when the request
    /// was already decided.
    async fn decide_vendor_request(
        &self,
        id: i64,
        approve: bool,
    ) -> Result<VendorRequest, DomainError>;
}
