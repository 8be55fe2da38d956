//! In-memory user repository implementation

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{
    NewUser, ProfilePatch, User, UserRepository, UserRole, VendorRequest, VendorRequestStatus,
};
use crate::domain::DomainError;

/// In-memory implementation of UserRepository, used by service tests
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<i64, User>>>,
    /// Index for email -> user ID lookup
    email_index: Arc<RwLock<HashMap<String, i64>>>,
    vendor_requests: Arc<RwLock<HashMap<i64, VendorRequest>>>,
    next_user_id: AtomicI64,
    next_request_id: AtomicI64,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            email_index: Arc::new(RwLock::new(HashMap::new())),
            vendor_requests: Arc::new(RwLock::new(HashMap::new())),
            next_user_id: AtomicI64::new(1),
            next_request_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: i64) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let email_index = self.email_index.read().await;

        if let Some(user_id) = email_index.get(email) {
            let users = self.users.read().await;
            return Ok(users.get(user_id).cloned());
        }

        Ok(None)
    }

    async fn create(&self, new_user: NewUser) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        let mut email_index = self.email_index.write().await;

        if email_index.contains_key(&new_user.email) {
            return Err(DomainError::conflict(format!(
                "Email '{}' is already registered",
                new_user.email
            )));
        }

        let id = self.next_user_id.fetch_add(1, Ordering::SeqCst);
        let user = User {
            id,
            username: new_user.username,
            email: new_user.email.clone(),
            password_hash: new_user.password_hash,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            phone: new_user.phone,
            role: new_user.role,
            registered_at: Utc::now(),
            academic: Some(new_user.academic),
        };

        email_index.insert(new_user.email, id);
        users.insert(id, user.clone());

        Ok(user)
    }

    async fn update_profile(&self, id: i64, patch: ProfilePatch) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        let mut email_index = self.email_index.write().await;

        let user = users
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

        if let Some(email) = &patch.email {
            if email != &user.email {
                if email_index.contains_key(email) {
                    return Err(DomainError::conflict(format!(
                        "Email '{}' is already registered",
                        email
                    )));
                }

                email_index.remove(&user.email);
                email_index.insert(email.clone(), id);
                user.email = email.clone();
            }
        }

        if let Some(first_name) = patch.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            user.last_name = last_name;
        }
        if let Some(phone) = patch.phone {
            user.phone = Some(phone);
        }
        if let Some(password_hash) = patch.password_hash {
            user.password_hash = password_hash;
        }

        Ok(user.clone())
    }

    async fn set_role(&self, id: i64, role: UserRole) -> Result<User, DomainError> {
        let mut users = self.users.write().await;

        let user = users
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

        user.role = role;
        Ok(user.clone())
    }

    async fn create_vendor_request(
        &self,
        user_id: i64,
        reason: String,
    ) -> Result<VendorRequest, DomainError> {
        let mut requests = self.vendor_requests.write().await;

        let has_pending = requests
            .values()
            .any(|r| r.user_id == user_id && r.status == VendorRequestStatus::Pending);
        if has_pending {
            return Err(DomainError::conflict(
                "A vendor request is already pending for this user",
            ));
        }

        let id = self.next_request_id.fetch_add(1, Ordering::SeqCst);
        let request = VendorRequest {
            id,
            user_id,
            reason,
            status: VendorRequestStatus::Pending,
            requested_at: Utc::now(),
            decided_at: None,
        };

        requests.insert(id, request.clone());
        Ok(request)
    }

    async fn get_vendor_request(&self, id: i64) -> Result<Option<VendorRequest>, DomainError> {
        let requests = self.vendor_requests.read().await;
        Ok(requests.get(&id).cloned())
    }

    async fn decide_vendor_request(
        &self,
        id: i64,
        approve: bool,
    ) -> Result<VendorRequest, DomainError> {
        let mut requests = self.vendor_requests.write().await;

        let request = requests
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("Vendor request '{}' not found", id)))?;

        if request.status != VendorRequestStatus::Pending {
            return Err(DomainError::conflict(format!(
                "Vendor request '{}' was already decided",
                id
            )));
        }

        request.status = if approve {
            VendorRequestStatus::Approved
        } else {
            VendorRequestStatus::Denied
        };
        request.decided_at = Some(Utc::now());

        Ok(request.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::AcademicProfile;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            username: email.split('@').next().unwrap().to_string(),
            email: email.to_string(),
            password_hash: "hashed".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            phone: None,
            role: UserRole::User,
            academic: AcademicProfile {
                school: "Engineering".to_string(),
                program: "CS".to_string(),
                term: None,
            },
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryUserRepository::new();

        let created = repo.create(new_user("ana@campus.edu")).await.unwrap();

        let retrieved = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(retrieved.email, "ana@campus.edu");
        assert_eq!(retrieved.username, "ana");

        let by_email = repo.get_by_email("ana@campus.edu").await.unwrap();
        assert!(by_email.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let repo = InMemoryUserRepository::new();

        repo.create(new_user("ana@campus.edu")).await.unwrap();

        let result = repo.create(new_user("ana@campus.edu")).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_update_profile_email_conflict() {
        let repo = InMemoryUserRepository::new();

        repo.create(new_user("ana@campus.edu")).await.unwrap();
        let other = repo.create(new_user("luis@campus.edu")).await.unwrap();

        let patch = ProfilePatch {
            email: Some("ana@campus.edu".to_string()),
            ..Default::default()
        };

        let result = repo.update_profile(other.id, patch).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_set_role() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("ana@campus.edu")).await.unwrap();

        let updated = repo.set_role(user.id, UserRole::Vendor).await.unwrap();
        assert_eq!(updated.role, UserRole::Vendor);
    }

    #[tokio::test]
    async fn test_vendor_request_lifecycle() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("ana@campus.edu")).await.unwrap();

        let request = repo
            .create_vendor_request(user.id, "I sell textbooks".to_string())
            .await
            .unwrap();
        assert_eq!(request.status, VendorRequestStatus::Pending);

        // A second pending request is rejected
        let second = repo.create_vendor_request(user.id, "again".to_string()).await;
        assert!(matches!(second, Err(DomainError::Conflict { .. })));

        let decided = repo.decide_vendor_request(request.id, true).await.unwrap();
        assert_eq!(decided.status, VendorRequestStatus::Approved);
        assert!(decided.decided_at.is_some());

        // Deciding twice is rejected
        let again = repo.decide_vendor_request(request.id, false).await;
        assert!(matches!(again, Err(DomainError::Conflict { .. })));
    }
}
