//! User service: registration, authentication and account management

use std::sync::Arc;

use crate::domain::user::{
    username_from_email, validation::validate_email, validation::validate_password,
    validation::validate_required, AcademicProfile, NewUser, ProfilePatch, User, UserRepository,
    UserRole, VendorRequest,
};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// Message for every authentication failure: unknown email and wrong password
/// are indistinguishable on purpose.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Request for registering a new account
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub school: String,
    pub program: String,
    pub term: Option<String>,
}

/// Request for updating the current account
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Required when `new_password` is set
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// User service for accounts, authentication and the vendor workflow
#[derive(Debug)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    /// Create a new user service
    pub fn new(repository: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repository, hasher }
    }

    /// Register a new account. The username is derived from the email local
    /// part; duplicate emails surface as `Conflict`.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, DomainError> {
        validate_required("First name", &request.first_name)
            .map_err(|e| DomainError::validation(e.to_string()))?;
        validate_required("Last name", &request.last_name)
            .map_err(|e| DomainError::validation(e.to_string()))?;
        validate_required("School", &request.school)
            .map_err(|e| DomainError::validation(e.to_string()))?;
        validate_required("Program", &request.program)
            .map_err(|e| DomainError::validation(e.to_string()))?;
        validate_email(&request.email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&request.password)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let password_hash = self.hasher.hash(&request.password)?;

        self.repository
            .create(NewUser {
                username: username_from_email(&request.email),
                email: request.email,
                password_hash,
                first_name: request.first_name,
                last_name: request.last_name,
                phone: request.phone,
                role: UserRole::User,
                academic: AcademicProfile {
                    school: request.school,
                    program: request.program,
                    term: request.term,
                },
            })
            .await
    }

    /// Authenticate with email and password
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let user = self
            .repository
            .get_by_email(email)
            .await?
            .ok_or_else(|| DomainError::unauthorized(INVALID_CREDENTIALS))?;

        if !self.hasher.verify(password, &user.password_hash) {
            return Err(DomainError::unauthorized(INVALID_CREDENTIALS));
        }

        Ok(user)
    }

    /// Get an account by ID
    pub async fn get(&self, id: i64) -> Result<Option<User>, DomainError> {
        self.repository.get(id).await
    }

    /// Update the current account. A password change requires the current
    /// password to match.
    pub async fn update_profile(
        &self,
        id: i64,
        request: UpdateProfileRequest,
    ) -> Result<User, DomainError> {
        if let Some(email) = &request.email {
            validate_email(email).map_err(|e| DomainError::validation(e.to_string()))?;
        }
        if let Some(first_name) = &request.first_name {
            validate_required("First name", first_name)
                .map_err(|e| DomainError::validation(e.to_string()))?;
        }
        if let Some(last_name) = &request.last_name {
            validate_required("Last name", last_name)
                .map_err(|e| DomainError::validation(e.to_string()))?;
        }

        let password_hash = match &request.new_password {
            Some(new_password) => {
                let current = request.current_password.as_deref().ok_or_else(|| {
                    DomainError::validation("Current password is required to change the password")
                })?;

                let user = self
                    .repository
                    .get(id)
                    .await?
                    .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

                if !self.hasher.verify(current, &user.password_hash) {
                    return Err(DomainError::validation("Current password is incorrect"));
                }

                validate_password(new_password)
                    .map_err(|e| DomainError::validation(e.to_string()))?;

                Some(self.hasher.hash(new_password)?)
            }
            None => None,
        };

        let patch = ProfilePatch {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            phone: request.phone,
            password_hash,
        };

        if patch.is_empty() {
            return Err(DomainError::validation("No fields to update"));
        }

        self.repository.update_profile(id, patch).await
    }

    /// File a vendor role request for the user
    pub async fn request_vendor_role(
        &self,
        user_id: i64,
        reason: String,
    ) -> Result<VendorRequest, DomainError> {
        validate_required("Reason", &reason)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let user = self
            .repository
            .get(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", user_id)))?;

        if user.is_vendor() {
            return Err(DomainError::conflict("Account already has the vendor role"));
        }

        self.repository.create_vendor_request(user_id, reason).await
    }

    /// Decide a pending vendor request; approval grants the role
    pub async fn decide_vendor_request(
        &self,
        request_id: i64,
        approve: bool,
    ) -> Result<VendorRequest, DomainError> {
        let request = self
            .repository
            .decide_vendor_request(request_id, approve)
            .await?;

        if approve {
            self.repository
                .set_role(request.user_id, UserRole::Vendor)
                .await?;
        }

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::VendorRequestStatus;
    use crate::infrastructure::user::password::Argon2Hasher;
    use crate::infrastructure::user::repository::InMemoryUserRepository;

    fn service() -> UserService {
        UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(Argon2Hasher::new()),
        )
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "Ana".to_string(),
            last_name: "Torres".to_string(),
            email: email.to_string(),
            password: "secret-password".to_string(),
            phone: None,
            school: "Engineering".to_string(),
            program: "Computer Science".to_string(),
            term: Some("5".to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_derives_username() {
        let service = service();

        let user = service
            .register(register_request("ana.torres@campus.edu"))
            .await
            .unwrap();

        assert_eq!(user.username, "ana.torres");
        assert_eq!(user.role, UserRole::User);
        assert!(user.academic.is_some());
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let service = service();

        service
            .register(register_request("ana@campus.edu"))
            .await
            .unwrap();

        let result = service.register(register_request("ana@campus.edu")).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let service = service();

        let mut request = register_request("ana@campus.edu");
        request.password = "short".to_string();
        assert!(matches!(
            service.register(request).await,
            Err(DomainError::Validation { .. })
        ));

        let mut request = register_request("not-an-email");
        request.password = "long-enough-password".to_string();
        assert!(matches!(
            service.register(request).await,
            Err(DomainError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let service = service();
        service
            .register(register_request("ana@campus.edu"))
            .await
            .unwrap();

        let user = service
            .authenticate("ana@campus.edu", "secret-password")
            .await
            .unwrap();
        assert_eq!(user.email, "ana@campus.edu");
    }

    #[tokio::test]
    async fn test_authenticate_failures_are_indistinguishable() {
        let service = service();
        service
            .register(register_request("ana@campus.edu"))
            .await
            .unwrap();

        let unknown = service
            .authenticate("ghost@campus.edu", "secret-password")
            .await
            .unwrap_err();
        let wrong = service
            .authenticate("ana@campus.edu", "wrong-password")
            .await
            .unwrap_err();

        assert_eq!(unknown.to_string(), wrong.to_string());
        assert!(matches!(unknown, DomainError::Unauthorized { .. }));
        assert!(matches!(wrong, DomainError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_update_profile_password_change() {
        let service = service();
        let user = service
            .register(register_request("ana@campus.edu"))
            .await
            .unwrap();

        // Missing current password
        let result = service
            .update_profile(
                user.id,
                UpdateProfileRequest {
                    new_password: Some("another-password".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));

        // Wrong current password
        let result = service
            .update_profile(
                user.id,
                UpdateProfileRequest {
                    current_password: Some("wrong".to_string()),
                    new_password: Some("another-password".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));

        // Correct current password
        service
            .update_profile(
                user.id,
                UpdateProfileRequest {
                    current_password: Some("secret-password".to_string()),
                    new_password: Some("another-password".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(service
            .authenticate("ana@campus.edu", "another-password")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_update_profile_requires_some_field() {
        let service = service();
        let user = service
            .register(register_request("ana@campus.edu"))
            .await
            .unwrap();

        let result = service
            .update_profile(user.id, UpdateProfileRequest::default())
            .await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_vendor_request_approval_grants_role() {
        let service = service();
        let user = service
            .register(register_request("ana@campus.edu"))
            .await
            .unwrap();

        let request = service
            .request_vendor_role(user.id, "I sell used textbooks".to_string())
            .await
            .unwrap();
        assert_eq!(request.status, VendorRequestStatus::Pending);

        let decided = service
            .decide_vendor_request(request.id, true)
            .await
            .unwrap();
        assert_eq!(decided.status, VendorRequestStatus::Approved);

        let user = service.get(user.id).await.unwrap().unwrap();
        assert!(user.is_vendor());

        // Vendors cannot file another request
        let result = service
            .request_vendor_role(user.id, "again".to_string())
            .await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_vendor_request_denial_keeps_role() {
        let service = service();
        let user = service
            .register(register_request("ana@campus.edu"))
            .await
            .unwrap();

        let request = service
            .request_vendor_role(user.id, "Selling handmade crafts".to_string())
            .await
            .unwrap();

        let decided = service
            .decide_vendor_request(request.id, false)
            .await
            .unwrap();
        assert_eq!(decided.status, VendorRequestStatus::Denied);

        let user = service.get(user.id).await.unwrap().unwrap();
        assert!(!user.is_vendor());
    }
}
