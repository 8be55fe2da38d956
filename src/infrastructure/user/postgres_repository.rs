//! PostgreSQL user repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::user::{
    AcademicProfile, NewUser, ProfilePatch, User, UserRepository, UserRole, VendorRequest,
    VendorRequestStatus,
};
use crate::domain::DomainError;
use crate::infrastructure::db::{is_unique_violation, storage_error};

const USER_COLUMNS: &str = r#"
    u.id, u.username, u.email, u.password_hash, u.first_name, u.last_name,
    u.phone, u.role, u.registered_at,
    a.school, a.program, a.term
"#;

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: i64) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users u
            LEFT JOIN academic_profiles a ON a.user_id = u.id
            WHERE u.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to get user", e))?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users u
            LEFT JOIN academic_profiles a ON a.user_id = u.id
            WHERE u.email = $1
            "#
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to get user by email", e))?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn create(&self, new_user: NewUser) -> Result<User, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("Failed to begin transaction", e))?;

        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, first_name, last_name, phone, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, registered_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.phone)
        .bind(new_user.role.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict(format!(
                    "Email '{}' is already registered",
                    new_user.email
                ))
            } else {
                storage_error("Failed to create user", e)
            }
        })?;

        let id: i64 = row.get("id");
        let registered_at = row.get("registered_at");

        sqlx::query(
            r#"
            INSERT INTO academic_profiles (user_id, school, program, term)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(&new_user.academic.school)
        .bind(&new_user.academic.program)
        .bind(&new_user.academic.term)
        .execute(&mut *tx)
        .await
        .map_err(|e| storage_error("Failed to create academic profile", e))?;

        tx.commit()
            .await
            .map_err(|e| storage_error("Failed to commit user creation", e))?;

        Ok(User {
            id,
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            phone: new_user.phone,
            role: new_user.role,
            registered_at,
            academic: Some(new_user.academic),
        })
    }

    async fn update_profile(&self, id: i64, patch: ProfilePatch) -> Result<User, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                password_hash = COALESCE($6, password_hash)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&patch.first_name)
        .bind(&patch.last_name)
        .bind(&patch.email)
        .bind(&patch.phone)
        .bind(&patch.password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict("Email is already registered")
            } else {
                storage_error("Failed to update profile", e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("User '{}' not found", id)));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))
    }

    async fn set_role(&self, id: i64, role: UserRole) -> Result<User, DomainError> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
            .bind(id)
            .bind(role.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to set role", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("User '{}' not found", id)));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))
    }

    async fn create_vendor_request(
        &self,
        user_id: i64,
        reason: String,
    ) -> Result<VendorRequest, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO vendor_requests (user_id, reason)
            VALUES ($1, $2)
            RETURNING id, user_id, reason, status, requested_at, decided_at
            "#,
        )
        .bind(user_id)
        .bind(&reason)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict("A vendor request is already pending for this user")
            } else {
                storage_error("Failed to create vendor request", e)
            }
        })?;

        row_to_vendor_request(&row)
    }

    async fn get_vendor_request(&self, id: i64) -> Result<Option<VendorRequest>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, reason, status, requested_at, decided_at
            FROM vendor_requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to get vendor request", e))?;

        row.map(|r| row_to_vendor_request(&r)).transpose()
    }

    async fn decide_vendor_request(
        &self,
        id: i64,
        approve: bool,
    ) -> Result<VendorRequest, DomainError> {
        let status = if approve {
            VendorRequestStatus::Approved
        } else {
            VendorRequestStatus::Denied
        };

        // Conditional on the pending state so a decided request is never
        // flipped twice
        let row = sqlx::query(
            r#"
            UPDATE vendor_requests
            SET status = $2, decided_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING id, user_id, reason, status, requested_at, decided_at
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to decide vendor request", e))?;

        match row {
            Some(row) => row_to_vendor_request(&row),
            None => match self.get_vendor_request(id).await? {
                Some(_) => Err(DomainError::conflict(format!(
                    "Vendor request '{}' was already decided",
                    id
                ))),
                None => Err(DomainError::not_found(format!(
                    "Vendor request '{}' not found",
                    id
                ))),
            },
        }
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let role: String = row.get("role");
    let school: Option<String> = row.get("school");

    let academic = school.map(|school| AcademicProfile {
        school,
        program: row.get("program"),
        term: row.get("term"),
    });

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        phone: row.get("phone"),
        role: UserRole::parse(&role)?,
        registered_at: row.get("registered_at"),
        academic,
    })
}

fn row_to_vendor_request(row: &sqlx::postgres::PgRow) -> Result<VendorRequest, DomainError> {
    let status: String = row.get("status");

    Ok(VendorRequest {
        id: row.get("id"),
        user_id: row.get("user_id"),
        reason: row.get("reason"),
        status: VendorRequestStatus::parse(&status)?,
        requested_at: row.get("requested_at"),
        decided_at: row.get("decided_at"),
    })
}
