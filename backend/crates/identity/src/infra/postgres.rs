//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{RoleId, UserId};
use platform::password::HashedPassword;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{role::Role, user::User};
use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::value_object::{email::Email, role_name::RoleName};
use crate::error::{IdentityError, IdentityResult};

const USER_SELECT: &str = r#"
    SELECT
        u.user_id,
        u.email,
        u.email_canonical,
        u.password_hash,
        u.first_name,
        u.last_name,
        u.email_verified,
        u.verification_code,
        u.verification_code_expires_at,
        u.reset_token,
        u.reset_token_expires_at,
        array_agg(r.name ORDER BY r.name) AS roles,
        u.created_at,
        u.updated_at
    FROM users u
    JOIN user_roles ur ON ur.user_id = u.user_id
    JOIN roles r ON r.role_id = ur.role_id
"#;

/// PostgreSQL-backed identity repository
#[derive(Clone)]
pub struct PgIdentityRepository {
    pool: PgPool,
}

impl PgIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Idempotent startup step ensuring the STUDENT and TEACHER rows exist.
    ///
    /// Safe to run on every boot; existing rows are left untouched and roles
    /// are never mutated at runtime afterwards.
    pub async fn seed_roles(&self) -> IdentityResult<u64> {
        let mut inserted = 0;

        for name in RoleName::ALL {
            let role = Role::new(name);
            inserted += sqlx::query(
                "INSERT INTO roles (role_id, name) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING",
            )
            .bind(role.role_id.as_uuid())
            .bind(role.name.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();
        }

        if inserted > 0 {
            tracing::info!(roles_inserted = inserted, "Seeded role reference data");
        }

        Ok(inserted)
    }

    async fn fetch_user_where(
        &self,
        clause: &str,
        bind: &str,
    ) -> IdentityResult<Option<User>> {
        let query = format!("{USER_SELECT} WHERE {clause} GROUP BY u.user_id");

        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_user()).transpose()
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgIdentityRepository {
    async fn create(&self, user: &User) -> IdentityResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                email,
                email_canonical,
                password_hash,
                first_name,
                last_name,
                email_verified,
                verification_code,
                verification_code_expires_at,
                reset_token,
                reset_token_expires_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.email.as_str())
        .bind(user.email.canonical())
        .bind(user.password_hash.as_phc_string())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.email_verified)
        .bind(&user.verification_code)
        .bind(user.verification_code_expires_at)
        .bind(&user.reset_token)
        .bind(user.reset_token_expires_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await?;

        for role in &user.roles {
            sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role_id)
                SELECT $1, role_id FROM roles WHERE name = $2
                "#,
            )
            .bind(user.user_id.as_uuid())
            .bind(role.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn find_by_email(&self, canonical_email: &str) -> IdentityResult<Option<User>> {
        self.fetch_user_where("u.email_canonical = $1", canonical_email)
            .await
    }

    async fn exists_by_email(&self, canonical_email: &str) -> IdentityResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email_canonical = $1)",
        )
        .bind(canonical_email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn find_by_verification_token(&self, token: &str) -> IdentityResult<Option<User>> {
        self.fetch_user_where("u.verification_code = $1", token)
            .await
    }

    async fn find_by_reset_token(&self, token: &str) -> IdentityResult<Option<User>> {
        self.fetch_user_where("u.reset_token = $1", token).await
    }

    async fn set_verification_code(
        &self,
        user_id: &UserId,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> IdentityResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                verification_code = $2,
                verification_code_expires_at = $3,
                updated_at = $4
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(code)
        .bind(expires_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_email_verified(&self, user_id: &UserId, code: &str) -> IdentityResult<bool> {
        // One conditional statement; of two racing verifications at most one
        // sees rows_affected = 1.
        let updated = sqlx::query(
            r#"
            UPDATE users SET
                email_verified = TRUE,
                verification_code = NULL,
                verification_code_expires_at = NULL,
                updated_at = $3
            WHERE user_id = $1
              AND email_verified = FALSE
              AND verification_code = $2
              AND verification_code_expires_at > $3
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(code)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn set_reset_token(
        &self,
        user_id: &UserId,
        token: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> IdentityResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                reset_token = $2,
                reset_token_expires_at = $3,
                updated_at = $4
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(token)
        .bind(expires_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn reset_password(
        &self,
        user_id: &UserId,
        token: &str,
        new_hash: &HashedPassword,
    ) -> IdentityResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE users SET
                password_hash = $3,
                reset_token = NULL,
                reset_token_expires_at = NULL,
                updated_at = $4
            WHERE user_id = $1
              AND reset_token = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(token)
        .bind(new_hash.as_phc_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }
}

// ============================================================================
// Role Repository Implementation
// ============================================================================

impl RoleRepository for PgIdentityRepository {
    async fn find_by_name(&self, name: RoleName) -> IdentityResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            "SELECT role_id, name FROM roles WHERE name = $1",
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_role()).transpose()
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    email: String,
    #[allow(dead_code)]
    email_canonical: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    email_verified: bool,
    verification_code: Option<String>,
    verification_code_expires_at: Option<DateTime<Utc>>,
    reset_token: Option<String>,
    reset_token_expires_at: Option<DateTime<Utc>>,
    roles: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> IdentityResult<User> {
        let password_hash = HashedPassword::from_phc_string(self.password_hash)
            .map_err(|e| IdentityError::Internal(format!("Invalid stored hash: {}", e)))?;

        let roles = self
            .roles
            .iter()
            .map(|name| {
                RoleName::parse(name)
                    .ok_or_else(|| IdentityError::Internal(format!("Unknown role: {}", name)))
            })
            .collect::<IdentityResult<Vec<_>>>()?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            email: Email::from_db(self.email),
            password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            email_verified: self.email_verified,
            verification_code: self.verification_code,
            verification_code_expires_at: self.verification_code_expires_at,
            reset_token: self.reset_token,
            reset_token_expires_at: self.reset_token_expires_at,
            roles,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RoleRow {
    role_id: Uuid,
    name: String,
}

impl RoleRow {
    fn into_role(self) -> IdentityResult<Role> {
        let name = RoleName::parse(&self.name)
            .ok_or_else(|| IdentityError::Internal(format!("Unknown role: {}", self.name)))?;

        Ok(Role {
            role_id: RoleId::from_uuid(self.role_id),
            name,
        })
    }
}
