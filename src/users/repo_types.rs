use serde::Serialize;
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Stored user row. The password hash never leaves the process.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub profession: Option<String>,
    pub company: Option<String>,
    pub address_line1: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub plan: Option<String>,
    pub newsletter: Option<bool>,
    pub profile_image: String,
    pub created_at: OffsetDateTime,
}

/// Insert payload; `profile_image` is the stored upload name.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub profession: Option<String>,
    pub company: Option<String>,
    pub address_line1: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub plan: Option<String>,
    pub newsletter: Option<bool>,
    pub profile_image: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.username.is_empty() {
            return Err(StoreError::Validation("username is required".into()));
        }
        if self.email.is_empty() {
            return Err(StoreError::Validation("email is required".into()));
        }
        Ok(())
    }

    pub(crate) fn into_user(self) -> User {
        User {
            id: Uuid::new_v4(),
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            profession: self.profession,
            company: self.company,
            address_line1: self.address_line1,
            country: self.country,
            state: self.state,
            city: self.city,
            plan: self.plan,
            newsletter: self.newsletter,
            profile_image: self.profile_image,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username {0:?} is already taken")]
    DuplicateUsername(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
