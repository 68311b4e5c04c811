use std::time::Duration;

use axum::async_trait;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use tracing::{error, info};

pub use crate::users::repo_types::{NewUser, StoreError, User};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact, case-sensitive match.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Fails with `DuplicateUsername` when the name is taken.
    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Connects eagerly so an unreachable database shows up in the startup log.
    /// On failure the pool is rebuilt lazily and the process keeps serving;
    /// store-backed routes fail until the database comes back.
    ///
    /// Without a URL the pool is lazy over libpq defaults (`PGHOST`, `PGUSER`, ...).
    pub async fn connect(url: Option<&str>, acquire_timeout: Duration) -> anyhow::Result<Self> {
        let options = || {
            PgPoolOptions::new()
                .max_connections(10)
                .acquire_timeout(acquire_timeout)
        };

        let Some(url) = url else {
            error!("DATABASE_URL is not set; continuing with lazy pool");
            let db = options().connect_lazy_with(PgConnectOptions::new());
            return Ok(Self { db });
        };

        let db = match options().connect(url).await {
            Ok(pool) => {
                info!("database connected");
                pool
            }
            Err(e) => {
                error!(error = %e, "database connection failed; continuing with lazy pool");
                options().connect_lazy(url)?
            }
        };
        Ok(Self { db })
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, profession, company, address_line1,
                   country, state, city, plan, newsletter, profile_image, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        new_user.validate()?;
        let username = new_user.username.clone();
        let row = new_user.into_user();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, profession, company,
                               address_line1, country, state, city, plan, newsletter,
                               profile_image, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id, username, email, password_hash, profession, company, address_line1,
                      country, state, city, plan, newsletter, profile_image, created_at
            "#,
        )
        .bind(row.id)
        .bind(&row.username)
        .bind(&row.email)
        .bind(&row.password_hash)
        .bind(&row.profession)
        .bind(&row.company)
        .bind(&row.address_line1)
        .bind(&row.country)
        .bind(&row.state)
        .bind(&row.city)
        .bind(&row.plan)
        .bind(row.newsletter)
        .bind(&row.profile_image)
        .bind(row.created_at)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, username))?;
        Ok(user)
    }
}

fn map_unique_violation(e: sqlx::Error, username: String) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateUsername(username);
        }
    }
    StoreError::Database(e)
}
