use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, instrument, warn};

use super::models::UserModel;
use crate::shared::AppError;

/// Trait for user repository operations
///
/// Every method is a single round trip to the store. Ids are assigned by the
/// store on creation.
#[async_trait]
pub trait UserRepository {
    async fn create_user(&self, username: &str, password: &str) -> Result<UserModel, AppError>;
    async fn list_users(&self) -> Result<Vec<UserModel>, AppError>;
    async fn get_user(&self, user_id: i32) -> Result<Option<UserModel>, AppError>;

    /// Returns the lowest-id row with this username, if any
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError>;

    /// Overwrites the fields that are `Some`, fails with `NotFound` for unknown ids
    async fn update_user(
        &self,
        user_id: i32,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<UserModel, AppError>;

    /// Hard delete, fails with `NotFound` for unknown ids
    async fn delete_user(&self, user_id: i32) -> Result<(), AppError>;
}

struct UserTable {
    /// Wider than the id column so that `i32::MAX` itself can be handed out
    next_id: i64,
    rows: BTreeMap<i32, UserModel>,
}

/// In-memory implementation of UserRepository for development and testing
///
/// Ids are handed out sequentially starting at 1 and never reused. Data is
/// lost when the process exits.
pub struct InMemoryUserRepository {
    table: Mutex<UserTable>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            table: Mutex::new(UserTable {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }

    /// Returns the current number of stored users
    pub fn user_count(&self) -> usize {
        self.table.lock().map(|t| t.rows.len()).unwrap_or(0)
    }

    fn table(&self) -> Result<MutexGuard<'_, UserTable>, AppError> {
        self.table.lock().map_err(|_| {
            warn!("User table mutex poisoned");
            AppError::Internal
        })
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, password))]
    async fn create_user(&self, username: &str, password: &str) -> Result<UserModel, AppError> {
        let mut table = self.table()?;

        let id = i32::try_from(table.next_id).map_err(|_| {
            warn!("In-memory user ids exhausted");
            AppError::Internal
        })?;
        let user = UserModel {
            id,
            username: username.to_string(),
            password: password.to_string(),
        };
        table.next_id += 1;
        table.rows.insert(user.id, user.clone());

        debug!(user_id = user.id, "User created in memory");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<UserModel>, AppError> {
        let table = self.table()?;
        Ok(table.rows.values().cloned().collect())
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: i32) -> Result<Option<UserModel>, AppError> {
        let table = self.table()?;
        let user = table.rows.get(&user_id).cloned();

        if user.is_none() {
            debug!(user_id, "User not found in memory");
        }
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        let table = self.table()?;
        Ok(table
            .rows
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    #[instrument(skip(self, password))]
    async fn update_user(
        &self,
        user_id: i32,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<UserModel, AppError> {
        let mut table = self.table()?;

        let user = table.rows.get_mut(&user_id).ok_or_else(|| {
            warn!(user_id, "User not found for update in memory");
            AppError::NotFound("User not found".to_string())
        })?;
        user.apply_changes(username, password);

        debug!(user_id, "User updated in memory");
        Ok(user.clone())
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: i32) -> Result<(), AppError> {
        let mut table = self.table()?;

        if table.rows.remove(&user_id).is_none() {
            warn!(user_id, "User not found for deletion in memory");
            return Err(AppError::NotFound("User not found".to_string()));
        }

        debug!(user_id, "User deleted from memory");
        Ok(())
    }
}

/// PostgreSQL implementation of user repository
///
/// Each call checks a connection out of the pool for the duration of one
/// statement; it goes back to the pool when the call returns.
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, password))]
    async fn create_user(&self, username: &str, password: &str) -> Result<UserModel, AppError> {
        debug!("Inserting user into database");

        let user = sqlx::query_as::<_, UserModel>(
            "INSERT INTO users (username, password) VALUES ($1, $2) RETURNING id, username, password",
        )
        .bind(username)
        .bind(password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to insert user");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(user_id = user.id, "User inserted into database");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<UserModel>, AppError> {
        sqlx::query_as::<_, UserModel>("SELECT id, username, password FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to list users");
                AppError::DatabaseError(e.to_string())
            })
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: i32) -> Result<Option<UserModel>, AppError> {
        sqlx::query_as::<_, UserModel>("SELECT id, username, password FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, user_id, "Failed to fetch user");
                AppError::DatabaseError(e.to_string())
            })
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        sqlx::query_as::<_, UserModel>(
            "SELECT id, username, password FROM users WHERE username = $1 ORDER BY id LIMIT 1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to look up user by username");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self, password))]
    async fn update_user(
        &self,
        user_id: i32,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<UserModel, AppError> {
        debug!(user_id, "Updating user in database");

        let updated = sqlx::query_as::<_, UserModel>(
            "UPDATE users SET username = COALESCE($2, username), password = COALESCE($3, password) \
             WHERE id = $1 RETURNING id, username, password",
        )
        .bind(user_id)
        .bind(username)
        .bind(password)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id, "Failed to update user");
            AppError::DatabaseError(e.to_string())
        })?;

        updated.ok_or_else(|| {
            warn!(user_id, "User not found for update");
            AppError::NotFound("User not found".to_string())
        })
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, user_id, "Failed to delete user");
                AppError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            warn!(user_id, "User not found for deletion");
            return Err(AppError::NotFound("User not found".to_string()));
        }

        debug!(user_id, "User deleted from database");
        Ok(())
    }
}
