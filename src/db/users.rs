//! Database operations for the user directory.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::user::{self, ActiveModel, Entity as User};
use crate::error::{AppError, AppResult};

use super::DbPool;

impl DbPool {
    /// Insert a new user.
    pub async fn insert_user(
        &self,
        username: &str,
        display_name: Option<String>,
    ) -> AppResult<user::Model> {
        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            username: Set(username.to_string()),
            display_name: Set(display_name),
            created_at: Set(Utc::now()),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert user: {}", e)))?;

        Ok(result)
    }

    /// Find a user by exact username.
    pub async fn find_user_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        let result = User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to find user: {}", e)))?;

        Ok(result)
    }

    /// List all users ordered by username.
    pub async fn list_users(&self) -> AppResult<Vec<user::Model>> {
        let result = User::find()
            .order_by_asc(user::Column::Username)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list users: {}", e)))?;

        Ok(result)
    }
}
