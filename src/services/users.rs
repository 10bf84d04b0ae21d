use std::sync::Arc;

use sea_orm::{EntityTrait, QueryOrder};
use tracing::instrument;

use crate::db::DbPool;
use crate::entities::user;
use crate::errors::ServiceError;

/// Admin user management. Account creation lives in the auth service.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DbPool>,
}

impl UserService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<user::Model>, ServiceError> {
        Ok(user::Entity::find()
            .order_by_asc(user::Column::UserId)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: i64) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User with id {user_id} not found")))
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: i64) -> Result<(), ServiceError> {
        let result = user::Entity::delete_by_id(user_id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "User with id {user_id} not found"
            )));
        }
        Ok(())
    }
}
