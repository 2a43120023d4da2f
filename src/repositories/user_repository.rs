use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::user::{
    ActiveModel as UserActiveModel, Column, Entity as User, Model as UserModel, UserRole,
};

use super::UserStore;

/// Repository for user accounts
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create_user(
        &self,
        email: String,
        password_hash: String,
        role: UserRole,
    ) -> Result<UserModel, DbErr> {
        UserActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(password_hash),
            role: Set(role),
            created_at: Set(Utc::now()),
        }
        .insert(self.db.as_ref())
        .await
    }

    async fn find_by_email(&self, email: String) -> Result<Option<UserModel>, DbErr> {
        User::find()
            .filter(Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
    }
}
