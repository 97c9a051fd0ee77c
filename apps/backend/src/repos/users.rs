use migration::changes::DEFAULT_ROLE;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::Serialize;
use time::OffsetDateTime;

use crate::entities::users;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,
    pub role: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            role: model
                .role
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub async fn create_user<C: ConnectionTrait>(
    conn: &C,
    username: &str,
    role: Option<&str>,
) -> Result<User, DbErr> {
    let now = OffsetDateTime::now_utc();
    let model = users::ActiveModel {
        username: Set(username.to_string()),
        role: Set(Some(role.unwrap_or(DEFAULT_ROLE).to_string())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(User::from(model))
}

pub async fn find_user_by_id<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<Option<User>, DbErr> {
    let model = users::Entity::find_by_id(user_id).one(conn).await?;
    Ok(model.map(User::from))
}

/// Exact, case-sensitive match.
pub async fn find_user_by_username<C: ConnectionTrait>(
    conn: &C,
    username: &str,
) -> Result<Option<User>, DbErr> {
    let model = users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(conn)
        .await?;
    Ok(model.map(User::from))
}

pub async fn list_users<C: ConnectionTrait>(conn: &C) -> Result<Vec<User>, DbErr> {
    let models = users::Entity::find()
        .order_by_asc(users::Column::Id)
        .all(conn)
        .await?;
    Ok(models.into_iter().map(User::from).collect())
}

/// Set the role and refresh `updatedAt`.
pub async fn set_role<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    role: &str,
    now: OffsetDateTime,
) -> Result<User, DbErr> {
    let model = users::ActiveModel {
        id: Set(user_id),
        role: Set(Some(role.to_string())),
        updated_at: Set(now),
        ..Default::default()
    }
    .update(conn)
    .await?;
    Ok(User::from(model))
}
