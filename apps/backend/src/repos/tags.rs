use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, QueryOrder, Set};

use crate::entities::tags;

pub use crate::entities::tags::Model as Tag;

pub async fn list_tags<C: ConnectionTrait>(conn: &C) -> Result<Vec<Tag>, DbErr> {
    tags::Entity::find()
        .order_by_asc(tags::Column::Id)
        .all(conn)
        .await
}

pub async fn create_tag<C: ConnectionTrait>(conn: &C, name: &str, color: &str) -> Result<Tag, DbErr> {
    tags::ActiveModel {
        name: Set(name.to_string()),
        color: Set(color.to_string()),
        ..Default::default()
    }
    .insert(conn)
    .await
}
