//! In-app notifications for the review workflow.

pub mod types;

use crate::db::get_db_pool;
use crate::orm::notifications;
use crate::orm::users::{self, Role};
use chrono::Utc;
use sea_orm::{entity::*, query::*, sea_query::Expr, ColumnTrait, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set};

pub use types::NotificationType;

/// Create a notification for a user.
#[allow(clippy::too_many_arguments)]
pub async fn create_notification(
    user_id: i32,
    kind: NotificationType,
    title: &str,
    message: &str,
    url: Option<String>,
    source_content_type: Option<&str>,
    source_content_id: Option<i32>,
) -> Result<i32, DbErr> {
    let db = get_db_pool();

    let notification = notifications::ActiveModel {
        user_id: Set(user_id),
        kind: Set(kind.as_str().to_string()),
        title: Set(title.to_string()),
        message: Set(message.to_string()),
        url: Set(url),
        source_content_type: Set(source_content_type.map(str::to_string)),
        source_content_id: Set(source_content_id),
        is_read: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        read_at: Set(None),
        ..Default::default()
    };

    let result = notification.insert(db).await?;
    Ok(result.id)
}

/// Fan a notification out to every admin. Used when content enters the
/// review queue.
pub async fn notify_admins(
    kind: NotificationType,
    title: &str,
    message: &str,
    url: Option<String>,
    source_content_type: &str,
    source_content_id: i32,
) -> Result<(), DbErr> {
    let db = get_db_pool();

    let admins = users::Entity::find()
        .filter(users::Column::Role.eq(Role::Admin))
        .all(db)
        .await?;

    for admin in admins {
        create_notification(
            admin.id,
            kind,
            title,
            message,
            url.clone(),
            Some(source_content_type),
            Some(source_content_id),
        )
        .await?;
    }

    Ok(())
}

/// Count unread notifications for a user
pub async fn count_unread_notifications(user_id: i32) -> Result<i64, DbErr> {
    let db = get_db_pool();

    let count = notifications::Entity::find()
        .filter(notifications::Column::UserId.eq(user_id))
        .filter(notifications::Column::IsRead.eq(false))
        .count(db)
        .await?;

    Ok(count as i64)
}

/// Mark a notification as read. Scoped to the owning user so nobody can
/// clear another user's notifications.
pub async fn mark_notification_read(notification_id: i32, user_id: i32) -> Result<(), DbErr> {
    let db = get_db_pool();

    notifications::Entity::update_many()
        .col_expr(notifications::Column::IsRead, Expr::value(true))
        .col_expr(
            notifications::Column::ReadAt,
            Expr::value(Utc::now().naive_utc()),
        )
        .filter(notifications::Column::Id.eq(notification_id))
        .filter(notifications::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    Ok(())
}

/// Mark all notifications as read for a user
pub async fn mark_all_read(user_id: i32) -> Result<(), DbErr> {
    let db = get_db_pool();

    notifications::Entity::update_many()
        .col_expr(notifications::Column::IsRead, Expr::value(true))
        .col_expr(
            notifications::Column::ReadAt,
            Expr::value(Utc::now().naive_utc()),
        )
        .filter(notifications::Column::UserId.eq(user_id))
        .filter(notifications::Column::IsRead.eq(false))
        .exec(db)
        .await?;

    Ok(())
}

/// Fetch recent notifications for a user
pub async fn get_user_notifications(
    user_id: i32,
    limit: u64,
    show_read: bool,
) -> Result<Vec<notifications::Model>, DbErr> {
    let db = get_db_pool();

    let mut query = notifications::Entity::find()
        .filter(notifications::Column::UserId.eq(user_id))
        .order_by_desc(notifications::Column::CreatedAt)
        .limit(limit);

    if !show_read {
        query = query.filter(notifications::Column::IsRead.eq(false));
    }

    query.all(db).await
}
