//! Notification endpoints backing the header dropdown.

use crate::db::get_db_pool;
use crate::error::Error;
use crate::middleware::ClientCtx;
use crate::notifications;
use crate::orm::notifications as notification_orm;
use actix_web::{get, post, web, HttpResponse};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::{Deserialize, Serialize};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_notifications)
        .service(mark_read)
        .service(mark_all_read);
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NotificationResponse {
    id: i32,
    kind: String,
    title: String,
    message: String,
    url: Option<String>,
    is_read: bool,
    created_at: chrono::NaiveDateTime,
}

impl From<notification_orm::Model> for NotificationResponse {
    fn from(notification: notification_orm::Model) -> Self {
        Self {
            id: notification.id,
            kind: notification.kind,
            title: notification.title,
            message: notification.message,
            url: notification.url,
            is_read: notification.is_read,
            created_at: notification.created_at,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotificationQuery {
    show_read: Option<bool>,
    limit: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NotificationListResponse {
    items: Vec<NotificationResponse>,
    unread_count: i64,
}

#[get("/api/notifications")]
async fn list_notifications(
    client: ClientCtx,
    query: web::Query<NotificationQuery>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;

    let show_read = query.show_read.unwrap_or(false);
    let limit = query.limit.filter(|l| *l >= 1).unwrap_or(50).min(200);

    let items = notifications::get_user_notifications(caller.id, limit, show_read).await?;
    let unread_count = notifications::count_unread_notifications(caller.id).await?;

    Ok(HttpResponse::Ok().json(NotificationListResponse {
        items: items.into_iter().map(Into::into).collect(),
        unread_count,
    }))
}

#[post("/api/notifications/{id}/read")]
async fn mark_read(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    let notification_id = path.into_inner();

    // Only the owner's rows match; someone else's id is a no-op 404.
    let owned = notification_orm::Entity::find()
        .filter(notification_orm::Column::Id.eq(notification_id))
        .filter(notification_orm::Column::UserId.eq(caller.id))
        .count(get_db_pool())
        .await?;
    if owned == 0 {
        return Err(Error::NotFound("notification not found"));
    }

    notifications::mark_notification_read(notification_id, caller.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

#[post("/api/notifications/read-all")]
async fn mark_all_read(client: ClientCtx) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;

    notifications::mark_all_read(caller.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
