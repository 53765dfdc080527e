//! Event calendar endpoints.
//!
//! Events carry no review status; they use the same create/view/manage
//! gating as content and list in calendar order.

use crate::approval::{self, query, Pagination};
use crate::db::get_db_pool;
use crate::error::Error;
use crate::middleware::ClientCtx;
use crate::orm::events;
use crate::orm::users::Role;
use crate::web::ListResponse;
use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::Utc;
use sea_orm::{entity::*, query::*, ActiveValue::Set, ColumnTrait, Condition, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_events)
        .service(create_event)
        .service(view_event)
        .service(update_event)
        .service(delete_event);
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventResponse {
    id: i32,
    title: String,
    description: String,
    location: Option<String>,
    starts_at: chrono::NaiveDateTime,
    ends_at: Option<chrono::NaiveDateTime>,
    created_by_id: i32,
    department_id: Option<i32>,
    is_public: bool,
    created_at: chrono::NaiveDateTime,
    updated_at: chrono::NaiveDateTime,
}

impl From<events::Model> for EventResponse {
    fn from(event: events::Model) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            location: event.location,
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            created_by_id: event.created_by_id,
            department_id: event.department_id,
            is_public: event.is_public,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

async fn find_event(id: i32) -> Result<events::Model, Error> {
    events::Entity::find_by_id(id)
        .one(get_db_pool())
        .await?
        .ok_or(Error::NotFound("event not found"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[derive(Default)]
struct EventFilters {
    search: Option<String>,
    department_id: Option<i32>,
    is_public: Option<bool>,
    upcoming: Option<bool>,
    page: Option<u64>,
    limit: Option<u64>,
}

#[get("/api/events")]
async fn list_events(
    client: ClientCtx,
    filters: web::Query<EventFilters>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;

    let mut condition = Condition::all();
    if let Some(department) = filters.department_id {
        condition = condition.add(events::Column::DepartmentId.eq(department));
    }
    match filters.is_public {
        Some(public) => condition = condition.add(events::Column::IsPublic.eq(public)),
        None => {
            // Same default visibility as content listings.
            condition = match caller.role {
                Role::Admin => condition,
                Role::DepartmentHead => {
                    let mut visible =
                        Condition::any().add(events::Column::IsPublic.eq(true));
                    if let Some(department) = caller.department_id {
                        visible = visible.add(events::Column::DepartmentId.eq(department));
                    }
                    condition.add(visible)
                }
                Role::Employee => condition.add(events::Column::IsPublic.eq(true)),
            };
        }
    }
    if let Some(term) = filters.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(query::contains_ci(events::Column::Title, term))
                .add(query::contains_ci(events::Column::Description, term)),
        );
    }
    if filters.upcoming.unwrap_or(false) {
        condition = condition.add(events::Column::StartsAt.gte(Utc::now().naive_utc()));
    }

    let db = get_db_pool();
    let page = filters.page.filter(|p| *p >= 1).unwrap_or(1);
    let limit = filters
        .limit
        .filter(|l| *l >= 1)
        .unwrap_or(query::DEFAULT_PAGE_SIZE)
        .min(query::MAX_PAGE_SIZE);

    let total = events::Entity::find()
        .filter(condition.clone())
        .count(db)
        .await?;
    let items = events::Entity::find()
        .filter(condition)
        .order_by_asc(events::Column::StartsAt)
        .offset(Pagination::skip(page, limit))
        .limit(limit)
        .all(db)
        .await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        items: items
            .into_iter()
            .map(EventResponse::from)
            .collect::<Vec<_>>(),
        pagination: Pagination::new(total, page, limit),
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventForm {
    title: String,
    description: String,
    location: Option<String>,
    starts_at: chrono::NaiveDateTime,
    ends_at: Option<chrono::NaiveDateTime>,
    #[serde(default)]
    is_public: bool,
    department_id: Option<i32>,
}

#[post("/api/events")]
async fn create_event(
    client: ClientCtx,
    form: web::Json<EventForm>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    approval::validate_content(&form.title, &form.description)?;
    let department_id = approval::resolve_create_department(&caller, form.department_id)?;

    if let Some(ends_at) = form.ends_at {
        if ends_at < form.starts_at {
            return Err(Error::Validation("event cannot end before it starts".into()));
        }
    }

    let now = Utc::now().naive_utc();
    let event = events::ActiveModel {
        title: Set(form.title.trim().to_string()),
        description: Set(form.description.clone()),
        location: Set(form.location.clone()),
        starts_at: Set(form.starts_at),
        ends_at: Set(form.ends_at),
        created_by_id: Set(caller.id),
        department_id: Set(department_id),
        is_public: Set(form.is_public),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(get_db_pool())
    .await?;

    Ok(HttpResponse::Created().json(EventResponse::from(event)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewQuery {
    department_access: Option<i32>,
}

#[get("/api/events/{id}")]
async fn view_event(
    client: ClientCtx,
    path: web::Path<i32>,
    query: web::Query<ViewQuery>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    let event = find_event(path.into_inner()).await?;
    let access = approval::resolve_department_access(&caller, query.department_access)?;
    approval::require_view(&caller, &event, access)?;

    Ok(HttpResponse::Ok().json(EventResponse::from(event)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventUpdateForm {
    title: Option<String>,
    description: Option<String>,
    location: Option<String>,
    starts_at: Option<chrono::NaiveDateTime>,
    ends_at: Option<chrono::NaiveDateTime>,
    is_public: Option<bool>,
}

#[patch("/api/events/{id}")]
async fn update_event(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<EventUpdateForm>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    let event = find_event(path.into_inner()).await?;
    approval::require_modify(&caller, &event)?;

    let title = form.title.clone().unwrap_or_else(|| event.title.clone());
    let description = form
        .description
        .clone()
        .unwrap_or_else(|| event.description.clone());
    approval::validate_content(&title, &description)?;

    let starts_at = form.starts_at.unwrap_or(event.starts_at);
    let ends_at = form.ends_at.or(event.ends_at);
    if let Some(ends_at) = ends_at {
        if ends_at < starts_at {
            return Err(Error::Validation("event cannot end before it starts".into()));
        }
    }

    let mut active: events::ActiveModel = event.into();
    active.title = Set(title.trim().to_string());
    active.description = Set(description);
    if let Some(ref location) = form.location {
        active.location = Set(Some(location.clone()));
    }
    active.starts_at = Set(starts_at);
    active.ends_at = Set(ends_at);
    if let Some(is_public) = form.is_public {
        active.is_public = Set(is_public);
    }
    active.updated_at = Set(Utc::now().naive_utc());

    let event = active.update(get_db_pool()).await?;
    Ok(HttpResponse::Ok().json(EventResponse::from(event)))
}

#[delete("/api/events/{id}")]
async fn delete_event(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    let event = find_event(path.into_inner()).await?;
    approval::require_modify(&caller, &event)?;

    events::Entity::delete_by_id(event.id)
        .exec(get_db_pool())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
