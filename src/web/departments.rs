//! Department management endpoints. Listing is open to any signed-in
//! user (the create forms need it); mutation is admin-only.

use crate::db::get_db_pool;
use crate::error::Error;
use crate::middleware::ClientCtx;
use crate::orm::{departments, documents, events, posts, users};
use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::Utc;
use sea_orm::{entity::*, query::*, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_departments)
        .service(create_department)
        .service(update_department)
        .service(delete_department);
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DepartmentResponse {
    id: i32,
    name: String,
    description: Option<String>,
    created_at: chrono::NaiveDateTime,
    updated_at: chrono::NaiveDateTime,
}

impl From<departments::Model> for DepartmentResponse {
    fn from(department: departments::Model) -> Self {
        Self {
            id: department.id,
            name: department.name,
            description: department.description,
            created_at: department.created_at,
            updated_at: department.updated_at,
        }
    }
}

#[get("/api/departments")]
async fn list_departments(client: ClientCtx) -> Result<HttpResponse, Error> {
    client.caller()?;

    let departments = departments::Entity::find()
        .order_by_asc(departments::Column::Name)
        .all(get_db_pool())
        .await?;

    Ok(HttpResponse::Ok().json(
        departments
            .into_iter()
            .map(DepartmentResponse::from)
            .collect::<Vec<_>>(),
    ))
}

#[derive(Deserialize)]
struct DepartmentForm {
    name: String,
    description: Option<String>,
}

#[post("/api/departments")]
async fn create_department(
    client: ClientCtx,
    form: web::Json<DepartmentForm>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    if !caller.is_admin() {
        return Err(Error::Forbidden("only admins may manage departments"));
    }

    let name = form.name.trim();
    if name.is_empty() {
        return Err(Error::Validation("department name must not be empty".into()));
    }

    let db = get_db_pool();
    let existing = departments::Entity::find()
        .filter(departments::Column::Name.eq(name))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::Conflict(format!(
            "a department named \"{}\" already exists",
            name
        )));
    }

    let now = Utc::now().naive_utc();
    let department = departments::ActiveModel {
        name: Set(name.to_string()),
        description: Set(form.description.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(HttpResponse::Created().json(DepartmentResponse::from(department)))
}

#[derive(Deserialize)]
struct DepartmentUpdateForm {
    name: Option<String>,
    description: Option<String>,
}

#[patch("/api/departments/{id}")]
async fn update_department(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<DepartmentUpdateForm>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    if !caller.is_admin() {
        return Err(Error::Forbidden("only admins may manage departments"));
    }

    let db = get_db_pool();
    let department = departments::Entity::find_by_id(path.into_inner())
        .one(db)
        .await?
        .ok_or(Error::NotFound("department not found"))?;

    let mut active: departments::ActiveModel = department.clone().into();
    if let Some(ref name) = form.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("department name must not be empty".into()));
        }
        if name != department.name {
            let taken = departments::Entity::find()
                .filter(departments::Column::Name.eq(name))
                .one(db)
                .await?;
            if taken.is_some() {
                return Err(Error::Conflict(format!(
                    "a department named \"{}\" already exists",
                    name
                )));
            }
            active.name = Set(name.to_string());
        }
    }
    if let Some(ref description) = form.description {
        active.description = Set(Some(description.clone()));
    }
    active.updated_at = Set(Utc::now().naive_utc());

    let department = active.update(db).await?;
    Ok(HttpResponse::Ok().json(DepartmentResponse::from(department)))
}

#[delete("/api/departments/{id}")]
async fn delete_department(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    if !caller.is_admin() {
        return Err(Error::Forbidden("only admins may manage departments"));
    }

    let db = get_db_pool();
    let department = departments::Entity::find_by_id(path.into_inner())
        .one(db)
        .await?
        .ok_or(Error::NotFound("department not found"))?;

    // Refuse while anything still points at the department; reassigning
    // members and content is a deliberate admin action, not a cascade.
    let members = users::Entity::find()
        .filter(users::Column::DepartmentId.eq(department.id))
        .count(db)
        .await?;
    if members > 0 {
        return Err(Error::Conflict(
            "department still has members; reassign them first".into(),
        ));
    }

    let posts_left = posts::Entity::find()
        .filter(posts::Column::DepartmentId.eq(department.id))
        .count(db)
        .await?;
    let documents_left = documents::Entity::find()
        .filter(documents::Column::DepartmentId.eq(department.id))
        .count(db)
        .await?;
    let events_left = events::Entity::find()
        .filter(events::Column::DepartmentId.eq(department.id))
        .count(db)
        .await?;
    if posts_left + documents_left + events_left > 0 {
        return Err(Error::Conflict(
            "department still has content; move or delete it first".into(),
        ));
    }

    departments::Entity::delete_by_id(department.id)
        .exec(db)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
