//! User administration endpoints, plus /api/me for the signed-in user.

use crate::approval::{query, Pagination};
use crate::db::get_db_pool;
use crate::error::Error;
use crate::middleware::ClientCtx;
use crate::orm::users::{self, Role};
use crate::orm::{documents, events, posts};
use crate::session;
use crate::user::Profile;
use crate::web::ListResponse;
use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::Utc;
use sea_orm::{entity::*, query::*, ActiveValue::Set, ColumnTrait, Condition, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_me)
        .service(list_users)
        .service(create_user)
        .service(update_user)
        .service(delete_user);
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MeResponse {
    user: Profile,
    unread_notifications: i64,
}

#[get("/api/me")]
async fn view_me(client: ClientCtx) -> Result<HttpResponse, Error> {
    let user = client
        .get_user()
        .cloned()
        .ok_or(Error::Unauthorized("login required"))?;

    Ok(HttpResponse::Ok().json(MeResponse {
        user,
        unread_notifications: client.get_unread_notifications(),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserResponse {
    id: i32,
    name: String,
    email: String,
    role: Role,
    department_id: Option<i32>,
    created_at: chrono::NaiveDateTime,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            department_id: user.department_id,
            created_at: user.created_at,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct UserFilters {
    search: Option<String>,
    role: Option<Role>,
    department_id: Option<i32>,
    page: Option<u64>,
    limit: Option<u64>,
}

#[get("/api/users")]
async fn list_users(
    client: ClientCtx,
    filters: web::Query<UserFilters>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    if !caller.is_admin() {
        return Err(Error::Forbidden("only admins may manage users"));
    }

    let mut condition = Condition::all();
    if let Some(role) = filters.role {
        condition = condition.add(users::Column::Role.eq(role));
    }
    if let Some(department) = filters.department_id {
        condition = condition.add(users::Column::DepartmentId.eq(department));
    }
    if let Some(term) = filters.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(query::contains_ci(users::Column::Name, term))
                .add(query::contains_ci(users::Column::Email, term)),
        );
    }

    let db = get_db_pool();
    let page = filters.page.filter(|p| *p >= 1).unwrap_or(1);
    let limit = filters
        .limit
        .filter(|l| *l >= 1)
        .unwrap_or(query::DEFAULT_PAGE_SIZE)
        .min(query::MAX_PAGE_SIZE);

    let total = users::Entity::find()
        .filter(condition.clone())
        .count(db)
        .await?;
    let items = users::Entity::find()
        .filter(condition)
        .order_by_asc(users::Column::Name)
        .offset(Pagination::skip(page, limit))
        .limit(limit)
        .all(db)
        .await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        items: items
            .into_iter()
            .map(UserResponse::from)
            .collect::<Vec<_>>(),
        pagination: Pagination::new(total, page, limit),
    }))
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct UserForm {
    #[validate(length(min = 1, message = "name must not be empty"))]
    name: String,
    #[validate(email(message = "invalid email address"))]
    email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    password: String,
    role: Role,
    department_id: Option<i32>,
}

#[post("/api/users")]
async fn create_user(client: ClientCtx, form: web::Json<UserForm>) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    if !caller.is_admin() {
        return Err(Error::Forbidden("only admins may manage users"));
    }
    form.validate()
        .map_err(|err| Error::Validation(err.to_string()))?;

    let db = get_db_pool();
    let email = form.email.trim().to_lowercase();
    let existing = users::Entity::find()
        .filter(users::Column::Email.eq(email.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::Conflict("email address already in use".into()));
    }

    let password = session::hash_password(&form.password).map_err(|err| {
        log::error!("password hashing failed: {}", err);
        Error::Validation("password could not be processed".into())
    })?;

    let now = Utc::now().naive_utc();
    let user = users::ActiveModel {
        name: Set(form.name.trim().to_string()),
        email: Set(email),
        password: Set(password),
        role: Set(form.role),
        department_id: Set(form.department_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserUpdateForm {
    name: Option<String>,
    role: Option<Role>,
    department_id: Option<i32>,
    password: Option<String>,
}

#[patch("/api/users/{id}")]
async fn update_user(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<UserUpdateForm>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    if !caller.is_admin() {
        return Err(Error::Forbidden("only admins may manage users"));
    }

    let db = get_db_pool();
    let user = users::Entity::find_by_id(path.into_inner())
        .one(db)
        .await?
        .ok_or(Error::NotFound("user not found"))?;

    let mut active: users::ActiveModel = user.into();
    if let Some(ref name) = form.name {
        if name.trim().is_empty() {
            return Err(Error::Validation("name must not be empty".into()));
        }
        active.name = Set(name.trim().to_string());
    }
    if let Some(role) = form.role {
        active.role = Set(role);
    }
    if let Some(department_id) = form.department_id {
        active.department_id = Set(Some(department_id));
    }
    if let Some(ref password) = form.password {
        if password.len() < 8 {
            return Err(Error::Validation(
                "password must be at least 8 characters".into(),
            ));
        }
        let hash = session::hash_password(password).map_err(|err| {
            log::error!("password hashing failed: {}", err);
            Error::Validation("password could not be processed".into())
        })?;
        active.password = Set(hash);
    }
    active.updated_at = Set(Utc::now().naive_utc());

    let user = active.update(db).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

#[delete("/api/users/{id}")]
async fn delete_user(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    if !caller.is_admin() {
        return Err(Error::Forbidden("only admins may manage users"));
    }

    let user_id = path.into_inner();
    if user_id == caller.id {
        return Err(Error::Conflict("you cannot delete your own account".into()));
    }

    let db = get_db_pool();
    let user = users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("user not found"))?;

    // Authored content keeps its attribution; the account cannot go
    // while it still owns records.
    let authored = posts::Entity::find()
        .filter(posts::Column::AuthorId.eq(user.id))
        .count(db)
        .await?
        + documents::Entity::find()
            .filter(documents::Column::UploadedById.eq(user.id))
            .count(db)
            .await?
        + events::Entity::find()
            .filter(events::Column::CreatedById.eq(user.id))
            .count(db)
            .await?;
    if authored > 0 {
        return Err(Error::Conflict(
            "user still owns content; delete or reassign it first".into(),
        ));
    }

    users::Entity::delete_by_id(user.id).exec(db).await?;

    Ok(HttpResponse::NoContent().finish())
}
