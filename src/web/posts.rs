//! Post listing, authoring and review endpoints

use crate::approval::{self, ContentFilters, ContentStatus, Pagination, ReviewStamp};
use crate::db::get_db_pool;
use crate::error::Error;
use crate::middleware::ClientCtx;
use crate::notifications::{self, NotificationType};
use crate::orm::{posts, review_comments};
use crate::web::ListResponse;
use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::Utc;
use sea_orm::{entity::*, query::*, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_posts)
        .service(create_post)
        .service(view_post)
        .service(update_post)
        .service(delete_post)
        .service(review_post)
        .service(resubmit_post)
        .service(list_post_comments)
        .service(create_post_comment);
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PostResponse {
    id: i32,
    title: String,
    content: String,
    tags: Vec<String>,
    author_id: i32,
    department_id: Option<i32>,
    is_public: bool,
    status: ContentStatus,
    reviewed_by_id: Option<i32>,
    reviewed_at: Option<chrono::NaiveDateTime>,
    created_at: chrono::NaiveDateTime,
    updated_at: chrono::NaiveDateTime,
}

impl From<posts::Model> for PostResponse {
    fn from(post: posts::Model) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            tags: serde_json::from_value(post.tags).unwrap_or_default(),
            author_id: post.author_id,
            department_id: post.department_id,
            is_public: post.is_public,
            status: post.status,
            reviewed_by_id: post.reviewed_by_id,
            reviewed_at: post.reviewed_at,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

async fn find_post(id: i32) -> Result<posts::Model, Error> {
    posts::Entity::find_by_id(id)
        .one(get_db_pool())
        .await?
        .ok_or(Error::NotFound("post not found"))
}

#[get("/api/posts")]
async fn list_posts(
    client: ClientCtx,
    query: web::Query<ContentFilters>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    let filters = query.into_inner();
    let condition = filters.condition::<posts::Entity>(&caller)?;

    let db = get_db_pool();
    let page = filters.page();
    let limit = filters.limit();

    let total = posts::Entity::find()
        .filter(condition.clone())
        .count(db)
        .await?;
    let items = posts::Entity::find()
        .filter(condition)
        .order_by_desc(posts::Column::UpdatedAt)
        .offset(Pagination::skip(page, limit))
        .limit(limit)
        .all(db)
        .await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        items: items.into_iter().map(PostResponse::from).collect::<Vec<_>>(),
        pagination: Pagination::new(total, page, limit),
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostForm {
    title: String,
    content: String,
    #[serde(default)]
    is_public: bool,
    #[serde(default)]
    tags: Vec<String>,
    department_id: Option<i32>,
}

#[post("/api/posts")]
async fn create_post(client: ClientCtx, form: web::Json<PostForm>) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    approval::validate_content(&form.title, &form.content)?;
    let department_id = approval::resolve_create_department(&caller, form.department_id)?;

    let now = Utc::now().naive_utc();
    let stamp = ReviewStamp::on_create(&caller, now);
    let post = posts::ActiveModel {
        title: Set(form.title.trim().to_string()),
        content: Set(form.content.clone()),
        tags: Set(serde_json::json!(form.tags)),
        author_id: Set(caller.id),
        department_id: Set(department_id),
        is_public: Set(form.is_public),
        status: Set(stamp.status),
        reviewed_by_id: Set(stamp.reviewed_by_id),
        reviewed_at: Set(stamp.reviewed_at),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(get_db_pool())
    .await?;

    if post.status == ContentStatus::Pending {
        if let Err(err) = notifications::notify_admins(
            NotificationType::ContentSubmitted,
            "New post awaiting review",
            &format!("\"{}\" was submitted for review.", post.title),
            Some(format!("/posts/{}", post.id)),
            "post",
            post.id,
        )
        .await
        {
            log::warn!("failed to notify reviewers about post {}: {}", post.id, err);
        }
    }

    Ok(HttpResponse::Created().json(PostResponse::from(post)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewQuery {
    department_access: Option<i32>,
}

#[get("/api/posts/{id}")]
async fn view_post(
    client: ClientCtx,
    path: web::Path<i32>,
    query: web::Query<ViewQuery>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    let post = find_post(path.into_inner()).await?;
    let access = approval::resolve_department_access(&caller, query.department_access)?;
    approval::require_view(&caller, &post, access)?;

    Ok(HttpResponse::Ok().json(PostResponse::from(post)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostUpdateForm {
    title: Option<String>,
    content: Option<String>,
    is_public: Option<bool>,
    tags: Option<Vec<String>>,
}

#[patch("/api/posts/{id}")]
async fn update_post(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<PostUpdateForm>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    let post = find_post(path.into_inner()).await?;
    approval::require_modify(&caller, &post)?;

    let title = form.title.clone().unwrap_or_else(|| post.title.clone());
    let content = form.content.clone().unwrap_or_else(|| post.content.clone());
    approval::validate_content(&title, &content)?;

    let mut active: posts::ActiveModel = post.into();
    active.title = Set(title.trim().to_string());
    active.content = Set(content);
    if let Some(is_public) = form.is_public {
        active.is_public = Set(is_public);
    }
    if let Some(ref tags) = form.tags {
        active.tags = Set(serde_json::json!(tags));
    }
    active.updated_at = Set(Utc::now().naive_utc());

    let post = active.update(get_db_pool()).await?;
    Ok(HttpResponse::Ok().json(PostResponse::from(post)))
}

#[delete("/api/posts/{id}")]
async fn delete_post(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    let post = find_post(path.into_inner()).await?;
    approval::require_modify(&caller, &post)?;

    let db = get_db_pool();

    // Hard delete, review comments first.
    review_comments::Entity::delete_many()
        .filter(review_comments::Column::PostId.eq(post.id))
        .exec(db)
        .await?;
    posts::Entity::delete_by_id(post.id).exec(db).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[derive(Deserialize)]
struct ReviewForm {
    approve: bool,
    comment: Option<String>,
}

#[post("/api/posts/{id}/review")]
async fn review_post(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<ReviewForm>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    approval::require_reviewer(&caller)?;
    let post = find_post(path.into_inner()).await?;
    let author_id = post.author_id;

    let now = Utc::now().naive_utc();
    let stamp = ReviewStamp::on_decision(form.approve, caller.id, now);
    let mut active: posts::ActiveModel = post.into();
    active.status = Set(stamp.status);
    active.reviewed_by_id = Set(stamp.reviewed_by_id);
    active.reviewed_at = Set(stamp.reviewed_at);
    active.updated_at = Set(now);
    let post = active.update(get_db_pool()).await?;

    if let Some(comment) = form.comment.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        review_comments::ActiveModel {
            content: Set(comment.to_string()),
            user_id: Set(caller.id),
            post_id: Set(Some(post.id)),
            document_id: Set(None),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(get_db_pool())
        .await?;
    }

    let (kind, verdict) = if form.approve {
        (NotificationType::ContentApproved, "approved")
    } else {
        (NotificationType::ContentRejected, "rejected")
    };
    if let Err(err) = notifications::create_notification(
        author_id,
        kind,
        &format!("Your post was {}", verdict),
        &format!("\"{}\" was {} by a reviewer.", post.title, verdict),
        Some(format!("/posts/{}", post.id)),
        Some("post"),
        Some(post.id),
    )
    .await
    {
        log::warn!("failed to notify author of post {}: {}", post.id, err);
    }

    Ok(HttpResponse::Ok().json(PostResponse::from(post)))
}

#[post("/api/posts/{id}/resubmit")]
async fn resubmit_post(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    let post = find_post(path.into_inner()).await?;
    approval::require_resubmit(&caller, &post)?;

    // The previous reviewer and timestamp stay in place as history
    // until the next decision overwrites them.
    let previous_reviewer = post.reviewed_by_id;
    let mut active: posts::ActiveModel = post.into();
    active.status = Set(ContentStatus::Pending);
    active.updated_at = Set(Utc::now().naive_utc());
    let post = active.update(get_db_pool()).await?;

    if let Some(reviewer_id) = previous_reviewer {
        if let Err(err) = notifications::create_notification(
            reviewer_id,
            NotificationType::ContentResubmitted,
            "Post resubmitted for review",
            &format!("\"{}\" was resubmitted for review.", post.title),
            Some(format!("/posts/{}", post.id)),
            Some("post"),
            Some(post.id),
        )
        .await
        {
            log::warn!("failed to notify reviewer of post {}: {}", post.id, err);
        }
    }

    Ok(HttpResponse::Ok().json(PostResponse::from(post)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentResponse {
    id: i32,
    content: String,
    user_id: i32,
    created_at: chrono::NaiveDateTime,
}

impl From<review_comments::Model> for CommentResponse {
    fn from(comment: review_comments::Model) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            user_id: comment.user_id,
            created_at: comment.created_at,
        }
    }
}

#[get("/api/posts/{id}/comments")]
async fn list_post_comments(
    client: ClientCtx,
    path: web::Path<i32>,
    query: web::Query<ViewQuery>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    let post = find_post(path.into_inner()).await?;
    let access = approval::resolve_department_access(&caller, query.department_access)?;
    approval::require_view(&caller, &post, access)?;

    let comments = review_comments::Entity::find()
        .filter(review_comments::Column::PostId.eq(post.id))
        .order_by_asc(review_comments::Column::CreatedAt)
        .all(get_db_pool())
        .await?;

    Ok(HttpResponse::Ok().json(
        comments
            .into_iter()
            .map(CommentResponse::from)
            .collect::<Vec<_>>(),
    ))
}

#[derive(Deserialize)]
struct CommentForm {
    content: String,
}

#[post("/api/posts/{id}/comments")]
async fn create_post_comment(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<CommentForm>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    let post = find_post(path.into_inner()).await?;

    // Review comments are a conversation between the reviewers and the
    // author.
    if !caller.is_admin() && post.author_id != caller.id {
        return Err(Error::Forbidden(
            "only reviewers and the author may comment on a review",
        ));
    }

    let content = form.content.trim();
    if content.is_empty() {
        return Err(Error::Validation("comment must not be empty".into()));
    }

    let comment = review_comments::ActiveModel {
        content: Set(content.to_string()),
        user_id: Set(caller.id),
        post_id: Set(Some(post.id)),
        document_id: Set(None),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(get_db_pool())
    .await?;

    Ok(HttpResponse::Created().json(CommentResponse::from(comment)))
}
