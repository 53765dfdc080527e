//! Document listing, publishing and review endpoints.
//!
//! Documents share the posts' review lifecycle; only the payload shape
//! differs (a description and a stored-file reference instead of body
//! text and tags).

use crate::approval::{self, ContentFilters, ContentStatus, Pagination, ReviewStamp};
use crate::db::get_db_pool;
use crate::error::Error;
use crate::middleware::ClientCtx;
use crate::notifications::{self, NotificationType};
use crate::orm::{documents, review_comments};
use crate::web::ListResponse;
use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::Utc;
use sea_orm::{entity::*, query::*, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_documents)
        .service(create_document)
        .service(view_document)
        .service(update_document)
        .service(delete_document)
        .service(review_document)
        .service(resubmit_document)
        .service(list_document_comments)
        .service(create_document_comment);
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentResponse {
    id: i32,
    title: String,
    description: String,
    file_url: Option<String>,
    uploaded_by_id: i32,
    department_id: Option<i32>,
    is_public: bool,
    status: ContentStatus,
    reviewed_by_id: Option<i32>,
    reviewed_at: Option<chrono::NaiveDateTime>,
    created_at: chrono::NaiveDateTime,
    updated_at: chrono::NaiveDateTime,
}

impl From<documents::Model> for DocumentResponse {
    fn from(document: documents::Model) -> Self {
        Self {
            id: document.id,
            title: document.title,
            description: document.description,
            file_url: document.file_url,
            uploaded_by_id: document.uploaded_by_id,
            department_id: document.department_id,
            is_public: document.is_public,
            status: document.status,
            reviewed_by_id: document.reviewed_by_id,
            reviewed_at: document.reviewed_at,
            created_at: document.created_at,
            updated_at: document.updated_at,
        }
    }
}

async fn find_document(id: i32) -> Result<documents::Model, Error> {
    documents::Entity::find_by_id(id)
        .one(get_db_pool())
        .await?
        .ok_or(Error::NotFound("document not found"))
}

#[get("/api/documents")]
async fn list_documents(
    client: ClientCtx,
    query: web::Query<ContentFilters>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    let filters = query.into_inner();
    let condition = filters.condition::<documents::Entity>(&caller)?;

    let db = get_db_pool();
    let page = filters.page();
    let limit = filters.limit();

    let total = documents::Entity::find()
        .filter(condition.clone())
        .count(db)
        .await?;
    let items = documents::Entity::find()
        .filter(condition)
        .order_by_desc(documents::Column::UpdatedAt)
        .offset(Pagination::skip(page, limit))
        .limit(limit)
        .all(db)
        .await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        items: items
            .into_iter()
            .map(DocumentResponse::from)
            .collect::<Vec<_>>(),
        pagination: Pagination::new(total, page, limit),
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentForm {
    title: String,
    description: String,
    file_url: Option<String>,
    #[serde(default)]
    is_public: bool,
    department_id: Option<i32>,
}

#[post("/api/documents")]
async fn create_document(
    client: ClientCtx,
    form: web::Json<DocumentForm>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    approval::validate_content(&form.title, &form.description)?;
    let department_id = approval::resolve_create_department(&caller, form.department_id)?;

    let now = Utc::now().naive_utc();
    let stamp = ReviewStamp::on_create(&caller, now);
    let document = documents::ActiveModel {
        title: Set(form.title.trim().to_string()),
        description: Set(form.description.clone()),
        file_url: Set(form.file_url.clone()),
        uploaded_by_id: Set(caller.id),
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

    if document.status == ContentStatus::Pending {
        if let Err(err) = notifications::notify_admins(
            NotificationType::ContentSubmitted,
            "New document awaiting review",
            &format!("\"{}\" was submitted for review.", document.title),
            Some(format!("/documents/{}", document.id)),
            "document",
            document.id,
        )
        .await
        {
            log::warn!(
                "failed to notify reviewers about document {}: {}",
                document.id,
                err
            );
        }
    }

    Ok(HttpResponse::Created().json(DocumentResponse::from(document)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewQuery {
    department_access: Option<i32>,
}

#[get("/api/documents/{id}")]
async fn view_document(
    client: ClientCtx,
    path: web::Path<i32>,
    query: web::Query<ViewQuery>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    let document = find_document(path.into_inner()).await?;
    let access = approval::resolve_department_access(&caller, query.department_access)?;
    approval::require_view(&caller, &document, access)?;

    Ok(HttpResponse::Ok().json(DocumentResponse::from(document)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentUpdateForm {
    title: Option<String>,
    description: Option<String>,
    file_url: Option<String>,
    is_public: Option<bool>,
}

#[patch("/api/documents/{id}")]
async fn update_document(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<DocumentUpdateForm>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    let document = find_document(path.into_inner()).await?;
    approval::require_modify(&caller, &document)?;

    let title = form.title.clone().unwrap_or_else(|| document.title.clone());
    let description = form
        .description
        .clone()
        .unwrap_or_else(|| document.description.clone());
    approval::validate_content(&title, &description)?;

    let mut active: documents::ActiveModel = document.into();
    active.title = Set(title.trim().to_string());
    active.description = Set(description);
    if let Some(ref file_url) = form.file_url {
        active.file_url = Set(Some(file_url.clone()));
    }
    if let Some(is_public) = form.is_public {
        active.is_public = Set(is_public);
    }
    active.updated_at = Set(Utc::now().naive_utc());

    let document = active.update(get_db_pool()).await?;
    Ok(HttpResponse::Ok().json(DocumentResponse::from(document)))
}

#[delete("/api/documents/{id}")]
async fn delete_document(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    let document = find_document(path.into_inner()).await?;
    approval::require_modify(&caller, &document)?;

    let db = get_db_pool();

    review_comments::Entity::delete_many()
        .filter(review_comments::Column::DocumentId.eq(document.id))
        .exec(db)
        .await?;
    documents::Entity::delete_by_id(document.id).exec(db).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[derive(Deserialize)]
struct ReviewForm {
    approve: bool,
    comment: Option<String>,
}

#[post("/api/documents/{id}/review")]
async fn review_document(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<ReviewForm>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    approval::require_reviewer(&caller)?;
    let document = find_document(path.into_inner()).await?;
    let uploader_id = document.uploaded_by_id;

    let now = Utc::now().naive_utc();
    let stamp = ReviewStamp::on_decision(form.approve, caller.id, now);
    let mut active: documents::ActiveModel = document.into();
    active.status = Set(stamp.status);
    active.reviewed_by_id = Set(stamp.reviewed_by_id);
    active.reviewed_at = Set(stamp.reviewed_at);
    active.updated_at = Set(now);
    let document = active.update(get_db_pool()).await?;

    if let Some(comment) = form.comment.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        review_comments::ActiveModel {
            content: Set(comment.to_string()),
            user_id: Set(caller.id),
            post_id: Set(None),
            document_id: Set(Some(document.id)),
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
        uploader_id,
        kind,
        &format!("Your document was {}", verdict),
        &format!("\"{}\" was {} by a reviewer.", document.title, verdict),
        Some(format!("/documents/{}", document.id)),
        Some("document"),
        Some(document.id),
    )
    .await
    {
        log::warn!(
            "failed to notify uploader of document {}: {}",
            document.id,
            err
        );
    }

    Ok(HttpResponse::Ok().json(DocumentResponse::from(document)))
}

#[post("/api/documents/{id}/resubmit")]
async fn resubmit_document(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    let document = find_document(path.into_inner()).await?;
    approval::require_resubmit(&caller, &document)?;

    let previous_reviewer = document.reviewed_by_id;
    let mut active: documents::ActiveModel = document.into();
    active.status = Set(ContentStatus::Pending);
    active.updated_at = Set(Utc::now().naive_utc());
    let document = active.update(get_db_pool()).await?;

    if let Some(reviewer_id) = previous_reviewer {
        if let Err(err) = notifications::create_notification(
            reviewer_id,
            NotificationType::ContentResubmitted,
            "Document resubmitted for review",
            &format!("\"{}\" was resubmitted for review.", document.title),
            Some(format!("/documents/{}", document.id)),
            Some("document"),
            Some(document.id),
        )
        .await
        {
            log::warn!(
                "failed to notify reviewer of document {}: {}",
                document.id,
                err
            );
        }
    }

    Ok(HttpResponse::Ok().json(DocumentResponse::from(document)))
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

#[get("/api/documents/{id}/comments")]
async fn list_document_comments(
    client: ClientCtx,
    path: web::Path<i32>,
    query: web::Query<ViewQuery>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    let document = find_document(path.into_inner()).await?;
    let access = approval::resolve_department_access(&caller, query.department_access)?;
    approval::require_view(&caller, &document, access)?;

    let comments = review_comments::Entity::find()
        .filter(review_comments::Column::DocumentId.eq(document.id))
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

#[post("/api/documents/{id}/comments")]
async fn create_document_comment(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<CommentForm>,
) -> Result<HttpResponse, Error> {
    let caller = client.caller()?;
    let document = find_document(path.into_inner()).await?;

    if !caller.is_admin() && document.uploaded_by_id != caller.id {
        return Err(Error::Forbidden(
            "only reviewers and the uploader may comment on a review",
        ));
    }

    let content = form.content.trim();
    if content.is_empty() {
        return Err(Error::Validation("comment must not be empty".into()));
    }

    let comment = review_comments::ActiveModel {
        content: Set(content.to_string()),
        user_id: Set(caller.id),
        post_id: Set(None),
        document_id: Set(Some(document.id)),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(get_db_pool())
    .await?;

    Ok(HttpResponse::Created().json(CommentResponse::from(comment)))
}
