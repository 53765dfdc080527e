//! SeaORM Entity for documents table

use crate::approval::ContentStatus;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Where the stored file lives. The upload pipeline itself is an
    /// external collaborator; we only keep the reference.
    pub file_url: Option<String>,
    pub uploaded_by_id: i32,
    /// NULL means company-wide.
    pub department_id: Option<i32>,
    pub is_public: bool,
    pub status: ContentStatus,
    pub reviewed_by_id: Option<i32>,
    pub reviewed_at: Option<chrono::NaiveDateTime>,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UploadedById",
        to = "super::users::Column::Id"
    )]
    Uploader,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ReviewedById",
        to = "super::users::Column::Id"
    )]
    Reviewer,
    #[sea_orm(
        belongs_to = "super::departments::Entity",
        from = "Column::DepartmentId",
        to = "super::departments::Column::Id"
    )]
    Department,
    #[sea_orm(has_many = "super::review_comments::Entity")]
    ReviewComments,
}

impl ActiveModelBehavior for ActiveModel {}
