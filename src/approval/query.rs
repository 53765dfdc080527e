//! Listing predicate construction.
//!
//! Every listing endpoint turns its query string into an immutable
//! [`Condition`] tree through [`ContentFilters::condition`]; the
//! handlers only attach ordering and pagination. Nothing here mutates a
//! shared query object, so the same filters always produce the same
//! predicate.

use super::{resolve_department_access, Caller, ContentStatus};
use crate::error::Error;
use crate::orm::users::{self, Role};
use sea_orm::sea_query::{ConditionExpression, Expr, Func, Query, SelectStatement, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, EntityTrait, IntoSimpleExpr};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Column hooks the predicate builder needs from a reviewable entity.
/// Posts and documents differ only in what their body and owner columns
/// are called.
pub trait ContentColumns: EntityTrait {
    fn title_col() -> Self::Column;
    fn body_col() -> Self::Column;
    fn author_col() -> Self::Column;
    fn department_col() -> Self::Column;
    fn public_col() -> Self::Column;
    fn status_col() -> Self::Column;
}

impl ContentColumns for crate::orm::posts::Entity {
    fn title_col() -> Self::Column {
        crate::orm::posts::Column::Title
    }
    fn body_col() -> Self::Column {
        crate::orm::posts::Column::Content
    }
    fn author_col() -> Self::Column {
        crate::orm::posts::Column::AuthorId
    }
    fn department_col() -> Self::Column {
        crate::orm::posts::Column::DepartmentId
    }
    fn public_col() -> Self::Column {
        crate::orm::posts::Column::IsPublic
    }
    fn status_col() -> Self::Column {
        crate::orm::posts::Column::Status
    }
}

impl ContentColumns for crate::orm::documents::Entity {
    fn title_col() -> Self::Column {
        crate::orm::documents::Column::Title
    }
    fn body_col() -> Self::Column {
        crate::orm::documents::Column::Description
    }
    fn author_col() -> Self::Column {
        crate::orm::documents::Column::UploadedById
    }
    fn department_col() -> Self::Column {
        crate::orm::documents::Column::DepartmentId
    }
    fn public_col() -> Self::Column {
        crate::orm::documents::Column::IsPublic
    }
    fn status_col() -> Self::Column {
        crate::orm::documents::Column::Status
    }
}

/// Query-string filters accepted by the post and document listing
/// endpoints.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentFilters {
    /// Case-insensitive substring match on title and body.
    pub search: Option<String>,
    /// Plain department filter. Ignored when `department_access` is
    /// supplied; the union rule wins.
    pub department_id: Option<i32>,
    /// Opt-in union visibility: items of this department, plus public
    /// items, plus (with `include_admin_posts`) admin-authored items.
    pub department_access: Option<i32>,
    pub include_admin_posts: Option<bool>,
    /// Explicit visibility filter; replaces the role default.
    pub is_public: Option<bool>,
    pub status: Option<ContentStatus>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ContentFilters {
    /// 1-based page, defaulting to 1. Zero is treated as unset.
    pub fn page(&self) -> u64 {
        self.page.filter(|p| *p >= 1).unwrap_or(1)
    }

    pub fn limit(&self) -> u64 {
        self.limit
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE)
    }

    /// Build the full predicate for this caller.
    pub fn condition<E: ContentColumns>(&self, caller: &Caller) -> Result<Condition, Error> {
        let access = resolve_department_access(caller, self.department_access)?;
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty());

        let mut cond = Condition::all();

        if let Some(department) = access {
            // Union visibility. A search term is distributed into each
            // branch rather than ANDed onto the flattened union, so a
            // match in one branch can never surface an item only
            // another branch would have excluded.
            let mut branches = vec![
                E::department_col().eq(department),
                E::public_col().eq(true),
            ];
            if self.include_admin_posts.unwrap_or(false) {
                branches.push(E::author_col().in_subquery(admin_authors_subquery()));
            }

            let mut union = Condition::any();
            for branch in branches {
                match search {
                    Some(term) => {
                        union = union
                            .add(Condition::all().add(branch).add(search_condition::<E>(term)));
                    }
                    None => union = union.add(branch),
                }
            }
            cond = cond.add(union);
        } else {
            if let Some(department) = self.department_id {
                cond = cond.add(E::department_col().eq(department));
            }
            if self.is_public.is_none() {
                if let Some(visibility) = default_visibility::<E>(caller) {
                    cond = cond.add(visibility);
                }
            }
            if let Some(term) = search {
                cond = cond.add(search_condition::<E>(term));
            }
        }

        if let Some(public) = self.is_public {
            cond = cond.add(E::public_col().eq(public));
        }
        if let Some(status) = self.status {
            cond = cond.add(E::status_col().eq(status));
        }

        Ok(cond)
    }
}

/// What a caller sees when no explicit visibility filter and no
/// department access were supplied. Admins see everything.
fn default_visibility<E: ContentColumns>(caller: &Caller) -> Option<ConditionExpression> {
    match caller.role {
        Role::Admin => None,
        Role::DepartmentHead => {
            let mut visible = Condition::any().add(E::public_col().eq(true));
            if let Some(department) = caller.department_id {
                visible = visible.add(E::department_col().eq(department));
            }
            Some(ConditionExpression::Condition(visible))
        }
        Role::Employee => Some(ConditionExpression::SimpleExpr(E::public_col().eq(true))),
    }
}

fn search_condition<E: ContentColumns>(term: &str) -> Condition {
    Condition::any()
        .add(contains_ci(E::title_col(), term))
        .add(contains_ci(E::body_col(), term))
}

/// Case-insensitive substring match: `LOWER(col) LIKE '%term%'`.
pub(crate) fn contains_ci<C: ColumnTrait + IntoSimpleExpr>(col: C, term: &str) -> SimpleExpr {
    let pattern = format!("%{}%", term.to_lowercase());
    Expr::expr(Func::lower(col.into_simple_expr())).like(pattern)
}

/// Ids of all admin users, for the optional admin-authored union
/// branch.
fn admin_authors_subquery() -> SelectStatement {
    Query::select()
        .column(users::Column::Id)
        .from(users::Entity)
        .and_where(users::Column::Role.eq(Role::Admin))
        .to_owned()
}

/// Pagination envelope returned by every listing endpoint. `total` is
/// counted against the same predicate the page was fetched with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(total: u64, page: u64, limit: u64) -> Self {
        Self {
            total,
            page,
            limit,
            pages: total.div_ceil(limit),
        }
    }

    /// Rows to skip for a 1-based page.
    pub fn skip(page: u64, limit: u64) -> u64 {
        (page - 1) * limit
    }
}
