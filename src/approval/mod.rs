//! Content review engine.
//!
//! Owns the PENDING/APPROVED/REJECTED lifecycle shared by posts and
//! documents, the department visibility rules, and the role matrix
//! deciding who may create, see, change or review an item. Every check
//! takes an explicit [`Caller`] so the rules stay independent of any
//! session machinery and can be exercised directly in tests.

pub mod query;
#[cfg(test)]
mod test;

use crate::error::Error;
use crate::orm::users::Role;
use crate::orm::{documents, events, posts};
use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub use query::{ContentFilters, Pagination};

/// Review status, stored and transmitted as the literal strings
/// `PENDING` | `APPROVED` | `REJECTED`.
///
/// The machine has no terminal state: an approved item can later be
/// rejected and vice versa.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(10))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum ContentStatus {
    #[sea_orm(string_value = "PENDING")]
    #[default]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

/// The acting identity, resolved from the session by the web layer and
/// passed into every engine operation as a plain value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Caller {
    pub id: i32,
    pub role: Role,
    pub department_id: Option<i32>,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Read-side shape of anything owned by a user and scoped to a
/// department.
pub trait DepartmentScoped {
    fn owner_id(&self) -> i32;
    /// None means company-wide.
    fn department_id(&self) -> Option<i32>;
    fn is_public(&self) -> bool;
}

/// Marker for items that carry a review status. Events are scoped but
/// not reviewable, so review operations cannot be called on them.
pub trait Reviewable: DepartmentScoped {}

impl DepartmentScoped for posts::Model {
    fn owner_id(&self) -> i32 {
        self.author_id
    }
    fn department_id(&self) -> Option<i32> {
        self.department_id
    }
    fn is_public(&self) -> bool {
        self.is_public
    }
}

impl Reviewable for posts::Model {}

impl DepartmentScoped for documents::Model {
    fn owner_id(&self) -> i32 {
        self.uploaded_by_id
    }
    fn department_id(&self) -> Option<i32> {
        self.department_id
    }
    fn is_public(&self) -> bool {
        self.is_public
    }
}

impl Reviewable for documents::Model {}

impl DepartmentScoped for events::Model {
    fn owner_id(&self) -> i32 {
        self.created_by_id
    }
    fn department_id(&self) -> Option<i32> {
        self.department_id
    }
    fn is_public(&self) -> bool {
        self.is_public
    }
}

/// Gate and resolve the department a new item will belong to.
///
/// Admins may create in any department (or company-wide); department
/// heads only in their own; employees not at all.
pub fn resolve_create_department(
    caller: &Caller,
    requested: Option<i32>,
) -> Result<Option<i32>, Error> {
    match caller.role {
        Role::Admin => Ok(requested),
        Role::DepartmentHead => {
            let own = caller.department_id.ok_or(Error::Forbidden(
                "department heads must belong to a department to create content",
            ))?;
            match requested {
                Some(requested) if requested != own => Err(Error::Forbidden(
                    "department heads may only create content in their own department",
                )),
                _ => Ok(Some(own)),
            }
        }
        Role::Employee => Err(Error::Forbidden("employees may not create content")),
    }
}

/// Validate the opt-in department access parameter. Non-admins may only
/// request scoped access to their own department.
pub fn resolve_department_access(
    caller: &Caller,
    requested: Option<i32>,
) -> Result<Option<i32>, Error> {
    match requested {
        None => Ok(None),
        Some(department) if caller.is_admin() || caller.department_id == Some(department) => {
            Ok(Some(department))
        }
        Some(_) => Err(Error::Forbidden(
            "department access is limited to your own department",
        )),
    }
}

/// Per-item view rule. `department_access` must already have passed
/// [`resolve_department_access`].
pub fn can_view(
    caller: &Caller,
    item: &impl DepartmentScoped,
    department_access: Option<i32>,
) -> bool {
    match caller.role {
        Role::Admin => true,
        Role::DepartmentHead => {
            item.is_public()
                || (caller.department_id.is_some() && item.department_id() == caller.department_id)
        }
        Role::Employee => {
            item.is_public()
                || (department_access.is_some() && item.department_id() == department_access)
        }
    }
}

pub fn require_view(
    caller: &Caller,
    item: &impl DepartmentScoped,
    department_access: Option<i32>,
) -> Result<(), Error> {
    if can_view(caller, item, department_access) {
        Ok(())
    } else {
        Err(Error::Forbidden("you may not view this item"))
    }
}

/// Edit/delete rule: admins anywhere, department heads inside their own
/// department, employees never.
pub fn require_modify(caller: &Caller, item: &impl DepartmentScoped) -> Result<(), Error> {
    match caller.role {
        Role::Admin => Ok(()),
        Role::DepartmentHead
            if caller.department_id.is_some()
                && item.department_id() == caller.department_id =>
        {
            Ok(())
        }
        Role::DepartmentHead => Err(Error::Forbidden(
            "you may only manage content in your own department",
        )),
        Role::Employee => Err(Error::Forbidden("employees may not manage content")),
    }
}

/// Approve/reject is an admin-only action.
pub fn require_reviewer(caller: &Caller) -> Result<(), Error> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(Error::Forbidden("only admins may approve or reject content"))
    }
}

/// Resubmission is limited to the original author or an admin.
pub fn require_resubmit(caller: &Caller, item: &impl Reviewable) -> Result<(), Error> {
    if caller.is_admin() || (caller.role == Role::DepartmentHead && item.owner_id() == caller.id) {
        Ok(())
    } else {
        Err(Error::Forbidden("only the author may resubmit this item"))
    }
}

/// Both posts and documents require a non-empty title and body.
pub fn validate_content(title: &str, body: &str) -> Result<(), Error> {
    if title.trim().is_empty() {
        return Err(Error::Validation("title must not be empty".into()));
    }
    if body.trim().is_empty() {
        return Err(Error::Validation("content must not be empty".into()));
    }
    Ok(())
}

/// The status and reviewer columns that are always written together.
///
/// `resubmit` is intentionally absent: it only moves the status back to
/// [`ContentStatus::Pending`] and leaves the previous reviewer and
/// timestamp in place as history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReviewStamp {
    pub status: ContentStatus,
    pub reviewed_by_id: Option<i32>,
    pub reviewed_at: Option<NaiveDateTime>,
}

impl ReviewStamp {
    /// Admin-authored items go live immediately with the creator
    /// recorded as their own reviewer; everything else starts pending.
    pub fn on_create(caller: &Caller, now: NaiveDateTime) -> Self {
        if caller.is_admin() {
            Self {
                status: ContentStatus::Approved,
                reviewed_by_id: Some(caller.id),
                reviewed_at: Some(now),
            }
        } else {
            Self {
                status: ContentStatus::Pending,
                reviewed_by_id: None,
                reviewed_at: None,
            }
        }
    }

    /// A decision is legal from any prior state. The previous stamp is
    /// overwritten, never accumulated.
    pub fn on_decision(approve: bool, reviewer_id: i32, now: NaiveDateTime) -> Self {
        Self {
            status: if approve {
                ContentStatus::Approved
            } else {
                ContentStatus::Rejected
            },
            reviewed_by_id: Some(reviewer_id),
            reviewed_at: Some(now),
        }
    }
}
