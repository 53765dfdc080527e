use crate::approval::Caller;
use crate::orm::users::{self, Role};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;

/// A user as the rest of the application sees one: everything except
/// the password hash.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department_id: Option<i32>,
}

impl From<users::Model> for Profile {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            department_id: user.department_id,
        }
    }
}

impl Profile {
    pub async fn get_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<Self>, sea_orm::DbErr> {
        Ok(users::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(Into::into))
    }

    /// The identity value handed to every engine operation.
    pub fn caller(&self) -> Caller {
        Caller {
            id: self.id,
            role: self.role,
            department_id: self.department_id,
        }
    }
}
