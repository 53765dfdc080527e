use crate::db::get_db_pool;
use crate::error::Error;
use crate::orm::users;
use crate::session;
use crate::user::Profile;
use actix_web::{post, web, HttpResponse};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(post_login);
}

#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
}

#[post("/api/login")]
pub async fn post_login(
    session: actix_session::Session,
    form: web::Json<LoginForm>,
) -> Result<HttpResponse, actix_web::Error> {
    let db = get_db_pool();

    let user = users::Entity::find()
        .filter(users::Column::Email.eq(form.email.trim()))
        .one(db)
        .await
        .map_err(Error::from)?;

    // Same failure for unknown email and bad password, so the endpoint
    // does not confirm which accounts exist.
    let user = match user {
        Some(user) => user,
        None => return Err(Error::Unauthorized("invalid email or password").into()),
    };

    if !session::verify_password(&form.password, &user.password) {
        return Err(Error::Unauthorized("invalid email or password").into());
    }

    session::remember_client(&session, user.id)?;
    log::info!("user {} logged in", user.id);

    Ok(HttpResponse::Ok().json(Profile::from(user)))
}
