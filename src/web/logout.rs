use crate::session;
use actix_web::{post, HttpResponse};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(post_logout);
}

#[post("/api/logout")]
pub async fn post_logout(session: actix_session::Session) -> HttpResponse {
    session::forget_client(&session);
    HttpResponse::NoContent().finish()
}
