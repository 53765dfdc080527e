pub mod departments;
pub mod documents;
pub mod events;
pub mod login;
pub mod logout;
pub mod notifications;
pub mod posts;
pub mod users;

use crate::approval::Pagination;
use serde::Serialize;

/// Envelope returned by every listing endpoint.
#[derive(Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Configures the web app by adding services from each web file.
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    departments::configure(conf);
    documents::configure(conf);
    events::configure(conf);
    login::configure(conf);
    logout::configure(conf);
    notifications::configure(conf);
    posts::configure(conf);
    users::configure(conf);
}
