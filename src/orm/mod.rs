pub mod departments;
pub mod documents;
pub mod events;
pub mod notifications;
pub mod posts;
pub mod review_comments;
pub mod users;
