pub mod assistant;
pub mod mailer;
pub mod store;
