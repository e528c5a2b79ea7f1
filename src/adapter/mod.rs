pub mod datastore;
pub mod mailer;
pub mod processor;
pub mod repository;
