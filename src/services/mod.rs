pub mod auth_service;
pub mod data_service;
pub mod investor_service;
pub mod mail_service;
pub mod upload_service;

pub use mail_service::{DisabledMailer, Mailer, SmtpMailer};
