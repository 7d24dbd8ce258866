//! Mailbox storage: email records and their repository.

mod repository;
mod types;

pub use repository::EmailRepository;
pub use types::{Email, MailHeader, NewEmail};
