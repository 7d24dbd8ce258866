//! Request and response DTOs for the web API.

mod request;
mod response;

pub use request::{DeleteEmailsRequest, ListEmailsRequest, LoginRequest, VerifyRequest};
pub use response::{ConfigResponse, DeleteEmailsResponse, LoginResponse, VerifyResponse};
