mod auth;
mod resource;
mod session;

pub use auth::{ErrorBody, LoginRequest, LoginResponse};
pub use resource::ResourceKind;
pub use session::{Credentials, Session, StoredUser};
