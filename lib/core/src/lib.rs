pub mod auth;
pub mod error;
pub mod module;
pub mod types;

pub use auth::{Claims, Role, daily_password, require_admin};
pub use error::ServiceError;
pub use module::Module;
pub use types::{new_id, now_rfc3339};
