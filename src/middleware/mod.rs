pub mod identity;
pub mod response;

pub use identity::UserIdentity;
pub use response::{ApiResponse, ApiResult};
