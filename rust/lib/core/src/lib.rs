pub mod config;
pub mod error;
pub mod role;
pub mod types;

pub use config::ClientConfig;
pub use error::ClientError;
pub use role::Role;
pub use types::{new_id, now_rfc3339, prefixed_id};
