pub mod config;
pub mod error;
pub mod slug;
pub mod types;

pub use config::Config;
pub use error::CallboardError;
pub use slug::{validate_slug, RESERVED_SLUGS};
pub use types::*;
