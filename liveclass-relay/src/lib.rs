pub mod api;
pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod store;

pub use api::*;
pub use auth::*;
pub use config::*;
pub use directory::*;
pub use error::*;
pub use store::*;
