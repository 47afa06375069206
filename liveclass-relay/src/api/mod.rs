mod handlers;
mod relay_service;
mod router;

pub use handlers::*;
pub use relay_service::*;
pub use router::*;
