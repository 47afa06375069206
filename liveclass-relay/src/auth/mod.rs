mod caller;
mod credentials;
mod identity;

pub use caller::*;
pub use credentials::*;
pub use identity::*;
