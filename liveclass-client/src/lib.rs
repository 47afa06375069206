pub mod config;
pub mod error;
pub mod peer;
pub mod relay_client;
pub mod session;
pub mod transport;
pub mod webrtc_peer;

pub use config::*;
pub use error::*;
pub use peer::*;
pub use relay_client::*;
pub use session::*;
pub use transport::*;
pub use webrtc_peer::*;
