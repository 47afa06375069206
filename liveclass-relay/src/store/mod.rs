mod clock;
mod memory_store;
mod signal_store;
mod sweeper;

pub use clock::*;
pub use memory_store::*;
pub use signal_store::*;
pub use sweeper::*;
