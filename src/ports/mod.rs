pub mod clock;
pub mod event_store;

pub use clock::*;
pub use event_store::EventStore;
