pub mod event;
pub mod grid;
pub mod store;

pub use event::Event;
pub use grid::Cell;
pub use store::EventStore;
