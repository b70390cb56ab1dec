pub mod atomic;
pub mod config_io;
pub mod focus_io;
pub mod layout;
pub mod store;

pub use config_io::ConfigError;
pub use focus_io::{FocusError, FocusManager};
pub use layout::DataLayout;
pub use store::{FsTicketStore, MemoryTicketStore, StoreError, TicketStore};
