//! Shared protocol types (compile everywhere, no I/O)

pub mod address;
pub mod chain;
pub mod methods;

pub use address::{Address, AddressError};
pub use chain::{known_networks, ChainId, ChainIdError, NativeCurrency, NetworkDescriptor, NetworkTarget};
