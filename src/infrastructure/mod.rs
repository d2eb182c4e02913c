//! Infrastructure - network transports and process-wide services

pub mod ethereum;
pub mod registry;

pub use ethereum::{Connection, EvmProvider, SigningMode, TransportConfig};
pub use registry::AmbientRegistry;
