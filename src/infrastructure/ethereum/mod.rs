//! Ethereum infrastructure - transports, providers, connection lifecycle

mod connection;
mod transport;

pub use connection::{Connection, SigningMode};
pub use transport::{connect_transport, AlloyTransport, EvmProvider, TransportConfig};
