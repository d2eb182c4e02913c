//! Typed client SDK for a fixed family of EVM contracts over JSON-RPC.
//!
//! The crate wraps the alloy provider stack with three layers:
//!
//! - a [`Connection`](infrastructure::ethereum::Connection) owning one
//!   transport (HTTP, WebSocket, IPC, or a caller-supplied provider) and an
//!   optional local signing key,
//! - a [`ContractHandle`](contract::ContractHandle) binding an ABI and an
//!   address to that connection: gas-parameter computation, read calls,
//!   signed and provider-delegated sends, deployment, and receipt-log
//!   decoding,
//! - a [`ContractModel`](model::ContractModel) orchestrating the two for a
//!   concrete contract binding, with thin typed wrappers (ERC-20, ERC-721,
//!   staking, bounty network) on top.
//!
//! ```ignore
//! use evoke::config::ConnectionOptions;
//! use evoke::domain::abi::Artifact;
//! use evoke::infrastructure::ethereum::Connection;
//! use evoke::model::erc20::Erc20;
//!
//! let options = ConnectionOptions::http("http://localhost:8545")
//!     .with_private_key(std::env::var("PRIVATE_KEY")?);
//! let artifact = Artifact::from_file("artifacts/Token.json")?;
//! let mut token = Erc20::new(Connection::new(options), artifact, Some(address))?;
//! token.start().await?;
//! let receipt = token.transfer(recipient, "1.5").await?;
//! assert!(receipt.success());
//! ```

pub mod config;
pub mod contract;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod model;
pub mod testing;

pub use contract::{ContractHandle, DecodedReceipt, DeployOptions, TxOptions, TxParams};
pub use dispatch::{DispatchStrategy, PendingTx, ReceiptDispatch};
pub use domain::abi::Artifact;
pub use error::{Error, Result};
pub use infrastructure::ethereum::{Connection, EvmProvider, SigningMode, TransportConfig};
pub use infrastructure::registry::AmbientRegistry;
pub use model::{ContractModel, SendIntent};
