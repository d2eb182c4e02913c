//! Transport resolution and Alloy provider implementations
//!
//! The provider trait abstracts over the concrete transport so contract
//! handles and models never depend on a specific Alloy provider type, and
//! tests can substitute an in-memory implementation.

use std::path::PathBuf;
use std::sync::Arc;

use alloy::network::Ethereum;
use alloy::providers::{
    fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
    Identity, PendingTransactionBuilder, Provider, ProviderBuilder, RootProvider,
};
use alloy::rpc::types::TransactionRequest;
use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;

use crate::config::{ConnectionOptions, ProviderOptions};
use crate::dispatch::{PendingTx, REQUIRED_CONFIRMATIONS};
use crate::error::{Error, Result};

/// Resolved transport for one connection.
#[derive(Clone)]
pub enum TransportConfig {
    /// Caller-supplied provider object, adopted as-is.
    Custom(Arc<dyn EvmProvider>),
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
    /// IPC socket path (Unix only)
    #[cfg(unix)]
    Ipc(PathBuf),
}

impl std::fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportConfig::Custom(_) => f.debug_tuple("Custom").finish(),
            TransportConfig::Http(url) => f.debug_tuple("Http").field(url).finish(),
            TransportConfig::WebSocket(url) => f.debug_tuple("WebSocket").field(url).finish(),
            #[cfg(unix)]
            TransportConfig::Ipc(path) => f.debug_tuple("Ipc").field(path).finish(),
        }
    }
}

impl TransportConfig {
    /// Pick the transport from configuration.
    ///
    /// An explicit custom provider wins; otherwise the host string selects
    /// HTTP or WebSocket by substring, and anything else falls through to
    /// IPC, which requires provider options carrying the socket path.
    pub fn resolve(
        options: &ConnectionOptions,
        custom: Option<Arc<dyn EvmProvider>>,
    ) -> Result<Self> {
        if let Some(provider) = custom {
            return Ok(TransportConfig::Custom(provider));
        }

        let host = options
            .host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::config("no host and no explicit provider configured"))?;

        if host.contains("http") {
            return Ok(TransportConfig::Http(host.to_string()));
        }
        if host.contains("ws") {
            return Ok(TransportConfig::WebSocket(host.to_string()));
        }

        let provider_options = options
            .provider_options
            .as_ref()
            .ok_or_else(|| Error::config("ipc transport requires provider options"))?;
        let path = ipc_path(provider_options, host);
        #[cfg(unix)]
        {
            Ok(TransportConfig::Ipc(path))
        }
        #[cfg(not(unix))]
        {
            let _ = path;
            Err(Error::config("ipc transport is not supported on this platform"))
        }
    }

    /// Display name for this endpoint.
    pub fn display(&self) -> String {
        match self {
            TransportConfig::Custom(provider) => provider.endpoint(),
            TransportConfig::Http(url) => url.clone(),
            TransportConfig::WebSocket(url) => url.clone(),
            #[cfg(unix)]
            TransportConfig::Ipc(path) => path.display().to_string(),
        }
    }
}

/// Socket path: provider options win, the host string is the fallback.
fn ipc_path(options: &ProviderOptions, host: &str) -> PathBuf {
    options
        .ipc_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(host))
}

/// The provider operations this crate needs, abstracted over the transport.
#[async_trait]
pub trait EvmProvider: Send + Sync + 'static {
    async fn chain_id(&self) -> Result<u64>;

    async fn block_number(&self) -> Result<u64>;

    /// Accounts the provider has already authorized.
    async fn accounts(&self) -> Result<Vec<Address>>;

    /// Ask the provider to authorize account access. Plain RPC transports
    /// answer with their unlocked accounts.
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        self.accounts().await
    }

    async fn balance_of(&self, address: Address) -> Result<U256>;

    async fn gas_price(&self) -> Result<u128>;

    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64>;

    async fn transaction_count(&self, address: Address) -> Result<u64>;

    /// Execute a read-only call (`eth_call`).
    async fn call(&self, tx: TransactionRequest) -> Result<Bytes>;

    /// Broadcast a locally-signed transaction.
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<PendingTx>;

    /// Hand an unsigned transaction to the provider's own account machinery.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<PendingTx>;

    /// Endpoint display name.
    fn endpoint(&self) -> String;
}

// Type aliases for the filled providers
type HttpFillProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
    Ethereum,
>;

type WsFillProvider = HttpFillProvider;

#[cfg(unix)]
type IpcFillProvider = HttpFillProvider;

/// Enum-based provider storing concrete types per transport.
pub enum AlloyTransport {
    Http {
        provider: HttpFillProvider,
        endpoint: String,
    },
    WebSocket {
        provider: WsFillProvider,
        endpoint: String,
    },
    #[cfg(unix)]
    Ipc {
        provider: IpcFillProvider,
        endpoint: String,
    },
}

/// Construct a provider from the resolved transport.
pub async fn connect_transport(config: TransportConfig) -> Result<Arc<dyn EvmProvider>> {
    match config {
        TransportConfig::Custom(provider) => Ok(provider),
        TransportConfig::Http(url) => {
            let rpc_url = url
                .parse()
                .map_err(|e| Error::config(format!("invalid HTTP URL '{url}': {e}")))?;
            let provider = ProviderBuilder::new().connect_http(rpc_url);
            Ok(Arc::new(AlloyTransport::Http {
                provider,
                endpoint: url,
            }))
        }
        TransportConfig::WebSocket(url) => {
            let provider = ProviderBuilder::new()
                .connect(&url)
                .await
                .map_err(|e| Error::provider(format!("websocket connect failed: {e}")))?;
            Ok(Arc::new(AlloyTransport::WebSocket {
                provider,
                endpoint: url,
            }))
        }
        #[cfg(unix)]
        TransportConfig::Ipc(path) => {
            use alloy::providers::IpcConnect;
            let ipc = IpcConnect::new(path.to_string_lossy().to_string());
            let provider = ProviderBuilder::new()
                .connect_ipc(ipc)
                .await
                .map_err(|e| Error::provider(format!("ipc connect failed: {e}")))?;
            Ok(Arc::new(AlloyTransport::Ipc {
                provider,
                endpoint: path.display().to_string(),
            }))
        }
    }
}

// Macro to reduce duplication across transport variants
macro_rules! with_provider {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        match $self {
            AlloyTransport::Http { provider, .. } => provider.$method($($arg),*).await,
            AlloyTransport::WebSocket { provider, .. } => provider.$method($($arg),*).await,
            #[cfg(unix)]
            AlloyTransport::Ipc { provider, .. } => provider.$method($($arg),*).await,
        }
    };
}

fn pending_from_builder(builder: PendingTransactionBuilder<Ethereum>) -> PendingTx {
    let hash = *builder.tx_hash();
    let fut = builder
        .with_required_confirmations(REQUIRED_CONFIRMATIONS)
        .get_receipt();
    PendingTx::new(hash, async move { fut.await.map_err(Error::provider) })
}

#[async_trait]
impl EvmProvider for AlloyTransport {
    async fn chain_id(&self) -> Result<u64> {
        with_provider!(self, get_chain_id).map_err(Error::provider)
    }

    async fn block_number(&self) -> Result<u64> {
        with_provider!(self, get_block_number).map_err(Error::provider)
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        with_provider!(self, get_accounts).map_err(Error::provider)
    }

    async fn balance_of(&self, address: Address) -> Result<U256> {
        with_provider!(self, get_balance, address).map_err(Error::provider)
    }

    async fn gas_price(&self) -> Result<u128> {
        with_provider!(self, get_gas_price).map_err(Error::provider)
    }

    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64> {
        with_provider!(self, estimate_gas, tx).map_err(Error::provider)
    }

    async fn transaction_count(&self, address: Address) -> Result<u64> {
        with_provider!(self, get_transaction_count, address).map_err(Error::provider)
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes> {
        with_provider!(self, call, tx).map_err(Error::provider)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<PendingTx> {
        let builder =
            with_provider!(self, send_raw_transaction, raw.as_ref()).map_err(Error::provider)?;
        Ok(pending_from_builder(builder))
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<PendingTx> {
        let builder = with_provider!(self, send_transaction, tx).map_err(Error::provider)?;
        Ok(pending_from_builder(builder))
    }

    fn endpoint(&self) -> String {
        match self {
            AlloyTransport::Http { endpoint, .. } => endpoint.clone(),
            AlloyTransport::WebSocket { endpoint, .. } => endpoint.clone(),
            #[cfg(unix)]
            AlloyTransport::Ipc { endpoint, .. } => endpoint.clone(),
        }
    }
}
