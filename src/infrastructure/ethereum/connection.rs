//! Connection lifecycle: one transport plus an optional signing identity
//!
//! A connection is constructed from options, started exactly once per
//! construction (idempotent re-entry), and must be started before any
//! contract interaction. Restarting swaps the signing identity.

use std::sync::Arc;

use alloy::signers::local::PrivateKeySigner;
use alloy_primitives::{Address, U256};
use tracing::debug;

use crate::config::ConnectionOptions;
use crate::error::{Error, Result};
use crate::infrastructure::ethereum::{connect_transport, EvmProvider, TransportConfig};
use crate::infrastructure::registry::AmbientRegistry;

/// How outgoing transactions get signed, fixed at start time.
#[derive(Debug, Clone)]
pub enum SigningMode {
    /// This process holds the key and signs locally.
    Local(PrivateKeySigner),
    /// Signing is delegated to the provider's own accounts.
    Delegated,
}

/// One network endpoint plus its optional signing identity.
pub struct Connection {
    options: ConnectionOptions,
    custom_provider: Option<Arc<dyn EvmProvider>>,
    registry: Option<AmbientRegistry>,
    provider: Option<Arc<dyn EvmProvider>>,
    signing: SigningMode,
    started: bool,
}

impl Connection {
    pub fn new(options: ConnectionOptions) -> Self {
        Self {
            options,
            custom_provider: None,
            registry: None,
            provider: None,
            signing: SigningMode::Delegated,
            started: false,
        }
    }

    /// Adopt a caller-supplied provider instead of resolving one from the
    /// host string.
    pub fn with_provider(mut self, provider: Arc<dyn EvmProvider>) -> Self {
        self.custom_provider = Some(provider);
        self
    }

    /// Attach the ambient registry used by [`Connection::connect`] and for
    /// opt-in publication of the active provider.
    pub fn with_registry(mut self, registry: AmbientRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    pub fn debug_enabled(&self) -> bool {
        self.options.debug
    }

    /// Resolve the transport and derive the signing identity. No-op when
    /// already started.
    pub async fn start(&mut self) -> Result<()> {
        self.start_inner(false).await
    }

    /// Tear down and start again, re-reading the configured key.
    pub async fn restart(&mut self) -> Result<()> {
        self.start_inner(true).await
    }

    async fn start_inner(&mut self, restart: bool) -> Result<()> {
        if self.started && !restart {
            return Ok(());
        }

        let transport = TransportConfig::resolve(&self.options, self.custom_provider.clone())?;
        if self.options.debug {
            debug!(endpoint = %transport.display(), "starting connection");
        }
        let provider = connect_transport(transport).await?;

        self.signing = match self.options.private_key.as_deref() {
            Some(key) => SigningMode::Local(parse_private_key(key)?),
            None => SigningMode::Delegated,
        };
        self.provider = Some(provider);
        self.started = true;
        Ok(())
    }

    /// Adopt the injected wallet provider from the ambient registry.
    ///
    /// Requests account access first, then publishes the provider back into
    /// the registry unless suppressed by configuration.
    pub async fn connect(&mut self) -> Result<()> {
        let registry = self
            .registry
            .as_ref()
            .ok_or_else(|| Error::environment("no ambient registry attached"))?
            .clone();
        let injected = registry
            .injected()
            .await
            .ok_or_else(|| Error::environment("no injected provider available"))?;

        injected.request_accounts().await?;

        self.provider = Some(injected.clone());
        self.signing = SigningMode::Delegated;
        self.started = true;

        if !self.options.skip_global_assign {
            registry.publish(injected).await;
        }
        Ok(())
    }

    /// Swap the signing key and restart. No-op when the key is unchanged.
    pub async fn switch_to_account(&mut self, private_key: impl Into<String>) -> Result<()> {
        let private_key = private_key.into();
        if self.options.private_key.as_deref() == Some(private_key.as_str()) {
            return Ok(());
        }
        self.options.private_key = Some(private_key);
        self.restart().await
    }

    /// The sender identity: the local account when one is configured, else
    /// the first provider-authorized account.
    pub async fn address(&self) -> Result<Option<Address>> {
        match &self.signing {
            SigningMode::Local(signer) => Ok(Some(signer.address())),
            SigningMode::Delegated => {
                let accounts = self.provider()?.accounts().await?;
                Ok(accounts.first().copied())
            }
        }
    }

    /// Balance of the connection's own address.
    pub async fn balance(&self) -> Result<U256> {
        let address = self
            .address()
            .await?
            .ok_or_else(|| Error::environment("connection has no account"))?;
        self.provider()?.balance_of(address).await
    }

    pub async fn chain_id(&self) -> Result<u64> {
        self.provider()?.chain_id().await
    }

    pub async fn block_number(&self) -> Result<u64> {
        self.provider()?.block_number().await
    }

    /// The active provider; requires a started connection.
    pub fn provider(&self) -> Result<Arc<dyn EvmProvider>> {
        self.provider
            .clone()
            .ok_or_else(|| Error::config("connection is not started"))
    }

    pub fn signing_mode(&self) -> &SigningMode {
        &self.signing
    }

    /// The local signer, when one is configured.
    pub fn local_signer(&self) -> Option<&PrivateKeySigner> {
        match &self.signing {
            SigningMode::Local(signer) => Some(signer),
            SigningMode::Delegated => None,
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.options.host)
            .field("started", &self.started)
            .field("local_signer", &self.local_signer().is_some())
            .finish()
    }
}

fn parse_private_key(key: &str) -> Result<PrivateKeySigner> {
    let trimmed = key.trim();
    let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    stripped
        .parse()
        .map_err(|e| Error::config(format!("invalid private key: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known Anvil development key.
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_parse_private_key_with_and_without_prefix() {
        let with_prefix = parse_private_key(DEV_KEY).unwrap();
        let without_prefix = parse_private_key(&DEV_KEY[2..]).unwrap();
        assert_eq!(with_prefix.address(), without_prefix.address());
    }

    #[test]
    fn test_parse_private_key_rejects_garbage() {
        assert!(matches!(
            parse_private_key("not-a-key").unwrap_err(),
            Error::Config(_)
        ));
    }

    #[tokio::test]
    async fn test_unstarted_connection_has_no_provider() {
        let connection = Connection::new(ConnectionOptions::default());
        assert!(matches!(connection.provider(), Err(Error::Config(_))));
        assert!(!connection.is_started());
    }

    #[tokio::test]
    async fn test_connect_without_registry_is_environment_error() {
        let mut connection = Connection::new(ConnectionOptions::default());
        assert!(matches!(
            connection.connect().await.unwrap_err(),
            Error::Environment(_)
        ));
    }
}
