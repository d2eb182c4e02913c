//! Domain model base
//!
//! A model owns one connection and one contract handle and carries a
//! concrete contract binding through its start/deploy/reload cycle. The
//! typed wrappers in the submodules add one thin method per contract
//! function and nothing else.

pub mod erc20;
pub mod erc721;
pub mod network;
pub mod staking;

use std::sync::Arc;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};

use crate::contract::{ContractHandle, DecodedReceipt, DeployOptions};
use crate::dispatch::DispatchStrategy;
use crate::domain::abi::Artifact;
use crate::error::{Error, Result};
use crate::infrastructure::ethereum::Connection;

/// A mutating method invocation, not yet bound to a sender or gas.
#[derive(Debug, Clone)]
pub struct SendIntent {
    pub method: String,
    pub args: Vec<DynSolValue>,
    pub value: Option<U256>,
}

impl SendIntent {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            args: Vec::new(),
            value: None,
        }
    }

    pub fn arg(mut self, value: DynSolValue) -> Self {
        self.args.push(value);
        self
    }

    /// Native currency to attach to the send.
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }
}

/// Connection + contract handle lifecycle for one contract binding.
pub struct ContractModel {
    connection: Connection,
    artifact: Artifact,
    address: Option<Address>,
    handle: Option<ContractHandle>,
    dispatch: Option<Arc<dyn DispatchStrategy>>,
}

impl ContractModel {
    /// Fails immediately when the artifact carries no ABI entries.
    pub fn new(connection: Connection, artifact: Artifact, address: Option<Address>) -> Result<Self> {
        if artifact.is_empty() {
            return Err(Error::config("missing abi"));
        }
        Ok(Self {
            connection,
            artifact,
            address,
            handle: None,
            dispatch: None,
        })
    }

    /// Replace the default transaction-lifecycle handling for every send
    /// issued through this model.
    pub fn with_dispatch_strategy(mut self, strategy: Arc<dyn DispatchStrategy>) -> Self {
        self.dispatch = Some(strategy);
        self
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.connection
    }

    pub fn address(&self) -> Option<Address> {
        self.address
    }

    /// Start the connection and (re)build the handle.
    pub async fn start(&mut self) -> Result<()> {
        self.connection.start().await?;
        self.init_handle()
    }

    /// Start against an already-deployed contract; the address must be set.
    pub async fn load(&mut self) -> Result<()> {
        if self.address.is_none() {
            return Err(Error::config("contract address is not set"));
        }
        self.start().await
    }

    fn init_handle(&mut self) -> Result<()> {
        let provider = self.connection.provider()?;
        let mut handle = ContractHandle::new(provider, self.artifact.abi.clone(), self.address)?;
        handle.set_debug(self.connection.debug_enabled());
        self.handle = Some(handle);
        Ok(())
    }

    /// Start lazily when configured to, otherwise insist on an explicit
    /// `start`.
    async fn ensure_ready(&mut self) -> Result<()> {
        if self.handle.is_some() && self.connection.is_started() {
            return Ok(());
        }
        if !self.connection.options().auto_start {
            return Err(Error::config("model is not started"));
        }
        self.start().await
    }

    pub fn handle(&self) -> Result<&ContractHandle> {
        self.handle
            .as_ref()
            .ok_or_else(|| Error::config("model is not started"))
    }

    pub fn handle_mut(&mut self) -> Result<&mut ContractHandle> {
        self.handle
            .as_mut()
            .ok_or_else(|| Error::config("model is not started"))
    }

    /// Read-only invocation.
    pub async fn call_tx(&mut self, method: &str, args: &[DynSolValue]) -> Result<Vec<DynSolValue>> {
        self.ensure_ready().await?;
        self.handle()?.call(method, args).await
    }

    /// Mutating invocation: signed locally when the connection holds a key,
    /// delegated to the provider's accounts otherwise.
    pub async fn send_tx(&mut self, intent: SendIntent) -> Result<DecodedReceipt> {
        self.ensure_ready().await?;
        let signer = self.connection.local_signer().cloned();
        match signer {
            Some(signer) => {
                let from = signer.address();
                let dispatch = self.dispatch.clone();
                let handle = self.handle_mut()?;
                let params = handle
                    .compute_tx_options(&intent.method, &intent.args, intent.value, Some(from))
                    .await?;
                let data = handle.encode_input(&intent.method, &intent.args)?;
                handle
                    .send_signed(&signer, data, intent.value, params, dispatch.as_deref())
                    .await
            }
            None => self.send_unsigned_tx(intent).await,
        }
    }

    /// Mutating invocation through the provider's own account machinery.
    pub async fn send_unsigned_tx(&mut self, intent: SendIntent) -> Result<DecodedReceipt> {
        self.ensure_ready().await?;
        let dispatch = self.dispatch.clone();
        let handle = self.handle_mut()?;
        let params = handle
            .compute_tx_options(&intent.method, &intent.args, intent.value, None)
            .await?;
        let data = handle.encode_input(&intent.method, &intent.args)?;
        handle
            .send_unsigned(data, intent.value, params, dispatch.as_deref())
            .await
    }

    /// Deploy the artifact's bytecode; adopts the new address and rebuilds
    /// the handle when the connection is configured to restart on deploy.
    pub async fn deploy(&mut self, args: Vec<DynSolValue>) -> Result<DecodedReceipt> {
        self.ensure_ready().await?;
        let bytecode = self
            .artifact
            .bytecode
            .clone()
            .ok_or_else(|| Error::config("artifact has no bytecode"))?;
        let signer = self.connection.local_signer().cloned();
        let dispatch = self.dispatch.clone();
        let restart = self.connection.options().restart_model_on_deploy;

        let handle = self.handle_mut()?;
        let receipt = handle
            .deploy(DeployOptions { bytecode, args }, signer.as_ref(), dispatch.as_deref())
            .await?;

        if restart {
            if let Some(address) = receipt.contract_address() {
                self.address = Some(address);
                self.init_handle()?;
            }
        }
        Ok(receipt)
    }
}

impl std::fmt::Debug for ContractModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractModel")
            .field("address", &self.address)
            .field("started", &self.handle.is_some())
            .finish()
    }
}

// Output plumbing shared by the typed wrappers.

pub(crate) fn single_output(mut values: Vec<DynSolValue>, method: &str) -> Result<DynSolValue> {
    if values.len() != 1 {
        return Err(Error::abi(format!(
            "{method} returned {} value(s), expected 1",
            values.len()
        )));
    }
    Ok(values.remove(0))
}

pub(crate) fn uint_output(values: Vec<DynSolValue>, method: &str) -> Result<U256> {
    match single_output(values, method)? {
        DynSolValue::Uint(value, _) => Ok(value),
        other => Err(Error::abi(format!("{method} returned {other:?}, expected uint"))),
    }
}

pub(crate) fn address_output(values: Vec<DynSolValue>, method: &str) -> Result<Address> {
    match single_output(values, method)? {
        DynSolValue::Address(value) => Ok(value),
        other => Err(Error::abi(format!(
            "{method} returned {other:?}, expected address"
        ))),
    }
}

pub(crate) fn string_output(values: Vec<DynSolValue>, method: &str) -> Result<String> {
    match single_output(values, method)? {
        DynSolValue::String(value) => Ok(value),
        other => Err(Error::abi(format!(
            "{method} returned {other:?}, expected string"
        ))),
    }
}

pub(crate) fn bool_output(values: Vec<DynSolValue>, method: &str) -> Result<bool> {
    match single_output(values, method)? {
        DynSolValue::Bool(value) => Ok(value),
        other => Err(Error::abi(format!("{method} returned {other:?}, expected bool"))),
    }
}
