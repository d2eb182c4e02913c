//! Contract handle - one ABI + address pair bound to a connection's provider
//!
//! The handle computes transaction parameters, dispatches read calls and
//! sends (signed or provider-delegated), performs deployment, and decodes
//! receipt logs against the ABI's events.

mod options;

use std::sync::Arc;

use alloy::consensus::TxReceipt;
use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::rpc::types::{TransactionInput, TransactionReceipt, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy_dyn_abi::{DynSolValue, JsonAbiExt};
use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, Bytes, TxKind, U256};
use tracing::debug;

pub use options::{TxOptions, TxParams};

use crate::dispatch::{self, DispatchStrategy};
use crate::domain::abi::{self, DecodedEvent, DecodedLog, EventDescriptor, MethodRegistry};
use crate::error::{Error, Result};
use crate::infrastructure::ethereum::EvmProvider;

/// Bytecode plus constructor arguments for one deployment.
#[derive(Debug, Clone)]
pub struct DeployOptions {
    pub bytecode: Bytes,
    pub args: Vec<DynSolValue>,
}

/// A mined receipt with its logs resolved against the handle's ABI.
///
/// The upstream receipt is carried unmodified; decorations live on the
/// parallel `logs` list.
#[derive(Debug, Clone)]
pub struct DecodedReceipt {
    pub receipt: TransactionReceipt,
    pub logs: Vec<DecodedLog>,
}

impl DecodedReceipt {
    /// Execution status reported by the chain.
    pub fn success(&self) -> bool {
        self.receipt.inner.status()
    }

    /// Address created by a deployment, when there is one.
    pub fn contract_address(&self) -> Option<Address> {
        self.receipt.contract_address
    }

    /// Every log that resolved to a known event.
    pub fn events(&self) -> impl Iterator<Item = &DecodedEvent> {
        self.logs.iter().filter_map(|log| log.decoded.as_ref())
    }

    /// First decoded occurrence of the named event.
    pub fn event(&self, name: &str) -> Option<&DecodedEvent> {
        self.events().find(|event| event.name == name)
    }
}

/// Binds an immutable ABI and a mutable options record to zero-or-one
/// deployed address.
pub struct ContractHandle {
    provider: Arc<dyn EvmProvider>,
    abi: JsonAbi,
    methods: MethodRegistry,
    events: Vec<EventDescriptor>,
    address: Option<Address>,
    options: TxOptions,
    debug_enabled: bool,
}

impl ContractHandle {
    /// Bind an ABI to the provider. The ABI must carry at least one entry.
    pub fn new(
        provider: Arc<dyn EvmProvider>,
        abi: JsonAbi,
        address: Option<Address>,
    ) -> Result<Self> {
        if abi.items().next().is_none() {
            return Err(Error::config("missing abi"));
        }
        let methods = MethodRegistry::from_abi(&abi);
        let events = abi::event_table(&abi);
        Ok(Self {
            provider,
            abi,
            methods,
            events,
            address,
            options: TxOptions::default(),
            debug_enabled: false,
        })
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug_enabled = debug;
    }

    pub fn address(&self) -> Option<Address> {
        self.address
    }

    /// Bind (or re-bind) the deployed address.
    pub fn set_address(&mut self, address: Address) {
        self.address = Some(address);
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    pub fn methods(&self) -> &MethodRegistry {
        &self.methods
    }

    pub fn options(&self) -> &TxOptions {
        &self.options
    }

    /// The shared options record; mutations apply to every later send.
    pub fn options_mut(&mut self) -> &mut TxOptions {
        &mut self.options
    }

    fn require_address(&self) -> Result<Address> {
        self.address
            .ok_or_else(|| Error::config("contract address is not set"))
    }

    /// Calldata for a method invocation.
    pub fn encode_input(&self, method: &str, args: &[DynSolValue]) -> Result<Bytes> {
        self.methods.encode_input(method, args)
    }

    /// Gas parameters for sending `method`, honoring the options record.
    ///
    /// With auto-computation off, both values must already be cached; the
    /// check happens before anything touches the network. With it on, each
    /// missing value is defaulted independently: the price from a live
    /// query, the amount from the method's estimate (carrying `value` and
    /// `from` only when provided), and the limit from
    /// `round(amount * factor)` while no non-zero limit is cached.
    pub async fn compute_tx_options(
        &mut self,
        method: &str,
        args: &[DynSolValue],
        value: Option<U256>,
        from: Option<Address>,
    ) -> Result<TxParams> {
        if !self.options.auto {
            return self.manual_params();
        }
        let data = self.methods.encode_input(method, args)?;
        let mut tx = TransactionRequest {
            input: TransactionInput::new(data),
            ..Default::default()
        };
        if let Some(address) = self.address {
            tx.to = Some(TxKind::Call(address));
        }
        if let Some(value) = value {
            tx.value = Some(value);
        }
        if let Some(from) = from {
            tx.from = Some(from);
        }
        self.fill_auto_params(tx).await
    }

    fn manual_params(&self) -> Result<TxParams> {
        match (self.options.gas, self.options.gas_price) {
            (Some(gas), Some(gas_price)) => Ok(TxParams {
                gas: Some(gas),
                gas_price: Some(gas_price),
            }),
            _ => Err(Error::config(
                "auto gas computation is disabled and gas/gas_price are not both set",
            )),
        }
    }

    async fn fill_auto_params(&mut self, estimate_tx: TransactionRequest) -> Result<TxParams> {
        if self.options.gas_price.is_none() {
            self.options.gas_price = Some(self.provider.gas_price().await?);
        }
        if self.options.gas_amount.is_none() {
            self.options.gas_amount = Some(self.provider.estimate_gas(estimate_tx).await?);
        }
        if self.options.gas.unwrap_or(0) == 0 {
            let amount = self.options.gas_amount.unwrap_or_default();
            self.options.gas = Some((amount as f64 * self.options.gas_factor).round() as u64);
        }
        Ok(TxParams {
            gas: self.options.gas.filter(|gas| *gas != 0),
            gas_price: self.options.gas_price.filter(|price| *price != 0),
        })
    }

    /// Read-only invocation via `eth_call`, decoded against the method's
    /// return types.
    pub async fn call(&self, method: &str, args: &[DynSolValue]) -> Result<Vec<DynSolValue>> {
        let data = self.methods.encode_input(method, args)?;
        let address = self.require_address()?;
        let tx = TransactionRequest {
            to: Some(TxKind::Call(address)),
            input: TransactionInput::new(data),
            ..Default::default()
        };
        let output = self.provider.call(tx).await?;
        self.methods.decode_output(method, &output)
    }

    /// Sign calldata locally and broadcast the raw transaction.
    pub async fn send_signed(
        &self,
        signer: &PrivateKeySigner,
        data: Bytes,
        value: Option<U256>,
        params: TxParams,
        strategy: Option<&dyn DispatchStrategy>,
    ) -> Result<DecodedReceipt> {
        let to = TxKind::Call(self.require_address()?);
        self.submit_signed(signer, to, data, value, params, strategy)
            .await
    }

    /// Submit calldata through the provider's own account machinery.
    ///
    /// The sender is the first account the provider authorizes.
    pub async fn send_unsigned(
        &self,
        data: Bytes,
        value: Option<U256>,
        params: TxParams,
        strategy: Option<&dyn DispatchStrategy>,
    ) -> Result<DecodedReceipt> {
        let to = TxKind::Call(self.require_address()?);
        self.submit_unsigned(to, data, value, params, strategy).await
    }

    /// Deploy the bound ABI's bytecode.
    ///
    /// With a signer the deployment goes out signed; otherwise it is
    /// delegated to the provider's accounts. Either way the resolved
    /// receipt comes back with its logs decoded. Nothing is retried.
    pub async fn deploy(
        &mut self,
        deploy: DeployOptions,
        signer: Option<&PrivateKeySigner>,
        strategy: Option<&dyn DispatchStrategy>,
    ) -> Result<DecodedReceipt> {
        let data = self.deploy_data(&deploy)?;
        let params = if self.options.auto {
            let mut estimate_tx = TransactionRequest {
                to: Some(TxKind::Create),
                input: TransactionInput::new(data.clone()),
                ..Default::default()
            };
            if let Some(signer) = signer {
                estimate_tx.from = Some(signer.address());
            }
            self.fill_auto_params(estimate_tx).await?
        } else {
            self.manual_params()?
        };

        match signer {
            Some(signer) => {
                self.submit_signed(signer, TxKind::Create, data, None, params, strategy)
                    .await
            }
            None => {
                self.submit_unsigned(TxKind::Create, data, None, params, strategy)
                    .await
            }
        }
    }

    fn deploy_data(&self, deploy: &DeployOptions) -> Result<Bytes> {
        let mut data = deploy.bytecode.to_vec();
        if data.is_empty() {
            return Err(Error::config("deployment bytecode is empty"));
        }
        match (self.abi.constructor.as_ref(), deploy.args.is_empty()) {
            (Some(constructor), _) => {
                if constructor.inputs.len() != deploy.args.len() {
                    return Err(Error::abi(format!(
                        "constructor takes {} argument(s), got {}",
                        constructor.inputs.len(),
                        deploy.args.len()
                    )));
                }
                let encoded = constructor
                    .abi_encode_input(&deploy.args)
                    .map_err(|e| Error::abi(format!("cannot encode constructor args: {e}")))?;
                data.extend_from_slice(&encoded);
            }
            (None, true) => {}
            (None, false) => {
                return Err(Error::abi(
                    "constructor arguments provided but the ABI declares no constructor",
                ));
            }
        }
        Ok(data.into())
    }

    async fn submit_signed(
        &self,
        signer: &PrivateKeySigner,
        to: TxKind,
        data: Bytes,
        value: Option<U256>,
        params: TxParams,
        strategy: Option<&dyn DispatchStrategy>,
    ) -> Result<DecodedReceipt> {
        let from = signer.address();
        let nonce = self.provider.transaction_count(from).await?;
        let chain_id = self.provider.chain_id().await?;

        let tx = TransactionRequest {
            from: Some(from),
            to: Some(to),
            nonce: Some(nonce),
            chain_id: Some(chain_id),
            gas: params.gas,
            gas_price: params.gas_price,
            value,
            input: TransactionInput::new(data),
            ..Default::default()
        };

        if self.debug_enabled {
            debug!(%from, nonce, chain_id, "signing transaction");
        }

        let wallet = EthereumWallet::from(signer.clone());
        let envelope = tx
            .build(&wallet)
            .await
            .map_err(|e| Error::provider(format!("signing failed: {e}")))?;
        let pending = self
            .provider
            .send_raw_transaction(envelope.encoded_2718().into())
            .await?;
        let receipt = dispatch::drive(strategy, pending, self.debug_enabled).await?;
        self.decode_receipt_logs(receipt)
    }

    async fn submit_unsigned(
        &self,
        to: TxKind,
        data: Bytes,
        value: Option<U256>,
        params: TxParams,
        strategy: Option<&dyn DispatchStrategy>,
    ) -> Result<DecodedReceipt> {
        let accounts = self.provider.request_accounts().await?;
        let from = accounts
            .first()
            .copied()
            .ok_or_else(|| Error::environment("provider exposes no accounts"))?;

        let tx = TransactionRequest {
            from: Some(from),
            to: Some(to),
            gas: params.gas,
            gas_price: params.gas_price,
            value,
            input: TransactionInput::new(data),
            ..Default::default()
        };

        if self.debug_enabled {
            debug!(%from, "delegating transaction to provider accounts");
        }

        let pending = self.provider.send_transaction(tx).await?;
        let receipt = dispatch::drive(strategy, pending, self.debug_enabled).await?;
        self.decode_receipt_logs(receipt)
    }

    /// Resolve the receipt's logs against the ABI's events.
    ///
    /// Cheap pass-through when the receipt carries no logs. Decorations are
    /// built on copies; the receipt itself is returned untouched.
    pub fn decode_receipt_logs(&self, receipt: TransactionReceipt) -> Result<DecodedReceipt> {
        let logs = {
            let raw = receipt.inner.logs();
            if raw.is_empty() {
                Vec::new()
            } else {
                abi::decode_logs(&self.events, self.address, raw)?
            }
        };
        Ok(DecodedReceipt { receipt, logs })
    }
}

impl std::fmt::Debug for ContractHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractHandle")
            .field("address", &self.address)
            .field("methods", &self.methods.len())
            .field("events", &self.events.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockProvider;

    fn erc20_abi() -> JsonAbi {
        serde_json::from_str(crate::testing::ERC20_ABI).unwrap()
    }

    #[test]
    fn test_empty_abi_rejected() {
        let provider = Arc::new(MockProvider::default());
        let abi: JsonAbi = serde_json::from_str("[]").unwrap();
        let err = ContractHandle::new(provider, abi, None).unwrap_err();
        assert!(err.to_string().contains("missing abi"));
    }

    #[test]
    fn test_non_empty_abi_accepted() {
        let provider = Arc::new(MockProvider::default());
        let handle = ContractHandle::new(provider, erc20_abi(), None).unwrap();
        assert!(handle.address().is_none());
        assert_eq!(handle.methods().len(), 2);
    }

    #[tokio::test]
    async fn test_manual_options_fail_without_network() {
        let provider = Arc::new(MockProvider::default());
        let mut handle =
            ContractHandle::new(provider.clone(), erc20_abi(), Some(Address::ZERO)).unwrap();
        handle.options_mut().auto = false;
        handle.options_mut().gas_price = Some(7);

        let err = handle
            .compute_tx_options("transfer", &transfer_args(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(provider.estimate_gas_calls(), 0);
        assert_eq!(provider.gas_price_calls(), 0);
    }

    #[tokio::test]
    async fn test_auto_options_query_once_each() {
        let provider = Arc::new(MockProvider::default().with_gas_estimate(100_000));
        let mut handle =
            ContractHandle::new(provider.clone(), erc20_abi(), Some(Address::ZERO)).unwrap();
        handle.options_mut().gas_factor = 1.5;

        let params = handle
            .compute_tx_options("transfer", &transfer_args(), None, None)
            .await
            .unwrap();
        assert_eq!(provider.gas_price_calls(), 1);
        assert_eq!(provider.estimate_gas_calls(), 1);
        assert_eq!(params.gas, Some(150_000));
    }

    #[tokio::test]
    async fn test_cached_gas_wins() {
        let provider = Arc::new(MockProvider::default().with_gas_estimate(100_000));
        let mut handle =
            ContractHandle::new(provider.clone(), erc20_abi(), Some(Address::ZERO)).unwrap();
        handle.options_mut().gas = Some(42_000);

        let params = handle
            .compute_tx_options("transfer", &transfer_args(), None, None)
            .await
            .unwrap();
        // Price and amount still refresh; the cached limit is untouched.
        assert_eq!(provider.gas_price_calls(), 1);
        assert_eq!(provider.estimate_gas_calls(), 1);
        assert_eq!(params.gas, Some(42_000));
    }

    #[tokio::test]
    async fn test_call_decodes_output() {
        let mut word = [0u8; 32];
        word[31] = 42;
        let provider = Arc::new(MockProvider::default().with_call_output(word.to_vec()));
        let handle =
            ContractHandle::new(provider.clone(), erc20_abi(), Some(Address::ZERO)).unwrap();

        let values = handle
            .call("balanceOf", &[DynSolValue::Address(Address::ZERO)])
            .await
            .unwrap();
        assert_eq!(values[0].as_uint().unwrap().0, U256::from(42u64));
        assert_eq!(provider.call_calls(), 1);
    }

    #[tokio::test]
    async fn test_call_requires_address() {
        let provider = Arc::new(MockProvider::default());
        let handle = ContractHandle::new(provider, erc20_abi(), None).unwrap();
        let err = handle
            .call("balanceOf", &[DynSolValue::Address(Address::ZERO)])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("contract address is not set"));
    }

    fn transfer_args() -> Vec<DynSolValue> {
        vec![
            DynSolValue::Address(Address::repeat_byte(0x22)),
            DynSolValue::Uint(U256::from(1u64), 256),
        ]
    }
}
