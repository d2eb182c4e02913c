//! Send routing: signed vs. delegated paths, dispatch strategies, deploy

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alloy::rpc::types::TransactionReceipt;
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use evoke::config::ConnectionOptions;
use evoke::dispatch::{DispatchStrategy, PendingTx};
use evoke::domain::abi::Artifact;
use evoke::testing::{empty_receipt, MockProvider, ERC20_ABI};
use evoke::{Connection, ContractModel, Error, SendIntent};

const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

fn artifact() -> Artifact {
    Artifact::from_json_str(ERC20_ABI).unwrap()
}

fn artifact_with_bytecode() -> Artifact {
    let json = format!(r#"{{"abi":{ERC20_ABI},"bytecode":"0x600160015500"}}"#);
    Artifact::from_json_str(&json).unwrap()
}

fn transfer_intent() -> SendIntent {
    SendIntent::new("transfer")
        .arg(DynSolValue::Address(Address::repeat_byte(0x22)))
        .arg(DynSolValue::Uint(U256::from(10u64), 256))
}

fn model_with(provider: Arc<MockProvider>, key: Option<&str>) -> ContractModel {
    let mut options = ConnectionOptions::default();
    options.private_key = key.map(str::to_string);
    let connection = Connection::new(options).with_provider(provider);
    ContractModel::new(connection, artifact(), Some(Address::repeat_byte(0x01))).unwrap()
}

#[tokio::test]
async fn test_key_routes_through_signed_path() {
    let provider = Arc::new(MockProvider::default());
    let mut model = model_with(provider.clone(), Some(DEV_KEY));

    let receipt = model.send_tx(transfer_intent()).await.unwrap();
    assert!(receipt.success());

    // Locally signed: the raw broadcast is used, never the provider's own
    // account machinery.
    assert_eq!(provider.send_raw_calls(), 1);
    assert_eq!(provider.send_transaction_calls(), 0);
    // Signing pulled nonce and chain id from the network.
    assert_eq!(provider.transaction_count_calls(), 1);
}

#[tokio::test]
async fn test_no_key_routes_through_unsigned_path() {
    let provider = Arc::new(
        MockProvider::default().with_accounts(vec![Address::repeat_byte(0x77)]),
    );
    let mut model = model_with(provider.clone(), None);

    let receipt = model.send_tx(transfer_intent()).await.unwrap();
    assert!(receipt.success());

    assert_eq!(provider.send_transaction_calls(), 1);
    assert_eq!(provider.send_raw_calls(), 0);
    // The sender came from the provider's account-request call.
    assert_eq!(provider.request_accounts_calls(), 1);
}

#[tokio::test]
async fn test_unsigned_path_without_accounts_fails() {
    let provider = Arc::new(MockProvider::default());
    let mut model = model_with(provider, None);

    let err = model.send_tx(transfer_intent()).await.unwrap_err();
    assert!(matches!(err, Error::Environment(_)));
}

struct RecordingStrategy {
    calls: Arc<AtomicUsize>,
    verdict: Result<(), String>,
}

#[async_trait]
impl DispatchStrategy for RecordingStrategy {
    async fn drive(
        &self,
        pending: PendingTx,
        _debug: bool,
    ) -> Result<TransactionReceipt, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Never consult the transport outcome.
        let _ = pending.hash();
        match &self.verdict {
            Ok(()) => Ok(empty_receipt()),
            Err(message) => Err(Error::provider(message)),
        }
    }
}

#[tokio::test]
async fn test_custom_strategy_invoked_once_and_decides_outcome() {
    // The mock would fail every send; the strategy overrides that to
    // success.
    let provider = Arc::new(MockProvider::default().failing_send());
    let calls = Arc::new(AtomicUsize::new(0));
    let strategy = Arc::new(RecordingStrategy {
        calls: calls.clone(),
        verdict: Ok(()),
    });

    let mut model = model_with(provider, Some(DEV_KEY)).with_dispatch_strategy(strategy);
    let receipt = model.send_tx(transfer_intent()).await.unwrap();
    assert!(receipt.success());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_custom_strategy_rejection_wins() {
    // The mock would succeed; the strategy rejects.
    let provider = Arc::new(MockProvider::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let strategy = Arc::new(RecordingStrategy {
        calls: calls.clone(),
        verdict: Err("vetoed".to_string()),
    });

    let mut model = model_with(provider, Some(DEV_KEY)).with_dispatch_strategy(strategy);
    let err = model.send_tx(transfer_intent()).await.unwrap_err();
    assert!(err.to_string().contains("vetoed"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_send_failure_propagates() {
    let provider = Arc::new(MockProvider::default().failing_send());
    let mut model = model_with(provider, Some(DEV_KEY));

    let err = model.send_tx(transfer_intent()).await.unwrap_err();
    assert!(matches!(err, Error::Provider(_)));
}

#[tokio::test]
async fn test_deploy_adopts_contract_address() {
    let deployed = Address::repeat_byte(0x5a);
    let mut receipt = empty_receipt();
    receipt.contract_address = Some(deployed);

    let provider = Arc::new(MockProvider::default().with_receipt(receipt));
    let connection = Connection::new(
        ConnectionOptions::default().with_private_key(DEV_KEY),
    )
    .with_provider(provider.clone());
    let mut model = ContractModel::new(connection, artifact_with_bytecode(), None).unwrap();

    let outcome = model.deploy(Vec::new()).await.unwrap();
    assert_eq!(outcome.contract_address(), Some(deployed));
    // The model re-bound itself to the new address.
    assert_eq!(model.address(), Some(deployed));
    assert_eq!(model.handle().unwrap().address(), Some(deployed));
    assert_eq!(provider.send_raw_calls(), 1);
}

#[tokio::test]
async fn test_deploy_without_bytecode_fails() {
    let provider = Arc::new(MockProvider::default());
    let mut model = model_with(provider, Some(DEV_KEY));
    let err = model.deploy(Vec::new()).await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
