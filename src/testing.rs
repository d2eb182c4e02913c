//! Test support: an in-memory provider with call counters
//!
//! Used by this crate's own tests and available to downstream tests that
//! need to exercise send/decode flows without a node.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use alloy::consensus::{Eip658Value, Receipt, ReceiptEnvelope, ReceiptWithBloom};
use alloy::rpc::types::{Log, TransactionReceipt, TransactionRequest};
use alloy_primitives::{keccak256, Address, Bloom, Bytes, B256, U256};
use async_trait::async_trait;

use crate::dispatch::PendingTx;
use crate::error::{Error, Result};
use crate::infrastructure::ethereum::EvmProvider;

/// Minimal ERC-20 ABI used across the test suite.
pub const ERC20_ABI: &str = r#"[
    {"type":"function","name":"transfer","inputs":[
        {"name":"to","type":"address"},{"name":"value","type":"uint256"}],
     "outputs":[{"name":"","type":"bool"}],"stateMutability":"nonpayable"},
    {"type":"function","name":"balanceOf","inputs":[
        {"name":"owner","type":"address"}],
     "outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"},
    {"type":"event","name":"Transfer","inputs":[
        {"name":"from","type":"address","indexed":true},
        {"name":"to","type":"address","indexed":true},
        {"name":"value","type":"uint256","indexed":false}],
     "anonymous":false}
]"#;

/// A successful receipt carrying the given logs.
pub fn receipt_with_logs(logs: Vec<Log>) -> TransactionReceipt {
    let receipt = Receipt {
        status: Eip658Value::Eip658(true),
        cumulative_gas_used: 21_000,
        logs,
    };
    TransactionReceipt {
        inner: ReceiptEnvelope::Legacy(ReceiptWithBloom {
            receipt,
            logs_bloom: Bloom::ZERO,
        }),
        transaction_hash: B256::ZERO,
        transaction_index: None,
        block_hash: None,
        block_number: Some(1),
        gas_used: 21_000,
        effective_gas_price: 1,
        blob_gas_used: None,
        blob_gas_price: None,
        from: Address::ZERO,
        to: None,
        contract_address: None,
    }
}

/// A successful receipt with no logs.
pub fn empty_receipt() -> TransactionReceipt {
    receipt_with_logs(Vec::new())
}

/// A log entry as a node would return it.
pub fn log_entry(emitter: Address, topics: Vec<B256>, data: Vec<u8>) -> Log {
    Log {
        inner: alloy_primitives::Log {
            address: emitter,
            data: alloy_primitives::LogData::new_unchecked(topics, Bytes::from(data)),
        },
        block_hash: None,
        block_number: None,
        block_timestamp: None,
        transaction_hash: None,
        transaction_index: None,
        log_index: None,
        removed: false,
    }
}

/// The 32-byte topic encoding of an address.
pub fn address_topic(address: Address) -> B256 {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_slice());
    B256::from(word)
}

#[derive(Default)]
struct Counters {
    gas_price: AtomicUsize,
    estimate_gas: AtomicUsize,
    accounts: AtomicUsize,
    request_accounts: AtomicUsize,
    transaction_count: AtomicUsize,
    call: AtomicUsize,
    send_raw: AtomicUsize,
    send_transaction: AtomicUsize,
}

/// In-memory provider: canned answers, per-method call counters.
pub struct MockProvider {
    chain_id: u64,
    gas_price: u128,
    gas_estimate: u64,
    accounts: Vec<Address>,
    balance: U256,
    call_output: Mutex<Bytes>,
    receipt: Mutex<TransactionReceipt>,
    fail_send: bool,
    /// Last request handed to `estimate_gas`, for shape assertions.
    pub last_estimate: Mutex<Option<TransactionRequest>>,
    counters: Counters,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            chain_id: 31_337,
            gas_price: 1_000_000_000,
            gas_estimate: 21_000,
            accounts: Vec::new(),
            balance: U256::ZERO,
            call_output: Mutex::new(Bytes::new()),
            receipt: Mutex::new(empty_receipt()),
            fail_send: false,
            last_estimate: Mutex::new(None),
            counters: Counters::default(),
        }
    }
}

impl MockProvider {
    pub fn with_gas_price(mut self, price: u128) -> Self {
        self.gas_price = price;
        self
    }

    pub fn with_gas_estimate(mut self, estimate: u64) -> Self {
        self.gas_estimate = estimate;
        self
    }

    pub fn with_accounts(mut self, accounts: Vec<Address>) -> Self {
        self.accounts = accounts;
        self
    }

    pub fn with_balance(mut self, balance: U256) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_call_output(self, output: Vec<u8>) -> Self {
        *self.call_output.lock().expect("mock lock") = Bytes::from(output);
        self
    }

    pub fn with_receipt(self, receipt: TransactionReceipt) -> Self {
        *self.receipt.lock().expect("mock lock") = receipt;
        self
    }

    /// Every send resolves its pending transaction with an error.
    pub fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    pub fn gas_price_calls(&self) -> usize {
        self.counters.gas_price.load(Ordering::SeqCst)
    }

    pub fn estimate_gas_calls(&self) -> usize {
        self.counters.estimate_gas.load(Ordering::SeqCst)
    }

    pub fn accounts_calls(&self) -> usize {
        self.counters.accounts.load(Ordering::SeqCst)
    }

    pub fn request_accounts_calls(&self) -> usize {
        self.counters.request_accounts.load(Ordering::SeqCst)
    }

    pub fn transaction_count_calls(&self) -> usize {
        self.counters.transaction_count.load(Ordering::SeqCst)
    }

    pub fn call_calls(&self) -> usize {
        self.counters.call.load(Ordering::SeqCst)
    }

    pub fn send_raw_calls(&self) -> usize {
        self.counters.send_raw.load(Ordering::SeqCst)
    }

    pub fn send_transaction_calls(&self) -> usize {
        self.counters.send_transaction.load(Ordering::SeqCst)
    }

    fn pending(&self, hash: B256) -> PendingTx {
        if self.fail_send {
            return PendingTx::new(hash, async move {
                Err(Error::provider("mock send failure"))
            });
        }
        let receipt = self.receipt.lock().expect("mock lock").clone();
        PendingTx::new(hash, async move { Ok(receipt) })
    }
}

#[async_trait]
impl EvmProvider for MockProvider {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.chain_id)
    }

    async fn block_number(&self) -> Result<u64> {
        Ok(1)
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        self.counters.accounts.fetch_add(1, Ordering::SeqCst);
        Ok(self.accounts.clone())
    }

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        self.counters.request_accounts.fetch_add(1, Ordering::SeqCst);
        Ok(self.accounts.clone())
    }

    async fn balance_of(&self, _address: Address) -> Result<U256> {
        Ok(self.balance)
    }

    async fn gas_price(&self) -> Result<u128> {
        self.counters.gas_price.fetch_add(1, Ordering::SeqCst);
        Ok(self.gas_price)
    }

    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64> {
        self.counters.estimate_gas.fetch_add(1, Ordering::SeqCst);
        *self.last_estimate.lock().expect("mock lock") = Some(tx);
        Ok(self.gas_estimate)
    }

    async fn transaction_count(&self, _address: Address) -> Result<u64> {
        self.counters.transaction_count.fetch_add(1, Ordering::SeqCst);
        Ok(0)
    }

    async fn call(&self, _tx: TransactionRequest) -> Result<Bytes> {
        self.counters.call.fetch_add(1, Ordering::SeqCst);
        Ok(self.call_output.lock().expect("mock lock").clone())
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<PendingTx> {
        self.counters.send_raw.fetch_add(1, Ordering::SeqCst);
        Ok(self.pending(keccak256(&raw)))
    }

    async fn send_transaction(&self, _tx: TransactionRequest) -> Result<PendingTx> {
        self.counters.send_transaction.fetch_add(1, Ordering::SeqCst);
        Ok(self.pending(B256::repeat_byte(0x42)))
    }

    fn endpoint(&self) -> String {
        "mock".to_string()
    }
}
