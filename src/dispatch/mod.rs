//! Transaction dispatch
//!
//! A submitted transaction moves through `Built -> Submitted -> Confirmed |
//! Failed`, driven by the provider's own pending-transaction events; there
//! is no polling loop here. The strategy seam lets a caller replace the
//! entire lifecycle handling - test harnesses resolve synchronously, UIs
//! hook progress reporting - and a supplied strategy's outcome is the sole
//! outcome of the send.

use alloy::rpc::types::TransactionReceipt;
use alloy_primitives::B256;
use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Confirmations to observe before a receipt is considered final.
pub const REQUIRED_CONFIRMATIONS: u64 = 1;

/// A transaction accepted for broadcast, not yet confirmed.
///
/// Wraps the transport's asynchronous receipt path; dropping it abandons
/// the wait but cannot recall the transaction.
pub struct PendingTx {
    hash: B256,
    receipt: BoxFuture<'static, Result<TransactionReceipt>>,
}

impl PendingTx {
    pub fn new(
        hash: B256,
        receipt: impl std::future::Future<Output = Result<TransactionReceipt>> + Send + 'static,
    ) -> Self {
        Self {
            hash,
            receipt: Box::pin(receipt),
        }
    }

    /// Hash assigned at broadcast time.
    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// Wait for the confirmation-or-failure outcome.
    pub async fn receipt(self) -> Result<TransactionReceipt> {
        self.receipt.await
    }
}

impl std::fmt::Debug for PendingTx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingTx").field("hash", &self.hash).finish()
    }
}

/// Strategy seam over the pending-transaction lifecycle.
///
/// `drive` is invoked exactly once per send and its return value is the
/// outcome of the whole operation.
#[async_trait]
pub trait DispatchStrategy: Send + Sync {
    async fn drive(&self, pending: PendingTx, debug: bool) -> Result<TransactionReceipt>;
}

/// Default strategy: await the receipt event, surface the error event.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReceiptDispatch;

#[async_trait]
impl DispatchStrategy for ReceiptDispatch {
    async fn drive(&self, pending: PendingTx, debug_enabled: bool) -> Result<TransactionReceipt> {
        let hash = pending.hash();
        match pending.receipt().await {
            Ok(receipt) => {
                if debug_enabled {
                    debug!(
                        tx = %hash,
                        block = ?receipt.block_number,
                        gas_used = receipt.gas_used,
                        "transaction confirmed"
                    );
                }
                Ok(receipt)
            }
            Err(err) => {
                if debug_enabled {
                    warn!(tx = %hash, error = %err, "transaction failed");
                }
                Err(err)
            }
        }
    }
}

/// Drive a pending transaction through the supplied strategy, or the
/// default one.
pub async fn drive(
    strategy: Option<&dyn DispatchStrategy>,
    pending: PendingTx,
    debug_enabled: bool,
) -> Result<TransactionReceipt> {
    match strategy {
        Some(strategy) => strategy.drive(pending, debug_enabled).await,
        None => ReceiptDispatch.drive(pending, debug_enabled).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn failing_pending() -> PendingTx {
        PendingTx::new(B256::repeat_byte(0x11), async {
            Err(Error::provider("broadcast rejected"))
        })
    }

    struct CountingStrategy {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DispatchStrategy for CountingStrategy {
        async fn drive(&self, pending: PendingTx, _debug: bool) -> Result<TransactionReceipt> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Swallow the transport outcome entirely.
            let _ = pending.hash();
            Err(Error::provider("strategy says no"))
        }
    }

    #[tokio::test]
    async fn test_default_dispatch_propagates_error() {
        let err = drive(None, failing_pending(), false).await.unwrap_err();
        assert!(err.to_string().contains("broadcast rejected"));
    }

    #[tokio::test]
    async fn test_custom_strategy_is_sole_outcome() {
        let calls = Arc::new(AtomicUsize::new(0));
        let strategy = CountingStrategy { calls: calls.clone() };

        // The pending transaction would succeed; the strategy overrides it.
        let pending = PendingTx::new(B256::ZERO, async {
            Err(Error::provider("unreached"))
        });
        let err = drive(Some(&strategy), pending, false).await.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(err.to_string().contains("strategy says no"));
    }
}
