//! Shared transaction options
//!
//! One mutable record per contract handle. Callers may adjust it between
//! sends; whatever is cached at computation time is what the next send
//! uses. The handle performs no locking of its own.

/// Gas parameters for outgoing transactions.
#[derive(Debug, Clone)]
pub struct TxOptions {
    /// Gas limit. When unset (or zero) under `auto`, it is derived as
    /// `round(gas_amount * gas_factor)`. A cached non-zero value is treated
    /// as a manual override and is never recomputed.
    pub gas: Option<u64>,
    /// Gas price in wei. Under `auto`, defaulted from a live network query
    /// when unset.
    pub gas_price: Option<u128>,
    /// Latest gas estimate for the method being sent. Under `auto`,
    /// defaulted from the provider's estimate when unset.
    pub gas_amount: Option<u64>,
    /// Multiplier applied to `gas_amount` when deriving `gas`.
    pub gas_factor: f64,
    /// When false, `gas` and `gas_price` must both be pre-set; nothing is
    /// queried from the network.
    pub auto: bool,
}

impl Default for TxOptions {
    fn default() -> Self {
        Self {
            gas: None,
            gas_price: None,
            gas_amount: None,
            gas_factor: 1.0,
            auto: true,
        }
    }
}

impl TxOptions {
    /// Manual options: auto-computation disabled, both values pinned.
    pub fn manual(gas: u64, gas_price: u128) -> Self {
        Self {
            gas: Some(gas),
            gas_price: Some(gas_price),
            gas_amount: None,
            gas_factor: 1.0,
            auto: false,
        }
    }

    /// Forget cached values so the next computation re-queries everything.
    pub fn reset_cached(&mut self) {
        self.gas = None;
        self.gas_price = None;
        self.gas_amount = None;
    }
}

/// The populated subset of gas parameters attached to one send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxParams {
    pub gas: Option<u64>,
    pub gas_price: Option<u128>,
}
