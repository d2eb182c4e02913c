//! Bounty network wrapper
//!
//! Bounties escrow a settlement token; amounts are denominated in that
//! token's units.

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};

use crate::contract::DecodedReceipt;
use crate::domain::abi::Artifact;
use crate::domain::numeric;
use crate::error::Result;
use crate::infrastructure::ethereum::Connection;

use super::{address_output, uint_output, ContractModel, SendIntent};

pub struct Network {
    model: ContractModel,
    token_decimals: u8,
}

impl Network {
    pub fn new(
        connection: Connection,
        artifact: Artifact,
        address: Option<Address>,
        token_decimals: u8,
    ) -> Result<Self> {
        Ok(Self {
            model: ContractModel::new(connection, artifact, address)?,
            token_decimals,
        })
    }

    pub fn model(&self) -> &ContractModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut ContractModel {
        &mut self.model
    }

    pub async fn start(&mut self) -> Result<()> {
        self.model.start().await
    }

    pub async fn load(&mut self) -> Result<()> {
        self.model.load().await
    }

    /// Open a bounty funded with `amount` settlement tokens; `cid` points
    /// at the off-chain description.
    pub async fn open_bounty(&mut self, cid: &str, amount: &str) -> Result<DecodedReceipt> {
        let units = numeric::to_fixed(amount, self.token_decimals)?;
        self.model
            .send_tx(
                SendIntent::new("openBounty")
                    .arg(DynSolValue::String(cid.to_string()))
                    .arg(DynSolValue::Uint(units, 256)),
            )
            .await
    }

    pub async fn cancel_bounty(&mut self, bounty_id: U256) -> Result<DecodedReceipt> {
        self.model
            .send_tx(SendIntent::new("cancelBounty").arg(DynSolValue::Uint(bounty_id, 256)))
            .await
    }

    pub async fn close_bounty(
        &mut self,
        bounty_id: U256,
        proposal_id: U256,
    ) -> Result<DecodedReceipt> {
        self.model
            .send_tx(
                SendIntent::new("closeBounty")
                    .arg(DynSolValue::Uint(bounty_id, 256))
                    .arg(DynSolValue::Uint(proposal_id, 256)),
            )
            .await
    }

    pub async fn bounties_total(&mut self) -> Result<U256> {
        let values = self.model.call_tx("bountiesTotal", &[]).await?;
        uint_output(values, "bountiesTotal")
    }

    pub async fn settler_token(&mut self) -> Result<Address> {
        let values = self.model.call_tx("settlerToken", &[]).await?;
        address_output(values, "settlerToken")
    }
}
