//! Staking contract wrapper
//!
//! Stake amounts are denominated in the staked token's units; the token's
//! decimal count is fixed at construction.

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::Address;

use crate::contract::DecodedReceipt;
use crate::domain::abi::Artifact;
use crate::domain::numeric;
use crate::error::Result;
use crate::infrastructure::ethereum::Connection;

use super::{uint_output, ContractModel, SendIntent};

pub struct Staking {
    model: ContractModel,
    token_decimals: u8,
}

impl Staking {
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

    pub async fn stake(&mut self, amount: &str) -> Result<DecodedReceipt> {
        let units = numeric::to_fixed(amount, self.token_decimals)?;
        self.model
            .send_tx(SendIntent::new("stake").arg(DynSolValue::Uint(units, 256)))
            .await
    }

    pub async fn unstake(&mut self, amount: &str) -> Result<DecodedReceipt> {
        let units = numeric::to_fixed(amount, self.token_decimals)?;
        self.model
            .send_tx(SendIntent::new("unstake").arg(DynSolValue::Uint(units, 256)))
            .await
    }

    pub async fn claim_rewards(&mut self) -> Result<DecodedReceipt> {
        self.model.send_tx(SendIntent::new("claimRewards")).await
    }

    pub async fn staked_balance_of(&mut self, owner: Address) -> Result<String> {
        let values = self
            .model
            .call_tx("stakedBalanceOf", &[DynSolValue::Address(owner)])
            .await?;
        Ok(numeric::from_fixed(
            uint_output(values, "stakedBalanceOf")?,
            self.token_decimals,
        ))
    }

    pub async fn total_staked(&mut self) -> Result<String> {
        let values = self.model.call_tx("totalStaked", &[]).await?;
        Ok(numeric::from_fixed(
            uint_output(values, "totalStaked")?,
            self.token_decimals,
        ))
    }
}
