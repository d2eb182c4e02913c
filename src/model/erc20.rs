//! ERC-20 token wrapper
//!
//! Amounts cross this boundary as decimal strings and are shifted through
//! the token's own decimal count.

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};

use crate::contract::DecodedReceipt;
use crate::domain::abi::Artifact;
use crate::domain::numeric;
use crate::error::Result;
use crate::infrastructure::ethereum::Connection;

use super::{string_output, uint_output, ContractModel, SendIntent};

pub struct Erc20 {
    model: ContractModel,
    decimals: Option<u8>,
}

impl Erc20 {
    pub fn new(connection: Connection, artifact: Artifact, address: Option<Address>) -> Result<Self> {
        Ok(Self {
            model: ContractModel::new(connection, artifact, address)?,
            decimals: None,
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

    pub async fn name(&mut self) -> Result<String> {
        let values = self.model.call_tx("name", &[]).await?;
        string_output(values, "name")
    }

    pub async fn symbol(&mut self) -> Result<String> {
        let values = self.model.call_tx("symbol", &[]).await?;
        string_output(values, "symbol")
    }

    /// The token's decimal count, queried once and cached.
    pub async fn decimals(&mut self) -> Result<u8> {
        if let Some(decimals) = self.decimals {
            return Ok(decimals);
        }
        let values = self.model.call_tx("decimals", &[]).await?;
        let decimals = uint_output(values, "decimals")?.to::<u8>();
        self.decimals = Some(decimals);
        Ok(decimals)
    }

    pub async fn total_supply(&mut self) -> Result<String> {
        let decimals = self.decimals().await?;
        let values = self.model.call_tx("totalSupply", &[]).await?;
        Ok(numeric::from_fixed(uint_output(values, "totalSupply")?, decimals))
    }

    pub async fn balance_of(&mut self, owner: Address) -> Result<String> {
        let decimals = self.decimals().await?;
        let values = self
            .model
            .call_tx("balanceOf", &[DynSolValue::Address(owner)])
            .await?;
        Ok(numeric::from_fixed(uint_output(values, "balanceOf")?, decimals))
    }

    pub async fn allowance(&mut self, owner: Address, spender: Address) -> Result<String> {
        let decimals = self.decimals().await?;
        let values = self
            .model
            .call_tx(
                "allowance",
                &[DynSolValue::Address(owner), DynSolValue::Address(spender)],
            )
            .await?;
        Ok(numeric::from_fixed(uint_output(values, "allowance")?, decimals))
    }

    pub async fn transfer(&mut self, to: Address, amount: &str) -> Result<DecodedReceipt> {
        let units = self.to_units(amount).await?;
        self.model
            .send_tx(
                SendIntent::new("transfer")
                    .arg(DynSolValue::Address(to))
                    .arg(DynSolValue::Uint(units, 256)),
            )
            .await
    }

    pub async fn approve(&mut self, spender: Address, amount: &str) -> Result<DecodedReceipt> {
        let units = self.to_units(amount).await?;
        self.model
            .send_tx(
                SendIntent::new("approve")
                    .arg(DynSolValue::Address(spender))
                    .arg(DynSolValue::Uint(units, 256)),
            )
            .await
    }

    pub async fn transfer_from(
        &mut self,
        from: Address,
        to: Address,
        amount: &str,
    ) -> Result<DecodedReceipt> {
        let units = self.to_units(amount).await?;
        self.model
            .send_tx(
                SendIntent::new("transferFrom")
                    .arg(DynSolValue::Address(from))
                    .arg(DynSolValue::Address(to))
                    .arg(DynSolValue::Uint(units, 256)),
            )
            .await
    }

    async fn to_units(&mut self, amount: &str) -> Result<U256> {
        let decimals = self.decimals().await?;
        numeric::to_fixed(amount, decimals)
    }
}
