//! ERC-721 collectible wrapper

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};

use crate::contract::DecodedReceipt;
use crate::domain::abi::Artifact;
use crate::error::Result;
use crate::infrastructure::ethereum::Connection;

use super::{address_output, bool_output, string_output, uint_output, ContractModel, SendIntent};

pub struct Erc721 {
    model: ContractModel,
}

impl Erc721 {
    pub fn new(connection: Connection, artifact: Artifact, address: Option<Address>) -> Result<Self> {
        Ok(Self {
            model: ContractModel::new(connection, artifact, address)?,
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

    pub async fn balance_of(&mut self, owner: Address) -> Result<U256> {
        let values = self
            .model
            .call_tx("balanceOf", &[DynSolValue::Address(owner)])
            .await?;
        uint_output(values, "balanceOf")
    }

    pub async fn owner_of(&mut self, token_id: U256) -> Result<Address> {
        let values = self
            .model
            .call_tx("ownerOf", &[DynSolValue::Uint(token_id, 256)])
            .await?;
        address_output(values, "ownerOf")
    }

    pub async fn token_uri(&mut self, token_id: U256) -> Result<String> {
        let values = self
            .model
            .call_tx("tokenURI", &[DynSolValue::Uint(token_id, 256)])
            .await?;
        string_output(values, "tokenURI")
    }

    pub async fn get_approved(&mut self, token_id: U256) -> Result<Address> {
        let values = self
            .model
            .call_tx("getApproved", &[DynSolValue::Uint(token_id, 256)])
            .await?;
        address_output(values, "getApproved")
    }

    pub async fn is_approved_for_all(
        &mut self,
        owner: Address,
        operator: Address,
    ) -> Result<bool> {
        let values = self
            .model
            .call_tx(
                "isApprovedForAll",
                &[DynSolValue::Address(owner), DynSolValue::Address(operator)],
            )
            .await?;
        bool_output(values, "isApprovedForAll")
    }

    pub async fn approve(&mut self, to: Address, token_id: U256) -> Result<DecodedReceipt> {
        self.model
            .send_tx(
                SendIntent::new("approve")
                    .arg(DynSolValue::Address(to))
                    .arg(DynSolValue::Uint(token_id, 256)),
            )
            .await
    }

    pub async fn set_approval_for_all(
        &mut self,
        operator: Address,
        approved: bool,
    ) -> Result<DecodedReceipt> {
        self.model
            .send_tx(
                SendIntent::new("setApprovalForAll")
                    .arg(DynSolValue::Address(operator))
                    .arg(DynSolValue::Bool(approved)),
            )
            .await
    }

    pub async fn transfer_from(
        &mut self,
        from: Address,
        to: Address,
        token_id: U256,
    ) -> Result<DecodedReceipt> {
        self.model
            .send_tx(
                SendIntent::new("transferFrom")
                    .arg(DynSolValue::Address(from))
                    .arg(DynSolValue::Address(to))
                    .arg(DynSolValue::Uint(token_id, 256)),
            )
            .await
    }

    pub async fn mint(&mut self, to: Address, token_id: U256) -> Result<DecodedReceipt> {
        self.model
            .send_tx(
                SendIntent::new("mint")
                    .arg(DynSolValue::Address(to))
                    .arg(DynSolValue::Uint(token_id, 256)),
            )
            .await
    }
}
