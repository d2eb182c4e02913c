//! Compiled contract artifacts
//!
//! Artifacts are the compiler's JSON output, consumed read-only. Both the
//! raw ABI-array form and the wrapped `{ "abi": [...], "bytecode": ... }`
//! form are accepted.

use std::fs;
use std::path::Path;

use alloy_json_abi::JsonAbi;
use alloy_primitives::{hex as phex, Bytes};
use serde::Deserialize;

use crate::error::{Error, Result};

/// A contract artifact: the ABI plus, optionally, deployable bytecode.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub abi: JsonAbi,
    pub bytecode: Option<Bytes>,
}

#[derive(Debug, Deserialize)]
struct WrappedArtifact {
    abi: JsonAbi,
    #[serde(default)]
    bytecode: Option<BytecodeField>,
}

/// Bytecode appears either as a bare hex string or as solc's
/// `{ "object": "0x..." }` record.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    Plain(String),
    Object { object: String },
}

impl BytecodeField {
    fn into_bytes(self) -> Result<Bytes> {
        let raw = match self {
            BytecodeField::Plain(s) => s,
            BytecodeField::Object { object } => object,
        };
        phex::decode(raw.trim())
            .map(Bytes::from)
            .map_err(|e| Error::abi(format!("invalid bytecode hex: {e}")))
    }
}

impl Artifact {
    /// Build an artifact from an in-memory ABI, with no bytecode.
    pub fn from_abi(abi: JsonAbi) -> Self {
        Self { abi, bytecode: None }
    }

    /// Parse an artifact from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| Error::abi(format!("invalid artifact JSON: {e}")))?;

        if value.is_array() {
            let abi: JsonAbi = serde_json::from_value(value)
                .map_err(|e| Error::abi(format!("invalid ABI: {e}")))?;
            return Ok(Self { abi, bytecode: None });
        }

        let wrapped: WrappedArtifact = serde_json::from_value(value)
            .map_err(|e| Error::abi(format!("invalid artifact: {e}")))?;
        let bytecode = wrapped.bytecode.map(BytecodeField::into_bytes).transpose()?;
        Ok(Self { abi: wrapped.abi, bytecode })
    }

    /// Load an artifact from a JSON file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::abi(format!("cannot read artifact {}: {e}", path.display())))?;
        Self::from_json_str(&content)
    }

    /// An artifact with no ABI entries cannot drive a contract.
    pub fn is_empty(&self) -> bool {
        self.abi.items().next().is_none()
    }
}
