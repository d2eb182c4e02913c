//! Method registry - typed invocation descriptors derived from an ABI
//!
//! Built once per ABI at binding time so call sites never rescan the
//! descriptor list. Overloaded names resolve to the first declaration, the
//! same rule the selector registry applies elsewhere.

use std::collections::HashMap;

use alloy_dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::{keccak256, Bytes};

use crate::error::{Error, Result};

/// One callable contract function.
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    /// Function name as declared in the ABI.
    pub name: String,
    /// Canonical signature, e.g. `transfer(address,uint256)`.
    pub signature: String,
    /// 4-byte call selector.
    pub selector: [u8; 4],
    /// The full ABI entry, used for input encoding and output decoding.
    pub function: Function,
}

impl MethodDescriptor {
    /// Selector as a `0x`-prefixed hex string.
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector))
    }
}

/// Name-indexed table of an ABI's functions.
#[derive(Debug, Clone, Default)]
pub struct MethodRegistry {
    methods: HashMap<String, MethodDescriptor>,
}

impl MethodRegistry {
    /// Derive the registry from an ABI. First declaration wins per name.
    pub fn from_abi(abi: &JsonAbi) -> Self {
        let mut methods = HashMap::new();
        for function in abi.functions() {
            let signature = function.signature();
            let descriptor = MethodDescriptor {
                name: function.name.clone(),
                selector: compute_selector(&signature),
                signature,
                function: function.clone(),
            };
            methods.entry(function.name.clone()).or_insert(descriptor);
        }
        Self { methods }
    }

    pub fn get(&self, name: &str) -> Result<&MethodDescriptor> {
        self.methods.get(name).ok_or_else(|| {
            let mut known: Vec<&str> = self.methods.keys().map(String::as_str).collect();
            known.sort_unstable();
            Error::abi(format!(
                "unknown method '{name}'; ABI declares: {}",
                known.join(", ")
            ))
        })
    }

    /// Encode selector + arguments into calldata.
    pub fn encode_input(&self, name: &str, args: &[DynSolValue]) -> Result<Bytes> {
        let descriptor = self.get(name)?;
        if descriptor.function.inputs.len() != args.len() {
            return Err(Error::abi(format!(
                "{} takes {} argument(s), got {}",
                descriptor.signature,
                descriptor.function.inputs.len(),
                args.len()
            )));
        }
        let encoded = descriptor
            .function
            .abi_encode_input(args)
            .map_err(|e| Error::abi(format!("cannot encode {}: {e}", descriptor.signature)))?;
        Ok(encoded.into())
    }

    /// Decode a call's return data against the function's output types.
    pub fn decode_output(&self, name: &str, data: &[u8]) -> Result<Vec<DynSolValue>> {
        let descriptor = self.get(name)?;
        if data.is_empty() && descriptor.function.outputs.is_empty() {
            return Ok(Vec::new());
        }
        descriptor
            .function
            .abi_decode_output(data)
            .map_err(|e| Error::abi(format!("cannot decode {} output: {e}", descriptor.signature)))
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.values()
    }
}

fn compute_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};

    fn erc20_abi() -> JsonAbi {
        serde_json::from_str(
            r#"[
                {"type":"function","name":"transfer","inputs":[
                    {"name":"to","type":"address"},{"name":"value","type":"uint256"}],
                 "outputs":[{"name":"","type":"bool"}],"stateMutability":"nonpayable"},
                {"type":"function","name":"balanceOf","inputs":[
                    {"name":"owner","type":"address"}],
                 "outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_registry_selectors() {
        let registry = MethodRegistry::from_abi(&erc20_abi());
        assert_eq!(registry.len(), 2);
        let transfer = registry.get("transfer").unwrap();
        assert_eq!(transfer.selector, [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(transfer.selector_hex(), "0xa9059cbb");
        assert_eq!(transfer.signature, "transfer(address,uint256)");
    }

    #[test]
    fn test_encode_input() {
        let registry = MethodRegistry::from_abi(&erc20_abi());
        let args = [
            DynSolValue::Address(Address::repeat_byte(0x11)),
            DynSolValue::Uint(U256::from(1000u64), 256),
        ];
        let data = registry.encode_input("transfer", &args).unwrap();
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(data.len(), 4 + 32 + 32);
    }

    #[test]
    fn test_arity_mismatch() {
        let registry = MethodRegistry::from_abi(&erc20_abi());
        let err = registry.encode_input("transfer", &[]).unwrap_err();
        assert!(err.to_string().contains("takes 2 argument(s)"));
    }

    #[test]
    fn test_unknown_method() {
        let registry = MethodRegistry::from_abi(&erc20_abi());
        let err = registry.get("mint").unwrap_err();
        assert!(err.to_string().contains("unknown method 'mint'"));
    }

    #[test]
    fn test_decode_output() {
        let registry = MethodRegistry::from_abi(&erc20_abi());
        let mut word = [0u8; 32];
        word[31] = 42;
        let values = registry.decode_output("balanceOf", &word).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].as_uint().unwrap().0, U256::from(42u64));
    }
}
