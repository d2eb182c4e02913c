//! Event descriptors and receipt-log decoding
//!
//! Descriptors are derived from the ABI's `event` entries; each carries the
//! keccak hash of its canonical signature, matched against a log's first
//! topic. Decoding decorates copies of the log entries - the upstream
//! receipt data is never mutated.

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_json_abi::JsonAbi;
use alloy_primitives::{keccak256, Address, B256};
use alloy::rpc::types::Log;

use crate::error::{Error, Result};

/// One event input parameter.
#[derive(Debug, Clone)]
pub struct EventParam {
    pub name: String,
    pub kind: String,
    pub indexed: bool,
}

/// One decodable event, with its precomputed topic hash.
#[derive(Debug, Clone)]
pub struct EventDescriptor {
    pub name: String,
    /// Canonical signature, e.g. `Transfer(address,address,uint256)`.
    pub signature: String,
    /// keccak256 of the signature; a log's first topic under normal emission.
    pub topic: B256,
    pub anonymous: bool,
    pub inputs: Vec<EventParam>,
}

/// Derive the descriptor table from an ABI, in declaration order.
pub fn event_table(abi: &JsonAbi) -> Vec<EventDescriptor> {
    abi.events()
        .map(|event| {
            let signature = event.signature();
            EventDescriptor {
                name: event.name.clone(),
                topic: keccak256(signature.as_bytes()),
                signature,
                anonymous: event.anonymous,
                inputs: event
                    .inputs
                    .iter()
                    .map(|input| EventParam {
                        name: input.name.clone(),
                        kind: input.ty.to_string(),
                        indexed: input.indexed,
                    })
                    .collect(),
            }
        })
        .collect()
}

/// A decoded event argument, ordered as the ABI declares them.
#[derive(Debug, Clone)]
pub struct DecodedArg {
    pub name: String,
    pub kind: String,
    pub value: DynSolValue,
}

/// A log entry resolved against an event descriptor.
#[derive(Debug, Clone)]
pub struct DecodedEvent {
    pub name: String,
    pub args: Vec<DecodedArg>,
}

impl DecodedEvent {
    /// Look an argument up by its declared name.
    pub fn arg(&self, name: &str) -> Option<&DynSolValue> {
        self.args.iter().find(|a| a.name == name).map(|a| &a.value)
    }
}

/// A receipt log, decorated with its decoded event when one matched.
#[derive(Debug, Clone)]
pub struct DecodedLog {
    /// The original log entry, untouched.
    pub log: Log,
    pub decoded: Option<DecodedEvent>,
}

impl DecodedLog {
    pub fn event(&self) -> Option<&str> {
        self.decoded.as_ref().map(|d| d.name.as_str())
    }
}

/// Decode every log against the descriptor table in a single pass.
///
/// A log matches the first descriptor whose topic equals its first topic;
/// when `bound` is set, logs emitted by other addresses are left
/// undecorated. Processing never short-circuits across entries.
pub fn decode_logs(
    table: &[EventDescriptor],
    bound: Option<Address>,
    logs: &[Log],
) -> Result<Vec<DecodedLog>> {
    let mut decoded = Vec::with_capacity(logs.len());
    for log in logs {
        let address_ok = bound.map_or(true, |addr| log.address() == addr);
        let matched = if address_ok {
            match log.topics().first() {
                Some(first) => table.iter().find(|desc| desc.topic == *first),
                None => None,
            }
        } else {
            None
        };
        let event = match matched {
            Some(desc) => Some(decode_with(desc, log)?),
            None => None,
        };
        decoded.push(DecodedLog {
            log: log.clone(),
            decoded: event,
        });
    }
    Ok(decoded)
}

/// Decode one log entry against one descriptor.
///
/// Indexed inputs come from the topics (skipping the signature topic unless
/// the event is anonymous); the rest decode from the data section as a
/// tuple. Dynamic indexed values arrive pre-hashed on chain, so they are
/// surfaced as the raw 32-byte topic word.
pub fn decode_with(desc: &EventDescriptor, log: &Log) -> Result<DecodedEvent> {
    let mut topics = log.topics().iter();
    if !desc.anonymous {
        topics.next();
    }

    let mut args: Vec<Option<DecodedArg>> = Vec::with_capacity(desc.inputs.len());
    let mut body_types = Vec::new();
    let mut body_slots = Vec::new();

    for (slot, input) in desc.inputs.iter().enumerate() {
        let ty: DynSolType = input
            .kind
            .parse()
            .map_err(|e| Error::abi(format!("bad type '{}' in {}: {e}", input.kind, desc.signature)))?;
        if input.indexed {
            let topic = topics.next().ok_or_else(|| {
                Error::abi(format!("{} log is missing an indexed topic", desc.signature))
            })?;
            args.push(Some(DecodedArg {
                name: arg_name(&input.name, slot),
                kind: input.kind.clone(),
                value: decode_topic(&ty, topic)?,
            }));
        } else {
            body_types.push(ty);
            body_slots.push(slot);
            args.push(None);
        }
    }

    if !body_types.is_empty() {
        let tuple = DynSolType::Tuple(body_types)
            .abi_decode(log.data().data.as_ref())
            .map_err(|e| Error::abi(format!("cannot decode {} data: {e}", desc.signature)))?;
        let values = match tuple {
            DynSolValue::Tuple(values) => values,
            other => vec![other],
        };
        for (slot, value) in body_slots.into_iter().zip(values) {
            let input = &desc.inputs[slot];
            args[slot] = Some(DecodedArg {
                name: arg_name(&input.name, slot),
                kind: input.kind.clone(),
                value,
            });
        }
    }

    Ok(DecodedEvent {
        name: desc.name.clone(),
        args: args.into_iter().flatten().collect(),
    })
}

/// Whether a topic word carries the hash of the value rather than the value.
fn topic_is_hashed(ty: &DynSolType) -> bool {
    matches!(
        ty,
        DynSolType::String
            | DynSolType::Bytes
            | DynSolType::Array(_)
            | DynSolType::FixedArray(_, _)
            | DynSolType::Tuple(_)
    )
}

fn decode_topic(ty: &DynSolType, topic: &B256) -> Result<DynSolValue> {
    if topic_is_hashed(ty) {
        return Ok(DynSolValue::FixedBytes(*topic, 32));
    }
    ty.abi_decode(topic.as_slice())
        .map_err(|e| Error::abi(format!("cannot decode indexed topic: {e}")))
}

fn arg_name(declared: &str, slot: usize) -> String {
    if declared.trim().is_empty() {
        format!("arg{slot}")
    } else {
        declared.to_string()
    }
}
