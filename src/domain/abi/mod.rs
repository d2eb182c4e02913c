//! ABI domain models
//!
//! Artifacts, the name-indexed method registry, and event descriptors with
//! receipt-log decoding. Everything here is pure data transformation - no
//! network access.

mod artifact;
mod events;
mod methods;

pub use artifact::Artifact;
pub use events::{
    decode_logs, decode_with, event_table, DecodedArg, DecodedEvent, DecodedLog, EventDescriptor,
    EventParam,
};
pub use methods::{MethodDescriptor, MethodRegistry};
