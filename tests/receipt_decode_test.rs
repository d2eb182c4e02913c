//! Receipt-log decoding against the bound ABI

use std::sync::Arc;

use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::JsonAbi;
use alloy_primitives::{keccak256, Address, B256, U256};

use evoke::testing::{
    address_topic, empty_receipt, log_entry, receipt_with_logs, MockProvider, ERC20_ABI,
};
use evoke::ContractHandle;

fn transfer_topic() -> B256 {
    keccak256("Transfer(address,address,uint256)".as_bytes())
}

fn handle(address: Option<Address>) -> ContractHandle {
    let abi: JsonAbi = serde_json::from_str(ERC20_ABI).unwrap();
    ContractHandle::new(Arc::new(MockProvider::default()), abi, address).unwrap()
}

#[test]
fn test_logless_receipt_is_passthrough() {
    let handle = handle(None);
    let decoded = handle.decode_receipt_logs(empty_receipt()).unwrap();
    assert!(decoded.logs.is_empty());
    assert!(decoded.events().next().is_none());
    assert!(decoded.success());
}

#[test]
fn test_transfer_log_decodes_named_args() {
    let emitter = Address::repeat_byte(0x01);
    let from = Address::repeat_byte(0xaa);
    let to = Address::repeat_byte(0xbb);
    let value = U256::from(1_000_000u64);

    let log = log_entry(
        emitter,
        vec![transfer_topic(), address_topic(from), address_topic(to)],
        value.to_be_bytes_vec(),
    );
    let receipt = receipt_with_logs(vec![log]);

    let handle = handle(Some(emitter));
    let decoded = handle.decode_receipt_logs(receipt).unwrap();

    let event = decoded.event("Transfer").expect("Transfer decoded");
    assert_eq!(event.arg("from").unwrap().as_address().unwrap(), from);
    assert_eq!(event.arg("to").unwrap().as_address().unwrap(), to);
    assert_eq!(event.arg("value").unwrap().as_uint().unwrap().0, value);

    // The original entry rides along untouched.
    assert_eq!(decoded.logs[0].log.address(), emitter);
    assert_eq!(decoded.logs[0].event(), Some("Transfer"));
}

#[test]
fn test_every_matching_log_is_decorated() {
    let emitter = Address::repeat_byte(0x01);
    let matching = log_entry(
        emitter,
        vec![
            transfer_topic(),
            address_topic(Address::repeat_byte(0x0a)),
            address_topic(Address::repeat_byte(0x0b)),
        ],
        U256::from(1u64).to_be_bytes_vec(),
    );
    let unknown = log_entry(emitter, vec![B256::repeat_byte(0xee)], Vec::new());
    let receipt = receipt_with_logs(vec![matching.clone(), unknown, matching]);

    let handle = handle(Some(emitter));
    let decoded = handle.decode_receipt_logs(receipt).unwrap();

    assert_eq!(decoded.logs.len(), 3);
    assert!(decoded.logs[0].decoded.is_some());
    assert!(decoded.logs[1].decoded.is_none());
    assert!(decoded.logs[2].decoded.is_some());
    assert_eq!(decoded.events().count(), 2);
}

#[test]
fn test_foreign_emitter_is_skipped_when_bound() {
    let bound = Address::repeat_byte(0x01);
    let foreign = Address::repeat_byte(0x02);
    let log = log_entry(
        foreign,
        vec![
            transfer_topic(),
            address_topic(Address::ZERO),
            address_topic(Address::ZERO),
        ],
        U256::ZERO.to_be_bytes_vec(),
    );

    let handle = handle(Some(bound));
    let decoded = handle.decode_receipt_logs(receipt_with_logs(vec![log])).unwrap();
    assert!(decoded.logs[0].decoded.is_none());
}

#[test]
fn test_unbound_handle_decodes_any_emitter() {
    let log = log_entry(
        Address::repeat_byte(0x09),
        vec![
            transfer_topic(),
            address_topic(Address::ZERO),
            address_topic(Address::ZERO),
        ],
        U256::ZERO.to_be_bytes_vec(),
    );

    let handle = handle(None);
    let decoded = handle.decode_receipt_logs(receipt_with_logs(vec![log])).unwrap();
    assert!(decoded.logs[0].decoded.is_some());
}

#[test]
fn test_decoded_values_round_trip_into_calls() {
    // Decoded args are plain values usable as subsequent call arguments.
    let value = U256::from(123u64);
    let log = log_entry(
        Address::ZERO,
        vec![
            transfer_topic(),
            address_topic(Address::repeat_byte(0x01)),
            address_topic(Address::repeat_byte(0x02)),
        ],
        value.to_be_bytes_vec(),
    );
    let handle = handle(None);
    let decoded = handle.decode_receipt_logs(receipt_with_logs(vec![log])).unwrap();
    let event = decoded.event("Transfer").unwrap();
    match event.arg("value").unwrap() {
        DynSolValue::Uint(v, 256) => assert_eq!(*v, value),
        other => panic!("unexpected value {other:?}"),
    }
}
