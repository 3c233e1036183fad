//! Byte-level lock of every message payload the workers exchange.
//!
//! Changing any of these layouts breaks interop between builds; update the
//! golden bytes only together with a format version bump.

use hdastar_kernel::carrier::packed::PackedState;
use hdastar_kernel::hash::table_hash;
use hdastar_search::incumbent::{decode_cost, encode_cost};
use hdastar_search::node::SearchNode;
use hdastar_search::termination::{Token, TOKEN_SIZE};
use hdastar_search::wire::{decode_batch, encode_batch, HEADER_SIZE};

#[test]
fn node_record_golden_bytes() {
    let mut node = SearchNode::new(
        PackedState::new(vec![1, 2, 3, 4, 5, 6, 7, 8, 0]),
        7,
        5,
        0x0A0B_0C0D,
        Some(3),
    );
    node.open_index = 2;
    let bytes = encode_batch(std::slice::from_ref(&node));

    let mut golden = Vec::new();
    golden.extend_from_slice(&[0, 0, 0, 12]); // f
    golden.extend_from_slice(&[0, 0, 0, 7]); // g
    golden.extend_from_slice(&[0x0A, 0x0B, 0x0C, 0x0D]); // dist_key
    golden.extend_from_slice(&[0, 0, 0, 2]); // open_index
    golden.extend_from_slice(&table_hash(&node.packed).to_be_bytes());
    golden.push(3); // last_op
    golden.extend_from_slice(&[0, 0, 0, 9]); // payload_len
    golden.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8, 0]);

    assert_eq!(HEADER_SIZE, 25);
    assert_eq!(bytes, golden);
    assert_eq!(decode_batch(&golden).unwrap(), vec![node]);
}

#[test]
fn root_node_has_no_operator_byte() {
    let root = SearchNode::new(PackedState::new(vec![0xEE]), 0, 0, 0, None);
    let bytes = encode_batch(&[root]);
    assert_eq!(bytes[20], 0xFF);
}

#[test]
fn token_golden_bytes() {
    let token = Token {
        circuits: 2,
        balance: -1,
        tainted: true,
    };
    let golden: [u8; TOKEN_SIZE] = [0, 0, 0, 2, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 1];
    assert_eq!(token.encode(), golden);
    assert_eq!(Token::decode(&golden), Some(token));
}

#[test]
fn incumbent_golden_bytes() {
    assert_eq!(encode_cost(1_105_036), [0x00, 0x10, 0xDC, 0x8C]);
    assert_eq!(decode_cost(&[0x00, 0x10, 0xDC, 0x8C]), Some(1_105_036));
    assert_eq!(decode_cost(&[0, 1]), None);
}
