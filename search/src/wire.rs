//! Node wire encoding: flat big-endian records, self-delimiting.
//!
//! # Wire format
//!
//! ```text
//! [f:u32be][g:u32be][dist_key:u32be][open_index:u32be][table_hash:u32be]
//! [last_op:u8][payload_len:u32be][payload: payload_len bytes]
//! ```
//!
//! The header is [`HEADER_SIZE`] bytes. A batch is a plain concatenation of
//! records with no outer framing; decoding walks header + declared payload
//! until the buffer is exhausted. `last_op == 0xFF` encodes "no operator".
//!
//! Payload bytes are never inspected beyond their declared length.

use hdastar_kernel::carrier::packed::PackedState;
use thiserror::Error;

use crate::node::{SearchNode, NO_OPERATOR};

/// Fixed header size in bytes: five `u32` + one `u8` + the `u32` length.
pub const HEADER_SIZE: usize = 4 * 5 + 1 + 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("truncated node record at offset {offset}: need {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
}

/// Encoded size of one node.
#[must_use]
pub fn encoded_len(node: &SearchNode) -> usize {
    HEADER_SIZE + node.packed.len()
}

/// Append one node record to `out`.
pub fn encode_node(node: &SearchNode, out: &mut Vec<u8>) {
    out.reserve(encoded_len(node));
    out.extend_from_slice(&node.f.to_be_bytes());
    out.extend_from_slice(&node.g.to_be_bytes());
    out.extend_from_slice(&node.dist_key.to_be_bytes());
    out.extend_from_slice(&node.open_index.to_be_bytes());
    out.extend_from_slice(&node.table_hash.to_be_bytes());
    out.push(node.last_op.unwrap_or(NO_OPERATOR));
    #[allow(clippy::cast_possible_truncation)]
    let payload_len = node.packed.len() as u32;
    out.extend_from_slice(&payload_len.to_be_bytes());
    out.extend_from_slice(node.packed.as_bytes());
}

/// Encode a batch into one buffer, sized exactly.
#[must_use]
pub fn encode_batch(nodes: &[SearchNode]) -> Vec<u8> {
    let total = nodes.iter().map(encoded_len).sum();
    let mut out = Vec::with_capacity(total);
    for node in nodes {
        encode_node(node, &mut out);
    }
    out
}

/// Decode the node record at the start of `bytes`.
///
/// Returns the node and the number of bytes it occupied.
///
/// # Errors
///
/// [`WireError::Truncated`] if the header or the declared payload runs past
/// the end of `bytes`.
pub fn decode_node(bytes: &[u8]) -> Result<(SearchNode, usize), WireError> {
    let mut cursor = Cursor::new(bytes);
    let node = cursor.read_node()?;
    Ok((node, cursor.pos))
}

/// Decode every record in a batch, in encoding order.
///
/// # Errors
///
/// [`WireError::Truncated`] if the last record is incomplete.
pub fn decode_batch(bytes: &[u8]) -> Result<Vec<SearchNode>, WireError> {
    let mut cursor = Cursor::new(bytes);
    let mut nodes = Vec::new();
    while cursor.remaining() > 0 {
        nodes.push(cursor.read_node()?);
    }
    Ok(nodes)
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        if self.remaining() < n {
            return Err(WireError::Truncated {
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, WireError> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_node(&mut self) -> Result<SearchNode, WireError> {
        // Check the whole header up front so the error names the record start.
        if self.remaining() < HEADER_SIZE {
            return Err(WireError::Truncated {
                offset: self.pos,
                needed: HEADER_SIZE,
                available: self.remaining(),
            });
        }
        let f = self.read_u32()?;
        let g = self.read_u32()?;
        let dist_key = self.read_u32()?;
        let open_index = self.read_u32()?;
        let table_hash = self.read_u32()?;
        let last_op = match self.read_u8()? {
            NO_OPERATOR => None,
            op => Some(op),
        };
        let payload_len = self.read_u32()? as usize;
        let packed = PackedState::from_slice(self.read_bytes(payload_len)?);
        Ok(SearchNode {
            f,
            g,
            dist_key,
            open_index,
            table_hash,
            last_op,
            packed,
        })
    }
}
