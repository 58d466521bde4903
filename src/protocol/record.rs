//! The fixed-size arithmetic record and its wire codec.
//!
//! The wire format is a flat 13-byte sequence with no header, length
//! prefix, or checksum:
//! ```text
//! ┌──────────┬──────────┬───────────┬──────────┐
//! │  x (LE)  │  y (LE)  │ operation │  result  │
//! │  4 bytes │  4 bytes │  1 byte   │  4 bytes │
//! └──────────┴──────────┴───────────┴──────────┘
//! ```
//! Both endpoints must agree on this layout bit for bit; the codec writes
//! each field explicitly rather than relying on in-memory struct layout.

use std::fmt;

use bytes::{Buf, BufMut};

/// Encoded size of a [`Record`] in bytes.
pub const RECORD_LEN: usize = 13;

/// Arithmetic operator codes.
///
/// The operator character itself is the one-byte operation code on the
/// wire; there is no translation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Op {
    /// Addition.
    Add = b'+',
    /// Subtraction.
    Sub = b'-',
    /// Multiplication.
    Mul = b'*',
    /// Division.
    Div = b'/',
}

impl Op {
    /// Attempts to parse an operator from its wire byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'+' => Some(Self::Add),
            b'-' => Some(Self::Sub),
            b'*' => Some(Self::Mul),
            b'/' => Some(Self::Div),
            _ => None,
        }
    }
}

impl From<Op> for u8 {
    fn from(op: Op) -> Self {
        op as Self
    }
}

/// The arithmetic request/response record.
///
/// A request carries `result = 0`; the peripheral echoes the operands and
/// operator back with `result` filled in. The `operation` field is a raw
/// byte and is never validated by the codec or the exchange layer —
/// operator validation belongs to whoever collects it (see [`Op`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Record {
    /// First operand.
    pub x: i32,
    /// Second operand.
    pub y: i32,
    /// Operation code (ASCII `+`, `-`, `*` or `/`).
    pub operation: u8,
    /// Computed result; 0 until the peripheral fills it in.
    pub result: u32,
}

impl Record {
    /// Creates a request record with the result still unset.
    #[must_use]
    pub const fn request(x: i32, y: i32, operation: u8) -> Self {
        Self {
            x,
            y,
            operation,
            result: 0,
        }
    }

    /// Encodes the record into its fixed 13-byte wire form.
    ///
    /// Fields are written in declaration order, little-endian, with no
    /// padding. Always produces exactly [`RECORD_LEN`] bytes.
    #[must_use]
    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut raw = [0u8; RECORD_LEN];
        let mut buf = &mut raw[..];
        buf.put_i32_le(self.x);
        buf.put_i32_le(self.y);
        buf.put_u8(self.operation);
        buf.put_u32_le(self.result);
        raw
    }

    /// Decodes a record from raw bytes.
    ///
    /// Never fails: short input is zero-padded, so a truncated reply
    /// yields a record with the missing trailing fields set to zero.
    /// Bytes beyond [`RECORD_LEN`] are ignored.
    #[must_use]
    pub fn decode(raw: &[u8]) -> Self {
        let mut padded = [0u8; RECORD_LEN];
        let len = raw.len().min(RECORD_LEN);
        padded[..len].copy_from_slice(&raw[..len]);

        let mut buf = &padded[..];
        Self {
            x: buf.get_i32_le(),
            y: buf.get_i32_le(),
            operation: buf.get_u8(),
            result: buf.get_u32_le(),
        }
    }

    /// Returns the operator if the operation byte is a known code.
    #[must_use]
    pub const fn op(&self) -> Option<Op> {
        Op::from_byte(self.operation)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x = {}, y = {}, op = {}, result = {}",
            self.x,
            self.y,
            char::from(self.operation),
            self.result
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let records = [
            Record::request(7, 3, b'+'),
            Record::request(-40, 17, b'-'),
            Record {
                x: i32::MIN,
                y: i32::MAX,
                operation: b'*',
                result: u32::MAX,
            },
            Record::default(),
        ];
        for record in records {
            assert_eq!(Record::decode(&record.encode()), record);
        }
    }

    #[test]
    fn test_encoded_size_is_fixed() {
        assert_eq!(Record::request(7, 3, b'+').encode().len(), RECORD_LEN);
        assert_eq!(Record::request(-7, -3, b'/').encode().len(), RECORD_LEN);
    }

    #[test]
    fn test_known_encoding() {
        // Little-endian fixture for (x=7, y=3, '+') with result unset
        let encoded = Record::request(7, 3, b'+').encode();
        assert_eq!(
            encoded,
            [0x07, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x2B, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_negative_operand_encoding() {
        let encoded = Record::request(-1, 0, b'-').encode();
        assert_eq!(&encoded[..4], &[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(Record::decode(&encoded).x, -1);
    }

    #[test]
    fn test_unknown_operation_is_preserved() {
        // The codec is permissive: '%' goes through unmodified
        let record = Record::request(1, 2, b'%');
        let encoded = record.encode();
        assert_eq!(encoded[8], b'%');

        let decoded = Record::decode(&encoded);
        assert_eq!(decoded.operation, b'%');
        assert_eq!(decoded.op(), None);
    }

    #[test]
    fn test_short_input_zero_fills() {
        let full = Record {
            x: 7,
            y: 3,
            operation: b'+',
            result: 10,
        };
        let encoded = full.encode();

        // x, y and operation survive; the truncated result reads as zero
        let decoded = Record::decode(&encoded[..9]);
        assert_eq!(decoded.x, 7);
        assert_eq!(decoded.y, 3);
        assert_eq!(decoded.operation, b'+');
        assert_eq!(decoded.result, 0);

        assert_eq!(Record::decode(&[]), Record::default());
    }

    #[test]
    fn test_oversized_input_ignores_trailing_bytes() {
        let record = Record::request(5, 6, b'*');
        let mut raw = record.encode().to_vec();
        raw.extend_from_slice(&[0xAA, 0xBB]);
        assert_eq!(Record::decode(&raw), record);
    }

    #[test]
    fn test_op_from_byte() {
        assert_eq!(Op::from_byte(b'+'), Some(Op::Add));
        assert_eq!(Op::from_byte(b'/'), Some(Op::Div));
        assert_eq!(Op::from_byte(b'%'), None);
        assert_eq!(u8::from(Op::Mul), b'*');
    }

    #[test]
    fn test_display() {
        let record = Record {
            x: 7,
            y: 3,
            operation: b'+',
            result: 10,
        };
        assert_eq!(record.to_string(), "x = 7, y = 3, op = +, result = 10");
    }
}
