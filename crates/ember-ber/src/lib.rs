//! Minimal ASN.1 BER codec for the Ember+ wire profile.
//!
//! Scope is deliberately narrow: definite- and indefinite-length tags,
//! the primitive types Ember+ parameters actually carry (BOOLEAN, INTEGER,
//! REAL, OCTET STRING, UTF8String, NULL, RELATIVE-OID), and a streaming
//! reader that copes with TCP byte streams arriving in arbitrary chunks.

mod error;
mod length;
mod node;
mod reader;
mod tag;
mod value;

pub use error::{BerError, BerResult};
pub use length::{decode_length, encode_length, Length};
pub use node::{decode_tlv, encode_constructed, encode_primitive, BerNode};
pub use reader::StreamingReader;
pub use tag::{universal, Tag, TagClass};
pub use value::{
    decode_boolean, decode_integer, decode_null, decode_octet_string, decode_real,
    decode_relative_oid, decode_utf8_string, encode_boolean, encode_integer, encode_null,
    encode_octet_string, encode_real, encode_relative_oid, encode_utf8_string,
};

/// Decode exactly one TLV from `buf`, requiring it to consume the whole
/// buffer. Useful for one-shot decoding of a complete, already-framed value
/// (e.g. a full S101 EmBER payload), as opposed to [`StreamingReader`] which
/// is built for partial/multi-value input.
pub fn decode_one(buf: &[u8]) -> BerResult<BerNode> {
    let (node, consumed) = decode_tlv(buf, 0)?;
    if consumed != buf.len() {
        return Err(BerError::TrailingBytes);
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_one_rejects_trailing_bytes() {
        let buf = [0x02, 0x01, 0x01, 0xFF];
        assert_eq!(decode_one(&buf).unwrap_err(), BerError::TrailingBytes);
    }

    #[test]
    fn decode_one_accepts_exact_value() {
        let buf = [0x02, 0x01, 0x01];
        let node = decode_one(&buf).unwrap();
        assert_eq!(node.as_primitive().unwrap(), &[0x01]);
    }
}
