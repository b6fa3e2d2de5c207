//! Primitive value encode/decode for the BER contents octets.
//!
//! These functions work on the *contents* of a TLV (the bytes already split
//! out by [`crate::node::decode_tlv`]), not on whole tagged values — callers
//! pair them with [`crate::tag::Tag`] and [`crate::encode_primitive`].

use crate::error::{BerError, BerResult};

pub fn encode_boolean(value: bool) -> Vec<u8> {
    vec![if value { 0xFF } else { 0x00 }]
}

pub fn decode_boolean(contents: &[u8]) -> BerResult<bool> {
    match contents {
        [byte] => Ok(*byte != 0),
        _ => Err(BerError::InvalidBoolean),
    }
}

/// Minimal two's-complement big-endian encoding of `value`.
pub fn encode_integer(value: i64) -> Vec<u8> {
    if value == 0 {
        return vec![0x00];
    }
    let bytes = value.to_be_bytes();
    let mut start = 0;
    while start < 7 {
        let byte = bytes[start];
        let next = bytes[start + 1];
        // Stop trimming once the leading byte is no longer pure sign-extension.
        if byte == 0x00 && next & 0x80 == 0 {
            start += 1;
            continue;
        }
        if byte == 0xFF && next & 0x80 != 0 {
            start += 1;
            continue;
        }
        break;
    }
    bytes[start..].to_vec()
}

pub fn decode_integer(contents: &[u8]) -> BerResult<i64> {
    if contents.is_empty() {
        return Err(BerError::InvalidInteger);
    }
    if contents.len() > 8 {
        // Still decode if the extra leading bytes are pure sign extension.
        let sign_byte = if contents[0] & 0x80 != 0 { 0xFFu8 } else { 0x00 };
        let extra = contents.len() - 8;
        if contents[..extra].iter().any(|b| *b != sign_byte) {
            return Err(BerError::IntegerOverflow);
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&contents[extra..]);
        return Ok(i64::from_be_bytes(buf));
    }
    let sign_byte = if contents[0] & 0x80 != 0 { 0xFFu8 } else { 0x00 };
    let mut buf = [sign_byte; 8];
    let offset = 8 - contents.len();
    buf[offset..].copy_from_slice(contents);
    Ok(i64::from_be_bytes(buf))
}

pub fn encode_null() -> Vec<u8> {
    Vec::new()
}

pub fn decode_null(contents: &[u8]) -> BerResult<()> {
    if contents.is_empty() {
        Ok(())
    } else {
        Err(BerError::MalformedLength { offset: 0 })
    }
}

pub fn encode_octet_string(value: &[u8]) -> Vec<u8> {
    value.to_vec()
}

pub fn decode_octet_string(contents: &[u8]) -> Vec<u8> {
    contents.to_vec()
}

pub fn encode_utf8_string(value: &str) -> Vec<u8> {
    value.as_bytes().to_vec()
}

pub fn decode_utf8_string(contents: &[u8]) -> BerResult<String> {
    String::from_utf8(contents.to_vec()).map_err(|e| BerError::InvalidUtf8(e.to_string()))
}

/// Relative OID encoding: each arc as a base-128 big-endian group with the
/// continuation bit set on all but the last octet of the group. Used here to
/// carry Ember+ paths (sequences of non-negative integers).
pub fn encode_relative_oid(arcs: &[u32]) -> Vec<u8> {
    let mut out = Vec::new();
    for &arc in arcs {
        let mut group = vec![(arc & 0x7F) as u8];
        let mut remaining = arc >> 7;
        while remaining > 0 {
            group.push((remaining & 0x7F) as u8 | 0x80);
            remaining >>= 7;
        }
        group.reverse();
        out.extend_from_slice(&group);
    }
    out
}

pub fn decode_relative_oid(contents: &[u8]) -> BerResult<Vec<u32>> {
    if contents.is_empty() {
        return Err(BerError::InvalidObjectIdentifier);
    }
    let mut arcs = Vec::new();
    let mut current: u32 = 0;
    let mut have_byte = false;
    for &byte in contents {
        current = current
            .checked_shl(7)
            .ok_or(BerError::InvalidObjectIdentifier)?
            | u32::from(byte & 0x7F);
        have_byte = true;
        if byte & 0x80 == 0 {
            arcs.push(current);
            current = 0;
            have_byte = false;
        }
    }
    if have_byte {
        return Err(BerError::InvalidObjectIdentifier);
    }
    Ok(arcs)
}

/// BER REAL, binary encoding (base 2, scale factor 0), matching the subset
/// every common Ember+ stack actually emits. Zero is the canonical empty
/// encoding. Subnormals, infinities, and NaN are out of scope (spec excludes
/// subnormals; Ember+ parameters never carry the others).
pub fn encode_real(value: f64) -> BerResult<Vec<u8>> {
    if value == 0.0 {
        return Ok(Vec::new());
    }
    if !value.is_finite() {
        return Err(BerError::InvalidReal);
    }
    let bits = value.to_bits();
    let sign = bits >> 63 == 1;
    let biased_exp = ((bits >> 52) & 0x7FF) as i32;
    if biased_exp == 0 {
        return Err(BerError::InvalidReal); // subnormal, excluded
    }
    let frac = bits & 0x000F_FFFF_FFFF_FFFF;
    let mut mantissa: u64 = (1u64 << 52) | frac;
    let mut exponent: i32 = biased_exp - 1023 - 52;
    while mantissa != 0 && mantissa & 1 == 0 {
        mantissa >>= 1;
        exponent += 1;
    }

    let exp_bytes = encode_signed_minimal(exponent);
    let exp_len_code: u8 = match exp_bytes.len() {
        1 => 0b00,
        2 => 0b01,
        3 => 0b10,
        n => return Err(BerError::LengthTooLarge(n)),
    };
    let mut first = 0x80u8; // binary encoding, base 2, F = 0
    if sign {
        first |= 0x40;
    }
    first |= exp_len_code;

    let mantissa_bytes = mantissa.to_be_bytes();
    let mantissa_start = mantissa_bytes
        .iter()
        .position(|b| *b != 0)
        .unwrap_or(mantissa_bytes.len() - 1);

    let mut out = vec![first];
    out.extend_from_slice(&exp_bytes);
    out.extend_from_slice(&mantissa_bytes[mantissa_start..]);
    Ok(out)
}

pub fn decode_real(contents: &[u8]) -> BerResult<f64> {
    if contents.is_empty() {
        return Ok(0.0);
    }
    let first = contents[0];
    if first & 0x80 == 0 {
        return Err(BerError::InvalidReal); // decimal/special encodings unsupported
    }
    let sign = first & 0x40 != 0;
    let base_bits = (first >> 4) & 0b11;
    if base_bits != 0 {
        return Err(BerError::InvalidReal); // only base 2 supported
    }
    let scale = (first >> 2) & 0b11;
    if scale != 0 {
        return Err(BerError::InvalidReal);
    }
    let exp_len = match first & 0b11 {
        0b00 => 1,
        0b01 => 2,
        0b10 => 3,
        _ => return Err(BerError::InvalidReal), // next-octet-gives-length form unsupported
    };
    if contents.len() < 1 + exp_len {
        return Err(BerError::InvalidReal);
    }
    let exponent = decode_signed(&contents[1..1 + exp_len])?;
    let mantissa_bytes = &contents[1 + exp_len..];
    if mantissa_bytes.is_empty() || mantissa_bytes.len() > 8 {
        return Err(BerError::InvalidReal);
    }
    let mut buf = [0u8; 8];
    buf[8 - mantissa_bytes.len()..].copy_from_slice(mantissa_bytes);
    let mantissa = u64::from_be_bytes(buf);

    let magnitude = (mantissa as f64) * 2f64.powi(exponent);
    Ok(if sign { -magnitude } else { magnitude })
}

fn encode_signed_minimal(value: i32) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let mut start = 0;
    while start < 3 {
        let byte = bytes[start];
        let next = bytes[start + 1];
        if byte == 0x00 && next & 0x80 == 0 {
            start += 1;
        } else if byte == 0xFF && next & 0x80 != 0 {
            start += 1;
        } else {
            break;
        }
    }
    bytes[start..].to_vec()
}

fn decode_signed(bytes: &[u8]) -> BerResult<i32> {
    if bytes.is_empty() || bytes.len() > 4 {
        return Err(BerError::InvalidReal);
    }
    let sign_byte = if bytes[0] & 0x80 != 0 { 0xFFu8 } else { 0x00 };
    let mut buf = [sign_byte; 4];
    let offset = 4 - bytes.len();
    buf[offset..].copy_from_slice(bytes);
    Ok(i32::from_be_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_round_trip_small_and_large() {
        for value in [0i64, 1, -1, 127, -128, 128, -129, 1_000_000, i64::MIN, i64::MAX] {
            let encoded = encode_integer(value);
            let decoded = decode_integer(&encoded).unwrap();
            assert_eq!(decoded, value, "round trip failed for {value}");
        }
    }

    #[test]
    fn integer_is_minimal() {
        assert_eq!(encode_integer(0), vec![0x00]);
        assert_eq!(encode_integer(127), vec![0x7F]);
        assert_eq!(encode_integer(128), vec![0x00, 0x80]);
        assert_eq!(encode_integer(-1), vec![0xFF]);
        assert_eq!(encode_integer(-128), vec![0x80]);
        assert_eq!(encode_integer(-129), vec![0xFF, 0x7F]);
    }

    #[test]
    fn boolean_round_trip() {
        assert!(decode_boolean(&encode_boolean(true)).unwrap());
        assert!(!decode_boolean(&encode_boolean(false)).unwrap());
    }

    #[test]
    fn relative_oid_round_trip() {
        let arcs = vec![1, 2, 300, 0, 16384];
        let encoded = encode_relative_oid(&arcs);
        let decoded = decode_relative_oid(&encoded).unwrap();
        assert_eq!(decoded, arcs);
    }

    #[test]
    fn real_round_trip() {
        for value in [0.0, 1.0, -1.0, 0.5, -6.0, 3.14159, 1e10, -1e-10, 123456.789] {
            let encoded = encode_real(value).unwrap();
            let decoded = decode_real(&encoded).unwrap();
            assert_eq!(decoded, value, "round trip failed for {value}");
        }
    }

    #[test]
    fn real_zero_is_empty() {
        assert_eq!(encode_real(0.0).unwrap(), Vec::<u8>::new());
        assert_eq!(decode_real(&[]).unwrap(), 0.0);
    }

    #[test]
    fn utf8_string_round_trip() {
        let s = "Start Line";
        let encoded = encode_utf8_string(s);
        assert_eq!(decode_utf8_string(&encoded).unwrap(), s);
    }
}
