use ember_ber::{universal, BerNode, Tag};

use crate::error::{GlowError, GlowResult};

/// A parameter value. Decoding fails loudly on an unrecognized universal tag
/// rather than silently promoting it to a nearby type.
#[derive(Debug, Clone, PartialEq)]
pub enum GlowValue {
    Integer(i64),
    Real(f64),
    String(String),
    Boolean(bool),
    /// A trigger carries no payload; receiving one is itself the event.
    Trigger,
    Enum(i32),
    Octets(Vec<u8>),
    None,
}

impl GlowValue {
    /// Encode as the bare universal-tagged primitive (no context wrapper —
    /// callers embed this inside the field's context tag).
    pub fn encode(&self) -> Option<BerNode> {
        match self {
            GlowValue::Integer(value) => Some(BerNode::primitive(
                Tag::universal(universal::INTEGER, false),
                ember_ber::encode_integer(*value),
            )),
            GlowValue::Real(value) => Some(BerNode::primitive(
                Tag::universal(universal::REAL, false),
                ember_ber::encode_real(*value).unwrap_or_default(),
            )),
            GlowValue::String(value) => Some(BerNode::primitive(
                Tag::universal(universal::UTF8_STRING, false),
                ember_ber::encode_utf8_string(value),
            )),
            GlowValue::Boolean(value) => Some(BerNode::primitive(
                Tag::universal(universal::BOOLEAN, false),
                ember_ber::encode_boolean(*value),
            )),
            GlowValue::Trigger => Some(BerNode::primitive(
                Tag::universal(universal::NULL, false),
                ember_ber::encode_null(),
            )),
            GlowValue::Enum(value) => Some(BerNode::primitive(
                Tag::universal(universal::INTEGER, false),
                ember_ber::encode_integer(i64::from(*value)),
            )),
            GlowValue::Octets(bytes) => Some(BerNode::primitive(
                Tag::universal(universal::OCTET_STRING, false),
                ember_ber::encode_octet_string(bytes),
            )),
            GlowValue::None => None,
        }
    }

    pub fn decode(node: &BerNode) -> GlowResult<GlowValue> {
        let tag = node.tag();
        let contents = node.as_primitive()?;
        Ok(match tag.number {
            n if n == universal::INTEGER => GlowValue::Integer(ember_ber::decode_integer(contents)?),
            n if n == universal::REAL => GlowValue::Real(ember_ber::decode_real(contents)?),
            n if n == universal::UTF8_STRING => {
                GlowValue::String(ember_ber::decode_utf8_string(contents)?)
            }
            n if n == universal::BOOLEAN => GlowValue::Boolean(ember_ber::decode_boolean(contents)?),
            n if n == universal::NULL => {
                ember_ber::decode_null(contents)?;
                GlowValue::Trigger
            }
            n if n == universal::OCTET_STRING => {
                GlowValue::Octets(ember_ber::decode_octet_string(contents))
            }
            other => return Err(GlowError::UnrecognizedTag(other)),
        })
    }

    /// Decode as an `Enum` specifically (the wire shape is identical to
    /// `Integer`; callers that know a parameter's declared type is Enum use
    /// this instead of [`GlowValue::decode`] to get the right variant).
    pub fn decode_as_enum(node: &BerNode) -> GlowResult<GlowValue> {
        let contents = node.as_primitive()?;
        Ok(GlowValue::Enum(ember_ber::decode_integer(contents)? as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_round_trip() {
        let value = GlowValue::Integer(-42);
        let node = value.encode().unwrap();
        assert_eq!(GlowValue::decode(&node).unwrap(), value);
    }

    #[test]
    fn real_round_trip() {
        let value = GlowValue::Real(3.25);
        let node = value.encode().unwrap();
        assert_eq!(GlowValue::decode(&node).unwrap(), value);
    }

    #[test]
    fn string_round_trip() {
        let value = GlowValue::String("gain".to_string());
        let node = value.encode().unwrap();
        assert_eq!(GlowValue::decode(&node).unwrap(), value);
    }

    #[test]
    fn none_has_no_wire_representation() {
        assert!(GlowValue::None.encode().is_none());
    }
}
