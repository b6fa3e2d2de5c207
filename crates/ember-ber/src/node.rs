use crate::error::{BerError, BerResult};
use crate::length::{decode_length, encode_length, Length};
use crate::tag::Tag;

/// A decoded BER value: either a primitive leaf carrying raw contents octets,
/// or a constructed value carrying fully-decoded children.
///
/// This is the unit the streaming reader hands back per completed item —
/// the Glow layer interprets `tag` against its own context-tag tables to
/// decide what kind of Glow element a node represents.
#[derive(Debug, Clone, PartialEq)]
pub enum BerNode {
    Primitive { tag: Tag, contents: Vec<u8> },
    Constructed { tag: Tag, children: Vec<BerNode> },
}

impl BerNode {
    pub fn tag(&self) -> Tag {
        match self {
            BerNode::Primitive { tag, .. } => *tag,
            BerNode::Constructed { tag, .. } => *tag,
        }
    }

    pub fn as_primitive(&self) -> BerResult<&[u8]> {
        match self {
            BerNode::Primitive { contents, .. } => Ok(contents),
            BerNode::Constructed { .. } => Err(BerError::UnexpectedConstructed),
        }
    }

    pub fn as_constructed(&self) -> BerResult<&[BerNode]> {
        match self {
            BerNode::Constructed { children, .. } => Ok(children),
            BerNode::Primitive { .. } => Err(BerError::UnexpectedPrimitive),
        }
    }

    pub fn primitive(tag: Tag, contents: Vec<u8>) -> Self {
        BerNode::Primitive { tag, contents }
    }

    pub fn constructed(tag: Tag, children: Vec<BerNode>) -> Self {
        BerNode::Constructed { tag, children }
    }

    /// Encode this value back to its definite-length TLV bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            BerNode::Primitive { tag, contents } => {
                tag.encode(out);
                encode_length(contents.len(), out);
                out.extend_from_slice(contents);
            }
            BerNode::Constructed { tag, children } => {
                let mut body = Vec::new();
                for child in children {
                    child.encode_into(&mut body);
                }
                tag.encode(out);
                encode_length(body.len(), out);
                out.extend_from_slice(&body);
            }
        }
    }
}

/// Encode a primitive TLV directly from a tag and raw contents octets.
pub fn encode_primitive(tag: Tag, contents: &[u8]) -> Vec<u8> {
    BerNode::Primitive {
        tag,
        contents: contents.to_vec(),
    }
    .encode()
}

/// Encode a constructed TLV from a tag and already-encoded children.
pub fn encode_constructed(tag: Tag, children: Vec<BerNode>) -> Vec<u8> {
    BerNode::Constructed { tag, children }.encode()
}

/// End-of-contents marker: universal class, tag number 0, primitive, length 0.
fn is_eoc(tag: Tag, length: Length) -> bool {
    tag.number == 0 && !tag.constructed && length == Length::Definite(0)
}

/// Decode one TLV starting at `buf[offset]`.
///
/// Returns `Err(BerError::Incomplete)` when `buf` does not yet hold the full
/// value (the tag/length are readable but the declared content length runs
/// past the end of `buf`) — this is how [`crate::reader::StreamingReader`]
/// knows to wait for more bytes rather than treating a partial frame as
/// malformed.
pub fn decode_tlv(buf: &[u8], offset: usize) -> BerResult<(BerNode, usize)> {
    let (tag, tag_len) = Tag::decode(buf, offset)?;
    let (length, length_len) = decode_length(buf, offset + tag_len)?;
    let header_len = tag_len + length_len;
    let content_start = offset + header_len;

    match length {
        Length::Definite(len) => {
            let content_end = content_start
                .checked_add(len)
                .ok_or(BerError::LengthTooLarge(len))?;
            if content_end > buf.len() {
                return Err(BerError::Incomplete);
            }
            let contents = &buf[content_start..content_end];
            if tag.constructed {
                let mut children = Vec::new();
                let mut pos = content_start;
                while pos < content_end {
                    let (child, consumed) = decode_tlv(buf, pos)?;
                    pos += consumed;
                    children.push(child);
                }
                if pos != content_end {
                    return Err(BerError::TrailingBytes);
                }
                Ok((BerNode::Constructed { tag, children }, header_len + len))
            } else {
                Ok((
                    BerNode::Primitive {
                        tag,
                        contents: contents.to_vec(),
                    },
                    header_len + len,
                ))
            }
        }
        Length::Indefinite => {
            if !tag.constructed {
                return Err(BerError::UnexpectedPrimitive);
            }
            let mut children = Vec::new();
            let mut pos = content_start;
            loop {
                let (child_tag, child_tag_len) = Tag::decode(buf, pos)?;
                let (child_len, child_len_len) = decode_length(buf, pos + child_tag_len)?;
                if is_eoc(child_tag, child_len) {
                    pos += child_tag_len + child_len_len;
                    break;
                }
                let (child, consumed) = decode_tlv(buf, pos)?;
                pos += consumed;
                children.push(child);
            }
            Ok((BerNode::Constructed { tag, children }, pos - offset))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::universal;

    #[test]
    fn decode_primitive_integer() {
        let buf = [0x02, 0x01, 0x2A];
        let (node, consumed) = decode_tlv(&buf, 0).unwrap();
        assert_eq!(consumed, 3);
        assert_eq!(node.as_primitive().unwrap(), &[0x2A]);
        assert_eq!(node.tag().number, universal::INTEGER);
    }

    #[test]
    fn decode_constructed_sequence() {
        // SEQUENCE { INTEGER 1, INTEGER 2 }
        let buf = [0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02];
        let (node, consumed) = decode_tlv(&buf, 0).unwrap();
        assert_eq!(consumed, buf.len());
        let children = node.as_constructed().unwrap();
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn incomplete_reports_as_such() {
        let buf = [0x02, 0x05, 0x01, 0x02];
        let err = decode_tlv(&buf, 0).unwrap_err();
        assert_eq!(err, BerError::Incomplete);
    }

    #[test]
    fn indefinite_length_constructed() {
        // SEQUENCE (indefinite) { INTEGER 7 } EOC
        let buf = [0x30, 0x80, 0x02, 0x01, 0x07, 0x00, 0x00];
        let (node, consumed) = decode_tlv(&buf, 0).unwrap();
        assert_eq!(consumed, buf.len());
        let children = node.as_constructed().unwrap();
        assert_eq!(children.len(), 1);
    }

    #[test]
    fn encode_decode_round_trip() {
        let buf = [0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02];
        let (node, _) = decode_tlv(&buf, 0).unwrap();
        assert_eq!(node.encode(), buf.to_vec());
    }
}
