use crate::error::BerError;
use crate::node::{decode_tlv, BerNode};

/// Buffers fed bytes and yields fully-decoded top-level [`BerNode`] values as
/// soon as enough bytes have arrived.
///
/// Ember+ runs over a TCP byte stream, so a single `feed()` call may carry
/// zero, one, or many complete values, plus a trailing partial one. Call
/// [`StreamingReader::feed`] with each chunk read off the socket; it returns
/// whatever top-level values became complete as a result.
#[derive(Debug, Default)]
pub struct StreamingReader {
    buf: Vec<u8>,
}

impl StreamingReader {
    pub fn new() -> Self {
        StreamingReader { buf: Vec::new() }
    }

    /// Append `bytes` to the internal buffer and drain as many complete
    /// top-level values as are now available.
    ///
    /// A genuine decode error (anything other than [`BerError::Incomplete`])
    /// is returned immediately; the reader does not attempt to resynchronize
    /// on its own. Callers that want to resume after a malformed value should
    /// construct a fresh `StreamingReader` (the transport framing layer below
    /// Ember+'s BER payload is responsible for finding the next frame
    /// boundary).
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<BerNode>, BerError> {
        self.buf.extend_from_slice(bytes);
        let mut completed = Vec::new();
        let mut offset = 0;
        loop {
            match decode_tlv(&self.buf, offset) {
                Ok((node, consumed)) => {
                    offset += consumed;
                    completed.push(node);
                }
                Err(BerError::Incomplete) => break,
                Err(other) => {
                    self.buf.drain(..offset);
                    return Err(other);
                }
            }
        }
        self.buf.drain(..offset);
        Ok(completed)
    }

    /// Number of bytes currently buffered but not yet part of a completed value.
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::universal;

    #[test]
    fn feed_single_chunk_with_multiple_values() {
        let mut reader = StreamingReader::new();
        let buf = [0x02, 0x01, 0x01, 0x02, 0x01, 0x02];
        let nodes = reader.feed(&buf).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(reader.pending_len(), 0);
    }

    #[test]
    fn feed_split_across_chunks() {
        let mut reader = StreamingReader::new();
        let first = reader.feed(&[0x02, 0x02, 0x01]).unwrap();
        assert!(first.is_empty());
        assert_eq!(reader.pending_len(), 3);

        let second = reader.feed(&[0x02]).unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].tag().number, universal::INTEGER);
        assert_eq!(reader.pending_len(), 0);
    }

    #[test]
    fn feed_splits_byte_by_byte() {
        let mut reader = StreamingReader::new();
        let buf = [0x02, 0x01, 0x2A];
        let mut completed = Vec::new();
        for byte in buf {
            completed.extend(reader.feed(&[byte]).unwrap());
        }
        assert_eq!(completed.len(), 1);
    }

    #[test]
    fn trailing_partial_tag_waits_instead_of_erroring() {
        let mut reader = StreamingReader::new();
        // valid INTEGER followed by a long-form tag whose number hasn't arrived yet
        let buf = [0x02, 0x01, 0x05, 0x1F, 0x80];
        let completed = reader.feed(&buf).unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(reader.pending_len(), 2);
    }

    #[test]
    fn genuinely_malformed_tag_overflow_is_reported() {
        let mut reader = StreamingReader::new();
        // long-form tag number whose base-128 groups overflow a u32
        let buf = [0x1F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
        let err = reader.feed(&buf).unwrap_err();
        assert_eq!(err, BerError::MalformedTag { offset: 0 });
    }
}
