//! Generic S101 framing: BOF/EOF delimiters, byte escaping, CRC-16 trailer.
//!
//! This layer knows nothing about EmBER message structure — it just turns an
//! arbitrary payload into a self-delimiting, checksummed frame and back.
//! [`crate::decoder::S101Decoder`] builds the EmBER-aware semantics on top.

use crate::crc::crc16_ccitt;
use crate::error::S101Error;

pub const BOF: u8 = 0xFE;
pub const EOF: u8 = 0xFF;
pub const ESCAPE: u8 = 0xCE;
const ESCAPE_XOR: u8 = 0x20;

fn escape_into(byte: u8, out: &mut Vec<u8>) {
    if byte == BOF || byte == EOF || byte == ESCAPE {
        out.push(ESCAPE);
        out.push(byte ^ ESCAPE_XOR);
    } else {
        out.push(byte);
    }
}

/// Build the full wire bytes (`BOF, payload…, CRC-lo, CRC-hi, EOF`) for one
/// frame carrying `payload`, escaping as needed.
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let crc = crc16_ccitt(payload);
    let mut out = Vec::with_capacity(payload.len() + 5);
    out.push(BOF);
    for &byte in payload {
        escape_into(byte, &mut out);
    }
    escape_into((crc & 0xFF) as u8, &mut out);
    escape_into((crc >> 8) as u8, &mut out);
    out.push(EOF);
    out
}

#[derive(Debug, Default)]
enum State {
    #[default]
    WaitingForBof,
    InFrame,
}

/// Incrementally splits a byte stream into raw, CRC-verified payloads.
///
/// Bytes before the first `BOF` are dropped. Once inside a frame, an
/// `ESCAPE` byte always consumes the following byte regardless of its value
/// (even if it looks like another `BOF`/`EOF`), per the escaping rule. On a
/// CRC mismatch or a frame that ends without a full CRC trailer, the frame is
/// discarded and a decode error is reported; the decoder always resumes by
/// waiting for the next `BOF`.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    state: State,
    raw: Vec<u8>,
    pending_escape: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        FrameDecoder::default()
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Result<Vec<u8>, S101Error>> {
        let mut out = Vec::new();
        for &byte in bytes {
            match self.state {
                State::WaitingForBof => {
                    if byte == BOF {
                        self.raw.clear();
                        self.pending_escape = false;
                        self.state = State::InFrame;
                    }
                }
                State::InFrame => {
                    if self.pending_escape {
                        self.raw.push(byte ^ ESCAPE_XOR);
                        self.pending_escape = false;
                        continue;
                    }
                    match byte {
                        ESCAPE => self.pending_escape = true,
                        EOF => {
                            out.push(self.finish_frame());
                            self.state = State::WaitingForBof;
                        }
                        BOF => {
                            // A bare BOF mid-frame restarts framing at this point;
                            // whatever was buffered is incomplete and dropped silently.
                            self.raw.clear();
                            self.pending_escape = false;
                        }
                        _ => self.raw.push(byte),
                    }
                }
            }
        }
        out
    }

    fn finish_frame(&mut self) -> Result<Vec<u8>, S101Error> {
        if self.raw.len() < 2 {
            return Err(S101Error::TruncatedFrame);
        }
        let split = self.raw.len() - 2;
        let payload = &self.raw[..split];
        let actual = crc16_ccitt(payload);
        let expected = u16::from(self.raw[split]) | (u16::from(self.raw[split + 1]) << 8);
        if actual != expected {
            return Err(S101Error::CrcMismatch { expected, actual });
        }
        Ok(payload.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deframe_one(bytes: &[u8]) -> Result<Vec<u8>, S101Error> {
        let mut decoder = FrameDecoder::new();
        let mut results = decoder.feed(bytes);
        results.remove(0)
    }

    #[test]
    fn round_trip_plain_payload() {
        let payload = b"hello world".to_vec();
        let framed = encode_frame(&payload);
        assert_eq!(deframe_one(&framed).unwrap(), payload);
    }

    #[test]
    fn round_trip_payload_containing_special_bytes() {
        let payload = vec![0xFE, 0xFF, 0xCE, 0x00];
        let framed = encode_frame(&payload);
        assert_eq!(deframe_one(&framed).unwrap(), payload);
    }

    #[test]
    fn garbage_between_frames_does_not_alter_decoded_sequence() {
        let payload_a = vec![1, 2, 3];
        let payload_b = vec![4, 5, 6];
        let mut stream = encode_frame(&payload_a);
        stream.extend_from_slice(&[0x01, 0x02, 0x03]); // garbage, no BOF
        stream.extend_from_slice(&encode_frame(&payload_b));

        let mut decoder = FrameDecoder::new();
        let results = decoder.feed(&stream);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap(), &payload_a);
        assert_eq!(results[1].as_ref().unwrap(), &payload_b);
    }

    #[test]
    fn crc_mismatch_is_reported_and_does_not_block_the_next_frame() {
        let mut framed = encode_frame(b"abc");
        let corrupt_at = framed.len() - 2; // corrupt a CRC byte, just before EOF
        framed[corrupt_at] ^= 0xFF;
        framed.extend_from_slice(&encode_frame(b"def"));

        let mut decoder = FrameDecoder::new();
        let results = decoder.feed(&framed);
        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], Err(S101Error::CrcMismatch { .. })));
        assert_eq!(results[1].as_ref().unwrap(), b"def");
    }

    #[test]
    fn feed_works_split_across_many_small_chunks() {
        let framed = encode_frame(b"chunked");
        let mut decoder = FrameDecoder::new();
        let mut results = Vec::new();
        for byte in &framed {
            results.extend(decoder.feed(std::slice::from_ref(byte)));
        }
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].as_ref().unwrap(), b"chunked");
    }
}
