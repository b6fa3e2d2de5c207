use crate::error::S101Error;
use crate::frame::{encode_frame, FrameDecoder};

pub const DEFAULT_SLOT: u8 = 0x00;
pub const MESSAGE_TYPE_EMBER: u8 = 0x0E;
pub const VERSION: u8 = 0x01;
pub const DTD_GLOW: u8 = 0x01;

/// Kept at two bytes exactly; some devices reject frames with any other count.
pub const APP_BYTES: [u8; 2] = [0x28, 0x02];

pub mod command {
    pub const EMBER: u8 = 0x00;
    pub const KEEPALIVE_REQUEST: u8 = 0x01;
    pub const KEEPALIVE_RESPONSE: u8 = 0x02;
}

pub mod package_flag {
    pub const FIRST: u8 = 0x80;
    pub const LAST: u8 = 0x40;
    pub const EMPTY: u8 = 0x20;
    pub const SINGLE: u8 = FIRST | LAST;
}

/// A fully decoded, logically complete S101 message: either an assembled
/// Glow payload (possibly built from several S101 frames) or a keep-alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum S101Event {
    Ember(Vec<u8>),
    KeepAliveRequest,
    KeepAliveResponse,
}

struct PackageAssembly {
    buf: Vec<u8>,
}

/// Stateful S101 decoder: reassembles keep-alives and (possibly multi-frame)
/// EmBER payloads out of a raw byte stream.
#[derive(Default)]
pub struct S101Decoder {
    frames: FrameDecoder,
    assembly: Option<PackageAssembly>,
}

impl S101Decoder {
    pub fn new() -> Self {
        S101Decoder::default()
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Result<S101Event, S101Error>> {
        let mut out = Vec::new();
        for frame_result in self.frames.feed(bytes) {
            match frame_result {
                Ok(payload) => match self.handle_frame(&payload) {
                    Ok(Some(event)) => out.push(Ok(event)),
                    Ok(None) => {} // package still assembling
                    Err(err) => {
                        self.assembly = None;
                        out.push(Err(err));
                    }
                },
                Err(err) => {
                    self.assembly = None;
                    out.push(Err(err));
                }
            }
        }
        out
    }

    fn handle_frame(&mut self, payload: &[u8]) -> Result<Option<S101Event>, S101Error> {
        if payload.len() < 4 {
            return Err(S101Error::TruncatedHeader);
        }
        let message_type = payload[1];
        let command = payload[2];
        if message_type != MESSAGE_TYPE_EMBER {
            return Err(S101Error::UnsupportedMessageType(message_type));
        }
        match command {
            command::KEEPALIVE_REQUEST => Ok(Some(S101Event::KeepAliveRequest)),
            command::KEEPALIVE_RESPONSE => Ok(Some(S101Event::KeepAliveResponse)),
            command::EMBER => self.handle_ember_frame(&payload[4..]),
            other => Err(S101Error::UnsupportedCommand(other)),
        }
    }

    fn handle_ember_frame(&mut self, rest: &[u8]) -> Result<Option<S101Event>, S101Error> {
        if rest.len() < 3 {
            return Err(S101Error::TruncatedHeader);
        }
        let flags = rest[0];
        let _dtd = rest[1];
        let app_bytes_count = rest[2] as usize;
        let app_bytes_end = 3 + app_bytes_count;
        if rest.len() < app_bytes_end {
            return Err(S101Error::AppBytesMismatch {
                declared: app_bytes_count,
                available: rest.len() - 3,
            });
        }
        let ber_bytes = &rest[app_bytes_end..];

        if flags & package_flag::EMPTY != 0 {
            // Carries no BER bytes; only relevant as a First/Last boundary marker.
        } else {
            let assembly = self.assembly.get_or_insert_with(|| PackageAssembly { buf: Vec::new() });
            assembly.buf.extend_from_slice(ber_bytes);
        }

        if flags & package_flag::LAST != 0 {
            let buf = self
                .assembly
                .take()
                .map(|a| a.buf)
                .unwrap_or_default();
            Ok(Some(S101Event::Ember(buf)))
        } else {
            self.assembly.get_or_insert_with(|| PackageAssembly { buf: Vec::new() });
            Ok(None)
        }
    }
}

fn header(command: u8) -> Vec<u8> {
    vec![DEFAULT_SLOT, MESSAGE_TYPE_EMBER, command, VERSION]
}

/// Encode a single-frame EmBER message carrying `ber_bytes`.
pub fn encode_ember(ber_bytes: &[u8]) -> Vec<u8> {
    let mut payload = header(command::EMBER);
    payload.push(package_flag::SINGLE);
    payload.push(DTD_GLOW);
    payload.push(APP_BYTES.len() as u8);
    payload.extend_from_slice(&APP_BYTES);
    payload.extend_from_slice(ber_bytes);
    encode_frame(&payload)
}

pub fn encode_keepalive_request() -> Vec<u8> {
    encode_frame(&header(command::KEEPALIVE_REQUEST))
}

pub fn encode_keepalive_response() -> Vec<u8> {
    encode_frame(&header(command::KEEPALIVE_RESPONSE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ember_round_trip_single_frame() {
        let ber = vec![0x02, 0x01, 0x2A];
        let frame = encode_ember(&ber);
        let mut decoder = S101Decoder::new();
        let events = decoder.feed(&frame);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap(), &S101Event::Ember(ber));
    }

    #[test]
    fn keepalive_round_trip() {
        let mut decoder = S101Decoder::new();
        let events = decoder.feed(&encode_keepalive_request());
        assert_eq!(events, vec![Ok(S101Event::KeepAliveRequest)]);

        let events = decoder.feed(&encode_keepalive_response());
        assert_eq!(events, vec![Ok(S101Event::KeepAliveResponse)]);
    }

    #[test]
    fn multi_frame_ember_package_is_concatenated() {
        fn ember_frame(flags: u8, chunk: &[u8]) -> Vec<u8> {
            let mut payload = vec![DEFAULT_SLOT, MESSAGE_TYPE_EMBER, command::EMBER, VERSION];
            payload.push(flags);
            payload.push(DTD_GLOW);
            payload.push(APP_BYTES.len() as u8);
            payload.extend_from_slice(&APP_BYTES);
            payload.extend_from_slice(chunk);
            encode_frame(&payload)
        }

        let mut decoder = S101Decoder::new();
        let mut stream = ember_frame(package_flag::FIRST, &[0x02, 0x01]);
        stream.extend_from_slice(&ember_frame(package_flag::LAST, &[0x2A]));

        let events = decoder.feed(&stream);
        assert_eq!(events, vec![Ok(S101Event::Ember(vec![0x02, 0x01, 0x2A]))]);
    }

    #[test]
    fn decode_error_does_not_prevent_decoding_the_next_message() {
        let mut decoder = S101Decoder::new();
        let mut stream = encode_frame(&[DEFAULT_SLOT, 0xAA, command::EMBER, VERSION]); // bad message type
        stream.extend_from_slice(&encode_keepalive_request());

        let events = decoder.feed(&stream);
        assert_eq!(events.len(), 2);
        assert!(events[0].is_err());
        assert_eq!(events[1], Ok(S101Event::KeepAliveRequest));
    }
}
