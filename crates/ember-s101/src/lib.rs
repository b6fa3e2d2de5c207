//! S101: the framed byte-stream transport Ember+ Glow messages travel over.
//!
//! Two layers: [`frame`] handles BOF/EOF/escaping/CRC generically, and
//! [`message`] interprets the resulting payloads as S101 messages
//! (EmBER packages, possibly split across several frames, and keep-alives).

mod crc;
mod error;
mod frame;
mod message;

pub use crc::crc16_ccitt;
pub use error::{S101Error, S101Result};
pub use frame::{encode_frame, FrameDecoder, BOF, EOF, ESCAPE};
pub use message::{
    command, encode_ember, encode_keepalive_request, encode_keepalive_response, package_flag,
    S101Decoder, S101Event, APP_BYTES, DEFAULT_SLOT, DTD_GLOW, MESSAGE_TYPE_EMBER, VERSION,
};
