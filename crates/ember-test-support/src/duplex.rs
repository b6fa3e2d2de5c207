//! An in-memory `S101` byte pipe, for tests that want to drive the framing
//! and decode layers without opening a real socket.

use ember_s101::{S101Decoder, S101Event};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

/// A connected pair of in-memory streams. Bytes written to `client` arrive
/// readable on `server` and vice versa.
pub fn pipe(buffer_size: usize) -> (DuplexStream, DuplexStream) {
    tokio::io::duplex(buffer_size)
}

/// Encode `ber_bytes` as an S101 frame and write it to `stream`.
pub async fn send_ember(stream: &mut DuplexStream, ber_bytes: &[u8]) -> std::io::Result<()> {
    stream.write_all(&ember_s101::encode_ember(ber_bytes)).await
}

/// Read from `stream` until a complete Ember payload has been decoded,
/// discarding any keepalive traffic in between.
pub async fn recv_ember(stream: &mut DuplexStream) -> std::io::Result<Vec<u8>> {
    let mut decoder = S101Decoder::new();
    let mut buf = vec![0u8; 4096];
    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "stream closed"));
        }
        for event in decoder.feed(&buf[..n]) {
            if let Ok(S101Event::Ember(bytes)) = event {
                return Ok(bytes);
            }
        }
    }
}
