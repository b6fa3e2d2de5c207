use ember_ber::StreamingReader;

use crate::codec::decode_root;
use crate::elements::GlowElement;
use crate::error::GlowResult;

/// Feeds raw BER bytes and yields decoded [`GlowElement`] lists as each
/// top-level value (one Glow root per logical Ember message) completes.
///
/// Built on [`StreamingReader`] so the Glow layer can be driven straight off
/// a byte stream, not only off already-assembled S101 payloads — the BER
/// completion signal is exactly what lets children be processed as they
/// arrive rather than after the whole message is buffered.
#[derive(Default)]
pub struct GlowReader {
    inner: StreamingReader,
}

impl GlowReader {
    pub fn new() -> Self {
        GlowReader::default()
    }

    pub fn feed(&mut self, bytes: &[u8]) -> GlowResult<Vec<Vec<GlowElement>>> {
        let nodes = self.inner.feed(bytes)?;
        nodes.iter().map(decode_root).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_root;
    use crate::elements::Node;
    use crate::path::Path;

    #[test]
    fn feed_decodes_one_root_per_message_across_chunks() {
        let elements = vec![GlowElement::Node {
            path: Path::root(1),
            contents: Node { identifier: Some("device".to_string()), description: None, is_online: None },
            children: Vec::new(),
        }];
        let bytes = encode_root(&elements).unwrap().encode();

        let mut reader = GlowReader::new();
        let mut decoded = Vec::new();
        for chunk in bytes.chunks(3) {
            decoded.extend(reader.feed(chunk).unwrap());
        }
        assert_eq!(decoded, vec![elements]);
    }
}
