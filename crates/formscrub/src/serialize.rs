use std::io;

use ammonia::Document;

/// Strategy for rendering a cleaned document back to text.
///
/// The scanner takes the strategy as an explicit constructor parameter, so
/// alternative renderings plug in without touching the engine. An
/// implementation must be deterministic (same document, same bytes) and
/// must not write anywhere except the provided sink. Write errors propagate
/// to the caller as scan-level failures; they are never swallowed.
pub trait SerializeDocument {
    fn write_document(&self, document: &Document, sink: &mut Vec<u8>) -> io::Result<()>;
}

/// The fixed production serializer.
///
/// Output is UTF-8 with no indentation of its own, no injected meta or
/// doctype declarations, and no further entity escaping beyond what the
/// allow-list pass already produced. Whitespace inside the content is left
/// exactly as the cleaned document holds it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactSerializer;

impl SerializeDocument for CompactSerializer {
    fn write_document(&self, document: &Document, sink: &mut Vec<u8>) -> io::Result<()> {
        document.write_to(sink)
    }
}
