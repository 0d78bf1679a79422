//! Envelope Codec
//!
//! JSON encoding with every code point above U+007F written as a `\uXXXX` escape
//! (lowercase hex, one escape per UTF-16 code unit), and a decoder that never fails.

use std::io::{self, Write};

use serde::{Serialize, ser::Error as _};
use serde_json::{Value, ser::Formatter};

use super::dto::envelope::Envelope;

/// Compact JSON formatter that keeps string output ASCII-only.
#[derive(Debug, Clone, Copy, Default)]
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..index])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}

/// Serialize `value` to ASCII-only compact JSON.
pub fn encode<T>(value: &T) -> serde_json::Result<String>
where
    T: Serialize + ?Sized,
{
    let mut out = Vec::with_capacity(128);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, AsciiFormatter);
    value.serialize(&mut serializer)?;
    String::from_utf8(out).map_err(serde_json::Error::custom)
}

/// Parse inbound data as JSON.
///
/// Anything that is not valid JSON becomes `{"type":"text","content":<raw>}`.
pub fn decode(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::trace!("Inbound data is not JSON ({}), wrapping as text", e);
            text_fallback(raw)
        }
    }
}

fn text_fallback(raw: &str) -> Value {
    serde_json::to_value(Envelope::text(raw))
        .unwrap_or_else(|_| serde_json::json!({ "type": "text", "content": raw }))
}
