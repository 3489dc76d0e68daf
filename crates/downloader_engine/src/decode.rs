use chardetng::EncodingDetector;
use encoding_rs::Encoding;

use engine_logging::engine_warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding_label: String,
    /// Malformed sequences were replaced with U+FFFD.
    pub had_errors: bool,
}

/// Decode a response body into UTF-8 using: BOM -> Content-Type charset -> chardetng fallback.
pub fn decode_text(bytes: &[u8], content_type: Option<&str>) -> DecodedText {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(label) = content_type.and_then(extract_charset) {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, enc);
        }
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    decode_with(bytes, enc)
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            if key.trim().eq_ignore_ascii_case("charset") {
                Some(value.trim_matches([' ', '"', '\''].as_ref()).to_string())
            } else {
                None
            }
        })
        .next()
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> DecodedText {
    let (text, _, had_errors) = enc.decode(bytes);
    if had_errors {
        engine_warn!("body contained malformed {} sequences", enc.name());
    }
    DecodedText {
        text: text.into_owned(),
        encoding_label: enc.name().to_string(),
        had_errors,
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_text, extract_charset};

    #[test]
    fn bom_wins_over_header() {
        let bytes = [0xEF, 0xBB, 0xBF, b'o', b'k'];
        let decoded = decode_text(&bytes, Some("text/html; charset=iso-8859-1"));
        assert_eq!(decoded.text, "ok");
        assert_eq!(decoded.encoding_label, "UTF-8");
    }

    #[test]
    fn header_charset_is_honoured() {
        let bytes = [b'c', b'a', b'f', 0xE9];
        let decoded = decode_text(&bytes, Some("text/html; Charset=\"ISO-8859-1\""));
        assert_eq!(decoded.text, "café");
        assert!(!decoded.had_errors);
    }

    #[test]
    fn malformed_utf8_is_replaced() {
        let bytes = [b'a', 0xFF, b'b'];
        let decoded = decode_text(&bytes, Some("text/plain; charset=utf-8"));
        assert_eq!(decoded.text, "a\u{FFFD}b");
        assert!(decoded.had_errors);
    }

    #[test]
    fn charset_parameter_lookup() {
        assert_eq!(
            extract_charset("text/html; charset=utf-8").as_deref(),
            Some("utf-8")
        );
        assert_eq!(extract_charset("text/html"), None);
    }
}
