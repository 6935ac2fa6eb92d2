//! Text decoding and content sniffing helpers.

use std::borrow::Cow;

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the hint encoding (from `<meta charset>` or `@charset`)
/// 3. Falls back to Windows-1252 (common in hand-edited templates)
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
///
/// # Examples
///
/// ```
/// use mailman::util::decode_text;
///
/// assert_eq!(decode_text(b"Hello", None), "Hello");
/// assert_eq!(decode_text(b"caf\xe9", None), "caf\u{e9}");
/// ```
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    // Try UTF-8 first (handles BOM automatically)
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    // Windows-1252 is a superset of ISO-8859-1 and never fails
    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Decode an HTML or CSS file, honoring a declared charset.
pub fn decode_document(bytes: &[u8]) -> Cow<'_, str> {
    decode_text(bytes, extract_charset(bytes))
}

// ============================================================================
// Encoding Detection
// ============================================================================

/// Extract a declared charset from the start of an HTML or CSS file.
///
/// Recognizes `<meta charset="...">`, the `charset=` parameter of a
/// `content-type` meta tag, and `@charset "...";`. Only the first 1024
/// bytes are checked.
pub fn extract_charset(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(1024)];

    let pos = prefix
        .windows(8)
        .position(|w| w.eq_ignore_ascii_case(b"charset="))
        .map(|p| p + 8)
        .or_else(|| {
            prefix
                .windows(9)
                .position(|w| w.eq_ignore_ascii_case(b"@charset "))
                .map(|p| p + 9)
        })?;
    let rest = &prefix[pos..];

    let (start, terminators) = match rest.first()? {
        b'"' => (1, b"\"".as_slice()),
        b'\'' => (1, b"'".as_slice()),
        _ => (0, b"\"'>; /\t\r\n".as_slice()),
    };
    let value = &rest[start..];
    let end = value
        .iter()
        .position(|b| terminators.contains(b))
        .unwrap_or(value.len());

    let name = std::str::from_utf8(&value[..end]).ok()?;
    (!name.is_empty()).then_some(name)
}

// ============================================================================
// Document Detection
// ============================================================================

/// Check whether HTML is a whole document rather than a fragment.
///
/// True when the markup contains a doctype or an explicit `<html>`,
/// `<head>` or `<body>` tag (case-insensitive). `<header>` does not count.
pub fn looks_like_document(html: &str) -> bool {
    let bytes = html.as_bytes();
    if find_ascii_ci(bytes, b"<!doctype", 0).is_some() {
        return true;
    }

    [b"<html".as_slice(), b"<head", b"<body"].iter().any(|tag| {
        let mut from = 0;
        while let Some(pos) = find_ascii_ci(bytes, tag, from) {
            let next = bytes.get(pos + tag.len()).copied();
            if !matches!(next, Some(b) if b.is_ascii_alphanumeric() || b == b'-') {
                return true;
            }
            from = pos + 1;
        }
        false
    })
}

fn find_ascii_ci(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
        .map(|p| p + from)
}

// ============================================================================
// Attachment Types
// ============================================================================

/// Detect an attachment's MIME type from its file name or magic bytes.
///
/// Returns `None` if the type is unknown; callers usually fall back to
/// `application/octet-stream`.
pub fn detect_mime_type(filename: &str, data: &[u8]) -> Option<&'static str> {
    let lower = filename.to_ascii_lowercase();
    let ext = lower.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");

    let by_ext = match ext {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        "webp" => Some("image/webp"),
        "pdf" => Some("application/pdf"),
        "zip" => Some("application/zip"),
        "txt" => Some("text/plain"),
        "csv" => Some("text/csv"),
        "htm" | "html" => Some("text/html"),
        "ics" => Some("text/calendar"),
        "json" => Some("application/json"),
        _ => None,
    };
    if by_ext.is_some() {
        return by_ext;
    }

    // Fallback to magic byte detection
    match data {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, b'P', b'N', b'G', ..] => Some("image/png"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'%', b'P', b'D', b'F', ..] => Some("application/pdf"),
        [b'P', b'K', 0x03, 0x04, ..] => Some("application/zip"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_borrows() {
        let decoded = decode_text("héllo".as_bytes(), None);
        assert!(matches!(decoded, Cow::Borrowed(_)));
        assert_eq!(decoded, "héllo");
    }

    #[test]
    fn test_decode_with_hint() {
        // 0xB9 is "ą" in ISO-8859-2 but "¹" in Windows-1252
        let bytes = b"\xb9";
        assert_eq!(decode_text(bytes, Some("iso-8859-2")), "\u{105}");
        assert_eq!(decode_text(bytes, None), "\u{b9}");
    }

    #[test]
    fn test_extract_charset_from_meta() {
        assert_eq!(
            extract_charset(br#"<html><head><meta charset="windows-1252">"#),
            Some("windows-1252")
        );
        assert_eq!(
            extract_charset(
                br#"<meta http-equiv="Content-Type" content="text/html; charset=ISO-8859-1">"#
            ),
            Some("ISO-8859-1")
        );
        assert_eq!(extract_charset(b"<meta charset=utf-8>"), Some("utf-8"));
        assert_eq!(extract_charset(b"<p>no charset</p>"), None);
    }

    #[test]
    fn test_extract_charset_from_css() {
        assert_eq!(
            extract_charset(b"@charset \"iso-8859-15\";\nh1 { color: red }"),
            Some("iso-8859-15")
        );
    }

    #[test]
    fn test_decode_document_uses_declared_charset() {
        let mut bytes = br#"<meta charset="iso-8859-2"><p>"#.to_vec();
        bytes.push(0xb9);
        assert!(decode_document(&bytes).ends_with("<p>\u{105}"));
    }

    #[test]
    fn test_looks_like_document() {
        assert!(looks_like_document("<!DOCTYPE html><p>x</p>"));
        assert!(looks_like_document("<HTML><p>x</p></HTML>"));
        assert!(looks_like_document("<head><title>t</title></head>"));
        assert!(looks_like_document("<body class=\"x\">hi</body>"));
        assert!(looks_like_document("<header>x</header><body>"));
        assert!(!looks_like_document("<h1>Hola</h1>"));
        assert!(!looks_like_document("<header>x</header>"));
        assert!(!looks_like_document("<p>html head body</p>"));
    }

    #[test]
    fn test_detect_mime_type() {
        assert_eq!(detect_mime_type("invoice.PDF", &[]), Some("application/pdf"));
        assert_eq!(detect_mime_type("logo.png", &[]), Some("image/png"));
        assert_eq!(detect_mime_type("blob", b"%PDF-1.7"), Some("application/pdf"));
        assert_eq!(
            detect_mime_type("blob", &[0x89, b'P', b'N', b'G', 0x0D, 0x0A]),
            Some("image/png")
        );
        assert_eq!(detect_mime_type("blob", b"plain"), None);
    }
}
