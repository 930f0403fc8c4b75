//! Encoding normalization (spec component C4): detects a byte-order mark
//! and transcodes non-UTF-8 buffers to UTF-8 before they reach the matcher,
//! so pattern matching never has to reason about encoding.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

/// The encoding a buffer was detected to be in, based on its leading BOM.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Bom {
    /// No recognized BOM; treated as UTF-8 (or raw bytes, if invalid).
    None,
    /// `EF BB BF`.
    Utf8,
    /// `FF FE`.
    Utf16Le,
    /// `FE FF`.
    Utf16Be,
    /// `FF FE 00 00`.
    Utf32Le,
    /// `00 00 FE FF`.
    Utf32Be,
}

impl Bom {
    /// The number of leading bytes this BOM occupies.
    pub fn len(&self) -> usize {
        match *self {
            Bom::None => 0,
            Bom::Utf8 => 3,
            Bom::Utf16Le | Bom::Utf16Be => 2,
            Bom::Utf32Le | Bom::Utf32Be => 4,
        }
    }
}

/// Detects a byte-order mark at the start of `buf`.
///
/// UTF-32 BOMs must be checked before UTF-16 ones, since `FF FE 00 00`
/// (UTF-32LE) has `FF FE` (UTF-16LE) as a prefix.
pub fn detect_bom(buf: &[u8]) -> Bom {
    if buf.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
        Bom::Utf32Le
    } else if buf.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
        Bom::Utf32Be
    } else if buf.starts_with(&[0xEF, 0xBB, 0xBF]) {
        Bom::Utf8
    } else if buf.starts_with(&[0xFF, 0xFE]) {
        Bom::Utf16Le
    } else if buf.starts_with(&[0xFE, 0xFF]) {
        Bom::Utf16Be
    } else {
        Bom::None
    }
}

/// Normalizes `buf` to UTF-8, stripping any BOM and transcoding UTF-16 to
/// UTF-8 along the way, and reports whether any byte sequence failed to
/// decode cleanly (for UTF-32 and no-BOM buffers, this means "wasn't valid
/// UTF-8 to begin with"): a source with such a sequence counts as binary
/// content, on top of the NUL-byte check in `searcher::is_binary`.
///
/// UTF-32 is recognized but not transcoded (no `encoding_rs` codec exists
/// for it); its BOM is still stripped and the remaining bytes are passed
/// through unchanged. Buffers with no BOM that are already valid UTF-8
/// are returned by reference with no allocation.
pub fn normalize(buf: &[u8]) -> (std::borrow::Cow<[u8]>, bool) {
    let bom = detect_bom(buf);
    let body = &buf[bom.len()..];
    let codec: Option<&'static Encoding> = match bom {
        Bom::Utf16Le => Some(UTF_16LE),
        Bom::Utf16Be => Some(UTF_16BE),
        Bom::Utf8 | Bom::Utf32Le | Bom::Utf32Be | Bom::None => None,
    };
    match codec {
        Some(enc) => {
            let (text, _enc_used, had_errors) = enc.decode(body);
            (std::borrow::Cow::Owned(text.into_owned().into_bytes()), had_errors)
        }
        None => {
            if bom == Bom::None && std::str::from_utf8(buf).is_ok() {
                (std::borrow::Cow::Borrowed(buf), false)
            } else if bom == Bom::None {
                let (text, _enc_used, had_errors) = UTF_8.decode(buf);
                (std::borrow::Cow::Owned(text.into_owned().into_bytes()), had_errors)
            } else {
                let had_errors = std::str::from_utf8(body).is_err();
                (std::borrow::Cow::Borrowed(body), had_errors)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_utf8_bom() {
        assert_eq!(detect_bom(&[0xEF, 0xBB, 0xBF, b'a']), Bom::Utf8);
    }

    #[test]
    fn detects_utf32_before_utf16() {
        assert_eq!(detect_bom(&[0xFF, 0xFE, 0x00, 0x00]), Bom::Utf32Le);
        assert_eq!(detect_bom(&[0xFF, 0xFE, b'a', 0x00]), Bom::Utf16Le);
    }

    #[test]
    fn no_bom_is_none() {
        assert_eq!(detect_bom(b"hello"), Bom::None);
    }

    #[test]
    fn normalize_strips_utf8_bom() {
        let buf = [0xEF, 0xBB, 0xBF, b'h', b'i'];
        let (got, had_errors) = normalize(&buf);
        assert_eq!(&*got, b"hi");
        assert!(!had_errors);
    }

    #[test]
    fn normalize_transcodes_utf16le() {
        let mut buf = vec![0xFF, 0xFE];
        buf.extend_from_slice(&[b'h' as u8, 0x00, b'i' as u8, 0x00]);
        let (got, had_errors) = normalize(&buf);
        assert_eq!(&*got, b"hi");
        assert!(!had_errors);
    }

    #[test]
    fn normalize_passes_through_plain_utf8() {
        let (got, had_errors) = normalize(b"plain text");
        assert_eq!(&*got, b"plain text");
        assert!(!had_errors);
    }

    #[test]
    fn normalize_flags_invalid_utf8() {
        let buf = [b'h', b'i', 0xFF, 0xFE, 0x41];
        let (_got, had_errors) = normalize(&buf);
        assert!(had_errors);
    }
}
