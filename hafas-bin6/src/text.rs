use crate::DecodeError;
use encoding_rs::Encoding;

/// The string table literal meaning "no platform assigned".
pub(crate) const NO_PLATFORM: &str = "---";

/// Looks up the encoding declared in the extension header by its label
/// (e.g. `iso-8859-1`).
pub(crate) fn encoding_for_label(label: &[u8]) -> Result<&'static Encoding, DecodeError> {
    Encoding::for_label(label).ok_or(DecodeError::Encoding)
}

/// Converts a null-terminated string-table slice from the declared
/// response encoding to UTF-8.
///
/// Decoding is strict: bytes that are not valid for the declared encoding
/// fail the decode instead of being replaced.
pub(crate) fn decode_text(bytes: &[u8], encoding: &'static Encoding) -> Result<String, DecodeError> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(std::borrow::Cow::into_owned)
        .ok_or(DecodeError::Encoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1_umlauts() {
        let encoding = encoding_for_label(b"iso-8859-1").unwrap();
        // "Rheinfähre, Erpel" in latin-1
        let bytes = b"Rheinf\xe4hre, Erpel";
        assert_eq!(decode_text(bytes, encoding).unwrap(), "Rheinfähre, Erpel");
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        assert!(matches!(
            encoding_for_label(b"ebcdic-37"),
            Err(DecodeError::Encoding)
        ));
    }

    #[test]
    fn test_invalid_bytes_for_utf8_are_rejected() {
        let encoding = encoding_for_label(b"utf-8").unwrap();
        assert!(matches!(
            decode_text(b"\xff\xfe", encoding),
            Err(DecodeError::Encoding)
        ));
    }
}
