use crate::DecodeError;
use flate2::bufread::GzDecoder;
use std::io::{self, Read};

/// Inflates the gzip-framed response body into a contiguous buffer.
///
/// The uncompressed size is unknown up front, so the output buffer starts
/// at twice the input size and grows as needed. Stream completion is
/// checked strictly: a stream that ends before consuming all input bytes,
/// or input that ends before the stream does, is a
/// [`DecodeError::Compression`] rather than a short read.
///
/// # Errors
///
/// Returns [`DecodeError::Compression`] for any malformed, truncated, or
/// over-long gzip stream.
pub fn inflate(compressed: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut decoder = GzDecoder::new(compressed);
    let mut inflated = Vec::with_capacity(compressed.len().saturating_mul(2));
    decoder.read_to_end(&mut inflated)?;

    // The bufread decoder consumes exactly the bytes belonging to the
    // stream, so anything left over is trailing garbage.
    let remainder = decoder.into_inner();
    if !remainder.is_empty() {
        return Err(DecodeError::Compression(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{} unconsumed bytes after end of gzip stream", remainder.len()),
        )));
    }

    Ok(inflated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn gzip(payload: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(payload).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_round_trip() {
        let payload = b"HAFAS binary response payload".repeat(100);
        let inflated = inflate(&gzip(&payload)).unwrap();
        assert_eq!(inflated, payload);
    }

    #[test]
    fn test_not_gzip_is_rejected() {
        assert!(matches!(
            inflate(b"plain text, no gzip frame"),
            Err(DecodeError::Compression(_))
        ));
    }

    #[test]
    fn test_truncated_stream_is_rejected() {
        let full = gzip(b"some payload that compresses to more than a header");
        let cut = &full[..full.len() - 6];
        assert!(matches!(inflate(cut), Err(DecodeError::Compression(_))));
    }

    #[test]
    fn test_trailing_garbage_is_rejected() {
        let mut data = gzip(b"payload");
        data.extend_from_slice(b"junk");
        assert!(matches!(inflate(&data), Err(DecodeError::Compression(_))));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(matches!(inflate(&[]), Err(DecodeError::Compression(_))));
    }
}
