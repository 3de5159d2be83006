//! Content digests for input files and checksums for embedded images.

use blake3::Hasher as Blake3Hasher;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Hashing helpers for both cache layers.
///
/// File digests must be collision resistant: a false match hands one file
/// another file's converted output. Image checksums only key OCR text, so a
/// cheap Adler-32 is enough there.
pub struct Hasher;

impl Hasher {
    /// Generate a BLAKE3 hash of file contents for whole-file deduplication.
    ///
    /// Streams the file so large decks are never fully loaded into memory.
    pub fn content_hash(path: &Path) -> std::io::Result<String> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut hasher = Blake3Hasher::new();

        let mut buffer = [0u8; 65536];
        loop {
            let bytes_read = reader.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(hasher.finalize().to_hex().to_string())
    }

    /// Adler-32 checksum of a payload.
    pub fn checksum(data: &[u8]) -> u32 {
        adler2::adler32_slice(data)
    }

    /// Checksum of a base64 image payload, computed over its padded form.
    pub fn image_checksum(payload: &str) -> u32 {
        Self::checksum(pad_base64(payload).as_bytes())
    }
}

/// Pad a base64 payload with `=` up to a length divisible by 4.
pub fn pad_base64(payload: &str) -> Cow<'_, str> {
    match payload.len() % 4 {
        0 => Cow::Borrowed(payload),
        rem => {
            let mut padded = String::with_capacity(payload.len() + 4 - rem);
            padded.push_str(payload);
            padded.extend(std::iter::repeat('=').take(4 - rem));
            Cow::Owned(padded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_content_hash_matches_blake3() {
        let file = temp_file(b"slide deck bytes");
        let streamed = Hasher::content_hash(file.path()).unwrap();
        assert_eq!(streamed, blake3::hash(b"slide deck bytes").to_hex().to_string());
        assert_eq!(streamed.len(), 64);
    }

    #[test]
    fn test_content_hash_differs_on_content() {
        let a = Hasher::content_hash(temp_file(b"notes v1").path()).unwrap();
        let b = Hasher::content_hash(temp_file(b"notes v2").path()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_content_hash_missing_file() {
        assert!(Hasher::content_hash(Path::new("/definitely/not/here.pdf")).is_err());
    }

    #[test]
    fn test_checksum_known_value() {
        // Reference Adler-32 value for "Wikipedia"
        assert_eq!(Hasher::checksum(b"Wikipedia"), 0x11E6_0398);
    }

    #[test]
    fn test_pad_base64() {
        assert_eq!(pad_base64("QUJD"), "QUJD");
        assert_eq!(pad_base64("QUI"), "QUI=");
        assert_eq!(pad_base64("QQ"), "QQ==");
        assert!(matches!(pad_base64("QUJD"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_padding_canonicalizes_checksum() {
        assert_eq!(Hasher::image_checksum("QQ"), Hasher::image_checksum("QQ=="));
        assert_eq!(Hasher::image_checksum("QUI"), Hasher::image_checksum("QUI="));
        assert_ne!(Hasher::image_checksum("QQ"), Hasher::image_checksum("QUI"));
    }
}
