//! The 16 byte container header.
//!
//! Layout (multi byte fields big endian):
//! `"LZG"` · decoded size (u32) · encoded size (u32) · checksum (u32) ·
//! method byte. The checksum covers the encoded body only, so the header can
//! be (re)written after the body is finished.

use crate::checksum::checksum;
use crate::DecompressError;

pub(crate) const HEADER_SIZE: usize = 16;
pub(crate) const MAGIC: [u8; 3] = *b"LZG";

/// How the payload is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Method {
    /// Verbatim copy of the input; encoded size equals decoded size.
    Copy = 0,
    /// The LZG1 token stream.
    Lzg1 = 1,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Header {
    pub decoded_size: u32,
    pub encoded_size: u32,
    pub checksum: u32,
    pub method: Method,
}

impl Header {
    /// Parses and fully validates the header of `input`, including the
    /// checksum over the body. This is the only place structural errors are
    /// detected before token dispatch.
    pub(crate) fn read(input: &[u8]) -> Result<Header, DecompressError> {
        if input.len() < HEADER_SIZE {
            return Err(DecompressError::TruncatedHeader);
        }
        if input[0..3] != MAGIC {
            return Err(DecompressError::WrongMagicNumber);
        }
        let decoded_size = u32::from_be_bytes(input[3..7].try_into().unwrap());
        let encoded_size = u32::from_be_bytes(input[7..11].try_into().unwrap());
        if encoded_size as usize != input.len() - HEADER_SIZE {
            return Err(DecompressError::EncodedSizeMismatch {
                expected: encoded_size,
                actual: (input.len() - HEADER_SIZE) as u32,
            });
        }
        let expected = u32::from_be_bytes(input[11..15].try_into().unwrap());
        let actual = checksum(&input[HEADER_SIZE..]);
        if actual != expected {
            return Err(DecompressError::ChecksumMismatch { expected, actual });
        }
        let method = match input[15] {
            0 => Method::Copy,
            1 => Method::Lzg1,
            other => return Err(DecompressError::UnsupportedMethod(other)),
        };
        Ok(Header {
            decoded_size,
            encoded_size,
            checksum: expected,
            method,
        })
    }

    /// Serializes the header into the first 16 bytes of `out`.
    pub(crate) fn write(&self, out: &mut [u8]) {
        out[0..3].copy_from_slice(&MAGIC);
        out[3..7].copy_from_slice(&self.decoded_size.to_be_bytes());
        out[7..11].copy_from_slice(&self.encoded_size.to_be_bytes());
        out[11..15].copy_from_slice(&self.checksum.to_be_bytes());
        out[15] = self.method as u8;
    }
}

/// Reads the decoded size without validating the rest of the container.
/// Needs the magic plus the size field, seven bytes.
pub(crate) fn peek_decoded_size(input: &[u8]) -> Result<usize, DecompressError> {
    if input.len() < 7 {
        return Err(DecompressError::TruncatedHeader);
    }
    if input[0..3] != MAGIC {
        return Err(DecompressError::WrongMagicNumber);
    }
    Ok(u32::from_be_bytes(input[3..7].try_into().unwrap()) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_container(body: &[u8], method: Method) -> Vec<u8> {
        let mut out = vec![0u8; HEADER_SIZE + body.len()];
        out[HEADER_SIZE..].copy_from_slice(body);
        Header {
            decoded_size: 123,
            encoded_size: body.len() as u32,
            checksum: checksum(body),
            method,
        }
        .write(&mut out);
        out
    }

    #[test]
    fn roundtrip() {
        let container = sample_container(b"four", Method::Lzg1);
        let header = Header::read(&container).unwrap();
        assert_eq!(header.decoded_size, 123);
        assert_eq!(header.encoded_size, 4);
        assert_eq!(header.method, Method::Lzg1);
    }

    #[test]
    fn truncated() {
        assert_eq!(
            Header::read(&[b'L', b'Z', b'G']).unwrap_err(),
            DecompressError::TruncatedHeader
        );
        assert_eq!(
            peek_decoded_size(b"LZG\0\0\0").unwrap_err(),
            DecompressError::TruncatedHeader
        );
    }

    #[test]
    fn wrong_magic() {
        let mut container = sample_container(b"", Method::Copy);
        container[1] = b'4';
        assert_eq!(
            Header::read(&container).unwrap_err(),
            DecompressError::WrongMagicNumber
        );
        assert_eq!(
            peek_decoded_size(&container).unwrap_err(),
            DecompressError::WrongMagicNumber
        );
    }

    #[test]
    fn encoded_size_must_match_buffer() {
        let mut container = sample_container(b"four", Method::Lzg1);
        container.push(0);
        assert!(matches!(
            Header::read(&container).unwrap_err(),
            DecompressError::EncodedSizeMismatch { expected: 4, actual: 5 }
        ));
    }

    #[test]
    fn checksum_mismatch() {
        let mut container = sample_container(b"four", Method::Lzg1);
        container[HEADER_SIZE] ^= 0x20;
        assert!(matches!(
            Header::read(&container).unwrap_err(),
            DecompressError::ChecksumMismatch { .. }
        ));
    }

    #[test]
    fn method_out_of_range() {
        for bad in [2u8, 3, 0x7F, 0xFF] {
            let mut container = sample_container(b"four", Method::Copy);
            container[15] = bad;
            assert_eq!(
                Header::read(&container).unwrap_err(),
                DecompressError::UnsupportedMethod(bad)
            );
        }
    }

    #[test]
    fn peek_ignores_body() {
        // Seven bytes are enough, nothing past the size field is looked at.
        let container = sample_container(b"", Method::Copy);
        assert_eq!(peek_decoded_size(&container[..7]).unwrap(), 123);
    }
}
