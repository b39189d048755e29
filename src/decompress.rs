//! The decompression algorithm.
//!
//! After the header is validated the payload is a marker-dispatched token
//! stream. Every payload read is preceded by a bound test and every output
//! write by a capacity test; the checks stay in release builds, they are
//! what stands between corrupt input and out of bounds copies.

use core::fmt;

use crate::header::{peek_decoded_size, Header, Method, HEADER_SIZE};
use crate::{DISTANT_OFFSET_BIAS, LENGTH_DECODE_LUT, MEDIUM_OFFSET_BIAS, NUM_MARKERS};

/// An error representing invalid compressed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompressError {
    /// The input is shorter than the container header.
    TruncatedHeader,
    /// The container does not start with `"LZG"`.
    WrongMagicNumber,
    /// The method byte names neither verbatim storage nor LZG1.
    UnsupportedMethod(u8),
    /// The encoded size in the header disagrees with the buffer length.
    EncodedSizeMismatch { expected: u32, actual: u32 },
    /// The checksum over the encoded body does not match the header.
    ChecksumMismatch { expected: u32, actual: u32 },
    /// Output buffer cannot hold the decoded data.
    OutputTooSmall { expected: usize, actual: usize },
    /// Expected another byte, but the payload ended mid-token.
    ExpectedAnotherByte,
    /// A back-reference points before the start of the produced output.
    OffsetOutOfBounds,
    /// A literal or copy would run past the decoded size.
    OutputOverflow,
    /// The stream ended with fewer bytes produced than the header promised.
    UncompressedSizeDiffers { expected: usize, actual: usize },
}

impl fmt::Display for DecompressError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DecompressError::TruncatedHeader => {
                f.write_str("input ends before the 16 byte container header")
            }
            DecompressError::WrongMagicNumber => f.write_str("wrong magic number for LZG data"),
            DecompressError::UnsupportedMethod(method) => {
                write!(f, "unsupported container method {:?}", method)
            }
            DecompressError::EncodedSizeMismatch { expected, actual } => write!(
                f,
                "header claims {:?} encoded bytes, buffer holds {:?}",
                expected, actual
            ),
            DecompressError::ChecksumMismatch { expected, actual } => write!(
                f,
                "body checksum is {:#010x}, header says {:#010x}",
                actual, expected
            ),
            DecompressError::OutputTooSmall { expected, actual } => write!(
                f,
                "output ({:?}) is too small for the decompressed data ({:?})",
                actual, expected
            ),
            DecompressError::ExpectedAnotherByte => {
                f.write_str("expected another byte, found none")
            }
            DecompressError::OffsetOutOfBounds => {
                f.write_str("the offset to copy is not contained in the decompressed buffer")
            }
            DecompressError::OutputOverflow => {
                f.write_str("a copy would write past the decoded size")
            }
            DecompressError::UncompressedSizeDiffers { expected, actual } => write!(
                f,
                "the expected decompressed output size is {}, actual {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for DecompressError {}

/// Reads the decoded size out of a container header without validating the
/// body. Needs at least seven bytes of input; the checksum is only checked
/// by [`decompress`] / [`decompress_into`].
#[inline]
pub fn decoded_size(input: &[u8]) -> Result<usize, DecompressError> {
    peek_decoded_size(input)
}

/// Decompress the container in `input` into `output`, returning the number
/// of bytes written. On any error the output content is unspecified and
/// zero bytes are considered produced.
pub fn decompress_into(input: &[u8], output: &mut [u8]) -> Result<usize, DecompressError> {
    let header = Header::read(input)?;
    decompress_body(&header, input, output)
}

/// Decompress the container in `input` into a new vec sized from the
/// header.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>, DecompressError> {
    let header = Header::read(input)?;
    let mut output = vec![0u8; header.decoded_size as usize];
    decompress_body(&header, input, &mut output)?;
    Ok(output)
}

fn decompress_body(
    header: &Header,
    input: &[u8],
    output: &mut [u8],
) -> Result<usize, DecompressError> {
    let decoded_size = header.decoded_size as usize;
    if output.len() < decoded_size {
        return Err(DecompressError::OutputTooSmall {
            expected: decoded_size,
            actual: output.len(),
        });
    }
    let payload = &input[HEADER_SIZE..];
    match header.method {
        Method::Copy => {
            if header.encoded_size != header.decoded_size {
                return Err(DecompressError::UncompressedSizeDiffers {
                    expected: decoded_size,
                    actual: header.encoded_size as usize,
                });
            }
            output[..decoded_size].copy_from_slice(payload);
            Ok(decoded_size)
        }
        Method::Lzg1 => decode_lzg1(payload, &mut output[..decoded_size]),
    }
}

/// The LZG1 state machine over a validated payload. `output` is exactly the
/// decoded size.
fn decode_lzg1(payload: &[u8], output: &mut [u8]) -> Result<usize, DecompressError> {
    if payload.len() < NUM_MARKERS {
        return Err(DecompressError::ExpectedAnotherByte);
    }
    let (distant, medium, short, near) = (payload[0], payload[1], payload[2], payload[3]);
    let mut is_marker = [false; 256];
    for &marker in &payload[..NUM_MARKERS] {
        is_marker[usize::from(marker)] = true;
    }

    let out_len = output.len();
    let mut src = NUM_MARKERS;
    let mut dst = 0;

    while src < payload.len() {
        let symbol = payload[src];
        src += 1;

        if !is_marker[usize::from(symbol)] {
            if dst >= out_len {
                return Err(DecompressError::OutputOverflow);
            }
            output[dst] = symbol;
            dst += 1;
            continue;
        }

        let b = *payload
            .get(src)
            .ok_or(DecompressError::ExpectedAnotherByte)?;
        src += 1;
        if b == 0 {
            // Escaped single occurrence of the marker byte itself.
            if dst >= out_len {
                return Err(DecompressError::OutputOverflow);
            }
            output[dst] = symbol;
            dst += 1;
            continue;
        }

        // Markers may collide on degenerate input; the first shape that
        // names the symbol wins, same on every decoder.
        let (length, offset) = if symbol == distant {
            let b2 = *payload
                .get(src)
                .ok_or(DecompressError::ExpectedAnotherByte)?;
            let b3 = *payload
                .get(src + 1)
                .ok_or(DecompressError::ExpectedAnotherByte)?;
            src += 2;
            let field = (usize::from(b & 0xE0) << 11) | (usize::from(b2) << 8) | usize::from(b3);
            (
                usize::from(LENGTH_DECODE_LUT[usize::from(b & 0x1F)]),
                field + DISTANT_OFFSET_BIAS,
            )
        } else if symbol == medium {
            let b2 = *payload
                .get(src)
                .ok_or(DecompressError::ExpectedAnotherByte)?;
            src += 1;
            let field = (usize::from(b & 0xE0) << 3) | usize::from(b2);
            (
                usize::from(LENGTH_DECODE_LUT[usize::from(b & 0x1F)]),
                field + MEDIUM_OFFSET_BIAS,
            )
        } else if symbol == short {
            (usize::from(b >> 6) + 3, usize::from(b & 0x3F) + 8)
        } else {
            debug_assert_eq!(symbol, near);
            (
                usize::from(LENGTH_DECODE_LUT[usize::from(b & 0x1F)]),
                usize::from(b >> 5) + 1,
            )
        };

        if offset > dst {
            return Err(DecompressError::OffsetOutOfBounds);
        }
        if dst + length > out_len {
            return Err(DecompressError::OutputOverflow);
        }

        let start = dst - offset;
        if offset == 1 {
            let value = output[start];
            output[dst..dst + length].fill(value);
        } else if offset >= length {
            output.copy_within(start..start + length, dst);
        } else {
            // offset < length reads bytes this same copy writes: the copy
            // must stay byte-by-byte to extend the pattern.
            for i in 0..length {
                output[dst + i] = output[start + i];
            }
        }
        dst += length;
    }

    if dst != out_len {
        return Err(DecompressError::UncompressedSizeDiffers {
            expected: out_len,
            actual: dst,
        });
    }
    Ok(dst)
}
