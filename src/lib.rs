/*! Pure Rust, fully safe implementation of LZG compression.

LZG is an LZ77 class format built around one idea: the decoder should be
small, branch-light and require no memory besides the encoded and the decoded
buffer. Every container is self-contained: a 16 byte header carrying the
decoded size, the encoded size and a checksum, followed by the token stream.

# Examples
```
use lzg_flex::{compress, decompress};
let input: &[u8] = b"Hello people, what's up?";
let compressed = compress(input);
let decompressed = decompress(&compressed).unwrap();
assert_eq!(input, &decompressed[..]);
```

Compression level and match-search behaviour can be tuned with
[`EncoderConfig`]:
```
use lzg_flex::{compress_with, decompress, EncoderConfig};
let compressed = compress_with(EncoderConfig::new().level(9), b"aaaaaaaaaaaaaaaaaa");
assert_eq!(decompress(&compressed).unwrap(), b"aaaaaaaaaaaaaaaaaa");
```
*/

mod accel;
mod checksum;
mod compress;
mod decompress;
mod header;


#[cfg(test)]
#[macro_use]
extern crate more_asserts;

pub use compress::{compress, compress_into, compress_with, CompressError, EncoderConfig};
pub use decompress::{decoded_size, decompress, decompress_into, DecompressError};

use crate::header::HEADER_SIZE;

/// Worst case size of an encoded container for `input_len` bytes of input.
///
/// The encoder never produces more than this, falling back to storing the
/// input verbatim when the token stream would grow past it.
#[inline]
pub const fn max_encoded_size(input_len: usize) -> usize {
    HEADER_SIZE + input_len
}

/// A back-reference copies at least this many bytes.
pub(crate) const MIN_MATCH: usize = 3;

/// Longest copy a single token can describe.
pub(crate) const MAX_RUN_LENGTH: usize = 128;

/// Largest offset the distant shape can express; the format maximum.
/// The 19 bit field tops out at 0x7FFFF, plus the 2056 bias.
pub(crate) const MAX_OFFSET: usize = 0x7FFFF + DISTANT_OFFSET_BIAS;

pub(crate) const NUM_MARKERS: usize = 4;

/// Near/RLE shape: offsets 1..=8 in a three bit field.
pub(crate) const NEAR_MAX_OFFSET: usize = 8;

/// Short shape: lengths 3..=6 and offsets 9..=71 in a single byte.
pub(crate) const SHORT_MAX_LENGTH: usize = 6;
pub(crate) const SHORT_MAX_OFFSET: usize = 71;

/// Medium shape: 11 bit offset field biased by 8, so 9..=2055.
pub(crate) const MEDIUM_OFFSET_BIAS: usize = 8;
pub(crate) const MEDIUM_MAX_OFFSET: usize = 2055;

/// Distant shape: 19 bit offset field biased by 2056.
pub(crate) const DISTANT_OFFSET_BIAS: usize = 2056;

/// Search window per compression level 1..=9.
pub(crate) const WINDOW_SIZES: [usize; 9] = [
    2048, 4096, 8192, 16384, 32768, 65536, 131_072, 262_144, 524_288,
];

// The largest window must stay expressible as a back-reference offset.
const _: () = assert!(WINDOW_SIZES[8] <= MAX_OFFSET);

/// Maps the 5 bit length field of a token to the effective copy length.
/// Linear up to 29, then four sparse buckets.
pub(crate) const LENGTH_DECODE_LUT: [u8; 32] = [
    2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, //
    18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 35, 48, 72, 128,
];

/// Inverse of [`LENGTH_DECODE_LUT`]: rounds a raw match length down to the
/// code of the nearest representable bucket. Indices 0..=2 are sentinels, a
/// valid stream never carries them.
pub(crate) const LENGTH_CODE_LUT: [u8; 129] = [
    0, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, // 0..=15
    14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 27, 27, // 16..=31
    27, 27, 27, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, // 32..=47
    29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29, // 48..=63
    29, 29, 29, 29, 29, 29, 29, 29, 30, 30, 30, 30, 30, 30, 30, 30, // 64..=79
    30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, // 80..=95
    30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, // 96..=111
    30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, // 112..=127
    31, // 128
];
