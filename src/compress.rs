//! The compression algorithm.
//!
//! One pass over the input. A histogram pass first picks the four rarest
//! byte values as marker symbols, so that escaping literal occurrences of
//! the markers costs as little as possible. The main loop then asks the
//! search accelerator for the best back-reference at every position and
//! emits whichever of the four token shapes encodes it in the fewest bytes,
//! or a literal when no match pays for itself.
//!
//! If the token stream would ever grow past `max_encoded_size`, the whole
//! pass is abandoned and the container is rewritten as a verbatim copy of
//! the input. That keeps the worst case bound exact and makes encoding
//! infallible for sanely sized buffers.

use core::fmt;

use crate::accel::{SearchAccel, NO_POS};
use crate::checksum::checksum;
use crate::header::{Header, Method, HEADER_SIZE};
use crate::{
    max_encoded_size, DISTANT_OFFSET_BIAS, LENGTH_CODE_LUT, LENGTH_DECODE_LUT, MAX_RUN_LENGTH,
    MEDIUM_MAX_OFFSET, MEDIUM_OFFSET_BIAS, MIN_MATCH, NEAR_MAX_OFFSET, NUM_MARKERS,
    SHORT_MAX_LENGTH, SHORT_MAX_OFFSET, WINDOW_SIZES,
};

/// An error representing a compression call that could not be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressError {
    /// The output buffer is smaller than [`max_encoded_size`] of the input.
    /// The overflow fallback needs that much room to be able to guarantee
    /// success.
    OutputTooSmall { expected: usize, actual: usize },
    /// The input is too large for the container's 32 bit size fields.
    InputTooLarge,
}

impl fmt::Display for CompressError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompressError::OutputTooSmall { expected, actual } => write!(
                f,
                "output ({:?}) is smaller than the worst case encoded size ({:?})",
                actual, expected
            ),
            CompressError::InputTooLarge => {
                f.write_str("input does not fit the container's 32 bit size fields")
            }
        }
    }
}

impl std::error::Error for CompressError {}

/// Encoder settings: compression level, match-search key width and an
/// optional progress callback.
///
/// ```
/// use lzg_flex::EncoderConfig;
/// let config = EncoderConfig::new().level(9).fast(false);
/// ```
pub struct EncoderConfig<'a> {
    /// Compression level 1..=9, selecting the search window (2 KiB up to
    /// 512 KiB). Out of range values clamp. Default 5.
    pub level: u32,
    /// Use 3 byte match keys instead of 2 byte ones. Costs a bigger
    /// accelerator table, walks far fewer false candidates. Default true.
    pub fast: bool,
    /// Called with the integer percentage whenever it changes, and with 100
    /// once the encode finishes.
    pub progress: Option<&'a mut dyn FnMut(u32)>,
}

impl Default for EncoderConfig<'_> {
    fn default() -> Self {
        EncoderConfig {
            level: 5,
            fast: true,
            progress: None,
        }
    }
}

impl<'a> EncoderConfig<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn fast(mut self, fast: bool) -> Self {
        self.fast = fast;
        self
    }

    pub fn progress(mut self, progress: &'a mut dyn FnMut(u32)) -> Self {
        self.progress = Some(progress);
        self
    }

    fn window(&self) -> usize {
        WINDOW_SIZES[(self.level.clamp(1, 9) - 1) as usize]
    }
}

/// Compress all bytes of `input` with the default configuration.
///
/// # Panics
/// Panics if the input is larger than the container's 32 bit size fields
/// can describe.
#[inline]
pub fn compress(input: &[u8]) -> Vec<u8> {
    compress_with(EncoderConfig::new(), input)
}

/// Compress all bytes of `input` with the given configuration.
///
/// # Panics
/// Panics if the input is larger than the container's 32 bit size fields
/// can describe.
#[inline]
pub fn compress_with(config: EncoderConfig, input: &[u8]) -> Vec<u8> {
    let mut output = vec![0u8; max_encoded_size(input.len())];
    let written = compress_into(input, &mut output, config)
        .expect("output is sized to max_encoded_size");
    output.truncate(written);
    output
}

/// Compress all bytes of `input` into `output`, returning the number of
/// bytes written (at least 16: the container header).
///
/// `output` must hold at least [`max_encoded_size`] of the input; the
/// fallback to verbatim storage relies on that room, which is also what
/// makes the call infallible beyond the two argument checks.
pub fn compress_into(
    input: &[u8],
    output: &mut [u8],
    mut config: EncoderConfig,
) -> Result<usize, CompressError> {
    if input.len() > u32::MAX as usize - HEADER_SIZE {
        return Err(CompressError::InputTooLarge);
    }
    let worst_case = max_encoded_size(input.len());
    if output.len() < worst_case {
        return Err(CompressError::OutputTooSmall {
            expected: worst_case,
            actual: output.len(),
        });
    }

    if !input.is_empty() {
        if let Some(end) = lzg1_pass(input, output, &mut config) {
            return Ok(finalize(input.len(), output, end, Method::Lzg1));
        }
    }

    // Token stream would not fit (or there is nothing to encode): store the
    // input verbatim. Still a success, the caller sized the buffer for it.
    output[HEADER_SIZE..worst_case].copy_from_slice(input);
    if let Some(callback) = config.progress.as_mut() {
        callback(100);
    }
    Ok(finalize(input.len(), output, worst_case, Method::Copy))
}

/// Fills in the sizes, checksums the body and writes the header.
fn finalize(input_len: usize, output: &mut [u8], end: usize, method: Method) -> usize {
    Header {
        decoded_size: input_len as u32,
        encoded_size: (end - HEADER_SIZE) as u32,
        checksum: checksum(&output[HEADER_SIZE..end]),
        method,
    }
    .write(output);
    end
}

/// Runs the LZG1 token pass. Returns the end of the written container, or
/// `None` if the stream would have overflowed the `max_encoded_size` bound.
fn lzg1_pass(input: &[u8], output: &mut [u8], config: &mut EncoderConfig) -> Option<usize> {
    let markers = select_markers(input);
    let mut is_marker = [false; 256];
    for &marker in &markers {
        is_marker[usize::from(marker)] = true;
    }

    let mut accel = SearchAccel::new(config.window(), config.fast);

    // Emits never run past the worst case bound, even into a roomier
    // buffer; overflowing it is what triggers the verbatim fallback.
    let out_end = HEADER_SIZE + input.len();
    let mut dst = HEADER_SIZE;

    if dst + NUM_MARKERS > out_end {
        return None;
    }
    output[dst..dst + NUM_MARKERS].copy_from_slice(&markers);
    dst += NUM_MARKERS;

    let mut pos = 0;
    let mut last_percent = u32::MAX;
    while pos < input.len() {
        if let Some(callback) = config.progress.as_mut() {
            let percent = (100 * pos as u64 / input.len() as u64) as u32;
            if percent != last_percent {
                callback(percent);
                last_percent = percent;
            }
        }

        let symbol = input[pos];
        // A literal colliding with a marker needs a two byte escape.
        let literal_cost = if is_marker[usize::from(symbol)] { 2 } else { 1 };

        accel.update(input, pos);

        if let Some((length, offset)) = find_match(input, pos, &accel, literal_cost) {
            let code = LENGTH_CODE_LUT[length];
            if offset <= NEAR_MAX_OFFSET {
                if dst + 2 > out_end {
                    return None;
                }
                output[dst] = markers[3];
                output[dst + 1] = (((offset - 1) as u8) << 5) | code;
                dst += 2;
            } else if length <= SHORT_MAX_LENGTH && offset <= SHORT_MAX_OFFSET {
                if dst + 2 > out_end {
                    return None;
                }
                output[dst] = markers[2];
                output[dst + 1] = (((length - MIN_MATCH) as u8) << 6) | ((offset - 8) as u8);
                dst += 2;
            } else if offset <= MEDIUM_MAX_OFFSET {
                if dst + 3 > out_end {
                    return None;
                }
                let field = offset - MEDIUM_OFFSET_BIAS;
                output[dst] = markers[1];
                output[dst + 1] = (((field >> 3) as u8) & 0xE0) | code;
                output[dst + 2] = field as u8;
                dst += 3;
            } else {
                if dst + 4 > out_end {
                    return None;
                }
                let field = offset - DISTANT_OFFSET_BIAS;
                output[dst] = markers[0];
                output[dst + 1] = (((field >> 11) as u8) & 0xE0) | code;
                output[dst + 2] = (field >> 8) as u8;
                output[dst + 3] = field as u8;
                dst += 4;
            }

            // The skipped positions still feed the accelerator.
            for interior in pos + 1..pos + length {
                accel.update(input, interior);
            }
            pos += length;
        } else {
            if dst >= out_end {
                return None;
            }
            output[dst] = symbol;
            dst += 1;
            pos += 1;
            if is_marker[usize::from(symbol)] {
                if dst >= out_end {
                    return None;
                }
                output[dst] = 0;
                dst += 1;
            }
        }
    }

    if let Some(callback) = config.progress.as_mut() {
        callback(100);
    }
    Some(dst)
}

/// Picks the four least frequent byte values of `input` as the marker
/// symbols. Ties break toward the lower byte value so that two encoders
/// agree bit-exactly.
fn select_markers(input: &[u8]) -> [u8; NUM_MARKERS] {
    let mut histogram = [(0u32, 0u8); 256];
    for (symbol, slot) in histogram.iter_mut().enumerate() {
        slot.1 = symbol as u8;
    }
    for &byte in input {
        histogram[usize::from(byte)].0 += 1;
    }
    // Lexicographic on (count, symbol): the tie break is part of the sort key.
    histogram.sort_unstable();
    [
        histogram[0].1,
        histogram[1].1,
        histogram[2].1,
        histogram[3].1,
    ]
}

/// Encoded size of the cheapest shape that can represent `(length, offset)`.
#[inline]
fn token_cost(length: usize, offset: usize) -> usize {
    if offset <= NEAR_MAX_OFFSET {
        2
    } else if length <= SHORT_MAX_LENGTH && offset <= SHORT_MAX_OFFSET {
        2
    } else if offset <= MEDIUM_MAX_OFFSET {
        3
    } else {
        4
    }
}

/// Returns the back-reference at `pos` with the greatest net byte win, or
/// `None` when no candidate beats emitting a literal.
///
/// Candidates come newest-first from the accelerator, so on equal win the
/// smallest offset is kept; small offsets occupy the cheaper shapes.
fn find_match(
    input: &[u8],
    pos: usize,
    accel: &SearchAccel,
    literal_cost: usize,
) -> Option<(usize, usize)> {
    let window = accel.window();
    let key_len = accel.key_len();
    let max_len = MAX_RUN_LENGTH.min(input.len() - pos);

    let mut best_len = 0;
    let mut best_offset = 0;
    let mut best_win = 0isize;

    let mut candidate = accel.prev(pos);
    while candidate != NO_POS {
        let q = candidate as usize;
        let offset = pos - q;
        if offset >= window {
            break;
        }

        // The first key_len bytes are equal by construction of the chain.
        let mut len = key_len;
        while len < max_len && input[q + len] == input[pos + len] {
            len += 1;
        }

        // Only bucket lengths are encodable; round down before costing.
        let quantized = usize::from(LENGTH_DECODE_LUT[usize::from(LENGTH_CODE_LUT[len])]);
        if quantized >= MIN_MATCH {
            let win =
                quantized as isize + literal_cost as isize - token_cost(quantized, offset) as isize;
            if win > best_win {
                best_win = win;
                best_len = quantized;
                best_offset = offset;
                if quantized == MAX_RUN_LENGTH {
                    break;
                }
            }
        }

        candidate = accel.prev(q);
    }

    if best_win > 0 {
        Some((best_len, best_offset))
    } else {
        None
    }
}
