//! Search accelerator for the encoder.
//!
//! Two tables. `last` maps a 2 or 3 byte prefix (the bytes themselves, no
//! lossy hashing) to the most recent position it occurred at. `chain` is a
//! ring over the window, threading every position to the previous occurrence
//! of the same prefix. Walking the chain newest-first enumerates exactly the
//! candidates whose prefix already matches.
//!
//! Positions are stored as plain `u32` indices into the input slice, never
//! as addresses. Both tables are dropped on every return path.

/// Sentinel for "no prior occurrence". Position 0 is valid, so `0` can't be
/// the empty marker.
pub(crate) const NO_POS: u32 = u32::MAX;

pub(crate) struct SearchAccel {
    last: Vec<u32>,
    chain: Vec<u32>,
    window_mask: usize,
    key_len: usize,
}

impl SearchAccel {
    /// `window` must be a power of two; `fast` selects 3 byte keys (16 MiB
    /// `last` table, fewer chain collisions) over 2 byte keys (64 KiB).
    pub(crate) fn new(window: usize, fast: bool) -> Self {
        debug_assert!(window.is_power_of_two());
        let (key_len, key_space) = if fast { (3, 1usize << 24) } else { (2, 1usize << 16) };
        SearchAccel {
            last: vec![NO_POS; key_space],
            chain: vec![NO_POS; window],
            window_mask: window - 1,
            key_len,
        }
    }

    #[inline]
    pub(crate) fn key_len(&self) -> usize {
        self.key_len
    }

    #[inline]
    pub(crate) fn window(&self) -> usize {
        self.window_mask + 1
    }

    #[inline]
    fn key(&self, input: &[u8], pos: usize) -> usize {
        let mut key = (usize::from(input[pos]) << 8) | usize::from(input[pos + 1]);
        if self.key_len == 3 {
            key = (key << 8) | usize::from(input[pos + 2]);
        }
        key
    }

    /// Registers `pos` as the newest occurrence of its prefix. Must be
    /// called for every consumed input position, including the interior of
    /// emitted matches; otherwise later matches lose candidates. No-ops
    /// when fewer than `key_len` bytes remain.
    #[inline]
    pub(crate) fn update(&mut self, input: &[u8], pos: usize) {
        if pos + self.key_len > input.len() {
            return;
        }
        let key = self.key(input, pos);
        self.chain[pos & self.window_mask] = self.last[key];
        self.last[key] = pos as u32;
    }

    /// The occurrence preceding `pos` with the same prefix, or [`NO_POS`].
    /// Callers stop the walk once the distance reaches the window; that
    /// clamp is also what keeps entries from older ring laps out.
    #[inline]
    pub(crate) fn prev(&self, pos: usize) -> u32 {
        self.chain[pos & self.window_mask]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(accel: &SearchAccel, pos: usize, window: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut candidate = accel.prev(pos);
        while candidate != NO_POS {
            let q = candidate as usize;
            if pos - q >= window {
                break;
            }
            out.push(q);
            candidate = accel.prev(q);
        }
        out
    }

    #[test]
    fn chains_repeated_prefixes() {
        let input = b"abcabcabc";
        let mut accel = SearchAccel::new(16, true);
        for pos in 0..input.len() {
            accel.update(input, pos);
        }
        assert_eq!(walk(&accel, 6, 16), vec![3, 0]);
        assert_eq!(walk(&accel, 4, 16), vec![1]);
    }

    #[test]
    fn two_byte_keys() {
        let input = b"ababab";
        let mut accel = SearchAccel::new(8, false);
        for pos in 0..input.len() {
            accel.update(input, pos);
        }
        assert_eq!(accel.key_len(), 2);
        assert_eq!(walk(&accel, 4, 8), vec![2, 0]);
    }

    #[test]
    fn update_past_end_is_a_noop() {
        let input = b"xyz";
        let mut accel = SearchAccel::new(8, true);
        accel.update(input, 0);
        accel.update(input, 1); // only two bytes left
        assert_eq!(accel.prev(1), NO_POS);
    }

    #[test]
    fn window_clamp_hides_old_candidates() {
        // "ab" at 0 and again one full window later: too far to use.
        let mut input = vec![b'.'; 20];
        input[0] = b'a';
        input[1] = b'b';
        input[16] = b'a';
        input[17] = b'b';
        input.push(b'a');
        input.push(b'b');
        let mut accel = SearchAccel::new(16, false);
        for pos in 0..input.len() {
            accel.update(input.as_slice(), pos);
        }
        // 20 - 16 = 4 < 16 so position 16 is reachable, 0 is not.
        assert_eq!(walk(&accel, 20, 16), vec![16]);
    }
}
