#![no_main]
use libfuzzer_sys::fuzz_target;

use lzg_flex::decompress;
fuzz_target!(|data: &[u8]| {
    if let Ok(size) = lzg_flex::decoded_size(data) {
        if size > 20_000_000 {
            return;
        }
    }
    // should not panic
    let _ = decompress(data);
});
