#![no_main]
use libfuzzer_sys::fuzz_target;

use lzg_flex::{compress, decompress};
fuzz_target!(|data: &[u8]| {
    let compressed = compress(data);
    assert!(compressed.len() <= lzg_flex::max_encoded_size(data.len()));
    let decompressed = decompress(&compressed).unwrap();
    assert_eq!(data, &decompressed[..]);
});
