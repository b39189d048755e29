#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use lzg_flex::{compress_with, decompress, EncoderConfig};

#[derive(Arbitrary, Debug)]
struct Input {
    level: u32,
    fast: bool,
    data: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let config = EncoderConfig::new().level(input.level).fast(input.fast);
    let compressed = compress_with(config, &input.data);
    let decompressed = decompress(&compressed).unwrap();
    assert_eq!(input.data, decompressed);
});
