#![allow(dead_code)]

use binggan::plugins::*;
use binggan::*;

#[global_allocator]
pub static GLOBAL: PeakMemAlloc<jemallocator::Jemalloc> = PeakMemAlloc::new(jemallocator::Jemalloc);

// The corpora are synthesized so the bench has no file dependencies. Same
// bytes on every run: the text is fixed and the noise generator is seeded.

fn text_corpus(target_len: usize) -> Vec<u8> {
    const SENTENCES: &[&str] = &[
        "An iterator that knows its exact length. ",
        "Many Iterators don't know how many times they will iterate, but some do. ",
        "If an iterator knows how many times it can iterate, providing access to that information can be useful. ",
        "For example, if you want to iterate backwards, a good start is to know where the end is. ",
    ];
    let mut out = Vec::with_capacity(target_len + 128);
    let mut i = 0;
    while out.len() < target_len {
        out.extend_from_slice(SENTENCES[i % SENTENCES.len()].as_bytes());
        i += 1;
    }
    out.truncate(target_len);
    out
}

fn json_corpus(records: usize) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(b'[');
    for i in 0..records {
        if i > 0 {
            out.push(b',');
        }
        out.extend_from_slice(
            format!(
                r#"{{"id":{},"name":"item-{}","active":{},"score":{}}}"#,
                i,
                i,
                i % 2 == 0,
                (i * 37) % 1000
            )
            .as_bytes(),
        );
    }
    out.push(b']');
    out
}

fn noise_corpus(len: usize, mut seed: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        out.push(seed as u8);
    }
    out
}

fn data_sets() -> Vec<(String, Vec<u8>)> {
    vec![
        ("text_1k".to_string(), text_corpus(1024)),
        ("text_64k".to_string(), text_corpus(64 * 1024)),
        ("text_1m".to_string(), text_corpus(1024 * 1024)),
        ("json_66k".to_string(), json_corpus(1200)),
        ("noise_64k".to_string(), noise_corpus(64 * 1024, 0x9E3779B9)),
    ]
}

fn main() {
    let named_data = data_sets();
    compress_benches(InputGroup::new_with_inputs(named_data));
    decompress_benches();
}

fn compress_benches(mut runner: InputGroup<Vec<u8>, usize>) {
    runner.set_name("lzg_compress");
    runner.add_plugin(PeakMemAllocPlugin::new(&GLOBAL));

    runner.throughput(|data| data.len());
    runner.register("lzg flex", move |i| {
        let out = black_box(lzg_flex::compress(i));
        Some(out.len())
    });
    runner.register("lzg flex level 9", move |i| {
        let config = lzg_flex::EncoderConfig::new().level(9);
        let out = black_box(lzg_flex::compress_with(config, i));
        Some(out.len())
    });
    runner.register("lz4 flex", move |i| {
        let out = black_box(lz4_flex::compress(i));
        Some(out.len())
    });
    runner.register("snap", move |i| {
        let out = black_box(snap::raw::Encoder::new().compress_vec(i).unwrap());
        Some(out.len())
    });

    runner.run();
}

fn decompress_benches() {
    let mut runner = BenchRunner::with_name("lzg_decompress");
    runner.add_plugin(PeakMemAllocPlugin::new(&GLOBAL));
    for (name, data) in data_sets() {
        let compressed_lzg = lzg_flex::compress(&data);
        let compressed_lz4 = lz4_flex::compress(&data);
        let compressed_snap = snap::raw::Encoder::new().compress_vec(&data).unwrap();

        let mut group = runner.new_group();
        group.set_name(&name);
        group.set_input_size(data.len());

        group.register_with_input("lzg flex", &compressed_lzg, move |i| {
            let out = black_box(lzg_flex::decompress(i).unwrap());
            Some(out.len())
        });
        let uncompressed_len = data.len();
        group.register_with_input("lz4 flex", &compressed_lz4, move |i| {
            let out = black_box(lz4_flex::decompress(i, uncompressed_len).unwrap());
            Some(out.len())
        });
        group.register_with_input("snap", &compressed_snap, move |i| {
            let out = black_box(snap::raw::Decoder::new().decompress_vec(i).unwrap());
            Some(out.len())
        });

        group.run();
    }
}
