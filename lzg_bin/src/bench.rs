use argh::FromArgs;

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

/// Number of timed rounds; the best one is reported.
const ROUNDS: usize = 10;

#[derive(FromArgs, Debug)]
/// Round-trip a file through the lzg codec and report timings.
struct Options {
    #[argh(option, short = 'l', default = "5")]
    /// compression level 1-9 (default: 5)
    level: u32,

    #[argh(switch, short = 'v')]
    /// print per-round timings
    verbose: bool,

    #[argh(positional)]
    /// file to benchmark
    file: PathBuf,
}

// Status goes to stderr, the exit code is 0 on any outcome.
fn main() {
    let opts: Options = argh::from_env();
    if let Err(message) = run(&opts) {
        eprintln!("lzg-bench: {}", message);
    }
}

fn run(opts: &Options) -> Result<(), String> {
    let input = fs::read(&opts.file)
        .map_err(|e| format!("unable to read {}: {}", opts.file.display(), e))?;

    let mut compressed = Vec::new();
    let mut best_encode = u128::MAX;
    for round in 0..ROUNDS {
        let start = Instant::now();
        compressed =
            lzg_flex::compress_with(lzg_flex::EncoderConfig::new().level(opts.level), &input);
        let micros = start.elapsed().as_micros();
        if opts.verbose {
            eprintln!("encode round {}: {} us", round, micros);
        }
        best_encode = best_encode.min(micros);
    }

    let mut decompressed = Vec::new();
    let mut best_decode = u128::MAX;
    for round in 0..ROUNDS {
        let start = Instant::now();
        decompressed = lzg_flex::decompress(&compressed)
            .map_err(|e| format!("decode failed: {}", e))?;
        let micros = start.elapsed().as_micros();
        if opts.verbose {
            eprintln!("decode round {}: {} us", round, micros);
        }
        best_decode = best_decode.min(micros);
    }

    if decompressed != input {
        return Err("round trip mismatch".to_string());
    }

    eprintln!(
        "{}: {} -> {} bytes ({:.2}%), level {}",
        opts.file.display(),
        input.len(),
        compressed.len(),
        compressed.len() as f64 * 100.0 / input.len().max(1) as f64,
        opts.level,
    );
    eprintln!("encode: {} us (best of {})", best_encode, ROUNDS);
    eprintln!("decode: {} us (best of {})", best_decode, ROUNDS);

    Ok(())
}
