use anyhow::Result;
use argh::FromArgs;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(FromArgs, Debug)]
/// [De]Compress data in the lzg format.
struct Options {
    #[argh(switch)]
    /// delete original files (default: false)
    clean: bool,

    #[argh(switch, short = 'f')]
    /// overwrite output files
    force: bool,

    #[argh(switch, short = 'd')]
    /// force decompress
    decompress: bool,

    #[argh(option, short = 'l', default = "5")]
    /// compression level 1-9 (default: 5)
    level: u32,

    #[argh(switch)]
    /// use the smaller 2-byte match keys (slower, less memory)
    no_fast: bool,

    #[argh(positional)]
    /// file to compress/decompress
    input_file: Option<PathBuf>,

    /// output file to write to. defaults to stdout
    #[argh(option, short = 'o')]
    out: Option<PathBuf>,
}

const LZG_ENDING: &str = "lzg";
const LZG_EXTENSION: &str = ".lzg";

fn main() -> Result<()> {
    let opts: Options = argh::from_env();

    let input_file = opts.input_file.filter(|f| f.as_os_str() != "-");

    if let Some(file) = input_file {
        handle_file(
            &file,
            opts.out,
            opts.level,
            !opts.no_fast,
            opts.clean,
            opts.force,
            opts.decompress,
            true,
        )?;
    } else {
        let mut input = Vec::new();
        io::stdin().lock().read_to_end(&mut input)?;

        let output = if opts.decompress {
            lzg_flex::decompress(&input)?
        } else {
            let config = lzg_flex::EncoderConfig::new()
                .level(opts.level)
                .fast(!opts.no_fast);
            lzg_flex::compress_with(config, &input)
        };

        match opts.out {
            Some(path) => fs::write(path, output)?,
            None => io::stdout().lock().write_all(&output)?,
        }
    }

    Ok(())
}

/// Derives the output filename: append `.lzg` when compressing, strip the
/// extension when decompressing.
fn output_path_for(file: &Path, decompress: bool) -> PathBuf {
    if decompress {
        file.with_extension("")
    } else {
        let mut f = file.as_os_str().to_os_string();
        f.push(LZG_EXTENSION);
        f.into()
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_file(
    file: &Path,
    out: Option<PathBuf>,
    level: u32,
    fast: bool,
    clean: bool,
    force: bool,
    force_decompress: bool,
    print_info: bool,
) -> Result<()> {
    let decompress = file.extension() == Some(LZG_ENDING.as_ref());
    if force_decompress && !decompress {
        anyhow::bail!("Can't determine an output filename")
    }
    let output = match out {
        Some(out) => out,
        None => {
            let output = output_path_for(file, decompress);
            if print_info {
                println!(
                    "{} filename will be: {}",
                    if decompress {
                        "Decompressed"
                    } else {
                        "Compressed"
                    },
                    output.display()
                );
            }
            if !force && output.exists() {
                {
                    let stdout = io::stdout();
                    let mut stdout = stdout.lock();
                    write!(
                        stdout,
                        "{} already exists, do you want to overwrite? (y/N) ",
                        output.display()
                    )?;
                    stdout.flush()?;
                }
                let mut answer = String::new();
                io::stdin().read_line(&mut answer)?;
                if !answer.starts_with('y') {
                    println!("Not overwriting");
                    return Ok(());
                }
            }
            output
        }
    };

    let input = fs::read(file)?;
    if decompress {
        let decompressed = lzg_flex::decompress(&input)?;
        fs::write(output, decompressed)?;
    } else {
        let config = lzg_flex::EncoderConfig::new().level(level).fast(fast);
        let compressed = lzg_flex::compress_with(config, &input);
        let output_size = compressed.len();
        fs::write(&output, compressed)?;

        if print_info {
            println!(
                "Compressed {} bytes into {} ==> {:.2}%",
                input.len(),
                output_size,
                output_size as f32 * 100.0 / input.len() as f32
            );
        }
    }
    if clean {
        std::fs::remove_file(file)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_names() {
        assert_eq!(
            output_path_for(Path::new("notes.txt"), false),
            PathBuf::from("notes.txt.lzg")
        );
        assert_eq!(
            output_path_for(Path::new("notes.txt.lzg"), true),
            PathBuf::from("notes.txt")
        );
    }
}
