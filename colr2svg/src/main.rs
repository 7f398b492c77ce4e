//! Extract a color glyph from a font as SVG.
//!
//! Takes a font file and the text to look up (a single character or a
//! ligature sequence) and writes the glyph's SVG to a file or to stdout.

use std::{io::Write, path::PathBuf};

use clap::Parser;
use colr_svg::{pen::SvgPathBuilder, svg, ColrSvg};
use skrifa::{raw::ReadError, FontRef};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The input font file.
    font: PathBuf,

    /// The character or ligature sequence to extract.
    text: String,

    /// Scale the result to fit in a square of this size
    #[arg(short, long)]
    size: Option<f64>,

    /// The output SVG file, stdout if not given
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of fractional digits in path coordinates
    #[arg(short, long)]
    precision: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write output: {0}")]
    Write(#[from] std::io::Error),
    #[error("invalid font: {0}")]
    Font(ReadError),
    #[error(transparent)]
    Extract(#[from] colr_svg::Error),
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let data = std::fs::read(&args.font).map_err(|source| CliError::Io {
        path: args.font.clone(),
        source,
    })?;
    let font = FontRef::new(&data).map_err(CliError::Font)?;
    let mut colr_svg = ColrSvg::new(font)?;
    if let Some(precision) = args.precision {
        colr_svg = colr_svg.with_path_builder(SvgPathBuilder::with_precision(precision));
    }
    let mut element = colr_svg.get(&args.text)?;
    if let Some(size) = args.size {
        element = svg::scale_to_size(&element, size)?;
    }
    let bytes = svg::to_bytes(&element);
    log::debug!("writing {} bytes of SVG", bytes.len());
    match &args.output {
        Some(path) => std::fs::write(path, bytes)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_args() {
        Args::command().debug_assert();
    }

    #[test]
    fn parse_args() {
        let args = Args::try_parse_from(["colr2svg", "font.ttf", "ab", "-s", "64", "-p", "2"])
            .unwrap();
        assert_eq!(args.font, PathBuf::from("font.ttf"));
        assert_eq!(args.text, "ab");
        assert_eq!(args.size, Some(64.0));
        assert_eq!(args.precision, Some(2));
        assert_eq!(args.output, None);
    }
}
