use barscan::loader::load_path;
use barscan::utils::grayscale::extract_luminance;
use barscan::{
    Binarizer, DecodeConfig, Decoded, DecodeError, Engine, GlobalHistogramBinarizer, HybridBinarizer,
    SymbologySet,
};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "barscan", version, about = "Decode barcodes and QR codes from image files")]
struct Cli {
    /// Log decode attempts (debug level) unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode one symbol from each image
    Decode {
        /// Image files
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Comma separated symbologies, e.g. QR_CODE,EAN_13 (default: all)
        #[arg(long)]
        formats: Option<SymbologySet>,
        /// Spend more time looking for symbols
        #[arg(long)]
        try_harder: bool,
        /// Character set for byte payloads (WHATWG label)
        #[arg(long)]
        charset: Option<String>,
        /// Print one JSON object per image instead of plain text
        #[arg(long)]
        json_lines: bool,
    },
    /// Print loader, luminance and binarization statistics for an image
    Inspect {
        /// Image file
        path: PathBuf,
    },
}

#[derive(Serialize)]
struct Line<'a> {
    path: &'a Path,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    binarizer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sample_factor: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    not_found: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Decode {
            paths,
            formats,
            try_harder,
            charset,
            json_lines,
        } => {
            let mut config = DecodeConfig::new().with_try_harder(try_harder);
            if let Some(formats) = formats {
                config = config.with_formats(formats);
            }
            if let Some(label) = charset {
                config = match config.with_charset_label(&label) {
                    Ok(config) => config,
                    Err(err) => {
                        eprintln!("barscan: {err}");
                        return ExitCode::from(2);
                    }
                };
            }
            decode_cmd(&Engine::new(config), &paths, json_lines)
        }
        Command::Inspect { path } => inspect_cmd(&path),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "barscan=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn decode_cmd(engine: &Engine, paths: &[PathBuf], json_lines: bool) -> ExitCode {
    // One independent decode per file; output keeps argument order.
    let results: Vec<(&PathBuf, Result<Decoded, DecodeError>)> = paths
        .par_iter()
        .map(|path| (path, engine.decode_path(path)))
        .collect();

    let mut failures = 0;
    for (path, result) in &results {
        if result.is_err() {
            failures += 1;
        }
        if json_lines {
            print_json(path, result);
        } else {
            print_plain(path, result, paths.len() > 1);
        }
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_plain(path: &Path, result: &Result<Decoded, DecodeError>, prefix: bool) {
    match result {
        Ok(decoded) if prefix => println!("{}: {}", path.display(), decoded.text),
        Ok(decoded) => println!("{}", decoded.text),
        Err(err) => eprintln!("{}: {err}", path.display()),
    }
}

fn print_json(path: &Path, result: &Result<Decoded, DecodeError>) {
    let line = match result {
        Ok(decoded) => Line {
            path,
            ok: true,
            text: Some(&decoded.text),
            format: Some(decoded.format.as_str()),
            binarizer: Some(decoded.binarizer.to_string()),
            sample_factor: Some(decoded.sample_factor),
            error: None,
            not_found: false,
        },
        Err(err) => Line {
            path,
            ok: false,
            text: None,
            format: None,
            binarizer: None,
            sample_factor: None,
            error: Some(err.to_string()),
            not_found: err.is_not_found(),
        },
    };
    match serde_json::to_string(&line) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("{}: cannot serialize result: {err}", path.display()),
    }
}

fn inspect_cmd(path: &Path) -> ExitCode {
    let loaded = match load_path(path) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("Failed to load image {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
    };

    println!(
        "Image: {} ({}x{})",
        path.display(),
        loaded.original_width,
        loaded.original_height
    );
    println!(
        "Sample factor: {} (working size {}x{})",
        loaded.sample_factor,
        loaded.buffer.width(),
        loaded.buffer.height()
    );

    let luminance = extract_luminance(&loaded.buffer);
    let (min, max, avg) = luminance.stats();
    println!("Luminance range: {min}-{max}, average: {avg}");

    let binarizers: [&dyn Binarizer; 2] = [&HybridBinarizer, &GlobalHistogramBinarizer];
    for binarizer in binarizers {
        match binarizer.binarize(&luminance) {
            Ok(matrix) => {
                let total = matrix.width() * matrix.height();
                let ratio = matrix.count_dark() as f64 / total.max(1) as f64;
                println!("{}: dark_ratio={:.2}%", binarizer.kind(), ratio * 100.0);
            }
            Err(err) => println!("{}: {err}", binarizer.kind()),
        }
    }
    ExitCode::SUCCESS
}
