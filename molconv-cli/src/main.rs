// molconv-cli/src/main.rs
//
// This file defines the command-line interface (CLI) for the molconv
// conversion shim. It uses the `clap` crate to parse arguments for a single
// conversion through the molconv-core library.
//
// Responsibilities include:
// - Defining the CLI argument structure (`Cli`).
// - Parsing user-provided arguments and reading the input payload
//   (from a file or stdin).
// - Configuring molconv-core based on CLI arguments and defaults.
// - Invoking the core conversion (`molconv_core::run_conversion`).
// - Printing the converted output and mapping failures to exit codes.

use clap::Parser;
use molconv_core::{
    config::{DEFAULT_EXECUTABLE, DEFAULT_LOG_DIR, DEFAULT_TIMEOUT_SECS},
    run_conversion, ConversionConfig, ConversionRequest, Payload,
};
use std::io::Read;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "molconv: Molecular file-format conversion via Open Babel",
    long_about = "Converts molecular structure data between file formats by \
                  invoking the Open Babel executable through molconv-core."
)]
struct Cli {
    /// Input file containing the structure data ('-' or absent reads stdin)
    #[arg(value_name = "INPUT_FILE")]
    input: Option<PathBuf>,

    /// Input format tag (e.g. smiles, pdb)
    #[arg(short = 'i', long, value_name = "FORMAT")]
    in_format: String,

    /// Output format tag (e.g. inchi, mol2)
    #[arg(short = 'o', long, value_name = "FORMAT")]
    out_format: String,

    /// Optional molecule title
    #[arg(long, value_name = "TITLE")]
    title: Option<String>,

    /// Adjust protonation state for this pH
    #[arg(long, value_name = "PH")]
    ph: Option<f64>,

    /// Suppress automatic hydrogen insertion
    #[arg(long)]
    no_add_h: bool,

    /// Extra arguments passed to the tool verbatim (whitespace-split)
    #[arg(long, value_name = "ARGS", default_value = "", allow_hyphen_values = true)]
    extra_args: String,

    /// Wall-clock timeout for the conversion, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Path to the conversion executable
    #[arg(long, value_name = "PATH", default_value = DEFAULT_EXECUTABLE)]
    executable: PathBuf,

    /// Override the tool's data-library directory (BABEL_LIBDIR)
    #[arg(long, value_name = "DIR")]
    libdir: Option<PathBuf>,

    /// Directory for failure-record files
    #[arg(long, value_name = "DIR", default_value = DEFAULT_LOG_DIR)]
    log_dir: PathBuf,

    /// Log the constructed command line and enable debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // env_logger respects RUST_LOG; --verbose raises the default to debug.
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let payload = match read_payload(cli.input.as_deref()) {
        Ok(payload) => payload,
        Err(e) => {
            log::error!("Failed to read input: {e}");
            process::exit(1);
        }
    };

    let mut config = ConversionConfig::new(cli.executable);
    config.babel_libdir = cli.libdir;
    config.log_dir = cli.log_dir;
    config.timeout = Duration::from_secs(cli.timeout);
    config.debug = cli.verbose;

    let mut request = ConversionRequest::new(cli.in_format, cli.out_format);
    request.title = cli.title;
    request.ph = cli.ph;
    request.dont_add_h = cli.no_add_h;
    request.extra_args = cli.extra_args;

    match run_conversion(&config, &request, &payload) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            log::error!("Conversion failed: {e}");
            process::exit(1);
        }
    }
}

/// Reads the payload from the given file, or from stdin when the path is
/// absent or '-'. Input is kept as raw bytes; binary formats are legal.
fn read_payload(input: Option<&std::path::Path>) -> std::io::Result<Payload> {
    match input {
        Some(path) if path.as_os_str() != "-" => Ok(Payload::Bytes(std::fs::read(path)?)),
        _ => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(Payload::Bytes(buf))
        }
    }
}
