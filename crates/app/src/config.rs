//! Configuration for the huffcode tool.
//!
//! Handles parsing command-line arguments and resolving defaults. When no
//! input file is given to `compress`, a sample input is generated from a
//! seed; the seed is printed with the configuration so a run can be
//! reproduced.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::error::{AppError, Result};

/// Default size of a generated sample input.
pub const DEFAULT_SAMPLE_BYTES: usize = 65536;

#[derive(Parser, Debug)]
#[command(name = "huffcode", version, about = "Huffman compression with text-stored code trees")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print resolved configuration
    #[arg(long, global = true)]
    pub print_config: bool,

    /// Don't print metrics summary
    #[arg(long, global = true)]
    pub no_metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compress a file into <stem>.code (tree) and <stem>.short (bits)
    Compress(CompressArgs),

    /// Rebuild the original file from a .code and a .short file
    Decompress(DecompressArgs),

    /// Print the code assigned to every byte of a file
    Codes {
        /// Input file
        input: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct CompressArgs {
    /// Input file (default: generate a sample)
    pub input: Option<PathBuf>,

    /// Directory for the .code and .short files
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Random seed for sample generation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Size of the generated sample in bytes
    #[arg(long, default_value_t = DEFAULT_SAMPLE_BYTES)]
    pub sample_bytes: usize,
}

#[derive(Args, Debug)]
pub struct DecompressArgs {
    /// Tree description written by `compress`
    pub code: PathBuf,

    /// Packed bits written by `compress`
    pub short: PathBuf,

    /// Output file
    #[arg(long)]
    pub out: PathBuf,
}

/// Where `compress` reads its input from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    File(PathBuf),
    Sample { seed: u64, size_bytes: usize },
}

/// What to run, with all paths resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Compress {
        input: Input,
        out_dir: PathBuf,
    },
    Decompress {
        code_file: PathBuf,
        short_file: PathBuf,
        output_file: PathBuf,
    },
    Codes {
        input_file: PathBuf,
    },
}

/// Complete configuration for a run.
#[derive(Debug, Clone)]
pub struct Config {
    pub task: Task,

    /// Log verbosity from the command line
    pub verbosity: u8,

    /// Whether to print detailed config
    pub print_config: bool,

    /// Whether to print detailed metrics summary
    pub print_metrics: bool,
}

impl Config {
    /// Resolve parsed arguments into a configuration.
    ///
    /// If `compress` has no input and no `--seed`, the sample seed is
    /// derived from the current time.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let task = match cli.command {
            Command::Compress(args) => {
                let input = match args.input {
                    Some(path) => Input::File(path),
                    None => {
                        if args.sample_bytes == 0 {
                            return Err(AppError::Config(
                                "--sample-bytes must be positive".to_string(),
                            ));
                        }
                        Input::Sample {
                            seed: args.seed.unwrap_or_else(time_seed),
                            size_bytes: args.sample_bytes,
                        }
                    }
                };
                Task::Compress {
                    input,
                    out_dir: args.out_dir,
                }
            }
            Command::Decompress(args) => Task::Decompress {
                code_file: args.code,
                short_file: args.short,
                output_file: args.out,
            },
            Command::Codes { input } => Task::Codes { input_file: input },
        };

        Ok(Config {
            task,
            verbosity: cli.verbose,
            print_config: cli.print_config,
            print_metrics: !cli.no_metrics,
        })
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        match &self.task {
            Task::Compress { input, out_dir } => {
                println!("Mode: compress");
                match input {
                    Input::File(path) => println!("Input file: {}", path.display()),
                    Input::Sample { seed, size_bytes } => {
                        println!("Input file: (generate sample)");
                        println!("Seed: {seed}");
                        println!(
                            "Sample size: {} bytes ({} KiB)",
                            size_bytes,
                            size_bytes / 1024
                        );
                    }
                }
                println!("Output dir: {}", out_dir.display());
            }
            Task::Decompress {
                code_file,
                short_file,
                output_file,
            } => {
                println!("Mode: decompress");
                println!("Code file:  {}", code_file.display());
                println!("Short file: {}", short_file.display());
                println!("Output file: {}", output_file.display());
            }
            Task::Codes { input_file } => {
                println!("Mode: codes");
                println!("Input file: {}", input_file.display());
            }
        }
        println!("Verbosity: {}", self.verbosity);
        println!();
    }
}

/// Output paths `<out_dir>/<stem>.code` and `<out_dir>/<stem>.short`.
pub fn output_paths(out_dir: &Path, stem: &str) -> (PathBuf, PathBuf) {
    (
        out_dir.join(format!("{stem}.code")),
        out_dir.join(format!("{stem}.short")),
    )
}

fn time_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
