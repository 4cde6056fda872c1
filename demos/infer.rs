//! CLI around the inference pipeline. Reads a haplotype panel from a VCF
//! file or a plain text matrix, infers the tree sequence, and exports the
//! result as TSV tables next to the input (or into a given directory).
//! Time is measured per phase to make it easy to exclude parsing.

use std::io;
use std::path::PathBuf;
use std::process::exit;
use std::time::Instant;

use clap::{Args, Parser, ValueEnum};

use treeweave::config::InferenceConfig;
use treeweave::error::Result;
use treeweave::ts::TreeSequenceGenerator;
use treeweave::variants::{VariantData, VariantDataBuilder};

#[derive(Parser)]
#[command(version, arg_required_else_help = true)]
struct CliArgs {
    #[command(flatten)]
    data_source: Input,

    /// Genome length the variant positions refer to
    #[arg(short, long)]
    sequence_length: f64,

    /// Per-site recombination probability
    #[arg(long, default_value_t = 1e-2)]
    recombination_rate: f64,

    /// Per-site mismatch probability
    #[arg(long, default_value_t = 1e-3)]
    error_rate: f64,

    #[arg(short = 't', long = "threads", default_value_t = 1)]
    num_threads: u16,

    /// Directory the TSV tables are written to; defaults to the input's
    /// parent directory
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct Input {
    #[arg(long = "type", value_enum)]
    input_type: InputType,

    #[arg(short = 'i', long)]
    path: String,

    #[arg(long, default_value_t = false)]
    compressed: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum InputType {
    /// Import from a VCF file
    Vcf,

    /// Import from a text file holding the site-by-sample matrix
    Matrix,
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = CliArgs::parse();

    if args.num_threads > 1 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.num_threads as usize)
            .build_global()
            .unwrap();
    }

    let variant_data = parse_input(&args).unwrap_or_else(|error| {
        eprintln!("could not parse input data: {}", error);
        exit(-1);
    });

    let output = args.output.clone().unwrap_or_else(|| {
        PathBuf::from(&args.data_source.path)
            .parent()
            .unwrap_or_else(|| {
                eprintln!("input file has no parent directory and no output path was provided");
                exit(-1);
            })
            .to_path_buf()
    });

    let config = InferenceConfig::with_rates(args.recombination_rate, args.error_rate);
    let generator = TreeSequenceGenerator::new(variant_data, config).unwrap_or_else(|error| {
        eprintln!("invalid configuration: {}", error);
        exit(-1);
    });

    let start = Instant::now();
    let tree_sequence = generator.run().unwrap_or_else(|error| {
        eprintln!("inference failed: {}", error);
        exit(-1);
    });
    println!(
        "inferred {} edgesets and {} mutations in {:?}",
        tree_sequence.num_edgesets(),
        tree_sequence.num_mutations(),
        start.elapsed()
    );

    tree_sequence
        .tskit_export(&output)
        .unwrap_or_else(|error| eprintln!("failed to export tree sequence: {}", error));
}

fn parse_input(args: &CliArgs) -> Result<VariantData> {
    match args.data_source.input_type {
        InputType::Vcf => treeweave::convenience::from_vcf(
            &args.data_source.path,
            args.data_source.compressed,
            args.sequence_length,
        ),
        InputType::Matrix => import_matrix(&args.data_source.path, args.sequence_length),
    }
}

/// Import a text file with the following layout:
/// ```text
/// num_samples
/// 0 1 0 1 repeat #num_samples... position
/// repeat #num_variants often...
/// ```
fn import_matrix(path: &str, sequence_length: f64) -> Result<VariantData> {
    let data = std::fs::read_to_string(path)?;
    let mut lines = data.lines();
    let num_samples = lines
        .next()
        .and_then(|line| line.trim().parse::<usize>().ok())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "missing sample count"))?;

    let mut builder = VariantDataBuilder::new(sequence_length);
    for line in lines {
        let mut parts = line.split_whitespace();
        let mut states = Vec::with_capacity(num_samples);
        for _ in 0..num_samples {
            let state = parts
                .next()
                .and_then(|part| part.parse::<i8>().ok())
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "truncated row"))?;
            states.push(state);
        }
        let position = parts
            .next()
            .and_then(|part| part.parse::<f64>().ok())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "row without position"))?;

        builder.add_variant_site(states, position)?;
    }

    builder.finalize()
}
