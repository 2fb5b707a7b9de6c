//! Degree distribution counter over binary edge list files.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use clap::Parser;
use tracing::info;

use pagg::{
    em::ExternalSorter,
    io::{IdFileReader, ID_BYTES},
    stream::DistributionCount,
};

#[derive(Parser)]
#[command(about = "Degree distribution counter over binary edge lists")]
struct Args {
    /// Input files; multiple files are treated as concatenated
    #[arg(required = true)]
    input_files: Vec<PathBuf>,

    /// Input is a directed edge list
    #[arg(short = 'd', long)]
    directed: bool,

    /// Write the distribution to this file instead of standard output
    #[arg(short = 'o', long)]
    output_file: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("distribution count failed: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> std::io::Result<()> {
    info!("using {}-bit unsigned integers for input", 8 * ID_BYTES);

    // Sort all endpoints by vertex id. In the directed case the sources sit
    // at even positions and the targets at odd ones, counted separately.
    let mut out_sorter = ExternalSorter::<u64>::new();
    let mut in_sorter = ExternalSorter::<u64>::new();
    let mut edges = 0u64;

    for file in &args.input_files {
        let mut ids = 0u64;
        let mut out_endpoint = true;

        for id in IdFileReader::open(file)? {
            if out_endpoint || !args.directed {
                out_sorter.push(id);
            } else {
                in_sorter.push(id);
            }
            out_endpoint = !out_endpoint;
            ids += 1;
        }

        info!("read {} edges from {}", ids / 2, file.display());
        edges += ids / 2;
    }
    println!("# Number of edges: {edges}");

    let mut output: Box<dyn Write> = match &args.output_file {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };

    if !args.directed {
        count_and_display(out_sorter, &mut output)?;
    } else {
        writeln!(output, "# Out-Degrees")?;
        count_and_display(out_sorter, &mut output)?;

        writeln!(output)?;
        writeln!(output, "# In-Degrees")?;
        count_and_display(in_sorter, &mut output)?;
    }

    output.flush()
}

/// Rolls a sorted endpoint stream up into `degree count` lines.
///
/// The first pass collapses equal vertex ids into degrees, the second
/// collapses equal degrees into the distribution.
fn count_and_display(
    mut endpoints: ExternalSorter<u64>,
    output: &mut dyn Write,
) -> std::io::Result<()> {
    endpoints.sort();

    let mut degree_sorter = ExternalSorter::new();
    for block in DistributionCount::new(endpoints) {
        degree_sorter.push(block.count);
    }
    degree_sorter.sort();

    for block in DistributionCount::new(degree_sorter) {
        writeln!(output, "{} {}", block.value, block.count)?;
    }

    Ok(())
}
