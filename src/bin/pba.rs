//! Parallel Barabási–Albert preferential attachment graph generator.
//!
//! Output locations are taken from the writer pool configuration (see
//! [`pagg::io::EdgeWriterPool`]); worker `i` writes `graph{i}.bin` under its
//! assigned path prefix.

use clap::{CommandFactory, Parser};

use pagg::{
    gens::{pba::DEFAULT_SEED, EdgesPerVertexGen, NumNodesGen, ParallelBa},
    io::EdgeWriterPool,
};

#[derive(Parser)]
#[command(about = "Parallel Barabasi-Albert preferential attachment graph generator")]
struct Args {
    /// Number of random vertices; positive
    no_vertices: u64,

    /// Edges per random vertex; positive
    edges_per_vert: u64,

    /// Dependencies between edges of the same vertex
    #[arg(short = 'd', long)]
    edge_dependencies: bool,

    /// Maximum number of threads; 0 uses all cores
    #[arg(short = 'p', long, default_value_t = 0)]
    threads: usize,

    /// Random seed; 0 uses the default seed
    #[arg(short = 'x', long, default_value_t = 0)]
    seed: u64,

    /// Drain all edges instead of writing them (I/O-free benchmarking)
    #[arg(long)]
    disable_output: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    if args.no_vertices == 0 || args.edges_per_vert == 0 {
        eprintln!("no-vertices and edges-per-vert must be positive");
        Args::command().print_help().ok();
        std::process::exit(-1);
    }

    if let Err(e) = run(&args) {
        eprintln!("generation failed: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> std::io::Result<()> {
    let threads = if args.threads == 0 {
        std::thread::available_parallelism().map_or(1, |p| p.get())
    } else {
        args.threads
    };

    let model = ParallelBa::new()
        .nodes(args.no_vertices)
        .edges_per_vertex(args.edges_per_vert)
        .edge_dependencies(args.edge_dependencies)
        .threads(threads)
        .seed(if args.seed == 0 { DEFAULT_SEED } else { args.seed });

    let mut pool = EdgeWriterPool::new(threads, 0)?;
    if args.disable_output {
        pool.set_disable_output(true);
    }

    let edges = model.generate(&mut pool)?;
    pool.finish()?;

    println!("Produced {edges} edges");

    Ok(())
}
